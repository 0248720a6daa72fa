use kawach_core::{Arena, ArenaBuilder};
use tempfile::TempDir;

/// Helper function to create a test arena backed by a temporary database
pub async fn create_test_arena() -> (TempDir, Arena) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let arena = ArenaBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create arena");
    (temp_dir, arena)
}
