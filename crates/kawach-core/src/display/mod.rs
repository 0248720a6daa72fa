//! Markdown presentation of drills, results and progress.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! collections get newtype wrappers so empty lists render a friendly line
//! instead of nothing. The CLI renders this markdown in the terminal and the
//! MCP server returns it as tool output.
//!
//! - [`collections`]: [`Scenarios`] and [`AssignmentEntries`]
//! - [`status`]: one-line confirmations ([`OperationStatus`])
//! - [`datetime`]: [`LocalDateTime`] for timestamps
//! - [`models`]: `Display` for scenarios, results, settlements and progress
//!
//! ```rust
//! use kawach_core::display::OperationStatus;
//!
//! let status = OperationStatus::success("Assignment asg-7 created");
//! assert_eq!(status.to_string(), "Success: Assignment asg-7 created\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod status;

pub use collections::{AssignmentEntries, Scenarios};
pub use datetime::LocalDateTime;
pub use status::OperationStatus;
