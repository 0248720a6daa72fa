//! Error mapping for MCP tool calls

use kawach_core::KawachError;
use rmcp::ErrorData;

/// Converts a core error into an MCP error.
///
/// Errors caused by the caller's arguments become `invalid_params` so the
/// client can correct the call; everything else is an internal error.
pub fn to_mcp_error(message: &str, error: &KawachError) -> ErrorData {
    let text = format!("{message}: {error}");
    match error {
        KawachError::InvalidInput { .. }
        | KawachError::InvalidScenario { .. }
        | KawachError::ScenarioNotFound { .. }
        | KawachError::AssignmentNotFound { .. }
        | KawachError::NotCompleted => ErrorData::invalid_params(text, None),
        _ => ErrorData::internal_error(text, None),
    }
}

#[cfg(test)]
mod tests {
    use rmcp::model::ErrorCode;

    use super::*;

    #[test]
    fn test_caller_errors_are_invalid_params() {
        let error = KawachError::ScenarioNotFound {
            id: "volcano".to_string(),
        };
        let data = to_mcp_error("Failed to show scenario", &error);
        assert_eq!(data.code.0, ErrorCode::INVALID_PARAMS.0);
        assert_eq!(
            data.message,
            "Failed to show scenario: Scenario 'volcano' not found"
        );
    }

    #[test]
    fn test_storage_errors_are_internal() {
        let error = KawachError::XdgDirectory("no home".to_string());
        let data = to_mcp_error("Failed to load progress", &error);
        assert_eq!(data.code.0, ErrorCode::INTERNAL_ERROR.0);
    }
}
