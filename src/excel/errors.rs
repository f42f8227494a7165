//! Execution failure classification.
//!
//! AppleScript error numbers are checked first; message substrings are the
//! fallback for failures that arrive without a number.

use serde::Serialize;

use super::runner::ScriptFailure;
use crate::error::ExecutionError;

/// macOS privacy permission the user has to grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Privacy & Security > Accessibility (keystrokes, assistive access).
    Accessibility,
    /// Privacy & Security > Automation (Apple events to Excel).
    Automation,
}

impl Permission {
    pub fn instructions(self) -> &'static str {
        match self {
            Permission::Accessibility => {
                "Excel automation needs Accessibility permission. Go to System Settings > \
                 Privacy & Security > Accessibility and enable your terminal app."
            }
            Permission::Automation => {
                "Excel automation needs Automation permission. Go to System Settings > \
                 Privacy & Security > Automation and allow your terminal app to control \
                 Microsoft Excel."
            }
        }
    }
}

const ERR_NOT_AUTHORIZED: i32 = -1743;
/// Generic "Invalid index"; only an assistive-access refusal when the
/// message says so.
const ERR_INVALID_INDEX: i32 = -1719;
const ERR_ASSISTIVE_ACCESS_UI: i32 = -25211;
const ERR_KEYSTROKES: i32 = 1002;
const ERR_NO_SUCH_OBJECT: i32 = -1728;
const ERR_APP_NOT_RUNNING: i32 = -600;
const ERR_CONNECTION_INVALID: i32 = -609;

fn classify_code(code: i32, message: &str) -> Option<ExecutionError> {
    match code {
        ERR_NOT_AUTHORIZED => Some(ExecutionError::PermissionDenied(Permission::Automation)),
        ERR_INVALID_INDEX if message.contains("assistive access") => {
            Some(ExecutionError::PermissionDenied(Permission::Accessibility))
        }
        ERR_ASSISTIVE_ACCESS_UI | ERR_KEYSTROKES => {
            Some(ExecutionError::PermissionDenied(Permission::Accessibility))
        }
        ERR_NO_SUCH_OBJECT => Some(ExecutionError::RangeOrCellNotFound),
        ERR_APP_NOT_RUNNING | ERR_CONNECTION_INVALID => Some(ExecutionError::ApplicationUnreachable),
        _ => None,
    }
}

fn classify_message(message: &str) -> Option<ExecutionError> {
    if message.contains("not allowed to send keystrokes")
        || message.contains("not allowed assistive access")
    {
        return Some(ExecutionError::PermissionDenied(Permission::Accessibility));
    }
    if message.contains("missing value") {
        return Some(ExecutionError::RangeOrCellNotFound);
    }
    None
}

/// Map a runner failure onto the execution error taxonomy.
pub fn classify(failure: &ScriptFailure) -> ExecutionError {
    failure
        .code
        .and_then(|code| classify_code(code, &failure.message))
        .or_else(|| classify_message(&failure.message))
        .unwrap_or_else(|| ExecutionError::Unclassified(failure.message.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_wins_over_message() {
        // Message mentions "missing value" but the code says permissions.
        let f = ScriptFailure::with_code("missing value; Not authorized to send Apple events", -1743);
        assert_eq!(
            classify(&f),
            ExecutionError::PermissionDenied(Permission::Automation)
        );
    }

    #[test]
    fn keystroke_phrase_without_code() {
        let f = ScriptFailure::new("osascript is not allowed to send keystrokes");
        assert_eq!(
            classify(&f),
            ExecutionError::PermissionDenied(Permission::Accessibility)
        );
    }

    #[test]
    fn assistive_access_phrase_without_code() {
        let f = ScriptFailure::new("osascript is not allowed assistive access.");
        assert_eq!(
            classify(&f),
            ExecutionError::PermissionDenied(Permission::Accessibility)
        );
    }

    #[test]
    fn missing_value_is_range_not_found() {
        let f = ScriptFailure::new("Can't make missing value into type text.");
        assert_eq!(classify(&f), ExecutionError::RangeOrCellNotFound);
        let f = ScriptFailure::with_code("Can't get range \"ZZ0\".", -1728);
        assert_eq!(classify(&f), ExecutionError::RangeOrCellNotFound);
    }

    #[test]
    fn not_running_code() {
        let f = ScriptFailure::with_code("Microsoft Excel got an error: Application isn't running.", -600);
        assert_eq!(classify(&f), ExecutionError::ApplicationUnreachable);
    }

    #[test]
    fn unknown_code_falls_back_to_message_then_raw() {
        let f = ScriptFailure::with_code("Expected end of line but found identifier.", -2741);
        assert_eq!(
            classify(&f),
            ExecutionError::Unclassified("Expected end of line but found identifier.".into())
        );
    }

    #[test]
    fn invalid_index_is_a_script_bug() {
        let f = ScriptFailure::from_stderr(
            "0:120: execution error: Can\u{2019}t get item 3 of {1, 2}. Invalid index. (-1719)",
        );
        assert_eq!(f.code, Some(-1719));
        assert!(
            matches!(classify(&f), ExecutionError::Unclassified(msg) if msg.contains("Invalid index"))
        );
    }

    #[test]
    fn invalid_index_with_assistive_access_is_permission() {
        let f = ScriptFailure::from_stderr(
            "execution error: System Events got an error: osascript is not allowed assistive access. (-1719)",
        );
        assert_eq!(
            classify(&f),
            ExecutionError::PermissionDenied(Permission::Accessibility)
        );
    }

    #[test]
    fn instructions_name_the_settings_pane() {
        assert!(Permission::Accessibility.instructions().contains("Accessibility"));
        assert!(Permission::Automation.instructions().contains("Automation"));
    }
}
