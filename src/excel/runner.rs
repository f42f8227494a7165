//! AppleScript runner — the seam between the pipeline and `osascript`.
//!
//! Failures come back typed: the raw message plus the AppleScript error
//! number when `osascript` printed one, so classification can work on
//! codes instead of prose.

use async_trait::async_trait;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// A script that did not run to completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ScriptFailure {
    pub message: String,
    /// AppleScript error number, e.g. `-1743`.
    pub code: Option<i32>,
}

impl ScriptFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self {
            message: message.into(),
            code: Some(code),
        }
    }

    /// Build a failure from `osascript` stderr.
    ///
    /// Stderr looks like `0:58: execution error: Microsoft Excel got an
    /// error: ... (-1728)`; the trailing number becomes `code`.
    pub fn from_stderr(stderr: &str) -> Self {
        static CODE: OnceLock<Regex> = OnceLock::new();
        let re = CODE.get_or_init(|| Regex::new(r"\((-?\d+)\)\s*$").expect("static regex"));
        let message = stderr.trim().to_string();
        let code = re
            .captures(&message)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok());
        Self { message, code }
    }
}

/// Runs AppleScript source and returns its textual result.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(&self, script: &str) -> Result<String, ScriptFailure>;
}

/// Production runner: pipes the script to `osascript -`.
pub struct Osascript {
    binary: PathBuf,
}

impl Osascript {
    pub fn new() -> Self {
        let binary = which::which("osascript").unwrap_or_else(|_| PathBuf::from("/usr/bin/osascript"));
        log::debug!("[EXECUTE] Using {}", binary.display());
        Self { binary }
    }
}

impl Default for Osascript {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScriptRunner for Osascript {
    async fn run(&self, script: &str) -> Result<String, ScriptFailure> {
        let mut child = tokio::process::Command::new(&self.binary)
            .arg("-")
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ScriptFailure::new(format!("Failed to run osascript: {}", e)))?;

        // An early exit closes the pipe; keep going so stderr explains why.
        let mut write_error = None;
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(script.as_bytes()).await {
                log::warn!("[EXECUTE] Failed to send script: {}", e);
                write_error = Some(e);
            }
            // Dropping stdin closes the pipe so osascript starts compiling.
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ScriptFailure::new(format!("osascript did not finish: {}", e)))?;

        interpret(
            output.status.success(),
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
            write_error,
        )
    }
}

/// Turn a finished `osascript` run into a result. Stderr, when present,
/// beats a failed stdin write.
fn interpret(
    success: bool,
    stdout: &str,
    stderr: &str,
    write_error: Option<std::io::Error>,
) -> Result<String, ScriptFailure> {
    if !stderr.trim().is_empty() && (!success || write_error.is_some()) {
        return Err(ScriptFailure::from_stderr(stderr));
    }
    if let Some(e) = write_error {
        return Err(ScriptFailure::new(format!("Failed to send script: {}", e)));
    }
    if success {
        Ok(stdout.trim().to_string())
    } else {
        Err(ScriptFailure::new("osascript failed without an error message"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trailing_error_number() {
        let f = ScriptFailure::from_stderr(
            "0:87: execution error: Not authorized to send Apple events to Microsoft Excel. (-1743)\n",
        );
        assert_eq!(f.code, Some(-1743));
        assert!(f.message.ends_with("(-1743)"));
    }

    #[test]
    fn positive_codes_parse() {
        let f = ScriptFailure::from_stderr(
            "System Events got an error: osascript is not allowed to send keystrokes. (1002)",
        );
        assert_eq!(f.code, Some(1002));
    }

    #[test]
    fn no_number_means_no_code() {
        let f = ScriptFailure::from_stderr("syntax error: Expected end of line. ");
        assert_eq!(f.code, None);
        assert_eq!(f.message, "syntax error: Expected end of line.");
    }

    fn broken_pipe() -> Option<std::io::Error> {
        Some(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
    }

    #[test]
    fn stderr_beats_a_failed_write() {
        let f = interpret(
            false,
            "",
            "0:12: syntax error: Expected end of line but found identifier. (-2741)\n",
            broken_pipe(),
        )
        .unwrap_err();
        assert_eq!(f.code, Some(-2741));
        assert!(f.message.contains("Expected end of line"));
    }

    #[test]
    fn write_error_surfaces_when_stderr_is_empty() {
        let f = interpret(false, "", "  ", broken_pipe()).unwrap_err();
        assert!(f.message.starts_with("Failed to send script"));
        assert_eq!(f.code, None);
    }

    #[test]
    fn clean_run_returns_trimmed_stdout() {
        assert_eq!(interpret(true, "Made row 1 bold\n", "", None).unwrap(), "Made row 1 bold");
    }

    #[test]
    fn parenthesised_text_mid_message_is_not_a_code() {
        let f = ScriptFailure::from_stderr("Can't get range \"A(1)\" of sheet");
        assert_eq!(f.code, None);
    }
}
