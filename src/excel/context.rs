//! Live Excel state — is it running, and what is selected.

use std::fmt;
use std::time::Duration;

use super::runner::ScriptRunner;

/// Context reads must not hold up the request for long.
pub const CONTEXT_TIMEOUT: Duration = Duration::from_secs(2);

pub const IS_RUNNING_SCRIPT: &str =
    r#"tell application "System Events" to return (name of processes) contains "Microsoft Excel""#;

pub const CONTEXT_SCRIPT: &str = r#"tell application "Microsoft Excel"
  if not (exists active workbook) then return "No workbook"
  tell active sheet
    set sel to selection
    return "Sheet: " & name & ", Selection: " & (get address of sel)
  end tell
end tell"#;

/// Snapshot of Excel state for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextSnapshot {
    /// `Sheet: <name>, Selection: <address>`
    Ready(String),
    NoWorkbook,
    /// Excel busy, not scriptable, or the read timed out.
    Unavailable,
}

impl ContextSnapshot {
    /// True when the snapshot says nothing useful about the sheet.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, ContextSnapshot::Ready(_))
    }
}

impl fmt::Display for ContextSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextSnapshot::Ready(text) => f.write_str(text),
            ContextSnapshot::NoWorkbook => f.write_str("No workbook"),
            ContextSnapshot::Unavailable => f.write_str("Context unavailable (Excel busy)"),
        }
    }
}

/// Ask System Events whether Excel has a process. Errors read as "no".
pub async fn is_running(runner: &dyn ScriptRunner) -> bool {
    match runner.run(IS_RUNNING_SCRIPT).await {
        Ok(out) => out.trim() == "true",
        Err(e) => {
            log::warn!("[CONTEXT] Running check failed: {}", e);
            false
        }
    }
}

/// Read the active sheet and selection, giving up after `CONTEXT_TIMEOUT`.
pub async fn read_context(runner: &dyn ScriptRunner) -> ContextSnapshot {
    read_context_within(runner, CONTEXT_TIMEOUT).await
}

pub async fn read_context_within(runner: &dyn ScriptRunner, limit: Duration) -> ContextSnapshot {
    let snapshot = match tokio::time::timeout(limit, runner.run(CONTEXT_SCRIPT)).await {
        Ok(Ok(out)) => {
            let out = out.trim();
            if out.is_empty() {
                ContextSnapshot::Unavailable
            } else if out == "No workbook" {
                ContextSnapshot::NoWorkbook
            } else {
                ContextSnapshot::Ready(out.to_string())
            }
        }
        Ok(Err(e)) => {
            log::warn!("[CONTEXT] Read failed: {}", e);
            ContextSnapshot::Unavailable
        }
        Err(_) => {
            log::warn!("[CONTEXT] Read timed out after {}ms", limit.as_millis());
            ContextSnapshot::Unavailable
        }
    };
    log::info!("[CONTEXT] {}", snapshot);
    snapshot
}
