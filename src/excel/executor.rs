//! Script executor — activate Excel, settle, run, classify.

use std::sync::Arc;
use std::time::Duration;

use super::errors::classify;
use super::runner::ScriptRunner;
use crate::error::ExecutionError;

/// Pause after activation so the window server hands Excel focus before
/// the real script arrives.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

pub const ACTIVATE_SCRIPT: &str = r#"tell application "Microsoft Excel" to activate"#;

/// Result text used when a script ran but returned nothing.
pub const EMPTY_RESULT: &str = "Executed successfully";

pub struct ScriptExecutor {
    runner: Arc<dyn ScriptRunner>,
    settle_delay: Duration,
}

impl ScriptExecutor {
    pub fn new(runner: Arc<dyn ScriptRunner>) -> Self {
        Self {
            runner,
            settle_delay: SETTLE_DELAY,
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Bring Excel to the front. Failures are logged and ignored.
    async fn activate(&self) {
        if let Err(e) = self.runner.run(ACTIVATE_SCRIPT).await {
            log::warn!("[EXECUTE] Activation error (ignored): {}", e);
        }
        tokio::time::sleep(self.settle_delay).await;
    }

    /// Run a script against Excel and return its textual result.
    pub async fn execute(&self, script: &str) -> Result<String, ExecutionError> {
        log::debug!("[EXECUTE] Script:\n{}", script);
        self.activate().await;

        let start = std::time::Instant::now();
        match self.runner.run(script).await {
            Ok(result) => {
                log::info!(
                    "[EXECUTE] Script finished in {}ms: {}",
                    start.elapsed().as_millis(),
                    result.chars().take(120).collect::<String>()
                );
                if result.trim().is_empty() {
                    Ok(EMPTY_RESULT.to_string())
                } else {
                    Ok(result)
                }
            }
            Err(failure) => {
                let classified = classify(&failure);
                log::error!(
                    "[EXECUTE] Script error (code {:?}): {} -> {:?}",
                    failure.code,
                    failure.message,
                    classified
                );
                Err(classified)
            }
        }
    }
}
