//! Instruction pipeline — one natural-language request end to end.
//!
//! check Excel → read context → built-in match or LLM generation →
//! sanitize → validate → execute → Outcome.
//!
//! Built-ins skip the LLM and validation. Generated scripts must carry both
//! markers before anything is sent to Excel. There are no retries; every
//! request ends in exactly one `Outcome`, and every state change is logged.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::PipelineError;
use crate::excel::{self, ContextSnapshot, ScriptExecutor, ScriptRunner};
use crate::history::HistoryStore;
use crate::llm::prompts::build_prompt;
use crate::llm::sanitize::{sanitize, validate};
use crate::llm::{CompletionBackend, Provider};
use crate::scripts::{match_instruction, BuiltinScript};

/// Results starting with this marker are failures reported by the script itself.
pub const SCRIPT_ERROR_MARKER: &str = "ERROR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    CheckingApp,
    ReadingContext,
    MatchedBuiltin,
    GeneratingScript,
    Sanitizing,
    Validating,
    Executing,
    Success,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::CheckingApp => "checking-app",
            PipelineState::ReadingContext => "reading-context",
            PipelineState::MatchedBuiltin => "matched-builtin",
            PipelineState::GeneratingScript => "generating-script",
            PipelineState::Sanitizing => "sanitizing",
            PipelineState::Validating => "validating",
            PipelineState::Executing => "executing",
            PipelineState::Success => "success",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Where the executed script came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScriptSource {
    BuiltIn(BuiltinScript),
    Generated(Provider),
}

impl fmt::Display for ScriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptSource::BuiltIn(b) => write!(f, "built-in ({})", b.label()),
            ScriptSource::Generated(p) => write!(f, "generated by {}", p.display_name()),
        }
    }
}

/// Terminal result of one instruction.
#[derive(Debug)]
pub enum Outcome {
    Success {
        result: String,
        script: String,
        source: ScriptSource,
        elapsed: Duration,
    },
    Failed {
        error: PipelineError,
        /// The script that was attempted, if one got that far.
        script: Option<String>,
        elapsed: Duration,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn script(&self) -> Option<&str> {
        match self {
            Outcome::Success { script, .. } => Some(script),
            Outcome::Failed { script, .. } => script.as_deref(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            Outcome::Success { elapsed, .. } | Outcome::Failed { elapsed, .. } => *elapsed,
        }
    }
}

/// A script ready to run, produced by `Pipeline::prepare`.
#[derive(Debug, Clone)]
pub struct PreparedScript {
    pub script: String,
    pub source: ScriptSource,
    pub context: ContextSnapshot,
}

/// Why `prepare` stopped before a runnable script existed.
#[derive(Debug)]
pub struct Rejection {
    pub error: PipelineError,
    /// Sanitized text that failed validation, when there was any.
    pub script: Option<String>,
}

impl Rejection {
    fn new(error: PipelineError) -> Self {
        Self { error, script: None }
    }
}

/// Logs every state change for one request.
struct Tracker {
    state: PipelineState,
}

impl Tracker {
    fn new() -> Self {
        Self {
            state: PipelineState::Idle,
        }
    }

    fn advance(&mut self, next: PipelineState) {
        log::info!("[PIPELINE] {} -> {}", self.state, next);
        self.state = next;
    }
}

pub struct Pipeline {
    runner: Arc<dyn ScriptRunner>,
    backend: Arc<dyn CompletionBackend>,
    executor: ScriptExecutor,
    history: Option<Arc<HistoryStore>>,
}

impl Pipeline {
    pub fn new(runner: Arc<dyn ScriptRunner>, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            executor: ScriptExecutor::new(runner.clone()),
            runner,
            backend,
            history: None,
        }
    }

    /// Record successful instructions in `store`.
    pub fn with_history(mut self, store: Arc<HistoryStore>) -> Self {
        self.history = Some(store);
        self
    }

    /// Override the pause between activating Excel and running the script.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.executor = ScriptExecutor::new(self.runner.clone()).with_settle_delay(delay);
        self
    }

    /// Resolve an instruction to a validated script without running it.
    pub async fn prepare(&self, instruction: &str) -> Result<PreparedScript, Rejection> {
        let mut tracker = Tracker::new();
        let prepared = self.prepare_tracked(instruction, &mut tracker).await;
        if prepared.is_err() {
            tracker.advance(PipelineState::Failed);
        }
        prepared
    }

    /// Run one instruction to completion.
    pub async fn run(&self, instruction: &str) -> Outcome {
        let start = Instant::now();
        let mut tracker = Tracker::new();
        log::info!("[PIPELINE] Instruction: {}", instruction);

        let outcome = match self.prepare_tracked(instruction, &mut tracker).await {
            Err(rejection) => Outcome::Failed {
                error: rejection.error,
                script: rejection.script,
                elapsed: start.elapsed(),
            },
            Ok(prepared) => {
                tracker.advance(PipelineState::Executing);
                self.execute(instruction, prepared, start).await
            }
        };

        match &outcome {
            Outcome::Success { elapsed, source, .. } => {
                tracker.advance(PipelineState::Success);
                log::info!("[PIPELINE] Done in {}ms ({})", elapsed.as_millis(), source);
            }
            Outcome::Failed { error, elapsed, .. } => {
                tracker.advance(PipelineState::Failed);
                log::warn!("[PIPELINE] Failed after {}ms: {}", elapsed.as_millis(), error);
            }
        }
        outcome
    }

    /// Run a catalog script by id, skipping the matcher and the LLM.
    pub async fn run_builtin(&self, builtin: BuiltinScript) -> Outcome {
        let start = Instant::now();
        let mut tracker = Tracker::new();
        log::info!("[PIPELINE] Built-in by id: {}", builtin.id());

        tracker.advance(PipelineState::CheckingApp);
        if !excel::is_running(self.runner.as_ref()).await {
            log::warn!("[PIPELINE] Excel not detected; running built-in anyway");
        }
        tracker.advance(PipelineState::MatchedBuiltin);
        let prepared = PreparedScript {
            script: builtin.script().to_string(),
            source: ScriptSource::BuiltIn(builtin),
            context: ContextSnapshot::Unavailable,
        };

        tracker.advance(PipelineState::Executing);
        let outcome = self.execute(builtin.label(), prepared, start).await;
        tracker.advance(if outcome.is_success() {
            PipelineState::Success
        } else {
            PipelineState::Failed
        });
        outcome
    }

    async fn prepare_tracked(
        &self,
        instruction: &str,
        tracker: &mut Tracker,
    ) -> Result<PreparedScript, Rejection> {
        tracker.advance(PipelineState::CheckingApp);
        let running = excel::is_running(self.runner.as_ref()).await;

        tracker.advance(PipelineState::ReadingContext);
        // Any `tell application "Microsoft Excel"` would launch it, so a
        // stopped Excel is never queried.
        let context = if running {
            excel::read_context(self.runner.as_ref()).await
        } else {
            ContextSnapshot::Unavailable
        };
        let unreachable = !running && context.is_degraded();
        log::info!("[PIPELINE] Context: {}", context);

        if let Some(builtin) = match_instruction(instruction) {
            tracker.advance(PipelineState::MatchedBuiltin);
            if unreachable {
                log::warn!("[PIPELINE] Excel not detected; running built-in anyway");
            }
            log::info!("[PIPELINE] Using built-in script: {}", builtin.label());
            return Ok(PreparedScript {
                script: builtin.script().to_string(),
                source: ScriptSource::BuiltIn(builtin),
                context,
            });
        }

        if unreachable {
            return Err(Rejection::new(PipelineError::ApplicationUnreachable));
        }

        tracker.advance(PipelineState::GeneratingScript);
        let provider = self.backend.provider();
        let prompt = build_prompt(instruction, &context.to_string());
        let raw = self
            .backend
            .complete(&prompt)
            .await
            .map_err(|e| Rejection::new(e.into()))?;

        tracker.advance(PipelineState::Sanitizing);
        let script = sanitize(&raw);

        tracker.advance(PipelineState::Validating);
        if !validate(&script) {
            log::warn!(
                "[PIPELINE] Generated text has no script markers: {}",
                script.chars().take(200).collect::<String>()
            );
            return Err(Rejection {
                error: PipelineError::InvalidGeneratedScript,
                script: Some(script),
            });
        }

        Ok(PreparedScript {
            script,
            source: ScriptSource::Generated(provider),
            context,
        })
    }

    async fn execute(&self, instruction: &str, prepared: PreparedScript, start: Instant) -> Outcome {
        let PreparedScript { script, source, .. } = prepared;
        match self.executor.execute(&script).await {
            Ok(result) if result.trim_start().starts_with(SCRIPT_ERROR_MARKER) => Outcome::Failed {
                error: PipelineError::ScriptReported(result.trim().to_string()),
                script: Some(script),
                elapsed: start.elapsed(),
            },
            Ok(result) => {
                self.remember(instruction);
                Outcome::Success {
                    result,
                    script,
                    source,
                    elapsed: start.elapsed(),
                }
            }
            Err(e) => Outcome::Failed {
                error: e.into(),
                script: Some(script),
                elapsed: start.elapsed(),
            },
        }
    }

    fn remember(&self, instruction: &str) {
        if let Some(store) = &self.history {
            if let Err(e) = store.record(instruction) {
                log::warn!("[HISTORY] Failed to record instruction: {}", e);
            }
        }
    }
}
