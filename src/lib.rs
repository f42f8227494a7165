//! ask-excel — natural-language instructions for Microsoft Excel on macOS.
//!
//! Library root. The binary in `main.rs` only parses arguments and wires
//! these modules together.
//!
//!   - scripts   — built-in AppleScript catalog + keyword matcher
//!   - llm       — prompt, provider adapters, response sanitizer
//!   - excel     — osascript runner, context/selection reads, executor
//!   - pipeline  — orchestrator producing one `Outcome` per instruction
//!   - settings  — provider + credential resolution
//!   - history   — recent instructions
//!   - report    — outcome rendering

pub mod error;
pub mod excel;
pub mod history;
pub mod llm;
pub mod pipeline;
pub mod report;
pub mod scripts;
pub mod settings;

pub use error::PipelineError;
pub use pipeline::{Outcome, Pipeline, ScriptSource};
pub use settings::Settings;

/// Start `env_logger`, defaulting to `info` for this crate.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "ask_excel=debug" } else { "ask_excel=info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_millis()
        .try_init();
}
