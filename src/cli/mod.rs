//! Command-line surface.
//!
//! Each subcommand maps to one library operation; this module only parses
//! arguments and prints.

use clap::{Parser, Subcommand};

pub mod commands;

/// Tell Excel what to do in plain English
#[derive(Parser)]
#[command(name = "ask-excel")]
#[command(version, about = "Tell Microsoft Excel for Mac what to do in plain English")]
#[command(long_about = r#"
Common requests (bold the header, borders, autofit, currency, freeze panes...)
run a built-in AppleScript directly. Anything else is sent to the configured
AI provider, which writes the AppleScript.

PROVIDERS:
  claude   ANTHROPIC_API_KEY
  openai   OPENAI_API_KEY
  gemini   GEMINI_API_KEY
  ollama   local, no key (OLLAMA_HOST, OLLAMA_MODEL)

EXIT CODES:
  0 - Success
  1 - Failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an instruction against the active workbook
    Run(commands::RunArgs),

    /// Print the script an instruction would run, without running it
    Script(commands::ScriptArgs),

    /// Run a built-in script by id (see `quick` for the list)
    Builtin(commands::BuiltinArgs),

    /// Print the values of the current selection
    Read,

    /// Check that Excel answers
    Test,

    /// List ready-made instructions
    Quick,

    /// Show recent instructions
    History,

    /// List AI providers and whether they are configured
    Providers,

    /// Store an API key in the OS keychain
    #[command(name = "set-key")]
    SetKey(commands::SetKeyArgs),
}
