//! Subcommand handlers.

use std::sync::Arc;

use clap::Args;

use ask_excel::excel::{read_selection, Osascript, ScriptRunner};
use ask_excel::history::HistoryStore;
use ask_excel::llm::{all_providers, AiClient, Provider};
use ask_excel::scripts::{BuiltinScript, CATALOG_ONLY, QUICK_ACTIONS};
use ask_excel::settings::{save_api_key, Settings};
use ask_excel::{report, Outcome, Pipeline};

/// Outcome of a subcommand: `Ok` exits 0, `Err` prints and exits 1.
pub type CommandResult = Result<(), String>;

#[derive(Args)]
pub struct RunArgs {
    /// What to do, e.g. "bold the header row"
    #[arg(required = true)]
    pub instruction: Vec<String>,

    /// AI provider for this run (claude, openai, gemini, ollama)
    #[arg(short, long, env = "LLM_PROVIDER")]
    pub provider: Option<Provider>,

    /// Print a single status line instead of the full report
    #[arg(short, long)]
    pub brief: bool,

    /// Copy the executed script to the clipboard
    #[arg(short, long)]
    pub copy: bool,
}

#[derive(Args)]
pub struct ScriptArgs {
    #[arg(required = true)]
    pub instruction: Vec<String>,

    #[arg(short, long, env = "LLM_PROVIDER")]
    pub provider: Option<Provider>,
}

#[derive(Args)]
pub struct BuiltinArgs {
    /// Built-in id, e.g. italic_selection
    pub id: BuiltinScript,

    #[arg(short, long)]
    pub brief: bool,
}

#[derive(Args)]
pub struct SetKeyArgs {
    pub provider: Provider,
    pub key: String,
}

fn load_settings(provider: Option<Provider>) -> Result<Settings, String> {
    let mut settings = Settings::load().map_err(|e| e.to_string())?;
    if let Some(p) = provider {
        settings.provider = p;
    }
    Ok(settings)
}

fn build_pipeline(settings: &Settings, with_history: bool) -> Pipeline {
    let runner: Arc<dyn ScriptRunner> = Arc::new(Osascript::new());
    let pipeline = Pipeline::new(runner, Arc::new(AiClient::new(settings)));
    if !with_history {
        return pipeline;
    }
    match HistoryStore::default_location() {
        Ok(store) => pipeline.with_history(Arc::new(store)),
        Err(e) => {
            log::warn!("[HISTORY] Disabled: {}", e);
            pipeline
        }
    }
}

fn copy_to_clipboard(text: &str) -> Result<(), String> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| e.to_string())?;
    clipboard.set_text(text).map_err(|e| e.to_string())?;
    log::info!("[CLI] Copied {} chars to clipboard", text.len());
    Ok(())
}

pub async fn run(args: RunArgs) -> CommandResult {
    let instruction = args.instruction.join(" ");
    let settings = load_settings(args.provider)?;
    let outcome = build_pipeline(&settings, true).run(&instruction).await;

    if args.brief {
        println!("{}", report::brief(&outcome, &instruction));
    } else {
        println!("{}", report::detail(&outcome));
    }

    if args.copy {
        if let Some(script) = outcome.script() {
            if let Err(e) = copy_to_clipboard(script) {
                eprintln!("Could not copy script: {}", e);
            }
        }
    }

    finish(outcome)
}

fn finish(outcome: Outcome) -> CommandResult {
    match outcome {
        Outcome::Success { .. } => Ok(()),
        Outcome::Failed { error, .. } => Err(error.to_string()),
    }
}

pub async fn script(args: ScriptArgs) -> CommandResult {
    let instruction = args.instruction.join(" ");
    let settings = load_settings(args.provider)?;
    match build_pipeline(&settings, false).prepare(&instruction).await {
        Ok(prepared) => {
            eprintln!("-- {} | {}", prepared.source, prepared.context);
            println!("{}", prepared.script);
            Ok(())
        }
        Err(rejection) => {
            if let Some(text) = rejection.script {
                eprintln!("{}", text);
            }
            Err(rejection.error.to_string())
        }
    }
}

pub async fn builtin(args: BuiltinArgs) -> CommandResult {
    let settings = load_settings(None)?;
    let outcome = build_pipeline(&settings, false).run_builtin(args.id).await;
    if args.brief {
        println!("{}", report::brief(&outcome, args.id.label()));
    } else {
        println!("{}", report::detail(&outcome));
    }
    finish(outcome)
}

pub async fn read() -> CommandResult {
    let runner = Osascript::new();
    let text = read_selection(&runner).await.map_err(|e| e.to_string())?;
    println!("{}", text);
    Ok(())
}

pub async fn test() -> CommandResult {
    run(RunArgs {
        instruction: vec![QUICK_ACTIONS[0].instruction.to_string()],
        provider: None,
        brief: true,
        copy: false,
    })
    .await
}

pub fn quick() -> CommandResult {
    for action in QUICK_ACTIONS {
        println!("{:<18} ask-excel run \"{}\"", action.title, action.instruction);
    }
    println!();
    println!("No keyword rule; run by id:");
    for builtin in CATALOG_ONLY {
        println!("{:<18} ask-excel builtin {}", builtin.label(), builtin.id());
    }
    Ok(())
}

pub fn history() -> CommandResult {
    let store = HistoryStore::default_location().map_err(|e| e.to_string())?;
    let entries = store.entries().map_err(|e| e.to_string())?;
    if entries.is_empty() {
        println!("No history yet.");
    }
    for (i, entry) in entries.iter().enumerate() {
        println!("{:>2}. {}", i + 1, entry.instruction);
    }
    Ok(())
}

pub fn providers() -> CommandResult {
    let settings = Settings::load().map_err(|e| e.to_string())?;
    for info in all_providers() {
        let provider = info.provider;
        let model = match provider {
            Provider::Ollama => settings.ollama_model.as_str(),
            _ => info.model,
        };
        let status = if settings.is_configured(provider) { "ready" } else { "no key" };
        let active = if provider == settings.provider { "*" } else { " " };
        println!(
            "{} {:<8} {:<8} {:<20} {}",
            active,
            info.id,
            status,
            model,
            info.env_key.unwrap_or("-")
        );
    }
    Ok(())
}

pub fn set_key(args: SetKeyArgs) -> CommandResult {
    save_api_key(args.provider, args.key.trim()).map_err(|e| e.to_string())?;
    println!("Saved {} key to the keychain.", args.provider.display_name());
    Ok(())
}
