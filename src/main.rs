//! ask-excel CLI entry point.
//!
//! Exit codes: 0 on success, 1 on any failure.

use std::process::ExitCode;

use clap::Parser;

mod cli;

use cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    ask_excel::settings::load_dotenv();
    let cli = Cli::parse();
    ask_excel::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => commands::run(args).await,
        Commands::Script(args) => commands::script(args).await,
        Commands::Builtin(args) => commands::builtin(args).await,
        Commands::Read => commands::read().await,
        Commands::Test => commands::test().await,
        Commands::Quick => commands::quick(),
        Commands::History => commands::history(),
        Commands::Providers => commands::providers(),
        Commands::SetKey(args) => commands::set_key(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
