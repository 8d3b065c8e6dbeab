mod banner;
mod cli;
mod collector;
mod config;
mod error;
mod gemini;
mod logging;
mod runner;
mod session;

use std::io;
use std::process::exit;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use cli::{Cli, Command, SetTarget};
use config::Settings;
use gemini::GeminiClient;
use session::Session;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A local .env may supply GEMINI_API_KEY / GEMINI_MODEL.
    dotenv::dotenv().ok();

    let cli = Cli::from_cli();
    if let Err(e) = logging::init_logging(cli.verbose) {
        eprintln!("WARNING: logging disabled: {}", e);
    }
    banner::print_banner();

    // The credential is checked before anything interactive starts.
    let settings = if cli.needs_credential() {
        match Settings::load(cli.model.as_deref()) {
            Ok(settings) => Some(settings),
            Err(e) => {
                eprintln!("{}", format!("Error: {}", e).red());
                eprintln!(
                    "{}",
                    "Please set your API key using: geminiz set key <YOUR-API-KEY>".yellow()
                );
                exit(1);
            }
        }
    } else {
        None
    };

    let timeout = cli.request_timeout();
    if let Err(e) = dispatch(cli.command, settings, timeout).await {
        eprintln!("{}", format!("ERROR: {:#}", e).red());
        exit(1);
    }
}

async fn dispatch(command: Command, settings: Option<Settings>, timeout: Duration) -> Result<()> {
    match command {
        Command::Set {
            target: SetTarget::Key { api_key },
        } => {
            let path = config::save_api_key(&api_key).context("failed to save API key")?;
            tracing::info!(path = %path.display(), "API key stored");
            println!("{}", "API key successfully set!".green());
        }
        Command::Prompt => {
            let settings = settings.context("no settings loaded for the prompt command")?;
            let client = GeminiClient::new(settings.api_key.clone()).with_timeout(timeout);
            let stdin = io::stdin().lock();
            Session::new(stdin, io::stdout(), &client, &settings)
                .run()
                .await
                .context("prompt session ended unexpectedly")?;
        }
    }
    Ok(())
}
