use std::time::Duration;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(
    name = "geminiz",
    version = "0.1.0",
    about = "A CLI tool for interacting with Google's Gemini AI model.",
    long_about = "Geminiz collects prompts one by one, joins them and asks Google's Gemini model \
                  for a response. The API key is read from 'GEMINI_API_KEY' or from the file \
                  written by 'geminiz set key'."
)]
pub struct Cli {
    #[clap(
        long,
        global = true,
        value_name = "MODEL_ID",
        help = "Sets the model to use; if absent, the envvar 'GEMINI_MODEL' is checked"
    )]
    pub model: Option<String>,

    #[clap(
        long,
        global = true,
        value_name = "SECS",
        help = "Sets how long a single generation request may take",
        default_value_t = 30
    )]
    pub timeout: u64,

    #[clap(
        short('v'),
        long,
        global = true,
        help = "Enable verbose output",
        default_value_t = false
    )]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate text using generative AI models
    Prompt,

    /// Set configuration for Geminiz
    Set {
        #[clap(subcommand)]
        target: SetTarget,
    },
}

#[derive(Debug, Subcommand)]
pub enum SetTarget {
    /// Set the GEMINI_API_KEY
    Key {
        #[clap(value_name = "API_KEY")]
        api_key: String,
    },
}

impl Cli {
    pub fn from_cli() -> Self {
        Cli::parse()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Whether the chosen command needs a stored credential to run.
    pub fn needs_credential(&self) -> bool {
        !matches!(self.command, Command::Set { .. })
    }
}
