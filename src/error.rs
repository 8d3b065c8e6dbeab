use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading prompts from the line source. All of these end the session.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("input ended before 'done' or 'q' was entered")]
    InputExhausted,
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}

/// Failures of a single generation request. The session reports these and keeps going.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to initialize the Gemini client: {0}")]
    ClientInit(#[source] reqwest::Error),
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("request to the Gemini API failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("failed to parse API response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("the API returned no candidate text")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API key not found. Use 'geminiz set key <GEMINI_API_KEY>' to set it")]
    MissingApiKey,
    #[error("API key cannot be empty")]
    EmptyApiKey,
    #[error("unable to determine config directory")]
    NoConfigDir,
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
