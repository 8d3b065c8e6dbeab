use std::io::{BufRead, Write};

use colored::Colorize;
use tracing::debug;

use crate::error::CollectError;

pub const QUIT_SENTINEL: &str = "q";
pub const FINISH_SENTINEL: &str = "done";

/// The prompts entered during one collection cycle, in the order they were typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptBatch(Vec<String>);

impl PromptBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, prompt: impl Into<String>) {
        self.0.push(prompt.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn prompts(&self) -> &[String] {
        &self.0
    }

    /// Joins every prompt with ". " into the single text sent upstream.
    /// Prompt boundaries are not recoverable afterwards.
    pub fn join(&self) -> String {
        self.0.join(". ")
    }
}

impl<S: Into<String>> FromIterator<S> for PromptBatch {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        PromptBatch(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    /// The batch holds at least one prompt and should be submitted.
    Proceed,
    /// The user finished without entering anything.
    Abort,
    /// The user asked to leave the whole session.
    Quit,
}

/// Reads lines from `input` until a sentinel shows up.
///
/// Blank lines are rejected with a notice on `out`; every other line is
/// trimmed and appended to the batch. Running out of input before a sentinel
/// is an error rather than an implicit finish.
pub fn collect<R, W>(input: &mut R, out: &mut W) -> Result<(PromptBatch, SessionSignal), CollectError>
where
    R: BufRead,
    W: Write,
{
    let mut batch = PromptBatch::new();
    let mut line = String::new();

    loop {
        write!(out, "Enter your prompt: ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(CollectError::InputExhausted);
        }
        let entry = line.trim();

        if entry == QUIT_SENTINEL {
            debug!(discarded = batch.len(), "quit during collection");
            return Ok((PromptBatch::new(), SessionSignal::Quit));
        }

        if entry == FINISH_SENTINEL {
            if batch.is_empty() {
                writeln!(out, "{}", "No prompts entered. Exiting.".red())?;
                return Ok((batch, SessionSignal::Abort));
            }
            debug!(prompts = batch.len(), "collection finished");
            return Ok((batch, SessionSignal::Proceed));
        }

        if entry.is_empty() {
            writeln!(out, "{}", "Prompt cannot be empty. Please try again.".red())?;
            continue;
        }

        writeln!(out, "{}", format!("Prompt added: {}", entry).cyan())?;
        batch.push(entry);
    }
}
