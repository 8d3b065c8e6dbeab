use std::io::{BufRead, Write};

use colored::Colorize;
use tracing::debug;

use crate::collector::{self, SessionSignal, QUIT_SENTINEL};
use crate::config::Settings;
use crate::error::CollectError;
use crate::gemini::ContentGenerator;
use crate::runner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Collecting,
    Confirming,
    Done,
}

/// The interactive collect, generate, confirm loop.
///
/// Only one request is ever in flight; a failed generation is reported and
/// the loop carries on, while a broken input stream ends it.
pub struct Session<'a, R, W, G> {
    input: R,
    out: W,
    generator: &'a G,
    settings: &'a Settings,
}

impl<'a, R, W, G> Session<'a, R, W, G>
where
    R: BufRead,
    W: Write,
    G: ContentGenerator,
{
    pub fn new(input: R, out: W, generator: &'a G, settings: &'a Settings) -> Self {
        Session {
            input,
            out,
            generator,
            settings,
        }
    }

    pub async fn run(&mut self) -> Result<(), CollectError> {
        let mut state = State::Collecting;
        while state != State::Done {
            debug!(?state, "session state");
            state = match state {
                State::Collecting => self.collect_and_generate().await?,
                State::Confirming => self.confirm()?,
                State::Done => State::Done,
            };
        }
        Ok(())
    }

    async fn collect_and_generate(&mut self) -> Result<State, CollectError> {
        writeln!(
            self.out,
            "{}",
            "Enter your prompts one by one. Type 'done' to finish and generate, or 'q' to exit.\n"
                .yellow()
        )?;

        let (batch, signal) = collector::collect(&mut self.input, &mut self.out)?;
        match signal {
            SessionSignal::Quit => {
                self.goodbye()?;
                return Ok(State::Done);
            }
            SessionSignal::Abort => return Ok(State::Done),
            SessionSignal::Proceed => {}
        }

        writeln!(self.out, "{}", "\nGenerating response for all prompts...\n".green())?;
        writeln!(self.out, "{}", format!("Your full prompt: {}", batch.join()).green())?;

        match runner::run(&batch, self.generator, self.settings).await {
            Ok(text) => {
                writeln!(self.out, "{}", "\nGenerated Response:\n".yellow())?;
                writeln!(self.out, "{}", text.white())?;
            }
            Err(e) => {
                debug!(error = %e, "generation failed");
                writeln!(self.out, "{}", format!("Error generating response: {}", e).red())?;
            }
        }
        Ok(State::Confirming)
    }

    fn confirm(&mut self) -> Result<State, CollectError> {
        write!(
            self.out,
            "\nDo you want to continue? (Type 'q' to quit, or press Enter to continue): "
        )?;
        self.out.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read > 0 && line.trim() == QUIT_SENTINEL {
            self.goodbye()?;
            return Ok(State::Done);
        }
        Ok(State::Collecting)
    }

    fn goodbye(&mut self) -> Result<(), CollectError> {
        writeln!(self.out, "{}", "Exiting Geminiz. Goodbye!".green())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RunError;
    use crate::runner::tests::{text_reply, StubGenerator};
    use std::io::Cursor;

    fn settings() -> Settings {
        Settings {
            api_key: "k".to_string(),
            model: "gemini-test".to_string(),
        }
    }

    async fn drive(input: &str, stub: &StubGenerator) -> (Result<(), CollectError>, String) {
        let settings = settings();
        let mut out = Vec::new();
        let result = Session::new(Cursor::new(input.as_bytes().to_vec()), &mut out, stub, &settings)
            .run()
            .await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn single_prompt_is_generated_and_rendered() {
        let stub = StubGenerator::new(vec![Ok(text_reply("*Hi there*"))]);
        let (result, out) = drive("hello\ndone\nq\n", &stub).await;

        assert!(result.is_ok());
        assert_eq!(
            stub.requests.borrow().as_slice(),
            [("gemini-test".to_string(), "hello".to_string())]
        );
        assert!(out.contains("Hi there"));
        assert!(!out.contains("*Hi there*"));
        assert!(out.contains("Goodbye"));
    }

    #[tokio::test]
    async fn padded_quit_at_confirmation_ends_session() {
        let stub = StubGenerator::new(vec![Ok(text_reply("hi"))]);
        let (result, out) = drive("hello\ndone\n  q \nnever\ndone\n", &stub).await;

        assert!(result.is_ok());
        assert_eq!(stub.requests.borrow().len(), 1);
        assert!(out.contains("Goodbye"));
    }

    #[tokio::test]
    async fn quit_while_collecting_sends_nothing() {
        let stub = StubGenerator::new(vec![]);
        let (result, _) = drive("hello\nq\n", &stub).await;

        assert!(result.is_ok());
        assert!(stub.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn finishing_empty_batch_ends_session() {
        let stub = StubGenerator::new(vec![]);
        let (result, out) = drive("done\nhello\ndone\n", &stub).await;

        assert!(result.is_ok());
        assert!(stub.requests.borrow().is_empty());
        assert!(out.contains("No prompts entered"));
    }

    #[tokio::test]
    async fn failed_generation_keeps_session_alive() {
        let stub = StubGenerator::new(vec![Err(RunError::EmptyResponse), Ok(text_reply("second"))]);
        let (result, out) = drive("one\ndone\n\ntwo\nthree\ndone\nq\n", &stub).await;

        assert!(result.is_ok());
        assert!(out.contains("Error generating response"));
        assert!(out.contains("second"));
        assert_eq!(
            stub.requests.borrow().as_slice(),
            [
                ("gemini-test".to_string(), "one".to_string()),
                ("gemini-test".to_string(), "two. three".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn end_of_input_at_confirmation_returns_to_collecting() {
        let stub = StubGenerator::new(vec![Ok(text_reply("hi"))]);
        let (result, _) = drive("hello\ndone\n", &stub).await;

        // Confirmation sees end of input and loops back; collection then fails.
        assert!(matches!(result, Err(CollectError::InputExhausted)));
        assert_eq!(stub.requests.borrow().len(), 1);
    }

    #[tokio::test]
    async fn end_of_input_while_collecting_is_fatal() {
        let stub = StubGenerator::new(vec![]);
        let (result, _) = drive("hello\n", &stub).await;

        assert!(matches!(result, Err(CollectError::InputExhausted)));
        assert!(stub.requests.borrow().is_empty());
    }
}
