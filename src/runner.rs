use tracing::{debug, info};

use crate::collector::PromptBatch;
use crate::config::Settings;
use crate::error::RunError;
use crate::gemini::ContentGenerator;

/// Submits `batch` as one request and returns the cleaned-up text of the first candidate.
///
/// The batch is joined with ". " and sent once; nothing is retried. An
/// answer without any candidate text is an error instead of a blank result.
pub async fn run<G: ContentGenerator>(
    batch: &PromptBatch,
    generator: &G,
    settings: &Settings,
) -> Result<String, RunError> {
    let text = batch.join();
    info!(model = %settings.model, prompts = batch.len(), "running generation");

    let response = generator.generate_content(&settings.model, &text).await?;
    if let Some(candidate) = response.candidates.first() {
        debug!(finish_reason = ?candidate.finish_reason, "first candidate");
    }

    let raw = response.first_text().ok_or(RunError::EmptyResponse)?;
    Ok(strip_emphasis(raw))
}

/// Removes every `*`, which the service uses for markdown emphasis.
pub fn strip_emphasis(text: &str) -> String {
    text.replace('*', "")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gemini::{Candidate, Content, GenerateContentResponse, Part};
    use std::cell::RefCell;
    use std::time::Duration;

    /// A canned service that records every request it receives.
    pub(crate) struct StubGenerator {
        replies: RefCell<Vec<Result<GenerateContentResponse, RunError>>>,
        pub(crate) requests: RefCell<Vec<(String, String)>>,
    }

    impl StubGenerator {
        pub(crate) fn new(replies: Vec<Result<GenerateContentResponse, RunError>>) -> Self {
            StubGenerator {
                replies: RefCell::new(replies),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl ContentGenerator for StubGenerator {
        async fn generate_content(
            &self,
            model: &str,
            text: &str,
        ) -> Result<GenerateContentResponse, RunError> {
            self.requests
                .borrow_mut()
                .push((model.to_string(), text.to_string()));
            let mut replies = self.replies.borrow_mut();
            if replies.is_empty() {
                return Err(RunError::EmptyResponse);
            }
            replies.remove(0)
        }
    }

    pub(crate) fn text_reply(text: &str) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    parts: vec![Part {
                        text: Some(text.to_string()),
                    }],
                    role: Some("model".to_string()),
                }),
                finish_reason: Some("STOP".to_string()),
            }],
            ..Default::default()
        }
    }

    fn settings() -> Settings {
        Settings {
            api_key: "k".to_string(),
            model: "gemini-test".to_string(),
        }
    }

    #[test]
    fn strips_all_asterisks() {
        assert_eq!(strip_emphasis("**bold**"), "bold");
        assert_eq!(strip_emphasis("* item\n* *x*"), " item\n x");
        assert_eq!(strip_emphasis("plain"), "plain");
    }

    #[tokio::test]
    async fn joins_batch_and_cleans_first_candidate() {
        let stub = StubGenerator::new(vec![Ok(text_reply("*Hi there*"))]);
        let batch: PromptBatch = ["a", "b", "c"].into_iter().collect();

        let text = run(&batch, &stub, &settings()).await.unwrap();
        assert_eq!(text, "Hi there");
        assert_eq!(
            stub.requests.borrow().as_slice(),
            [("gemini-test".to_string(), "a. b. c".to_string())]
        );
    }

    #[tokio::test]
    async fn missing_candidates_or_parts_is_empty_response() {
        let no_parts = GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content::default()),
                finish_reason: None,
            }],
            ..Default::default()
        };
        let stub = StubGenerator::new(vec![Ok(GenerateContentResponse::default()), Ok(no_parts)]);
        let batch: PromptBatch = ["hello"].into_iter().collect();

        for _ in 0..2 {
            let result = run(&batch, &stub, &settings()).await;
            assert!(matches!(result, Err(RunError::EmptyResponse)));
        }
    }

    #[tokio::test]
    async fn generator_errors_pass_through() {
        let stub = StubGenerator::new(vec![Err(RunError::Timeout(Duration::from_secs(30)))]);
        let batch: PromptBatch = ["hello"].into_iter().collect();

        let result = run(&batch, &stub, &settings()).await;
        assert!(matches!(result, Err(RunError::Timeout(_))));
        assert_eq!(stub.requests.borrow().len(), 1);
    }
}
