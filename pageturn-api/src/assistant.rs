use async_trait::async_trait;
use pageturn_core::gateway::{TextGenError, TextGenerator};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_COMPLETION_TOKENS: u32 = 300;

/// Chat-completions client generating post enrichment texts. The endpoint
/// and model are configuration; nothing here depends on a specific vendor.
pub struct AssistantClient {
    http: reqwest::Client,
    url: String,
    key: String,
    model: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [RequestMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Error)]
#[error("The completion response contained no choices")]
struct EmptyCompletionError;

impl AssistantClient {
    #[must_use]
    pub fn new(url: String, key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            key,
            model,
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, TextGenError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: [RequestMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        let response: CompletionResponse = self
            .http
            .post(&self.url)
            .bearer_auth(&self.key)
            .json(&request)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| TextGenError(Box::new(err)))?
            .json()
            .await
            .map_err(|err| TextGenError(Box::new(err)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(TextGenError(Box::new(EmptyCompletionError)))?;

        Ok(choice.message.content.trim().to_owned())
    }
}

#[async_trait]
impl TextGenerator for AssistantClient {
    async fn brief_description(&self, title: &str, author: &str) -> Result<String, TextGenError> {
        self.complete(&format!(
            "Write a short, spoiler-free teaser of two or three sentences \
             for the book \"{title}\" by {author}."
        ))
        .await
    }

    async fn quote(&self, title: &str, author: &str) -> Result<String, TextGenError> {
        self.complete(&format!(
            "Give one short memorable quote from the book \"{title}\" by {author}, \
             without commentary."
        ))
        .await
    }
}
