//! Outbound side-channel capabilities: push delivery and text generation.
//! Both are best-effort from the services' point of view; a failure here is
//! logged and never turns a committed operation into a reported failure.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Notification {
    pub title: String,
    pub content: String,
}

impl Notification {
    #[must_use]
    pub fn booking_created(post_title: &str) -> Self {
        Self {
            title: "New booking!".to_owned(),
            content: format!("\"{post_title}\" has been booked."),
        }
    }
}

#[derive(Debug, Error)]
#[error("Notification delivery failed: {0}")]
pub struct NotifyError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, token: &str, notification: &Notification) -> Result<(), NotifyError>;
}

#[derive(Debug, Error)]
#[error("Text generation failed: {0}")]
pub struct TextGenError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

/// Produces the free-text enrichments of a post (summary and quote) from
/// its title and author.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn brief_description(&self, title: &str, author: &str) -> Result<String, TextGenError>;
    async fn quote(&self, title: &str, author: &str) -> Result<String, TextGenError>;
}
