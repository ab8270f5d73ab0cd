use async_trait::async_trait;
use pageturn_core::gateway::{Notification, Notifier, NotifyError};
use serde::Serialize;

/// Delivers push notifications through the configured HTTP gateway.
/// Delivery failures surface as [`NotifyError`] and are swallowed (logged)
/// by the caller.
pub struct PushGateway {
    http: reqwest::Client,
    url: String,
    key: String,
}

impl PushGateway {
    #[must_use]
    pub fn new(url: String, key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            key,
        }
    }
}

#[derive(Serialize)]
struct PushMessage<'a> {
    token: &'a str,
    title: &'a str,
    body: &'a str,
}

#[async_trait]
impl Notifier for PushGateway {
    async fn send(&self, token: &str, notification: &Notification) -> Result<(), NotifyError> {
        let message = PushMessage {
            token,
            title: &notification.title,
            body: &notification.content,
        };

        self.http
            .post(&self.url)
            .bearer_auth(&self.key)
            .json(&message)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| NotifyError(Box::new(err)))?;

        Ok(())
    }
}
