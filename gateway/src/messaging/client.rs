//! Outbound client for the messaging API.

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing;

use super::types::{OutboundMessage, UpstreamResponse};
use crate::Config;

/// Transport-level failures talking to the messaging API.
///
/// Non-200 responses are not errors at this layer; they come back as an
/// [`UpstreamResponse`] for the caller to interpret.
#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to messaging API failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("failed to read messaging API response: {0}")]
    Body(#[source] reqwest::Error),
}

/// Sends template and free-text messages through the messaging API.
#[derive(Debug, Clone)]
pub struct MessagingClient {
    messages_url: String,
    access_token: String,
}

impl MessagingClient {
    pub fn new(messages_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            messages_url: messages_url.into(),
            access_token: access_token.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.messages_url(), config.meta_access_token.clone())
    }

    /// Send a pre-registered template message.
    pub async fn send_template(
        &self,
        to: &str,
        template_name: &str,
        language_code: &str,
    ) -> Result<UpstreamResponse, MessagingError> {
        self.send(&OutboundMessage::template(to, template_name, language_code))
            .await
    }

    /// Send a free-form text message.
    pub async fn send_free_text(
        &self,
        to: &str,
        text: &str,
    ) -> Result<UpstreamResponse, MessagingError> {
        self.send(&OutboundMessage::free_text(to, text)).await
    }

    /// POST one payload and return the raw downstream status and body.
    ///
    /// A client is built per call and dropped afterwards, so no connection
    /// outlives the request that opened it.
    pub async fn send(&self, message: &OutboundMessage) -> Result<UpstreamResponse, MessagingError> {
        tracing::info!(
            kind = message.kind(),
            to = %message.to,
            url = %self.messages_url,
            "outbound_message_sending"
        );

        let client = Client::builder().build().map_err(MessagingError::Client)?;

        let resp = client
            .post(&self.messages_url)
            .bearer_auth(&self.access_token)
            .json(message)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    tracing::error!(kind = message.kind(), error = %e, "outbound_message_timeout");
                } else {
                    tracing::error!(kind = message.kind(), error = %e, "outbound_message_request_error");
                }
                MessagingError::Request(e)
            })?;

        let status = resp.status().as_u16();
        let raw = resp.text().await.map_err(MessagingError::Body)?;

        // Non-JSON error pages are forwarded as a JSON string.
        let body = serde_json::from_str::<Value>(&raw).unwrap_or(Value::String(raw));

        let response = UpstreamResponse { status, body };

        if response.is_success() {
            tracing::info!(
                kind = message.kind(),
                to = %message.to,
                status_code = status,
                "outbound_message_sent"
            );
        } else {
            tracing::warn!(
                kind = message.kind(),
                to = %message.to,
                status_code = status,
                "outbound_message_rejected"
            );
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeMessagingApi;
    use serde_json::json;

    #[tokio::test]
    async fn test_send_free_text_posts_once() {
        let api = FakeMessagingApi::start(200, json!({"messages": [{"id": "wamid.1"}]})).await;
        let client = MessagingClient::new(api.messages_url("PHONE123"), "meta-token");

        let resp = client.send_free_text("5215512345678", "hola").await.unwrap();

        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, json!({"messages": [{"id": "wamid.1"}]}));

        let requests = api.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.path, "/PHONE123/messages");
        assert_eq!(req.authorization.as_deref(), Some("Bearer meta-token"));
        assert_eq!(req.body["type"], "text");
        assert_eq!(req.body["text"]["body"], "hola");
        assert_eq!(req.body["messaging_product"], "whatsapp");
        assert_eq!(req.body["to"], "5215512345678");
    }

    #[tokio::test]
    async fn test_send_template_payload() {
        let api = FakeMessagingApi::start(200, json!({"ok": true})).await;
        let client = MessagingClient::new(api.messages_url("PHONE123"), "meta-token");

        client
            .send_template("5215512345678", "hello_world", "en_US")
            .await
            .unwrap();

        let requests = api.requests();
        assert_eq!(requests.len(), 1);
        let body = &requests[0].body;
        assert_eq!(body["type"], "template");
        assert_eq!(body["template"]["name"], "hello_world");
        assert_eq!(body["template"]["language"]["code"], "en_US");
    }

    #[tokio::test]
    async fn test_non_200_is_returned_not_raised() {
        let error = json!({"error": {"message": "Invalid parameter", "code": 100}});
        let api = FakeMessagingApi::start(400, error.clone()).await;
        let client = MessagingClient::new(api.messages_url("PHONE123"), "meta-token");

        let resp = client.send_free_text("1", "x").await.unwrap();
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body, error);
        assert!(!resp.is_success());
    }

    #[tokio::test]
    async fn test_unreachable_api_is_request_error() {
        // Port 9 (discard) on localhost is not expected to be listening.
        let client = MessagingClient::new("http://127.0.0.1:9/PHONE/messages", "t");
        let err = client.send_free_text("1", "x").await.unwrap_err();
        assert!(matches!(err, MessagingError::Request(_)));
    }
}
