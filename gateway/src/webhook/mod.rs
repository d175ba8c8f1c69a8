//! Inbound webhook processing.
//!
//! The HTTP layer hands the parsed JSON body to a [`WebhookProcessor`] and
//! returns whatever it produces. Real event handling is plugged in by the
//! embedding application; [`AckProcessor`] is the bundled default.
//!
//! ## Processing Flow
//!
//! ```text
//! POST /webhook/ → JSON body → WebhookProcessor::process() → response body
//! ```

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;

/// Errors a processor may report. All map to HTTP 400.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("{0}")]
    Processing(String),
}

/// Capability for interpreting inbound webhook events.
#[async_trait]
pub trait WebhookProcessor: Send + Sync {
    async fn process(&self, payload: Value) -> Result<Value, WebhookError>;
}

/// Default processor: validates the WhatsApp Cloud API envelope, logs a
/// summary and acknowledges receipt.
#[derive(Debug, Clone, Default)]
pub struct AckProcessor;

/// Counts extracted from a webhook envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvelopeSummary {
    pub entries: usize,
    pub messages: usize,
    pub statuses: usize,
}

/// Summarize `{"object": ..., "entry": [{"changes": [{"value": {...}}]}]}`.
///
/// Missing `entry`/`changes` arrays count as zero; only a non-object root is
/// rejected.
pub fn summarize_envelope(payload: &Value) -> Result<EnvelopeSummary, WebhookError> {
    let root = payload
        .as_object()
        .ok_or_else(|| WebhookError::InvalidPayload("expected a JSON object".to_string()))?;

    let entries = root
        .get("entry")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut summary = EnvelopeSummary {
        entries: entries.len(),
        ..Default::default()
    };

    let values = entries
        .iter()
        .filter_map(|e| e.get("changes").and_then(Value::as_array))
        .flatten()
        .filter_map(|c| c.get("value"));

    for value in values {
        summary.messages += value
            .get("messages")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        summary.statuses += value
            .get("statuses")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
    }

    Ok(summary)
}

#[async_trait]
impl WebhookProcessor for AckProcessor {
    async fn process(&self, payload: Value) -> Result<Value, WebhookError> {
        let summary = summarize_envelope(&payload)?;
        let object = payload
            .get("object")
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        info!(
            object = object,
            entries = summary.entries,
            messages = summary.messages,
            statuses = summary.statuses,
            "webhook_processed"
        );

        Ok(json!({
            "status": "received",
            "entries": summary.entries,
            "messages": summary.messages,
            "statuses": summary.statuses,
        }))
    }
}
