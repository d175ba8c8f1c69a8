//! Message types for the WhatsApp Cloud API.
//!
//! This module defines:
//! - Request bodies accepted by the gateway's messaging routes
//! - Outbound payloads in the shape the messaging API expects

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value of `messaging_product` on every outbound payload.
pub const MESSAGING_PRODUCT: &str = "whatsapp";

// =============================================================================
// Inbound Request Types (gateway routes)
// =============================================================================

/// Body of `POST /whatsapp/send-template-message/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateMessageRequest {
    /// Recipient phone number in international format
    pub to: String,
    /// Name of a template registered with the messaging API
    pub template_name: String,
    /// Template language code (e.g. "en_US", "es_ES")
    pub language_code: String,
}

/// Body of `POST /whatsapp/send-free-message/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeMessageRequest {
    /// Recipient phone number in international format
    pub to: String,
    /// Message text
    pub text: String,
}

// =============================================================================
// Outbound Payload Types (messaging API)
// =============================================================================

/// Payload POSTed to `{base}/{phone_number_id}/messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub messaging_product: String,
    pub to: String,
    #[serde(flatten)]
    pub content: MessageContent,
}

/// Message body, tagged by the `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Template { template: Template },
    Text { text: Text },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub body: String,
}

impl OutboundMessage {
    pub fn template(to: &str, template_name: &str, language_code: &str) -> Self {
        Self {
            messaging_product: MESSAGING_PRODUCT.to_string(),
            to: to.to_string(),
            content: MessageContent::Template {
                template: Template {
                    name: template_name.to_string(),
                    language: Language {
                        code: language_code.to_string(),
                    },
                },
            },
        }
    }

    pub fn free_text(to: &str, text: &str) -> Self {
        Self {
            messaging_product: MESSAGING_PRODUCT.to_string(),
            to: to.to_string(),
            content: MessageContent::Text {
                text: Text {
                    body: text.to_string(),
                },
            },
        }
    }

    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self.content {
            MessageContent::Template { .. } => "template",
            MessageContent::Text { .. } => "text",
        }
    }
}

/// Raw downstream result: status code plus body.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}
