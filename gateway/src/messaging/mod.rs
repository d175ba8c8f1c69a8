//! Outbound messaging module.
//!
//! This module provides:
//! - Request and payload types for template and free-text messages
//! - An HTTP client that posts payloads to the WhatsApp Cloud API

pub mod client;
pub mod types;

pub use client::{MessagingClient, MessagingError};
pub use types::{
    FreeMessageRequest, MessageContent, OutboundMessage, TemplateMessageRequest,
    UpstreamResponse, MESSAGING_PRODUCT,
};
