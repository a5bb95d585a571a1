//! Concierge chat messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Model,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Model => write!(f, "model"),
        }
    }
}

/// A single message in the concierge transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    /// Set on model replies that answer a shopper's question, so the view
    /// can style them as recommendations.
    #[serde(default)]
    pub is_product_recommendation: bool,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    /// A message typed by the shopper.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            is_product_recommendation: false,
            sent_at: Utc::now(),
        }
    }

    /// A plain model message (greetings, apologies).
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
            is_product_recommendation: false,
            sent_at: Utc::now(),
        }
    }

    /// A model reply carrying product recommendations.
    #[must_use]
    pub fn recommendation(text: impl Into<String>) -> Self {
        Self {
            is_product_recommendation: true,
            ..Self::model(text)
        }
    }
}
