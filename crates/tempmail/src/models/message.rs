//! Message models: the list-view projection and the lazily fetched detail

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a message (provider-assigned, stable across polls)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A mailbox participant: address plus optional display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Email address (e.g. "alice@example.com")
    pub address: String,
    /// Display name, when the provider relays one
    pub name: Option<String>,
}

impl Sender {
    /// Create a sender with just an address
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: None,
        }
    }

    /// Create a sender with a display name
    pub fn with_name(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: Some(name.into()),
        }
    }

    /// Format for display, preferring "Name <address>" when a name exists
    pub fn display(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => format!("{} <{}>", name, self.address),
            _ => self.address.clone(),
        }
    }
}

/// List-view projection of a message, as returned by the inbox listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: MessageId,
    pub from: Sender,
    pub subject: String,
    /// Short provider-generated excerpt of the body
    pub intro: String,
    pub created_at: DateTime<Utc>,
    pub seen: bool,
}

/// Full message content, fetched lazily when a message is opened
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDetail {
    pub id: MessageId,
    pub from: Sender,
    pub to: Vec<Sender>,
    pub subject: String,
    pub intro: String,
    pub created_at: DateTime<Utc>,
    pub seen: bool,
    /// HTML body parts, when the message carries any
    pub html: Vec<String>,
    /// Plain-text body, when the message carries one
    pub text: Option<String>,
}

impl MessageDetail {
    /// The body to render: plain text when present, otherwise the first
    /// HTML part.
    pub fn display_body(&self) -> Option<&str> {
        match self.text.as_deref() {
            Some(text) if !text.is_empty() => Some(text),
            _ => self.html.first().map(|s| s.as_str()),
        }
    }

    /// Summary projection of this message, mirroring a list entry
    pub fn summary(&self) -> MessageSummary {
        MessageSummary {
            id: self.id.clone(),
            from: self.from.clone(),
            subject: self.subject.clone(),
            intro: self.intro.clone(),
            created_at: self.created_at,
            seen: self.seen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_detail(text: Option<&str>, html: Vec<&str>) -> MessageDetail {
        MessageDetail {
            id: MessageId::new("m1"),
            from: Sender::new("alice@example.com"),
            to: vec![Sender::new("mist_abc@x.com")],
            subject: "Hello".to_string(),
            intro: "Hello there".to_string(),
            created_at: Utc::now(),
            seen: false,
            html: html.into_iter().map(String::from).collect(),
            text: text.map(String::from),
        }
    }

    #[test]
    fn test_display_prefers_name() {
        let sender = Sender::with_name("Alice", "alice@example.com");
        assert_eq!(sender.display(), "Alice <alice@example.com>");
    }

    #[test]
    fn test_display_without_name() {
        let sender = Sender::new("alice@example.com");
        assert_eq!(sender.display(), "alice@example.com");
    }

    #[test]
    fn test_display_ignores_empty_name() {
        let sender = Sender::with_name("", "alice@example.com");
        assert_eq!(sender.display(), "alice@example.com");
    }

    #[test]
    fn test_display_body_prefers_text() {
        let detail = make_detail(Some("plain body"), vec!["<p>html body</p>"]);
        assert_eq!(detail.display_body(), Some("plain body"));
    }

    #[test]
    fn test_display_body_falls_back_to_html() {
        let detail = make_detail(None, vec!["<p>html body</p>", "<p>second</p>"]);
        assert_eq!(detail.display_body(), Some("<p>html body</p>"));
    }

    #[test]
    fn test_display_body_empty_message() {
        let detail = make_detail(None, vec![]);
        assert_eq!(detail.display_body(), None);
    }

    #[test]
    fn test_summary_projection() {
        let detail = make_detail(Some("body"), vec![]);
        let summary = detail.summary();
        assert_eq!(summary.id, detail.id);
        assert_eq!(summary.subject, "Hello");
        assert!(!summary.seen);
    }
}
