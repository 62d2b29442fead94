//! Inbox list state
//!
//! Holds the most recent message listing. The provider's ordering and IDs
//! are trusted as-is; each poll replaces the whole list, and the only local
//! mutation is flipping a `seen` flag after a message was opened.

use crate::models::{MessageId, MessageSummary};

/// The current message list for the active mailbox
#[derive(Debug, Default)]
pub struct Inbox {
    messages: Vec<MessageSummary>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in provider order
    pub fn messages(&self) -> &[MessageSummary] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Number of messages not yet seen
    pub fn unseen_count(&self) -> usize {
        self.messages.iter().filter(|m| !m.seen).count()
    }

    /// Look up a list entry by ID
    pub fn get(&self, id: &MessageId) -> Option<&MessageSummary> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// Replace the list with a fresh poll result, returning the entries
    /// whose IDs were not present before (new arrivals).
    pub fn replace(&mut self, messages: Vec<MessageSummary>) -> Vec<MessageSummary> {
        let arrivals = messages
            .iter()
            .filter(|m| self.get(&m.id).is_none())
            .cloned()
            .collect();
        self.messages = messages;
        arrivals
    }

    /// Flip a list entry's seen flag locally, without re-fetching the list.
    /// Returns false when the ID is not in the list.
    pub fn mark_seen(&mut self, id: &MessageId) -> bool {
        match self.messages.iter_mut().find(|m| &m.id == id) {
            Some(message) => {
                message.seen = true;
                true
            }
            None => false,
        }
    }

    /// Drop all messages (mailbox regenerated)
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sender;
    use chrono::Utc;

    fn make_summary(id: &str, seen: bool) -> MessageSummary {
        MessageSummary {
            id: MessageId::new(id),
            from: Sender::new("alice@example.com"),
            subject: format!("Subject {}", id),
            intro: String::new(),
            created_at: Utc::now(),
            seen,
        }
    }

    #[test]
    fn test_replace_reports_new_arrivals() {
        let mut inbox = Inbox::new();

        let arrivals = inbox.replace(vec![make_summary("m1", false)]);
        assert_eq!(arrivals.len(), 1);

        // m1 again plus a new m2: only m2 is an arrival
        let arrivals = inbox.replace(vec![make_summary("m2", false), make_summary("m1", false)]);
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].id.as_str(), "m2");
        assert_eq!(inbox.len(), 2);
    }

    #[test]
    fn test_replace_keeps_provider_order() {
        let mut inbox = Inbox::new();
        inbox.replace(vec![make_summary("m2", false), make_summary("m1", false)]);

        let ids: Vec<&str> = inbox.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m1"]);
    }

    #[test]
    fn test_mark_seen_flips_flag_in_place() {
        let mut inbox = Inbox::new();
        inbox.replace(vec![make_summary("m1", false), make_summary("m2", false)]);

        assert!(inbox.mark_seen(&MessageId::new("m1")));
        assert!(inbox.get(&MessageId::new("m1")).unwrap().seen);
        assert!(!inbox.get(&MessageId::new("m2")).unwrap().seen);
        assert_eq!(inbox.unseen_count(), 1);
    }

    #[test]
    fn test_mark_seen_unknown_id() {
        let mut inbox = Inbox::new();
        assert!(!inbox.mark_seen(&MessageId::new("missing")));
    }

    #[test]
    fn test_clear() {
        let mut inbox = Inbox::new();
        inbox.replace(vec![make_summary("m1", false)]);
        inbox.clear();
        assert!(inbox.is_empty());
    }
}
