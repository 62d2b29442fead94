//! In-memory provider implementation
//!
//! A self-contained stand-in for the real mail.tm backend. Tests use it to
//! script deliveries, token revocation and transient failures; the CLI can
//! run against it offline. State lives in RwLock-protected maps.

use anyhow::{Result, bail};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use super::{MailProvider, UnauthorizedError};
use crate::models::{Account, MessageDetail, MessageId, MessageSummary, Sender};

struct RegisteredAccount {
    id: String,
    password: String,
}

/// In-memory [`MailProvider`] backend
pub struct InMemoryProvider {
    domains: Vec<String>,
    accounts: RwLock<HashMap<String, RegisteredAccount>>,
    /// token -> owning address; revoked tokens are simply removed
    tokens: RwLock<HashMap<String, String>>,
    /// address -> messages, newest first (the order the listing returns)
    inboxes: RwLock<HashMap<String, Vec<MessageDetail>>>,
    next_id: AtomicU64,
    fail_next_listing: AtomicBool,
    reject_token_exchange: AtomicBool,
    list_requests: AtomicUsize,
    detail_requests: RwLock<Vec<MessageId>>,
    seen_requests: RwLock<Vec<MessageId>>,
}

impl InMemoryProvider {
    /// Create a provider offering a single placeholder domain
    pub fn new() -> Self {
        Self::with_domains(vec!["mistbox.test".to_string()])
    }

    /// Create a provider offering the given domains, in listing order
    pub fn with_domains(domains: Vec<String>) -> Self {
        Self {
            domains,
            accounts: RwLock::new(HashMap::new()),
            tokens: RwLock::new(HashMap::new()),
            inboxes: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            fail_next_listing: AtomicBool::new(false),
            reject_token_exchange: AtomicBool::new(false),
            list_requests: AtomicUsize::new(0),
            detail_requests: RwLock::new(Vec::new()),
            seen_requests: RwLock::new(Vec::new()),
        }
    }

    /// Deliver a plain-text message to `address`, returning its ID
    pub fn deliver(
        &self,
        address: &str,
        from: Sender,
        subject: &str,
        text: &str,
    ) -> MessageId {
        let id = MessageId::new(format!("m{}", self.next_id.fetch_add(1, Ordering::SeqCst)));
        let intro: String = text.chars().take(120).collect();
        let detail = MessageDetail {
            id: id.clone(),
            from,
            to: vec![Sender::new(address)],
            subject: subject.to_string(),
            intro,
            created_at: Utc::now(),
            seen: false,
            html: Vec::new(),
            text: Some(text.to_string()),
        };
        self.push_message(address, detail);
        id
    }

    /// Deliver a fully specified message to `address`
    pub fn push_message(&self, address: &str, detail: MessageDetail) {
        let mut inboxes = self.inboxes.write().unwrap();
        inboxes
            .entry(address.to_string())
            .or_default()
            .insert(0, detail);
    }

    /// Invalidate a previously issued token; later calls using it get 401
    pub fn revoke_token(&self, token: &str) {
        self.tokens.write().unwrap().remove(token);
    }

    /// Make the next listing request fail with a transport-style error
    pub fn fail_next_listing(&self) {
        self.fail_next_listing.store(true, Ordering::SeqCst);
    }

    /// Make every token exchange fail until cleared
    pub fn reject_token_exchange(&self, reject: bool) {
        self.reject_token_exchange.store(reject, Ordering::SeqCst);
    }

    /// Number of listing requests served (or failed) so far
    pub fn list_request_count(&self) -> usize {
        self.list_requests.load(Ordering::SeqCst)
    }

    /// IDs requested through `get_message`, in call order
    pub fn detail_requests(&self) -> Vec<MessageId> {
        self.detail_requests.read().unwrap().clone()
    }

    /// IDs flagged through `mark_seen`, in call order
    pub fn seen_requests(&self) -> Vec<MessageId> {
        self.seen_requests.read().unwrap().clone()
    }

    fn mailbox_for(&self, token: &str) -> Result<String> {
        let tokens = self.tokens.read().unwrap();
        match tokens.get(token) {
            Some(address) => Ok(address.clone()),
            None => Err(UnauthorizedError.into()),
        }
    }
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MailProvider for InMemoryProvider {
    fn list_domains(&self) -> Result<Vec<String>> {
        Ok(self.domains.clone())
    }

    fn create_account(&self, address: &str, password: &str) -> Result<Account> {
        let mut accounts = self.accounts.write().unwrap();
        if accounts.contains_key(address) {
            bail!("Address already registered: {}", address);
        }

        let id = format!("acc-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        accounts.insert(
            address.to_string(),
            RegisteredAccount {
                id: id.clone(),
                password: password.to_string(),
            },
        );

        Ok(Account::new(id, address))
    }

    fn obtain_token(&self, address: &str, password: &str) -> Result<String> {
        if self.reject_token_exchange.load(Ordering::SeqCst) {
            bail!("Invalid credentials");
        }

        let accounts = self.accounts.read().unwrap();
        let known = accounts
            .get(address)
            .is_some_and(|account| account.password == password);
        if !known {
            bail!("Invalid credentials");
        }

        let token = format!("tok-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.tokens
            .write()
            .unwrap()
            .insert(token.clone(), address.to_string());
        Ok(token)
    }

    fn list_messages(&self, token: &str, _page: u32) -> Result<Vec<MessageSummary>> {
        self.list_requests.fetch_add(1, Ordering::SeqCst);

        if self.fail_next_listing.swap(false, Ordering::SeqCst) {
            bail!("Listing unavailable");
        }

        let address = self.mailbox_for(token)?;
        let inboxes = self.inboxes.read().unwrap();
        let messages = inboxes
            .get(&address)
            .map(|inbox| inbox.iter().map(MessageDetail::summary).collect())
            .unwrap_or_default();
        Ok(messages)
    }

    fn get_message(&self, token: &str, id: &MessageId) -> Result<MessageDetail> {
        self.detail_requests.write().unwrap().push(id.clone());

        let address = self.mailbox_for(token)?;
        let inboxes = self.inboxes.read().unwrap();
        let message = inboxes
            .get(&address)
            .and_then(|inbox| inbox.iter().find(|m| &m.id == id));
        match message {
            Some(message) => Ok(message.clone()),
            None => bail!("Message not found: {}", id.as_str()),
        }
    }

    fn mark_seen(&self, token: &str, id: &MessageId) -> Result<()> {
        self.seen_requests.write().unwrap().push(id.clone());

        let address = self.mailbox_for(token)?;
        let mut inboxes = self.inboxes.write().unwrap();
        if let Some(message) = inboxes
            .get_mut(&address)
            .and_then(|inbox| inbox.iter_mut().find(|m| &m.id == id))
        {
            message.seen = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provisioned(provider: &InMemoryProvider) -> (Account, String) {
        let account = provider
            .create_account("mist_test@mistbox.test", "hunter2")
            .unwrap();
        let token = provider
            .obtain_token("mist_test@mistbox.test", "hunter2")
            .unwrap();
        (account, token)
    }

    #[test]
    fn test_register_and_list() {
        let provider = InMemoryProvider::new();
        let (account, token) = provisioned(&provider);

        assert!(provider.list_messages(&token, 1).unwrap().is_empty());

        provider.deliver(&account.address, Sender::new("alice@example.com"), "Hi", "Hello!");
        let messages = provider.list_messages(&token, 1).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].subject, "Hi");
    }

    #[test]
    fn test_newest_message_listed_first() {
        let provider = InMemoryProvider::new();
        let (account, token) = provisioned(&provider);

        provider.deliver(&account.address, Sender::new("a@example.com"), "first", "1");
        provider.deliver(&account.address, Sender::new("a@example.com"), "second", "2");

        let messages = provider.list_messages(&token, 1).unwrap();
        assert_eq!(messages[0].subject, "second");
        assert_eq!(messages[1].subject, "first");
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let provider = InMemoryProvider::new();
        provider.create_account("a@mistbox.test", "pw").unwrap();
        assert!(provider.create_account("a@mistbox.test", "pw").is_err());
    }

    #[test]
    fn test_wrong_password_rejected() {
        let provider = InMemoryProvider::new();
        provider.create_account("a@mistbox.test", "pw").unwrap();
        assert!(provider.obtain_token("a@mistbox.test", "nope").is_err());
    }

    #[test]
    fn test_revoked_token_is_unauthorized() {
        let provider = InMemoryProvider::new();
        let (_, token) = provisioned(&provider);

        provider.revoke_token(&token);
        let err = provider.list_messages(&token, 1).unwrap_err();
        assert!(err.downcast_ref::<UnauthorizedError>().is_some());
    }

    #[test]
    fn test_fail_next_listing_is_one_shot() {
        let provider = InMemoryProvider::new();
        let (_, token) = provisioned(&provider);

        provider.fail_next_listing();
        let err = provider.list_messages(&token, 1).unwrap_err();
        assert!(err.downcast_ref::<UnauthorizedError>().is_none());

        assert!(provider.list_messages(&token, 1).is_ok());
        assert_eq!(provider.list_request_count(), 2);
    }

    #[test]
    fn test_mark_seen_updates_listing() {
        let provider = InMemoryProvider::new();
        let (account, token) = provisioned(&provider);
        let id = provider.deliver(&account.address, Sender::new("a@example.com"), "Hi", "1");

        provider.mark_seen(&token, &id).unwrap();

        let messages = provider.list_messages(&token, 1).unwrap();
        assert!(messages[0].seen);
        assert_eq!(provider.seen_requests(), vec![id]);
    }
}
