//! Mail provider integration
//!
//! Everything interesting about a disposable mailbox (account creation,
//! message delivery, retention) happens on the provider's side; this module
//! is the seam the rest of the crate talks through. [`MailProvider`] is the
//! trait, [`MailTmClient`] is the shipped HTTP backend, and
//! [`InMemoryProvider`] is an in-process fake for tests and offline runs.

mod mailtm;
mod memory;

pub use mailtm::MailTmClient;
pub use memory::InMemoryProvider;

use anyhow::Result;

use crate::models::{Account, MessageDetail, MessageId, MessageSummary};

/// Error indicating the provider rejected the bearer token.
///
/// Callers branch on this (via `anyhow` downcast) to discard stored
/// credentials and force re-provisioning.
#[derive(Debug, thiserror::Error)]
#[error("Bearer token rejected by provider")]
pub struct UnauthorizedError;

/// Operations offered by a disposable-mail provider.
///
/// Methods map one-to-one onto the provider's REST surface; implementations
/// do no retrying and no caching. Token-authenticated methods return
/// [`UnauthorizedError`] (wrapped in `anyhow`) when the provider answers 401.
pub trait MailProvider: Send + Sync {
    /// List domains currently accepting registrations
    fn list_domains(&self) -> Result<Vec<String>>;

    /// Register a new account for `address` guarded by `password`
    fn create_account(&self, address: &str, password: &str) -> Result<Account>;

    /// Exchange account credentials for an opaque bearer token
    fn obtain_token(&self, address: &str, password: &str) -> Result<String>;

    /// List message summaries for the mailbox the token owns
    fn list_messages(&self, token: &str, page: u32) -> Result<Vec<MessageSummary>>;

    /// Fetch one message in full
    fn get_message(&self, token: &str, id: &MessageId) -> Result<MessageDetail>;

    /// Flag a message as seen on the provider side
    fn mark_seen(&self, token: &str, id: &MessageId) -> Result<()>;
}
