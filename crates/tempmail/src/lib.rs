//! Tempmail crate - core logic for disposable mailboxes
//!
//! This crate provides UI-independent functionality for running a
//! throwaway mailbox against a disposable-mail provider:
//! - Domain models (Account, MessageSummary, MessageDetail)
//! - Provider abstraction with a mail.tm HTTP backend and an in-memory fake
//! - Session persistence (account + bearer token)
//! - Provisioning (domain pick, random address, registration, token)
//! - Inbox polling with a cadence/in-flight gate and an expiry countdown
//!
//! Front-ends (the `mistbox` CLI, the `relay` server) consume this crate;
//! it has no UI dependencies of its own.

pub mod countdown;
pub mod inbox;
pub mod models;
pub mod poll;
pub mod provider;
pub mod provision;
pub mod service;
pub mod session;
pub mod settings;

pub use countdown::Countdown;
pub use inbox::Inbox;
pub use models::{Account, MessageDetail, MessageId, MessageSummary, Sender};
pub use poll::PollSchedule;
pub use provider::{InMemoryProvider, MailProvider, MailTmClient, UnauthorizedError};
pub use provision::provision_mailbox;
pub use service::MailboxService;
pub use session::{FileSessionStore, InMemorySessionStore, SESSION_FILE, Session, SessionStore};
pub use settings::Settings;
