//! Domain models for disposable mailboxes

mod account;
mod message;

pub use account::Account;
pub use message::{MessageDetail, MessageId, MessageSummary, Sender};
