//! Account model representing a provisioned disposable mailbox

use serde::{Deserialize, Serialize};

/// A mailbox account registered with the mail provider.
///
/// Created once per session and discarded when the provider rejects the
/// bearer token or when the user regenerates the mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Provider-assigned account ID
    pub id: String,
    /// Full mailbox address (e.g. "mist_k3x9q2@example.com")
    pub address: String,
}

impl Account {
    /// Create a new account from provider-supplied fields
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
        }
    }

    /// The part of the address before the '@'
    pub fn local_part(&self) -> &str {
        self.address
            .split_once('@')
            .map(|(local, _)| local)
            .unwrap_or(&self.address)
    }

    /// The domain the address was registered under
    pub fn domain(&self) -> Option<&str> {
        self.address.split_once('@').map(|(_, domain)| domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_part_and_domain() {
        let account = Account::new("acc-1", "mist_abc123@x.com");
        assert_eq!(account.local_part(), "mist_abc123");
        assert_eq!(account.domain(), Some("x.com"));
    }

    #[test]
    fn test_address_without_at_sign() {
        let account = Account::new("acc-1", "not-an-address");
        assert_eq!(account.local_part(), "not-an-address");
        assert_eq!(account.domain(), None);
    }

    #[test]
    fn test_roundtrips_through_json() {
        let account = Account::new("acc-1", "mist_abc123@x.com");
        let json = serde_json::to_string(&account).unwrap();
        let back: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(back, account);
    }
}
