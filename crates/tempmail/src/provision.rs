//! Mailbox provisioning
//!
//! One request chain, run at startup or on demand: list domains, pick the
//! first, register a random address under it, exchange the credentials for
//! a bearer token. There is no retry and no partial-state cleanup; if the
//! token exchange fails, the freshly created account is abandoned on the
//! provider.

use anyhow::{Context, Result};
use log::info;

use crate::provider::MailProvider;
use crate::session::Session;

/// Length of the random portion of a generated local part
const LOCAL_PART_RANDOM_LEN: usize = 8;

/// Length of generated passwords
const PASSWORD_LEN: usize = 13;

/// Provision a fresh mailbox and return its session.
///
/// `prefix` is prepended to the random local part, making generated
/// addresses recognizable (e.g. "mist_k3x9q2w1@example.com").
pub fn provision_mailbox(provider: &dyn MailProvider, prefix: &str) -> Result<Session> {
    let domains = provider
        .list_domains()
        .context("Failed to fetch available domains")?;
    let domain = domains.first().context("No domains available")?;

    let address = format!("{}{}@{}", prefix, random_base36(LOCAL_PART_RANDOM_LEN), domain);
    let password = random_base36(PASSWORD_LEN);

    let account = provider
        .create_account(&address, &password)
        .context("Failed to register account")?;

    let token = provider
        .obtain_token(&address, &password)
        .context("Failed to obtain bearer token")?;

    info!("Provisioned mailbox {}", account.address);
    Ok(Session::new(account, token))
}

/// Generate a random lowercase base-36 string.
///
/// Draws entropy from the randomly keyed `RandomState` hasher, so no
/// dedicated randomness dependency is needed for throwaway identifiers.
fn random_base36(len: usize) -> String {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut out = String::with_capacity(len);
    while out.len() < len {
        let mut value = RandomState::new().build_hasher().finish();
        while value > 0 && out.len() < len {
            out.push(DIGITS[(value % 36) as usize] as char);
            value /= 36;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InMemoryProvider;

    #[test]
    fn test_address_uses_first_domain() {
        let provider =
            InMemoryProvider::with_domains(vec!["x.com".to_string(), "y.net".to_string()]);

        let session = provision_mailbox(&provider, "mist_").unwrap();
        assert!(session.account.address.ends_with("@x.com"));
        assert!(session.account.address.starts_with("mist_"));
        assert!(!session.token.is_empty());
    }

    #[test]
    fn test_no_domains_is_an_error() {
        let provider = InMemoryProvider::with_domains(Vec::new());
        let err = provision_mailbox(&provider, "mist_").unwrap_err();
        assert!(err.to_string().contains("No domains available"));
    }

    #[test]
    fn test_token_failure_surfaces() {
        let provider = InMemoryProvider::new();
        provider.reject_token_exchange(true);

        assert!(provision_mailbox(&provider, "mist_").is_err());
    }

    #[test]
    fn test_random_base36_shape() {
        let s = random_base36(8);
        assert_eq!(s.len(), 8);
        assert!(s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_random_base36_varies() {
        assert_ne!(random_base36(13), random_base36(13));
    }
}
