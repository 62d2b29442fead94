//! mail.tm HTTP client
//!
//! Thin client over the mail.tm REST API. Uses synchronous HTTP (ureq) to
//! be executor-agnostic. Responses arrive as JSON-LD: collections are
//! wrapped in a hydra envelope whose items live under `hydra:member`.

use anyhow::{Context, Result};
use serde::Serialize;

use super::{MailProvider, UnauthorizedError};
use crate::models::{Account, MessageDetail, MessageId, MessageSummary, Sender};

/// Wire types for the mail.tm API
pub mod api {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    /// JSON-LD collection envelope used by every mail.tm listing
    #[derive(Debug, Deserialize)]
    #[serde(bound(deserialize = "T: Deserialize<'de>"))]
    pub struct HydraCollection<T> {
        #[serde(rename = "hydra:member", default)]
        pub member: Vec<T>,
        #[serde(rename = "hydra:totalItems", default)]
        pub total_items: u32,
    }

    /// One entry of the `/domains` listing
    #[derive(Debug, Deserialize)]
    pub struct DomainResource {
        pub id: String,
        pub domain: String,
    }

    /// Response to `POST /accounts`
    #[derive(Debug, Deserialize)]
    pub struct AccountResource {
        pub id: String,
        pub address: String,
    }

    /// Response to `POST /token`
    #[derive(Debug, Deserialize)]
    pub struct TokenResponse {
        pub token: String,
    }

    /// An address as mail.tm relays it (in `from`/`to` fields)
    #[derive(Debug, Clone, Deserialize, Serialize)]
    pub struct AddressResource {
        pub address: String,
        #[serde(default)]
        pub name: Option<String>,
    }

    /// One entry of the `/messages` listing
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessageResource {
        pub id: String,
        pub from: AddressResource,
        #[serde(default)]
        pub subject: String,
        #[serde(default)]
        pub intro: String,
        #[serde(default)]
        pub seen: bool,
        pub created_at: DateTime<Utc>,
    }

    /// Response to `GET /messages/{id}`
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessageDetailResource {
        pub id: String,
        pub from: AddressResource,
        #[serde(default)]
        pub to: Vec<AddressResource>,
        #[serde(default)]
        pub subject: String,
        #[serde(default)]
        pub intro: String,
        #[serde(default)]
        pub seen: bool,
        pub created_at: DateTime<Utc>,
        #[serde(default)]
        pub html: Vec<String>,
        #[serde(default)]
        pub text: Option<String>,
    }
}

/// Request body for account registration and token exchange
#[derive(Debug, Serialize)]
struct CredentialsBody<'a> {
    address: &'a str,
    password: &'a str,
}

/// Client for the mail.tm disposable-mail API
pub struct MailTmClient {
    base_url: String,
}

impl MailTmClient {
    /// Public mail.tm API endpoint
    pub const DEFAULT_BASE_URL: &'static str = "https://api.mail.tm";

    /// Create a client against the given API base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }
}

impl Default for MailTmClient {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}

impl MailProvider for MailTmClient {
    fn list_domains(&self) -> Result<Vec<String>> {
        let mut response = ureq::get(&self.url("/domains"))
            .call()
            .context("Failed to send domain list request")?;

        let collection: api::HydraCollection<api::DomainResource> = response
            .body_mut()
            .read_json()
            .context("Failed to parse domain list response")?;

        Ok(collection.member.into_iter().map(|d| d.domain).collect())
    }

    fn create_account(&self, address: &str, password: &str) -> Result<Account> {
        let mut response = ureq::post(&self.url("/accounts"))
            .send_json(CredentialsBody { address, password })
            .context("Failed to register account")?;

        let resource: api::AccountResource = response
            .body_mut()
            .read_json()
            .context("Failed to parse account response")?;

        Ok(Account::new(resource.id, resource.address))
    }

    fn obtain_token(&self, address: &str, password: &str) -> Result<String> {
        let mut response = ureq::post(&self.url("/token"))
            .send_json(CredentialsBody { address, password })
            .context("Failed to exchange credentials for token")?;

        let resource: api::TokenResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse token response")?;

        Ok(resource.token)
    }

    fn list_messages(&self, token: &str, page: u32) -> Result<Vec<MessageSummary>> {
        let result = ureq::get(&self.url(&format!("/messages?page={}", page)))
            .header("Authorization", &Self::bearer(token))
            .call();

        let mut response = match result {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(401)) => return Err(UnauthorizedError.into()),
            Err(e) => return Err(e).context("Failed to send message list request"),
        };

        let collection: api::HydraCollection<api::MessageResource> = response
            .body_mut()
            .read_json()
            .context("Failed to parse message list response")?;

        Ok(collection.member.into_iter().map(summary_from_wire).collect())
    }

    fn get_message(&self, token: &str, id: &MessageId) -> Result<MessageDetail> {
        let result = ureq::get(&self.url(&format!("/messages/{}", id.as_str())))
            .header("Authorization", &Self::bearer(token))
            .call();

        let mut response = match result {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(401)) => return Err(UnauthorizedError.into()),
            Err(e) => return Err(e).context("Failed to send message fetch request"),
        };

        let resource: api::MessageDetailResource = response
            .body_mut()
            .read_json()
            .context("Failed to parse message response")?;

        Ok(detail_from_wire(resource))
    }

    fn mark_seen(&self, token: &str, id: &MessageId) -> Result<()> {
        // mail.tm only accepts partial updates as RFC 7396 merge patches
        let result = ureq::patch(&self.url(&format!("/messages/{}", id.as_str())))
            .header("Authorization", &Self::bearer(token))
            .header("Content-Type", "application/merge-patch+json")
            .send(r#"{"seen":true}"#);

        match result {
            Ok(_) => Ok(()),
            Err(ureq::Error::StatusCode(401)) => Err(UnauthorizedError.into()),
            Err(e) => Err(e).context("Failed to send seen-flag update"),
        }
    }
}

fn sender_from_wire(address: api::AddressResource) -> Sender {
    Sender {
        address: address.address,
        name: address.name.filter(|n| !n.is_empty()),
    }
}

fn summary_from_wire(resource: api::MessageResource) -> MessageSummary {
    MessageSummary {
        id: MessageId::new(resource.id),
        from: sender_from_wire(resource.from),
        subject: resource.subject,
        intro: resource.intro,
        created_at: resource.created_at,
        seen: resource.seen,
    }
}

fn detail_from_wire(resource: api::MessageDetailResource) -> MessageDetail {
    MessageDetail {
        id: MessageId::new(resource.id),
        from: sender_from_wire(resource.from),
        to: resource.to.into_iter().map(sender_from_wire).collect(),
        subject: resource.subject,
        intro: resource.intro,
        created_at: resource.created_at,
        seen: resource.seen,
        html: resource.html,
        text: resource.text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_domain_collection() {
        let json = r#"{
            "hydra:member": [
                {"id": "d1", "domain": "x.com", "isActive": true},
                {"id": "d2", "domain": "y.net", "isActive": true}
            ],
            "hydra:totalItems": 2
        }"#;

        let collection: api::HydraCollection<api::DomainResource> =
            serde_json::from_str(json).unwrap();
        assert_eq!(collection.total_items, 2);
        assert_eq!(collection.member[0].domain, "x.com");
    }

    #[test]
    fn test_parse_empty_collection() {
        let collection: api::HydraCollection<api::DomainResource> =
            serde_json::from_str("{}").unwrap();
        assert!(collection.member.is_empty());
        assert_eq!(collection.total_items, 0);
    }

    #[test]
    fn test_parse_message_listing() {
        let json = r#"{
            "hydra:member": [{
                "id": "m1",
                "accountId": "acc-1",
                "from": {"address": "alice@example.com", "name": "Alice"},
                "subject": "Hi",
                "intro": "Hi there...",
                "seen": false,
                "createdAt": "2025-03-04T10:30:00+00:00"
            }],
            "hydra:totalItems": 1
        }"#;

        let collection: api::HydraCollection<api::MessageResource> =
            serde_json::from_str(json).unwrap();
        let summary = summary_from_wire(collection.member.into_iter().next().unwrap());
        assert_eq!(summary.id.as_str(), "m1");
        assert_eq!(summary.from.display(), "Alice <alice@example.com>");
        assert!(!summary.seen);
    }

    #[test]
    fn test_parse_message_detail() {
        let json = r#"{
            "id": "m1",
            "from": {"address": "alice@example.com", "name": ""},
            "to": [{"address": "mist_abc@x.com", "name": ""}],
            "subject": "Hi",
            "intro": "Hi there...",
            "seen": true,
            "createdAt": "2025-03-04T10:30:00+00:00",
            "html": ["<p>Hi there</p>"],
            "text": "Hi there"
        }"#;

        let resource: api::MessageDetailResource = serde_json::from_str(json).unwrap();
        let detail = detail_from_wire(resource);
        assert_eq!(detail.to.len(), 1);
        // mail.tm sends empty strings for absent display names
        assert_eq!(detail.from.name, None);
        assert_eq!(detail.display_body(), Some("Hi there"));
    }

    #[test]
    fn test_detail_without_bodies() {
        let json = r#"{
            "id": "m1",
            "from": {"address": "alice@example.com"},
            "subject": "Hi",
            "seen": false,
            "createdAt": "2025-03-04T10:30:00+00:00"
        }"#;

        let resource: api::MessageDetailResource = serde_json::from_str(json).unwrap();
        let detail = detail_from_wire(resource);
        assert!(detail.html.is_empty());
        assert_eq!(detail.text, None);
        assert_eq!(detail.display_body(), None);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = MailTmClient::new("https://api.mail.tm/");
        assert_eq!(client.url("/domains"), "https://api.mail.tm/domains");
    }
}
