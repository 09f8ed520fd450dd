//! HTTP transactional-mail sink.
//!
//! Posts a JSON payload to a Brevo-compatible `smtp/email` endpoint with an
//! `api-key` header. Any 2xx response counts as delivered; everything else
//! is a `NotifyError::Delivery` and the sweep will retry next run.

use serde::Serialize;
use std::time::Duration;

use wardpass_types::Identity;

use crate::{NotificationSink, NotifyError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone, Debug)]
pub struct MailerConfig {
    /// Full endpoint URL, e.g. `https://api.brevo.com/v3/smtp/email`.
    pub api_url: String,
    pub api_key: String,
    /// Sender address shown to recipients.
    pub sender: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody {
    sender: EmailAddress,
    to: Vec<EmailAddress>,
    subject: String,
    text_content: String,
}

fn build_payload(sender: &str, identity: &Identity) -> SendEmailBody {
    SendEmailBody {
        sender: EmailAddress {
            email: sender.to_string(),
            name: Some("HQ Security Ops".to_string()),
        },
        to: vec![EmailAddress {
            email: identity.email.clone(),
            name: Some(identity.name.clone()),
        }],
        subject: "ACTION REQUIRED: Access pass expired".to_string(),
        text_content: format!(
            "Greetings {},\n\n\
             Your secure access pass has expired and has been deactivated.\n\
             To continue accessing HQ, please request a new pass from the dashboard.\n\n\
             Stay safe,\nHQ Security Ops",
            identity.name
        ),
    }
}

/// Blocking HTTP mailer.
pub struct HttpMailer {
    config: MailerConfig,
    client: reqwest::blocking::Client,
}

impl HttpMailer {
    pub fn new(config: MailerConfig) -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Init(e.to_string()))?;
        Ok(Self { config, client })
    }
}

impl NotificationSink for HttpMailer {
    fn send_expiry_notice(&self, identity: &Identity) -> Result<(), NotifyError> {
        let payload = build_payload(&self.config.sender, identity);
        let response = self
            .client
            .post(&self.config.api_url)
            .header("api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .map_err(|e| NotifyError::Delivery {
                recipient: identity.email.clone(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Delivery {
                recipient: identity.email.clone(),
                detail: format!("mail API returned {status}"),
            });
        }
        tracing::info!(id = %identity.id, email = %identity.email, "expiry notice delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wardpass_types::{IdentityId, Timestamp};

    fn identity() -> Identity {
        Identity {
            id: IdentityId::new(1),
            name: "Alice".to_string(),
            role: "Medic".to_string(),
            email: "a@x.com".to_string(),
            is_active: true,
            expires_at: Timestamp::new(100),
        }
    }

    #[test]
    fn payload_addresses_the_holder() {
        let payload = build_payload("ops@hq.example", &identity());
        assert_eq!(payload.to[0].email, "a@x.com");
        assert_eq!(payload.to[0].name.as_deref(), Some("Alice"));
        assert!(payload.text_content.contains("Alice"));
        assert!(payload.subject.contains("expired"));
    }

    #[test]
    fn payload_uses_camel_case_wire_fields() {
        let json = serde_json::to_value(build_payload("ops@hq.example", &identity())).unwrap();
        assert!(json.get("textContent").is_some());
        assert_eq!(json["sender"]["email"], "ops@hq.example");
    }
}
