//! Expiry notification delivery.
//!
//! The sweep only knows the [`NotificationSink`] trait; the concrete
//! transport (an HTTP transactional-mail API here, a test double in the
//! nullables crate) is chosen at wiring time. Sink calls are blocking
//! external I/O by contract.

pub mod http;

use thiserror::Error;
use wardpass_types::Identity;

pub use http::{HttpMailer, MailerConfig};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed for {recipient}: {detail}")]
    Delivery { recipient: String, detail: String },

    #[error("mail client init failed: {0}")]
    Init(String),
}

/// Delivers an expiry notice to a credential holder.
pub trait NotificationSink: Send + Sync {
    fn send_expiry_notice(&self, identity: &Identity) -> Result<(), NotifyError>;
}

/// A sink that only logs. Used when no mailer is configured, so a dev
/// deployment still sweeps without external traffic.
pub struct LogOnlyNotifier;

impl NotificationSink for LogOnlyNotifier {
    fn send_expiry_notice(&self, identity: &Identity) -> Result<(), NotifyError> {
        tracing::info!(
            id = %identity.id,
            email = %identity.email,
            "expiry notice (log-only sink, no mail sent)"
        );
        Ok(())
    }
}
