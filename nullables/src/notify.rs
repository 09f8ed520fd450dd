//! Nullable notification sink — records notices, fails on demand.

use std::collections::HashSet;
use std::sync::Mutex;

use wardpass_notify::{NotificationSink, NotifyError};
use wardpass_types::{Identity, IdentityId};

/// A sink that delivers nothing and remembers everything.
pub struct NullNotifier {
    sent: Mutex<Vec<(IdentityId, String)>>,
    failing_emails: Mutex<HashSet<String>>,
}

impl NullNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing_emails: Mutex::new(HashSet::new()),
        }
    }

    /// Make delivery to `email` fail until cleared.
    pub fn fail_for(&self, email: &str) {
        self.failing_emails.lock().unwrap().insert(email.to_string());
    }

    /// Let delivery to `email` succeed again.
    pub fn clear_failure(&self, email: &str) {
        self.failing_emails.lock().unwrap().remove(email);
    }

    /// Every notice recorded, in delivery order.
    pub fn sent(&self) -> Vec<(IdentityId, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// How many notices went to `email`.
    pub fn sent_count_for(&self, email: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, e)| e == email)
            .count()
    }
}

impl Default for NullNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for NullNotifier {
    fn send_expiry_notice(&self, identity: &Identity) -> Result<(), NotifyError> {
        if self.failing_emails.lock().unwrap().contains(&identity.email) {
            return Err(NotifyError::Delivery {
                recipient: identity.email.clone(),
                detail: "recipient unreachable (test)".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((identity.id, identity.email.clone()));
        Ok(())
    }
}
