//! Expiry sweep — notifies and retires stale-but-active identities.

use std::sync::Arc;

use wardpass_notify::NotificationSink;
use wardpass_store::{IdentityStore, StoreError};
use wardpass_types::Timestamp;

/// Counters for one sweep run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Sweep candidates found (`expires_at < now && is_active`).
    pub scanned: usize,
    /// Identities notified and flipped to inactive this run.
    pub deactivated: usize,
    /// Identities left active because their notice failed; retried on the
    /// next run.
    pub failed: usize,
}

/// Finds expired-but-active identities, notifies their holders, and
/// deactivates them.
///
/// Notify-then-deactivate is deliberate: an identity is never silently
/// retired without a successful delivery attempt. The cost is a possible
/// duplicate notice if the process dies between the two steps; the next
/// run re-notifies and re-flips.
pub struct ExpirySweeper<S> {
    store: Arc<S>,
    sink: Arc<dyn NotificationSink>,
}

impl<S: IdentityStore> ExpirySweeper<S> {
    pub fn new(store: Arc<S>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { store, sink }
    }

    /// One sweep pass. Failures are isolated per identity: one unreachable
    /// recipient cannot block or abort the rest of the batch.
    ///
    /// The only hard error is the candidate query itself failing; from
    /// there on every per-identity error is logged and counted.
    pub fn run(&self, now: Timestamp) -> Result<SweepReport, StoreError> {
        let candidates = self.store.list_expired_active(now)?;
        let mut report = SweepReport {
            scanned: candidates.len(),
            ..SweepReport::default()
        };

        for identity in candidates {
            if let Err(e) = self.sink.send_expiry_notice(&identity) {
                tracing::warn!(id = %identity.id, error = %e, "expiry notice failed, will retry next sweep");
                report.failed += 1;
                continue;
            }
            match self.store.set_active(identity.id, false) {
                Ok(()) => {
                    tracing::info!(id = %identity.id, "identity expired and deactivated");
                    report.deactivated += 1;
                }
                Err(e) => {
                    // Notice went out but the flip failed; the next run will
                    // re-notify (documented duplicate-delivery window).
                    tracing::warn!(id = %identity.id, error = %e, "deactivation failed after notice");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wardpass_nullables::{NullNotifier, NullStore};
    use wardpass_types::NewIdentity;

    fn seed(store: &NullStore, name: &str, email: &str, expires_at: u64) -> wardpass_types::IdentityId {
        store
            .create_identity(NewIdentity {
                name: name.to_string(),
                role: "Scout".to_string(),
                email: email.to_string(),
                expires_at: Timestamp::new(expires_at),
            })
            .unwrap()
            .id
    }

    fn sweeper(store: &Arc<NullStore>, sink: &Arc<NullNotifier>) -> ExpirySweeper<NullStore> {
        ExpirySweeper::new(store.clone(), sink.clone() as Arc<dyn NotificationSink>)
    }

    #[test]
    fn notifies_then_deactivates_each_candidate_once() {
        let store = Arc::new(NullStore::new());
        let sink = Arc::new(NullNotifier::new());
        let stale = seed(&store, "Alice", "a@x.com", 100);
        let fresh = seed(&store, "Bob", "b@x.com", 9_000);

        let report = sweeper(&store, &sink).run(Timestamp::new(500)).unwrap();
        assert_eq!(
            report,
            SweepReport {
                scanned: 1,
                deactivated: 1,
                failed: 0
            }
        );
        assert_eq!(sink.sent_count_for("a@x.com"), 1);
        assert!(!store.get_identity(stale).unwrap().is_active);
        assert!(store.get_identity(fresh).unwrap().is_active);
    }

    #[test]
    fn second_run_finds_nothing_new() {
        let store = Arc::new(NullStore::new());
        let sink = Arc::new(NullNotifier::new());
        seed(&store, "Alice", "a@x.com", 100);

        let sweeper = sweeper(&store, &sink);
        sweeper.run(Timestamp::new(500)).unwrap();
        let report = sweeper.run(Timestamp::new(600)).unwrap();

        assert_eq!(report, SweepReport::default());
        assert_eq!(sink.sent_count_for("a@x.com"), 1);
    }

    #[test]
    fn notice_failure_leaves_identity_active_and_batch_continues() {
        let store = Arc::new(NullStore::new());
        let sink = Arc::new(NullNotifier::new());
        let unreachable = seed(&store, "Alice", "a@x.com", 100);
        let reachable = seed(&store, "Bob", "b@x.com", 100);
        sink.fail_for("a@x.com");

        let report = sweeper(&store, &sink).run(Timestamp::new(500)).unwrap();
        assert_eq!(
            report,
            SweepReport {
                scanned: 2,
                deactivated: 1,
                failed: 1
            }
        );
        assert!(store.get_identity(unreachable).unwrap().is_active);
        assert!(!store.get_identity(reachable).unwrap().is_active);
    }

    #[test]
    fn failed_notice_is_retried_on_the_next_run() {
        let store = Arc::new(NullStore::new());
        let sink = Arc::new(NullNotifier::new());
        let id = seed(&store, "Alice", "a@x.com", 100);
        sink.fail_for("a@x.com");

        let sweeper = sweeper(&store, &sink);
        sweeper.run(Timestamp::new(500)).unwrap();
        assert!(store.get_identity(id).unwrap().is_active);

        sink.clear_failure("a@x.com");
        let report = sweeper.run(Timestamp::new(600)).unwrap();
        assert_eq!(report.deactivated, 1);
        assert!(!store.get_identity(id).unwrap().is_active);
        assert_eq!(sink.sent_count_for("a@x.com"), 1);
    }

    #[test]
    fn empty_store_is_a_clean_noop() {
        let store = Arc::new(NullStore::new());
        let sink = Arc::new(NullNotifier::new());
        let report = sweeper(&store, &sink).run(Timestamp::new(500)).unwrap();
        assert_eq!(report, SweepReport::default());
    }
}
