//! Tunable credential lifecycle parameters.

use serde::{Deserialize, Serialize};

/// Default credential validity window: 2 days.
pub const DEFAULT_VALIDITY_WINDOW_SECS: u64 = 2 * 24 * 60 * 60;

/// Default expiry sweep interval: hourly.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60 * 60;

/// Parameters governing issuance and the expiry sweep.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PassParams {
    /// Seconds from issuance until both the identity record and its token
    /// expire. The two share one window by construction.
    pub validity_window_secs: u64,

    /// Seconds between expiry sweep runs.
    pub sweep_interval_secs: u64,
}

impl Default for PassParams {
    fn default() -> Self {
        Self {
            validity_window_secs: DEFAULT_VALIDITY_WINDOW_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_windows() {
        let p = PassParams::default();
        assert_eq!(p.validity_window_secs, 172_800);
        assert_eq!(p.sweep_interval_secs, 3_600);
    }
}
