//! Server clock offset tracking.
//!
//! Most authenticated calls must carry a server-accurate timestamp. Instead
//! of querying the server per call, [`SyncClock`] records the server time
//! delivered at partner login together with the local clock at that instant,
//! and extrapolates from there.

/// Tracks the offset between the server clock and the local clock.
///
/// Recomputed on every successful partner login; no persistence across
/// restarts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncClock {
    /// Server epoch seconds at partner login.
    sync_base: u64,
    /// Local epoch seconds at partner login.
    local_base: u64,
    recorded: bool,
}

impl SyncClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the server time from a partner login response, paired with the
    /// local clock reading at this instant.
    pub fn record_base(&mut self, server_epoch_secs: u64) {
        self.record_base_at(server_epoch_secs, unix_now());
    }

    pub(crate) fn record_base_at(&mut self, server_epoch_secs: u64, local_now: u64) {
        self.sync_base = server_epoch_secs;
        self.local_base = local_now;
        self.recorded = true;
    }

    /// Whether a server time base has been recorded since construction.
    pub fn has_base(&self) -> bool {
        self.recorded
    }

    /// Estimated current server time, in epoch seconds.
    pub fn now(&self) -> u64 {
        self.at(unix_now())
    }

    /// Estimated server time for a given local clock reading.
    pub(crate) fn at(&self, local_now: u64) -> u64 {
        self.sync_base + local_now.saturating_sub(self.local_base)
    }

    /// Forget the recorded base (logout).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_instant_same_value() {
        let mut clock = SyncClock::new();
        clock.record_base_at(5000, 100);
        assert_eq!(clock.at(100), 5000);
        assert_eq!(clock.at(100), 5000);
    }

    #[test]
    fn advances_with_local_clock() {
        let mut clock = SyncClock::new();
        clock.record_base_at(5000, 100);
        let before = clock.at(130);
        assert_eq!(before, 5030);
        assert_eq!(clock.at(130 + 7), before + 7);
    }

    #[test]
    fn local_clock_going_backwards_does_not_underflow() {
        let mut clock = SyncClock::new();
        clock.record_base_at(5000, 100);
        assert_eq!(clock.at(90), 5000);
    }

    #[test]
    fn reset_clears_base() {
        let mut clock = SyncClock::new();
        clock.record_base_at(5000, 100);
        assert!(clock.has_base());
        clock.reset();
        assert!(!clock.has_base());
    }
}
