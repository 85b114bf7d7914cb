use std::sync::Mutex;

use time::OffsetDateTime;

/// Server-wide counters (§3 "Statistics"). All fields are updated only
/// under this type's mutex, in the same critical section as the
/// job-state transition or connection event that causes them (§5).
pub struct Stats {
    inner: Mutex<Counters>,
    started_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Counters {
    pub total_connections: u64,
    pub active_connections: u64,
    pub total_scans: u64,
    pub clean_files: u64,
    pub infected_files: u64,
    pub errors: u64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counters::default()),
            started_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn record_connect(&self) {
        let mut c = self.inner.lock().expect("stats mutex poisoned");
        c.total_connections += 1;
        c.active_connections += 1;
    }

    pub fn record_disconnect(&self) {
        let mut c = self.inner.lock().expect("stats mutex poisoned");
        c.active_connections = c.active_connections.saturating_sub(1);
    }

    pub fn record_clean(&self) {
        let mut c = self.inner.lock().expect("stats mutex poisoned");
        c.total_scans += 1;
        c.clean_files += 1;
    }

    pub fn record_infected(&self) {
        let mut c = self.inner.lock().expect("stats mutex poisoned");
        c.total_scans += 1;
        c.infected_files += 1;
    }

    pub fn record_error(&self) {
        let mut c = self.inner.lock().expect("stats mutex poisoned");
        c.total_scans += 1;
        c.errors += 1;
    }

    #[must_use]
    pub fn snapshot(&self) -> Counters {
        *self.inner.lock().expect("stats mutex poisoned")
    }

    #[must_use]
    pub fn started_at(&self) -> OffsetDateTime {
        self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_and_disconnect_track_active_and_total() {
        let stats = Stats::new();
        stats.record_connect();
        stats.record_connect();
        stats.record_disconnect();

        let snap = stats.snapshot();
        assert_eq!(snap.total_connections, 2);
        assert_eq!(snap.active_connections, 1);
    }

    #[test]
    fn scan_outcomes_increment_total_and_breakdown() {
        let stats = Stats::new();
        stats.record_clean();
        stats.record_infected();
        stats.record_error();

        let snap = stats.snapshot();
        assert_eq!(snap.total_scans, 3);
        assert_eq!(snap.clean_files, 1);
        assert_eq!(snap.infected_files, 1);
        assert_eq!(snap.errors, 1);
    }

    #[test]
    fn disconnect_never_underflows_active_connections() {
        let stats = Stats::new();
        stats.record_disconnect();
        assert_eq!(stats.snapshot().active_connections, 0);
    }
}
