use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// A counting semaphore built from a `Mutex<u64>` + `Condvar`, since `std`
/// exposes no portable counting semaphore (SPEC_FULL.md Open Question d).
/// Functionally equivalent to the original's `sem_post`/`sem_timedwait`
/// pair: `post` is called once per enqueue, `wait_timeout` is called by the
/// single job-processor worker.
#[derive(Default)]
pub struct JobSignal {
    count: Mutex<u64>,
    condvar: Condvar,
}

impl JobSignal {
    #[must_use]
    pub fn new() -> Self {
        Self {
            count: Mutex::new(0),
            condvar: Condvar::new(),
        }
    }

    /// Signals that one more job is available to claim.
    pub fn post(&self) {
        let mut count = self.count.lock().expect("job signal mutex poisoned");
        *count += 1;
        self.condvar.notify_one();
    }

    /// Blocks up to `timeout` for a pending job, consuming one count if one
    /// was available. Returns `true` if a job was claimed, `false` on
    /// timeout — the caller should then re-check the shutdown flag, giving
    /// the ≤1s shutdown cadence required by §5.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let count = self.count.lock().expect("job signal mutex poisoned");
        let (mut count, result) = self
            .condvar
            .wait_timeout_while(count, timeout, |count| *count == 0)
            .expect("job signal mutex poisoned");
        if result.timed_out() {
            return false;
        }
        *count -= 1;
        true
    }
}
