use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

use time::OffsetDateTime;

use crate::client::SlotHandle;
use crate::error::{StateError, StateResult};

/// Capacity of the job registry (§3, §4.6).
pub const CAPACITY: usize = 1000;

/// A scan job's lifecycle state. Transitions are monotonic along
/// `PENDING -> PROCESSING -> (COMPLETED|ERROR)` (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// A single scan job (§3 "Scan job").
#[derive(Debug, Clone)]
pub struct ScanJob {
    pub id: u64,
    pub owner: Option<SlotHandle>,
    pub filename: String,
    pub payload_path: PathBuf,
    pub payload_size: u64,
    pub status: JobStatus,
    pub verdict: Option<String>,
    pub infected: bool,
    pub created_at: OffsetDateTime,
    pub completed_at: Option<OffsetDateTime>,
}

/// Bounded, id-ordered table of scan jobs (§3, §4.6).
///
/// Ids are assigned monotonically at enqueue. The `PENDING -> PROCESSING`
/// transition is a compare-and-swap under this registry's mutex, so at
/// most one worker ever claims a given job even if the processor pool is
/// later expanded beyond one (§4.6 "Exactly-once").
pub struct JobRegistry {
    inner: Mutex<Inner>,
}

struct Inner {
    jobs: Vec<ScanJob>,
    next_id: u64,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                jobs: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Enqueues a new job in `PENDING` state.
    ///
    /// # Errors
    /// Returns [`StateError::JobTableFull`] once 1000 jobs are held; the
    /// caller is expected to delete the just-stored ciphertext and reply
    /// `ERROR` (§3, §7 `ResourceExhausted`).
    pub fn enqueue(
        &self,
        owner: Option<SlotHandle>,
        filename: String,
        payload_path: PathBuf,
        payload_size: u64,
    ) -> StateResult<u64> {
        let mut inner = self.inner.lock().expect("job registry mutex poisoned");
        if inner.jobs.len() >= CAPACITY {
            return Err(StateError::JobTableFull);
        }
        let id = inner.next_id;
        inner.next_id += 1;
        inner.jobs.push(ScanJob {
            id,
            owner,
            filename,
            payload_path,
            payload_size,
            status: JobStatus::Pending,
            verdict: None,
            infected: false,
            created_at: OffsetDateTime::now_utc(),
            completed_at: None,
        });
        Ok(id)
    }

    /// Claims the oldest `PENDING` job, transitioning it to `PROCESSING`
    /// under this registry's mutex, and returns a clone of it for the
    /// caller to run the scanner against (§4.6).
    #[must_use]
    pub fn claim_oldest_pending(&self) -> Option<ScanJob> {
        let mut inner = self.inner.lock().expect("job registry mutex poisoned");
        let job = inner
            .jobs
            .iter_mut()
            .filter(|j| j.status == JobStatus::Pending)
            .min_by_key(|j| j.id)?;
        job.status = JobStatus::Processing;
        Some(job.clone())
    }

    /// Records the terminal outcome of a claimed job.
    pub fn complete(&self, id: u64, infected: bool, verdict: String, failed: bool) {
        let mut inner = self.inner.lock().expect("job registry mutex poisoned");
        if let Some(job) = inner.jobs.iter_mut().find(|j| j.id == id) {
            job.status = if failed { JobStatus::Error } else { JobStatus::Completed };
            job.infected = infected;
            job.verdict = Some(verdict);
            job.completed_at = Some(OffsetDateTime::now_utc());
        }
    }

    #[must_use]
    pub fn get(&self, id: u64) -> Option<ScanJob> {
        let inner = self.inner.lock().expect("job registry mutex poisoned");
        inner.jobs.iter().find(|j| j.id == id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_assigns_monotonically_increasing_ids() {
        let registry = JobRegistry::new();
        let first = registry.enqueue(None, "a".into(), "/tmp/a".into(), 5).unwrap();
        let second = registry.enqueue(None, "b".into(), "/tmp/b".into(), 9).unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[test]
    fn claim_oldest_pending_prefers_lowest_id_and_is_exactly_once() {
        let registry = JobRegistry::new();
        registry.enqueue(None, "a".into(), "/tmp/a".into(), 1).unwrap();
        registry.enqueue(None, "b".into(), "/tmp/b".into(), 1).unwrap();

        let claimed = registry.claim_oldest_pending().unwrap();
        assert_eq!(claimed.id, 1);
        assert_eq!(claimed.status, JobStatus::Processing);

        let next = registry.claim_oldest_pending().unwrap();
        assert_eq!(next.id, 2);

        assert!(registry.claim_oldest_pending().is_none());
    }

    #[test]
    fn complete_marks_terminal_state_and_verdict() {
        let registry = JobRegistry::new();
        let id = registry.enqueue(None, "a".into(), "/tmp/a".into(), 1).unwrap();
        registry.claim_oldest_pending().unwrap();
        registry.complete(id, false, "OK".to_owned(), false);

        let job = registry.get(id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.verdict.as_deref(), Some("OK"));
        assert!(job.completed_at.is_some());
    }

    #[test]
    fn complete_with_failed_flag_sets_error_status() {
        let registry = JobRegistry::new();
        let id = registry.enqueue(None, "a".into(), "/tmp/a".into(), 1).unwrap();
        registry.claim_oldest_pending().unwrap();
        registry.complete(id, false, "Error running scanner: not found".to_owned(), true);

        assert_eq!(registry.get(id).unwrap().status, JobStatus::Error);
    }

    #[test]
    fn unknown_job_id_is_none() {
        let registry = JobRegistry::new();
        assert!(registry.get(42).is_none());
    }

    #[test]
    fn table_full_rejects_further_enqueues() {
        let registry = JobRegistry::new();
        for i in 0..CAPACITY {
            registry
                .enqueue(None, format!("f{i}"), format!("/tmp/f{i}").into(), 1)
                .unwrap();
        }
        assert_eq!(
            registry
                .enqueue(None, "overflow".into(), "/tmp/overflow".into(), 1)
                .unwrap_err(),
            StateError::JobTableFull
        );
    }
}
