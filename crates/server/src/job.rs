//! Job processor (§4.6): a single worker that drains `PENDING` jobs
//! oldest-id-first, runs the scanner adapter, and records the verdict.
//!
//! The `PENDING -> PROCESSING` claim is a compare-and-swap under the job
//! registry's own mutex (`JobRegistry::claim_oldest_pending`), so the
//! worker never holds the jobs mutex while the scanner child process runs
//! — it reacquires jobs (briefly, then stats) only to record the outcome,
//! preserving the `jobs -> stats` slice of the fixed lock order (§5).

use std::sync::Arc;

use logging::{log_debug, Logger};
use scanner::{Adapter, ScanVerdict};

use crate::config::Config;
use crate::AppState;

/// Runs the job processor until `state.shutdown` is observed.
pub fn run(state: Arc<AppState>, logger: Arc<Logger>, config: Config, scanner: Adapter) {
    while !state.shutdown.is_set() {
        if !state.job_signal.wait_timeout(config.poll_interval) {
            continue;
        }
        if state.shutdown.is_set() {
            break;
        }

        let Some(job) = state.jobs.claim_oldest_pending() else {
            continue;
        };

        log_debug!(logger, "Scanning job {} ({})", job.id, job.filename);
        let verdict = scanner.scan(&job.payload_path);
        let (infected, failed, text) = match &verdict {
            ScanVerdict::Clean => (false, false, verdict.verdict_text().to_owned()),
            ScanVerdict::Infected(_) => (true, false, verdict.verdict_text().to_owned()),
            ScanVerdict::Error(_) => (false, true, verdict.verdict_text().to_owned()),
        };

        state.jobs.complete(job.id, infected, text, failed);
        if failed {
            state.stats.record_error();
        } else if infected {
            state.stats.record_infected();
        } else {
            state.stats.record_clean();
        }
    }
}
