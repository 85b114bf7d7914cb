//! Shared, internally-synchronized aggregates used by every server
//! activity: the client registry, job registry, statistics, log level, and
//! shutdown flag (§3).
//!
//! Lock order is fixed at `clients -> jobs -> stats -> log` (§3, §5); this
//! crate never itself acquires two of its mutexes nested in the wrong
//! order, and callers composing [`State`] with the logging crate's sink
//! must preserve that order by acquiring the log mutex last.

mod client;
mod error;
mod job;
mod log_level;
mod shutdown;
mod signal;
mod stats;

use std::sync::Arc;

pub use client::{ClientRegistry, SlotHandle};
pub use error::{StateError, StateResult};
pub use job::{JobRegistry, JobStatus, ScanJob};
pub use log_level::{Level, LogLevel};
pub use shutdown::ShutdownFlag;
pub use signal::JobSignal;
pub use stats::{Counters, Stats};

/// The full shared-state aggregate, generic over the transport handle
/// type the client registry stores (the `server` crate instantiates this
/// with `TcpStream`). Constructed once by the supervisor and shared by
/// reference with every activity (§9 "Global mutable state": "a shared,
/// internally-synchronized object passed explicitly to each activity").
pub struct State<H> {
    pub clients: ClientRegistry<H>,
    pub jobs: JobRegistry,
    pub stats: Stats,
    pub log_level: Arc<LogLevel>,
    pub shutdown: ShutdownFlag,
    pub job_signal: JobSignal,
}

impl<H> Default for State<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> State<H> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            clients: ClientRegistry::new(),
            jobs: JobRegistry::new(),
            stats: Stats::new(),
            log_level: Arc::new(LogLevel::default()),
            shutdown: ShutdownFlag::new(),
            job_signal: JobSignal::new(),
        }
    }
}
