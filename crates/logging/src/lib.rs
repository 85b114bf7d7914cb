//! Level-filtered, timestamped logger writing to stdout and an append-only
//! log file, with a bounded in-memory ring buffer backing `GET_LOGS`
//! (§3, §4, SPEC_FULL.md's "Logging" ambient-stack section).
//!
//! The log mutex is held across both the console write and the file write
//! so interleaved activities never tear a line in half — the one place §5
//! allows a mutex to be held across blocking I/O.

use std::collections::VecDeque;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

pub use state::Level;

/// Number of recent lines retained for `GET_LOGS` (SPEC_FULL.md).
pub const RING_CAPACITY: usize = 200;

const TIMESTAMP_FORMAT: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

struct Sink {
    file: Option<File>,
    ring: VecDeque<String>,
}

/// The concrete logger: a level gate backed by [`state::LogLevel`], a
/// serialized dual sink, and a ring buffer.
pub struct Logger {
    level: Arc<state::LogLevel>,
    sink: Mutex<Sink>,
}

impl Logger {
    /// Opens (creating if needed) `path` for append and wires it to
    /// `level`. Failure to open the file is not fatal: the console sink
    /// still works (§7 "Log file write failure is silent").
    pub fn new(level: Arc<state::LogLevel>, path: impl AsRef<Path>) -> Self {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .ok();
        Self {
            level,
            sink: Mutex::new(Sink {
                file,
                ring: VecDeque::with_capacity(RING_CAPACITY),
            }),
        }
    }

    /// A console-only logger with no in-memory ring persistence file,
    /// useful for tests and for standalone binaries.
    #[must_use]
    pub fn console_only(level: Arc<state::LogLevel>) -> Self {
        Self {
            level,
            sink: Mutex::new(Sink {
                file: None,
                ring: VecDeque::with_capacity(RING_CAPACITY),
            }),
        }
    }

    #[must_use]
    pub fn level(&self) -> &state::LogLevel {
        &self.level
    }

    /// Formats and emits a line if `level` is at or above the current
    /// threshold. Below-threshold calls never reach `format!` (§3).
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.level.allows(level) {
            return;
        }
        let timestamp = OffsetDateTime::now_utc()
            .format(TIMESTAMP_FORMAT)
            .unwrap_or_else(|_| "????-??-?? ??:??:??".to_owned());
        let line = format!("[{timestamp}] [{level}] {args}");
        self.emit(line);
    }

    fn emit(&self, line: String) {
        #[cfg(feature = "tracing")]
        tracing::event!(tracing::Level::INFO, line = %line);

        let mut sink = self.sink.lock().expect("log sink mutex poisoned");
        println!("{line}");
        if let Some(file) = sink.file.as_mut() {
            let _ = writeln!(file, "{line}").and_then(|()| file.flush());
        }
        if sink.ring.len() == RING_CAPACITY {
            sink.ring.pop_front();
        }
        sink.ring.push_back(line);
    }

    /// The most recent lines, oldest first, for the `GET_LOGS` admin
    /// command. `n` is clamped to the ring's capacity.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<String> {
        let sink = self.sink.lock().expect("log sink mutex poisoned");
        let skip = sink.ring.len().saturating_sub(n);
        sink.ring.iter().skip(skip).cloned().collect()
    }
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log($crate::Level::Debug, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log($crate::Level::Info, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log($crate::Level::Warning, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log($crate::Level::Error, format_args!($($arg)*))
    };
}
