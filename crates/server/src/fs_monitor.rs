//! Filesystem monitor (§4.7): watches the processing directory for create
//! and rename-into events and logs each at `DEBUG`.
//!
//! Purely observational (SPEC_FULL.md Open Question (c)) — it never
//! touches `state::JobRegistry`; jobs are created directly by the client
//! listener on successful upload. Sourced from the wider example pack
//! (not the teacher, which has no filesystem-watching equivalent): the
//! `notify` crate is the idiomatic cross-platform wrapper over
//! inotify/kqueue/ReadDirectoryChangesW.

use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;

use logging::{log_debug, log_warning, Logger};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};

use crate::config::Config;
use crate::AppState;

/// Runs the filesystem monitor until `state.shutdown` is observed.
pub fn run(state: Arc<AppState>, logger: Arc<Logger>, config: Config) {
    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher = match notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    }) {
        Ok(watcher) => watcher,
        Err(err) => {
            log_warning!(logger, "Filesystem monitor failed to start: {err}");
            return;
        }
    };

    if let Err(err) = watcher.watch(&config.processing_dir, RecursiveMode::NonRecursive) {
        log_warning!(logger, "Filesystem monitor failed to watch {}: {err}", config.processing_dir.display());
        return;
    }

    while !state.shutdown.is_set() {
        match rx.recv_timeout(config.poll_interval) {
            Ok(Ok(event)) => handle_event(&logger, &config.processing_dir, &event),
            Ok(Err(err)) => log_warning!(logger, "Filesystem monitor error: {err}"),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn handle_event(logger: &Arc<Logger>, watched_dir: &Path, event: &Event) {
    let is_relevant = matches!(event.kind, EventKind::Create(_))
        || matches!(event.kind, EventKind::Modify(ModifyKind::Name(RenameMode::To)));
    if !is_relevant {
        return;
    }
    for path in &event.paths {
        log_debug!(logger, "New file observed in {}: {}", watched_dir.display(), path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange};
    use std::path::PathBuf;

    fn debug_logger() -> Arc<Logger> {
        Arc::new(Logger::console_only(Arc::new(state::LogLevel::new(state::Level::Debug))))
    }

    #[test]
    fn create_events_are_logged_at_debug() {
        let logger = debug_logger();
        let event = Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("/tmp/processing/a"));
        handle_event(&logger, Path::new("/tmp/processing"), &event);

        let lines = logger.recent(10);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("[DEBUG]"));
        assert!(lines[0].contains("/tmp/processing/a"));
    }

    #[test]
    fn rename_to_events_are_logged() {
        let logger = debug_logger();
        let event = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::To))).add_path(PathBuf::from("/tmp/processing/b"));
        handle_event(&logger, Path::new("/tmp/processing"), &event);

        assert_eq!(logger.recent(10).len(), 1);
    }

    #[test]
    fn unrelated_events_are_not_logged() {
        let logger = debug_logger();
        let event = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Any))).add_path(PathBuf::from("/tmp/processing/c"));
        handle_event(&logger, Path::new("/tmp/processing"), &event);

        assert!(logger.recent(10).is_empty());
    }
}
