use std::io;

use thiserror::Error;

/// Fatal initialization failures (§6 "Exit codes": 1 on init failure).
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to bind client listener on port {port}")]
    ClientBind {
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("failed to bind admin listener at {path}")]
    AdminBind {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to create required directory {path}")]
    DirectoryCreate {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to spawn {activity} thread")]
    ThreadSpawn {
        activity: &'static str,
        #[source]
        source: io::Error,
    },
}

/// The outcome of a full run, mapped by the binary to a process exit code
/// (SPEC_FULL.md "Process exit / signal handling"; §6 "Exit codes").
#[derive(Debug)]
pub enum RunOutcome {
    /// Clean shutdown after the flag was set by signal or admin command.
    Clean,
    /// Initialization failed before any activity could be spawned.
    InitFailed(InitError),
}

/// Maps a [`RunOutcome`] to the process exit code required by §6.
#[must_use]
pub fn exit_code_from(outcome: &RunOutcome) -> std::process::ExitCode {
    match outcome {
        RunOutcome::Clean => std::process::ExitCode::SUCCESS,
        RunOutcome::InitFailed(_) => std::process::ExitCode::FAILURE,
    }
}
