//! Wires the four long-lived activities (§4.4-§4.7) and the supervisor
//! (§4.8) onto the shared [`AppState`] aggregate from the `state` crate.
//!
//! Each activity module (`admin`, `client`, `job`, `fs_monitor`) exposes a
//! `run(state, logger, config, ...)` function spawned on its own thread by
//! [`supervisor::run`]; none of them hold more than one of `state`'s
//! mutexes at a time across a suspension point, preserving the
//! `clients -> jobs -> stats -> log` order (§3, §5).

pub mod admin;
pub mod client;
pub mod config;
pub mod error;
pub mod fs_monitor;
pub mod job;
pub mod signals;
pub mod supervisor;

/// The shared-state aggregate instantiated for this server: the client
/// registry stores `TcpStream` handles so the admin listener's
/// `DISCONNECT_CLIENT` and the supervisor's shutdown sweep can shut a
/// peer's socket down from another thread.
pub type AppState = state::State<std::net::TcpStream>;

pub use config::Config;
pub use error::{exit_code_from, InitError, RunOutcome};
pub use supervisor::run;
