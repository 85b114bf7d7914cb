//! Admin listener (§4.4): one admin connection at a time on the local
//! transport, dispatching [`wire::AdminCommand`] under the appropriate
//! mutex.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use logging::{log_info, log_warning, Logger};
use wire::{AdminCommand, Status};

use crate::config::Config;
use crate::AppState;

/// Runs the admin listener until `state.shutdown` is observed. Exactly one
/// admin session is active at a time; a second concurrent connection is
/// told so and closed immediately (§4.4).
///
/// Each accepted session runs on its own thread (mirroring `client.rs`'s
/// `admit()`/`session()` split) so the accept loop keeps polling while a
/// session is open — otherwise a second dial-in while the first session is
/// still active would simply sit in the kernel backlog instead of being
/// rejected.
pub fn run(state: Arc<AppState>, logger: Arc<Logger>, config: Config, listener: UnixListener) {
    let connected = Arc::new(AtomicBool::new(false));
    listener
        .set_nonblocking(true)
        .expect("admin listener nonblocking");
    let mut sessions: Vec<std::thread::JoinHandle<()>> = Vec::new();

    while !state.shutdown.is_set() {
        match listener.accept() {
            Ok((stream, _addr)) => {
                if connected.swap(true, Ordering::AcqRel) {
                    let mut stream = stream;
                    let _ = wire::respond(&mut stream, Status::Error, "Admin already connected");
                    continue;
                }
                let state = Arc::clone(&state);
                let logger = Arc::clone(&logger);
                let config = config.clone();
                let connected = Arc::clone(&connected);
                sessions.push(std::thread::spawn(move || {
                    handle_session(&state, &logger, &config, stream);
                    connected.store(false, Ordering::Release);
                }));
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(config.poll_interval);
            }
            Err(_) => std::thread::sleep(config.poll_interval),
        }
        sessions.retain(|h: &std::thread::JoinHandle<()>| !h.is_finished());
    }

    for handle in sessions {
        let _ = handle.join();
    }
}

fn handle_session(state: &Arc<AppState>, logger: &Arc<Logger>, config: &Config, stream: UnixStream) {
    stream
        .set_read_timeout(Some(config.poll_interval))
        .expect("admin stream read timeout");
    let mut writer = stream.try_clone().expect("admin stream clone");
    let mut reader = BufReader::new(stream);
    let mut last_activity = Instant::now();

    loop {
        if state.shutdown.is_set() {
            break;
        }
        if last_activity.elapsed() >= config.admin_idle_timeout {
            log_info!(logger, "Admin session idle for {}s, closing", config.admin_idle_timeout.as_secs());
            break;
        }

        match wire::read_line(&mut reader) {
            Ok(line) => {
                last_activity = Instant::now();
                if dispatch(&line, state, logger, &mut writer) {
                    break;
                }
            }
            Err(wire::WireError::Transport(e))
                if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                continue;
            }
            Err(_) => break,
        }
    }
}

/// Returns `true` when the session should close (i.e. `SHUTDOWN_SERVER`).
fn dispatch(line: &str, state: &Arc<AppState>, logger: &Arc<Logger>, writer: &mut UnixStream) -> bool {
    let command = match AdminCommand::parse(line) {
        Ok(command) => command,
        Err(_) => {
            let _ = wire::respond(writer, Status::Error, "Invalid command format");
            return false;
        }
    };

    match command {
        AdminCommand::AdminAuth => {
            let _ = wire::respond(writer, Status::Ok, "Authenticated");
        }
        AdminCommand::SetLogLevel { level } => match state::Level::parse(&level) {
            Some(parsed) => {
                state.log_level.set(parsed);
                let _ = wire::respond(writer, Status::Ok, "Log level updated");
            }
            None => {
                let _ = wire::respond(writer, Status::Error, "Unknown log level");
            }
        },
        AdminCommand::GetLogs => {
            let lines = logger.recent(logging::RING_CAPACITY);
            let _ = wire::respond(writer, Status::Ok, &lines.join(" | "));
        }
        AdminCommand::GetStats => {
            let snap = state.stats.snapshot();
            let message = format!(
                "Connections: {}, Active: {}, Scans: {}, Clean: {}, Infected: {}",
                snap.total_connections, snap.active_connections, snap.total_scans, snap.clean_files, snap.infected_files
            );
            let _ = wire::respond(writer, Status::Ok, &message);
        }
        AdminCommand::DisconnectClient { ip } => {
            let handles = state.clients.handles_matching_ip(&ip);
            let count = handles.len();
            for handle in handles {
                state.clients.with_handle(handle, |tcp| {
                    let _ = tcp.shutdown(std::net::Shutdown::Both);
                });
                state.clients.release(handle);
                state.stats.record_disconnect();
            }
            let _ = wire::respond(writer, Status::Ok, &format!("Disconnected {count} client(s)"));
        }
        AdminCommand::ShutdownServer => {
            let _ = wire::respond(writer, Status::Ok, "Server shutting down");
            state.shutdown.set();
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::time::Duration;
    use tempfile::tempdir;

    fn build_state() -> Arc<AppState> {
        Arc::new(AppState::new())
    }

    #[test]
    fn second_concurrent_admin_is_rejected() {
        let dir = tempdir().unwrap();
        let sock_path = dir.path().join("admin.sock");
        let listener = UnixListener::bind(&sock_path).unwrap();
        let state = build_state();
        let logger = Arc::new(Logger::console_only(Arc::new(state::LogLevel::default())));
        let config = Config {
            admin_socket_path: sock_path.clone(),
            poll_interval: Duration::from_millis(50),
            admin_idle_timeout: Duration::from_millis(500),
            ..Config::default()
        };

        let shutdown_for_thread = Arc::clone(&state);
        let handle = std::thread::spawn(move || run(shutdown_for_thread, logger, config, listener));

        // First connection occupies the admin slot; hold it open while we
        // dial a second connection and observe the rejection.
        let _first = UnixStream::connect(&sock_path).unwrap();
        std::thread::sleep(Duration::from_millis(150));
        let mut second = UnixStream::connect(&sock_path).unwrap();
        second.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let mut buf = [0u8; 128];
        let n = second.read(&mut buf).unwrap();
        let response = String::from_utf8_lossy(&buf[..n]);
        assert!(response.starts_with("ERROR Admin already connected"));

        state.shutdown.set();
        handle.join().unwrap();
    }
}
