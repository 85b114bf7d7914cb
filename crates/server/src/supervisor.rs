//! Supervisor (§4.8): installs signal handlers, creates required
//! directories, opens both listening endpoints, spawns the four
//! activities, and joins them on shutdown.
//!
//! Mirrors `bin/oc-rsyncd`'s `run(...) -> exit_code_from(status)` split
//! between a library-level `run` that returns an outcome and a thin
//! binary that maps it to a process exit code (SPEC_FULL.md "Process
//! exit / signal handling").

use std::fs;
use std::net::TcpListener;
use std::os::unix::net::UnixListener;
use std::sync::Arc;
use std::time::Duration;

use socket2::{Domain, SockAddr, Socket, Type};

use logging::{log_info, Logger};
use scanner::Adapter;

use crate::config::Config;
use crate::error::{InitError, RunOutcome};
use crate::{admin, client, fs_monitor, job, signals, AppState};

/// Runs the full server until shutdown is requested by signal or by an
/// admin `SHUTDOWN_SERVER`, then returns once every activity has joined.
pub fn run() -> RunOutcome {
    run_with(Config::default())
}

/// Same as [`run`] but with an explicit [`Config`], for tests that need a
/// scratch directory and an ephemeral port.
pub fn run_with(config: Config) -> RunOutcome {
    signals::install();

    if let Err(err) = create_directories(&config) {
        return RunOutcome::InitFailed(err);
    }

    let state: Arc<AppState> = Arc::new(AppState::new());
    let logger = Arc::new(Logger::new(Arc::clone(&state.log_level), &config.log_file));

    let client_listener = match bind_client_listener(&config) {
        Ok(listener) => listener,
        Err(source) => {
            return RunOutcome::InitFailed(InitError::ClientBind { port: config.client_port, source });
        }
    };
    let admin_listener = match bind_admin_listener(&config) {
        Ok(listener) => listener,
        Err(source) => {
            return RunOutcome::InitFailed(InitError::AdminBind {
                path: config.admin_socket_path.display().to_string(),
                source,
            });
        }
    };

    log_info!(logger, "Server started on port {}", config.client_port);

    let admin_handle = {
        let state = Arc::clone(&state);
        let logger = Arc::clone(&logger);
        let config = config.clone();
        match spawn_activity("admin listener", move || admin::run(state, logger, config, admin_listener)) {
            Ok(handle) => handle,
            Err(err) => return RunOutcome::InitFailed(err),
        }
    };
    let client_handle = {
        let state = Arc::clone(&state);
        let logger = Arc::clone(&logger);
        let config = config.clone();
        match spawn_activity("client listener", move || client::run(state, logger, config, client_listener)) {
            Ok(handle) => handle,
            Err(err) => return RunOutcome::InitFailed(err),
        }
    };
    let job_handle = {
        let state = Arc::clone(&state);
        let logger = Arc::clone(&logger);
        let config = config.clone();
        match spawn_activity("job processor", move || job::run(state, logger, config, Adapter::default())) {
            Ok(handle) => handle,
            Err(err) => return RunOutcome::InitFailed(err),
        }
    };
    let fs_monitor_handle = {
        let state = Arc::clone(&state);
        let logger = Arc::clone(&logger);
        let config = config.clone();
        match spawn_activity("filesystem monitor", move || fs_monitor::run(state, logger, config)) {
            Ok(handle) => handle,
            Err(err) => return RunOutcome::InitFailed(err),
        }
    };

    while !state.shutdown.is_set() && !signals::was_signaled() {
        std::thread::sleep(config.poll_interval);
    }
    state.shutdown.set();

    log_info!(logger, "Shutting down server...");

    state.clients.drain(|handle| {
        let _ = handle.shutdown(std::net::Shutdown::Both);
    });
    let _ = fs::remove_file(&config.admin_socket_path);

    let _ = admin_handle.join();
    let _ = client_handle.join();
    let _ = job_handle.join();
    let _ = fs_monitor_handle.join();

    RunOutcome::Clean
}

fn spawn_activity<F>(activity: &'static str, f: F) -> Result<std::thread::JoinHandle<()>, InitError>
where
    F: FnOnce() + Send + 'static,
{
    std::thread::Builder::new()
        .name(activity.to_owned())
        .spawn(f)
        .map_err(|source| InitError::ThreadSpawn { activity, source })
}

fn create_directories(config: &Config) -> Result<(), InitError> {
    for dir in [&config.logs_dir, &config.processing_dir, &config.outgoing_dir] {
        fs::create_dir_all(dir).map_err(|source| InitError::DirectoryCreate {
            path: dir.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

fn bind_client_listener(config: &Config) -> std::io::Result<TcpListener> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    let addr: std::net::SocketAddr = ([0, 0, 0, 0], config.client_port).into();
    socket.bind(&SockAddr::from(addr))?;
    socket.listen(config.client_backlog)?;
    Ok(socket.into())
}

fn bind_admin_listener(config: &Config) -> std::io::Result<UnixListener> {
    let _ = fs::remove_file(&config.admin_socket_path);
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    socket.bind(&SockAddr::unix(&config.admin_socket_path)?)?;
    socket.listen(config.admin_backlog)?;
    Ok(socket.into())
}
