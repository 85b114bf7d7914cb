//! Client listener (§4.5): accepts many TCP clients and multiplexes their
//! request/response traffic.
//!
//! Concurrency model (SPEC_FULL.md Open Question (e)): one OS thread per
//! accepted connection, bounded by the 100-slot `ClientRegistry`, plus one
//! acceptor thread. Each session thread blocks on its own socket with a
//! 1s read timeout so it re-checks the shutdown flag at the same ≤1s
//! cadence as the other activities; the acceptor thread does the same via
//! a 1s accept timeout. A session owns its connection exclusively for the
//! life of the thread, so per-client FIFO ordering (§5) holds trivially.

use std::fs;
use std::io::{BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;

use codec::{Handshake, SessionKey};
use logging::{log_debug, log_warning, Logger};
use state::SlotHandle;
use wire::{ClientCommand, Status, WireError};

use crate::config::Config;
use crate::AppState;

/// Runs the client listener until `state.shutdown` is observed, joining
/// every session thread it spawned before returning.
pub fn run(state: Arc<AppState>, logger: Arc<Logger>, config: Config, listener: TcpListener) {
    listener
        .set_nonblocking(true)
        .expect("client listener nonblocking");
    let mut sessions = Vec::new();

    while !state.shutdown.is_set() {
        match listener.accept() {
            Ok((stream, addr)) => admit(&state, &logger, &config, stream, addr, &mut sessions),
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

fn admit(
    state: &Arc<AppState>,
    logger: &Arc<Logger>,
    config: &Config,
    stream: TcpStream,
    addr: SocketAddr,
    sessions: &mut Vec<std::thread::JoinHandle<()>>,
) {
    let peer_addr = addr.to_string();
    let Ok(registry_handle) = stream.try_clone() else {
        return;
    };

    match state.clients.register(registry_handle, peer_addr.clone()) {
        Ok(slot) => {
            state.stats.record_connect();
            let state = Arc::clone(state);
            let logger = Arc::clone(logger);
            let config = config.clone();
            sessions.push(std::thread::spawn(move || {
                session(state, logger, config, stream, slot, peer_addr);
            }));
        }
        Err(_) => {
            log_warning!(logger, "Maximum clients reached");
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
    }
}

fn session(
    state: Arc<AppState>,
    logger: Arc<Logger>,
    config: Config,
    mut stream: TcpStream,
    slot: SlotHandle,
    peer_addr: String,
) {
    let session_key = match Handshake::server_side(&mut stream) {
        Ok(key) => key,
        Err(err) => {
            log_debug!(logger, "Handshake with {peer_addr} failed: {err}");
            state.clients.release(slot);
            state.stats.record_disconnect();
            return;
        }
    };

    let _ = stream.set_read_timeout(Some(config.poll_interval));
    let Ok(mut writer) = stream.try_clone() else {
        state.clients.release(slot);
        state.stats.record_disconnect();
        return;
    };
    let mut reader = BufReader::new(stream);

    loop {
        if state.shutdown.is_set() {
            break;
        }
        state.clients.touch(slot);

        match wire::read_line(&mut reader) {
            Ok(line) => {
                state.clients.touch(slot);
                dispatch(&line, &state, &logger, &config, &mut reader, &mut writer, &session_key, slot);
            }
            Err(WireError::Transport(e))
                if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                continue;
            }
            Err(_) => break,
        }
    }

    state.clients.release(slot);
    state.stats.record_disconnect();
}

/// Dispatches one parsed command line. Every client command keeps the
/// session open; only a transport error or shutdown ends it, so this has
/// no boolean return unlike the admin dialect's `SHUTDOWN_SERVER`.
#[allow(clippy::too_many_arguments)]
fn dispatch(
    line: &str,
    state: &Arc<AppState>,
    logger: &Arc<Logger>,
    config: &Config,
    reader: &mut BufReader<TcpStream>,
    writer: &mut TcpStream,
    session_key: &SessionKey,
    slot: SlotHandle,
) {
    let command = match ClientCommand::parse(line) {
        Ok(command) => command,
        Err(_) => {
            let _ = wire::respond(writer, Status::Error, "Invalid command format");
            return;
        }
    };

    match command {
        ClientCommand::RegisterClient => {
            let _ = wire::respond(writer, Status::Ok, "Client registered");
        }
        ClientCommand::UploadFile { filename, ciphertext_size } => {
            handle_upload(state, logger, config, reader, writer, session_key, slot, &filename, ciphertext_size);
        }
        ClientCommand::GetScanStatus { job_id } => {
            handle_status(state, writer, job_id);
        }
        ClientCommand::GetScanResult { job_id } => {
            handle_result(state, writer, job_id);
        }
        ClientCommand::DownloadFile { filename } => {
            handle_download(config, writer, session_key, &filename);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_upload(
    state: &Arc<AppState>,
    logger: &Arc<Logger>,
    config: &Config,
    reader: &mut BufReader<TcpStream>,
    writer: &mut TcpStream,
    session_key: &SessionKey,
    slot: SlotHandle,
    filename: &str,
    ciphertext_size: u64,
) {
    if wire::respond(writer, Status::Ok, "Ready to receive file").is_err() {
        return;
    }

    // The transfer owns the connection exclusively until the advertised
    // byte count has arrived, so a slow upload isn't cut short by the
    // listener's 1s poll cadence (§4.5).
    let _ = reader.get_ref().set_read_timeout(None);
    let ciphertext = wire::recv_exact(reader, ciphertext_size);
    let _ = reader.get_ref().set_read_timeout(Some(config.poll_interval));

    let ciphertext = match ciphertext {
        Ok(bytes) => bytes,
        Err(_) => {
            let _ = wire::respond(writer, Status::Error, "Upload ended before the advertised byte count arrived");
            return;
        }
    };

    let plaintext = session_key.open(&ciphertext);
    let payload_path = config.processing_dir.join(sanitize_filename(filename));
    if let Err(err) = fs::write(&payload_path, &plaintext) {
        log_warning!(logger, "Failed to store upload {filename}: {err}");
        let _ = wire::respond(writer, Status::Error, "Failed to store upload");
        return;
    }

    match state.jobs.enqueue(Some(slot), filename.to_owned(), payload_path.clone(), plaintext.len() as u64) {
        Ok(id) => {
            state.job_signal.post();
            let _ = wire::respond(writer, Status::Ok, &format!("Job ID: {id}"));
        }
        Err(_) => {
            let _ = fs::remove_file(&payload_path);
            let _ = wire::respond(writer, Status::Error, "Job table full");
        }
    }
}

fn handle_status(state: &Arc<AppState>, writer: &mut TcpStream, job_id: u64) {
    match state.jobs.get(job_id) {
        Some(job) => {
            let _ = wire::respond(writer, Status::Ok, &job.status.to_string());
        }
        None => {
            let _ = wire::respond(writer, Status::NotFound, "Unknown job id");
        }
    }
}

fn handle_result(state: &Arc<AppState>, writer: &mut TcpStream, job_id: u64) {
    match state.jobs.get(job_id) {
        None => {
            let _ = wire::respond(writer, Status::NotFound, "Unknown job id");
        }
        Some(job) if !job.status.is_terminal() => {
            let _ = wire::respond(writer, Status::Pending, "Scan in progress");
        }
        Some(job) => {
            let verdict = job.verdict.unwrap_or_default();
            let status = match job.status {
                state::JobStatus::Error => Status::Error,
                _ if job.infected => Status::Infected,
                _ => Status::Clean,
            };
            let _ = wire::respond(writer, status, &verdict);
        }
    }
}

fn handle_download(config: &Config, writer: &mut TcpStream, session_key: &SessionKey, filename: &str) {
    let path = config.outgoing_dir.join(sanitize_filename(filename));
    let Ok(plaintext) = fs::read(&path) else {
        let _ = wire::respond(writer, Status::NotFound, "File not found");
        return;
    };
    let ciphertext = session_key.seal(&plaintext);
    let size = ciphertext.len();
    if write!(writer, "SIZE {size}\n").is_err() {
        return;
    }
    let _ = writer.write_all(&ciphertext);
    let _ = writer.flush();
}

/// Strips any path components from a client-supplied filename so uploads
/// and downloads can't escape `processing/`/`outgoing/` (§6).
fn sanitize_filename(filename: &str) -> String {
    std::path::Path::new(filename)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_owned())
}
