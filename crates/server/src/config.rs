use std::path::PathBuf;
use std::time::Duration;

/// Startup-time constants, centralized so a future config file or
/// environment override has one seam to extend (SPEC_FULL.md
/// "Configuration"; the server itself takes no CLI flags, per §6).
#[derive(Debug, Clone)]
pub struct Config {
    /// `AF_INET` port the client listener binds, backlog 100 (§6).
    pub client_port: u16,
    pub client_backlog: i32,
    /// Local-domain path the admin listener binds, backlog 1 (§6).
    pub admin_socket_path: PathBuf,
    pub admin_backlog: i32,
    pub logs_dir: PathBuf,
    pub processing_dir: PathBuf,
    pub outgoing_dir: PathBuf,
    pub log_file: PathBuf,
    /// Cadence at which every activity re-checks the shutdown flag (§5).
    pub poll_interval: Duration,
    /// Admin session idle timeout (§4.4).
    pub admin_idle_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        let logs_dir = PathBuf::from("logs");
        let log_file = logs_dir.join("server.log");
        Self {
            client_port: 8080,
            client_backlog: 100,
            admin_socket_path: PathBuf::from("/tmp/antivirus_admin.sock"),
            admin_backlog: 1,
            processing_dir: PathBuf::from("processing"),
            outgoing_dir: PathBuf::from("outgoing"),
            log_file,
            logs_dir,
            poll_interval: Duration::from_secs(1),
            admin_idle_timeout: Duration::from_secs(300),
        }
    }
}
