//! Invokes an external malware scanner binary and normalizes its verdict.
//!
//! A line of the scanner's stdout containing the substring `FOUND` marks
//! the scanned file infected and becomes the verdict line; absence of such
//! a line yields a clean verdict of `"OK"`. If the external binary fails
//! to start, the adapter reports [`ScanVerdict::Error`] — the processor
//! treats that as a job-level scan error, not a process-level fault
//! (§4.3, §7).

use std::ffi::OsString;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};

const DEFAULT_BINARY: &str = "clamscan";
const DEFAULT_ARGS: &[&str] = &["--no-summary"];
const INFECTED_MARKER: &str = "FOUND";

/// The normalized result of scanning one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanVerdict {
    /// No line containing `FOUND` was observed.
    Clean,
    /// The scanner reported an infection; carries the raw verdict line.
    Infected(String),
    /// The scanner could not be invoked at all.
    Error(String),
}

impl ScanVerdict {
    #[must_use]
    pub fn is_infected(&self) -> bool {
        matches!(self, Self::Infected(_))
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The textual verdict stored on the scan job: the raw verdict line
    /// for infected/error outcomes, `"OK"` for a clean scan.
    #[must_use]
    pub fn verdict_text(&self) -> &str {
        match self {
            Self::Clean => "OK",
            Self::Infected(line) | Self::Error(line) => line,
        }
    }
}

/// Invokes a configurable external scanner binary against a path.
#[derive(Debug, Clone)]
pub struct Adapter {
    binary: OsString,
    args: Vec<OsString>,
}

impl Default for Adapter {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.into(),
            args: DEFAULT_ARGS.iter().map(OsString::from).collect(),
        }
    }
}

impl Adapter {
    /// Builds an adapter that invokes `binary` with `args` before the
    /// scanned path. Defaults to `clamscan --no-summary <path>`, matching
    /// the original implementation (§4.3).
    #[must_use]
    pub fn new(binary: impl Into<OsString>, args: impl IntoIterator<Item = impl Into<OsString>>) -> Self {
        Self {
            binary: binary.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Runs the scanner against `path` and returns the normalized verdict.
    pub fn scan(&self, path: &Path) -> ScanVerdict {
        let mut command = Command::new(&self.binary);
        command
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => return ScanVerdict::Error(format!("Error running scanner: {err}")),
        };

        let infected_line = child
            .stdout
            .take()
            .map(|stdout| {
                BufReader::new(stdout)
                    .lines()
                    .map_while(Result::ok)
                    .find(|line| line.contains(INFECTED_MARKER))
            })
            .unwrap_or(None);

        let _ = child.wait();

        match infected_line {
            Some(line) => ScanVerdict::Infected(line),
            None => ScanVerdict::Clean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    /// A stub "scanner" is a shell script; tests exercise the adapter
    /// against a real child process rather than mocking `Command`.
    #[cfg(unix)]
    fn write_stub(dir: &Path, name: &str, script: &str) -> OsString {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        fs::write(&path, script).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path.into_os_string()
    }

    #[test]
    #[cfg(unix)]
    fn clean_scan_has_no_found_line() {
        let dir = tempdir().unwrap();
        let stub = write_stub(dir.path(), "clean.sh", "#!/bin/sh\necho OK\n");
        let target = dir.path().join("payload");
        fs::write(&target, b"hello").unwrap();

        let adapter = Adapter::new(stub, Vec::<OsString>::new());
        let verdict = adapter.scan(&target);

        assert_eq!(verdict, ScanVerdict::Clean);
        assert_eq!(verdict.verdict_text(), "OK");
    }

    #[test]
    #[cfg(unix)]
    fn infected_scan_captures_the_found_line() {
        let dir = tempdir().unwrap();
        let stub = write_stub(
            dir.path(),
            "infected.sh",
            "#!/bin/sh\necho 'payload: Eicar-Test-Signature FOUND'\n",
        );
        let target = dir.path().join("payload");
        fs::write(&target, b"hello").unwrap();

        let adapter = Adapter::new(stub, Vec::<OsString>::new());
        let verdict = adapter.scan(&target);

        assert!(verdict.is_infected());
        assert_eq!(
            verdict.verdict_text(),
            "payload: Eicar-Test-Signature FOUND"
        );
    }

    #[test]
    fn missing_binary_is_reported_as_a_scan_error() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("payload");
        fs::write(&target, b"hello").unwrap();

        let adapter = Adapter::new("definitely-not-a-real-scanner-binary", Vec::<OsString>::new());
        let verdict = adapter.scan(&target);

        assert!(verdict.is_error());
    }
}
