use std::fs;
use std::io::{self, BufRead, ErrorKind, Read, Write};
use std::path::Path;

use crate::error::{WireError, WireResult};
use crate::status::Status;

/// Reads one newline-terminated line, stripping the trailing `\n` (and an
/// optional `\r`). Returns [`WireError::Transport`] with `UnexpectedEof` if
/// the peer closed the connection without sending anything.
pub fn read_line<R: BufRead>(reader: &mut R) -> WireResult<String> {
    let mut buf = Vec::new();
    let read = reader.read_until(b'\n', &mut buf)?;
    if read == 0 {
        return Err(WireError::Transport(io::Error::new(
            ErrorKind::UnexpectedEof,
            "connection closed before a command line arrived",
        )));
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    String::from_utf8(buf).map_err(|_| crate::error::ProtocolError::InvalidFormat.into())
}

/// Writes a single status + message response line, per §4.2.
pub fn respond<W: Write>(writer: &mut W, status: Status, message: &str) -> io::Result<()> {
    write!(writer, "{status} {message}\n")?;
    writer.flush()
}

/// Reads exactly `expected` bytes from `reader` into a newly created file at
/// `path`. If the peer closes the connection before `expected` bytes
/// arrive, the partial file is unlinked and [`WireError::ShortRead`] is
/// returned, per §4.5's "If fewer bytes are received before EOF, the
/// partial on-disk file is deleted" rule.
pub fn recv_exact_file<R: BufRead>(reader: &mut R, path: &Path, expected: u64) -> WireResult<()> {
    let mut file = fs::File::create(path)?;
    let mut remaining = expected;
    let mut buf = [0u8; 8192];

    while remaining > 0 {
        let chunk = remaining.min(buf.len() as u64) as usize;
        let read = reader.read(&mut buf[..chunk])?;
        if read == 0 {
            drop(file);
            let _ = fs::remove_file(path);
            return Err(WireError::ShortRead {
                expected,
                received: expected - remaining,
            });
        }
        file.write_all(&buf[..read])?;
        remaining -= read as u64;
    }

    Ok(())
}

/// Reads exactly `expected` bytes from `reader` into memory. Used where the
/// caller needs the bytes in hand (e.g. to decrypt them) rather than
/// streamed straight to a file; short reads are reported the same way as
/// [`recv_exact_file`], minus the partial-file cleanup.
pub fn recv_exact<R: BufRead>(reader: &mut R, expected: u64) -> WireResult<Vec<u8>> {
    let mut out = Vec::with_capacity(expected.min(1 << 20) as usize);
    let mut remaining = expected;
    let mut buf = [0u8; 8192];

    while remaining > 0 {
        let chunk = remaining.min(buf.len() as u64) as usize;
        let read = reader.read(&mut buf[..chunk])?;
        if read == 0 {
            return Err(WireError::ShortRead {
                expected,
                received: expected - remaining,
            });
        }
        out.extend_from_slice(&buf[..read]);
        remaining -= read as u64;
    }

    Ok(out)
}

/// Writes a `SIZE <n>\n` header followed by the full contents of `path`.
pub fn send_sized_file<W: Write>(writer: &mut W, path: &Path) -> WireResult<()> {
    let mut file = fs::File::open(path)?;
    let size = file.metadata()?.len();
    write!(writer, "SIZE {size}\n")?;
    io::copy(&mut file, writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;
    use tempfile::tempdir;

    #[test]
    fn read_line_strips_newline_and_cr() {
        let mut reader = BufReader::new("REGISTER_CLIENT\r\n".as_bytes());
        assert_eq!(read_line(&mut reader).unwrap(), "REGISTER_CLIENT");
    }

    #[test]
    fn read_line_on_closed_connection_is_transport_error() {
        let mut reader = BufReader::new(&b""[..]);
        let err = read_line(&mut reader).unwrap_err();
        assert!(matches!(err, WireError::Transport(_)));
    }

    #[test]
    fn respond_formats_status_and_message() {
        let mut out = Vec::new();
        respond(&mut out, Status::Ok, "Client registered").unwrap();
        assert_eq!(out, b"OK Client registered\n");
    }

    #[test]
    fn recv_exact_file_writes_full_payload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("upload.bin");
        let mut reader = BufReader::new(&b"hello"[..]);

        recv_exact_file(&mut reader, &path, 5).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"hello");
    }

    #[test]
    fn recv_exact_file_unlinks_partial_file_on_short_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("upload.bin");
        let mut reader = BufReader::new(&b"hel"[..]);

        let err = recv_exact_file(&mut reader, &path, 5).unwrap_err();

        assert!(matches!(
            err,
            WireError::ShortRead {
                expected: 5,
                received: 3
            }
        ));
        assert!(!path.exists());
    }

    #[test]
    fn send_sized_file_writes_size_header_then_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("download.bin");
        fs::write(&path, b"payload").unwrap();

        let mut out = Vec::new();
        send_sized_file(&mut out, &path).unwrap();

        assert_eq!(out, b"SIZE 7\npayload");
    }
}
