use crate::error::ProtocolError;
use crate::parse::split_verb;

/// The client dialect, authenticated implicitly by the prior handshake
/// (§4.2). One session per TCP connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    RegisterClient,
    UploadFile { filename: String, ciphertext_size: u64 },
    GetScanStatus { job_id: u64 },
    GetScanResult { job_id: u64 },
    DownloadFile { filename: String },
}

impl ClientCommand {
    /// Parses a single command line. Returns
    /// [`ProtocolError::UnknownVerb`] for an unrecognized verb and
    /// [`ProtocolError::InvalidFormat`] for a recognized verb with
    /// malformed arguments.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let (verb, args) = split_verb(line);
        match verb {
            "REGISTER_CLIENT" => Ok(Self::RegisterClient),
            "UPLOAD_FILE" => parse_upload(args),
            "GET_SCAN_STATUS" => Ok(Self::GetScanStatus {
                job_id: parse_job_id(args)?,
            }),
            "GET_SCAN_RESULT" => Ok(Self::GetScanResult {
                job_id: parse_job_id(args)?,
            }),
            "DOWNLOAD_FILE" => {
                if args.is_empty() {
                    return Err(ProtocolError::InvalidFormat);
                }
                Ok(Self::DownloadFile {
                    filename: args.to_owned(),
                })
            }
            _ => Err(ProtocolError::UnknownVerb),
        }
    }
}

fn parse_upload(args: &str) -> Result<ClientCommand, ProtocolError> {
    // The filename may itself contain spaces, so the ciphertext size is
    // taken from the last whitespace-delimited token and everything before
    // it is kept verbatim as the filename.
    let split_at = args.rfind(' ').ok_or(ProtocolError::InvalidFormat)?;
    let (filename, size_str) = (&args[..split_at], &args[split_at + 1..]);
    if filename.is_empty() || size_str.is_empty() {
        return Err(ProtocolError::InvalidFormat);
    }
    let ciphertext_size = size_str.parse().map_err(|_| ProtocolError::InvalidFormat)?;
    Ok(ClientCommand::UploadFile {
        filename: filename.to_owned(),
        ciphertext_size,
    })
}

fn parse_job_id(args: &str) -> Result<u64, ProtocolError> {
    args.parse().map_err(|_| ProtocolError::InvalidFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_client_has_no_arguments() {
        assert_eq!(
            ClientCommand::parse("REGISTER_CLIENT").unwrap(),
            ClientCommand::RegisterClient
        );
    }

    #[test]
    fn upload_file_splits_filename_and_size() {
        assert_eq!(
            ClientCommand::parse("UPLOAD_FILE hello.txt 5").unwrap(),
            ClientCommand::UploadFile {
                filename: "hello.txt".to_owned(),
                ciphertext_size: 5,
            }
        );
    }

    #[test]
    fn upload_file_preserves_spaces_within_the_filename() {
        assert_eq!(
            ClientCommand::parse("UPLOAD_FILE my report.txt 12").unwrap(),
            ClientCommand::UploadFile {
                filename: "my report.txt".to_owned(),
                ciphertext_size: 12,
            }
        );
    }

    #[test]
    fn upload_file_rejects_non_numeric_size() {
        assert_eq!(
            ClientCommand::parse("UPLOAD_FILE hello.txt notanumber").unwrap_err(),
            ProtocolError::InvalidFormat
        );
    }

    #[test]
    fn get_scan_status_parses_job_id() {
        assert_eq!(
            ClientCommand::parse("GET_SCAN_STATUS 42").unwrap(),
            ClientCommand::GetScanStatus { job_id: 42 }
        );
    }

    #[test]
    fn get_scan_result_rejects_non_numeric_job_id() {
        assert_eq!(
            ClientCommand::parse("GET_SCAN_RESULT abc").unwrap_err(),
            ProtocolError::InvalidFormat
        );
    }

    #[test]
    fn download_file_keeps_filename_verbatim() {
        assert_eq!(
            ClientCommand::parse("DOWNLOAD_FILE report  final.txt").unwrap(),
            ClientCommand::DownloadFile {
                filename: "report  final.txt".to_owned(),
            }
        );
    }

    #[test]
    fn unknown_verb_is_reported() {
        assert_eq!(
            ClientCommand::parse("DANCE").unwrap_err(),
            ProtocolError::UnknownVerb
        );
    }
}
