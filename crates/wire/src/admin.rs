use crate::error::ProtocolError;
use crate::parse::split_verb;

/// The admin dialect, spoken over the local-only admin transport by a
/// single concurrent admin (§4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// Reserved; the current implementation accepts any connecting peer
    /// (see SPEC_FULL.md Open Question (a)).
    AdminAuth,
    SetLogLevel { level: String },
    GetLogs,
    GetStats,
    DisconnectClient { ip: String },
    ShutdownServer,
}

impl AdminCommand {
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let (verb, args) = split_verb(line);
        match verb {
            "ADMIN_AUTH" => Ok(Self::AdminAuth),
            "SET_LOG_LEVEL" => {
                if args.is_empty() {
                    return Err(ProtocolError::InvalidFormat);
                }
                Ok(Self::SetLogLevel {
                    level: args.to_owned(),
                })
            }
            "GET_LOGS" => Ok(Self::GetLogs),
            "GET_STATS" => Ok(Self::GetStats),
            "DISCONNECT_CLIENT" => {
                if args.is_empty() {
                    return Err(ProtocolError::InvalidFormat);
                }
                Ok(Self::DisconnectClient {
                    ip: args.to_owned(),
                })
            }
            "SHUTDOWN_SERVER" => Ok(Self::ShutdownServer),
            _ => Err(ProtocolError::UnknownVerb),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_log_level_captures_the_level_token() {
        assert_eq!(
            AdminCommand::parse("SET_LOG_LEVEL DEBUG").unwrap(),
            AdminCommand::SetLogLevel {
                level: "DEBUG".to_owned()
            }
        );
    }

    #[test]
    fn set_log_level_without_args_is_invalid_format() {
        assert_eq!(
            AdminCommand::parse("SET_LOG_LEVEL").unwrap_err(),
            ProtocolError::InvalidFormat
        );
    }

    #[test]
    fn disconnect_client_captures_ip() {
        assert_eq!(
            AdminCommand::parse("DISCONNECT_CLIENT 10.0.0.5").unwrap(),
            AdminCommand::DisconnectClient {
                ip: "10.0.0.5".to_owned()
            }
        );
    }

    #[test]
    fn no_arg_commands_parse_without_a_trailing_space() {
        assert_eq!(AdminCommand::parse("GET_STATS").unwrap(), AdminCommand::GetStats);
        assert_eq!(AdminCommand::parse("GET_LOGS").unwrap(), AdminCommand::GetLogs);
        assert_eq!(
            AdminCommand::parse("SHUTDOWN_SERVER").unwrap(),
            AdminCommand::ShutdownServer
        );
    }

    #[test]
    fn unknown_verb_is_reported() {
        assert_eq!(
            AdminCommand::parse("REBOOT_HOST").unwrap_err(),
            ProtocolError::UnknownVerb
        );
    }
}
