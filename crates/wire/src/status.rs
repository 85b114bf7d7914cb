use std::fmt;

/// A response status token, per §4.2's framing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
    Infected,
    Clean,
    Pending,
    NotFound,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Error => "ERROR",
            Self::Infected => "INFECTED",
            Self::Clean => "CLEAN",
            Self::Pending => "PENDING",
            Self::NotFound => "NOT_FOUND",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_match_the_protocol_vocabulary() {
        assert_eq!(Status::Ok.as_str(), "OK");
        assert_eq!(Status::Error.as_str(), "ERROR");
        assert_eq!(Status::Infected.as_str(), "INFECTED");
        assert_eq!(Status::Clean.as_str(), "CLEAN");
        assert_eq!(Status::Pending.as_str(), "PENDING");
        assert_eq!(Status::NotFound.as_str(), "NOT_FOUND");
    }
}
