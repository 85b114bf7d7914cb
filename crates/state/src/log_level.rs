use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// The four severities a log line can carry (§3 "Log level").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
}

impl Level {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DEBUG" => Some(Self::Debug),
            "INFO" => Some(Self::Info),
            "WARNING" => Some(Self::Warning),
            "ERROR" => Some(Self::Error),
            _ => None,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Debug,
            1 => Self::Info,
            2 => Self::Warning,
            _ => Self::Error,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// The currently effective log level, readable without locking (§3: "read
/// lock-free, mutated only by admin").
pub struct LogLevel(AtomicU8);

impl Default for LogLevel {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

impl LogLevel {
    #[must_use]
    pub fn new(initial: Level) -> Self {
        Self(AtomicU8::new(initial as u8))
    }

    #[must_use]
    pub fn get(&self) -> Level {
        Level::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, level: Level) {
        self.0.store(level as u8, Ordering::Release);
    }

    /// Whether a message at `candidate` severity should be formatted and
    /// emitted given the current level.
    #[must_use]
    pub fn allows(&self, candidate: Level) -> bool {
        candidate >= self.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_matches_severity() {
        assert!(Level::Error > Level::Warning);
        assert!(Level::Warning > Level::Info);
        assert!(Level::Info > Level::Debug);
    }

    #[test]
    fn allows_filters_below_current_level() {
        let level = LogLevel::new(Level::Warning);
        assert!(!level.allows(Level::Debug));
        assert!(!level.allows(Level::Info));
        assert!(level.allows(Level::Warning));
        assert!(level.allows(Level::Error));
    }

    #[test]
    fn set_changes_the_observed_level() {
        let level = LogLevel::default();
        assert_eq!(level.get(), Level::Info);
        level.set(Level::Debug);
        assert_eq!(level.get(), Level::Debug);
    }

    #[test]
    fn parse_rejects_unknown_tokens() {
        assert_eq!(Level::parse("DEBUG"), Some(Level::Debug));
        assert_eq!(Level::parse("TRACE"), None);
    }
}
