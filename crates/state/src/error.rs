use thiserror::Error;

/// Errors raised by the shared state aggregates (§7 `ResourceExhausted`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("no free client slot")]
    NoFreeClientSlot,
    #[error("job table full")]
    JobTableFull,
}

pub type StateResult<T> = Result<T, StateError>;
