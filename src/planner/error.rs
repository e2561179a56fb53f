use thiserror::Error;

/// Errors surfaced by the availability store.
///
/// The `Display` text is what the user sees. Every variant is recoverable:
/// validation errors abort the operation without touching state, persistence
/// errors leave the in-memory model authoritative.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlannerError {
    #[error("Incorrect secret word")]
    IncorrectSecret,

    #[error("Please enter a valid username.")]
    EmptyUsername,

    #[error("This username already exists.")]
    DuplicateUsername,

    #[error("Please select a user before marking availability.")]
    NoUserSelected,

    #[error("Invalid day key: {0}")]
    InvalidDayKey(String),

    #[error("Failed to load saved data. Starting with empty planner.")]
    LoadFailed,

    #[error("Failed to save data. Your changes may not persist after reload.")]
    SaveFailed,
}

/// Failures of a local cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache unavailable: {0}")]
    Unavailable(String),
}
