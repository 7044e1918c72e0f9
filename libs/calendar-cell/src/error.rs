use chrono::NaiveDateTime;
use shared_models::AppError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalendarError {
    #[error("Appointment {id} has an invalid timestamp: {value:?}")]
    InvalidTimestamp { id: String, value: String },

    #[error("Appointment {id} ends before it starts")]
    InvertedInterval { id: String },

    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("Appointment {id} cannot be moved to {target}")]
    OutOfRange { id: String, target: NaiveDateTime },

    #[error("Persistence error: {0}")]
    Persistence(#[from] AppError),

    #[error("Persistence call timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
}

impl CalendarError {
    /// Whether repeating the operation (e.g. dragging again) may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CalendarError::Persistence(err) => err.is_retryable(),
            CalendarError::Timeout { .. } => true,
            CalendarError::InvalidTimestamp { .. }
            | CalendarError::InvertedInterval { .. }
            | CalendarError::NotFound(_)
            | CalendarError::OutOfRange { .. } => false,
        }
    }
}
