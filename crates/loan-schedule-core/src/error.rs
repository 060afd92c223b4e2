use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanScheduleError {
    #[error("Invalid contract field `{field}`: {reason}")]
    InvalidContract { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanScheduleError {
    /// Name of the offending contract field, if this is a validation error.
    pub fn field(&self) -> Option<&str> {
        match self {
            LoanScheduleError::InvalidContract { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LoanScheduleError {
    fn from(e: serde_json::Error) -> Self {
        LoanScheduleError::SerializationError(e.to_string())
    }
}
