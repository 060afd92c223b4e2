pub mod amortization;
pub mod calendar;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "reporting")]
pub mod reporting;

#[cfg(feature = "portfolio")]
pub mod loans;

pub use error::LoanScheduleError;
pub use types::*;

/// Standard result type for all loan-schedule operations
pub type LoanScheduleResult<T> = Result<T, LoanScheduleError>;
