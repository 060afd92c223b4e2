pub mod loans;
pub mod schedule;
