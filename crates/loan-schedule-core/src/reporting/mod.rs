pub mod window;

pub use window::{summarize_schedule, ScheduleWindowInput, ScheduleWindowSummary};
