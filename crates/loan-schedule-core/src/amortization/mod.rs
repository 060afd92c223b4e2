pub mod contract;
pub mod schedule;
pub mod strategy;

pub use contract::{
    AmortizationKind, ExtraRepayment, InterestKind, LoanContract, PaymentFrequency,
};
pub use schedule::{
    build_schedule, compute_schedule, schedule_totals, LineKind, ScheduleLineItem,
    ScheduleOutput, ScheduleTotals, BALANCE_EPSILON,
};
