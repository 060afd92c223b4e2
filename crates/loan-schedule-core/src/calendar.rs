//! Calendar-month arithmetic for installment due dates.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::LoanScheduleError;
use crate::LoanScheduleResult;

/// Whole calendar months between two dates, ignoring the day of month.
///
/// `2024-01-31 -> 2024-02-01` counts as one month; `2024-01-01 -> 2024-01-31`
/// counts as zero. Negative when `to` precedes `from`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// Shift `date` forward by `months`, clamping to the last day of the target
/// month (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> LoanScheduleResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| {
            LoanScheduleError::DateError(format!("{date} + {months} months is out of range"))
        })
}

/// Due date of regular period `period` (1-based), always measured from the
/// contract start so end-of-month clamping never accumulates.
pub fn due_date(
    start: NaiveDate,
    period: u32,
    frequency_months: u32,
) -> LoanScheduleResult<NaiveDate> {
    let offset = period.checked_mul(frequency_months).ok_or_else(|| {
        LoanScheduleError::DateError(format!(
            "period {period} x {frequency_months} months overflows"
        ))
    })?;
    add_months(start, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_months_between_ignores_days() {
        assert_eq!(months_between(d(2024, 1, 31), d(2024, 2, 1)), 1);
        assert_eq!(months_between(d(2024, 1, 1), d(2024, 1, 31)), 0);
        assert_eq!(months_between(d(2023, 11, 15), d(2025, 2, 15)), 15);
        assert_eq!(months_between(d(2024, 5, 1), d(2024, 2, 1)), -3);
    }

    #[test]
    fn test_add_months_clamps_month_end() {
        assert_eq!(add_months(d(2024, 1, 31), 1).unwrap(), d(2024, 2, 29));
        assert_eq!(add_months(d(2023, 1, 31), 1).unwrap(), d(2023, 2, 28));
        assert_eq!(add_months(d(2024, 11, 15), 3).unwrap(), d(2025, 2, 15));
    }

    #[test]
    fn test_due_date_does_not_drift() {
        // Stepping Jan 31 month by month would stick on the 28th/29th;
        // measuring from the start keeps the 31st where it exists.
        let start = d(2024, 1, 31);
        assert_eq!(due_date(start, 1, 1).unwrap(), d(2024, 2, 29));
        assert_eq!(due_date(start, 2, 1).unwrap(), d(2024, 3, 31));
        assert_eq!(due_date(start, 4, 3).unwrap(), d(2025, 1, 31));
    }

    #[test]
    fn test_add_months_out_of_range() {
        assert!(add_months(NaiveDate::MAX, 1).is_err());
    }
}
