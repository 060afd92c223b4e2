//! Loan contract terms and their validation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::error::LoanScheduleError;
use crate::types::Money;
use crate::LoanScheduleResult;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How `interest_rate` on a contract is interpreted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InterestKind {
    /// Percent per annum (6 = 6%), applied pro rata to the declining balance.
    #[serde(alias = "p.a.", alias = "percent_per_annum")]
    PercentPerAnnum,
    /// Flat interest sum for the whole term, spread evenly across periods.
    #[serde(alias = "fixed", alias = "fixed_total")]
    FixedTotal,
}

/// Shape of the regular installments.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AmortizationKind {
    /// Level total payment; interest share falls over time.
    #[serde(alias = "annuity")]
    Annuity,
    /// Level principal slice; interest charged on the declining balance.
    #[serde(alias = "linear")]
    Linear,
    /// Interest only, principal due in full at the final period.
    #[serde(alias = "balloon")]
    Balloon,
}

/// Installment interval, serialised as its month count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u32", into = "u32")]
pub enum PaymentFrequency {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl PaymentFrequency {
    pub fn months(self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 1,
            PaymentFrequency::Quarterly => 3,
            PaymentFrequency::SemiAnnual => 6,
            PaymentFrequency::Annual => 12,
        }
    }
}

impl TryFrom<u32> for PaymentFrequency {
    type Error = String;

    fn try_from(months: u32) -> Result<Self, Self::Error> {
        match months {
            1 => Ok(PaymentFrequency::Monthly),
            3 => Ok(PaymentFrequency::Quarterly),
            6 => Ok(PaymentFrequency::SemiAnnual),
            12 => Ok(PaymentFrequency::Annual),
            other => Err(format!(
                "payment frequency must be 1, 3, 6 or 12 months, got {other}"
            )),
        }
    }
}

impl From<PaymentFrequency> for u32 {
    fn from(freq: PaymentFrequency) -> Self {
        freq.months()
    }
}

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// An out-of-schedule principal repayment (Sondertilgung).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraRepayment {
    pub date: NaiveDate,
    pub amount: Money,
}

/// Terms of a loan, immutable for the duration of a schedule calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanContract {
    /// Amount originally borrowed or lent
    pub principal: Money,
    /// Percent p.a. or total interest amount, depending on `interest_kind`
    pub interest_rate: Decimal,
    pub interest_kind: InterestKind,
    pub amortization_kind: AmortizationKind,
    /// Months between installments (1, 3, 6 or 12)
    pub payment_frequency: PaymentFrequency,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Extra repayments; need not be sorted
    #[serde(default)]
    pub extra_repayments: Vec<ExtraRepayment>,
}

impl LoanContract {
    /// Number of regular periods: `ceil(months / frequency)`.
    ///
    /// Only meaningful once the contract has been validated.
    pub fn period_count(&self) -> u32 {
        let months = calendar::months_between(self.start_date, self.end_date).max(0) as u32;
        months.div_ceil(self.payment_frequency.months())
    }

    /// Check every precondition of the schedule engine, returning the
    /// derived period count.
    pub fn validate(&self) -> LoanScheduleResult<u32> {
        if self.principal <= Decimal::ZERO {
            return Err(invalid("principal", "Principal must be positive"));
        }
        if self.interest_rate < Decimal::ZERO {
            return Err(invalid("interest_rate", "Interest rate cannot be negative"));
        }
        if self.end_date <= self.start_date {
            return Err(invalid(
                "end_date",
                format!(
                    "End date {} must be after start date {}",
                    self.end_date, self.start_date
                ),
            ));
        }

        let periods = self.period_count();
        if periods < 1 {
            return Err(invalid(
                "end_date",
                "Contract must span at least one calendar month",
            ));
        }

        let mut paid_in = self.principal;
        for (i, extra) in self.extra_repayments.iter().enumerate() {
            let field = format!("extra_repayments[{i}].amount");
            if extra.amount <= Decimal::ZERO {
                return Err(invalid(&field, "Extra repayment amount must be positive"));
            }
            paid_in = paid_in
                .checked_add(extra.amount)
                .ok_or_else(|| invalid(&field, "Extra repayments exceed the representable range"))?;
        }

        Ok(periods)
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> LoanScheduleError {
    LoanScheduleError::InvalidContract {
        field: field.into(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> LoanContract {
        LoanContract {
            principal: dec!(10000),
            interest_rate: dec!(5),
            interest_kind: InterestKind::PercentPerAnnum,
            amortization_kind: AmortizationKind::Annuity,
            payment_frequency: PaymentFrequency::Quarterly,
            start_date: d(2024, 1, 1),
            end_date: d(2025, 2, 1),
            extra_repayments: vec![],
        }
    }

    #[test]
    fn test_period_count_rounds_up() {
        // 13 months / 3 = 4.33 -> 5 periods
        assert_eq!(sample().validate().unwrap(), 5);
    }

    #[test]
    fn test_same_month_is_rejected() {
        let mut c = sample();
        c.end_date = d(2024, 1, 20);
        let err = c.validate().unwrap_err();
        assert_eq!(err.field(), Some("end_date"));
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        let mut c = sample();
        c.interest_rate = dec!(-0.5);
        assert_eq!(c.validate().unwrap_err().field(), Some("interest_rate"));
    }

    #[test]
    fn test_zero_extra_repayment_names_index() {
        let mut c = sample();
        c.extra_repayments = vec![
            ExtraRepayment { date: d(2024, 3, 1), amount: dec!(100) },
            ExtraRepayment { date: d(2024, 4, 1), amount: Decimal::ZERO },
        ];
        assert_eq!(
            c.validate().unwrap_err().field(),
            Some("extra_repayments[1].amount")
        );
    }

    #[test]
    fn test_unrepresentable_extra_total_names_index() {
        let mut c = sample();
        c.extra_repayments = vec![
            ExtraRepayment { date: d(2024, 3, 1), amount: Decimal::MAX },
        ];
        assert_eq!(
            c.validate().unwrap_err().field(),
            Some("extra_repayments[0].amount")
        );
    }

    #[test]
    fn test_deserialize_original_tags() {
        let json = r#"{
            "principal": 5000,
            "interest_rate": "1000",
            "interest_kind": "fixed",
            "amortization_kind": "balloon",
            "payment_frequency": 6,
            "start_date": "2024-01-01",
            "end_date": "2026-01-01"
        }"#;
        let c: LoanContract = serde_json::from_str(json).unwrap();
        assert_eq!(c.interest_kind, InterestKind::FixedTotal);
        assert_eq!(c.amortization_kind, AmortizationKind::Balloon);
        assert_eq!(c.payment_frequency, PaymentFrequency::SemiAnnual);
        assert!(c.extra_repayments.is_empty());
        assert_eq!(c.validate().unwrap(), 4);
    }

    #[test]
    fn test_deserialize_rejects_unknown_frequency() {
        let json = r#"{
            "principal": 5000, "interest_rate": 5,
            "interest_kind": "PercentPerAnnum", "amortization_kind": "Annuity",
            "payment_frequency": 2,
            "start_date": "2024-01-01", "end_date": "2026-01-01"
        }"#;
        assert!(serde_json::from_str::<LoanContract>(json).is_err());
    }

    #[test]
    fn test_frequency_serialises_as_months() {
        let v = serde_json::to_value(PaymentFrequency::Annual).unwrap();
        assert_eq!(v, serde_json::json!(12));
    }
}
