//! Per-period installment rules, chosen once per contract.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::contract::{AmortizationKind, InterestKind, LoanContract};
use crate::error::LoanScheduleError;
use crate::time_value;
use crate::types::{Money, Rate};
use crate::LoanScheduleResult;

const PERCENT: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Interest and principal due for one regular period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Installment {
    pub interest: Money,
    pub principal: Money,
}

impl Installment {
    pub fn payment(&self) -> Money {
        self.interest + self.principal
    }
}

/// Closed set of installment rules. Built from the contract before the
/// period loop so the loop itself never inspects the contract kinds again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodStrategy {
    /// Level payment fixed from the original principal.
    Annuity { rate: Rate, payment: Money },
    /// Level principal slice, interest on the declining balance.
    Linear { rate: Rate, principal_slice: Money },
    /// Interest on the balance only; principal at the final period.
    Balloon { rate: Rate },
    /// Flat interest slice with a level principal slice. Annuity and linear
    /// coincide when the interest does not depend on the balance.
    FixedLinear { interest: Money, principal_slice: Money },
    /// Flat interest slice, principal at the final period.
    FixedBalloon { interest: Money },
}

impl PeriodStrategy {
    /// Select the rule for a validated contract spanning `periods` periods.
    pub fn for_contract(contract: &LoanContract, periods: u32) -> LoanScheduleResult<Self> {
        let n = Decimal::from(periods);
        let principal_slice = contract.principal / n;

        let strategy = match contract.interest_kind {
            InterestKind::FixedTotal => {
                let interest = contract.interest_rate / n;
                match contract.amortization_kind {
                    AmortizationKind::Balloon => PeriodStrategy::FixedBalloon { interest },
                    AmortizationKind::Annuity | AmortizationKind::Linear => {
                        PeriodStrategy::FixedLinear {
                            interest,
                            principal_slice,
                        }
                    }
                }
            }
            InterestKind::PercentPerAnnum => {
                let rate = rate_per_period(
                    contract.interest_rate,
                    contract.payment_frequency.months(),
                );
                match contract.amortization_kind {
                    AmortizationKind::Annuity => PeriodStrategy::Annuity {
                        rate,
                        payment: time_value::annuity_payment(rate, periods, contract.principal)?,
                    },
                    AmortizationKind::Linear => PeriodStrategy::Linear {
                        rate,
                        principal_slice,
                    },
                    AmortizationKind::Balloon => PeriodStrategy::Balloon { rate },
                }
            }
        };
        strategy.check_headroom(contract.principal, n)?;
        Ok(strategy)
    }

    /// The balance never exceeds the principal, so if a full term of
    /// interest on the whole principal fits in a `Decimal`, every
    /// per-period product and running total does too.
    fn check_headroom(&self, principal: Money, n: Decimal) -> LoanScheduleResult<()> {
        let term_interest = match *self {
            PeriodStrategy::Annuity { payment, .. } => payment.checked_mul(n),
            PeriodStrategy::Linear { rate, .. } | PeriodStrategy::Balloon { rate } => {
                principal.checked_mul(rate).and_then(|i| i.checked_mul(n))
            }
            PeriodStrategy::FixedLinear { interest, .. }
            | PeriodStrategy::FixedBalloon { interest } => interest.checked_mul(n),
        };
        term_interest
            .and_then(|total| total.checked_add(principal))
            .map(|_| ())
            .ok_or_else(|| LoanScheduleError::InvalidContract {
                field: "interest_rate".into(),
                reason: format!(
                    "Interest on {principal} over {n} periods exceeds the representable range"
                ),
            })
    }

    /// Installment owed on `balance` for a non-final period, before clamping
    /// to the outstanding balance.
    pub fn installment(&self, balance: Money) -> Installment {
        match *self {
            PeriodStrategy::Annuity { rate, payment } => {
                let interest = balance * rate;
                Installment {
                    interest,
                    principal: payment - interest,
                }
            }
            PeriodStrategy::Linear {
                rate,
                principal_slice,
            } => Installment {
                interest: balance * rate,
                principal: principal_slice,
            },
            PeriodStrategy::Balloon { rate } => Installment {
                interest: balance * rate,
                principal: Decimal::ZERO,
            },
            PeriodStrategy::FixedLinear {
                interest,
                principal_slice,
            } => Installment {
                interest,
                principal: principal_slice,
            },
            PeriodStrategy::FixedBalloon { interest } => Installment {
                interest,
                principal: Decimal::ZERO,
            },
        }
    }

    /// Installment for period `period` of `periods`, clamped so the balance
    /// never goes negative. The final period settles whatever is left.
    pub fn settle(&self, balance: Money, period: u32, periods: u32) -> Installment {
        let mut inst = self.installment(balance);
        if period >= periods {
            inst.principal = balance;
        } else {
            inst.principal = inst.principal.clamp(Decimal::ZERO, balance);
        }
        inst
    }
}

/// Percent p.a. converted to a decimal rate per installment interval.
pub fn rate_per_period(percent_per_annum: Decimal, frequency_months: u32) -> Rate {
    percent_per_annum / PERCENT * Decimal::from(frequency_months) / MONTHS_PER_YEAR
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::contract::PaymentFrequency;
    use chrono::NaiveDate;

    fn contract(interest: InterestKind, shape: AmortizationKind) -> LoanContract {
        LoanContract {
            principal: dec!(1200),
            interest_rate: dec!(12),
            interest_kind: interest,
            amortization_kind: shape,
            payment_frequency: PaymentFrequency::Monthly,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            extra_repayments: vec![],
        }
    }

    #[test]
    fn test_rate_per_period() {
        assert_eq!(rate_per_period(dec!(6), 1), dec!(0.005));
        assert_eq!(rate_per_period(dec!(6), 3), dec!(0.015));
        assert_eq!(rate_per_period(dec!(6), 12), dec!(0.06));
    }

    #[test]
    fn test_fixed_total_annuity_behaves_linear() {
        let c = contract(InterestKind::FixedTotal, AmortizationKind::Annuity);
        let s = PeriodStrategy::for_contract(&c, 12).unwrap();
        assert_eq!(
            s,
            PeriodStrategy::FixedLinear {
                interest: dec!(1),
                principal_slice: dec!(100)
            }
        );
    }

    #[test]
    fn test_linear_interest_follows_balance() {
        let c = contract(InterestKind::PercentPerAnnum, AmortizationKind::Linear);
        let s = PeriodStrategy::for_contract(&c, 12).unwrap();
        let inst = s.installment(dec!(600));
        assert_eq!(inst.interest, dec!(6));
        assert_eq!(inst.principal, dec!(100));
        assert_eq!(inst.payment(), dec!(106));
    }

    #[test]
    fn test_settle_clamps_to_balance() {
        let c = contract(InterestKind::PercentPerAnnum, AmortizationKind::Linear);
        let s = PeriodStrategy::for_contract(&c, 12).unwrap();
        let inst = s.settle(dec!(40), 5, 12);
        assert_eq!(inst.principal, dec!(40));
        assert_eq!(inst.interest, dec!(0.4));
    }

    #[test]
    fn test_extreme_rate_is_rejected_not_panicking() {
        let mut c = contract(InterestKind::PercentPerAnnum, AmortizationKind::Balloon);
        c.principal = Decimal::MAX / dec!(4);
        c.interest_rate = dec!(1200);
        let err = PeriodStrategy::for_contract(&c, 12).unwrap_err();
        assert_eq!(err.field(), Some("interest_rate"));
    }

    #[test]
    fn test_high_rate_within_range_is_accepted() {
        let mut c = contract(InterestKind::PercentPerAnnum, AmortizationKind::Annuity);
        c.principal = dec!(1_000_000_000_000);
        c.interest_rate = dec!(1200);
        let s = PeriodStrategy::for_contract(&c, 60).unwrap();
        let inst = s.installment(c.principal);
        assert_eq!(inst.interest, dec!(1_000_000_000_000));
    }

    #[test]
    fn test_settle_final_period_takes_remainder() {
        let c = contract(InterestKind::PercentPerAnnum, AmortizationKind::Balloon);
        let s = PeriodStrategy::for_contract(&c, 12).unwrap();
        assert_eq!(s.settle(dec!(1200), 11, 12).principal, Decimal::ZERO);
        assert_eq!(s.settle(dec!(1200), 12, 12).principal, dec!(1200));
    }
}
