use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::LoanScheduleError;
use crate::types::{Money, Rate};
use crate::LoanScheduleResult;

/// Level installment that repays `principal` over `nper` periods at `rate`
/// per period: `P*r / (1 - (1+r)^-n)`.
///
/// A zero rate degenerates to straight division.
pub fn annuity_payment(rate: Rate, nper: u32, principal: Money) -> LoanScheduleResult<Money> {
    if nper == 0 {
        return Err(LoanScheduleError::InvalidContract {
            field: "periods".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }
    if rate < Decimal::ZERO {
        return Err(LoanScheduleError::InvalidContract {
            field: "interest_rate".into(),
            reason: "Rate per period must be >= 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let factor = (Decimal::ONE + rate)
        .checked_powu(u64::from(nper))
        .ok_or_else(|| LoanScheduleError::InvalidContract {
            field: "interest_rate".into(),
            reason: format!("(1 + {rate})^{nper} overflows"),
        })?;

    // P*r*f / (f - 1) is the same as P*r / (1 - f^-1) without the reciprocal.
    // Dividing first keeps the intermediate close to 1 for large factors.
    factor
        .checked_sub(Decimal::ONE)
        .and_then(|denom| factor.checked_div(denom))
        .and_then(|ratio| rate.checked_mul(ratio))
        .and_then(|per_unit| principal.checked_mul(per_unit))
        .ok_or_else(|| LoanScheduleError::InvalidContract {
            field: "interest_rate".into(),
            reason: format!("Installment on {principal} at {rate} per period overflows"),
        })
}
