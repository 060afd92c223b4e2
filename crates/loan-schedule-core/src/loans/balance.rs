//! Outstanding balance of a loan on a given day.
//!
//! Two bookkeeping modes, chosen per loan:
//! - auto payment: every installment due on or before the date is assumed
//!   paid, so the balance follows the schedule (including extra repayments).
//! - manual: only recorded money counts; the plan is ignored.

use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::loan::{Loan, LoanStatus};
use crate::amortization::{compute_schedule, ScheduleLineItem};
use crate::types::*;
use crate::LoanScheduleResult;

const HUNDRED: Decimal = dec!(100);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanBalanceInput {
    pub loan: Loan,
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanBalance {
    pub as_of: NaiveDate,
    pub principal: Money,
    pub outstanding: Money,
    /// Principal repaid, capped at the original principal
    pub principal_repaid: Money,
    /// Repayments beyond the original principal
    #[serde(default, skip_serializing_if = "Decimal::is_zero")]
    pub overpaid: Money,
    pub interest_paid: Money,
    /// Share of principal repaid, 0 to 100
    pub repaid_pct: Decimal,
    /// Next regular installment due after `as_of`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_installment: Option<ScheduleLineItem>,
}

/// Balance of a single loan as of `input.as_of`.
pub fn outstanding_balance(
    input: &LoanBalanceInput,
) -> LoanScheduleResult<ComputationOutput<LoanBalance>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let loan = &input.loan;

    let balance = compute_balance(loan, input.as_of)?;

    if loan.status == LoanStatus::Closed && balance.outstanding > Decimal::ZERO {
        warnings.push(format!(
            "Loan {} is closed but {} remains outstanding",
            loan.id, balance.outstanding
        ));
    }

    if balance.overpaid > Decimal::ZERO {
        warnings.push(format!(
            "Loan {} has been repaid {} beyond its principal of {}",
            loan.id, balance.overpaid, balance.principal
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        if loan.auto_payment {
            "Outstanding balance (installments assumed paid on schedule)"
        } else {
            "Outstanding balance (recorded repayments only)"
        },
        &serde_json::json!({
            "loan_id": loan.id,
            "as_of": input.as_of,
            "auto_payment": loan.auto_payment,
        }),
        warnings,
        elapsed,
        balance,
    ))
}

pub(crate) fn compute_balance(loan: &Loan, as_of: NaiveDate) -> LoanScheduleResult<LoanBalance> {
    let principal = loan.contract.principal;
    let lines = compute_schedule(&loan.effective_contract())?;

    let (principal_repaid, interest_paid) = if loan.auto_payment {
        lines
            .iter()
            .filter(|l| l.date <= as_of)
            .fold((Decimal::ZERO, Decimal::ZERO), |(p, i), l| {
                (p + l.principal_portion, i + l.interest_portion)
            })
    } else {
        let contract_extras: Money = loan
            .contract
            .extra_repayments
            .iter()
            .filter(|e| e.date <= as_of)
            .map(|e| e.amount)
            .sum();
        let recorded: Money = loan
            .repayments()
            .filter(|t| t.date <= as_of)
            .map(|t| t.amount)
            .sum();
        let interest: Money = loan
            .interest_payments()
            .filter(|t| t.date <= as_of)
            .map(|t| t.amount)
            .sum();
        (contract_extras + recorded, interest)
    };

    let overpaid = (principal_repaid - principal).max(Decimal::ZERO);
    let principal_repaid = principal_repaid - overpaid;
    let outstanding = principal - principal_repaid;
    let repaid_pct = (HUNDRED - outstanding / principal * HUNDRED).clamp(Decimal::ZERO, HUNDRED);

    let next_installment = lines
        .into_iter()
        .find(|l| l.is_scheduled() && l.date > as_of);

    tracing::trace!(loan = %loan.id, %outstanding, "loan balance computed");

    Ok(LoanBalance {
        as_of,
        principal,
        outstanding,
        principal_repaid,
        overpaid,
        interest_paid,
        repaid_pct,
        next_installment,
    })
}
