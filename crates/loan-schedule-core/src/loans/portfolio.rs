//! Loan book overview: liabilities against receivables on a given day.

use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::balance::compute_balance;
use super::loan::{Loan, LoanDirection, LoanStatus};
use crate::error::LoanScheduleError;
use crate::types::*;
use crate::LoanScheduleResult;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub loans: Vec<Loan>,
    pub as_of: NaiveDate,
}

/// One line of the loan book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioRow {
    pub id: String,
    pub direction: LoanDirection,
    pub counterparty_name: String,
    pub status: LoanStatus,
    pub principal: Money,
    pub outstanding: Money,
    pub end_date: NaiveDate,
    pub interest: String,
    pub repaid_pct: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub as_of: NaiveDate,
    pub rows: Vec<PortfolioRow>,
    /// Outstanding on loans we have taken
    pub total_liabilities: Money,
    /// Outstanding on loans we have given
    pub total_receivables: Money,
    /// Receivables minus liabilities
    pub net_position: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Outstanding balances of every loan on the books as of `input.as_of`.
pub fn summarize_portfolio(
    input: &PortfolioInput,
) -> LoanScheduleResult<ComputationOutput<PortfolioSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.loans.is_empty() {
        return Err(LoanScheduleError::InsufficientData(
            "Portfolio summary requires at least one loan".into(),
        ));
    }

    let mut rows = Vec::with_capacity(input.loans.len());
    let mut total_liabilities = Decimal::ZERO;
    let mut total_receivables = Decimal::ZERO;

    for loan in &input.loans {
        let balance = compute_balance(loan, input.as_of).map_err(|e| match e {
            LoanScheduleError::InvalidContract { field, reason } => {
                LoanScheduleError::InvalidContract {
                    field: format!("loans[{}].contract.{field}", loan.id),
                    reason,
                }
            }
            other => other,
        })?;

        if loan.status == LoanStatus::Defaulted {
            warnings.push(format!(
                "Loan {} with {} is in default; {} outstanding",
                loan.id, loan.counterparty_name, balance.outstanding
            ));
        }

        match loan.direction {
            LoanDirection::Taken => total_liabilities += balance.outstanding,
            LoanDirection::Given => total_receivables += balance.outstanding,
        }

        rows.push(PortfolioRow {
            id: loan.id.clone(),
            direction: loan.direction,
            counterparty_name: loan.counterparty_name.clone(),
            status: loan.status,
            principal: balance.principal,
            outstanding: balance.outstanding,
            end_date: loan.contract.end_date,
            interest: loan.interest_label(),
            repaid_pct: balance.repaid_pct,
        });
    }

    let output = PortfolioSummary {
        as_of: input.as_of,
        rows,
        total_liabilities,
        total_receivables,
        net_position: total_receivables - total_liabilities,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan Book Summary",
        &serde_json::json!({
            "loans": input.loans.len(),
            "as_of": input.as_of,
        }),
        warnings,
        elapsed,
        output,
    ))
}
