//! Date-windowed schedule summaries.
//!
//! A printed or exported repayment plan may cover only part of the contract
//! term. The window keeps every line dated within `[from, to]` and reports
//! what was paid inside it, together with the balances at both edges.

use std::time::Instant;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::amortization::{
    compute_schedule, schedule_totals, LoanContract, ScheduleLineItem, ScheduleTotals,
};
use crate::error::LoanScheduleError;
use crate::types::*;
use crate::LoanScheduleResult;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// A contract plus the optional, inclusive date window to report on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleWindowInput {
    pub contract: LoanContract,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleWindowSummary {
    /// First day shown (the contract start when unbounded)
    pub from: NaiveDate,
    /// Last day shown (the contract end or the final due date, whichever is
    /// later, when unbounded)
    pub to: NaiveDate,
    /// Outstanding balance before the first line of the window
    pub opening_balance: Money,
    /// Outstanding balance after the last line of the window
    pub closing_balance: Money,
    pub lines: Vec<ScheduleLineItem>,
    pub totals: ScheduleTotals,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the contract's schedule and summarise the lines inside the
/// requested window.
pub fn summarize_schedule(
    input: &ScheduleWindowInput,
) -> LoanScheduleResult<ComputationOutput<ScheduleWindowSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if let (Some(from), Some(to)) = (input.from, input.to) {
        if from > to {
            return Err(LoanScheduleError::InvalidContract {
                field: "to".into(),
                reason: format!("Window end {to} is before window start {from}"),
            });
        }
    }

    let contract = &input.contract;
    let lines = compute_schedule(contract)?;

    let from = input.from.unwrap_or(contract.start_date);
    // Unbounded above: the final due date may fall after `end_date`
    let to = input.to.unwrap_or_else(|| {
        lines
            .last()
            .map_or(contract.end_date, |l| l.date.max(contract.end_date))
    });

    let opening_balance = lines
        .iter()
        .take_while(|l| l.date < from)
        .last()
        .map(|l| l.remaining_balance)
        .unwrap_or(contract.principal);

    let window: Vec<ScheduleLineItem> = lines
        .into_iter()
        .filter(|l| l.date >= from && l.date <= to)
        .collect();

    if window.is_empty() {
        warnings.push(format!("No schedule lines fall between {from} and {to}"));
    }

    let totals = schedule_totals(&window, opening_balance);
    let output = ScheduleWindowSummary {
        from,
        to,
        opening_balance,
        closing_balance: totals.end_balance,
        lines: window,
        totals,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan Schedule Window Summary",
        &serde_json::json!({
            "principal": contract.principal.to_string(),
            "from": from,
            "to": to,
        }),
        warnings,
        elapsed,
        output,
    ))
}
