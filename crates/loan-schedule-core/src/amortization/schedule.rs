//! Repayment schedule generation.
//!
//! A schedule is a derived view of a [`LoanContract`]: it is rebuilt from
//! scratch on every call and never patched. Regular installments are
//! interleaved with extra repayments, each extra repayment being applied
//! in the period window `(previous due date, current due date]` before that
//! period's installment is computed.

use std::ops::ControlFlow;
use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::contract::{ExtraRepayment, LoanContract};
use super::strategy::PeriodStrategy;
use crate::calendar;
use crate::types::*;
use crate::LoanScheduleResult;

/// Balance at or below which a loan counts as repaid.
pub const BALANCE_EPSILON: Money = dec!(0.01);

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LineKind {
    /// Regular installment from the repayment plan
    Scheduled,
    /// Out-of-schedule principal repayment
    ExtraRepayment,
}

/// One row of a repayment schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleLineItem {
    /// 1-based regular period this line falls in
    pub period_index: u32,
    pub date: NaiveDate,
    pub kind: LineKind,
    /// Total cash flow of the line
    pub payment: Money,
    pub interest_portion: Money,
    pub principal_portion: Money,
    /// Balance after this line, never negative
    pub remaining_balance: Money,
}

impl ScheduleLineItem {
    /// Copy with monetary fields rounded to `dp` places, midpoint away from
    /// zero. Display only: the engine itself never rounds.
    pub fn rounded(&self, dp: u32) -> Self {
        ScheduleLineItem {
            payment: round_money(self.payment, dp),
            interest_portion: round_money(self.interest_portion, dp),
            principal_portion: round_money(self.principal_portion, dp),
            remaining_balance: round_money(self.remaining_balance, dp),
            ..self.clone()
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.kind == LineKind::Scheduled
    }
}

/// Aggregates over a run of schedule lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTotals {
    pub total_payment: Money,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_extra_repayments: Money,
    pub scheduled_installments: u32,
    pub extra_repayment_count: u32,
    /// Balance after the last line, or the opening balance if there are none
    pub end_balance: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
}

impl ScheduleTotals {
    pub fn rounded(&self, dp: u32) -> Self {
        ScheduleTotals {
            total_payment: round_money(self.total_payment, dp),
            total_interest: round_money(self.total_interest, dp),
            total_principal: round_money(self.total_principal, dp),
            total_extra_repayments: round_money(self.total_extra_repayments, dp),
            end_balance: round_money(self.end_balance, dp),
            ..self.clone()
        }
    }
}

/// Output of [`build_schedule`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    /// Regular periods in the contract term
    pub periods: u32,
    /// Standard installment of the first period, before any extra repayment
    pub regular_payment: Money,
    /// Regular installments that were not needed because the loan was
    /// repaid early
    pub installments_saved: u32,
    pub lines: Vec<ScheduleLineItem>,
    pub totals: ScheduleTotals,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the full repayment schedule of a contract.
///
/// Fails with `InvalidContract` before producing anything if the contract
/// is malformed; otherwise returns the complete schedule.
pub fn compute_schedule(contract: &LoanContract) -> LoanScheduleResult<Vec<ScheduleLineItem>> {
    Ok(run(contract)?.lines)
}

/// Compute the schedule wrapped in the standard output envelope, with
/// totals and warnings about extra repayments that could not be applied.
pub fn build_schedule(
    contract: &LoanContract,
) -> LoanScheduleResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let run = run(contract)?;

    let totals = schedule_totals(&run.lines, contract.principal);
    let installments_saved = run.periods.saturating_sub(totals.scheduled_installments);

    let output = ScheduleOutput {
        periods: run.periods,
        regular_payment: run.regular_payment,
        installments_saved,
        lines: run.lines,
        totals,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan Amortization Schedule",
        &serde_json::json!({
            "principal": contract.principal.to_string(),
            "interest_rate": contract.interest_rate.to_string(),
            "interest_kind": contract.interest_kind,
            "amortization_kind": contract.amortization_kind,
            "payment_frequency_months": contract.payment_frequency.months(),
            "start_date": contract.start_date,
            "end_date": contract.end_date,
            "extra_repayments": contract.extra_repayments.len(),
        }),
        run.warnings,
        elapsed,
        output,
    ))
}

/// Sum a run of lines. `opening_balance` is reported as the end balance
/// when `lines` is empty.
pub fn schedule_totals(lines: &[ScheduleLineItem], opening_balance: Money) -> ScheduleTotals {
    let mut totals = ScheduleTotals {
        total_payment: Decimal::ZERO,
        total_interest: Decimal::ZERO,
        total_principal: Decimal::ZERO,
        total_extra_repayments: Decimal::ZERO,
        scheduled_installments: 0,
        extra_repayment_count: 0,
        end_balance: lines
            .last()
            .map(|l| l.remaining_balance)
            .unwrap_or(opening_balance),
        payoff_date: lines
            .iter()
            .find(|l| l.remaining_balance <= BALANCE_EPSILON)
            .map(|l| l.date),
    };

    for line in lines {
        totals.total_payment += line.payment;
        totals.total_interest += line.interest_portion;
        totals.total_principal += line.principal_portion;
        match line.kind {
            LineKind::Scheduled => totals.scheduled_installments += 1,
            LineKind::ExtraRepayment => {
                totals.extra_repayment_count += 1;
                totals.total_extra_repayments += line.principal_portion;
            }
        }
    }

    totals
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

struct ScheduleRun {
    periods: u32,
    regular_payment: Money,
    lines: Vec<ScheduleLineItem>,
    warnings: Vec<String>,
}

/// Running state threaded through the period fold.
struct Accumulator {
    balance: Money,
    lines: Vec<ScheduleLineItem>,
    warnings: Vec<String>,
}

fn run(contract: &LoanContract) -> LoanScheduleResult<ScheduleRun> {
    let periods = contract.validate()?;
    let strategy = PeriodStrategy::for_contract(contract, periods)?;
    let regular_payment = strategy.settle(contract.principal, 1, periods).payment();

    let frequency = contract.payment_frequency.months();
    let due_dates = (1..=periods)
        .map(|i| calendar::due_date(contract.start_date, i, frequency))
        .collect::<LoanScheduleResult<Vec<_>>>()?;

    tracing::debug!(
        periods,
        %regular_payment,
        ?strategy,
        "computing amortization schedule"
    );

    let mut extras = contract.extra_repayments.clone();
    extras.sort_by_key(|e| e.date);
    let mut pending = extras.into_iter().peekable();

    let mut acc = Accumulator {
        balance: contract.principal,
        lines: Vec::with_capacity(periods as usize + contract.extra_repayments.len()),
        warnings: Vec::new(),
    };

    while let Some(extra) = pending.next_if(|e| e.date <= contract.start_date) {
        acc.warnings.push(format!(
            "Extra repayment of {} on {} is on or before the contract start {} and was ignored",
            extra.amount, extra.date, contract.start_date
        ));
    }

    let flow = (1..=periods).zip(due_dates).try_fold(acc, |mut acc, (period, due)| {
        if acc.balance <= BALANCE_EPSILON {
            return ControlFlow::Break(acc);
        }

        while acc.balance > BALANCE_EPSILON {
            match pending.next_if(|e| e.date <= due) {
                Some(extra) => apply_extra(&mut acc, period, extra),
                None => break,
            }
        }
        if acc.balance <= BALANCE_EPSILON {
            return ControlFlow::Break(acc);
        }

        let inst = strategy.settle(acc.balance, period, periods);
        acc.balance -= inst.principal;
        acc.lines.push(ScheduleLineItem {
            period_index: period,
            date: due,
            kind: LineKind::Scheduled,
            payment: inst.payment(),
            interest_portion: inst.interest,
            principal_portion: inst.principal,
            remaining_balance: acc.balance.max(Decimal::ZERO),
        });
        ControlFlow::Continue(acc)
    });
    let (ControlFlow::Continue(mut acc) | ControlFlow::Break(mut acc)) = flow;

    for extra in pending {
        acc.warnings.push(format!(
            "Extra repayment of {} on {} falls after the loan is repaid and was ignored",
            extra.amount, extra.date
        ));
    }

    tracing::debug!(
        lines = acc.lines.len(),
        balance = %acc.balance,
        "amortization schedule complete"
    );

    Ok(ScheduleRun {
        periods,
        regular_payment,
        lines: acc.lines,
        warnings: acc.warnings,
    })
}

fn apply_extra(acc: &mut Accumulator, period: u32, extra: ExtraRepayment) {
    if extra.amount > acc.balance {
        acc.warnings.push(format!(
            "Extra repayment of {} on {} exceeds the outstanding balance of {} by {}",
            extra.amount,
            extra.date,
            acc.balance,
            extra.amount - acc.balance
        ));
    }
    acc.balance = (acc.balance - extra.amount).max(Decimal::ZERO);
    acc.lines.push(ScheduleLineItem {
        period_index: period,
        date: extra.date,
        kind: LineKind::ExtraRepayment,
        payment: extra.amount,
        interest_portion: Decimal::ZERO,
        principal_portion: extra.amount,
        remaining_balance: acc.balance,
    });
}
