#![cfg(feature = "portfolio")]

use chrono::NaiveDate;
use loan_schedule_core::loans::{
    outstanding_balance, summarize_portfolio, Loan, LoanBalanceInput, LoanDirection, LoanStatus,
    PortfolioInput,
};
use loan_schedule_core::LoanScheduleError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ===========================================================================
// Fixtures (as stored by the loan register, original tags included)
// ===========================================================================

fn bank_loan() -> Loan {
    serde_json::from_value(serde_json::json!({
        "id": "loan-bank",
        "direction": "taken",
        "counterparty_name": "Hausbank AG",
        "contract_info": "DL-2024-001",
        "auto_payment": true,
        "contract": {
            "principal": "24000",
            "interest_rate": "5",
            "interest_kind": "p.a.",
            "amortization_kind": "linear",
            "payment_frequency": 3,
            "start_date": "2024-01-01",
            "end_date": "2026-01-01"
        }
    }))
    .unwrap()
}

fn shareholder_loan() -> Loan {
    serde_json::from_value(serde_json::json!({
        "id": "loan-gesellschafter",
        "direction": "given",
        "counterparty_name": "Max Mustermann",
        "auto_payment": false,
        "contract": {
            "principal": "5000",
            "interest_rate": "250",
            "interest_kind": "fixed",
            "amortization_kind": "balloon",
            "payment_frequency": 12,
            "start_date": "2024-01-01",
            "end_date": "2026-01-01"
        },
        "transactions": [
            {"id": "tx-1", "date": "2024-06-30", "amount": "1500", "kind": "repayment"},
            {"id": "tx-2", "date": "2025-01-01", "amount": "125", "kind": "interest_payment"}
        ]
    }))
    .unwrap()
}

// ===========================================================================
// Single loan balance
// ===========================================================================

#[test]
fn test_linear_loan_balance_mid_term() {
    // Eight quarterly slices of 3000; four are due by Jan 1 2025
    let out = outstanding_balance(&LoanBalanceInput {
        loan: bank_loan(),
        as_of: d(2025, 1, 1),
    })
    .unwrap();
    let b = out.result;
    assert_eq!(b.outstanding, dec!(12000));
    assert_eq!(b.principal_repaid, dec!(12000));
    assert_eq!(b.repaid_pct, dec!(50));
    // 24000, 21000, 18000, 15000 at 1.25% per quarter
    assert_eq!(b.interest_paid, dec!(975));
    let next = b.next_installment.unwrap();
    assert_eq!(next.date, d(2025, 4, 1));
    assert_eq!(next.principal_portion, dec!(3000));
}

#[test]
fn test_manual_loan_balance() {
    let out = outstanding_balance(&LoanBalanceInput {
        loan: shareholder_loan(),
        as_of: d(2025, 3, 1),
    })
    .unwrap();
    let b = out.result;
    assert_eq!(b.outstanding, dec!(3500));
    assert_eq!(b.interest_paid, dec!(125));
    assert_eq!(b.repaid_pct, dec!(30));
    assert!(out.methodology.contains("recorded"));
}

// ===========================================================================
// Portfolio
// ===========================================================================

#[test]
fn test_portfolio_totals_by_direction() {
    let out = summarize_portfolio(&PortfolioInput {
        loans: vec![bank_loan(), shareholder_loan()],
        as_of: d(2025, 1, 1),
    })
    .unwrap();
    let s = out.result;

    assert_eq!(s.rows.len(), 2);
    assert_eq!(s.rows[0].direction, LoanDirection::Taken);
    assert_eq!(s.rows[0].interest, "5% p.a.");
    assert_eq!(s.rows[1].interest, "250 fixed");

    assert_eq!(s.total_liabilities, dec!(12000));
    assert_eq!(s.total_receivables, dec!(3500));
    assert_eq!(s.net_position, dec!(-8500));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_defaulted_loan_is_flagged() {
    let mut loan = shareholder_loan();
    loan.status = LoanStatus::Defaulted;
    let out = summarize_portfolio(&PortfolioInput {
        loans: vec![loan],
        as_of: d(2025, 1, 1),
    })
    .unwrap();
    assert_eq!(out.warnings.len(), 1);
    assert!(out.warnings[0].contains("default"));
    assert_eq!(out.result.total_liabilities, Decimal::ZERO);
}

#[test]
fn test_empty_portfolio_rejected() {
    let err = summarize_portfolio(&PortfolioInput {
        loans: vec![],
        as_of: d(2025, 1, 1),
    })
    .unwrap_err();
    assert!(matches!(err, LoanScheduleError::InsufficientData(_)));
}

#[test]
fn test_invalid_loan_names_loan_in_field() {
    let mut loan = bank_loan();
    loan.contract.principal = Decimal::ZERO;
    let err = summarize_portfolio(&PortfolioInput {
        loans: vec![loan],
        as_of: d(2025, 1, 1),
    })
    .unwrap_err();
    assert_eq!(err.field(), Some("loans[loan-bank].contract.principal"));
}
