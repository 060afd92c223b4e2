use chrono::NaiveDate;
use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use loan_schedule_core::loans::{
    self, Loan, LoanBalance, LoanBalanceInput, PortfolioInput, PortfolioSummary,
};
use loan_schedule_core::round_money;

use crate::input;

/// A loan book file: either a bare list or `{ "loans": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum LoanBook {
    List(Vec<Loan>),
    Wrapped { loans: Vec<Loan> },
}

impl LoanBook {
    fn into_loans(self) -> Vec<Loan> {
        match self {
            LoanBook::List(loans) | LoanBook::Wrapped { loans } => loans,
        }
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// ---------------------------------------------------------------------------
// balance
// ---------------------------------------------------------------------------

/// Arguments for the outstanding balance of one loan
#[derive(Args)]
pub struct BalanceArgs {
    /// Path to a JSON or YAML loan record
    #[arg(long)]
    pub input: Option<String>,

    /// Reporting date (YYYY-MM-DD, default today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

pub fn run_balance(args: BalanceArgs, dp: Option<u32>) -> Result<Value, Box<dyn std::error::Error>> {
    let loan: Loan = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <loan.json> or stdin required for balance".into());
    };
    let as_of = args.as_of.unwrap_or_else(today);

    let mut result = loans::outstanding_balance(&LoanBalanceInput { loan, as_of })?;
    if let Some(dp) = dp {
        round_balance(&mut result.result, dp);
    }
    Ok(serde_json::to_value(result)?)
}

fn round_balance(b: &mut LoanBalance, dp: u32) {
    b.principal = round_money(b.principal, dp);
    b.outstanding = round_money(b.outstanding, dp);
    b.principal_repaid = round_money(b.principal_repaid, dp);
    b.overpaid = round_money(b.overpaid, dp);
    b.interest_paid = round_money(b.interest_paid, dp);
    b.repaid_pct = round_money(b.repaid_pct, dp);
    b.next_installment = b.next_installment.as_ref().map(|l| l.rounded(dp));
}

// ---------------------------------------------------------------------------
// portfolio
// ---------------------------------------------------------------------------

/// Arguments for the loan book overview
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to a JSON or YAML list of loans
    #[arg(long)]
    pub input: Option<String>,

    /// Reporting date (YYYY-MM-DD, default today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

pub fn run_portfolio(
    args: PortfolioArgs,
    dp: Option<u32>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let book: LoanBook = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <loans.json> or stdin required for portfolio".into());
    };
    let as_of = args.as_of.unwrap_or_else(today);

    let mut result = loans::summarize_portfolio(&PortfolioInput {
        loans: book.into_loans(),
        as_of,
    })?;
    if let Some(dp) = dp {
        round_portfolio(&mut result.result, dp);
    }
    Ok(serde_json::to_value(result)?)
}

fn round_portfolio(s: &mut PortfolioSummary, dp: u32) {
    for row in &mut s.rows {
        row.principal = round_money(row.principal, dp);
        row.outstanding = round_money(row.outstanding, dp);
        row.repaid_pct = round_money(row.repaid_pct, dp);
    }
    s.total_liabilities = round_money(s.total_liabilities, dp);
    s.total_receivables = round_money(s.total_receivables, dp);
    s.net_position = round_money(s.net_position, dp);
}
