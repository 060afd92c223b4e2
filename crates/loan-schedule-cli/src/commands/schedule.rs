use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use loan_schedule_core::amortization::{
    self, AmortizationKind, ExtraRepayment, InterestKind, LoanContract, PaymentFrequency,
};
use loan_schedule_core::reporting::{self, ScheduleWindowInput};
use loan_schedule_core::round_money;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum InterestKindArg {
    /// Percent per annum on the declining balance
    Percent,
    /// Flat interest sum over the whole term
    Fixed,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AmortizationArg {
    Annuity,
    Linear,
    Balloon,
}

/// Contract terms given on the command line
#[derive(Args)]
pub struct ContractArgs {
    /// Amount borrowed or lent
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Interest: percent p.a. (6 = 6%) or the fixed total, see --interest-kind
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// How --rate is interpreted
    #[arg(long, value_enum, default_value = "percent")]
    pub interest_kind: InterestKindArg,

    /// Installment shape
    #[arg(long, value_enum, default_value = "annuity")]
    pub amortization: AmortizationArg,

    /// Months between installments (1, 3, 6 or 12)
    #[arg(long, default_value_t = 1)]
    pub frequency: u32,

    /// Contract start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Contract end date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Extra repayments as DATE:AMOUNT (comma-separated, e.g. "2024-07-01:2000")
    #[arg(long, value_delimiter = ',', value_parser = parse_extra)]
    pub extra: Vec<ExtraRepayment>,
}

impl ContractArgs {
    fn into_contract(self) -> Result<LoanContract, Box<dyn std::error::Error>> {
        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let interest_rate = self.rate.ok_or("--rate is required (or provide --input)")?;
        let start_date = self.start.ok_or("--start is required (or provide --input)")?;
        let end_date = self.end.ok_or("--end is required (or provide --input)")?;

        Ok(LoanContract {
            principal,
            interest_rate,
            interest_kind: match self.interest_kind {
                InterestKindArg::Percent => InterestKind::PercentPerAnnum,
                InterestKindArg::Fixed => InterestKind::FixedTotal,
            },
            amortization_kind: match self.amortization {
                AmortizationArg::Annuity => AmortizationKind::Annuity,
                AmortizationArg::Linear => AmortizationKind::Linear,
                AmortizationArg::Balloon => AmortizationKind::Balloon,
            },
            payment_frequency: PaymentFrequency::try_from(self.frequency)?,
            start_date,
            end_date,
            extra_repayments: self.extra,
        })
    }
}

fn parse_extra(s: &str) -> Result<ExtraRepayment, String> {
    let (date, amount) = s
        .split_once(':')
        .ok_or_else(|| format!("expected DATE:AMOUNT, got '{s}'"))?;
    let date: NaiveDate = date
        .trim()
        .parse()
        .map_err(|e| format!("invalid date '{date}': {e}"))?;
    let amount: Decimal = amount
        .trim()
        .parse()
        .map_err(|e| format!("invalid amount '{amount}': {e}"))?;
    Ok(ExtraRepayment { date, amount })
}

// ---------------------------------------------------------------------------
// schedule
// ---------------------------------------------------------------------------

/// Arguments for the full repayment schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to a JSON or YAML contract (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub contract: ContractArgs,
}

pub fn run_schedule(
    args: ScheduleArgs,
    dp: Option<u32>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let contract: LoanContract = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        args.contract.into_contract()?
    };

    let mut result = amortization::build_schedule(&contract)?;
    if let Some(dp) = dp {
        let out = &mut result.result;
        out.regular_payment = round_money(out.regular_payment, dp);
        out.lines = out.lines.iter().map(|l| l.rounded(dp)).collect();
        out.totals = out.totals.rounded(dp);
    }
    Ok(serde_json::to_value(result)?)
}

// ---------------------------------------------------------------------------
// summary
// ---------------------------------------------------------------------------

/// Arguments for a date-windowed schedule summary
#[derive(Args)]
pub struct SummaryArgs {
    /// Path to a JSON or YAML window input: {contract, from?, to?}
    #[arg(long)]
    pub input: Option<String>,

    /// First day of the window, inclusive
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day of the window, inclusive
    #[arg(long)]
    pub to: Option<NaiveDate>,

    #[command(flatten)]
    pub contract: ContractArgs,
}

pub fn run_summary(
    args: SummaryArgs,
    dp: Option<u32>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut window: ScheduleWindowInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ScheduleWindowInput {
            contract: args.contract.into_contract()?,
            from: None,
            to: None,
        }
    };
    // Flags narrow a window read from file or stdin
    if args.from.is_some() {
        window.from = args.from;
    }
    if args.to.is_some() {
        window.to = args.to;
    }

    let mut result = reporting::summarize_schedule(&window)?;
    if let Some(dp) = dp {
        let out = &mut result.result;
        out.opening_balance = round_money(out.opening_balance, dp);
        out.closing_balance = round_money(out.closing_balance, dp);
        out.lines = out.lines.iter().map(|l| l.rounded(dp)).collect();
        out.totals = out.totals.rounded(dp);
    }
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_extra() {
        let extra = parse_extra("2024-07-01:2000.50").unwrap();
        assert_eq!(extra.date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(extra.amount, dec!(2000.50));
    }

    #[test]
    fn test_parse_extra_rejects_missing_amount() {
        assert!(parse_extra("2024-07-01").is_err());
        assert!(parse_extra("July:100").is_err());
    }

    #[test]
    fn test_contract_flags_require_principal() {
        let args = ContractArgs {
            principal: None,
            rate: Some(dec!(5)),
            interest_kind: InterestKindArg::Percent,
            amortization: AmortizationArg::Linear,
            frequency: 1,
            start: NaiveDate::from_ymd_opt(2024, 1, 1),
            end: NaiveDate::from_ymd_opt(2025, 1, 1),
            extra: vec![],
        };
        let err = args.into_contract().unwrap_err();
        assert!(err.to_string().contains("--principal"));
    }

    #[test]
    fn test_contract_flags_reject_bad_frequency() {
        let args = ContractArgs {
            principal: Some(dec!(1000)),
            rate: Some(dec!(5)),
            interest_kind: InterestKindArg::Fixed,
            amortization: AmortizationArg::Balloon,
            frequency: 2,
            start: NaiveDate::from_ymd_opt(2024, 1, 1),
            end: NaiveDate::from_ymd_opt(2025, 1, 1),
            extra: vec![],
        };
        assert!(args.into_contract().is_err());
    }
}
