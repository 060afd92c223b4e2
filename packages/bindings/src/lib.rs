use napi::Result as NapiResult;
use napi_derive::napi;

use loan_schedule_core::amortization::{self, LoanContract};
use loan_schedule_core::loans::{self, LoanBalanceInput, PortfolioInput};
use loan_schedule_core::reporting::{self, ScheduleWindowInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

/// Bare list of schedule lines for a contract.
#[napi]
pub fn compute_schedule(contract_json: String) -> NapiResult<String> {
    let contract: LoanContract = serde_json::from_str(&contract_json).map_err(to_napi_error)?;
    let lines = amortization::compute_schedule(&contract).map_err(to_napi_error)?;
    serde_json::to_string(&lines).map_err(to_napi_error)
}

#[napi]
pub fn build_schedule(contract_json: String) -> NapiResult<String> {
    let contract: LoanContract = serde_json::from_str(&contract_json).map_err(to_napi_error)?;
    let output = amortization::build_schedule(&contract).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn summarize_schedule(input_json: String) -> NapiResult<String> {
    let input: ScheduleWindowInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = reporting::summarize_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loan book
// ---------------------------------------------------------------------------

#[napi]
pub fn outstanding_balance(input_json: String) -> NapiResult<String> {
    let input: LoanBalanceInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loans::outstanding_balance(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn summarize_portfolio(input_json: String) -> NapiResult<String> {
    let input: PortfolioInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loans::summarize_portfolio(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
