use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::amortization::{ExtraRepayment, InterestKind, LoanContract};
use crate::types::Money;

/// Which side of the contract we are on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LoanDirection {
    /// We borrowed: the outstanding balance is a liability
    #[serde(alias = "taken")]
    Taken,
    /// We lent: the outstanding balance is a receivable
    #[serde(alias = "given")]
    Given,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LoanStatus {
    #[default]
    Active,
    Closed,
    Defaulted,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LoanTransactionKind {
    /// Principal repayment outside the plan
    #[serde(alias = "repayment")]
    Repayment,
    /// Interest paid; never reduces principal
    #[serde(alias = "interest_payment")]
    InterestPayment,
}

/// Money actually recorded against a loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTransaction {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Money,
    pub kind: LoanTransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A loan on the books: contract terms plus bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub direction: LoanDirection,
    pub counterparty_name: String,
    /// Contract or reference number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_info: Option<String>,
    /// Security pledged for the loan, free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collateral: Option<String>,
    #[serde(default)]
    pub status: LoanStatus,
    /// When set, installments are assumed paid on their due dates
    #[serde(default = "default_auto_payment")]
    pub auto_payment: bool,
    pub contract: LoanContract,
    #[serde(default)]
    pub transactions: Vec<LoanTransaction>,
}

fn default_auto_payment() -> bool {
    true
}

impl Loan {
    /// The contract with every recorded repayment merged into its extra
    /// repayments.
    pub fn effective_contract(&self) -> LoanContract {
        let mut contract = self.contract.clone();
        contract.extra_repayments.extend(
            self.repayments()
                .map(|t| ExtraRepayment {
                    date: t.date,
                    amount: t.amount,
                }),
        );
        contract
    }

    pub fn repayments(&self) -> impl Iterator<Item = &LoanTransaction> {
        self.transactions_of(LoanTransactionKind::Repayment)
    }

    pub fn interest_payments(&self) -> impl Iterator<Item = &LoanTransaction> {
        self.transactions_of(LoanTransactionKind::InterestPayment)
    }

    fn transactions_of(
        &self,
        kind: LoanTransactionKind,
    ) -> impl Iterator<Item = &LoanTransaction> {
        self.transactions.iter().filter(move |t| t.kind == kind)
    }

    /// Human-readable interest terms, e.g. `6% p.a.` or `1000 fixed`.
    pub fn interest_label(&self) -> String {
        match self.contract.interest_kind {
            InterestKind::PercentPerAnnum => format!("{}% p.a.", self.contract.interest_rate),
            InterestKind::FixedTotal => format!("{} fixed", self.contract.interest_rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOAN_JSON: &str = r#"{
        "id": "loan-1",
        "direction": "taken",
        "counterparty_name": "Sparkasse",
        "contract": {
            "principal": "20000",
            "interest_rate": "4.5",
            "interest_kind": "p.a.",
            "amortization_kind": "annuity",
            "payment_frequency": 1,
            "start_date": "2024-01-01",
            "end_date": "2026-01-01"
        },
        "transactions": [
            {"id": "tx-1", "date": "2024-03-10", "amount": "1000", "kind": "repayment", "note": "Sondertilgung"},
            {"id": "tx-2", "date": "2024-04-01", "amount": "75", "kind": "interest_payment"}
        ]
    }"#;

    #[test]
    fn test_defaults_and_aliases() {
        let loan: Loan = serde_json::from_str(LOAN_JSON).unwrap();
        assert_eq!(loan.direction, LoanDirection::Taken);
        assert_eq!(loan.status, LoanStatus::Active);
        assert!(loan.auto_payment);
        assert_eq!(loan.interest_label(), "4.5% p.a.");
    }

    #[test]
    fn test_effective_contract_only_merges_repayments() {
        let loan: Loan = serde_json::from_str(LOAN_JSON).unwrap();
        let contract = loan.effective_contract();
        assert_eq!(contract.extra_repayments.len(), 1);
        assert_eq!(
            contract.extra_repayments[0].date,
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
        );
        assert_eq!(loan.interest_payments().count(), 1);
    }

    #[test]
    fn test_collateral_survives_round_trip() {
        let mut value: serde_json::Value = serde_json::from_str(LOAN_JSON).unwrap();
        value["collateral"] = serde_json::json!("Grundschuld Musterstr. 1");
        let loan: Loan = serde_json::from_value(value).unwrap();
        assert_eq!(loan.collateral.as_deref(), Some("Grundschuld Musterstr. 1"));

        let back = serde_json::to_value(&loan).unwrap();
        assert_eq!(back["collateral"], "Grundschuld Musterstr. 1");

        let without: Loan = serde_json::from_str(LOAN_JSON).unwrap();
        assert!(serde_json::to_value(&without).unwrap().get("collateral").is_none());
    }
}
