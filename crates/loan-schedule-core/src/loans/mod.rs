pub mod balance;
pub mod loan;
pub mod portfolio;

pub use balance::{outstanding_balance, LoanBalance, LoanBalanceInput};
pub use loan::{Loan, LoanDirection, LoanStatus, LoanTransaction, LoanTransactionKind};
pub use portfolio::{summarize_portfolio, PortfolioInput, PortfolioRow, PortfolioSummary};
