mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use commands::loans::{BalanceArgs, PortfolioArgs};
use commands::schedule::{ScheduleArgs, SummaryArgs};
use output::OutputFormat;

/// Loan repayment schedules with decimal precision
#[derive(Parser)]
#[command(
    name = "loansched",
    version,
    about = "Loan repayment schedules with decimal precision",
    long_about = "Builds repayment schedules for annuity, linear and balloon loans, \
                  with extra repayments, date-windowed summaries, outstanding \
                  balances and a loan book overview."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Round monetary output to this many decimal places
    #[arg(long, global = true)]
    dp: Option<u32>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Full repayment schedule of a loan contract
    Schedule(ScheduleArgs),
    /// Schedule lines and totals within a date window
    Summary(SummaryArgs),
    /// Outstanding balance of one loan on a given day
    Balance(BalanceArgs),
    /// Liabilities and receivables across a loan book
    Portfolio(PortfolioArgs),
    /// Print version information
    Version,
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args, cli.dp),
        Commands::Summary(args) => commands::schedule::run_summary(args, cli.dp),
        Commands::Balance(args) => commands::loans::run_balance(args, cli.dp),
        Commands::Portfolio(args) => commands::loans::run_portfolio(args, cli.dp),
        Commands::Version => {
            println!("loansched {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            if let Some(warnings) = value.get("warnings").and_then(|w| w.as_array()) {
                for w in warnings.iter().filter_map(|w| w.as_str()) {
                    tracing::warn!("{w}");
                }
            }
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
