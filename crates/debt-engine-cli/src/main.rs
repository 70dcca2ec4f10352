mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortize::{MinPaymentArgs, PayoffArgs};
use commands::portfolio::{AnalysisArgs, SavingsArgs, StrategyArgs};

/// Loan amortization and debt payoff-strategy analysis
#[derive(Parser)]
#[command(
    name = "debtcalc",
    version,
    about = "Loan amortization and debt payoff-strategy analysis",
    long_about = "A CLI for analyzing loan portfolios with decimal precision. \
                  Supports amortization math, avalanche/snowball payoff strategies, \
                  interest-savings projections, and portfolio debt-health analysis."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the annuity minimum payment for a loan
    MinPayment(MinPaymentArgs),
    /// Project payoff months and total interest for a single loan
    Payoff(PayoffArgs),
    /// Build an avalanche or snowball payment plan for a portfolio
    Strategy(StrategyArgs),
    /// Project interest savings from an extra monthly payment
    Savings(SavingsArgs),
    /// Full portfolio debt analysis
    Analysis(AnalysisArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::MinPayment(args) => commands::amortize::run_min_payment(args),
        Commands::Payoff(args) => commands::amortize::run_payoff(args),
        Commands::Strategy(args) => commands::portfolio::run_strategy(args),
        Commands::Savings(args) => commands::portfolio::run_savings(args),
        Commands::Analysis(args) => commands::portfolio::run_analysis(args),
        Commands::Version => {
            println!("debtcalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
