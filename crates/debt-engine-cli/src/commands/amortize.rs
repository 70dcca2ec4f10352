use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use debt_engine_core::amortization::{
    minimum_payment, payoff_horizon, remaining_balance_after, total_interest, PayoffHorizon,
};

/// Arguments for the annuity minimum-payment formula
#[derive(Args)]
pub struct MinPaymentArgs {
    /// Principal to amortize
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate as a percentage (12.5 = 12.5%/yr)
    #[arg(long)]
    pub annual_rate: Decimal,

    /// Term in months
    #[arg(long)]
    pub term_months: u32,
}

/// Arguments for a single-loan payoff projection
#[derive(Args)]
pub struct PayoffArgs {
    /// Remaining balance
    #[arg(long)]
    pub balance: Decimal,

    /// Annual interest rate as a percentage
    #[arg(long)]
    pub annual_rate: Decimal,

    /// Fixed monthly payment
    #[arg(long)]
    pub payment: Decimal,
}

pub fn run_min_payment(args: MinPaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payment = minimum_payment(args.principal, args.annual_rate, args.term_months);
    Ok(json!({
        "minimum_payment": payment.round_dp(2),
        "principal": args.principal,
        "annual_rate": args.annual_rate,
        "term_months": args.term_months,
    }))
}

pub fn run_payoff(args: PayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let horizon = payoff_horizon(args.balance, args.annual_rate, args.payment);
    let interest = total_interest(args.balance, args.annual_rate, args.payment);

    Ok(json!({
        "months_to_payoff": horizon,
        "months": horizon.months(),
        "total_interest": interest.map(|i| i.round_dp(2)),
        "residual_preview": residual_preview(&args, horizon),
        "balance": args.balance,
        "annual_rate": args.annual_rate,
        "payment": args.payment,
    }))
}

/// Balance checkpoints at the quarter points of the payoff schedule, so a
/// user can see the curve without dumping every month.
fn residual_preview(args: &PayoffArgs, horizon: PayoffHorizon) -> Vec<Value> {
    let months = match horizon.months() {
        Some(m) if m > 0 => m,
        _ => return Vec::new(),
    };

    let mut checkpoints: Vec<u32> = [1, months / 4, months / 2, months * 3 / 4, months]
        .into_iter()
        .filter(|&m| m > 0)
        .collect();
    checkpoints.dedup();

    checkpoints
        .into_iter()
        .map(|m| {
            let residual = remaining_balance_after(args.balance, args.annual_rate, args.payment, m);
            json!({ "month": m, "balance": residual.round_dp(2) })
        })
        .collect()
}
