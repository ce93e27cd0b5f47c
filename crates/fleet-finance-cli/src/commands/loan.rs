use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fleet_finance_core::amortization::{self, LoanInput};

use super::{form_from_fields, parse_form_field, with_display};
use crate::input;

/// Arguments for the EMI / amortization calculator
#[derive(Args)]
pub struct EmiArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Raw form field as name=value (repeatable); empty values count as missing
    #[arg(long = "field", value_parser = parse_form_field)]
    pub fields: Vec<(String, String)>,

    /// Amount financed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (10 = 10%)
    #[arg(long, alias = "rate")]
    pub annual_rate_pct: Option<Decimal>,

    /// Loan term in months
    #[arg(long, alias = "months")]
    pub term_months: Option<u32>,

    /// Due date of the first installment (YYYY-MM-DD)
    #[arg(long)]
    pub first_payment_date: Option<NaiveDate>,

    /// Omit the month-by-month schedule
    #[arg(long)]
    pub no_schedule: bool,
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut loan_input: LoanInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(form) = form_from_fields(args.fields) {
        LoanInput::from_form(&form)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        LoanInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_pct: args
                .annual_rate_pct
                .ok_or("--annual-rate-pct is required (or provide --input)")?,
            term_months: args
                .term_months
                .ok_or("--term-months is required (or provide --input)")?,
            first_payment_date: None,
            include_schedule: true,
        }
    };

    if args.first_payment_date.is_some() {
        loan_input.first_payment_date = args.first_payment_date;
    }
    if args.no_schedule {
        loan_input.include_schedule = false;
    }

    tracing::debug!(
        principal = %loan_input.principal,
        rate = %loan_input.annual_rate_pct,
        months = loan_input.term_months,
        "computing EMI"
    );
    let result = amortization::calculate_loan(&loan_input)?;
    tracing::info!(
        rows = result.result.schedule.len(),
        warnings = result.warnings.len(),
        "EMI computed"
    );
    with_display(result)
}
