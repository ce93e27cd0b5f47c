use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fleet_finance_core::tco::{self, TcoInput};

use super::{form_from_fields, parse_form_field, with_display};
use crate::input;

/// Arguments for the total cost of ownership calculator
#[derive(Args)]
pub struct TcoArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Raw form field as name=value (repeatable); empty values count as missing
    #[arg(long = "field", value_parser = parse_form_field)]
    pub fields: Vec<(String, String)>,

    /// Ex-showroom vehicle price
    #[arg(long, alias = "price")]
    pub vehicle_price: Option<Decimal>,

    /// Amount financed
    #[arg(long, alias = "loan")]
    pub loan_amount: Option<Decimal>,

    /// Down payment
    #[arg(long, alias = "down")]
    pub down_payment: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long, alias = "rate")]
    pub annual_rate_pct: Option<Decimal>,

    /// Loan tenure in years; fractions must come to whole months (3.5 = 42)
    #[arg(long, alias = "tenure")]
    pub tenure_years: Option<Decimal>,

    /// Kilometres run per month
    #[arg(long, alias = "km")]
    pub monthly_running_km: Option<Decimal>,

    /// Fuel economy in km per litre
    #[arg(long)]
    pub mileage: Option<Decimal>,

    /// Fuel price per litre
    #[arg(long)]
    pub fuel_price: Option<Decimal>,

    /// Maintenance per month
    #[arg(long, alias = "maintenance")]
    pub monthly_maintenance: Option<Decimal>,

    /// Insurance premium per year
    #[arg(long, alias = "insurance")]
    pub annual_insurance: Option<Decimal>,

    /// Cost of one full set of tyres
    #[arg(long)]
    pub tyre_set_cost: Option<Decimal>,

    /// Kilometres a tyre set lasts
    #[arg(long)]
    pub tyre_life_km: Option<Decimal>,

    /// Resale value after five years, percent of price
    #[arg(long, alias = "resale")]
    pub resale_pct_5yr: Option<Decimal>,
}

pub fn run_tco(args: TcoArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let tco_input: TcoInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(form) = form_from_fields(args.fields) {
        TcoInput::from_form(&form)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        TcoInput {
            vehicle_price: args
                .vehicle_price
                .ok_or("--vehicle-price is required (or provide --input)")?,
            loan_amount: args
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            down_payment: args
                .down_payment
                .ok_or("--down-payment is required (or provide --input)")?,
            annual_rate_pct: args
                .annual_rate_pct
                .ok_or("--annual-rate-pct is required (or provide --input)")?,
            tenure_years: args
                .tenure_years
                .ok_or("--tenure-years is required (or provide --input)")?,
            monthly_running_km: args
                .monthly_running_km
                .ok_or("--monthly-running-km is required (or provide --input)")?,
            mileage: args.mileage.ok_or("--mileage is required (or provide --input)")?,
            fuel_price: args
                .fuel_price
                .ok_or("--fuel-price is required (or provide --input)")?,
            monthly_maintenance: args
                .monthly_maintenance
                .ok_or("--monthly-maintenance is required (or provide --input)")?,
            annual_insurance: args
                .annual_insurance
                .ok_or("--annual-insurance is required (or provide --input)")?,
            tyre_set_cost: args
                .tyre_set_cost
                .ok_or("--tyre-set-cost is required (or provide --input)")?,
            tyre_life_km: args
                .tyre_life_km
                .ok_or("--tyre-life-km is required (or provide --input)")?,
            resale_pct_5yr: args
                .resale_pct_5yr
                .ok_or("--resale-pct-5yr is required (or provide --input)")?,
        }
    };

    tracing::debug!(
        price = %tco_input.vehicle_price,
        loan = %tco_input.loan_amount,
        tenure_years = %tco_input.tenure_years,
        "computing TCO"
    );
    let result = tco::calculate_tco(&tco_input)?;
    for warning in &result.warnings {
        tracing::warn!("{}", warning);
    }
    with_display(result)
}
