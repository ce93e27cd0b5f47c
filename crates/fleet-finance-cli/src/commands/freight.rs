use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fleet_finance_core::freight::{self, FreightInput};

use super::{form_from_fields, parse_form_field, with_display};
use crate::input;

/// Arguments for the goods-carrier profit calculator
#[derive(Args)]
pub struct FreightArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Raw form field as name=value (repeatable); empty values count as missing
    #[arg(long = "field", value_parser = parse_form_field)]
    pub fields: Vec<(String, String)>,

    /// Vehicle price
    #[arg(long, alias = "price")]
    pub vehicle_price: Option<Decimal>,

    /// Running cost per km (the TCO calculator's cost per km)
    #[arg(long, alias = "cost-per-km")]
    pub tco_per_km: Option<Decimal>,

    /// Kilometres run per month
    #[arg(long, alias = "km")]
    pub monthly_running_km: Option<Decimal>,

    /// Share of kilometres that are billed, percent
    #[arg(long, alias = "billed")]
    pub billed_pct: Option<Decimal>,

    /// Freight rate per tonne-km
    #[arg(long, alias = "rate")]
    pub freight_rate: Option<Decimal>,

    /// Extra cost per km run (tolls, driver bata)
    #[arg(long)]
    pub add_on_per_km: Option<Decimal>,

    /// Fixed extras per month
    #[arg(long)]
    pub fixed_add_ons: Option<Decimal>,

    /// Down payment, the equity invested
    #[arg(long, alias = "down")]
    pub down_payment: Option<Decimal>,

    /// Resale value after five years, percent of price
    #[arg(long, alias = "resale")]
    pub resale_pct_5yr: Option<Decimal>,

    /// Payload in tonnes (defaults to 1)
    #[arg(long, alias = "payload")]
    pub payload_tonnes: Option<Decimal>,
}

pub fn run_freight(args: FreightArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let freight_input: FreightInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(form) = form_from_fields(args.fields) {
        FreightInput::from_form(&form)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        FreightInput {
            vehicle_price: args
                .vehicle_price
                .ok_or("--vehicle-price is required (or provide --input)")?,
            tco_per_km: args
                .tco_per_km
                .ok_or("--tco-per-km is required (or provide --input)")?,
            monthly_running_km: args
                .monthly_running_km
                .ok_or("--monthly-running-km is required (or provide --input)")?,
            billed_pct: args
                .billed_pct
                .ok_or("--billed-pct is required (or provide --input)")?,
            freight_rate: args
                .freight_rate
                .ok_or("--freight-rate is required (or provide --input)")?,
            add_on_per_km: args.add_on_per_km.unwrap_or(Decimal::ZERO),
            fixed_add_ons: args.fixed_add_ons.unwrap_or(Decimal::ZERO),
            down_payment: args
                .down_payment
                .ok_or("--down-payment is required (or provide --input)")?,
            resale_pct_5yr: args
                .resale_pct_5yr
                .ok_or("--resale-pct-5yr is required (or provide --input)")?,
            payload_tonnes: args.payload_tonnes,
        }
    };

    tracing::debug!(
        km = %freight_input.monthly_running_km,
        rate = %freight_input.freight_rate,
        "computing freight profit"
    );
    let result = freight::calculate_freight_profit(&freight_input)?;
    for warning in &result.warnings {
        tracing::warn!("{}", warning);
    }
    with_display(result)
}
