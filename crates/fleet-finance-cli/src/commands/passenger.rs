use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fleet_finance_core::passenger::{self, PassengerInput};

use super::{form_from_fields, parse_form_field, with_display};
use crate::input;

/// Arguments for the bus / van route profit calculator
#[derive(Args)]
pub struct PassengerArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Raw form field as name=value (repeatable); empty values count as missing
    #[arg(long = "field", value_parser = parse_form_field)]
    pub fields: Vec<(String, String)>,

    /// Seating capacity
    #[arg(long)]
    pub seats: Option<Decimal>,

    /// Average occupancy, percent
    #[arg(long, alias = "occupancy")]
    pub occupancy_pct: Option<Decimal>,

    /// Fare per passenger per trip
    #[arg(long)]
    pub fare: Option<Decimal>,

    /// Trips per day
    #[arg(long, alias = "trips")]
    pub trips_per_day: Option<Decimal>,

    /// Route length per trip, km
    #[arg(long)]
    pub km_per_trip: Option<Decimal>,

    /// Working days per month
    #[arg(long, alias = "work-days")]
    pub work_days_per_month: Option<Decimal>,

    /// Fuel price per litre
    #[arg(long)]
    pub fuel_price: Option<Decimal>,

    /// Fuel economy, km per litre
    #[arg(long)]
    pub km_per_litre: Option<Decimal>,

    /// Driver wage per month
    #[arg(long, alias = "driver-wage")]
    pub driver_wage_monthly: Option<Decimal>,

    /// Conductor wage per month
    #[arg(long, alias = "conductor-wage")]
    pub conductor_wage_monthly: Option<Decimal>,

    /// Maintenance per km
    #[arg(long)]
    pub maintenance_per_km: Option<Decimal>,

    /// Route permit per year
    #[arg(long, alias = "permit")]
    pub annual_permit: Option<Decimal>,

    /// Vehicle price
    #[arg(long, alias = "price")]
    pub vehicle_price: Option<Decimal>,

    /// Useful life in years
    #[arg(long)]
    pub life_years: Option<Decimal>,

    /// Residual value at end of life, percent of price
    #[arg(long, alias = "residual")]
    pub residual_pct: Option<Decimal>,
}

pub fn run_passenger(args: PassengerArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let passenger_input: PassengerInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(form) = form_from_fields(args.fields) {
        PassengerInput::from_form(&form)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        PassengerInput {
            seats: args.seats.ok_or("--seats is required (or provide --input)")?,
            occupancy_pct: args
                .occupancy_pct
                .ok_or("--occupancy-pct is required (or provide --input)")?,
            fare: args.fare.ok_or("--fare is required (or provide --input)")?,
            trips_per_day: args
                .trips_per_day
                .ok_or("--trips-per-day is required (or provide --input)")?,
            km_per_trip: args
                .km_per_trip
                .ok_or("--km-per-trip is required (or provide --input)")?,
            work_days_per_month: args
                .work_days_per_month
                .ok_or("--work-days-per-month is required (or provide --input)")?,
            fuel_price: args
                .fuel_price
                .ok_or("--fuel-price is required (or provide --input)")?,
            km_per_litre: args
                .km_per_litre
                .ok_or("--km-per-litre is required (or provide --input)")?,
            driver_wage_monthly: args
                .driver_wage_monthly
                .ok_or("--driver-wage-monthly is required (or provide --input)")?,
            conductor_wage_monthly: args.conductor_wage_monthly.unwrap_or(Decimal::ZERO),
            maintenance_per_km: args
                .maintenance_per_km
                .ok_or("--maintenance-per-km is required (or provide --input)")?,
            annual_permit: args
                .annual_permit
                .ok_or("--annual-permit is required (or provide --input)")?,
            vehicle_price: args
                .vehicle_price
                .ok_or("--vehicle-price is required (or provide --input)")?,
            life_years: args
                .life_years
                .ok_or("--life-years is required (or provide --input)")?,
            residual_pct: args
                .residual_pct
                .ok_or("--residual-pct is required (or provide --input)")?,
        }
    };

    tracing::debug!(
        seats = %passenger_input.seats,
        trips = %passenger_input.trips_per_day,
        work_days = %passenger_input.work_days_per_month,
        "computing passenger profit"
    );
    let result = passenger::calculate_passenger_profit(&passenger_input)?;
    for warning in &result.warnings {
        tracing::warn!("{}", warning);
    }
    with_display(result)
}
