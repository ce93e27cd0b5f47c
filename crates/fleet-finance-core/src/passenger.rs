use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FieldErrors;
use crate::types::{fraction, ratio, with_metadata, ComputationOutput, Distance, Money, Percent};
use crate::validation::{
    require_bounded, require_zero_or_at_least, MAX_AMOUNT, MAX_QUANTITY, MIN_DIVISOR,
};
use crate::FleetFinanceResult;

const DAYS_PER_YEAR: Decimal = dec!(365);
const MONTHS_PER_YEAR: Decimal = dec!(12);
const YEARS_IN_HORIZON: Decimal = dec!(5);

/// Share of the vehicle price assumed as the owner's investment.
pub const DOWN_PAYMENT_HEURISTIC: Decimal = dec!(0.2);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerInput {
    pub seats: Decimal,
    pub occupancy_pct: Percent,
    pub fare: Money,
    pub trips_per_day: Decimal,
    pub km_per_trip: Distance,
    pub work_days_per_month: Decimal,
    pub fuel_price: Money,
    pub km_per_litre: Decimal,
    pub driver_wage_monthly: Money,
    pub conductor_wage_monthly: Money,
    pub maintenance_per_km: Money,
    /// Permit, insurance and road tax for a year.
    pub annual_permit: Money,
    pub vehicle_price: Money,
    pub life_years: Decimal,
    pub residual_pct: Percent,
}

/// Per-operating-day economics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyFigures {
    pub km: Distance,
    pub passengers: Decimal,
    pub fuel_litres: Decimal,
    pub fuel_cost: Money,
    pub maintenance: Money,
    pub driver_cost: Money,
    pub conductor_cost: Money,
    pub permit_cost: Money,
    pub depreciation: Money,
    pub revenue: Money,
    pub cost: Money,
    pub profit: Money,
}

/// Monthly economics. Wages, permit and depreciation come from their own
/// monthly bases rather than from the daily figures times work days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFigures {
    pub revenue: Money,
    pub fuel: Money,
    pub maintenance: Money,
    pub wages: Money,
    pub permit: Money,
    pub depreciation: Money,
    pub cost: Money,
    pub profit: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerOutput {
    pub daily: DailyFigures,
    pub monthly: MonthlyFigures,
    pub depreciable_base: Money,
    pub annual_profit: Money,
    pub five_year_profit: Money,
    /// Daily cost per passenger-km carried; a proxy for the break-even fare per km.
    pub breakeven_rate: Option<Money>,
    pub down_payment_heuristic: Money,
    pub roi_5yr: Option<Decimal>,
    pub payback_months: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Profitability of a bus or van on a fixed route. Never fails; the input is
/// expected to be within the bounds [`validate_passenger`] enforces.
pub fn compute_passenger_profit(input: &PassengerInput) -> PassengerOutput {
    let work_days = input.work_days_per_month;
    // Wage split only: an unset work-day count is treated as one day.
    let wage_days = work_days.max(Decimal::ONE);

    // -- Daily ---------------------------------------------------------------
    let daily_km = input.km_per_trip * input.trips_per_day;
    let daily_passengers = input.seats * input.trips_per_day * fraction(input.occupancy_pct);

    let fuel_litres = if input.km_per_litre > Decimal::ZERO {
        ratio(daily_km, input.km_per_litre).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };
    let fuel_cost = fuel_litres * input.fuel_price;
    let maintenance = daily_km * input.maintenance_per_km;
    let driver_cost = input.driver_wage_monthly / wage_days;
    let conductor_cost = input.conductor_wage_monthly / wage_days;
    let permit_cost = input.annual_permit / DAYS_PER_YEAR;

    let depreciable_base = input.vehicle_price * (Decimal::ONE - fraction(input.residual_pct));
    let depreciation = if input.life_years > Decimal::ZERO {
        ratio(depreciable_base, input.life_years * DAYS_PER_YEAR).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    let daily_revenue = daily_passengers * input.fare;
    let daily_cost =
        fuel_cost + maintenance + driver_cost + conductor_cost + permit_cost + depreciation;

    let daily = DailyFigures {
        km: daily_km,
        passengers: daily_passengers,
        fuel_litres,
        fuel_cost,
        maintenance,
        driver_cost,
        conductor_cost,
        permit_cost,
        depreciation,
        revenue: daily_revenue,
        cost: daily_cost,
        profit: daily_revenue - daily_cost,
    };

    // -- Monthly -------------------------------------------------------------
    let monthly_fuel = fuel_cost * work_days;
    let monthly_maintenance = maintenance * work_days;
    let wages = input.driver_wage_monthly + input.conductor_wage_monthly;
    let monthly_permit = input.annual_permit / MONTHS_PER_YEAR;
    let monthly_depreciation = if input.life_years > Decimal::ZERO {
        ratio(depreciable_base, input.life_years)
            .map(|per_year| per_year / MONTHS_PER_YEAR)
            .unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };
    let monthly_revenue = daily_revenue * work_days;
    let monthly_cost =
        monthly_fuel + monthly_maintenance + wages + monthly_permit + monthly_depreciation;
    let monthly_profit = monthly_revenue - monthly_cost;

    let monthly = MonthlyFigures {
        revenue: monthly_revenue,
        fuel: monthly_fuel,
        maintenance: monthly_maintenance,
        wages,
        permit: monthly_permit,
        depreciation: monthly_depreciation,
        cost: monthly_cost,
        profit: monthly_profit,
    };

    // -- Rollups -------------------------------------------------------------
    let annual_profit = monthly_profit * MONTHS_PER_YEAR;
    // Residual value is already inside depreciation; no terminal resale here.
    let five_year_profit = annual_profit * YEARS_IN_HORIZON;

    let billed_pax_km_per_day = daily_passengers * input.km_per_trip;
    let breakeven_rate = if billed_pax_km_per_day > Decimal::ZERO {
        ratio(daily_cost, billed_pax_km_per_day)
    } else {
        None
    };

    let down_payment_heuristic = input.vehicle_price * DOWN_PAYMENT_HEURISTIC;
    let roi_5yr = if down_payment_heuristic > Decimal::ZERO {
        ratio(five_year_profit, down_payment_heuristic)
    } else {
        None
    };
    let payback_months = if monthly_profit > Decimal::ZERO {
        ratio(down_payment_heuristic, monthly_profit)
    } else {
        None
    };

    PassengerOutput {
        daily,
        monthly,
        depreciable_base,
        annual_profit,
        five_year_profit,
        breakeven_rate,
        down_payment_heuristic,
        roi_5yr,
        payback_months,
    }
}

// ---------------------------------------------------------------------------
// Validation and envelope
// ---------------------------------------------------------------------------

pub fn validate_passenger(input: &PassengerInput) -> FieldErrors {
    let mut errors = FieldErrors::default();

    require_bounded(&mut errors, "seats", input.seats, MAX_QUANTITY);
    require_bounded(&mut errors, "occupancy_pct", input.occupancy_pct, Decimal::ONE_HUNDRED);
    require_bounded(&mut errors, "fare", input.fare, MAX_AMOUNT);
    require_bounded(&mut errors, "trips_per_day", input.trips_per_day, MAX_QUANTITY);
    require_bounded(&mut errors, "km_per_trip", input.km_per_trip, MAX_QUANTITY);
    require_bounded(&mut errors, "work_days_per_month", input.work_days_per_month, dec!(31));
    require_bounded(&mut errors, "fuel_price", input.fuel_price, MAX_AMOUNT);
    require_bounded(&mut errors, "km_per_litre", input.km_per_litre, MAX_QUANTITY);
    require_zero_or_at_least(&mut errors, "km_per_litre", input.km_per_litre, MIN_DIVISOR);
    require_bounded(&mut errors, "driver_wage_monthly", input.driver_wage_monthly, MAX_AMOUNT);
    require_bounded(
        &mut errors,
        "conductor_wage_monthly",
        input.conductor_wage_monthly,
        MAX_AMOUNT,
    );
    require_bounded(&mut errors, "maintenance_per_km", input.maintenance_per_km, MAX_AMOUNT);
    require_bounded(&mut errors, "annual_permit", input.annual_permit, MAX_AMOUNT);
    require_bounded(&mut errors, "vehicle_price", input.vehicle_price, MAX_AMOUNT);
    require_bounded(&mut errors, "life_years", input.life_years, MAX_QUANTITY);
    require_zero_or_at_least(&mut errors, "life_years", input.life_years, MIN_DIVISOR);
    require_bounded(&mut errors, "residual_pct", input.residual_pct, Decimal::ONE_HUNDRED);

    errors
}

/// Validate, then compute passenger profitability inside the standard envelope.
pub fn calculate_passenger_profit(
    input: &PassengerInput,
) -> FleetFinanceResult<ComputationOutput<PassengerOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_passenger(input).into_result()?;

    if input.work_days_per_month < Decimal::ONE {
        warnings.push("Work days below 1; daily wage split assumes 1 day".into());
    }
    if input.km_per_litre.is_zero() {
        warnings.push("Fuel economy is zero; fuel cost excluded".into());
    }
    if input.life_years.is_zero() {
        warnings.push("Useful life is zero; depreciation excluded".into());
    }

    let output = compute_passenger_profit(input);

    if output.monthly.profit <= Decimal::ZERO {
        warnings.push("Monthly profit is not positive; payback period not applicable".into());
    }

    let down_payment_pct = DOWN_PAYMENT_HEURISTIC * Decimal::ONE_HUNDRED;
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Passenger profit: fare revenue less fuel, upkeep, wages, permit and depreciation",
        &serde_json::json!({
            "down_payment": format!("{down_payment_pct}% of vehicle price"),
            "monthly_wages": "fixed monthly commitment, independent of work days",
            "breakeven_rate": "daily cost / (daily passengers x km per trip), approximate",
            "five_year_profit": "no terminal resale; residual value is in depreciation",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
