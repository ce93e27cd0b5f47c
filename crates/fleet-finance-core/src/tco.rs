use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::monthly_installment;
use crate::error::FieldErrors;
use crate::types::{fraction, ratio, with_metadata, ComputationOutput, Distance, Money, Percent};
use crate::validation::{
    require_at_most, require_bounded, require_positive, MAX_AMOUNT, MAX_QUANTITY, MAX_RATE_PCT,
    MAX_TERM_MONTHS,
};
use crate::FleetFinanceResult;

const HOLDING_YEARS: Decimal = dec!(5);
const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcoInput {
    pub vehicle_price: Money,
    pub loan_amount: Money,
    pub down_payment: Money,
    pub annual_rate_pct: Percent,
    pub tenure_years: Decimal,
    pub monthly_running_km: Distance,
    /// km per litre (diesel/petrol) or km per kg (CNG).
    pub mileage: Decimal,
    pub fuel_price: Money,
    pub monthly_maintenance: Money,
    pub annual_insurance: Money,
    pub tyre_set_cost: Money,
    pub tyre_life_km: Distance,
    pub resale_pct_5yr: Percent,
}

/// Monthly, annual and five-year cost of owning the vehicle.
///
/// `None` marks a figure that is undefined for the inputs (a zero divisor
/// somewhere upstream); it is shown as "not applicable", never as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcoOutput {
    pub term_months: u32,
    pub monthly_emi: Option<Money>,
    pub monthly_fuel: Option<Money>,
    pub monthly_maintenance: Money,
    pub monthly_insurance: Money,
    pub monthly_tyre: Option<Money>,
    pub monthly_ownership: Option<Money>,
    /// Ownership cost per km run; the break-even charge per km.
    pub cost_per_km: Option<Money>,
    pub annual_ownership: Option<Money>,
    /// Five years of ownership cost before crediting resale.
    pub five_year_gross: Option<Money>,
    pub resale_value: Money,
    pub five_year_tco: Option<Money>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Loan tenure in months, when it is a whole number of them.
pub fn term_months(tenure_years: Decimal) -> Option<u32> {
    let months = tenure_years.checked_mul(MONTHS_PER_YEAR)?;
    if !months.fract().is_zero() {
        return None;
    }
    months.to_u32()
}

/// Total cost of ownership. Pure arithmetic that never fails.
/// A figure that leaves Decimal range is `None`, like a zero divisor.
pub fn compute_tco(input: &TcoInput) -> TcoOutput {
    let months = term_months(input.tenure_years).unwrap_or(0);
    let monthly_emi = monthly_installment(input.loan_amount, input.annual_rate_pct, months);

    let monthly_fuel = ratio(input.monthly_running_km, input.mileage)
        .and_then(|litres| litres.checked_mul(input.fuel_price));
    let monthly_insurance = input.annual_insurance / MONTHS_PER_YEAR;
    let monthly_tyre = ratio(input.monthly_running_km, input.tyre_life_km)
        .and_then(|sets| sets.checked_mul(input.tyre_set_cost));

    let monthly_ownership = match (monthly_emi, monthly_fuel, monthly_tyre) {
        (Some(emi), Some(fuel), Some(tyre)) => {
            [fuel, input.monthly_maintenance, monthly_insurance, tyre]
                .into_iter()
                .try_fold(emi, Decimal::checked_add)
        }
        _ => None,
    };

    let cost_per_km = monthly_ownership.and_then(|m| ratio(m, input.monthly_running_km));
    let annual_ownership = monthly_ownership.and_then(|m| m.checked_mul(MONTHS_PER_YEAR));
    let five_year_gross = annual_ownership.and_then(|a| a.checked_mul(HOLDING_YEARS));
    // Resale is credited once at the end of year five.
    let resale_value = fraction(input.resale_pct_5yr) * input.vehicle_price;
    let five_year_tco = five_year_gross.and_then(|g| g.checked_sub(resale_value));

    TcoOutput {
        term_months: months,
        monthly_emi,
        monthly_fuel,
        monthly_maintenance: input.monthly_maintenance,
        monthly_insurance,
        monthly_tyre,
        monthly_ownership,
        cost_per_km,
        annual_ownership,
        five_year_gross,
        resale_value,
        five_year_tco,
    }
}

// ---------------------------------------------------------------------------
// Validation and envelope
// ---------------------------------------------------------------------------

/// Field checks the form runs before [`compute_tco`].
pub fn validate_tco(input: &TcoInput) -> FieldErrors {
    let mut errors = FieldErrors::default();

    require_bounded(&mut errors, "vehicle_price", input.vehicle_price, MAX_AMOUNT);
    require_bounded(&mut errors, "loan_amount", input.loan_amount, MAX_AMOUNT);
    require_bounded(&mut errors, "down_payment", input.down_payment, MAX_AMOUNT);
    require_bounded(&mut errors, "annual_rate_pct", input.annual_rate_pct, MAX_RATE_PCT);
    validate_tenure(&mut errors, input.tenure_years);
    require_positive(&mut errors, "monthly_running_km", input.monthly_running_km);
    require_at_most(&mut errors, "monthly_running_km", input.monthly_running_km, MAX_QUANTITY);
    require_positive(&mut errors, "mileage", input.mileage);
    require_at_most(&mut errors, "mileage", input.mileage, MAX_QUANTITY);
    require_bounded(&mut errors, "fuel_price", input.fuel_price, MAX_AMOUNT);
    require_bounded(&mut errors, "monthly_maintenance", input.monthly_maintenance, MAX_AMOUNT);
    require_bounded(&mut errors, "annual_insurance", input.annual_insurance, MAX_AMOUNT);
    require_bounded(&mut errors, "tyre_set_cost", input.tyre_set_cost, MAX_AMOUNT);
    require_positive(&mut errors, "tyre_life_km", input.tyre_life_km);
    require_at_most(&mut errors, "tyre_life_km", input.tyre_life_km, MAX_QUANTITY);
    require_bounded(&mut errors, "resale_pct_5yr", input.resale_pct_5yr, Decimal::ONE_HUNDRED);

    let financed = input.loan_amount.checked_add(input.down_payment);
    if financed.is_some_and(|total| total > input.vehicle_price) {
        errors.push(
            "loan_amount",
            "loan amount plus down payment cannot exceed the vehicle price",
        );
    }

    errors
}

/// Tenure must be a whole number of months, from one month up to the loan cap.
fn validate_tenure(errors: &mut FieldErrors, tenure_years: Decimal) {
    if tenure_years <= Decimal::ZERO {
        errors.push("tenure_years", "must be greater than zero");
        return;
    }
    match term_months(tenure_years) {
        Some(0) | None => errors.push("tenure_years", "must be a whole number of months"),
        Some(months) if months > MAX_TERM_MONTHS => errors.push(
            "tenure_years",
            format!("must not exceed {MAX_TERM_MONTHS} months"),
        ),
        Some(_) => {}
    }
}

/// Validate, then compute the TCO inside the standard envelope.
pub fn calculate_tco(input: &TcoInput) -> FleetFinanceResult<ComputationOutput<TcoOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_tco(input).into_result()?;

    if input.loan_amount + input.down_payment < input.vehicle_price {
        warnings.push("Loan plus down payment is below the vehicle price".into());
    }

    let output = compute_tco(input);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Total cost of ownership: EMI + fuel + maintenance + insurance + tyres, less 5-year resale",
        &serde_json::json!({
            "holding_years": HOLDING_YEARS.to_string(),
            "resale": "credited once at end of year 5",
            "tyre_cost": "pro-rated by km run over tyre life",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
