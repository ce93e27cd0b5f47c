use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FieldErrors;
use crate::types::{fraction, ratio, with_metadata, ComputationOutput, Distance, Money, Percent};
use crate::validation::{require_at_most, require_bounded, MAX_AMOUNT, MAX_QUANTITY};
use crate::FleetFinanceResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const HORIZON_MONTHS: Decimal = dec!(60);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightInput {
    pub vehicle_price: Money,
    /// All-in ownership cost per km, usually the TCO calculator's `cost_per_km`.
    pub tco_per_km: Money,
    pub monthly_running_km: Distance,
    /// Share of distance invoiced to a customer; the rest runs empty.
    pub billed_pct: Percent,
    /// Rupees per tonne-km.
    pub freight_rate: Money,
    pub add_on_per_km: Money,
    pub fixed_add_ons: Money,
    pub down_payment: Money,
    pub resale_pct_5yr: Percent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_tonnes: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightOutput {
    pub effective_billed_km: Distance,
    /// Payload actually used for revenue after defaulting.
    pub payload_tonnes: Decimal,
    pub monthly_revenue: Money,
    pub monthly_cost: Money,
    pub monthly_profit: Money,
    /// Freight rate per billed km at which revenue just covers cost.
    pub breakeven_rate: Option<Money>,
    pub annual_profit: Money,
    pub resale_value: Money,
    pub five_year_profit: Money,
    pub roi_5yr: Option<Decimal>,
    pub payback_months: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Payload used for revenue: missing or non-positive tonnage counts as 1.
pub fn effective_payload(payload_tonnes: Option<Decimal>) -> Decimal {
    match payload_tonnes {
        Some(t) if t > Decimal::ZERO => t,
        _ => Decimal::ONE,
    }
}

/// Monthly and five-year profit of a goods vehicle. Never fails; the input is
/// expected to be within the bounds [`validate_freight`] enforces.
pub fn compute_freight_profit(input: &FreightInput) -> FreightOutput {
    let effective_billed_km = input.monthly_running_km * fraction(input.billed_pct);
    let payload = effective_payload(input.payload_tonnes);

    let monthly_revenue = effective_billed_km * input.freight_rate * payload;
    let monthly_cost = input.monthly_running_km * input.tco_per_km
        + input.monthly_running_km * input.add_on_per_km
        + input.fixed_add_ons;
    let monthly_profit = monthly_revenue - monthly_cost;

    let breakeven_rate = if effective_billed_km > Decimal::ZERO {
        ratio(monthly_cost, effective_billed_km)
    } else {
        None
    };

    let annual_profit = monthly_profit * MONTHS_PER_YEAR;
    // Resale is a terminal value at month 60.
    let resale_value = fraction(input.resale_pct_5yr) * input.vehicle_price;
    let five_year_profit = monthly_profit * HORIZON_MONTHS + resale_value;

    let roi_5yr = if input.down_payment > Decimal::ZERO {
        ratio(five_year_profit, input.down_payment)
    } else {
        None
    };
    // A vehicle that never turns a profit has no payback period.
    let payback_months = if monthly_profit > Decimal::ZERO {
        ratio(input.down_payment, monthly_profit)
    } else {
        None
    };

    FreightOutput {
        effective_billed_km,
        payload_tonnes: payload,
        monthly_revenue,
        monthly_cost,
        monthly_profit,
        breakeven_rate,
        annual_profit,
        resale_value,
        five_year_profit,
        roi_5yr,
        payback_months,
    }
}

// ---------------------------------------------------------------------------
// Validation and envelope
// ---------------------------------------------------------------------------

pub fn validate_freight(input: &FreightInput) -> FieldErrors {
    let mut errors = FieldErrors::default();

    require_bounded(&mut errors, "vehicle_price", input.vehicle_price, MAX_AMOUNT);
    require_bounded(&mut errors, "tco_per_km", input.tco_per_km, MAX_AMOUNT);
    require_bounded(&mut errors, "monthly_running_km", input.monthly_running_km, MAX_QUANTITY);
    require_bounded(&mut errors, "billed_pct", input.billed_pct, Decimal::ONE_HUNDRED);
    require_bounded(&mut errors, "freight_rate", input.freight_rate, MAX_AMOUNT);
    require_bounded(&mut errors, "add_on_per_km", input.add_on_per_km, MAX_AMOUNT);
    require_bounded(&mut errors, "fixed_add_ons", input.fixed_add_ons, MAX_AMOUNT);
    require_bounded(&mut errors, "down_payment", input.down_payment, MAX_AMOUNT);
    require_bounded(&mut errors, "resale_pct_5yr", input.resale_pct_5yr, Decimal::ONE_HUNDRED);
    // Missing or non-positive payloads fall back to 1 tonne.
    if let Some(payload) = input.payload_tonnes {
        require_at_most(&mut errors, "payload_tonnes", payload, MAX_QUANTITY);
    }

    errors
}

/// Validate, then compute freight profitability inside the standard envelope.
pub fn calculate_freight_profit(
    input: &FreightInput,
) -> FleetFinanceResult<ComputationOutput<FreightOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_freight(input).into_result()?;

    match input.payload_tonnes {
        Some(t) if t > Decimal::ZERO => {}
        _ => warnings.push("Payload missing or not positive; revenue assumes 1 tonne".into()),
    }

    let output = compute_freight_profit(input);

    if output.monthly_profit <= Decimal::ZERO {
        warnings.push("Monthly profit is not positive; payback period not applicable".into());
    }
    if input.down_payment.is_zero() {
        warnings.push("Down payment is zero; ROI not applicable".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Freight profit: billed km x rate x payload less per-km and fixed costs",
        &serde_json::json!({
            "horizon_months": HORIZON_MONTHS.to_string(),
            "resale": "added as terminal value at month 60",
            "payload_default_tonnes": "1",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
