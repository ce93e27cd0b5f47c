use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Serialize;

use fleet_finance_core::amortization::{self, LoanInput};
use fleet_finance_core::display::{self, Summary};
use fleet_finance_core::form::FormValues;
use fleet_finance_core::freight::{self, FreightInput};
use fleet_finance_core::passenger::{self, PassengerInput};
use fleet_finance_core::sensitivity::{self, SensitivityInput};
use fleet_finance_core::tco::{self, TcoInput};
use fleet_finance_core::ComputationOutput;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Envelope JSON with the display-ready rows added under `display`.
fn envelope_json<T: Serialize + Summary>(output: ComputationOutput<T>) -> NapiResult<String> {
    let rows = output.result.summary_rows();
    let mut value = serde_json::to_value(output).map_err(to_napi_error)?;
    if let serde_json::Value::Object(ref mut map) = value {
        map.insert(
            "display".to_string(),
            serde_json::to_value(rows).map_err(to_napi_error)?,
        );
    }
    serde_json::to_string(&value).map_err(to_napi_error)
}

fn parse_form(form_json: &str) -> NapiResult<FormValues> {
    serde_json::from_str(form_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loan
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_emi(input_json: String) -> NapiResult<String> {
    let input: LoanInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::calculate_loan(&input).map_err(to_napi_error)?;
    envelope_json(output)
}

#[napi]
pub fn emi_from_form(form_json: String) -> NapiResult<String> {
    let input = LoanInput::from_form(&parse_form(&form_json)?).map_err(to_napi_error)?;
    let output = amortization::calculate_loan(&input).map_err(to_napi_error)?;
    envelope_json(output)
}

// ---------------------------------------------------------------------------
// Total cost of ownership
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_tco(input_json: String) -> NapiResult<String> {
    let input: TcoInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = tco::calculate_tco(&input).map_err(to_napi_error)?;
    envelope_json(output)
}

#[napi]
pub fn tco_from_form(form_json: String) -> NapiResult<String> {
    let input = TcoInput::from_form(&parse_form(&form_json)?).map_err(to_napi_error)?;
    let output = tco::calculate_tco(&input).map_err(to_napi_error)?;
    envelope_json(output)
}

// ---------------------------------------------------------------------------
// Freight
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_freight_profit(input_json: String) -> NapiResult<String> {
    let input: FreightInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = freight::calculate_freight_profit(&input).map_err(to_napi_error)?;
    envelope_json(output)
}

#[napi]
pub fn freight_from_form(form_json: String) -> NapiResult<String> {
    let input = FreightInput::from_form(&parse_form(&form_json)?).map_err(to_napi_error)?;
    let output = freight::calculate_freight_profit(&input).map_err(to_napi_error)?;
    envelope_json(output)
}

// ---------------------------------------------------------------------------
// Passenger
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_passenger_profit(input_json: String) -> NapiResult<String> {
    let input: PassengerInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = passenger::calculate_passenger_profit(&input).map_err(to_napi_error)?;
    envelope_json(output)
}

#[napi]
pub fn passenger_from_form(form_json: String) -> NapiResult<String> {
    let input = PassengerInput::from_form(&parse_form(&form_json)?).map_err(to_napi_error)?;
    let output = passenger::calculate_passenger_profit(&input).map_err(to_napi_error)?;
    envelope_json(output)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn run_sensitivity(input_json: String) -> NapiResult<String> {
    let input: SensitivityInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = sensitivity::run_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Rupee amount with Indian digit grouping, e.g. "1234567.5" -> "₹12,34,568".
#[napi]
pub fn format_inr(amount: String) -> NapiResult<String> {
    let value: rust_decimal::Decimal = amount.trim().parse().map_err(to_napi_error)?;
    Ok(display::format_inr(value))
}
