pub mod freight;
pub mod loan;
pub mod passenger;
pub mod sensitivity;
pub mod tco;

use serde::Serialize;
use serde_json::Value;

use fleet_finance_core::display::Summary;
use fleet_finance_core::form::FormValues;
use fleet_finance_core::ComputationOutput;

/// Parse a `name=value` pair given to `--field`.
pub fn parse_form_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got '{raw}'")),
    }
}

/// Collect `--field` pairs into a form submission, or `None` when none were given.
pub fn form_from_fields(fields: Vec<(String, String)>) -> Option<FormValues> {
    if fields.is_empty() {
        None
    } else {
        Some(fields.into_iter().collect())
    }
}

/// Serialize an envelope and attach its display rows under `display`.
pub fn with_display<T: Serialize + Summary>(
    output: ComputationOutput<T>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let rows = output.result.summary_rows();
    let mut value = serde_json::to_value(output)?;
    if let Value::Object(ref mut map) = value {
        map.insert("display".to_string(), serde_json::to_value(rows)?);
    }
    Ok(value)
}
