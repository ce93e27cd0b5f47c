use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::time::Instant;

use crate::amortization::{compute_loan, validate_loan, LoanInput};
use crate::error::FleetFinanceError;
use crate::freight::{compute_freight_profit, validate_freight, FreightInput};
use crate::passenger::{compute_passenger_profit, validate_passenger, PassengerInput};
use crate::tco::{compute_tco, validate_tco, TcoInput};
use crate::types::{with_metadata, ComputationOutput};
use crate::FleetFinanceResult;

/// Upper bound on evaluated grid points.
pub const MAX_GRID_CELLS: usize = 10_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    Loan,
    Tco,
    Freight,
    Passenger,
}

impl FromStr for Model {
    type Err = FleetFinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "loan" | "emi" => Ok(Model::Loan),
            "tco" => Ok(Model::Tco),
            "freight" => Ok(Model::Freight),
            "passenger" => Ok(Model::Passenger),
            other => Err(FleetFinanceError::UnknownModel(other.to_string())),
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Model::Loan => "loan",
            Model::Tco => "tco",
            Model::Freight => "freight",
            Model::Passenger => "passenger",
        };
        write!(f, "{}", s)
    }
}

/// An input field swept from `min` to `max` in steps of `step`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityVariable {
    pub name: String,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    pub model: Model,
    /// Base case input record for `model`, as JSON.
    pub base_inputs: Value,
    pub variable_1: SensitivityVariable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_2: Option<SensitivityVariable>,
    /// Output field to read, dotted for nested records (`monthly.profit`).
    pub output_metric: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub model: Model,
    pub variable_1_name: String,
    pub variable_2_name: Option<String>,
    pub variable_1_values: Vec<Decimal>,
    pub variable_2_values: Vec<Decimal>,
    pub output_metric: String,
    /// matrix[i][j] = metric at variable_1_values[i], variable_2_values[j].
    /// One-way sweeps have a single column. `None` where not applicable.
    pub matrix: Vec<Vec<Option<Decimal>>>,
    pub base_case_value: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Sweep helpers
// ---------------------------------------------------------------------------

/// Sweep values from min to max with step; max is always included.
fn generate_sweep_values(var: &SensitivityVariable) -> FleetFinanceResult<Vec<Decimal>> {
    if var.step <= Decimal::ZERO {
        return Err(FleetFinanceError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Step must be positive".into(),
        });
    }
    if var.min > var.max {
        return Err(FleetFinanceError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Min must be <= max".into(),
        });
    }
    let count = var
        .max
        .checked_sub(var.min)
        .and_then(|span| span.checked_div(var.step))
        .and_then(|steps| steps.floor().to_usize())
        .unwrap_or(usize::MAX);
    if count >= MAX_GRID_CELLS {
        return Err(FleetFinanceError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: format!("Sweep would exceed {MAX_GRID_CELLS} points"),
        });
    }

    let mut values = Vec::with_capacity(count + 2);
    let mut current = var.min;
    while current <= var.max {
        values.push(current);
        match current.checked_add(var.step) {
            Some(next) => current = next,
            None => break,
        }
    }
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }
    Ok(values)
}

/// Override one field of the base inputs, keeping whole numbers numeric so
/// integer fields such as `term_months` still deserialize.
fn set_field(inputs: &mut Value, field: &str, value: Decimal) -> FleetFinanceResult<()> {
    let map = inputs
        .as_object_mut()
        .ok_or_else(|| FleetFinanceError::InvalidInput {
            field: "base_inputs".into(),
            reason: "must be a JSON object".into(),
        })?;
    let numeric = matches!(map.get(field), Some(Value::Number(_)));
    let replacement = match (numeric, value.to_i64()) {
        (true, Some(n)) if Decimal::from(n) == value => Value::from(n),
        _ => Value::String(value.to_string()),
    };
    map.insert(field.to_string(), replacement);
    Ok(())
}

fn check_field_exists(inputs: &Value, var: &SensitivityVariable) -> FleetFinanceResult<()> {
    match inputs.get(&var.name) {
        Some(_) => Ok(()),
        None => Err(FleetFinanceError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "not a field of base_inputs".into(),
        }),
    }
}

/// Read a dotted path from a serialized output record.
fn read_metric(output: &Value, path: &str) -> Option<Option<Decimal>> {
    let mut node = output;
    for key in path.split('.') {
        node = node.get(key)?;
    }
    Some(match node {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    })
}

/// Validate one grid point, run the pure model function on it and
/// serialize its output.
fn evaluate_model(model: Model, inputs: &Value) -> FleetFinanceResult<Value> {
    let output = match model {
        Model::Loan => {
            let mut input: LoanInput = serde_json::from_value(inputs.clone())?;
            validate_loan(&input).into_result()?;
            input.include_schedule = false;
            serde_json::to_value(compute_loan(&input))?
        }
        Model::Tco => {
            let input: TcoInput = serde_json::from_value(inputs.clone())?;
            validate_tco(&input).into_result()?;
            serde_json::to_value(compute_tco(&input))?
        }
        Model::Freight => {
            let input: FreightInput = serde_json::from_value(inputs.clone())?;
            validate_freight(&input).into_result()?;
            serde_json::to_value(compute_freight_profit(&input))?
        }
        Model::Passenger => {
            let input: PassengerInput = serde_json::from_value(inputs.clone())?;
            validate_passenger(&input).into_result()?;
            serde_json::to_value(compute_passenger_profit(&input))?
        }
    };
    Ok(output)
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// One- or two-way sensitivity of a model metric to its inputs.
pub fn run_sensitivity(
    input: &SensitivityInput,
) -> FleetFinanceResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    check_field_exists(&input.base_inputs, &input.variable_1)?;
    if let Some(ref v2) = input.variable_2 {
        check_field_exists(&input.base_inputs, v2)?;
    }

    let base_output = evaluate_model(input.model, &input.base_inputs)?;
    let base_case_value = read_metric(&base_output, &input.output_metric).ok_or_else(|| {
        FleetFinanceError::UnknownMetric {
            model: input.model.to_string(),
            metric: input.output_metric.clone(),
        }
    })?;

    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = match input.variable_2 {
        Some(ref v2) => generate_sweep_values(v2)?,
        None => Vec::new(),
    };
    let columns = v2_values.len().max(1);
    if v1_values.len() * columns > MAX_GRID_CELLS {
        return Err(FleetFinanceError::InvalidInput {
            field: "variables".into(),
            reason: format!("Grid would exceed {MAX_GRID_CELLS} cells"),
        });
    }

    let mut matrix = Vec::with_capacity(v1_values.len());
    for v1 in &v1_values {
        let mut row = Vec::with_capacity(columns);
        for col in 0..columns {
            let mut point = input.base_inputs.clone();
            set_field(&mut point, &input.variable_1.name, *v1)?;
            let v2 = match input.variable_2 {
                Some(ref var) => {
                    let v = v2_values[col];
                    set_field(&mut point, &var.name, v)?;
                    Some(v)
                }
                None => None,
            };

            let cell = match evaluate_model(input.model, &point) {
                Ok(out) => read_metric(&out, &input.output_metric).flatten(),
                Err(e) => {
                    warnings.push(format!("Evaluation failed at ({v1}, {v2:?}): {e}"));
                    None
                }
            };
            if cell.is_none() {
                warnings.push(match v2 {
                    Some(v2) => format!("{} not applicable at ({v1}, {v2})", input.output_metric),
                    None => format!("{} not applicable at {v1}", input.output_metric),
                });
            }
            row.push(cell);
        }
        matrix.push(row);
    }

    let output = SensitivityOutput {
        model: input.model,
        variable_1_name: input.variable_1.name.clone(),
        variable_2_name: input.variable_2.as_ref().map(|v| v.name.clone()),
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        output_metric: input.output_metric.clone(),
        matrix,
        base_case_value,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        if input.variable_2.is_some() {
            "2-Way Sensitivity Analysis"
        } else {
            "1-Way Sensitivity Analysis"
        },
        &serde_json::json!({
            "model": input.model.to_string(),
            "variable_1": input.variable_1.name,
            "variable_2": input.variable_2.as_ref().map(|v| v.name.clone()),
            "output_metric": input.output_metric,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn freight_base() -> Value {
        serde_json::json!({
            "vehicle_price": "1000000",
            "tco_per_km": "15",
            "monthly_running_km": "3000",
            "billed_pct": "85",
            "freight_rate": "28",
            "add_on_per_km": "2",
            "fixed_add_ons": "3000",
            "down_payment": "200000",
            "resale_pct_5yr": "25",
            "payload_tonnes": "1"
        })
    }

    fn var(name: &str, min: Decimal, max: Decimal, step: Decimal) -> SensitivityVariable {
        SensitivityVariable {
            name: name.into(),
            min,
            max,
            step,
        }
    }

    #[test]
    fn test_sweep_includes_max() {
        let values = generate_sweep_values(&var("x", dec!(0), dec!(1), dec!(0.3))).unwrap();
        assert_eq!(values, vec![dec!(0), dec!(0.3), dec!(0.6), dec!(0.9), dec!(1)]);
    }

    #[test]
    fn test_sweep_rejects_bad_step() {
        assert!(generate_sweep_values(&var("x", dec!(0), dec!(1), dec!(0))).is_err());
        assert!(generate_sweep_values(&var("x", dec!(2), dec!(1), dec!(1))).is_err());
        assert!(generate_sweep_values(&var("x", dec!(0), dec!(1_000_000), dec!(1))).is_err());
    }

    #[test]
    fn test_one_way_freight_rate() {
        let input = SensitivityInput {
            model: Model::Freight,
            base_inputs: freight_base(),
            variable_1: var("freight_rate", dec!(20), dec!(30), dec!(5)),
            variable_2: None,
            output_metric: "monthly_profit".into(),
        };
        let out = run_sensitivity(&input).unwrap().result;
        assert_eq!(out.variable_1_values.len(), 3);
        // revenue = 2550 x rate; cost 54,000
        assert_eq!(out.matrix[0][0], Some(dec!(-3000)));
        assert_eq!(out.matrix[1][0], Some(dec!(9750)));
        assert_eq!(out.matrix[2][0], Some(dec!(22500)));
        assert_eq!(out.base_case_value, Some(dec!(17400)));
    }

    #[test]
    fn test_two_way_records_not_applicable() {
        let input = SensitivityInput {
            model: Model::Freight,
            base_inputs: freight_base(),
            variable_1: var("freight_rate", dec!(10), dec!(30), dec!(20)),
            variable_2: Some(var("billed_pct", dec!(50), dec!(100), dec!(50))),
            output_metric: "payback_months".into(),
        };
        let result = run_sensitivity(&input).unwrap();
        let out = &result.result;
        assert_eq!(out.matrix.len(), 2);
        assert_eq!(out.matrix[0].len(), 2);
        // rate 10 never covers 54,000 of cost
        assert_eq!(out.matrix[0][0], None);
        assert!(out.matrix[1][1].is_some());
        assert!(result.warnings.iter().any(|w| w.contains("not applicable")));
    }

    #[test]
    fn test_points_outside_accepted_range_are_not_applicable() {
        let input = SensitivityInput {
            model: Model::Freight,
            base_inputs: freight_base(),
            variable_1: var(
                "freight_rate",
                dec!(0),
                dec!(1_000_000_000_000_000),
                dec!(500_000_000_000_000),
            ),
            variable_2: None,
            output_metric: "monthly_profit".into(),
        };
        let result = run_sensitivity(&input).unwrap();
        let out = &result.result;
        assert_eq!(out.matrix.len(), 3);
        assert_eq!(out.matrix[0][0], Some(dec!(-54000)));
        assert_eq!(out.matrix[1][0], None);
        assert_eq!(out.matrix[2][0], None);
        let failures = result
            .warnings
            .iter()
            .filter(|w| w.contains("Evaluation failed") && w.contains("freight_rate"))
            .count();
        assert_eq!(failures, 2);
    }

    #[test]
    fn test_invalid_base_case_is_an_error() {
        let mut base = freight_base();
        base["billed_pct"] = serde_json::json!("150");
        let input = SensitivityInput {
            model: Model::Freight,
            base_inputs: base,
            variable_1: var("freight_rate", dec!(20), dec!(30), dec!(5)),
            variable_2: None,
            output_metric: "monthly_profit".into(),
        };
        match run_sensitivity(&input).unwrap_err() {
            FleetFinanceError::Validation(errors) => assert!(errors.contains("billed_pct")),
            other => panic!("Expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_sweep_near_decimal_max_does_not_overflow() {
        let near_max = var("x", Decimal::MAX - dec!(2), Decimal::MAX, dec!(1));
        let values = generate_sweep_values(&near_max).unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values.last(), Some(&Decimal::MAX));
        assert!(generate_sweep_values(&var("x", Decimal::MIN, Decimal::MAX, dec!(1))).is_err());
    }

    #[test]
    fn test_integer_field_stays_numeric() {
        let input = SensitivityInput {
            model: Model::Loan,
            base_inputs: serde_json::json!({
                "principal": "100000",
                "annual_rate_pct": "0",
                "term_months": 10
            }),
            variable_1: var("term_months", dec!(10), dec!(20), dec!(10)),
            variable_2: None,
            output_metric: "emi".into(),
        };
        let out = run_sensitivity(&input).unwrap().result;
        assert_eq!(out.matrix[0][0], Some(dec!(10000)));
        assert_eq!(out.matrix[1][0], Some(dec!(5000)));
    }

    #[test]
    fn test_nested_metric_path() {
        let input = SensitivityInput {
            model: Model::Passenger,
            base_inputs: serde_json::json!({
                "seats": "40", "occupancy_pct": "80", "fare": "50",
                "trips_per_day": "6", "km_per_trip": "40", "work_days_per_month": "26",
                "fuel_price": "95", "km_per_litre": "5",
                "driver_wage_monthly": "25000", "conductor_wage_monthly": "15000",
                "maintenance_per_km": "3", "annual_permit": "120000",
                "vehicle_price": "2500000", "life_years": "8", "residual_pct": "15"
            }),
            variable_1: var("work_days_per_month", dec!(20), dec!(26), dec!(6)),
            variable_2: None,
            output_metric: "monthly.wages".into(),
        };
        let out = run_sensitivity(&input).unwrap().result;
        assert_eq!(out.matrix[0][0], out.matrix[1][0]);
        assert_eq!(out.base_case_value, Some(dec!(40000)));
    }

    #[test]
    fn test_unknown_metric() {
        let input = SensitivityInput {
            model: Model::Freight,
            base_inputs: freight_base(),
            variable_1: var("freight_rate", dec!(20), dec!(30), dec!(5)),
            variable_2: None,
            output_metric: "nonsense".into(),
        };
        match run_sensitivity(&input).unwrap_err() {
            FleetFinanceError::UnknownMetric { metric, .. } => assert_eq!(metric, "nonsense"),
            other => panic!("Expected UnknownMetric, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_variable() {
        let input = SensitivityInput {
            model: Model::Freight,
            base_inputs: freight_base(),
            variable_1: var("colour", dec!(1), dec!(2), dec!(1)),
            variable_2: None,
            output_metric: "monthly_profit".into(),
        };
        assert!(matches!(
            run_sensitivity(&input).unwrap_err(),
            FleetFinanceError::InvalidInput { .. }
        ));
    }

    #[test]
    fn test_model_from_str() {
        assert_eq!("EMI".parse::<Model>().unwrap(), Model::Loan);
        assert_eq!("freight".parse::<Model>().unwrap(), Model::Freight);
        assert!("boat".parse::<Model>().is_err());
    }
}
