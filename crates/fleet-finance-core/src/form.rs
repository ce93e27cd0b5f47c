//! Raw form submissions to typed calculator inputs.
//!
//! Form controls submit strings. An empty or blank string is a *missing*
//! value, never zero; required fields that are missing are reported as
//! such. Every field error of a form is collected before returning.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::amortization::LoanInput;
use crate::error::FieldErrors;
use crate::FleetFinanceResult;

#[cfg(feature = "freight")]
use crate::freight::FreightInput;
#[cfg(feature = "passenger")]
use crate::passenger::PassengerInput;
#[cfg(feature = "tco")]
use crate::tco::TcoInput;

/// One parsed form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    Missing,
    Invalid,
    Number(Decimal),
}

/// Parse a single form string. Accepts a leading rupee sign and digit
/// grouping commas (`₹12,34,567`).
pub fn parse_field(raw: &str) -> FieldValue {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('₹').unwrap_or(trimmed).trim_start();
    if trimmed.is_empty() {
        return FieldValue::Missing;
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    match Decimal::from_str(&cleaned) {
        Ok(d) => FieldValue::Number(d),
        Err(_) => FieldValue::Invalid,
    }
}

/// The string map a calculator form submits, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, String>);

impl FormValues {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self(values)
    }

    pub fn get(&self, field: &str) -> FieldValue {
        self.0
            .get(field)
            .map(|raw| parse_field(raw))
            .unwrap_or(FieldValue::Missing)
    }

    /// A required number. On error the field is recorded and zero is
    /// returned as a placeholder; the caller discards it via `errors`.
    pub fn required(&self, field: &str, errors: &mut FieldErrors) -> Decimal {
        match self.get(field) {
            FieldValue::Number(d) => d,
            FieldValue::Missing => {
                errors.push(field, "is required");
                Decimal::ZERO
            }
            FieldValue::Invalid => {
                errors.push(field, "must be a number");
                Decimal::ZERO
            }
        }
    }

    /// An optional number; blank stays `None`.
    pub fn optional(&self, field: &str, errors: &mut FieldErrors) -> Option<Decimal> {
        match self.get(field) {
            FieldValue::Number(d) => Some(d),
            FieldValue::Missing => None,
            FieldValue::Invalid => {
                errors.push(field, "must be a number");
                None
            }
        }
    }

    /// A required whole count such as a number of months.
    pub fn required_count(&self, field: &str, errors: &mut FieldErrors) -> u32 {
        let before = errors.len();
        let value = self.required(field, errors);
        if errors.len() > before {
            return 0;
        }
        if value != value.trunc() {
            errors.push(field, "must be a whole number");
            return 0;
        }
        match value.to_u32() {
            Some(n) => n,
            None => {
                errors.push(field, "must be zero or more");
                0
            }
        }
    }
}

impl FromIterator<(String, String)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn finish<T>(errors: FieldErrors, value: T) -> FleetFinanceResult<T> {
    errors.into_result()?;
    Ok(value)
}

impl LoanInput {
    pub fn from_form(form: &FormValues) -> FleetFinanceResult<Self> {
        let mut errors = FieldErrors::default();
        let input = LoanInput {
            principal: form.required("principal", &mut errors),
            annual_rate_pct: form.required("annual_rate_pct", &mut errors),
            term_months: form.required_count("term_months", &mut errors),
            first_payment_date: None,
            include_schedule: true,
        };
        finish(errors, input)
    }
}

#[cfg(feature = "tco")]
impl TcoInput {
    pub fn from_form(form: &FormValues) -> FleetFinanceResult<Self> {
        let mut errors = FieldErrors::default();
        let input = TcoInput {
            vehicle_price: form.required("vehicle_price", &mut errors),
            loan_amount: form.required("loan_amount", &mut errors),
            down_payment: form.required("down_payment", &mut errors),
            annual_rate_pct: form.required("annual_rate_pct", &mut errors),
            tenure_years: form.required("tenure_years", &mut errors),
            monthly_running_km: form.required("monthly_running_km", &mut errors),
            mileage: form.required("mileage", &mut errors),
            fuel_price: form.required("fuel_price", &mut errors),
            monthly_maintenance: form.required("monthly_maintenance", &mut errors),
            annual_insurance: form.required("annual_insurance", &mut errors),
            tyre_set_cost: form.required("tyre_set_cost", &mut errors),
            tyre_life_km: form.required("tyre_life_km", &mut errors),
            resale_pct_5yr: form.required("resale_pct_5yr", &mut errors),
        };
        finish(errors, input)
    }
}

#[cfg(feature = "freight")]
impl FreightInput {
    pub fn from_form(form: &FormValues) -> FleetFinanceResult<Self> {
        let mut errors = FieldErrors::default();
        let input = FreightInput {
            vehicle_price: form.required("vehicle_price", &mut errors),
            tco_per_km: form.required("tco_per_km", &mut errors),
            monthly_running_km: form.required("monthly_running_km", &mut errors),
            billed_pct: form.required("billed_pct", &mut errors),
            freight_rate: form.required("freight_rate", &mut errors),
            add_on_per_km: form.required("add_on_per_km", &mut errors),
            fixed_add_ons: form.required("fixed_add_ons", &mut errors),
            down_payment: form.required("down_payment", &mut errors),
            resale_pct_5yr: form.required("resale_pct_5yr", &mut errors),
            payload_tonnes: form.optional("payload_tonnes", &mut errors),
        };
        finish(errors, input)
    }
}

#[cfg(feature = "passenger")]
impl PassengerInput {
    pub fn from_form(form: &FormValues) -> FleetFinanceResult<Self> {
        let mut errors = FieldErrors::default();
        let input = PassengerInput {
            seats: form.required("seats", &mut errors),
            occupancy_pct: form.required("occupancy_pct", &mut errors),
            fare: form.required("fare", &mut errors),
            trips_per_day: form.required("trips_per_day", &mut errors),
            km_per_trip: form.required("km_per_trip", &mut errors),
            work_days_per_month: form.required("work_days_per_month", &mut errors),
            fuel_price: form.required("fuel_price", &mut errors),
            km_per_litre: form.required("km_per_litre", &mut errors),
            driver_wage_monthly: form.required("driver_wage_monthly", &mut errors),
            conductor_wage_monthly: form.required("conductor_wage_monthly", &mut errors),
            maintenance_per_km: form.required("maintenance_per_km", &mut errors),
            annual_permit: form.required("annual_permit", &mut errors),
            vehicle_price: form.required("vehicle_price", &mut errors),
            life_years: form.required("life_years", &mut errors),
            residual_pct: form.required("residual_pct", &mut errors),
        };
        finish(errors, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FleetFinanceError;
    use rust_decimal_macros::dec;

    fn form(pairs: &[(&str, &str)]) -> FormValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_is_missing_not_zero() {
        assert_eq!(parse_field(""), FieldValue::Missing);
        assert_eq!(parse_field("   "), FieldValue::Missing);
        assert_eq!(parse_field("₹ "), FieldValue::Missing);
    }

    #[test]
    fn test_grouping_and_rupee_sign() {
        assert_eq!(parse_field("₹12,34,567"), FieldValue::Number(dec!(1234567)));
        assert_eq!(parse_field(" 9.5 "), FieldValue::Number(dec!(9.5)));
        assert_eq!(parse_field("-3"), FieldValue::Number(dec!(-3)));
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert_eq!(parse_field("ten"), FieldValue::Invalid);
        assert_eq!(parse_field("1.2.3"), FieldValue::Invalid);
    }

    #[test]
    fn test_loan_from_form() {
        let f = form(&[
            ("principal", "5,00,000"),
            ("annual_rate_pct", "10"),
            ("term_months", "60"),
        ]);
        let input = LoanInput::from_form(&f).unwrap();
        assert_eq!(input.principal, dec!(500_000));
        assert_eq!(input.term_months, 60);
    }

    #[test]
    fn test_fractional_term_rejected() {
        let f = form(&[
            ("principal", "100000"),
            ("annual_rate_pct", "10"),
            ("term_months", "12.5"),
        ]);
        match LoanInput::from_form(&f).unwrap_err() {
            FleetFinanceError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors.contains("term_months"));
            }
            other => panic!("Expected Validation, got {other:?}"),
        }
    }

    #[cfg(feature = "freight")]
    #[test]
    fn test_freight_blank_payload_stays_none() {
        let f = form(&[
            ("vehicle_price", "1000000"),
            ("tco_per_km", "15"),
            ("monthly_running_km", "3000"),
            ("billed_pct", "85"),
            ("freight_rate", "28"),
            ("add_on_per_km", "2"),
            ("fixed_add_ons", "3000"),
            ("down_payment", "200000"),
            ("resale_pct_5yr", "25"),
            ("payload_tonnes", ""),
        ]);
        let input = FreightInput::from_form(&f).unwrap();
        assert_eq!(input.payload_tonnes, None);
    }

    #[cfg(feature = "tco")]
    #[test]
    fn test_tco_reports_every_missing_field() {
        let f = form(&[("vehicle_price", "1000000"), ("mileage", "abc")]);
        match TcoInput::from_form(&f).unwrap_err() {
            FleetFinanceError::Validation(errors) => {
                // 13 fields: one present, one garbage, eleven missing
                assert_eq!(errors.len(), 12);
                let mileage = errors.iter().find(|e| e.field == "mileage").unwrap();
                assert_eq!(mileage.reason, "must be a number");
                let fuel = errors.iter().find(|e| e.field == "fuel_price").unwrap();
                assert_eq!(fuel.reason, "is required");
            }
            other => panic!("Expected Validation, got {other:?}"),
        }
    }
}
