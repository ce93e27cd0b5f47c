//! Presentation rules for calculator results.
//!
//! The calculators keep full precision and report undefined figures as
//! `None`; this module owns every rounding and "not applicable" decision.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::amortization::LoanOutput;
#[cfg(feature = "freight")]
use crate::freight::FreightOutput;
#[cfg(feature = "passenger")]
use crate::passenger::PassengerOutput;
#[cfg(feature = "tco")]
use crate::tco::TcoOutput;

/// Shown in place of any figure that is undefined for the inputs.
pub const NOT_APPLICABLE: &str = "—";

/// Rupees, rounded to whole rupees, grouped the Indian way: `₹12,34,567`.
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().trunc().to_string();
    let grouped = group_indian(&digits);
    if negative {
        format!("-₹{grouped}")
    } else {
        format!("₹{grouped}")
    }
}

/// Last three digits, then pairs: 1234567 -> 12,34,567.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let begin = end.saturating_sub(2);
        groups.push(&head[begin..end]);
        end = begin;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// One decimal place: `12.5%`.
pub fn format_percent(pct: Decimal) -> String {
    format!("{}%", one_decimal(pct))
}

/// A plain ratio shown as a percentage (6.47 -> `647.0%`).
pub fn format_ratio_as_percent(ratio: Decimal) -> String {
    format_percent(ratio * Decimal::ONE_HUNDRED)
}

pub fn format_months(months: Decimal) -> String {
    format!("{} months", one_decimal(months))
}

/// Rupees per unit with two decimals, e.g. `₹21.18/km`.
pub fn format_rate(rate: Decimal, unit: &str) -> String {
    let rounded = rate.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("₹{rounded:.2}/{unit}")
}

pub fn format_optional<T>(value: Option<T>, f: impl FnOnce(T) -> String) -> String {
    value.map(f).unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

fn one_decimal(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.1}")
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
}

impl SummaryRow {
    fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

/// Labelled, display-ready figures for a calculator result.
pub trait Summary {
    fn summary_rows(&self) -> Vec<SummaryRow>;
}

impl Summary for LoanOutput {
    fn summary_rows(&self) -> Vec<SummaryRow> {
        vec![
            SummaryRow::new("Monthly EMI", format_optional(self.emi, format_inr)),
            SummaryRow::new("Total payment", format_optional(self.total_payment, format_inr)),
            SummaryRow::new("Total interest", format_optional(self.total_interest, format_inr)),
        ]
    }
}

#[cfg(feature = "tco")]
impl Summary for TcoOutput {
    fn summary_rows(&self) -> Vec<SummaryRow> {
        vec![
            SummaryRow::new("Monthly EMI", format_optional(self.monthly_emi, format_inr)),
            SummaryRow::new("Monthly fuel", format_optional(self.monthly_fuel, format_inr)),
            SummaryRow::new("Monthly maintenance", format_inr(self.monthly_maintenance)),
            SummaryRow::new("Monthly insurance", format_inr(self.monthly_insurance)),
            SummaryRow::new("Monthly tyres", format_optional(self.monthly_tyre, format_inr)),
            SummaryRow::new(
                "Monthly ownership cost",
                format_optional(self.monthly_ownership, format_inr),
            ),
            SummaryRow::new(
                "Cost per km",
                format_optional(self.cost_per_km, |r| format_rate(r, "km")),
            ),
            SummaryRow::new(
                "Annual ownership cost",
                format_optional(self.annual_ownership, format_inr),
            ),
            SummaryRow::new("Resale value (5 yr)", format_inr(self.resale_value)),
            SummaryRow::new("5-year TCO", format_optional(self.five_year_tco, format_inr)),
        ]
    }
}

#[cfg(feature = "freight")]
impl Summary for FreightOutput {
    fn summary_rows(&self) -> Vec<SummaryRow> {
        vec![
            SummaryRow::new("Monthly revenue", format_inr(self.monthly_revenue)),
            SummaryRow::new("Monthly cost", format_inr(self.monthly_cost)),
            SummaryRow::new("Monthly profit", format_inr(self.monthly_profit)),
            SummaryRow::new("Annual profit", format_inr(self.annual_profit)),
            SummaryRow::new("5-year profit", format_inr(self.five_year_profit)),
            SummaryRow::new(
                "ROI (5 yr)",
                format_optional(self.roi_5yr, format_ratio_as_percent),
            ),
            SummaryRow::new("Payback", format_optional(self.payback_months, format_months)),
            SummaryRow::new(
                "Break-even freight rate",
                format_optional(self.breakeven_rate, |r| format_rate(r, "km")),
            ),
        ]
    }
}

#[cfg(feature = "passenger")]
impl Summary for PassengerOutput {
    fn summary_rows(&self) -> Vec<SummaryRow> {
        vec![
            SummaryRow::new("Daily revenue", format_inr(self.daily.revenue)),
            SummaryRow::new("Daily cost", format_inr(self.daily.cost)),
            SummaryRow::new("Daily profit", format_inr(self.daily.profit)),
            SummaryRow::new("Monthly revenue", format_inr(self.monthly.revenue)),
            SummaryRow::new("Monthly cost", format_inr(self.monthly.cost)),
            SummaryRow::new("Monthly profit", format_inr(self.monthly.profit)),
            SummaryRow::new("Annual profit", format_inr(self.annual_profit)),
            SummaryRow::new("5-year profit", format_inr(self.five_year_profit)),
            SummaryRow::new(
                "ROI (5 yr, on 20% down)",
                format_optional(self.roi_5yr, format_ratio_as_percent),
            ),
            SummaryRow::new("Payback", format_optional(self.payback_months, format_months)),
            SummaryRow::new(
                "Break-even fare",
                format_optional(self.breakeven_rate, |r| format_rate(r, "passenger-km")),
            ),
        ]
    }
}
