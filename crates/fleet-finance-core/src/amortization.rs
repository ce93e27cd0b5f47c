use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FieldErrors;
use crate::types::{fraction, with_metadata, ComputationOutput, Money, Percent};
use crate::validation::{require_bounded, MAX_AMOUNT, MAX_RATE_PCT, MAX_TERM_MONTHS};
use crate::FleetFinanceResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Longest schedule we are willing to lay out row by row (50 years).
pub const MAX_SCHEDULE_MONTHS: u32 = 600;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Loan terms as entered on the EMI calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: Money,
    pub annual_rate_pct: Percent,
    pub term_months: u32,
    /// Due date of the first installment; schedule rows carry dates when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
    #[serde(default = "default_include_schedule")]
    pub include_schedule: bool,
}

fn default_include_schedule() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanOutput {
    /// Equated monthly installment. `None` only for a zero-month term.
    pub emi: Option<Money>,
    pub total_payment: Option<Money>,
    pub total_interest: Option<Money>,
    pub monthly_rate: Decimal,
    pub schedule: Vec<ScheduleRow>,
}

/// One month of the reducing-balance schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub month: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub opening_balance: Money,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub closing_balance: Money,
}

// ---------------------------------------------------------------------------
// Installment
// ---------------------------------------------------------------------------

/// Monthly decimal rate for an annual percentage (10 -> 0.00833..).
pub fn monthly_rate(annual_rate_pct: Percent) -> Decimal {
    fraction(annual_rate_pct) / MONTHS_PER_YEAR
}

/// (1 + r)^n by repeated multiplication; `None` once it leaves Decimal range.
fn compound(rate: Decimal, n: u32) -> Option<Decimal> {
    let factor = Decimal::ONE + rate;
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result.checked_mul(factor)?;
    }
    Some(result)
}

/// Equated monthly installment on a reducing balance:
/// EMI = P * r * (1+r)^n / ((1+r)^n - 1), or P / n when the rate is zero.
///
/// Kept at full precision; round only when displaying. Returns `None` for a
/// zero-month term, which callers are expected to have rejected.
pub fn monthly_installment(
    principal: Money,
    annual_rate_pct: Percent,
    term_months: u32,
) -> Option<Money> {
    if term_months == 0 {
        return None;
    }
    let r = monthly_rate(annual_rate_pct);
    if r.is_zero() {
        return principal.checked_div(Decimal::from(term_months));
    }

    // Written as P * r / (1 - (1+r)^-n) so large growth factors cannot overflow.
    match compound(r, term_months) {
        Some(growth) => {
            let discount = Decimal::ONE.checked_div(growth)?;
            let annuity = Decimal::ONE - discount;
            principal.checked_mul(r)?.checked_div(annuity)
        }
        // (1+r)^n beyond Decimal range: the discount term is effectively zero.
        None => principal.checked_mul(r),
    }
}

// ---------------------------------------------------------------------------
// Loan summary and schedule
// ---------------------------------------------------------------------------

/// Installment, totals and (optionally) the full schedule for a loan.
/// Totals are `None` if they leave Decimal range. The schedule assumes the
/// input passed [`validate_loan`].
pub fn compute_loan(input: &LoanInput) -> LoanOutput {
    let r = monthly_rate(input.annual_rate_pct);
    let emi = monthly_installment(input.principal, input.annual_rate_pct, input.term_months);
    let months = Decimal::from(input.term_months);
    let total_payment = emi.and_then(|e| e.checked_mul(months));
    let total_interest = total_payment.and_then(|t| t.checked_sub(input.principal));

    let schedule = match emi {
        Some(e) if input.include_schedule && input.term_months <= MAX_SCHEDULE_MONTHS => {
            build_schedule(input, r, e)
        }
        _ => Vec::new(),
    };

    LoanOutput {
        emi,
        total_payment,
        total_interest,
        monthly_rate: r,
        schedule,
    }
}

fn build_schedule(input: &LoanInput, r: Decimal, emi: Money) -> Vec<ScheduleRow> {
    let mut rows = Vec::with_capacity(input.term_months as usize);
    let mut balance = input.principal;

    for month in 1..=input.term_months {
        let opening = balance;
        let interest = opening * r;
        let (principal_part, payment) = if month == input.term_months {
            // Final installment clears whatever rounding left behind.
            (opening, opening + interest)
        } else {
            (emi - interest, emi)
        };
        balance = opening - principal_part;

        let due_date = input
            .first_payment_date
            .and_then(|d| d.checked_add_months(Months::new(month - 1)));

        rows.push(ScheduleRow {
            month,
            due_date,
            opening_balance: opening,
            payment,
            interest,
            principal: principal_part,
            closing_balance: balance,
        });
    }

    rows
}

/// Field checks run before [`compute_loan`].
pub fn validate_loan(input: &LoanInput) -> FieldErrors {
    let mut errors = FieldErrors::default();
    require_bounded(&mut errors, "principal", input.principal, MAX_AMOUNT);
    require_bounded(&mut errors, "annual_rate_pct", input.annual_rate_pct, MAX_RATE_PCT);
    if input.term_months == 0 {
        errors.push("term_months", "must be at least 1 month");
    } else if input.term_months > MAX_TERM_MONTHS {
        errors.push("term_months", format!("must not exceed {MAX_TERM_MONTHS} months"));
    }
    errors
}

/// Validate, then compute the loan summary inside the standard envelope.
pub fn calculate_loan(input: &LoanInput) -> FleetFinanceResult<ComputationOutput<LoanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loan(input).into_result()?;

    if input.include_schedule && input.term_months > MAX_SCHEDULE_MONTHS {
        warnings.push(format!(
            "Schedule omitted: term of {} months exceeds {} months",
            input.term_months, MAX_SCHEDULE_MONTHS
        ));
    }
    if input.annual_rate_pct.is_zero() {
        warnings.push("Zero interest rate; installment is straight-line principal / term".into());
    }

    let output = compute_loan(input);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Reducing-balance EMI: P*r*(1+r)^n / ((1+r)^n - 1), r = annual% / 12 / 100",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_pct": input.annual_rate_pct.to_string(),
            "term_months": input.term_months,
            "interest_compounding": "monthly",
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
    use crate::error::FleetFinanceError;
    use rust_decimal_macros::dec;

    fn loan(principal: Decimal, rate: Decimal, months: u32) -> LoanInput {
        LoanInput {
            principal,
            annual_rate_pct: rate,
            term_months: months,
            first_payment_date: None,
            include_schedule: true,
        }
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let emi = monthly_installment(dec!(100_000), Decimal::ZERO, 10).unwrap();
        assert_eq!(emi, dec!(10_000));
    }

    #[test]
    fn test_standard_annuity() {
        // 5 lakh at 10% over 60 months ≈ 10,623.52
        let emi = monthly_installment(dec!(500_000), dec!(10), 60).unwrap();
        assert!((emi - dec!(10623.5224)).abs() < dec!(0.001), "emi={emi}");
    }

    #[test]
    fn test_one_lakh_twelve_percent() {
        let emi = monthly_installment(dec!(100_000), dec!(12), 12).unwrap();
        assert!((emi - dec!(8884.8789)).abs() < dec!(0.001), "emi={emi}");
    }

    #[test]
    fn test_zero_term_is_not_applicable() {
        assert_eq!(monthly_installment(dec!(100_000), dec!(10), 0), None);
        assert_eq!(monthly_installment(dec!(100_000), Decimal::ZERO, 0), None);
    }

    #[test]
    fn test_zero_principal() {
        assert_eq!(
            monthly_installment(Decimal::ZERO, dec!(10), 24),
            Some(Decimal::ZERO)
        );
    }

    #[test]
    fn test_extreme_rate_does_not_panic() {
        let emi = monthly_installment(dec!(1_000_000), dec!(1200), 600).unwrap();
        // r = 1.0 per month; payment converges on interest-only
        assert_eq!(emi, dec!(1_000_000));
    }

    #[test]
    fn test_totals() {
        let out = compute_loan(&loan(dec!(500_000), dec!(10), 60));
        let emi = out.emi.unwrap();
        assert_eq!(out.total_payment, Some(emi * dec!(60)));
        assert_eq!(out.total_interest, Some(emi * dec!(60) - dec!(500_000)));
    }

    #[test]
    fn test_schedule_closes_at_zero() {
        let out = compute_loan(&loan(dec!(900_000), dec!(10), 48));
        assert_eq!(out.schedule.len(), 48);
        let last = out.schedule.last().unwrap();
        assert_eq!(last.closing_balance, Decimal::ZERO);

        let first = &out.schedule[0];
        assert_eq!(first.opening_balance, dec!(900_000));
        assert_eq!(first.interest, dec!(900_000) * out.monthly_rate);
    }

    #[test]
    fn test_schedule_principal_sums_to_loan() {
        let out = compute_loan(&loan(dec!(250_000), dec!(9.5), 36));
        let repaid: Decimal = out.schedule.iter().map(|r| r.principal).sum();
        assert!((repaid - dec!(250_000)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_schedule_due_dates_clamp_to_month_end() {
        let mut input = loan(dec!(12_000), Decimal::ZERO, 3);
        input.first_payment_date = NaiveDate::from_ymd_opt(2024, 1, 31);
        let out = compute_loan(&input);
        let dates: Vec<_> = out.schedule.iter().map(|r| r.due_date.unwrap()).collect();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    }

    #[test]
    fn test_schedule_can_be_skipped() {
        let mut input = loan(dec!(100_000), dec!(10), 12);
        input.include_schedule = false;
        let out = compute_loan(&input);
        assert!(out.schedule.is_empty());
        assert!(out.emi.is_some());
    }

    #[test]
    fn test_calculate_rejects_every_bad_field() {
        let input = loan(dec!(-1), dec!(-2), 0);
        match calculate_loan(&input).unwrap_err() {
            FleetFinanceError::Validation(errors) => {
                assert_eq!(errors.len(), 3);
                assert!(errors.contains("principal"));
                assert!(errors.contains("annual_rate_pct"));
                assert!(errors.contains("term_months"));
            }
            other => panic!("Expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_oversized_loan_rejected_before_compute() {
        let input = loan(dec!(100_000_000_000_000_000_000), dec!(1_000_000_000_000), 12);
        match calculate_loan(&input).unwrap_err() {
            FleetFinanceError::Validation(errors) => {
                assert!(errors.contains("principal"));
                assert!(errors.contains("annual_rate_pct"));
            }
            other => panic!("Expected Validation, got {other:?}"),
        }

        let input = loan(dec!(100_000), dec!(10), MAX_TERM_MONTHS + 1);
        match calculate_loan(&input).unwrap_err() {
            FleetFinanceError::Validation(errors) => assert!(errors.contains("term_months")),
            other => panic!("Expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_totals_are_not_applicable() {
        // r = 2 per month: P x r alone leaves Decimal range.
        assert_eq!(monthly_installment(Decimal::MAX, dec!(2400), 600), None);

        // EMI is about half the principal; two of them do not fit.
        let mut input = loan(Decimal::MAX, dec!(12), 2);
        input.include_schedule = false;
        let out = compute_loan(&input);
        assert!(out.emi.is_some());
        assert_eq!(out.total_payment, None);
        assert_eq!(out.total_interest, None);
    }

    #[test]
    fn test_largest_accepted_loan_computes() {
        let input = loan(MAX_AMOUNT, MAX_RATE_PCT, MAX_TERM_MONTHS);
        let result = calculate_loan(&input).unwrap();
        assert_eq!(result.result.emi, Some(MAX_AMOUNT));
        assert!(result.result.total_interest.is_some());
    }

    #[test]
    fn test_long_term_omits_schedule_with_warning() {
        let input = loan(dec!(100_000), dec!(8), MAX_SCHEDULE_MONTHS + 1);
        let result = calculate_loan(&input).unwrap();
        assert!(result.result.schedule.is_empty());
        assert!(result.warnings.iter().any(|w| w.contains("Schedule omitted")));
    }

    #[test]
    fn test_metadata_populated() {
        let result = calculate_loan(&loan(dec!(100_000), dec!(10), 12)).unwrap();
        assert!(!result.methodology.is_empty());
        assert_eq!(result.metadata.precision, "rust_decimal_128bit");
    }
}
