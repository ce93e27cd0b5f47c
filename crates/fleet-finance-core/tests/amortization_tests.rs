use chrono::NaiveDate;
use fleet_finance_core::amortization::{self, LoanInput};
use fleet_finance_core::FleetFinanceError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Installment
// ===========================================================================

#[test]
fn test_straight_line_when_rate_is_zero() {
    let emi = amortization::monthly_installment(dec!(100_000), dec!(0), 10).unwrap();
    assert_eq!(emi, dec!(10_000));
}

#[test]
fn test_annuity_identity_five_lakh_ten_percent() {
    let principal = dec!(500_000);
    let emi = amortization::monthly_installment(principal, dec!(10), 60).unwrap();

    // Closed form computed independently in f64: 10623.522355634166
    let reference = dec!(10623.522355634166);
    let relative = ((emi - reference) / reference).abs();
    assert!(relative < dec!(0.000001), "emi={emi}, relative error={relative}");

    let out = amortization::compute_loan(&LoanInput {
        principal,
        annual_rate_pct: dec!(10),
        term_months: 60,
        first_payment_date: None,
        include_schedule: true,
    });
    assert_eq!(out.total_interest, Some(dec!(60) * emi - principal));

    // Interest column of the schedule adds up to the same total interest
    let scheduled_interest: Decimal = out.schedule.iter().map(|r| r.interest).sum();
    let total_interest = out.total_interest.unwrap();
    assert!(
        (scheduled_interest - total_interest).abs() < dec!(0.0001),
        "schedule={scheduled_interest}, total={total_interest}"
    );
}

#[test]
fn test_higher_rate_means_higher_installment() {
    let low = amortization::monthly_installment(dec!(800_000), dec!(8), 48).unwrap();
    let high = amortization::monthly_installment(dec!(800_000), dec!(14), 48).unwrap();
    assert!(high > low);
}

#[test]
fn test_longer_term_means_lower_installment() {
    let short = amortization::monthly_installment(dec!(800_000), dec!(11), 36).unwrap();
    let long = amortization::monthly_installment(dec!(800_000), dec!(11), 84).unwrap();
    assert!(long < short);
}

// ===========================================================================
// Envelope
// ===========================================================================

#[test]
fn test_calculate_loan_with_due_dates() {
    let input = LoanInput {
        principal: dec!(600_000),
        annual_rate_pct: dec!(9.25),
        term_months: 24,
        first_payment_date: NaiveDate::from_ymd_opt(2025, 5, 5),
        include_schedule: true,
    };
    let result = amortization::calculate_loan(&input).unwrap();
    let schedule = &result.result.schedule;

    assert_eq!(schedule.len(), 24);
    assert_eq!(schedule[0].due_date, NaiveDate::from_ymd_opt(2025, 5, 5));
    assert_eq!(schedule[23].due_date, NaiveDate::from_ymd_opt(2027, 4, 5));
    assert_eq!(schedule[23].closing_balance, Decimal::ZERO);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_zero_rate_warns() {
    let input = LoanInput {
        principal: dec!(120_000),
        annual_rate_pct: Decimal::ZERO,
        term_months: 12,
        first_payment_date: None,
        include_schedule: false,
    };
    let result = amortization::calculate_loan(&input).unwrap();
    assert_eq!(result.result.emi, Some(dec!(10_000)));
    assert!(result.warnings.iter().any(|w| w.contains("straight-line")));
}

#[test]
fn test_zero_term_rejected_before_computing() {
    let input = LoanInput {
        principal: dec!(120_000),
        annual_rate_pct: dec!(10),
        term_months: 0,
        first_payment_date: None,
        include_schedule: true,
    };
    match amortization::calculate_loan(&input).unwrap_err() {
        FleetFinanceError::Validation(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(errors.contains("term_months"));
        }
        other => panic!("Expected Validation, got {other:?}"),
    }
}

#[test]
fn test_loan_input_json_defaults() {
    let input: LoanInput = serde_json::from_str(
        r#"{"principal": "250000", "annual_rate_pct": 10.5, "term_months": 36}"#,
    )
    .unwrap();
    assert!(input.include_schedule);
    assert_eq!(input.first_payment_date, None);
    assert_eq!(input.annual_rate_pct, dec!(10.5));
}
