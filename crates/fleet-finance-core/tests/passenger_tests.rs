use fleet_finance_core::form::FormValues;
use fleet_finance_core::passenger::{self, PassengerInput, DOWN_PAYMENT_HEURISTIC};
use fleet_finance_core::FleetFinanceError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A 40-seat route bus doing six 40 km trips a day.
fn route_bus() -> PassengerInput {
    PassengerInput {
        seats: dec!(40),
        occupancy_pct: dec!(80),
        fare: dec!(50),
        trips_per_day: dec!(6),
        km_per_trip: dec!(40),
        work_days_per_month: dec!(26),
        fuel_price: dec!(95),
        km_per_litre: dec!(5),
        driver_wage_monthly: dec!(25_000),
        conductor_wage_monthly: dec!(15_000),
        maintenance_per_km: dec!(3),
        annual_permit: dec!(120_000),
        vehicle_price: dec!(2_500_000),
        life_years: dec!(8),
        residual_pct: dec!(15),
    }
}

// ===========================================================================
// Wage asymmetry between the daily and monthly tiers
// ===========================================================================

#[test]
fn test_monthly_wages_fixed_across_work_days() {
    let mut input = route_bus();
    let at_26 = passenger::compute_passenger_profit(&input);
    input.work_days_per_month = dec!(20);
    let at_20 = passenger::compute_passenger_profit(&input);

    assert_eq!(at_26.monthly.wages, dec!(40_000));
    assert_eq!(at_20.monthly.wages, dec!(40_000));
    assert_eq!(at_20.daily.driver_cost, dec!(1250));
    assert!(at_26.daily.driver_cost < at_20.daily.driver_cost);
}

#[test]
fn test_monthly_is_not_daily_times_work_days() {
    let out = passenger::compute_passenger_profit(&route_bus());
    let naive = out.daily.cost * dec!(26);
    // Permit and depreciation use 12-month bases, not 365-day bases
    assert!((naive - out.monthly.cost).abs() > dec!(1));
    // Revenue, fuel and maintenance do scale with work days
    assert_eq!(out.monthly.revenue, out.daily.revenue * dec!(26));
    assert_eq!(out.monthly.fuel, out.daily.fuel_cost * dec!(26));
    assert_eq!(out.monthly.maintenance, out.daily.maintenance * dec!(26));
}

// ===========================================================================
// Horizon and heuristics
// ===========================================================================

#[test]
fn test_five_year_has_no_terminal_resale() {
    let out = passenger::compute_passenger_profit(&route_bus());
    assert_eq!(out.five_year_profit, out.annual_profit * dec!(5));
    assert_eq!(out.annual_profit, out.monthly.profit * dec!(12));
}

#[test]
fn test_down_payment_is_twenty_percent_of_price() {
    let out = passenger::compute_passenger_profit(&route_bus());
    assert_eq!(DOWN_PAYMENT_HEURISTIC, dec!(0.2));
    assert_eq!(out.down_payment_heuristic, dec!(500_000));
    let expected_roi = out.five_year_profit / dec!(500_000);
    assert_eq!(out.roi_5yr, Some(expected_roi));
}

#[test]
fn test_loss_making_route_has_no_payback() {
    let mut input = route_bus();
    input.fare = dec!(20);
    let out = passenger::compute_passenger_profit(&input);
    assert!(out.monthly.profit < Decimal::ZERO);
    assert_eq!(out.payback_months, None);
    assert!(out.roi_5yr.unwrap() < Decimal::ZERO);
}

// ===========================================================================
// Forms and validation
// ===========================================================================

#[test]
fn test_from_form_and_calculate() {
    let form: FormValues = [
        ("seats", "40"),
        ("occupancy_pct", "80"),
        ("fare", "50"),
        ("trips_per_day", "6"),
        ("km_per_trip", "40"),
        ("work_days_per_month", "26"),
        ("fuel_price", "95"),
        ("km_per_litre", "5"),
        ("driver_wage_monthly", "25,000"),
        ("conductor_wage_monthly", "15,000"),
        ("maintenance_per_km", "3"),
        ("annual_permit", "1,20,000"),
        ("vehicle_price", "₹25,00,000"),
        ("life_years", "8"),
        ("residual_pct", "15"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let input = PassengerInput::from_form(&form).unwrap();
    assert_eq!(input, route_bus());

    let result = passenger::calculate_passenger_profit(&input).unwrap();
    assert!(result.result.payback_months.is_some());
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}

#[test]
fn test_residual_over_hundred_rejected() {
    let mut input = route_bus();
    input.residual_pct = dec!(150);
    input.seats = dec!(-1);
    match passenger::calculate_passenger_profit(&input).unwrap_err() {
        FleetFinanceError::Validation(errors) => {
            assert_eq!(errors.len(), 2);
            assert!(errors.contains("residual_pct"));
            assert!(errors.contains("seats"));
        }
        other => panic!("Expected Validation, got {other:?}"),
    }
}
