//! Caller-side field checks shared by the calculator forms.
//!
//! Validation never runs inside the pure `compute_*` functions; the
//! `calculate_*` envelopes call it first and stop on any error.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::FieldErrors;

/// Largest rupee amount any field accepts (₹10,000 crore).
pub const MAX_AMOUNT: Decimal = dec!(100_000_000_000);

/// Largest count or physical quantity: km, seats, trips, tonnes, km per litre.
pub const MAX_QUANTITY: Decimal = dec!(1_000_000);

/// Largest annual interest rate, in percent.
pub const MAX_RATE_PCT: Decimal = dec!(1200);

/// Longest loan or holding period, in months.
pub const MAX_TERM_MONTHS: u32 = 1200;

/// Smallest non-zero fuel economy or useful life a divisor may take.
pub const MIN_DIVISOR: Decimal = dec!(0.1);

pub(crate) fn require_non_negative(errors: &mut FieldErrors, field: &str, value: Decimal) {
    if value < Decimal::ZERO {
        errors.push(field, "must be zero or more");
    }
}

pub(crate) fn require_positive(errors: &mut FieldErrors, field: &str, value: Decimal) {
    if value <= Decimal::ZERO {
        errors.push(field, "must be greater than zero");
    }
}

pub(crate) fn require_at_most(errors: &mut FieldErrors, field: &str, value: Decimal, max: Decimal) {
    if value > max {
        errors.push(field, format!("must not exceed {max}"));
    }
}

/// Zero or more, and no larger than `max`.
pub(crate) fn require_bounded(errors: &mut FieldErrors, field: &str, value: Decimal, max: Decimal) {
    require_non_negative(errors, field, value);
    require_at_most(errors, field, value, max);
}

/// Zero switches the term off; anything else must reach `min`.
pub(crate) fn require_zero_or_at_least(
    errors: &mut FieldErrors,
    field: &str,
    value: Decimal,
    min: Decimal,
) {
    if value > Decimal::ZERO && value < min {
        errors.push(field, format!("must be zero or at least {min}"));
    }
}
