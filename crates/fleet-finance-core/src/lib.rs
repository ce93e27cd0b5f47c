pub mod amortization;
pub mod display;
pub mod error;
pub mod form;
pub mod types;
mod validation;

#[cfg(feature = "tco")]
pub mod tco;

#[cfg(feature = "freight")]
pub mod freight;

#[cfg(feature = "passenger")]
pub mod passenger;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

pub use error::{FieldError, FieldErrors, FleetFinanceError};
pub use types::*;

/// Standard result type for all fleet-finance operations
pub type FleetFinanceResult<T> = Result<T, FleetFinanceError>;
