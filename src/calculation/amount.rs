//! Amount validation shared by every calculator.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::error::{EngineError, EngineResult};

/// Checks that an amount is non-negative and returns it.
///
/// # Examples
///
/// ```
/// use deduction_engine::calculation::validate_amount;
/// use rust_decimal::Decimal;
///
/// assert!(validate_amount("basic_amount", Decimal::from(100)).is_ok());
/// assert!(validate_amount("basic_amount", Decimal::from(-1)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Decimal) -> EngineResult<Decimal> {
    if amount < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            field,
            format!("must be 0 or greater, got {}", amount),
        ));
    }
    Ok(amount)
}

/// Converts a floating-point amount into a validated [`Decimal`].
///
/// NaN, infinite, out-of-range and negative values are rejected with
/// [`EngineError::InvalidInput`].
///
/// # Examples
///
/// ```
/// use deduction_engine::calculation::amount_from_f64;
/// use rust_decimal::Decimal;
///
/// assert_eq!(amount_from_f64("basic_amount", 50000.0).unwrap(), Decimal::from(50000));
/// assert!(amount_from_f64("basic_amount", f64::NAN).is_err());
/// assert!(amount_from_f64("basic_amount", f64::INFINITY).is_err());
/// ```
pub fn amount_from_f64(field: &str, value: f64) -> EngineResult<Decimal> {
    if !value.is_finite() {
        return Err(EngineError::invalid_input(
            field,
            format!("must be a finite number, got {}", value),
        ));
    }

    let amount = Decimal::from_f64(value).ok_or_else(|| {
        EngineError::invalid_input(field, format!("{} is outside the supported range", value))
    })?;

    validate_amount(field, amount)
}
