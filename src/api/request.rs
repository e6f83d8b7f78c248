//! Request types for the Deduction Engine API.
//!
//! This module defines the JSON request structures for the `/calculate` and
//! `/breakdown` endpoints, and the caller-side range checks applied before
//! the engine runs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::response::ApiError;

/// The largest basic amount accepted by the API.
pub const MAX_BASIC_AMOUNT: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

/// Request body for the `/calculate` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The basic amount.
    pub basic_amount: Decimal,
    /// The supplemental amount (benefits, allowances). Defaults to zero.
    #[serde(default)]
    pub supplemental_amount: Decimal,
}

impl CalculationRequest {
    /// Checks the amounts are non-negative and the basic amount is realistic.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.basic_amount < Decimal::ZERO {
            return Err(ApiError::validation_error(
                "basic_amount must be 0 or greater",
            ));
        }
        if self.supplemental_amount < Decimal::ZERO {
            return Err(ApiError::validation_error(
                "supplemental_amount must be 0 or greater",
            ));
        }
        if self.basic_amount > MAX_BASIC_AMOUNT {
            return Err(ApiError::with_details(
                "VALIDATION_ERROR",
                "basic_amount is not a realistic amount",
                format!("basic_amount must not exceed {}", MAX_BASIC_AMOUNT),
            ));
        }
        Ok(())
    }
}

/// Request body for the `/breakdown` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownRequest {
    /// The taxable amount to itemise.
    pub taxable_amount: Decimal,
}

impl BreakdownRequest {
    /// Checks the taxable amount is non-negative.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.taxable_amount < Decimal::ZERO {
            return Err(ApiError::validation_error(
                "taxable_amount must be 0 or greater",
            ));
        }
        Ok(())
    }
}
