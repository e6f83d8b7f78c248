//! Clamped-rate contribution models.
//!
//! A contribution is a percentage of the gross amount that is optionally
//! limited by a floor (guaranteed minimum) or a cap (guaranteed maximum).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The limit applied to a clamped-rate result.
///
/// A rule carries at most one limit. Combining a floor with a cap is not
/// representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimit {
    /// The raw amount is used as is.
    None,
    /// The result never falls below this amount, even on a zero base.
    Floor(Decimal),
    /// The result never exceeds this amount.
    Cap(Decimal),
}

/// A single-rate rule with an optional floor or cap.
///
/// # Example
///
/// ```
/// use deduction_engine::models::{ClampedRateRule, RateLimit};
/// use rust_decimal::Decimal;
///
/// let cap = RateLimit::Cap(Decimal::from(4320));
/// let rule = ClampedRateRule::new(Decimal::new(6, 2), cap).unwrap();
/// assert_eq!(rule.limit(), RateLimit::Cap(Decimal::from(4320)));
///
/// let both = ClampedRateRule::from_limits(
///     Decimal::new(6, 2),
///     Some(Decimal::from(300)),
///     Some(Decimal::from(4320)),
/// );
/// assert!(both.is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClampedRateRule {
    rate: Decimal,
    limit: RateLimit,
}

impl ClampedRateRule {
    /// Creates a rule, rejecting rates outside `[0, 1]` and negative limits.
    pub fn new(rate: Decimal, limit: RateLimit) -> EngineResult<Self> {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(EngineError::invalid_input(
                "rate",
                format!("rate {} is not a fraction between 0 and 1", rate),
            ));
        }

        match limit {
            RateLimit::Floor(floor) if floor < Decimal::ZERO => Err(EngineError::invalid_input(
                "floor",
                format!("must not be negative, got {}", floor),
            )),
            RateLimit::Cap(cap) if cap < Decimal::ZERO => Err(EngineError::invalid_input(
                "cap",
                format!("must not be negative, got {}", cap),
            )),
            _ => Ok(Self { rate, limit }),
        }
    }

    /// Creates a rule from optional floor and cap values.
    ///
    /// Setting both is rejected with [`EngineError::InvalidInput`].
    pub fn from_limits(
        rate: Decimal,
        floor: Option<Decimal>,
        cap: Option<Decimal>,
    ) -> EngineResult<Self> {
        let limit = match (floor, cap) {
            (Some(_), Some(_)) => {
                return Err(EngineError::invalid_input(
                    "limit",
                    "a rule may set a floor or a cap, not both",
                ));
            }
            (Some(floor), None) => RateLimit::Floor(floor),
            (None, Some(cap)) => RateLimit::Cap(cap),
            (None, None) => RateLimit::None,
        };
        Self::new(rate, limit)
    }

    /// Returns the rate as a fraction.
    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// Returns the limit.
    pub fn limit(&self) -> RateLimit {
        self.limit
    }
}

/// A named contribution deducted from the gross amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionRule {
    /// Stable identifier (e.g., "nssf").
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// The clamped-rate rule producing the amount.
    pub rule: ClampedRateRule,
    /// Whether the amount is subtracted from gross before tax is computed.
    pub tax_deductible: bool,
}
