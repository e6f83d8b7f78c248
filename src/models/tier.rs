//! Tier band and tier table models.
//!
//! A [`TierTable`] is the validated, read-only set of progressive tax bands
//! together with the relief that is subtracted from the computed tax.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The upper limit of a tax band.
///
/// Bounded limits are inclusive: an amount exactly equal to the bound
/// belongs to the band, and the next band starts at `bound + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpperBound {
    /// The band ends at (and includes) this amount.
    Bounded(Decimal),
    /// The band extends without limit. Only the last band may be unbounded.
    Unbounded,
}

impl UpperBound {
    /// Returns the bound, or `None` for an unbounded band.
    pub fn value(&self) -> Option<Decimal> {
        match self {
            UpperBound::Bounded(upper) => Some(*upper),
            UpperBound::Unbounded => None,
        }
    }

    /// Returns true if the band has no upper limit.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, UpperBound::Unbounded)
    }
}

/// A contiguous amount range taxed at a single rate.
///
/// # Example
///
/// ```
/// use deduction_engine::models::{TierBand, UpperBound};
/// use rust_decimal::Decimal;
///
/// let upper = UpperBound::Bounded(Decimal::from(24000));
/// let band = TierBand::new(Decimal::ZERO, upper, Decimal::new(10, 2));
/// assert_eq!(band.width(Decimal::from(100000)), Decimal::from(24001));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBand {
    /// The first amount (inclusive) taxed in this band.
    pub lower_bound: Decimal,
    /// The last amount (inclusive) taxed in this band.
    pub upper_bound: UpperBound,
    /// The rate applied to amounts in this band, as a fraction in `[0, 1]`.
    pub rate: Decimal,
}

impl TierBand {
    /// Creates a new band.
    pub fn new(lower_bound: Decimal, upper_bound: UpperBound, rate: Decimal) -> Self {
        Self {
            lower_bound,
            upper_bound,
            rate,
        }
    }

    /// Returns the amount this band can absorb.
    ///
    /// Bounded bands are `upper - lower + 1` wide because both endpoints are
    /// inclusive, saturating at `Decimal::MAX`. The unbounded band absorbs
    /// whatever `remaining` is left.
    pub fn width(&self, remaining: Decimal) -> Decimal {
        match self.upper_bound {
            UpperBound::Bounded(upper) => upper
                .saturating_sub(self.lower_bound)
                .saturating_add(Decimal::ONE),
            UpperBound::Unbounded => remaining,
        }
    }
}

/// The ordered, validated sequence of tax bands plus the relief amount.
///
/// Construction rejects any table whose bands do not partition the
/// non-negative amounts: the first band must start at zero, each band must
/// start one unit after the previous band's upper bound, and exactly one band
/// (the last) must be unbounded.
///
/// # Example
///
/// ```
/// use deduction_engine::models::{TierBand, TierTable, UpperBound};
/// use rust_decimal::Decimal;
///
/// let table = TierTable::new(
///     vec![
///         TierBand::new(Decimal::ZERO, UpperBound::Bounded(24000.into()), Decimal::new(10, 2)),
///         TierBand::new(Decimal::from(24001), UpperBound::Unbounded, Decimal::new(25, 2)),
///     ],
///     Decimal::from(2400),
/// )
/// .unwrap();
/// assert_eq!(table.bands().len(), 2);
///
/// // A gap between bands is rejected.
/// let gap = TierTable::new(
///     vec![
///         TierBand::new(Decimal::ZERO, UpperBound::Bounded(100.into()), Decimal::new(10, 2)),
///         TierBand::new(Decimal::from(150), UpperBound::Unbounded, Decimal::new(25, 2)),
///     ],
///     Decimal::ZERO,
/// );
/// assert!(gap.is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierTable {
    bands: Vec<TierBand>,
    relief: Decimal,
}

impl TierTable {
    /// Validates the bands and relief and builds the table.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if the bands are empty,
    /// overlapping, non-contiguous, not ascending, have a rate outside
    /// `[0, 1]`, if any band other than the last is unbounded, if the last
    /// band is bounded, or if the relief is negative.
    pub fn new(bands: Vec<TierBand>, relief: Decimal) -> EngineResult<Self> {
        if bands.is_empty() {
            return Err(EngineError::invalid_input(
                "bands",
                "at least one band is required",
            ));
        }

        if relief < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "relief",
                format!("must not be negative, got {}", relief),
            ));
        }

        let last_index = bands.len() - 1;
        let mut expected_lower = Decimal::ZERO;

        for (index, band) in bands.iter().enumerate() {
            let field = format!("bands[{}]", index);

            if band.rate < Decimal::ZERO || band.rate > Decimal::ONE {
                return Err(EngineError::invalid_input(
                    field,
                    format!("rate {} is not a fraction between 0 and 1", band.rate),
                ));
            }

            if band.lower_bound != expected_lower {
                let message = if index == 0 {
                    format!("first band must start at 0, got {}", band.lower_bound)
                } else if band.lower_bound < expected_lower {
                    format!(
                        "lower bound {} overlaps the previous band (expected {})",
                        band.lower_bound, expected_lower
                    )
                } else {
                    format!(
                        "lower bound {} leaves a gap after the previous band (expected {})",
                        band.lower_bound, expected_lower
                    )
                };
                return Err(EngineError::invalid_input(field, message));
            }

            match band.upper_bound {
                UpperBound::Bounded(upper) => {
                    if upper < band.lower_bound {
                        return Err(EngineError::invalid_input(
                            field,
                            format!(
                                "upper bound {} is below lower bound {}",
                                upper, band.lower_bound
                            ),
                        ));
                    }
                    if index == last_index {
                        return Err(EngineError::invalid_input(
                            field,
                            "the last band must be unbounded",
                        ));
                    }
                    expected_lower = upper.checked_add(Decimal::ONE).ok_or_else(|| {
                        EngineError::invalid_input(
                            field.as_str(),
                            "upper bound exceeds the supported range",
                        )
                    })?;
                }
                UpperBound::Unbounded => {
                    if index != last_index {
                        return Err(EngineError::invalid_input(
                            field,
                            "only the last band may be unbounded",
                        ));
                    }
                }
            }
        }

        Ok(Self { bands, relief })
    }

    /// Returns the bands in ascending order.
    pub fn bands(&self) -> &[TierBand] {
        &self.bands
    }

    /// Returns the relief subtracted from computed tax.
    pub fn relief(&self) -> Decimal {
        self.relief
    }

    /// Returns the highest rate of any band.
    pub fn top_rate(&self) -> Decimal {
        self.bands
            .iter()
            .map(|band| band.rate)
            .max()
            .unwrap_or(Decimal::ZERO)
    }
}
