//! Configuration types for deduction schedules.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, plus the validated
//! [`DeductionSchedule`] they are turned into.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{ContributionRule, TierTable};

/// Metadata about a deduction schedule.
///
/// Contains identifying information about the schedule, including its
/// code, jurisdiction, currency and source URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleMetadata {
    /// The schedule code (e.g., "KE-2024").
    pub code: String,
    /// The human-readable name of the schedule.
    pub name: String,
    /// The jurisdiction the schedule applies to.
    pub jurisdiction: String,
    /// The ISO currency code amounts are expressed in.
    pub currency: String,
    /// The date from which the schedule applies.
    pub effective_date: NaiveDate,
    /// URL to the official rate documentation.
    pub source_url: String,
}

/// A tax band as written in `tax_bands.yaml`.
///
/// A missing `upper_bound` marks the unbounded top band.
#[derive(Debug, Clone, Deserialize)]
pub struct TierBandConfig {
    /// The first amount taxed in the band.
    pub lower_bound: Decimal,
    /// The last amount taxed in the band, if bounded.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// The band rate as a fraction.
    pub rate: Decimal,
}

/// Tax bands configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxBandsConfig {
    /// Relief subtracted from computed tax.
    pub relief: Decimal,
    /// Bands in ascending order.
    pub bands: Vec<TierBandConfig>,
}

/// A contribution as written in `contributions.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContributionConfig {
    /// Stable identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// The contribution rate as a fraction.
    pub rate: Decimal,
    /// Guaranteed minimum amount.
    #[serde(default)]
    pub floor: Option<Decimal>,
    /// Guaranteed maximum amount.
    #[serde(default)]
    pub cap: Option<Decimal>,
    /// Whether the contribution reduces the taxable amount.
    #[serde(default)]
    pub tax_deductible: bool,
}

/// Contributions configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct ContributionsConfig {
    /// Contributions in the order they are reported.
    pub contributions: Vec<ContributionConfig>,
}

/// The complete, validated deduction schedule.
///
/// This is the immutable configuration value passed into the engine. Several
/// schedules can coexist, one per jurisdiction or tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeductionSchedule {
    /// Schedule metadata.
    metadata: ScheduleMetadata,
    /// Progressive tax bands and relief.
    tier_table: TierTable,
    /// Contributions, in reporting order.
    contributions: Vec<ContributionRule>,
}

impl DeductionSchedule {
    /// Creates a schedule, checking that contribution ids are non-empty and unique.
    pub fn new(
        metadata: ScheduleMetadata,
        tier_table: TierTable,
        contributions: Vec<ContributionRule>,
    ) -> EngineResult<Self> {
        let mut seen = HashSet::new();
        for (index, contribution) in contributions.iter().enumerate() {
            if contribution.id.trim().is_empty() {
                return Err(EngineError::invalid_input(
                    format!("contributions[{}].id", index),
                    "must not be empty",
                ));
            }
            if !seen.insert(contribution.id.as_str()) {
                return Err(EngineError::invalid_input(
                    format!("contributions[{}].id", index),
                    format!("duplicate contribution id '{}'", contribution.id),
                ));
            }
        }

        Ok(Self {
            metadata,
            tier_table,
            contributions,
        })
    }

    /// Returns the schedule metadata.
    pub fn metadata(&self) -> &ScheduleMetadata {
        &self.metadata
    }

    /// Returns the progressive tax table.
    pub fn tier_table(&self) -> &TierTable {
        &self.tier_table
    }

    /// Returns all contributions.
    pub fn contributions(&self) -> &[ContributionRule] {
        &self.contributions
    }
}
