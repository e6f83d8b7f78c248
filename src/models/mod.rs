//! Core data models for the Deduction Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod contribution;
mod deduction_result;
mod tier;

pub use contribution::{ClampedRateRule, ContributionRule, RateLimit};
pub use deduction_result::{
    AuditStep, ContributionDeduction, DeductionResult, TaxBreakdown, TierBreakdownEntry,
};
pub use tier::{TierBand, TierTable, UpperBound};
