//! Deduction result models for the Deduction Engine.
//!
//! This module contains the [`DeductionResult`] type and its associated
//! structures that capture all outputs of a deduction calculation: the
//! individual contributions, the tax, the totals, and an audit trace.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::UpperBound;

/// The outcome of applying one contribution rule to a base amount.
///
/// # Example
///
/// ```
/// use deduction_engine::models::ContributionDeduction;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let nssf = ContributionDeduction {
///     id: "nssf".to_string(),
///     name: "NSSF".to_string(),
///     base: Decimal::from(1000000),
///     rate: Decimal::from_str("0.06").unwrap(),
///     raw_amount: Decimal::from(60000),
///     amount: Decimal::from(4320),
///     limit_applied: true,
///     tax_deductible: true,
/// };
/// assert!(nssf.amount < nssf.raw_amount);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionDeduction {
    /// The contribution identifier (e.g., "shif").
    pub id: String,
    /// The human-readable contribution name.
    pub name: String,
    /// The base the rate was applied to.
    pub base: Decimal,
    /// The configured rate.
    pub rate: Decimal,
    /// `base * rate` before any floor or cap.
    pub raw_amount: Decimal,
    /// The deducted amount after the floor or cap.
    pub amount: Decimal,
    /// Whether the floor or cap changed the raw amount.
    pub limit_applied: bool,
    /// Whether the amount was subtracted before tax was computed.
    pub tax_deductible: bool,
}

/// One band's contribution to the tax on a taxable amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBreakdownEntry {
    /// Zero-based position of the band in the tier table.
    pub band_index: usize,
    /// The band's lower bound.
    pub range_lower_bound: Decimal,
    /// The band's upper bound.
    pub range_upper_bound: UpperBound,
    /// The band's rate.
    pub rate: Decimal,
    /// The part of the taxable amount that fell in this band.
    pub amount_taxed_in_band: Decimal,
    /// `amount_taxed_in_band * rate`.
    pub tax_owed_in_band: Decimal,
}

/// Itemised tax for a taxable amount, before relief.
///
/// Only bands that received a positive amount have an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// Per-band entries in band order.
    pub entries: Vec<TierBreakdownEntry>,
    /// The sum of every entry's `tax_owed_in_band`.
    pub total_tax_before_relief: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The complete result of a deduction calculation.
///
/// Created fresh for every computation. All amounts are full precision;
/// rounding for display is left to the caller. `net_amount` may be negative
/// when total deductions exceed the gross amount.
///
/// # Example
///
/// ```
/// use deduction_engine::models::DeductionResult;
/// use rust_decimal::Decimal;
///
/// let result = DeductionResult {
///     basic_amount: Decimal::ZERO,
///     supplemental_amount: Decimal::ZERO,
///     gross_amount: Decimal::ZERO,
///     contributions: vec![],
///     deductible_contributions: Decimal::ZERO,
///     taxable_amount: Decimal::ZERO,
///     tax_before_relief: Decimal::ZERO,
///     relief_applied: Decimal::ZERO,
///     tax: Decimal::ZERO,
///     total_deductions: Decimal::ZERO,
///     net_amount: Decimal::ZERO,
///     audit_trace: vec![],
/// };
/// assert!(result.contribution("nssf").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionResult {
    /// The basic amount supplied by the caller.
    pub basic_amount: Decimal,
    /// The supplemental amount supplied by the caller.
    pub supplemental_amount: Decimal,
    /// `basic_amount + supplemental_amount`.
    pub gross_amount: Decimal,
    /// Every configured contribution, in schedule order.
    pub contributions: Vec<ContributionDeduction>,
    /// The sum of tax-deductible contributions.
    pub deductible_contributions: Decimal,
    /// The amount fed to the progressive tax calculator.
    pub taxable_amount: Decimal,
    /// The progressive tax before relief.
    pub tax_before_relief: Decimal,
    /// The part of the relief that was actually used.
    pub relief_applied: Decimal,
    /// The tax owed after relief.
    pub tax: Decimal,
    /// `tax` plus every contribution.
    pub total_deductions: Decimal,
    /// `gross_amount - total_deductions`.
    pub net_amount: Decimal,
    /// The audit trace of calculation steps.
    pub audit_trace: Vec<AuditStep>,
}

impl DeductionResult {
    /// Looks up a contribution by its identifier.
    pub fn contribution(&self, id: &str) -> Option<&ContributionDeduction> {
        self.contributions.iter().find(|c| c.id == id)
    }

    /// Returns the sum of all contributions.
    pub fn contributions_total(&self) -> Decimal {
        self.contributions.iter().map(|c| c.amount).sum()
    }
}
