//! Progressive tax calculation functionality.
//!
//! This module walks a [`TierTable`] to compute tiered tax on a taxable
//! amount, applies the table's relief, and produces a per-band breakdown.
//!
//! ## Boundary Convention
//!
//! Band endpoints are inclusive on both sides, so a bounded band absorbs
//! `upper - lower + 1` units. With the reference bands, an amount of exactly
//! 24,000 (and 24,001) is taxed entirely at 10%; the 25% band only starts
//! receiving amounts from 24,002 onward.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AuditStep, TaxBreakdown, TierBreakdownEntry, TierTable};

use super::amount::validate_amount;

/// The result of the income tax step, including its audit steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeTaxResult {
    /// The tax accumulated across bands before relief.
    pub tax_before_relief: Decimal,
    /// The part of the relief that reduced the tax.
    pub relief_applied: Decimal,
    /// The tax owed after relief, never negative.
    pub tax: Decimal,
    /// Audit steps for the band walk and the relief.
    pub audit_steps: Vec<AuditStep>,
}

/// Walks the bands and reports each band that receives a positive amount.
///
/// `compute_tax` and `compute_tax_breakdown` both go through this walk so
/// their pre-relief totals agree exactly.
fn walk_bands(
    taxable_amount: Decimal,
    table: &TierTable,
    mut visit: impl FnMut(TierBreakdownEntry),
) {
    let mut remaining = taxable_amount;

    for (band_index, band) in table.bands().iter().enumerate() {
        if remaining <= Decimal::ZERO {
            break;
        }

        let amount_in_band = remaining.min(band.width(remaining));
        if amount_in_band > Decimal::ZERO {
            visit(TierBreakdownEntry {
                band_index,
                range_lower_bound: band.lower_bound,
                range_upper_bound: band.upper_bound,
                rate: band.rate,
                amount_taxed_in_band: amount_in_band,
                tax_owed_in_band: amount_in_band * band.rate,
            });
            remaining -= amount_in_band;
        }
    }
}

fn tax_before_relief(taxable_amount: Decimal, table: &TierTable) -> (Decimal, usize) {
    let mut total = Decimal::ZERO;
    let mut bands_used = 0;
    walk_bands(taxable_amount, table, |entry| {
        total += entry.tax_owed_in_band;
        bands_used += 1;
    });
    (total, bands_used)
}

/// Subtracts relief from tax, clamping at zero.
///
/// Relief can reduce tax to nothing but never produces a refund.
///
/// # Examples
///
/// ```
/// use deduction_engine::calculation::apply_relief;
/// use rust_decimal::Decimal;
///
/// assert_eq!(apply_relief(Decimal::from(3000), Decimal::from(2400)), Decimal::from(600));
/// assert_eq!(apply_relief(Decimal::from(1000), Decimal::from(2400)), Decimal::ZERO);
/// ```
pub fn apply_relief(tax_before_relief: Decimal, relief: Decimal) -> Decimal {
    (tax_before_relief - relief).max(Decimal::ZERO)
}

/// Computes the tax owed on a taxable amount after relief.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::InvalidInput`] if `taxable_amount`
/// is negative.
///
/// # Examples
///
/// ```
/// use deduction_engine::calculation::compute_tax;
/// use deduction_engine::models::{TierBand, TierTable, UpperBound};
/// use rust_decimal::Decimal;
///
/// let table = TierTable::new(
///     vec![
///         TierBand::new(Decimal::ZERO, UpperBound::Bounded(999.into()), Decimal::new(10, 2)),
///         TierBand::new(Decimal::from(1000), UpperBound::Unbounded, Decimal::new(20, 2)),
///     ],
///     Decimal::from(50),
/// )
/// .unwrap();
///
/// // 1000 * 10% + 500 * 20% - 50 relief
/// assert_eq!(compute_tax(Decimal::from(1500), &table).unwrap(), Decimal::from(150));
/// ```
pub fn compute_tax(taxable_amount: Decimal, table: &TierTable) -> EngineResult<Decimal> {
    validate_amount("taxable_amount", taxable_amount)?;
    let (total, _) = tax_before_relief(taxable_amount, table);
    Ok(apply_relief(total, table.relief()))
}

/// Computes the per-band breakdown of the tax on a taxable amount.
///
/// The breakdown is taken before relief: `total_tax_before_relief` is the
/// sum of every entry's `tax_owed_in_band`.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::InvalidInput`] if `taxable_amount`
/// is negative.
pub fn compute_tax_breakdown(
    taxable_amount: Decimal,
    table: &TierTable,
) -> EngineResult<TaxBreakdown> {
    validate_amount("taxable_amount", taxable_amount)?;

    let mut entries = Vec::with_capacity(table.bands().len());
    let mut total_tax_before_relief = Decimal::ZERO;
    walk_bands(taxable_amount, table, |entry| {
        total_tax_before_relief += entry.tax_owed_in_band;
        entries.push(entry);
    });

    Ok(TaxBreakdown {
        entries,
        total_tax_before_relief,
    })
}

/// Computes tax on a taxable amount and records the audit steps.
///
/// Produces two steps: the progressive band walk and the relief.
pub fn calculate_income_tax(
    taxable_amount: Decimal,
    table: &TierTable,
    step_number_start: u32,
) -> EngineResult<IncomeTaxResult> {
    validate_amount("taxable_amount", taxable_amount)?;

    let (tax_before_relief, bands_used) = tax_before_relief(taxable_amount, table);
    let tax = apply_relief(tax_before_relief, table.relief());
    let relief_applied = tax_before_relief - tax;

    let band_step = AuditStep {
        step_number: step_number_start,
        rule_id: "progressive_tax".to_string(),
        rule_name: "Progressive Tax".to_string(),
        input: serde_json::json!({
            "taxable_amount": taxable_amount.normalize().to_string(),
            "band_count": table.bands().len()
        }),
        output: serde_json::json!({
            "tax_before_relief": tax_before_relief.normalize().to_string(),
            "bands_used": bands_used
        }),
        reasoning: format!(
            "${} taxed across {} band(s) = ${}",
            taxable_amount.normalize(),
            bands_used,
            tax_before_relief.normalize()
        ),
    };

    let relief_reasoning = if relief_applied < table.relief() {
        format!(
            "${} - relief ${} (limited to ${}) = ${}",
            tax_before_relief.normalize(),
            table.relief().normalize(),
            relief_applied.normalize(),
            tax.normalize()
        )
    } else {
        format!(
            "${} - relief ${} = ${}",
            tax_before_relief.normalize(),
            table.relief().normalize(),
            tax.normalize()
        )
    };

    let relief_step = AuditStep {
        step_number: step_number_start + 1,
        rule_id: "tax_relief".to_string(),
        rule_name: "Tax Relief".to_string(),
        input: serde_json::json!({
            "tax_before_relief": tax_before_relief.normalize().to_string(),
            "relief": table.relief().normalize().to_string()
        }),
        output: serde_json::json!({
            "relief_applied": relief_applied.normalize().to_string(),
            "tax": tax.normalize().to_string()
        }),
        reasoning: relief_reasoning,
    };

    Ok(IncomeTaxResult {
        tax_before_relief,
        relief_applied,
        tax,
        audit_steps: vec![band_step, relief_step],
    })
}
