//! Deduction composition.
//!
//! This module combines the clamped-rate contributions and the progressive
//! tax into a single [`DeductionResult`] for a basic and supplemental amount.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::DeductionSchedule;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, DeductionResult};

use super::amount::validate_amount;
use super::clamped_rate::evaluate_contribution;
use super::progressive_tax::calculate_income_tax;

/// Computes every deduction for a basic and a supplemental amount.
///
/// The steps are:
/// 1. `gross = basic + supplemental`
/// 2. each contribution is applied to the gross amount
/// 3. `taxable = gross - tax-deductible contributions` (never below zero)
/// 4. progressive tax on the taxable amount, less relief
/// 5. `net = gross - (tax + all contributions)`
///
/// The net amount is not floored: when deductions exceed the gross amount
/// (for example, a contribution floor on a zero gross), it is negative.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if either amount is negative, or if
/// the gross amount or the deduction totals are not representable.
///
/// # Examples
///
/// ```no_run
/// use deduction_engine::calculation::compute_deductions;
/// use deduction_engine::config::ConfigLoader;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let config = ConfigLoader::load("./config/ke_2024").unwrap();
/// let result = compute_deductions(
///     Decimal::from(50000),
///     Decimal::from(10000),
///     config.schedule(),
/// )
/// .unwrap();
///
/// assert_eq!(result.gross_amount, Decimal::from(60000));
/// assert_eq!(result.net_amount, Decimal::from_str("44546.85").unwrap());
/// ```
pub fn compute_deductions(
    basic_amount: Decimal,
    supplemental_amount: Decimal,
    schedule: &DeductionSchedule,
) -> EngineResult<DeductionResult> {
    validate_amount("basic_amount", basic_amount)?;
    validate_amount("supplemental_amount", supplemental_amount)?;

    let gross_amount = basic_amount
        .checked_add(supplemental_amount)
        .ok_or_else(|| {
            EngineError::invalid_input(
                "supplemental_amount",
                "gross amount exceeds the supported range",
            )
        })?;

    let mut audit_trace = Vec::new();
    let mut step_number: u32 = 1;

    audit_trace.push(AuditStep {
        step_number,
        rule_id: "gross_amount".to_string(),
        rule_name: "Gross Amount".to_string(),
        input: serde_json::json!({
            "basic_amount": basic_amount.normalize().to_string(),
            "supplemental_amount": supplemental_amount.normalize().to_string()
        }),
        output: serde_json::json!({
            "gross_amount": gross_amount.normalize().to_string()
        }),
        reasoning: format!(
            "${} + ${} = ${}",
            basic_amount.normalize(),
            supplemental_amount.normalize(),
            gross_amount.normalize()
        ),
    });
    step_number += 1;

    let mut contributions = Vec::with_capacity(schedule.contributions().len());
    for contribution in schedule.contributions() {
        let result = evaluate_contribution(gross_amount, contribution, step_number)?;
        audit_trace.push(result.audit_step);
        contributions.push(result.deduction);
        step_number += 1;
    }

    let deductible_contributions = checked_total(
        contributions
            .iter()
            .filter(|c| c.tax_deductible)
            .map(|c| c.amount),
    )?;

    // Floors on deductible contributions can exceed a small gross amount.
    let taxable_amount = (gross_amount - deductible_contributions).max(Decimal::ZERO);

    let deductible_ids: Vec<&str> = contributions
        .iter()
        .filter(|c| c.tax_deductible)
        .map(|c| c.id.as_str())
        .collect();

    audit_trace.push(AuditStep {
        step_number,
        rule_id: "taxable_amount".to_string(),
        rule_name: "Taxable Amount".to_string(),
        input: serde_json::json!({
            "gross_amount": gross_amount.normalize().to_string(),
            "deductible_contributions": deductible_ids
        }),
        output: serde_json::json!({
            "deductible_total": deductible_contributions.normalize().to_string(),
            "taxable_amount": taxable_amount.normalize().to_string()
        }),
        reasoning: format!(
            "${} - ${} tax-deductible contributions = ${}",
            gross_amount.normalize(),
            deductible_contributions.normalize(),
            taxable_amount.normalize()
        ),
    });
    step_number += 1;

    let income_tax = calculate_income_tax(taxable_amount, schedule.tier_table(), step_number)?;
    step_number += income_tax.audit_steps.len() as u32;
    audit_trace.extend(income_tax.audit_steps);

    let contributions_total = checked_total(contributions.iter().map(|c| c.amount))?;
    let total_deductions = checked_total([income_tax.tax, contributions_total])?;
    let net_amount = gross_amount - total_deductions;

    audit_trace.push(AuditStep {
        step_number,
        rule_id: "net_amount".to_string(),
        rule_name: "Net Amount".to_string(),
        input: serde_json::json!({
            "gross_amount": gross_amount.normalize().to_string(),
            "tax": income_tax.tax.normalize().to_string(),
            "contributions_total": contributions_total.normalize().to_string()
        }),
        output: serde_json::json!({
            "total_deductions": total_deductions.normalize().to_string(),
            "net_amount": net_amount.normalize().to_string()
        }),
        reasoning: format!(
            "${} - (${} tax + ${} contributions) = ${}",
            gross_amount.normalize(),
            income_tax.tax.normalize(),
            contributions_total.normalize(),
            net_amount.normalize()
        ),
    });

    debug!(
        schedule = %schedule.metadata().code,
        gross_amount = %gross_amount,
        tax = %income_tax.tax,
        total_deductions = %total_deductions,
        net_amount = %net_amount,
        "Computed deductions"
    );

    Ok(DeductionResult {
        basic_amount,
        supplemental_amount,
        gross_amount,
        contributions,
        deductible_contributions,
        taxable_amount,
        tax_before_relief: income_tax.tax_before_relief,
        relief_applied: income_tax.relief_applied,
        tax: income_tax.tax,
        total_deductions,
        net_amount,
        audit_trace,
    })
}

/// Sums amounts, rejecting a total that does not fit in a `Decimal`.
fn checked_total(amounts: impl IntoIterator<Item = Decimal>) -> EngineResult<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
        .ok_or_else(|| {
            EngineError::invalid_input(
                "contributions",
                "total deductions exceed the supported range",
            )
        })
}
