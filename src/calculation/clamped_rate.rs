//! Clamped-rate contribution calculation functionality.
//!
//! This module applies a [`ClampedRateRule`] to a base amount. The same
//! pattern covers floor-limited contributions (a guaranteed minimum),
//! cap-limited contributions (a guaranteed maximum), and plain flat-rate
//! contributions.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AuditStep, ClampedRateRule, ContributionDeduction, ContributionRule, RateLimit};

use super::amount::validate_amount;

/// The result of evaluating a contribution, including the deduction and audit step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionResult {
    /// The computed contribution.
    pub deduction: ContributionDeduction,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Applies a clamped-rate rule to a base amount.
///
/// Computes `base * rate`, then raises it to the floor or lowers it to the
/// cap if the rule has one.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::InvalidInput`] if `base` is negative.
///
/// # Examples
///
/// ```
/// use deduction_engine::calculation::apply_clamped_rate;
/// use deduction_engine::models::{ClampedRateRule, RateLimit};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let shif = ClampedRateRule::new(
///     Decimal::from_str("0.0275").unwrap(),
///     RateLimit::Floor(Decimal::from(300)),
/// )
/// .unwrap();
///
/// assert_eq!(apply_clamped_rate(Decimal::ZERO, &shif).unwrap(), Decimal::from(300));
/// assert_eq!(apply_clamped_rate(Decimal::from(60000), &shif).unwrap(), Decimal::from(1650));
/// ```
pub fn apply_clamped_rate(base: Decimal, rule: &ClampedRateRule) -> EngineResult<Decimal> {
    validate_amount("base", base)?;
    Ok(clamp(base * rule.rate(), rule.limit()))
}

fn clamp(raw: Decimal, limit: RateLimit) -> Decimal {
    match limit {
        RateLimit::None => raw,
        RateLimit::Floor(floor) => raw.max(floor),
        RateLimit::Cap(cap) => raw.min(cap),
    }
}

/// Evaluates a named contribution against a base amount.
///
/// # Arguments
///
/// * `base` - The amount the rate applies to (the gross amount)
/// * `contribution` - The configured contribution rule
/// * `step_number` - The step number for audit trail sequencing
pub fn evaluate_contribution(
    base: Decimal,
    contribution: &ContributionRule,
    step_number: u32,
) -> EngineResult<ContributionResult> {
    let amount = apply_clamped_rate(base, &contribution.rule)?;
    let rate = contribution.rule.rate();
    let raw_amount = base * rate;
    let limit_applied = amount != raw_amount;

    let (limit_kind, limit_value) = match contribution.rule.limit() {
        RateLimit::None => ("none", None),
        RateLimit::Floor(floor) => ("floor", Some(floor)),
        RateLimit::Cap(cap) => ("cap", Some(cap)),
    };

    let reasoning = match (limit_applied, limit_value) {
        (true, Some(limit)) => format!(
            "${} × {} = ${} ({} of ${} applies) = ${}",
            base.normalize(),
            rate.normalize(),
            raw_amount.normalize(),
            limit_kind,
            limit.normalize(),
            amount.normalize()
        ),
        _ => format!(
            "${} × {} = ${}",
            base.normalize(),
            rate.normalize(),
            amount.normalize()
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: contribution.id.clone(),
        rule_name: contribution.name.clone(),
        input: serde_json::json!({
            "base": base.normalize().to_string(),
            "rate": rate.normalize().to_string(),
            "limit": limit_kind,
            "limit_value": limit_value.map(|v| v.normalize().to_string())
        }),
        output: serde_json::json!({
            "raw_amount": raw_amount.normalize().to_string(),
            "amount": amount.normalize().to_string(),
            "limit_applied": limit_applied,
            "tax_deductible": contribution.tax_deductible
        }),
        reasoning,
    };

    let deduction = ContributionDeduction {
        id: contribution.id.clone(),
        name: contribution.name.clone(),
        base,
        rate,
        raw_amount,
        amount,
        limit_applied,
        tax_deductible: contribution.tax_deductible,
    };

    Ok(ContributionResult {
        deduction,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn shif() -> ClampedRateRule {
        ClampedRateRule::new(dec("0.0275"), RateLimit::Floor(dec("300"))).unwrap()
    }

    fn nssf() -> ClampedRateRule {
        ClampedRateRule::new(dec("0.06"), RateLimit::Cap(dec("4320"))).unwrap()
    }

    fn housing_levy() -> ClampedRateRule {
        ClampedRateRule::new(dec("0.015"), RateLimit::None).unwrap()
    }

    fn contribution(id: &str, rule: ClampedRateRule, tax_deductible: bool) -> ContributionRule {
        ContributionRule {
            id: id.to_string(),
            name: id.to_uppercase(),
            rule,
            tax_deductible,
        }
    }

    /// CR-001: floor applies on a zero base
    #[test]
    fn test_floor_applies_on_zero_base() {
        assert_eq!(apply_clamped_rate(Decimal::ZERO, &shif()).unwrap(), dec("300"));
    }

    /// CR-002: floor is ignored once the raw amount exceeds it
    #[test]
    fn test_floor_ignored_above_threshold() {
        assert_eq!(apply_clamped_rate(dec("60000"), &shif()).unwrap(), dec("1650"));
    }

    /// CR-003: floor at exactly the crossover base
    #[test]
    fn test_floor_crossover() {
        // 300 / 0.0275 = 10909.0909...
        assert_eq!(apply_clamped_rate(dec("10000"), &shif()).unwrap(), dec("300"));
        assert_eq!(apply_clamped_rate(dec("11000"), &shif()).unwrap(), dec("302.5"));
    }

    /// CR-004: cap limits large bases
    #[test]
    fn test_cap_limits_large_base() {
        assert_eq!(apply_clamped_rate(dec("1000000"), &nssf()).unwrap(), dec("4320"));
    }

    /// CR-005: cap at exactly the cap base
    #[test]
    fn test_cap_at_exact_base() {
        assert_eq!(apply_clamped_rate(dec("72000"), &nssf()).unwrap(), dec("4320"));
        assert_eq!(apply_clamped_rate(dec("60000"), &nssf()).unwrap(), dec("3600"));
    }

    /// CR-006: unclamped rule is a plain percentage
    #[test]
    fn test_unclamped_rule() {
        assert_eq!(apply_clamped_rate(dec("60000"), &housing_levy()).unwrap(), dec("900"));
        assert_eq!(apply_clamped_rate(Decimal::ZERO, &housing_levy()).unwrap(), Decimal::ZERO);
    }

    /// CR-007: negative base rejected
    #[test]
    fn test_negative_base_rejected() {
        let result = apply_clamped_rate(dec("-100"), &nssf());
        assert!(matches!(
            result,
            Err(EngineError::InvalidInput { ref field, .. }) if field == "base"
        ));
    }

    #[test]
    fn test_evaluate_contribution_records_cap() {
        let rule = contribution("nssf", nssf(), true);
        let result = evaluate_contribution(dec("1000000"), &rule, 3).unwrap();

        assert_eq!(result.deduction.amount, dec("4320"));
        assert_eq!(result.deduction.raw_amount, dec("60000"));
        assert!(result.deduction.limit_applied);
        assert!(result.deduction.tax_deductible);

        assert_eq!(result.audit_step.step_number, 3);
        assert_eq!(result.audit_step.rule_id, "nssf");
        assert_eq!(result.audit_step.input["limit"].as_str().unwrap(), "cap");
        assert_eq!(result.audit_step.input["limit_value"].as_str().unwrap(), "4320");
        assert_eq!(result.audit_step.output["limit_applied"].as_bool().unwrap(), true);
        assert!(result.audit_step.reasoning.contains("cap of $4320 applies"));
    }

    #[test]
    fn test_evaluate_contribution_without_limit() {
        let rule = contribution("housing_levy", housing_levy(), false);
        let result = evaluate_contribution(dec("60000"), &rule, 1).unwrap();

        assert_eq!(result.deduction.amount, dec("900"));
        assert!(!result.deduction.limit_applied);
        assert!(!result.deduction.tax_deductible);
        assert!(result.audit_step.input["limit_value"].is_null());
        assert_eq!(result.audit_step.reasoning, "$60000 × 0.015 = $900");
    }

    #[test]
    fn test_evaluate_contribution_records_floor() {
        let rule = contribution("shif", shif(), false);
        let result = evaluate_contribution(Decimal::ZERO, &rule, 1).unwrap();

        assert_eq!(result.deduction.amount, dec("300"));
        assert_eq!(result.deduction.raw_amount, Decimal::ZERO);
        assert!(result.deduction.limit_applied);
        assert!(result.audit_step.reasoning.contains("floor of $300 applies"));
    }
}
