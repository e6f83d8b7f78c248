//! Calculation logic for the Deduction Engine.
//!
//! This module contains the calculation functions for statutory deductions:
//! amount validation, progressive tax with relief and per-band breakdown,
//! clamped-rate contributions (floor-limited, cap-limited, or unclamped),
//! and the composer that combines them into a net result.

mod amount;
mod clamped_rate;
mod composer;
mod progressive_tax;

pub use amount::{amount_from_f64, validate_amount};
pub use clamped_rate::{ContributionResult, apply_clamped_rate, evaluate_contribution};
pub use composer::compute_deductions;
pub use progressive_tax::{
    IncomeTaxResult, apply_relief, calculate_income_tax, compute_tax, compute_tax_breakdown,
};
