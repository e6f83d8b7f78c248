//! Statutory Deduction Engine
//!
//! This crate computes progressive income tax with relief and a set of
//! floor- or cap-limited contributions from a gross amount, and reports the
//! net result with a per-band tax breakdown and an audit trace.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
