//! Configuration loading and management for the Deduction Engine.
//!
//! This module provides functionality to load deduction schedules from YAML
//! files: schedule metadata, progressive tax bands with relief, and the
//! clamped-rate contributions.
//!
//! # Example
//!
//! ```no_run
//! use deduction_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/ke_2024").unwrap();
//! println!("Loaded schedule: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    ContributionConfig, ContributionsConfig, DeductionSchedule, ScheduleMetadata, TaxBandsConfig,
    TierBandConfig,
};
