//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading deduction
//! schedules from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{ClampedRateRule, ContributionRule, TierBand, TierTable, UpperBound};

use super::types::{
    ContributionConfig, ContributionsConfig, DeductionSchedule, ScheduleMetadata, TaxBandsConfig,
};

/// Loads and provides access to a deduction schedule.
///
/// The `ConfigLoader` reads YAML configuration files from a directory,
/// validates them, and exposes the resulting [`DeductionSchedule`].
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/ke_2024/
/// ├── schedule.yaml       # Schedule metadata
/// ├── tax_bands.yaml      # Relief and progressive bands
/// └── contributions.yaml  # Floor/cap-limited contributions
/// ```
///
/// # Example
///
/// ```no_run
/// use deduction_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/ke_2024").unwrap();
/// println!("Loaded schedule: {}", loader.metadata().name);
///
/// let nssf = loader.contribution("nssf").unwrap();
/// assert!(nssf.tax_deductible);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    schedule: DeductionSchedule,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/ke_2024")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The bands or contributions fail validation
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<ScheduleMetadata>(&path.join("schedule.yaml"))?;
        let bands_config = Self::load_yaml::<TaxBandsConfig>(&path.join("tax_bands.yaml"))?;
        let contributions_config =
            Self::load_yaml::<ContributionsConfig>(&path.join("contributions.yaml"))?;

        let tier_table = Self::build_tier_table(bands_config)?;
        let contributions = contributions_config
            .contributions
            .into_iter()
            .map(Self::build_contribution)
            .collect::<EngineResult<Vec<_>>>()?;

        let schedule = DeductionSchedule::new(metadata, tier_table, contributions)?;

        debug!(
            code = %schedule.metadata().code,
            bands = schedule.tier_table().bands().len(),
            contributions = schedule.contributions().len(),
            "Loaded deduction schedule"
        );

        Ok(Self { schedule })
    }

    /// Wraps an already-built schedule.
    pub fn from_schedule(schedule: DeductionSchedule) -> Self {
        Self { schedule }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn build_tier_table(config: TaxBandsConfig) -> EngineResult<TierTable> {
        let bands = config
            .bands
            .into_iter()
            .map(|band| {
                let upper_bound = match band.upper_bound {
                    Some(upper) => UpperBound::Bounded(upper),
                    None => UpperBound::Unbounded,
                };
                TierBand::new(band.lower_bound, upper_bound, band.rate)
            })
            .collect();

        TierTable::new(bands, config.relief)
    }

    fn build_contribution(config: ContributionConfig) -> EngineResult<ContributionRule> {
        let rule = ClampedRateRule::from_limits(config.rate, config.floor, config.cap).map_err(
            |err| match err {
                EngineError::InvalidInput { field, message } => EngineError::InvalidInput {
                    field: format!("contributions.{}.{}", config.id, field),
                    message,
                },
                other => other,
            },
        )?;

        Ok(ContributionRule {
            id: config.id,
            name: config.name,
            rule,
            tax_deductible: config.tax_deductible,
        })
    }

    /// Returns the loaded schedule.
    pub fn schedule(&self) -> &DeductionSchedule {
        &self.schedule
    }

    /// Returns the schedule metadata.
    pub fn metadata(&self) -> &ScheduleMetadata {
        self.schedule.metadata()
    }

    /// Gets a contribution by its id.
    ///
    /// # Returns
    ///
    /// Returns the contribution if found, or `ContributionNotFound` error.
    pub fn contribution(&self, id: &str) -> EngineResult<&ContributionRule> {
        self.schedule
            .contributions()
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| EngineError::ContributionNotFound { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RateLimit;
    use rust_decimal::Decimal;
    use std::path::PathBuf;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/ke_2024"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// Copies the reference schedule into a scratch directory and overwrites one file.
    fn scratch_config(name: &str, file: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "deduction_engine_{}_{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        for entry in ["schedule.yaml", "tax_bands.yaml", "contributions.yaml"] {
            fs::copy(Path::new(config_path()).join(entry), dir.join(entry)).unwrap();
        }
        fs::write(dir.join(file), content).unwrap();
        dir
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.metadata().code, "KE-2024");
        assert_eq!(loader.metadata().currency, "KES");
    }

    #[test]
    fn test_reference_bands_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let table = loader.schedule().tier_table();

        assert_eq!(table.relief(), dec("2400"));
        assert_eq!(table.bands().len(), 5);
        assert_eq!(table.bands()[0].upper_bound, UpperBound::Bounded(dec("24000")));
        assert_eq!(table.bands()[3].rate, dec("0.325"));
        assert_eq!(table.bands()[4].lower_bound, dec("800001"));
        assert!(table.bands()[4].upper_bound.is_unbounded());
    }

    #[test]
    fn test_reference_contributions_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let shif = loader.contribution("shif").unwrap();
        assert_eq!(shif.rule.rate(), dec("0.0275"));
        assert_eq!(shif.rule.limit(), RateLimit::Floor(dec("300")));
        assert!(!shif.tax_deductible);

        let nssf = loader.contribution("nssf").unwrap();
        assert_eq!(nssf.rule.limit(), RateLimit::Cap(dec("4320")));
        assert!(nssf.tax_deductible);

        let levy = loader.contribution("housing_levy").unwrap();
        assert_eq!(levy.rule.limit(), RateLimit::None);
        assert!(!levy.tax_deductible);
    }

    #[test]
    fn test_get_contribution_unknown_returns_error() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        match loader.contribution("pension") {
            Err(EngineError::ContributionNotFound { id }) => assert_eq!(id, "pension"),
            other => panic!("Expected ContributionNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("schedule.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_invalid_yaml_returns_parse_error() {
        let dir = scratch_config("bad_yaml", "tax_bands.yaml", "relief: [unclosed");

        match ConfigLoader::load(&dir) {
            Err(EngineError::ConfigParseError { path, .. }) => {
                assert!(path.contains("tax_bands.yaml"));
            }
            other => panic!("Expected ConfigParseError error, got {:?}", other),
        }
    }

    #[test]
    fn test_gap_in_bands_returns_invalid_input() {
        let dir = scratch_config(
            "gap",
            "tax_bands.yaml",
            concat!(
                "relief: \"0\"\n",
                "bands:\n",
                "  - { lower_bound: \"0\", upper_bound: \"100\", rate: \"0.1\" }\n",
                "  - { lower_bound: \"200\", rate: \"0.2\" }\n",
            ),
        );

        match ConfigLoader::load(&dir) {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "bands[1]"),
            other => panic!("Expected InvalidInput error, got {:?}", other),
        }
    }

    #[test]
    fn test_upper_bound_beyond_range_returns_invalid_input() {
        let dir = scratch_config(
            "max_bound",
            "tax_bands.yaml",
            concat!(
                "relief: \"0\"\n",
                "bands:\n",
                "  - { lower_bound: \"0\", rate: \"0.1\",\n",
                "      upper_bound: \"79228162514264337593543950335\" }\n",
                "  - { lower_bound: \"79228162514264337593543950335\", rate: \"0.2\" }\n",
            ),
        );

        match ConfigLoader::load(&dir) {
            Err(EngineError::InvalidInput { field, message }) => {
                assert_eq!(field, "bands[0]");
                assert!(message.contains("supported range"));
            }
            other => panic!("Expected InvalidInput error, got {:?}", other),
        }
    }

    #[test]
    fn test_floor_and_cap_together_returns_invalid_input() {
        let dir = scratch_config(
            "floor_cap",
            "contributions.yaml",
            concat!(
                "contributions:\n",
                "  - { id: both, name: Both, rate: \"0.05\", floor: \"10\", cap: \"20\" }\n",
            ),
        );

        match ConfigLoader::load(&dir) {
            Err(EngineError::InvalidInput { field, message }) => {
                assert_eq!(field, "contributions.both.limit");
                assert!(message.contains("not both"));
            }
            other => panic!("Expected InvalidInput error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_schedule_exposes_schedule() {
        let loaded = ConfigLoader::load(config_path()).unwrap();
        let wrapped = ConfigLoader::from_schedule(loaded.schedule().clone());
        assert_eq!(wrapped.schedule(), loaded.schedule());
    }
}
