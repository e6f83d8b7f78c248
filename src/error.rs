//! Error types for the Deduction Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading a deduction
//! schedule or computing deductions.

use thiserror::Error;

/// The main error type for the Deduction Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use deduction_engine::error::EngineError;
///
/// let error = EngineError::InvalidInput {
///     field: "basic_amount".to_string(),
///     message: "must not be negative".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid input 'basic_amount': must not be negative");
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// An amount or a piece of schedule configuration was invalid.
    ///
    /// Raised for negative or non-finite amounts and for malformed tier
    /// tables or contribution rules. It always indicates a caller defect.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The argument or configuration field that was invalid.
        field: String,
        /// A description of what made the value invalid.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Contribution id was not found in the loaded schedule.
    #[error("Contribution not found: {id}")]
    ContributionNotFound {
        /// The contribution id that was not found.
        id: String,
    },
}

impl EngineError {
    /// Shorthand for building an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_displays_field_and_message() {
        let error = EngineError::invalid_input("taxable_amount", "must not be negative");
        assert_eq!(
            error.to_string(),
            "Invalid input 'taxable_amount': must not be negative"
        );
    }

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/tax_bands.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/tax_bands.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_contribution_not_found_displays_id() {
        let error = EngineError::ContributionNotFound {
            id: "pension".to_string(),
        };
        assert_eq!(error.to_string(), "Contribution not found: pension");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_invalid_input() -> EngineResult<()> {
            Err(EngineError::invalid_input("relief", "must not be negative"))
        }

        fn propagates_error() -> EngineResult<()> {
            returns_invalid_input()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
