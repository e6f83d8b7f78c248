//! Command line entry point for the Deduction Engine.
//!
//! `serve` starts the HTTP API; `calculate` runs a single calculation and
//! prints the result as JSON.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use deduction_engine::api::{create_router, AppState, BreakdownResponse, CalculationRequest};
use deduction_engine::calculation::{apply_relief, compute_deductions, compute_tax_breakdown};
use deduction_engine::config::ConfigLoader;

/// Progressive statutory deduction engine.
#[derive(Parser, Debug)]
#[command(name = "deduction-engine")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the schedule directory
    #[arg(short, long, global = true, default_value = "./config/ke_2024")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:3000")]
        bind: String,
    },
    /// Compute deductions for one basic and supplemental amount
    Calculate {
        /// The basic amount
        #[arg(long)]
        basic: Decimal,

        /// The supplemental amount (benefits, allowances)
        #[arg(long, default_value_t = Decimal::ZERO)]
        supplemental: Decimal,

        /// Print the per-band tax breakdown of the taxable amount as well
        #[arg(long, default_value_t = false)]
        breakdown: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::load(&cli.config)?;
    info!(
        schedule = %config.metadata().code,
        path = %cli.config.display(),
        "Loaded configuration"
    );

    match cli.command {
        Command::Serve { bind } => {
            let router = create_router(AppState::new(config));
            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!(address = %bind, "Listening");
            axum::serve(listener, router).await?;
        }
        Command::Calculate {
            basic,
            supplemental,
            breakdown,
        } => {
            println!("{}", render_calculation(&config, basic, supplemental, breakdown)?);
        }
    }

    Ok(())
}

/// Runs one calculation and renders it as pretty-printed JSON.
///
/// Applies the same range checks as the `/calculate` endpoint before the
/// engine runs.
fn render_calculation(
    config: &ConfigLoader,
    basic_amount: Decimal,
    supplemental_amount: Decimal,
    breakdown: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let request = CalculationRequest {
        basic_amount,
        supplemental_amount,
    };
    if let Err(error) = request.validate() {
        let message = match error.details {
            Some(details) => format!("{}: {} ({})", error.code, error.message, details),
            None => format!("{}: {}", error.code, error.message),
        };
        return Err(message.into());
    }

    let result = compute_deductions(basic_amount, supplemental_amount, config.schedule())?;
    let mut output = serde_json::to_string_pretty(&result)?;

    if breakdown {
        let table = config.schedule().tier_table();
        let itemised = compute_tax_breakdown(result.taxable_amount, table)?;
        let response = BreakdownResponse {
            taxable_amount: result.taxable_amount,
            tax: apply_relief(itemised.total_tax_before_relief, table.relief()),
            relief: table.relief(),
            total_tax_before_relief: itemised.total_tax_before_relief,
            entries: itemised.entries,
        };
        output.push('\n');
        output.push_str(&serde_json::to_string_pretty(&response)?);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn render(basic: &str, supplemental: &str, breakdown: bool) -> Result<String, String> {
        let config = ConfigLoader::load("./config/ke_2024").expect("Failed to load config");
        render_calculation(&config, dec(basic), dec(supplemental), breakdown)
            .map_err(|e| e.to_string())
    }

    #[test]
    fn test_render_reference_calculation() {
        let output = render("50000", "10000", false).unwrap();
        assert!(output.contains("\"net_amount\": \"44546.85"));
        assert!(!output.contains("total_tax_before_relief"));
    }

    #[test]
    fn test_render_with_breakdown() {
        let output = render("50000", "10000", true).unwrap();
        assert!(output.contains("total_tax_before_relief"));
        assert!(output.contains("amount_taxed_in_band"));
    }

    #[test]
    fn test_unrealistic_basic_amount_rejected() {
        let message = render("10000000.01", "0", false).unwrap_err();
        assert!(message.starts_with("VALIDATION_ERROR"));
        assert!(message.contains("realistic"));
    }

    #[test]
    fn test_negative_supplemental_amount_rejected() {
        let message = render("0", "-1", false).unwrap_err();
        assert!(message.contains("supplemental_amount"));
    }
}
