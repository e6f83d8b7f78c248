//! HTTP API module for the Deduction Engine.
//!
//! This module provides the REST API endpoints for computing deductions and
//! tax breakdowns against the loaded deduction schedule.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{BreakdownRequest, CalculationRequest, MAX_BASIC_AMOUNT};
pub use response::{ApiError, BreakdownResponse};
pub use state::AppState;
