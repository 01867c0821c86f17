//! Error types for the agro weather server

use rmcp::ErrorData as McpError;
use thiserror::Error;

/// Errors surfaced to the MCP caller.
///
/// Aggregation, GDD and advisory evaluation never produce these for
/// data-shape problems; partial forecasts resolve to partial reports.
#[derive(Error, Debug)]
pub enum AgroError {
    #[error("Forecast source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Forecast payload is not valid JSON: {0}")]
    InvalidPayload(String),

    #[error("Unknown month '{0}', expected a full English month name such as 'March'")]
    UnknownMonth(String),

    #[error("Unknown crop '{0}', use list_crops to see the supported crops")]
    UnknownCrop(String),

    #[error("OpenWeatherMap API key is not configured (set AGRO__OPENWEATHERMAP__API_KEY)")]
    MissingApiKey,
}

pub type AgroResult<T> = Result<T, AgroError>;

impl From<reqwest::Error> for AgroError {
    fn from(err: reqwest::Error) -> Self {
        AgroError::SourceUnavailable(err.to_string())
    }
}

impl From<AgroError> for McpError {
    fn from(err: AgroError) -> Self {
        match err {
            AgroError::UnknownMonth(_) | AgroError::UnknownCrop(_) => {
                McpError::invalid_params(err.to_string(), None)
            }
            AgroError::SourceUnavailable(_)
            | AgroError::InvalidPayload(_)
            | AgroError::MissingApiKey => McpError::internal_error(err.to_string(), None),
        }
    }
}
