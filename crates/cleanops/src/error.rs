use crate::config::ConfigError;
use crate::pricing::{PricingConfigError, QuoteError, TierImportError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Quote(QuoteError),
    RateCard(PricingConfigError),
    TierImport(TierImportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {err}"),
            AppError::Telemetry(err) => write!(f, "telemetry error: {err}"),
            AppError::Io(err) => write!(f, "io error: {err}"),
            AppError::Server(err) => write!(f, "server error: {err}"),
            AppError::Quote(err) => write!(f, "quote error: {err}"),
            AppError::RateCard(err) => write!(f, "rate card error: {err}"),
            AppError::TierImport(err) => write!(f, "tier import error: {err}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Quote(err) => Some(err),
            AppError::RateCard(err) => Some(err),
            AppError::TierImport(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Quote(err) if err.is_validation() => StatusCode::BAD_REQUEST,
            AppError::TierImport(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<QuoteError> for AppError {
    fn from(value: QuoteError) -> Self {
        Self::Quote(value)
    }
}

impl From<PricingConfigError> for AppError {
    fn from(value: PricingConfigError) -> Self {
        Self::RateCard(value)
    }
}

impl From<TierImportError> for AppError {
    fn from(value: TierImportError) -> Self {
        Self::TierImport(value)
    }
}
