//! Machine-readable issue tags attached to pricing results.
//!
//! The engine never aborts a pricing request for bad risk input; it records
//! what went wrong as `PricingIssue` entries on the result so the boundary
//! can report every problem at once.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable codes the request boundary can dispatch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    /// Risk-factor inputs failed content validation; legacy fallback used.
    ValidationError,
    /// Fallback path taken without a caller-supplied legacy risk score.
    MissingLegacyScore,
    /// Market benchmarking ran with too few comparable data points.
    InsufficientMarketData,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::MissingLegacyScore => "MISSING_LEGACY_SCORE",
            Self::InsufficientMarketData => "INSUFFICIENT_MARKET_DATA",
        }
    }
}

/// One recorded problem: a stable code, a human-readable summary, and the
/// detailed findings that triggered it (e.g. the full validation error
/// list).
#[derive(Clone, Debug, PartialEq, Error, Serialize, Deserialize)]
#[error("{}: {message}", .code.as_str())]
pub struct PricingIssue {
    pub code: IssueCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl PricingIssue {
    pub fn validation(details: Vec<String>) -> Self {
        Self {
            code: IssueCode::ValidationError,
            message: format!(
                "risk factor inputs failed validation ({} error{})",
                details.len(),
                if details.len() == 1 { "" } else { "s" }
            ),
            details,
        }
    }

    pub fn missing_legacy_score(defaulted_to: f64) -> Self {
        Self {
            code: IssueCode::MissingLegacyScore,
            message: format!(
                "no legacy risk score supplied; defaulted to {defaulted_to:.1}"
            ),
            details: Vec::new(),
        }
    }

    pub fn insufficient_market_data(comparable_count: usize, needed: usize) -> Self {
        Self {
            code: IssueCode::InsufficientMarketData,
            message: format!(
                "only {comparable_count} comparable market data point(s) found, {needed} needed"
            ),
            details: Vec::new(),
        }
    }
}
