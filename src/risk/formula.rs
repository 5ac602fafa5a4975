use crate::core::RiskValue;
use serde::{Deserialize, Serialize};

/// How a raw input value maps to a 0-100 sub-score.
///
/// The catalog stores one of a closed set of formula kinds, each carrying
/// its own typed configuration, instead of an opaque options blob.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FactorFormula {
    /// Banded numeric mapping: the sub-score of the highest threshold whose
    /// bound the value reaches. Values below every bound score 0.
    NumericThreshold { thresholds: Vec<Threshold> },
    /// Enumerated choices matched against text input (trimmed,
    /// case-insensitive); unmatched input falls back to `default_score`.
    EnumeratedChoice {
        choices: Vec<Choice>,
        #[serde(default)]
        default_score: f64,
    },
    /// Yes/no exposure, e.g. "union site" or "night work required".
    BooleanFlag {
        when_set: f64,
        #[serde(default)]
        when_clear: f64,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub at_least: f64,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub score: f64,
}

impl FactorFormula {
    /// Resolve a sub-score in [0, 100]. A missing or non-coercible input
    /// contributes the neutral score rather than halting evaluation.
    pub fn evaluate(&self, value: Option<&RiskValue>) -> f64 {
        let raw = match (self, value) {
            (_, None) => 0.0,
            (Self::NumericThreshold { thresholds }, Some(value)) => {
                match value.as_number() {
                    Some(v) => thresholds
                        .iter()
                        .filter(|t| v >= t.at_least)
                        .map(|t| t.score)
                        .fold(0.0, f64::max),
                    None => 0.0,
                }
            }
            (
                Self::EnumeratedChoice {
                    choices,
                    default_score,
                },
                Some(value),
            ) => match value {
                RiskValue::Text(s) => {
                    let needle = s.trim().to_lowercase();
                    choices
                        .iter()
                        .find(|c| c.label.trim().to_lowercase() == needle)
                        .map(|c| c.score)
                        .unwrap_or(*default_score)
                }
                _ => *default_score,
            },
            (
                Self::BooleanFlag {
                    when_set,
                    when_clear,
                },
                Some(value),
            ) => match value.as_flag() {
                Some(true) => *when_set,
                Some(false) => *when_clear,
                None => 0.0,
            },
        };
        clamp_score(raw)
    }
}

/// Clamp to [0, 100], collapsing any non-finite value to 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
