use crate::core::RiskLevel;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Score-band boundaries for risk-level classification.
///
/// A total risk score in [0, medium_floor) is LOW, [medium_floor,
/// high_floor) MEDIUM, [high_floor, severe_floor) HIGH, and everything at
/// or above severe_floor is SEVERE.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreBands {
    #[serde(default = "default_medium_floor")]
    pub medium_floor: f64,
    #[serde(default = "default_high_floor")]
    pub high_floor: f64,
    #[serde(default = "default_severe_floor")]
    pub severe_floor: f64,
}

fn default_medium_floor() -> f64 {
    25.0
}

fn default_high_floor() -> f64 {
    50.0
}

fn default_severe_floor() -> f64 {
    75.0
}

impl Default for ScoreBands {
    fn default() -> Self {
        Self {
            medium_floor: default_medium_floor(),
            high_floor: default_high_floor(),
            severe_floor: default_severe_floor(),
        }
    }
}

impl ScoreBands {
    pub fn classify(&self, score: f64) -> RiskLevel {
        if score >= self.severe_floor {
            RiskLevel::Severe
        } else if score >= self.high_floor {
            RiskLevel::High
        } else if score >= self.medium_floor {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// The score range a level occupies, used for within-band interpolation.
    pub fn band_range(&self, level: RiskLevel) -> (f64, f64) {
        match level {
            RiskLevel::Low => (0.0, self.medium_floor),
            RiskLevel::Medium => (self.medium_floor, self.high_floor),
            RiskLevel::High => (self.high_floor, self.severe_floor),
            RiskLevel::Severe => (self.severe_floor, 100.0),
        }
    }

    fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !(0.0 < self.medium_floor && self.medium_floor < self.high_floor) {
            problems.push("score bands: medium_floor must be in (0, high_floor)".to_string());
        }
        if !(self.high_floor < self.severe_floor && self.severe_floor < 100.0) {
            problems
                .push("score bands: high_floor < severe_floor < 100 must hold".to_string());
        }
        problems
    }
}

/// Contingency rate range for one risk level, as fractions of the marked-up
/// cost (0.05 = 5%).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateBand {
    pub floor: f64,
    pub ceiling: f64,
}

/// Monotone banded contingency mapping: each risk level owns a rate band,
/// and the score's position within its score band interpolates linearly
/// between the band's floor and ceiling rates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContingencyBands {
    #[serde(default = "default_low_band")]
    pub low: RateBand,
    #[serde(default = "default_medium_band")]
    pub medium: RateBand,
    #[serde(default = "default_high_band")]
    pub high: RateBand,
    #[serde(default = "default_severe_band")]
    pub severe: RateBand,
}

fn default_low_band() -> RateBand {
    RateBand {
        floor: 0.0,
        ceiling: 0.05,
    }
}

fn default_medium_band() -> RateBand {
    RateBand {
        floor: 0.05,
        ceiling: 0.10,
    }
}

fn default_high_band() -> RateBand {
    RateBand {
        floor: 0.10,
        ceiling: 0.175,
    }
}

fn default_severe_band() -> RateBand {
    RateBand {
        floor: 0.175,
        ceiling: 0.25,
    }
}

impl Default for ContingencyBands {
    fn default() -> Self {
        Self {
            low: default_low_band(),
            medium: default_medium_band(),
            high: default_high_band(),
            severe: default_severe_band(),
        }
    }
}

impl ContingencyBands {
    pub fn band(&self, level: RiskLevel) -> RateBand {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
            RiskLevel::Severe => self.severe,
        }
    }

    fn validate(&self) -> Vec<String> {
        let ordered = [self.low, self.medium, self.high, self.severe];
        let mut problems = Vec::new();
        for band in &ordered {
            if band.floor < 0.0 || band.ceiling < band.floor {
                problems.push("contingency bands: each band needs 0 <= floor <= ceiling".to_string());
                break;
            }
        }
        for pair in ordered.windows(2) {
            if pair[1].floor < pair[0].ceiling {
                problems.push(
                    "contingency bands: bands must be non-decreasing across risk levels"
                        .to_string(),
                );
                break;
            }
        }
        problems
    }
}

/// How the validator treats a suspicious-but-representable numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericPolicy {
    /// Accept silently.
    Allow,
    /// Accept but record a warning.
    Warn,
    /// Record an error (blocks the enhanced path).
    Reject,
}

/// Validator policy knobs. Negative and extreme magnitudes default to
/// warnings; whether negative risk values are ever semantically valid is a
/// data-maintenance question, so the policy stays configurable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValidationPolicy {
    #[serde(default = "default_negative_policy")]
    pub negative_values: NumericPolicy,
    #[serde(default = "default_extreme_policy")]
    pub extreme_values: NumericPolicy,
    #[serde(default = "default_extreme_magnitude")]
    pub extreme_magnitude: f64,
    #[serde(default = "default_max_string_len")]
    pub max_string_len: usize,
    #[serde(default = "default_max_notes_len")]
    pub max_notes_len: usize,
}

fn default_negative_policy() -> NumericPolicy {
    NumericPolicy::Warn
}

fn default_extreme_policy() -> NumericPolicy {
    NumericPolicy::Warn
}

fn default_extreme_magnitude() -> f64 {
    1000.0
}

fn default_max_string_len() -> usize {
    1000
}

fn default_max_notes_len() -> usize {
    2000
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            negative_values: default_negative_policy(),
            extreme_values: default_extreme_policy(),
            extreme_magnitude: default_extreme_magnitude(),
            max_string_len: default_max_string_len(),
            max_notes_len: default_max_notes_len(),
        }
    }
}

/// Coefficients of the win-probability and market-condition models.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MarketModel {
    /// Logistic slope per percentile point above the market median.
    #[serde(default = "default_percentile_slope")]
    pub percentile_slope: f64,
    /// Logistic slope per risk-score point above mid-scale.
    #[serde(default = "default_risk_slope")]
    pub risk_slope: f64,
    /// Comparable points must fall within this many days before the query's
    /// effective date.
    #[serde(default = "default_recency_window_days")]
    pub recency_window_days: i64,
    /// Comparables needed before the benchmark stops flagging itself as
    /// insufficient.
    #[serde(default = "default_min_comparables")]
    pub min_comparables: usize,
}

fn default_percentile_slope() -> f64 {
    0.06
}

fn default_risk_slope() -> f64 {
    0.03
}

fn default_recency_window_days() -> i64 {
    365
}

fn default_min_comparables() -> usize {
    3
}

impl Default for MarketModel {
    fn default() -> Self {
        Self {
            percentile_slope: default_percentile_slope(),
            risk_slope: default_risk_slope(),
            recency_window_days: default_recency_window_days(),
            min_comparables: default_min_comparables(),
        }
    }
}

/// Legacy fallback path constants: a 0-10 scalar risk score rescaled to a
/// contingency rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LegacyModel {
    #[serde(default = "default_legacy_rate_per_point")]
    pub rate_per_point: f64,
    /// Used when the fallback path is taken but no legacy score was sent.
    #[serde(default = "default_legacy_risk_score")]
    pub default_risk_score: f64,
}

fn default_legacy_rate_per_point() -> f64 {
    0.015
}

fn default_legacy_risk_score() -> f64 {
    5.0
}

impl Default for LegacyModel {
    fn default() -> Self {
        Self {
            rate_per_point: default_legacy_rate_per_point(),
            default_risk_score: default_legacy_risk_score(),
        }
    }
}

/// Full engine configuration. Supplied per call alongside the catalog and
/// market snapshot; the engine keeps no global state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default)]
    pub score_bands: ScoreBands,
    #[serde(default)]
    pub contingency: ContingencyBands,
    #[serde(default)]
    pub validation: ValidationPolicy,
    #[serde(default)]
    pub market: MarketModel,
    #[serde(default)]
    pub legacy: LegacyModel,
}

impl PricingConfig {
    /// Collect every configuration problem instead of stopping at the
    /// first, so an operator can fix a config file in one pass.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = self.score_bands.validate();
        problems.extend(self.contingency.validate());
        if self.market.recency_window_days <= 0 {
            problems.push("market: recency_window_days must be positive".to_string());
        }
        if self.legacy.rate_per_point < 0.0 {
            problems.push("legacy: rate_per_point must be non-negative".to_string());
        }
        if !(0.0..=10.0).contains(&self.legacy.default_risk_score) {
            problems.push("legacy: default_risk_score must be within 0-10".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content).context("failed to parse pricing config")?;
        if let Err(problems) = config.validate() {
            anyhow::bail!("invalid pricing config: {}", problems.join("; "));
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
    }
}
