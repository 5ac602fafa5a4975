//! Weighted risk scoring over the contractor's category/factor catalog.
//!
//! Scoring never fails: missing inputs are neutral, weights that do not sum
//! to 100 are normalized, and an empty or inactive catalog produces a zero
//! score at the LOW level.

pub mod contingency;
pub mod formula;

pub use contingency::ContingencyAssessment;
pub use formula::{Choice, FactorFormula, Threshold};

use crate::config::PricingConfig;
use crate::core::{FactorScore, RiskFactorInput, RiskInputs, RiskLevel, RiskValue};
use im::Vector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One independently assessed contributor to project risk, owned by exactly
/// one category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    /// Contribution within the category, 0-100. Raw weights are normalized
    /// at evaluation time, so catalogs whose weights do not sum to 100
    /// still score correctly.
    pub weight: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
    pub formula: FactorFormula,
}

/// A weighted grouping of related risk factors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskCategory {
    pub name: String,
    /// Percentage contribution to the total score, 0-100; normalized across
    /// active categories at evaluation time.
    pub weight: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub factors: Vec<RiskFactor>,
}

fn default_active() -> bool {
    true
}

/// The scoring engine's output for one request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskScoringResult {
    /// Weighted aggregate, clamped to [0, 100].
    pub total_risk_score: f64,
    pub risk_level: RiskLevel,
    /// Fraction, e.g. 0.15 = 15%.
    pub contingency_rate: f64,
    pub contingency_explanation: String,
    pub mitigations: Vector<String>,
    /// Every evaluated factor, descending by score.
    pub factor_breakdown: Vector<FactorScore>,
}

impl RiskScoringResult {
    fn empty(config: &PricingConfig) -> Self {
        let assessment = contingency::assess(0.0, RiskLevel::Low, &Vector::new(), config);
        Self {
            total_risk_score: 0.0,
            risk_level: RiskLevel::Low,
            contingency_rate: assessment.rate,
            contingency_explanation: assessment.explanation,
            mitigations: assessment.mitigations,
            factor_breakdown: Vector::new(),
        }
    }
}

/// Score validated inputs against the catalog.
///
/// Inputs must already have passed validation; entries that nonetheless
/// fail to parse are treated as absent, which keeps the function total.
pub fn score(
    inputs: Option<&RiskInputs>,
    categories: &[RiskCategory],
    config: &PricingConfig,
) -> RiskScoringResult {
    let values = sanitized_values(inputs);

    let mut breakdown: Vec<FactorScore> = Vec::new();
    let mut category_scores: Vec<(f64, f64)> = Vec::new(); // (weight, score)

    for category in categories.iter().filter(|c| c.is_active) {
        let (category_score, factor_scores) = score_category(category, &values);
        breakdown.extend(factor_scores);
        category_scores.push((sanitize_weight(category.weight), category_score));
    }

    if category_scores.is_empty() {
        return RiskScoringResult::empty(config);
    }

    let total = formula::clamp_score(weighted_mean(&category_scores));
    let level = config.score_bands.classify(total);

    // Descending by score; ties break on name so identical requests always
    // produce identical breakdowns.
    breakdown.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    let breakdown = Vector::from(breakdown);

    let assessment = contingency::assess(total, level, &breakdown, config);
    log::debug!(
        "risk scoring: total={total:.1} level={level} rate={:.4}",
        assessment.rate
    );

    RiskScoringResult {
        total_risk_score: total,
        risk_level: level,
        contingency_rate: assessment.rate,
        contingency_explanation: assessment.explanation,
        mitigations: assessment.mitigations,
        factor_breakdown: breakdown,
    }
}

/// Evaluate one category: every active factor (zero-weight ones included,
/// for breakdown reporting) in sort order, then the weight-normalized
/// category score.
fn score_category(
    category: &RiskCategory,
    values: &BTreeMap<String, RiskValue>,
) -> (f64, Vec<FactorScore>) {
    let mut factors: Vec<&RiskFactor> = category.factors.iter().filter(|f| f.is_active).collect();
    factors.sort_by_key(|f| f.sort_order);

    let mut weighted: Vec<(f64, f64)> = Vec::new();
    let mut factor_scores = Vec::new();
    for factor in factors {
        let value = values.get(factor.name.trim());
        let sub_score = factor.formula.evaluate(value);
        factor_scores.push(FactorScore {
            name: factor.name.clone(),
            score: sub_score,
        });
        weighted.push((sanitize_weight(factor.weight), sub_score));
    }

    (weighted_mean(&weighted), factor_scores)
}

/// Normalized weighted mean: each entry's influence is its weight divided
/// by the sum of weights. A zero or fully degenerate weight total yields 0.
fn weighted_mean(entries: &[(f64, f64)]) -> f64 {
    let total_weight: f64 = entries.iter().map(|(w, _)| w).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    entries
        .iter()
        .map(|(w, s)| (w / total_weight) * s)
        .sum()
}

/// Out-of-contract weights are normalized defensively, never rejected.
fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

fn sanitized_values(inputs: Option<&RiskInputs>) -> BTreeMap<String, RiskValue> {
    inputs
        .map(|map| {
            map.iter()
                .filter_map(|(name, entry)| {
                    RiskFactorInput::from_entry(entry)
                        .map(|input| (name.trim().to_string(), input.value))
                })
                .collect()
        })
        .unwrap_or_default()
}
