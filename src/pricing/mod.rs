//! Pricing orchestrator: the engine's entry point.
//!
//! One request has exactly two terminal outcomes, selected solely by the
//! validator: the enhanced path (full risk scoring) or the legacy fallback
//! (a single scalar risk score rescaled to a contingency rate). Either way
//! the caller receives a complete priced result; nothing here aborts.

use crate::config::PricingConfig;
use crate::core::RiskInputs;
use crate::errors::PricingIssue;
use crate::market::{self, BenchmarkQuery, MarketAnalysisResult};
use crate::risk::{self, RiskCategory, RiskScoringResult};
use crate::validation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Project attributes that enable market benchmarking. Optional: their
/// absence simply skips the market analysis step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectAttributes {
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    pub cost_per_sf: f64,
    pub effective_date: NaiveDate,
}

/// A pricing request as handed over by the request boundary. The boundary
/// has already checked the outer shape (numeric ranges, required fields);
/// only `risk_factor_inputs` is still semi-trusted free-form content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub base_cost: f64,
    pub overhead_percentage: f64,
    pub profit_margin: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_factor_inputs: Option<RiskInputs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_attributes: Option<ProjectAttributes>,
    /// Legacy 0-10 scalar, used only on the fallback path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_risk_score: Option<f64>,
}

/// Which path produced the contingency rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContingencySource {
    Enhanced,
    LegacyFallback,
}

/// Audit breakdown of the final price. Amounts are rounded to cents;
/// each line is the increment its step added.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base_cost: f64,
    pub overhead_amount: f64,
    pub profit_amount: f64,
    pub contingency_amount: f64,
    pub contingency_rate: f64,
    pub contingency_source: ContingencySource,
}

/// The orchestrator's complete output for one request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnhancedCalculationResult {
    pub total_price: f64,
    pub breakdown: PriceBreakdown,
    pub warnings: Vec<String>,
    pub errors: Vec<PricingIssue>,
    pub fallback_used: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_scoring: Option<RiskScoringResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_analysis: Option<MarketAnalysisResult>,
}

/// Price a proposal. Pure and total: identical arguments yield identical
/// output, and no input that passed the boundary schema can make this
/// fail — adversarial risk inputs degrade to the legacy fallback instead.
pub fn price_proposal(
    request: &ProposalRequest,
    catalog: &[RiskCategory],
    market_data: &[market::MarketDataPoint],
    config: &PricingConfig,
) -> EnhancedCalculationResult {
    let outcome = validation::validate(request.risk_factor_inputs.as_ref(), &config.validation);
    let mut warnings = outcome.warnings.clone();
    let mut errors: Vec<PricingIssue> = Vec::new();

    let (risk_scoring, contingency_rate, market_risk_score, source) = if outcome.is_valid {
        let scoring = risk::score(request.risk_factor_inputs.as_ref(), catalog, config);
        let rate = scoring.contingency_rate;
        let total = scoring.total_risk_score;
        (Some(scoring), rate, total, ContingencySource::Enhanced)
    } else {
        log::warn!(
            "falling back to legacy risk pricing: {} validation error(s)",
            outcome.errors.len()
        );
        errors.push(PricingIssue::validation(outcome.errors));
        let legacy_score = match request.legacy_risk_score {
            Some(score) if score.is_finite() => score.clamp(0.0, 10.0),
            _ => {
                errors.push(PricingIssue::missing_legacy_score(
                    config.legacy.default_risk_score,
                ));
                config.legacy.default_risk_score
            }
        };
        let rate = legacy_score * config.legacy.rate_per_point;
        // The legacy scalar is 0-10; the market model expects 0-100.
        (None, rate, legacy_score * 10.0, ContingencySource::LegacyFallback)
    };

    let market_analysis = request.project_attributes.as_ref().map(|attributes| {
        let query = BenchmarkQuery {
            region: attributes.region.clone(),
            project_type: attributes.project_type.clone(),
            cost_per_sf: attributes.cost_per_sf,
            effective_date: attributes.effective_date,
        };
        let analysis =
            market::analyze_market(&query, market_data, market_risk_score, &config.market);
        if analysis.cost_benchmark.insufficient_data {
            warnings.push(
                PricingIssue::insufficient_market_data(
                    analysis.cost_benchmark.comparable_count,
                    config.market.min_comparables,
                )
                .to_string(),
            );
        }
        analysis
    });

    let (total_price, breakdown) = compute_price(request, contingency_rate, source);

    EnhancedCalculationResult {
        total_price,
        breakdown,
        warnings,
        errors,
        fallback_used: source == ContingencySource::LegacyFallback,
        risk_scoring,
        market_analysis,
    }
}

/// total = base x (1 + overhead%) x (1 + profit%) x (1 + contingency).
///
/// The boundary contract already bounds the percentages to [0, 100]; they
/// are clamped again here so a misbehaving caller cannot produce negative
/// or runaway markups.
fn compute_price(
    request: &ProposalRequest,
    contingency_rate: f64,
    source: ContingencySource,
) -> (f64, PriceBreakdown) {
    let base = sanitize_money(request.base_cost);
    let overhead_pct = sanitize_percentage(request.overhead_percentage);
    let profit_pct = sanitize_percentage(request.profit_margin);
    let rate = if contingency_rate.is_finite() {
        contingency_rate.max(0.0)
    } else {
        0.0
    };

    let with_overhead = base * (1.0 + overhead_pct / 100.0);
    let with_profit = with_overhead * (1.0 + profit_pct / 100.0);
    let total = with_profit * (1.0 + rate);

    let breakdown = PriceBreakdown {
        base_cost: round_cents(base),
        overhead_amount: round_cents(with_overhead - base),
        profit_amount: round_cents(with_profit - with_overhead),
        contingency_amount: round_cents(total - with_profit),
        contingency_rate: rate,
        contingency_source: source,
    };
    (round_cents(total), breakdown)
}

fn sanitize_money(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

fn sanitize_percentage(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Reproducible money rounding: half-away-from-zero to cents.
fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
