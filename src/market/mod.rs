//! Market benchmarking and win-probability estimation.
//!
//! Both entry points are pure functions over a caller-supplied snapshot of
//! historical cost-per-square-foot data points; nothing is cached between
//! requests. Zero comparable data is a flagged best-effort result, never a
//! failure.

use crate::config::MarketModel;
use chrono::NaiveDate;
use im::Vector;
use serde::{Deserialize, Serialize};

/// One historical cost observation from the market-data provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketDataPoint {
    pub region: String,
    /// Cost per square foot.
    pub value: f64,
    pub effective_date: NaiveDate,
    /// Free-text notes; project-type filtering is a substring match here.
    #[serde(default)]
    pub project_notes: String,
}

/// What to benchmark: a proposed cost in a region at a point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkQuery {
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    pub cost_per_sf: f64,
    pub effective_date: NaiveDate,
}

/// Percentile placement of a proposed cost among comparable history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostBenchmark {
    /// 0-100 rank of the proposed cost; 50 when no comparables exist.
    pub percentile: f64,
    pub comparable_count: usize,
    pub median_cost: f64,
    pub mean_cost: f64,
    pub low_cost: f64,
    pub high_cost: f64,
    /// Set when fewer comparables than the model minimum were found.
    pub insufficient_data: bool,
}

/// Inputs to the win-probability model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WinProbabilityInputs {
    pub cost_per_sf: f64,
    /// Total risk score, 0-100.
    pub risk_score: f64,
    /// Market percentile of the proposed cost, 0-100.
    pub market_percentile: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// The composite market picture the orchestrator attaches to a priced
/// result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysisResult {
    /// Signed fraction: recent-half median cost vs older-half median.
    pub material_cost_trend: f64,
    /// 0-100; lower means tighter labor. Modeled from market heat until a
    /// dedicated labor feed exists.
    pub labor_availability_index: f64,
    /// Signed fraction: regional median cost relative to the whole dataset.
    pub regional_adjustment: f64,
    /// 0-100 composite; higher means a hotter (costlier) market.
    pub market_condition_score: f64,
    pub cost_benchmark: CostBenchmark,
    /// Clamped to [0, 1].
    pub win_probability: f64,
    pub notes: Vector<String>,
}

/// Rank a proposed cost among comparable historical points.
///
/// Comparables match the query region exactly (trimmed, case-insensitive),
/// contain the project type in their free-text notes when one is given,
/// and fall inside the recency window ending at the query's effective
/// date. Points dated after the effective date are excluded: a benchmark
/// must not see the future.
pub fn benchmark_project_cost(
    query: &BenchmarkQuery,
    points: &[MarketDataPoint],
    model: &MarketModel,
) -> CostBenchmark {
    let mut values: Vec<f64> = points
        .iter()
        .filter(|p| is_comparable(query, p, model))
        .map(|p| p.value)
        .collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    if values.is_empty() {
        log::debug!(
            "no comparable market data for region '{}' ({} points supplied)",
            query.region,
            points.len()
        );
        return CostBenchmark {
            percentile: 50.0,
            comparable_count: 0,
            median_cost: 0.0,
            mean_cost: 0.0,
            low_cost: 0.0,
            high_cost: 0.0,
            insufficient_data: true,
        };
    }

    let cost = if query.cost_per_sf.is_finite() {
        query.cost_per_sf
    } else {
        0.0
    };
    CostBenchmark {
        percentile: mid_rank_percentile(cost, &values),
        comparable_count: values.len(),
        median_cost: median(&values),
        mean_cost: values.iter().sum::<f64>() / values.len() as f64,
        low_cost: values[0],
        high_cost: values[values.len() - 1],
        insufficient_data: values.len() < model.min_comparables,
    }
}

/// Modeled likelihood the proposal is accepted, always in [0, 1].
///
/// Monotone non-increasing in the market percentile (pricing above market
/// lowers win odds) and in the risk score (risk-laden work signals pricier
/// bids). Total over every finite input; non-finite inputs read as
/// mid-scale neutral.
pub fn calculate_win_probability(inputs: &WinProbabilityInputs, model: &MarketModel) -> f64 {
    let percentile = neutral_clamp(inputs.market_percentile, 0.0, 100.0, 50.0);
    let risk = neutral_clamp(inputs.risk_score, 0.0, 100.0, 50.0);

    let logit = -(percentile - 50.0) * model.percentile_slope - (risk - 50.0) * model.risk_slope;
    let probability = 1.0 / (1.0 + (-logit).exp());
    probability.clamp(0.0, 1.0)
}

/// Full market picture for one request: benchmark, win probability, cost
/// trend, regional adjustment, and the derived indices.
pub fn analyze_market(
    query: &BenchmarkQuery,
    points: &[MarketDataPoint],
    risk_score: f64,
    model: &MarketModel,
) -> MarketAnalysisResult {
    let benchmark = benchmark_project_cost(query, points, model);
    let win_probability = calculate_win_probability(
        &WinProbabilityInputs {
            cost_per_sf: query.cost_per_sf,
            risk_score,
            market_percentile: benchmark.percentile,
            project_type: query.project_type.clone(),
            region: Some(query.region.clone()),
        },
        model,
    );

    let mut notes = Vector::new();
    let regional: Vec<&MarketDataPoint> = points
        .iter()
        .filter(|p| region_matches(&query.region, &p.region) && in_window(query, p, model))
        .collect();

    let material_cost_trend = cost_trend(query, &regional, model, &mut notes);
    let regional_adjustment = regional_adjustment(points, &regional, &mut notes);

    // Heuristic until a labor feed exists: hot markets (rising costs,
    // above-average region) mean scarce crews.
    let labor_availability_index =
        (50.0 - material_cost_trend * 100.0 - regional_adjustment * 50.0).clamp(0.0, 100.0);
    let market_condition_score =
        (50.0 + material_cost_trend * 150.0 + regional_adjustment * 100.0).clamp(0.0, 100.0);

    if benchmark.insufficient_data {
        notes.push_back(format!(
            "insufficient comparable data: {} point(s) within {} days for region '{}'",
            benchmark.comparable_count, model.recency_window_days, query.region
        ));
    } else {
        notes.push_back(format!(
            "benchmarked against {} comparable point(s); proposed cost sits at the {:.0}th percentile",
            benchmark.comparable_count, benchmark.percentile
        ));
    }

    MarketAnalysisResult {
        material_cost_trend,
        labor_availability_index,
        regional_adjustment,
        market_condition_score,
        cost_benchmark: benchmark,
        win_probability,
        notes,
    }
}

fn is_comparable(query: &BenchmarkQuery, point: &MarketDataPoint, model: &MarketModel) -> bool {
    if !point.value.is_finite() || point.value <= 0.0 {
        return false;
    }
    if !region_matches(&query.region, &point.region) || !in_window(query, point, model) {
        return false;
    }
    match query.project_type.as_deref().map(str::trim) {
        Some(project_type) if !project_type.is_empty() => point
            .project_notes
            .to_lowercase()
            .contains(&project_type.to_lowercase()),
        _ => true,
    }
}

fn region_matches(query_region: &str, point_region: &str) -> bool {
    query_region.trim().eq_ignore_ascii_case(point_region.trim())
}

fn in_window(query: &BenchmarkQuery, point: &MarketDataPoint, model: &MarketModel) -> bool {
    let age_days = (query.effective_date - point.effective_date).num_days();
    (0..=model.recency_window_days).contains(&age_days)
}

/// Mid-rank percentile: points strictly below count fully, equal points
/// count half, so a cost equal to the whole sample lands at 50.
fn mid_rank_percentile(cost: f64, sorted_values: &[f64]) -> f64 {
    let below = sorted_values.iter().filter(|&&v| v < cost).count() as f64;
    let equal = sorted_values.iter().filter(|&&v| v == cost).count() as f64;
    ((below + 0.5 * equal) / sorted_values.len() as f64 * 100.0).clamp(0.0, 100.0)
}

fn median(sorted_values: &[f64]) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted_values[n / 2]
    } else {
        (sorted_values[n / 2 - 1] + sorted_values[n / 2]) / 2.0
    }
}

/// Median cost change between the older and recent halves of the window.
fn cost_trend(
    query: &BenchmarkQuery,
    regional: &[&MarketDataPoint],
    model: &MarketModel,
    notes: &mut Vector<String>,
) -> f64 {
    let midpoint = query.effective_date - chrono::Duration::days(model.recency_window_days / 2);
    let mut older: Vec<f64> = Vec::new();
    let mut recent: Vec<f64> = Vec::new();
    for point in regional {
        if point.effective_date < midpoint {
            older.push(point.value);
        } else {
            recent.push(point.value);
        }
    }
    older.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    recent.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let older_median = median(&older);
    if older.is_empty() || recent.is_empty() || older_median <= 0.0 {
        notes.push_back("cost trend unavailable: too little dated history in window".to_string());
        return 0.0;
    }
    ((median(&recent) - older_median) / older_median).clamp(-1.0, 1.0)
}

/// Regional median relative to the full dataset's median, as a signed
/// fraction clamped to ±50%.
fn regional_adjustment(
    all_points: &[MarketDataPoint],
    regional: &[&MarketDataPoint],
    notes: &mut Vector<String>,
) -> f64 {
    let mut global: Vec<f64> = all_points
        .iter()
        .map(|p| p.value)
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    global.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mut region: Vec<f64> = regional
        .iter()
        .map(|p| p.value)
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    region.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let global_median = median(&global);
    if region.is_empty() || global_median <= 0.0 {
        notes.push_back("regional adjustment unavailable: no regional history".to_string());
        return 0.0;
    }
    ((median(&region) - global_median) / global_median).clamp(-0.5, 0.5)
}

fn neutral_clamp(value: f64, min: f64, max: f64, neutral: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        neutral
    }
}
