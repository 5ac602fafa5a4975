// Export modules for library usage
pub mod config;
pub mod core;
pub mod errors;
pub mod market;
pub mod pricing;
pub mod risk;
pub mod validation;

// Re-export commonly used types
pub use crate::config::{
    ContingencyBands, LegacyModel, MarketModel, NumericPolicy, PricingConfig, RateBand,
    ScoreBands, ValidationPolicy,
};

pub use crate::core::{
    FactorScore, RiskFactorInput, RiskInputs, RiskLevel, RiskValue, ValidationOutcome,
};

pub use crate::errors::{IssueCode, PricingIssue};

pub use crate::market::{
    analyze_market, benchmark_project_cost, calculate_win_probability, BenchmarkQuery,
    CostBenchmark, MarketAnalysisResult, MarketDataPoint, WinProbabilityInputs,
};

pub use crate::pricing::{
    price_proposal, ContingencySource, EnhancedCalculationResult, PriceBreakdown,
    ProjectAttributes, ProposalRequest,
};

pub use crate::risk::{
    score, Choice, ContingencyAssessment, FactorFormula, RiskCategory, RiskFactor,
    RiskScoringResult, Threshold,
};

pub use crate::validation::validate;
