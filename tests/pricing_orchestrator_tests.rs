use chrono::NaiveDate;
use glazebid::*;
use serde_json::json;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn glazing_catalog() -> Vec<RiskCategory> {
    vec![
        RiskCategory {
            name: "Site Conditions".to_string(),
            weight: 60.0,
            is_active: true,
            factors: vec![
                RiskFactor {
                    name: "Weather".to_string(),
                    weight: 60.0,
                    is_active: true,
                    sort_order: 0,
                    formula: FactorFormula::NumericThreshold {
                        thresholds: vec![
                            Threshold {
                                at_least: 25.0,
                                score: 30.0,
                            },
                            Threshold {
                                at_least: 50.0,
                                score: 60.0,
                            },
                            Threshold {
                                at_least: 75.0,
                                score: 90.0,
                            },
                        ],
                    },
                },
                RiskFactor {
                    name: "Access".to_string(),
                    weight: 40.0,
                    is_active: true,
                    sort_order: 1,
                    formula: FactorFormula::EnumeratedChoice {
                        choices: vec![
                            Choice {
                                label: "ground level".to_string(),
                                score: 10.0,
                            },
                            Choice {
                                label: "swing stage".to_string(),
                                score: 70.0,
                            },
                        ],
                        default_score: 30.0,
                    },
                },
            ],
        },
        RiskCategory {
            name: "Commercial".to_string(),
            weight: 40.0,
            is_active: true,
            factors: vec![RiskFactor {
                name: "Union Site".to_string(),
                weight: 100.0,
                is_active: true,
                sort_order: 0,
                formula: FactorFormula::BooleanFlag {
                    when_set: 50.0,
                    when_clear: 10.0,
                },
            }],
        },
    ]
}

fn market_history() -> Vec<MarketDataPoint> {
    vec![
        MarketDataPoint {
            region: "Northeast".to_string(),
            value: 85.0,
            effective_date: date(2025, 4, 10),
            project_notes: "curtain wall, 6 floors".to_string(),
        },
        MarketDataPoint {
            region: "Northeast".to_string(),
            value: 92.0,
            effective_date: date(2025, 2, 20),
            project_notes: "curtain wall office".to_string(),
        },
        MarketDataPoint {
            region: "Northeast".to_string(),
            value: 101.0,
            effective_date: date(2024, 11, 2),
            project_notes: "storefront strip mall".to_string(),
        },
        MarketDataPoint {
            region: "Southeast".to_string(),
            value: 72.0,
            effective_date: date(2025, 3, 1),
            project_notes: "storefront".to_string(),
        },
    ]
}

/// Spec scenario: malicious "Labor" input forces the legacy fallback, and
/// the price reflects the legacy score, not the 85-valued "Weather" factor.
#[test]
fn malicious_input_prices_via_legacy_fallback() {
    let request = ProposalRequest {
        base_cost: 10000.0,
        overhead_percentage: 15.0,
        profit_margin: 20.0,
        risk_factor_inputs: Some(
            [
                ("Weather".to_string(), json!({"value": 85.0})),
                (
                    "Labor".to_string(),
                    json!({"value": "<script>alert(1)</script>"}),
                ),
            ]
            .into_iter()
            .collect(),
        ),
        project_attributes: None,
        legacy_risk_score: Some(3.0),
    };
    let config = PricingConfig::default();
    let result = price_proposal(&request, &glazing_catalog(), &[], &config);

    assert!(result.fallback_used);
    assert!(result.risk_scoring.is_none());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, IssueCode::ValidationError);
    assert_eq!(result.errors[0].details.len(), 1);
    assert!(result.errors[0].details[0].contains("Labor"));

    let expected_rate = 3.0 * config.legacy.rate_per_point;
    assert!((result.breakdown.contingency_rate - expected_rate).abs() < 1e-12);
    let expected_total = 10000.0 * 1.15 * 1.20 * (1.0 + expected_rate);
    assert!((result.total_price - (expected_total * 100.0).round() / 100.0).abs() < 1e-9);
}

/// Spec scenario: empty risk inputs, no markups, price equals base cost.
#[test]
fn empty_inputs_zero_markups_price_equals_base() {
    let request = ProposalRequest {
        base_cost: 1000.0,
        overhead_percentage: 0.0,
        profit_margin: 0.0,
        risk_factor_inputs: Some(RiskInputs::new()),
        project_attributes: None,
        legacy_risk_score: None,
    };
    let result = price_proposal(&request, &glazing_catalog(), &[], &PricingConfig::default());
    assert_eq!(result.total_price, 1000.0);
    assert!(!result.fallback_used);
    let scoring = result.risk_scoring.unwrap();
    assert_eq!(scoring.total_risk_score, 0.0);
    assert_eq!(scoring.contingency_rate, 0.0);
    assert_eq!(scoring.risk_level, RiskLevel::Low);
}

#[test]
fn enhanced_path_end_to_end_with_market_analysis() {
    let request = ProposalRequest {
        base_cost: 250000.0,
        overhead_percentage: 12.0,
        profit_margin: 18.0,
        risk_factor_inputs: Some(
            [
                ("Weather".to_string(), json!({"value": 80.0})),
                ("Access".to_string(), json!({"value": "swing stage"})),
                ("Union Site".to_string(), json!({"value": true})),
            ]
            .into_iter()
            .collect(),
        ),
        project_attributes: Some(ProjectAttributes {
            region: "Northeast".to_string(),
            project_type: Some("curtain wall".to_string()),
            cost_per_sf: 95.0,
            effective_date: date(2025, 6, 1),
        }),
        legacy_risk_score: None,
    };
    let result = price_proposal(
        &request,
        &glazing_catalog(),
        &market_history(),
        &PricingConfig::default(),
    );

    assert!(!result.fallback_used);
    assert!(result.errors.is_empty());
    let scoring = result.risk_scoring.as_ref().unwrap();
    // Site: 0.6*90 + 0.4*70 = 82; Commercial: 50; total 0.6*82 + 0.4*50.
    assert!((scoring.total_risk_score - 69.2).abs() < 1e-9);
    assert_eq!(scoring.risk_level, RiskLevel::High);
    assert_eq!(scoring.factor_breakdown[0].name, "Weather");

    let market = result.market_analysis.as_ref().unwrap();
    assert_eq!(market.cost_benchmark.comparable_count, 2);
    assert!((0.0..=1.0).contains(&market.win_probability));

    // Price must carry the enhanced contingency.
    assert_eq!(
        result.breakdown.contingency_source,
        ContingencySource::Enhanced
    );
    let expected =
        250000.0 * 1.12 * 1.18 * (1.0 + scoring.contingency_rate);
    assert!((result.total_price - (expected * 100.0).round() / 100.0).abs() < 1e-9);
}

#[test]
fn warnings_flow_through_without_blocking_enhanced_path() {
    let request = ProposalRequest {
        base_cost: 5000.0,
        overhead_percentage: 10.0,
        profit_margin: 10.0,
        risk_factor_inputs: Some(
            [
                ("Weather".to_string(), json!({"value": -12.0})),
                ("weather".to_string(), json!({"value": 2500.0})),
            ]
            .into_iter()
            .collect(),
        ),
        project_attributes: None,
        legacy_risk_score: None,
    };
    let result = price_proposal(&request, &glazing_catalog(), &[], &PricingConfig::default());
    assert!(!result.fallback_used, "warnings must not trigger fallback");
    assert!(result.risk_scoring.is_some());
    // Negative value, extreme value, and the duplicate-name collision.
    assert_eq!(result.warnings.len(), 3);
}

#[test]
fn missing_market_comparables_is_a_warning_not_an_error() {
    let request = ProposalRequest {
        base_cost: 1000.0,
        overhead_percentage: 0.0,
        profit_margin: 0.0,
        risk_factor_inputs: None,
        project_attributes: Some(ProjectAttributes {
            region: "Alaska".to_string(),
            project_type: None,
            cost_per_sf: 140.0,
            effective_date: date(2025, 6, 1),
        }),
        legacy_risk_score: None,
    };
    let result = price_proposal(
        &request,
        &glazing_catalog(),
        &market_history(),
        &PricingConfig::default(),
    );
    assert!(result.errors.is_empty());
    assert!(!result.fallback_used);
    let market = result.market_analysis.as_ref().unwrap();
    assert!(market.cost_benchmark.insufficient_data);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.contains("INSUFFICIENT_MARKET_DATA")));
}

#[test]
fn serialized_result_is_stable_across_identical_calls() {
    let request = ProposalRequest {
        base_cost: 42000.0,
        overhead_percentage: 8.0,
        profit_margin: 14.0,
        risk_factor_inputs: Some(
            [("Weather".to_string(), json!({"value": 55.0}))]
                .into_iter()
                .collect(),
        ),
        project_attributes: Some(ProjectAttributes {
            region: "Northeast".to_string(),
            project_type: None,
            cost_per_sf: 88.0,
            effective_date: date(2025, 6, 1),
        }),
        legacy_risk_score: Some(5.0),
    };
    let catalog = glazing_catalog();
    let history = market_history();
    let config = PricingConfig::default();
    let a = price_proposal(&request, &catalog, &history, &config);
    let b = price_proposal(&request, &catalog, &history, &config);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}
