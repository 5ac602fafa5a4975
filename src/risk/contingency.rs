use crate::config::PricingConfig;
use crate::core::{FactorScore, RiskLevel};
use im::Vector;
use serde::{Deserialize, Serialize};

/// The contingency recommendation derived from a scoring pass: the rate,
/// why it was chosen, and what to do about the dominant drivers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContingencyAssessment {
    pub rate: f64,
    pub explanation: String,
    pub mitigations: Vector<String>,
}

/// Map a clamped total score to its contingency rate: linear interpolation
/// within the rate band the risk level owns. Band ordering is enforced by
/// config validation, which makes the mapping monotone in the score.
pub fn contingency_rate(total_score: f64, level: RiskLevel, config: &PricingConfig) -> f64 {
    let band = config.contingency.band(level);
    let (floor_score, ceiling_score) = config.score_bands.band_range(level);
    let span = ceiling_score - floor_score;
    let position = if span > 0.0 {
        ((total_score - floor_score) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (band.floor + position * (band.ceiling - band.floor)).max(0.0)
}

pub fn assess(
    total_score: f64,
    level: RiskLevel,
    breakdown: &Vector<FactorScore>,
    config: &PricingConfig,
) -> ContingencyAssessment {
    let rate = contingency_rate(total_score, level, config);
    let explanation = format!(
        "Total risk score {:.1} classifies as {}; contingency set to {:.2}% of the marked-up cost.",
        total_score,
        level,
        rate * 100.0
    );
    ContingencyAssessment {
        rate,
        explanation,
        mitigations: mitigations_for(level, breakdown, config),
    }
}

/// Recommendations tied to the dominant risk drivers: every factor scoring
/// in the HIGH band or above gets a driver-specific line, capped at the top
/// three, plus level-generic advice for HIGH/SEVERE outcomes.
fn mitigations_for(
    level: RiskLevel,
    breakdown: &Vector<FactorScore>,
    config: &PricingConfig,
) -> Vector<String> {
    let mut out = Vector::new();
    for factor in breakdown
        .iter()
        .filter(|f| f.score >= config.score_bands.high_floor)
        .take(3)
    {
        out.push_back(driver_mitigation(&factor.name, factor.score));
    }
    match level {
        RiskLevel::Severe => out.push_back(
            "Consider declining or re-scoping the work; severe aggregate risk rarely prices out."
                .to_string(),
        ),
        RiskLevel::High => out.push_back(
            "Hold a pre-bid risk review before submitting; high aggregate risk.".to_string(),
        ),
        RiskLevel::Medium | RiskLevel::Low => {}
    }
    out
}

fn driver_mitigation(name: &str, score: f64) -> String {
    let lowered = name.to_lowercase();
    let advice = if lowered.contains("weather") {
        "build weather days into the schedule and confirm glazing sequencing with the GC"
    } else if lowered.contains("labor") {
        "lock in crew availability early or price in premium-time labor"
    } else if lowered.contains("access") || lowered.contains("logistic") {
        "survey site access and staging before committing to hoisting costs"
    } else if lowered.contains("schedule") {
        "negotiate milestone float or liquidated-damages caps"
    } else if lowered.contains("material") || lowered.contains("supply") {
        "obtain supplier price locks or escalation clauses for long-lead glass"
    } else {
        "review scope assumptions and carry explicit allowances"
    };
    format!("'{name}' scored {score:.0}: {advice}.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_zero_at_zero_score() {
        let config = PricingConfig::default();
        assert_eq!(contingency_rate(0.0, RiskLevel::Low, &config), 0.0);
    }

    #[test]
    fn rate_interpolates_within_band() {
        let config = PricingConfig::default();
        // Midpoint of the MEDIUM score band (25-50) maps to the midpoint of
        // its rate band (0.05-0.10).
        let rate = contingency_rate(37.5, RiskLevel::Medium, &config);
        assert!((rate - 0.075).abs() < 1e-9);
    }

    #[test]
    fn rate_is_monotone_across_scores() {
        let config = PricingConfig::default();
        let mut last = -1.0;
        for i in 0..=200 {
            let score = i as f64 * 0.5;
            let level = config.score_bands.classify(score);
            let rate = contingency_rate(score, level, &config);
            assert!(
                rate >= last,
                "rate decreased at score {score}: {rate} < {last}"
            );
            last = rate;
        }
    }

    #[test]
    fn dominant_drivers_get_specific_mitigations() {
        let config = PricingConfig::default();
        let breakdown = Vector::from(vec![
            FactorScore {
                name: "Weather Exposure".to_string(),
                score: 90.0,
            },
            FactorScore {
                name: "Labor Market".to_string(),
                score: 70.0,
            },
            FactorScore {
                name: "Paperwork".to_string(),
                score: 10.0,
            },
        ]);
        let assessment = assess(80.0, RiskLevel::Severe, &breakdown, &config);
        assert!(assessment.mitigations.len() >= 3);
        assert!(assessment.mitigations[0].contains("weather days"));
        assert!(assessment.mitigations[1].contains("crew availability"));
        assert!(assessment
            .mitigations
            .iter()
            .any(|m| m.contains("declining")));
    }

    #[test]
    fn low_risk_has_no_mitigations() {
        let config = PricingConfig::default();
        let assessment = assess(5.0, RiskLevel::Low, &Vector::new(), &config);
        assert!(assessment.mitigations.is_empty());
        assert!(assessment.explanation.contains("LOW"));
    }
}
