//! Input sanitizer/validator for free-form risk-factor inputs.
//!
//! Every entry is checked independently and all findings are accumulated,
//! so the caller can report the complete problem list in one pass. Errors
//! block the enhanced scoring path; warnings never do. The function is a
//! pure function of its input.

pub mod patterns;

use crate::config::{NumericPolicy, ValidationPolicy};
use crate::core::{RiskInputs, ValidationOutcome};
use std::collections::BTreeMap;

/// Findings accumulator threaded through the per-rule checks.
#[derive(Default)]
struct Findings {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Findings {
    fn apply(&mut self, policy: NumericPolicy, message: String) {
        match policy {
            NumericPolicy::Allow => {}
            NumericPolicy::Warn => self.warnings.push(message),
            NumericPolicy::Reject => self.errors.push(message),
        }
    }
}

/// Validate a request's risk-factor inputs against the given policy.
///
/// An absent or empty mapping is valid: the engine simply proceeds with
/// zero risk inputs.
pub fn validate(inputs: Option<&RiskInputs>, policy: &ValidationPolicy) -> ValidationOutcome {
    let Some(inputs) = inputs else {
        return ValidationOutcome::valid();
    };
    if inputs.is_empty() {
        return ValidationOutcome::valid();
    }

    let mut findings = Findings::default();
    check_duplicate_names(inputs, &mut findings);
    for (name, entry) in inputs {
        check_entry(name, entry, policy, &mut findings);
    }

    if !findings.errors.is_empty() {
        log::debug!(
            "risk input validation failed: {} error(s), {} warning(s)",
            findings.errors.len(),
            findings.warnings.len()
        );
    }
    ValidationOutcome::from_findings(findings.errors, findings.warnings)
}

/// Two keys that collide under trim + case-insensitive comparison are both
/// retained; the collision is only warned about. Both entries still reach
/// scoring, which double-counts the factor when the catalog matches both.
fn check_duplicate_names(inputs: &RiskInputs, findings: &mut Findings) {
    let mut by_normalized: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for name in inputs.keys() {
        by_normalized
            .entry(name.trim().to_lowercase())
            .or_default()
            .push(name);
    }
    for (normalized, names) in by_normalized {
        if names.len() > 1 && !normalized.is_empty() {
            findings.warnings.push(format!(
                "duplicate risk factor names (case/whitespace-insensitive): {}",
                names.join(", ")
            ));
        }
    }
}

fn check_entry(
    name: &str,
    entry: &serde_json::Value,
    policy: &ValidationPolicy,
    findings: &mut Findings,
) {
    if name.trim().is_empty() {
        findings
            .errors
            .push("risk factor name must be a non-empty string".to_string());
        return;
    }

    let Some(object) = entry.as_object() else {
        findings.errors.push(format!(
            "risk factor '{name}': entry must be an object with a 'value' field"
        ));
        return;
    };
    let Some(value) = object.get("value") else {
        findings
            .errors
            .push(format!("risk factor '{name}': missing 'value' field"));
        return;
    };

    check_value(name, value, policy, findings);
    if let Some(notes) = object.get("notes") {
        check_notes(name, notes, policy, findings);
    }
}

fn check_value(
    name: &str,
    value: &serde_json::Value,
    policy: &ValidationPolicy,
    findings: &mut Findings,
) {
    match value {
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(v) if v.is_finite() => check_numeric_value(name, v, policy, findings),
            _ => findings
                .errors
                .push(format!("risk factor '{name}': value is not a finite number")),
        },
        serde_json::Value::String(s) => check_string_value(name, s, policy, findings),
        serde_json::Value::Bool(_) => {}
        serde_json::Value::Null => findings
            .errors
            .push(format!("risk factor '{name}': value must not be null")),
        other => findings.errors.push(format!(
            "risk factor '{name}': value must be a number, string, or boolean (got {})",
            json_type_name(other)
        )),
    }
}

fn check_numeric_value(name: &str, value: f64, policy: &ValidationPolicy, findings: &mut Findings) {
    if value < 0.0 {
        findings.apply(
            policy.negative_values,
            format!("risk factor '{name}': negative value {value} may be erroneous"),
        );
    }
    if value.abs() > policy.extreme_magnitude {
        findings.apply(
            policy.extreme_values,
            format!(
                "risk factor '{name}': extreme value {value} exceeds magnitude {}",
                policy.extreme_magnitude
            ),
        );
    }
}

fn check_string_value(name: &str, value: &str, policy: &ValidationPolicy, findings: &mut Findings) {
    if value.chars().count() > policy.max_string_len {
        findings.errors.push(format!(
            "risk factor '{name}': string value exceeds {} characters",
            policy.max_string_len
        ));
    }
    if let Some(signature) = patterns::find_injection_signature(value) {
        log::warn!("injection signature ({signature}) in risk factor '{name}'");
        findings.errors.push(format!(
            "risk factor '{name}': value contains potentially malicious content ({signature})"
        ));
    }
}

fn check_notes(
    name: &str,
    notes: &serde_json::Value,
    policy: &ValidationPolicy,
    findings: &mut Findings,
) {
    match notes {
        serde_json::Value::String(s) => {
            if s.chars().count() > policy.max_notes_len {
                findings.errors.push(format!(
                    "risk factor '{name}': notes exceed {} characters",
                    policy.max_notes_len
                ));
            }
        }
        serde_json::Value::Null => {}
        _ => findings
            .errors
            .push(format!("risk factor '{name}': notes must be a string")),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
