use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw risk-factor inputs as they arrive from the caller, keyed by factor
/// name. Entries are untrusted free-form JSON: the request boundary only
/// guarantees the surrounding request shape, not the content of individual
/// risk inputs. Each well-formed entry is an object with a `value` field
/// and an optional `notes` string; validation (see `crate::validation`)
/// decides whether an entry is usable, and nothing downstream touches a
/// mapping that failed it.
pub type RiskInputs = BTreeMap<String, serde_json::Value>;

/// A sanitized risk-input value. Only produced from JSON values whose type
/// already passed validation; anything else stays `None` and the factor
/// scores neutral.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RiskValue {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl RiskValue {
    /// Coerce a raw JSON value into the closed value set. Non-finite
    /// numbers are rejected here as well so scoring can trust `Number`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).map(Self::Number),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Bool(b) => Some(Self::Flag(*b)),
            _ => None,
        }
    }

    /// Numeric view used by threshold formulas: numbers pass through,
    /// numeric strings parse, flags map to the 0/1 extremes.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Self::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            Self::Number(v) => Some(*v != 0.0),
            Self::Text(_) => None,
        }
    }
}

/// The typed view of one validated risk-factor entry. Constructed fresh per
/// request, immutable afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskFactorInput {
    pub value: RiskValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RiskFactorInput {
    pub fn number(value: f64) -> Self {
        Self {
            value: RiskValue::Number(value),
            notes: None,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: RiskValue::Text(value.into()),
            notes: None,
        }
    }

    pub fn flag(value: bool) -> Self {
        Self {
            value: RiskValue::Flag(value),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Parse one raw mapping entry. Returns `None` for any shape the
    /// validator would reject, so scoring can use this as its single
    /// tolerant accessor.
    pub fn from_entry(entry: &serde_json::Value) -> Option<Self> {
        let object = entry.as_object()?;
        let value = RiskValue::from_json(object.get("value")?)?;
        let notes = match object.get("notes") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            _ => None,
        };
        Some(Self { value, notes })
    }

    /// The wire shape of this entry, as the request boundary would send it.
    pub fn into_entry(self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Outcome of validating one request's risk-factor inputs.
///
/// Invariant: `is_valid` is true iff `errors` is empty. Warnings never
/// affect validity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn from_findings(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Ordered risk classification derived from the total score bands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,    // score below the medium band floor
    Medium, // moderate risk, standard contingency
    High,   // elevated contingency, mitigation recommended
    Severe, // maximum contingency band
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Severe => "SEVERE",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One factor's contribution, retained for "top risk factors" reporting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub name: String,
    pub score: f64,
}
