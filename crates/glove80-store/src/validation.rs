//! Key binding validation against the behavior catalog.
//!
//! Checks a `(value, params)` pair the way the key inspector needs it:
//! behavior lookup, arity, and per-parameter conversion into canonical
//! slot form.

use glove80_spec::catalog::{self, BehaviorSignature, ParamKind, ParamSpec, KEY_NAMES};
use glove80_spec::layer_tag;
use serde::Serialize;
use serde_json::{json, Value};

/// Default number of autocomplete suggestions.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 8;

/// Which part of a binding an issue refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueField {
    Value,
    Params,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: IssueField,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_index: Option<usize>,
}

impl ValidationIssue {
    fn value(message: impl Into<String>) -> Self {
        Self {
            field: IssueField::Value,
            message: message.into(),
            param_index: None,
        }
    }

    fn params(message: impl Into<String>, param_index: Option<usize>) -> Self {
        Self {
            field: IssueField::Params,
            message: message.into(),
            param_index,
        }
    }
}

/// Normalized binding plus any issues found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub value: String,
    pub params: Vec<Value>,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn first_issue(&self, field: IssueField) -> Option<&ValidationIssue> {
        self.issues.iter().find(|issue| issue.field == field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestions {
    pub behaviors: Vec<String>,
    pub keycodes: Vec<String>,
    pub layers: Vec<String>,
}

/// Validates and normalizes key bindings.
#[derive(Debug, Clone)]
pub struct ValidationService {
    layer_names: Vec<String>,
    keycodes: Vec<&'static str>,
}

impl ValidationService {
    pub fn new<S: AsRef<str>>(layer_names: &[S]) -> Self {
        let mut keycodes: Vec<&'static str> = KEY_NAMES.to_vec();
        keycodes.sort_unstable();
        Self {
            layer_names: layer_names.iter().map(|name| name.as_ref().to_string()).collect(),
            keycodes,
        }
    }

    /// Replace the known layer names (after a rename or reorder).
    pub fn update_layers<S: AsRef<str>>(&mut self, layer_names: &[S]) {
        self.layer_names = layer_names.iter().map(|name| name.as_ref().to_string()).collect();
    }

    pub fn validate(&self, value: &str, params: &[Value]) -> ValidationResult {
        let value = value.trim().to_string();
        if value.is_empty() {
            return ValidationResult {
                value,
                params: Vec::new(),
                issues: vec![ValidationIssue::value("Behavior is required")],
            };
        }
        let Some(signature) = catalog::behavior(&value) else {
            let message = format!("Unknown behavior '{}'", value);
            return ValidationResult {
                value,
                params: Vec::new(),
                issues: vec![ValidationIssue::value(message)],
            };
        };

        let mut issues = Vec::new();
        if let Some(issue) = arity_issue(signature, params.len()) {
            issues.push(issue);
        }

        let mut normalized = Vec::with_capacity(signature.params.len());
        for (index, (spec, raw)) in signature.params.iter().zip(params).enumerate() {
            match self.convert_param(raw, spec, index) {
                Ok(converted) => normalized.push(converted),
                Err(issue) => {
                    issues.push(issue);
                    normalized.push(raw.clone());
                }
            }
        }

        ValidationResult {
            value,
            params: normalized,
            issues,
        }
    }

    pub fn suggest_behaviors(&self, prefix: &str, limit: usize) -> Vec<String> {
        filter_prefix(catalog::behavior_codes(), prefix, limit)
    }

    pub fn suggest_keycodes(&self, prefix: &str, limit: usize) -> Vec<String> {
        filter_prefix(self.keycodes.iter().copied(), prefix, limit)
    }

    pub fn suggest_layers(&self, prefix: &str, limit: usize) -> Vec<String> {
        filter_prefix(self.layer_names.iter().map(String::as_str), prefix, limit)
    }

    pub fn suggestions(&self, prefix: &str) -> Suggestions {
        Suggestions {
            behaviors: self.suggest_behaviors(prefix, DEFAULT_SUGGESTION_LIMIT),
            keycodes: self.suggest_keycodes(prefix, DEFAULT_SUGGESTION_LIMIT),
            layers: self.suggest_layers(prefix, DEFAULT_SUGGESTION_LIMIT),
        }
    }

    fn convert_param(&self, raw: &Value, spec: &ParamSpec, index: usize) -> Result<Value, ValidationIssue> {
        match spec.kind {
            ParamKind::Keycode => {
                let token = coerce_str(raw);
                if token.is_empty() {
                    return Err(ValidationIssue::params("Keycode parameter is required", Some(index)));
                }
                catalog::canonical_key_name(&token)
                    .map(|name| json!({"value": name, "params": []}))
                    .ok_or_else(|| {
                        ValidationIssue::params(format!("Unknown keycode '{}'", token), Some(index))
                    })
            }
            ParamKind::Layer => {
                let name = extract_layer_name(raw).ok_or_else(|| {
                    ValidationIssue::params("Layer parameter must be a layer name", Some(index))
                })?;
                if !self.layer_names.iter().any(|candidate| candidate == name) {
                    return Err(ValidationIssue::params(
                        format!("Unknown layer '{}'", name),
                        Some(index),
                    ));
                }
                Ok(layer_tag(name))
            }
            ParamKind::Integer => coerce_int(raw, spec, index).map(Value::from),
            ParamKind::String => Ok(Value::String(coerce_str(raw))),
        }
    }
}

fn arity_issue(signature: &BehaviorSignature, given: usize) -> Option<ValidationIssue> {
    let expected = signature.params.len();
    if given < expected {
        Some(ValidationIssue::params(
            format!("{} expects {} parameter(s)", signature.code, expected),
            None,
        ))
    } else if given > expected {
        Some(ValidationIssue::params(
            format!("{} accepts only {} parameter(s)", signature.code, expected),
            None,
        ))
    } else {
        None
    }
}

fn coerce_str(value: &Value) -> String {
    match value {
        Value::Object(map) => match map.get("value") {
            Some(Value::String(inner)) => inner.clone(),
            _ => value.to_string(),
        },
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn extract_layer_name(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => map.get("name").and_then(Value::as_str),
        Value::String(text) => Some(text.as_str()),
        _ => None,
    }
}

fn coerce_int(value: &Value, spec: &ParamSpec, index: usize) -> Result<i64, ValidationIssue> {
    let candidate = match value.as_i64() {
        Some(number) => number,
        None => {
            let text = coerce_str(value);
            text.trim().parse::<i64>().map_err(|_| {
                ValidationIssue::params(
                    format!("Parameter must be an integer (got '{}')", text),
                    Some(index),
                )
            })?
        }
    };
    if let Some(minimum) = spec.minimum {
        if candidate < minimum {
            return Err(ValidationIssue::params(
                format!("Value must be >= {}", minimum),
                Some(index),
            ));
        }
    }
    if let Some(maximum) = spec.maximum {
        if candidate > maximum {
            return Err(ValidationIssue::params(
                format!("Value must be <= {}", maximum),
                Some(index),
            ));
        }
    }
    Ok(candidate)
}

fn filter_prefix<'a, I>(values: I, prefix: &str, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let lowered = prefix.to_lowercase();
    values
        .into_iter()
        .filter(|candidate| candidate.to_lowercase().starts_with(&lowered))
        .take(limit)
        .map(str::to_string)
        .collect()
}
