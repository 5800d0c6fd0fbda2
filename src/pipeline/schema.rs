//! # Body Constraint Tables
//!
//! Declarative validation rules consumed by the ValidateBody middleware.
//! A schema is plain data built imperatively at route registration; running
//! it against a JSON body reports **every** violated field, not just the
//! first, and produces the coerced, allow-listed body that replaces the raw
//! one for downstream use.

use std::sync::OnceLock;

use chrono::DateTime;
use regex::Regex;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::error::FieldViolation;

fn email_grammar() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        // Deliberately loose; real deliverability is not a parsing question
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex")
    })
}

/// Constraint on a single field's value
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// UTF-8 string with a length range (in characters)
    Str { min: usize, max: usize },
    /// Integer within an inclusive range; numeric strings are coerced
    Int { min: i64, max: i64 },
    /// Number within an inclusive range; numeric strings are coerced
    Float { min: f64, max: f64 },
    Bool,
    Email,
    /// The store's id grammar
    Id,
    /// RFC 3339 date-time
    DateTime,
    /// One of a closed set of string values
    OneOf(&'static [&'static str]),
    Array {
        item: Box<FieldKind>,
        min_len: usize,
        max_len: usize,
    },
    /// Nested object with its own schema; violations carry dotted paths
    Object(BodySchema),
}

#[derive(Debug, Clone)]
struct FieldRule {
    name: &'static str,
    required: bool,
    kind: FieldKind,
}

/// An ordered set of field rules for one request body
#[derive(Debug, Clone, Default)]
pub struct BodySchema {
    rules: Vec<FieldRule>,
}

impl BodySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.rules.push(FieldRule {
            name,
            required: true,
            kind,
        });
        self
    }

    pub fn optional(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.rules.push(FieldRule {
            name,
            required: false,
            kind,
        });
        self
    }

    /// Validate a body. On success the returned value contains only the
    /// declared fields, with coercions applied; undeclared input is dropped.
    pub fn validate(&self, body: &Value) -> Result<Value, Vec<FieldViolation>> {
        let Some(object) = body.as_object() else {
            return Err(vec![FieldViolation::new("body", "must be a JSON object")]);
        };

        let mut violations = Vec::new();
        let mut output = Map::new();

        for rule in &self.rules {
            match object.get(rule.name) {
                None | Some(Value::Null) => {
                    if rule.required {
                        violations.push(FieldViolation::new(rule.name, "is required"));
                    }
                }
                Some(value) => {
                    if let Some(coerced) = check(&rule.kind, value, rule.name, &mut violations) {
                        output.insert(rule.name.to_string(), coerced);
                    }
                }
            }
        }

        if violations.is_empty() {
            Ok(Value::Object(output))
        } else {
            Err(violations)
        }
    }
}

fn check(
    kind: &FieldKind,
    value: &Value,
    path: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<Value> {
    match kind {
        FieldKind::Str { min, max } => {
            let Some(text) = value.as_str() else {
                violations.push(FieldViolation::new(path, "must be a string"));
                return None;
            };
            let length = text.chars().count();
            if length < *min || length > *max {
                violations.push(FieldViolation::new(
                    path,
                    format!("must be a string of {min}..{max} characters"),
                ));
                return None;
            }
            Some(Value::String(text.to_string()))
        }
        FieldKind::Int { min, max } => {
            let parsed = value
                .as_i64()
                .or_else(|| value.as_str().and_then(|raw| raw.parse().ok()));
            let Some(number) = parsed else {
                violations.push(FieldViolation::new(path, "must be an integer"));
                return None;
            };
            if number < *min || number > *max {
                violations.push(FieldViolation::new(
                    path,
                    format!("must be an integer in {min}..{max}"),
                ));
                return None;
            }
            Some(Value::from(number))
        }
        FieldKind::Float { min, max } => {
            let parsed = value
                .as_f64()
                .or_else(|| value.as_str().and_then(|raw| raw.parse().ok()));
            let Some(number) = parsed else {
                violations.push(FieldViolation::new(path, "must be a number"));
                return None;
            };
            if number < *min || number > *max {
                violations.push(FieldViolation::new(
                    path,
                    format!("must be a number in {min}..{max}"),
                ));
                return None;
            }
            Some(Value::from(number))
        }
        FieldKind::Bool => {
            let Some(flag) = value.as_bool() else {
                violations.push(FieldViolation::new(path, "must be a boolean"));
                return None;
            };
            Some(Value::Bool(flag))
        }
        FieldKind::Email => {
            let valid = value.as_str().is_some_and(|raw| email_grammar().is_match(raw));
            if !valid {
                violations.push(FieldViolation::new(path, "must be a valid email"));
                return None;
            }
            Some(value.clone())
        }
        FieldKind::Id => {
            let Some(id) = value.as_str().and_then(|raw| Uuid::parse_str(raw).ok()) else {
                violations.push(FieldViolation::new(path, "must be a valid resource id"));
                return None;
            };
            Some(Value::String(id.to_string()))
        }
        FieldKind::DateTime => {
            let valid = value
                .as_str()
                .is_some_and(|raw| DateTime::parse_from_rfc3339(raw).is_ok());
            if !valid {
                violations.push(FieldViolation::new(path, "must be an RFC 3339 date-time"));
                return None;
            }
            Some(value.clone())
        }
        FieldKind::OneOf(allowed) => {
            let matched = value.as_str().is_some_and(|raw| allowed.contains(&raw));
            if !matched {
                violations.push(FieldViolation::new(
                    path,
                    format!("must be one of: {}", allowed.join(", ")),
                ));
                return None;
            }
            Some(value.clone())
        }
        FieldKind::Array { item, min_len, max_len } => {
            let Some(items) = value.as_array() else {
                violations.push(FieldViolation::new(path, "must be an array"));
                return None;
            };
            if items.len() < *min_len || items.len() > *max_len {
                violations.push(FieldViolation::new(
                    path,
                    format!("must contain {min_len}..{max_len} items"),
                ));
                return None;
            }
            let before = violations.len();
            let coerced: Vec<Value> = items
                .iter()
                .enumerate()
                .filter_map(|(index, entry)| {
                    check(item, entry, &format!("{path}[{index}]"), violations)
                })
                .collect();
            if violations.len() > before {
                return None;
            }
            Some(Value::Array(coerced))
        }
        FieldKind::Object(schema) => match schema.validate(value) {
            Ok(coerced) => Some(coerced),
            Err(nested) => {
                violations.extend(nested.into_iter().map(|violation| {
                    FieldViolation::new(format!("{path}.{}", violation.field), violation.message)
                }));
                None
            }
        },
    }
}
