//! Typed property values
//!
//! UST files are untyped `key=value` text. Each known key has a fixed
//! type in the format schema; unknown keys stay strings so that
//! properties written by newer editors pass through untouched.

use crate::error::{Result, UtauError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(*f as i64),
            Value::Str(s) => s.trim().parse().ok(),
            Value::Bool(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(s) => s.trim().parse().ok(),
            Value::Bool(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{}", i),
            // Debug keeps the trailing ".0" on whole numbers (Tempo=120.0)
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
}

impl ValueKind {
    fn name(self) -> &'static str {
        match self {
            ValueKind::Bool => "boolean",
            ValueKind::Int => "integer",
            ValueKind::Float => "float",
            ValueKind::Str => "string",
        }
    }

    /// Coerce a raw string into this kind
    pub fn parse(self, key: &str, raw: &str) -> Result<Value> {
        let fail = || UtauError::TypeConversion {
            key: key.to_string(),
            value: raw.to_string(),
            expected: self.name(),
        };

        match self {
            ValueKind::Str => Ok(Value::Str(raw.to_string())),
            ValueKind::Int => raw.trim().parse::<i64>().map(Value::Int).map_err(|_| fail()),
            ValueKind::Float => raw.trim().parse::<f64>().map(Value::Float).map_err(|_| fail()),
            ValueKind::Bool => {
                if raw.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if raw.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else {
                    Err(fail())
                }
            }
        }
    }
}

/// Per-format key → type table
#[derive(Debug)]
pub struct Schema {
    name: &'static str,
    kinds: HashMap<&'static str, ValueKind>,
}

impl Schema {
    pub fn new(name: &'static str, entries: &[(&'static str, ValueKind)]) -> Self {
        Self {
            name,
            kinds: entries.iter().copied().collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared kind of `key`; unknown keys are strings
    pub fn kind_of(&self, key: &str) -> ValueKind {
        self.kinds.get(key).copied().unwrap_or(ValueKind::Str)
    }

    pub fn type_value(&self, key: &str, raw: &str) -> Result<Value> {
        self.kind_of(key).parse(key, raw)
    }
}

pub static UST_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(
        "ust",
        &[
            ("Length", ValueKind::Int),
            ("NoteNum", ValueKind::Int),
            ("Tempo", ValueKind::Float),
            ("Tracks", ValueKind::Int),
            ("Mode2", ValueKind::Bool),
            ("PreUtterance", ValueKind::Float),
            ("VoiceOverlap", ValueKind::Int),
            ("Velocity", ValueKind::Int),
            ("Intensity", ValueKind::Int),
            ("Modulation", ValueKind::Int),
            ("$direct", ValueKind::Bool),
        ],
    )
});

/// Type a raw UST `key=value` pair
pub fn ust_value(key: &str, raw: &str) -> Result<Value> {
    UST_SCHEMA.type_value(key, raw)
}
