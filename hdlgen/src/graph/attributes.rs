use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::fmt;

pub const WIDTH: &str = "width";
pub const SELECT: &str = "select";
pub const ENABLE: &str = "enable";
pub const DISABLED: &str = "disabled";
pub const TRISTATE: &str = "tristate";
pub const INPUTS: &str = "inputs";
pub const VALUE: &str = "value";
pub const HIGH_TICKS: &str = "high_ticks";
pub const LOW_TICKS: &str = "low_ticks";
pub const PHASE: &str = "phase";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(u64),
    Text(String),
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> AttributeValue {
        AttributeValue::Bool(value)
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> AttributeValue {
        AttributeValue::Int(value)
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> AttributeValue {
        AttributeValue::Int(value as u64)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> AttributeValue {
        AttributeValue::Text(value.to_string())
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(value) => write!(f, "{}", value),
            AttributeValue::Int(value) => write!(f, "{}", value),
            AttributeValue::Text(value) => write!(f, "\"{}\"", value),
        }
    }
}

/// What a plexer drives onto its outputs while its enable input is low.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisabledPolicy {
    Zero,
    Floating,
}

/// The attribute configuration of a placed component.
///
/// Missing keys fall back to per-key defaults, so an empty set describes the smallest
/// configuration of any component type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    values: BTreeMap<String, AttributeValue>,
}

impl Attributes {
    pub fn new() -> Attributes {
        Attributes::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, key: &str, value: impl Into<AttributeValue>) -> Attributes {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<AttributeValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.values.get(key)
    }

    pub fn int(&self, key: &str, default: u64) -> u64 {
        match self.values.get(key) {
            Some(AttributeValue::Int(value)) => *value,
            Some(AttributeValue::Bool(value)) => *value as u64,
            _ => default,
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        match self.values.get(key) {
            Some(AttributeValue::Bool(value)) => *value,
            Some(AttributeValue::Int(value)) => *value != 0,
            _ => false,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(AttributeValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    pub fn width(&self) -> u32 {
        self.int(WIDTH, 1) as u32
    }

    pub fn select_bits(&self) -> u32 {
        self.int(SELECT, 1) as u32
    }

    pub fn has_enable(&self) -> bool {
        self.flag(ENABLE)
    }

    pub fn is_tristate(&self) -> bool {
        self.flag(TRISTATE)
    }

    pub fn disabled_policy(&self) -> DisabledPolicy {
        match self.text(DISABLED) {
            Some("floating") => DisabledPolicy::Floating,
            _ => DisabledPolicy::Zero,
        }
    }

    /// `key=value` pairs in key order, for diagnostics.
    pub fn summary(&self) -> String {
        if self.values.is_empty() {
            return "no attributes".to_string();
        }
        self.values
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
