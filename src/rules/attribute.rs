use std::fmt;

use serde::Serialize;

use crate::error::AttributeError;

/// Current value of a [`SystemAttribute`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl AttributeValue {
    /// Numeric view of the value. Text is parsed, booleans are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(i) => Some(*i as f64),
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Bool(_) => None,
            AttributeValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Canonical string form, used by string-based evaluators.
impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Int(i) => write!(f, "{i}"),
            AttributeValue::Float(x) => write!(f, "{x}"),
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Int(v.into())
    }
}

impl From<usize> for AttributeValue {
    fn from(v: usize) -> Self {
        i64::try_from(v).map_or(AttributeValue::Float(v as f64), AttributeValue::Int)
    }
}

impl From<u32> for AttributeValue {
    fn from(v: u32) -> Self {
        AttributeValue::Int(v.into())
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

/// A named, read-only observable value.
///
/// The `Display` form is the attribute's name as it appears in
/// `Rule: <attribute> <expression>`.
pub trait SystemAttribute: fmt::Display + Send + Sync {
    /// Read the current value. May differ between calls.
    fn value(&self) -> Result<AttributeValue, AttributeError>;
}

/// Attribute with a fixed value.
#[derive(Debug, Clone)]
pub struct ConstantAttribute {
    name: String,
    value: AttributeValue,
}

impl ConstantAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ConstantAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl SystemAttribute for ConstantAttribute {
    fn value(&self) -> Result<AttributeValue, AttributeError> {
        Ok(self.value.clone())
    }
}

type ValueFn = dyn Fn() -> Result<AttributeValue, AttributeError> + Send + Sync;

/// Attribute whose value is read through a closure on every evaluation.
pub struct FnAttribute {
    name: String,
    read: Box<ValueFn>,
}

impl FnAttribute {
    pub fn new<F>(name: impl Into<String>, read: F) -> Self
    where
        F: Fn() -> Result<AttributeValue, AttributeError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            read: Box::new(read),
        }
    }
}

impl fmt::Display for FnAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for FnAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAttribute").field("name", &self.name).finish()
    }
}

impl SystemAttribute for FnAttribute {
    fn value(&self) -> Result<AttributeValue, AttributeError> {
        (self.read)()
    }
}
