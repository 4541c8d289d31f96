//! Flat primitive payloads carried by events
//!
//! Payloads are deliberately shallow: a map from string keys to primitive
//! values, never nested. Anything that needs structure belongs in a typed
//! component, not in an event.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A single primitive payload value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
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
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Flat key/value map attached to an event envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload(AHashMap<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert used at emission sites.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.0.get(key) {
            Some(Value::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Reads a float, widening an integer value if that is what was stored.
    pub fn float(&self, key: &str) -> Option<f64> {
        match self.0.get(key) {
            Some(Value::Float(v)) => Some(*v),
            Some(Value::Int(v)) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        match self.0.get(key) {
            Some(Value::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(Value::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        let p = Payload::new()
            .with("amount", 12)
            .with("magnitude", 0.5)
            .with("fatal", false)
            .with("cause", "attack");
        assert_eq!(p.int("amount"), Some(12));
        assert_eq!(p.float("magnitude"), Some(0.5));
        assert_eq!(p.boolean("fatal"), Some(false));
        assert_eq!(p.text("cause"), Some("attack"));
        assert_eq!(p.int("missing"), None);
    }

    #[test]
    fn test_float_accessor_widens_ints() {
        let p = Payload::new().with("amount", 7);
        assert_eq!(p.float("amount"), Some(7.0));
    }

    #[test]
    fn test_wrong_type_reads_as_none() {
        let p = Payload::new().with("cause", "attack");
        assert_eq!(p.int("cause"), None);
        assert_eq!(p.boolean("cause"), None);
    }
}
