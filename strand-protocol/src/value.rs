//! The universal data value that crosses every boundary.
//!
//! [`SendableValue`] is the closed variant type used for tool arguments,
//! tool results, guardrail diagnostics, and result metadata. It is a plain
//! immutable tree — no references, no lazy parsing — so it can be cloned
//! across task boundaries freely.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A closed sum type for structured data.
///
/// Round-trips through JSON losslessly with one documented exception:
/// a whole-number [`Double`](SendableValue::Double) may decode as an
/// [`Int`](SendableValue::Int) (`4.0` comes back as `4`). Callers that
/// need numeric values should accept either via [`as_double`], which
/// widens ints.
///
/// [`as_double`]: SendableValue::as_double
#[derive(Debug, Clone, PartialEq)]
pub enum SendableValue {
    /// The absent value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed 64-bit integer.
    Int(i64),
    /// A 64-bit float.
    Double(f64),
    /// A UTF-8 string.
    String(String),
    /// An ordered list of values.
    Array(Vec<SendableValue>),
    /// A string-keyed map of values. `BTreeMap` keeps iteration (and
    /// therefore serialization) deterministic.
    Dictionary(BTreeMap<String, SendableValue>),
}

/// Whole doubles inside this range are exactly representable as i64,
/// so reinterpreting them as ints is lossless.
const EXACT_INT_BOUND: f64 = 9_007_199_254_740_992.0; // 2^53

impl SendableValue {
    /// Convert a `serde_json::Value` into a `SendableValue`.
    ///
    /// This is where the documented lossy boundary lives: a finite double
    /// with no fractional part (within ±2^53) becomes an `Int`.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => SendableValue::Null,
            serde_json::Value::Bool(b) => SendableValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SendableValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    if f.is_finite() && f.fract() == 0.0 && f.abs() <= EXACT_INT_BOUND {
                        SendableValue::Int(f as i64)
                    } else {
                        SendableValue::Double(f)
                    }
                } else {
                    // u64 beyond i64::MAX: widen to double rather than lose the value.
                    SendableValue::Double(n.as_u64().map(|u| u as f64).unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => SendableValue::String(s),
            serde_json::Value::Array(items) => {
                SendableValue::Array(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => SendableValue::Dictionary(
                map.into_iter().map(|(k, v)| (k, Self::from_json(v))).collect(),
            ),
        }
    }

    /// Convert to a `serde_json::Value`.
    ///
    /// Non-finite doubles have no JSON representation and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SendableValue::Null => serde_json::Value::Null,
            SendableValue::Bool(b) => serde_json::Value::Bool(*b),
            SendableValue::Int(i) => serde_json::Value::Number((*i).into()),
            SendableValue::Double(d) => serde_json::Number::from_f64(*d)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            SendableValue::String(s) => serde_json::Value::String(s.clone()),
            SendableValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            SendableValue::Dictionary(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// True if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, SendableValue::Null)
    }

    /// Borrow as a string, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SendableValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extract as a bool, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SendableValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract as an integer, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SendableValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract as a double. Ints widen losslessly.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            SendableValue::Double(d) => Some(*d),
            SendableValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Borrow as an array, if this is an `Array`.
    pub fn as_array(&self) -> Option<&[SendableValue]> {
        match self {
            SendableValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as a dictionary, if this is a `Dictionary`.
    pub fn as_dictionary(&self) -> Option<&BTreeMap<String, SendableValue>> {
        match self {
            SendableValue::Dictionary(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key, if this is a `Dictionary`.
    pub fn get(&self, key: &str) -> Option<&SendableValue> {
        self.as_dictionary().and_then(|map| map.get(key))
    }
}

impl Default for SendableValue {
    fn default() -> Self {
        SendableValue::Null
    }
}

impl fmt::Display for SendableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for SendableValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SendableValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_json(serde_json::Value::deserialize(deserializer)?))
    }
}

impl From<bool> for SendableValue {
    fn from(b: bool) -> Self {
        SendableValue::Bool(b)
    }
}

impl From<i64> for SendableValue {
    fn from(i: i64) -> Self {
        SendableValue::Int(i)
    }
}

impl From<i32> for SendableValue {
    fn from(i: i32) -> Self {
        SendableValue::Int(i64::from(i))
    }
}

impl From<f64> for SendableValue {
    fn from(d: f64) -> Self {
        SendableValue::Double(d)
    }
}

impl From<&str> for SendableValue {
    fn from(s: &str) -> Self {
        SendableValue::String(s.to_owned())
    }
}

impl From<String> for SendableValue {
    fn from(s: String) -> Self {
        SendableValue::String(s)
    }
}

impl From<Vec<SendableValue>> for SendableValue {
    fn from(items: Vec<SendableValue>) -> Self {
        SendableValue::Array(items)
    }
}

impl From<BTreeMap<String, SendableValue>> for SendableValue {
    fn from(map: BTreeMap<String, SendableValue>) -> Self {
        SendableValue::Dictionary(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(v: &SendableValue) -> SendableValue {
        let encoded = serde_json::to_string(v).unwrap();
        serde_json::from_str(&encoded).unwrap()
    }

    #[test]
    fn nested_tree_roundtrips() {
        let mut map = BTreeMap::new();
        map.insert("name".into(), SendableValue::from("strand"));
        map.insert(
            "tags".into(),
            SendableValue::Array(vec![SendableValue::from(1i64), SendableValue::Null]),
        );
        let v = SendableValue::Dictionary(map);
        assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn whole_double_decodes_as_int() {
        // The documented lossy boundary — an accepted special case.
        assert_eq!(roundtrip(&SendableValue::Double(4.0)), SendableValue::Int(4));
    }

    #[test]
    fn fractional_double_stays_double() {
        assert_eq!(
            roundtrip(&SendableValue::Double(4.5)),
            SendableValue::Double(4.5)
        );
    }

    #[test]
    fn huge_whole_double_stays_double() {
        let v = SendableValue::Double(1e300);
        assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn accessors() {
        let v = SendableValue::from("hello");
        assert_eq!(v.as_str(), Some("hello"));
        assert_eq!(v.as_int(), None);
        assert_eq!(SendableValue::Int(3).as_double(), Some(3.0));
        assert!(SendableValue::Null.is_null());
    }

    #[test]
    fn dictionary_get() {
        let mut map = BTreeMap::new();
        map.insert("k".into(), SendableValue::Bool(true));
        let v = SendableValue::Dictionary(map);
        assert_eq!(v.get("k"), Some(&SendableValue::Bool(true)));
        assert_eq!(v.get("missing"), None);
    }

    #[test]
    fn display_is_json() {
        assert_eq!(SendableValue::from("x").to_string(), "\"x\"");
        assert_eq!(SendableValue::Null.to_string(), "null");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn leaf() -> impl Strategy<Value = SendableValue> {
            prop_oneof![
                Just(SendableValue::Null),
                any::<bool>().prop_map(SendableValue::Bool),
                any::<i64>().prop_map(SendableValue::Int),
                "[a-z]{0,8}".prop_map(SendableValue::String),
            ]
        }

        fn tree() -> impl Strategy<Value = SendableValue> {
            leaf().prop_recursive(3, 16, 4, |inner| {
                prop_oneof![
                    proptest::collection::vec(inner.clone(), 0..4)
                        .prop_map(SendableValue::Array),
                    proptest::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                        .prop_map(SendableValue::Dictionary),
                ]
            })
        }

        proptest! {
            // Doubles are excluded: the whole-number case is the one
            // documented lossy boundary, covered by its own test above.
            #[test]
            fn json_round_trip_is_lossless(v in tree()) {
                prop_assert_eq!(roundtrip(&v), v);
            }
        }
    }
}
