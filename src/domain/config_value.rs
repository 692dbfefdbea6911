// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration value tree.
//!
//! This module provides the `ConfigValue` type: a node of a configuration tree,
//! which is either a scalar (null, boolean, integer, float, string), an ordered
//! sequence or a string-keyed mapping.

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A string-keyed mapping of configuration values.
pub type Mapping = BTreeMap<String, ConfigValue>;

/// A node of a configuration tree.
///
/// # Examples
///
/// ```
/// use appscaffold::domain::config_value::ConfigValue;
///
/// let value = ConfigValue::from_literal("0x1234");
/// assert_eq!(value, ConfigValue::Integer(4660));
/// assert_eq!(value.to_string(), "4660");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ConfigValue {
    /// An explicit null.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
    /// An ordered sequence.
    Sequence(Vec<ConfigValue>),
    /// A string-keyed mapping.
    Mapping(Mapping),
}

impl ConfigValue {
    /// Returns an empty mapping value.
    pub fn mapping() -> Self {
        ConfigValue::Mapping(Mapping::new())
    }

    /// Returns the name of this value's variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Integer(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::Sequence(_) => "sequence",
            ConfigValue::Mapping(_) => "mapping",
        }
    }

    /// Whether this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// Whether this value is a mapping.
    pub fn is_mapping(&self) -> bool {
        matches!(self, ConfigValue::Mapping(_))
    }

    /// Whether this value is a sequence.
    pub fn is_sequence(&self) -> bool {
        matches!(self, ConfigValue::Sequence(_))
    }

    /// Whether this value is a mapping or a sequence.
    pub fn is_container(&self) -> bool {
        self.is_mapping() || self.is_sequence()
    }

    /// Returns the string if this value is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this value is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float. Integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the boolean if this value is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the mapping if this value is one.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfigValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the sequence if this value is one.
    pub fn as_sequence(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Coerces raw text into the most specific literal it spells.
    ///
    /// Recognizes `True`/`False` (and lowercase), `None`/`null`, decimal,
    /// hexadecimal (`0x`), octal (`0o`) and binary (`0b`) integers, floats,
    /// single- or double-quoted strings, and flow-style sequences and mappings.
    /// Anything else is kept verbatim as a string, including plain digit runs
    /// that do not fit an `i64`; they are never widened to a lossy float.
    ///
    /// # Examples
    ///
    /// ```
    /// use appscaffold::domain::config_value::ConfigValue;
    ///
    /// assert_eq!(ConfigValue::from_literal("1234"), ConfigValue::Integer(1234));
    /// assert_eq!(ConfigValue::from_literal("1234.5678"), ConfigValue::Float(1234.5678));
    /// assert_eq!(ConfigValue::from_literal("AAAA"), ConfigValue::from("AAAA"));
    /// ```
    pub fn from_literal(raw: &str) -> Self {
        let text = raw.trim();
        match text {
            "True" | "true" => return ConfigValue::Bool(true),
            "False" | "false" => return ConfigValue::Bool(false),
            "None" | "null" => return ConfigValue::Null,
            _ => {}
        }

        if let Some(i) = parse_int_literal(text) {
            return ConfigValue::Integer(i);
        }
        // digits that are not a valid i64 (overflow, leading zeros) stay text
        if is_integral(text) {
            return ConfigValue::String(raw.to_string());
        }
        if let Some(f) = parse_float_literal(text) {
            return ConfigValue::Float(f);
        }
        if let Some(s) = unquote(text) {
            return ConfigValue::String(s.to_string());
        }
        #[cfg(feature = "yaml")]
        {
            if text.starts_with('[') || text.starts_with('{') {
                if let Ok(value) = serde_yaml::from_str::<ConfigValue>(text) {
                    return value;
                }
            }
        }

        ConfigValue::String(raw.to_string())
    }
}

fn parse_int_literal(text: &str) -> Option<i64> {
    let (negative, body) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let body = strip_digit_separators(body)?;

    let (radix, digits) = match body.get(..2) {
        Some("0x") | Some("0X") => (16, &body[2..]),
        Some("0o") | Some("0O") => (8, &body[2..]),
        Some("0b") | Some("0B") => (2, &body[2..]),
        _ => {
            // leading zeros are not a decimal literal
            if body.len() > 1 && body.starts_with('0') && body.bytes().any(|b| b != b'0') {
                return None;
            }
            (10, body.as_str())
        }
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    if negative {
        i64::from_str_radix(&format!("-{}", digits), radix).ok()
    } else {
        i64::from_str_radix(digits, radix).ok()
    }
}

fn is_integral(text: &str) -> bool {
    let body = text.strip_prefix(['-', '+']).unwrap_or(text);
    !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit() || b == b'_')
}

fn parse_float_literal(text: &str) -> Option<f64> {
    let body = strip_digit_separators(text)?;
    let numeric = body
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !numeric || !body.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    body.parse().ok()
}

/// Removes `_` separators that sit between two digits.
fn strip_digit_separators(text: &str) -> Option<String> {
    if text.starts_with('_') || text.ends_with('_') || text.contains("__") {
        return None;
    }
    Some(text.replace('_', ""))
}

fn unquote(text: &str) -> Option<&str> {
    if text.len() < 2 {
        return None;
    }
    let quote = text.chars().next()?;
    if (quote == '\'' || quote == '"') && text.ends_with(quote) {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => f.write_str("null"),
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Integer(i) => write!(f, "{}", i),
            ConfigValue::Float(x) => write!(f, "{:?}", x),
            ConfigValue::String(s) => f.write_str(s),
            ConfigValue::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            ConfigValue::Mapping(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, item)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Integer(i)
    }
}

impl From<i32> for ConfigValue {
    fn from(i: i32) -> Self {
        ConfigValue::Integer(i.into())
    }
}

impl From<u32> for ConfigValue {
    fn from(i: u32) -> Self {
        ConfigValue::Integer(i.into())
    }
}

impl From<f64> for ConfigValue {
    fn from(f: f64) -> Self {
        ConfigValue::Float(f)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<Mapping> for ConfigValue {
    fn from(map: Mapping) -> Self {
        ConfigValue::Mapping(map)
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(items: Vec<T>) -> Self {
        ConfigValue::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ConfigValue>> From<Option<T>> for ConfigValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ConfigValue::Null, Into::into)
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ConfigValue::Mapping(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl PartialEq<i64> for ConfigValue {
    fn eq(&self, other: &i64) -> bool {
        match self {
            ConfigValue::Integer(i) => i == other,
            ConfigValue::Float(f) => *f == *other as f64,
            _ => false,
        }
    }
}

impl PartialEq<i32> for ConfigValue {
    fn eq(&self, other: &i32) -> bool {
        *self == i64::from(*other)
    }
}

impl PartialEq<f64> for ConfigValue {
    fn eq(&self, other: &f64) -> bool {
        self.as_f64() == Some(*other)
    }
}

impl PartialEq<bool> for ConfigValue {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}

impl PartialEq<str> for ConfigValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for ConfigValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialOrd<i64> for ConfigValue {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        match self {
            ConfigValue::Integer(i) => i.partial_cmp(other),
            ConfigValue::Float(f) => f.partial_cmp(&(*other as f64)),
            _ => None,
        }
    }
}

impl PartialOrd<f64> for ConfigValue {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.as_f64()?.partial_cmp(other)
    }
}

impl PartialOrd for ConfigValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (ConfigValue::String(a), ConfigValue::String(b)) => a.partial_cmp(b),
            (ConfigValue::Bool(a), ConfigValue::Bool(b)) => a.partial_cmp(b),
            (ConfigValue::Integer(a), ConfigValue::Integer(b)) => a.partial_cmp(b),
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Null => serializer.serialize_unit(),
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Integer(i) => serializer.serialize_i64(*i),
            ConfigValue::Float(f) => serializer.serialize_f64(*f),
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigValue::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, item) in entries {
                    map.serialize_entry(key, item)?;
                }
                map.end()
            }
        }
    }
}

struct ConfigValueVisitor;

impl<'de> Visitor<'de> for ConfigValueVisitor {
    type Value = ConfigValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a configuration value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<ConfigValue, E> {
        Ok(ConfigValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<ConfigValue, E> {
        Ok(ConfigValue::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<ConfigValue, E> {
        Ok(i64::try_from(v).map_or(ConfigValue::Float(v as f64), ConfigValue::Integer))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<ConfigValue, E> {
        Ok(ConfigValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ConfigValue, E> {
        Ok(ConfigValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<ConfigValue, E> {
        Ok(ConfigValue::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<ConfigValue, E> {
        Ok(ConfigValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<ConfigValue, E> {
        Ok(ConfigValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<ConfigValue, D::Error> {
        ConfigValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<ConfigValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(ConfigValue::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<ConfigValue, A::Error> {
        let mut entries = Mapping::new();
        while let Some((key, value)) = map.next_entry::<ConfigValue, ConfigValue>()? {
            // non-string keys (`1: a`, `true: b`) are addressed by their text
            let key = match key {
                ConfigValue::String(s) => s,
                other => other.to_string(),
            };
            entries.insert(key, value);
        }
        Ok(ConfigValue::Mapping(entries))
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ConfigValueVisitor)
    }
}
