//! Decoded per-amplifier header cards.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::GeometryError;

/// Header keywords read by the resolver.
pub mod keys {
    pub const CHANNEL: &str = "CHANNEL";
    pub const DATASEC: &str = "DATASEC";
    pub const LTV1: &str = "LTV1";
    pub const LTV2: &str = "LTV2";
    pub const LTM1_1: &str = "LTM1_1";
    pub const LTM1_2: &str = "LTM1_2";
    pub const LTM2_1: &str = "LTM2_1";
    pub const LTM2_2: &str = "LTM2_2";
    /// First column name of a binary table; its presence marks a non-image extension.
    pub const TTYPE1: &str = "TTYPE1";
}

/// One decoded header value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HeaderValue {
    Int(i64),
    Float(f64),
    Str(String),
    /// A pixel section such as `[1:542,1:2022]`, 1-indexed and inclusive.
    Section { x: (i64, i64), y: (i64, i64) },
}

/// Read-only key lookup over one extension's header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmplifierMetadata {
    cards: HashMap<String, HeaderValue>,
}

impl AmplifierMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: HeaderValue) {
        self.cards.insert(key.into(), value);
    }

    pub fn with(mut self, key: impl Into<String>, value: HeaderValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn with_int(self, key: impl Into<String>, value: i64) -> Self {
        self.with(key, HeaderValue::Int(value))
    }

    pub fn with_float(self, key: impl Into<String>, value: f64) -> Self {
        self.with(key, HeaderValue::Float(value))
    }

    pub fn with_section(self, key: impl Into<String>, x: (i64, i64), y: (i64, i64)) -> Self {
        self.with(key, HeaderValue::Section { x, y })
    }

    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.cards.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.cards.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Binary-table extensions carry column names instead of image geometry.
    pub fn is_table(&self) -> bool {
        self.contains(keys::TTYPE1)
    }

    /// Required integer.
    pub fn int(&self, key: &'static str) -> Result<i64, GeometryError> {
        match self.get(key) {
            Some(HeaderValue::Int(v)) => Ok(*v),
            Some(_) => Err(GeometryError::InvalidField {
                key,
                expected: "an integer",
            }),
            None => Err(GeometryError::MissingField { key }),
        }
    }

    /// Required float. Integer cards are widened.
    pub fn float(&self, key: &'static str) -> Result<f64, GeometryError> {
        self.optional_float(key)?
            .ok_or(GeometryError::MissingField { key })
    }

    /// Optional float. Integer cards are widened.
    pub fn optional_float(&self, key: &'static str) -> Result<Option<f64>, GeometryError> {
        match self.get(key) {
            Some(HeaderValue::Float(v)) => Ok(Some(*v)),
            Some(HeaderValue::Int(v)) => Ok(Some(*v as f64)),
            Some(_) => Err(GeometryError::InvalidField {
                key,
                expected: "a number",
            }),
            None => Ok(None),
        }
    }

    /// Upper bounds of a required section card, as `(width, height)`.
    ///
    /// `[1:542,1:2022]` yields `(542, 2022)`.
    pub fn section_extent(&self, key: &'static str) -> Result<(usize, usize), GeometryError> {
        match self.get(key) {
            Some(HeaderValue::Section { x, y }) if x.1 > 0 && y.1 > 0 => {
                Ok((x.1 as usize, y.1 as usize))
            }
            Some(_) => Err(GeometryError::InvalidField {
                key,
                expected: "a section with positive upper bounds",
            }),
            None => Err(GeometryError::MissingField { key }),
        }
    }
}

impl FromIterator<(String, HeaderValue)> for AmplifierMetadata {
    fn from_iter<I: IntoIterator<Item = (String, HeaderValue)>>(iter: I) -> Self {
        Self {
            cards: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for AmplifierMetadata {
    type Item = (String, HeaderValue);
    type IntoIter = hashbrown::hash_map::IntoIter<String, HeaderValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.into_iter()
    }
}
