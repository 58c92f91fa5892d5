//! Shared records and the intrinsic state they carry.

use crate::error::CacheError;
use crate::key::CacheKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Handle to a record owned by a factory.
pub type SharedRecord<T> = Arc<Flyweight<T>>;

/// State that may be shared between many logical entities.
///
/// `attributes` returns the fields in their fixed order; the cache key is
/// derived from them without regard to that order.
pub trait Intrinsic {
    fn attributes(&self) -> Vec<&str>;

    fn cache_key(&self) -> CacheKey {
        CacheKey::derive(&self.attributes())
    }
}

// =============================================================================
// Attributes: ordered sequence of strings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Vec<String>);

impl Attributes {
    pub fn new(values: Vec<String>) -> Self {
        Attributes(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }
}

impl Intrinsic for Attributes {
    fn attributes(&self) -> Vec<&str> {
        self.0.iter().map(String::as_str).collect()
    }
}

impl From<Vec<String>> for Attributes {
    fn from(values: Vec<String>) -> Self {
        Attributes(values)
    }
}

impl<const N: usize> From<[&str; N]> for Attributes {
    fn from(values: [&str; N]) -> Self {
        values.into_iter().collect()
    }
}

impl From<&[&str]> for Attributes {
    fn from(values: &[&str]) -> Self {
        values.iter().copied().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Attributes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Attributes(iter.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<&Value> for Attributes {
    type Error = CacheError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let items = match value {
            Value::Null => {
                return Err(CacheError::invalid_input("attribute sequence is missing"));
            }
            Value::Array(items) => items,
            other => {
                return Err(CacheError::invalid_input(format!(
                    "expected an array of strings, got {}",
                    json_type_name(other)
                )));
            }
        };

        items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(CacheError::invalid_input(format!(
                    "attribute {index} must be a string, got {}",
                    json_type_name(other)
                ))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Attributes)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// CarModel: named intrinsic fields
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarModel {
    pub brand: String,
    pub model: String,
    pub color: String,
}

impl CarModel {
    pub fn new(brand: impl Into<String>, model: impl Into<String>, color: impl Into<String>) -> Self {
        CarModel {
            brand: brand.into(),
            model: model.into(),
            color: color.into(),
        }
    }
}

impl Intrinsic for CarModel {
    fn attributes(&self) -> Vec<&str> {
        vec![&self.brand, &self.model, &self.color]
    }
}

impl TryFrom<Attributes> for CarModel {
    type Error = CacheError;

    fn try_from(attributes: Attributes) -> Result<Self, Self::Error> {
        match <[String; 3]>::try_from(attributes.0) {
            Ok([brand, model, color]) => Ok(CarModel { brand, model, color }),
            Err(values) => Err(CacheError::invalid_input(format!(
                "a car model needs brand, model and color, got {} attributes",
                values.len()
            ))),
        }
    }
}

// =============================================================================
// Flyweight: the immutable shared record
// =============================================================================

/// Immutable record stored once per cache key.
///
/// Extrinsic state is never kept here; it is handed to [`Flyweight::operation`]
/// for the duration of a single call.
#[derive(Debug)]
pub struct Flyweight<T> {
    key: CacheKey,
    intrinsic: T,
}

impl<T: Intrinsic> Flyweight<T> {
    pub(crate) fn new(intrinsic: T) -> Self {
        Flyweight::with_key(intrinsic.cache_key(), intrinsic)
    }

    pub(crate) fn with_key(key: CacheKey, intrinsic: T) -> Self {
        Flyweight { key, intrinsic }
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn intrinsic(&self) -> &T {
        &self.intrinsic
    }

    /// Renders the shared state alongside the caller's unique state as JSON.
    pub fn operation<E: Serialize + ?Sized>(&self, extrinsic: &E) -> Result<String, CacheError> {
        let shared = serde_json::to_string(&self.intrinsic.attributes())?;
        let unique = serde_json::to_string(extrinsic)?;
        Ok(format!(
            "Flyweight: Displaying shared `{shared}` and unique `{unique}` state."
        ))
    }

    /// Identity comparison; equal values held in different records are distinct.
    pub fn same_instance(a: &SharedRecord<T>, b: &SharedRecord<T>) -> bool {
        Arc::ptr_eq(a, b)
    }
}
