//! Product specification normalization.
//!
//! Catalog feeds deliver specifications in several shapes: structured
//! `{name, value, category}` objects (any field may be missing or null),
//! bare `"Name: Value"` strings from older imports, and occasional garbage
//! (nulls, numbers). Everything is resolved to [`Specification`] once, at
//! this boundary; entries that cannot produce a name and a value are
//! dropped rather than surfaced as errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category assigned to specifications that arrive without one.
pub const DEFAULT_CATEGORY: &str = "Other";

/// A normalized product specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    /// Specification name (e.g., "RAM").
    pub name: String,
    /// Observed value (e.g., "16GB").
    pub value: String,
    /// Grouping category, defaulted to [`DEFAULT_CATEGORY`].
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Specification {
    /// Create a specification, defaulting the category when absent.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        category: Option<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            category: category.unwrap_or(DEFAULT_CATEGORY).to_string(),
        }
    }
}

/// A raw specification entry as it appears in catalog data.
///
/// Deserialization never fails on a single entry: anything that is not a
/// structured object or a legacy string lands in `Malformed` and is
/// filtered out by [`normalize_specs`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecEntry {
    /// Structured entry. Fields may be absent, null, or non-string scalars.
    Entry {
        #[serde(default)]
        name: Option<Value>,
        #[serde(default)]
        value: Option<Value>,
        #[serde(default)]
        category: Option<Value>,
    },
    /// Legacy shape: a bare `"Name: Value"` string.
    Legacy(String),
    /// Anything else (null, numbers, arrays). Dropped during normalization.
    Malformed(Value),
}

impl SpecEntry {
    /// Resolve this entry to a canonical specification, if it has one.
    ///
    /// Returns `None` when the entry has no usable name or value. Numeric
    /// and boolean scalars coerce to their display strings; whitespace-only
    /// strings count as missing.
    pub fn normalize(&self) -> Option<Specification> {
        match self {
            SpecEntry::Entry {
                name,
                value,
                category,
            } => {
                let name = coerce_to_string(name.as_ref())?;
                let value = coerce_to_string(value.as_ref())?;
                let category = coerce_to_string(category.as_ref())
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
                Some(Specification {
                    name,
                    value,
                    category,
                })
            }
            SpecEntry::Legacy(s) => {
                let (name, value) = s.split_once(':')?;
                let name = name.trim();
                let value = value.trim();
                if name.is_empty() || value.is_empty() {
                    return None;
                }
                Some(Specification::new(name, value, None))
            }
            SpecEntry::Malformed(_) => None,
        }
    }
}

impl From<Specification> for SpecEntry {
    fn from(spec: Specification) -> Self {
        SpecEntry::Entry {
            name: Some(Value::String(spec.name)),
            value: Some(Value::String(spec.value)),
            category: Some(Value::String(spec.category)),
        }
    }
}

/// Normalize a raw entry list, dropping anything malformed.
pub fn normalize_specs(entries: &[SpecEntry]) -> Vec<Specification> {
    entries.iter().filter_map(SpecEntry::normalize).collect()
}

/// Coerce a JSON scalar to a non-empty string.
fn coerce_to_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
