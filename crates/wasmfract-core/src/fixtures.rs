//! Test vector registry.
//!
//! A [`FixtureCatalog`] maps an exported function name to its
//! [`FunctionTestDescriptor`]. Catalogs are built once, either from static
//! Rust tables or from the JSON fixture format:
//!
//! ```json
//! {
//!   "add": {
//!     "description": "Add two complex numbers",
//!     "function": { "name": "add", "arity": { "input": ["f64","f64","f64","f64"], "output": ["f64","f64"] } },
//!     "testList": [ { "whenPassed": [5,3,2,2], "shouldGet": [7,5] } ]
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::datatype::InterfaceSignature;
use crate::value::Formatter;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid fixture json: {0}")]
    Json(#[from] serde_json::Error),
}

/// One concrete input/expected-output probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestVector {
    #[serde(rename = "whenPassed")]
    pub when_passed: Vec<f64>,
    #[serde(rename = "shouldGet")]
    pub should_get: Vec<f64>,
    #[serde(default, skip_serializing_if = "is_no_format")]
    pub formatter: Formatter,
}

fn is_no_format(f: &Formatter) -> bool {
    *f == Formatter::None
}

impl TestVector {
    #[must_use]
    pub fn new(when_passed: &[f64], should_get: &[f64]) -> Self {
        Self {
            when_passed: when_passed.to_vec(),
            should_get: should_get.to_vec(),
            formatter: Formatter::None,
        }
    }

    #[must_use]
    pub fn formatted(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }
}

/// Everything needed to probe one hosted function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTestDescriptor {
    pub name: String,
    pub signature: InterfaceSignature,
    pub description: String,
    pub vectors: Vec<TestVector>,
}

impl FunctionTestDescriptor {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        signature: InterfaceSignature,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            signature,
            description: description.into(),
            vectors: Vec::new(),
        }
    }

    /// Assign the vector list. Only used while fixtures are being set up.
    #[must_use]
    pub fn with_vectors(mut self, vectors: Vec<TestVector>) -> Self {
        self.vectors = vectors;
        self
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionRef {
    name: String,
    arity: InterfaceSignature,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FixtureRecord {
    description: String,
    function: FunctionRef,
    #[serde(rename = "testList", default)]
    test_list: Vec<TestVector>,
}

impl From<FixtureRecord> for FunctionTestDescriptor {
    fn from(record: FixtureRecord) -> Self {
        Self {
            name: record.function.name,
            signature: record.function.arity,
            description: record.description,
            vectors: record.test_list,
        }
    }
}

impl From<&FunctionTestDescriptor> for FixtureRecord {
    fn from(desc: &FunctionTestDescriptor) -> Self {
        Self {
            description: desc.description.clone(),
            function: FunctionRef {
                name: desc.name.clone(),
                arity: desc.signature.clone(),
            },
            test_list: desc.vectors.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A fixture shape problem. Advisory only: affected vectors still run and are
/// judged by the comparator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatIssue {
    pub key: String,
    pub vector_index: Option<usize>,
    pub message: String,
}

/// Function name to descriptor mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureCatalog {
    entries: BTreeMap<String, FunctionTestDescriptor>,
}

impl FixtureCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its function name, replacing any previous one.
    pub fn insert(&mut self, descriptor: FunctionTestDescriptor) -> Option<FunctionTestDescriptor> {
        self.entries.insert(descriptor.name.clone(), descriptor)
    }

    #[must_use]
    pub fn with(mut self, descriptor: FunctionTestDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    /// Fold another catalog into this one. Entries in `other` win.
    pub fn merge(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FunctionTestDescriptor> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of vectors across all descriptors.
    #[must_use]
    pub fn vector_count(&self) -> usize {
        self.entries.values().map(|d| d.vectors.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FunctionTestDescriptor)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse the JSON fixture format.
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        let records: BTreeMap<String, FixtureRecord> = serde_json::from_str(json)?;
        let entries = records
            .into_iter()
            .map(|(key, record)| (key, FunctionTestDescriptor::from(record)))
            .collect();
        Ok(Self { entries })
    }

    pub fn from_file(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let records: BTreeMap<&str, FixtureRecord> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), FixtureRecord::from(v)))
            .collect();
        serde_json::to_string_pretty(&records)
    }

    /// Check every vector against its declared signature.
    #[must_use]
    pub fn format_issues(&self) -> Vec<FormatIssue> {
        let mut issues = Vec::new();
        for (key, desc) in &self.entries {
            if key != &desc.name {
                issues.push(FormatIssue {
                    key: key.clone(),
                    vector_index: None,
                    message: format!("key '{key}' names function '{}'", desc.name),
                });
            }
            if desc.signature.output.is_empty() {
                issues.push(FormatIssue {
                    key: key.clone(),
                    vector_index: None,
                    message: String::from("signature declares no outputs"),
                });
            }
            if desc.vectors.is_empty() {
                issues.push(FormatIssue {
                    key: key.clone(),
                    vector_index: None,
                    message: String::from("no test vectors"),
                });
            }
            for (i, v) in desc.vectors.iter().enumerate() {
                if v.when_passed.len() != desc.signature.input_arity() {
                    issues.push(FormatIssue {
                        key: key.clone(),
                        vector_index: Some(i),
                        message: format!(
                            "whenPassed has {} values, signature takes {}",
                            v.when_passed.len(),
                            desc.signature.input_arity()
                        ),
                    });
                }
                if v.should_get.len() != desc.signature.output_arity() {
                    issues.push(FormatIssue {
                        key: key.clone(),
                        vector_index: Some(i),
                        message: format!(
                            "shouldGet has {} values, signature returns {}",
                            v.should_get.len(),
                            desc.signature.output_arity()
                        ),
                    });
                }
            }
        }
        issues
    }
}

impl FromIterator<FunctionTestDescriptor> for FixtureCatalog {
    fn from_iter<I: IntoIterator<Item = FunctionTestDescriptor>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for desc in iter {
            catalog.insert(desc);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::{FOUR_F64_IN_TWO_F64_OUT, FOUR_I32_IN_ONE_I32_OUT, TWO_F64_IN_TWO_F64_OUT};

    const ADD_FIXTURE: &str = r#"{
        "add": {
            "description": "Add two complex numbers",
            "function": { "name": "add", "arity": { "input": ["f64","f64","f64","f64"], "output": ["f64","f64"] } },
            "testList": [
                { "whenPassed": [5,3,2,2], "shouldGet": [7,5] },
                { "whenPassed": [5,3], "shouldGet": [8] }
            ]
        },
        "pixel_colour": {
            "description": "RGBA packing",
            "function": { "name": "pixel_colour", "arity": { "input": ["i32","i32","i32","i32"], "output": ["i32"] } },
            "testList": [
                { "whenPassed": [255,0,0,255], "shouldGet": [4294901760], "formatter": "hex" }
            ]
        }
    }"#;

    #[test]
    fn parses_fixture_format() {
        let catalog = FixtureCatalog::from_json(ADD_FIXTURE).expect("valid fixture json");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.vector_count(), 3);

        let add = catalog.get("add").unwrap();
        assert_eq!(add.signature, FOUR_F64_IN_TWO_F64_OUT);
        assert_eq!(add.vectors[0].formatter, Formatter::None);

        let colour = catalog.get("pixel_colour").unwrap();
        assert_eq!(colour.signature, FOUR_I32_IN_ONE_I32_OUT);
        assert_eq!(colour.vectors[0].formatter, Formatter::Hex);
    }

    #[test]
    fn format_issues_flag_arity_mismatch() {
        let catalog = FixtureCatalog::from_json(ADD_FIXTURE).unwrap();
        let issues = catalog.format_issues();
        assert_eq!(issues.len(), 2, "{issues:?}");
        assert!(issues.iter().all(|i| i.key == "add" && i.vector_index == Some(1)));
    }

    #[test]
    fn json_roundtrip_preserves_catalog() {
        let catalog = FixtureCatalog::new().with(
            FunctionTestDescriptor::new("conj", TWO_F64_IN_TWO_F64_OUT, "Conjugate")
                .with_vectors(vec![TestVector::new(&[7.0, 4.0], &[7.0, -4.0])]),
        );
        let json = catalog.to_json().unwrap();
        assert!(json.contains("\"testList\""));
        assert!(!json.contains("formatter"));
        assert_eq!(FixtureCatalog::from_json(&json).unwrap(), catalog);
    }

    #[test]
    fn merge_prefers_incoming_entries() {
        let mut base = FixtureCatalog::new()
            .with(FunctionTestDescriptor::new("conj", TWO_F64_IN_TWO_F64_OUT, "old"));
        base.merge(
            FixtureCatalog::new()
                .with(FunctionTestDescriptor::new("conj", TWO_F64_IN_TWO_F64_OUT, "new")),
        );
        assert_eq!(base.get("conj").unwrap().description, "new");
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(matches!(
            FixtureCatalog::from_json("{\"x\": 1}"),
            Err(FixtureError::Json(_))
        ));
    }
}
