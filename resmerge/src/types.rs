//! Core data model shared across the crate.
//! The extractor produces these; the diff engine and reconstructor consume
//! them. All collections are replaced wholesale on rescan, never mutated in
//! place.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::locale::LocaleTarget;

/// One `(name, value)` string-resource pair with the value fully decoded
/// (entities resolved, CDATA unwrapped).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StringEntry {
    pub name: String,
    pub value: String,
}

impl StringEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        StringEntry {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The string resources of one `values*` folder.
///
/// `raw_content` is present only for files read from an existing target
/// directory; a freshly-synthesized locale has none. Instances are read-only
/// once created and superseded by the next scan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocaleResource {
    pub locale: String,
    pub folder_name: String,
    pub entries: Vec<StringEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub raw_content: Option<String>,
}

impl LocaleResource {
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value.as_str())
    }
}

/// One translated XML file discovered in the source directory, with both
/// views the extractor produces: decoded entries and verbatim raw lines.
/// Immutable per scan; a rescan produces an entirely new set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceXmlFile {
    pub file_name: String,
    pub entries: Vec<StringEntry>,
    pub raw_lines: HashMap<String, String>,
    pub suggested: LocaleTarget,
}

impl SourceXmlFile {
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

/// A user-controlled binding from one source file to one target folder.
/// Identity key is `source_file_name`; `target_folder` and `enabled` survive
/// rescans, `entry_count` refreshes.
///
/// Serialized field names match the interchange document
/// (`{ "mappings": [...], "lastModified": ... }`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleMapping {
    pub source_file_name: String,
    pub target_folder: String,
    pub locale: String,
    pub enabled: bool,
    pub entry_count: usize,
}

/// A source file joined to its enabled mapping, ready for diffing against
/// the target folder's existing resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundSource {
    pub file_name: String,
    pub locale: String,
    pub folder_name: String,
    pub entries: Vec<StringEntry>,
    pub raw_lines: HashMap<String, String>,
}

/// Options controlling diff classification and reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    /// When false, keys that already exist in the target keep their current
    /// value (skip semantics); only genuinely new keys are written.
    pub replace_existing: bool,
    /// Optional marker comment inserted before the relocated entries.
    pub comment: Option<String>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            replace_existing: true,
            comment: None,
        }
    }
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replace_existing(mut self, replace_existing: bool) -> Self {
        self.replace_existing = replace_existing;
        self
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }
}

/// The durable interchange document for mapping rules.
/// `last_modified` is caller metadata; the library never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDocument {
    pub mappings: Vec<LocaleMapping>,
    #[serde(default)]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_modified: String,
}
