//! Mapping coordination: the user-editable bindings from source files to
//! target folders, reconciled against every fresh scan without discarding
//! manual edits, plus the JSON interchange document they persist as.

use std::collections::HashMap;

use crate::{
    error::Error,
    types::{BoundSource, LocaleMapping, MappingDocument, SourceXmlFile},
};

/// A fresh mapping from the locale resolver's suggestion for this file.
pub fn suggest_mapping(file: &SourceXmlFile) -> LocaleMapping {
    LocaleMapping {
        source_file_name: file.file_name.clone(),
        target_folder: file.suggested.folder.clone(),
        locale: file.suggested.locale.clone(),
        enabled: true,
        entry_count: file.entry_count(),
    }
}

/// Reconciles an existing mapping list against a fresh scan.
///
/// Files already mapped keep their mapping untouched except for a refreshed
/// `entry_count`; new files get a suggestion; mappings whose file vanished
/// are dropped. The result is sorted by target folder for stable
/// presentation.
pub fn reconcile_mappings(
    existing: &[LocaleMapping],
    scan: &[SourceXmlFile],
) -> Vec<LocaleMapping> {
    let by_file_name: HashMap<&str, &LocaleMapping> = existing
        .iter()
        .map(|m| (m.source_file_name.as_str(), m))
        .collect();

    let mut reconciled: Vec<LocaleMapping> = scan
        .iter()
        .map(|file| match by_file_name.get(file.file_name.as_str()) {
            Some(mapping) => LocaleMapping {
                entry_count: file.entry_count(),
                ..(*mapping).clone()
            },
            None => suggest_mapping(file),
        })
        .collect();

    reconciled.sort_by(|a, b| a.target_folder.cmp(&b.target_folder));
    reconciled
}

/// Restores mappings to the resolver's suggestion, discarding manual edits.
/// With `file_name` given, only that mapping resets; otherwise all do. No
/// rescan is required — mappings whose file is absent from the scan are
/// left untouched. The result is re-sorted by target folder.
pub fn reset_mappings(
    mappings: &[LocaleMapping],
    scan: &[SourceXmlFile],
    file_name: Option<&str>,
) -> Vec<LocaleMapping> {
    let by_name: HashMap<&str, &SourceXmlFile> = scan
        .iter()
        .map(|f| (f.file_name.as_str(), f))
        .collect();

    let mut reset: Vec<LocaleMapping> = mappings
        .iter()
        .map(|mapping| {
            let applies = file_name.is_none_or(|n| n == mapping.source_file_name);
            match (applies, by_name.get(mapping.source_file_name.as_str())) {
                (true, Some(file)) => suggest_mapping(file),
                _ => mapping.clone(),
            }
        })
        .collect();

    reset.sort_by(|a, b| a.target_folder.cmp(&b.target_folder));
    reset
}

/// Joins enabled mappings back to their scanned files, producing the
/// (source, target-folder) pairs the diff engine consumes. Mappings whose
/// file is not in the scan contribute nothing.
pub fn bind_sources(scan: &[SourceXmlFile], mappings: &[LocaleMapping]) -> Vec<BoundSource> {
    mappings
        .iter()
        .filter(|m| m.enabled)
        .filter_map(|mapping| {
            scan.iter()
                .find(|f| f.file_name == mapping.source_file_name)
                .map(|file| BoundSource {
                    file_name: file.file_name.clone(),
                    locale: mapping.locale.clone(),
                    folder_name: mapping.target_folder.clone(),
                    entries: file.entries.clone(),
                    raw_lines: file.raw_lines.clone(),
                })
        })
        .collect()
}

/// Parses an interchange document. Anything that is not a JSON object with a
/// `mappings` array is [`Error::InvalidConfig`]; callers keep their current
/// in-memory mappings on failure.
pub fn parse_mapping_document(text: &str) -> Result<MappingDocument, Error> {
    serde_json::from_str(text).map_err(|e| Error::InvalidConfig(e.to_string()))
}

/// Renders the interchange document as pretty-printed JSON.
pub fn render_mapping_document(
    mappings: &[LocaleMapping],
    last_modified: &str,
) -> Result<String, Error> {
    let document = MappingDocument {
        mappings: mappings.to_vec(),
        last_modified: last_modified.to_string(),
    };
    serde_json::to_string_pretty(&document).map_err(Error::Parse)
}
