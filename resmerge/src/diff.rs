//! The merge diff engine.
//!
//! Classifies every source entry against the target folder's existing
//! resources and renders a line-addressable preview of the file the merge
//! would produce. Matching between source and target is by **target folder
//! name** — a user may remap a source file anywhere, so the folder is the
//! ground truth for which physical file gets touched.
//!
//! The preview holds one line per physical line of the target's original
//! content plus synthesized lines for the relocated entries; dropping the
//! `UpdateOld` lines and joining the rest reproduces exactly what
//! [`crate::reconstruct::reconstruct_file`] writes for the same inputs.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::{
    reconstruct,
    types::{BoundSource, LocaleResource, MergeOptions, StringEntry},
};

/// Classification of one source entry against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    Add,
    Update,
    Unchanged,
}

/// One classified entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffItem {
    pub key: String,
    pub kind: DiffKind,
    pub new_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
}

/// Classification of one preview line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Copied verbatim from the target.
    Unchanged,
    /// The target's old line for a replaced key; excluded from the merged
    /// file (rendered struck-through in previews).
    UpdateOld,
    /// The relocated replacement line for an existing key.
    UpdateNew,
    /// A line that exists only in the merged file.
    Add,
}

/// One renderable/reconstructable line of the preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub line_number: usize,
    pub content: String,
    pub kind: LineKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// The complete per-locale preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergePreview {
    pub locale: String,
    pub folder_name: String,
    pub source_count: usize,
    pub target_count: usize,
    pub add_count: usize,
    pub overwrite_count: usize,
    pub is_new_file: bool,
    pub added: Vec<DiffItem>,
    pub updated: Vec<DiffItem>,
    pub unchanged: Vec<DiffItem>,
    /// Entries the merge will write (adds + updates), in source order.
    pub pending: Vec<StringEntry>,
    pub lines: Vec<DiffLine>,
}

impl MergePreview {
    /// The merged file text this preview describes: every line except the
    /// `UpdateOld` ones, in order, with a trailing newline.
    pub fn merged_text(&self) -> String {
        let mut out = self
            .lines
            .iter()
            .filter(|l| l.kind != LineKind::UpdateOld)
            .map(|l| l.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        out.push('\n');
        out
    }

    pub fn has_changes(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Builds one preview per bound source, matched to targets by folder name.
pub fn build_merge_preview(
    sources: &[BoundSource],
    targets: &[LocaleResource],
    options: &MergeOptions,
) -> Vec<MergePreview> {
    let target_by_folder: HashMap<&str, &LocaleResource> = targets
        .iter()
        .map(|t| (t.folder_name.as_str(), t))
        .collect();

    sources
        .iter()
        .map(|source| {
            preview_for(
                source,
                target_by_folder.get(source.folder_name.as_str()).copied(),
                options,
            )
        })
        .collect()
}

fn preview_for(
    source: &BoundSource,
    target: Option<&LocaleResource>,
    options: &MergeOptions,
) -> MergePreview {
    let mut added = Vec::new();
    let mut updated = Vec::new();
    let mut unchanged = Vec::new();
    let mut pending = Vec::new();

    for entry in &source.entries {
        match target.and_then(|t| t.value_of(&entry.name)) {
            None => {
                added.push(DiffItem {
                    key: entry.name.clone(),
                    kind: DiffKind::Add,
                    new_value: entry.value.clone(),
                    old_value: None,
                });
                pending.push(entry.clone());
            }
            Some(old) if old != entry.value => {
                if options.replace_existing {
                    updated.push(DiffItem {
                        key: entry.name.clone(),
                        kind: DiffKind::Update,
                        new_value: entry.value.clone(),
                        old_value: Some(old.to_string()),
                    });
                    pending.push(entry.clone());
                } else {
                    // Skip semantics: the file keeps its current value.
                    unchanged.push(DiffItem {
                        key: entry.name.clone(),
                        kind: DiffKind::Unchanged,
                        new_value: old.to_string(),
                        old_value: None,
                    });
                }
            }
            Some(_) => unchanged.push(DiffItem {
                key: entry.name.clone(),
                kind: DiffKind::Unchanged,
                new_value: entry.value.clone(),
                old_value: None,
            }),
        }
    }

    // Target keys the source never mentions still show up, so the preview
    // renders the full resulting file rather than just the delta.
    let source_keys: HashSet<&str> = source.entries.iter().map(|e| e.name.as_str()).collect();
    if let Some(target) = target {
        for entry in &target.entries {
            if !source_keys.contains(entry.name.as_str()) {
                unchanged.push(DiffItem {
                    key: entry.name.clone(),
                    kind: DiffKind::Unchanged,
                    new_value: entry.value.clone(),
                    old_value: None,
                });
            }
        }
    }

    let added_keys: HashSet<&str> = added.iter().map(|i| i.key.as_str()).collect();
    let raw_content = target.and_then(|t| t.raw_content.as_deref());
    let mut lines = match raw_content {
        Some(text) => existing_file_lines(text, &pending, &added_keys, options, &source.raw_lines),
        None => new_file_lines(&pending, options, &source.raw_lines),
    };
    for (i, line) in lines.iter_mut().enumerate() {
        line.line_number = i + 1;
    }

    MergePreview {
        locale: source.locale.clone(),
        folder_name: source.folder_name.clone(),
        source_count: source.entries.len(),
        target_count: target.map_or(0, |t| t.entries.len()),
        add_count: added.len(),
        overwrite_count: updated.len(),
        is_new_file: raw_content.is_none(),
        added,
        updated,
        unchanged,
        pending,
        lines,
    }
}

fn existing_file_lines(
    text: &str,
    pending: &[StringEntry],
    added_keys: &HashSet<&str>,
    options: &MergeOptions,
    raw_lines: &HashMap<String, String>,
) -> Vec<DiffLine> {
    let original = reconstruct::normalize_lines(text);
    let indent = reconstruct::detect_indent(&original);
    let replaced: HashSet<&str> = pending.iter().map(|e| e.name.as_str()).collect();

    let mut lines: Vec<DiffLine> = Vec::with_capacity(original.len() + pending.len() + 1);
    let mut skipping: Option<String> = None;
    for line in &original {
        if let Some(key) = skipping.clone() {
            lines.push(struck_line(line, Some(key)));
            if line.contains("</string>") {
                skipping = None;
            }
            continue;
        }
        if let Some(key) = reconstruct::opening_string_name(line)
            && replaced.contains(key)
        {
            let key = key.to_string();
            if !reconstruct::closes_string_element(line) {
                skipping = Some(key.clone());
            }
            lines.push(struck_line(line, Some(key)));
            continue;
        }
        lines.push(DiffLine {
            line_number: 0,
            content: line.clone(),
            kind: LineKind::Unchanged,
            key: None,
        });
    }

    let inserted = pending_diff_lines(pending, added_keys, options, raw_lines, &indent);
    let close_at = lines
        .iter()
        .position(|l| l.kind == LineKind::Unchanged && l.content.contains("</resources>"));
    match close_at {
        Some(at) => {
            lines.splice(at..at, inserted);
        }
        None => {
            lines.extend(inserted);
            lines.push(DiffLine {
                line_number: 0,
                content: "</resources>".to_string(),
                kind: LineKind::Add,
                key: None,
            });
        }
    }

    lines
}

fn new_file_lines(
    pending: &[StringEntry],
    options: &MergeOptions,
    raw_lines: &HashMap<String, String>,
) -> Vec<DiffLine> {
    let added_keys: HashSet<&str> = pending.iter().map(|e| e.name.as_str()).collect();
    let mut lines = vec![
        added_line(r#"<?xml version="1.0" encoding="utf-8"?>"#, None),
        added_line("<resources>", None),
    ];
    lines.extend(pending_diff_lines(
        pending,
        &added_keys,
        options,
        raw_lines,
        reconstruct::DEFAULT_INDENT,
    ));
    lines.push(added_line("</resources>", None));
    lines
}

/// The relocated entries (comment marker first), tagged `Add` for new keys
/// and `UpdateNew` for replaced ones. Rendering matches the reconstructor.
fn pending_diff_lines(
    pending: &[StringEntry],
    added_keys: &HashSet<&str>,
    options: &MergeOptions,
    raw_lines: &HashMap<String, String>,
    indent: &str,
) -> Vec<DiffLine> {
    let mut lines = Vec::with_capacity(pending.len() + 1);
    if let Some(comment) = options.comment.as_deref()
        && !comment.is_empty()
        && !pending.is_empty()
    {
        lines.push(added_line(&format!("{}<!-- {} -->", indent, comment), None));
    }
    for entry in pending {
        let content = reconstruct::render_entry_line(entry, raw_lines, indent);
        let kind = if added_keys.contains(entry.name.as_str()) {
            LineKind::Add
        } else {
            LineKind::UpdateNew
        };
        lines.push(DiffLine {
            line_number: 0,
            content,
            kind,
            key: Some(entry.name.clone()),
        });
    }
    lines
}

fn struck_line(content: &str, key: Option<String>) -> DiffLine {
    DiffLine {
        line_number: 0,
        content: content.to_string(),
        kind: LineKind::UpdateOld,
        key,
    }
}

fn added_line(content: &str, key: Option<String>) -> DiffLine {
    DiffLine {
        line_number: 0,
        content: content.to_string(),
        kind: LineKind::Add,
        key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconstruct::reconstruct_file;

    fn bound(folder: &str, entries: Vec<StringEntry>) -> BoundSource {
        BoundSource {
            file_name: format!("{}_strings.xml", folder),
            locale: folder.to_string(),
            folder_name: folder.to_string(),
            entries,
            raw_lines: HashMap::new(),
        }
    }

    fn target(folder: &str, raw: &str, entries: Vec<StringEntry>) -> LocaleResource {
        LocaleResource {
            locale: folder.to_string(),
            folder_name: folder.to_string(),
            entries,
            raw_content: Some(raw.to_string()),
        }
    }

    #[test]
    fn test_classification_add_update_unchanged() {
        let sources = vec![bound(
            "values-ar",
            vec![
                StringEntry::new("fresh", "new"),
                StringEntry::new("stale", "changed"),
                StringEntry::new("same", "kept"),
            ],
        )];
        let raw = "<resources>\n    <string name=\"stale\">old</string>\n    <string name=\"same\">kept</string>\n</resources>\n";
        let targets = vec![target(
            "values-ar",
            raw,
            vec![
                StringEntry::new("stale", "old"),
                StringEntry::new("same", "kept"),
            ],
        )];

        let previews = build_merge_preview(&sources, &targets, &MergeOptions::default());
        assert_eq!(previews.len(), 1);
        let preview = &previews[0];
        assert_eq!(preview.add_count, 1);
        assert_eq!(preview.overwrite_count, 1);
        assert_eq!(preview.added[0].key, "fresh");
        assert_eq!(preview.updated[0].key, "stale");
        assert_eq!(preview.updated[0].old_value.as_deref(), Some("old"));
        assert_eq!(preview.unchanged.len(), 1);
        assert!(!preview.is_new_file);
    }

    #[test]
    fn test_keep_existing_skips_updates() {
        let sources = vec![bound(
            "values",
            vec![StringEntry::new("stale", "changed")],
        )];
        let raw = "<resources>\n    <string name=\"stale\">old</string>\n</resources>\n";
        let targets = vec![target(
            "values",
            raw,
            vec![StringEntry::new("stale", "old")],
        )];

        let options = MergeOptions::default().with_replace_existing(false);
        let preview = &build_merge_preview(&sources, &targets, &options)[0];
        assert_eq!(preview.overwrite_count, 0);
        assert!(preview.pending.is_empty());
        // Skip semantics report the value the file keeps.
        assert_eq!(preview.unchanged[0].new_value, "old");
        assert_eq!(preview.merged_text(), raw);
    }

    #[test]
    fn test_untouched_target_keys_recorded_unchanged() {
        let sources = vec![bound("values", vec![StringEntry::new("a", "1")])];
        let raw = "<resources>\n    <string name=\"a\">1</string>\n    <string name=\"only_here\">x</string>\n</resources>\n";
        let targets = vec![target(
            "values",
            raw,
            vec![
                StringEntry::new("a", "1"),
                StringEntry::new("only_here", "x"),
            ],
        )];

        let preview = &build_merge_preview(&sources, &targets, &MergeOptions::default())[0];
        assert!(preview.unchanged.iter().any(|i| i.key == "only_here"));
        assert_eq!(preview.target_count, 2);
    }

    #[test]
    fn test_update_is_relocation_not_inline_edit() {
        let sources = vec![bound("values", vec![StringEntry::new("b", "two")])];
        let raw = "<resources>\n    <string name=\"a\">1</string>\n    <string name=\"b\">2</string>\n    <string name=\"c\">3</string>\n</resources>\n";
        let targets = vec![target(
            "values",
            raw,
            vec![
                StringEntry::new("a", "1"),
                StringEntry::new("b", "2"),
                StringEntry::new("c", "3"),
            ],
        )];

        let preview = &build_merge_preview(&sources, &targets, &MergeOptions::default())[0];
        let old_line = preview
            .lines
            .iter()
            .find(|l| l.kind == LineKind::UpdateOld)
            .unwrap();
        assert_eq!(old_line.key.as_deref(), Some("b"));
        let new_line = preview
            .lines
            .iter()
            .find(|l| l.kind == LineKind::UpdateNew)
            .unwrap();
        assert!(new_line.content.contains("two"));

        let merged = preview.merged_text();
        let a_at = merged.find("name=\"a\"").unwrap();
        let b_at = merged.find("name=\"b\"").unwrap();
        let c_at = merged.find("name=\"c\"").unwrap();
        assert!(a_at < c_at && c_at < b_at);
    }

    #[test]
    fn test_line_numbers_are_sequential() {
        let sources = vec![bound("values", vec![StringEntry::new("n", "v")])];
        let raw = "<resources>\n    <string name=\"a\">1</string>\n</resources>\n";
        let targets = vec![target("values", raw, vec![StringEntry::new("a", "1")])];

        let preview = &build_merge_preview(&sources, &targets, &MergeOptions::default())[0];
        for (i, line) in preview.lines.iter().enumerate() {
            assert_eq!(line.line_number, i + 1);
        }
    }

    #[test]
    fn test_new_file_synthetic_diff() {
        let sources = vec![bound(
            "values-de",
            vec![StringEntry::new("a", "eins"), StringEntry::new("b", "zwei")],
        )];
        let preview = &build_merge_preview(&sources, &[], &MergeOptions::default())[0];
        assert!(preview.is_new_file);
        assert_eq!(preview.target_count, 0);
        assert_eq!(preview.lines[0].content, r#"<?xml version="1.0" encoding="utf-8"?>"#);
        assert_eq!(preview.lines[1].content, "<resources>");
        assert!(preview.lines.iter().all(|l| l.kind == LineKind::Add));
        assert_eq!(preview.lines.last().unwrap().content, "</resources>");
    }

    #[test]
    fn test_preview_lines_match_reconstruction() {
        let raw = "<resources>\n    <string name=\"a\">1</string>\n    <string name=\"b\">2</string>\n</resources>\n";
        let mut source = bound(
            "values",
            vec![
                StringEntry::new("b", "two"),
                StringEntry::new("c", "three"),
            ],
        );
        source.raw_lines.insert(
            "c".to_string(),
            r#"<string name="c">three</string> <!-- from source -->"#.to_string(),
        );
        let targets = vec![target(
            "values",
            raw,
            vec![StringEntry::new("a", "1"), StringEntry::new("b", "2")],
        )];

        let options = MergeOptions::default().with_comment(Some("Imported".to_string()));
        let preview = &build_merge_preview(&[source.clone()], &targets, &options)[0];
        let reconstructed = reconstruct_file(
            Some(raw),
            &preview.pending,
            options.comment.as_deref(),
            &source.raw_lines,
        );
        assert_eq!(preview.merged_text(), reconstructed);
    }

    #[test]
    fn test_multiline_replaced_block_fully_struck() {
        let raw = "<resources>\n    <string name=\"long\">\n        old\n    </string>\n</resources>\n";
        let sources = vec![bound("values", vec![StringEntry::new("long", "new")])];
        let targets = vec![target(
            "values",
            raw,
            vec![StringEntry::new("long", "old")],
        )];

        let preview = &build_merge_preview(&sources, &targets, &MergeOptions::default())[0];
        let struck: Vec<_> = preview
            .lines
            .iter()
            .filter(|l| l.kind == LineKind::UpdateOld)
            .collect();
        assert_eq!(struck.len(), 3);
        assert!(struck.iter().all(|l| l.key.as_deref() == Some("long")));
        assert!(!preview.merged_text().contains("        old"));
    }
}
