//! File reconstruction: merges pending entries into a target's original text
//! without re-serializing anything it does not touch.
//!
//! Untouched lines are copied byte-for-byte. Entries being replaced are
//! removed from their original position and re-appended, together with new
//! entries, immediately before `</resources>` — relocation keeps every
//! recently-touched entry grouped at the bottom of the file instead of
//! scattering in-place edits through it. Output line endings are normalized
//! to `\n` with a trailing newline.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::StringEntry;

lazy_static! {
    // `<string\s` keeps `<string-array>` and `<plurals>` out of the match.
    static ref OPEN_STRING_RE: Regex =
        Regex::new(r#"<string\s[^>]*\bname\s*=\s*"([^"]*)""#).expect("valid opening tag regex");
    static ref INDENT_RE: Regex = Regex::new(r"^(\s+)<").expect("valid indent regex");
}

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;
pub(crate) const DEFAULT_INDENT: &str = "    ";

/// Produces the merged file text.
///
/// With `original` present, streams its lines, drops every `<string>` block
/// whose key is in `entries`, and inserts the optional `<!-- comment -->`
/// marker plus one line per entry (source raw line preferred, freshly
/// serialized otherwise) just before `</resources>`. A missing closing tag
/// is synthesized rather than treated as fatal. Without `original`, emits a
/// complete new document.
pub fn reconstruct_file(
    original: Option<&str>,
    entries: &[StringEntry],
    comment: Option<&str>,
    raw_lines: &HashMap<String, String>,
) -> String {
    match original {
        Some(text) => merge_into_existing(text, entries, comment, raw_lines),
        None => synthesize_new_file(entries, comment, raw_lines),
    }
}

fn merge_into_existing(
    text: &str,
    entries: &[StringEntry],
    comment: Option<&str>,
    raw_lines: &HashMap<String, String>,
) -> String {
    let lines = normalize_lines(text);
    let indent = detect_indent(&lines);
    let replaced: HashSet<&str> = entries.iter().map(|e| e.name.as_str()).collect();

    let mut kept: Vec<String> = Vec::new();
    let mut skipping = false;
    for line in &lines {
        if skipping {
            if line.contains("</string>") {
                skipping = false;
            }
            continue;
        }
        if let Some(key) = opening_string_name(line)
            && replaced.contains(key)
        {
            if !closes_string_element(line) {
                skipping = true;
            }
            continue;
        }
        kept.push(line.clone());
    }

    let inserted = pending_lines(entries, comment, raw_lines, &indent);
    match kept.iter().position(|l| l.contains("</resources>")) {
        Some(at) => {
            kept.splice(at..at, inserted);
        }
        None => {
            kept.extend(inserted);
            kept.push("</resources>".to_string());
        }
    }

    let mut out = kept.join("\n");
    out.push('\n');
    out
}

fn synthesize_new_file(
    entries: &[StringEntry],
    comment: Option<&str>,
    raw_lines: &HashMap<String, String>,
) -> String {
    let mut lines = vec![XML_DECLARATION.to_string(), "<resources>".to_string()];
    lines.extend(pending_lines(entries, comment, raw_lines, DEFAULT_INDENT));
    lines.push("</resources>".to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// The comment marker (only when something is actually written) followed by
/// one rendered line per entry, in the order given.
pub(crate) fn pending_lines(
    entries: &[StringEntry],
    comment: Option<&str>,
    raw_lines: &HashMap<String, String>,
    indent: &str,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    if let Some(comment) = comment
        && !comment.is_empty()
        && !entries.is_empty()
    {
        lines.push(format!("{}<!-- {} -->", indent, comment));
    }
    for entry in entries {
        lines.push(render_entry_line(entry, raw_lines, indent));
    }
    lines
}

/// Renders one entry: the caller-supplied raw line when one exists for the
/// key (preserving the source's own formatting and inline comments), else a
/// freshly escaped element.
pub(crate) fn render_entry_line(
    entry: &StringEntry,
    raw_lines: &HashMap<String, String>,
    indent: &str,
) -> String {
    match raw_lines.get(&entry.name) {
        Some(raw) => format!("{}{}", indent, raw),
        None => format!(
            "{}<string name=\"{}\">{}</string>",
            indent,
            entry.name,
            escape_value(&entry.value)
        ),
    }
}

/// Escapes `&`, `<`, `>` unless the value already contains an escaped
/// entity, which is taken as a signal the whole value is pre-escaped. A
/// literal ampersand adjacent to the substring `amp;` defeats the check;
/// known limitation, kept as-is.
pub(crate) fn escape_value(value: &str) -> String {
    if value.contains("&amp;") || value.contains("&lt;") || value.contains("&gt;") {
        return value.to_string();
    }
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// The key of a `<string name="…">` opening tag found on this line.
pub(crate) fn opening_string_name(line: &str) -> Option<&str> {
    OPEN_STRING_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Whether a line that opens a `<string>` element also finishes it, either
/// with a closing tag or by self-closing.
pub(crate) fn closes_string_element(line: &str) -> bool {
    line.contains("</string>") || line.trim_end().ends_with("/>")
}

/// The file's indentation unit: the nearest `^(\s+)<` line scanning backward
/// from `</resources>`, four spaces when nothing matches.
pub(crate) fn detect_indent(lines: &[String]) -> String {
    let close = lines
        .iter()
        .rposition(|l| l.contains("</resources>"))
        .unwrap_or(lines.len());
    for line in lines[..close].iter().rev() {
        if let Some(caps) = INDENT_RE.captures(line) {
            return caps[1].to_string();
        }
    }
    DEFAULT_INDENT.to_string()
}

/// Splits into lines with `\r\n`/stray-`\r` endings folded away.
pub(crate) fn normalize_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect()
}
