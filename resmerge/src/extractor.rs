//! Entry extraction for Android `strings.xml` content.
//!
//! Two independent passes over the same text:
//!
//! 1. A structural `quick-xml` pass that decodes every `<string name="…">`
//!    child of `<resources>` into a [`StringEntry`] (entities resolved,
//!    CDATA unwrapped, text accumulated across nested markup).
//! 2. A textual line scan that captures the verbatim source line of every
//!    single-line `<string>` element, leading whitespace stripped.
//!
//! Neither pass feeds the other. Raw lines are what reconstruction emits, so
//! they never travel through a parser/serializer round-trip; decoded entries
//! are what diffing compares. Multi-line `<string>` elements appear only in
//! the decoded view.

use std::collections::HashMap;

use lazy_static::lazy_static;
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use regex::Regex;

use crate::{error::Error, types::StringEntry};

lazy_static! {
    static ref STRING_NAME_RE: Regex =
        Regex::new(r#"<string\s[^>]*\bname\s*=\s*"([^"]*)""#).expect("valid name attribute regex");
}

/// Both views of one parsed file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    /// Decoded entries in document order. Duplicate names keep their first
    /// position and last value, like repeated map insertion.
    pub entries: Vec<StringEntry>,
    /// Verbatim text of each single-line `<string>` element, keyed by name.
    pub raw_lines: HashMap<String, String>,
}

/// Parses raw `strings.xml` text into decoded entries plus raw lines.
///
/// Returns [`Error::MissingRoot`] when the document's root element is not
/// `<resources>`, [`Error::XmlParse`] when the text is not well-formed.
pub fn extract_entries(text: &str) -> Result<Extraction, Error> {
    let entries = parse_string_entries(text)?;
    let raw_lines = scan_raw_lines(text);
    Ok(Extraction { entries, raw_lines })
}

fn parse_string_entries(text: &str) -> Result<Vec<StringEntry>, Error> {
    let mut reader = Reader::from_str(text);

    let mut entries: Vec<StringEntry> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut saw_root = false;
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if depth == 0 {
                    if e.name().as_ref() != b"resources" {
                        return Err(Error::MissingRoot);
                    }
                    saw_root = true;
                    depth = 1;
                } else if depth == 1 && e.name().as_ref() == b"string" {
                    let name = name_attribute(e)?;
                    let value = read_text_content(&mut reader)?;
                    // Children without a name attribute are not addressable
                    // entries; their text is still consumed above.
                    if let Some(name) = name {
                        upsert(&mut entries, &mut positions, name, value);
                    }
                } else {
                    depth += 1;
                }
            }
            Ok(Event::Empty(ref e)) => {
                if depth == 0 {
                    if e.name().as_ref() != b"resources" {
                        return Err(Error::MissingRoot);
                    }
                    saw_root = true;
                } else if depth == 1
                    && e.name().as_ref() == b"string"
                    && let Some(name) = name_attribute(e)?
                {
                    upsert(&mut entries, &mut positions, name, String::new());
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e)),
        }
    }

    if !saw_root {
        return Err(Error::MissingRoot);
    }
    if depth != 0 {
        return Err(Error::InvalidResource(
            "unexpected end of file inside <resources>".to_string(),
        ));
    }

    Ok(entries)
}

fn name_attribute(e: &BytesStart) -> Result<Option<String>, Error> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::InvalidResource(e.to_string()))?;
        if attr.key.as_ref() == b"name" {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

/// Accumulates the decoded text content of the current element, through any
/// nested markup (`<b>`, `<u>`…), until its matching end tag.
fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, Error> {
    let mut value = String::new();
    let mut depth = 1usize;

    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => value.push_str(&t.unescape().map_err(Error::XmlParse)?),
            Ok(Event::CData(c)) => {
                let bytes = c.into_inner();
                value.push_str(&String::from_utf8_lossy(&bytes));
            }
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => {
                return Err(Error::InvalidResource(
                    "unexpected end of file inside <string>".to_string(),
                ));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e)),
        }
    }

    Ok(value.trim().to_string())
}

fn upsert(
    entries: &mut Vec<StringEntry>,
    positions: &mut HashMap<String, usize>,
    name: String,
    value: String,
) {
    if let Some(&at) = positions.get(&name) {
        entries[at].value = value;
    } else {
        positions.insert(name.clone(), entries.len());
        entries.push(StringEntry { name, value });
    }
}

/// A line qualifies only when the whole element sits on it and carries a
/// `name` attribute; the stored value keeps everything after the leading
/// whitespace, inline comments included.
fn scan_raw_lines(text: &str) -> HashMap<String, String> {
    let mut raw_lines = HashMap::new();
    for line in text.lines() {
        if !(line.contains("<string") && line.contains("</string>")) {
            continue;
        }
        if let Some(caps) = STRING_NAME_RE.captures(line) {
            raw_lines.insert(caps[1].to_string(), line.trim_start().to_string());
        }
    }
    raw_lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_basic_entries() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<resources>
    <string name="hello">Hello</string>
    <string name="bye">Goodbye</string>
</resources>
"#;
        let extraction = extract_entries(xml).unwrap();
        assert_eq!(extraction.entries.len(), 2);
        assert_eq!(extraction.entries[0], StringEntry::new("hello", "Hello"));
        assert_eq!(extraction.entries[1], StringEntry::new("bye", "Goodbye"));
        assert_eq!(
            extraction.raw_lines.get("hello").map(String::as_str),
            Some(r#"<string name="hello">Hello</string>"#)
        );
    }

    #[test]
    fn test_entities_decoded_in_entries_but_not_raw_lines() {
        let xml = r#"<resources>
    <string name="amp">Fish &amp; Chips</string>
</resources>"#;
        let extraction = extract_entries(xml).unwrap();
        assert_eq!(extraction.entries[0].value, "Fish & Chips");
        assert_eq!(
            extraction.raw_lines["amp"],
            r#"<string name="amp">Fish &amp; Chips</string>"#
        );
    }

    #[test]
    fn test_nested_markup_contributes_text_only() {
        let xml = r#"<resources>
    <string name="styled">Hello <b>bold</b> world</string>
</resources>"#;
        let extraction = extract_entries(xml).unwrap();
        assert_eq!(extraction.entries[0].value, "Hello bold world");
    }

    #[test]
    fn test_cdata_is_transparent() {
        let xml = r#"<resources>
    <string name="cdata"><![CDATA[a < b]]></string>
</resources>"#;
        let extraction = extract_entries(xml).unwrap();
        assert_eq!(extraction.entries[0].value, "a < b");
    }

    #[test]
    fn test_multiline_element_has_entry_but_no_raw_line() {
        let xml = r#"<resources>
    <string name="long">
        spread over lines
    </string>
</resources>"#;
        let extraction = extract_entries(xml).unwrap();
        assert_eq!(extraction.entries[0].value, "spread over lines");
        assert!(extraction.raw_lines.get("long").is_none());
    }

    #[test]
    fn test_raw_line_keeps_inline_comment() {
        let xml = "<resources>\n    <string name=\"a\">1</string> <!-- keep me -->\n</resources>";
        let extraction = extract_entries(xml).unwrap();
        assert_eq!(
            extraction.raw_lines["a"],
            "<string name=\"a\">1</string> <!-- keep me -->"
        );
    }

    #[test]
    fn test_duplicate_names_last_value_first_position() {
        let xml = r#"<resources>
    <string name="dup">first</string>
    <string name="other">x</string>
    <string name="dup">second</string>
</resources>"#;
        let extraction = extract_entries(xml).unwrap();
        assert_eq!(extraction.entries.len(), 2);
        assert_eq!(extraction.entries[0], StringEntry::new("dup", "second"));
        assert_eq!(extraction.entries[1].name, "other");
    }

    #[test]
    fn test_self_closing_string_is_empty() {
        let xml = r#"<resources><string name="empty"/></resources>"#;
        let extraction = extract_entries(xml).unwrap();
        assert_eq!(extraction.entries[0], StringEntry::new("empty", ""));
    }

    #[test]
    fn test_plurals_and_arrays_are_not_entries() {
        let xml = r#"<resources>
    <string name="hello">Hello</string>
    <plurals name="apples">
        <item quantity="one">One apple</item>
        <item quantity="other">%d apples</item>
    </plurals>
    <string-array name="tabs">
        <item>First</item>
    </string-array>
</resources>"#;
        let extraction = extract_entries(xml).unwrap();
        assert_eq!(extraction.entries.len(), 1);
        assert_eq!(extraction.entries[0].name, "hello");
    }

    #[test]
    fn test_string_without_name_is_skipped() {
        let xml = r#"<resources><string>anonymous</string></resources>"#;
        let extraction = extract_entries(xml).unwrap();
        assert!(extraction.entries.is_empty());
    }

    #[test]
    fn test_missing_root_element() {
        let err = extract_entries(r#"<manifest><string name="a">1</string></manifest>"#).unwrap_err();
        assert!(matches!(err, Error::MissingRoot));
    }

    #[test]
    fn test_empty_document_is_missing_root() {
        let err = extract_entries("   ").unwrap_err();
        assert!(matches!(err, Error::MissingRoot));
    }

    #[test]
    fn test_unclosed_element_is_an_error() {
        let result = extract_entries(r#"<resources><string name="a">1"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_mismatched_tags_are_an_error() {
        let result = extract_entries(r#"<resources><string name="a">1</wrong></resources>"#);
        assert!(result.is_err());
    }
}
