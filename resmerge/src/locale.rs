//! Locale resolution heuristics.
//!
//! Derives a locale code and Android `values*` folder name from a translated
//! file's name (`zh_CN_strings.xml`) or from an existing resource folder
//! (`values-pt-rBR`). This is a naming heuristic, not a BCP-47 parser;
//! ambiguous names (three-letter codes, script subtags) fall through to the
//! plain language-code rule. English is treated as the base locale and maps
//! to the unqualified `values` folder.

use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

/// A resolved locale code plus the `values*` folder it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocaleTarget {
    pub locale: String,
    pub folder: String,
}

impl LocaleTarget {
    fn base() -> Self {
        LocaleTarget {
            locale: "default".to_string(),
            folder: "values".to_string(),
        }
    }

    /// Parses the resolved code into a validated language identifier,
    /// converting the Android `-r` region qualifier to its BCP-47 form
    /// first. The base locale parses as English.
    pub fn language_identifier(&self) -> Option<LanguageIdentifier> {
        let code = if self.locale == "default" {
            "en".to_string()
        } else if let Some((lang, region)) = self.locale.split_once("-r") {
            format!("{}-{}", lang, region)
        } else {
            self.locale.clone()
        };
        code.parse().ok()
    }
}

/// Resolves a source file name to a locale code and target folder.
///
/// The name is stripped of its `.xml` extension and any `strings` affix,
/// then split on `_`/`-`. A two-letter second segment is read as a region
/// (`zh_CN` → `zh-rCN`, Android's `r` qualifier convention); a lone language
/// code maps to `values-{lang}`; an empty remainder or plain `en` maps to
/// the base `values` folder.
pub fn resolve_locale(file_name: &str) -> LocaleTarget {
    let stem = strip_xml_extension(file_name);

    let segments: Vec<&str> = stem
        .split(['_', '-'])
        .filter(|s| !s.is_empty())
        .filter(|s| !s.eq_ignore_ascii_case("strings") && !s.eq_ignore_ascii_case("string"))
        .collect();

    match segments.as_slice() {
        [] => LocaleTarget::base(),
        [lang] if lang.eq_ignore_ascii_case("en") => LocaleTarget::base(),
        [lang, region, ..]
            if region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            let locale = format!(
                "{}-r{}",
                lang.to_ascii_lowercase(),
                region.to_ascii_uppercase()
            );
            LocaleTarget {
                folder: format!("values-{}", locale),
                locale,
            }
        }
        [lang, ..] => {
            let locale = lang.to_ascii_lowercase();
            LocaleTarget {
                folder: format!("values-{}", locale),
                locale,
            }
        }
    }
}

/// Derives a locale code from an existing `values*` folder name.
/// Trusts the project structure: the suffix is not re-validated.
pub fn locale_from_folder(folder: &str) -> String {
    if folder == "values" {
        "default".to_string()
    } else if let Some(suffix) = folder.strip_prefix("values-") {
        suffix.to_string()
    } else {
        folder.to_string()
    }
}

fn strip_xml_extension(file_name: &str) -> &str {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".xml") {
        &file_name[..file_name.len() - 4]
    } else {
        file_name
    }
}
