#![forbid(unsafe_code)]
//! Structure-preserving merge toolkit for Android `strings.xml` translations.
//!
//! Merges translated string-resource files into an existing project's
//! `res/values-*` directories while keeping every untouched line of the
//! target byte-identical — comments, attribute order, and indentation
//! included — and produces a line-level diff preview before anything is
//! written.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use resmerge::{MergeOptions, apply_merge, bind_with_suggestions,
//!     scan_project_resources, scan_source_dir};
//!
//! let sources = scan_source_dir(Path::new("translations"))?;
//! let targets = scan_project_resources(Path::new("app/src/main/res"))?;
//! let bound = bind_with_suggestions(&sources);
//! let report = apply_merge(
//!     Path::new("app/src/main/res"),
//!     &bound,
//!     &targets,
//!     &MergeOptions::default(),
//! );
//! assert!(report.success);
//! # Ok::<(), resmerge::Error>(())
//! ```
//!
//! # How merging works
//!
//! - Each source file is parsed twice, independently: a structural XML pass
//!   decodes entries for diffing, a textual pass captures verbatim raw lines
//!   for output. Reconstruction never round-trips untouched text through a
//!   serializer.
//! - Changed and added entries are **relocated**: removed from their
//!   original position and appended together just before `</resources>`,
//!   optionally under a marker comment, so recently-touched entries stay
//!   grouped and reviewable.
//! - Only the flat `<string name="…">` shape is modeled. Plurals, arrays,
//!   and anything else pass through as opaque unchanged lines.

pub mod diff;
pub mod error;
pub mod extractor;
pub mod locale;
pub mod mapping;
pub mod project;
pub mod reconstruct;
pub mod types;

// Re-export most used items for easy consumption
pub use crate::{
    diff::{DiffItem, DiffKind, DiffLine, LineKind, MergePreview, build_merge_preview},
    error::Error,
    extractor::{Extraction, extract_entries},
    locale::{LocaleTarget, locale_from_folder, resolve_locale},
    mapping::{
        bind_sources, parse_mapping_document, reconcile_mappings, render_mapping_document,
        reset_mappings, suggest_mapping,
    },
    project::{
        MergeFailure, MergeReport, WrittenFile, apply_merge, bind_with_suggestions,
        locate_res_dir, scan_project_resources, scan_source_dir,
    },
    reconstruct::reconstruct_file,
    types::{
        BoundSource, LocaleMapping, LocaleResource, MappingDocument, MergeOptions, SourceXmlFile,
        StringEntry,
    },
};
