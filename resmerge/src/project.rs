//! Filesystem layer: scanning translation sources and Android project
//! resources, and executing the merge's write phase.
//!
//! Everything here wraps the pure core in path-based I/O. Scans read to
//! completion before any diffing; writes happen one locale at a time and a
//! failing locale never prevents the remaining ones, though the overall
//! report turns unsuccessful. Already-written files are not rolled back —
//! callers re-scan afterward to see true on-disk state.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    diff::build_merge_preview,
    error::Error,
    extractor::{Extraction, extract_entries},
    locale::{locale_from_folder, resolve_locale},
    types::{BoundSource, LocaleResource, MergeOptions, SourceXmlFile},
};

/// Depth limit when searching a project tree for its `res` directory.
const RES_SEARCH_DEPTH: usize = 5;

/// One successfully written locale file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    pub folder_name: String,
    pub path: PathBuf,
    pub add_count: usize,
    pub overwrite_count: usize,
    pub is_new_file: bool,
}

/// One locale whose write failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeFailure {
    pub folder_name: String,
    pub message: String,
}

/// Outcome of the write phase. Partial application is accepted:
/// `success` is false as soon as any locale failed, while `written` still
/// lists everything that landed on disk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MergeReport {
    pub success: bool,
    pub written: Vec<WrittenFile>,
    pub failures: Vec<MergeFailure>,
}

impl MergeReport {
    /// A representative error message, when any locale failed.
    pub fn first_error(&self) -> Option<&str> {
        self.failures.first().map(|f| f.message.as_str())
    }
}

/// Scans a flat directory of translated `*.xml` files.
///
/// A file that fails structural parsing stays in the scan with zero entries
/// — its mapping survives reconciliation but contributes nothing to a merge.
pub fn scan_source_dir(dir: &Path) -> Result<Vec<SourceXmlFile>, Error> {
    let entries = fs::read_dir(dir)
        .map_err(|e| Error::DirectoryAccess(format!("{}: {}", dir.display(), e)))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::DirectoryAccess(e.to_string()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !file_name.to_ascii_lowercase().ends_with(".xml") {
            continue;
        }

        let text = fs::read_to_string(&path)?;
        let extraction = match extract_entries(&text) {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!("malformed source file {}: {}", path.display(), e);
                Extraction::default()
            }
        };
        files.push(SourceXmlFile {
            file_name: file_name.to_string(),
            entries: extraction.entries,
            raw_lines: extraction.raw_lines,
            suggested: resolve_locale(file_name),
        });
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    debug!("scanned {} source files in {}", files.len(), dir.display());
    Ok(files)
}

/// Finds the Android `res` directory under `root`: either `root` itself
/// already contains `values*` subfolders, or a bounded-depth search locates
/// a directory that does (covering the usual `*/src/main/res` layout).
pub fn locate_res_dir(root: &Path) -> Option<PathBuf> {
    fn search(dir: &Path, depth: usize) -> Option<PathBuf> {
        if has_values_folder(dir) {
            return Some(dir.to_path_buf());
        }
        if depth == 0 {
            return None;
        }
        let entries = fs::read_dir(dir).ok()?;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str())
                && name.starts_with('.')
            {
                continue;
            }
            if let Some(found) = search(&path, depth - 1) {
                return Some(found);
            }
        }
        None
    }
    search(root, RES_SEARCH_DEPTH)
}

fn has_values_folder(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries.flatten().any(|entry| {
        entry.path().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| name == "values" || name.starts_with("values-"))
    })
}

/// Reads one [`LocaleResource`] per `values*` folder whose `strings.xml`
/// parses. A malformed target is treated as absent (the merge takes the
/// new-file path for that locale) — lenient by design, and logged so the
/// risk of overwriting unparseable content stays visible.
pub fn scan_project_resources(res_dir: &Path) -> Result<Vec<LocaleResource>, Error> {
    let entries = fs::read_dir(res_dir)
        .map_err(|e| Error::DirectoryAccess(format!("{}: {}", res_dir.display(), e)))?;

    let mut resources = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::DirectoryAccess(e.to_string()))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(folder_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if folder_name != "values" && !folder_name.starts_with("values-") {
            continue;
        }

        let file = path.join("strings.xml");
        if !file.is_file() {
            continue;
        }
        let text = fs::read_to_string(&file)?;
        match extract_entries(&text) {
            Ok(extraction) => resources.push(LocaleResource {
                locale: locale_from_folder(folder_name),
                folder_name: folder_name.to_string(),
                entries: extraction.entries,
                raw_content: Some(text),
            }),
            Err(e) => {
                warn!("treating malformed target {} as absent: {}", file.display(), e);
            }
        }
    }

    resources.sort_by(|a, b| a.folder_name.cmp(&b.folder_name));
    debug!(
        "scanned {} locale resources in {}",
        resources.len(),
        res_dir.display()
    );
    Ok(resources)
}

/// Executes the merge: builds previews from a consistent snapshot of
/// `sources`/`targets` and writes each changed locale's `strings.xml`.
/// Locales with nothing pending are skipped, which makes a rerun against
/// the updated target a no-op.
pub fn apply_merge(
    res_dir: &Path,
    sources: &[BoundSource],
    targets: &[LocaleResource],
    options: &MergeOptions,
) -> MergeReport {
    let previews = build_merge_preview(sources, targets, options);

    let mut report = MergeReport::default();
    for preview in &previews {
        if !preview.has_changes() {
            debug!("{}: nothing to write", preview.folder_name);
            continue;
        }

        let folder = res_dir.join(&preview.folder_name);
        let written = fs::create_dir_all(&folder)
            .map_err(Error::Io)
            .and_then(|_| {
                let path = folder.join("strings.xml");
                fs::write(&path, preview.merged_text())?;
                Ok(path)
            });

        match written {
            Ok(path) => {
                info!(
                    "{}: wrote {} added, {} updated",
                    preview.folder_name, preview.add_count, preview.overwrite_count
                );
                report.written.push(WrittenFile {
                    folder_name: preview.folder_name.clone(),
                    path,
                    add_count: preview.add_count,
                    overwrite_count: preview.overwrite_count,
                    is_new_file: preview.is_new_file,
                });
            }
            Err(e) => {
                warn!("{}: write failed: {}", preview.folder_name, e);
                report.failures.push(MergeFailure {
                    folder_name: preview.folder_name.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    report.success = report.failures.is_empty();
    report
}

/// Convenience join of a scan and its mappings straight to bound sources,
/// for callers that do not hold a persisted mapping list.
pub fn bind_with_suggestions(scan: &[SourceXmlFile]) -> Vec<BoundSource> {
    let mappings: Vec<_> = scan.iter().map(crate::mapping::suggest_mapping).collect();
    crate::mapping::bind_sources(scan, &mappings)
}
