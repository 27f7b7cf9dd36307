//! Shared loading for the preview and merge commands: scan both sides,
//! apply the mapping document (or fall back to suggestions), and bind.

use std::fs;
use std::path::PathBuf;

use resmerge::{
    BoundSource, LocaleResource, MergeOptions, SourceXmlFile, bind_sources, locate_res_dir,
    parse_mapping_document, reconcile_mappings, scan_project_resources, scan_source_dir,
    suggest_mapping,
};

use crate::validation::{validate_dir_path, validate_file_path};

pub struct MergeContext {
    pub res_dir: PathBuf,
    pub bound: Vec<BoundSource>,
    pub targets: Vec<LocaleResource>,
}

pub fn load_sources(sources_dir: &str) -> Result<Vec<SourceXmlFile>, String> {
    validate_dir_path(sources_dir)?;
    scan_source_dir(sources_dir.as_ref()).map_err(|e| format!("Failed to scan {}: {}", sources_dir, e))
}

pub fn load_merge_context(
    sources_dir: &str,
    project_dir: &str,
    mappings_path: Option<&str>,
) -> Result<MergeContext, String> {
    validate_dir_path(project_dir)?;
    let scan = load_sources(sources_dir)?;

    let res_dir = locate_res_dir(project_dir.as_ref())
        .ok_or_else(|| format!("No res directory with values* folders under {}", project_dir))?;
    let targets = scan_project_resources(&res_dir)
        .map_err(|e| format!("Failed to scan {}: {}", res_dir.display(), e))?;

    let mappings = match mappings_path {
        Some(path) => {
            validate_file_path(path)?;
            let text = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path, e))?;
            let document = parse_mapping_document(&text)
                .map_err(|e| format!("Invalid configuration file {}: {}", path, e))?;
            reconcile_mappings(&document.mappings, &scan)
        }
        None => scan.iter().map(suggest_mapping).collect(),
    };

    let bound = bind_sources(&scan, &mappings);
    Ok(MergeContext {
        res_dir,
        bound,
        targets,
    })
}

pub fn merge_options(keep_existing: bool, comment: Option<String>) -> MergeOptions {
    MergeOptions::default()
        .with_replace_existing(!keep_existing)
        .with_comment(comment)
}
