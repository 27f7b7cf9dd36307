use std::fs;

use chrono::{SecondsFormat, Utc};
use resmerge::{reconcile_mappings, render_mapping_document};

use crate::context::load_sources;
use crate::validation::validate_output_path;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub sources: String,
    pub save_mappings: Option<String>,
    pub json: bool,
}

pub fn run_scan_command(opts: ScanOptions) -> Result<(), String> {
    if let Some(path) = &opts.save_mappings {
        validate_output_path(path)?;
    }

    let scan = load_sources(&opts.sources)?;
    let mappings = reconcile_mappings(&[], &scan);

    if opts.json {
        let rendered = serde_json::to_string_pretty(&mappings)
            .map_err(|e| format!("Failed to serialize scan JSON: {}", e))?;
        println!("{}", rendered);
    } else {
        println!("=== Scan ===");
        println!("Files: {}", mappings.len());
        for mapping in &mappings {
            let state = if mapping.enabled { "" } else { " [disabled]" };
            println!(
                "  {} -> {} ({} entries, locale {}){}",
                mapping.source_file_name,
                mapping.target_folder,
                mapping.entry_count,
                mapping.locale,
                state
            );
        }
    }

    if let Some(path) = &opts.save_mappings {
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let document = render_mapping_document(&mappings, &stamp)
            .map_err(|e| format!("Failed to serialize mapping document: {}", e))?;
        fs::write(path, document).map_err(|e| format!("Failed to write {}: {}", path, e))?;
        println!("Mappings written: {}", path);
    }

    Ok(())
}
