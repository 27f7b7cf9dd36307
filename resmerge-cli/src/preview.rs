use resmerge::{LineKind, MergePreview, build_merge_preview};

use crate::context::{load_merge_context, merge_options};

#[derive(Debug, Clone)]
pub struct PreviewOptions {
    pub sources: String,
    pub project: String,
    pub mappings: Option<String>,
    pub keep_existing: bool,
    pub json: bool,
}

pub fn run_preview_command(opts: PreviewOptions) -> Result<(), String> {
    let context = load_merge_context(&opts.sources, &opts.project, opts.mappings.as_deref())?;
    let options = merge_options(opts.keep_existing, None);
    let previews = build_merge_preview(&context.bound, &context.targets, &options);

    if opts.json {
        let rendered = serde_json::to_string_pretty(&previews)
            .map_err(|e| format!("Failed to serialize preview JSON: {}", e))?;
        println!("{}", rendered);
    } else {
        println!("{}", render_human(&previews));
    }

    Ok(())
}

fn render_human(previews: &[MergePreview]) -> String {
    let mut lines = Vec::new();
    lines.push("=== Merge preview ===".to_string());
    lines.push(format!("Locales: {}", previews.len()));

    for preview in previews {
        let new_file = if preview.is_new_file { " (new file)" } else { "" };
        lines.push(format!(
            "\nFolder: {} (locale {}){}",
            preview.folder_name, preview.locale, new_file
        ));
        lines.push(format!(
            "  source: {} entries, target: {} entries, add: {}, overwrite: {}",
            preview.source_count, preview.target_count, preview.add_count, preview.overwrite_count
        ));
        if !preview.has_changes() {
            lines.push("  nothing to merge".to_string());
            continue;
        }
        for line in &preview.lines {
            let marker = match line.kind {
                LineKind::Unchanged => "   ",
                LineKind::UpdateOld => " - ",
                LineKind::UpdateNew | LineKind::Add => " + ",
            };
            lines.push(format!("{}{:>4} {}", marker, line.line_number, line.content));
        }
    }

    lines.join("\n")
}
