use resmerge::{apply_merge, build_merge_preview};

use crate::context::{load_merge_context, merge_options};

#[derive(Debug, Clone)]
pub struct MergeCommandOptions {
    pub sources: String,
    pub project: String,
    pub mappings: Option<String>,
    pub keep_existing: bool,
    pub comment: Option<String>,
    pub dry_run: bool,
}

pub fn run_merge_command(opts: MergeCommandOptions) -> Result<(), String> {
    let context = load_merge_context(&opts.sources, &opts.project, opts.mappings.as_deref())?;
    let options = merge_options(opts.keep_existing, opts.comment);

    if opts.dry_run {
        let previews = build_merge_preview(&context.bound, &context.targets, &options);
        for preview in &previews {
            let new_file = if preview.is_new_file { " (new file)" } else { "" };
            println!(
                "{}: add {}, overwrite {}{}",
                preview.folder_name, preview.add_count, preview.overwrite_count, new_file
            );
        }
        println!("Dry run: nothing written.");
        return Ok(());
    }

    let report = apply_merge(&context.res_dir, &context.bound, &context.targets, &options);
    for written in &report.written {
        println!(
            "Wrote {} (add {}, overwrite {})",
            written.path.display(),
            written.add_count,
            written.overwrite_count
        );
    }
    for failure in &report.failures {
        eprintln!("Failed {}: {}", failure.folder_name, failure.message);
    }

    if report.success {
        println!("Merge complete: {} file(s) written.", report.written.len());
        Ok(())
    } else {
        Err(format!(
            "merge failed for {} locale(s): {}",
            report.failures.len(),
            report.first_error().unwrap_or("unknown error")
        ))
    }
}
