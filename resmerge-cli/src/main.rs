mod context;
mod merge;
mod preview;
mod scan;
mod validation;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a translations directory and show suggested folder mappings.
    Scan {
        /// Directory containing translated *.xml files
        #[arg(short, long)]
        sources: String,

        /// Write the mapping document to this JSON file for later editing
        #[arg(long)]
        save_mappings: Option<String>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Preview the per-locale line diff a merge would produce.
    Preview {
        /// Directory containing translated *.xml files
        #[arg(short, long)]
        sources: String,

        /// Android project root (or its res directory)
        #[arg(short, long)]
        project: String,

        /// Mapping document to apply instead of the suggestions
        #[arg(long)]
        mappings: Option<String>,

        /// Keep existing values; only genuinely new keys are added
        #[arg(long)]
        keep_existing: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Merge translations into the project's res/values-* directories.
    Merge {
        /// Directory containing translated *.xml files
        #[arg(short, long)]
        sources: String,

        /// Android project root (or its res directory)
        #[arg(short, long)]
        project: String,

        /// Mapping document to apply instead of the suggestions
        #[arg(long)]
        mappings: Option<String>,

        /// Keep existing values; only genuinely new keys are added
        #[arg(long)]
        keep_existing: bool,

        /// Marker comment inserted before the relocated entries
        #[arg(long)]
        comment: Option<String>,

        /// Report what would be written without touching any file
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let result = match args.commands {
        Commands::Scan {
            sources,
            save_mappings,
            json,
        } => scan::run_scan_command(scan::ScanOptions {
            sources,
            save_mappings,
            json,
        }),
        Commands::Preview {
            sources,
            project,
            mappings,
            keep_existing,
            json,
        } => preview::run_preview_command(preview::PreviewOptions {
            sources,
            project,
            mappings,
            keep_existing,
            json,
        }),
        Commands::Merge {
            sources,
            project,
            mappings,
            keep_existing,
            comment,
            dry_run,
        } => merge::run_merge_command(merge::MergeCommandOptions {
            sources,
            project,
            mappings,
            keep_existing,
            comment,
            dry_run,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
