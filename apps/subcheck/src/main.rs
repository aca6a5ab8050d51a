//! Subcheck CLI binary entry point.
//! Delegates to the library for extraction, validation and rendering.

use clap::Parser;
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;
use subcheck::cli::{Cli, Commands};
use subcheck::config;
use subcheck::error::SubmissionError;
use subcheck::lint::{validate_submission, Validators};
use subcheck::models::{CheckRecord, ExtractedFile, ValidationSummary};
use subcheck::output;
use subcheck::submission;
use subcheck::utils::{error_prefix, info_prefix, note_prefix};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SUBCHECK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = std::env::var("SUBCHECK_LOG_JSON").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", error_prefix(), msg);
    exit(2);
}

fn note_missing_config(eff: &config::Effective) {
    if config::load_config(&eff.repo_root).is_none() {
        eprintln!("{} No subcheck.toml found; using defaults.", note_prefix());
    }
}

fn read_archive(path: &str) -> Vec<u8> {
    fs::read(path).unwrap_or_else(|e| fail(format!("cannot read archive {}: {}", path, e)))
}

/// Exit 1 when any file carries an error issue.
fn exit_for(summary: &ValidationSummary) {
    if summary.total_errors > 0 {
        exit(1);
    }
}

/// Expand paths and globs into files keyed by their path relative to `root`.
fn collect_files(patterns: &[String], root: &Path) -> Vec<ExtractedFile> {
    let root = fs::canonicalize(root).unwrap_or_else(|e| fail(format!("invalid --root {}: {}", root.display(), e)));
    let mut targets: Vec<PathBuf> = Vec::new();
    for pat in patterns {
        let entries = glob(pat).unwrap_or_else(|e| fail(format!("bad glob pattern '{}': {}", pat, e)));
        targets.extend(entries.flatten().filter(|p| p.is_file()));
    }
    let mut files = Vec::new();
    for path in targets {
        let abs = fs::canonicalize(&path).unwrap_or(path);
        let key = pathdiff::diff_paths(&abs, &root).unwrap_or_else(|| abs.clone());
        let key = key.to_string_lossy().replace('\\', "/");
        match fs::read_to_string(&abs) {
            Ok(content) => files.push(ExtractedFile {
                path: key,
                content: content.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(content),
            }),
            Err(e) => warn!(path = %abs.display(), error = %e, "skipping unreadable file"),
        }
    }
    files
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Check {
            archive,
            output,
            save,
            repo_root,
        } => {
            let eff = config::resolve_effective(repo_root.as_deref(), output.as_deref());
            note_missing_config(&eff);
            let bytes = read_archive(&archive);
            let validators = Validators::configured(&eff.rules);
            let summary = submission::check_archive(&bytes, &eff.limits, &validators).unwrap_or_else(|e| fail(e));
            if let Some(path) = save.as_deref() {
                let record = CheckRecord::new(summary.clone(), chrono::Utc::now());
                if let Err(e) = submission::save_record(Path::new(path), &record) {
                    fail(format!("cannot save record {}: {}", path, e));
                }
                if eff.output != "json" {
                    eprintln!("{} Saved check record to {}", info_prefix(), path);
                }
            }
            output::print_summary(&summary, &eff.output);
            exit_for(&summary);
        }
        Commands::Validate { paths, root, output } => {
            let eff = config::resolve_effective(None, output.as_deref());
            note_missing_config(&eff);
            let root = PathBuf::from(root.unwrap_or_else(|| ".".to_string()));
            let files = collect_files(&paths, &root);
            let summary = validate_submission(&files, &Validators::configured(&eff.rules));
            if summary.total_files == 0 {
                fail(SubmissionError::NoValidatableFiles);
            }
            output::print_summary(&summary, &eff.output);
            exit_for(&summary);
        }
        Commands::Extract {
            archive,
            output,
            repo_root,
        } => {
            let eff = config::resolve_effective(repo_root.as_deref(), output.as_deref());
            let bytes = read_archive(&archive);
            match submission::preview_archive(&bytes, &eff.preview_extensions, &eff.limits) {
                Ok(files) => output::print_preview(&files, &eff.output),
                Err(e) => fail(SubmissionError::from(e)),
            }
        }
        Commands::Report { record, output } => {
            let record = submission::load_record(Path::new(&record))
                .unwrap_or_else(|e| fail(format!("cannot load record {}: {}", record, e)));
            match output.as_deref().unwrap_or("markdown") {
                // the stored report is what the student saw
                "markdown" => print!("{}", record.report),
                other => output::print_summary(&record.validation_results, other),
            }
        }
    }
}
