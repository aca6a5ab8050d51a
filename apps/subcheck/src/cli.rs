//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "subcheck",
    version,
    about = "Validate student web project submissions",
    long_about = "Subcheck — extract ZIP-packaged web projects, lint their HTML/CSS/JS and render a graded report.\n\nConfiguration precedence: CLI > subcheck.toml > defaults.",
    after_help = "Examples:\n  subcheck check project.zip\n  subcheck check project.zip --output markdown --save record.json\n  subcheck validate 'site/**/*.html' site/style.css --root site\n  subcheck extract project.zip --output json\n  subcheck report record.json",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for checking, previewing and re-rendering.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current subcheck version.")]
    Version,
    /// Validate a submission archive
    #[command(
        about = "Check a submission archive",
        long_about = "Extract the html/css/js entries of a ZIP archive, validate them and print the result. Exits 1 when any error is found and 2 when the archive cannot be read.",
        after_help = "Examples:\n  subcheck check project.zip\n  subcheck check project.zip --output json --save record.json"
    )]
    Check {
        #[arg(help = "Path to the ZIP archive")]
        archive: String,
        #[arg(long, help = "Output mode: human|json|markdown (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Write the check record (summary, report, timestamp) as JSON")]
        save: Option<String>,
        #[arg(long, help = "Directory used to discover subcheck.toml (default: current dir)")]
        repo_root: Option<String>,
    },
    /// Validate files already on disk
    #[command(
        about = "Validate loose files",
        long_about = "Validate html/css/js files matched by paths or glob patterns. Result paths are relative to --root.",
        after_help = "Examples:\n  subcheck validate index.html style.css\n  subcheck validate 'site/**/*' --root site --output markdown"
    )]
    Validate {
        #[arg(required = true, help = "Files or glob patterns")]
        paths: Vec<String>,
        #[arg(long, help = "Root that result paths are made relative to (default: current dir)")]
        root: Option<String>,
        #[arg(long, help = "Output mode: human|json|markdown (default: human)")]
        output: Option<String>,
    },
    /// Preview the contents of an archive
    #[command(
        about = "Preview archive entries",
        long_about = "List the text entries of an archive using the preview extension allow-list. Binary data is decoded lossily."
    )]
    Extract {
        #[arg(help = "Path to the ZIP archive")]
        archive: String,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Directory used to discover subcheck.toml (default: current dir)")]
        repo_root: Option<String>,
    },
    /// Re-render a saved check record
    #[command(
        about = "Render a saved record",
        long_about = "Print a check record written by `check --save` without validating again."
    )]
    Report {
        #[arg(help = "Path to the record JSON")]
        record: String,
        #[arg(long, help = "Output mode: human|json|markdown (default: markdown)")]
        output: Option<String>,
    },
}
