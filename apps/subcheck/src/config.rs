//! Configuration discovery and effective settings resolution.
//!
//! Subcheck reads `subcheck.toml|yaml|yml` from the working root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `output`: `human`
//! - `limits`: 10 MiB archive, 50 entries, 50 MiB uncompressed
//! - `preview.extensions`: html, css, js, common images, txt, md, json
//! - `rules.{html,css,js}`: no overrides
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::archive::{ExtractLimits, PREVIEW_EXTENSIONS};
use crate::models::rules::RuleLevel;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_MAX_ARCHIVE_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MAX_ENTRIES: u64 = 50;
pub const DEFAULT_MAX_UNCOMPRESSED_BYTES: u64 = 50 * 1024 * 1024;

const CONFIG_NAMES: [&str; 3] = ["subcheck.toml", "subcheck.yaml", "subcheck.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Upload limits under `[limits]`.
pub struct LimitsCfg {
    pub max_archive_bytes: Option<u64>,
    pub max_entries: Option<u64>,
    pub max_uncompressed_bytes: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Preview listing settings under `[preview]`.
pub struct PreviewCfg {
    pub extensions: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
/// Per-validator rule level overrides, `[rules.html]` and friends.
pub struct RulesCfg {
    #[serde(default)]
    pub html: HashMap<String, RuleLevel>,
    #[serde(default)]
    pub css: HashMap<String, RuleLevel>,
    #[serde(default)]
    pub js: HashMap<String, RuleLevel>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `subcheck.toml|yaml`.
pub struct SubcheckConfig {
    pub output: Option<String>,
    pub limits: Option<LimitsCfg>,
    pub preview: Option<PreviewCfg>,
    #[serde(default)]
    pub rules: RulesCfg,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub output: String,
    pub limits: ExtractLimits,
    pub preview_extensions: Vec<String>,
    pub rules: RulesCfg,
}

/// Walk upward from `start` to detect the working root.
///
/// Stops when a `subcheck.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `SubcheckConfig` from `subcheck.toml` or `subcheck.yaml|yml` if present.
///
/// A file that cannot be read or parsed is logged and treated as absent.
pub fn load_config(root: &Path) -> Option<SubcheckConfig> {
    for name in CONFIG_NAMES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let text = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read config; using defaults");
                return None;
            }
        };
        let parsed = if name.ends_with(".toml") {
            toml::from_str::<SubcheckConfig>(&text).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<SubcheckConfig>(&text).map_err(|e| e.to_string())
        };
        return match parsed {
            Ok(cfg) => {
                debug!(path = %path.display(), "loaded config");
                Some(cfg)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid config; using defaults");
                None
            }
        };
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli_repo_root: Option<&str>, cli_output: Option<&str>) -> Effective {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let cfg = load_config(&repo_root).unwrap_or_default();

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let limits_cfg = cfg.limits.unwrap_or_default();
    let limits = ExtractLimits {
        max_archive_bytes: Some(limits_cfg.max_archive_bytes.unwrap_or(DEFAULT_MAX_ARCHIVE_BYTES)),
        max_entries: Some(limits_cfg.max_entries.unwrap_or(DEFAULT_MAX_ENTRIES)),
        max_uncompressed_bytes: Some(
            limits_cfg
                .max_uncompressed_bytes
                .unwrap_or(DEFAULT_MAX_UNCOMPRESSED_BYTES),
        ),
    };

    let preview_extensions = cfg
        .preview
        .and_then(|p| p.extensions)
        .map(|exts| {
            exts.into_iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect()
        })
        .unwrap_or_else(|| PREVIEW_EXTENSIONS.iter().map(|s| s.to_string()).collect());

    Effective {
        repo_root,
        output,
        limits,
        preview_extensions,
        rules: cfg.rules,
    }
}
