//! Submission pipeline: archive bytes in, summary and report out.
//!
//! Archive failures abort the whole check; once the archive is open the
//! pipeline always yields a summary. Check records are the persisted form of
//! one run and can be re-rendered later without recomputation.

use crate::archive::{self, ExtractLimits, ExtractOptions};
use crate::error::{ArchiveError, RecordError, Result, SubmissionError};
use crate::lint::{validate_submission, Validators};
use crate::models::{CheckRecord, ExtractedFile, ValidationSummary};
use crate::output::generate_report;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::path::Path;

/// Extract the html/css/js entries of an archive and validate them.
///
/// An archive without any validatable entry is rejected as a whole.
pub fn check_archive(bytes: &[u8], limits: &ExtractLimits, validators: &Validators) -> Result<ValidationSummary> {
    let files = archive::extract(bytes, &ExtractOptions::validation(limits.clone()))?;
    if files.is_empty() {
        return Err(SubmissionError::NoValidatableFiles);
    }
    Ok(validate_submission(&files, validators))
}

/// Extract an archive for display: wider allow-list, lossy text decoding.
pub fn preview_archive(
    bytes: &[u8],
    extensions: &[String],
    limits: &ExtractLimits,
) -> std::result::Result<Vec<ExtractedFile>, ArchiveError> {
    archive::extract(bytes, &ExtractOptions::preview(extensions.to_vec(), limits.clone()))
}

impl CheckRecord {
    /// Freeze a summary together with its rendered report.
    pub fn new(summary: ValidationSummary, validated_at: DateTime<Utc>) -> Self {
        let report = generate_report(&summary);
        Self {
            validation_results: summary,
            report,
            validated_at: validated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

pub fn save_record(path: &Path, record: &CheckRecord) -> std::result::Result<(), RecordError> {
    let text = serde_json::to_string_pretty(record)?;
    fs::write(path, text + "\n")?;
    Ok(())
}

pub fn load_record(path: &Path) -> std::result::Result<CheckRecord, RecordError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::fixtures::build_zip;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn test_check_archive_validates_only_web_files() {
        let zip = build_zip(&[
            ("project/", b"", false),
            ("project/app.js", b"const x = 1;\n", true),
            ("project/style.css", b"body { color: red; }\n", false),
            ("project/photo.jpg", &[0xFF, 0xD8, 0xFF, 0x00], false),
        ]);
        let s = check_archive(&zip, &ExtractLimits::default(), &Validators::default()).unwrap();
        assert_eq!(s.total_files, 2);
        assert_eq!(s.overall_score, 100);
        assert!(s.js_validation && s.css_validation && !s.html_validation);
    }

    #[test]
    fn test_invalid_archive_aborts() {
        let err = check_archive(b"PK not really", &ExtractLimits::default(), &Validators::default()).unwrap_err();
        assert!(matches!(err, SubmissionError::Archive(ArchiveError::InvalidArchive(_))));
        assert!(err.to_string().starts_with("could not read your archive"));
    }

    #[test]
    fn test_archive_without_web_files_is_rejected() {
        let zip = build_zip(&[("notes.txt", b"hello", false)]);
        let err = check_archive(&zip, &ExtractLimits::default(), &Validators::default()).unwrap_err();
        assert!(matches!(err, SubmissionError::NoValidatableFiles));
        assert_eq!(err.to_string(), "no valid files found for validation");
    }

    #[test]
    fn test_preview_uses_wider_allow_list() {
        let zip = build_zip(&[("notes.txt", b"hello", false), ("a.js", b"1;\n", false), ("x.bin", b"zz", false)]);
        let files = preview_archive(&zip, &["txt".to_string(), "js".to_string()], &ExtractLimits::default()).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["notes.txt", "a.js"]);
    }

    #[test]
    fn test_record_round_trip_keeps_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("record.json");
        let files = vec![ExtractedFile {
            path: "a.js".into(),
            content: "const a = \"x\"\n".into(),
        }];
        let summary = validate_submission(&files, &Validators::default());
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let record = CheckRecord::new(summary, at);
        assert_eq!(record.validated_at, "2024-03-01T12:30:00.000Z");
        assert!(record.report.contains("**Overall Score: 84/100**"));

        save_record(&path, &record).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["validationResults"]["totalFiles"], 1);
        assert!(raw["validatedAt"].is_string());

        let back = load_record(&path).unwrap();
        assert_eq!(back.validation_results, record.validation_results);
        assert_eq!(back.report, generate_report(&back.validation_results));
    }

    #[test]
    fn test_load_record_errors() {
        let dir = tempdir().unwrap();
        assert!(matches!(load_record(&dir.path().join("missing.json")), Err(RecordError::Io(_))));
        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{").unwrap();
        assert!(matches!(load_record(&bad), Err(RecordError::Json(_))));
    }
}
