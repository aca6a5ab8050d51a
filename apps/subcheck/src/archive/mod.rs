//! Archive extraction: ZIP bytes in, `path -> text` entries out.
//!
//! The archive is parsed in memory (EOCD, central directory, local headers)
//! and entries are decoded as UTF-8 text. Extraction is parameterized by an
//! extension allow-list so unrelated binary assets are never decoded, and by
//! optional size/count limits supplied by the surrounding system.
//!
//! Any structural problem aborts the whole extraction with
//! `ArchiveError::InvalidArchive`; a partial map is never returned.
//!
//! Supported: STORED and DEFLATE entries, ZIP64 records. Not supported:
//! encryption (such entries are treated as unreadable and skipped),
//! multi-disk archives, other compression methods.

mod parser;
mod structures;

pub use parser::ZipParser;
pub use structures::*;

use crate::error::ArchiveError;
use crate::models::{extension_of, ExtractedFile};
use std::collections::HashSet;
use tracing::{debug, info};

/// Extensions requested by the validation pipeline.
pub const VALIDATED_EXTENSIONS: &[&str] = &["html", "css", "js"];

/// Extensions shown by the submission preview.
pub const PREVIEW_EXTENSIONS: &[&str] = &[
    "html", "css", "js", "png", "jpg", "jpeg", "gif", "svg", "txt", "md", "json",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Optional upper bounds enforced before any entry is decoded.
pub struct ExtractLimits {
    pub max_archive_bytes: Option<u64>,
    pub max_entries: Option<u64>,
    pub max_uncompressed_bytes: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What to do with entries whose bytes are not valid UTF-8 text.
pub enum TextPolicy {
    Skip,
    Lossy,
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Lowercase extensions without the dot; `None` keeps every file entry.
    pub extensions: Option<Vec<String>>,
    pub limits: ExtractLimits,
    pub text: TextPolicy,
}

impl ExtractOptions {
    /// Options used by the validation pipeline: html/css/js only, binary skipped.
    pub fn validation(limits: ExtractLimits) -> Self {
        Self {
            extensions: Some(VALIDATED_EXTENSIONS.iter().map(|s| s.to_string()).collect()),
            limits,
            text: TextPolicy::Skip,
        }
    }

    /// Options used by the preview listing: wider allow-list, lossy decoding.
    pub fn preview(extensions: Vec<String>, limits: ExtractLimits) -> Self {
        Self {
            extensions: Some(extensions),
            limits,
            text: TextPolicy::Lossy,
        }
    }

    fn allows(&self, path: &str) -> bool {
        match &self.extensions {
            None => true,
            Some(list) => match extension_of(path) {
                Some(ext) => list.iter().any(|e| e.eq_ignore_ascii_case(&ext)),
                None => false,
            },
        }
    }
}

fn check_limit(what: &'static str, limit: Option<u64>, actual: u64) -> Result<(), ArchiveError> {
    match limit {
        Some(limit) if actual > limit => Err(ArchiveError::LimitExceeded {
            what,
            limit,
            actual,
        }),
        _ => Ok(()),
    }
}

/// Extract the text entries of a ZIP archive in central-directory order.
///
/// Directory entries are skipped, duplicate names keep their first
/// occurrence and a leading UTF-8 BOM is removed from decoded text.
pub fn extract(bytes: &[u8], opts: &ExtractOptions) -> Result<Vec<ExtractedFile>, ArchiveError> {
    check_limit("archive size", opts.limits.max_archive_bytes, bytes.len() as u64)?;

    let parser = ZipParser::new(bytes);
    let entries = parser.entries()?;
    let files: Vec<&ZipEntry> = entries.iter().filter(|e| !e.is_directory).collect();

    check_limit("entry count", opts.limits.max_entries, files.len() as u64)?;
    let declared: u64 = files.iter().map(|e| e.uncompressed_size).fold(0, u64::saturating_add);
    check_limit("uncompressed size", opts.limits.max_uncompressed_bytes, declared)?;

    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for entry in files {
        if !opts.allows(&entry.file_name) {
            debug!(path = %entry.file_name, "skipping entry outside allow-list");
            continue;
        }
        if !seen.insert(entry.file_name.as_str()) {
            debug!(path = %entry.file_name, "skipping duplicate entry");
            continue;
        }
        if entry.is_encrypted() {
            debug!(path = %entry.file_name, "skipping encrypted entry");
            continue;
        }
        let data = parser.read_entry(entry)?;
        match decode_text(data, opts.text) {
            Some(content) => out.push(ExtractedFile {
                path: entry.file_name.clone(),
                content,
            }),
            None => debug!(path = %entry.file_name, "skipping non-text entry"),
        }
    }

    info!(entries = entries.len(), extracted = out.len(), "archive extracted");
    Ok(out)
}

/// Decode entry bytes as text according to the policy. Under `Skip`, data
/// that is not UTF-8 or carries NUL bytes counts as binary.
fn decode_text(data: Vec<u8>, policy: TextPolicy) -> Option<String> {
    let body = data.strip_prefix(&[0xEF, 0xBB, 0xBF][..]).unwrap_or(&data[..]);
    match policy {
        TextPolicy::Skip => {
            if body.contains(&0) {
                return None;
            }
            std::str::from_utf8(body).ok().map(str::to_string)
        }
        TextPolicy::Lossy => Some(String::from_utf8_lossy(body).into_owned()),
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::build_zip;
    use super::*;

    #[test]
    fn test_extract_filters_to_validated_extensions() {
        let zip = build_zip(&[
            ("site/", b"", false),
            ("site/index.html", b"<p>hi</p>", true),
            ("site/logo.png", &[0x89, b'P', b'N', b'G', 0, 1, 2], false),
            ("site/style.CSS", b"a { color: red; }\n", false),
            ("README.md", b"# readme", false),
        ]);
        let files = extract(&zip, &ExtractOptions::validation(ExtractLimits::default())).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["site/index.html", "site/style.CSS"]);
        assert_eq!(files[0].content, "<p>hi</p>");
    }

    #[test]
    fn test_preview_keeps_binary_lossy_and_skip_drops_it() {
        let zip = build_zip(&[("a.txt", &[0xFF, 0xFE, b'x'], false), ("b.js", &[b'x', 0, b'y'], false)]);
        let preview = extract(
            &zip,
            &ExtractOptions::preview(vec!["txt".into(), "js".into()], ExtractLimits::default()),
        )
        .unwrap();
        assert_eq!(preview.len(), 2);
        assert!(preview[0].content.ends_with('x'));

        let validation = extract(&zip, &ExtractOptions::validation(ExtractLimits::default())).unwrap();
        assert!(validation.is_empty());
    }

    #[test]
    fn test_bom_is_stripped_and_duplicates_keep_first() {
        let zip = build_zip(&[
            ("a.js", b"\xEF\xBB\xBFconst a = 1;\n", false),
            ("a.js", b"const b = 2;\n", false),
        ]);
        let files = extract(&zip, &ExtractOptions::validation(ExtractLimits::default())).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].content, "const a = 1;\n");
    }

    #[test]
    fn test_garbage_is_invalid_archive() {
        let err = extract(b"definitely not a zip file at all", &ExtractOptions::validation(ExtractLimits::default()))
            .unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidArchive(_)));
        let err = extract(b"", &ExtractOptions::validation(ExtractLimits::default())).unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidArchive(_)));
    }

    #[test]
    fn test_corrupted_data_fails_whole_extraction() {
        let mut zip = build_zip(&[("a.css", b"a { color: red; }\n", false), ("b.css", b"b {}\n", false)]);
        // flip a byte of the first payload; the CRC check must catch it
        let pos = LFH_SIZE + "a.css".len();
        zip[pos] ^= 0x20;
        let err = extract(&zip, &ExtractOptions::validation(ExtractLimits::default())).unwrap_err();
        assert!(err.to_string().contains("CRC mismatch"));
    }

    #[test]
    fn test_truncated_archive_is_invalid() {
        let zip = build_zip(&[("a.css", b"a { color: red; }\n", true)]);
        let cut = &zip[10..];
        assert!(extract(cut, &ExtractOptions::validation(ExtractLimits::default())).is_err());
    }

    #[test]
    fn test_limits_are_enforced() {
        let zip = build_zip(&[("a.js", b"1;\n", false), ("b.js", b"2;\n", false), ("c/", b"", false)]);
        let limits = ExtractLimits {
            max_entries: Some(1),
            ..Default::default()
        };
        let err = extract(&zip, &ExtractOptions::validation(limits)).unwrap_err();
        assert_eq!(
            err,
            ArchiveError::LimitExceeded {
                what: "entry count",
                limit: 1,
                actual: 2
            }
        );

        let limits = ExtractLimits {
            max_archive_bytes: Some(10),
            ..Default::default()
        };
        assert!(matches!(
            extract(&zip, &ExtractOptions::validation(limits)),
            Err(ArchiveError::LimitExceeded { what: "archive size", .. })
        ));

        let limits = ExtractLimits {
            max_uncompressed_bytes: Some(5),
            ..Default::default()
        };
        assert!(matches!(
            extract(&zip, &ExtractOptions::validation(limits)),
            Err(ArchiveError::LimitExceeded { what: "uncompressed size", .. })
        ));
    }

    #[test]
    fn test_zip64_size_at_u64_max_is_invalid() {
        use flate2::write::DeflateEncoder;
        use flate2::Compression;
        use std::io::Write;

        let data = b"a { color: red; }\n";
        let mut crc = flate2::Crc::new();
        crc.update(data);
        let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        let payload = enc.finish().unwrap();
        let name = b"a.css";

        let mut zip = Vec::new();
        zip.extend_from_slice(LFH_SIGNATURE);
        zip.extend_from_slice(&20u16.to_le_bytes());
        zip.extend_from_slice(&0u16.to_le_bytes());
        zip.extend_from_slice(&8u16.to_le_bytes());
        zip.extend_from_slice(&[0; 4]);
        zip.extend_from_slice(&crc.sum().to_le_bytes());
        zip.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        zip.extend_from_slice(&(data.len() as u32).to_le_bytes());
        zip.extend_from_slice(&(name.len() as u16).to_le_bytes());
        zip.extend_from_slice(&0u16.to_le_bytes());
        zip.extend_from_slice(name);
        zip.extend_from_slice(&payload);

        // central header saturates the size and moves it into a 0x0001 extra
        let mut cd = Vec::new();
        cd.extend_from_slice(CDFH_SIGNATURE);
        cd.extend_from_slice(&45u16.to_le_bytes());
        cd.extend_from_slice(&45u16.to_le_bytes());
        cd.extend_from_slice(&0u16.to_le_bytes());
        cd.extend_from_slice(&8u16.to_le_bytes());
        cd.extend_from_slice(&[0; 4]);
        cd.extend_from_slice(&crc.sum().to_le_bytes());
        cd.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        cd.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        cd.extend_from_slice(&(name.len() as u16).to_le_bytes());
        cd.extend_from_slice(&12u16.to_le_bytes());
        cd.extend_from_slice(&[0; 10]);
        cd.extend_from_slice(&0u32.to_le_bytes());
        cd.extend_from_slice(name);
        cd.extend_from_slice(&1u16.to_le_bytes());
        cd.extend_from_slice(&8u16.to_le_bytes());
        cd.extend_from_slice(&u64::MAX.to_le_bytes());

        let cd_offset = zip.len() as u32;
        zip.extend_from_slice(&cd);
        zip.extend_from_slice(EndOfCentralDirectory::SIGNATURE);
        zip.extend_from_slice(&[0; 4]);
        zip.extend_from_slice(&1u16.to_le_bytes());
        zip.extend_from_slice(&1u16.to_le_bytes());
        zip.extend_from_slice(&(cd.len() as u32).to_le_bytes());
        zip.extend_from_slice(&cd_offset.to_le_bytes());
        zip.extend_from_slice(&0u16.to_le_bytes());

        let err = extract(&zip, &ExtractOptions::validation(ExtractLimits::default())).unwrap_err();
        assert_eq!(err, ArchiveError::InvalidArchive("size mismatch for 'a.css'".to_string()));

        let limits = ExtractLimits {
            max_uncompressed_bytes: Some(1 << 20),
            ..Default::default()
        };
        assert!(matches!(
            extract(&zip, &ExtractOptions::validation(limits)),
            Err(ArchiveError::LimitExceeded { what: "uncompressed size", .. })
        ));
    }

    #[test]
    fn test_archive_with_comment_is_found() {
        let mut zip = build_zip(&[("a.js", b"1;\n", false)]);
        let n = zip.len();
        // rewrite comment length and append the comment
        zip[n - 2..].copy_from_slice(&5u16.to_le_bytes());
        zip.extend_from_slice(b"hello");
        let files = extract(&zip, &ExtractOptions::validation(ExtractLimits::default())).unwrap();
        assert_eq!(files.len(), 1);
    }
}
