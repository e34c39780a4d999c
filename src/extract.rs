use std::fs::{self, File};
use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::config::{ARCHIVE_SUFFIX, DOCUMENT_SUFFIX};
use crate::error::ExtractError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractReport {
    pub archives: usize,
    pub failed: usize,
    pub documents: usize,
}

/// Unpack every archive under `source` (recursively) and copy the documents
/// inside them flat into `dest`. Same-named documents overwrite each other.
/// An archive that cannot be read is logged and counted, not fatal.
pub fn extract_archives(source: &Path, dest: &Path) -> Result<ExtractReport, ExtractError> {
    if !source.is_dir() {
        return Err(ExtractError::SourceNotFound(source.to_path_buf()));
    }
    fs::create_dir_all(dest)?;

    let mut report = ExtractReport::default();
    for entry in WalkDir::new(source) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_suffix(entry.file_name(), ARCHIVE_SUFFIX) {
            continue;
        }

        report.archives += 1;
        match extract_one(entry.path(), dest) {
            Ok(n) => {
                debug!("{}: {} documents", entry.path().display(), n);
                report.documents += n;
            }
            Err(e) => {
                warn!("Failed to extract {}: {}", entry.path().display(), e);
                report.failed += 1;
            }
        }
    }

    info!(
        "Extracted {} documents from {} archives ({} failed) into {}",
        report.documents,
        report.archives,
        report.failed,
        dest.display()
    );
    Ok(report)
}

/// One archive, unpacked into its own scratch directory. The directory is
/// removed when `scratch` drops, on success or error.
fn extract_one(archive: &Path, dest: &Path) -> Result<usize, ExtractError> {
    let scratch = tempfile::tempdir()?;
    let mut zip = ZipArchive::new(File::open(archive)?)?;
    zip.extract(scratch.path())?;

    let mut copied = 0;
    for entry in WalkDir::new(scratch.path()).into_iter().filter_map(Result::ok) {
        if entry.file_type().is_file() && is_document(entry.file_name()) {
            fs::copy(entry.path(), dest.join(entry.file_name()))?;
            copied += 1;
        }
    }
    Ok(copied)
}

fn has_suffix(name: &std::ffi::OsStr, suffix: &str) -> bool {
    name.to_str().is_some_and(|n| n.ends_with(suffix))
}

/// Documents only; `.` and `~` prefixes are hidden or editor lock files.
fn is_document(name: &std::ffi::OsStr) -> bool {
    name.to_str()
        .is_some_and(|n| n.ends_with(DOCUMENT_SUFFIX) && !n.starts_with(['.', '~']))
}

// ── Tests ──
