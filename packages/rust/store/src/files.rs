//! Shared-drive file handling for large snippet content.
//!
//! Stored files are addressed with `share://` URIs in the store; on disk
//! they live under the configured share directory.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use besluitpub_shared::{PublicatieError, Result};

/// Metadata of a file written to the shared drive.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub uuid: String,
    pub path: PathBuf,
    pub filename: String,
    pub size: u64,
}

impl FileMetadata {
    /// The `share://` form of the physical path.
    pub fn share_uri(&self, share_dir: &Path) -> String {
        let relative = self
            .path
            .strip_prefix(share_dir)
            .unwrap_or(&self.path)
            .to_string_lossy();
        format!("share://{relative}")
    }
}

/// Resolve a `share://` URI (or an already-resolved path) against the share
/// directory.
pub fn share_path(share_dir: &Path, reference: &str) -> PathBuf {
    match reference.strip_prefix("share://") {
        Some(relative) => share_dir.join(relative),
        None => PathBuf::from(reference),
    }
}

/// Read a stored file's text content.
pub fn read_share_file(share_dir: &Path, reference: &str) -> Result<String> {
    let path = share_path(share_dir, reference);
    std::fs::read_to_string(&path).map_err(|e| PublicatieError::io(path, e))
}

/// Write content to the shared drive under `<share>/<subdirs…>/<uuid>.html`.
pub fn persist_content_to_file(
    share_dir: &Path,
    content: &str,
    subdirs: &[&str],
) -> Result<FileMetadata> {
    let file_id = Uuid::now_v7().to_string();
    let filename = format!("{file_id}.html");

    let mut dir = share_dir.to_path_buf();
    for subdir in subdirs {
        dir = dir.join(subdir);
    }
    std::fs::create_dir_all(&dir).map_err(|e| PublicatieError::io(&dir, e))?;

    let path = dir.join(&filename);
    std::fs::write(&path, content).map_err(|e| PublicatieError::io(&path, e))?;

    Ok(FileMetadata {
        uuid: file_id,
        size: content.len() as u64,
        path,
        filename,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_share_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("besluitpub-share-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("create temp share dir");
        dir
    }

    #[test]
    fn share_uri_resolution_roundtrips() {
        let share = Path::new("/share");
        assert_eq!(
            share_path(share, "share://enriched-notulen/a.html"),
            PathBuf::from("/share/enriched-notulen/a.html")
        );
        assert_eq!(share_path(share, "/tmp/x.html"), PathBuf::from("/tmp/x.html"));
    }

    #[test]
    fn persisted_content_reads_back() {
        let share = temp_share_dir();
        let metadata = persist_content_to_file(&share, "<div>notulen</div>", &["enriched-notulen"])
            .expect("persist");

        assert!(metadata.filename.ends_with(".html"));
        assert_eq!(metadata.size, "<div>notulen</div>".len() as u64);
        assert!(
            metadata
                .share_uri(&share)
                .starts_with("share://enriched-notulen/")
        );

        let read = read_share_file(&share, &metadata.share_uri(&share)).expect("read back");
        assert_eq!(read, "<div>notulen</div>");

        let _ = std::fs::remove_dir_all(&share);
    }

    #[test]
    fn missing_files_surface_io_errors() {
        let share = temp_share_dir();
        let err = read_share_file(&share, "share://nope.html").expect_err("missing");
        assert!(err.is_retryable());
        let _ = std::fs::remove_dir_all(&share);
    }
}
