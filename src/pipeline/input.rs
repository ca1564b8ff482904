//! Input resolution: normalise a manuscript path or URL to a local file.
//!
//! pdfium needs a file-system path, so URLs are downloaded into a `TempDir`
//! owned by the returned [`ResolvedInput`]; the file disappears when it is
//! dropped. PDFs are checked for the `%PDF` magic before returning so callers
//! get a meaningful error rather than a pdfium failure. Files ending in
//! `.txt`, `.md` or `.markdown` are taken as already-extracted text.

use crate::error::PosterError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

/// How the manuscript's text is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManuscriptKind {
    Pdf,
    Text,
}

/// The resolved input: a local path or a downloaded temp file.
pub enum ResolvedInput {
    Local { path: PathBuf, kind: ManuscriptKind },
    /// The `TempDir` is kept alive until processing completes.
    Downloaded {
        path: PathBuf,
        kind: ManuscriptKind,
        _temp_dir: TempDir,
    },
}

impl ResolvedInput {
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local { path, .. } => path,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }

    pub fn kind(&self) -> ManuscriptKind {
        match self {
            ResolvedInput::Local { kind, .. } | ResolvedInput::Downloaded { kind, .. } => *kind,
        }
    }
}

pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Text manuscripts are recognised by extension.
pub fn kind_for(path: &Path) -> ManuscriptKind {
    let is_text = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| TEXT_EXTENSIONS.iter().any(|t| e.eq_ignore_ascii_case(t)));
    if is_text {
        ManuscriptKind::Text
    } else {
        ManuscriptKind::Pdf
    }
}

/// Resolve the input string to a local manuscript file.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, PosterError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

fn resolve_local(path_str: &str) -> Result<ResolvedInput, PosterError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(PosterError::FileNotFound { path });
    }

    let kind = kind_for(&path);
    match std::fs::File::open(&path) {
        Ok(mut f) => {
            if kind == ManuscriptKind::Pdf {
                use std::io::Read;
                let mut magic = [0u8; 4];
                if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                    return Err(PosterError::NotAPdf { path, magic });
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PosterError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(PosterError::FileNotFound { path });
        }
    }

    debug!("Resolved local manuscript ({:?}): {}", kind, path.display());
    Ok(ResolvedInput::Local { path, kind })
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, PosterError> {
    info!("Downloading manuscript from: {}", url);

    let failed = |reason: String| PosterError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            PosterError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let filename = filename_from_url(url);
    let temp_dir = TempDir::new().map_err(|e| PosterError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| PosterError::Internal(format!("Failed to write temp file: {}", e)))?;

    let kind = kind_for(&file_path);
    if kind == ManuscriptKind::Pdf && bytes.len() >= 4 && &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(PosterError::NotAPdf {
            path: file_path,
            magic,
        });
    }

    info!("Downloaded to: {}", file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        kind,
        _temp_dir: temp_dir,
    })
}

/// Last URL path segment when it looks like a file name.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }
    "manuscript.pdf".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/paper.pdf"));
        assert!(is_url("http://example.com/paper.pdf"));
        assert!(!is_url("/tmp/paper.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn text_extensions() {
        assert_eq!(kind_for(Path::new("paper.TXT")), ManuscriptKind::Text);
        assert_eq!(kind_for(Path::new("notes/paper.md")), ManuscriptKind::Text);
        assert_eq!(kind_for(Path::new("paper.pdf")), ManuscriptKind::Pdf);
        assert_eq!(kind_for(Path::new("paper")), ManuscriptKind::Pdf);
    }

    #[test]
    fn filenames() {
        assert_eq!(filename_from_url("https://x.org/a/paper.pdf?dl=1"), "paper.pdf");
        assert_eq!(filename_from_url("https://x.org/a/"), "manuscript.pdf");
    }

    #[test]
    fn local_files_are_validated() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("nope.pdf");
        assert!(matches!(
            resolve_local(missing.to_str().unwrap()),
            Err(PosterError::FileNotFound { .. })
        ));

        let fake = dir.path().join("fake.pdf");
        std::fs::write(&fake, b"PK\x03\x04 not a pdf").unwrap();
        match resolve_local(fake.to_str().unwrap()) {
            Err(PosterError::NotAPdf { magic, .. }) => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("expected NotAPdf, got {:?}", other.map(|r| r.kind())),
        }

        let text = dir.path().join("paper.txt");
        std::fs::write(&text, "Introduction\nWe studied…").unwrap();
        let resolved = resolve_local(text.to_str().unwrap()).unwrap();
        assert_eq!(resolved.kind(), ManuscriptKind::Text);

        let pdf = dir.path().join("paper.pdf");
        std::fs::write(&pdf, b"%PDF-1.7\n").unwrap();
        assert_eq!(resolve_local(pdf.to_str().unwrap()).unwrap().kind(), ManuscriptKind::Pdf);
    }

    #[test]
    fn paths_resolve_without_download() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("paper.md");
        std::fs::write(&notes, "# Paper").unwrap();

        let resolved = tokio_test::block_on(resolve_input(notes.to_str().unwrap(), 1));
        let (path, kind) = tokio_test::assert_ok!(resolved.map(|r| (r.path().to_path_buf(), r.kind())));
        assert_eq!(path, notes);
        assert_eq!(kind, ManuscriptKind::Text);

        let missing = tokio_test::block_on(resolve_input("/definitely/not/here.pdf", 1));
        let err = tokio_test::assert_err!(missing.map(|r| r.kind()));
        assert!(matches!(err, PosterError::FileNotFound { .. }));
    }
}
