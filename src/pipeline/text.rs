//! Manuscript text: read plain-text files directly, extract PDFs with pdfium.
//!
//! pdfium keeps thread-local state and is not safe to drive from async
//! contexts, so PDF extraction runs inside `spawn_blocking`.

use crate::error::PosterError;
use crate::pipeline::input::{ManuscriptKind, ResolvedInput};
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

#[cfg(target_os = "macos")]
const PDFIUM_LIB_NAME: &str = "libpdfium.dylib";
#[cfg(target_os = "windows")]
const PDFIUM_LIB_NAME: &str = "pdfium.dll";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const PDFIUM_LIB_NAME: &str = "libpdfium.so";

/// Full text of the manuscript, pages separated by newlines.
pub async fn read_manuscript(input: &ResolvedInput) -> Result<String, PosterError> {
    let path = input.path().to_path_buf();
    let text = match input.kind() {
        ManuscriptKind::Text => {
            let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => PosterError::PermissionDenied { path: path.clone() },
                _ => PosterError::FileNotFound { path: path.clone() },
            })?;
            String::from_utf8_lossy(&bytes).into_owned()
        }
        ManuscriptKind::Pdf => {
            let pdf = path.clone();
            tokio::task::spawn_blocking(move || extract_pdf_text_blocking(&pdf))
                .await
                .map_err(|e| PosterError::Internal(format!("Text extraction task panicked: {}", e)))??
        }
    };

    if text.trim().is_empty() {
        return Err(PosterError::EmptyManuscript { path });
    }
    info!("Manuscript text: {} chars", text.chars().count());
    Ok(text)
}

/// Bind to `PDFIUM_LIB_PATH` (a library file or the directory holding it),
/// else the system library.
pub fn bind_pdfium() -> Result<Pdfium, PosterError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(p) if !p.is_empty() => {
            let path = Path::new(&p);
            if path.is_dir() {
                Pdfium::bind_to_library(path.join(PDFIUM_LIB_NAME))
            } else {
                Pdfium::bind_to_library(path)
            }
        }
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| PosterError::PdfiumBindingFailed(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

fn extract_pdf_text_blocking(pdf_path: &Path) -> Result<String, PosterError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium.load_pdf_from_file(pdf_path, None).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            PosterError::PasswordRequired {
                path: pdf_path.to_path_buf(),
            }
        } else {
            PosterError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut out = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        match page.text() {
            Ok(text) => {
                let text = text.all();
                debug!("Page {}: {} chars", idx + 1, text.len());
                out.push(text);
            }
            Err(e) => warn!("Skipping page {}: no text layer ({:?})", idx + 1, e),
        }
    }
    Ok(out.join("\n"))
}

/// The first `max_chars` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
