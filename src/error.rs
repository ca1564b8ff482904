//! Error types for the edgequake-poster library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PosterError`]: **Fatal**: the poster cannot be produced at all
//!   (template missing or unreadable, manuscript unusable, provider not
//!   configured, output not writable). Returned as `Err(PosterError)` from
//!   the top-level `generate*` and `populate*` functions.
//!
//! * [`PopulateWarning`]: **Non-fatal**: one field or one figure could not
//!   be placed (shape missing, image rejected) but everything else was.
//!   Collected in [`crate::populate::PopulateReport`] so callers can inspect
//!   partial success instead of losing the whole poster to one bad shape.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-poster library.
///
/// Field- and figure-level failures use [`PopulateWarning`] and are stored
/// in [`crate::populate::PopulateReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum PosterError {
    // ── Manuscript input ──────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Manuscript not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is neither a PDF nor plain text.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}\nPlain-text manuscripts must use a .txt or .md extension.")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password.
    #[error("PDF '{path}' is encrypted and requires a password.\nDecrypt it first, e.g. qpdf --decrypt --password=… in.pdf out.pdf")]
    PasswordRequired { path: PathBuf },

    /// The manuscript contains no extractable text (e.g. a scanned PDF).
    #[error("No text could be extracted from '{path}'\nScanned manuscripts need OCR before poster generation.")]
    EmptyManuscript { path: PathBuf },

    // ── Template errors ───────────────────────────────────────────────────
    /// No template file exists for the requested name.
    #[error("Template '{name}' not found (looked for '{path}')\nRun `pdf2poster --list-templates` to see what is available.")]
    TemplateNotFound { name: String, path: PathBuf },

    /// The template exists but is not a usable presentation.
    #[error("Cannot open template '{path}': {detail}")]
    TemplateUnreadable { path: PathBuf, detail: String },

    /// A user style configuration file could not be loaded.
    #[error("Invalid style configuration '{path}': {detail}")]
    StyleConfigInvalid { path: PathBuf, detail: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API returned an error after all retries.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// The model answered, but not with a usable content object.
    #[error("Could not parse the extraction response: {detail}\nResponse starts with: {preview:?}")]
    MalformedResponse { detail: String, preview: String },

    // ── Fixture errors ────────────────────────────────────────────────────
    /// A recorded extraction could not be read or written.
    #[error("Fixture I/O failed on '{path}': {source}")]
    FixtureIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not serialise or write the output presentation.
    #[error("Failed to save poster to '{path}': {detail}")]
    SaveFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDF manuscripts need the pdfium shared library. You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Install pdfium system-wide (libpdfium.so / libpdfium.dylib / pdfium.dll).\n\
  • Pass an already-extracted .txt or .md manuscript instead.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal problem with a single field or figure.
///
/// Stored in [`crate::populate::PopulateReport`]. Population continues with
/// the remaining fields and figures.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PopulateWarning {
    /// No shape with the expected name exists on the slide.
    #[error("Field '{field}': shape '{shape}' not found")]
    ShapeNotFound { field: String, shape: String },

    /// The shape exists but has no editable text body.
    #[error("Field '{field}': shape '{shape}' has no text frame")]
    NoTextFrame { field: String, shape: String },

    /// The extracted value could not be used as text.
    #[error("Field '{field}': {detail}")]
    MalformedValue { field: String, detail: String },

    /// A figure was supplied but its placeholder shape is missing.
    #[error("Figure {figure}: placeholder '{shape}' not found")]
    PlaceholderMissing { figure: usize, shape: String },

    /// The image failed validation (size, format) and was not inserted.
    #[error("Figure {figure}: image '{path}' rejected: {reason}")]
    ImageRejected {
        figure: usize,
        path: PathBuf,
        reason: String,
    },

    /// The image passed validation but could not be added to the package.
    #[error("Figure {figure}: insertion failed: {detail}")]
    ImageInsertFailed { figure: usize, detail: String },

    /// A description was supplied but its box is missing.
    #[error("Figure {figure}: description box '{shape}' not found")]
    DescriptionBoxMissing { figure: usize, shape: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_not_found_mentions_listing() {
        let e = PosterError::TemplateNotFound {
            name: "Blue Template".into(),
            path: PathBuf::from("templates/available/Blue Template.pptx"),
        };
        let msg = e.to_string();
        assert!(msg.contains("Blue Template"), "got: {msg}");
        assert!(msg.contains("--list-templates"));
    }

    #[test]
    fn malformed_response_shows_preview() {
        let e = PosterError::MalformedResponse {
            detail: "expected value".into(),
            preview: "Sure! Here is".into(),
        };
        assert!(e.to_string().contains("Sure! Here is"));
    }

    #[test]
    fn warning_display() {
        let w = PopulateWarning::PlaceholderMissing {
            figure: 3,
            shape: "Fig3PlaceholderSmall".into(),
        };
        assert_eq!(
            w.to_string(),
            "Figure 3: placeholder 'Fig3PlaceholderSmall' not found"
        );
    }

    #[test]
    fn warnings_serialise_with_kind_tag() {
        let w = PopulateWarning::ShapeNotFound {
            field: "Methods".into(),
            shape: "MethodsBox".into(),
        };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["kind"], "shape_not_found");
        assert_eq!(json["shape"], "MethodsBox");
    }
}
