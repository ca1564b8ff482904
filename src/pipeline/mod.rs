//! Content extraction stages.
//!
//! ```text
//! input ──▶ text ──▶ llm ──▶ response
//! (URL/path) (pdfium)  (chat)   (JSON repair)
//! ```
//!
//! 1. [`input`]: canonicalise the manuscript path or URL to a local file
//! 2. [`text`]: read text manuscripts, or extract PDF text in
//!    `spawn_blocking`
//! 3. [`llm`]: resolve the provider and call it with retry/backoff; the
//!    only stage with model I/O
//! 4. [`response`]: repair and parse the model's JSON into
//!    [`crate::content::ExtractedContent`]

pub mod input;
pub mod llm;
pub mod response;
pub mod text;
