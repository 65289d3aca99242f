//! Core library for translating and cleaning timed caption files.
//!
//! Caption text is split into blocks ([`srt`]), block texts are sent in
//! batches to a text-generation [`translate::Backend`] and the replies are
//! stitched back onto the original timing lines.

pub mod clean;
pub mod config;
pub mod error;
pub mod files;
pub mod language;
pub mod srt;
pub mod translate;

pub use config::{RetryPolicy, TranslatorConfig, DEFAULT_BATCH_SIZE};
pub use error::{BackendError, TranslateError};
pub use language::Language;
pub use translate::{translate_document, Backend, BatchTranslator};
