//! Error types for the officeflow library.
//!
//! Two distinct error types reflect two distinct failure layers:
//!
//! * [`ConversionError`] — **Driver-level**: the conversion cannot proceed or
//!   complete (missing source, invalid chain construction, refused target).
//!   Returned from the top-level `convert`/`inspect` functions and from
//!   [`crate::filter::FilterChain::do_filter`].
//!
//! * [`EngineError`] — **Engine-level**: a capability call on the live
//!   document failed (read-only document, empty page selection, I/O fault in
//!   the engine). Raised by [`crate::office::DocumentHandle`] implementations
//!   and wrapped into `ConversionError::Engine` on its way up.
//!
//! The chain layer performs no retry and no suppression: an engine fault
//! inside any filter propagates unchanged to the driver, which surfaces it as
//! a conversion failure. No partial output is ever considered valid.

use std::path::PathBuf;
use thiserror::Error;

/// All driver-level errors returned by the officeflow library.
///
/// Engine capability failures use [`EngineError`] and arrive here through the
/// [`ConversionError::Engine`] variant.
#[derive(Debug, Error)]
pub enum ConversionError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source document was not found at the given path.
    #[error("source document not found: '{}'", path.display())]
    SourceNotFound { path: PathBuf },

    /// Target already exists and overwriting was not requested.
    #[error("target '{}' already exists (enable overwrite to replace it)", path.display())]
    TargetExists { path: PathBuf },

    // ── Chain errors ──────────────────────────────────────────────────────
    /// Filter chain or filter construction was rejected.
    ///
    /// A chain must contain at least one step; argument-validated filters
    /// (e.g. [`crate::filter::TextReplacerFilter`]) report their rejected
    /// arguments through the same variant. Nothing is constructed.
    #[error("invalid filter chain: {0}")]
    InvalidChain(String),

    // ── Engine errors ─────────────────────────────────────────────────────
    /// A document capability call failed inside a filter or the driver.
    ///
    /// Propagated unchanged: the chain never retries a failed step.
    #[error("office engine error: {0}")]
    Engine(#[from] EngineError),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or replace the converted output file.
    #[error("failed to write output '{}': {source}", path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A capability failure on a live document.
///
/// Raised by [`crate::office::DocumentHandle`] and
/// [`crate::office::OfficeEngine`] implementations. The filter layer treats
/// these as opaque: it neither inspects nor recovers from them.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A mutating capability was called on a document opened read-only.
    #[error("document is open read-only")]
    ReadOnly,

    /// A page selection resolved to zero pages.
    #[error("page selection matched no pages (document has {total})")]
    EmptySelection { total: usize },

    /// The engine rejected or failed the requested operation.
    #[error("document operation failed: {0}")]
    OperationFailed(String),

    /// The engine could not read or write its backing storage.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
