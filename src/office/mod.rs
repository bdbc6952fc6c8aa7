//! The office-engine seam: traits for the external document provider.
//!
//! officeflow does not render, lay out, or parse documents itself — that work
//! belongs to an office-automation runtime reached through the two traits in
//! this module:
//!
//! * [`OfficeEngine`] opens a source document and yields a live
//!   [`DocumentHandle`];
//! * [`DocumentHandle`] is the narrow capability surface filters act through:
//!   count pages, keep a subset, refresh derived state, substitute text, and
//!   finally persist the result.
//!
//! A handle is owned by the conversion session that loaded it. Filters borrow
//! it mutably for the duration of one chain run and never control its
//! lifecycle. Cancellation and timeouts likewise live behind the engine, not
//! in the chain layer.
//!
//! [`memory::PlainTextEngine`] is the in-process reference implementation
//! used by the integration tests and the CLI.

pub mod memory;

use crate::config::PageSelection;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Hints applied when opening a document.
///
/// Interpreted by the engine; an in-process engine may ignore `hidden`
/// entirely, while `read_only` must be honoured by every implementation.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Open without any visible UI.
    pub hidden: bool,
    /// Open read-only; mutating capabilities fail with
    /// [`EngineError::ReadOnly`].
    pub read_only: bool,
}

/// Session-scoped context handed to every filter in a chain run.
///
/// Read-only by design: filters act on the document through their
/// [`DocumentHandle`] borrow, and use the context only to know where the
/// document came from and how it was opened (e.g. for log lines).
#[derive(Debug, Clone)]
pub struct OfficeContext {
    source: PathBuf,
    load: LoadOptions,
}

impl OfficeContext {
    /// Build a context for a document loaded from `source` with `load` hints.
    pub fn new(source: impl Into<PathBuf>, load: LoadOptions) -> Self {
        Self {
            source: source.into(),
            load,
        }
    }

    /// Path the live document was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The open hints the document was loaded with.
    pub fn load_options(&self) -> &LoadOptions {
        &self.load
    }
}

/// A live, mutable document inside the office engine.
///
/// Methods take `&mut self` throughout: even queries may require protocol
/// round-trips on engines that talk to an external process, and a uniform
/// receiver keeps the trait object-safe and honest about that.
pub trait DocumentHandle {
    /// Current number of pages.
    fn page_count(&mut self) -> Result<usize, EngineError>;

    /// Restrict the document to the pages in `selection`, dropping the rest.
    ///
    /// Fails with [`EngineError::EmptySelection`] when nothing would remain.
    fn select_pages(&mut self, selection: &PageSelection) -> Result<(), EngineError>;

    /// Recompute derived document state (layout, fields, indexes — whatever
    /// the engine derives from content).
    fn refresh(&mut self) -> Result<(), EngineError>;

    /// Replace every occurrence of `search` with `replacement` across the
    /// document. Returns the number of occurrences rewritten.
    fn replace_text(&mut self, search: &str, replacement: &str) -> Result<usize, EngineError>;

    /// Extract the full document text.
    fn text(&mut self) -> Result<String, EngineError>;

    /// Persist the document to `target`.
    ///
    /// Implementations must write atomically: `target` either keeps its old
    /// content or holds the complete new content, never a torn file.
    fn store(&mut self, target: &Path) -> Result<(), EngineError>;
}

/// Opens documents and hands out live [`DocumentHandle`]s.
///
/// `Send + Sync` so one engine instance can serve conversions running on
/// several threads at once; each conversion owns its handle exclusively.
pub trait OfficeEngine: Send + Sync {
    /// Open `source` and return a live handle to it.
    fn load(
        &self,
        source: &Path,
        options: &LoadOptions,
    ) -> Result<Box<dyn DocumentHandle>, EngineError>;
}

/// Document facts reported by [`crate::convert::inspect`] without converting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Path the document was inspected at.
    pub source: PathBuf,
    /// Number of pages.
    pub page_count: usize,
}
