//! # officeflow
//!
//! Replayable filter chains for office-document conversion.
//!
//! ## Why this crate?
//!
//! Document converters built on an office-automation runtime rarely need the
//! runtime alone — the interesting work happens *around* it: count pages
//! before and after, keep only the pages that matter, substitute
//! placeholders, force a layout refresh before export. officeflow models
//! those steps as an ordered chain of filters driven over the live document
//! the runtime hands out, and keeps the chain replayable so one pipeline can
//! serve many conversions.
//!
//! ## Execution model
//!
//! ```text
//! source ──▶ engine.load ──▶ [ F1 ─▶ F2 ─▶ … ─▶ refresh ] ──▶ store ──▶ target
//!                              chain-of-responsibility
//! ```
//!
//! 1. The driver obtains a live [`office::DocumentHandle`] from an
//!    [`office::OfficeEngine`].
//! 2. It calls [`filter::FilterChain::do_filter`] once; each filter that
//!    wants its successors to run continues the chain itself, so a filter
//!    can also deliberately stop everything behind it.
//! 3. Unless suppressed, the chain ends with a canonical refresh step that
//!    makes the runtime recompute derived state before export.
//! 4. [`filter::FilterChain::reset`] rewinds the chain — not the filters'
//!    own state — for the next conversion.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use officeflow::filter::{DefaultFilterChain, Filter, FilterChain, PageCounterFilter, PageSelectorFilter};
//! use officeflow::office::memory::PlainTextEngine;
//! use officeflow::{convert, ConversionConfig};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let counter = Arc::new(PageCounterFilter::new());
//!     let mut chain = DefaultFilterChain::new(vec![
//!         counter.clone() as Arc<dyn Filter>,
//!         Arc::new(PageSelectorFilter::single(1)) as Arc<dyn Filter>,
//!     ]);
//!
//!     let engine = PlainTextEngine::new();
//!     let config = ConversionConfig::builder().overwrite(true).build();
//!     convert(&engine, "report.txt", "page1.txt", &mut chain, &config)?;
//!     println!("source had {} pages", counter.page_count());
//!
//!     // The same chain again, against the next document.
//!     chain.reset();
//!     convert(&engine, "page1.txt", "copy.txt", &mut chain, &config)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Engines
//!
//! The crate ships [`office::memory::PlainTextEngine`], an in-process engine
//! over form-feed-paginated text used by the tests and the CLI. Production
//! engines implement [`office::OfficeEngine`] and [`office::DocumentHandle`]
//! against a real office runtime; the filter layer is identical over both.
//!
//! ## Threading
//!
//! A chain instance belongs to one thread at a time (`&mut` receivers make
//! anything else unrepresentable). Filters, held as `Arc<dyn Filter>`, may
//! be shared between chains running on different threads — the `Send + Sync`
//! bound plus internal atomics make that safe, and the canonical last-step
//! instance is shared that way by every chain in the process.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `officeflow` binary (clap + anyhow + tracing-subscriber + rayon) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! officeflow = { version = "0.2", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod filter;
pub mod office;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, PageSelection};
pub use convert::{convert, inspect, ConversionSummary};
pub use error::{ConversionError, EngineError};
pub use filter::{
    last_refresh, DefaultFilterChain, Filter, FilterChain, FilterChainBuilder, PageCounterFilter,
    PageSelectorFilter, RefreshFilter, TextReplacerFilter,
};
pub use office::{DocumentHandle, DocumentInfo, LoadOptions, OfficeContext, OfficeEngine};
