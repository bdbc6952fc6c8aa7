//! Filters and the chain that drives them.
//!
//! A conversion is pre/post-processed by an ordered sequence of [`Filter`]s
//! executed chain-of-responsibility style: the driver calls
//! [`FilterChain::do_filter`] once, the chain hands the live document to the
//! first filter, and each filter decides whether the rest of the chain runs
//! by calling (or not calling) `chain.do_filter` itself.
//!
//! ## Control flow
//!
//! ```text
//! driver ──▶ chain.do_filter ──▶ F1.apply ──▶ chain.do_filter ──▶ F2.apply ──▶ …
//!                                   │                                │
//!                                   └── no call = chain stops here ──┘
//! ```
//!
//! Not calling onward is legitimate, not an error — a selector that has
//! narrowed the document to its target pages may deliberately stop
//! everything behind it. Conversely, calling onward past the last filter is
//! a safe no-op, so a terminal filter does not need to know it is terminal.
//!
//! ## Shipped filters
//!
//! * [`PageCounterFilter`] — records the current page count, continues
//! * [`PageSelectorFilter`] — keeps a page subset, continues
//! * [`RefreshFilter`] — recomputes engine-derived state; the canonical
//!   terminal step a [`DefaultFilterChain`] appends by default
//! * [`TextReplacerFilter`] — paired text substitutions, continues

mod chain;
mod counter;
mod refresh;
mod selector;
mod text;

pub use chain::{DefaultFilterChain, FilterChainBuilder};
pub use counter::PageCounterFilter;
pub use refresh::{last_refresh, RefreshFilter};
pub use selector::PageSelectorFilter;
pub use text::TextReplacerFilter;

use crate::error::ConversionError;
use crate::office::{DocumentHandle, OfficeContext};

/// One unit of document-transformation work.
///
/// Implementations take `&self`: a filter instance may be shared between
/// chains (it is held as `Arc<dyn Filter>`) and invoked from several
/// concurrently-running conversions, so any internal state must be atomic or
/// otherwise internally synchronised. `Send + Sync` is part of the contract
/// for the same reason.
///
/// A filter that wants downstream filters to run **must** call
/// `chain.do_filter(context, document)` itself; returning without the call
/// short-circuits the remainder of the chain.
pub trait Filter: Send + Sync {
    /// Apply this filter to the live document, optionally continuing the
    /// chain.
    fn apply(
        &self,
        context: &OfficeContext,
        document: &mut dyn DocumentHandle,
        chain: &mut dyn FilterChain,
    ) -> Result<(), ConversionError>;
}

/// An ordered, replayable sequence of filters with a cursor.
///
/// One `do_filter` call from the driver runs the whole chain (each filter
/// recursing back in to continue). The cursor advances monotonically during a
/// run and is rewound — without touching the filters themselves — by
/// [`reset`](FilterChain::reset).
///
/// A chain instance is single-threaded state: the `&mut` receivers make
/// concurrent execution of one instance unrepresentable in safe Rust. Run
/// distinct chain instances on distinct threads instead; filters shared
/// between them are safe by the [`Filter`] contract.
pub trait FilterChain {
    /// Invoke the filter at the cursor, advancing past it first.
    ///
    /// Called with the cursor past the last filter this is a benign no-op:
    /// the chain is simply exhausted, which is the normal way a run ends.
    fn do_filter(
        &mut self,
        context: &OfficeContext,
        document: &mut dyn DocumentHandle,
    ) -> Result<(), ConversionError>;

    /// Rewind the cursor to the first filter so the chain can be replayed.
    ///
    /// Filter-internal state (e.g. a counter's count) is deliberately left
    /// alone — resetting it, when wanted, is the owner's job.
    fn reset(&mut self);
}
