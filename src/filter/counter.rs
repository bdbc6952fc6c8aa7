//! Page-counting step.

use crate::error::ConversionError;
use crate::filter::{Filter, FilterChain};
use crate::office::{DocumentHandle, OfficeContext};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Records the document's page count at its position in the chain, then
/// continues.
///
/// Placed before and after a selector, two counters reveal how much of the
/// document the selector dropped. The recorded value is a *snapshot*: each
/// run overwrites the previous one, so a counter reused across runs (the
/// chain does not reset filter state) reports the most recent run only.
///
/// The count lives in an atomic so one instance may be shared with — and
/// read from — other threads while chains holding it run.
#[derive(Debug, Default)]
pub struct PageCounterFilter {
    count: AtomicUsize,
}

impl PageCounterFilter {
    pub fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
        }
    }

    /// Page count recorded by the most recent run; zero before any run.
    pub fn page_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Filter for PageCounterFilter {
    fn apply(
        &self,
        context: &OfficeContext,
        document: &mut dyn DocumentHandle,
        chain: &mut dyn FilterChain,
    ) -> Result<(), ConversionError> {
        let pages = document.page_count()?;
        self.count.store(pages, Ordering::SeqCst);
        debug!(source = %context.source().display(), pages, "counted pages");
        chain.do_filter(context, document)
    }
}
