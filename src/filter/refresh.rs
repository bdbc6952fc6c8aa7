//! Refresh step: make the engine recompute derived document state.
//!
//! Office runtimes cache layout, field values, and indexes; after a chain
//! has mutated the document those caches are stale, and the stored output
//! would reflect the pre-mutation state. A refresh as the final step fixes
//! that, which is why [`DefaultFilterChain`](crate::filter::DefaultFilterChain)
//! appends one by default.

use crate::error::ConversionError;
use crate::filter::{Filter, FilterChain};
use crate::office::{DocumentHandle, OfficeContext};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::debug;

/// The canonical shared terminal refresh, constructed once per process.
///
/// Immutable by construction: substitution happens per chain through
/// [`FilterChainBuilder::last_step`](crate::filter::FilterChainBuilder::last_step),
/// never by writing to this static.
static LAST_REFRESH: Lazy<Arc<RefreshFilter>> = Lazy::new(|| Arc::new(RefreshFilter::terminal()));

/// The canonical last step a chain ends with unless told otherwise.
pub fn last_refresh() -> Arc<dyn Filter> {
    Arc::clone(&LAST_REFRESH) as Arc<dyn Filter>
}

/// Forces the engine to recompute derived layout/field state.
///
/// Carries no persistent state, so a single instance can serve any number of
/// concurrently-running chains — the canonical [`last_refresh`] instance
/// does exactly that.
#[derive(Debug)]
pub struct RefreshFilter {
    /// A terminal refresh does not continue the chain; the pass-through
    /// form refreshes mid-chain and hands control onward.
    terminal: bool,
}

impl RefreshFilter {
    /// A pass-through refresh: recompute, then continue the chain.
    pub fn new() -> Self {
        Self { terminal: false }
    }

    /// A terminal refresh: recompute and stop. The form the canonical last
    /// step takes.
    pub fn terminal() -> Self {
        Self { terminal: true }
    }
}

impl Default for RefreshFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for RefreshFilter {
    fn apply(
        &self,
        context: &OfficeContext,
        document: &mut dyn DocumentHandle,
        chain: &mut dyn FilterChain,
    ) -> Result<(), ConversionError> {
        debug!(source = %context.source().display(), "refreshing document");
        document.refresh()?;
        if self.terminal {
            Ok(())
        } else {
            chain.do_filter(context, document)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::DefaultFilterChain;
    use crate::office::memory::TextDocument;
    use crate::office::LoadOptions;

    fn ctx() -> OfficeContext {
        OfficeContext::new("test.txt", LoadOptions::default())
    }

    #[test]
    fn canonical_instance_is_shared() {
        let a = last_refresh();
        let b = last_refresh();
        assert!(std::ptr::eq(
            Arc::as_ptr(&a) as *const (),
            Arc::as_ptr(&b) as *const ()
        ));
    }

    #[test]
    fn pass_through_refresh_continues_the_chain() {
        // A pass-through refresh followed by a terminal one: if the first
        // failed to continue, the document would keep its CRLF endings on
        // the later pages untouched... both pages end up normalised.
        let mut doc = TextDocument::from_pages(vec!["a\r\nb".into(), "c  \nd".into()]);
        let mut chain =
            DefaultFilterChain::new(vec![Arc::new(RefreshFilter::new()) as Arc<dyn Filter>]);
        chain.do_filter(&ctx(), &mut doc).unwrap();

        assert_eq!(doc.text().unwrap(), "a\nb\nc\nd");
    }

    #[test]
    fn terminal_refresh_stops_the_chain() {
        let chain = DefaultFilterChain::new(Vec::<Arc<dyn Filter>>::new());
        // Just the canonical terminal step.
        assert_eq!(chain.len(), 1);
    }
}
