//! The default filter-chain implementation.
//!
//! A [`DefaultFilterChain`] is an immutable, ordered list of shared filter
//! references plus one mutable integer cursor — nothing else. Keeping the
//! run-scoped cursor separate from the filter list is what makes the chain
//! replayable: [`reset`](crate::filter::FilterChain::reset) rewinds the
//! cursor to zero and the same filter instances run again, with whatever
//! internal state they accumulated still intact.
//!
//! ## The last-step policy
//!
//! Office runtimes leave derived state (fields, layout, indexes) stale after
//! document mutation, so a chain normally ends with a refresh. Rather than
//! making every caller remember that, construction appends a canonical
//! terminal [`RefreshFilter`](crate::filter::RefreshFilter) after the
//! explicit list — unless the caller suppresses it, or the list already ends
//! with the very instance that would be appended. The decision is made once,
//! at construction; `reset` never re-evaluates it.
//!
//! The appended instance is an injection point, not a global: substitute it
//! per chain through [`FilterChainBuilder::last_step`]. Tests observe a
//! counting stand-in this way without touching any process-wide state.

use crate::error::ConversionError;
use crate::filter::refresh::last_refresh;
use crate::filter::{Filter, FilterChain};
use crate::office::{DocumentHandle, OfficeContext};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Ordered, replayable filter sequence with auto-appended last step.
///
/// # Example
/// ```rust
/// use officeflow::filter::{DefaultFilterChain, Filter, PageCounterFilter};
/// use std::sync::Arc;
///
/// let counter = Arc::new(PageCounterFilter::new());
/// // Ends with the canonical refresh step appended automatically.
/// let chain = DefaultFilterChain::new(vec![counter.clone() as Arc<dyn Filter>]);
/// assert_eq!(chain.len(), 2);
/// ```
pub struct DefaultFilterChain {
    filters: Vec<Arc<dyn Filter>>,
    cursor: usize,
}

impl DefaultFilterChain {
    /// Build a chain from `filters`, appending the canonical last step
    /// unless the list already ends with it.
    pub fn new(filters: impl IntoIterator<Item = Arc<dyn Filter>>) -> Self {
        Self {
            filters: append_last_step(filters.into_iter().collect(), last_refresh()),
            cursor: 0,
        }
    }

    /// Build a chain with explicit control over the last-step policy.
    ///
    /// `include_default_last == false` suppresses the appended step entirely;
    /// the chain then ends with the last explicit filter. Fails with
    /// [`ConversionError::InvalidChain`] when suppression would leave the
    /// chain with zero steps.
    pub fn with_default_last(
        include_default_last: bool,
        filters: impl IntoIterator<Item = Arc<dyn Filter>>,
    ) -> Result<Self, ConversionError> {
        Self::builder()
            .filters(filters)
            .append_default_last(include_default_last)
            .build()
    }

    /// Start building a chain, including substitution of the default last
    /// step.
    pub fn builder() -> FilterChainBuilder {
        FilterChainBuilder {
            filters: Vec::new(),
            append_default_last: true,
            last_step: None,
        }
    }

    /// Number of steps in the chain, auto-appended last step included.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// True when the chain holds no steps. Unreachable through the public
    /// constructors, which reject the empty chain.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Cursor position: the index of the next filter to run.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// True once every filter has been taken off the cursor; only `reset`
    /// (or destruction) is useful from here.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.filters.len()
    }
}

impl FilterChain for DefaultFilterChain {
    fn do_filter(
        &mut self,
        context: &OfficeContext,
        document: &mut dyn DocumentHandle,
    ) -> Result<(), ConversionError> {
        let Some(filter) = self.filters.get(self.cursor) else {
            trace!(position = self.cursor, "filter chain exhausted");
            return Ok(());
        };
        let filter = Arc::clone(filter);
        self.cursor += 1;
        trace!(
            step = self.cursor,
            of = self.filters.len(),
            "running filter step"
        );
        filter.apply(context, document, self)
    }

    fn reset(&mut self) {
        debug!(position = self.cursor, "rewinding filter chain");
        self.cursor = 0;
    }
}

impl fmt::Debug for DefaultFilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultFilterChain")
            .field("filters", &format_args!("[{} steps]", self.filters.len()))
            .field("cursor", &self.cursor)
            .finish()
    }
}

/// Builder for [`DefaultFilterChain`].
pub struct FilterChainBuilder {
    filters: Vec<Arc<dyn Filter>>,
    append_default_last: bool,
    last_step: Option<Arc<dyn Filter>>,
}

impl FilterChainBuilder {
    /// Append one filter to the explicit list.
    pub fn filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Append several filters to the explicit list, in order.
    pub fn filters(mut self, filters: impl IntoIterator<Item = Arc<dyn Filter>>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Whether to append the last step after the explicit list.
    /// Default: true.
    pub fn append_default_last(mut self, v: bool) -> Self {
        self.append_default_last = v;
        self
    }

    /// Substitute the instance used as the last step for this chain.
    ///
    /// Defaults to the canonical shared
    /// [`last_refresh`](crate::filter::last_refresh) instance when unset.
    pub fn last_step(mut self, filter: Arc<dyn Filter>) -> Self {
        self.last_step = Some(filter);
        self
    }

    /// Validate and build the chain.
    ///
    /// # Errors
    /// [`ConversionError::InvalidChain`] when the chain would contain zero
    /// steps.
    pub fn build(self) -> Result<DefaultFilterChain, ConversionError> {
        let resolved_last = self.last_step.unwrap_or_else(last_refresh);
        let filters = if self.append_default_last {
            append_last_step(self.filters, resolved_last)
        } else {
            self.filters
        };
        if filters.is_empty() {
            return Err(ConversionError::InvalidChain(
                "chain must contain at least one step".into(),
            ));
        }
        Ok(DefaultFilterChain { filters, cursor: 0 })
    }
}

impl fmt::Debug for FilterChainBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChainBuilder")
            .field("filters", &format_args!("[{} steps]", self.filters.len()))
            .field("append_default_last", &self.append_default_last)
            .field(
                "last_step",
                &self.last_step.as_ref().map(|_| "<dyn Filter>"),
            )
            .finish()
    }
}

/// Append `last` to `filters` unless the list already ends with that very
/// instance.
///
/// Equivalence is instance identity (same allocation), checked on the data
/// pointer only — vtable pointers are not stable enough across codegen units
/// to take part in an identity test.
fn append_last_step(
    mut filters: Vec<Arc<dyn Filter>>,
    last: Arc<dyn Filter>,
) -> Vec<Arc<dyn Filter>> {
    let already_last = filters
        .last()
        .is_some_and(|f| std::ptr::eq(Arc::as_ptr(f) as *const (), Arc::as_ptr(&last) as *const ()));
    if !already_last {
        filters.push(last);
    }
    filters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::office::memory::TextDocument;
    use crate::office::{LoadOptions, OfficeContext};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records its label on every invocation; optionally stops the chain.
    struct Probe {
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        continue_chain: bool,
    }

    impl Filter for Probe {
        fn apply(
            &self,
            context: &OfficeContext,
            document: &mut dyn DocumentHandle,
            chain: &mut dyn FilterChain,
        ) -> Result<(), ConversionError> {
            self.log.lock().unwrap().push(self.label);
            if self.continue_chain {
                chain.do_filter(context, document)
            } else {
                Ok(())
            }
        }
    }

    /// Counts invocations; continues the chain.
    struct InvocationProbe {
        invocations: AtomicUsize,
    }

    impl InvocationProbe {
        fn new() -> Self {
            Self {
                invocations: AtomicUsize::new(0),
            }
        }

        fn invocations(&self) -> usize {
            self.invocations.load(Ordering::SeqCst)
        }
    }

    impl Filter for InvocationProbe {
        fn apply(
            &self,
            context: &OfficeContext,
            document: &mut dyn DocumentHandle,
            chain: &mut dyn FilterChain,
        ) -> Result<(), ConversionError> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            chain.do_filter(context, document)
        }
    }

    fn probe(
        label: &'static str,
        log: &Arc<Mutex<Vec<&'static str>>>,
        continue_chain: bool,
    ) -> Arc<dyn Filter> {
        Arc::new(Probe {
            label,
            log: Arc::clone(log),
            continue_chain,
        })
    }

    fn ctx() -> OfficeContext {
        OfficeContext::new("test.txt", LoadOptions::default())
    }

    fn doc() -> TextDocument {
        TextDocument::from_pages(vec!["p1".into(), "p2".into()])
    }

    #[test]
    fn runs_filters_in_declared_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = DefaultFilterChain::with_default_last(
            false,
            vec![
                probe("first", &log, true),
                probe("second", &log, true),
                probe("third", &log, true),
            ],
        )
        .unwrap();

        chain.do_filter(&ctx(), &mut doc()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
        assert!(chain.is_exhausted());
    }

    #[test]
    fn omitting_continue_stops_the_chain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = DefaultFilterChain::with_default_last(
            false,
            vec![
                probe("first", &log, true),
                probe("stopper", &log, false),
                probe("unreached", &log, true),
            ],
        )
        .unwrap();

        chain.do_filter(&ctx(), &mut doc()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "stopper"]);
        // The cursor stopped where the stopper left it; the chain is not
        // exhausted, merely abandoned.
        assert_eq!(chain.position(), 2);
        assert!(!chain.is_exhausted());
    }

    #[test]
    fn do_filter_past_the_end_is_a_noop() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain =
            DefaultFilterChain::with_default_last(false, vec![probe("only", &log, true)]).unwrap();

        chain.do_filter(&ctx(), &mut doc()).unwrap();
        assert!(chain.is_exhausted());

        // Extra calls after exhaustion change nothing and return Ok.
        chain.do_filter(&ctx(), &mut doc()).unwrap();
        chain.do_filter(&ctx(), &mut doc()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["only"]);
    }

    #[test]
    fn reset_replays_the_same_instances() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = DefaultFilterChain::with_default_last(
            false,
            vec![probe("a", &log, true), probe("b", &log, true)],
        )
        .unwrap();

        chain.do_filter(&ctx(), &mut doc()).unwrap();
        chain.reset();
        assert_eq!(chain.position(), 0);
        chain.do_filter(&ctx(), &mut doc()).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "a", "b"]);
    }

    #[test]
    fn new_appends_the_canonical_last_step() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = DefaultFilterChain::new(vec![probe("a", &log, true)]);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn new_does_not_append_twice_when_list_ends_with_it() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = DefaultFilterChain::new(vec![probe("a", &log, true), last_refresh()]);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn suppressed_last_step_is_never_invoked() {
        let stand_in = Arc::new(InvocationProbe::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = DefaultFilterChain::builder()
            .filter(probe("a", &log, true))
            .last_step(stand_in.clone())
            .append_default_last(false)
            .build()
            .unwrap();

        chain.do_filter(&ctx(), &mut doc()).unwrap();
        assert_eq!(stand_in.invocations(), 0);
    }

    #[test]
    fn substituted_last_step_is_invoked_exactly_once() {
        let stand_in = Arc::new(InvocationProbe::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = DefaultFilterChain::builder()
            .filter(probe("a", &log, true))
            .filter(probe("b", &log, true))
            .last_step(stand_in.clone())
            .build()
            .unwrap();

        chain.do_filter(&ctx(), &mut doc()).unwrap();
        assert_eq!(stand_in.invocations(), 1);
    }

    #[test]
    fn substituted_last_step_not_duplicated_when_supplied_explicitly() {
        let stand_in: Arc<dyn Filter> = Arc::new(InvocationProbe::new());
        let chain = DefaultFilterChain::builder()
            .filter(stand_in.clone())
            .last_step(stand_in)
            .build()
            .unwrap();
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn empty_suppressed_chain_is_rejected() {
        let err = DefaultFilterChain::with_default_last(false, Vec::new()).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidChain(_)));
    }

    #[test]
    fn empty_chain_with_default_last_is_just_the_last_step() {
        let chain = DefaultFilterChain::builder().build().unwrap();
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn cursor_tracks_progress_through_the_run() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = DefaultFilterChain::with_default_last(
            false,
            vec![probe("a", &log, false), probe("b", &log, false)],
        )
        .unwrap();

        assert_eq!(chain.position(), 0);
        chain.do_filter(&ctx(), &mut doc()).unwrap();
        assert_eq!(chain.position(), 1);
        chain.do_filter(&ctx(), &mut doc()).unwrap();
        assert_eq!(chain.position(), 2);
        assert!(chain.is_exhausted());
        chain.reset();
        assert_eq!(chain.position(), 0);
        assert!(!chain.is_exhausted());
    }
}
