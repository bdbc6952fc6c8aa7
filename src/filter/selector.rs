//! Page-selection step.

use crate::config::PageSelection;
use crate::error::ConversionError;
use crate::filter::{Filter, FilterChain};
use crate::office::{DocumentHandle, OfficeContext};
use tracing::debug;

/// Restricts the document to a [`PageSelection`], then continues.
///
/// Everything behind the selector — later filters, the final store — sees
/// only the surviving pages. A selection that matches no pages fails the run
/// with [`crate::error::EngineError::EmptySelection`] rather than silently
/// producing an empty document.
#[derive(Debug, Clone)]
pub struct PageSelectorFilter {
    selection: PageSelection,
}

impl PageSelectorFilter {
    /// Keep the pages in `selection`.
    pub fn new(selection: PageSelection) -> Self {
        Self { selection }
    }

    /// Keep a single page (1-indexed). The common case.
    pub fn single(page: usize) -> Self {
        Self::new(PageSelection::Single(page))
    }

    /// The selection this filter applies.
    pub fn selection(&self) -> &PageSelection {
        &self.selection
    }
}

impl Filter for PageSelectorFilter {
    fn apply(
        &self,
        context: &OfficeContext,
        document: &mut dyn DocumentHandle,
        chain: &mut dyn FilterChain,
    ) -> Result<(), ConversionError> {
        document.select_pages(&self.selection)?;
        debug!(
            source = %context.source().display(),
            selection = ?self.selection,
            "restricted document pages"
        );
        chain.do_filter(context, document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::filter::{DefaultFilterChain, PageCounterFilter};
    use crate::office::memory::TextDocument;
    use crate::office::LoadOptions;
    use std::sync::Arc;

    fn ctx() -> OfficeContext {
        OfficeContext::new("test.txt", LoadOptions::default())
    }

    #[test]
    fn narrows_the_document_for_everything_behind_it() {
        let after = Arc::new(PageCounterFilter::new());
        let mut chain = DefaultFilterChain::with_default_last(
            false,
            vec![
                Arc::new(PageSelectorFilter::single(2)) as Arc<dyn Filter>,
                after.clone() as Arc<dyn Filter>,
            ],
        )
        .unwrap();

        let mut doc =
            TextDocument::from_pages(vec!["one".into(), "two".into(), "three".into()]);
        chain.do_filter(&ctx(), &mut doc).unwrap();

        assert_eq!(after.page_count(), 1);
        assert_eq!(doc.text().unwrap(), "two");
    }

    #[test]
    fn range_selection_keeps_the_range() {
        let mut chain = DefaultFilterChain::with_default_last(
            false,
            vec![Arc::new(PageSelectorFilter::new(PageSelection::Range(2, 3))) as Arc<dyn Filter>],
        )
        .unwrap();

        let mut doc = TextDocument::from_pages(vec![
            "one".into(),
            "two".into(),
            "three".into(),
            "four".into(),
        ]);
        chain.do_filter(&ctx(), &mut doc).unwrap();
        assert_eq!(doc.text().unwrap(), "two\nthree");
    }

    #[test]
    fn empty_selection_fails_the_run() {
        let mut chain = DefaultFilterChain::with_default_last(
            false,
            vec![Arc::new(PageSelectorFilter::single(7)) as Arc<dyn Filter>],
        )
        .unwrap();

        let mut doc = TextDocument::from_pages(vec!["only".into()]);
        let err = chain.do_filter(&ctx(), &mut doc).unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Engine(EngineError::EmptySelection { total: 1 })
        ));
    }
}
