//! Text-substitution step.

use crate::error::ConversionError;
use crate::filter::{Filter, FilterChain};
use crate::office::{DocumentHandle, OfficeContext};
use tracing::debug;

/// Applies paired search→replacement substitutions, then continues.
///
/// Pairs are applied in order against the whole document, so a later pair
/// sees the output of an earlier one.
#[derive(Debug, Clone)]
pub struct TextReplacerFilter {
    search: Vec<String>,
    replacements: Vec<String>,
}

impl TextReplacerFilter {
    /// Build a replacer from parallel search/replacement lists.
    ///
    /// # Errors
    /// [`ConversionError::InvalidChain`] when the lists are empty or their
    /// lengths differ; nothing is constructed.
    pub fn new(
        search: Vec<String>,
        replacements: Vec<String>,
    ) -> Result<Self, ConversionError> {
        if search.is_empty() {
            return Err(ConversionError::InvalidChain(
                "text replacer needs at least one search string".into(),
            ));
        }
        if search.len() != replacements.len() {
            return Err(ConversionError::InvalidChain(format!(
                "text replacer has {} search strings but {} replacements",
                search.len(),
                replacements.len()
            )));
        }
        Ok(Self {
            search,
            replacements,
        })
    }
}

impl Filter for TextReplacerFilter {
    fn apply(
        &self,
        context: &OfficeContext,
        document: &mut dyn DocumentHandle,
        chain: &mut dyn FilterChain,
    ) -> Result<(), ConversionError> {
        for (search, replacement) in self.search.iter().zip(&self.replacements) {
            let replaced = document.replace_text(search, replacement)?;
            debug!(
                source = %context.source().display(),
                search = %search,
                replaced,
                "applied text substitution"
            );
        }
        chain.do_filter(context, document)
    }
}
