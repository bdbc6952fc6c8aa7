//! Configuration types for document conversion.
//!
//! Conversion behaviour is controlled through [`ConversionConfig`], built via
//! its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config across threads, log it, and diff two runs to
//! understand why their outputs differ.
//!
//! The filter chain itself is *not* part of the config: a chain is mutable,
//! replayable state driven once per conversion, so it is passed to
//! [`crate::convert::convert`] by `&mut` reference. The config carries the
//! document open/store hints that stay constant across runs.

use serde::{Deserialize, Serialize};

/// Configuration for a document conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use officeflow::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .read_only(false)
///     .overwrite(true)
///     .build();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Open the document without any visible UI. Default: true.
    ///
    /// Engines backed by a real office runtime interpret this as the
    /// headless/hidden load hint; in-process engines ignore it.
    pub hidden: bool,

    /// Open the document read-only. Default: false.
    ///
    /// A read-only document rejects every mutating capability with
    /// [`crate::error::EngineError::ReadOnly`], so any chain containing a
    /// mutating filter (selection, replacement, refresh) will fail its run.
    /// Useful for chains that only observe, e.g. a lone page counter.
    pub read_only: bool,

    /// Replace the target file if it already exists. Default: false.
    ///
    /// When false, [`crate::convert::convert`] refuses the conversion with
    /// [`crate::error::ConversionError::TargetExists`] before the document is
    /// even loaded, so a misdirected run cannot clobber prior output.
    pub overwrite: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            hidden: true,
            read_only: false,
            overwrite: false,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn hidden(mut self, v: bool) -> Self {
        self.config.hidden = v;
        self
    }

    pub fn read_only(mut self, v: bool) -> Self {
        self.config.read_only = v;
        self
    }

    pub fn overwrite(mut self, v: bool) -> Self {
        self.config.overwrite = v;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ConversionConfig {
        self.config
    }
}

// ── Page selection ───────────────────────────────────────────────────────

/// Specifies which pages of a document a selector keeps.
///
/// The vocabulary of [`crate::filter::PageSelectorFilter`] and of the CLI
/// `--pages` flag. Page numbers are 1-indexed everywhere a human supplies
/// them; [`PageSelection::to_indices`] converts to 0-indexed positions
/// against a concrete page count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Keep all pages (default).
    #[default]
    All,
    /// Keep a single page (1-indexed).
    Single(usize),
    /// Keep a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Keep specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed
    /// page numbers. Out-of-range pages are dropped silently; whether an
    /// empty result is an error is the caller's decision.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}
