//! Conversion entry points.
//!
//! [`convert`] is the driver the chain layer exists for: it validates the
//! source and target, obtains a live document from the engine, drives the
//! filter chain **once**, and lets the document persist itself. The chain is
//! passed by `&mut` reference so the caller keeps ownership — call
//! [`FilterChain::reset`] between conversions to replay the same chain
//! against the next document.
//!
//! Any filter failure surfaces here as the conversion's failure: the chain
//! layer performs no retry, and because the target is written only after the
//! chain completes (atomically, by the engine's `store` contract), a failed
//! conversion leaves no partial output behind.

use crate::config::ConversionConfig;
use crate::error::{ConversionError, EngineError};
use crate::filter::FilterChain;
use crate::office::{DocumentInfo, LoadOptions, OfficeContext, OfficeEngine};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// What a completed conversion did, with timings.
///
/// Serialisable so drivers can log it or emit it as JSON (the CLI's
/// `--json` flag does exactly that).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionSummary {
    /// Source document path.
    pub source: std::path::PathBuf,
    /// Target document path.
    pub target: std::path::PathBuf,
    /// Page count when the document was loaded.
    pub pages_in: usize,
    /// Page count when the document was stored.
    pub pages_out: usize,
    /// Milliseconds spent loading the document.
    pub load_duration_ms: u64,
    /// Milliseconds spent running the filter chain.
    pub filter_duration_ms: u64,
    /// Milliseconds spent storing the output.
    pub store_duration_ms: u64,
    /// End-to-end milliseconds.
    pub total_duration_ms: u64,
}

/// Convert `source` into `target` by driving `chain` over the live document.
///
/// # Arguments
/// * `engine` — the document provider
/// * `source` / `target` — input and output paths
/// * `chain`  — the filter chain to drive; driven from its current cursor
///   position, so a freshly built or freshly reset chain runs in full
/// * `config` — open/store hints
///
/// # Errors
/// * [`ConversionError::SourceNotFound`] / [`ConversionError::TargetExists`]
///   before anything is loaded
/// * [`ConversionError::Engine`] — a filter's capability call failed;
///   propagated unchanged from the filter that hit it
/// * [`ConversionError::OutputWriteFailed`] — the final store failed
pub fn convert(
    engine: &dyn OfficeEngine,
    source: impl AsRef<Path>,
    target: impl AsRef<Path>,
    chain: &mut dyn FilterChain,
    config: &ConversionConfig,
) -> Result<ConversionSummary, ConversionError> {
    let total_start = Instant::now();
    let source = source.as_ref();
    let target = target.as_ref();
    info!(source = %source.display(), target = %target.display(), "starting conversion");

    // ── Step 1: Validate paths ───────────────────────────────────────────
    if !source.exists() {
        return Err(ConversionError::SourceNotFound {
            path: source.to_path_buf(),
        });
    }
    if target.exists() && !config.overwrite {
        return Err(ConversionError::TargetExists {
            path: target.to_path_buf(),
        });
    }

    // ── Step 2: Load the document ────────────────────────────────────────
    let options = LoadOptions {
        hidden: config.hidden,
        read_only: config.read_only,
    };
    let load_start = Instant::now();
    let mut document = engine.load(source, &options)?;
    let load_duration_ms = load_start.elapsed().as_millis() as u64;
    let pages_in = document.page_count()?;
    debug!(pages = pages_in, "document loaded");

    // ── Step 3: Drive the chain ──────────────────────────────────────────
    // One call runs the whole chain: each filter that wants its successors
    // to run continues the chain itself.
    let context = OfficeContext::new(source, options);
    let filter_start = Instant::now();
    chain.do_filter(&context, document.as_mut())?;
    let filter_duration_ms = filter_start.elapsed().as_millis() as u64;
    let pages_out = document.page_count()?;

    // ── Step 4: Store the output ─────────────────────────────────────────
    let store_start = Instant::now();
    document.store(target).map_err(|e| match e {
        EngineError::Io(source) => ConversionError::OutputWriteFailed {
            path: target.to_path_buf(),
            source,
        },
        other => ConversionError::Engine(other),
    })?;
    let store_duration_ms = store_start.elapsed().as_millis() as u64;

    let summary = ConversionSummary {
        source: source.to_path_buf(),
        target: target.to_path_buf(),
        pages_in,
        pages_out,
        load_duration_ms,
        filter_duration_ms,
        store_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        pages_in,
        pages_out,
        total_ms = summary.total_duration_ms,
        "conversion complete"
    );
    Ok(summary)
}

/// Report document facts without converting.
///
/// Opens the document read-only and hidden; no chain runs and nothing is
/// written.
pub fn inspect(
    engine: &dyn OfficeEngine,
    source: impl AsRef<Path>,
) -> Result<DocumentInfo, ConversionError> {
    let source = source.as_ref();
    if !source.exists() {
        return Err(ConversionError::SourceNotFound {
            path: source.to_path_buf(),
        });
    }
    let options = LoadOptions {
        hidden: true,
        read_only: true,
    };
    let mut document = engine.load(source, &options)?;
    Ok(DocumentInfo {
        source: source.to_path_buf(),
        page_count: document.page_count()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{DefaultFilterChain, Filter, PageCounterFilter};
    use crate::office::memory::PlainTextEngine;
    use std::sync::Arc;

    #[test]
    fn missing_source_is_rejected_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let mut chain = DefaultFilterChain::new(Vec::<Arc<dyn Filter>>::new());
        let err = convert(
            &PlainTextEngine::new(),
            dir.path().join("absent.txt"),
            dir.path().join("out.txt"),
            &mut chain,
            &ConversionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConversionError::SourceNotFound { .. }));
    }

    #[test]
    fn existing_target_is_refused_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.txt");
        let target = dir.path().join("out.txt");
        std::fs::write(&source, "content").unwrap();
        std::fs::write(&target, "previous output").unwrap();

        let mut chain = DefaultFilterChain::new(Vec::<Arc<dyn Filter>>::new());
        let err = convert(
            &PlainTextEngine::new(),
            &source,
            &target,
            &mut chain,
            &ConversionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConversionError::TargetExists { .. }));
        // Prior output untouched.
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "previous output");
    }

    #[test]
    fn summary_reports_page_counts_before_and_after() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.txt");
        std::fs::write(&source, "p1\u{0C}p2\u{0C}p3").unwrap();

        let counter = Arc::new(PageCounterFilter::new());
        let mut chain = DefaultFilterChain::builder()
            .filter(counter.clone())
            .build()
            .unwrap();

        let summary = convert(
            &PlainTextEngine::new(),
            &source,
            dir.path().join("out.txt"),
            &mut chain,
            &ConversionConfig::default(),
        )
        .unwrap();

        assert_eq!(summary.pages_in, 3);
        assert_eq!(summary.pages_out, 3);
        assert_eq!(counter.page_count(), 3);
    }

    #[test]
    fn inspect_reports_pages_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.txt");
        std::fs::write(&source, "a\u{0C}b").unwrap();

        let info = inspect(&PlainTextEngine::new(), &source).unwrap();
        assert_eq!(info.page_count, 2);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn summary_serialises_to_json() {
        let summary = ConversionSummary {
            source: "a.txt".into(),
            target: "b.txt".into(),
            pages_in: 3,
            pages_out: 1,
            load_duration_ms: 1,
            filter_duration_ms: 2,
            store_duration_ms: 1,
            total_duration_ms: 4,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"pages_in\":3"));
        let back: ConversionSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pages_out, 1);
    }
}
