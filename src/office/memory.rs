//! In-process reference engine over form-feed-paginated plain text.
//!
//! This engine exists so the filter layer can be driven end-to-end — tests,
//! examples, the CLI — without an office runtime on the machine. It is not a
//! toy in the sense that it implements every [`DocumentHandle`] capability
//! honestly: a "page" is a `\f`-delimited segment of the file, selection
//! really drops pages, and `refresh()` really recomputes derived state (the
//! text normalisation an office runtime would perform on layout).
//!
//! Engines backed by a real runtime implement the same two traits against
//! their own document model; nothing in the filter layer knows the
//! difference.

use crate::config::PageSelection;
use crate::error::EngineError;
use crate::office::{DocumentHandle, LoadOptions, OfficeEngine};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Page delimiter in the stored text format.
const PAGE_BREAK: char = '\u{0C}';

/// Opens `\f`-paginated plain-text documents from the filesystem.
#[derive(Debug, Default)]
pub struct PlainTextEngine;

impl PlainTextEngine {
    pub fn new() -> Self {
        Self
    }
}

impl OfficeEngine for PlainTextEngine {
    fn load(
        &self,
        source: &Path,
        options: &LoadOptions,
    ) -> Result<Box<dyn DocumentHandle>, EngineError> {
        let raw = std::fs::read_to_string(source)?;
        let pages: Vec<String> = raw.split(PAGE_BREAK).map(str::to_owned).collect();
        debug!(
            source = %source.display(),
            pages = pages.len(),
            read_only = options.read_only,
            "loaded plain-text document"
        );
        Ok(Box::new(TextDocument {
            pages,
            read_only: options.read_only,
        }))
    }
}

/// A live plain-text document: an ordered list of page strings.
#[derive(Debug)]
pub struct TextDocument {
    pages: Vec<String>,
    read_only: bool,
}

impl TextDocument {
    /// Build a document directly from page strings, bypassing the
    /// filesystem. Handy for unit tests of individual filters.
    pub fn from_pages(pages: Vec<String>) -> Self {
        Self {
            pages,
            read_only: false,
        }
    }

    fn check_writable(&self) -> Result<(), EngineError> {
        if self.read_only {
            Err(EngineError::ReadOnly)
        } else {
            Ok(())
        }
    }
}

impl DocumentHandle for TextDocument {
    fn page_count(&mut self) -> Result<usize, EngineError> {
        Ok(self.pages.len())
    }

    fn select_pages(&mut self, selection: &PageSelection) -> Result<(), EngineError> {
        self.check_writable()?;
        let keep = selection.to_indices(self.pages.len());
        if keep.is_empty() {
            return Err(EngineError::EmptySelection {
                total: self.pages.len(),
            });
        }
        // to_indices returns sorted, in-range positions.
        self.pages = keep.iter().map(|&i| self.pages[i].clone()).collect();
        Ok(())
    }

    fn refresh(&mut self) -> Result<(), EngineError> {
        self.check_writable()?;
        for page in &mut self.pages {
            *page = normalise_page(page);
        }
        Ok(())
    }

    fn replace_text(&mut self, search: &str, replacement: &str) -> Result<usize, EngineError> {
        self.check_writable()?;
        if search.is_empty() {
            return Err(EngineError::OperationFailed(
                "search string must not be empty".into(),
            ));
        }
        let mut replaced = 0;
        for page in &mut self.pages {
            let hits = page.matches(search).count();
            if hits > 0 {
                *page = page.replace(search, replacement);
                replaced += hits;
            }
        }
        Ok(replaced)
    }

    fn text(&mut self) -> Result<String, EngineError> {
        Ok(self.pages.join("\n"))
    }

    fn store(&mut self, target: &Path) -> Result<(), EngineError> {
        let content: String = {
            let mut joined = String::new();
            for (i, page) in self.pages.iter().enumerate() {
                if i > 0 {
                    joined.push(PAGE_BREAK);
                }
                joined.push_str(page);
            }
            joined
        };

        // Atomic write: temp file in the target's directory, then rename.
        // A temp file on another filesystem would make the rename a copy.
        let dir = target.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(target)
            .map_err(|e| EngineError::Io(e.error))?;
        debug!(target = %target.display(), pages = self.pages.len(), "stored document");
        Ok(())
    }
}

// ── Refresh normalisation rules ──────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

/// Recompute a page's derived text state.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF → LF)
/// 2. Trim trailing whitespace per line
/// 3. Collapse 3+ consecutive blank lines down to 2
///
/// Order matters: line endings must be uniform before the per-line trim, and
/// the blank-line collapse assumes trimmed lines.
fn normalise_page(input: &str) -> String {
    let s = input.replace("\r\n", "\n").replace('\r', "\n");
    let s = s
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    RE_BLANK_LINES.replace_all(&s, "\n\n\n").to_string()
}
