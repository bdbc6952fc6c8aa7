//! CLI binary for officeflow.
//!
//! A thin shim over the library crate that maps CLI flags to a filter chain
//! and drives one conversion per input file, in parallel for batches.

use anyhow::{Context, Result};
use clap::Parser;
use officeflow::filter::{DefaultFilterChain, PageSelectorFilter, TextReplacerFilter};
use officeflow::office::memory::PlainTextEngine;
use officeflow::{
    convert, inspect, ConversionConfig, ConversionError, ConversionSummary, PageSelection,
};
use rayon::prelude::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Keep page 1 of a paginated text document
  officeflow --pages 1 report.txt -o page1.txt

  # Substitute placeholders, refresh, overwrite the previous output
  officeflow --replace DRAFT=FINAL --overwrite contract.txt -o contract.out.txt

  # Batch: one conversion per input, run in parallel
  officeflow --pages 1-3 a.txt b.txt c.txt

  # Skip the trailing refresh step
  officeflow --no-refresh --pages 2 notes.txt -o extract.txt

  # Page count only, no conversion
  officeflow --inspect-only report.txt

  # Machine-readable run summaries
  officeflow --json --pages 1 report.txt -o page1.txt

DOCUMENT FORMAT:
  The built-in engine reads plain text with form-feed (U+000C) page breaks,
  the format produced by `pr`, troff, and classic text exporters. Each
  conversion loads the document, drives the filter chain over it, and stores
  the surviving pages atomically.
"#;

/// Apply a filter chain to paginated text documents.
#[derive(Parser, Debug)]
#[command(
    name = "officeflow",
    version,
    about = "Apply a filter chain to paginated text documents",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input document(s). With several inputs, conversions run in parallel
    /// and -o must name a directory (or be omitted).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Target file (single input) or directory (any number of inputs).
    /// Default: the input with an `.out.txt` extension, next to it.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pages to keep: all, 5, 3-15, or 1,3,5.
    #[arg(long, default_value = "all")]
    pages: String,

    /// Text substitution FROM=TO; repeatable, applied in order.
    #[arg(long = "replace", value_name = "FROM=TO")]
    replacements: Vec<String>,

    /// Do not append the trailing refresh step to the chain.
    #[arg(long)]
    no_refresh: bool,

    /// Replace target files that already exist.
    #[arg(long)]
    overwrite: bool,

    /// Print page counts only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Output run summaries as JSON instead of human-readable lines.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {err:#}", red("error:"));
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let engine = PlainTextEngine::new();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        for input in &cli.inputs {
            let info = inspect(&engine, input)
                .with_context(|| format!("failed to inspect {}", input.display()))?;
            if cli.json {
                println!("{}", serde_json::to_string(&info)?);
            } else {
                println!("{}: {} pages", info.source.display(), info.page_count);
            }
        }
        return Ok(());
    }

    // ── Validate flags, parse once ───────────────────────────────────────
    let pages = parse_pages(&cli.pages)?;
    let replacements = parse_replacements(&cli.replacements)?;
    if cli.inputs.len() > 1 {
        if let Some(ref out) = cli.output {
            if !out.is_dir() {
                anyhow::bail!(
                    "with multiple inputs, -o must name an existing directory (got '{}')",
                    out.display()
                );
            }
        }
    }

    let config = ConversionConfig::builder().overwrite(cli.overwrite).build();

    // ── Convert, one chain per input ─────────────────────────────────────
    // Chains are mutable single-conversion state; each job builds its own.
    // The canonical refresh instance is shared across all of them.
    let results: Vec<(PathBuf, Result<ConversionSummary, ConversionError>)> = cli
        .inputs
        .par_iter()
        .map(|input| {
            let target = target_for(input, cli.output.as_deref(), cli.inputs.len());
            let result = build_chain(&pages, &replacements, cli.no_refresh)
                .and_then(|mut chain| convert(&engine, input, &target, &mut chain, &config));
            (target, result)
        })
        .collect();

    // ── Report ───────────────────────────────────────────────────────────
    let mut failed = 0usize;
    let mut summaries = Vec::new();
    for (input, (target, result)) in cli.inputs.iter().zip(results) {
        match result {
            Ok(summary) => {
                if !cli.quiet && !cli.json {
                    println!(
                        "{} {} {} {}  {}",
                        green("✓"),
                        input.display(),
                        dim("→"),
                        target.display(),
                        dim(&format!(
                            "{} → {} pages, {}ms",
                            summary.pages_in, summary.pages_out, summary.total_duration_ms
                        )),
                    );
                }
                summaries.push(summary);
            }
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {e}", red("✗"), input.display());
            }
        }
    }

    if cli.json {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        serde_json::to_writer_pretty(&mut handle, &summaries)?;
        handle.write_all(b"\n")?;
    } else if !cli.quiet && cli.inputs.len() > 1 {
        eprintln!(
            "{} {}/{} documents converted",
            if failed == 0 { green("✔") } else { red("✘") },
            bold(&(cli.inputs.len() - failed).to_string()),
            cli.inputs.len()
        );
    }

    if failed > 0 {
        anyhow::bail!("{failed} conversion(s) failed");
    }
    Ok(())
}

/// Pick the target path for one input.
fn target_for(input: &Path, output: Option<&Path>, input_count: usize) -> PathBuf {
    match output {
        Some(out) if input_count == 1 && !out.is_dir() => out.to_path_buf(),
        Some(dir) => {
            let name = input
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("output"));
            dir.join(name.with_extension("out.txt"))
        }
        None => input.with_extension("out.txt"),
    }
}

/// Build the per-conversion chain from the parsed flags.
fn build_chain(
    pages: &PageSelection,
    replacements: &[(String, String)],
    no_refresh: bool,
) -> Result<DefaultFilterChain, ConversionError> {
    let mut builder = DefaultFilterChain::builder();
    if *pages != PageSelection::All {
        builder = builder.filter(Arc::new(PageSelectorFilter::new(pages.clone())));
    }
    if !replacements.is_empty() {
        let (search, replace): (Vec<String>, Vec<String>) =
            replacements.iter().cloned().unzip();
        builder = builder.filter(Arc::new(TextReplacerFilter::new(search, replace)?));
    }
    builder.append_default_last(!no_refresh).build()
}

/// Parse `--pages` into a `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start.trim().parse().context("invalid start page in range")?;
        let end: usize = end.trim().parse().context("invalid end page in range")?;
        if start < 1 {
            anyhow::bail!("pages are 1-indexed, minimum is 1 (got {start})");
        }
        if start > end {
            anyhow::bail!("invalid page range '{start}-{end}': start must be <= end");
        }
        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .context(format!("invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;
        for &p in &pages {
            if p < 1 {
                anyhow::bail!("pages are 1-indexed, minimum is 1 (got {p})");
            }
        }
        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("invalid page number")?;
    if page < 1 {
        anyhow::bail!("pages are 1-indexed, minimum is 1 (got {page})");
    }
    Ok(PageSelection::Single(page))
}

/// Parse repeated `--replace FROM=TO` flags into ordered pairs.
fn parse_replacements(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|spec| {
            spec.split_once('=')
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .with_context(|| format!("invalid --replace '{spec}': expected FROM=TO"))
        })
        .collect()
}
