//! The sequential collection loop.
//!
//! One identifier at a time, in input order: normalize → fetch → extract →
//! map → emit. Per-identifier failures are logged, counted, and skipped; the
//! run always ends with a summary. Only sink failures are fatal — partial,
//! unwritable output has no recovery value, so those propagate immediately.

use std::io::BufWriter;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use offcart_core::{AppConfig, ProductRecord, RunSummary};
use offcart_scraper::{
    map_record, normalize, EmitOutcome, FetchedPage, Identifier, PageClient, PageExtractor,
    RecordSink, RequestGate, ScrapeError,
};

/// Runs one full collection over the identifiers in `input` and returns the
/// outcome counters.
///
/// # Errors
///
/// Returns an error if the input file cannot be read, the HTTP client cannot
/// be constructed, or the output sink fails. Everything else is counted and
/// skipped.
pub(crate) async fn execute(config: &AppConfig, input: &Path) -> anyhow::Result<RunSummary> {
    let lines = read_input_lines(input)?;
    let total = lines.len();

    let client = PageClient::new(
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
    )
    .context("failed to build HTTP client")?
    .with_base_urls(&config.world_base_url, &config.french_base_url);

    let gate = RequestGate::new(Duration::from_millis(config.request_delay_ms));

    let (output_path, file) =
        offcart_scraper::create_output(&config.output_dir, config.output_format)
            .context("failed to create output file")?;
    let path_display = output_path.display().to_string();
    let mut sink = RecordSink::new(config.output_format, BufWriter::new(file), &path_display)
        .context("failed to initialize output sink")?;

    // Ctrl-c requests a graceful stop: the in-flight identifier finishes,
    // the sink stays valid, and the summary still prints.
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested — finishing the current identifier");
                shutdown.store(true, Ordering::SeqCst);
            }
        });
    }

    let mut summary = RunSummary::default();

    for (pos, line) in lines.iter().enumerate() {
        if shutdown.load(Ordering::SeqCst) {
            println!("interrupted — stopping before item {}/{total}", pos + 1);
            break;
        }
        let step = pos + 1;

        let id = match normalize(line) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(line = %line, error = %e, "skipping invalid input line");
                eprintln!("[{step}/{total}] SKIPPED {line}");
                summary.invalid += 1;
                continue;
            }
        };

        let page = match client.fetch_product_page(&gate, &id).await {
            Ok(page) => page,
            Err(ScrapeError::NotFound { url }) => {
                eprintln!("[{step}/{total}] NOT FOUND {url}");
                summary.not_found += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(code_barres = %id.code_barres, error = %e, "fetch failed");
                eprintln!("[{step}/{total}] FAILED {line} -> {e}");
                summary.errors += 1;
                continue;
            }
        };
        summary.fetched += 1;

        let record = build_record(&page, &id, sink.written());
        let outcome = sink
            .emit(&record)
            .with_context(|| format!("failed writing to {path_display}"))?;
        match outcome {
            EmitOutcome::Written => {
                println!("[{step}/{total}] SUCCESS {}", page.final_url);
                summary.written += 1;
            }
            EmitOutcome::SkippedDuplicate => {
                println!("[{step}/{total}] DUPLICATE {}", record.code_barres);
                summary.duplicates += 1;
            }
        }
    }

    sink.finish()
        .with_context(|| format!("failed finalizing {path_display}"))?;

    println!("{summary}");
    println!("output: {path_display}");
    Ok(summary)
}

/// Extraction and mapping are synchronous and infallible; kept out of the
/// async loop body so the parsed document never lives across an await.
fn build_record(page: &FetchedPage, id: &Identifier, index: u64) -> ProductRecord {
    let raw = PageExtractor::new(&page.html).extract();
    map_record(raw, id, &page.final_url, index)
}

/// Reads the input file, dropping blank lines and `#` comments.
fn read_input_lines(input: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read input file {}", input.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
