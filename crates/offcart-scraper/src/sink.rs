//! De-duplicated, streaming record output.
//!
//! Records are written one at a time and flushed immediately, so memory use
//! is bounded by a single record and an interrupted run leaves a readable
//! file behind. The sink owns the run's dedup set: a barcode that was already
//! written is reported as a duplicate and not written again.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use offcart_core::{OutputFormat, ProductRecord};

use crate::error::ScrapeError;

/// CSV column order. Matches the record's field order, with `nutriments`
/// flattened into dot-joined columns.
const CSV_HEADER: [&str; 20] = [
    "nom",
    "nom_générique",
    "brands_tags",
    "marque",
    "prix",
    "image",
    "score_nutritionnel",
    "nutriments.protides",
    "nutriments.glucides",
    "nutriments.lipides",
    "nutriments.calories",
    "poids_unité",
    "pays_origine",
    "fabricant",
    "pays_commercialisation",
    "distributeur",
    "code_barres",
    "date_peremption",
    "source",
    "index",
];

/// Result of offering one record to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    Written,
    /// The record's barcode was already written in this run; nothing was
    /// added to the output.
    SkippedDuplicate,
}

enum SinkWriter<W: Write> {
    Jsonl(W),
    Csv(csv::Writer<W>),
}

/// Streaming writer with a per-run dedup set keyed on `code_barres`.
pub struct RecordSink<W: Write> {
    writer: SinkWriter<W>,
    seen: HashSet<String>,
    written: u64,
    /// Destination description used in error messages.
    path: String,
}

impl<W: Write> RecordSink<W> {
    /// Wraps `writer` in a sink for the given format. For CSV the header row
    /// is written immediately, so even an empty run produces a well-formed
    /// file.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Sink`] if the CSV header cannot be written.
    pub fn new(format: OutputFormat, writer: W, path: &str) -> Result<Self, ScrapeError> {
        let writer = match format {
            OutputFormat::Jsonl => SinkWriter::Jsonl(writer),
            OutputFormat::Csv => {
                let mut csv_writer = csv::Writer::from_writer(writer);
                csv_writer
                    .write_record(CSV_HEADER)
                    .and_then(|()| csv_writer.flush().map_err(csv::Error::from))
                    .map_err(|e| ScrapeError::Sink {
                        path: path.to_string(),
                        source: csv_io_error(e),
                    })?;
                SinkWriter::Csv(csv_writer)
            }
        };
        Ok(Self {
            writer,
            seen: HashSet::new(),
            written: 0,
            path: path.to_string(),
        })
    }

    /// Number of records written so far. The run loop uses this as the next
    /// record's `index`, which keeps written indexes contiguous.
    #[must_use]
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Writes `record` unless its barcode was already written this run.
    /// Idempotent per barcode: the second offer is a no-op reporting
    /// [`EmitOutcome::SkippedDuplicate`].
    ///
    /// The underlying writer is flushed after every record so that
    /// cancellation never leaves a partial line.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Sink`] on any write failure. Sink failures are
    /// the one error class that aborts a run.
    pub fn emit(&mut self, record: &ProductRecord) -> Result<EmitOutcome, ScrapeError> {
        if self.seen.contains(&record.code_barres) {
            return Ok(EmitOutcome::SkippedDuplicate);
        }

        match &mut self.writer {
            SinkWriter::Jsonl(w) => {
                let line = serde_json::to_string(record).map_err(|e| ScrapeError::Sink {
                    path: self.path.clone(),
                    source: io::Error::new(io::ErrorKind::InvalidData, e),
                })?;
                writeln!(w, "{line}")
                    .and_then(|()| w.flush())
                    .map_err(|e| ScrapeError::Sink {
                        path: self.path.clone(),
                        source: e,
                    })?;
            }
            SinkWriter::Csv(w) => {
                w.write_record(csv_row(record))
                    .and_then(|()| w.flush().map_err(csv::Error::from))
                    .map_err(|e| ScrapeError::Sink {
                        path: self.path.clone(),
                        source: csv_io_error(e),
                    })?;
            }
        }

        self.seen.insert(record.code_barres.clone());
        self.written += 1;
        Ok(EmitOutcome::Written)
    }

    /// Flushes and drops the writer.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Sink`] if the final flush fails.
    pub fn finish(mut self) -> Result<(), ScrapeError> {
        let result = match &mut self.writer {
            SinkWriter::Jsonl(w) => w.flush(),
            SinkWriter::Csv(w) => w.flush(),
        };
        result.map_err(|e| ScrapeError::Sink {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// Creates the run's output file under `dir`, named with a UTC timestamp so
/// successive runs never overwrite each other.
///
/// # Errors
///
/// Returns [`ScrapeError::Sink`] if the directory or file cannot be created.
pub fn create_output(dir: &Path, format: OutputFormat) -> Result<(PathBuf, File), ScrapeError> {
    let sink_err = |path: &Path, source: io::Error| ScrapeError::Sink {
        path: path.display().to_string(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(|e| sink_err(dir, e))?;
    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("products_{stamp}.{}", format.extension()));
    let file = File::create(&path).map_err(|e| sink_err(&path, e))?;
    Ok((path, file))
}

/// Flattens a record into the CSV column order. `None` becomes an empty
/// cell; the brand list is joined into a single delimited string.
fn csv_row(record: &ProductRecord) -> [String; 20] {
    [
        record.nom.clone(),
        record.nom_generique.clone(),
        record.brands_tags.join(", "),
        record.marque.clone(),
        fmt_opt_number(record.prix),
        record.image.clone(),
        record.score_nutritionnel.clone().unwrap_or_default(),
        fmt_opt_number(record.nutriments.protides),
        fmt_opt_number(record.nutriments.glucides),
        fmt_opt_number(record.nutriments.lipides),
        fmt_opt_number(record.nutriments.calories),
        record.poids_unite.clone(),
        record.pays_origine.clone(),
        record.fabricant.clone(),
        record.pays_commercialisation.clone(),
        record.distributeur.clone(),
        record.code_barres.clone(),
        record.date_peremption.clone().unwrap_or_default(),
        record.source.clone(),
        record.index.to_string(),
    ]
}

fn fmt_opt_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn csv_io_error(err: csv::Error) -> io::Error {
    match err.into_kind() {
        csv::ErrorKind::Io(e) => e,
        other => io::Error::new(io::ErrorKind::Other, format!("{other:?}")),
    }
}
