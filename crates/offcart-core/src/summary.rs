use std::fmt;

/// Outcome counters for one collection run.
///
/// Every identifier ends up in exactly one of these buckets, except `fetched`,
/// which counts pages retrieved before extraction (a fetched identifier is
/// later counted as written or duplicate).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Input lines that were neither a plausible barcode nor a product URL.
    pub invalid: u64,
    /// Pages retrieved successfully.
    pub fetched: u64,
    /// Identifiers with no corresponding product (HTTP 404).
    pub not_found: u64,
    /// Identifiers abandoned after exhausting retries.
    pub errors: u64,
    /// Records skipped because their barcode was already written.
    pub duplicates: u64,
    /// Records written to the output sink.
    pub written: u64,
}

impl RunSummary {
    /// Total number of input lines accounted for.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.invalid + self.not_found + self.errors + self.duplicates + self.written
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run complete — written: {}, duplicates: {}, not found: {}, errors: {}, invalid input: {} (fetched {} pages)",
            self.written, self.duplicates, self.not_found, self.errors, self.invalid, self.fetched
        )
    }
}
