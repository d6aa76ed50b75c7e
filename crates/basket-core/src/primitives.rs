//! # Innate Limits
//!
//! Hardcoded runtime constants for the Basket order store.
//!
//! The store starts with zero data but fixed limits. These values are
//! compiled into the binary and are immutable at runtime.

/// Maximum number of raw records in a single ingestion batch.
///
/// Batches longer than this are rejected with `InvalidArgument` before
/// any normalization happens. This prevents unbounded memory use from
/// malicious or accidental oversized inputs.
pub const MAX_BATCH_RECORDS: usize = 10_000;

/// Maximum number of products on a single order record.
///
/// Records exceeding this are skipped with a diagnostic, the same
/// recovery path as a missing required key.
pub const MAX_PRODUCTS_PER_ORDER: usize = 1_000;

/// Maximum input file size accepted by the NDJSON loader (100 MB).
///
/// Enforced by the app layer before reading; prevents memory
/// exhaustion from malicious or accidental large files.
pub const MAX_INGEST_FILE_SIZE: u64 = 100 * 1024 * 1024;
