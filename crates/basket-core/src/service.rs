//! # Orders Service
//!
//! The high-level facade over the store: the three operations external
//! callers interact with (ingest, range query, top-N), plus the count
//! surface used for status reporting.
//!
//! The service owns the store handle. Each operation acquires its own
//! transaction for its duration and releases it on every exit path;
//! nothing is held across calls.

use crate::normalize::{Normalizer, SkippedRecord};
use crate::primitives::MAX_BATCH_RECORDS;
use crate::query;
use crate::schema::Table;
use crate::storage::RedbStore;
use crate::types::{RawRecord, Row, StoreError, TopUser};
use std::path::Path;

/// Outcome of one ingestion call.
///
/// `skipped` carries the per-record diagnostics; skipped records never
/// fail the batch, so a non-empty `skipped` still means the remaining
/// records committed.
#[derive(Debug)]
pub struct IngestReport {
    /// Distinct users materialized from this batch.
    pub users: usize,
    /// Distinct products materialized from this batch.
    pub products: usize,
    /// Orders persisted from this batch.
    pub orders: usize,
    /// Order lines persisted from this batch.
    pub lines: usize,
    /// Records dropped during normalization, with reasons.
    pub skipped: Vec<SkippedRecord>,
}

/// The application-facing order service.
#[derive(Debug)]
pub struct OrdersService {
    store: RedbStore,
}

impl OrdersService {
    /// Open or create the order database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self {
            store: RedbStore::open(path)?,
        })
    }

    /// Wrap an already-open store.
    #[must_use]
    pub fn with_store(store: RedbStore) -> Self {
        Self { store }
    }

    /// Ingest a batch of raw order records.
    ///
    /// Runs the normalizer over every record, accumulating entities
    /// batch-wide with first-wins dedup, then persists all four entity
    /// sets in one transaction: either the whole batch commits or none
    /// of it does. Records with missing keys are skipped and reported,
    /// never aborting the batch.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the batch exceeds [`MAX_BATCH_RECORDS`]
    /// (checked before any normalization); `IoError` if the commit
    /// fails, in which case the store observed nothing.
    pub fn ingest(&mut self, records: &[RawRecord]) -> Result<IngestReport, StoreError> {
        if records.len() > MAX_BATCH_RECORDS {
            return Err(StoreError::InvalidArgument(format!(
                "batch of {} records exceeds limit {}",
                records.len(),
                MAX_BATCH_RECORDS
            )));
        }

        let (batch, skipped) = Normalizer::normalize_all(records);
        let report = IngestReport {
            users: batch.user_count(),
            products: batch.product_count(),
            orders: batch.order_count(),
            lines: batch.line_count(),
            skipped,
        };
        self.store.ingest_batch(&batch)?;
        Ok(report)
    }

    /// Select entries of a named table whose named column falls within
    /// the inclusive `[lower, upper]` range. See [`query::entries_in_range`].
    pub fn entries_in_range(
        &self,
        table: &str,
        column: &str,
        lower: f64,
        upper: f64,
    ) -> Result<Vec<Row>, StoreError> {
        query::entries_in_range(&self.store, table, column, lower, upper)
    }

    /// The `n` users with the most purchased line items. See
    /// [`query::top_users`].
    pub fn top_users(&self, n: usize) -> Result<Vec<TopUser>, StoreError> {
        query::top_users(&self.store, n)
    }

    /// Row count of a schema table, for the status surface.
    pub fn row_count(&self, table: Table) -> Result<usize, StoreError> {
        self.store.row_count(table)
    }

    /// Direct access to the underlying store.
    #[must_use]
    pub fn store(&self) -> &RedbStore {
        &self.store
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawProduct, RawUser};
    use tempfile::tempdir;

    fn record(id: u64, created: i64, user_id: u64, product_ids: &[u64]) -> RawRecord {
        RawRecord {
            id: Some(id),
            created: Some(created),
            user: Some(RawUser {
                id: Some(user_id),
                name: Some(format!("user-{user_id}")),
                city: Some("Lisbon".to_string()),
            }),
            products: Some(
                product_ids
                    .iter()
                    .map(|&pid| RawProduct {
                        id: Some(pid),
                        name: Some(format!("product-{pid}")),
                        price: Some(4.2),
                    })
                    .collect(),
            ),
        }
    }

    #[test]
    fn ingest_reports_batch_wide_counts() {
        let temp = tempdir().expect("temp dir");
        let mut service = OrdersService::open(temp.path().join("test.redb")).expect("open");

        let report = service
            .ingest(&[
                record(1, 100, 10, &[100, 101]),
                record(2, 200, 10, &[100]),
            ])
            .expect("ingest");

        assert_eq!(report.users, 1);
        assert_eq!(report.products, 2);
        assert_eq!(report.orders, 2);
        assert_eq!(report.lines, 3);
        assert!(report.skipped.is_empty());

        assert_eq!(service.row_count(Table::Users).expect("count"), 1);
        assert_eq!(service.row_count(Table::OrderLines).expect("count"), 3);
    }

    #[test]
    fn skipped_records_do_not_abort_the_batch() {
        let temp = tempdir().expect("temp dir");
        let mut service = OrdersService::open(temp.path().join("test.redb")).expect("open");

        let mut malformed = record(2, 200, 11, &[]);
        malformed.created = None;

        let report = service
            .ingest(&[record(1, 100, 10, &[]), malformed, record(3, 300, 12, &[])])
            .expect("ingest");

        assert_eq!(report.orders, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(service.row_count(Table::Orders).expect("count"), 2);
    }

    #[test]
    fn oversized_batch_is_rejected_before_normalization() {
        let temp = tempdir().expect("temp dir");
        let mut service = OrdersService::open(temp.path().join("test.redb")).expect("open");

        let records = vec![RawRecord::default(); MAX_BATCH_RECORDS + 1];
        let err = service.ingest(&records).expect_err("fail");
        assert!(matches!(err, StoreError::InvalidArgument(_)));
        assert_eq!(service.row_count(Table::Orders).expect("count"), 0);
    }

    #[test]
    fn queries_compose_over_ingested_data() {
        let temp = tempdir().expect("temp dir");
        let mut service = OrdersService::open(temp.path().join("test.redb")).expect("open");

        service
            .ingest(&[
                record(1, 100, 10, &[100, 101]),
                record(2, 250, 11, &[100]),
            ])
            .expect("ingest");

        let rows = service
            .entries_in_range("orders", "created", 99.0, 201.0)
            .expect("range");
        assert_eq!(rows.len(), 1);

        let ranked = service.top_users(1).expect("top");
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].purchased, 2);
    }
}
