//! # Record Normalizer
//!
//! Converts loosely-typed order records into normalized relational
//! entities, accumulating them into batch-wide containers.
//!
//! - Validate every required key before touching the batch
//! - First-wins dedup for users and products (keyed maps, not scans)
//! - Orders appended unconditionally, one per record
//! - A bad record is skipped whole; no partial entities survive

use crate::primitives::MAX_PRODUCTS_PER_ORDER;
use crate::types::{
    Order, OrderId, Product, ProductId, RawRecord, StoreError, User, UserId,
};
use std::collections::BTreeMap;

// =============================================================================
// BATCH ACCUMULATORS
// =============================================================================

/// Batch-wide accumulators for one ingestion call.
///
/// Users and products are keyed by their natural id so the first-wins
/// dedup check is a map lookup; `BTreeMap` keeps iteration order
/// deterministic. Orders and lines are plain sequences - neither is
/// deduplicated.
///
/// The batch is exclusively owned by one ingestion invocation and
/// discarded after commit.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    /// Distinct users seen in this batch, first occurrence wins.
    pub users: BTreeMap<UserId, User>,
    /// Distinct products seen in this batch, first occurrence wins.
    pub products: BTreeMap<ProductId, Product>,
    /// One order per valid record, in record order. Not deduplicated:
    /// duplicate order ids in a malformed batch pass through as-is.
    pub orders: Vec<Order>,
    /// One (order, product) pair per product reference, in record
    /// order. Line ids are assigned by the store at persist time.
    pub lines: Vec<(OrderId, ProductId)>,
}

impl Batch {
    /// Create a new empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the batch holds no entities at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.products.is_empty()
            && self.orders.is_empty()
            && self.lines.is_empty()
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

// =============================================================================
// SKIP DIAGNOSTICS
// =============================================================================

/// Diagnostic for one raw record dropped during normalization.
///
/// Skips are per-record and recoverable: ingestion continues with the
/// next record and the batch as a whole still commits.
#[derive(Debug)]
pub struct SkippedRecord {
    /// Zero-based position of the record within the input sequence.
    pub index: usize,
    /// The record's order id, when it was present at all.
    pub order_id: Option<u64>,
    /// Why the record was dropped.
    pub reason: StoreError,
}

// =============================================================================
// NORMALIZER
// =============================================================================

/// The Normalizer turns one raw record into batch contributions.
///
/// One valid record contributes exactly one Order, at most one new
/// User, N OrderLines, and 0..N new Products.
pub struct Normalizer;

impl Normalizer {
    /// Normalize one raw record into the batch.
    ///
    /// Every required key is extracted and validated before the batch
    /// is mutated, so a failing record leaves the accumulators exactly
    /// as they were.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingField`] naming the absent key, or
    /// [`StoreError::InvalidArgument`] when the product list exceeds
    /// [`MAX_PRODUCTS_PER_ORDER`]. Both mean "skip this record".
    pub fn normalize(batch: &mut Batch, raw: &RawRecord) -> Result<(), StoreError> {
        let order_id = require(raw.id, "id")?;
        let created = require(raw.created, "created")?;

        let raw_user = raw
            .user
            .as_ref()
            .ok_or_else(|| StoreError::MissingField("user".to_string()))?;
        let user_id = require(raw_user.id, "user.id")?;
        let user_name = require(raw_user.name.clone(), "user.name")?;
        let user_city = require(raw_user.city.clone(), "user.city")?;

        let raw_products = raw
            .products
            .as_ref()
            .ok_or_else(|| StoreError::MissingField("products".to_string()))?;
        if raw_products.len() > MAX_PRODUCTS_PER_ORDER {
            return Err(StoreError::InvalidArgument(format!(
                "order {} references {} products (limit {})",
                order_id,
                raw_products.len(),
                MAX_PRODUCTS_PER_ORDER
            )));
        }

        let mut products = Vec::with_capacity(raw_products.len());
        for (i, raw_product) in raw_products.iter().enumerate() {
            let id = require(raw_product.id, format!("products[{i}].id"))?;
            let name = require(raw_product.name.clone(), format!("products[{i}].name"))?;
            let price = require(raw_product.price, format!("products[{i}].price"))?;
            products.push(Product::new(ProductId(id), name, price));
        }

        // All keys present - the record is committed to the batch from
        // here on.
        let order_id = OrderId(order_id);
        let user_id = UserId(user_id);

        batch.orders.push(Order::new(order_id, created, user_id));
        for product in products {
            batch.lines.push((order_id, product.id));
            // First occurrence of a product id wins; later name/price
            // variants are discarded.
            batch.products.entry(product.id).or_insert(product);
        }
        batch
            .users
            .entry(user_id)
            .or_insert_with(|| User::new(user_id, user_name, user_city));

        Ok(())
    }

    /// Normalize a whole record sequence, collecting skip diagnostics.
    ///
    /// Returns the populated batch and the records that were dropped.
    /// Dropped records never abort the batch.
    #[must_use]
    pub fn normalize_all(records: &[RawRecord]) -> (Batch, Vec<SkippedRecord>) {
        let mut batch = Batch::new();
        let mut skipped = Vec::new();

        for (index, raw) in records.iter().enumerate() {
            if let Err(reason) = Self::normalize(&mut batch, raw) {
                skipped.push(SkippedRecord {
                    index,
                    order_id: raw.id,
                    reason,
                });
            }
        }

        (batch, skipped)
    }
}

fn require<T>(value: Option<T>, field: impl Into<String>) -> Result<T, StoreError> {
    value.ok_or_else(|| StoreError::MissingField(field.into()))
}

// =============================================================================
// TESTS
// =============================================================================
