//! # redb-backed Order Store
//!
//! A disk-backed relational store using the redb embedded database.
//!
//! The four schema tables plus a metadata table are created on open
//! (never migrated). Entities are stored postcard-encoded, keyed by
//! their u64 id, which makes redb's ascending-key iteration the
//! documented default row order for every scan.
//!
//! ## Transactional contract
//!
//! `ingest_batch` writes all four entity sets of a batch inside one
//! write transaction. Either every entity commits or, on failure, the
//! transaction is dropped and the store observes nothing - a partial
//! batch is never visible.

use crate::normalize::Batch;
use crate::schema::Table;
use crate::types::{LineId, Order, OrderLine, Product, Row, StoreError, User, UserId};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for users: UserId(u64) -> serialized User bytes
const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// Table for products: ProductId(u64) -> serialized Product bytes
const PRODUCTS: TableDefinition<u64, &[u8]> = TableDefinition::new("products");

/// Table for orders: OrderId(u64) -> serialized Order bytes
const ORDERS: TableDefinition<u64, &[u8]> = TableDefinition::new("orders");

/// Table for order lines: LineId(u64) -> serialized OrderLine bytes
const ORDER_LINES: TableDefinition<u64, &[u8]> = TableDefinition::new("order_lines");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const fn table_def(table: Table) -> TableDefinition<'static, u64, &'static [u8]> {
    match table {
        Table::Users => USERS,
        Table::Products => PRODUCTS,
        Table::Orders => ORDERS,
        Table::OrderLines => ORDER_LINES,
    }
}

/// A disk-backed order store using redb.
///
/// - ACID transactions, crash safety (copy-on-write B-trees)
/// - One writer, MVCC snapshot readers; no application-level locking
/// - Line ids allocated from a persisted counter
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
    /// Next available order-line id.
    next_line_id: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("next_line_id", &self.next_line_id)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create an order database at the given path.
    ///
    /// All schema tables are created if absent; existing data is
    /// opened as-is, never migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db =
            Database::create(path.as_ref()).map_err(|e| StoreError::IoError(e.to_string()))?;

        // Initialize tables if they don't exist
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| StoreError::IoError(e.to_string()))?;
            for table in Table::ALL {
                let _ = write_txn
                    .open_table(table_def(table))
                    .map_err(|e| StoreError::IoError(e.to_string()))?;
            }
            let _ = write_txn
                .open_table(METADATA)
                .map_err(|e| StoreError::IoError(e.to_string()))?;
            write_txn
                .commit()
                .map_err(|e| StoreError::IoError(e.to_string()))?;
        }

        // Load the line-id counter
        let read_txn = db
            .begin_read()
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        let next_line_id = {
            let table = read_txn
                .open_table(METADATA)
                .map_err(|e| StoreError::IoError(e.to_string()))?;
            table
                .get("next_line_id")
                .map_err(|e| StoreError::IoError(e.to_string()))?
                .map(|v| v.value())
                .unwrap_or(0)
        };

        Ok(Self { db, next_line_id })
    }

    /// Compact the database (optional maintenance).
    pub fn compact(&mut self) -> Result<(), StoreError> {
        self.db
            .compact()
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Persist a normalized batch in a single ACID transaction.
    ///
    /// Line ids are assigned from the persisted counter inside the
    /// transaction, in batch order. The in-memory counter is updated
    /// only after a successful commit; any earlier error drops the
    /// transaction and the store keeps its previous state.
    ///
    /// Order ids are not deduplicated: a batch carrying two orders
    /// with the same id writes the later one over the earlier, since
    /// the table is keyed by id. This mirrors the unguarded source
    /// semantics rather than silently rejecting such batches.
    pub fn ingest_batch(&mut self, batch: &Batch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut next_line_id = self.next_line_id;

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        {
            let mut users_table = write_txn
                .open_table(USERS)
                .map_err(|e| StoreError::IoError(e.to_string()))?;
            let mut products_table = write_txn
                .open_table(PRODUCTS)
                .map_err(|e| StoreError::IoError(e.to_string()))?;
            let mut orders_table = write_txn
                .open_table(ORDERS)
                .map_err(|e| StoreError::IoError(e.to_string()))?;
            let mut lines_table = write_txn
                .open_table(ORDER_LINES)
                .map_err(|e| StoreError::IoError(e.to_string()))?;
            let mut meta_table = write_txn
                .open_table(METADATA)
                .map_err(|e| StoreError::IoError(e.to_string()))?;

            for user in batch.users.values() {
                let bytes = encode(user)?;
                users_table
                    .insert(user.id.0, bytes.as_slice())
                    .map_err(|e| StoreError::IoError(e.to_string()))?;
            }

            for product in batch.products.values() {
                let bytes = encode(product)?;
                products_table
                    .insert(product.id.0, bytes.as_slice())
                    .map_err(|e| StoreError::IoError(e.to_string()))?;
            }

            for order in &batch.orders {
                let bytes = encode(order)?;
                orders_table
                    .insert(order.id.0, bytes.as_slice())
                    .map_err(|e| StoreError::IoError(e.to_string()))?;
            }

            for &(order_id, product_id) in &batch.lines {
                let line = OrderLine::new(LineId(next_line_id), order_id, product_id);
                next_line_id = next_line_id.saturating_add(1);
                let bytes = encode(&line)?;
                lines_table
                    .insert(line.id.0, bytes.as_slice())
                    .map_err(|e| StoreError::IoError(e.to_string()))?;
            }

            meta_table
                .insert("next_line_id", next_line_id)
                .map_err(|e| StoreError::IoError(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        // Update in-memory state only after successful commit.
        self.next_line_id = next_line_id;

        Ok(())
    }

    // =========================================================================
    // TYPED READERS
    // =========================================================================

    /// Get all users in ascending id order.
    pub fn users(&self) -> Result<Vec<User>, StoreError> {
        self.read_all(USERS)
    }

    /// Get all products in ascending id order.
    pub fn products(&self) -> Result<Vec<Product>, StoreError> {
        self.read_all(PRODUCTS)
    }

    /// Get all orders in ascending id order.
    pub fn orders(&self) -> Result<Vec<Order>, StoreError> {
        self.read_all(ORDERS)
    }

    /// Get all order lines in ascending id order.
    pub fn order_lines(&self) -> Result<Vec<OrderLine>, StoreError> {
        self.read_all(ORDER_LINES)
    }

    /// Look up a single user by id.
    pub fn user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(USERS)
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        match table
            .get(id.0)
            .map_err(|e| StoreError::IoError(e.to_string()))?
        {
            Some(data) => {
                let user: User = postcard::from_bytes(data.value())
                    .map_err(|e| StoreError::DeserializationError(e.to_string()))?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Row count of a schema table.
    pub fn row_count(&self, table: Table) -> Result<usize, StoreError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(table_def(table))
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        let count = table
            .len()
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        Ok(count as usize)
    }

    /// Scan every row of a schema table into the generic row shape,
    /// in ascending id order.
    pub fn scan_rows(&self, table: Table) -> Result<Vec<Row>, StoreError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        let stored = read_txn
            .open_table(table_def(table))
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        let mut rows = Vec::new();
        for entry in stored
            .iter()
            .map_err(|e| StoreError::IoError(e.to_string()))?
        {
            let (_, value) = entry.map_err(|e| StoreError::IoError(e.to_string()))?;
            rows.push(table.decode_row(value.value())?);
        }
        Ok(rows)
    }

    fn read_all<T: serde::de::DeserializeOwned>(
        &self,
        def: TableDefinition<'static, u64, &'static [u8]>,
    ) -> Result<Vec<T>, StoreError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(def)
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        let mut items = Vec::new();
        for entry in table
            .iter()
            .map_err(|e| StoreError::IoError(e.to_string()))?
        {
            let (_, value) = entry.map_err(|e| StoreError::IoError(e.to_string()))?;
            let item: T = postcard::from_bytes(value.value())
                .map_err(|e| StoreError::DeserializationError(e.to_string()))?;
            items.push(item);
        }
        Ok(items)
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    postcard::to_allocvec(value).map_err(|e| StoreError::SerializationError(e.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================
