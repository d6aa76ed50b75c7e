//! # Core Type Definitions
//!
//! This module contains all core types for the Basket order store:
//! - Natural-key identifiers (`UserId`, `ProductId`, `OrderId`, `LineId`)
//! - The four relational entities (`User`, `Product`, `Order`, `OrderLine`)
//! - Loosely-typed input records (`RawRecord`, `RawUser`, `RawProduct`)
//! - Query result shapes (`Value`, `Row`, `TopUser`)
//! - Error types (`StoreError`)
//!
//! ## Determinism Guarantees
//!
//! All collection-valued results in this crate use `BTreeMap` for
//! deterministic ordering. Counters use saturating arithmetic. The only
//! floating-point field is `Product::price`, which is carried verbatim
//! from source data and only ever compared, never computed with.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique identifier for a user, assigned by the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Unique identifier for a product, assigned by the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub u64);

/// Unique identifier for an order, assigned by the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

/// Unique identifier for an order line.
///
/// Unlike the other ids, line ids are generated by the store from a
/// persisted counter; source data never names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineId(pub u64);

// =============================================================================
// ENTITIES
// =============================================================================

/// A user who places orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub city: String,
}

impl User {
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            city: city.into(),
        }
    }
}

/// A product that can appear on order lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price, carried verbatim from source data. Never computed with.
    pub price: f64,
}

impl Product {
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            name: name.into(),
            price,
        }
    }
}

/// An order placed by a user at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Numeric timestamp from the source data.
    pub created: i64,
    pub user_id: UserId,
}

impl Order {
    #[must_use]
    pub const fn new(id: OrderId, created: i64, user_id: UserId) -> Self {
        Self {
            id,
            created,
            user_id,
        }
    }
}

/// One line item: a single product reference within a single order.
///
/// Line items are never deduplicated - repeated product references
/// within or across orders each produce their own row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: LineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
}

impl OrderLine {
    #[must_use]
    pub const fn new(id: LineId, order_id: OrderId, product_id: ProductId) -> Self {
        Self {
            id,
            order_id,
            product_id,
        }
    }
}

// =============================================================================
// RAW INPUT RECORDS
// =============================================================================

/// One loosely-typed order record as produced by the file parser.
///
/// Every field is optional: the parser only guarantees JSON shape, not
/// presence. The normalizer turns absent required keys into
/// [`StoreError::MissingField`] diagnostics and skips the record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawRecord {
    pub id: Option<u64>,
    pub created: Option<i64>,
    pub user: Option<RawUser>,
    pub products: Option<Vec<RawProduct>>,
}

/// The nested user object of a raw record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawUser {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub city: Option<String>,
}

/// One product entry in a raw record's product list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawProduct {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub price: Option<f64>,
}

// =============================================================================
// QUERY RESULT SHAPES
// =============================================================================

/// A scalar column value in a query result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    UInt(u64),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Numeric view of the value, used by range comparisons.
    ///
    /// Returns `None` for text values; such rows fall outside any
    /// numeric range.
    #[must_use]
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Self::UInt(v) => Some(*v as f64),
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

/// A query result row: column name -> scalar value.
///
/// `BTreeMap` keeps column iteration order deterministic.
pub type Row = BTreeMap<&'static str, Value>;

/// One entry of the top-N aggregation: a user and the total number of
/// line items across all their orders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopUser {
    pub user: User,
    pub purchased: u64,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Basket order store.
///
/// - No silent failures
/// - Use `Result<T, StoreError>` for fallible operations
/// - The core never panics; all errors are recoverable
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named table does not exist in the schema.
    #[error("table '{0}' doesn't exist")]
    TableNotFound(String),

    /// The named column does not exist on the named table.
    #[error("column '{column}' doesn't exist in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    /// The lower bound of a range query is greater than the upper bound.
    #[error("lower bound {lower} can't be greater than upper bound {upper}")]
    InvalidRange { lower: f64, upper: f64 },

    /// An operation argument is out of its valid domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required key is absent from a raw record.
    ///
    /// This is a per-record recoverable condition: the record is
    /// skipped and ingestion continues. It never fails a batch.
    #[error("missing field '{0}' in order record")]
    MissingField(String),

    /// A serialization error occurred.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O or transactional storage error occurred.
    ///
    /// When raised from `ingest_batch` the write transaction has been
    /// dropped and the store observed none of the batch.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
