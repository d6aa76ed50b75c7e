//! # basket-core
//!
//! The embedded order store for Basket - THE LOGIC.
//!
//! This crate ingests loosely-typed order records into a fixed
//! four-table relational schema (users, products, orders, order_lines)
//! backed by redb, and answers two analytical queries: an inclusive
//! range filter over any named column of any named table, and the N
//! users with the most purchased line items.
//!
//! ## Architectural Constraints
//!
//! - The core is the ONLY place where persistence exists (stateful)
//! - Exactly three operations: ingest, range query, top-N aggregate
//! - No async, no network dependencies (pure Rust)
//! - Deterministic: BTreeMap everywhere, saturating counters,
//!   documented tie-breaks
//!
//! ## Batch semantics
//!
//! One ingestion call owns its batch accumulators exclusively: records
//! are normalized with first-wins dedup for users and products, then
//! every entity of the batch is persisted in a single transaction. A
//! record with a missing required key is skipped whole and reported;
//! it never aborts the batch.

// =============================================================================
// MODULES
// =============================================================================

pub mod normalize;
pub mod primitives;
pub mod query;
pub mod schema;
pub mod service;
pub mod storage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    LineId, Order, OrderId, OrderLine, Product, ProductId, RawProduct, RawRecord, RawUser, Row,
    StoreError, TopUser, User, UserId, Value,
};

// =============================================================================
// RE-EXPORTS: Store Engine
// =============================================================================

pub use normalize::{Batch, Normalizer, SkippedRecord};
pub use query::{entries_in_range, top_users};
pub use schema::Table;
pub use service::{IngestReport, OrdersService};
pub use storage::RedbStore;
