//! # Query Operations
//!
//! The two read-only analytical queries of the store:
//!
//! - [`entries_in_range`]: generic inclusive range filter over a named
//!   column of a named table, with name validation before any store
//!   access.
//! - [`top_users`]: the users with the most purchased line items,
//!   computed over the Order -> OrderLine -> User join.
//!
//! Both operate on an MVCC read snapshot and have no side effects.

use crate::schema::Table;
use crate::storage::RedbStore;
use crate::types::{Row, StoreError, TopUser, UserId};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Select every row of `table_name` whose `column` value v satisfies
/// `lower <= v <= upper` (inclusive both ends).
///
/// Preconditions are checked in order, all before the store is read:
/// the table name (`TableNotFound`), then the column name
/// (`ColumnNotFound`), then the bound ordering (`InvalidRange`; equal
/// bounds are valid and select exact matches).
///
/// Results come back in ascending primary-key order, the store's
/// default. Rows whose column holds a non-numeric value are excluded.
pub fn entries_in_range(
    store: &RedbStore,
    table_name: &str,
    column: &str,
    lower: f64,
    upper: f64,
) -> Result<Vec<Row>, StoreError> {
    let table = Table::from_name(table_name)
        .ok_or_else(|| StoreError::TableNotFound(table_name.to_string()))?;

    if !table.has_column(column) {
        return Err(StoreError::ColumnNotFound {
            table: table.name().to_string(),
            column: column.to_string(),
        });
    }

    if lower > upper {
        return Err(StoreError::InvalidRange { lower, upper });
    }

    let rows = store.scan_rows(table)?;
    Ok(rows
        .into_iter()
        .filter(|row| {
            row.get(column)
                .and_then(|v| v.as_num())
                .is_some_and(|v| lower <= v && v <= upper)
        })
        .collect())
}

/// The `n` users with the most purchased line items, descending.
///
/// Counts OrderLine rows per user across the Order -> OrderLine join;
/// repeated purchases of the same product all count. Users with zero
/// orders never appear (inner join). Ties are broken by ascending
/// user id, making the result fully deterministic.
///
/// # Errors
///
/// Returns `InvalidArgument` if `n` is zero, before any store access.
pub fn top_users(store: &RedbStore, n: usize) -> Result<Vec<TopUser>, StoreError> {
    if n == 0 {
        return Err(StoreError::InvalidArgument(
            "number of users must be a positive value".to_string(),
        ));
    }

    let order_owner: BTreeMap<_, _> = store
        .orders()?
        .into_iter()
        .map(|order| (order.id, order.user_id))
        .collect();

    let mut purchases: BTreeMap<UserId, u64> = BTreeMap::new();
    for line in store.order_lines()? {
        if let Some(&user_id) = order_owner.get(&line.order_id) {
            let count = purchases.entry(user_id).or_insert(0);
            *count = count.saturating_add(1);
        }
    }

    let mut ranked = Vec::with_capacity(purchases.len());
    for (user_id, purchased) in purchases {
        if let Some(user) = store.user(user_id)? {
            ranked.push(TopUser { user, purchased });
        }
    }

    // BTreeMap iteration yields ascending user id; the stable sort by
    // descending count therefore leaves ties in ascending-id order.
    ranked.sort_by_key(|entry| Reverse(entry.purchased));
    ranked.truncate(n);
    Ok(ranked)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Batch;
    use crate::types::{Order, OrderId, Product, ProductId, User};
    use tempfile::tempdir;

    fn store_with(batch: &Batch) -> (tempfile::TempDir, RedbStore) {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");
        store.ingest_batch(batch).expect("ingest");
        (temp, store)
    }

    fn order_batch() -> Batch {
        let mut batch = Batch::new();
        batch
            .users
            .insert(UserId(1), User::new(UserId(1), "Alice", "Paris"));
        batch.orders.push(Order::new(OrderId(1), 100, UserId(1)));
        batch.orders.push(Order::new(OrderId(2), 150, UserId(1)));
        batch.orders.push(Order::new(OrderId(3), 200, UserId(1)));
        batch
    }

    #[test]
    fn range_is_inclusive_both_ends() {
        let (_temp, store) = store_with(&order_batch());

        let rows = entries_in_range(&store, "orders", "created", 100.0, 150.0).expect("query");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn equal_bounds_select_exact_matches() {
        let (_temp, store) = store_with(&order_batch());

        let rows = entries_in_range(&store, "orders", "created", 150.0, 150.0).expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].get("id").and_then(|v| v.as_num()),
            Some(2.0)
        );
    }

    #[test]
    fn unknown_table_fails_before_bounds() {
        let (_temp, store) = store_with(&Batch::new());

        // Bounds are inverted too, but the table check comes first.
        let err = entries_in_range(&store, "invoices", "created", 10.0, 0.0).expect_err("fail");
        assert!(matches!(err, StoreError::TableNotFound(t) if t == "invoices"));
    }

    #[test]
    fn unknown_column_fails_before_bounds() {
        let (_temp, store) = store_with(&Batch::new());

        let err = entries_in_range(&store, "orders", "shipped", 10.0, 0.0).expect_err("fail");
        assert!(matches!(err, StoreError::ColumnNotFound { column, .. } if column == "shipped"));
    }

    #[test]
    fn inverted_bounds_fail_with_invalid_range() {
        let (_temp, store) = store_with(&Batch::new());

        let err = entries_in_range(&store, "orders", "created", 10.0, 0.0).expect_err("fail");
        assert!(matches!(err, StoreError::InvalidRange { .. }));
    }

    #[test]
    fn text_columns_match_nothing() {
        let mut batch = Batch::new();
        batch
            .users
            .insert(UserId(1), User::new(UserId(1), "Alice", "Paris"));
        let (_temp, store) = store_with(&batch);

        // "name" exists but is non-numeric; rows are excluded, not errors.
        let rows = entries_in_range(&store, "users", "name", 0.0, 1000.0).expect("query");
        assert!(rows.is_empty());
    }

    #[test]
    fn range_works_over_any_table() {
        let mut batch = Batch::new();
        batch
            .products
            .insert(ProductId(1), Product::new(ProductId(1), "lamp", 9.5));
        batch
            .products
            .insert(ProductId(2), Product::new(ProductId(2), "desk", 120.0));
        let (_temp, store) = store_with(&batch);

        let rows = entries_in_range(&store, "products", "price", 0.0, 10.0).expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].get("name"),
            Some(&crate::types::Value::Text("lamp".to_string()))
        );
    }

    #[test]
    fn top_users_counts_line_items_per_user() {
        let mut batch = Batch::new();
        batch
            .users
            .insert(UserId(1), User::new(UserId(1), "Alice", "Paris"));
        batch
            .users
            .insert(UserId(2), User::new(UserId(2), "Bob", "Berlin"));
        batch.orders.push(Order::new(OrderId(1), 100, UserId(1)));
        batch.orders.push(Order::new(OrderId(2), 150, UserId(2)));
        batch.lines.push((OrderId(1), ProductId(7)));
        batch.lines.push((OrderId(1), ProductId(8)));
        batch.lines.push((OrderId(2), ProductId(7)));
        let (_temp, store) = store_with(&batch);

        let ranked = top_users(&store, 10).expect("query");
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].user.id, UserId(1));
        assert_eq!(ranked[0].purchased, 2);
        assert_eq!(ranked[1].purchased, 1);
    }

    #[test]
    fn top_users_ties_break_by_ascending_id() {
        let mut batch = Batch::new();
        for (uid, oid) in [(5u64, 1u64), (2, 2), (9, 3)] {
            batch
                .users
                .insert(UserId(uid), User::new(UserId(uid), "U", "C"));
            batch.orders.push(Order::new(OrderId(oid), 100, UserId(uid)));
            batch.lines.push((OrderId(oid), ProductId(1)));
        }
        let (_temp, store) = store_with(&batch);

        let ranked = top_users(&store, 3).expect("query");
        let ids: Vec<_> = ranked.iter().map(|t| t.user.id).collect();
        assert_eq!(ids, vec![UserId(2), UserId(5), UserId(9)]);
    }

    #[test]
    fn top_users_zero_is_invalid() {
        let (_temp, store) = store_with(&Batch::new());

        let err = top_users(&store, 0).expect_err("fail");
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[test]
    fn users_without_orders_are_excluded() {
        let mut batch = Batch::new();
        batch
            .users
            .insert(UserId(1), User::new(UserId(1), "Alice", "Paris"));
        batch
            .users
            .insert(UserId(2), User::new(UserId(2), "Bob", "Berlin"));
        batch.orders.push(Order::new(OrderId(1), 100, UserId(1)));
        batch.lines.push((OrderId(1), ProductId(7)));
        let (_temp, store) = store_with(&batch);

        let ranked = top_users(&store, 10).expect("query");
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].user.id, UserId(1));
    }
}
