//! # Schema Registry
//!
//! The fixed relational schema of the order store, exposed as an
//! explicit static registry: table names, column names, and per-table
//! row decoding are all resolved through the [`Table`] enum at compile
//! time. No runtime introspection anywhere.
//!
//! The range query engine resolves `(table, column)` name pairs here
//! before touching the store, so unknown names fail fast with the
//! `NotFound` error kinds.

use crate::types::{Order, OrderLine, Product, Row, StoreError, User, Value};

/// A table of the fixed schema.
///
/// This enum is the whole registry: the set of variants is the set of
/// tables, and each variant knows its name, columns, and row decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    Users,
    Products,
    Orders,
    OrderLines,
}

impl Table {
    /// Every table of the schema, in declaration order.
    pub const ALL: [Self; 4] = [Self::Users, Self::Products, Self::Orders, Self::OrderLines];

    /// Resolve a table by its external name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "users" => Some(Self::Users),
            "products" => Some(Self::Products),
            "orders" => Some(Self::Orders),
            "order_lines" => Some(Self::OrderLines),
            _ => None,
        }
    }

    /// The external name of this table.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Products => "products",
            Self::Orders => "orders",
            Self::OrderLines => "order_lines",
        }
    }

    /// The column names of this table, in schema order.
    #[must_use]
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Users => &["id", "name", "city"],
            Self::Products => &["id", "name", "price"],
            Self::Orders => &["id", "created", "user_id"],
            Self::OrderLines => &["id", "order_id", "product_id"],
        }
    }

    /// Whether this table has a column with the given name.
    #[must_use]
    pub fn has_column(self, column: &str) -> bool {
        self.columns().contains(&column)
    }

    /// Decode one stored row of this table into a column->value mapping.
    ///
    /// Rows are stored as postcard-encoded entity structs; this is the
    /// tagged-variant dispatch that turns them back into the generic
    /// row shape the range query returns.
    pub fn decode_row(self, bytes: &[u8]) -> Result<Row, StoreError> {
        let mut row = Row::new();
        match self {
            Self::Users => {
                let user: User = decode(bytes)?;
                row.insert("id", Value::UInt(user.id.0));
                row.insert("name", Value::Text(user.name));
                row.insert("city", Value::Text(user.city));
            }
            Self::Products => {
                let product: Product = decode(bytes)?;
                row.insert("id", Value::UInt(product.id.0));
                row.insert("name", Value::Text(product.name));
                row.insert("price", Value::Float(product.price));
            }
            Self::Orders => {
                let order: Order = decode(bytes)?;
                row.insert("id", Value::UInt(order.id.0));
                row.insert("created", Value::Int(order.created));
                row.insert("user_id", Value::UInt(order.user_id.0));
            }
            Self::OrderLines => {
                let line: OrderLine = decode(bytes)?;
                row.insert("id", Value::UInt(line.id.0));
                row.insert("order_id", Value::UInt(line.order_id.0));
                row.insert("product_id", Value::UInt(line.product_id.0));
            }
        }
        Ok(row)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn decode<'a, T: serde::Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, StoreError> {
    postcard::from_bytes(bytes).map_err(|e| StoreError::DeserializationError(e.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderId, ProductId, UserId};

    #[test]
    fn names_round_trip() {
        for table in Table::ALL {
            assert_eq!(Table::from_name(table.name()), Some(table));
        }
    }

    #[test]
    fn unknown_table_is_rejected() {
        assert_eq!(Table::from_name("invoices"), None);
        assert_eq!(Table::from_name("Users"), None);
        assert_eq!(Table::from_name(""), None);
    }

    #[test]
    fn column_lookup() {
        assert!(Table::Orders.has_column("created"));
        assert!(Table::Orders.has_column("user_id"));
        assert!(!Table::Orders.has_column("price"));
        assert!(!Table::Users.has_column("created"));
    }

    #[test]
    fn every_table_has_an_id_column() {
        for table in Table::ALL {
            assert!(table.has_column("id"), "{} lacks id", table);
        }
    }

    #[test]
    fn decode_order_row() {
        let order = Order::new(OrderId(7), 150, UserId(3));
        let bytes = postcard::to_allocvec(&order).expect("encode");

        let row = Table::Orders.decode_row(&bytes).expect("decode");
        assert_eq!(row.get("id"), Some(&Value::UInt(7)));
        assert_eq!(row.get("created"), Some(&Value::Int(150)));
        assert_eq!(row.get("user_id"), Some(&Value::UInt(3)));
    }

    #[test]
    fn decode_product_row_keeps_price() {
        let product = Product::new(ProductId(1), "lamp", 19.99);
        let bytes = postcard::to_allocvec(&product).expect("encode");

        let row = Table::Products.decode_row(&bytes).expect("decode");
        assert_eq!(row.get("price"), Some(&Value::Float(19.99)));
        assert_eq!(row.get("name"), Some(&Value::Text("lamp".to_string())));
    }

    #[test]
    fn decode_garbage_fails() {
        let result = Table::Users.decode_row(&[0xff, 0xff, 0xff, 0xff]);
        assert!(matches!(result, Err(StoreError::DeserializationError(_))));
    }
}
