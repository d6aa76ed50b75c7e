//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::parser::parse_order_file;
use basket_core::{OrdersService, StoreError, Table, primitives::MAX_INGEST_FILE_SIZE};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE VALIDATION
// =============================================================================

/// Validate file size before reading.
fn validate_file_size(path: &PathBuf, max_size: u64) -> Result<(), StoreError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| StoreError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(StoreError::InvalidArgument(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate an input file path.
///
/// This function:
/// 1. Canonicalizes the path to resolve symlinks and ".."
/// 2. Ensures the path exists
/// 3. Ensures the path is a file (not a directory)
fn validate_file_path(path: &Path) -> Result<PathBuf, StoreError> {
    // Canonicalize resolves "..", symlinks, and validates existence
    let canonical = path
        .canonicalize()
        .map_err(|e| StoreError::IoError(format!("Invalid file path '{}': {}", path.display(), e)))?;

    // Ensure it's a file, not a directory
    if !canonical.is_file() {
        return Err(StoreError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

// =============================================================================
// LOAD COMMAND
// =============================================================================

/// Load orders from an NDJSON file in one atomic batch.
pub fn cmd_load(db_path: &PathBuf, json_mode: bool, file: &PathBuf) -> Result<(), StoreError> {
    tracing::info!("Loading orders from {:?}", file);

    let validated_path = validate_file_path(file)?;
    validate_file_size(&validated_path, MAX_INGEST_FILE_SIZE)?;

    let contents = std::fs::read_to_string(&validated_path)
        .map_err(|e| StoreError::IoError(format!("Read file: {}", e)))?;

    let records = parse_order_file(&contents)?;

    let mut service = OrdersService::open(db_path)?;
    let report = service.ingest(&records)?;

    for skip in &report.skipped {
        tracing::warn!(
            "Skipped record {} (order id {:?}): {}",
            skip.index,
            skip.order_id,
            skip.reason
        );
    }

    if json_mode {
        let output = serde_json::json!({
            "database": db_path.to_string_lossy(),
            "users": report.users,
            "products": report.products,
            "orders": report.orders,
            "lines": report.lines,
            "skipped": report.skipped.len()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!(
        "Loaded {} orders ({} users, {} products, {} lines)",
        report.orders, report.users, report.products, report.lines
    );
    if !report.skipped.is_empty() {
        println!("Skipped {} malformed records", report.skipped.len());
    }

    Ok(())
}

// =============================================================================
// RANGE COMMAND
// =============================================================================

/// Query rows of a table by an inclusive numeric column range.
pub fn cmd_range(
    db_path: &PathBuf,
    json_mode: bool,
    table: &str,
    column: &str,
    lower: f64,
    upper: f64,
) -> Result<(), StoreError> {
    let service = OrdersService::open(db_path)?;
    let rows = service.entries_in_range(table, column, lower, upper)?;

    if json_mode {
        let output = serde_json::json!({
            "table": table,
            "column": column,
            "lower": lower,
            "upper": upper,
            "count": rows.len(),
            "rows": rows
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!(
        "{} rows in {}.{} within [{}, {}]",
        rows.len(),
        table,
        column,
        lower,
        upper
    );
    for row in &rows {
        println!("  {}", serde_json::to_string(row).unwrap_or_default());
    }

    Ok(())
}

// =============================================================================
// TOP-USERS COMMAND
// =============================================================================

/// Rank users by total purchased line items.
pub fn cmd_top_users(db_path: &PathBuf, json_mode: bool, count: usize) -> Result<(), StoreError> {
    let service = OrdersService::open(db_path)?;
    let ranked = service.top_users(count)?;

    if json_mode {
        let users: Vec<_> = ranked
            .iter()
            .map(|t| {
                serde_json::json!({
                    "id": t.user.id.0,
                    "name": t.user.name,
                    "city": t.user.city,
                    "purchased": t.purchased
                })
            })
            .collect();
        let output = serde_json::json!({ "count": count, "users": users });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Top {} users by purchased items", count);
    println!("==============================");
    for (rank, t) in ranked.iter().enumerate() {
        println!(
            "{}. {} ({}) - {} items",
            rank.saturating_add(1),
            t.user.name,
            t.user.id.0,
            t.purchased
        );
    }

    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show store row counts.
pub fn cmd_status(db_path: &PathBuf, json_mode: bool) -> Result<(), StoreError> {
    let service = OrdersService::open(db_path)?;

    let users = service.row_count(Table::Users)?;
    let products = service.row_count(Table::Products)?;
    let orders = service.row_count(Table::Orders)?;
    let lines = service.row_count(Table::OrderLines)?;

    if json_mode {
        let output = serde_json::json!({
            "database": db_path.to_string_lossy(),
            "users": users,
            "products": products,
            "orders": orders,
            "order_lines": lines
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Basket Store Status");
    println!("===================");
    println!("Database: {:?}", db_path);
    println!();
    println!("Users:       {}", users);
    println!("Products:    {}", products);
    println!("Orders:      {}", orders);
    println!("Order Lines: {}", lines);

    Ok(())
}
