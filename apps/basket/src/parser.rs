//! # Order File Parser
//!
//! Parses NDJSON order files into raw records: one JSON object per
//! line, blank lines skipped. Parsing only guarantees JSON shape;
//! missing keys surface later as per-record skip diagnostics during
//! normalization.

use basket_core::{RawRecord, StoreError};

/// Parse an NDJSON order file into raw records.
///
/// A line that is not valid JSON fails the whole parse with a
/// diagnostic naming the 1-based line number.
pub fn parse_order_file(contents: &str) -> Result<Vec<RawRecord>, StoreError> {
    let mut records = Vec::new();

    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: RawRecord = serde_json::from_str(line).map_err(|e| {
            StoreError::DeserializationError(format!(
                "line {}: {}",
                lineno.saturating_add(1),
                e
            ))
        })?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_record_per_line() {
        let input = concat!(
            r#"{"id":1,"created":100,"user":{"id":10,"name":"Alice","city":"Porto"},"products":[]}"#,
            "\n",
            r#"{"id":2,"created":200,"user":{"id":11,"name":"Bob","city":"Faro"},"products":[{"id":1,"name":"tea","price":2.5}]}"#,
        );

        let records = parse_order_file(input).expect("parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, Some(1));
        assert_eq!(records[1].products.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn blank_lines_skipped() {
        let input = "\n  \n{\"id\":1}\n\n";

        let records = parse_order_file(input).expect("parse");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn missing_keys_parse_as_none() {
        let records = parse_order_file(r#"{"id":5}"#).expect("parse");
        assert_eq!(records[0].id, Some(5));
        assert!(records[0].created.is_none());
        assert!(records[0].user.is_none());
        assert!(records[0].products.is_none());
    }

    #[test]
    fn malformed_line_names_line_number() {
        let input = "{\"id\":1}\nnot json\n";

        let err = parse_order_file(input).expect_err("fail");
        match err {
            StoreError::DeserializationError(msg) => assert!(msg.starts_with("line 2:")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(parse_order_file("").expect("parse").is_empty());
    }
}
