//! Fault-isolating decoding of line-delimited JSON command output

use serde::de::DeserializeOwned;
use tracing::warn;

/// One decoded line of command output.
///
/// A line that fails to decode is kept in place with its raw text, so one
/// corrupt line never discards the rest of a batch and the original
/// malformed text stays available for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// The line decoded into a typed record
    Record(T),
    /// The line could not be decoded
    Malformed { line: String, reason: String },
}

impl<T> Decoded<T> {
    /// The typed record, if this line decoded
    pub fn record(&self) -> Option<&T> {
        match self {
            Decoded::Record(record) => Some(record),
            Decoded::Malformed { .. } => None,
        }
    }

    /// Whether this line failed to decode
    pub fn is_malformed(&self) -> bool {
        matches!(self, Decoded::Malformed { .. })
    }
}

/// Decode one-JSON-object-per-line output into a sequence of typed records.
///
/// Empty output yields an empty sequence. Each line decodes independently;
/// order is preserved.
pub fn decode_lines<T: DeserializeOwned>(raw: &str) -> Vec<Decoded<T>> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    raw.lines()
        .map(|line| match serde_json::from_str::<T>(line) {
            Ok(record) => Decoded::Record(record),
            Err(err) => {
                warn!(%line, error = %err, "failed to decode record line");
                Decoded::Malformed {
                    line: line.to_string(),
                    reason: err.to_string(),
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Row {
        #[serde(rename = "ID")]
        id: String,
    }

    #[test]
    fn test_decodes_every_line_in_order() {
        let raw = "{\"ID\":\"a\"}\n{\"ID\":\"b\"}\n{\"ID\":\"c\"}";
        let rows: Vec<Decoded<Row>> = decode_lines(raw);

        assert_eq!(rows.len(), 3);
        let ids: Vec<_> = rows
            .iter()
            .filter_map(Decoded::record)
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_empty_output_yields_empty_sequence() {
        let rows: Vec<Decoded<Row>> = decode_lines("");
        assert!(rows.is_empty());

        let rows: Vec<Decoded<Row>> = decode_lines("  \n ");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_malformed_line_is_kept_in_position() {
        let raw = "{\"ID\":\"a\"}\nnot json at all\n{\"ID\":\"c\"}";
        let rows: Vec<Decoded<Row>> = decode_lines(raw);

        assert_eq!(rows.len(), 3);
        assert!(!rows[0].is_malformed());
        assert!(!rows[2].is_malformed());
        match &rows[1] {
            Decoded::Malformed { line, reason } => {
                assert_eq!(line, "not json at all");
                assert!(!reason.is_empty());
            }
            other => panic!("expected malformed row, got {other:?}"),
        }
    }
}
