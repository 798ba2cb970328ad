//! Scalar File Parsing
//!
//! Recognises `scalar <module> <name> <value> [trailing...]` lines. Anything
//! else (version lines, comments, statistic blocks, malformed or non-finite
//! numbers) is skipped without error, so partial or corrupt files still yield
//! every valid scalar they contain.

use crate::record::{ScalarDocument, ScalarRecord};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors reading a scalar file
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Parse lines into scalar records, preserving input order.
pub fn parse<I, S>(lines: I) -> Vec<ScalarRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| parse_scalar_line(line.as_ref()))
        .collect()
}

/// Parse a whole file's text
pub fn parse_str(text: &str) -> Vec<ScalarRecord> {
    parse(text.lines())
}

/// Parse lines into a [`ScalarDocument`], keeping `run` and `attr` headers.
pub fn parse_document<I, S>(lines: I) -> ScalarDocument
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut doc = ScalarDocument::default();
    let mut skipped = 0usize;

    for line in lines {
        let line = line.as_ref();
        if let Some(record) = parse_scalar_line(line) {
            doc.records.push(record);
            continue;
        }

        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("run ") {
            if doc.run_id.is_none() {
                let id = rest.trim();
                if !id.is_empty() {
                    doc.run_id = Some(unquote(id).to_string());
                }
            }
        } else if let Some(rest) = trimmed.strip_prefix("attr ") {
            if let Some((key, value)) = rest.trim().split_once(char::is_whitespace) {
                doc.attributes
                    .insert(key.to_string(), unquote(value.trim()).to_string());
            }
        } else if !trimmed.is_empty() {
            skipped += 1;
        }
    }

    debug!(
        records = doc.records.len(),
        skipped, "parsed scalar document"
    );
    doc
}

/// Read a scalar file from disk, decoding invalid UTF-8 lossily.
pub fn read_scalar_file(path: impl AsRef<Path>) -> Result<ScalarDocument, ParseError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(parse_document(text.lines()))
}

/// Recognise one scalar line.
///
/// Needs at least four tokens, the literal `scalar` first, and a finite
/// float fourth.
pub fn parse_scalar_line(line: &str) -> Option<ScalarRecord> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "scalar" {
        return None;
    }
    let module = tokens.next()?;
    let name = tokens.next()?;
    let value: f64 = tokens.next()?.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(ScalarRecord::new(module, name, value))
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "version 3
run Secure5_record-0-20250101-10:00:00-4242
attr configname Secure5_record
attr repetition 0
attr iterationvars \"\"

scalar LightIoTNetwork.gateway GW_Received 120
scalar LightIoTNetwork.gateway GW_Dropped_HMAC 4.0
scalar LightIoTNetwork.cloud Cloud_AvgEndToEndDelay_s 1.25e-3
statistic LightIoTNetwork.gateway delay
field count 3
";

    #[test]
    fn test_parses_valid_lines_in_order() {
        let records = parse_str(SAMPLE);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], ScalarRecord::new("LightIoTNetwork.gateway", "GW_Received", 120.0));
        assert_eq!(records[1].name, "GW_Dropped_HMAC");
        assert!((records[2].value - 0.00125).abs() < 1e-15);
    }

    #[test]
    fn test_singleton_value() {
        let records = parse(["scalar A B 3.5"]);
        assert_eq!(records, vec![ScalarRecord::new("A", "B", 3.5)]);
    }

    #[test]
    fn test_rejects_non_finite_and_malformed() {
        let lines = [
            "scalar m n NaN",
            "scalar m n inf",
            "scalar m n -Infinity",
            "scalar m n 1.2.3",
            "scalar m n",
            "scalars m n 1",
            "# scalar m n 1",
            "",
            "scalar m n +2e3 unit=ms",
        ];
        let records = parse(lines);
        assert_eq!(records, vec![ScalarRecord::new("m", "n", 2000.0)]);
    }

    #[test]
    fn test_leading_whitespace_and_tabs() {
        let records = parse(["  scalar\tnet.gw\tGW_Dropped\t7"]);
        assert_eq!(records, vec![ScalarRecord::new("net.gw", "GW_Dropped", 7.0)]);
    }

    #[test]
    fn test_duplicates_preserved() {
        let lines = ["scalar M1 N 2.0", "scalar M2 N 3.0", "scalar M1 N 2.0"];
        let records = parse(lines);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], records[2]);
    }

    #[test]
    fn test_idempotent() {
        assert_eq!(parse_str(SAMPLE), parse_str(SAMPLE));
    }

    #[test]
    fn test_document_headers() {
        let doc = parse_document(SAMPLE.lines());
        assert_eq!(
            doc.run_id.as_deref(),
            Some("Secure5_record-0-20250101-10:00:00-4242")
        );
        assert_eq!(doc.attribute("configname"), Some("Secure5_record"));
        assert_eq!(doc.attribute("repetition"), Some("0"));
        assert_eq!(doc.attribute("iterationvars"), Some(""));
        assert_eq!(doc.records, parse_str(SAMPLE));
    }

    #[test]
    fn test_read_file_lossy_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run-0.sca");
        let mut bytes = b"scalar net.gw GW_Dropped 3\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        bytes.extend_from_slice(b"scalar net.gw GW_Forwarded 9\n");
        std::fs::write(&path, bytes).unwrap();

        let doc = read_scalar_file(&path).unwrap();
        assert_eq!(doc.records.len(), 2);
        assert_eq!(doc.records[1].value, 9.0);
    }

    #[test]
    fn test_read_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_scalar_file(dir.path().join("absent.sca"));
        assert!(matches!(result, Err(ParseError::Io { .. })));
    }
}
