//! Comma-delimited, double-quote-escaped spreadsheet transport.
//!
//! Hand-rolled tokenizer and serializer for the RFC-4180 subset the package
//! spreadsheets actually use: quoted fields, doubled quotes, commas inside
//! quotes. Parsing is best-effort and never fails: an unterminated quote
//! consumes to end of line, blank lines are skipped, and a data line whose
//! field count does not match the header is collected as a [`MalformedRow`]
//! so the caller can report it instead of losing the row silently.
//!
//! Also provides encoding auto-detection for uploaded files, since exports
//! edited in desktop spreadsheet tools routinely come back as Latin-1 or
//! Windows-1252.

use std::collections::HashMap;
use std::path::Path;

use crate::error::CsvResult;

/// One parsed CSV data line as a column-name to string-value mapping.
pub type SpreadsheetRow = HashMap<String, String>;

/// A data line whose field count did not match the header.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRow {
    /// 1-based line number in the raw input.
    pub line: usize,
    /// Number of columns the header defines.
    pub expected: usize,
    /// Number of fields the line actually tokenized to.
    pub found: usize,
}

/// Result of parsing one CSV document.
#[derive(Debug, Clone, Default)]
pub struct ParsedSheet {
    /// Column names from the header line, trimmed.
    pub headers: Vec<String>,
    /// Successfully tokenized data rows, in input order.
    pub rows: Vec<SpreadsheetRow>,
    /// Non-blank data lines dropped for having the wrong field count.
    pub malformed: Vec<MalformedRow>,
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse CSV text into rows keyed by the header's column names.
///
/// The first non-empty line is the header. Returns no rows when the input
/// has fewer than two non-empty lines. Never fails: malformed quoting is
/// consumed as literal content and wrong-width lines land in `malformed`.
pub fn parse(text: &str) -> ParsedSheet {
    let mut sheet = ParsedSheet::default();
    let mut lines = text.lines().enumerate();

    // Header: first non-blank line.
    for (_, line) in lines.by_ref() {
        if line.trim().is_empty() {
            continue;
        }
        sheet.headers = split_line(line)
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();
        break;
    }

    if sheet.headers.is_empty() {
        return sheet;
    }

    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_line(line);
        if fields.len() != sheet.headers.len() {
            sheet.malformed.push(MalformedRow {
                line: idx + 1,
                expected: sheet.headers.len(),
                found: fields.len(),
            });
            continue;
        }

        let row: SpreadsheetRow = sheet
            .headers
            .iter()
            .cloned()
            .zip(fields)
            .collect();
        sheet.rows.push(row);
    }

    sheet
}

/// Tokenize one CSV line, respecting double-quote-enclosed fields.
///
/// A doubled quote inside a quoted field decodes to one literal quote;
/// commas inside quotes are not separators. An unterminated quote consumes
/// the rest of the line as literal content.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => {
                    fields.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            }
        }
    }
    fields.push(current);

    fields
}

// =============================================================================
// Serialization
// =============================================================================

/// Serialize rows under a fixed header.
///
/// The header is always emitted first and defines both column order and the
/// key set looked up on every row; missing keys serialize as empty fields,
/// so rows can never misalign. Rows are newline-joined with no trailing
/// newline. Empty input yields an empty string, which callers must surface
/// as a "no data" condition rather than a one-line download.
pub fn serialize(rows: &[SpreadsheetRow], header: &[&str]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        header
            .iter()
            .map(|h| escape_field(h))
            .collect::<Vec<_>>()
            .join(","),
    );

    for row in rows {
        let line = header
            .iter()
            .map(|col| escape_field(row.get(*col).map(String::as_str).unwrap_or("")))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    lines.join("\n")
}

/// Escape one field: embedded quotes are doubled first, then the field is
/// wrapped in quotes when it contains a comma, quote, or newline.
pub fn escape_field(value: &str) -> String {
    let needs_quoting = value.contains(',') || value.contains('"') || value.contains('\n');
    let escaped = value.replace('"', "\"\"");
    if needs_quoting {
        format!("\"{escaped}\"")
    } else {
        escaped
    }
}

// =============================================================================
// File Decoding
// =============================================================================

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to text using the given encoding, falling back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).to_string()),
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.to_string()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        _ => String::from_utf8_lossy(bytes).to_string(),
    };
    Ok(text)
}

/// Read a CSV file and decode it with encoding auto-detection.
pub fn read_file<P: AsRef<Path>>(path: P) -> CsvResult<String> {
    let bytes = std::fs::read(path.as_ref())?;
    let encoding = detect_encoding(&bytes);
    decode_content(&bytes, &encoding)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> SpreadsheetRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_simple_parse() {
        let sheet = parse("Name,City\nManali Escape,Manali\nGoa Beach,Goa");
        assert_eq!(sheet.headers, vec!["Name", "City"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0]["Name"], "Manali Escape");
        assert_eq!(sheet.rows[1]["City"], "Goa");
        assert!(sheet.malformed.is_empty());
    }

    #[test]
    fn test_quoted_comma_preserved() {
        let sheet = parse("Name,City\nTrip,\"Manali, Himachal\"");
        assert_eq!(sheet.rows[0]["City"], "Manali, Himachal");
    }

    #[test]
    fn test_doubled_quote_decodes_to_literal() {
        let fields = split_line(r#""5"" rope",plain"#);
        assert_eq!(fields, vec![r#"5" rope"#, "plain"]);
    }

    #[test]
    fn test_unterminated_quote_consumes_to_end_of_line() {
        let fields = split_line(r#"a,"never closed, keeps going"#);
        assert_eq!(fields, vec!["a", "never closed, keeps going"]);
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let sheet = parse("Name,City");
        assert!(sheet.rows.is_empty());
        assert_eq!(sheet.headers.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let sheet = parse("");
        assert!(sheet.headers.is_empty());
        assert!(sheet.rows.is_empty());
    }

    #[test]
    fn test_blank_lines_skipped_silently() {
        let sheet = parse("Name,City\n\nTrip,Goa\n\n");
        assert_eq!(sheet.rows.len(), 1);
        assert!(sheet.malformed.is_empty());
    }

    #[test]
    fn test_wrong_width_line_collected_as_malformed() {
        let sheet = parse("Name,City\nTrip,Goa\nonly one field\na,b,c");
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(
            sheet.malformed,
            vec![
                MalformedRow { line: 3, expected: 2, found: 1 },
                MalformedRow { line: 4, expected: 2, found: 3 },
            ]
        );
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a, b"), "\"a, b\"");
        assert_eq!(escape_field(r#"5" rope"#), r#""5"" rope""#);
    }

    #[test]
    fn test_serialize_fixed_header_and_missing_keys() {
        let rows = vec![row(&[("Name", "Trip"), ("Extra", "ignored")])];
        let csv = serialize(&rows, &["Name", "City"]);
        assert_eq!(csv, "Name,City\nTrip,");
    }

    #[test]
    fn test_serialize_empty_input_is_empty_string() {
        assert_eq!(serialize(&[], &["Name"]), "");
    }

    #[test]
    fn test_parse_serialize_round_trip() {
        let rows = vec![
            row(&[("Name", "Manali Escape"), ("City", "Manali, Himachal")]),
            row(&[("Name", r#"5" rope trek"#), ("City", "Leh")]),
        ];
        let csv = serialize(&rows, &["Name", "City"]);
        let sheet = parse(&csv);
        assert_eq!(sheet.rows, rows);
        assert!(sheet.malformed.is_empty());
    }

    #[test]
    fn test_read_file_with_auto_encoding() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Name,City\nTrip,Goa\n").unwrap();
        let text = read_file(file.path()).unwrap();
        assert_eq!(parse(&text).rows.len(), 1);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert!(decoded.contains("Soci"));
    }
}
