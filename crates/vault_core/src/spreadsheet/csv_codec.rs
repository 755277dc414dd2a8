use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tracing::debug;

use crate::core_api::{CoreError, CoreErrorCode};

use super::row::ExportRow;

pub const CSV_MIME: &str = "text/csv";
pub const REQUIRED_IMPORT_COLUMNS: [&str; 4] = ["Id", "Hash", "Tag", "Notes"];

/// A finished spreadsheet, ready to be handed to whatever saves files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDownload {
    pub filename: String,
    pub mime: &'static str,
    pub contents: String,
}

pub fn download_csv(filename_stem: &str, rows: &[ExportRow]) -> Result<CsvDownload, CoreError> {
    Ok(CsvDownload {
        filename: format!("{filename_stem}.csv"),
        mime: CSV_MIME,
        contents: encode_rows(rows)?,
    })
}

/// Serialize rows to CSV. The header is the first row's columns followed by
/// any columns first seen in later rows; absent cells are left empty.
pub fn encode_rows(rows: &[ExportRow]) -> Result<String, CoreError> {
    if rows.is_empty() {
        return Ok(String::new());
    }

    let mut header: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !header.contains(&key) {
                header.push(key);
            }
        }
    }

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(&header).map_err(write_error)?;
    for row in rows {
        let record: Vec<String> = header
            .iter()
            .map(|key| row.get(key).map(ToString::to_string).unwrap_or_default())
            .collect();
        writer.write_record(&record).map_err(write_error)?;
    }

    let bytes = writer.into_inner().map_err(|e| {
        CoreError::new(CoreErrorCode::Io, format!("failed to flush CSV output: {e}"))
    })?;
    String::from_utf8(bytes)
        .map_err(|e| CoreError::new(CoreErrorCode::Io, format!("CSV output is not UTF-8: {e}")))
}

fn write_error(e: csv::Error) -> CoreError {
    CoreError::new(CoreErrorCode::Io, format!("failed to write CSV: {e}"))
}

/// The columns the importer cares about. A field is `None` when the row was
/// too short to reach that column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportRow {
    pub id: Option<String>,
    pub hash: Option<String>,
    pub tag: Option<String>,
    pub notes: Option<String>,
}

/// Row-shape problems that are reported but do not fail an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowShapeWarning {
    TooFewFields {
        row: usize,
        expected: usize,
        found: usize,
    },
    TooManyFields {
        row: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedImport {
    pub rows: Vec<ImportRow>,
    pub warnings: Vec<RowShapeWarning>,
}

/// Parse an uploaded tag/notes CSV and validate its shape.
///
/// Fails with `Parse` for malformed input, `EmptyFile` when there are no data
/// rows, and `WrongSchema` when the first row lacks any of `Id`, `Hash`,
/// `Tag` or `Notes`.
pub fn decode_import(bytes: &[u8]) -> Result<DecodedImport, CoreError> {
    if let Some(line) = unclosed_quote_line(bytes) {
        return Err(CoreError::new(
            CoreErrorCode::Parse,
            format!("Quoted field starting on line {line} is never closed"),
        ));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers().map_err(parse_error)?.clone();
    let [id_col, hash_col, tag_col, notes_col] =
        REQUIRED_IMPORT_COLUMNS.map(|name| headers.iter().position(|h| h == name));

    let mut decoded = DecodedImport::default();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(parse_error)?;
        if let Some(warning) = shape_warning(index, headers.len(), record.len()) {
            debug!(?warning, "tolerating malformed CSV row");
            decoded.warnings.push(warning);
        }

        decoded.rows.push(ImportRow {
            id: field(&record, id_col),
            hash: field(&record, hash_col),
            tag: field(&record, tag_col),
            notes: field(&record, notes_col),
        });
    }

    let Some(first) = decoded.rows.first() else {
        return Err(CoreError::empty_file());
    };
    if first.id.is_none() || first.hash.is_none() || first.tag.is_none() || first.notes.is_none()
    {
        return Err(CoreError::wrong_schema());
    }

    Ok(decoded)
}

/// Line (1-based) of a quoted field that never closes. The csv reader
/// accepts such a field and reads it to end of input.
fn unclosed_quote_line(bytes: &[u8]) -> Option<usize> {
    let mut line = 1;
    let mut opened_on = None;
    let mut at_field_start = true;
    let mut iter = bytes.iter().peekable();
    while let Some(&b) = iter.next() {
        if opened_on.is_some() {
            if b == b'"' {
                if iter.peek() == Some(&&b'"') {
                    iter.next();
                } else {
                    opened_on = None;
                }
            }
        } else if b == b'"' && at_field_start {
            opened_on = Some(line);
            at_field_start = false;
            continue;
        } else {
            at_field_start = matches!(b, b',' | b'\n' | b'\r');
        }
        if b == b'\n' {
            line += 1;
        }
    }
    opened_on
}

fn field(record: &StringRecord, column: Option<usize>) -> Option<String> {
    column
        .and_then(|index| record.get(index))
        .map(str::to_string)
}

fn shape_warning(row: usize, expected: usize, found: usize) -> Option<RowShapeWarning> {
    if found < expected {
        Some(RowShapeWarning::TooFewFields {
            row,
            expected,
            found,
        })
    } else if found > expected {
        Some(RowShapeWarning::TooManyFields {
            row,
            expected,
            found,
        })
    } else {
        None
    }
}

fn parse_error(e: csv::Error) -> CoreError {
    CoreError::new(CoreErrorCode::Parse, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_long_rows_are_tolerated() {
        let input = b"Id,Hash,Tag,Notes\n1,2,keep,fine\n3,4\n5,6,junk,x,extra\n";
        let decoded = decode_import(input).expect("row-shape problems are not fatal");

        assert_eq!(decoded.rows.len(), 3);
        assert_eq!(decoded.rows[1].tag, None);
        assert_eq!(decoded.rows[2].notes.as_deref(), Some("x"));
        assert_eq!(
            decoded.warnings,
            vec![
                RowShapeWarning::TooFewFields {
                    row: 1,
                    expected: 4,
                    found: 2
                },
                RowShapeWarning::TooManyFields {
                    row: 2,
                    expected: 4,
                    found: 5
                },
            ]
        );
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let input = b"Id,Hash,Tag,Notes\n1,2,keep,\xff\xfe\n";
        let err = decode_import(input).expect_err("invalid UTF-8 must fail");
        assert_eq!(err.code, CoreErrorCode::Parse);
    }

    #[test]
    fn unterminated_quote_is_a_parse_error() {
        let input = b"Id,Hash,Tag,Notes\n1,2,keep,\"unterminated\n3,4,junk,x\n";
        let err = decode_import(input).expect_err("unterminated quote must fail");
        assert_eq!(err.code, CoreErrorCode::Parse);
        assert!(err.message.contains("line 2"));
    }

    #[test]
    fn quoted_fields_with_escapes_and_newlines_decode() {
        let input =
            b"Id,Hash,Tag,Notes\n\"1\",2,keep,\"say \"\"hi\"\"\nagain\"\n3,4,junk,5\"in\n";
        let decoded = decode_import(input).expect("well-formed quoting");
        assert_eq!(decoded.rows.len(), 2);
        assert_eq!(decoded.rows[0].notes.as_deref(), Some("say \"hi\"\nagain"));
        assert_eq!(decoded.rows[1].notes.as_deref(), Some("5\"in"));
    }

    #[test]
    fn header_only_file_is_empty() {
        let err = decode_import(b"Id,Hash,Tag,Notes\n").expect_err("no data rows");
        assert_eq!(err.code, CoreErrorCode::EmptyFile);

        let err = decode_import(b"").expect_err("no data at all");
        assert_eq!(err.code, CoreErrorCode::EmptyFile);
    }
}
