//! CSV export and tag/note import.

mod csv_codec;
mod import;
mod row;

pub use csv_codec::{
    CSV_MIME, CsvDownload, DecodedImport, ImportRow, REQUIRED_IMPORT_COLUMNS, RowShapeWarning,
    decode_import, download_csv, encode_rows,
};
pub use import::{ImportFile, import_tags_notes_from_csv};
pub use row::{Cell, ExportRow};
