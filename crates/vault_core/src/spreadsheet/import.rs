use tracing::info;

use crate::accounts::DestinyAccount;
use crate::core_api::{AnnotationStore, CoreError, NoteUpdate, TagUpdate, TagValue};

use super::csv_codec::{ImportRow, decode_import};

/// An uploaded file: its display name and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFile {
    pub name: String,
    pub contents: Vec<u8>,
}

impl ImportFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

struct NormalizedRow {
    item_id: String,
    tag: Option<TagValue>,
    note: String,
}

/// Apply the tags and notes from each CSV file, in order, to `store`.
///
/// Returns `Ok(None)` without touching the store when there is no active
/// account, otherwise the number of rows read across all files. The first
/// file that fails to decode aborts the import; files before it stay applied.
pub fn import_tags_notes_from_csv<S: AnnotationStore + ?Sized>(
    account: Option<&DestinyAccount>,
    files: &[ImportFile],
    store: &mut S,
) -> Result<Option<usize>, CoreError> {
    if account.is_none() {
        return Ok(None);
    }

    let mut total = 0;
    for file in files {
        let decoded = decode_import(&file.contents)
            .map_err(|e| CoreError::new(e.code, format!("{}: {}", file.name, e.message)))?;

        let rows: Vec<NormalizedRow> = decoded.rows.iter().filter_map(normalize_row).collect();

        store.set_item_tags_bulk(
            rows.iter()
                .map(|row| TagUpdate {
                    item_id: row.item_id.clone(),
                    tag: row.tag,
                })
                .collect(),
        );
        for row in rows {
            store.set_item_note(NoteUpdate {
                item_id: row.item_id,
                note: row.note,
            });
        }

        info!(
            file = %file.name,
            rows = decoded.rows.len(),
            warnings = decoded.warnings.len(),
            "imported tags and notes"
        );
        total += decoded.rows.len();
    }

    Ok(Some(total))
}

fn normalize_row(row: &ImportRow) -> Option<NormalizedRow> {
    let id = row.id.as_deref().filter(|id| !id.is_empty())?;
    row.hash.as_deref().filter(|hash| !hash.is_empty())?;
    let tag = row
        .tag
        .as_deref()
        .map(str::to_lowercase)
        .and_then(|name| TagValue::from_name(&name));

    Some(NormalizedRow {
        item_id: id.replace('"', ""),
        tag,
        note: row.notes.clone().unwrap_or_default(),
    })
}
