use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vault_core::core_api::{CoreErrorCode, Engine, ExportKind, ItemHash, Session};
use vault_core::spreadsheet::ImportFile;
use vault_render::{DtrRating, ExportOptions, download_csv_files};
use wasm_bindgen::prelude::*;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WebExportOptions {
    pub kind: String,
    pub reviews_enabled: bool,
    /// Review scores keyed by item hash, as the page fetched them.
    pub ratings: BTreeMap<String, WebRating>,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default)]
pub struct WebRating {
    pub overall_score: f64,
    pub rating_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebImportFile {
    pub name: String,
    pub contents: String,
}

/// What the page needs to offer the spreadsheet as a download.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WebDownload {
    pub filename: String,
    pub mime: String,
    pub contents: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WebImportResult {
    /// `None` when no account is active and nothing was imported.
    pub count: Option<usize>,
    pub profile: String,
}

#[derive(Debug, Clone)]
struct WebError {
    code: &'static str,
    message: String,
}

#[derive(Debug, Clone, Serialize)]
struct WebErrorPayload {
    code: String,
    message: String,
}

impl WebError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn from_core(err: vault_core::core_api::CoreError) -> Self {
        let code = match err.code {
            CoreErrorCode::Parse => "parse_failed",
            CoreErrorCode::EmptyFile => "empty_file",
            CoreErrorCode::WrongSchema => "wrong_schema",
            CoreErrorCode::NoStores => "no_stores",
            CoreErrorCode::UnknownStore | CoreErrorCode::UnknownAccount => "not_found",
            CoreErrorCode::Io => "io_failed",
        };
        Self::new(code, err.message)
    }

    fn to_js_value(&self) -> JsValue {
        let payload = WebErrorPayload {
            code: self.code.to_string(),
            message: self.message.clone(),
        };
        serde_wasm_bindgen::to_value(&payload).unwrap_or_else(|_| {
            JsValue::from_str(&format!("{}: {}", payload.code, payload.message))
        })
    }
}

#[wasm_bindgen]
pub fn export_csv(profile_bytes: &[u8], options: JsValue) -> Result<JsValue, JsValue> {
    let parsed_options: WebExportOptions =
        parse_js(options, "export options").map_err(|err| err.to_js_value())?;
    let download =
        export_csv_impl(profile_bytes, &parsed_options).map_err(|err| err.to_js_value())?;
    to_js(&download).map_err(|err| err.to_js_value())
}

#[wasm_bindgen]
pub fn import_csv(profile_bytes: &[u8], files: JsValue) -> Result<JsValue, JsValue> {
    let parsed_files: Vec<WebImportFile> =
        parse_js(files, "import files").map_err(|err| err.to_js_value())?;
    let result = import_csv_impl(profile_bytes, &parsed_files).map_err(|err| err.to_js_value())?;
    to_js(&result).map_err(|err| err.to_js_value())
}

fn open_profile(profile_bytes: &[u8]) -> Result<Session, WebError> {
    if profile_bytes.is_empty() {
        return Err(WebError::new(
            "unsupported_file",
            "The profile is empty. Load your inventory before exporting or importing.",
        ));
    }
    Engine::new()
        .open_bytes(profile_bytes)
        .map_err(WebError::from_core)
}

fn export_csv_impl(
    profile_bytes: &[u8],
    options: &WebExportOptions,
) -> Result<WebDownload, WebError> {
    let kind: ExportKind = options
        .kind
        .parse()
        .map_err(|err: String| WebError::new("invalid_options", err))?;
    let session = open_profile(profile_bytes)?;

    let mut ratings: BTreeMap<ItemHash, DtrRating> = BTreeMap::new();
    for (key, rating) in &options.ratings {
        let hash = key.parse::<ItemHash>().map_err(|_| {
            WebError::new(
                "invalid_options",
                format!("Invalid rating key '{key}'. Expected an item hash."),
            )
        })?;
        ratings.insert(
            hash,
            DtrRating {
                overall_score: rating.overall_score,
                rating_count: rating.rating_count,
            },
        );
    }
    let export_options = ExportOptions {
        reviews_enabled: options.reviews_enabled,
    };

    let download = download_csv_files(&session, kind, export_options, &ratings)
        .map_err(WebError::from_core)?;
    Ok(WebDownload {
        filename: download.filename,
        mime: download.mime.to_string(),
        contents: download.contents,
    })
}

fn import_csv_impl(
    profile_bytes: &[u8],
    files: &[WebImportFile],
) -> Result<WebImportResult, WebError> {
    let mut session = open_profile(profile_bytes)?;
    let files: Vec<ImportFile> = files
        .iter()
        .map(|file| ImportFile::new(file.name.as_str(), file.contents.as_bytes()))
        .collect();

    let count = session
        .import_tags_notes(&files)
        .map_err(WebError::from_core)?;
    let bytes = session.to_json_bytes().map_err(WebError::from_core)?;
    let profile = String::from_utf8(bytes).map_err(|err| {
        WebError::new(
            "render_failed",
            format!("profile JSON is not UTF-8: {err}"),
        )
    })?;
    Ok(WebImportResult { count, profile })
}

fn parse_js<T: for<'de> Deserialize<'de> + Default>(
    value: JsValue,
    what: &str,
) -> Result<T, WebError> {
    if value.is_null() || value.is_undefined() {
        return Ok(T::default());
    }

    serde_wasm_bindgen::from_value(value)
        .map_err(|err| WebError::new("invalid_options", format!("Failed to parse {what}: {err}")))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, WebError> {
    serde_wasm_bindgen::to_value(value).map_err(|err| {
        WebError::new(
            "render_failed",
            format!("failed to convert result for JavaScript: {err}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::{WebExportOptions, WebImportFile, WebRating, export_csv_impl, import_csv_impl};

    #[test]
    fn export_csv_impl_builds_armor_download() {
        let bytes = fixture_bytes("tests/fixtures/profile.json");
        let options = WebExportOptions {
            kind: "armor".to_string(),
            ..WebExportOptions::default()
        };
        let download = export_csv_impl(&bytes, &options).expect("armor export should work");

        assert_eq!(download.filename, "destinyArmor.csv");
        assert_eq!(download.mime, "text/csv");
        assert!(download.contents.contains("Helm of Righteous Fury"));
        assert!(!download.contents.contains("DTR Rating"));
    }

    #[test]
    fn export_csv_impl_passes_ratings_through() {
        let bytes = fixture_bytes("tests/fixtures/profile.json");
        let mut options = WebExportOptions {
            kind: "weapons".to_string(),
            reviews_enabled: true,
            ..WebExportOptions::default()
        };
        options.ratings.insert(
            "185321778".to_string(),
            WebRating {
                overall_score: 3.5,
                rating_count: 4,
            },
        );
        let download = export_csv_impl(&bytes, &options).expect("weapons export should work");
        assert!(download.contents.contains(",3.5,4,"));
    }

    #[test]
    fn export_csv_impl_rejects_unknown_kind() {
        let bytes = fixture_bytes("tests/fixtures/profile.json");
        let options = WebExportOptions {
            kind: "emblems".to_string(),
            ..WebExportOptions::default()
        };
        let err = export_csv_impl(&bytes, &options).expect_err("unknown kind should fail");
        assert_eq!(err.code, "invalid_options");
    }

    #[test]
    fn export_csv_impl_rejects_empty_profile() {
        let options = WebExportOptions {
            kind: "ghost".to_string(),
            ..WebExportOptions::default()
        };
        let err = export_csv_impl(&[], &options).expect_err("empty payload should fail");
        assert_eq!(err.code, "unsupported_file");

        let err = export_csv_impl(b"{}", &options).expect_err("no stores should fail");
        assert_eq!(err.code, "no_stores");
    }

    #[test]
    fn import_csv_impl_returns_count_and_profile() {
        let bytes = fixture_bytes("tests/fixtures/profile.json");
        let files = vec![WebImportFile {
            name: "ghosts.csv".to_string(),
            contents: "Id,Hash,Tag,Notes\n6917529100000000004,3190250541,junk,\n".to_string(),
        }];
        let result = import_csv_impl(&bytes, &files).expect("import should work");

        assert_eq!(result.count, Some(1));
        let profile: serde_json::Value =
            serde_json::from_str(&result.profile).expect("profile should be JSON");
        assert_eq!(profile["item_infos"]["6917529100000000004"]["tag"], "junk");
    }

    #[test]
    fn import_csv_impl_reports_schema_errors() {
        let bytes = fixture_bytes("tests/fixtures/profile.json");
        let files = vec![WebImportFile {
            name: "bad.csv".to_string(),
            contents: "Name\nfoo\n".to_string(),
        }];
        let err = import_csv_impl(&bytes, &files).expect_err("schema should fail");
        assert_eq!(err.code, "wrong_schema");
        assert!(err.message.starts_with("bad.csv: "));
    }

    fn fixture_bytes(relative_path: &str) -> Vec<u8> {
        let full_path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../..")
            .join(relative_path);
        fs::read(full_path).expect("fixture bytes should be readable")
    }
}
