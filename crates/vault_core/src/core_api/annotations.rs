use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagValue {
    Favorite,
    Keep,
    Infuse,
    Junk,
    Archive,
}

impl TagValue {
    pub const ALL: [TagValue; 5] = [
        Self::Favorite,
        Self::Keep,
        Self::Infuse,
        Self::Junk,
        Self::Archive,
    ];

    /// Look up a tag by its lowercase name. Anything outside the vocabulary
    /// is `None`, which callers treat as "no tag".
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Favorite => "favorite",
            Self::Keep => "keep",
            Self::Infuse => "infuse",
            Self::Junk => "junk",
            Self::Archive => "archive",
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<TagValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ItemInfo {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.notes.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagUpdate {
    pub item_id: String,
    pub tag: Option<TagValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteUpdate {
    pub item_id: String,
    pub note: String,
}

/// Read side of the annotation store, as consumed by the row builders.
pub trait AnnotationLookup {
    fn tag(&self, item_id: &str) -> Option<TagValue>;
    fn notes(&self, item_id: &str) -> Option<&str>;
}

/// Write side of the annotation store. The importer sends one bulk tag call
/// per file and one note call per row.
pub trait AnnotationStore {
    fn set_item_tags_bulk(&mut self, updates: Vec<TagUpdate>);
    fn set_item_note(&mut self, update: NoteUpdate);
}

/// Tags and notes keyed by item id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemInfos {
    infos: BTreeMap<String, ItemInfo>,
}

impl ItemInfos {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, item_id: &str) -> Option<&ItemInfo> {
        self.infos.get(item_id)
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ItemInfo)> {
        self.infos.iter().map(|(id, info)| (id.as_str(), info))
    }

    fn update(&mut self, item_id: &str, apply: impl FnOnce(&mut ItemInfo)) {
        let info = self.infos.entry(item_id.to_string()).or_default();
        apply(info);
        if info.is_empty() {
            self.infos.remove(item_id);
        }
    }
}

impl AnnotationLookup for ItemInfos {
    fn tag(&self, item_id: &str) -> Option<TagValue> {
        self.infos.get(item_id).and_then(|info| info.tag)
    }

    fn notes(&self, item_id: &str) -> Option<&str> {
        self.infos
            .get(item_id)
            .and_then(|info| info.notes.as_deref())
    }
}

impl AnnotationStore for ItemInfos {
    fn set_item_tags_bulk(&mut self, updates: Vec<TagUpdate>) {
        for update in updates {
            self.update(&update.item_id, |info| info.tag = update.tag);
        }
    }

    fn set_item_note(&mut self, update: NoteUpdate) {
        let note = Some(update.note).filter(|n| !n.is_empty());
        self.update(&update.item_id, |info| info.notes = note);
    }
}
