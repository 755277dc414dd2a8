mod annotations;
mod engine;
mod error;
pub mod seasons;
pub mod sources;
pub mod stat_tables;
mod types;

pub use annotations::{
    AnnotationLookup, AnnotationStore, ItemInfo, ItemInfos, NoteUpdate, TagUpdate, TagValue,
};
pub use engine::{Engine, Session};
pub use error::{CoreError, CoreErrorCode};
pub use types::{
    Bucket, BucketHash, DestinyVersion, ExportKind, GHOST_BUCKET_HASH, GridNode, Item, ItemHash,
    ItemStat, MasterworkInfo, PlugItem, PrimaryStat, Quality, Socket, Sockets, StatHash, Store,
    TalentGrid, VAULT_STORE_ID,
};
