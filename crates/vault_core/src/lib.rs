pub mod accounts;
pub mod core_api;
pub mod destiny_class;
pub mod loadout;
pub mod routes;
pub mod spreadsheet;
