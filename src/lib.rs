//! flatquery - Keyword search over locally cached Flatpak AppStream catalogs
//!
//! Shared modules for the flatquery CLI tool. A session snapshots installed
//! refs, loads each enabled remote's catalog once and answers keyword
//! queries against the cached records.

pub mod cancel;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod index;
pub mod installation;
pub mod output;

pub use cancel::CancelToken;
pub use catalog::{CatalogLoader, CatalogRecord, MatchKind};
pub use errors::CatalogError;
pub use index::{LoadReport, SearchHit, SearchIndex};
pub use installation::{FlatpakInstallation, Installation, InstalledSet, Remote};
