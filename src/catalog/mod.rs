// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog module - AppStream parsing, record resolution and per-remote loading

pub mod appstream;
pub mod loader;
pub mod record;

pub use loader::CatalogLoader;
pub use record::{CatalogRecord, MatchKind, Urls};
