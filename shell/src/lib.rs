//! ORIA Shell - Headless Surface for the ORIA Client
//!
//! Binds the controller from `oria-core` to an in-memory page:
//!
//! - [`document`]: The [`Document`] trait and [`HeadlessDocument`]
//! - [`surface`]: [`DomSurface`], which applies view messages to a document
//! - [`mascot`]: [`DocumentMascot`], the animator's element on a document
//! - [`asset_cache`]: Cache-first static asset store
//! - [`commands`]: Line commands read by the `oria-shell` binary

#![warn(missing_docs)]

pub mod asset_cache;
pub mod commands;
pub mod document;
pub mod mascot;
pub mod surface;

pub use asset_cache::{Asset, AssetCache, AssetError, AssetSource, HttpAssetSource, CACHE_NAME};
pub use commands::{parse_line, ParseError, ShellCommand, HELP};
pub use document::{Document, HeadlessDocument};
pub use mascot::{DocumentMascot, MASCOT_ID};
pub use surface::{DomSurface, SurfaceOutput};
