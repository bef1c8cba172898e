//! Template resolution and data fusion for Teamfight Tactics game data.
//!
//! This crate fuses two feeds of TFT content into one self-contained dataset:
//!
//! - **Allowlist**: the release manifest naming which augments, items, traits
//!   and champions are current
//! - **Catalog**: the verbose detail feed with names, effect tables and
//!   templated descriptions, often including content from older sets
//!
//! Fusion keeps only allowlisted entities, resolves `@Placeholder@` tokens in
//! descriptions against each entity's effects (including per-tier trait rows),
//! maps champion trait names to trait IDs and links traits back to their
//! members. Retrieval, persistence and icon URL formatting are left to the
//! caller.
//!
//! # Example
//!
//! ```no_run
//! use ltk_tft_data::{fuse_all, Allowlist, Catalog, FusionContext};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let (augments, items, traits, champions) = (
//! #     serde_json::json!({ "data": {} }), serde_json::json!({ "data": {} }),
//! #     serde_json::json!({ "data": {} }), serde_json::json!({ "data": {} }));
//! # let document = serde_json::json!({ "items": [], "setData": [] });
//! let allowlist = Allowlist::from_manifests(&augments, &items, &traits, &champions)?;
//! let catalog = Catalog::from_json(&document, "TFTSet10")?;
//!
//! let ctx = FusionContext::new("14.1.1", "en_us", &allowlist, &catalog);
//! let dataset = fuse_all(&ctx)?;
//!
//! println!(
//!     "{} champions, {} unresolved placeholders",
//!     dataset.champions.len(),
//!     dataset.report.unresolved.len()
//! );
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod effects;
pub mod entity;
pub mod error;
pub mod format;
pub mod fusion;
pub mod key;
pub mod link;
pub mod overrides;
pub mod resolve;
pub mod rows;

// Re-export main types
pub use catalog::{Allowlist, Catalog, Records};
pub use effects::EffectTable;
pub use entity::{Ability, Augment, Champion, Collection, Entity, EntityKind, Item, Trait};
pub use error::{Error, Result};
pub use fusion::{fuse, fuse_all, FusedDataset, FusionContext, FusionReport, KindStats};
pub use link::link;
pub use overrides::{FsOverrideSource, OverrideSource};
pub use resolve::{resolve, OverrideRules, Resolved, UNKNOWN};
pub use rows::expand_rows;

#[cfg(test)]
mod tests;
