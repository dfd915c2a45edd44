//! Icon resolution layer for inventory items
//!
//! This module keeps a local mirror of the remote icon gallery, knows which
//! gallery version holds the icon of every item, and turns item identifiers
//! into decoded images.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Gallery   │────▶│   Catalog   │◀────│   Fetcher   │
//! │   (fetch)   │     │(index+store)│     │  (decode)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                       │         │
//!                       ▼         ▼
//!               ┌─────────────┐ ┌─────────────┐
//!               │    Index    │ │    Store    │
//!               │(name→ver)   │ │(mirror+path)│
//!               └─────────────┘ └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`catalog`]: Long-lived service owning the index and the mirror, with single-flight sync
//! - [`error`]: Error types for gallery, store and index operations
//! - [`fetcher`]: Item and empty-slot icon resolution into RGBA images
//! - [`gallery`]: Trait for fetching gallery metadata and archives
//! - [`http_gallery`]: HTTP implementation of the gallery trait
//! - [`index`]: Item name to version mapping and its persisted record
//! - [`store`]: On-disk mirror of extracted version archives
//! - [`versions`]: Ordered list of tracked gallery versions

pub mod catalog;
pub mod error;
pub mod fetcher;
pub mod gallery;
pub mod http_gallery;
pub mod index;
pub mod store;
pub mod versions;
