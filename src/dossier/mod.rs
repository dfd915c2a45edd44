//! Player dossier rendering
//!
//! Composes a fixed-geometry inventory image for one player: background,
//! body portrait, equipment silhouettes, item icons and stack counts.
//!
//! # Modules
//!
//! - [`avatar`]: Body portrait source for the character box
//! - [`canvas`]: Resampling and PNG encoding helpers
//! - [`compositor`]: Draws a snapshot onto the canvas and encodes the result
//! - [`error`]: Error types for rendering and avatar fetches
//! - [`layout`]: Canvas geometry and slot positions
//! - [`snapshot`]: Player snapshot and item types supplied by the metrics service
//! - [`text`]: Pixel digit font for stack counts

pub mod avatar;
pub mod canvas;
pub mod compositor;
pub mod error;
pub mod layout;
pub mod snapshot;
pub mod text;
