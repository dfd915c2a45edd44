//! Game-server metrics service
//!
//! - [`client`]: HTTP client for the stats and player list endpoints
//! - [`format`]: Human readable status summary
//! - [`stats`]: Payload types

pub mod client;
pub mod format;
pub mod stats;
