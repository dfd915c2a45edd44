pub mod config;
pub mod dossier;
pub mod icons;
pub mod logging;
pub mod metrics;
