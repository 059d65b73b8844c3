//! PC Regulation Core - Domain models, migrations, and configuration
//!
//! This crate contains the document model, the schema migration engine, the
//! storage codec and the port definitions for the PC Regulation tracker.

pub mod clock;
pub mod codec;
pub mod config;
pub mod editing;
pub mod error;
pub mod migration;
pub mod models;
pub mod ports;

pub use error::{PcregError, Result};
