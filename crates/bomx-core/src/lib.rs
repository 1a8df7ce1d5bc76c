#![forbid(unsafe_code)]
//! bomx-core library.
//!
//! Data model, error taxonomy, configuration and table I/O shared by the
//! explosion engine and the CLI.
//!
//! # Conventions
//!
//! - **Errors**: pipeline failures are [`error::BomError`]; file and config
//!   helpers return `anyhow::Result` with context.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod audit;
pub mod config;
pub mod error;
pub mod model;
pub mod roots;
pub mod table;

pub use error::{BomError, ErrorCode};
pub use model::{EdgeRow, ExplosionRecord, ExplosionTable, ItemRow, RemovedEdge};
