#![forbid(unsafe_code)]
//! bomx-explode library.
//!
//! Builds a weighted BOM graph from edge rows, breaks cycles by removing
//! each cycle's minimum-quantity edge, and explodes roots into a flat
//! leaf-level component table.
//!
//! # Conventions
//!
//! - **Errors**: engine failures are [`bomx_core::error::BomError`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod explode;
pub mod graph;
pub mod pipeline;

pub use explode::{ExplosionWalker, explode_roots};
pub use graph::{BomGraph, CyclePolicy, GraphStats, ResolvedGraph, resolve_cycles};
pub use pipeline::{ExplosionRun, explode_bom};
