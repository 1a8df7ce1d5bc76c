//! Explosion of resolved BOM graphs into flat component tables.
//!
//! [`walker::ExplosionWalker`] expands one root at a time;
//! [`orchestrator::explode_roots`] runs it over a root set and produces the
//! ordered [`bomx_core::model::ExplosionTable`].

pub mod orchestrator;
pub mod walker;

pub use orchestrator::{explode_roots, sort_records};
pub use walker::{ExplosionWalker, SuccessorCache};
