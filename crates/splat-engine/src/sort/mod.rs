//! Back-to-front ordering.
//!
//! A [`SortEngine`] computes permutations; [`SortScheduler`] decides on which
//! frames to ask for one and owns the resulting [`PermutationSet`](crate::texture::PermutationSet).
//! Two strategies exist and one is picked per session:
//!
//! - `Full`: one permutation over all particles, attributes in natural order.
//! - `Grouped`: attributes are reordered once by a spatial order, then each
//!   resort produces a coarse group order plus a fine in-group order.

mod cadence;
mod cpu;
mod engine;
mod strategy;

pub use cadence::{SortCadence, SortFailurePolicy, SortScheduler, SortTick};
pub use cpu::{CpuFullPipeline, CpuGroupedPipeline, CpuSortEngine};
pub use engine::SortEngine;
pub use strategy::{PreparedStrategy, ReorderedAttributes, SortStrategy, StrategyPipeline};

use thiserror::Error;

use crate::splat::SetupError;

/// Failures reported by a sort engine or detected in its output.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SortError {
    #[error("sort engine failed: {0}")]
    Engine(String),

    #[error("sort engine returned a malformed {0} permutation")]
    MalformedOutput(&'static str),

    #[error("initial reorder rejected: {0}")]
    Reorder(#[from] SetupError),
}
