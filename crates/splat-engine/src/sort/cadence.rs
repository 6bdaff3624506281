use std::num::NonZeroU32;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::splat::GroupLayout;
use crate::texture::PermutationSet;
use crate::view::CameraTransform;

use super::engine::SortEngine;
use super::strategy::{SortStrategy, StrategyPipeline};
use super::SortError;

/// Resort every `interval` frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortCadence {
    interval: NonZeroU32,
}

impl SortCadence {
    pub const EVERY_FRAME: Self = Self { interval: NonZeroU32::MIN };

    /// `None` for `k == 0`.
    pub fn every(k: u32) -> Option<Self> {
        NonZeroU32::new(k).map(|interval| Self { interval })
    }

    pub fn interval(&self) -> u32 {
        self.interval.get()
    }

    #[inline]
    pub fn is_due(&self, frame_index: u64) -> bool {
        frame_index % u64::from(self.interval.get()) == 0
    }
}

impl Default for SortCadence {
    fn default() -> Self {
        Self::EVERY_FRAME
    }
}

/// What happens when the engine fails or returns a malformed permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortFailurePolicy {
    /// Draw with the last good set for one tick, then force a resort.
    #[default]
    ReuseLastGood,
    /// Every failure skips the draw.
    SkipDraw,
}

/// Result of consulting the scheduler for one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum SortTick {
    /// A new set was produced this frame.
    Resorted,
    /// Not due; the previous set stands.
    Reused,
    /// The engine failed and the previous set is drawn once more.
    Stale(SortError),
}

/// Owns the sort pipeline and the current [`PermutationSet`], and asks the
/// engine for a new one on due frames.
pub struct SortScheduler<E: SortEngine> {
    engine: E,
    pipeline: StrategyPipeline<E>,
    layout: GroupLayout,
    cadence: SortCadence,
    policy: SortFailurePolicy,
    current: Option<PermutationSet>,
    next_generation: u64,
    force_resort: bool,
    stale: bool,
}

impl<E: SortEngine> SortScheduler<E> {
    pub fn new(
        engine: E,
        pipeline: StrategyPipeline<E>,
        layout: GroupLayout,
        cadence: SortCadence,
        policy: SortFailurePolicy,
    ) -> Self {
        Self {
            engine,
            pipeline,
            layout,
            cadence,
            policy,
            current: None,
            next_generation: 1,
            force_resort: false,
            stale: false,
        }
    }

    pub fn strategy(&self) -> SortStrategy {
        self.pipeline.strategy()
    }

    pub fn cadence(&self) -> SortCadence {
        self.cadence
    }

    pub fn policy(&self) -> SortFailurePolicy {
        self.policy
    }

    /// The set to draw with, if any sort has succeeded yet.
    pub fn current(&self) -> Option<&PermutationSet> {
        self.current.as_ref()
    }

    /// Decides whether `frame_index` resorts and, if so, runs the engine.
    ///
    /// Frames that do not resort leave [`current`](Self::current) untouched.
    /// An `Err` means there is nothing safe to draw this frame.
    pub fn permutation_for(
        &mut self,
        frame_index: u64,
        camera: &CameraTransform,
        eye: Vec3,
    ) -> Result<SortTick, SortError> {
        let due = self.force_resort || self.current.is_none() || self.cadence.is_due(frame_index);
        if !due {
            return Ok(SortTick::Reused);
        }

        match self.run_engine(camera, eye) {
            Ok(set) => {
                log::debug!(
                    "frame {frame_index}: resorted ({}, generation {})",
                    self.pipeline.strategy(),
                    set.generation()
                );
                self.current = Some(set);
                self.force_resort = false;
                self.stale = false;
                Ok(SortTick::Resorted)
            }
            Err(err) => self.on_failure(frame_index, err),
        }
    }

    fn on_failure(&mut self, frame_index: u64, err: SortError) -> Result<SortTick, SortError> {
        self.force_resort = true;
        match self.policy {
            SortFailurePolicy::ReuseLastGood if self.current.is_some() && !self.stale => {
                log::warn!("frame {frame_index}: {err}; drawing previous order");
                self.stale = true;
                Ok(SortTick::Stale(err))
            }
            _ => Err(err),
        }
    }

    fn run_engine(&mut self, camera: &CameraTransform, eye: Vec3) -> Result<PermutationSet, SortError> {
        let generation = self.next_generation;
        let set = match &mut self.pipeline {
            StrategyPipeline::Full(pipeline) => {
                let perm = self.engine.apply_full(pipeline, camera.view_proj)?;
                PermutationSet::Full { perm, generation }
            }
            StrategyPipeline::Grouped(pipeline) => {
                let (outer, inner) = self.engine.apply_grouped(pipeline, eye, camera.view_proj)?;
                PermutationSet::Grouped {
                    outer,
                    inner,
                    generation,
                }
            }
        };

        if !set.is_valid_for(self.layout) {
            let which = match self.pipeline.strategy() {
                SortStrategy::Full => "full",
                SortStrategy::Grouped => "grouped",
            };
            return Err(SortError::MalformedOutput(which));
        }

        self.next_generation += 1;
        Ok(set)
    }
}
