use serde::{Deserialize, Serialize};

use crate::splat::{GroupLayout, ParticleAttributes};

use super::engine::SortEngine;
use super::SortError;

/// Which permutation scheme a session uses. Fixed for the session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortStrategy {
    #[default]
    Full,
    Grouped,
}

impl SortStrategy {
    /// Creates the engine pipeline and applies the strategy's one-time
    /// reorder. Only the first `layout.particle_count()` particles take part.
    pub fn prepare<E: SortEngine>(
        self,
        engine: &mut E,
        mut attributes: ParticleAttributes,
        layout: GroupLayout,
    ) -> Result<PreparedStrategy<E>, SortError> {
        attributes.truncate(layout.particle_count());

        match self {
            SortStrategy::Full => {
                let pipeline = engine.create_full(attributes.positions(), layout)?;
                Ok(PreparedStrategy {
                    pipeline: StrategyPipeline::Full(pipeline),
                    reordered: ReorderedAttributes { attributes, layout },
                })
            }
            SortStrategy::Grouped => {
                let (pipeline, initial) = engine.create_grouped(attributes.positions(), layout)?;
                let attributes = attributes.permuted(&initial)?;
                log::debug!(
                    "grouped strategy: {} groups of {}",
                    layout.group_count(),
                    layout.group_size()
                );
                Ok(PreparedStrategy {
                    pipeline: StrategyPipeline::Grouped(pipeline),
                    reordered: ReorderedAttributes { attributes, layout },
                })
            }
        }
    }
}

impl std::fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortStrategy::Full => f.write_str("full"),
            SortStrategy::Grouped => f.write_str("grouped"),
        }
    }
}

impl std::str::FromStr for SortStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(SortStrategy::Full),
            "grouped" => Ok(SortStrategy::Grouped),
            other => Err(format!("unknown sort strategy `{other}` (expected `full` or `grouped`)")),
        }
    }
}

pub enum StrategyPipeline<E: SortEngine> {
    Full(E::FullPipeline),
    Grouped(E::GroupedPipeline),
}

impl<E: SortEngine> StrategyPipeline<E> {
    pub fn strategy(&self) -> SortStrategy {
        match self {
            StrategyPipeline::Full(_) => SortStrategy::Full,
            StrategyPipeline::Grouped(_) => SortStrategy::Grouped,
        }
    }
}

/// Output of [`SortStrategy::prepare`].
pub struct PreparedStrategy<E: SortEngine> {
    pub pipeline: StrategyPipeline<E>,
    pub reordered: ReorderedAttributes,
}

/// Attributes in the order the permutation textures index into, truncated to
/// exactly `layout.particle_count()` particles.
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderedAttributes {
    attributes: ParticleAttributes,
    layout: GroupLayout,
}

impl ReorderedAttributes {
    /// Natural order, as used by the full strategy.
    #[cfg(test)]
    pub(crate) fn natural(mut attributes: ParticleAttributes, layout: GroupLayout) -> Self {
        attributes.truncate(layout.particle_count());
        Self { attributes, layout }
    }

    pub fn layout(&self) -> GroupLayout {
        self.layout
    }

    pub fn attributes(&self) -> &ParticleAttributes {
        &self.attributes
    }

    pub(crate) fn into_inner(self) -> ParticleAttributes {
        self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::CpuSortEngine;

    fn line(n: usize) -> ParticleAttributes {
        // Reverse order along X so the spatial reorder has something to do.
        let positions = (0..n).map(|i| [(n - i) as f32, 0.0, 0.0]).collect();
        let colors = (0..n).map(|i| [i as f32, 0.0, 0.0, 1.0]).collect();
        ParticleAttributes::new(positions, colors, vec![[1.0; 3]; n], vec![[0.0; 3]; n]).unwrap()
    }

    #[test]
    fn full_keeps_natural_order() {
        let attrs = line(10);
        let layout = GroupLayout::fit(10, 4).unwrap();
        let prepared = SortStrategy::Full
            .prepare(&mut CpuSortEngine::new(), attrs.clone(), layout)
            .unwrap();
        assert_eq!(prepared.pipeline.strategy(), SortStrategy::Full);
        assert_eq!(prepared.reordered.attributes().len(), 8);
        assert_eq!(prepared.reordered.attributes().positions(), &attrs.positions()[..8]);
    }

    #[test]
    fn grouped_reorders_every_array_together() {
        let attrs = line(8);
        let layout = GroupLayout::fit(8, 4).unwrap();
        let prepared = SortStrategy::Grouped
            .prepare(&mut CpuSortEngine::new(), attrs, layout)
            .unwrap();
        let reordered = prepared.reordered.attributes();

        // Morton order along a line sorts by X ascending.
        let xs: Vec<f32> = reordered.positions().iter().map(|p| p[0]).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        // Color tag `i` travels with position `n - i`.
        for (p, c) in reordered.positions().iter().zip(reordered.colors()) {
            assert_eq!(p[0], 8.0 - c[0]);
        }
    }

    #[test]
    fn strategy_parses_from_cli_and_json() {
        assert_eq!("grouped".parse::<SortStrategy>(), Ok(SortStrategy::Grouped));
        assert!("bitonic".parse::<SortStrategy>().is_err());
        let s: SortStrategy = serde_json::from_str("\"full\"").unwrap();
        assert_eq!(s, SortStrategy::Full);
    }
}
