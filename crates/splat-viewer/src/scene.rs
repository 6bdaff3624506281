use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use splat_engine::splat::ParticleAttributes;

/// On-disk scene: flat arrays with 3, 4, 3 and 4 floats per particle.
#[derive(Debug, Deserialize)]
struct SceneFile {
    positions: Vec<f32>,
    colors: Vec<f32>,
    scales: Vec<f32>,
    rotors: Vec<f32>,
}

pub fn load_scene(path: &Path) -> Result<ParticleAttributes> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read scene {}", path.display()))?;
    let scene: SceneFile = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse scene {}", path.display()))?;

    let attributes = ParticleAttributes::from_flat(&scene.positions, &scene.colors, &scene.scales, &scene.rotors)
        .with_context(|| format!("Scene {} has inconsistent arrays", path.display()))?;

    log::info!("loaded {} particles from {}", attributes.len(), path.display());
    Ok(attributes)
}

/// A seeded blob of `count` particles around the origin.
///
/// Points are denser towards the center and tinted by position, so sorting
/// mistakes show up as visible banding.
pub fn demo_cloud(count: usize, seed: u64) -> Result<ParticleAttributes> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut positions = Vec::with_capacity(count);
    let mut colors = Vec::with_capacity(count);
    let mut scales = Vec::with_capacity(count);
    let mut rotors = Vec::with_capacity(count);

    for _ in 0..count {
        let dir = loop {
            let v = [
                rng.gen_range(-1.0f32..1.0),
                rng.gen_range(-1.0f32..1.0),
                rng.gen_range(-1.0f32..1.0),
            ];
            let len2 = v[0] * v[0] + v[1] * v[1] + v[2] * v[2];
            if len2 > 1e-4 && len2 <= 1.0 {
                break v;
            }
        };
        let r = 1.5 * rng.gen_range(0.0f32..1.0).powf(1.5);
        let p = [dir[0] * r, dir[1] * r, dir[2] * r];
        positions.push(p);

        colors.push([
            0.5 + 0.5 * dir[0],
            0.5 + 0.5 * dir[1],
            0.5 + 0.5 * dir[2],
            rng.gen_range(0.4..0.9),
        ]);

        let base = rng.gen_range(0.01f32..0.04);
        scales.push([
            base * rng.gen_range(0.5..2.0),
            base * rng.gen_range(0.5..2.0),
            base * rng.gen_range(0.5..2.0),
        ]);

        rotors.push([
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        ]);
    }

    let attributes = ParticleAttributes::from_scales_and_rotors(positions, colors, &scales, &rotors)?;
    log::info!("generated demo cloud of {count} particles (seed {seed})");
    Ok(attributes)
}
