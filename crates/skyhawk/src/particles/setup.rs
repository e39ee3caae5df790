//! Emission ranges and engine setup, loadable from the game config.

use glam::{Vec3, Vec4};
use rand::Rng;
use renderer::ShapeParams;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Inclusive range a particle attribute is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span<T> {
    pub min: T,
    pub max: T,
}

impl<T: Copy> Span<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Range that always yields `value`.
    pub const fn fixed(value: T) -> Self {
        Self { min: value, max: value }
    }
}

/// Uniform sampling between a span's bounds, each component drawn independently.
pub trait Sample: Copy {
    fn sample_between<R: Rng + ?Sized>(min: Self, max: Self, rng: &mut R) -> Self;
}

impl Sample for f32 {
    fn sample_between<R: Rng + ?Sized>(min: Self, max: Self, rng: &mut R) -> Self {
        engine_core::lerp(min, max, rng.gen::<f32>())
    }
}

impl Sample for Vec3 {
    fn sample_between<R: Rng + ?Sized>(min: Self, max: Self, rng: &mut R) -> Self {
        Vec3::new(
            f32::sample_between(min.x, max.x, rng),
            f32::sample_between(min.y, max.y, rng),
            f32::sample_between(min.z, max.z, rng),
        )
    }
}

impl Sample for Vec4 {
    fn sample_between<R: Rng + ?Sized>(min: Self, max: Self, rng: &mut R) -> Self {
        Vec4::new(
            f32::sample_between(min.x, max.x, rng),
            f32::sample_between(min.y, max.y, rng),
            f32::sample_between(min.z, max.z, rng),
            f32::sample_between(min.w, max.w, rng),
        )
    }
}

impl<T: Sample> Span<T> {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        T::sample_between(self.min, self.max, rng)
    }
}

/// Per-attribute ranges new particles are drawn from, plus the forces and fades applied
/// over their life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionRanges {
    /// Offset added to the emit position.
    pub position_jitter: Span<Vec3>,
    pub velocity: Span<Vec3>,
    pub color: Span<Vec4>,
    /// Seconds.
    pub life_time: Span<f32>,
    pub initial_scale: Span<Vec3>,
    pub end_scale: Span<Vec3>,
    pub initial_rotation: Span<Vec3>,
    pub end_rotation: Span<Vec3>,
    /// Constant acceleration, units/s².
    pub gravity: Vec3,
    /// Life ratio by which alpha has ramped up to full.
    pub fade_in_ratio: f32,
    /// Life ratio after which alpha ramps down to zero.
    pub fade_out_ratio: f32,
}

impl Default for EmissionRanges {
    fn default() -> Self {
        Self {
            position_jitter: Span::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
            velocity: Span::new(Vec3::new(-1.0, 1.0, -1.0), Vec3::new(1.0, 3.0, 1.0)),
            color: Span::new(Vec4::new(0.8, 0.8, 0.8, 1.0), Vec4::ONE),
            life_time: Span::new(0.5, 1.5),
            initial_scale: Span::new(Vec3::splat(0.5), Vec3::splat(1.0)),
            end_scale: Span::new(Vec3::ZERO, Vec3::splat(0.2)),
            initial_rotation: Span::new(Vec3::ZERO, Vec3::new(0.0, 0.0, TAU)),
            end_rotation: Span::new(Vec3::ZERO, Vec3::new(0.0, 0.0, TAU)),
            gravity: Vec3::new(0.0, -2.0, 0.0),
            fade_in_ratio: 0.1,
            fade_out_ratio: 0.7,
        }
    }
}

/// Everything the particle engine is initialized with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSetup {
    /// Ranges new groups start with.
    pub emission: EmissionRanges,
    pub ring_outer_radius: f32,
    pub ring_inner_radius: f32,
    pub cylinder_radius: f32,
    pub cylinder_height: f32,
    /// Fixed RNG seed for reproducible runs. Random when absent.
    pub seed: Option<u64>,
}

impl Default for ParticleSetup {
    fn default() -> Self {
        let shapes = ShapeParams::default();
        Self {
            emission: EmissionRanges::default(),
            ring_outer_radius: shapes.ring_outer_radius,
            ring_inner_radius: shapes.ring_inner_radius,
            cylinder_radius: shapes.cylinder_radius,
            cylinder_height: shapes.cylinder_height,
            seed: None,
        }
    }
}

impl ParticleSetup {
    pub fn shape_params(&self) -> ShapeParams {
        ShapeParams {
            ring_outer_radius: self.ring_outer_radius,
            ring_inner_radius: self.ring_inner_radius,
            cylinder_radius: self.cylinder_radius,
            cylinder_height: self.cylinder_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn samples_stay_inside_span() {
        let mut rng = StdRng::seed_from_u64(3);
        let span = Span::new(Vec3::new(-1.0, 2.0, 5.0), Vec3::new(1.0, 4.0, 5.0));
        for _ in 0..200 {
            let v = span.sample(&mut rng);
            assert!(v.x >= -1.0 && v.x <= 1.0);
            assert!(v.y >= 2.0 && v.y <= 4.0);
            assert_eq!(v.z, 5.0);
        }
    }

    #[test]
    fn setup_reads_partial_ron() {
        let setup: ParticleSetup = ron::from_str("(ring_outer_radius: 3.0, seed: Some(9))").unwrap();
        assert_eq!(setup.ring_outer_radius, 3.0);
        assert_eq!(setup.seed, Some(9));
        assert_eq!(setup.emission, EmissionRanges::default());
    }
}
