//! Particle engine: named groups of short-lived particles drawn with one instanced call
//! per group.
//!
//! Each group owns its live particles and a fixed-capacity instance array that is filled
//! by [`ParticleEngine::update`] and emptied by [`ParticleEngine::draw`]. Particles past
//! the capacity keep simulating but are not drawn that frame.

mod setup;

pub use setup::{EmissionRanges, ParticleSetup, Sample, Span};

use engine_core::{euler, lerp_vec3, Transform};
use glam::{Mat4, Vec3, Vec4};
use rand::{rngs::StdRng, SeedableRng};
use renderer::{
    Camera, InstanceSink, InstancedDraw, ParticleInstance, ParticleShape, ShapeBuffer, ShapeRange,
    TextureCache, TextureError, TextureInfo,
};
use std::collections::HashMap;

/// Instance capacity of every particle group.
pub const MAX_INSTANCES: usize = 1024;

/// Shortest lifetime a particle can be given, keeps the life ratio finite.
const MIN_LIFE_TIME: f32 = 1e-3;

#[derive(Debug, thiserror::Error)]
pub enum ParticleError {
    #[error("particle group {0:?} already exists")]
    DuplicateName(String),
    #[error("particle group {0:?} does not exist")]
    NotFound(String),
    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// A single particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub transform: Transform,
    pub velocity: Vec3,
    pub color: Vec4,
    /// Seconds the particle lives.
    pub life_time: f32,
    /// Seconds since spawn.
    pub current_time: f32,
    pub initial_scale: Vec3,
    pub end_scale: Vec3,
    pub initial_rotation: Vec3,
    pub end_rotation: Vec3,
}

impl Particle {
    fn spawn<R: rand::Rng + ?Sized>(ranges: &EmissionRanges, position: Vec3, rng: &mut R) -> Self {
        let initial_scale = ranges.initial_scale.sample(rng);
        let initial_rotation = ranges.initial_rotation.sample(rng);
        Self {
            transform: Transform {
                scale: initial_scale,
                rotate: initial_rotation,
                translate: position + ranges.position_jitter.sample(rng),
            },
            velocity: ranges.velocity.sample(rng),
            color: ranges.color.sample(rng),
            life_time: ranges.life_time.sample(rng).max(MIN_LIFE_TIME),
            current_time: 0.0,
            initial_scale,
            end_scale: ranges.end_scale.sample(rng),
            initial_rotation,
            end_rotation: ranges.end_rotation.sample(rng),
        }
    }
}

/// Index of a group in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupHandle(usize);

/// Particles sharing a shape and a texture.
#[derive(Debug)]
pub struct ParticleGroup {
    name: String,
    shape: ParticleShape,
    texture: TextureInfo,
    range: ShapeRange,
    billboard: bool,
    ranges: EmissionRanges,
    particles: Vec<Particle>,
    instances: Vec<ParticleInstance>,
}

impl ParticleGroup {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> ParticleShape {
        self.shape
    }

    pub fn texture(&self) -> TextureInfo {
        self.texture
    }

    pub fn billboard(&self) -> bool {
        self.billboard
    }

    pub fn ranges(&self) -> &EmissionRanges {
        &self.ranges
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Instances packed since the last draw.
    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

/// Owner of every particle group.
pub struct ParticleEngine {
    setup: ParticleSetup,
    shapes: ShapeBuffer,
    groups: Vec<ParticleGroup>,
    by_name: HashMap<String, usize>,
    rng: StdRng,
}

impl ParticleEngine {
    /// Build the shared shape buffer and seed the RNG.
    pub fn new(setup: ParticleSetup) -> Self {
        let shapes = ShapeBuffer::build(&setup.shape_params());
        let rng = match setup.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            setup,
            shapes,
            groups: Vec::new(),
            by_name: HashMap::new(),
            rng,
        }
    }

    pub fn setup(&self) -> &ParticleSetup {
        &self.setup
    }

    /// Geometry every group draws from; upload once.
    pub fn shapes(&self) -> &ShapeBuffer {
        &self.shapes
    }

    /// Register a new group. Names are unique.
    pub fn create_group<T: TextureCache + ?Sized>(
        &mut self,
        name: &str,
        texture: &str,
        shape: ParticleShape,
        textures: &mut T,
    ) -> Result<GroupHandle, ParticleError> {
        if self.by_name.contains_key(name) {
            return Err(ParticleError::DuplicateName(name.to_string()));
        }
        let texture = textures.load(texture)?;
        let index = self.groups.len();
        self.groups.push(ParticleGroup {
            name: name.to_string(),
            shape,
            texture,
            range: self.shapes.range(shape),
            billboard: shape == ParticleShape::Board,
            ranges: self.setup.emission.clone(),
            particles: Vec::new(),
            instances: Vec::with_capacity(MAX_INSTANCES),
        });
        self.by_name.insert(name.to_string(), index);
        log::info!("Created particle group {:?} ({:?}, texture slot {})", name, shape, texture.index);
        Ok(GroupHandle(index))
    }

    fn group_mut(&mut self, name: &str) -> Result<&mut ParticleGroup, ParticleError> {
        let index = *self
            .by_name
            .get(name)
            .ok_or_else(|| ParticleError::NotFound(name.to_string()))?;
        Ok(&mut self.groups[index])
    }

    /// Turn camera-facing orientation on or off for a group.
    pub fn set_billboard(&mut self, name: &str, enabled: bool) -> Result<(), ParticleError> {
        self.group_mut(name)?.billboard = enabled;
        Ok(())
    }

    /// Replace the ranges future particles of a group are drawn from.
    pub fn set_group_ranges(&mut self, name: &str, ranges: EmissionRanges) -> Result<(), ParticleError> {
        self.group_mut(name)?.ranges = ranges;
        Ok(())
    }

    /// Top the group up to `count` live particles around `position`.
    ///
    /// Does nothing when the group already holds `count` or more. Returns how many
    /// particles were spawned.
    pub fn emit(&mut self, name: &str, position: Vec3, count: usize) -> Result<usize, ParticleError> {
        let index = *self
            .by_name
            .get(name)
            .ok_or_else(|| ParticleError::NotFound(name.to_string()))?;
        let group = &mut self.groups[index];
        let live = group.particles.len();
        if live >= count {
            return Ok(0);
        }
        let rng = &mut self.rng;
        let spawned = count - live;
        group
            .particles
            .extend((0..spawned).map(|_| Particle::spawn(&group.ranges, position, rng)));
        Ok(spawned)
    }

    /// Advance every particle by `dt` and pack the visible ones for drawing from `camera`.
    pub fn update(&mut self, dt: f32, camera: &Camera) {
        let view_projection = camera.view_projection_matrix();
        let billboard = euler::billboard(camera.rotation());

        for group in &mut self.groups {
            let ParticleGroup {
                particles,
                instances,
                ranges,
                billboard: use_billboard,
                ..
            } = group;
            let facing = use_billboard.then_some(billboard);

            particles.retain_mut(|p| {
                if p.current_time > p.life_time {
                    return false;
                }
                let ratio = p.current_time / p.life_time;
                p.transform.scale = lerp_vec3(p.initial_scale, p.end_scale, ratio);
                p.transform.rotate = lerp_vec3(p.initial_rotation, p.end_rotation, ratio);
                p.velocity += ranges.gravity * dt;
                p.transform.translate += p.velocity * dt;
                p.current_time += dt;

                if instances.len() < MAX_INSTANCES {
                    let world = world_matrix(&p.transform, facing);
                    let alpha = (p.color.w * fade_alpha(ratio, ranges.fade_in_ratio, ranges.fade_out_ratio))
                        .clamp(0.0, 1.0);
                    instances.push(ParticleInstance::new(
                        view_projection * world,
                        world,
                        p.color.truncate().extend(alpha),
                    ));
                }
                true
            });
        }
    }

    /// One instanced draw per group with packed instances, in creation order. Empties the
    /// instance arrays.
    pub fn draw<S: InstanceSink + ?Sized>(&mut self, sink: &mut S) {
        for group in &mut self.groups {
            if group.instances.is_empty() {
                continue;
            }
            sink.draw_instanced(InstancedDraw {
                first_vertex: group.range.offset,
                vertex_count: group.range.count,
                texture: group.texture.index,
                instances: &group.instances,
            });
            group.instances.clear();
        }
    }

    pub fn group(&self, name: &str) -> Option<&ParticleGroup> {
        self.by_name.get(name).map(|&i| &self.groups[i])
    }

    pub fn group_by_handle(&self, handle: GroupHandle) -> Option<&ParticleGroup> {
        self.groups.get(handle.0)
    }

    pub fn groups(&self) -> impl Iterator<Item = &ParticleGroup> {
        self.groups.iter()
    }

    pub fn live_count(&self, name: &str) -> Option<usize> {
        self.group(name).map(|g| g.particles.len())
    }

    pub fn instance_count(&self, name: &str) -> Option<usize> {
        self.group(name).map(|g| g.instances.len())
    }

    pub fn total_live(&self) -> usize {
        self.groups.iter().map(|g| g.particles.len()).sum()
    }

    /// Drop every live particle and pending instance; groups stay registered.
    pub fn clear(&mut self) {
        for group in &mut self.groups {
            group.particles.clear();
            group.instances.clear();
        }
    }
}

/// Alpha envelope over a particle's life: ramp in until `fade_in`, hold, ramp out after
/// `fade_out`.
pub fn fade_alpha(ratio: f32, fade_in: f32, fade_out: f32) -> f32 {
    let alpha = if ratio < fade_in {
        ratio / fade_in
    } else if ratio > fade_out && fade_out < 1.0 {
        (1.0 - ratio) / (1.0 - fade_out)
    } else {
        1.0
    };
    alpha.clamp(0.0, 1.0)
}

fn world_matrix(transform: &Transform, billboard: Option<Mat4>) -> Mat4 {
    match billboard {
        Some(facing) => {
            Mat4::from_translation(transform.translate)
                * facing
                * euler::rotation_matrix(transform.rotate)
                * Mat4::from_scale(transform.scale)
        }
        None => transform.to_matrix(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::{DrawLog, TextureIndex};

    const DT: f32 = 1.0 / 60.0;

    fn engine() -> (ParticleEngine, TextureIndex) {
        let setup = ParticleSetup {
            seed: Some(42),
            ..Default::default()
        };
        let mut textures = TextureIndex::new();
        textures.register("smoke.png", 64, 64);
        textures.register("spark.png", 32, 32);
        textures.register("ring.png", 128, 128);
        (ParticleEngine::new(setup), textures)
    }

    #[test]
    fn duplicate_group_name_is_rejected() {
        let (mut engine, mut textures) = engine();
        engine.create_group("Test", "smoke.png", ParticleShape::Board, &mut textures).unwrap();
        let err = engine
            .create_group("Test", "spark.png", ParticleShape::Ring, &mut textures)
            .unwrap_err();
        assert!(matches!(err, ParticleError::DuplicateName(ref n) if n == "Test"));
    }

    #[test]
    fn emit_into_missing_group_is_rejected() {
        let (mut engine, _) = engine();
        assert!(matches!(engine.emit("Nope", Vec3::ZERO, 5), Err(ParticleError::NotFound(_))));
    }

    #[test]
    fn missing_texture_fails_group_creation() {
        let (mut engine, mut textures) = engine();
        let err = engine
            .create_group("Test", "missing.png", ParticleShape::Board, &mut textures)
            .unwrap_err();
        assert!(matches!(err, ParticleError::Texture(_)));
        assert!(engine.group("Test").is_none());
    }

    #[test]
    fn emit_fills_empty_group_then_ages_one_tick() {
        let (mut engine, mut textures) = engine();
        engine.create_group("Test", "smoke.png", ParticleShape::Board, &mut textures).unwrap();
        assert_eq!(engine.emit("Test", Vec3::ZERO, 50).unwrap(), 50);
        let group = engine.group("Test").unwrap();
        assert_eq!(group.particles().len(), 50);
        assert!(group.particles().iter().all(|p| p.current_time == 0.0));

        engine.update(DT, &Camera::default());
        let group = engine.group("Test").unwrap();
        assert_eq!(group.particles().len(), 50);
        assert!(group.particles().iter().all(|p| (p.current_time - DT).abs() < 1e-6));
    }

    #[test]
    fn emit_is_noop_when_saturated() {
        let (mut engine, mut textures) = engine();
        engine.create_group("Test", "smoke.png", ParticleShape::Board, &mut textures).unwrap();
        engine.emit("Test", Vec3::ZERO, 10).unwrap();
        let before = engine.group("Test").unwrap().particles().to_vec();

        assert_eq!(engine.emit("Test", Vec3::new(5.0, 0.0, 0.0), 10).unwrap(), 0);
        assert_eq!(engine.emit("Test", Vec3::new(5.0, 0.0, 0.0), 3).unwrap(), 0);
        assert_eq!(engine.group("Test").unwrap().particles(), before.as_slice());

        assert_eq!(engine.emit("Test", Vec3::ZERO, 12).unwrap(), 2);
        assert_eq!(engine.live_count("Test"), Some(12));
    }

    #[test]
    fn particles_retire_after_lifetime() {
        let (mut engine, mut textures) = engine();
        engine.create_group("Test", "smoke.png", ParticleShape::Board, &mut textures).unwrap();
        engine
            .set_group_ranges(
                "Test",
                EmissionRanges {
                    life_time: Span::fixed(0.1),
                    ..Default::default()
                },
            )
            .unwrap();
        engine.emit("Test", Vec3::ZERO, 1).unwrap();

        let camera = Camera::default();
        for _ in 0..20 {
            let p = engine.group("Test").unwrap().particles()[0].clone();
            let expired = p.current_time > p.life_time;
            engine.update(DT, &camera);
            let group = engine.group("Test").unwrap();
            if expired {
                assert!(group.particles().is_empty());
                return;
            }
            assert!(p.current_time / p.life_time <= 1.0);
            assert!(group.particles()[0].current_time > p.current_time);
        }
        panic!("particle never retired");
    }

    #[test]
    fn scale_and_rotation_follow_life_ratio() {
        let (mut engine, mut textures) = engine();
        engine.create_group("Test", "ring.png", ParticleShape::Ring, &mut textures).unwrap();
        engine
            .set_group_ranges(
                "Test",
                EmissionRanges {
                    life_time: Span::fixed(1.0),
                    initial_scale: Span::fixed(Vec3::ONE),
                    end_scale: Span::fixed(Vec3::splat(3.0)),
                    initial_rotation: Span::fixed(Vec3::ZERO),
                    end_rotation: Span::fixed(Vec3::new(0.0, 0.0, 2.0)),
                    gravity: Vec3::ZERO,
                    velocity: Span::fixed(Vec3::ZERO),
                    ..Default::default()
                },
            )
            .unwrap();
        engine.emit("Test", Vec3::ZERO, 1).unwrap();
        let camera = Camera::default();
        for _ in 0..31 {
            engine.update(DT, &camera);
        }
        // Last update interpolated at ratio 30/60.
        let p = &engine.group("Test").unwrap().particles()[0];
        assert!(p.transform.scale.abs_diff_eq(Vec3::splat(2.0), 1e-4));
        assert!((p.transform.rotate.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn gravity_integrates_velocity_then_position() {
        let (mut engine, mut textures) = engine();
        engine.create_group("Test", "smoke.png", ParticleShape::Board, &mut textures).unwrap();
        engine
            .set_group_ranges(
                "Test",
                EmissionRanges {
                    position_jitter: Span::fixed(Vec3::ZERO),
                    velocity: Span::fixed(Vec3::ZERO),
                    gravity: Vec3::new(0.0, -6.0, 0.0),
                    life_time: Span::fixed(5.0),
                    ..Default::default()
                },
            )
            .unwrap();
        engine.emit("Test", Vec3::ZERO, 1).unwrap();
        engine.update(0.5, &Camera::default());
        let p = &engine.group("Test").unwrap().particles()[0];
        assert!((p.velocity.y + 3.0).abs() < 1e-5);
        assert!((p.transform.translate.y + 1.5).abs() < 1e-5);
    }

    #[test]
    fn instances_are_capped_and_cleared_by_draw() {
        let (mut engine, mut textures) = engine();
        engine.create_group("Test", "smoke.png", ParticleShape::Board, &mut textures).unwrap();
        engine.emit("Test", Vec3::ZERO, MAX_INSTANCES + 476).unwrap();
        engine.update(DT, &Camera::default());
        assert_eq!(engine.live_count("Test"), Some(MAX_INSTANCES + 476));
        assert_eq!(engine.instance_count("Test"), Some(MAX_INSTANCES));

        // A second update without a draw still cannot exceed the capacity.
        engine.update(DT, &Camera::default());
        assert_eq!(engine.instance_count("Test"), Some(MAX_INSTANCES));

        let mut log = DrawLog::new();
        engine.draw(&mut log);
        assert_eq!(log.draws.len(), 1);
        assert_eq!(log.draws[0].instances.len(), MAX_INSTANCES);
        assert_eq!(engine.instance_count("Test"), Some(0));
    }

    #[test]
    fn draw_follows_creation_order_and_skips_empty_groups() {
        let (mut engine, mut textures) = engine();
        engine.create_group("A", "smoke.png", ParticleShape::Board, &mut textures).unwrap();
        engine.create_group("B", "spark.png", ParticleShape::Ring, &mut textures).unwrap();
        engine.create_group("C", "ring.png", ParticleShape::Cylinder, &mut textures).unwrap();
        engine.emit("C", Vec3::ZERO, 3).unwrap();
        engine.emit("A", Vec3::ZERO, 2).unwrap();
        engine.update(DT, &Camera::default());

        let mut log = DrawLog::new();
        engine.draw(&mut log);
        assert_eq!(log.draws.len(), 2);
        assert_eq!(log.draws[0].texture, 0);
        assert_eq!(log.draws[0].instances.len(), 2);
        assert_eq!(log.draws[1].texture, 2);
        let cylinder = engine.shapes().range(ParticleShape::Cylinder);
        assert_eq!(log.draws[1].first_vertex, cylinder.offset);
        assert_eq!(log.draws[1].vertex_count, cylinder.count);
    }

    #[test]
    fn billboard_cancels_camera_rotation() {
        let (mut engine, mut textures) = engine();
        engine.create_group("Test", "smoke.png", ParticleShape::Board, &mut textures).unwrap();
        engine
            .set_group_ranges(
                "Test",
                EmissionRanges {
                    initial_scale: Span::fixed(Vec3::ONE),
                    end_scale: Span::fixed(Vec3::ONE),
                    initial_rotation: Span::fixed(Vec3::ZERO),
                    end_rotation: Span::fixed(Vec3::ZERO),
                    ..Default::default()
                },
            )
            .unwrap();
        engine.emit("Test", Vec3::new(0.0, 0.0, 10.0), 1).unwrap();

        let mut camera = Camera::default();
        camera.transform.rotate = Vec3::new(0.3, 1.0, 0.0);
        engine.update(DT, &camera);

        let world = Mat4::from_cols_array_2d(&engine.group("Test").unwrap().instances()[0].world);
        let in_view = camera.view_matrix() * world;
        assert!(in_view.transform_vector3(Vec3::Z).abs_diff_eq(Vec3::Z, 1e-5));
        assert!(in_view.transform_vector3(Vec3::X).abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn fade_envelope() {
        assert_eq!(fade_alpha(0.0, 0.1, 0.7), 0.0);
        assert!((fade_alpha(0.05, 0.1, 0.7) - 0.5).abs() < 1e-6);
        assert_eq!(fade_alpha(0.5, 0.1, 0.7), 1.0);
        assert!((fade_alpha(0.85, 0.1, 0.7) - 0.5).abs() < 1e-5);
        assert_eq!(fade_alpha(1.0, 0.1, 0.7), 0.0);
        assert_eq!(fade_alpha(0.0, 0.0, 1.0), 1.0);
    }

    #[test]
    fn clear_keeps_groups() {
        let (mut engine, mut textures) = engine();
        engine.create_group("Test", "smoke.png", ParticleShape::Board, &mut textures).unwrap();
        engine.emit("Test", Vec3::ZERO, 4).unwrap();
        engine.clear();
        assert_eq!(engine.live_count("Test"), Some(0));
        assert_eq!(engine.total_live(), 0);
    }
}
