//! Chase camera that follows an aircraft every tick.
//!
//! Two modes: full follow (position from a local offset rotated by the aircraft) and
//! fixed position (position pinned, rotation still looks at the aircraft). While the
//! aircraft is crashing, pitch and yaw are frozen and only roll creeps toward the
//! aircraft's roll.

use crate::config::FollowCameraConfig;
use engine_core::{euler, lerp_vec3, smooth_damp, tick_blend, TargetSnapshot, Tracked, FIXED_DT};
use glam::Vec3;
use hecs::{Entity, World};
use renderer::{Camera, CameraRegistry};

/// Share of the remaining roll error closed per tick while crash-locked.
const CRASH_ROLL_CREEP: f32 = 0.3;

/// Smallest allowed smoothing factor.
const MIN_SMOOTHNESS: f32 = 0.001;

/// How the camera position closes on its target in full-follow mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionSmoothing {
    /// Per-axis blend by `position_smoothness` each tick.
    Lerp,
    /// Critically damped spring with the given smoothing time in seconds.
    Spring { smooth_time: f32 },
}

pub struct FollowCamera {
    camera: Option<String>,
    target: Option<Entity>,
    offset: Vec3,

    current_position: Vec3,
    current_rotation: Vec3,
    target_position: Vec3,
    target_rotation: Vec3,
    /// Spring velocity, only used with [`PositionSmoothing::Spring`].
    velocity: Vec3,

    fixed_position_mode: bool,
    fixed_position: Vec3,

    smoothing: PositionSmoothing,
    position_smoothness: f32,
    rotation_smoothness: f32,
    crash_rotation_smoothness: f32,
    crash_limit: bool,
}

impl FollowCamera {
    pub fn new(config: &FollowCameraConfig) -> Self {
        let mut rig = Self {
            camera: None,
            target: None,
            offset: config.offset,
            current_position: Vec3::ZERO,
            current_rotation: Vec3::ZERO,
            target_position: Vec3::ZERO,
            target_rotation: Vec3::ZERO,
            velocity: Vec3::ZERO,
            fixed_position_mode: false,
            fixed_position: Vec3::ZERO,
            smoothing: PositionSmoothing::Lerp,
            position_smoothness: 1.0,
            rotation_smoothness: 1.0,
            crash_rotation_smoothness: 1.0,
            crash_limit: config.crash_limit,
        };
        rig.set_smoothness(config.position_smoothness, config.rotation_smoothness);
        rig.set_crash_smoothness(config.crash_rotation_smoothness);
        rig
    }

    /// Bind to a named camera and start from wherever that camera is now.
    pub fn initialize(&mut self, camera: &str, cameras: &CameraRegistry) {
        self.camera = Some(camera.to_string());
        if let Some(cam) = cameras.get(camera) {
            self.reseat(cam.position(), cam.rotation());
        }
        log::info!("Follow camera bound to {:?}", camera);
    }

    /// Change the followed entity. Smoothing state carries over.
    pub fn set_target(&mut self, target: Option<Entity>) {
        self.target = target;
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn set_offset(&mut self, offset: Vec3) {
        self.offset = offset;
    }

    /// Set per-tick blend factors, clamped to (0, 1]. The crash factor is pulled down to
    /// stay at or below the rotation factor.
    pub fn set_smoothness(&mut self, position: f32, rotation: f32) {
        self.position_smoothness = position.clamp(MIN_SMOOTHNESS, 1.0);
        self.rotation_smoothness = rotation.clamp(MIN_SMOOTHNESS, 1.0);
        self.crash_rotation_smoothness = self.crash_rotation_smoothness.min(self.rotation_smoothness);
    }

    pub fn set_crash_smoothness(&mut self, crash_rotation: f32) {
        self.crash_rotation_smoothness = crash_rotation.clamp(MIN_SMOOTHNESS, self.rotation_smoothness);
    }

    pub fn set_crash_limit(&mut self, enabled: bool) {
        self.crash_limit = enabled;
    }

    pub fn set_position_smoothing(&mut self, smoothing: PositionSmoothing) {
        self.smoothing = smoothing;
    }

    pub fn set_fixed_position_mode(&mut self, enabled: bool) {
        self.fixed_position_mode = enabled;
    }

    /// Pin the camera at `position` and switch to fixed mode.
    pub fn set_fixed_position(&mut self, position: Vec3) {
        self.fixed_position = position;
        self.fixed_position_mode = true;
    }

    /// Jump straight to a pose, dropping spring velocity.
    pub fn reseat(&mut self, position: Vec3, rotation: Vec3) {
        self.current_position = position;
        self.target_position = position;
        self.current_rotation = rotation;
        self.target_rotation = rotation;
        self.velocity = Vec3::ZERO;
    }

    pub fn current_position(&self) -> Vec3 {
        self.current_position
    }

    pub fn current_rotation(&self) -> Vec3 {
        self.current_rotation
    }

    pub fn target_position(&self) -> Vec3 {
        self.target_position
    }

    pub fn target_rotation(&self) -> Vec3 {
        self.target_rotation
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed_position_mode
    }

    /// Fixed tick. Does nothing unless both the camera and the target resolve.
    pub fn update(&mut self, dt: f32, world: &World, cameras: &mut CameraRegistry) {
        let Some(target) = self.target.and_then(|e| TargetSnapshot::from_world(world, e)) else {
            return;
        };
        let Some(camera) = self.camera.as_deref().and_then(|name| cameras.get_mut(name)) else {
            return;
        };
        self.advance(dt, &target, camera);
    }

    /// Move one tick toward `target` and write the result into `camera`.
    pub fn advance(&mut self, dt: f32, target: &impl Tracked, camera: &mut Camera) {
        let entity_position = target.position();
        let entity_rotation = target.rotation();

        self.target_position = if self.fixed_position_mode {
            self.fixed_position
        } else {
            entity_position + euler::rotate_direction(self.offset, entity_rotation)
        };

        let crash_locked = self.crash_limit && target.is_crashing();
        if crash_locked {
            let creep = tick_blend(CRASH_ROLL_CREEP, dt, FIXED_DT);
            self.target_rotation.x = self.current_rotation.x;
            self.target_rotation.y = self.current_rotation.y;
            self.target_rotation.z =
                self.current_rotation.z + (entity_rotation.z - self.current_rotation.z) * creep;
        } else {
            let to_entity = entity_position - self.target_position;
            if to_entity.length_squared() > f32::EPSILON {
                let (pitch, yaw) = euler::look_angles_asin(to_entity.normalize());
                self.target_rotation = Vec3::new(pitch, yaw, entity_rotation.z);
            } else {
                self.target_rotation.z = entity_rotation.z;
            }
        }

        if self.fixed_position_mode {
            self.current_position = self.target_position;
        } else {
            match self.smoothing {
                PositionSmoothing::Lerp => {
                    let t = tick_blend(self.position_smoothness, dt, FIXED_DT);
                    self.current_position = lerp_vec3(self.current_position, self.target_position, t);
                }
                PositionSmoothing::Spring { smooth_time } => {
                    let (position, velocity) =
                        smooth_damp(self.current_position, self.target_position, self.velocity, smooth_time, dt);
                    self.current_position = position;
                    self.velocity = velocity;
                }
            }
        }

        let rotation_smoothness = if crash_locked {
            self.crash_rotation_smoothness
        } else {
            self.rotation_smoothness
        };
        let t = tick_blend(rotation_smoothness, dt, FIXED_DT);
        self.current_rotation = lerp_vec3(self.current_rotation, self.target_rotation, t);

        camera.transform.translate = self.current_position;
        camera.transform.rotate = self.current_rotation;
    }
}
