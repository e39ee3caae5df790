//! Cinematic title camera: a scripted four-phase sequence around the hero aircraft.
//!
//! `Opening` sweeps in along a Bezier curve, `HeroShot` does a low pass and a close-up,
//! `TitleDisplay` pulls back to leave room for the logo, and `Loop` orbits forever.
//! Phases hand over through an eased transition between snapshot poses.

use engine_core::{
    cubic_bezier, ease_in, ease_in_cubic, ease_in_out, ease_out, euler, lerp, lerp_vec3, smooth_damp,
    TargetSnapshot, Tracked,
};
use glam::Vec3;
use hecs::{Entity, World};
use renderer::{Camera, CameraRegistry};
use std::f32::consts::TAU;

pub const OPENING_DURATION: f32 = 4.0;
pub const HERO_SHOT_DURATION: f32 = 5.0;
pub const TITLE_DISPLAY_DURATION: f32 = 4.0;
pub const TRANSITION_DURATION: f32 = 1.5;

/// Share of the hero shot spent on the low pass before the close-up.
const HERO_SHOT_SPLIT: f32 = 0.4;

/// Spring smoothing time that the per-phase multipliers scale.
const BASE_SMOOTH_TIME: f32 = 0.5;

pub const LOOP_RADIUS: f32 = 30.0;
pub const LOOP_HEIGHT: f32 = 8.0;
/// Orbit speed in radians per second.
pub const LOOP_ANGULAR_SPEED: f32 = 0.25;
const LOOP_BOB_AMPLITUDE: f32 = 3.0;
/// Altitude oscillations per second.
const LOOP_BOB_FREQUENCY: f32 = 0.1;
pub const LOOP_EXPOSURE_PULSE: f32 = 0.08;
/// Exposure pulses per second.
const LOOP_EXPOSURE_FREQUENCY: f32 = 0.25;

/// Below this length the look direction is ignored for the tick.
const MIN_LOOK_LENGTH: f32 = 1e-4;

// Opening sweep control points, relative to the aircraft.
const OPENING_P0: Vec3 = Vec3::new(40.0, 25.0, 60.0);
const OPENING_P1: Vec3 = Vec3::new(50.0, 15.0, 10.0);
const OPENING_P2: Vec3 = Vec3::new(25.0, 6.0, -30.0);
const OPENING_P3: Vec3 = Vec3::new(8.0, 3.0, -22.0);

const HERO_PASS_END: Vec3 = Vec3::new(-6.0, 1.0, 10.0);
const HERO_CLOSE_UP: Vec3 = Vec3::new(0.0, 2.0, 18.0);
const TITLE_PULL_BACK: Vec3 = Vec3::new(0.0, 6.0, 28.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TitlePhase {
    Opening,
    HeroShot,
    TitleDisplay,
    Loop,
}

impl TitlePhase {
    /// Seconds before the phase hands over. `Loop` never does.
    pub fn duration(self) -> Option<f32> {
        match self {
            TitlePhase::Opening => Some(OPENING_DURATION),
            TitlePhase::HeroShot => Some(HERO_SHOT_DURATION),
            TitlePhase::TitleDisplay => Some(TITLE_DISPLAY_DURATION),
            TitlePhase::Loop => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            TitlePhase::Opening => TitlePhase::HeroShot,
            TitlePhase::HeroShot => TitlePhase::TitleDisplay,
            TitlePhase::TitleDisplay | TitlePhase::Loop => TitlePhase::Loop,
        }
    }
}

/// Desired camera state for one tick of a phase.
#[derive(Debug, Clone, Copy)]
struct Shot {
    position: Vec3,
    look_target: Vec3,
    smooth_time: f32,
    exposure: f32,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    timer: f32,
    start_position: Vec3,
    start_target: Vec3,
    start_exposure: f32,
    end_position: Vec3,
    end_target: Vec3,
    end_exposure: f32,
}

pub struct TitleCamera {
    camera: Option<String>,
    target: Option<Entity>,

    phase: TitlePhase,
    phase_timer: f32,
    transition: Option<Transition>,

    position: Vec3,
    look_target: Vec3,
    position_velocity: Vec3,
    target_velocity: Vec3,
    rotation: Vec3,
    exposure: f32,

    loop_angle: f32,
    loop_time: f32,
}

impl Default for TitleCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl TitleCamera {
    pub fn new() -> Self {
        Self {
            camera: None,
            target: None,
            phase: TitlePhase::Opening,
            phase_timer: 0.0,
            transition: None,
            position: OPENING_P0,
            look_target: Vec3::ZERO,
            position_velocity: Vec3::ZERO,
            target_velocity: Vec3::ZERO,
            rotation: Vec3::ZERO,
            exposure: 1.0,
            loop_angle: 0.0,
            loop_time: 0.0,
        }
    }

    /// Bind to a named camera and start from its current pose.
    pub fn initialize(&mut self, camera: &str, cameras: &CameraRegistry) {
        self.camera = Some(camera.to_string());
        if let Some(cam) = cameras.get(camera) {
            self.position = cam.position();
            self.look_target = cam.position() + cam.forward() * 10.0;
            self.rotation = cam.rotation();
            self.exposure = cam.exposure;
        }
        log::info!("Title camera bound to {:?}", camera);
    }

    pub fn set_target(&mut self, target: Option<Entity>) {
        self.target = target;
    }

    /// Place the camera and its look target directly, dropping spring velocity.
    pub fn place(&mut self, position: Vec3, look_target: Vec3) {
        self.position = position;
        self.look_target = look_target;
        self.position_velocity = Vec3::ZERO;
        self.target_velocity = Vec3::ZERO;
    }

    /// Back to the start of `Opening`. Position and rotation are left alone.
    pub fn reset(&mut self) {
        self.phase = TitlePhase::Opening;
        self.phase_timer = 0.0;
        self.transition = None;
        self.loop_angle = 0.0;
        self.loop_time = 0.0;
        log::debug!("Title camera reset");
    }

    pub fn phase(&self) -> TitlePhase {
        self.phase
    }

    pub fn phase_timer(&self) -> f32 {
        self.phase_timer
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look_target(&self) -> Vec3 {
        self.look_target
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn exposure(&self) -> f32 {
        self.exposure
    }

    /// Seconds spent orbiting in `Loop`.
    pub fn loop_time(&self) -> f32 {
        self.loop_time
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

    pub fn advance(&mut self, dt: f32, target: &impl Tracked, camera: &mut Camera) {
        let anchor = target.position();

        if let Some(mut transition) = self.transition {
            transition.timer += dt;
            let t = (transition.timer / TRANSITION_DURATION).clamp(0.0, 1.0);
            let eased = ease_in_out(t);
            self.position = lerp_vec3(transition.start_position, transition.end_position, eased);
            self.look_target = lerp_vec3(transition.start_target, transition.end_target, eased);
            self.exposure = lerp(transition.start_exposure, transition.end_exposure, eased);
            if t >= 1.0 {
                self.transition = None;
                self.phase_timer = 0.0;
                self.position_velocity = Vec3::ZERO;
                self.target_velocity = Vec3::ZERO;
                log::debug!("Title camera settled into {:?}", self.phase);
            } else {
                self.transition = Some(transition);
            }
        } else {
            self.phase_timer += dt;
            match self.phase.duration() {
                Some(duration) if self.phase_timer > duration => {
                    self.begin_transition(self.phase.next(), anchor);
                }
                _ => self.update_phase(dt, anchor),
            }
        }

        self.write_camera(camera);
    }

    /// Snapshot the current pose and head for the entry pose of `next`.
    fn begin_transition(&mut self, next: TitlePhase, anchor: Vec3) {
        let entry = self.shot(next, 0.0, anchor);
        self.transition = Some(Transition {
            timer: 0.0,
            start_position: self.position,
            start_target: self.look_target,
            start_exposure: self.exposure,
            end_position: entry.position,
            end_target: entry.look_target,
            end_exposure: entry.exposure,
        });
        log::debug!("Title camera {:?} -> {:?}", self.phase, next);
        self.phase = next;
        self.phase_timer = 0.0;
    }

    fn update_phase(&mut self, dt: f32, anchor: Vec3) {
        if self.phase == TitlePhase::Loop {
            self.loop_time += dt;
            self.loop_angle = (self.loop_angle + LOOP_ANGULAR_SPEED * dt).rem_euclid(TAU);
        }

        let ratio = match self.phase.duration() {
            Some(duration) => (self.phase_timer / duration).clamp(0.0, 1.0),
            None => 0.0,
        };
        let shot = self.shot(self.phase, ratio, anchor);

        let (position, velocity) =
            smooth_damp(self.position, shot.position, self.position_velocity, shot.smooth_time, dt);
        self.position = position;
        self.position_velocity = velocity;

        let (look_target, velocity) =
            smooth_damp(self.look_target, shot.look_target, self.target_velocity, shot.smooth_time, dt);
        self.look_target = look_target;
        self.target_velocity = velocity;

        self.exposure = shot.exposure;
    }

    /// Desired pose of `phase` at `ratio` through it (ignored for `Loop`).
    fn shot(&self, phase: TitlePhase, ratio: f32, anchor: Vec3) -> Shot {
        match phase {
            TitlePhase::Opening => {
                let t = ease_in_out(ratio);
                Shot {
                    position: anchor + cubic_bezier(OPENING_P0, OPENING_P1, OPENING_P2, OPENING_P3, t),
                    look_target: anchor + Vec3::new(0.0, 1.0, 0.0),
                    smooth_time: BASE_SMOOTH_TIME,
                    exposure: lerp(0.4, 1.0, ease_out(ratio)),
                }
            }
            TitlePhase::HeroShot if ratio < HERO_SHOT_SPLIT => {
                let sub = ratio / HERO_SHOT_SPLIT;
                Shot {
                    position: anchor + lerp_vec3(OPENING_P3, HERO_PASS_END, ease_out(sub)),
                    look_target: anchor,
                    smooth_time: BASE_SMOOTH_TIME * 0.6,
                    exposure: lerp(1.0, 1.3, ease_in(sub)),
                }
            }
            TitlePhase::HeroShot => {
                let sub = (ratio - HERO_SHOT_SPLIT) / (1.0 - HERO_SHOT_SPLIT);
                Shot {
                    position: anchor + lerp_vec3(HERO_PASS_END, HERO_CLOSE_UP, ease_in_out(sub)),
                    look_target: anchor + Vec3::new(0.0, 0.5, 0.0),
                    smooth_time: BASE_SMOOTH_TIME * 1.2,
                    exposure: lerp(1.3, 1.1, ease_out(sub)),
                }
            }
            TitlePhase::TitleDisplay => {
                let t = ease_in_out(ratio);
                Shot {
                    position: anchor + lerp_vec3(HERO_CLOSE_UP, TITLE_PULL_BACK, t),
                    look_target: anchor + Vec3::new(0.0, lerp(0.5, 3.0, ease_in_cubic(ratio)), 0.0),
                    smooth_time: BASE_SMOOTH_TIME * 1.5,
                    exposure: lerp(1.1, 1.0, t),
                }
            }
            TitlePhase::Loop => {
                let (sin, cos) = self.loop_angle.sin_cos();
                let bob = (self.loop_time * LOOP_BOB_FREQUENCY * TAU).sin() * LOOP_BOB_AMPLITUDE;
                Shot {
                    position: anchor + Vec3::new(sin * LOOP_RADIUS, LOOP_HEIGHT + bob, cos * LOOP_RADIUS),
                    look_target: anchor,
                    smooth_time: BASE_SMOOTH_TIME * 2.0,
                    exposure: 1.0
                        + LOOP_EXPOSURE_PULSE * (self.loop_time * LOOP_EXPOSURE_FREQUENCY * TAU).sin(),
                }
            }
        }
    }

    /// Look from `position` at `look_target`. A degenerate direction keeps last rotation.
    fn write_camera(&mut self, camera: &mut Camera) {
        let dir = self.look_target - self.position;
        if dir.length() >= MIN_LOOK_LENGTH {
            let (pitch, yaw) = euler::look_angles_atan(dir.normalize());
            self.rotation = Vec3::new(pitch, yaw, 0.0);
        }
        camera.transform.translate = self.position;
        camera.transform.rotate = self.rotation;
        camera.exposure = self.exposure;
    }
}
