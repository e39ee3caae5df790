//! Flight HUD: projects 2D screen-space symbology onto world-space planes.
//!
//! Camera-anchored elements sit on a plane `hud_distance` in front of the camera. Elements
//! that belong to the aircraft (boresight, roll scale) sit on a level plane in front of
//! its nose instead, so they stay glued to the aircraft while the chase camera lags.

use crate::config::HudConfig;
use engine_core::{ease_out_cubic, euler, TargetSnapshot, Tracked};
use glam::{Vec2, Vec3, Vec4};
use hecs::{Entity, World};
use renderer::{Camera, CameraRegistry, LineBatch};

/// Gravity used to express acceleration in g.
const GRAVITY: f32 = 9.81;
/// Position changes faster than this are teleports, not flight.
const MAX_TRACKED_SPEED: f32 = 500.0;

const HUD_GREEN: Vec3 = Vec3::new(0.3, 1.0, 0.4);

/// Symbology drawn by [`FlightHud`], in deploy order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudElement {
    Boresight,
    RollScale,
    PitchLadder,
    SpeedTape,
    AltitudeTape,
    HeadingTape,
    GMeter,
}

impl HudElement {
    pub const ALL: [HudElement; 7] = [
        HudElement::Boresight,
        HudElement::RollScale,
        HudElement::PitchLadder,
        HudElement::SpeedTape,
        HudElement::AltitudeTape,
        HudElement::HeadingTape,
        HudElement::GMeter,
    ];

    /// Global deploy progress at which this element starts to appear.
    pub fn deploy_start(self) -> f32 {
        match self {
            HudElement::Boresight => 0.0,
            HudElement::RollScale => 0.15,
            HudElement::PitchLadder => 0.3,
            HudElement::SpeedTape | HudElement::AltitudeTape => 0.45,
            HudElement::HeadingTape => 0.6,
            HudElement::GMeter => 0.75,
        }
    }
}

/// Reveal progress of an element given the global deploy progress. Zero or below means hidden.
pub fn element_progress(global: f32, start: f32) -> f32 {
    ((global - start) / (1.0 - start)).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeployState {
    Hidden,
    Deploying,
    Shown,
    Retracting,
}

/// Eased power-on / power-off timer.
#[derive(Debug, Clone)]
pub struct DeployAnimation {
    state: DeployState,
    timer: f32,
    duration: f32,
    progress: f32,
}

impl DeployAnimation {
    pub fn new(duration: f32) -> Self {
        Self {
            state: DeployState::Hidden,
            timer: 0.0,
            duration: duration.max(f32::EPSILON),
            progress: 0.0,
        }
    }

    /// Start deploying. A retract in progress reverses from its current progress.
    pub fn deploy(&mut self) {
        if matches!(self.state, DeployState::Hidden | DeployState::Retracting) {
            self.state = DeployState::Deploying;
            // ease_out_cubic(t) == progress
            self.timer = (1.0 - (1.0 - self.progress).cbrt()) * self.duration;
        }
    }

    /// Start retracting. A deploy in progress reverses from its current progress.
    pub fn retract(&mut self) {
        if matches!(self.state, DeployState::Shown | DeployState::Deploying) {
            self.state = DeployState::Retracting;
            // 1 - ease_out_cubic(t) == progress
            self.timer = (1.0 - self.progress.cbrt()) * self.duration;
        }
    }

    pub fn update(&mut self, dt: f32) {
        if matches!(self.state, DeployState::Hidden | DeployState::Shown) {
            return;
        }
        self.timer += dt;
        let t = (self.timer / self.duration).clamp(0.0, 1.0);
        let eased = ease_out_cubic(t);
        match self.state {
            DeployState::Deploying => {
                self.progress = eased;
                if t >= 1.0 {
                    self.state = DeployState::Shown;
                    self.progress = 1.0;
                }
            }
            DeployState::Retracting => {
                self.progress = 1.0 - eased;
                if t >= 1.0 {
                    self.state = DeployState::Hidden;
                    self.progress = 0.0;
                }
            }
            DeployState::Hidden | DeployState::Shown => {}
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, DeployState::Deploying | DeployState::Retracting)
    }
}

pub struct FlightHud {
    camera: Option<String>,
    config: HudConfig,

    player_position: Vec3,
    player_rotation: Vec3,
    player_velocity: Vec3,
    /// Consecutive position samples since the last reset.
    samples: u32,

    speed: f32,
    altitude: f32,
    heading: f32,
    g_force: f32,

    deploy: DeployAnimation,
}

impl FlightHud {
    pub fn new(config: &HudConfig) -> Self {
        Self {
            camera: None,
            config: config.clone(),
            player_position: Vec3::ZERO,
            player_rotation: Vec3::ZERO,
            player_velocity: Vec3::ZERO,
            samples: 0,
            speed: 0.0,
            altitude: 0.0,
            heading: 0.0,
            g_force: 1.0,
            deploy: DeployAnimation::new(config.deploy_duration),
        }
    }

    /// Bind to a named camera, or `None` to follow the registry's active camera.
    /// Clears cached kinematics.
    pub fn initialize(&mut self, camera: Option<&str>) {
        self.camera = camera.map(str::to_string);
        self.player_position = Vec3::ZERO;
        self.player_rotation = Vec3::ZERO;
        self.player_velocity = Vec3::ZERO;
        self.samples = 0;
        self.speed = 0.0;
        self.altitude = 0.0;
        self.heading = 0.0;
        self.g_force = 1.0;
    }

    /// Power the HUD on. Kinematics restart from the next sample.
    pub fn deploy(&mut self) {
        self.samples = 0;
        self.deploy.deploy();
    }

    pub fn retract(&mut self) {
        self.deploy.retract();
    }

    /// Whether any element is at least partly shown.
    pub fn is_visible(&self) -> bool {
        self.deploy.progress() > 0.0
    }

    pub fn deploy_progress(&self) -> f32 {
        self.deploy.progress()
    }

    pub fn element_progress(&self, element: HudElement) -> f32 {
        element_progress(self.deploy.progress(), element.deploy_start())
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn altitude(&self) -> f32 {
        self.altitude
    }

    /// Compass heading in degrees, `[0, 360)`.
    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn g_force(&self) -> f32 {
        self.g_force
    }

    pub fn player_velocity(&self) -> Vec3 {
        self.player_velocity
    }

    /// Fixed tick driven by an entity in the world. Missing entity leaves the cache alone.
    pub fn update_from_world(&mut self, dt: f32, world: &World, entity: Option<Entity>) {
        self.deploy.update(dt);
        if let Some(target) = entity.and_then(|e| TargetSnapshot::from_world(world, e)) {
            self.track(dt, &target);
        }
    }

    /// Fixed tick: advance the deploy animation and refresh kinematics from `target`.
    pub fn update(&mut self, dt: f32, target: &impl Tracked) {
        self.deploy.update(dt);
        self.track(dt, target);
    }

    fn track(&mut self, dt: f32, target: &impl Tracked) {
        let position = target.position();
        if dt <= f32::EPSILON {
            self.player_position = position;
            self.player_rotation = target.rotation();
            self.altitude = position.y;
            self.heading = wrap_degrees(self.player_rotation.y.to_degrees());
            return;
        }

        let jump = (position - self.player_position).length();
        if self.samples > 0 && jump / dt > MAX_TRACKED_SPEED {
            log::debug!("HUD target jumped {:.1} units, restarting kinematics", jump);
            self.samples = 0;
        }

        let velocity = if self.samples >= 1 {
            (position - self.player_position) / dt
        } else {
            Vec3::ZERO
        };

        // Needs two measured velocities.
        self.g_force = if self.samples >= 2 {
            let acceleration = (velocity - self.player_velocity) / dt;
            (acceleration + Vec3::Y * GRAVITY).length() / GRAVITY
        } else {
            1.0
        };

        self.player_position = position;
        self.player_rotation = target.rotation();
        self.player_velocity = velocity;
        self.samples = self.samples.saturating_add(1);

        self.speed = velocity.length();
        self.altitude = position.y;
        self.heading = wrap_degrees(self.player_rotation.y.to_degrees());
    }

    /// Camera-anchored projection of a screen point.
    pub fn screen_to_world(&self, camera: &Camera, screen: Vec2) -> Vec3 {
        let basis = euler::view_basis(camera.rotation());
        let center = camera.position() + basis.forward * self.config.hud_distance;
        let point = center + self.plane_offset(basis.right, basis.up, screen);
        self.clamp_in_front(camera, point)
    }

    /// Aircraft-anchored projection on a level plane in front of the nose.
    ///
    /// Before the first update the cached position is the origin, and this falls back to
    /// [`FlightHud::screen_to_world`].
    pub fn entity_front_to_world(&self, camera: &Camera, screen: Vec2) -> Vec3 {
        self.entity_front_to_world_with_offset(camera, screen, Vec2::ZERO)
    }

    /// Like [`FlightHud::entity_front_to_world`] with the anchor shifted by `offset`.
    pub fn entity_front_to_world_with_offset(&self, camera: &Camera, screen: Vec2, offset: Vec2) -> Vec3 {
        if self.player_position == Vec3::ZERO {
            return self.screen_to_world(camera, screen + offset);
        }
        let basis = euler::yaw_basis(self.player_rotation.y);
        let anchor = self.player_position
            + basis.forward * self.config.hud_distance
            + Vec3::Y * self.config.entity_lift
            + self.plane_offset(basis.right, basis.up, offset);
        let point = anchor + self.plane_offset(basis.right, basis.up, screen);
        self.clamp_in_front(camera, point)
    }

    fn plane_offset(&self, right: Vec3, up: Vec3, screen: Vec2) -> Vec3 {
        right * (screen.x * self.config.size_x) + up * (screen.y * self.config.size_y)
    }

    /// Points behind the camera collapse onto the HUD plane center.
    fn clamp_in_front(&self, camera: &Camera, point: Vec3) -> Vec3 {
        let forward = camera.forward();
        if (point - camera.position()).dot(forward) <= 0.0 {
            camera.position() + forward * self.config.hud_distance
        } else {
            point
        }
    }

    /// Emit line geometry for every revealed element. Nothing without a camera.
    pub fn draw(&self, cameras: &CameraRegistry, lines: &mut LineBatch) {
        let Some(camera) = cameras.resolve(self.camera.as_deref()) else {
            return;
        };
        if !self.is_visible() {
            return;
        }
        for element in HudElement::ALL {
            let progress = self.element_progress(element).min(1.0);
            if progress <= 0.0 {
                continue;
            }
            let color = HUD_GREEN.extend(progress);
            match element {
                HudElement::Boresight => self.draw_boresight(camera, progress, color, lines),
                HudElement::RollScale => self.draw_roll_scale(camera, progress, color, lines),
                HudElement::PitchLadder => self.draw_pitch_ladder(camera, progress, color, lines),
                HudElement::SpeedTape => {
                    self.draw_tape(camera, Vec2::new(-0.6, 0.0), self.speed, 10.0, 0.01, progress, color, lines)
                }
                HudElement::AltitudeTape => {
                    self.draw_tape(camera, Vec2::new(0.6, 0.0), self.altitude, 20.0, 0.005, progress, color, lines)
                }
                HudElement::HeadingTape => self.draw_heading_tape(camera, progress, color, lines),
                HudElement::GMeter => self.draw_g_meter(camera, progress, color, lines),
            }
        }
    }

    fn draw_boresight(&self, camera: &Camera, scale: f32, color: Vec4, lines: &mut LineBatch) {
        let points: Vec<Vec3> = [
            (-0.08, 0.0),
            (-0.04, 0.0),
            (-0.02, -0.02),
            (0.0, 0.0),
            (0.02, -0.02),
            (0.04, 0.0),
            (0.08, 0.0),
        ]
        .iter()
        .map(|&(x, y)| self.entity_front_to_world(camera, Vec2::new(x, y) * scale))
        .collect();
        lines.add_polyline(&points, color);
    }

    fn draw_roll_scale(&self, camera: &Camera, scale: f32, color: Vec4, lines: &mut LineBatch) {
        let center = Vec2::new(0.0, -0.35);
        let at = |degrees: f32, radius: f32| {
            let (s, c) = degrees.to_radians().sin_cos();
            Vec2::new(s, -c) * radius * scale
        };
        for degrees in [-60.0, -45.0, -30.0, -20.0, -10.0, 0.0, 10.0, 20.0, 30.0, 45.0, 60.0_f32] {
            let outer = if degrees as i32 % 30 == 0 { 0.31 } else { 0.28 };
            let a = self.entity_front_to_world_with_offset(camera, at(degrees, 0.25), center);
            let b = self.entity_front_to_world_with_offset(camera, at(degrees, outer), center);
            lines.add_line(a, b, color);
        }

        // Pointer swings opposite to the aircraft's roll.
        let roll = -self.player_rotation.z.to_degrees();
        let tip = self.entity_front_to_world_with_offset(camera, at(roll, 0.24), center);
        let left = self.entity_front_to_world_with_offset(camera, at(roll - 3.0, 0.2), center);
        let right = self.entity_front_to_world_with_offset(camera, at(roll + 3.0, 0.2), center);
        lines.add_polyline(&[left, tip, right, left], color);
    }

    fn draw_pitch_ladder(&self, camera: &Camera, scale: f32, color: Vec4, lines: &mut LineBatch) {
        const UNITS_PER_DEGREE: f32 = 0.02;
        const WINDOW: f32 = 0.5;
        // Positive pitch is nose down.
        let climb = -self.player_rotation.x.to_degrees();
        for rung in (-18..=18).map(|i| i as f32 * 5.0) {
            let y = (rung - climb) * UNITS_PER_DEGREE;
            if y.abs() > WINDOW {
                continue;
            }
            let (inner, outer) = if rung == 0.0 { (0.1, 0.4) } else { (0.1, 0.25) };
            for side in [-1.0_f32, 1.0] {
                let a = self.screen_to_world(camera, Vec2::new(side * inner * scale, y));
                let b = self.screen_to_world(camera, Vec2::new(side * outer * scale, y));
                lines.add_line(a, b, color);
            }
        }
    }

    /// Vertical tape centered on `value` with a tick every `step`.
    #[allow(clippy::too_many_arguments)]
    fn draw_tape(
        &self,
        camera: &Camera,
        origin: Vec2,
        value: f32,
        step: f32,
        units_per_value: f32,
        scale: f32,
        color: Vec4,
        lines: &mut LineBatch,
    ) {
        let half = 0.3 * scale;
        let top = self.screen_to_world(camera, origin + Vec2::new(0.0, half));
        let bottom = self.screen_to_world(camera, origin - Vec2::new(0.0, half));
        lines.add_line(bottom, top, color);

        let first = ((value - half / units_per_value) / step).ceil() as i32;
        let last = ((value + half / units_per_value) / step).floor() as i32;
        for i in first..=last {
            let y = (i as f32 * step - value) * units_per_value;
            let a = self.screen_to_world(camera, origin + Vec2::new(0.0, y));
            let b = self.screen_to_world(camera, origin + Vec2::new(-origin.x.signum() * 0.03, y));
            lines.add_line(a, b, color);
        }

        let caret = origin + Vec2::new(-origin.x.signum() * 0.05, 0.0);
        let a = self.screen_to_world(camera, caret + Vec2::new(0.0, 0.015));
        let b = self.screen_to_world(camera, caret - Vec2::new(0.0, 0.015));
        lines.add_line(a, b, color);
    }

    fn draw_heading_tape(&self, camera: &Camera, scale: f32, color: Vec4, lines: &mut LineBatch) {
        const UNITS_PER_DEGREE: f32 = 0.01;
        let origin = Vec2::new(0.0, 0.45);
        let half = 0.3 * scale;
        let left = self.screen_to_world(camera, origin - Vec2::new(half, 0.0));
        let right = self.screen_to_world(camera, origin + Vec2::new(half, 0.0));
        lines.add_line(left, right, color);

        for tick in (0..36).map(|i| i as f32 * 10.0) {
            let delta = (tick - self.heading + 180.0).rem_euclid(360.0) - 180.0;
            let x = delta * UNITS_PER_DEGREE;
            if x.abs() > half {
                continue;
            }
            let height = if tick as i32 % 90 == 0 { 0.04 } else { 0.02 };
            let a = self.screen_to_world(camera, origin + Vec2::new(x, 0.0));
            let b = self.screen_to_world(camera, origin + Vec2::new(x, -height));
            lines.add_line(a, b, color);
        }
    }

    fn draw_g_meter(&self, camera: &Camera, scale: f32, color: Vec4, lines: &mut LineBatch) {
        let origin = Vec2::new(-0.6, -0.4);
        let width = 0.03 * scale;
        let height = (self.g_force * 0.05).min(0.45) * scale;
        let base_l = self.screen_to_world(camera, origin - Vec2::new(width, 0.0));
        let base_r = self.screen_to_world(camera, origin + Vec2::new(width, 0.0));
        let top = self.screen_to_world(camera, origin + Vec2::new(0.0, height));
        let bottom = self.screen_to_world(camera, origin);
        lines.add_line(base_l, base_r, color);
        lines.add_line(bottom, top, color);
    }
}

fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::Transform;
    use std::f32::consts::{FRAC_PI_2, PI};

    const DT: f32 = 1.0 / 60.0;

    fn hud() -> FlightHud {
        FlightHud::new(&HudConfig::default())
    }

    fn camera_at(position: Vec3, rotate: Vec3) -> Camera {
        let mut camera = Camera::new(position);
        camera.transform.rotate = rotate;
        camera
    }

    fn deployed(hud: &mut FlightHud, target: &impl Tracked) {
        hud.deploy();
        for _ in 0..120 {
            hud.update(DT, target);
        }
    }

    #[test]
    fn camera_plane_uses_separate_axis_scales() {
        let hud = hud();
        let camera = camera_at(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
        let center = hud.screen_to_world(&camera, Vec2::ZERO);
        assert!(center.abs_diff_eq(Vec3::new(1.0, 2.0, 13.0), 1e-5));
        let corner = hud.screen_to_world(&camera, Vec2::new(1.0, 1.0));
        assert!(corner.abs_diff_eq(Vec3::new(5.0, 4.5, 13.0), 1e-5));
    }

    #[test]
    fn origin_entity_falls_back_to_camera_plane() {
        let mut hud = hud();
        let camera = camera_at(Vec3::new(0.0, 5.0, -20.0), Vec3::new(0.2, 0.7, 0.0));
        for screen in [Vec2::ZERO, Vec2::new(0.3, -0.2), Vec2::new(-1.0, 1.0)] {
            assert_eq!(hud.entity_front_to_world(&camera, screen), hud.screen_to_world(&camera, screen));
        }

        // Still the sentinel after tracking an entity sitting at the origin.
        hud.update(DT, &Transform::from_translate_rotate(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)));
        let screen = Vec2::new(0.5, 0.5);
        assert_eq!(hud.entity_front_to_world(&camera, screen), hud.screen_to_world(&camera, screen));
    }

    #[test]
    fn entity_plane_is_level_in_front_of_the_nose() {
        let mut hud = hud();
        let camera = camera_at(Vec3::new(0.0, 0.0, -30.0), Vec3::ZERO);
        // Pitch and roll do not tilt the plane.
        hud.update(DT, &Transform::from_translate_rotate(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.4, 0.0, 0.6)));
        let center = hud.entity_front_to_world(&camera, Vec2::ZERO);
        assert!(center.abs_diff_eq(Vec3::new(0.0, 10.5, 10.0), 1e-5));
        let shifted = hud.entity_front_to_world_with_offset(&camera, Vec2::ZERO, Vec2::new(0.5, -0.2));
        assert!(shifted.abs_diff_eq(Vec3::new(2.0, 10.0, 10.0), 1e-5));
    }

    #[test]
    fn points_behind_camera_are_clamped() {
        let mut hud = hud();
        let camera = camera_at(Vec3::ZERO, Vec3::ZERO);
        hud.update(DT, &Transform::from_translate_rotate(Vec3::new(0.0, 0.0, -50.0), Vec3::new(0.0, PI, 0.0)));
        let point = hud.entity_front_to_world(&camera, Vec2::ZERO);
        assert!(point.abs_diff_eq(Vec3::new(0.0, 0.0, 10.0), 1e-5));
    }

    #[test]
    fn heading_wraps_into_compass_range() {
        let mut hud = hud();
        hud.update(DT, &Transform::from_translate_rotate(Vec3::ONE, Vec3::new(0.0, -FRAC_PI_2, 0.0)));
        assert!((hud.heading() - 270.0).abs() < 1e-3);
        hud.update(DT, &Transform::from_translate_rotate(Vec3::ONE, Vec3::new(0.0, -1e-9, 0.0)));
        assert!((0.0..360.0).contains(&hud.heading()));
        hud.update(DT, &Transform::from_translate_rotate(Vec3::ONE, Vec3::new(0.0, 2.0 * PI + 0.1, 0.0)));
        assert!((hud.heading() - 0.1_f32.to_degrees()).abs() < 1e-2);
    }

    #[test]
    fn kinematics_from_finite_differences() {
        let mut hud = hud();
        let mut target = Transform::from_translate(Vec3::new(0.0, 100.0, 0.0));
        hud.update(DT, &target);
        assert_eq!(hud.speed(), 0.0);
        for _ in 0..10 {
            target.translate.z += 1.0;
            hud.update(DT, &target);
        }
        assert!((hud.speed() - 60.0).abs() < 1e-2);
        assert_eq!(hud.altitude(), 100.0);
        // Constant velocity, level flight.
        assert!((hud.g_force() - 1.0).abs() < 1e-2);
    }

    #[test]
    fn level_flight_reads_one_g_every_tick() {
        let mut hud = hud();
        let mut target = Transform::from_translate(Vec3::new(0.0, 100.0, 0.0));
        for tick in 0..30 {
            target.translate.z += 40.0 * DT;
            hud.update(DT, &target);
            assert!((hud.g_force() - 1.0).abs() < 1e-2, "tick {tick}: {}", hud.g_force());
        }
        assert!((hud.speed() - 40.0).abs() < 1e-2);
    }

    #[test]
    fn teleport_restarts_kinematics() {
        let mut hud = hud();
        let mut target = Transform::from_translate(Vec3::new(0.0, 100.0, 0.0));
        for _ in 0..10 {
            target.translate.z += 40.0 * DT;
            hud.update(DT, &target);
        }
        target.translate = Vec3::new(0.0, 200.0, -3000.0);
        for _ in 0..10 {
            hud.update(DT, &target);
            assert!(hud.speed() <= 40.0 + 1e-2);
            assert!((hud.g_force() - 1.0).abs() < 1e-2);
            target.translate.z += 40.0 * DT;
        }
        assert!((hud.speed() - 40.0).abs() < 1e-2);
    }

    #[test]
    fn redeploy_restarts_kinematics() {
        let mut hud = hud();
        let mut target = Transform::from_translate(Vec3::new(0.0, 100.0, 0.0));
        for _ in 0..10 {
            target.translate.z += 40.0 * DT;
            hud.update(DT, &target);
        }
        hud.retract();
        // Respawn sets a new speed; the first samples after redeploy must not read it as a jolt.
        hud.deploy();
        for _ in 0..5 {
            target.translate.z += 80.0 * DT;
            hud.update(DT, &target);
            assert!((hud.g_force() - 1.0).abs() < 1e-2);
        }
        assert!((hud.speed() - 80.0).abs() < 1e-2);
    }

    #[test]
    fn retract_mid_deploy_continues_from_current_progress() {
        let mut hud = hud();
        let target = Transform::from_translate(Vec3::new(0.0, 50.0, 0.0));
        hud.deploy();
        for _ in 0..6 {
            hud.update(DT, &target);
        }
        let before = hud.deploy_progress();
        assert!(before > 0.0 && before < 1.0);

        hud.retract();
        let mut previous = before;
        for _ in 0..120 {
            hud.update(DT, &target);
            assert!(hud.deploy_progress() <= previous + 1e-5);
            previous = hud.deploy_progress();
        }
        assert_eq!(hud.deploy_progress(), 0.0);
    }

    #[test]
    fn deploy_mid_retract_continues_from_current_progress() {
        let mut animation = DeployAnimation::new(1.2);
        animation.deploy();
        for _ in 0..120 {
            animation.update(DT);
        }
        animation.retract();
        for _ in 0..6 {
            animation.update(DT);
        }
        let before = animation.progress();
        assert!(before > 0.0 && before < 1.0);

        animation.deploy();
        animation.update(DT);
        assert!(animation.progress() >= before - 1e-5);
        assert!(animation.progress() - before < 0.1);
    }

    #[test]
    fn elements_deploy_in_sequence() {
        let mut hud = hud();
        let target = Transform::from_translate(Vec3::new(0.0, 50.0, 0.0));
        hud.deploy();
        let mut seen_staggered = false;
        for _ in 0..120 {
            hud.update(DT, &target);
            let first = hud.element_progress(HudElement::Boresight);
            let last = hud.element_progress(HudElement::GMeter);
            assert!(first >= last);
            if first > 0.0 && last == 0.0 {
                seen_staggered = true;
            }
        }
        assert!(seen_staggered);
        assert_eq!(hud.deploy_progress(), 1.0);
        for element in HudElement::ALL {
            assert!((hud.element_progress(element) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn retract_hides_everything() {
        let mut hud = hud();
        let target = Transform::from_translate(Vec3::new(0.0, 50.0, 0.0));
        deployed(&mut hud, &target);
        hud.retract();
        hud.update(DT, &target);
        assert!(hud.deploy_progress() < 1.0);
        for _ in 0..120 {
            hud.update(DT, &target);
        }
        assert_eq!(hud.deploy_progress(), 0.0);
        assert!(!hud.is_visible());
    }

    #[test]
    fn draw_needs_a_camera_and_a_deployed_hud() {
        let mut hud = hud();
        let target = Transform::from_translate(Vec3::new(0.0, 50.0, 0.0));
        let mut lines = LineBatch::new();

        let mut cameras = CameraRegistry::new();
        deployed(&mut hud, &target);
        hud.draw(&cameras, &mut lines);
        assert!(lines.is_empty());

        cameras.insert("chase", camera_at(Vec3::new(0.0, 51.0, -16.0), Vec3::ZERO));
        hud.draw(&cameras, &mut lines);
        assert!(lines.line_count() > 20);
        assert!(lines.vertices.iter().all(|v| v.position.iter().all(|c| c.is_finite())));

        let mut hidden = FlightHud::new(&HudConfig::default());
        hidden.update(DT, &target);
        let mut empty = LineBatch::new();
        hidden.draw(&cameras, &mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn element_progress_stays_hidden_before_threshold() {
        assert_eq!(element_progress(0.2, 0.5), 0.0);
        assert!((element_progress(0.75, 0.5) - 0.5).abs() < 1e-6);
        assert_eq!(element_progress(1.0, 0.5), 1.0);
    }
}
