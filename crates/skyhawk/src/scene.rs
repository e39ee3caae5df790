//! Scenes and the manager that switches between them.
//!
//! A scene owns its world, cameras and particles. Within a tick the camera rigs always
//! run before the HUD and the particle engine read the camera.

use crate::aircraft::{self, FlightEvent};
use crate::config::GameConfig;
use crate::follow_camera::FollowCamera;
use crate::hud::FlightHud;
use crate::particles::{EmissionRanges, ParticleEngine, Span};
use crate::title_camera::{TitleCamera, TitlePhase};
use anyhow::{Context, Result};
use engine_core::{euler, FlightStatus, Transform};
use glam::{Vec3, Vec4};
use hecs::{Entity, World};
use renderer::{Camera, CameraRegistry, InstanceSink, LineBatch, ParticleShape, TextureCache};

pub const TITLE_CAMERA: &str = "title";
pub const CHASE_CAMERA: &str = "chase";

pub const TEXTURE_SOFT: &str = "particle_soft.png";
pub const TEXTURE_RING: &str = "particle_ring.png";
pub const TEXTURE_SMOKE: &str = "particle_smoke.png";
/// Every texture a scene may request.
pub const PARTICLE_TEXTURES: [&str; 3] = [TEXTURE_SOFT, TEXTURE_RING, TEXTURE_SMOKE];

const HERO_POSITION: Vec3 = Vec3::new(0.0, 60.0, 0.0);
const FLIGHT_SPAWN: Vec3 = Vec3::new(0.0, 120.0, 0.0);

const CLOUDS: &str = "Cloud";
const HALO: &str = "Halo";
const EXHAUST: &str = "Exhaust";
const EXPLOSION: &str = "Explosion";
const SHOCKWAVE: &str = "Shockwave";
const SMOKE: &str = "Smoke";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneId {
    Title,
    Flight,
}

pub trait Scene {
    fn id(&self) -> SceneId;

    /// Set up cameras, entities and particle groups.
    fn enter(&mut self, textures: &mut dyn TextureCache) -> Result<()>;

    /// One fixed tick. Returns the scene to switch to, if any.
    fn update(&mut self, dt: f32) -> Result<Option<SceneId>>;

    fn draw(&mut self, sink: &mut dyn InstanceSink, lines: &mut LineBatch);

    fn cameras(&self) -> &CameraRegistry;

    fn particles(&self) -> &ParticleEngine;

    /// One-line state summary for logs.
    fn describe(&self) -> String;
}

pub fn create_scene(id: SceneId, config: &GameConfig) -> Box<dyn Scene> {
    match id {
        SceneId::Title => Box::new(TitleScene::new(config)),
        SceneId::Flight => Box::new(FlightScene::new(config)),
    }
}

pub struct SceneManager {
    config: GameConfig,
    current: Box<dyn Scene>,
}

impl SceneManager {
    pub fn new(config: GameConfig, start: SceneId, textures: &mut dyn TextureCache) -> Result<Self> {
        let mut current = create_scene(start, &config);
        current
            .enter(textures)
            .with_context(|| format!("Failed to enter {:?} scene", start))?;
        log::info!("Entered {:?} scene", start);
        Ok(Self { config, current })
    }

    pub fn current(&self) -> SceneId {
        self.current.id()
    }

    pub fn scene(&self) -> &dyn Scene {
        self.current.as_ref()
    }

    /// Tick the current scene and switch if it asks to.
    pub fn update(&mut self, dt: f32, textures: &mut dyn TextureCache) -> Result<()> {
        if let Some(next) = self.current.update(dt)? {
            self.change(next, textures)?;
        }
        Ok(())
    }

    pub fn change(&mut self, next: SceneId, textures: &mut dyn TextureCache) -> Result<()> {
        let mut scene = create_scene(next, &self.config);
        scene
            .enter(textures)
            .with_context(|| format!("Failed to enter {:?} scene", next))?;
        log::info!("Scene change {:?} -> {:?}", self.current.id(), next);
        self.current = scene;
        Ok(())
    }

    pub fn draw(&mut self, sink: &mut dyn InstanceSink, lines: &mut LineBatch) {
        self.current.draw(sink, lines);
    }
}

/// Attract mode: the title rig circles a hovering aircraft.
pub struct TitleScene {
    world: World,
    cameras: CameraRegistry,
    rig: TitleCamera,
    particles: ParticleEngine,
    hero: Option<Entity>,
    time: f32,
    auto_start: f32,
}

impl TitleScene {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            world: World::new(),
            cameras: CameraRegistry::new(),
            rig: TitleCamera::new(),
            particles: ParticleEngine::new(config.particles.clone()),
            hero: None,
            time: 0.0,
            auto_start: config.demo.title_auto_start,
        }
    }

    pub fn rig(&self) -> &TitleCamera {
        &self.rig
    }
}

impl Scene for TitleScene {
    fn id(&self) -> SceneId {
        SceneId::Title
    }

    fn enter(&mut self, textures: &mut dyn TextureCache) -> Result<()> {
        self.cameras
            .insert(TITLE_CAMERA, Camera::new(HERO_POSITION + Vec3::new(40.0, 25.0, 60.0)));
        self.rig.initialize(TITLE_CAMERA, &self.cameras);

        let hero = aircraft::spawn_aircraft(&mut self.world, HERO_POSITION, Vec3::ZERO);
        self.rig.set_target(Some(hero));
        self.hero = Some(hero);

        self.particles
            .create_group(CLOUDS, TEXTURE_SMOKE, ParticleShape::Board, &mut *textures)?;
        self.particles.set_group_ranges(
            CLOUDS,
            EmissionRanges {
                position_jitter: Span::new(Vec3::new(-60.0, -20.0, -60.0), Vec3::new(60.0, 10.0, 60.0)),
                velocity: Span::new(Vec3::new(-1.0, -0.2, -1.0), Vec3::new(1.0, 0.2, 1.0)),
                color: Span::new(Vec4::new(0.9, 0.9, 0.95, 0.5), Vec4::new(1.0, 1.0, 1.0, 0.8)),
                life_time: Span::new(6.0, 12.0),
                initial_scale: Span::new(Vec3::splat(4.0), Vec3::splat(8.0)),
                end_scale: Span::new(Vec3::splat(6.0), Vec3::splat(10.0)),
                gravity: Vec3::ZERO,
                fade_in_ratio: 0.2,
                fade_out_ratio: 0.6,
                ..EmissionRanges::default()
            },
        )?;

        self.particles
            .create_group(HALO, TEXTURE_RING, ParticleShape::Ring, &mut *textures)?;
        self.particles.set_group_ranges(
            HALO,
            EmissionRanges {
                position_jitter: Span::fixed(Vec3::new(0.0, -2.0, 0.0)),
                velocity: Span::fixed(Vec3::ZERO),
                color: Span::new(Vec4::new(0.4, 0.7, 1.0, 0.6), Vec4::new(0.5, 0.8, 1.0, 0.9)),
                life_time: Span::new(1.5, 2.0),
                initial_scale: Span::fixed(Vec3::splat(1.0)),
                end_scale: Span::fixed(Vec3::splat(12.0)),
                initial_rotation: Span::fixed(Vec3::ZERO),
                end_rotation: Span::fixed(Vec3::ZERO),
                gravity: Vec3::ZERO,
                ..EmissionRanges::default()
            },
        )?;
        Ok(())
    }

    fn update(&mut self, dt: f32) -> Result<Option<SceneId>> {
        self.time += dt;
        let Some(hero) = self.hero else {
            return Ok(None);
        };

        let hero_position = {
            let mut transform = self.world.get::<&mut Transform>(hero)?;
            transform.translate.y = HERO_POSITION.y + (self.time * 0.8).sin() * 0.5;
            transform.rotate.z = (self.time * 0.7).sin() * 0.1;
            transform.translate
        };

        self.rig.update(dt, &self.world, &mut self.cameras);

        self.particles.emit(CLOUDS, hero_position, 60)?;
        self.particles.emit(HALO, hero_position, 2)?;
        if let Some(camera) = self.cameras.get(TITLE_CAMERA) {
            self.particles.update(dt, camera);
        }

        if self.rig.phase() == TitlePhase::Loop && !self.rig.is_transitioning() && self.rig.loop_time() >= self.auto_start {
            return Ok(Some(SceneId::Flight));
        }
        Ok(None)
    }

    fn draw(&mut self, sink: &mut dyn InstanceSink, _lines: &mut LineBatch) {
        self.particles.draw(sink);
    }

    fn cameras(&self) -> &CameraRegistry {
        &self.cameras
    }

    fn particles(&self) -> &ParticleEngine {
        &self.particles
    }

    fn describe(&self) -> String {
        format!(
            "title phase={:?} t={:.1}s exposure={:.2} particles={}",
            self.rig.phase(),
            self.time,
            self.rig.exposure(),
            self.particles.total_live()
        )
    }
}

/// Autopilot flight under the chase camera with the HUD up.
pub struct FlightScene {
    world: World,
    cameras: CameraRegistry,
    rig: FollowCamera,
    hud: FlightHud,
    particles: ParticleEngine,
    aircraft: Option<Entity>,
    time: f32,
    crashes: u32,
}

impl FlightScene {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            world: World::new(),
            cameras: CameraRegistry::new(),
            rig: FollowCamera::new(&config.follow_camera),
            hud: FlightHud::new(&config.hud),
            particles: ParticleEngine::new(config.particles.clone()),
            aircraft: None,
            time: 0.0,
            crashes: 0,
        }
    }

    pub fn hud(&self) -> &FlightHud {
        &self.hud
    }

    pub fn rig(&self) -> &FollowCamera {
        &self.rig
    }

    pub fn crash_count(&self) -> u32 {
        self.crashes
    }

    pub fn aircraft_transform(&self) -> Option<Transform> {
        let entity = self.aircraft?;
        self.world.get::<&Transform>(entity).ok().map(|t| *t)
    }

    fn on_flight_event(&mut self, event: FlightEvent) -> Result<()> {
        match event {
            FlightEvent::Crashed { position } => {
                self.crashes += 1;
                log::info!("Aircraft crashed at ({:.1}, {:.1}, {:.1})", position.x, position.y, position.z);
                self.particles.emit(EXPLOSION, position, 200)?;
                self.particles.emit(SHOCKWAVE, position, 1)?;
                self.particles.emit(SMOKE, position, 12)?;
                self.hud.retract();
            }
            FlightEvent::Respawned { position } => {
                log::info!("Aircraft respawned at ({:.1}, {:.1}, {:.1})", position.x, position.y, position.z);
                self.hud.deploy();
            }
        }
        Ok(())
    }
}

impl Scene for FlightScene {
    fn id(&self) -> SceneId {
        SceneId::Flight
    }

    fn enter(&mut self, textures: &mut dyn TextureCache) -> Result<()> {
        let aircraft = aircraft::spawn_aircraft(&mut self.world, FLIGHT_SPAWN, Vec3::ZERO);
        self.aircraft = Some(aircraft);

        self.cameras
            .insert(CHASE_CAMERA, Camera::new(FLIGHT_SPAWN + Vec3::new(0.0, 1.0, -16.0)));
        self.rig.initialize(CHASE_CAMERA, &self.cameras);
        self.rig.set_target(Some(aircraft));

        self.hud.initialize(Some(CHASE_CAMERA));
        self.hud.deploy();

        self.particles
            .create_group(EXHAUST, TEXTURE_SOFT, ParticleShape::Board, &mut *textures)?;
        self.particles.set_group_ranges(
            EXHAUST,
            EmissionRanges {
                position_jitter: Span::new(Vec3::splat(-0.2), Vec3::splat(0.2)),
                velocity: Span::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
                color: Span::new(Vec4::new(1.0, 0.6, 0.2, 1.0), Vec4::new(1.0, 0.9, 0.5, 1.0)),
                life_time: Span::new(0.2, 0.5),
                initial_scale: Span::new(Vec3::splat(0.6), Vec3::splat(0.9)),
                end_scale: Span::fixed(Vec3::splat(0.1)),
                gravity: Vec3::ZERO,
                ..EmissionRanges::default()
            },
        )?;

        self.particles
            .create_group(EXPLOSION, TEXTURE_SOFT, ParticleShape::Board, &mut *textures)?;
        self.particles.set_group_ranges(
            EXPLOSION,
            EmissionRanges {
                position_jitter: Span::new(Vec3::splat(-1.0), Vec3::splat(1.0)),
                velocity: Span::new(Vec3::new(-15.0, 2.0, -15.0), Vec3::new(15.0, 25.0, 15.0)),
                color: Span::new(Vec4::new(1.0, 0.3, 0.0, 1.0), Vec4::new(1.0, 0.8, 0.3, 1.0)),
                life_time: Span::new(0.8, 2.0),
                initial_scale: Span::new(Vec3::splat(1.0), Vec3::splat(2.5)),
                end_scale: Span::new(Vec3::splat(0.2), Vec3::splat(0.5)),
                gravity: Vec3::new(0.0, -9.8, 0.0),
                fade_in_ratio: 0.02,
                fade_out_ratio: 0.5,
                ..EmissionRanges::default()
            },
        )?;

        self.particles
            .create_group(SHOCKWAVE, TEXTURE_RING, ParticleShape::Ring, &mut *textures)?;
        self.particles.set_group_ranges(
            SHOCKWAVE,
            EmissionRanges {
                position_jitter: Span::fixed(Vec3::new(0.0, 0.2, 0.0)),
                velocity: Span::fixed(Vec3::ZERO),
                color: Span::fixed(Vec4::new(1.0, 0.9, 0.7, 0.8)),
                life_time: Span::fixed(1.0),
                initial_scale: Span::fixed(Vec3::splat(1.0)),
                end_scale: Span::fixed(Vec3::new(30.0, 1.0, 30.0)),
                // Lay the ring flat on the ground.
                initial_rotation: Span::fixed(Vec3::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0)),
                end_rotation: Span::fixed(Vec3::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0)),
                gravity: Vec3::ZERO,
                fade_in_ratio: 0.0,
                fade_out_ratio: 0.3,
            },
        )?;

        self.particles
            .create_group(SMOKE, TEXTURE_SMOKE, ParticleShape::Cylinder, &mut *textures)?;
        self.particles.set_group_ranges(
            SMOKE,
            EmissionRanges {
                position_jitter: Span::new(Vec3::new(-3.0, 0.0, -3.0), Vec3::new(3.0, 1.0, 3.0)),
                velocity: Span::new(Vec3::new(-0.5, 2.0, -0.5), Vec3::new(0.5, 4.0, 0.5)),
                color: Span::new(Vec4::new(0.2, 0.2, 0.2, 0.7), Vec4::new(0.35, 0.35, 0.35, 0.9)),
                life_time: Span::new(2.0, 3.0),
                initial_scale: Span::new(Vec3::splat(0.5), Vec3::splat(1.0)),
                end_scale: Span::new(Vec3::splat(2.0), Vec3::splat(3.0)),
                initial_rotation: Span::fixed(Vec3::ZERO),
                end_rotation: Span::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)),
                gravity: Vec3::new(0.0, 0.5, 0.0),
                ..EmissionRanges::default()
            },
        )?;

        log::info!("Flight scene ready, aircraft at {:?}", FLIGHT_SPAWN);
        Ok(())
    }

    fn update(&mut self, dt: f32) -> Result<Option<SceneId>> {
        let Some(entity) = self.aircraft else {
            return Ok(None);
        };
        self.time += dt;

        let input = {
            let transform = self.world.get::<&Transform>(entity)?;
            aircraft::autopilot(self.time, &transform)
        };
        for (_, event) in aircraft::fly(&mut self.world, &input, dt) {
            self.on_flight_event(event)?;
        }

        self.rig.update(dt, &self.world, &mut self.cameras);
        self.hud.update_from_world(dt, &self.world, self.aircraft);

        let (transform, crashing) = {
            let transform = *self.world.get::<&Transform>(entity)?;
            let crashing = self
                .world
                .get::<&FlightStatus>(entity)
                .map(|status| status.crashing)
                .unwrap_or(false);
            (transform, crashing)
        };
        if !crashing {
            let tail = transform.translate - euler::forward(transform.rotate) * 3.0;
            self.particles.emit(EXHAUST, tail, 40)?;
        }
        if let Some(camera) = self.cameras.get(CHASE_CAMERA) {
            self.particles.update(dt, camera);
        }
        Ok(None)
    }

    fn draw(&mut self, sink: &mut dyn InstanceSink, lines: &mut LineBatch) {
        self.particles.draw(sink);
        self.hud.draw(&self.cameras, lines);
    }

    fn cameras(&self) -> &CameraRegistry {
        &self.cameras
    }

    fn particles(&self) -> &ParticleEngine {
        &self.particles
    }

    fn describe(&self) -> String {
        format!(
            "flight t={:.1}s speed={:.1} alt={:.1} hdg={:.0} g={:.2} crashes={} particles={}",
            self.time,
            self.hud.speed(),
            self.hud.altitude(),
            self.hud.heading(),
            self.hud.g_force(),
            self.crashes,
            self.particles.total_live()
        )
    }
}
