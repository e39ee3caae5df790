//! Arcade flight model for the hero aircraft.
//! Euler rates integrate straight into the transform; hitting the ground starts a crash.

use engine_core::{euler, FlightStatus, Transform};
use glam::Vec3;
use hecs::{Entity, World};

pub const PITCH_RATE: f32 = 1.2;
pub const YAW_RATE: f32 = 0.6;
pub const ROLL_RATE: f32 = 2.0;
/// Extra yaw rate per unit of bank (sin of roll).
pub const BANK_TURN_RATE: f32 = 0.8;
pub const MAX_PITCH: f32 = 1.4;

pub const MIN_SPEED: f32 = 20.0;
pub const MAX_SPEED: f32 = 80.0;
/// Speed change per second toward the throttle setting.
pub const ACCELERATION: f32 = 15.0;

pub const GROUND_LEVEL: f32 = 0.0;
/// Seconds spent crashing before respawn.
pub const CRASH_DURATION: f32 = 3.0;
const CRASH_SPIN_RATE: f32 = 4.0;

/// Stick and throttle input, each axis in `-1..=1` (throttle `0..=1`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightInput {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
    pub throttle: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightEvent {
    Crashed { position: Vec3 },
    Respawned { position: Vec3 },
}

/// Flight state component. Lives next to `Transform` and `FlightStatus`.
#[derive(Debug, Clone)]
pub struct Aircraft {
    pub speed: f32,
    pub throttle: f32,
    /// Time since the crash started. Zero while flying.
    pub crash_timer: f32,
    pub spawn_position: Vec3,
    pub spawn_rotation: Vec3,
}

impl Aircraft {
    pub fn new(spawn_position: Vec3, spawn_rotation: Vec3) -> Self {
        Self {
            speed: cruise_speed(0.5),
            throttle: 0.5,
            crash_timer: 0.0,
            spawn_position,
            spawn_rotation,
        }
    }
}

fn cruise_speed(throttle: f32) -> f32 {
    MIN_SPEED + (MAX_SPEED - MIN_SPEED) * throttle.clamp(0.0, 1.0)
}

/// Spawn a flying aircraft entity.
pub fn spawn_aircraft(world: &mut World, position: Vec3, rotation: Vec3) -> Entity {
    world.spawn((
        Transform::from_translate_rotate(position, rotation),
        Aircraft::new(position, rotation),
        FlightStatus::default(),
    ))
}

/// Advance one aircraft by `dt`.
pub fn step(
    aircraft: &mut Aircraft,
    transform: &mut Transform,
    status: &mut FlightStatus,
    input: &FlightInput,
    dt: f32,
) -> Option<FlightEvent> {
    if status.crashing {
        aircraft.crash_timer += dt;
        transform.rotate.z += CRASH_SPIN_RATE * dt;
        if aircraft.crash_timer >= CRASH_DURATION {
            *transform = Transform::from_translate_rotate(aircraft.spawn_position, aircraft.spawn_rotation);
            aircraft.crash_timer = 0.0;
            aircraft.speed = cruise_speed(aircraft.throttle);
            status.crashing = false;
            return Some(FlightEvent::Respawned {
                position: aircraft.spawn_position,
            });
        }
        return None;
    }

    aircraft.throttle = input.throttle.clamp(0.0, 1.0);
    let wanted = cruise_speed(aircraft.throttle);
    let max_change = ACCELERATION * dt;
    aircraft.speed += (wanted - aircraft.speed).clamp(-max_change, max_change);

    let rotate = &mut transform.rotate;
    rotate.x = (rotate.x + input.pitch.clamp(-1.0, 1.0) * PITCH_RATE * dt).clamp(-MAX_PITCH, MAX_PITCH);
    rotate.z += input.roll.clamp(-1.0, 1.0) * ROLL_RATE * dt;
    // Positive roll banks left, which turns toward negative yaw.
    rotate.y += (input.yaw.clamp(-1.0, 1.0) * YAW_RATE - rotate.z.sin() * BANK_TURN_RATE) * dt;

    transform.translate += euler::forward(transform.rotate) * aircraft.speed * dt;

    if transform.translate.y <= GROUND_LEVEL {
        transform.translate.y = GROUND_LEVEL;
        status.crashing = true;
        aircraft.crash_timer = 0.0;
        aircraft.speed = 0.0;
        return Some(FlightEvent::Crashed {
            position: transform.translate,
        });
    }
    None
}

/// Step every aircraft in the world with the same input.
pub fn fly(world: &mut World, input: &FlightInput, dt: f32) -> Vec<(Entity, FlightEvent)> {
    let mut events = Vec::new();
    for (entity, (aircraft, transform, status)) in
        world.query_mut::<(&mut Aircraft, &mut Transform, &mut FlightStatus)>()
    {
        if let Some(event) = step(aircraft, transform, status, input, dt) {
            events.push((entity, event));
        }
    }
    events
}

/// Scripted stick input for the demo: weave, then dive into the ground every cycle.
pub fn autopilot(time: f32, transform: &Transform) -> FlightInput {
    const CYCLE: f32 = 30.0;
    let t = time.rem_euclid(CYCLE);
    if (16.0..22.0).contains(&t) {
        // Dive.
        return FlightInput {
            pitch: 1.0,
            yaw: 0.0,
            roll: -transform.rotate.z.clamp(-1.0, 1.0),
            throttle: 1.0,
        };
    }
    let bank_target = (t * 0.4).sin() * 0.5;
    FlightInput {
        pitch: (-transform.rotate.x * 2.0).clamp(-1.0, 1.0),
        yaw: 0.0,
        roll: ((bank_target - transform.rotate.z) * 2.0).clamp(-1.0, 1.0),
        throttle: 0.6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn level_flight_moves_forward() {
        let mut world = World::new();
        let e = spawn_aircraft(&mut world, Vec3::new(0.0, 100.0, 0.0), Vec3::ZERO);
        let input = FlightInput {
            throttle: 0.5,
            ..Default::default()
        };
        for _ in 0..60 {
            assert!(fly(&mut world, &input, DT).is_empty());
        }
        let transform = world.get::<&Transform>(e).unwrap();
        assert!((transform.translate.z - cruise_speed(0.5)).abs() < 1e-2);
        assert!((transform.translate.y - 100.0).abs() < 1e-4);
    }

    #[test]
    fn throttle_changes_speed_gradually() {
        let mut aircraft = Aircraft::new(Vec3::new(0.0, 100.0, 0.0), Vec3::ZERO);
        let mut transform = Transform::from_translate(aircraft.spawn_position);
        let mut status = FlightStatus::default();
        let input = FlightInput {
            throttle: 1.0,
            ..Default::default()
        };
        let before = aircraft.speed;
        step(&mut aircraft, &mut transform, &mut status, &input, DT);
        assert!((aircraft.speed - before - ACCELERATION * DT).abs() < 1e-4);
        for _ in 0..600 {
            step(&mut aircraft, &mut transform, &mut status, &input, DT);
        }
        assert_eq!(aircraft.speed, MAX_SPEED);
    }

    #[test]
    fn bank_turns_toward_lowered_wing() {
        let mut aircraft = Aircraft::new(Vec3::new(0.0, 100.0, 0.0), Vec3::ZERO);
        let mut transform = Transform::from_translate_rotate(aircraft.spawn_position, Vec3::new(0.0, 0.0, -0.5));
        let mut status = FlightStatus::default();
        step(&mut aircraft, &mut transform, &mut status, &FlightInput::default(), DT);
        assert!(transform.rotate.y > 0.0);
    }

    #[test]
    fn ground_contact_crashes_then_respawns() {
        let mut aircraft = Aircraft::new(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO);
        let mut transform = Transform::from_translate_rotate(Vec3::new(0.0, 0.5, 0.0), Vec3::new(MAX_PITCH, 0.0, 0.0));
        let mut status = FlightStatus::default();

        let event = step(&mut aircraft, &mut transform, &mut status, &FlightInput::default(), DT);
        assert!(matches!(event, Some(FlightEvent::Crashed { .. })));
        assert!(status.crashing);
        assert_eq!(transform.translate.y, GROUND_LEVEL);

        let mut respawned = None;
        for _ in 0..((CRASH_DURATION / DT) as usize + 2) {
            if let Some(event) = step(&mut aircraft, &mut transform, &mut status, &FlightInput::default(), DT) {
                respawned = Some(event);
                break;
            }
        }
        assert_eq!(
            respawned,
            Some(FlightEvent::Respawned {
                position: Vec3::new(0.0, 50.0, 0.0)
            })
        );
        assert!(!status.crashing);
        assert_eq!(transform.translate, Vec3::new(0.0, 50.0, 0.0));
    }

    #[test]
    fn autopilot_dive_reaches_the_ground() {
        let mut world = World::new();
        let e = spawn_aircraft(&mut world, Vec3::new(0.0, 120.0, 0.0), Vec3::ZERO);
        let mut crashed = false;
        for i in 0..(30.0 / DT) as usize {
            let time = i as f32 * DT;
            let input = {
                let transform = world.get::<&Transform>(e).unwrap();
                autopilot(time, &transform)
            };
            for (_, event) in fly(&mut world, &input, DT) {
                if matches!(event, FlightEvent::Crashed { .. }) {
                    crashed = true;
                }
            }
        }
        assert!(crashed);
    }
}
