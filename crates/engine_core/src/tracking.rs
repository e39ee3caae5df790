//! What camera rigs and the HUD need to know about the entity they follow.

use crate::transform::Transform;
use glam::Vec3;
use hecs::{Entity, World};

/// Flight condition flags attached to aircraft entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlightStatus {
    /// The aircraft is in an uncontrolled crash sequence.
    pub crashing: bool,
}

/// Anything a camera can follow.
pub trait Tracked {
    fn position(&self) -> Vec3;

    /// Euler rotation (pitch, yaw, roll) in radians.
    fn rotation(&self) -> Vec3;

    fn is_crashing(&self) -> bool {
        false
    }
}

impl Tracked for Transform {
    fn position(&self) -> Vec3 {
        self.translate
    }

    fn rotation(&self) -> Vec3 {
        self.rotate
    }
}

/// Copy of a tracked entity's state, read once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSnapshot {
    pub position: Vec3,
    pub rotation: Vec3,
    pub crashing: bool,
}

impl TargetSnapshot {
    /// Read an entity's `Transform` and optional `FlightStatus`.
    ///
    /// Returns `None` if the entity is gone, has no transform, or its transform holds
    /// NaN or infinity.
    pub fn from_world(world: &World, entity: Entity) -> Option<Self> {
        let transform = world.get::<&Transform>(entity).ok()?;
        if !transform.is_finite() {
            log::warn!("Ignoring non-finite transform on {:?}", entity);
            return None;
        }
        let crashing = world
            .get::<&FlightStatus>(entity)
            .map(|status| status.crashing)
            .unwrap_or(false);
        Some(Self {
            position: transform.translate,
            rotation: transform.rotate,
            crashing,
        })
    }
}

impl Tracked for TargetSnapshot {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Vec3 {
        self.rotation
    }

    fn is_crashing(&self) -> bool {
        self.crashing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reads_transform_and_status() {
        let mut world = World::new();
        let e = world.spawn((
            Transform::from_translate_rotate(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 0.5, 0.1)),
            FlightStatus { crashing: true },
        ));
        let snap = TargetSnapshot::from_world(&world, e).unwrap();
        assert_eq!(snap.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(snap.rotation, Vec3::new(0.0, 0.5, 0.1));
        assert!(snap.is_crashing());
    }

    #[test]
    fn snapshot_defaults_to_not_crashing() {
        let mut world = World::new();
        let e = world.spawn((Transform::default(),));
        assert!(!TargetSnapshot::from_world(&world, e).unwrap().crashing);
    }

    #[test]
    fn snapshot_rejects_non_finite_transform() {
        let mut world = World::new();
        let e = world.spawn((Transform::from_translate(Vec3::new(f32::NAN, 0.0, 0.0)),));
        assert!(TargetSnapshot::from_world(&world, e).is_none());
        *world.get::<&mut Transform>(e).unwrap() =
            Transform::from_translate_rotate(Vec3::ZERO, Vec3::new(0.0, f32::INFINITY, 0.0));
        assert!(TargetSnapshot::from_world(&world, e).is_none());
    }

    #[test]
    fn snapshot_missing_for_despawned_entity() {
        let mut world = World::new();
        let e = world.spawn((Transform::default(),));
        world.despawn(e).unwrap();
        assert!(TargetSnapshot::from_world(&world, e).is_none());
    }
}
