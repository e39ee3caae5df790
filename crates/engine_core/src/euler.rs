//! Euler-angle rotation conventions.
//!
//! Rotations are stored as `Vec3(pitch, yaw, roll)` in radians and applied X first,
//! then Y, then Z (`Rz * Ry * Rx` for column vectors). The world is left-handed with
//! +Z forward and +Y up, so a positive pitch lowers the nose.
//!
//! Composition elsewhere in the engine is naive component addition. Bases built here
//! ignore roll, which keeps them orthonormal only for a level horizon. Every place that
//! depends on these conventions goes through this module so it can be swapped for a
//! quaternion implementation in one spot.

use glam::{Mat4, Vec3};

/// Orthonormal-ish frame used to place geometry relative to a viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

/// Full rotation matrix for an Euler rotation.
pub fn rotation_matrix(rotate: Vec3) -> Mat4 {
    Mat4::from_rotation_z(rotate.z) * Mat4::from_rotation_y(rotate.y) * Mat4::from_rotation_x(rotate.x)
}

/// Rotate a local-space direction (e.g. a camera offset) into world space.
pub fn rotate_direction(local: Vec3, rotate: Vec3) -> Vec3 {
    rotation_matrix(rotate).transform_vector3(local)
}

/// Forward vector from pitch and yaw (roll ignored).
pub fn forward(rotate: Vec3) -> Vec3 {
    let (sp, cp) = rotate.x.sin_cos();
    let (sy, cy) = rotate.y.sin_cos();
    Vec3::new(sy * cp, -sp, cy * cp)
}

/// Horizontal right vector from yaw alone.
pub fn right_from_yaw(yaw: f32) -> Vec3 {
    let (sy, cy) = yaw.sin_cos();
    Vec3::new(cy, 0.0, -sy)
}

/// View basis: forward from yaw and pitch, right from yaw only, up completing the frame.
pub fn view_basis(rotate: Vec3) -> Basis {
    let forward = forward(rotate);
    let right = right_from_yaw(rotate.y);
    Basis {
        forward,
        right,
        up: forward.cross(right),
    }
}

/// Level basis that follows heading only; pitch and roll are discarded.
pub fn yaw_basis(yaw: f32) -> Basis {
    let forward = forward(Vec3::new(0.0, yaw, 0.0));
    Basis {
        forward,
        right: right_from_yaw(yaw),
        up: Vec3::Y,
    }
}

/// Pitch and yaw that face along `dir`, pitch taken as `asin(-dir.y)`.
///
/// `dir` must be normalized.
pub fn look_angles_asin(dir: Vec3) -> (f32, f32) {
    let pitch = (-dir.y).clamp(-1.0, 1.0).asin();
    let yaw = dir.x.atan2(dir.z);
    (pitch, yaw)
}

/// Pitch and yaw that face along `dir`, pitch taken from the horizontal length.
///
/// Does not require `dir` to be normalized.
pub fn look_angles_atan(dir: Vec3) -> (f32, f32) {
    let horizontal = (dir.x * dir.x + dir.z * dir.z).sqrt();
    let pitch = -dir.y.atan2(horizontal);
    let yaw = dir.x.atan2(dir.z);
    (pitch, yaw)
}

/// Rotation that turns a camera-space quad to face a camera with the given rotation.
///
/// The view matrix applies the inverse of the camera rotation, so composing this first
/// leaves the quad unrotated in view space.
pub fn billboard(camera_rotate: Vec3) -> Mat4 {
    rotation_matrix(camera_rotate)
}
