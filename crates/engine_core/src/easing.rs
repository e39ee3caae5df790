//! Smoothing and easing primitives.
//!
//! Everything here is a pure function of its inputs. Easing curves expect `t` in `0..=1`;
//! callers clamp before calling, values outside that range extrapolate.

use glam::Vec3;

/// Cap on how fast [`smooth_damp`] may move, in units per second.
pub const SMOOTH_DAMP_MAX_SPEED: f32 = 100.0;

/// Below this smoothing time (or time step) [`smooth_damp`] leaves its inputs untouched.
pub const SMOOTH_DAMP_MIN_TIME: f32 = 1e-4;

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

pub fn lerp_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    Vec3::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t), lerp(a.z, b.z, t))
}

/// Quadratic ease in, then out.
pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

pub fn ease_in_cubic(t: f32) -> f32 {
    t * t * t
}

pub fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

pub fn ease_in(t: f32) -> f32 {
    t * t
}

/// Cubic Bezier in Bernstein form, evaluated per component.
pub fn cubic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

/// Critically damped spring toward `target`.
///
/// Returns the new position and the velocity to pass in on the next call. One velocity
/// must be kept per independently smoothed quantity.
///
/// The decay uses a rational approximation of `e^-x`, and the per-call move is clamped to
/// `SMOOTH_DAMP_MAX_SPEED * smooth_time`. If the result lands past `target` it snaps onto
/// `target` and the returned velocity becomes `(target - current) / dt`.
pub fn smooth_damp(
    current: Vec3,
    target: Vec3,
    velocity: Vec3,
    smooth_time: f32,
    dt: f32,
) -> (Vec3, Vec3) {
    if smooth_time < SMOOTH_DAMP_MIN_TIME || dt <= f32::EPSILON {
        return (current, velocity);
    }

    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let max_change = SMOOTH_DAMP_MAX_SPEED * smooth_time;
    let change = (current - target).clamp_length_max(max_change);
    let clamped_target = current - change;

    let temp = (velocity + omega * change) * dt;
    let mut new_velocity = (velocity - omega * temp) * decay;
    let mut result = clamped_target + (change + temp) * decay;

    if (target - current).dot(result - target) > 0.0 {
        result = target;
        new_velocity = (target - current) / dt;
    }

    (result, new_velocity)
}

/// Factor that applies a per-tick blend `s` (tuned for `reference_dt`) over `dt`.
///
/// Returns exactly `s` when `dt == reference_dt`.
pub fn tick_blend(s: f32, dt: f32, reference_dt: f32) -> f32 {
    if reference_dt <= 0.0 {
        return s;
    }
    let s = s.clamp(0.0, 1.0);
    if dt == reference_dt {
        return s;
    }
    1.0 - (1.0 - s).powf(dt / reference_dt)
}
