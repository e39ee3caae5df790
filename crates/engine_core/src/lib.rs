//! Core engine types and utilities for Skyhawk.
//!
//! This crate provides the foundational types used across all engine systems:
//! - Euler transform and the rotation conventions built on it
//! - Fixed-step time management
//! - Smoothing and easing primitives shared by cameras and UI animation
//! - The tracked-entity contract read by camera rigs and the HUD

pub mod easing;
pub mod euler;
pub mod time;
pub mod tracking;
pub mod transform;

pub use easing::*;
pub use time::*;
pub use tracking::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Vec2, Vec3, Vec4};
pub use hecs::{Entity, World};
