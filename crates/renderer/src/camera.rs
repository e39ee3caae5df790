//! Camera resources and the name-keyed registry that owns them.

use bytemuck::{Pod, Zeroable};
use engine_core::{euler, Transform};
use glam::{Mat4, Vec3};
use std::collections::HashMap;

/// Perspective camera positioned by an Euler transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera transform (translate and rotate; scale is ignored).
    pub transform: Transform,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    /// Brightness multiplier fed to post-processing. 1.0 = neutral.
    pub exposure: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            fov_degrees: 45.0,
            near: 0.1,
            far: 2000.0,
            aspect: 16.0 / 9.0,
            exposure: 1.0,
        }
    }
}

impl Camera {
    /// Create a new camera at the given position.
    pub fn new(position: Vec3) -> Self {
        Self {
            transform: Transform::from_translate(position),
            ..Default::default()
        }
    }

    /// Update aspect ratio (call on window resize).
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn position(&self) -> Vec3 {
        self.transform.translate
    }

    pub fn rotation(&self) -> Vec3 {
        self.transform.rotate
    }

    /// Viewing direction, ignoring roll.
    pub fn forward(&self) -> Vec3 {
        euler::forward(self.transform.rotate)
    }

    /// Rotation part of the camera's world matrix.
    pub fn rotation_matrix(&self) -> Mat4 {
        euler::rotation_matrix(self.transform.rotate)
    }

    /// Inverse of the camera's world matrix.
    pub fn view_matrix(&self) -> Mat4 {
        self.rotation_matrix().transpose() * Mat4::from_translation(-self.transform.translate)
    }

    /// Left-handed perspective projection (depth 0..1).
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_lh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Camera uniform data for GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub position: [f32; 4], // w unused, padding
    pub exposure: f32,
    /// Padding to a 16-byte multiple for WGSL uniform layout.
    pub _pad: [f32; 3],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
            proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 4],
            exposure: 1.0,
            _pad: [0.0; 3],
        }
    }

    pub fn update(&mut self, camera: &Camera) {
        self.view = camera.view_matrix().to_cols_array_2d();
        self.proj = camera.projection_matrix().to_cols_array_2d();
        self.view_proj = camera.view_projection_matrix().to_cols_array_2d();
        let pos = camera.position();
        self.position = [pos.x, pos.y, pos.z, 1.0];
        self.exposure = camera.exposure;
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Named cameras owned by a scene.
///
/// Rigs and the HUD look cameras up by name each tick instead of holding references,
/// and the active camera serves as the fallback for readers without a bound name.
#[derive(Debug, Default)]
pub struct CameraRegistry {
    cameras: HashMap<String, Camera>,
    active: Option<String>,
}

impl CameraRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a camera. The first camera inserted becomes active.
    pub fn insert(&mut self, name: impl Into<String>, camera: Camera) -> Option<Camera> {
        let name = name.into();
        if self.active.is_none() {
            self.active = Some(name.clone());
        }
        self.cameras.insert(name, camera)
    }

    pub fn remove(&mut self, name: &str) -> Option<Camera> {
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
        self.cameras.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Camera> {
        self.cameras.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Camera> {
        self.cameras.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cameras.contains_key(name)
    }

    /// Make `name` the active camera. Returns false if no such camera exists.
    pub fn set_active(&mut self, name: &str) -> bool {
        if self.cameras.contains_key(name) {
            self.active = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&Camera> {
        self.active.as_deref().and_then(|name| self.cameras.get(name))
    }

    /// Named camera if given and present, otherwise the active one.
    pub fn resolve(&self, name: Option<&str>) -> Option<&Camera> {
        name.and_then(|n| self.cameras.get(n)).or_else(|| self.active())
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}
