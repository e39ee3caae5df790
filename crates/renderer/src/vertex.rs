//! Vertex and instance record types and their buffer layouts.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

/// Particle shape vertex: position, normal and UV.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl ParticleVertex {
    pub fn new(position: Vec3, normal: Vec3, tex_coords: [f32; 2]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            tex_coords,
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Normal
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // UV
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Per-particle draw attributes for one instanced draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// World-view-projection matrix (column major).
    pub wvp: [[f32; 4]; 4],
    /// World matrix, for lighting in world space.
    pub world: [[f32; 4]; 4],
    /// RGBA tint, alpha already faded.
    pub color: [f32; 4],
}

impl ParticleInstance {
    pub fn new(wvp: Mat4, world: Mat4, color: Vec4) -> Self {
        Self {
            wvp: wvp.to_cols_array_2d(),
            world: world.to_cols_array_2d(),
            color: color.to_array(),
        }
    }

    /// WVP columns at 3..=6, world columns at 7..=10, color at 11.
    const ATTRIBUTES: [wgpu::VertexAttribute; 9] = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
        9 => Float32x4,
        10 => Float32x4,
        11 => Float32x4
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

impl Default for ParticleInstance {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec4::ONE)
    }
}

/// World-space line vertex for HUD overlay geometry.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Helper to build world-space HUD line geometry, two vertices per segment.
#[derive(Debug, Default, Clone)]
pub struct LineBatch {
    pub vertices: Vec<LineVertex>,
}

impl LineBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line(&mut self, a: Vec3, b: Vec3, color: Vec4) {
        let color = color.to_array();
        self.vertices.push(LineVertex { position: a.to_array(), color });
        self.vertices.push(LineVertex { position: b.to_array(), color });
    }

    /// Connected segments through `points`.
    pub fn add_polyline(&mut self, points: &[Vec3], color: Vec4) {
        for pair in points.windows(2) {
            self.add_line(pair[0], pair[1], color);
        }
    }

    pub fn line_count(&self) -> usize {
        self.vertices.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_record_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 36 * 4);
        assert_eq!(ParticleInstance::layout().attributes.len(), 9);
    }

    #[test]
    fn layouts_cover_their_records() {
        let cases = [
            (ParticleVertex::layout(), std::mem::size_of::<ParticleVertex>()),
            (ParticleInstance::layout(), std::mem::size_of::<ParticleInstance>()),
            (LineVertex::layout(), std::mem::size_of::<LineVertex>()),
        ];
        for (layout, size) in cases {
            assert_eq!(layout.array_stride, size as wgpu::BufferAddress);
            let end = layout.attributes.iter().map(|a| a.offset + a.format.size()).max().unwrap();
            assert_eq!(end, layout.array_stride);
        }
        assert_eq!(ParticleInstance::layout().step_mode, wgpu::VertexStepMode::Instance);
        assert_eq!(ParticleVertex::layout().step_mode, wgpu::VertexStepMode::Vertex);
    }

    #[test]
    fn polyline_emits_segment_pairs() {
        let mut batch = LineBatch::new();
        batch.add_polyline(&[Vec3::ZERO, Vec3::X, Vec3::Y], Vec4::ONE);
        assert_eq!(batch.line_count(), 2);
        assert_eq!(batch.vertices[1].position, batch.vertices[2].position);
    }
}
