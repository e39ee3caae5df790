//! Particle shape geometry.
//!
//! All shapes are tessellated once into a single vertex buffer; particle groups keep
//! only the range of their shape, so groups sharing a shape share geometry.

use crate::vertex::ParticleVertex;
use glam::Vec3;
use std::f32::consts::TAU;

/// Radial segments used for rings and cylinders.
pub const SHAPE_SEGMENTS: u32 = 32;

/// Geometry a particle group draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleShape {
    /// Unit quad in the XY plane facing -Z. Usually billboarded.
    Board,
    /// Flat annulus in the XY plane.
    Ring,
    /// Capped cylinder standing on the XZ plane.
    Cylinder,
}

impl ParticleShape {
    pub const ALL: [ParticleShape; 3] = [ParticleShape::Board, ParticleShape::Ring, ParticleShape::Cylinder];

    fn slot(self) -> usize {
        match self {
            ParticleShape::Board => 0,
            ParticleShape::Ring => 1,
            ParticleShape::Cylinder => 2,
        }
    }
}

/// Size parameters for the generated shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeParams {
    pub ring_outer_radius: f32,
    pub ring_inner_radius: f32,
    pub cylinder_radius: f32,
    pub cylinder_height: f32,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            ring_outer_radius: 1.0,
            ring_inner_radius: 0.2,
            cylinder_radius: 1.0,
            cylinder_height: 3.0,
        }
    }
}

/// Slice of the shared vertex buffer belonging to one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeRange {
    pub offset: u32,
    pub count: u32,
}

/// Vertices of every particle shape, back to back.
#[derive(Debug, Clone)]
pub struct ShapeBuffer {
    vertices: Vec<ParticleVertex>,
    ranges: [ShapeRange; 3],
}

impl ShapeBuffer {
    pub fn build(params: &ShapeParams) -> Self {
        let mut vertices = Vec::new();
        let mut ranges = [ShapeRange { offset: 0, count: 0 }; 3];
        for shape in ParticleShape::ALL {
            let offset = vertices.len() as u32;
            match shape {
                ParticleShape::Board => push_board(&mut vertices),
                ParticleShape::Ring => push_ring(&mut vertices, params.ring_outer_radius, params.ring_inner_radius),
                ParticleShape::Cylinder => push_cylinder(&mut vertices, params.cylinder_radius, params.cylinder_height),
            }
            ranges[shape.slot()] = ShapeRange {
                offset,
                count: vertices.len() as u32 - offset,
            };
        }
        log::debug!("Built particle shape buffer with {} vertices", vertices.len());
        Self { vertices, ranges }
    }

    pub fn range(&self, shape: ParticleShape) -> ShapeRange {
        self.ranges[shape.slot()]
    }

    pub fn vertices(&self) -> &[ParticleVertex] {
        &self.vertices
    }

    /// Vertices of one shape.
    pub fn shape_vertices(&self, shape: ParticleShape) -> &[ParticleVertex] {
        let r = self.range(shape);
        &self.vertices[r.offset as usize..(r.offset + r.count) as usize]
    }
}

impl Default for ShapeBuffer {
    fn default() -> Self {
        Self::build(&ShapeParams::default())
    }
}

fn push_board(out: &mut Vec<ParticleVertex>) {
    let n = -Vec3::Z;
    let lt = ParticleVertex::new(Vec3::new(-0.5, 0.5, 0.0), n, [0.0, 0.0]);
    let rt = ParticleVertex::new(Vec3::new(0.5, 0.5, 0.0), n, [1.0, 0.0]);
    let lb = ParticleVertex::new(Vec3::new(-0.5, -0.5, 0.0), n, [0.0, 1.0]);
    let rb = ParticleVertex::new(Vec3::new(0.5, -0.5, 0.0), n, [1.0, 1.0]);
    out.extend_from_slice(&[lt, rt, lb, lb, rt, rb]);
}

fn push_ring(out: &mut Vec<ParticleVertex>, outer: f32, inner: f32) {
    let n = -Vec3::Z;
    let step = TAU / SHAPE_SEGMENTS as f32;
    for i in 0..SHAPE_SEGMENTS {
        let (s0, c0) = (i as f32 * step).sin_cos();
        let (s1, c1) = ((i + 1) as f32 * step).sin_cos();
        let u0 = i as f32 / SHAPE_SEGMENTS as f32;
        let u1 = (i + 1) as f32 / SHAPE_SEGMENTS as f32;
        let outer0 = ParticleVertex::new(Vec3::new(-s0 * outer, c0 * outer, 0.0), n, [u0, 0.0]);
        let outer1 = ParticleVertex::new(Vec3::new(-s1 * outer, c1 * outer, 0.0), n, [u1, 0.0]);
        let inner0 = ParticleVertex::new(Vec3::new(-s0 * inner, c0 * inner, 0.0), n, [u0, 1.0]);
        let inner1 = ParticleVertex::new(Vec3::new(-s1 * inner, c1 * inner, 0.0), n, [u1, 1.0]);
        out.extend_from_slice(&[outer0, outer1, inner0, inner0, outer1, inner1]);
    }
}

fn push_cylinder(out: &mut Vec<ParticleVertex>, radius: f32, height: f32) {
    let step = TAU / SHAPE_SEGMENTS as f32;
    let rim = |i: u32, y: f32| {
        let (s, c) = (i as f32 * step).sin_cos();
        Vec3::new(-s * radius, y, c * radius)
    };

    // Top cap
    for i in 0..SHAPE_SEGMENTS {
        let u = i as f32 / SHAPE_SEGMENTS as f32;
        out.push(ParticleVertex::new(Vec3::new(0.0, height, 0.0), Vec3::Y, [0.5, 0.5]));
        out.push(ParticleVertex::new(rim(i, height), Vec3::Y, [u, 0.0]));
        out.push(ParticleVertex::new(rim(i + 1, height), Vec3::Y, [u, 0.0]));
    }

    // Bottom cap
    for i in 0..SHAPE_SEGMENTS {
        let u = i as f32 / SHAPE_SEGMENTS as f32;
        out.push(ParticleVertex::new(Vec3::ZERO, -Vec3::Y, [0.5, 0.5]));
        out.push(ParticleVertex::new(rim(i + 1, 0.0), -Vec3::Y, [u, 1.0]));
        out.push(ParticleVertex::new(rim(i, 0.0), -Vec3::Y, [u, 1.0]));
    }

    // Sides
    for i in 0..SHAPE_SEGMENTS {
        let u0 = i as f32 / SHAPE_SEGMENTS as f32;
        let u1 = (i + 1) as f32 / SHAPE_SEGMENTS as f32;
        let n0 = rim(i, 0.0).normalize_or_zero();
        let n1 = rim(i + 1, 0.0).normalize_or_zero();
        let top0 = ParticleVertex::new(rim(i, height), n0, [u0, 0.0]);
        let top1 = ParticleVertex::new(rim(i + 1, height), n1, [u1, 0.0]);
        let bottom0 = ParticleVertex::new(rim(i, 0.0), n0, [u0, 1.0]);
        let bottom1 = ParticleVertex::new(rim(i + 1, 0.0), n1, [u1, 1.0]);
        out.extend_from_slice(&[top0, top1, bottom0, bottom0, top1, bottom1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_vertex_counts() {
        let buffer = ShapeBuffer::default();
        assert_eq!(buffer.range(ParticleShape::Board).count, 6);
        assert_eq!(buffer.range(ParticleShape::Ring).count, SHAPE_SEGMENTS * 6);
        assert_eq!(buffer.range(ParticleShape::Cylinder).count, SHAPE_SEGMENTS * 12);
        assert_eq!(buffer.vertices().len(), (6 + SHAPE_SEGMENTS * 18) as usize);
    }

    #[test]
    fn ranges_are_contiguous() {
        let buffer = ShapeBuffer::default();
        let board = buffer.range(ParticleShape::Board);
        let ring = buffer.range(ParticleShape::Ring);
        let cylinder = buffer.range(ParticleShape::Cylinder);
        assert_eq!(board.offset, 0);
        assert_eq!(ring.offset, board.count);
        assert_eq!(cylinder.offset, ring.offset + ring.count);
    }

    #[test]
    fn ring_respects_configured_radii() {
        let params = ShapeParams {
            ring_outer_radius: 2.0,
            ring_inner_radius: 0.5,
            ..Default::default()
        };
        let buffer = ShapeBuffer::build(&params);
        for v in buffer.shape_vertices(ParticleShape::Ring) {
            let r = Vec3::from_array(v.position).length();
            assert!((r - 2.0).abs() < 1e-4 || (r - 0.5).abs() < 1e-4, "radius {}", r);
        }
    }

    #[test]
    fn cylinder_spans_configured_height() {
        let params = ShapeParams {
            cylinder_height: 4.0,
            ..Default::default()
        };
        let buffer = ShapeBuffer::build(&params);
        let max_y = buffer
            .shape_vertices(ParticleShape::Cylinder)
            .iter()
            .map(|v| v.position[1])
            .fold(f32::MIN, f32::max);
        assert!((max_y - 4.0).abs() < 1e-6);
    }
}
