//! Draw submission seam between simulation code and the GPU.

use crate::vertex::ParticleInstance;

/// "Draw these instances of this shape with this texture."
#[derive(Debug, Clone, Copy)]
pub struct InstancedDraw<'a> {
    /// First vertex of the shape in the shared shape buffer.
    pub first_vertex: u32,
    pub vertex_count: u32,
    /// Texture slot from a [`crate::TextureCache`].
    pub texture: u32,
    pub instances: &'a [ParticleInstance],
}

/// Receiver of instanced draw requests.
pub trait InstanceSink {
    fn draw_instanced(&mut self, draw: InstancedDraw<'_>);
}

/// One draw captured by [`DrawLog`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub first_vertex: u32,
    pub vertex_count: u32,
    pub texture: u32,
    pub instances: Vec<ParticleInstance>,
}

/// Sink that keeps draws on the CPU.
#[derive(Debug, Default)]
pub struct DrawLog {
    pub draws: Vec<RecordedDraw>,
}

impl DrawLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instance_total(&self) -> usize {
        self.draws.iter().map(|d| d.instances.len()).sum()
    }

    pub fn clear(&mut self) {
        self.draws.clear();
    }
}

impl InstanceSink for DrawLog {
    fn draw_instanced(&mut self, draw: InstancedDraw<'_>) {
        self.draws.push(RecordedDraw {
            first_vertex: draw.first_vertex,
            vertex_count: draw.vertex_count,
            texture: draw.texture,
            instances: draw.instances.to_vec(),
        });
    }
}
