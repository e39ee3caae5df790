//! GPU side of particle drawing.
//!
//! The shared shape vertex buffer is uploaded once. Each frame, instanced draws are
//! copied into one instance buffer at increasing offsets and replayed into a render pass.

use crate::shapes::ShapeBuffer;
use crate::submit::{InstanceSink, InstancedDraw};
use crate::texture::GpuTextureStore;
use crate::vertex::ParticleInstance;
use wgpu::util::DeviceExt;

/// One queued draw: a shape range replayed over a slice of the instance buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDraw {
    pub first_vertex: u32,
    pub vertex_count: u32,
    pub texture: u32,
    pub first_instance: u32,
    pub instance_count: u32,
}

/// Per-frame instance slot allocation, without any device state.
#[derive(Debug, Clone)]
pub struct DrawQueue {
    capacity: u32,
    /// Next free slot, in instances.
    offset: u32,
    pending: Vec<PendingDraw>,
}

impl DrawQueue {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            offset: 0,
            pending: Vec::new(),
        }
    }

    /// Queue `draw`, truncated to the free slots. Returns the queued draw, or `None` once
    /// the buffer is full.
    pub fn reserve(&mut self, draw: &InstancedDraw<'_>) -> Option<PendingDraw> {
        let count = reserve_instances(self.offset, self.capacity, draw.instances.len());
        if count == 0 {
            return None;
        }
        let pending = PendingDraw {
            first_vertex: draw.first_vertex,
            vertex_count: draw.vertex_count,
            texture: draw.texture,
            first_instance: self.offset,
            instance_count: count as u32,
        };
        self.offset += count as u32;
        self.pending.push(pending);
        Some(pending)
    }

    pub fn clear(&mut self) {
        self.offset = 0;
        self.pending.clear();
    }

    pub fn draws(&self) -> &[PendingDraw] {
        &self.pending
    }

    pub fn used(&self) -> u32 {
        self.offset
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

/// Batches particle draws for one frame.
pub struct ParticleBatcher {
    shape_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    queue: DrawQueue,
}

impl ParticleBatcher {
    pub fn new(device: &wgpu::Device, shapes: &ShapeBuffer, max_instances: u32) -> Self {
        let shape_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Shape Buffer"),
            contents: bytemuck::cast_slice(shapes.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Instance Buffer"),
            size: (std::mem::size_of::<ParticleInstance>() * max_instances as usize) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            shape_buffer,
            instance_buffer,
            queue: DrawQueue::new(max_instances),
        }
    }

    /// Forget last frame's draws.
    pub fn begin_frame(&mut self) {
        self.queue.clear();
    }

    /// Sink that uploads through `queue` into this batcher.
    pub fn sink<'a>(&'a mut self, queue: &'a wgpu::Queue) -> BatchSink<'a> {
        BatchSink { batcher: self, queue }
    }

    /// Replay queued draws. The caller has set the pipeline and camera bind group; texture
    /// bind groups go to `texture_group`.
    pub fn encode<'p>(
        &'p self,
        pass: &mut wgpu::RenderPass<'p>,
        textures: &'p GpuTextureStore,
        texture_group: u32,
    ) {
        if self.queue.draws().is_empty() {
            return;
        }
        pass.set_vertex_buffer(0, self.shape_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        for draw in self.queue.draws() {
            let Some(bind_group) = textures.bind_group(draw.texture) else {
                continue;
            };
            pass.set_bind_group(texture_group, bind_group, &[]);
            pass.draw(
                draw.first_vertex..draw.first_vertex + draw.vertex_count,
                draw.first_instance..draw.first_instance + draw.instance_count,
            );
        }
    }

    pub fn pending_draws(&self) -> usize {
        self.queue.draws().len()
    }
}

/// How many of `requested` instances still fit after `offset` of `capacity` are used.
fn reserve_instances(offset: u32, capacity: u32, requested: usize) -> usize {
    requested.min(capacity.saturating_sub(offset) as usize)
}

/// [`InstanceSink`] that writes into a [`ParticleBatcher`].
pub struct BatchSink<'a> {
    batcher: &'a mut ParticleBatcher,
    queue: &'a wgpu::Queue,
}

impl InstanceSink for BatchSink<'_> {
    fn draw_instanced(&mut self, draw: InstancedDraw<'_>) {
        let b = &mut *self.batcher;
        let Some(slot) = b.queue.reserve(&draw) else {
            return;
        };
        let byte_offset = (slot.first_instance as usize * std::mem::size_of::<ParticleInstance>()) as u64;
        let count = slot.instance_count as usize;
        self.queue
            .write_buffer(&b.instance_buffer, byte_offset, bytemuck::cast_slice(&draw.instances[..count]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservation_stops_at_capacity() {
        assert_eq!(reserve_instances(0, 1024, 10), 10);
        assert_eq!(reserve_instances(1020, 1024, 10), 4);
        assert_eq!(reserve_instances(1024, 1024, 10), 0);
        assert_eq!(reserve_instances(2000, 1024, 10), 0);
    }

    fn draw(texture: u32, instances: &[ParticleInstance]) -> InstancedDraw<'_> {
        InstancedDraw {
            first_vertex: 6,
            vertex_count: 192,
            texture,
            instances,
        }
    }

    #[test]
    fn draws_get_consecutive_instance_ranges() {
        let instances = vec![ParticleInstance::default(); 5];
        let mut queue = DrawQueue::new(16);
        let a = queue.reserve(&draw(0, &instances[..3])).unwrap();
        let b = queue.reserve(&draw(1, &instances)).unwrap();
        assert_eq!((a.first_instance, a.instance_count), (0, 3));
        assert_eq!((b.first_instance, b.instance_count), (3, 5));
        assert_eq!((b.first_vertex, b.vertex_count, b.texture), (6, 192, 1));
        assert_eq!(queue.draws(), &[a, b]);
        assert_eq!(queue.used(), 8);
    }

    #[test]
    fn full_queue_truncates_then_drops() {
        let instances = vec![ParticleInstance::default(); 5];
        let mut queue = DrawQueue::new(8);
        queue.reserve(&draw(0, &instances)).unwrap();
        let partial = queue.reserve(&draw(0, &instances)).unwrap();
        assert_eq!((partial.first_instance, partial.instance_count), (5, 3));
        assert!(queue.reserve(&draw(0, &instances)).is_none());
        assert!(queue.reserve(&draw(0, &[])).is_none());
        assert_eq!(queue.draws().len(), 2);
        assert_eq!(queue.used(), queue.capacity());
    }

    #[test]
    fn clear_starts_a_new_frame() {
        let instances = vec![ParticleInstance::default(); 4];
        let mut queue = DrawQueue::new(4);
        queue.reserve(&draw(0, &instances)).unwrap();
        queue.clear();
        assert!(queue.draws().is_empty());
        let again = queue.reserve(&draw(2, &instances)).unwrap();
        assert_eq!(again.first_instance, 0);
    }
}
