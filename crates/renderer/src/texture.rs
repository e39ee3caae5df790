//! Texture lookup for particle groups.
//!
//! Particle code only sees [`TextureCache`]: a name goes in, an opaque index and the
//! pixel size come out. [`GpuTextureStore`] backs it with decoded, uploaded textures and
//! [`TextureIndex`] with a plain name table for headless runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Handle returned for a loaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    pub index: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texture {name:?} not found at {path:?}")]
    NotFound { name: String, path: PathBuf },
    #[error("failed to decode texture {name:?}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
}

/// Resolves texture names to GPU texture slots. Loading the same name twice returns the
/// same slot.
pub trait TextureCache {
    fn load(&mut self, name: &str) -> Result<TextureInfo, TextureError>;
}

/// Name table with caller-provided sizes; never touches the disk.
#[derive(Debug, Default)]
pub struct TextureIndex {
    entries: HashMap<String, TextureInfo>,
}

impl TextureIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a texture name, returning its slot.
    pub fn register(&mut self, name: &str, width: u32, height: u32) -> TextureInfo {
        let next = self.entries.len() as u32;
        *self.entries.entry(name.to_string()).or_insert(TextureInfo {
            index: next,
            width,
            height,
        })
    }

    pub fn get(&self, name: &str) -> Option<TextureInfo> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TextureCache for TextureIndex {
    fn load(&mut self, name: &str) -> Result<TextureInfo, TextureError> {
        self.get(name).ok_or_else(|| TextureError::NotFound {
            name: name.to_string(),
            path: PathBuf::from(name),
        })
    }
}

/// Read and decode `root/name` as RGBA8.
pub fn decode_rgba(root: &Path, name: &str) -> Result<image::RgbaImage, TextureError> {
    let path = root.join(name);
    if !path.is_file() {
        return Err(TextureError::NotFound {
            name: name.to_string(),
            path,
        });
    }
    let decoded = image::open(&path).map_err(|source| TextureError::Decode {
        name: name.to_string(),
        source,
    })?;
    Ok(decoded.to_rgba8())
}

struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// Decoded textures uploaded to the GPU, one bind group per texture.
pub struct GpuTextureStore {
    root: PathBuf,
    /// Slots match positions in `textures`.
    index: TextureIndex,
    textures: Vec<GpuTexture>,
    sampler: wgpu::Sampler,
}

impl GpuTextureStore {
    /// Create an empty store that resolves names relative to `root`.
    pub fn new(device: &wgpu::Device, root: impl AsRef<Path>) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Particle Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        Self {
            root: root.as_ref().to_path_buf(),
            index: TextureIndex::new(),
            textures: Vec::new(),
            sampler,
        }
    }

    /// Layout of the per-texture bind group: texture at 0, sampler at 1.
    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    /// Borrow the store together with the device state needed to upload new textures.
    pub fn loader<'a>(
        &'a mut self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        layout: &'a wgpu::BindGroupLayout,
    ) -> TextureLoader<'a> {
        TextureLoader {
            store: self,
            device,
            queue,
            layout,
        }
    }

    pub fn bind_group(&self, index: u32) -> Option<&wgpu::BindGroup> {
        self.textures.get(index as usize).map(|t| &t.bind_group)
    }
}

/// [`TextureCache`] view of a [`GpuTextureStore`] that can upload on a miss.
pub struct TextureLoader<'a> {
    store: &'a mut GpuTextureStore,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    layout: &'a wgpu::BindGroupLayout,
}

impl TextureCache for TextureLoader<'_> {
    fn load(&mut self, name: &str) -> Result<TextureInfo, TextureError> {
        if let Some(info) = self.store.index.get(name) {
            return Ok(info);
        }

        let rgba = decode_rgba(&self.store.root, name)?;
        let (width, height) = rgba.dimensions();

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(name),
            layout: self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.store.sampler),
                },
            ],
        });

        let info = self.store.index.register(name, width, height);
        debug_assert_eq!(info.index as usize, self.store.textures.len());
        self.store.textures.push(GpuTexture {
            _texture: texture,
            bind_group,
        });
        log::info!("Loaded texture {:?} ({}x{}) into slot {}", name, width, height, info.index);
        Ok(info)
    }
}
