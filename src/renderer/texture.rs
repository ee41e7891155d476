// renderer/texture.rs
use std::num::NonZeroU32;
use std::path::Path;

use glam::UVec2;

use crate::asset::SlotTable;
use crate::renderer::error::RenderError;

pub const MAX_TEXTURES: usize = 256;

/// Non-owning reference to a texture registered in a [`TextureTable`].
///
/// `slot` indexes the texture binding array the tile fragment shader samples
/// from; `size` is the image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRef {
    pub slot: u32,
    pub size: UVec2,
}

/// Byte length of tightly packed RGBA8 pixels, or `None` if it overflows.
fn rgba8_len(size: UVec2) -> Option<usize> {
    (size.x as usize)
        .checked_mul(size.y as usize)?
        .checked_mul(4)
}

struct Texture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Every texture the tile program can see, bound as one binding array at
/// bind group 1. Slots without a texture point at a 1x1 fallback.
pub struct TextureTable {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    _fallback_texture: wgpu::Texture,
    fallback_view: wgpu::TextureView,
    textures: SlotTable<Texture>,
    bind_group: wgpu::BindGroup,
}

impl TextureTable {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("TextureArrayBindGroupLayout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: NonZeroU32::new(MAX_TEXTURES as u32),
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // Pixel-art sprites: nearest when magnified, linear when minified.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("TileSampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let fallback_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("FallbackTexture"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let fallback_view = fallback_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = Self::create_bind_group(
            device,
            &layout,
            &sampler,
            vec![&fallback_view; MAX_TEXTURES],
        );

        Self {
            layout,
            sampler,
            _fallback_texture: fallback_texture,
            fallback_view,
            textures: SlotTable::new("Texture Table", MAX_TEXTURES),
            bind_group,
        }
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        views: Vec<&wgpu::TextureView>,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("TextureArrayBindGroup"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureViewArray(&views),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn rebuild_bind_group(&mut self, device: &wgpu::Device) {
        let fallback = &self.fallback_view;
        let registered: Vec<&wgpu::TextureView> =
            self.textures.iter().map(|texture| &texture.view).collect();
        let views: Vec<&wgpu::TextureView> = (0..MAX_TEXTURES)
            .map(|slot| registered.get(slot).copied().unwrap_or(fallback))
            .collect();

        self.bind_group = Self::create_bind_group(device, &self.layout, &self.sampler, views);
    }

    /// Uploads tightly packed RGBA8 pixels into the next free slot.
    pub fn register_rgba8(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        size: UVec2,
        pixels: &[u8],
    ) -> Result<TextureRef, RenderError> {
        assert_eq!(
            Some(pixels.len()),
            rgba8_len(size),
            "texture '{}' pixel data does not match {}x{} RGBA8",
            label,
            size.x,
            size.y
        );
        if self.textures.is_full() {
            return Err(RenderError::TextureTableFull(self.textures.limit()));
        }

        let extent = wgpu::Extent3d {
            width: size.x,
            height: size.y,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.x),
                rows_per_image: Some(size.y),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let handle = self.textures.insert(Texture {
            _texture: texture,
            view,
        });
        self.rebuild_bind_group(device);

        log::info!("Registered texture '{}' ({}x{}) in slot {}", label, size.x, size.y, handle.index());
        Ok(TextureRef {
            slot: handle.index() as u32,
            size,
        })
    }

    pub fn load(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
    ) -> Result<TextureRef, RenderError> {
        let path = path.as_ref();
        log::info!("Loading texture: {:?}", path);

        let img = image::open(path).map_err(|source| RenderError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let label = path.to_string_lossy();
        self.register_rgba8(device, queue, &label, UVec2::new(width, height), &rgba)
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba8_len_counts_four_bytes_per_pixel() {
        assert_eq!(rgba8_len(UVec2::new(40, 120)), Some(40 * 120 * 4));
        assert_eq!(rgba8_len(UVec2::ZERO), Some(0));
    }

    #[test]
    fn rgba8_len_of_huge_sizes_does_not_wrap() {
        let huge = UVec2::new(u32::MAX, u32::MAX);
        let expected = (u32::MAX as u128) * (u32::MAX as u128) * 4;
        match rgba8_len(huge) {
            Some(len) => assert_eq!(len as u128, expected),
            None => assert!(expected > usize::MAX as u128),
        }
        // 65536 x 65536 wraps to zero in u32 arithmetic
        assert_ne!(rgba8_len(UVec2::new(65536, 65536)), Some(0));
    }
}
