//! Offscreen render targets allocated from a [`RenderTargetPreset`].

use crate::preset::{Filter, PixelFormat, RenderTargetPreset};

/// wgpu filter mode for a preset filter.
#[must_use]
pub const fn filter_mode(filter: Filter) -> wgpu::FilterMode {
    match filter {
        Filter::Linear => wgpu::FilterMode::Linear,
        Filter::Nearest => wgpu::FilterMode::Nearest,
    }
}

/// Texture format for a preset pixel format.
///
/// Alpha-less targets use the packed `Rg11b10Ufloat` format when the device
/// can render into it, and fall back to `Rgba8Unorm` otherwise.
#[must_use]
pub fn texture_format(format: PixelFormat, features: wgpu::Features) -> wgpu::TextureFormat {
    match format {
        PixelFormat::Rgba => wgpu::TextureFormat::Rgba8Unorm,
        PixelFormat::Rgb if features.contains(wgpu::Features::RG11B10UFLOAT_RENDERABLE) => {
            wgpu::TextureFormat::Rg11b10Ufloat
        }
        PixelFormat::Rgb => wgpu::TextureFormat::Rgba8Unorm,
    }
}

/// A render-target texture with its default view and sampler.
///
/// The texture is created with `RENDER_ATTACHMENT | TEXTURE_BINDING |
/// COPY_SRC` usage, so it can be drawn into, sampled by the next pass and
/// read back.
pub struct RenderTarget {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
    /// Sampler using the preset's filters.
    pub sampler: wgpu::Sampler,
    preset: RenderTargetPreset,
    format: wgpu::TextureFormat,
}

impl RenderTarget {
    /// Allocate a `width` x `height` target configured by `preset`.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        preset: RenderTargetPreset,
    ) -> Self {
        let format = texture_format(preset.format(), device.features());
        let texture = Self::create_texture(device, width, height, format);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(preset.name()),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter_mode(preset.mag_filter()),
            min_filter: filter_mode(preset.min_filter()),
            ..Default::default()
        });
        Self {
            texture,
            view,
            sampler,
            preset,
            format,
        }
    }

    fn create_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("RenderTarget"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    /// Reallocate the texture at a new size. Contents are lost.
    ///
    /// The old texture is dropped, not destroyed: a command buffer that
    /// still references it keeps it alive until submission.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.texture = Self::create_texture(device, width, height, self.format);
        self.view = self
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
    }

    /// The preset this target was allocated with.
    #[must_use]
    pub const fn preset(&self) -> RenderTargetPreset {
        self.preset
    }

    /// The texture format chosen for the preset.
    #[must_use]
    pub const fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Current size in texels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}
