//! Shading state for full-screen quad draws.

use rustc_hash::FxHashMap;

use super::pipeline_helpers::{
    create_quad_pipeline, filtering_sampler, texture_2d, vertex_uniform_buffer,
};

/// Bind group layouts shared by every quad material.
///
/// Group 0 holds the quad camera uniform, group 1 the input texture and
/// its sampler.
pub struct QuadLayouts {
    /// Camera uniform layout (group 0).
    pub camera: wgpu::BindGroupLayout,
    /// Input texture and sampler layout (group 1).
    pub input: wgpu::BindGroupLayout,
}

impl QuadLayouts {
    /// Create both layouts.
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let camera = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Quad Camera Layout"),
            entries: &[vertex_uniform_buffer(0)],
        });
        let input = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Quad Input Layout"),
            entries: &[texture_2d(0), filtering_sampler(1)],
        });
        Self { camera, input }
    }
}

/// A quad shader with one pipeline per destination format.
///
/// Pipelines are built up front for every format the renderer can draw
/// into, so drawing never has to compile anything.
pub struct QuadMaterial {
    label: String,
    pipelines: FxHashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
}

impl QuadMaterial {
    /// Build pipelines for `shader` targeting each of `formats`.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        shader: &wgpu::ShaderModule,
        layouts: &QuadLayouts,
        formats: &[wgpu::TextureFormat],
    ) -> Self {
        let mut pipelines = FxHashMap::default();
        for &format in formats {
            let _ = pipelines.entry(format).or_insert_with(|| {
                create_quad_pipeline(
                    device,
                    label,
                    shader,
                    format,
                    &[&layouts.camera, &layouts.input],
                )
            });
        }
        log::debug!("built {label} material for {} formats", pipelines.len());
        Self {
            label: label.to_owned(),
            pipelines,
        }
    }

    /// Debug label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The pipeline drawing into `format`, if the material was built for it.
    #[must_use]
    pub fn pipeline(&self, format: wgpu::TextureFormat) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&format)
    }
}
