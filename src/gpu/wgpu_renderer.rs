//! [`Renderer`] implementation on wgpu.
//!
//! All draws of a frame are recorded into one command encoder, opened by
//! [`WgpuRenderer::begin_frame`] (or lazily by the first draw) and
//! submitted by [`WgpuRenderer::end_frame`]. The screen is whatever view
//! the caller hands to `begin_frame`; screen draws without one are skipped.

use glam::Mat4;
use wgpu::util::DeviceExt;

use super::material::{QuadLayouts, QuadMaterial};
use super::pipeline_helpers::color_ops;
use super::render_context::RenderContext;
use super::texture::{texture_format, RenderTarget};
use crate::pass::quad::{OrthographicCamera, QuadMesh, QuadRenderable};
use crate::preset::{PixelFormat, RenderTargetPreset};
use crate::renderer::{ClearColor, RenderDestination, Renderer};

/// A scene the wgpu backend can draw.
///
/// Implementors record their draws into `pass`, whose single color
/// attachment has `format`. The pass has no depth attachment.
pub trait SceneDraw {
    /// Record the scene's draw calls.
    fn draw(
        &self,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        format: wgpu::TextureFormat,
        view_proj: &Mat4,
    );
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

/// Geometry and camera binding every quad draw shares.
struct QuadBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
}

/// One full-screen quad draw.
struct QuadDraw<'a> {
    material: &'a QuadMaterial,
    input: &'a RenderTarget,
    view: &'a wgpu::TextureView,
    format: wgpu::TextureFormat,
    index_count: u32,
    clear: Option<ClearColor>,
}

impl QuadBuffers {
    fn new(device: &wgpu::Device, layouts: &QuadLayouts) -> Self {
        let mesh = QuadMesh::new();
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Index Buffer"),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        let camera = CameraUniform {
            view_proj: OrthographicCamera::full_screen()
                .projection()
                .to_cols_array_2d(),
        };
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Camera Buffer"),
            contents: bytemuck::bytes_of(&camera),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Quad Camera Bind Group"),
            layout: &layouts.camera,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });
        Self {
            vertex,
            index,
            camera_bind_group,
        }
    }

    fn encode(
        &self,
        device: &wgpu::Device,
        layouts: &QuadLayouts,
        encoder: &mut wgpu::CommandEncoder,
        draw: &QuadDraw<'_>,
    ) {
        let Some(pipeline) = draw.material.pipeline(draw.format) else {
            log::error!(
                "{} material has no pipeline for {:?}; draw skipped",
                draw.material.label(),
                draw.format
            );
            return;
        };
        let input = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Quad Input Bind Group"),
            layout: &layouts.input,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&draw.input.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&draw.input.sampler),
                },
            ],
        });
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(draw.material.label()),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: draw.view,
                resolve_target: None,
                ops: color_ops(draw.clear),
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        pass.set_bind_group(1, &input, &[]);
        pass.set_vertex_buffer(0, self.vertex.slice(..));
        pass.set_index_buffer(self.index.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..draw.index_count, 0, 0..1);
    }
}

fn create_encoder(device: &wgpu::Device) -> wgpu::CommandEncoder {
    device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Post-Process Encoder"),
    })
}

/// Draws passes with wgpu.
pub struct WgpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    layouts: QuadLayouts,
    copy_shader: wgpu::ShaderModule,
    quad: QuadBuffers,
    blit: QuadMaterial,
    encoder: Option<wgpu::CommandEncoder>,
    screen: Option<wgpu::TextureView>,
    live_targets: usize,
    live_materials: usize,
}

impl WgpuRenderer {
    /// Create the shared quad resources for `context`'s device and surface
    /// format.
    #[must_use]
    pub fn new(context: &RenderContext) -> Self {
        let device = context.device.clone();
        let surface_format = context.format();
        let layouts = QuadLayouts::new(&device);
        let copy_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Copy Shader"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../../assets/shaders/screen/copy.wgsl").into(),
            ),
        });
        let quad = QuadBuffers::new(&device, &layouts);
        let blit = QuadMaterial::new(
            &device,
            "Screen Blit",
            &copy_shader,
            &layouts,
            &[surface_format],
        );
        Self {
            device,
            queue: context.queue.clone(),
            surface_format,
            layouts,
            copy_shader,
            quad,
            blit,
            encoder: None,
            screen: None,
            live_targets: 0,
            live_materials: 0,
        }
    }

    /// Format of the visible framebuffer.
    #[must_use]
    pub const fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Every format a pass may draw into: the surface and both target
    /// pixel formats.
    #[must_use]
    pub fn destination_formats(&self) -> Vec<wgpu::TextureFormat> {
        let features = self.device.features();
        let mut formats = Vec::with_capacity(3);
        for format in [
            self.surface_format,
            texture_format(PixelFormat::Rgba, features),
            texture_format(PixelFormat::Rgb, features),
        ] {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        formats
    }

    /// Targets allocated and not yet released.
    #[must_use]
    pub const fn live_targets(&self) -> usize {
        self.live_targets
    }

    /// Materials handed out and not yet released.
    #[must_use]
    pub const fn live_materials(&self) -> usize {
        self.live_materials
    }

    /// Start a frame drawing to `screen`. `None` renders offscreen only.
    pub fn begin_frame(&mut self, screen: Option<wgpu::TextureView>) {
        if self.encoder.is_some() {
            log::warn!("begin_frame called twice; submitting the previous frame");
            self.end_frame();
        }
        self.encoder = Some(create_encoder(&self.device));
        self.screen = screen;
    }

    /// Submit everything recorded since [`WgpuRenderer::begin_frame`].
    pub fn end_frame(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            let _ = self.queue.submit(std::iter::once(encoder.finish()));
        }
        self.screen = None;
    }

    fn resolve(
        &self,
        destination: RenderDestination<'_, RenderTarget>,
    ) -> Option<(wgpu::TextureView, wgpu::TextureFormat)> {
        match destination {
            RenderDestination::Target(target) => {
                Some((target.view.clone(), target.format()))
            }
            RenderDestination::Screen => {
                if self.screen.is_none() {
                    log::warn!("no screen view for this frame; draw skipped");
                }
                self.screen
                    .clone()
                    .map(|view| (view, self.surface_format))
            }
        }
    }
}

impl Renderer for WgpuRenderer {
    type Target = RenderTarget;
    type Material = QuadMaterial;
    type Scene = dyn SceneDraw;
    type Camera = Mat4;

    fn create_target(
        &mut self,
        width: u32,
        height: u32,
        preset: RenderTargetPreset,
    ) -> RenderTarget {
        self.live_targets += 1;
        let target = RenderTarget::new(&self.device, width, height, preset);
        log::trace!(
            "target {width}x{height} {:?} ({} live)",
            target.format(),
            self.live_targets
        );
        target
    }

    fn resize_target(&mut self, target: &mut RenderTarget, width: u32, height: u32) {
        target.resize(&self.device, width, height);
    }

    fn release_target(&mut self, target: RenderTarget) {
        self.live_targets = self.live_targets.saturating_sub(1);
        log::trace!(
            "released {:?} target ({} live)",
            target.format(),
            self.live_targets
        );
        drop(target);
    }

    fn copy_material(&mut self) -> QuadMaterial {
        self.live_materials += 1;
        QuadMaterial::new(
            &self.device,
            "Copy",
            &self.copy_shader,
            &self.layouts,
            &self.destination_formats(),
        )
    }

    fn release_material(&mut self, material: QuadMaterial) {
        self.live_materials = self.live_materials.saturating_sub(1);
        log::trace!("released {} material", material.label());
    }

    fn render_scene(
        &mut self,
        scene: &Self::Scene,
        camera: &Mat4,
        destination: RenderDestination<'_, RenderTarget>,
        clear: Option<ClearColor>,
    ) {
        let Some((view, format)) = self.resolve(destination) else {
            return;
        };
        let encoder = self
            .encoder
            .get_or_insert_with(|| create_encoder(&self.device));
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: color_ops(clear),
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });
        scene.draw(&self.queue, &mut pass, format, camera);
    }

    fn render_quad(
        &mut self,
        quad: &QuadRenderable<QuadMaterial>,
        material: &QuadMaterial,
        input: &RenderTarget,
        destination: RenderDestination<'_, RenderTarget>,
        clear: Option<ClearColor>,
    ) {
        let Some((view, format)) = self.resolve(destination) else {
            return;
        };
        let encoder = self
            .encoder
            .get_or_insert_with(|| create_encoder(&self.device));
        self.quad.encode(
            &self.device,
            &self.layouts,
            encoder,
            &QuadDraw {
                material,
                input,
                view: &view,
                format,
                index_count: quad.mesh().indices().len() as u32,
                clear,
            },
        );
    }

    fn copy_to_screen(&mut self, source: &RenderTarget) {
        let Some(view) = self.screen.clone() else {
            log::warn!("no screen view for this frame; copy skipped");
            return;
        };
        let encoder = self
            .encoder
            .get_or_insert_with(|| create_encoder(&self.device));
        self.quad.encode(
            &self.device,
            &self.layouts,
            encoder,
            &QuadDraw {
                material: &self.blit,
                input: source,
                view: &view,
                format: self.surface_format,
                index_count: QuadMesh::new().indices().len() as u32,
                clear: None,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::PassComposer;
    use crate::options::ComposerOptions;
    use crate::passes::{CopyPass, ScenePass};

    struct EmptyScene;

    impl SceneDraw for EmptyScene {
        fn draw(
            &self,
            _queue: &wgpu::Queue,
            _pass: &mut wgpu::RenderPass<'_>,
            _format: wgpu::TextureFormat,
            _view_proj: &Mat4,
        ) {
        }
    }

    /// `None` on machines without a usable adapter.
    fn headless() -> Option<(RenderContext, WgpuRenderer)> {
        match pollster::block_on(RenderContext::headless(
            wgpu::TextureFormat::Rgba8Unorm,
            64,
            64,
        )) {
            Ok(context) => {
                let renderer = WgpuRenderer::new(&context);
                Some((context, renderer))
            }
            Err(e) => {
                eprintln!("no GPU adapter, skipping: {e}");
                None
            }
        }
    }

    fn small_composer(renderer: &mut WgpuRenderer) -> PassComposer<WgpuRenderer> {
        let options = ComposerOptions {
            width: 64,
            height: 64,
            ..ComposerOptions::default()
        };
        let mut composer = PassComposer::new(renderer, &options);
        let _ = composer.add_pass(renderer, ScenePass::new());
        let _ = composer.add_pass(renderer, CopyPass::<QuadMaterial>::new());
        composer
    }

    #[test]
    fn headless_context_formats_follow_device_features() {
        let Some((context, renderer)) = headless() else {
            return;
        };
        assert!(!context.has_surface());
        assert_eq!(context.size(), (64, 64));
        assert_eq!(renderer.surface_format(), wgpu::TextureFormat::Rgba8Unorm);
        let packed = renderer
            .destination_formats()
            .contains(&wgpu::TextureFormat::Rg11b10Ufloat);
        assert_eq!(packed, context.supports_rgb_float_targets());
    }

    #[test]
    fn resizing_and_releasing_mid_frame_keeps_the_frame_valid() {
        let Some((_context, mut renderer)) = headless() else {
            return;
        };
        let mut composer = small_composer(&mut renderer);

        renderer.begin_frame(None);
        composer.render(&mut renderer, 16.0, &EmptyScene, &Mat4::IDENTITY);
        composer.set_size(&mut renderer, 32, 32);
        composer.dispose(&mut renderer);
        renderer.end_frame();

        assert_eq!(renderer.live_targets(), 0);
        assert_eq!(renderer.live_materials(), 0);
    }

    #[test]
    fn draws_without_begin_frame_open_an_encoder() {
        let Some((_context, mut renderer)) = headless() else {
            return;
        };
        let mut composer = small_composer(&mut renderer);

        composer.render(&mut renderer, 16.0, &EmptyScene, &Mat4::IDENTITY);
        assert!(renderer.encoder.is_some());
        composer.dispose(&mut renderer);
        renderer.end_frame();
        assert!(renderer.encoder.is_none());
    }
}
