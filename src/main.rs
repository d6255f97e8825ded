//! Interactive viewer: renders a spinning triangle through a pass chain.
//!
//! Usage: `postfx-viewer [options.toml] [pipeline.json]`
//!
//! Without a pipeline document the chain is a scene pass followed by a copy
//! pass drawing to the screen. Keys: `C` switches the last pass between
//! direct and copied screen output, `Space` toggles the first pass, `S`
//! saves the chain to `pipeline.json`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::Mat4;
use postfx::composer::PassComposer;
use postfx::error::PostFxError;
use postfx::gpu::{QuadMaterial, RenderContext, SceneDraw, WgpuRenderer};
use postfx::options::Options;
use postfx::pass::{Pass, PassRegistry, ScreenOutput};
use postfx::passes::{CopyPass, ScenePass};
use rustc_hash::FxHashMap;
use web_time::Instant;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

const SAVE_PATH: &str = "pipeline.json";
const TITLE_REFRESH_FRAMES: u64 = 30;

/// One triangle, drawn with a pipeline per destination format.
struct DemoScene {
    pipelines: FxHashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
    camera_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl DemoScene {
    fn new(device: &wgpu::Device, formats: &[wgpu::TextureFormat]) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Demo Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../assets/shaders/demo_scene.wgsl").into(),
            ),
        });
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Demo Scene Layout"),
            entries: &[postfx::gpu::pipeline_helpers::vertex_uniform_buffer(0)],
        });
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Demo Camera Buffer"),
            size: std::mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Demo Scene Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });
        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Demo Scene Pipeline Layout"),
                bind_group_layouts: &[&layout],
                immediate_size: 0,
            });

        let mut pipelines = FxHashMap::default();
        for &format in formats {
            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Demo Scene Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });
            let _ = pipelines.insert(format, pipeline);
        }

        Self {
            pipelines,
            camera_buffer,
            bind_group,
        }
    }
}

impl SceneDraw for DemoScene {
    fn draw(
        &self,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        format: wgpu::TextureFormat,
        view_proj: &Mat4,
    ) {
        let Some(pipeline) = self.pipelines.get(&format) else {
            log::warn!("demo scene has no pipeline for {format:?}");
            return;
        };
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&view_proj.to_cols_array()),
        );
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

struct Viewer {
    context: RenderContext,
    renderer: WgpuRenderer,
    composer: PassComposer<WgpuRenderer>,
    scene: DemoScene,
    started: Instant,
    frames: u64,
}

impl Viewer {
    fn new(
        window: Arc<Window>,
        options: &Options,
        pipeline_path: Option<&Path>,
    ) -> Result<Self, PostFxError> {
        let size = window.inner_size();
        let context =
            pollster::block_on(RenderContext::new(window, (size.width, size.height)))?;
        log::info!(
            "packed float RGB targets: {}",
            context.supports_rgb_float_targets()
        );
        let mut renderer = WgpuRenderer::new(&context);
        let scene = DemoScene::new(&context.device, &renderer.destination_formats());

        let mut composer = match pipeline_path {
            Some(path) => {
                let json = std::fs::read_to_string(path)?;
                let registry = PassRegistry::with_builtins();
                PassComposer::from_json(&mut renderer, &registry, &options.composer, &json)?
            }
            None => Self::default_chain(&mut renderer, options),
        };
        let (width, height) = context.size();
        composer.set_size(&mut renderer, width, height);
        log::info!("pipeline has {} passes", composer.len());

        Ok(Self {
            context,
            renderer,
            composer,
            scene,
            started: Instant::now(),
            frames: 0,
        })
    }

    fn default_chain(
        renderer: &mut WgpuRenderer,
        options: &Options,
    ) -> PassComposer<WgpuRenderer> {
        let mut composer = PassComposer::new(renderer, &options.composer);
        let _ = composer.add_pass(renderer, ScenePass::new());
        let mut copy = CopyPass::<QuadMaterial>::new();
        copy.state_mut().set_output(ScreenOutput::Direct);
        copy.state_mut().set_needs_buffer_swap(false);
        let _ = composer.add_pass(renderer, copy);
        composer
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        self.composer.set_size(&mut self.renderer, width, height);
    }

    fn toggle_copy_to_screen(&mut self) {
        let Some(id) = self.composer.passes().last().map(|pass| pass.id()) else {
            return;
        };
        if let Some(pass) = self.composer.pass_mut(id) {
            let next = match pass.state().output() {
                ScreenOutput::Direct => ScreenOutput::Copy,
                ScreenOutput::Copy | ScreenOutput::Offscreen => ScreenOutput::Direct,
            };
            pass.state_mut().set_output(next);
            log::info!("{} pass {id} now renders {next:?}", pass.kind());
        }
    }

    fn toggle_first_pass(&mut self) {
        let Some(id) = self.composer.passes().first().map(|pass| pass.id()) else {
            return;
        };
        if let Some(pass) = self.composer.pass_mut(id) {
            let enabled = !pass.state().enabled();
            pass.state_mut().set_enabled(enabled);
            log::info!("{} pass {id} enabled: {enabled}", pass.kind());
        }
    }

    fn save(&self) {
        let result = self
            .composer
            .to_json()
            .and_then(|json| std::fs::write(SAVE_PATH, json).map_err(PostFxError::Io));
        match result {
            Ok(()) => log::info!("saved pipeline to {SAVE_PATH}"),
            Err(e) => log::error!("saving pipeline failed: {e}"),
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.get_next_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let camera = Mat4::from_rotation_z(self.started.elapsed().as_secs_f32());

        self.renderer.begin_frame(Some(view));
        self.composer
            .render_frame(&mut self.renderer, &self.scene, &camera);
        self.renderer.end_frame();
        frame.present();
        self.frames += 1;
        Ok(())
    }

    /// Window title with the smoothed frame rate, every few frames.
    fn title_update(&self) -> Option<String> {
        (self.frames % TITLE_REFRESH_FRAMES == 0)
            .then(|| format!("postfx ({:.0} fps)", self.composer.fps()))
    }

    fn dispose(self) {
        let Self {
            mut renderer,
            composer,
            ..
        } = self;
        composer.dispose(&mut renderer);
        log::debug!(
            "viewer closed with {} targets, {} materials live",
            renderer.live_targets(),
            renderer.live_materials()
        );
    }
}

struct ViewerApp {
    window: Option<Arc<Window>>,
    viewer: Option<Viewer>,
    options: Options,
    pipeline_path: Option<PathBuf>,
    error: Option<PostFxError>,
}

impl ViewerApp {
    fn new(options: Options, pipeline_path: Option<PathBuf>) -> Self {
        Self {
            window: None,
            viewer: None,
            options,
            pipeline_path,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: PostFxError) {
        log::error!("{error}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn handle_key(&mut self, code: KeyCode) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };
        match code {
            KeyCode::KeyC => viewer.toggle_copy_to_screen(),
            KeyCode::Space => viewer.toggle_first_pass(),
            KeyCode::KeyS => viewer.save(),
            _ => {}
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title("postfx")
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.options.composer.width,
                self.options.composer.height,
            ));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, PostFxError::Viewer(e.to_string()));
                return;
            }
        };

        match Viewer::new(
            Arc::clone(&window),
            &self.options,
            self.pipeline_path.as_deref(),
        ) {
            Ok(viewer) => self.viewer = Some(viewer),
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        }
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(viewer) = self.viewer.take() {
                    viewer.dispose();
                }
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(viewer) = &mut self.viewer {
                    viewer.resize(size.width, size.height);
                }
            }

            WindowEvent::RedrawRequested => {
                if let (Some(window), Some(viewer)) = (&self.window, &mut self.viewer) {
                    match viewer.render() {
                        Ok(()) => {
                            if let Some(title) = viewer.title_update() {
                                window.set_title(&title);
                            }
                        }
                        Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                            let inner = window.inner_size();
                            viewer.resize(inner.width, inner.height);
                        }
                        Err(e) => log::error!("render error: {e:?}"),
                    }
                    window.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        self.handle_key(code);
                    }
                }
            }

            _ => (),
        }
    }
}

fn run() -> Result<(), PostFxError> {
    let mut args = std::env::args().skip(1);
    let options = match args.next() {
        Some(path) => Options::load(Path::new(&path))?,
        None => Options::default(),
    };
    let pipeline_path = args.next().map(PathBuf::from);

    let event_loop = EventLoop::new().map_err(|e| PostFxError::Viewer(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(options, pipeline_path);
    event_loop
        .run_app(&mut app)
        .map_err(|e| PostFxError::Viewer(e.to_string()))?;
    app.error.take().map_or(Ok(()), Err)
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
