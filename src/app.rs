use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::context::NeHeContext;
use crate::error::NeHeError;
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::screenshot::{self, PendingCapture};

/// A runnable lesson. The implementing type holds all per-lesson state.
///
/// ```ignore
/// struct Lesson1;
///
/// impl nehe::Lesson for Lesson1 {
///     fn config() -> nehe::AppConfig {
///         nehe::AppConfig::new("NeHe's OpenGL Framework")
///     }
///
///     fn init(_ctx: &mut nehe::NeHeContext) -> Result<Self, nehe::NeHeError> {
///         Ok(Lesson1)
///     }
///
///     fn draw(&mut self, ctx: &mut nehe::NeHeContext, frame: &mut nehe::Frame<'_>) {
///         frame.begin_pass(ctx, wgpu::Color::BLACK, "Clear");
///     }
/// }
/// ```
pub trait Lesson: Sized + 'static {
    fn config() -> AppConfig;

    /// Create pipelines, buffers and textures.
    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError>;

    /// Called once after `init` and again whenever the window size changes.
    /// `height` is never zero.
    fn resize(&mut self, _ctx: &mut NeHeContext, _width: u32, _height: u32) {}

    /// Record one frame.
    fn draw(&mut self, ctx: &mut NeHeContext, frame: &mut Frame<'_>);

    /// Key transitions other than the built-in Escape, F1 and F12.
    fn key(&mut self, _ctx: &mut NeHeContext, _key: KeyCode, _down: bool, _repeat: bool) {}

    fn quit(&mut self, _ctx: &mut NeHeContext) {}
}

/// Window settings for a lesson.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Depth attachment format; `None` renders without depth.
    pub depth_format: Option<wgpu::TextureFormat>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "NeHe".to_string(),
            width: 640,
            height: 480,
            depth_format: None,
        }
    }
}

impl AppConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self::default().title(title)
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn depth(mut self, format: wgpu::TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }
}

/// The swapchain image being drawn and the encoder recording into it.
pub struct Frame<'a> {
    pub encoder: wgpu::CommandEncoder,
    pub view: wgpu::TextureView,
    /// Keyboard state, for keys that act while held.
    pub input: &'a Input,
    pub width: u32,
    pub height: u32,
}

impl Frame<'_> {
    /// Begin a pass that clears the swapchain to `clear` and, when the lesson
    /// has a depth buffer, clears depth to the far plane.
    pub fn begin_pass(
        &mut self,
        ctx: &NeHeContext,
        clear: wgpu::Color,
        label: &str,
    ) -> wgpu::RenderPass<'_> {
        let depth_stencil_attachment =
            ctx.depth_view()
                .map(|view| wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                });

        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }

    /// Width over height of the swapchain image.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Open a window and run lesson `L` until it is closed.
pub fn run<L: Lesson>() -> Result<(), NeHeError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = NeHeApp::<L> {
        state: AppState::Pending { config: L::config() },
        error: None,
    };
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

enum AppState<L> {
    Pending {
        config: AppConfig,
    },
    Running {
        window: Arc<Window>,
        ctx: NeHeContext,
        lesson: L,
        input: Input,
        capture_requested: bool,
    },
    Stopped,
}

struct NeHeApp<L> {
    state: AppState<L>,
    error: Option<NeHeError>,
}

impl<L: Lesson> NeHeApp<L> {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: NeHeError) {
        log::error!("{err}");
        if self.error.is_none() {
            self.error = Some(err);
        }
        event_loop.exit();
    }

    fn start(
        config: &AppConfig,
        event_loop: &ActiveEventLoop,
    ) -> Result<AppState<L>, NeHeError> {
        let attributes = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(attributes)?);
        log::info!("starting \"{}\"", config.title);

        let gpu = GpuContext::new(window.clone())?;
        let mut ctx = NeHeContext::new(window.clone(), gpu, config.depth_format, &config.title);
        let mut lesson = L::init(&mut ctx)?;

        let (width, height) = ctx.size();
        lesson.resize(&mut ctx, width, height.max(1));

        Ok(AppState::Running {
            window,
            ctx,
            lesson,
            input: Input::new(),
            capture_requested: false,
        })
    }
}

impl<L: Lesson> ApplicationHandler for NeHeApp<L> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let AppState::Pending { config } = &self.state {
            match Self::start(config, event_loop) {
                Ok(state) => self.state = state,
                Err(err) => {
                    self.state = AppState::Stopped;
                    self.fail(event_loop, err);
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let AppState::Running {
            window,
            ctx,
            lesson,
            input,
            capture_requested,
        } = &mut self.state
        else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Focused(false) => {
                input.clear();
            }
            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                ctx.gpu.resize(size.width, size.height);
                ctx.ensure_depth_size(size.width, size.height);
                log::debug!("resized to {}x{}", size.width, size.height);
                lesson.resize(ctx, size.width, size.height.max(1));
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let Some(key) = input.handle_key(&event) else {
                    return;
                };
                let down = event.state == ElementState::Pressed;
                match key {
                    KeyCode::Escape if down => event_loop.exit(),
                    KeyCode::F1 if down && !event.repeat => {
                        let fullscreen = match window.fullscreen() {
                            Some(_) => None,
                            None => Some(Fullscreen::Borderless(None)),
                        };
                        window.set_fullscreen(fullscreen);
                    }
                    KeyCode::F12 if down && !event.repeat => *capture_requested = true,
                    KeyCode::Escape | KeyCode::F1 | KeyCode::F12 => {}
                    _ => lesson.key(ctx, key, down, event.repeat),
                }
            }
            WindowEvent::RedrawRequested => {
                let surface_texture = match ctx.gpu.surface.get_current_texture() {
                    Ok(texture) => texture,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        ctx.gpu.reconfigure();
                        window.request_redraw();
                        return;
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        let err = NeHeError::Surface(wgpu::SurfaceError::OutOfMemory);
                        self.fail(event_loop, err);
                        return;
                    }
                    Err(err) => {
                        log::warn!("skipping frame: {err}");
                        window.request_redraw();
                        return;
                    }
                };

                let (width, height) = (
                    surface_texture.texture.width(),
                    surface_texture.texture.height(),
                );
                ctx.ensure_depth_size(width, height);

                let encoder =
                    ctx.gpu
                        .device
                        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("Frame Encoder"),
                        });
                let view = surface_texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                let mut frame = Frame {
                    encoder,
                    view,
                    input: &*input,
                    width,
                    height,
                };
                lesson.draw(ctx, &mut frame);
                let Frame { mut encoder, .. } = frame;

                let capture = if std::mem::take(capture_requested) {
                    request_capture(ctx, &mut encoder, &surface_texture.texture)
                } else {
                    None
                };

                ctx.gpu.queue.submit(std::iter::once(encoder.finish()));
                window.pre_present_notify();
                surface_texture.present();

                if let Some(capture) = capture {
                    match screenshot::save(capture, &ctx.gpu.device, ctx.title()) {
                        Ok(path) => log::info!("saved screenshot {}", path.display()),
                        Err(err) => log::error!("screenshot failed: {err}"),
                    }
                }

                window.request_redraw();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let AppState::Running { ctx, lesson, .. } = &mut self.state {
            lesson.quit(ctx);
        }
        self.state = AppState::Stopped;
    }
}

fn request_capture(
    ctx: &NeHeContext,
    encoder: &mut wgpu::CommandEncoder,
    texture: &wgpu::Texture,
) -> Option<PendingCapture> {
    if !ctx.gpu.can_read_back() {
        log::warn!("surface does not support copies, screenshot skipped");
        return None;
    }
    screenshot::record(&ctx.gpu, encoder, texture)
        .inspect_err(|err| log::error!("screenshot failed: {err}"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_640_by_480_without_depth() {
        let config = AppConfig::new("Lesson");
        assert_eq!(config.title, "Lesson");
        assert_eq!((config.width, config.height), (640, 480));
        assert!(config.depth_format.is_none());

        let config = config.size(800, 600).depth(wgpu::TextureFormat::Depth16Unorm);
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.depth_format, Some(wgpu::TextureFormat::Depth16Unorm));
    }
}
