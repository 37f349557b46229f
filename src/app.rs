//! Window creation and the frame loop.
//!
//! [`run_with_config`] opens the window, builds the [`GpuContext`], runs the
//! setup closure once, and then calls the frame closure it returned once
//! per redraw until the [`LoopState`] becomes `ShouldClose`.
//!
//! # Example
//!
//! ```ignore
//! use primer::*;
//!
//! let config = AppConfig::new().clear_color(148.0 / 255.0, 0.0, 211.0 / 255.0);
//! run_with_config(config, |ctx| {
//!     let hexagon = Mesh::upload(ctx.gpu, &geometry::polygon_fan(6, 0.75)?, "Hexagon")?;
//!     Ok(move |frame: &mut Frame| {
//!         if frame.elapsed() > 60.0 {
//!             frame.close();
//!         }
//!         let mut pass = frame.screen_pass();
//!         // draw hexagon
//!     })
//! })?;
//! ```

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::error::{AppError, InitError};
use crate::gpu::{GpuContext, SurfaceAcquire, begin_screen_pass};
use crate::input::Input;
use crate::time::{FrameClock, FrameTime};

/// Whether the frame loop keeps going.
///
/// The only transition is `Running -> ShouldClose`; once closed the loop
/// never resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// Frames keep being rendered.
    #[default]
    Running,
    /// The loop exits after the current frame.
    ShouldClose,
}

impl LoopState {
    /// True until a close is requested.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Moves to [`LoopState::ShouldClose`]. Calling it again is a no-op.
    pub fn request_close(&mut self) {
        *self = Self::ShouldClose;
    }
}

/// Configuration for the app window.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Window title.
    pub title: String,
    /// Initial inner width in logical pixels.
    pub width: u32,
    /// Initial inner height in logical pixels.
    pub height: u32,
    /// Clear color used by [`Frame::screen_pass`].
    pub clear_color: wgpu::Color,
    /// Backends to try; `WGPU_BACKEND` overrides this.
    pub backends: wgpu::Backends,
    /// Escape requests close.
    pub close_on_escape: bool,
    /// Use an sRGB surface format. Off by default, so colors written to the
    /// surface are stored as given, the way a plain default framebuffer
    /// stores them.
    pub srgb_surface: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "New Window".to_string(),
            width: 800,
            height: 600,
            clear_color: wgpu::Color::BLACK,
            backends: wgpu::Backends::PRIMARY,
            close_on_escape: true,
            srgb_surface: false,
        }
    }
}

impl AppConfig {
    /// Same as [`AppConfig::default`]: an 800x600 "New Window" cleared to
    /// black.
    pub fn new() -> Self {
        Self::default()
    }

    /// Window title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Initial inner size in logical pixels.
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Clear color from 0-1 RGB components.
    pub fn clear_color(mut self, r: f64, g: f64, b: f64) -> Self {
        self.clear_color = wgpu::Color { r, g, b, a: 1.0 };
        self
    }

    /// Backends to request. `WGPU_BACKEND` still takes precedence.
    pub fn backends(mut self, backends: wgpu::Backends) -> Self {
        self.backends = backends;
        self
    }

    /// Requests an sRGB surface, which treats clear colors and fragment
    /// outputs as linear and encodes them on write.
    pub fn srgb_surface(mut self, srgb: bool) -> Self {
        self.srgb_surface = srgb;
        self
    }
}

/// Context provided during app setup.
pub struct SetupContext<'a> {
    /// Device and surface for creating meshes, programs, and textures.
    pub gpu: &'a GpuContext,
}

/// Per-frame context handed to the frame closure.
///
/// Commands recorded into `encoder` are submitted and the surface texture
/// is presented after the closure returns.
pub struct Frame<'a> {
    /// Device and queue for drawing.
    pub gpu: &'a GpuContext,
    /// Input collected since the previous frame.
    pub input: &'a Input,
    /// Timing of this frame; also available through `dt` and `elapsed`.
    pub time: FrameTime,
    /// Encoder submitted once the frame closure returns.
    pub encoder: wgpu::CommandEncoder,
    /// The surface texture being rendered this frame.
    pub view: wgpu::TextureView,
    clear_color: wgpu::Color,
    state: &'a mut LoopState,
}

impl Frame<'_> {
    /// Seconds since the previous frame.
    pub fn dt(&self) -> f32 {
        self.time.dt
    }

    /// Seconds since the loop started.
    pub fn elapsed(&self) -> f64 {
        self.time.elapsed
    }

    /// Requests the loop to stop after this frame.
    pub fn close(&mut self) {
        self.state.request_close();
    }

    /// Begins a pass over the surface cleared to the configured color.
    pub fn screen_pass(&mut self) -> wgpu::RenderPass<'_> {
        begin_screen_pass(&mut self.encoder, &self.view, self.clear_color)
    }
}

/// Runs an app with the default window configuration.
///
/// `setup` runs once after the window and GPU exist and returns the frame
/// closure, which then runs once per frame until the window closes.
///
/// ```ignore
/// primer::run(|ctx| {
///     let mesh = Mesh::upload(ctx.gpu, &geometry::hue_triangle(), "Triangle")?;
///     Ok(move |frame: &mut Frame| {
///         let mut pass = frame.screen_pass();
///         // draw...
///     })
/// })?;
/// ```
pub fn run<S, F>(setup: S) -> Result<(), AppError>
where
    S: FnOnce(&mut SetupContext) -> anyhow::Result<F> + 'static,
    F: FnMut(&mut Frame) + 'static,
{
    run_with_config(AppConfig::default(), setup)
}

/// Runs an app with custom configuration.
///
/// Returns an error if the window or GPU could not be initialized, if
/// `setup` failed, or if the surface ran out of memory.
pub fn run_with_config<S, F>(config: AppConfig, setup: S) -> Result<(), AppError>
where
    S: FnOnce(&mut SetupContext) -> anyhow::Result<F> + 'static,
    F: FnMut(&mut Frame) + 'static,
{
    let event_loop = EventLoop::new().map_err(InitError::from)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = PrimerApp {
        phase: Phase::Pending {
            config,
            setup: Some(Box::new(move |ctx: &mut SetupContext| -> anyhow::Result<FrameFn> {
                let frame_fn = setup(ctx)?;
                Ok(Box::new(frame_fn) as FrameFn)
            })),
        },
        error: None,
    };

    event_loop.run_app(&mut app).map_err(InitError::from)?;

    match app.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

type FrameFn = Box<dyn FnMut(&mut Frame)>;
type SetupFn = Box<dyn FnOnce(&mut SetupContext) -> anyhow::Result<FrameFn>>;

struct PrimerApp {
    phase: Phase,
    /// First fatal error; ends the loop.
    error: Option<AppError>,
}

enum Phase {
    Pending {
        config: AppConfig,
        setup: Option<SetupFn>,
    },
    Running(Box<Running>),
    Closed,
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    input: Input,
    clock: FrameClock,
    state: LoopState,
    frame_fn: FrameFn,
    clear_color: wgpu::Color,
    close_on_escape: bool,
}

impl PrimerApp {
    fn start(
        event_loop: &ActiveEventLoop,
        config: &AppConfig,
        setup: SetupFn,
    ) -> Result<Running, AppError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(InitError::from)?,
        );
        let gpu = GpuContext::new(window.clone(), config.backends, config.srgb_surface)?;
        log::info!(
            "window `{}` ready at {}x{}",
            config.title,
            gpu.width(),
            gpu.height()
        );

        let frame_fn = setup(&mut SetupContext { gpu: &gpu }).map_err(AppError::Setup)?;

        Ok(Running {
            window,
            gpu,
            input: Input::new(),
            clock: FrameClock::new(),
            state: LoopState::Running,
            frame_fn,
            clear_color: config.clear_color,
            close_on_escape: config.close_on_escape,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        log::error!("{err}");
        self.error.get_or_insert(err);
        self.phase = Phase::Closed;
        event_loop.exit();
    }
}

impl ApplicationHandler for PrimerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Phase::Pending { config, setup } = &mut self.phase else {
            return;
        };
        let Some(setup) = setup.take() else {
            return;
        };

        match Self::start(event_loop, config, setup) {
            Ok(running) => {
                running.window.request_redraw();
                self.phase = Phase::Running(Box::new(running));
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Phase::Running(app) = &mut self.phase else {
            return;
        };

        app.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                app.state.request_close();
            }
            WindowEvent::Resized(size) => {
                app.gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                if app.close_on_escape && app.input.key_pressed(KeyCode::Escape) {
                    app.state.request_close();
                }
                if app.state.is_running() && !app.render() {
                    self.fail(event_loop, AppError::SurfaceOutOfMemory);
                    return;
                }
                app.input.begin_frame();
                app.window.request_redraw();
            }
            _ => {}
        }

        if !app.state.is_running() {
            log::info!("closing after {} frames", app.clock.frame_count());
            self.phase = Phase::Closed;
            event_loop.exit();
        }
    }
}

impl Running {
    /// Renders one frame. Returns false on a fatal surface error.
    fn render(&mut self) -> bool {
        let time = self.clock.tick();

        let output = match self.gpu.acquire() {
            SurfaceAcquire::Frame(output) => output,
            SurfaceAcquire::Skip => return true,
            SurfaceAcquire::Fatal => return false,
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let mut frame = Frame {
            gpu: &self.gpu,
            input: &self.input,
            time,
            encoder,
            view,
            clear_color: self.clear_color,
            state: &mut self.state,
        };

        (self.frame_fn)(&mut frame);

        self.gpu.queue.submit(std::iter::once(frame.encoder.finish()));
        self.window.pre_present_notify();
        output.present();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_starts_running() {
        assert!(LoopState::default().is_running());
    }

    #[test]
    fn close_is_terminal() {
        let mut state = LoopState::Running;
        state.request_close();
        assert_eq!(state, LoopState::ShouldClose);
        state.request_close();
        assert_eq!(state, LoopState::ShouldClose);
        assert!(!state.is_running());
    }

    #[test]
    fn default_window_config() {
        let config = AppConfig::default();
        assert_eq!(config.title, "New Window");
        assert_eq!((config.width, config.height), (800, 600));
        assert!(config.close_on_escape);
        assert!(!config.srgb_surface);
    }

    #[test]
    fn default_surface_stores_colors_unencoded() {
        let caps = [wgpu::TextureFormat::Bgra8UnormSrgb, wgpu::TextureFormat::Bgra8Unorm];
        let format = crate::gpu::pick_surface_format(&caps, AppConfig::new().srgb_surface);
        assert_eq!(format, Some(wgpu::TextureFormat::Bgra8Unorm));

        let format = crate::gpu::pick_surface_format(&caps, AppConfig::new().srgb_surface(true).srgb_surface);
        assert_eq!(format, Some(wgpu::TextureFormat::Bgra8UnormSrgb));
    }

    #[test]
    fn clear_color_is_opaque() {
        let config = AppConfig::new().clear_color(0.1, 0.2, 0.3);
        assert_eq!(config.clear_color.a, 1.0);
        assert_eq!(config.clear_color.g, 0.2);
    }
}
