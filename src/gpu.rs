//! Device, queue, and window surface.
//!
//! [`GpuContext`] is created once from the window and passed by reference to
//! everything that creates or draws GPU resources.
//!
//! # Example
//!
//! ```ignore
//! use primer::*;
//!
//! run(|ctx| {
//!     let gpu = ctx.gpu;
//!     log::info!("surface is {}x{} ({:?})", gpu.width(), gpu.height(), gpu.config.format);
//!     Ok(move |frame: &mut Frame| {
//!         let _pass = frame.screen_pass();
//!     })
//! })?;
//! ```
//!
//! Colors reach the surface unencoded by default: a clear color or fragment
//! output of `0.2` is stored as `0.2 * 255`. Pass
//! [`AppConfig::srgb_surface`](crate::AppConfig::srgb_surface) to get an sRGB
//! surface that encodes linear values on write instead.

use std::sync::Arc;

use winit::window::Window;

use crate::error::InitError;

/// What to do after trying to acquire the next surface texture.
#[derive(Debug)]
pub enum SurfaceAcquire {
    /// The texture to render into this frame.
    Frame(wgpu::SurfaceTexture),
    /// Surface was reconfigured or timed out; skip this frame.
    Skip,
    /// Unrecoverable; stop the loop.
    Fatal,
}

/// Core GPU state: surface, device, queue, and surface configuration.
///
/// Fields are public so programs can reach the raw wgpu API when the
/// helpers here are not enough.
pub struct GpuContext {
    /// The window surface.
    pub surface: wgpu::Surface<'static>,
    /// Creates buffers, textures, and pipelines.
    pub device: wgpu::Device,
    /// Receives buffer writes and command submissions.
    pub queue: wgpu::Queue,
    /// Current surface size and format. `config.format` is also the color
    /// format of every pipeline and offscreen target.
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// Creates the instance, surface, adapter, device, and queue for
    /// `window`, and configures the surface with FIFO presentation.
    ///
    /// The surface format is sRGB only when `srgb` is set (see
    /// [`pick_surface_format`]). `backends` is overridden by the
    /// `WGPU_BACKEND` environment variable when that is set.
    pub fn new(window: Arc<Window>, backends: wgpu::Backends, srgb: bool) -> Result<Self, InitError> {
        let size = window.inner_size();

        let backends = wgpu::Backends::from_env().unwrap_or(backends);
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        let info = adapter.get_info();
        log::info!("using {} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Primer Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format =
            pick_surface_format(&surface_caps.formats, srgb).ok_or(InitError::NoSurfaceFormat)?;
        if surface_format.is_srgb() != srgb {
            log::warn!("no {} surface format, using {surface_format:?}", if srgb { "sRGB" } else { "non-sRGB" });
        }

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    /// Resizes the surface. Zero-sized dimensions (a minimized window) are
    /// ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Surface width in physical pixels.
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Surface height in physical pixels.
    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    /// Acquires the next surface texture, reconfiguring a lost or outdated
    /// surface.
    pub fn acquire(&self) -> SurfaceAcquire {
        match self.surface.get_current_texture() {
            Ok(frame) => SurfaceAcquire::Frame(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                SurfaceAcquire::Skip
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
                SurfaceAcquire::Fatal
            }
            Err(err) => {
                log::warn!("skipping frame: {err}");
                SurfaceAcquire::Skip
            }
        }
    }

    /// Runs `f` inside a validation error scope and returns the first
    /// validation error it raised, if any.
    pub(crate) fn validation_scope<T>(&self, f: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f();
        let error = pollster::block_on(self.device.pop_error_scope());
        (value, error)
    }
}

/// Picks the first of `formats` whose sRGB-ness matches `srgb`, falling
/// back to the first format at all.
///
/// `formats` is in the adapter's preference order, as reported by
/// [`wgpu::Surface::get_capabilities`].
pub fn pick_surface_format(formats: &[wgpu::TextureFormat], srgb: bool) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|f| f.is_srgb() == srgb)
        .or_else(|| formats.first())
        .copied()
}

/// Begins a pass over a surface view that clears color only.
pub fn begin_screen_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    clear: wgpu::Color,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Screen Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}
