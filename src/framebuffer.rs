//! Offscreen render target with a color and a depth attachment.
//!
//! # Example
//!
//! ```ignore
//! use primer::*;
//!
//! let mut framebuffer = Framebuffer::for_surface(gpu);
//! let mut screen_texture = screen_program.texture_set(gpu, &[(&framebuffer).into()])?;
//!
//! // each frame
//! if framebuffer.ensure_size(gpu) {
//!     screen_texture = screen_program.texture_set(gpu, &[(&framebuffer).into()])?;
//! }
//! {
//!     let mut pass = framebuffer.begin_pass(&mut frame.encoder, wgpu::Color::BLACK);
//!     // scene draws
//! }
//! let mut pass = frame.screen_pass();
//! screen_program.draw(gpu, &mut pass, &screen_quad, Some(&screen_texture));
//! ```

use std::fmt;

use crate::gpu::GpuContext;

/// Format of every depth attachment, and of depth-tested programs.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Pixel size of one attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    /// Pixels.
    pub width: u32,
    /// Pixels.
    pub height: u32,
}

impl Extent {
    /// Size in pixels.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Whether a color/depth attachment pair can be rendered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferStatus {
    /// Both attachments are non-empty and the same size.
    Complete,
    /// An attachment has no pixels.
    MissingAttachment { color: Extent, depth: Extent },
    /// Attachments disagree on size.
    DimensionMismatch { color: Extent, depth: Extent },
}

impl FramebufferStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for FramebufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "framebuffer complete"),
            Self::MissingAttachment { color, depth } => write!(
                f,
                "framebuffer not complete: empty attachment (color {color}, depth {depth})"
            ),
            Self::DimensionMismatch { color, depth } => write!(
                f,
                "framebuffer not complete: attachment sizes differ (color {color}, depth {depth})"
            ),
        }
    }
}

/// Checks an attachment pair the way a driver checks framebuffer
/// completeness.
pub fn framebuffer_status(color: Extent, depth: Extent) -> FramebufferStatus {
    if color.is_empty() || depth.is_empty() {
        FramebufferStatus::MissingAttachment { color, depth }
    } else if color != depth {
        FramebufferStatus::DimensionMismatch { color, depth }
    } else {
        FramebufferStatus::Complete
    }
}

/// An offscreen color + depth target whose color attachment can be sampled
/// by a later pass.
pub struct Framebuffer {
    /// Color attachment in the surface format.
    pub color: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    /// [`DEPTH_FORMAT`] attachment.
    pub depth: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
    /// Linear, clamp-to-edge sampler for reading `color`.
    pub sampler: wgpu::Sampler,
    size: Extent,
    status: FramebufferStatus,
}

impl Framebuffer {
    /// Allocates attachments of `width` x `height` in the surface format.
    ///
    /// An incomplete size is logged and the attachments are allocated at
    /// 1x1 minimum so the handles stay valid.
    pub fn new(gpu: &GpuContext, width: u32, height: u32) -> Self {
        let size = Extent::new(width, height);
        let status = framebuffer_status(size, size);
        if !status.is_complete() {
            log::error!("{status}");
        }

        let extent = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };

        let color = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Framebuffer Color"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: gpu.config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        let depth = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Framebuffer Depth"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Framebuffer Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        log::debug!("framebuffer allocated at {size}");

        Self {
            color,
            color_view,
            depth,
            depth_view,
            sampler,
            size,
            status,
        }
    }

    /// A framebuffer matching the current surface size.
    pub fn for_surface(gpu: &GpuContext) -> Self {
        Self::new(gpu, gpu.width(), gpu.height())
    }

    /// Requested size, before the 1x1 allocation minimum.
    pub fn size(&self) -> Extent {
        self.size
    }

    /// Completeness computed when the attachments were last created.
    pub fn status(&self) -> FramebufferStatus {
        self.status
    }

    /// Recreates the attachments if the surface size changed. Returns true
    /// when it did, since bindings that sampled the old color texture are
    /// now stale.
    pub fn ensure_size(&mut self, gpu: &GpuContext) -> bool {
        if self.size != Extent::new(gpu.width(), gpu.height()) {
            *self = Self::for_surface(gpu);
            true
        } else {
            false
        }
    }

    /// Begins a pass that clears both attachments.
    pub fn begin_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        clear: wgpu::Color,
    ) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Framebuffer Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }
}
