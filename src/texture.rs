//! Image-file textures and the sampler they are read with.
//!
//! # Example
//!
//! ```ignore
//! use primer::*;
//!
//! run(|ctx| {
//!     // Image rows start at the top; flip when uvs put v = 0 at the bottom.
//!     let albedo = Texture::from_file_or_empty(ctx.gpu, "assets/albedo.png", TextureOptions::default().flipped());
//!     let program = ShaderProgram::builder("Textured")
//!         .vertex_layout::<LitVertex>()
//!         .texture_slots(1)
//!         .build(ctx.gpu, &vertex, &fragment);
//!     let maps = program.texture_set(ctx.gpu, &[(&albedo).into()])?;
//!     Ok(move |frame: &mut Frame| { /* draw with Some(&maps) */ })
//! })?;
//! ```

use std::path::Path;

use crate::error::TextureError;
use crate::gpu::GpuContext;

/// How an image file is turned into a texture.
#[derive(Debug, Clone, Copy)]
pub struct TextureOptions {
    /// Flip rows so the first row in memory is the bottom of the image.
    /// Use this when uvs put `v = 0` at the bottom edge.
    pub flip_vertically: bool,
    /// Treat the pixel data as sRGB-encoded color, decoded to linear when
    /// sampled. Off by default: shaders read the stored bytes as-is, which
    /// is what an unencoded surface expects.
    pub srgb: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            flip_vertically: false,
            srgb: false,
        }
    }
}

impl TextureOptions {
    /// Sets [`TextureOptions::flip_vertically`].
    pub fn flipped(mut self) -> Self {
        self.flip_vertically = true;
        self
    }

    /// Sets [`TextureOptions::srgb`]. Pair color maps loaded this way with
    /// [`AppConfig::srgb_surface`](crate::AppConfig::srgb_surface).
    pub fn srgb(mut self) -> Self {
        self.srgb = true;
        self
    }
}

/// A sampled 2D texture with repeat wrapping and linear filtering.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
}

impl Texture {
    /// Creates a texture from tightly packed RGBA8 rows, top row first.
    ///
    /// `srgb` picks `Rgba8UnormSrgb` over `Rgba8Unorm`.
    pub fn from_rgba(
        gpu: &GpuContext,
        data: &[u8],
        width: u32,
        height: u32,
        srgb: bool,
        label: &str,
    ) -> Self {
        use wgpu::util::DeviceExt;

        let format = if srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label} Sampler")),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// Decodes an image file.
    pub fn from_file(
        gpu: &GpuContext,
        path: impl AsRef<Path>,
        options: TextureOptions,
    ) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let mut img = image::open(path)
            .map_err(|source| TextureError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();

        if options.flip_vertically {
            image::imageops::flip_vertical_in_place(&mut img);
        }

        let (width, height) = img.dimensions();
        log::debug!("loaded texture {} ({width}x{height})", path.display());
        Ok(Self::from_rgba(
            gpu,
            &img,
            width,
            height,
            options.srgb,
            &path.display().to_string(),
        ))
    }

    /// Like [`from_file`](Self::from_file), but a failed load is logged and
    /// replaced by an [`empty`](Self::empty) texture.
    pub fn from_file_or_empty(gpu: &GpuContext, path: impl AsRef<Path>, options: TextureOptions) -> Self {
        let path = path.as_ref();
        Self::from_file(gpu, path, options).unwrap_or_else(|err| {
            log::error!("{err}");
            Self::empty(gpu, &path.display().to_string())
        })
    }

    /// A valid 1x1 texture with no image content (transparent black).
    pub fn empty(gpu: &GpuContext, label: &str) -> Self {
        Self::from_rgba(gpu, &[0; 4], 1, 1, false, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_keep_stored_bytes() {
        let options = TextureOptions::default();
        assert!(!options.srgb);
        assert!(!options.flip_vertically);
    }

    #[test]
    fn builders_only_touch_their_own_flag() {
        let flipped = TextureOptions::default().flipped();
        assert!(flipped.flip_vertically && !flipped.srgb);

        let srgb = TextureOptions::default().srgb();
        assert!(srgb.srgb && !srgb.flip_vertically);
    }
}
