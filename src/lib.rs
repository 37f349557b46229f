//! # Primer
//!
//! Small building blocks for minimal wgpu programs: a window and frame
//! loop, write-once meshes, shader programs with named uniforms, textures,
//! an offscreen framebuffer, and a first-person camera.
//!
//! ## Quick Start
//!
//! ```no_run
//! use primer::*;
//!
//! const SHADER: &str = r#"
//! @vertex
//! fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
//!     return vec4<f32>(position, 1.0);
//! }
//!
//! @fragment
//! fn fs_main() -> @location(0) vec4<f32> {
//!     return vec4<f32>(1.0, 0.5, 0.2, 1.0);
//! }
//! "#;
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(LoggingConfig::default());
//!
//!     run(|ctx| {
//!         let mesh = Mesh::upload(ctx.gpu, &geometry::polygon_fan(6, 0.5)?, "Hexagon")?;
//!         let source = ShaderSource::inline("hexagon", SHADER);
//!         let mut program = ShaderProgram::builder("Hexagon")
//!             .vertex_layout::<PositionVertex>()
//!             .build(ctx.gpu, &source, &source);
//!
//!         Ok(move |frame: &mut Frame| {
//!             let gpu = frame.gpu;
//!             program.begin_frame();
//!             let mut pass = frame.screen_pass();
//!             program.draw(gpu, &mut pass, &mesh, None);
//!         })
//!     })?;
//!     Ok(())
//! }
//! ```

mod app;
mod camera;
mod error;
mod framebuffer;
pub mod geometry;
mod gpu;
mod hue;
mod input;
pub mod logging;
mod mesh;
mod shader;
mod texture;
mod time;
mod uniform;

pub use app::{AppConfig, Frame, LoopState, SetupContext, run, run_with_config};
pub use camera::{
    Camera, CameraMovement, DEFAULT_FOV, DEFAULT_PITCH, DEFAULT_SENSITIVITY, DEFAULT_SPEED,
    DEFAULT_YAW, MAX_FOV, MIN_FOV, PITCH_LIMIT,
};
pub use error::{
    AppError, GeometryError, InitError, ShaderError, TextureError, UniformError,
};
pub use framebuffer::{DEPTH_FORMAT, Extent, Framebuffer, FramebufferStatus, framebuffer_status};
pub use geometry::{ColorVertex, LitVertex, PositionVertex, RawGeometry, Vertex};
pub use gpu::{GpuContext, SurfaceAcquire, begin_screen_pass, pick_surface_format};
pub use hue::{HUE_PERIOD, Hue, HueCycle};
pub use input::Input;
pub use logging::{LoggingConfig, init_logging};
pub use mesh::Mesh;
pub use shader::{
    DEFAULT_DRAWS_PER_FRAME, FRAGMENT_ENTRY, ProgramBuilder, ShaderProgram, ShaderSource,
    TextureBinding, TextureSet, VERTEX_ENTRY,
};
pub use texture::{Texture, TextureOptions};
pub use time::{FrameClock, FrameTime};
pub use uniform::{UniformBlock, UniformField, UniformLayout, UniformType, UniformValue};

// Re-export glam math types for convenience
pub use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

// Re-export commonly used winit types for convenience
pub use winit::keyboard::KeyCode;

// Raw API escape hatch
pub use wgpu;
