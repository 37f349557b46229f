//! Write-once GPU geometry.
//!
//! A [`Mesh`] is uploaded from a [`RawGeometry`] once at startup and only
//! ever read afterwards. It remembers the vertex layout it was uploaded
//! with so a [`ShaderProgram`](crate::ShaderProgram) can refuse geometry of
//! the wrong shape.
//!
//! # Example
//!
//! ```ignore
//! use primer::*;
//!
//! run(|ctx| {
//!     let hexagon = Mesh::upload(ctx.gpu, &geometry::polygon_fan(6, 0.75)?, "Hexagon")?;
//!     Ok(move |frame: &mut Frame| {
//!         let mut pass = frame.screen_pass();
//!         program.draw(frame.gpu, &mut pass, &hexagon, None);
//!     })
//! })?;
//! ```

use wgpu::util::DeviceExt;

use crate::error::GeometryError;
use crate::geometry::{RawGeometry, Vertex};
use crate::gpu::GpuContext;

/// GPU-resident vertex and index buffers for one indexed triangle list.
#[derive(Debug)]
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    /// `u32` indices.
    pub index_buffer: wgpu::Buffer,
    /// Number of indices drawn per [`ShaderProgram::draw`](crate::ShaderProgram::draw).
    pub index_count: u32,
    /// Number of vertices uploaded.
    pub vertex_count: u32,
    pub(crate) layout: wgpu::VertexBufferLayout<'static>,
}

impl Mesh {
    /// Validates `geometry` and uploads it.
    pub fn upload<V: Vertex>(
        gpu: &GpuContext,
        geometry: &RawGeometry<V>,
        label: &str,
    ) -> Result<Self, GeometryError> {
        geometry.validate()?;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertices")),
                contents: bytemuck::cast_slice(&geometry.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Indices")),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        log::debug!(
            "uploaded mesh `{label}`: {} vertices, {} indices",
            geometry.vertex_count(),
            geometry.index_count()
        );

        Ok(Self {
            vertex_buffer,
            index_buffer,
            index_count: geometry.index_count() as u32,
            vertex_count: geometry.vertex_count() as u32,
            layout: V::LAYOUT,
        })
    }

    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
