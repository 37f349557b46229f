//! CPU-side geometry: vertex formats, indexed triangle lists, and the fixed
//! shapes the demos draw.
//!
//! Geometry is built once, validated, and then handed to
//! [`Mesh::upload`](crate::Mesh::upload). Nothing here touches the GPU.
//!
//! # Vertex formats
//!
//! | Format | Attributes (shader location) | Stride |
//! |---|---|---|
//! | [`PositionVertex`] | position (0) | 12 |
//! | [`ColorVertex`] | position (0), color (1) | 24 |
//! | [`LitVertex`] | position (0), normal (1), uv (2) | 32 |

use glam::Vec3;

use crate::error::GeometryError;

/// A vertex type that can be uploaded as-is into a vertex buffer.
pub trait Vertex: bytemuck::Pod {
    /// Attribute layout matching the struct's memory layout.
    const LAYOUT: wgpu::VertexBufferLayout<'static>;

    /// Object-space position, attribute location 0 in every format.
    fn position(&self) -> [f32; 3];
}

/// Position-only vertex.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PositionVertex {
    /// Object-space position.
    pub position: [f32; 3],
}

impl Vertex for PositionVertex {
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<PositionVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    };

    fn position(&self) -> [f32; 3] {
        self.position
    }
}

/// Vertex with a per-vertex RGB color.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    /// Linear RGB in `0..=1`, interpolated across the triangle.
    pub color: [f32; 3],
}

impl Vertex for ColorVertex {
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<ColorVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    };

    fn position(&self) -> [f32; 3] {
        self.position
    }
}

/// Vertex with position, normal, and texture coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LitVertex {
    pub position: [f32; 3],
    /// Unit surface normal.
    pub normal: [f32; 3],
    /// Texture coordinates with `v = 0` at the bottom edge.
    pub uv: [f32; 2],
}

impl LitVertex {
    /// Const constructor for vertex tables.
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

impl Vertex for LitVertex {
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<LitVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    fn position(&self) -> [f32; 3] {
        self.position
    }
}

/// An indexed triangle list before GPU upload.
#[derive(Clone, Debug, PartialEq)]
pub struct RawGeometry<V> {
    /// Vertex data in buffer order.
    pub vertices: Vec<V>,
    /// Three indices per triangle, counter-clockwise when front facing.
    pub indices: Vec<u32>,
}

impl<V: Vertex> RawGeometry<V> {
    /// Wraps the data without checking it; see [`RawGeometry::validate`].
    pub fn new(vertices: Vec<V>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Whole triangles described by the indices.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks that the indices form whole triangles and stay in bounds.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.indices.len() % 3 != 0 {
            return Err(GeometryError::NotTriangles(self.indices.len()));
        }

        let vertex_count = self.vertices.len();
        match self
            .indices
            .iter()
            .position(|&i| i as usize >= vertex_count)
        {
            Some(position) => Err(GeometryError::IndexOutOfBounds {
                position,
                index: self.indices[position],
                vertex_count,
            }),
            None => Ok(()),
        }
    }

    /// Triangle corner positions, in index order.
    ///
    /// Triangles with an index past the end of `vertices` are skipped, as
    /// is a trailing partial triangle; [`RawGeometry::validate`] reports
    /// both.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            let corner = |i: u32| self.vertices.get(i as usize).map(|v| Vec3::from(v.position()));
            Some([corner(tri[0])?, corner(tri[1])?, corner(tri[2])?])
        })
    }
}

/// A regular polygon in the XY plane, triangulated as a fan around the origin.
///
/// Vertex 0 is the center; perimeter vertex `i` (for `i = 1..=n_sides`) sits
/// at angle `2π·i / n_sides`. Triangle `i` is `(0, i + 1, i + 2)`, with the
/// last one closing back onto vertex 1, so every triangle winds
/// counter-clockwise.
pub fn polygon_fan(n_sides: u32, radius: f32) -> Result<RawGeometry<PositionVertex>, GeometryError> {
    if n_sides < 3 {
        return Err(GeometryError::TooFewSides(n_sides));
    }

    let mut vertices = Vec::with_capacity(n_sides as usize + 1);
    vertices.push(PositionVertex {
        position: [0.0, 0.0, 0.0],
    });
    for i in 1..=n_sides {
        let angle = std::f32::consts::TAU * i as f32 / n_sides as f32;
        vertices.push(PositionVertex {
            position: [radius * angle.cos(), radius * angle.sin(), 0.0],
        });
    }

    let mut indices = Vec::with_capacity(n_sides as usize * 3);
    for i in 0..n_sides {
        let next = if i + 1 == n_sides { 1 } else { i + 2 };
        indices.extend_from_slice(&[0, i + 1, next]);
    }

    Ok(RawGeometry::new(vertices, indices))
}

/// The three-color triangle.
pub fn hue_triangle() -> RawGeometry<ColorVertex> {
    let vertices = vec![
        ColorVertex {
            position: [0.0, 0.5, 0.0],
            color: [1.0, 0.0, 0.0],
        },
        ColorVertex {
            position: [0.5, -0.5, 0.0],
            color: [0.0, 1.0, 0.0],
        },
        ColorVertex {
            position: [-0.5, -0.5, 0.0],
            color: [0.0, 0.0, 1.0],
        },
    ];
    RawGeometry::new(vertices, vec![0, 2, 1])
}

/// Unit cube centered at the origin, four vertices per face so each face
/// gets its own normal and a full `[0, 1]` uv square.
pub fn cube() -> RawGeometry<LitVertex> {
    #[rustfmt::skip]
    let vertices = vec![
        // front
        LitVertex::new([-0.5, -0.5,  0.5], [ 0.0,  0.0,  1.0], [0.0, 0.0]),
        LitVertex::new([ 0.5, -0.5,  0.5], [ 0.0,  0.0,  1.0], [1.0, 0.0]),
        LitVertex::new([ 0.5,  0.5,  0.5], [ 0.0,  0.0,  1.0], [1.0, 1.0]),
        LitVertex::new([-0.5,  0.5,  0.5], [ 0.0,  0.0,  1.0], [0.0, 1.0]),
        // right
        LitVertex::new([ 0.5, -0.5,  0.5], [ 1.0,  0.0,  0.0], [0.0, 0.0]),
        LitVertex::new([ 0.5, -0.5, -0.5], [ 1.0,  0.0,  0.0], [1.0, 0.0]),
        LitVertex::new([ 0.5,  0.5, -0.5], [ 1.0,  0.0,  0.0], [1.0, 1.0]),
        LitVertex::new([ 0.5,  0.5,  0.5], [ 1.0,  0.0,  0.0], [0.0, 1.0]),
        // back
        LitVertex::new([-0.5, -0.5, -0.5], [ 0.0,  0.0, -1.0], [1.0, 0.0]),
        LitVertex::new([-0.5,  0.5, -0.5], [ 0.0,  0.0, -1.0], [1.0, 1.0]),
        LitVertex::new([ 0.5,  0.5, -0.5], [ 0.0,  0.0, -1.0], [0.0, 1.0]),
        LitVertex::new([ 0.5, -0.5, -0.5], [ 0.0,  0.0, -1.0], [0.0, 0.0]),
        // left
        LitVertex::new([-0.5, -0.5,  0.5], [-1.0,  0.0,  0.0], [1.0, 0.0]),
        LitVertex::new([-0.5,  0.5,  0.5], [-1.0,  0.0,  0.0], [1.0, 1.0]),
        LitVertex::new([-0.5,  0.5, -0.5], [-1.0,  0.0,  0.0], [0.0, 1.0]),
        LitVertex::new([-0.5, -0.5, -0.5], [-1.0,  0.0,  0.0], [0.0, 0.0]),
        // bottom
        LitVertex::new([-0.5, -0.5,  0.5], [ 0.0, -1.0,  0.0], [0.0, 1.0]),
        LitVertex::new([-0.5, -0.5, -0.5], [ 0.0, -1.0,  0.0], [0.0, 0.0]),
        LitVertex::new([ 0.5, -0.5, -0.5], [ 0.0, -1.0,  0.0], [1.0, 0.0]),
        LitVertex::new([ 0.5, -0.5,  0.5], [ 0.0, -1.0,  0.0], [1.0, 1.0]),
        // top
        LitVertex::new([-0.5,  0.5,  0.5], [ 0.0,  1.0,  0.0], [0.0, 0.0]),
        LitVertex::new([ 0.5,  0.5,  0.5], [ 0.0,  1.0,  0.0], [1.0, 0.0]),
        LitVertex::new([ 0.5,  0.5, -0.5], [ 0.0,  1.0,  0.0], [1.0, 1.0]),
        LitVertex::new([-0.5,  0.5, -0.5], [ 0.0,  1.0,  0.0], [0.0, 1.0]),
    ];

    let indices = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base, base + 2, base + 3]
        })
        .collect();

    RawGeometry::new(vertices, indices)
}

/// Up-facing unit quad lying at `y = 0.5`, the top face of the unit cube.
pub fn ground_quad() -> RawGeometry<LitVertex> {
    let up = [0.0, 1.0, 0.0];
    let vertices = vec![
        LitVertex::new([-0.5, 0.5, 0.5], up, [0.0, 0.0]),
        LitVertex::new([0.5, 0.5, 0.5], up, [1.0, 0.0]),
        LitVertex::new([0.5, 0.5, -0.5], up, [1.0, 1.0]),
        LitVertex::new([-0.5, 0.5, -0.5], up, [0.0, 1.0]),
    ];
    RawGeometry::new(vertices, vec![0, 1, 2, 0, 2, 3])
}

/// Quad covering normalized device coordinates, uv `(0, 0)` at the
/// bottom-left corner.
pub fn screen_quad() -> RawGeometry<LitVertex> {
    let toward = [0.0, 0.0, 1.0];
    let vertices = vec![
        LitVertex::new([-1.0, -1.0, 0.0], toward, [0.0, 0.0]),
        LitVertex::new([1.0, -1.0, 0.0], toward, [1.0, 0.0]),
        LitVertex::new([1.0, 1.0, 0.0], toward, [1.0, 1.0]),
        LitVertex::new([-1.0, 1.0, 0.0], toward, [0.0, 1.0]),
    ];
    RawGeometry::new(vertices, vec![0, 1, 2, 0, 2, 3])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_area_z(tri: [Vec3; 3]) -> f32 {
        (tri[1] - tri[0]).cross(tri[2] - tri[0]).z
    }

    #[test]
    fn hexagon_fan_counts() {
        let hex = polygon_fan(6, 0.75).unwrap();
        assert_eq!(hex.vertex_count(), 7);
        assert_eq!(hex.index_count(), 18);
        assert_eq!(hex.triangle_count(), 6);
        assert!(hex.validate().is_ok());
        assert_eq!(hex.vertices[0].position, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn hexagon_fan_covers_full_circle() {
        let hex = polygon_fan(6, 0.75).unwrap();
        let total: f32 = hex
            .triangles()
            .map(|[center, a, b]| (a - center).angle_between(b - center))
            .sum();
        assert!((total.to_degrees() - 360.0).abs() < 1e-3);
    }

    #[test]
    fn fan_last_triangle_wraps_to_first_perimeter_vertex() {
        let hex = polygon_fan(6, 1.0).unwrap();
        assert_eq!(&hex.indices[15..], &[0, 6, 1]);
    }

    #[test]
    fn fan_perimeter_lies_on_radius() {
        let fan = polygon_fan(9, 0.5).unwrap();
        for v in &fan.vertices[1..] {
            assert!((Vec3::from(v.position).length() - 0.5).abs() < 1e-5);
            assert_eq!(v.position[2], 0.0);
        }
    }

    #[test]
    fn fan_triangles_are_counter_clockwise() {
        let hex = polygon_fan(6, 0.75).unwrap();
        assert!(hex.triangles().all(|tri| signed_area_z(tri) > 0.0));
    }

    #[test]
    fn fan_rejects_degenerate_polygons() {
        assert_eq!(polygon_fan(2, 1.0), Err(GeometryError::TooFewSides(2)));
    }

    #[test]
    fn validate_catches_out_of_range_index() {
        let mut tri = hue_triangle();
        tri.indices = vec![0, 1, 3];
        assert_eq!(
            tri.validate(),
            Err(GeometryError::IndexOutOfBounds {
                position: 2,
                index: 3,
                vertex_count: 3,
            })
        );
    }

    #[test]
    fn validate_catches_partial_triangles() {
        let mut tri = hue_triangle();
        tri.indices.push(0);
        assert_eq!(tri.validate(), Err(GeometryError::NotTriangles(4)));
    }

    #[test]
    fn triangles_skip_out_of_range_corners() {
        let geometry = RawGeometry::new(
            vec![PositionVertex { position: [1.0, 2.0, 3.0] }],
            vec![0, 0, 0, 0, 5, 0, 0, 0],
        );
        assert!(geometry.validate().is_err());

        let triangles: Vec<_> = geometry.triangles().collect();
        assert_eq!(triangles, vec![[Vec3::new(1.0, 2.0, 3.0); 3]]);
    }

    #[test]
    fn fixed_shapes_are_valid() {
        assert!(hue_triangle().validate().is_ok());
        assert!(ground_quad().validate().is_ok());
        assert!(screen_quad().validate().is_ok());

        let cube = cube();
        assert!(cube.validate().is_ok());
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.index_count(), 36);
    }

    #[test]
    fn triangle_faces_the_viewer() {
        let tri = hue_triangle();
        assert!(tri.triangles().all(|t| signed_area_z(t) > 0.0));
        assert!(screen_quad().triangles().all(|t| signed_area_z(t) > 0.0));
    }

    #[test]
    fn cube_faces_wind_outward() {
        let cube = cube();
        for (tri, idx) in cube.triangles().zip(cube.indices.chunks_exact(3)) {
            let normal = Vec3::from(cube.vertices[idx[0] as usize].normal);
            let face = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
            assert!(face.dot(normal) > 0.0, "triangle {idx:?} winds inward");
        }
    }

    #[test]
    fn vertex_layouts_match_struct_sizes() {
        assert_eq!(PositionVertex::LAYOUT.array_stride, 12);
        assert_eq!(ColorVertex::LAYOUT.array_stride, 24);
        assert_eq!(LitVertex::LAYOUT.array_stride, 32);
        assert_eq!(LitVertex::LAYOUT.attributes.len(), 3);
    }
}
