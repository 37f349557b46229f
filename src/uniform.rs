//! Named uniforms packed into a single WGSL uniform block.
//!
//! A [`UniformLayout`] lists the block's members in declaration order and
//! computes their byte offsets with the WGSL uniform address-space rules.
//! A [`UniformBlock`] is the CPU-side staging copy that `set(name, value)`
//! writes into; [`ShaderProgram`](crate::ShaderProgram) copies it to the
//! GPU once per draw.
//!
//! Names are free-form, so a GLSL-style `light.position` can address a
//! flattened WGSL member called `light_position`. The WGSL struct must
//! declare its members in the same order as the layout:
//!
//! ```
//! use primer::{UniformLayout, UniformType};
//!
//! let layout = UniformLayout::new()
//!     .with("model", UniformType::Mat4)
//!     .with("light.position", UniformType::Vec3)
//!     .with("material.shininess", UniformType::F32);
//!
//! // struct Uniforms {
//! //     model: mat4x4<f32>,        // offset 0
//! //     light_position: vec3<f32>, // offset 64
//! //     material_shininess: f32,   // offset 76, packed into the vec3 padding
//! // }
//! assert_eq!(layout.offset_of("material.shininess"), Some(76));
//! ```

use std::collections::HashSet;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::error::UniformError;

/// Types a uniform member can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformType {
    /// WGSL `f32`.
    F32,
    /// WGSL `i32`.
    I32,
    /// WGSL `u32`.
    U32,
    /// WGSL `vec2<f32>`.
    Vec2,
    /// WGSL `vec3<f32>`, 16-byte aligned with a trailing 4-byte gap.
    Vec3,
    /// WGSL `vec4<f32>`.
    Vec4,
    /// WGSL `mat3x3<f32>`, stored as three padded columns.
    Mat3,
    /// WGSL `mat4x4<f32>`, column-major.
    Mat4,
}

impl UniformType {
    /// Alignment in the uniform address space.
    pub const fn align(self) -> u32 {
        match self {
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::Vec2 => 8,
            Self::Vec3 | Self::Vec4 | Self::Mat3 | Self::Mat4 => 16,
        }
    }

    /// Size in bytes, excluding trailing padding.
    pub const fn size(self) -> u32 {
        match self {
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::Vec2 => 8,
            Self::Vec3 => 12,
            Self::Vec4 => 16,
            // three vec3 columns, each padded to 16
            Self::Mat3 => 48,
            Self::Mat4 => 64,
        }
    }
}

/// A value that can be written to a uniform member.
///
/// Each variant matches the [`UniformType`] of the same name; `From` impls
/// let `set` take glam values and plain scalars directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// A float scalar.
    F32(f32),
    /// A signed integer scalar.
    I32(i32),
    /// An unsigned integer scalar.
    U32(u32),
    /// A 2-component vector.
    Vec2(Vec2),
    /// A 3-component vector, such as a position or an RGB color.
    Vec3(Vec3),
    /// A 4-component vector.
    Vec4(Vec4),
    /// A 3x3 matrix, such as a normal matrix.
    Mat3(Mat3),
    /// A 4x4 transform.
    Mat4(Mat4),
}

impl UniformValue {
    /// The member type this value can be written to.
    pub fn ty(&self) -> UniformType {
        match self {
            Self::F32(_) => UniformType::F32,
            Self::I32(_) => UniformType::I32,
            Self::U32(_) => UniformType::U32,
            Self::Vec2(_) => UniformType::Vec2,
            Self::Vec3(_) => UniformType::Vec3,
            Self::Vec4(_) => UniformType::Vec4,
            Self::Mat3(_) => UniformType::Mat3,
            Self::Mat4(_) => UniformType::Mat4,
        }
    }

    /// Writes the value at the start of `dst`, which must be at least
    /// `self.ty().size()` bytes long.
    fn write_to(&self, dst: &mut [u8]) {
        match self {
            Self::F32(v) => dst[..4].copy_from_slice(bytemuck::bytes_of(v)),
            Self::I32(v) => dst[..4].copy_from_slice(bytemuck::bytes_of(v)),
            Self::U32(v) => dst[..4].copy_from_slice(bytemuck::bytes_of(v)),
            Self::Vec2(v) => dst[..8].copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            Self::Vec3(v) => dst[..12].copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            Self::Vec4(v) => dst[..16].copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            Self::Mat3(m) => {
                for (i, col) in [m.x_axis, m.y_axis, m.z_axis].iter().enumerate() {
                    let at = i * 16;
                    dst[at..at + 12].copy_from_slice(bytemuck::cast_slice(&col.to_array()));
                }
            }
            Self::Mat4(m) => dst[..64].copy_from_slice(bytemuck::cast_slice(&m.to_cols_array())),
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::F32(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        Self::U32(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        Self::Vec3(Vec3::from(v))
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        Self::Vec4(v)
    }
}

impl From<Mat3> for UniformValue {
    fn from(v: Mat3) -> Self {
        Self::Mat3(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self {
        Self::Mat4(v)
    }
}

/// One member of a uniform block.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformField {
    /// Name used with `set`.
    pub name: String,
    pub ty: UniformType,
    /// Byte offset from the start of the block.
    pub offset: u32,
}

/// Ordered uniform members with computed offsets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformLayout {
    fields: Vec<UniformField>,
    end: u32,
}

impl UniformLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a member after the previous one, aligned for its type.
    pub fn with(mut self, name: impl Into<String>, ty: UniformType) -> Self {
        let offset = align_to(self.end, ty.align());
        self.fields.push(UniformField {
            name: name.into(),
            ty,
            offset,
        });
        self.end = offset + ty.size();
        self
    }

    /// Members in declaration order.
    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Byte offset of the member called `name`.
    pub fn offset_of(&self, name: &str) -> Option<u32> {
        self.field(name).map(|f| f.offset)
    }

    /// Size of the block rounded up to 16 bytes. An empty layout still
    /// occupies 16 bytes so it can back a binding.
    pub fn size(&self) -> u32 {
        align_to(self.end, 16).max(16)
    }
}

pub(crate) const fn align_to(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

/// CPU staging copy of a uniform block.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: UniformLayout,
    data: Vec<u8>,
    warned: HashSet<String>,
}

impl UniformBlock {
    /// A zero-filled block of `layout.size()` bytes.
    pub fn new(layout: UniformLayout) -> Self {
        let data = vec![0; layout.size() as usize];
        Self {
            layout,
            data,
            warned: HashSet::new(),
        }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// The block as uploaded to the GPU, padding included.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Writes `value` into the member called `name`.
    pub fn try_set(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<(), UniformError> {
        let value = value.into();
        let field = self
            .layout
            .field(name)
            .ok_or_else(|| UniformError::UnknownName(name.to_string()))?;

        if field.ty != value.ty() {
            return Err(UniformError::TypeMismatch {
                name: name.to_string(),
                expected: field.ty,
                actual: value.ty(),
            });
        }

        let start = field.offset as usize;
        let end = start + field.ty.size() as usize;
        value.write_to(&mut self.data[start..end]);
        Ok(())
    }

    /// Like [`try_set`](Self::try_set), but a rejected write is logged once
    /// per name and otherwise ignored.
    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) {
        if let Err(err) = self.try_set(name, value) {
            if self.warned.insert(name.to_string()) {
                log::warn!("ignoring uniform write: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_f32(block: &UniformBlock, offset: usize) -> f32 {
        f32::from_le_bytes(block.bytes()[offset..offset + 4].try_into().unwrap())
    }

    fn lit_layout() -> UniformLayout {
        UniformLayout::new()
            .with("projection", UniformType::Mat4)
            .with("view", UniformType::Mat4)
            .with("model", UniformType::Mat4)
            .with("normalMat", UniformType::Mat3)
            .with("viewPos", UniformType::Vec3)
            .with("light.position", UniformType::Vec3)
            .with("light.ambient", UniformType::Vec3)
            .with("light.diffuse", UniformType::Vec3)
            .with("light.specular", UniformType::Vec3)
            .with("material.shininess", UniformType::F32)
    }

    #[test]
    fn offsets_follow_wgsl_alignment() {
        let layout = lit_layout();
        assert_eq!(layout.offset_of("projection"), Some(0));
        assert_eq!(layout.offset_of("model"), Some(128));
        assert_eq!(layout.offset_of("normalMat"), Some(192));
        assert_eq!(layout.offset_of("viewPos"), Some(240));
        assert_eq!(layout.offset_of("light.position"), Some(256));
        assert_eq!(layout.offset_of("light.specular"), Some(304));
        assert_eq!(layout.offset_of("material.shininess"), Some(316));
        assert_eq!(layout.size(), 320);
    }

    #[test]
    fn scalars_pack_tightly_and_vec2_aligns_to_8() {
        let layout = UniformLayout::new()
            .with("a", UniformType::F32)
            .with("b", UniformType::Vec2)
            .with("c", UniformType::I32);
        assert_eq!(layout.offset_of("b"), Some(8));
        assert_eq!(layout.offset_of("c"), Some(16));
        assert_eq!(layout.size(), 32);
    }

    #[test]
    fn empty_layout_still_has_a_size() {
        assert_eq!(UniformLayout::new().size(), 16);
    }

    #[test]
    fn set_writes_vec3_components() {
        let mut block = UniformBlock::new(UniformLayout::new().with("u_color", UniformType::Vec3));
        block.try_set("u_color", Vec3::new(0.25, 0.5, 1.0)).unwrap();
        assert_eq!(read_f32(&block, 0), 0.25);
        assert_eq!(read_f32(&block, 4), 0.5);
        assert_eq!(read_f32(&block, 8), 1.0);
    }

    #[test]
    fn mat3_columns_are_padded() {
        let mut block = UniformBlock::new(UniformLayout::new().with("m", UniformType::Mat3));
        let m = Mat3::from_cols(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(7.0, 8.0, 9.0),
        );
        block.try_set("m", m).unwrap();
        assert_eq!(read_f32(&block, 0), 1.0);
        assert_eq!(read_f32(&block, 12), 0.0);
        assert_eq!(read_f32(&block, 16), 4.0);
        assert_eq!(read_f32(&block, 40), 9.0);
    }

    #[test]
    fn mat4_is_column_major() {
        let mut block = UniformBlock::new(UniformLayout::new().with("m", UniformType::Mat4));
        let m = Mat4::from_translation(Vec3::new(3.0, 4.0, 5.0));
        block.try_set("m", m).unwrap();
        assert_eq!(read_f32(&block, 48), 3.0);
        assert_eq!(read_f32(&block, 52), 4.0);
        assert_eq!(read_f32(&block, 56), 5.0);
        assert_eq!(read_f32(&block, 60), 1.0);
    }

    #[test]
    fn try_set_rejects_unknown_names_and_wrong_types() {
        let mut block = UniformBlock::new(lit_layout());
        assert_eq!(
            block.try_set("objectColor", Vec3::ONE),
            Err(UniformError::UnknownName("objectColor".into()))
        );
        assert_eq!(
            block.try_set("material.shininess", 32_i32),
            Err(UniformError::TypeMismatch {
                name: "material.shininess".into(),
                expected: UniformType::F32,
                actual: UniformType::I32,
            })
        );
    }

    #[test]
    fn set_ignores_bad_writes_without_touching_data() {
        let mut block = UniformBlock::new(lit_layout());
        let before = block.bytes().to_vec();
        block.set("missing", 1.0_f32);
        block.set("missing", 2.0_f32);
        block.set("viewPos", 1.0_f32);
        assert_eq!(block.bytes(), &before[..]);
    }
}
