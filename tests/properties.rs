//! Behavior that spans modules: values flowing from the camera, hue clock,
//! and geometry into uniform blocks and vertex buffers, demo shaders
//! agreeing with the layouts the demos build, and errors surfacing through
//! the app error type.

use std::time::{Duration, Instant};

use primer::*;

const SHADER_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/shaders");

fn read_f32s(bytes: &[u8], offset: u32, count: usize) -> Vec<f32> {
    let start = offset as usize;
    bytes[start..start + count * 4]
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Builds a layout from the `Uniforms` struct of a WGSL source.
fn layout_from_wgsl(code: &str) -> UniformLayout {
    let body = code
        .split("struct Uniforms {")
        .nth(1)
        .and_then(|rest| rest.split('}').next())
        .expect("shader declares struct Uniforms");

    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
        .fold(UniformLayout::new(), |layout, line| {
            let (name, ty) = line.trim_end_matches(',').split_once(':').expect("`name: type` member");
            let ty = match ty.trim() {
                "f32" => UniformType::F32,
                "i32" => UniformType::I32,
                "u32" => UniformType::U32,
                "vec2<f32>" => UniformType::Vec2,
                "vec3<f32>" => UniformType::Vec3,
                "vec4<f32>" => UniformType::Vec4,
                "mat3x3<f32>" => UniformType::Mat3,
                "mat4x4<f32>" => UniformType::Mat4,
                other => panic!("unsupported uniform type {other}"),
            };
            layout.with(name.trim(), ty)
        })
}

// ============================================================================
// DEMO SHADERS AGAINST UNIFORM LAYOUTS
// ============================================================================

#[test]
fn lit_shader_stages_share_one_uniform_block() {
    let vertex = ShaderSource::from_file(format!("{SHADER_DIR}/lit_cubes.vert.wgsl")).unwrap();
    let fragment = ShaderSource::from_file(format!("{SHADER_DIR}/lit_cubes.frag.wgsl")).unwrap();

    let layout = layout_from_wgsl(&vertex.code);
    assert_eq!(layout, layout_from_wgsl(&fragment.code));

    let names: Vec<_> = layout.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "projection",
            "view",
            "model",
            "normal_mat",
            "view_pos",
            "light_position",
            "light_ambient",
            "light_diffuse",
            "light_specular",
            "shininess",
        ]
    );
    assert_eq!(layout.offset_of("normal_mat"), Some(192));
    assert_eq!(layout.offset_of("view_pos"), Some(240));
    assert_eq!(layout.offset_of("shininess"), Some(316));
    assert_eq!(layout.size(), 320);
}

#[test]
fn hue_shader_reads_a_single_color() {
    let fragment = ShaderSource::from_file(format!("{SHADER_DIR}/hue_triangle.frag.wgsl")).unwrap();
    let layout = layout_from_wgsl(&fragment.code);
    assert_eq!(layout.field("u_color").map(|f| f.ty), Some(UniformType::Vec3));
    assert_eq!(layout.size(), 16);
}

#[test]
fn demo_shaders_define_both_entry_points() {
    for name in ["hue_triangle", "lit_cubes", "fbo"] {
        let vertex = ShaderSource::from_file(format!("{SHADER_DIR}/{name}.vert.wgsl")).unwrap();
        let fragment = ShaderSource::from_file(format!("{SHADER_DIR}/{name}.frag.wgsl")).unwrap();
        assert!(vertex.code.contains(&format!("fn {VERTEX_ENTRY}")), "{name}");
        assert!(fragment.code.contains(&format!("fn {FRAGMENT_ENTRY}")), "{name}");
    }
}

// ============================================================================
// VALUES INTO UNIFORM BLOCKS
// ============================================================================

#[test]
fn camera_matrices_land_column_major_at_their_offsets() {
    let layout = UniformLayout::new()
        .with("projection", UniformType::Mat4)
        .with("view", UniformType::Mat4)
        .with("view_pos", UniformType::Vec3);
    let mut block = UniformBlock::new(layout);

    let mut camera = Camera::new(Vec3::new(-1.0, 2.0, 3.0));
    camera.process_mouse_movement(40.0, -25.0);
    camera.process_keyboard(CameraMovement::Left, 0.5);

    block.try_set("projection", camera.projection_matrix(800.0 / 600.0)).unwrap();
    block.try_set("view", camera.view_matrix()).unwrap();
    block.try_set("view_pos", camera.position()).unwrap();

    let bytes = block.bytes();
    assert_eq!(
        read_f32s(bytes, 0, 16),
        camera.projection_matrix(800.0 / 600.0).to_cols_array()
    );
    assert_eq!(read_f32s(bytes, 64, 16), camera.view_matrix().to_cols_array());
    assert_eq!(read_f32s(bytes, 128, 3), camera.position().to_array());
}

#[test]
fn normal_matrix_columns_are_padded_to_sixteen_bytes() {
    let mut block = UniformBlock::new(UniformLayout::new().with("normal_mat", UniformType::Mat3));
    let model = Mat4::from_translation(Vec3::new(0.0, 0.7, -1.0)) * Mat4::from_scale(Vec3::splat(0.4));
    let normal = Mat3::from_mat4(model).transpose().inverse();
    block.try_set("normal_mat", normal).unwrap();

    let bytes = block.bytes();
    assert_eq!(bytes.len(), 48);
    for (i, column) in [normal.x_axis, normal.y_axis, normal.z_axis].iter().enumerate() {
        assert_eq!(read_f32s(bytes, i as u32 * 16, 3), column.to_array());
    }
}

#[test]
fn frame_clock_drives_hue_into_the_color_uniform() {
    let start = Instant::now();
    let mut clock = FrameClock::starting_at(start);
    let mut cycle = HueCycle::new(0.0);
    let mut block = UniformBlock::new(UniformLayout::new().with("u_color", UniformType::Vec3));

    let mut elapsed = 0.0;
    for frame in 1..=63 {
        let time = clock.tick_at(start + Duration::from_millis(16 * frame));
        elapsed = time.elapsed;
        block.set("u_color", cycle.update(time.elapsed).color());
    }

    let switches = (elapsed / HUE_PERIOD).floor() as u64;
    assert_eq!(cycle.switches(), switches);
    assert_eq!(cycle.hue(), Hue::Red.advance(switches));
    assert_eq!(read_f32s(block.bytes(), 0, 3), cycle.hue().color().to_array());
}

// ============================================================================
// GEOMETRY INTO VERTEX BUFFERS
// ============================================================================

fn assert_buffer_matches_layout<V: Vertex>(geometry: &RawGeometry<V>) {
    let bytes: &[u8] = bytemuck::cast_slice(&geometry.vertices);
    assert_eq!(
        bytes.len() as u64,
        geometry.vertex_count() as u64 * V::LAYOUT.array_stride
    );

    let end = V::LAYOUT
        .attributes
        .iter()
        .map(|a| a.offset + a.format.size())
        .max()
        .unwrap_or(0);
    assert_eq!(end, V::LAYOUT.array_stride);
}

#[test]
fn uploaded_bytes_match_vertex_layouts() {
    assert_buffer_matches_layout(&geometry::polygon_fan(6, 0.75).unwrap());
    assert_buffer_matches_layout(&geometry::hue_triangle());
    assert_buffer_matches_layout(&geometry::cube());
    assert_buffer_matches_layout(&geometry::ground_quad());
    assert_buffer_matches_layout(&geometry::screen_quad());
}

// ============================================================================
// ERRORS THROUGH THE APP
// ============================================================================

#[test]
fn setup_failures_keep_their_cause() {
    let cause = geometry::polygon_fan(2, 1.0).unwrap_err();
    let err = AppError::Setup(anyhow::Error::from(cause).context("building hexagon"));
    let message = format!("{err}");
    assert!(message.starts_with("setup failed: building hexagon"), "{message}");

    let source = std::error::Error::source(&err).expect("setup error has a source");
    let chain: Vec<String> = anyhow::Chain::new(source).map(|e| e.to_string()).collect();
    assert!(chain.iter().any(|e| e.contains("at least 3 sides")), "{chain:?}");
}

#[test]
fn missing_shader_file_is_an_init_error() {
    let err = ShaderSource::from_file("does/not/exist.wgsl").unwrap_err();
    assert!(matches!(err, InitError::ShaderSource { .. }));

    let app: AppError = err.into();
    assert!(app.to_string().contains("exist.wgsl"));
}

#[test]
fn resized_framebuffer_status_reads_as_a_log_line() {
    let status = framebuffer_status(Extent::new(800, 600), Extent::new(400, 300));
    assert!(!status.is_complete());
    assert_eq!(
        status.to_string(),
        "framebuffer not complete: attachment sizes differ (color 800x600, depth 400x300)"
    );
}
