//! Three textured cubes on a ground quad, lit by one point light, rendered
//! into an offscreen framebuffer and copied to the window by a second pass.
//!
//! Controls: WASD to move, mouse to look, scroll to zoom, Escape to quit.
//!
//! Run with: cargo run --example lit_cubes

use anyhow::Context;
use primer::*;

const LIT_VERTEX: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/shaders/lit_cubes.vert.wgsl");
const LIT_FRAGMENT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/shaders/lit_cubes.frag.wgsl");
const FBO_VERTEX: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/shaders/fbo.vert.wgsl");
const FBO_FRAGMENT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/shaders/fbo.frag.wgsl");

const ALBEDO: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/assets/albedo.png");
const SPECULAR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/assets/specular.png");

const CAMERA_START: Vec3 = Vec3::new(-1.0, 2.0, 3.0);
const LIGHT_POSITION: Vec3 = Vec3::new(1.2, 1.0, -2.0);
const SHININESS: f32 = 32.0;

const CUBE_POSITIONS: [Vec3; 3] = [
    Vec3::new(0.0, 0.7, 1.0),
    Vec3::new(0.0, 0.7, 0.0),
    Vec3::new(0.0, 0.7, -1.0),
];
const CUBE_SCALE: f32 = 0.4;
const GROUND_SCALE: Vec3 = Vec3::new(3.0, 1.0, 3.0);

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.1,
    a: 1.0,
};

fn lit_layout() -> UniformLayout {
    UniformLayout::new()
        .with("projection", UniformType::Mat4)
        .with("view", UniformType::Mat4)
        .with("model", UniformType::Mat4)
        .with("normal_mat", UniformType::Mat3)
        .with("view_pos", UniformType::Vec3)
        .with("light_position", UniformType::Vec3)
        .with("light_ambient", UniformType::Vec3)
        .with("light_diffuse", UniformType::Vec3)
        .with("light_specular", UniformType::Vec3)
        .with("shininess", UniformType::F32)
}

/// Sets `model` and the matching normal matrix.
fn set_model(program: &mut ShaderProgram, model: Mat4) {
    program.set("model", model);
    program.set("normal_mat", Mat3::from_mat4(model).transpose().inverse());
}

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = AppConfig::new().clear_color(CLEAR.r, CLEAR.g, CLEAR.b);

    run_with_config(config, |ctx| {
        let gpu = ctx.gpu;

        let lit = ProgramSources::load(LIT_VERTEX, LIT_FRAGMENT)?;
        let mut lit_program = ShaderProgram::builder("Lit")
            .vertex_layout::<LitVertex>()
            .uniforms(lit_layout())
            .texture_slots(2)
            .depth(DEPTH_FORMAT)
            .draws_per_frame(1 + CUBE_POSITIONS.len() as u32)
            .build(gpu, &lit.vertex, &lit.fragment);

        let fbo = ProgramSources::load(FBO_VERTEX, FBO_FRAGMENT)?;
        let mut screen_program = ShaderProgram::builder("Screen")
            .vertex_layout::<LitVertex>()
            .texture_slots(1)
            .build(gpu, &fbo.vertex, &fbo.fragment);

        let cube = Mesh::upload(gpu, &geometry::cube(), "Cube").context("uploading cube")?;
        let ground = Mesh::upload(gpu, &geometry::ground_quad(), "Ground").context("uploading ground")?;
        let screen = Mesh::upload(gpu, &geometry::screen_quad(), "Screen Quad")
            .context("uploading screen quad")?;

        // Image rows start at the top; the cube uvs put v = 0 at the bottom.
        let albedo = Texture::from_file_or_empty(gpu, ALBEDO, TextureOptions::default().flipped());
        let specular = Texture::from_file_or_empty(gpu, SPECULAR, TextureOptions::default().flipped());
        let maps = lit_program.texture_set(gpu, &[(&albedo).into(), (&specular).into()])?;

        let mut framebuffer = Framebuffer::for_surface(gpu);
        let mut screen_texture = screen_program.texture_set(gpu, &[(&framebuffer).into()])?;

        // Constant for the whole run
        lit_program.set("light_position", LIGHT_POSITION);
        lit_program.set("light_ambient", Vec3::splat(0.2));
        lit_program.set("light_diffuse", Vec3::splat(0.5));
        lit_program.set("light_specular", Vec3::ONE);
        lit_program.set("shininess", SHININESS);

        let mut camera = Camera::new(CAMERA_START);

        Ok(move |frame: &mut Frame| {
            let gpu = frame.gpu;
            camera.update(frame.input, frame.dt());

            if framebuffer.ensure_size(gpu) {
                match screen_program.texture_set(gpu, &[(&framebuffer).into()]) {
                    Ok(set) => screen_texture = set,
                    Err(err) => log::error!("{err}"),
                }
            }

            lit_program.begin_frame();
            screen_program.begin_frame();

            lit_program.set("projection", camera.projection_matrix(gpu.aspect()));
            lit_program.set("view", camera.view_matrix());
            lit_program.set("view_pos", camera.position());

            {
                let mut pass = framebuffer.begin_pass(&mut frame.encoder, CLEAR);

                set_model(&mut lit_program, Mat4::from_scale(GROUND_SCALE));
                lit_program.draw(gpu, &mut pass, &ground, Some(&maps));

                for position in CUBE_POSITIONS {
                    let model = Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(CUBE_SCALE));
                    set_model(&mut lit_program, model);
                    lit_program.draw(gpu, &mut pass, &cube, Some(&maps));
                }
            }

            let mut pass = frame.screen_pass();
            screen_program.draw(gpu, &mut pass, &screen, Some(&screen_texture));
        })
    })?;

    Ok(())
}

struct ProgramSources {
    vertex: ShaderSource,
    fragment: ShaderSource,
}

impl ProgramSources {
    fn load(vertex: &str, fragment: &str) -> anyhow::Result<Self> {
        Ok(Self {
            vertex: ShaderSource::from_file(vertex)?,
            fragment: ShaderSource::from_file(fragment)?,
        })
    }
}
