//! A triangle that switches between red, green and blue four times a second.
//!
//! Run with: cargo run --example hue_triangle

use anyhow::Context;
use primer::*;

const VERTEX: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/shaders/hue_triangle.vert.wgsl");
const FRAGMENT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/shaders/hue_triangle.frag.wgsl");

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let gray = 50.0 / 255.0;
    let config = AppConfig::new().clear_color(gray, gray, gray);

    run_with_config(config, |ctx| {
        let vertex = ShaderSource::from_file(VERTEX)?;
        let fragment = ShaderSource::from_file(FRAGMENT)?;

        let mesh = Mesh::upload(ctx.gpu, &geometry::hue_triangle(), "Triangle")
            .context("uploading triangle")?;

        let mut program = ShaderProgram::builder("Hue Triangle")
            .vertex_layout::<ColorVertex>()
            .uniforms(UniformLayout::new().with("u_color", UniformType::Vec3))
            .build(ctx.gpu, &vertex, &fragment);

        let mut hue = HueCycle::new(0.0);

        Ok(move |frame: &mut Frame| {
            let gpu = frame.gpu;
            let current = hue.update(frame.elapsed());

            program.begin_frame();
            program.set("u_color", current.color());

            let mut pass = frame.screen_pass();
            program.draw(gpu, &mut pass, &mesh, None);
        })
    })?;

    Ok(())
}
