//! A filled yellow hexagon on a purple background.
//!
//! Run with: cargo run --example hexagon

use primer::*;

const SIDES: u32 = 6;
const RADIUS: f32 = 0.75;

const SHADER: &str = r#"
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 53.0 / 255.0, 1.0);
}
"#;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = AppConfig::new().clear_color(148.0 / 255.0, 0.0, 211.0 / 255.0);

    run_with_config(config, |ctx| {
        let hexagon = geometry::polygon_fan(SIDES, RADIUS)?;
        let mesh = Mesh::upload(ctx.gpu, &hexagon, "Hexagon")?;

        let source = ShaderSource::inline("hexagon.wgsl", SHADER);
        let mut program = ShaderProgram::builder("Hexagon")
            .vertex_layout::<PositionVertex>()
            .build(ctx.gpu, &source, &source);

        Ok(move |frame: &mut Frame| {
            let gpu = frame.gpu;
            program.begin_frame();

            let mut pass = frame.screen_pass();
            program.draw(gpu, &mut pass, &mesh, None);
        })
    })?;

    Ok(())
}
