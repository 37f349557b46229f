//! Vertex + fragment shader programs with named uniforms.
//!
//! A [`ShaderProgram`] is built from two WGSL sources, one per stage. The
//! vertex source must define `vs_main` and the fragment source `fs_main`.
//! Both see the same bindings:
//!
//! - `@group(0) @binding(0)`: the uniform block described by the program's
//!   [`UniformLayout`] (may be omitted by a stage that reads no uniforms)
//! - `@group(1) @binding(2 * i)` / `@binding(2 * i + 1)`: texture slot `i`
//!   and its sampler, for each declared texture slot
//!
//! # Failure behavior
//!
//! A stage that fails to compile, or a pair that fails to link, is logged at
//! error level and leaves the program *unusable*: construction still
//! succeeds, and every draw through it is skipped. Nothing panics.
//!
//! # Uniforms
//!
//! Values written with [`set`](ShaderProgram::set) are snapshotted by each
//! [`draw`](ShaderProgram::draw), so changing `model` between two draws in
//! the same pass affects only the second one. Each snapshot uses one of a
//! fixed number of per-frame slots; call
//! [`begin_frame`](ShaderProgram::begin_frame) before the first draw of each
//! frame to recycle them.
//!
//! ```ignore
//! let mut program = ShaderProgram::builder("Lit")
//!     .vertex_layout::<LitVertex>()
//!     .uniforms(layout)
//!     .texture_slots(2)
//!     .depth(DEPTH_FORMAT)
//!     .build(&gpu, &vertex_src, &fragment_src);
//!
//! program.begin_frame();
//! program.set("model", model);
//! program.draw(&gpu, &mut pass, &cube, Some(&maps));
//! ```

use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use crate::error::{InitError, ShaderError, UniformError};
use crate::framebuffer::Framebuffer;
use crate::geometry::Vertex;
use crate::gpu::GpuContext;
use crate::mesh::Mesh;
use crate::texture::Texture;
use crate::uniform::{UniformBlock, UniformLayout, UniformValue, align_to};

/// Entry point every vertex stage must define.
pub const VERTEX_ENTRY: &str = "vs_main";
/// Entry point every fragment stage must define.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Draw slots per frame when the builder is not told otherwise.
pub const DEFAULT_DRAWS_PER_FRAME: u32 = 16;

/// WGSL source text for one stage.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    /// Shown in compile errors; the file path for file sources.
    pub label: String,
    /// WGSL text.
    pub code: String,
}

impl ShaderSource {
    /// Source embedded in the program.
    pub fn inline(label: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            code: code.into(),
        }
    }

    /// Reads a source file. A missing file is an initialization error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, InitError> {
        let path = path.as_ref();
        let code = std::fs::read_to_string(path).map_err(|source| InitError::ShaderSource {
            path: PathBuf::from(path),
            source,
        })?;
        Ok(Self {
            label: path.display().to_string(),
            code,
        })
    }
}

/// A texture view and sampler pair to bind into one texture slot.
#[derive(Clone, Copy)]
pub struct TextureBinding<'a> {
    pub view: &'a wgpu::TextureView,
    pub sampler: &'a wgpu::Sampler,
}

impl<'a> From<&'a Texture> for TextureBinding<'a> {
    fn from(texture: &'a Texture) -> Self {
        Self {
            view: &texture.view,
            sampler: &texture.sampler,
        }
    }
}

impl<'a> From<&'a Framebuffer> for TextureBinding<'a> {
    fn from(fb: &'a Framebuffer) -> Self {
        Self {
            view: &fb.color_view,
            sampler: &fb.sampler,
        }
    }
}

/// Textures bound to every slot of one program, in slot order.
#[derive(Debug)]
pub struct TextureSet {
    bind_group: wgpu::BindGroup,
}

/// Configures a [`ShaderProgram`] before compiling it.
pub struct ProgramBuilder {
    label: String,
    vertex_layout: Option<wgpu::VertexBufferLayout<'static>>,
    uniforms: UniformLayout,
    texture_slots: u32,
    depth_format: Option<wgpu::TextureFormat>,
    draws_per_frame: u32,
}

impl ProgramBuilder {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            vertex_layout: None,
            uniforms: UniformLayout::new(),
            texture_slots: 0,
            depth_format: None,
            draws_per_frame: DEFAULT_DRAWS_PER_FRAME,
        }
    }

    /// Vertex format the program reads. Meshes uploaded with a different
    /// format are refused at draw time.
    pub fn vertex_layout<V: Vertex>(mut self) -> Self {
        self.vertex_layout = Some(V::LAYOUT);
        self
    }

    /// Members of the group 0 uniform struct, in declaration order.
    pub fn uniforms(mut self, layout: UniformLayout) -> Self {
        self.uniforms = layout;
        self
    }

    /// Number of texture/sampler pairs in group 1. Slot `i` binds its
    /// texture at `2i` and its sampler at `2i + 1`.
    pub fn texture_slots(mut self, count: u32) -> Self {
        self.texture_slots = count;
        self
    }

    /// Enables depth testing (`Less`, with writes) against this format.
    pub fn depth(mut self, format: wgpu::TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    /// Number of draws the program can record per frame.
    pub fn draws_per_frame(mut self, count: u32) -> Self {
        self.draws_per_frame = count.max(1);
        self
    }

    /// Compiles both stages and links them. Failures are logged and yield
    /// an unusable program.
    pub fn build(self, gpu: &GpuContext, vertex: &ShaderSource, fragment: &ShaderSource) -> ShaderProgram {
        ShaderProgram::create(gpu, self, vertex, fragment)
    }
}

/// A linked vertex + fragment pipeline with its uniform block and texture
/// slots.
pub struct ShaderProgram {
    label: String,
    pipeline: Option<wgpu::RenderPipeline>,
    vertex_layout: Option<wgpu::VertexBufferLayout<'static>>,
    uniforms: UniformBlock,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    slot_stride: u64,
    slot_count: u32,
    next_slot: u32,
    texture_layout: Option<wgpu::BindGroupLayout>,
    texture_slots: u32,
    warned_skip: bool,
}

impl ShaderProgram {
    /// Starts a program with no vertex input, no uniforms, no textures, and
    /// no depth test.
    pub fn builder(label: impl Into<String>) -> ProgramBuilder {
        ProgramBuilder::new(label)
    }

    fn create(gpu: &GpuContext, desc: ProgramBuilder, vertex: &ShaderSource, fragment: &ShaderSource) -> Self {
        let device = &gpu.device;
        let label = desc.label;

        let vs = compile_stage(gpu, "vertex", &label, vertex);
        let fs = compile_stage(gpu, "fragment", &label, fragment);

        // Uniform block, one aligned slot per draw
        let uniforms = UniformBlock::new(desc.uniforms);
        let block_size = uniforms.layout().size();
        let slot_stride = align_to(block_size, device.limits().min_uniform_buffer_offset_alignment) as u64;
        let slot_count = desc.draws_per_frame;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Uniforms")),
            size: slot_stride * slot_count as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label} Uniform Layout")),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(block_size as u64),
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Uniform Bind Group")),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: NonZeroU64::new(block_size as u64),
                }),
            }],
        });

        // Texture slots: (texture, sampler) pairs
        let texture_layout = (desc.texture_slots > 0).then(|| {
            let entries: Vec<_> = (0..desc.texture_slots)
                .flat_map(|slot| {
                    [
                        wgpu::BindGroupLayoutEntry {
                            binding: slot * 2,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: slot * 2 + 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ]
                })
                .collect();

            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{label} Texture Layout")),
                entries: &entries,
            })
        });

        let pipeline = match (vs, fs, desc.vertex_layout.as_ref()) {
            (Some(vs), Some(fs), Some(vertex_layout)) => {
                let mut bind_group_layouts = vec![&uniform_layout];
                bind_group_layouts.extend(texture_layout.as_ref());

                let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some(&format!("{label} Pipeline Layout")),
                    bind_group_layouts: &bind_group_layouts,
                    push_constant_ranges: &[],
                });

                let (pipeline, error) = gpu.validation_scope(|| {
                    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: Some(&label),
                        layout: Some(&pipeline_layout),
                        vertex: wgpu::VertexState {
                            module: &vs,
                            entry_point: Some(VERTEX_ENTRY),
                            buffers: std::slice::from_ref(vertex_layout),
                            compilation_options: Default::default(),
                        },
                        fragment: Some(wgpu::FragmentState {
                            module: &fs,
                            entry_point: Some(FRAGMENT_ENTRY),
                            targets: &[Some(wgpu::ColorTargetState {
                                format: gpu.config.format,
                                blend: Some(wgpu::BlendState::REPLACE),
                                write_mask: wgpu::ColorWrites::ALL,
                            })],
                            compilation_options: Default::default(),
                        }),
                        primitive: wgpu::PrimitiveState {
                            topology: wgpu::PrimitiveTopology::TriangleList,
                            front_face: wgpu::FrontFace::Ccw,
                            cull_mode: Some(wgpu::Face::Back),
                            polygon_mode: wgpu::PolygonMode::Fill,
                            ..Default::default()
                        },
                        depth_stencil: desc.depth_format.map(|format| wgpu::DepthStencilState {
                            format,
                            depth_write_enabled: true,
                            depth_compare: wgpu::CompareFunction::Less,
                            stencil: wgpu::StencilState::default(),
                            bias: wgpu::DepthBiasState::default(),
                        }),
                        multisample: wgpu::MultisampleState::default(),
                        multiview: None,
                        cache: None,
                    })
                });

                match error {
                    None => Some(pipeline),
                    Some(err) => {
                        report(&ShaderError::Link {
                            label: label.clone(),
                            log: err.to_string(),
                        });
                        None
                    }
                }
            }
            (_, _, None) => {
                report(&ShaderError::Link {
                    label: label.clone(),
                    log: "no vertex layout given".to_string(),
                });
                None
            }
            _ => {
                report(&ShaderError::Link {
                    label: label.clone(),
                    log: "a stage failed to compile".to_string(),
                });
                None
            }
        };

        if pipeline.is_some() {
            log::debug!("linked shader program `{label}`");
        }

        Self {
            label,
            pipeline,
            vertex_layout: desc.vertex_layout,
            uniforms,
            uniform_buffer,
            uniform_bind_group,
            slot_stride,
            slot_count,
            next_slot: 0,
            texture_layout,
            texture_slots: desc.texture_slots,
            warned_skip: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// False when compilation or linking failed.
    pub fn is_usable(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Sets a uniform for subsequent draws. Unknown names and type
    /// mismatches are logged once and ignored.
    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) {
        self.uniforms.set(name, value);
    }

    /// Like [`ShaderProgram::set`], but reports unknown names and type
    /// mismatches instead of logging them.
    pub fn try_set(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<(), UniformError> {
        self.uniforms.try_set(name, value)
    }

    /// Current CPU-side uniform values.
    pub fn uniforms(&self) -> &UniformBlock {
        &self.uniforms
    }

    /// Recycles the per-draw uniform slots. Call once per frame before the
    /// first draw.
    pub fn begin_frame(&mut self) {
        self.next_slot = 0;
    }

    /// Binds textures to this program's slots, in slot order.
    pub fn texture_set(&self, gpu: &GpuContext, textures: &[TextureBinding<'_>]) -> Result<TextureSet, ShaderError> {
        let Some(layout) = &self.texture_layout else {
            return Err(ShaderError::TextureCount {
                label: self.label.clone(),
                expected: 0,
                actual: textures.len(),
            });
        };
        if textures.len() != self.texture_slots as usize {
            return Err(ShaderError::TextureCount {
                label: self.label.clone(),
                expected: self.texture_slots as usize,
                actual: textures.len(),
            });
        }

        let entries: Vec<_> = textures
            .iter()
            .enumerate()
            .flat_map(|(slot, binding)| {
                let slot = slot as u32;
                [
                    wgpu::BindGroupEntry {
                        binding: slot * 2,
                        resource: wgpu::BindingResource::TextureView(binding.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: slot * 2 + 1,
                        resource: wgpu::BindingResource::Sampler(binding.sampler),
                    },
                ]
            })
            .collect();

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Textures", self.label)),
            layout,
            entries: &entries,
        });

        Ok(TextureSet { bind_group })
    }

    /// Draws `mesh` with the current uniform values and `textures`.
    ///
    /// Skipped (with a one-time warning) when the program is unusable, the
    /// mesh layout does not match, textures are missing, or the frame's draw
    /// slots are used up.
    pub fn draw(
        &mut self,
        gpu: &GpuContext,
        pass: &mut wgpu::RenderPass<'_>,
        mesh: &Mesh,
        textures: Option<&TextureSet>,
    ) {
        if self.pipeline.is_none() {
            self.skip("program is not linked");
            return;
        }
        if self.vertex_layout.as_ref() != Some(&mesh.layout) {
            self.skip("mesh vertex layout does not match the program");
            return;
        }
        if self.texture_slots > 0 && textures.is_none() {
            self.skip("program needs textures but none were bound");
            return;
        }
        if self.next_slot >= self.slot_count {
            self.skip("out of per-frame draw slots");
            return;
        }

        let Some(pipeline) = &self.pipeline else {
            return;
        };
        let offset = self.next_slot as u64 * self.slot_stride;
        self.next_slot += 1;
        gpu.queue
            .write_buffer(&self.uniform_buffer, offset, self.uniforms.bytes());

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[offset as u32]);
        if let (Some(set), true) = (textures, self.texture_slots > 0) {
            pass.set_bind_group(1, &set.bind_group, &[]);
        }
        mesh.draw(pass);
    }

    fn skip(&mut self, reason: &str) {
        if !self.warned_skip {
            self.warned_skip = true;
            log::warn!("skipping draw with `{}`: {reason}", self.label);
        }
    }
}

fn compile_stage(
    gpu: &GpuContext,
    stage: &'static str,
    program: &str,
    source: &ShaderSource,
) -> Option<wgpu::ShaderModule> {
    let (module, error) = gpu.validation_scope(|| {
        gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&source.label),
            source: wgpu::ShaderSource::Wgsl(source.code.as_str().into()),
        })
    });

    match error {
        None => Some(module),
        Some(err) => {
            report(&ShaderError::Compile {
                stage,
                label: format!("{program}: {}", source.label),
                log: err.to_string(),
            });
            None
        }
    }
}

fn report(err: &ShaderError) {
    log::error!("{err}");
}
