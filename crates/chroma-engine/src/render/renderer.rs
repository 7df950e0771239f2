use anyhow::{Context, Result};

use super::mesh::Mesh;
use super::shader::{self, ShaderInterface};
use super::vertex::Vertex;
use super::{RenderCtx, RenderTarget};

/// Minimum element capacity of the dynamic vertex/index buffers.
const MIN_CAPACITY: usize = 64;

/// Draws a [`Mesh`] through the position/color pass-through shader.
///
/// GPU objects are created lazily on first use. The pipeline is rebuilt when
/// the surface format changes and everything is rebuilt when the device
/// changes, so one renderer can serve several windows. Buffers grow to the
/// next power of two and are re-uploaded every frame.
pub struct ColorRenderer {
    /// Device and surface format the GPU objects below belong to.
    built_for: Option<(wgpu::Device, wgpu::TextureFormat)>,
    pipeline: Option<wgpu::RenderPipeline>,

    vertex_buf: Option<wgpu::Buffer>,
    vertex_capacity: usize,

    index_buf: Option<wgpu::Buffer>,
    index_capacity: usize,
}

impl ColorRenderer {
    /// Verifies the shader against [`Vertex::layout`] before any GPU work.
    pub fn new() -> Result<Self> {
        let module = shader::parse_module(shader::SOURCE).context("built-in shader is invalid")?;
        let iface = ShaderInterface::from_module(&module).context("built-in shader failed reflection")?;
        iface
            .check_all(&Vertex::layout())
            .context("built-in shader does not match the vertex layout")?;
        shader::check_passthrough(&module).context("built-in shader is not a pass-through")?;
        log::debug!("color shader interface: {iface:?}");

        Ok(Self {
            built_for: None,
            pipeline: None,
            vertex_buf: None,
            vertex_capacity: 0,
            index_buf: None,
            index_capacity: 0,
        })
    }

    /// Records one render pass drawing `mesh` on top of `target`.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, mesh: &Mesh) {
        self.ensure_pipeline(ctx);
        self.ensure_capacity(ctx, mesh.vertices().len(), mesh.indices().len());

        let (Some(pipeline), Some(vertex_buf), Some(index_buf)) = (
            self.pipeline.as_ref(),
            self.vertex_buf.as_ref(),
            self.index_buf.as_ref(),
        ) else {
            return;
        };

        ctx.queue
            .write_buffer(vertex_buf, 0, bytemuck::cast_slice(mesh.vertices()));
        ctx.queue
            .write_buffer(index_buf, 0, bytemuck::cast_slice(&aligned_indices(mesh.indices())));

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("chroma color pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_vertex_buffer(0, vertex_buf.slice(..));
        rpass.set_index_buffer(index_buf.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..mesh.index_count(), 0, 0..1);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        match rebuild_for(self.built_for.as_ref(), ctx.device, ctx.surface_format) {
            Rebuild::Nothing if self.pipeline.is_some() => return,
            Rebuild::Everything => {
                // Buffers from another device cannot be bound here.
                self.vertex_buf = None;
                self.vertex_capacity = 0;
                self.index_buf = None;
                self.index_capacity = 0;
            }
            _ => {}
        }

        log::debug!("building color pipeline for {:?}", ctx.surface_format);

        let module = ctx.device.create_shader_module(shader::module_descriptor());

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("chroma color pipeline layout"),
                    bind_group_layouts: &[],
                    immediate_size: 0,
                });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("chroma color pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some(shader::VS_ENTRY),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some(shader::FS_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    // Fragment alpha is always 1; plain replace.
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: primitive_state(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview_mask: None,
            cache: None,
        });

        self.built_for = Some((ctx.device.clone(), ctx.surface_format));
        self.pipeline = Some(pipeline);
    }

    fn ensure_capacity(&mut self, ctx: &RenderCtx<'_>, vertices: usize, indices: usize) {
        if vertices > self.vertex_capacity || self.vertex_buf.is_none() {
            let cap = grow_capacity(vertices);
            self.vertex_buf = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("chroma vertex buffer"),
                size: (cap * std::mem::size_of::<Vertex>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.vertex_capacity = cap;
        }

        // Padding may add one index past the mesh's own count.
        let indices = indices + indices % 2;
        if indices > self.index_capacity || self.index_buf.is_none() {
            let cap = grow_capacity(indices);
            self.index_buf = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("chroma index buffer"),
                size: (cap * std::mem::size_of::<u16>()) as u64,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.index_capacity = cap;
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Rebuild {
    Nothing,
    Pipeline,
    Everything,
}

/// What must be rebuilt to draw on `device` into a `format` surface.
fn rebuild_for<D: PartialEq>(
    built_for: Option<&(D, wgpu::TextureFormat)>,
    device: &D,
    format: wgpu::TextureFormat,
) -> Rebuild {
    match built_for {
        None => Rebuild::Everything,
        Some((d, _)) if d != device => Rebuild::Everything,
        Some((_, f)) if *f != format => Rebuild::Pipeline,
        Some(_) => Rebuild::Nothing,
    }
}

/// Triangle list, CCW front faces, back faces culled.
fn primitive_state() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: Some(wgpu::Face::Back),
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

fn grow_capacity(required: usize) -> usize {
    required.next_power_of_two().max(MIN_CAPACITY)
}

/// `write_buffer` sizes must be a multiple of `COPY_BUFFER_ALIGNMENT`; odd
/// u16 index counts get one trailing zero that is never drawn.
fn aligned_indices(indices: &[u16]) -> Vec<u16> {
    let mut out = Vec::with_capacity(indices.len() + 1);
    out.extend_from_slice(indices);
    while (out.len() * std::mem::size_of::<u16>()) as u64 % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
        out.push(0);
    }
    out
}
