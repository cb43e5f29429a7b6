//! Render pipeline construction.
//!
//! Every lesson pipeline shares the same shape: one WGSL module with `vs` and
//! `fs` entry points, one colour target, optional depth. [`PipelineBuilder`]
//! covers the knobs the lessons actually turn.

use crate::texture::Texture;

/// `src * src_alpha + dst` on colour and alpha.
pub const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

#[derive(Clone, Copy, Debug)]
struct DepthTest {
    format: wgpu::TextureFormat,
    compare: wgpu::CompareFunction,
    write: bool,
}

/// Builder for a single-target render pipeline.
pub struct PipelineBuilder<'a> {
    label: &'a str,
    shader: &'a wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    vertex_layouts: Vec<wgpu::VertexBufferLayout<'a>>,
    bind_group_layouts: Vec<&'a wgpu::BindGroupLayout>,
    blend: Option<wgpu::BlendState>,
    depth: Option<DepthTest>,
    cull_mode: Option<wgpu::Face>,
    topology: wgpu::PrimitiveTopology,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(
        label: &'a str,
        shader: &'a wgpu::ShaderModule,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            label,
            shader,
            color_format,
            vertex_layouts: Vec::new(),
            bind_group_layouts: Vec::new(),
            blend: None,
            depth: None,
            cull_mode: None,
            topology: wgpu::PrimitiveTopology::TriangleList,
        }
    }

    /// Add a vertex buffer slot; slots are numbered in call order.
    pub fn vertex(mut self, layout: wgpu::VertexBufferLayout<'a>) -> Self {
        self.vertex_layouts.push(layout);
        self
    }

    /// Add a bind group; groups are numbered in call order.
    pub fn bind_group(mut self, layout: &'a wgpu::BindGroupLayout) -> Self {
        self.bind_group_layouts.push(layout);
        self
    }

    pub fn blend(mut self, blend: wgpu::BlendState) -> Self {
        self.blend = Some(blend);
        self
    }

    /// Enable depth testing against an attachment of `format`.
    pub fn depth(
        mut self,
        format: wgpu::TextureFormat,
        compare: wgpu::CompareFunction,
        write: bool,
    ) -> Self {
        self.depth = Some(DepthTest {
            format,
            compare,
            write,
        });
        self
    }

    /// Keep a depth attachment compatible with the pass but never test it.
    pub fn depth_disabled(self, format: wgpu::TextureFormat) -> Self {
        self.depth(format, wgpu::CompareFunction::Always, false)
    }

    /// Cull back faces of counter-clockwise geometry.
    pub fn cull_back(mut self) -> Self {
        self.cull_mode = Some(wgpu::Face::Back);
        self
    }

    /// Cull front faces, keeping only the back of counter-clockwise geometry.
    pub fn cull_front(mut self) -> Self {
        self.cull_mode = Some(wgpu::Face::Front);
        self
    }

    pub fn topology(mut self, topology: wgpu::PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn build(self, device: &wgpu::Device) -> wgpu::RenderPipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(self.label),
            bind_group_layouts: &self.bind_group_layouts,
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(self.label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: self.shader,
                entry_point: Some("vs"),
                buffers: &self.vertex_layouts,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: self.shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: self.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: self.topology,
                cull_mode: self.cull_mode,
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: self.depth.map(|depth| wgpu::DepthStencilState {
                format: depth.format,
                depth_write_enabled: depth.write,
                depth_compare: depth.compare,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

/// Layout for a filterable 2D texture at binding 0 and its sampler at binding 1.
pub fn texture_bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Bind a texture view and sampler against [`texture_bind_group_layout`].
pub fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Texture Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

/// One bind group per sampler, all over the same texture.
///
/// Lessons that cycle filters index the result with [`Filter::index`](crate::Filter::index).
pub fn filtered_bind_groups(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    samplers: &[wgpu::Sampler],
) -> Vec<wgpu::BindGroup> {
    samplers
        .iter()
        .map(|sampler| texture_bind_group(device, layout, &texture.view, sampler))
        .collect()
}
