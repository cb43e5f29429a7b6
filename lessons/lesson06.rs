//! A textured cube tumbling about all three axes.

use anyhow::Context;
use nehe::pipeline::{self, PipelineBuilder};
use nehe::shaders::{self, TexturedUniforms};
use nehe::{
    AppConfig, Filter, Frame, Lesson, Mesh, Mtx, NeHeContext, NeHeError, UniformRing,
    VertexTexture, wgpu,
};

#[rustfmt::skip]
const VERTICES: [VertexTexture; 24] = [
    // Front
    VertexTexture::new([-1.0, -1.0,  1.0], [0.0, 0.0]),
    VertexTexture::new([ 1.0, -1.0,  1.0], [1.0, 0.0]),
    VertexTexture::new([ 1.0,  1.0,  1.0], [1.0, 1.0]),
    VertexTexture::new([-1.0,  1.0,  1.0], [0.0, 1.0]),
    // Back
    VertexTexture::new([-1.0, -1.0, -1.0], [1.0, 0.0]),
    VertexTexture::new([-1.0,  1.0, -1.0], [1.0, 1.0]),
    VertexTexture::new([ 1.0,  1.0, -1.0], [0.0, 1.0]),
    VertexTexture::new([ 1.0, -1.0, -1.0], [0.0, 0.0]),
    // Top
    VertexTexture::new([-1.0,  1.0, -1.0], [0.0, 1.0]),
    VertexTexture::new([-1.0,  1.0,  1.0], [0.0, 0.0]),
    VertexTexture::new([ 1.0,  1.0,  1.0], [1.0, 0.0]),
    VertexTexture::new([ 1.0,  1.0, -1.0], [1.0, 1.0]),
    // Bottom
    VertexTexture::new([-1.0, -1.0, -1.0], [1.0, 1.0]),
    VertexTexture::new([ 1.0, -1.0, -1.0], [0.0, 1.0]),
    VertexTexture::new([ 1.0, -1.0,  1.0], [0.0, 0.0]),
    VertexTexture::new([-1.0, -1.0,  1.0], [1.0, 0.0]),
    // Right
    VertexTexture::new([ 1.0, -1.0, -1.0], [1.0, 0.0]),
    VertexTexture::new([ 1.0,  1.0, -1.0], [1.0, 1.0]),
    VertexTexture::new([ 1.0,  1.0,  1.0], [0.0, 1.0]),
    VertexTexture::new([ 1.0, -1.0,  1.0], [0.0, 0.0]),
    // Left
    VertexTexture::new([-1.0, -1.0, -1.0], [0.0, 0.0]),
    VertexTexture::new([-1.0, -1.0,  1.0], [1.0, 0.0]),
    VertexTexture::new([-1.0,  1.0,  1.0], [1.0, 1.0]),
    VertexTexture::new([-1.0,  1.0, -1.0], [0.0, 1.0]),
];

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.5,
};

struct Lesson6 {
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformRing<TexturedUniforms>,
    texture_bind_group: wgpu::BindGroup,
    mesh: Mesh,
    projection: Mtx,
    rot: [f32; 3],
}

impl Lesson for Lesson6 {
    fn config() -> AppConfig {
        AppConfig::new("NeHe's Texture Mapping Tutorial").depth(wgpu::TextureFormat::Depth16Unorm)
    }

    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        let device = &ctx.gpu.device;
        let shader = ctx.create_shader("Lesson 6 Shader", shaders::TEXTURED);
        let uniforms = UniformRing::new(&ctx.gpu, 4, "Lesson 6 Uniforms");
        let texture_layout = pipeline::texture_bind_group_layout(device, "Lesson 6 Texture");
        let pipeline = PipelineBuilder::new("Lesson 6 Pipeline", &shader, ctx.surface_format())
            .vertex(VertexTexture::LAYOUT)
            .bind_group(uniforms.layout())
            .bind_group(&texture_layout)
            .depth(
                wgpu::TextureFormat::Depth16Unorm,
                wgpu::CompareFunction::LessEqual,
                true,
            )
            .build(device);

        let texture = ctx.load_texture("Data/NeHe.bmp", true, false)?;
        let sampler = ctx.create_sampler(Filter::Linear);
        let texture_bind_group =
            pipeline::texture_bind_group(device, &texture_layout, &texture.view, &sampler);
        let mesh = ctx.create_vertex_index_buffer("Lesson 6", &VERTICES, &nehe::CUBE_INDICES);

        Ok(Self {
            pipeline,
            uniforms,
            texture_bind_group,
            mesh,
            projection: Mtx::IDENTITY,
            rot: [0.0; 3],
        })
    }

    fn resize(&mut self, _ctx: &mut NeHeContext, width: u32, height: u32) {
        self.projection = Mtx::perspective(45.0, width as f32 / height as f32, 0.1, 100.0);
    }

    fn draw(&mut self, ctx: &mut NeHeContext, frame: &mut Frame<'_>) {
        self.uniforms.reset();
        let mut pass = frame.begin_pass(ctx, CLEAR, "Lesson 6 Pass");
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(1, &self.texture_bind_group, &[]);

        let [x_rot, y_rot, z_rot] = self.rot;
        let mut model = Mtx::translation(0.0, 0.0, -5.0);
        model.rotate(x_rot, 1.0, 0.0, 0.0);
        model.rotate(y_rot, 0.0, 1.0, 0.0);
        model.rotate(z_rot, 0.0, 0.0, 1.0);

        let uniforms = TexturedUniforms {
            mvp: self.projection * model,
            color: [1.0; 4],
        };
        self.uniforms.bind(&ctx.gpu, &mut pass, 0, &uniforms);
        self.mesh.draw(&mut pass);

        self.rot[0] += 0.3;
        self.rot[1] += 0.2;
        self.rot[2] += 0.4;
    }
}

fn main() -> anyhow::Result<()> {
    nehe::logging::init();
    nehe::run::<Lesson6>().context("lesson 6 failed")
}
