//! A cube wearing a texture assembled on the CPU: the GL logo blitted into a
//! monitor frame, both loaded from headerless `.raw` files.

use anyhow::Context;
use nehe::pipeline::{self, PipelineBuilder};
use nehe::shaders::{self, TexturedUniforms};
use nehe::{
    AppConfig, BlitMode, CUBE_INDICES, Filter, Frame, Lesson, Mesh, Mtx, NeHeContext, NeHeError,
    RawImage, Rect, UniformRing, VertexTexture, wgpu,
};

const IMAGE_SIZE: u32 = 256;

#[rustfmt::skip]
const VERTICES: [VertexTexture; 24] = [
    // Front
    VertexTexture::new([ 1.0,  1.0,  1.0], [1.0, 1.0]),
    VertexTexture::new([-1.0,  1.0,  1.0], [0.0, 1.0]),
    VertexTexture::new([-1.0, -1.0,  1.0], [0.0, 0.0]),
    VertexTexture::new([ 1.0, -1.0,  1.0], [1.0, 0.0]),
    // Back
    VertexTexture::new([-1.0,  1.0, -1.0], [1.0, 1.0]),
    VertexTexture::new([ 1.0,  1.0, -1.0], [0.0, 1.0]),
    VertexTexture::new([ 1.0, -1.0, -1.0], [0.0, 0.0]),
    VertexTexture::new([-1.0, -1.0, -1.0], [1.0, 0.0]),
    // Top
    VertexTexture::new([ 1.0,  1.0, -1.0], [1.0, 1.0]),
    VertexTexture::new([-1.0,  1.0, -1.0], [0.0, 1.0]),
    VertexTexture::new([-1.0,  1.0,  1.0], [0.0, 0.0]),
    VertexTexture::new([ 1.0,  1.0,  1.0], [1.0, 0.0]),
    // Bottom
    VertexTexture::new([ 1.0, -1.0,  1.0], [0.0, 0.0]),
    VertexTexture::new([-1.0, -1.0,  1.0], [1.0, 0.0]),
    VertexTexture::new([-1.0, -1.0, -1.0], [1.0, 1.0]),
    VertexTexture::new([ 1.0, -1.0, -1.0], [0.0, 1.0]),
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

/// Load both images and blit the centre of the logo into the monitor.
fn build_image(ctx: &NeHeContext) -> Result<RawImage, NeHeError> {
    let mut monitor = RawImage::open(ctx.resource_path("Data/Monitor.raw"), IMAGE_SIZE, IMAGE_SIZE)?;
    let logo = RawImage::open(ctx.resource_path("Data/GL.raw"), IMAGE_SIZE, IMAGE_SIZE)?;
    monitor.blit(
        &logo,
        Rect::new(127, 127, 128, 128),
        64,
        64,
        BlitMode::Legacy(127),
    )?;
    Ok(monitor)
}

struct Lesson29 {
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformRing<TexturedUniforms>,
    texture_bind_group: wgpu::BindGroup,
    mesh: Mesh,
    projection: Mtx,
    rot: [f32; 3],
}

impl Lesson for Lesson29 {
    fn config() -> AppConfig {
        AppConfig::new(
            "Andreas L\u{00F6}ffler, Rob Fletcher & NeHe's Blitter & Raw Image Loading Tutorial",
        )
        .depth(wgpu::TextureFormat::Depth16Unorm)
    }

    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        let device = &ctx.gpu.device;
        let shader = ctx.create_shader("Lesson 29 Shader", shaders::TEXTURED);
        let uniforms = UniformRing::new(&ctx.gpu, 1, "Lesson 29 Uniforms");
        let texture_layout = pipeline::texture_bind_group_layout(device, "Lesson 29 Texture");
        let pipeline = PipelineBuilder::new("Lesson 29 Pipeline", &shader, ctx.surface_format())
            .vertex(VertexTexture::LAYOUT)
            .bind_group(uniforms.layout())
            .bind_group(&texture_layout)
            .depth(
                wgpu::TextureFormat::Depth16Unorm,
                wgpu::CompareFunction::Less,
                true,
            )
            .build(device);

        // rows are already bottom-up, as texture coordinates expect
        let image = build_image(ctx)?;
        let texture =
            ctx.texture_from_pixels(image.pixels(), image.width(), image.height(), "Monitor");
        let sampler = ctx.create_sampler(Filter::Linear);
        let texture_bind_group =
            pipeline::texture_bind_group(device, &texture_layout, &texture.view, &sampler);
        let mesh = ctx.create_vertex_index_buffer("Lesson 29", &VERTICES, &CUBE_INDICES);

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
        let mut pass = frame.begin_pass(ctx, wgpu::Color::TRANSPARENT, "Lesson 29 Pass");
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
    nehe::run::<Lesson29>().context("lesson 29 failed")
}
