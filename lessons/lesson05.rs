//! A spinning rainbow pyramid and a spinning coloured cube.

use anyhow::Context;
use nehe::shaders::{self, MvpUniforms};
use nehe::{
    AppConfig, Frame, Lesson, Mesh, Mtx, NeHeContext, NeHeError, PipelineBuilder, UniformRing,
    VertexColor, wgpu,
};

const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const ORANGE: [f32; 4] = [1.0, 0.5, 0.0, 1.0];
const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
const VIOLET: [f32; 4] = [1.0, 0.0, 1.0, 1.0];

#[rustfmt::skip]
const VERTICES: [VertexColor; 29] = [
    // Pyramid
    VertexColor::new([ 0.0,  1.0,  0.0], RED),
    VertexColor::new([-1.0, -1.0,  1.0], GREEN),
    VertexColor::new([ 1.0, -1.0,  1.0], BLUE),
    VertexColor::new([ 1.0, -1.0, -1.0], GREEN),
    VertexColor::new([-1.0, -1.0, -1.0], BLUE),
    // Cube top
    VertexColor::new([ 1.0,  1.0, -1.0], GREEN),
    VertexColor::new([-1.0,  1.0, -1.0], GREEN),
    VertexColor::new([-1.0,  1.0,  1.0], GREEN),
    VertexColor::new([ 1.0,  1.0,  1.0], GREEN),
    // Bottom
    VertexColor::new([ 1.0, -1.0,  1.0], ORANGE),
    VertexColor::new([-1.0, -1.0,  1.0], ORANGE),
    VertexColor::new([-1.0, -1.0, -1.0], ORANGE),
    VertexColor::new([ 1.0, -1.0, -1.0], ORANGE),
    // Front
    VertexColor::new([ 1.0,  1.0,  1.0], RED),
    VertexColor::new([-1.0,  1.0,  1.0], RED),
    VertexColor::new([-1.0, -1.0,  1.0], RED),
    VertexColor::new([ 1.0, -1.0,  1.0], RED),
    // Back
    VertexColor::new([ 1.0, -1.0, -1.0], YELLOW),
    VertexColor::new([-1.0, -1.0, -1.0], YELLOW),
    VertexColor::new([-1.0,  1.0, -1.0], YELLOW),
    VertexColor::new([ 1.0,  1.0, -1.0], YELLOW),
    // Left
    VertexColor::new([-1.0,  1.0,  1.0], BLUE),
    VertexColor::new([-1.0,  1.0, -1.0], BLUE),
    VertexColor::new([-1.0, -1.0, -1.0], BLUE),
    VertexColor::new([-1.0, -1.0,  1.0], BLUE),
    // Right
    VertexColor::new([ 1.0,  1.0, -1.0], VIOLET),
    VertexColor::new([ 1.0,  1.0,  1.0], VIOLET),
    VertexColor::new([ 1.0, -1.0,  1.0], VIOLET),
    VertexColor::new([ 1.0, -1.0, -1.0], VIOLET),
];

#[rustfmt::skip]
const INDICES: [u16; 48] = [
    // Pyramid
    0, 1, 2,
    0, 2, 3,
    0, 3, 4,
    0, 4, 1,
    // Cube
     5,  6,  7,   7,  8,  5,
     9, 10, 11,  11, 12,  9,
    13, 14, 15,  15, 16, 13,
    17, 18, 19,  19, 20, 17,
    21, 22, 23,  23, 24, 21,
    25, 26, 27,  27, 28, 25,
];

const PYRAMID: std::ops::Range<u32> = 0..12;
const CUBE: std::ops::Range<u32> = 12..48;

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.5,
};

struct Lesson5 {
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformRing<MvpUniforms>,
    mesh: Mesh,
    projection: Mtx,
    rot_tri: f32,
    rot_quad: f32,
}

impl Lesson for Lesson5 {
    fn config() -> AppConfig {
        AppConfig::new("NeHe's Solid Object Tutorial").depth(wgpu::TextureFormat::Depth16Unorm)
    }

    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        let shader = ctx.create_shader("Lesson 5 Shader", shaders::COLOR);
        let uniforms = UniformRing::new(&ctx.gpu, 4, "Lesson 5 Uniforms");
        let pipeline = PipelineBuilder::new("Lesson 5 Pipeline", &shader, ctx.surface_format())
            .vertex(VertexColor::LAYOUT)
            .bind_group(uniforms.layout())
            .depth(
                wgpu::TextureFormat::Depth16Unorm,
                wgpu::CompareFunction::LessEqual,
                true,
            )
            .build(&ctx.gpu.device);
        let mesh = ctx.create_vertex_index_buffer("Lesson 5", &VERTICES, &INDICES);

        Ok(Self {
            pipeline,
            uniforms,
            mesh,
            projection: Mtx::IDENTITY,
            rot_tri: 0.0,
            rot_quad: 0.0,
        })
    }

    fn resize(&mut self, _ctx: &mut NeHeContext, width: u32, height: u32) {
        self.projection = Mtx::perspective(45.0, width as f32 / height as f32, 0.1, 100.0);
    }

    fn draw(&mut self, ctx: &mut NeHeContext, frame: &mut Frame<'_>) {
        self.uniforms.reset();
        let mut pass = frame.begin_pass(ctx, CLEAR, "Lesson 5 Pass");
        pass.set_pipeline(&self.pipeline);

        let mut model = Mtx::translation(-1.5, 0.0, -6.0);
        model.rotate(self.rot_tri, 0.0, 1.0, 0.0);
        let mvp = self.projection * model;
        self.uniforms.bind(&ctx.gpu, &mut pass, 0, &MvpUniforms { mvp });
        self.mesh.draw_range(&mut pass, PYRAMID);

        let mut model = Mtx::translation(1.5, 0.0, -7.0);
        model.rotate(self.rot_quad, 1.0, 1.0, 1.0);
        let mvp = self.projection * model;
        self.uniforms.bind(&ctx.gpu, &mut pass, 0, &MvpUniforms { mvp });
        self.mesh.draw_range(&mut pass, CUBE);

        self.rot_tri += 0.2;
        self.rot_quad -= 0.15;
    }
}

fn main() -> anyhow::Result<()> {
    nehe::logging::init();
    nehe::run::<Lesson5>().context("lesson 5 failed")
}
