//! A white triangle and quad.

use anyhow::Context;
use nehe::shaders::{self, MvpUniforms};
use nehe::{
    AppConfig, Frame, Lesson, Mesh, Mtx, NeHeContext, NeHeError, PipelineBuilder, UniformRing,
    VertexColor, wgpu,
};

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

#[rustfmt::skip]
const VERTICES: [VertexColor; 7] = [
    // Triangle
    VertexColor::new([ 0.0,  1.0, 0.0], WHITE),
    VertexColor::new([-1.0, -1.0, 0.0], WHITE),
    VertexColor::new([ 1.0, -1.0, 0.0], WHITE),
    // Quad
    VertexColor::new([-1.0,  1.0, 0.0], WHITE),
    VertexColor::new([ 1.0,  1.0, 0.0], WHITE),
    VertexColor::new([ 1.0, -1.0, 0.0], WHITE),
    VertexColor::new([-1.0, -1.0, 0.0], WHITE),
];

#[rustfmt::skip]
const INDICES: [u16; 9] = [
    0, 1, 2,
    3, 4, 5, 5, 6, 3,
];

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.5,
};

struct Lesson2 {
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformRing<MvpUniforms>,
    mesh: Mesh,
    projection: Mtx,
}

impl Lesson for Lesson2 {
    fn config() -> AppConfig {
        AppConfig::new("NeHe's First Polygon Tutorial")
    }

    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        let shader = ctx.create_shader("Lesson 2 Shader", shaders::COLOR);
        let uniforms = UniformRing::new(&ctx.gpu, 4, "Lesson 2 Uniforms");
        let pipeline = PipelineBuilder::new("Lesson 2 Pipeline", &shader, ctx.surface_format())
            .vertex(VertexColor::LAYOUT)
            .bind_group(uniforms.layout())
            .build(&ctx.gpu.device);
        let mesh = ctx.create_vertex_index_buffer("Lesson 2", &VERTICES, &INDICES);

        Ok(Self {
            pipeline,
            uniforms,
            mesh,
            projection: Mtx::IDENTITY,
        })
    }

    fn resize(&mut self, _ctx: &mut NeHeContext, width: u32, height: u32) {
        self.projection = Mtx::perspective(45.0, width as f32 / height as f32, 0.1, 100.0);
    }

    fn draw(&mut self, ctx: &mut NeHeContext, frame: &mut Frame<'_>) {
        self.uniforms.reset();
        let mut pass = frame.begin_pass(ctx, CLEAR, "Lesson 2 Pass");
        pass.set_pipeline(&self.pipeline);

        // Triangle 1.5 units left and 6 units into the screen
        let mut model = Mtx::translation(-1.5, 0.0, -6.0);
        let mvp = self.projection * model;
        self.uniforms.bind(&ctx.gpu, &mut pass, 0, &MvpUniforms { mvp });
        self.mesh.draw_range(&mut pass, 0..3);

        // Quad 3 units to the right of it
        model.translate(3.0, 0.0, 0.0);
        let mvp = self.projection * model;
        self.uniforms.bind(&ctx.gpu, &mut pass, 0, &MvpUniforms { mvp });
        self.mesh.draw_range(&mut pass, 3..9);
    }
}

fn main() -> anyhow::Result<()> {
    nehe::logging::init();
    nehe::run::<Lesson2>().context("lesson 2 failed")
}
