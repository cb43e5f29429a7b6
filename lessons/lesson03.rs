//! The triangle and quad from lesson 2, now coloured.

use anyhow::Context;
use nehe::shaders::{self, MvpUniforms};
use nehe::{
    AppConfig, Frame, Lesson, Mesh, Mtx, NeHeContext, NeHeError, PipelineBuilder, UniformRing,
    VertexColor, wgpu,
};

const PERIWINKLE: [f32; 4] = [0.5, 0.5, 1.0, 1.0];

#[rustfmt::skip]
const VERTICES: [VertexColor; 7] = [
    // Triangle, one primary per corner
    VertexColor::new([ 0.0,  1.0, 0.0], [1.0, 0.0, 0.0, 1.0]),
    VertexColor::new([-1.0, -1.0, 0.0], [0.0, 1.0, 0.0, 1.0]),
    VertexColor::new([ 1.0, -1.0, 0.0], [0.0, 0.0, 1.0, 1.0]),
    // Quad, flat
    VertexColor::new([-1.0,  1.0, 0.0], PERIWINKLE),
    VertexColor::new([ 1.0,  1.0, 0.0], PERIWINKLE),
    VertexColor::new([ 1.0, -1.0, 0.0], PERIWINKLE),
    VertexColor::new([-1.0, -1.0, 0.0], PERIWINKLE),
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

struct Lesson3 {
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformRing<MvpUniforms>,
    mesh: Mesh,
    projection: Mtx,
}

impl Lesson for Lesson3 {
    fn config() -> AppConfig {
        AppConfig::new("NeHe's Color Tutorial")
    }

    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        let shader = ctx.create_shader("Lesson 3 Shader", shaders::COLOR);
        let uniforms = UniformRing::new(&ctx.gpu, 4, "Lesson 3 Uniforms");
        let pipeline = PipelineBuilder::new("Lesson 3 Pipeline", &shader, ctx.surface_format())
            .vertex(VertexColor::LAYOUT)
            .bind_group(uniforms.layout())
            .build(&ctx.gpu.device);
        let mesh = ctx.create_vertex_index_buffer("Lesson 3", &VERTICES, &INDICES);

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
        let mut pass = frame.begin_pass(ctx, CLEAR, "Lesson 3 Pass");
        pass.set_pipeline(&self.pipeline);

        let mut model = Mtx::translation(-1.5, 0.0, -6.0);
        let mvp = self.projection * model;
        self.uniforms.bind(&ctx.gpu, &mut pass, 0, &MvpUniforms { mvp });
        self.mesh.draw_range(&mut pass, 0..3);

        model.translate(3.0, 0.0, 0.0);
        let mvp = self.projection * model;
        self.uniforms.bind(&ctx.gpu, &mut pass, 0, &MvpUniforms { mvp });
        self.mesh.draw_range(&mut pass, 3..9);
    }
}

fn main() -> anyhow::Result<()> {
    nehe::logging::init();
    nehe::run::<Lesson3>().context("lesson 3 failed")
}
