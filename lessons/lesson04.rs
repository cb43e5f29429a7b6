//! The coloured triangle spins about Y while the quad tumbles about X.

use anyhow::Context;
use nehe::shaders::{self, MvpUniforms};
use nehe::{
    AppConfig, Frame, Lesson, Mesh, Mtx, NeHeContext, NeHeError, PipelineBuilder, UniformRing,
    VertexColor, wgpu,
};

const PERIWINKLE: [f32; 4] = [0.5, 0.5, 1.0, 1.0];

#[rustfmt::skip]
const VERTICES: [VertexColor; 7] = [
    VertexColor::new([ 0.0,  1.0, 0.0], [1.0, 0.0, 0.0, 1.0]),
    VertexColor::new([-1.0, -1.0, 0.0], [0.0, 1.0, 0.0, 1.0]),
    VertexColor::new([ 1.0, -1.0, 0.0], [0.0, 0.0, 1.0, 1.0]),
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

struct Lesson4 {
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformRing<MvpUniforms>,
    mesh: Mesh,
    projection: Mtx,
    rot_tri: f32,
    rot_quad: f32,
}

impl Lesson for Lesson4 {
    fn config() -> AppConfig {
        AppConfig::new("NeHe's Rotation Tutorial")
    }

    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        let shader = ctx.create_shader("Lesson 4 Shader", shaders::COLOR);
        let uniforms = UniformRing::new(&ctx.gpu, 4, "Lesson 4 Uniforms");
        let pipeline = PipelineBuilder::new("Lesson 4 Pipeline", &shader, ctx.surface_format())
            .vertex(VertexColor::LAYOUT)
            .bind_group(uniforms.layout())
            .build(&ctx.gpu.device);
        let mesh = ctx.create_vertex_index_buffer("Lesson 4", &VERTICES, &INDICES);

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
        let mut pass = frame.begin_pass(ctx, CLEAR, "Lesson 4 Pass");
        pass.set_pipeline(&self.pipeline);

        let mut model = Mtx::translation(-1.5, 0.0, -6.0);
        model.rotate(self.rot_tri, 0.0, 1.0, 0.0);
        let mvp = self.projection * model;
        self.uniforms.bind(&ctx.gpu, &mut pass, 0, &MvpUniforms { mvp });
        self.mesh.draw_range(&mut pass, 0..3);

        // each shape gets its own model matrix, unlike lesson 3
        let mut model = Mtx::translation(1.5, 0.0, -6.0);
        model.rotate(self.rot_quad, 1.0, 0.0, 0.0);
        let mvp = self.projection * model;
        self.uniforms.bind(&ctx.gpu, &mut pass, 0, &MvpUniforms { mvp });
        self.mesh.draw_range(&mut pass, 3..9);

        self.rot_tri += 0.2;
        self.rot_quad -= 0.15;
    }
}

fn main() -> anyhow::Result<()> {
    nehe::logging::init();
    nehe::run::<Lesson4>().context("lesson 4 failed")
}
