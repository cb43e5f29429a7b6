//! A lit, textured crate steered from the keyboard.
//!
//! Arrow keys change the spin speed, Page Up/Down move the crate, `L`
//! toggles the light and `F` cycles texture filtering.

use anyhow::Context;
use nehe::pipeline::{self, PipelineBuilder};
use nehe::shaders::{self, Light, LitUniforms};
use nehe::{
    AppConfig, CUBE_INDICES, Filter, Frame, KeyCode, LIT_CUBE_VERTICES, Lesson, Mesh, Mtx,
    NeHeContext, NeHeError, UniformRing, VertexNormalTexture, wgpu,
};

const LIGHT: Light = Light {
    ambient: [0.5, 0.5, 0.5, 1.0],
    diffuse: [1.0, 1.0, 1.0, 1.0],
    position: [0.0, 0.0, 2.0, 1.0],
};

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.5,
};

struct Lesson7 {
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformRing<LitUniforms>,
    texture_bind_groups: Vec<wgpu::BindGroup>,
    mesh: Mesh,
    projection: Mtx,
    lighting: bool,
    filter: Filter,
    rot: [f32; 2],
    speed: [f32; 2],
    z: f32,
}

impl Lesson for Lesson7 {
    fn config() -> AppConfig {
        AppConfig::new("NeHe's Textures, Lighting & Keyboard Tutorial")
            .depth(wgpu::TextureFormat::Depth16Unorm)
    }

    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        let device = &ctx.gpu.device;
        let shader = ctx.create_shader("Lesson 7 Shader", shaders::LIT);
        let uniforms = UniformRing::new(&ctx.gpu, 4, "Lesson 7 Uniforms");
        let texture_layout = pipeline::texture_bind_group_layout(device, "Lesson 7 Texture");
        let pipeline = PipelineBuilder::new("Lesson 7 Pipeline", &shader, ctx.surface_format())
            .vertex(VertexNormalTexture::LAYOUT)
            .bind_group(uniforms.layout())
            .bind_group(&texture_layout)
            .depth(
                wgpu::TextureFormat::Depth16Unorm,
                wgpu::CompareFunction::LessEqual,
                true,
            )
            .build(device);

        let texture = ctx.load_texture("Data/Crate.bmp", true, true)?;
        let samplers = Filter::ALL.map(|filter| ctx.create_sampler(filter));
        let texture_bind_groups =
            pipeline::filtered_bind_groups(device, &texture_layout, &texture, &samplers);
        let mesh = ctx.create_vertex_index_buffer("Lesson 7", &LIT_CUBE_VERTICES, &CUBE_INDICES);

        Ok(Self {
            pipeline,
            uniforms,
            texture_bind_groups,
            mesh,
            projection: Mtx::IDENTITY,
            lighting: false,
            filter: Filter::Nearest,
            rot: [0.0; 2],
            speed: [0.0; 2],
            z: -5.0,
        })
    }

    fn resize(&mut self, _ctx: &mut NeHeContext, width: u32, height: u32) {
        self.projection = Mtx::perspective(45.0, width as f32 / height as f32, 0.1, 100.0);
    }

    fn draw(&mut self, ctx: &mut NeHeContext, frame: &mut Frame<'_>) {
        self.uniforms.reset();
        {
            let mut pass = frame.begin_pass(ctx, CLEAR, "Lesson 7 Pass");
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(1, &self.texture_bind_groups[self.filter.index()], &[]);

            let mut model = Mtx::translation(0.0, 0.0, self.z);
            model.rotate(self.rot[0], 1.0, 0.0, 0.0);
            model.rotate(self.rot[1], 0.0, 1.0, 0.0);

            let light = self.lighting.then_some(&LIGHT);
            let uniforms = LitUniforms::new(model, self.projection, [1.0; 4], light);
            self.uniforms.bind(&ctx.gpu, &mut pass, 0, &uniforms);
            self.mesh.draw(&mut pass);
        }

        let input = frame.input;
        if input.key_down(KeyCode::PageUp) {
            self.z -= 0.02;
        }
        if input.key_down(KeyCode::PageDown) {
            self.z += 0.02;
        }
        if input.key_down(KeyCode::ArrowUp) {
            self.speed[0] -= 0.01;
        }
        if input.key_down(KeyCode::ArrowDown) {
            self.speed[0] += 0.01;
        }
        if input.key_down(KeyCode::ArrowRight) {
            self.speed[1] += 0.1;
        }
        if input.key_down(KeyCode::ArrowLeft) {
            self.speed[1] -= 0.1;
        }

        self.rot[0] += self.speed[0];
        self.rot[1] += self.speed[1];
    }

    fn key(&mut self, _ctx: &mut NeHeContext, key: KeyCode, down: bool, repeat: bool) {
        if !down || repeat {
            return;
        }
        match key {
            KeyCode::KeyL => self.lighting = !self.lighting,
            KeyCode::KeyF => {
                self.filter = self.filter.next();
                log::info!("filter: {:?}", self.filter);
            }
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    nehe::logging::init();
    nehe::run::<Lesson7>().context("lesson 7 failed")
}
