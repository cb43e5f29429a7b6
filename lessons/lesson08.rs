//! The lit crate again, now in glass that can be blended additively.
//!
//! `B` toggles blending. Everything from the previous lesson still applies.

use anyhow::Context;
use nehe::pipeline::{self, PipelineBuilder};
use nehe::shaders::{self, Light, LitUniforms};
use nehe::{
    ADDITIVE_BLENDING, AppConfig, CUBE_INDICES, Filter, Frame, KeyCode, LIT_CUBE_VERTICES, Lesson,
    Mesh, Mtx, NeHeContext, NeHeError, UniformRing, VertexNormalTexture, wgpu,
};

const LIGHT: Light = Light {
    ambient: [0.5, 0.5, 0.5, 1.0],
    diffuse: [1.0, 1.0, 1.0, 1.0],
    position: [0.0, 0.0, 2.0, 1.0],
};

// Half alpha so the additive pipeline lets the background through.
const GLASS: [f32; 4] = [1.0, 1.0, 1.0, 0.5];

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.5,
};

struct Lesson8 {
    opaque: wgpu::RenderPipeline,
    blended: wgpu::RenderPipeline,
    uniforms: UniformRing<LitUniforms>,
    texture_bind_groups: Vec<wgpu::BindGroup>,
    mesh: Mesh,
    projection: Mtx,
    lighting: bool,
    blending: bool,
    filter: Filter,
    rot: [f32; 2],
    speed: [f32; 2],
    z: f32,
}

impl Lesson for Lesson8 {
    fn config() -> AppConfig {
        AppConfig::new("Tom Stanis & NeHe's Blending Tutorial")
            .depth(wgpu::TextureFormat::Depth16Unorm)
    }

    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        let device = &ctx.gpu.device;
        let shader = ctx.create_shader("Lesson 8 Shader", shaders::LIT);
        let uniforms = UniformRing::new(&ctx.gpu, 4, "Lesson 8 Uniforms");
        let texture_layout = pipeline::texture_bind_group_layout(device, "Lesson 8 Texture");

        let builder = |label: &'static str| {
            PipelineBuilder::new(label, &shader, ctx.surface_format())
                .vertex(VertexNormalTexture::LAYOUT)
                .bind_group(uniforms.layout())
                .bind_group(&texture_layout)
        };
        let opaque = builder("Lesson 8 Opaque Pipeline")
            .depth(
                wgpu::TextureFormat::Depth16Unorm,
                wgpu::CompareFunction::LessEqual,
                true,
            )
            .build(device);
        let blended = builder("Lesson 8 Blended Pipeline")
            .blend(ADDITIVE_BLENDING)
            .depth_disabled(wgpu::TextureFormat::Depth16Unorm)
            .build(device);

        let texture = ctx.load_texture("Data/Glass.bmp", true, true)?;
        let samplers = Filter::ALL.map(|filter| ctx.create_sampler(filter));
        let texture_bind_groups =
            pipeline::filtered_bind_groups(device, &texture_layout, &texture, &samplers);
        let mesh = ctx.create_vertex_index_buffer("Lesson 8", &LIT_CUBE_VERTICES, &CUBE_INDICES);

        Ok(Self {
            opaque,
            blended,
            uniforms,
            texture_bind_groups,
            mesh,
            projection: Mtx::IDENTITY,
            lighting: false,
            blending: false,
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
            let mut pass = frame.begin_pass(ctx, CLEAR, "Lesson 8 Pass");
            pass.set_pipeline(if self.blending {
                &self.blended
            } else {
                &self.opaque
            });
            pass.set_bind_group(1, &self.texture_bind_groups[self.filter.index()], &[]);

            let mut model = Mtx::translation(0.0, 0.0, self.z);
            model.rotate(self.rot[0], 1.0, 0.0, 0.0);
            model.rotate(self.rot[1], 0.0, 1.0, 0.0);

            let light = self.lighting.then_some(&LIGHT);
            let uniforms = LitUniforms::new(model, self.projection, GLASS, light);
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
            KeyCode::KeyB => self.blending = !self.blending,
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
    nehe::run::<Lesson8>().context("lesson 8 failed")
}
