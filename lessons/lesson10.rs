//! Walking around a small world loaded from `Data/World.txt`.
//!
//! Up/Down walk, Left/Right turn, Page Up/Down look up and down. `B` toggles
//! blending and `F` cycles texture filtering.

use anyhow::Context;
use nehe::pipeline::{self, PipelineBuilder};
use nehe::shaders::{self, TexturedUniforms};
use nehe::{
    ADDITIVE_BLENDING, AppConfig, Filter, Frame, Input, KeyCode, Lesson, Mtx, NeHeContext,
    NeHeError, UniformRing, VertexTexture, World, wgpu,
};

const CLEAR: wgpu::Color = wgpu::Color::TRANSPARENT;

/// First-person camera with a head bob while walking.
#[derive(Clone, Copy, Debug, Default)]
struct Camera {
    x: f32,
    z: f32,
    yaw: f32,
    pitch: f32,
    walk_bob: f32,
    walk_bob_theta: f32,
}

impl Camera {
    const STEP: f32 = 0.05;

    fn view(&self) -> Mtx {
        let mut view = Mtx::rotation(self.pitch, 1.0, 0.0, 0.0);
        view.rotate(360.0 - self.yaw, 0.0, 1.0, 0.0);
        view.translate(-self.x, -(0.25 + self.walk_bob), -self.z);
        view
    }

    fn walk_forward(&mut self) {
        let yaw = self.yaw.to_radians();
        self.x -= yaw.sin() * Self::STEP;
        self.z -= yaw.cos() * Self::STEP;
        self.walk_bob_theta = if self.walk_bob_theta >= 359.0 {
            0.0
        } else {
            self.walk_bob_theta + 10.0
        };
        self.update_bob();
    }

    fn walk_backward(&mut self) {
        let yaw = self.yaw.to_radians();
        self.x += yaw.sin() * Self::STEP;
        self.z += yaw.cos() * Self::STEP;
        self.walk_bob_theta = if self.walk_bob_theta <= 1.0 {
            359.0
        } else {
            self.walk_bob_theta - 10.0
        };
        self.update_bob();
    }

    fn update_bob(&mut self) {
        self.walk_bob = self.walk_bob_theta.to_radians().sin() / 20.0;
    }

    fn update(&mut self, input: &Input) {
        if input.key_down(KeyCode::ArrowUp) {
            self.walk_forward();
        }
        if input.key_down(KeyCode::ArrowDown) {
            self.walk_backward();
        }
        if input.key_down(KeyCode::ArrowLeft) {
            self.yaw += 1.0;
        }
        if input.key_down(KeyCode::ArrowRight) {
            self.yaw -= 1.0;
        }
        if input.key_down(KeyCode::PageUp) {
            self.pitch -= 1.0;
        }
        if input.key_down(KeyCode::PageDown) {
            self.pitch += 1.0;
        }
    }
}

struct Lesson10 {
    opaque: wgpu::RenderPipeline,
    blended: wgpu::RenderPipeline,
    uniforms: UniformRing<TexturedUniforms>,
    texture_bind_groups: Vec<wgpu::BindGroup>,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    projection: Mtx,
    camera: Camera,
    blend: bool,
    filter: Filter,
}

impl Lesson for Lesson10 {
    fn config() -> AppConfig {
        AppConfig::new("Lionel Brits & NeHe's 3D World Tutorial")
            .depth(wgpu::TextureFormat::Depth16Unorm)
    }

    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        let device = &ctx.gpu.device;
        let shader = ctx.create_shader("Lesson 10 Shader", shaders::TEXTURED);
        let uniforms = UniformRing::new(&ctx.gpu, 1, "Lesson 10 Uniforms");
        let texture_layout = pipeline::texture_bind_group_layout(device, "Lesson 10 Texture");

        let builder = |label: &'static str| {
            PipelineBuilder::new(label, &shader, ctx.surface_format())
                .vertex(VertexTexture::LAYOUT)
                .bind_group(uniforms.layout())
                .bind_group(&texture_layout)
        };
        let opaque = builder("Lesson 10 Opaque Pipeline")
            .depth(
                wgpu::TextureFormat::Depth16Unorm,
                wgpu::CompareFunction::Less,
                true,
            )
            .build(device);
        let blended = builder("Lesson 10 Blended Pipeline")
            .blend(ADDITIVE_BLENDING)
            .depth_disabled(wgpu::TextureFormat::Depth16Unorm)
            .build(device);

        let world = World::load(ctx.resource_path("Data/World.txt"))?;
        log::info!("world has {} triangles", world.triangles.len());
        let vertex_buffer = ctx.create_buffer(
            "Lesson 10 World",
            &world.vertices(),
            wgpu::BufferUsages::VERTEX,
        );

        let texture = ctx.load_texture("Data/Mud.bmp", true, true)?;
        let samplers = Filter::ALL.map(|filter| ctx.create_sampler(filter));
        let texture_bind_groups =
            pipeline::filtered_bind_groups(device, &texture_layout, &texture, &samplers);

        Ok(Self {
            opaque,
            blended,
            uniforms,
            texture_bind_groups,
            vertex_buffer,
            vertex_count: world.vertex_count(),
            projection: Mtx::IDENTITY,
            camera: Camera::default(),
            blend: false,
            filter: Filter::Nearest,
        })
    }

    fn resize(&mut self, _ctx: &mut NeHeContext, width: u32, height: u32) {
        self.projection = Mtx::perspective(45.0, width as f32 / height as f32, 0.1, 100.0);
    }

    fn draw(&mut self, ctx: &mut NeHeContext, frame: &mut Frame<'_>) {
        self.uniforms.reset();
        {
            let mut pass = frame.begin_pass(ctx, CLEAR, "Lesson 10 Pass");
            pass.set_pipeline(if self.blend {
                &self.blended
            } else {
                &self.opaque
            });
            pass.set_bind_group(1, &self.texture_bind_groups[self.filter.index()], &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

            let uniforms = TexturedUniforms {
                mvp: self.projection * self.camera.view(),
                color: [1.0; 4],
            };
            self.uniforms.bind(&ctx.gpu, &mut pass, 0, &uniforms);
            pass.draw(0..self.vertex_count, 0..1);
        }

        self.camera.update(frame.input);
    }

    fn key(&mut self, _ctx: &mut NeHeContext, key: KeyCode, down: bool, repeat: bool) {
        if !down || repeat {
            return;
        }
        match key {
            KeyCode::KeyB => self.blend = !self.blend,
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
    nehe::run::<Lesson10>().context("lesson 10 failed")
}
