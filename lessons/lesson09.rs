//! Fifty blended stars spiralling in towards the centre.
//!
//! Up/Down tilt the field, Page Up/Down zoom and `T` toggles twinkling.

use anyhow::Context;
use bytemuck::{Pod, Zeroable};
use nehe::pipeline::{self, PipelineBuilder};
use nehe::shaders::{self, ViewProjectionUniforms};
use nehe::{
    ADDITIVE_BLENDING, AppConfig, Filter, Frame, KeyCode, Lesson, Mtx, NeHeContext, NeHeError,
    Random, UniformRing, wgpu,
};

const NUM_STARS: usize = 50;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
struct StarInstance {
    position: [f32; 3],
    color: [f32; 3],
    /// Cosine and sine of the sprite's spin.
    spin: [f32; 2],
}

impl StarInstance {
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<StarInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
    };
}

#[derive(Clone, Copy, Debug)]
struct Star {
    distance: f32,
    angle: f32,
    color: [u8; 3],
}

fn random_color(rng: &mut Random) -> [u8; 3] {
    [rng.below(256) as u8, rng.below(256) as u8, rng.below(256) as u8]
}

fn unorm(color: [u8; 3]) -> [f32; 3] {
    color.map(|c| c as f32 / 255.0)
}

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.5,
};

struct Lesson9 {
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformRing<ViewProjectionUniforms>,
    texture_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instances: Vec<StarInstance>,
    projection: Mtx,
    rng: Random,
    stars: [Star; NUM_STARS],
    twinkle: bool,
    zoom: f32,
    tilt: f32,
    spin: f32,
}

impl Lesson9 {
    /// Fill `instances` for this frame and advance the animation.
    fn animate(&mut self) {
        self.instances.clear();
        for i in 0..NUM_STARS {
            let star = self.stars[i];
            let theta = star.angle.to_radians();
            let position = [
                star.distance * theta.cos(),
                0.0,
                -star.distance * theta.sin(),
            ];

            if self.twinkle {
                // an unspun copy in the mirrored star's colour
                self.instances.push(StarInstance {
                    position,
                    color: unorm(self.stars[NUM_STARS - i - 1].color),
                    spin: [1.0, 0.0],
                });
            }

            let spin = self.spin.to_radians();
            self.instances.push(StarInstance {
                position,
                color: unorm(star.color),
                spin: [spin.cos(), spin.sin()],
            });

            self.spin += 0.01;
            let star = &mut self.stars[i];
            star.angle += i as f32 / NUM_STARS as f32;
            star.distance -= 0.01;
            if star.distance < 0.0 {
                star.distance += 5.0;
                star.color = random_color(&mut self.rng);
            }
        }
    }
}

impl Lesson for Lesson9 {
    fn config() -> AppConfig {
        AppConfig::new("NeHe's Animated Blended Textures Tutorial")
    }

    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        let device = &ctx.gpu.device;
        let shader = ctx.create_shader("Lesson 9 Shader", shaders::STARS);
        let uniforms = UniformRing::new(&ctx.gpu, 1, "Lesson 9 Uniforms");
        let texture_layout = pipeline::texture_bind_group_layout(device, "Lesson 9 Texture");
        let pipeline = PipelineBuilder::new("Lesson 9 Pipeline", &shader, ctx.surface_format())
            .vertex(StarInstance::LAYOUT)
            .bind_group(uniforms.layout())
            .bind_group(&texture_layout)
            .blend(ADDITIVE_BLENDING)
            .cull_back()
            .build(device);

        let texture = ctx.load_texture("Data/Star.bmp", true, false)?;
        let sampler = ctx.create_sampler(Filter::Linear);
        let texture_bind_group =
            pipeline::texture_bind_group(device, &texture_layout, &texture.view, &sampler);

        // room for every star twice over when twinkling
        let instances = vec![StarInstance::default(); 2 * NUM_STARS];
        let instance_buffer = ctx.create_buffer(
            "Lesson 9 Instances",
            &instances,
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        );

        let mut rng = Random::new();
        let stars = std::array::from_fn(|i| Star {
            distance: 5.0 * (i as f32 / NUM_STARS as f32),
            angle: 0.0,
            color: random_color(&mut rng),
        });

        Ok(Self {
            pipeline,
            uniforms,
            texture_bind_group,
            instance_buffer,
            instances,
            projection: Mtx::IDENTITY,
            rng,
            stars,
            twinkle: false,
            zoom: -15.0,
            tilt: 90.0,
            spin: 0.0,
        })
    }

    fn resize(&mut self, _ctx: &mut NeHeContext, width: u32, height: u32) {
        self.projection = Mtx::perspective(45.0, width as f32 / height as f32, 0.1, 100.0);
    }

    fn draw(&mut self, ctx: &mut NeHeContext, frame: &mut Frame<'_>) {
        self.animate();
        ctx.gpu.queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&self.instances),
        );

        self.uniforms.reset();
        {
            let mut pass = frame.begin_pass(ctx, CLEAR, "Lesson 9 Pass");
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(1, &self.texture_bind_group, &[]);
            pass.set_vertex_buffer(0, self.instance_buffer.slice(..));

            let mut view = Mtx::translation(0.0, 0.0, self.zoom);
            view.rotate(self.tilt, 1.0, 0.0, 0.0);
            let uniforms = ViewProjectionUniforms {
                view,
                projection: self.projection,
            };
            self.uniforms.bind(&ctx.gpu, &mut pass, 0, &uniforms);
            pass.draw(0..6, 0..self.instances.len() as u32);
        }

        let input = frame.input;
        if input.key_down(KeyCode::ArrowUp) {
            self.tilt -= 0.5;
        }
        if input.key_down(KeyCode::ArrowDown) {
            self.tilt += 0.5;
        }
        if input.key_down(KeyCode::PageUp) {
            self.zoom -= 0.2;
        }
        if input.key_down(KeyCode::PageDown) {
            self.zoom += 0.2;
        }
    }

    fn key(&mut self, _ctx: &mut NeHeContext, key: KeyCode, down: bool, repeat: bool) {
        if down && !repeat && key == KeyCode::KeyT {
            self.twinkle = !self.twinkle;
        }
    }
}

fn main() -> anyhow::Result<()> {
    nehe::logging::init();
    nehe::run::<Lesson9>().context("lesson 9 failed")
}
