//! A fountain of a thousand additive particles.
//!
//! Keypad 8/2/4/6 (or I/K/J/L) pull gravity around, arrows add a constant
//! push, keypad +/- change speed, Page Up/Down zoom and Tab bursts every
//! particle from the centre. Return toggles rainbow cycling and Space steps
//! the colour by hand.

use anyhow::Context;
use bytemuck::{Pod, Zeroable};
use nehe::pipeline::{self, PipelineBuilder};
use nehe::shaders::{self, MvpUniforms};
use nehe::{
    ADDITIVE_BLENDING, AppConfig, Filter, Frame, Input, KeyCode, Lesson, Mtx, NeHeContext,
    NeHeError, Random, UniformRing, Vec2, Vec3, wgpu,
};

const MAX_PARTICLES: usize = 1000;

#[rustfmt::skip]
const RAINBOW: [[f32; 3]; 12] = [
    [1.0,  0.5,  0.5 ],
    [1.0,  0.75, 0.5 ],
    [1.0,  1.0,  0.5 ],
    [0.75, 1.0,  0.5 ],
    [0.5,  1.0,  0.5 ],
    [0.5,  1.0,  0.75],
    [0.5,  1.0,  1.0 ],
    [0.5,  0.75, 1.0 ],
    [0.5,  0.5,  1.0 ],
    [0.75, 0.5,  1.0 ],
    [1.0,  0.5,  1.0 ],
    [1.0,  0.5,  0.75],
];

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
struct ParticleInstance {
    position: [f32; 4],
    color: [f32; 4],
}

impl ParticleInstance {
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4],
    };
}

#[derive(Clone, Copy, Debug, Default)]
struct Particle {
    position: Vec3,
    velocity: Vec3,
    color: [f32; 3],
    life: f32,
    decay: f32,
}

fn random_decay(rng: &mut Random) -> f32 {
    0.003 + rng.below(100) as f32 / 1000.0
}

struct ParticleSystem {
    particles: Vec<Particle>,
    rng: Random,
    gravity: Vec2,
    constant: Vec2,
    slow_down: f32,
    cycle_delay: u32,
    color_index: usize,
    auto_cycle: bool,
}

impl ParticleSystem {
    fn new(mut rng: Random) -> Self {
        let mut particles = Vec::with_capacity(MAX_PARTICLES);
        for _ in 0..MAX_PARTICLES {
            let mut particle = Particle {
                life: 1.0,
                decay: random_decay(&mut rng),
                color: RAINBOW[0],
                ..Default::default()
            };
            Self::burst(&mut rng, &mut particle);
            particles.push(particle);
        }

        Self {
            particles,
            rng,
            gravity: Vec2::new(0.0, -0.8),
            constant: Vec2::ZERO,
            slow_down: 2.0,
            cycle_delay: 0,
            color_index: 0,
            auto_cycle: true,
        }
    }

    /// Send a particle off from the centre at high speed.
    fn burst(rng: &mut Random, particle: &mut Particle) {
        let mut spread = |bias: f32| 10.0 * (rng.below(50) as f32 - bias);
        particle.position = Vec3::ZERO;
        particle.velocity = Vec3::new(spread(26.0), spread(25.0), spread(25.0));
    }

    fn burst_all(&mut self) {
        for particle in &mut self.particles {
            Self::burst(&mut self.rng, particle);
        }
    }

    fn update(&mut self) {
        let velocity_scale = 0.001 / self.slow_down;
        for particle in &mut self.particles {
            particle.life -= particle.decay;
            if particle.life < 0.0 {
                let rng = &mut self.rng;
                particle.life = 1.0;
                particle.decay = random_decay(rng);
                particle.color = RAINBOW[self.color_index];
                particle.position = Vec3::ZERO;
                particle.velocity = Vec3::new(
                    rng.below(60) as f32 - 32.0 + self.constant.x,
                    rng.below(60) as f32 - 30.0 + self.constant.y,
                    rng.below(60) as f32 - 30.0,
                );
            } else {
                particle.position += particle.velocity * velocity_scale;
                particle.velocity.x += self.gravity.x;
                particle.velocity.y += self.gravity.y;
            }
        }

        if self.auto_cycle && self.cycle_delay > 25 {
            self.cycle_delay = 0;
            self.color_index = (self.color_index + 1) % RAINBOW.len();
        }
        self.cycle_delay += 1;
    }

    fn step_color(&mut self) {
        self.auto_cycle = false;
        self.cycle_delay = 0;
        self.color_index = (self.color_index + 1) % RAINBOW.len();
    }

    fn steer(&mut self, input: &Input) {
        if input.any_down(&[KeyCode::Numpad8, KeyCode::KeyI]) && self.gravity.y < 1.5 {
            self.gravity.y += 0.01;
        }
        if input.any_down(&[KeyCode::Numpad2, KeyCode::KeyK]) && self.gravity.y > -1.5 {
            self.gravity.y -= 0.01;
        }
        if input.any_down(&[KeyCode::Numpad6, KeyCode::KeyL]) && self.gravity.x < 1.5 {
            self.gravity.x += 0.01;
        }
        if input.any_down(&[KeyCode::Numpad4, KeyCode::KeyJ]) && self.gravity.x > -1.5 {
            self.gravity.x -= 0.01;
        }

        if input.key_down(KeyCode::Tab) {
            self.burst_all();
        }

        if input.key_down(KeyCode::ArrowUp) && self.constant.y < 200.0 {
            self.constant.y += 1.0;
        }
        if input.key_down(KeyCode::ArrowDown) && self.constant.y > -200.0 {
            self.constant.y -= 1.0;
        }
        if input.key_down(KeyCode::ArrowRight) && self.constant.x < 200.0 {
            self.constant.x += 1.0;
        }
        if input.key_down(KeyCode::ArrowLeft) && self.constant.x > -200.0 {
            self.constant.x -= 1.0;
        }

        if input.any_down(&[KeyCode::NumpadAdd, KeyCode::Equal]) && self.slow_down > 1.0 {
            self.slow_down -= 0.01;
        }
        if input.any_down(&[KeyCode::NumpadSubtract, KeyCode::Minus]) && self.slow_down < 4.0 {
            self.slow_down += 0.01;
        }
    }

    fn write_instances(&self, instances: &mut Vec<ParticleInstance>) {
        instances.clear();
        instances.extend(self.particles.iter().map(|p| {
            let [r, g, b] = p.color;
            ParticleInstance {
                position: p.position.extend(1.0).to_array(),
                color: [r, g, b, p.life],
            }
        }));
    }
}

struct Lesson19 {
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformRing<MvpUniforms>,
    texture_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instances: Vec<ParticleInstance>,
    system: ParticleSystem,
    projection: Mtx,
    zoom: f32,
}

impl Lesson for Lesson19 {
    fn config() -> AppConfig {
        AppConfig::new("NeHe's Particle Tutorial")
    }

    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        let device = &ctx.gpu.device;
        let shader = ctx.create_shader("Lesson 19 Shader", shaders::PARTICLES);
        let uniforms = UniformRing::new(&ctx.gpu, 1, "Lesson 19 Uniforms");
        let texture_layout = pipeline::texture_bind_group_layout(device, "Lesson 19 Texture");
        let pipeline = PipelineBuilder::new("Lesson 19 Pipeline", &shader, ctx.surface_format())
            .vertex(ParticleInstance::LAYOUT)
            .bind_group(uniforms.layout())
            .bind_group(&texture_layout)
            .blend(ADDITIVE_BLENDING)
            .cull_back()
            .topology(wgpu::PrimitiveTopology::TriangleStrip)
            .build(device);

        let texture = ctx.load_texture("Data/Particle.bmp", true, false)?;
        let sampler = ctx.create_sampler(Filter::Linear);
        let texture_bind_group =
            pipeline::texture_bind_group(device, &texture_layout, &texture.view, &sampler);

        let instances = vec![ParticleInstance::default(); MAX_PARTICLES];
        let instance_buffer = ctx.create_buffer(
            "Lesson 19 Instances",
            &instances,
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        );

        Ok(Self {
            pipeline,
            uniforms,
            texture_bind_group,
            instance_buffer,
            instances,
            system: ParticleSystem::new(Random::new()),
            projection: Mtx::IDENTITY,
            zoom: -40.0,
        })
    }

    fn resize(&mut self, _ctx: &mut NeHeContext, width: u32, height: u32) {
        self.projection = Mtx::perspective(45.0, width as f32 / height as f32, 0.1, 200.0);
    }

    fn draw(&mut self, ctx: &mut NeHeContext, frame: &mut Frame<'_>) {
        self.system.write_instances(&mut self.instances);
        ctx.gpu.queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&self.instances),
        );

        self.uniforms.reset();
        {
            let mut pass = frame.begin_pass(ctx, wgpu::Color::TRANSPARENT, "Lesson 19 Pass");
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(1, &self.texture_bind_group, &[]);
            pass.set_vertex_buffer(0, self.instance_buffer.slice(..));

            let mvp = self.projection * Mtx::translation(0.0, 0.0, self.zoom);
            self.uniforms.bind(&ctx.gpu, &mut pass, 0, &MvpUniforms { mvp });
            pass.draw(0..4, 0..self.instances.len() as u32);
        }

        self.system.update();
        self.system.steer(frame.input);

        if frame.input.key_down(KeyCode::PageUp) {
            self.zoom += 0.1;
        }
        if frame.input.key_down(KeyCode::PageDown) {
            self.zoom -= 0.1;
        }
    }

    fn key(&mut self, _ctx: &mut NeHeContext, key: KeyCode, down: bool, repeat: bool) {
        if !down || repeat {
            return;
        }
        match key {
            KeyCode::Enter | KeyCode::NumpadEnter => {
                self.system.auto_cycle = !self.system.auto_cycle;
            }
            KeyCode::Space => self.system.step_color(),
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    nehe::logging::init();
    nehe::run::<Lesson19>().context("lesson 19 failed")
}
