//! GLU-style quadrics: a cube, cylinder, disc, sphere, cone and an animated
//! partial disc. Space cycles the shape, `L` toggles lighting and `F` cycles
//! texture filtering.

use anyhow::Context;
use nehe::pipeline::{self, PipelineBuilder};
use nehe::shaders::{self, Light, LitUniforms};
use nehe::{
    AppConfig, CUBE_INDICES, Filter, Frame, KeyCode, LIT_CUBE_VERTICES, Lesson, Mesh, Mtx,
    NeHeContext, NeHeError, Quadric, QuadricCounts, UniformRing, VertexNormalTexture, wgpu,
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

const SLICES: u32 = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shape {
    Cube,
    Cylinder,
    Disc,
    Sphere,
    Cone,
    PartialDisc,
}

impl Shape {
    const ALL: [Shape; 6] = [
        Shape::Cube,
        Shape::Cylinder,
        Shape::Disc,
        Shape::Sphere,
        Shape::Cone,
        Shape::PartialDisc,
    ];

    fn next(self) -> Self {
        let i = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

/// The pie slice that grows to a full disc, then shrinks away from its start.
#[derive(Clone, Copy, Debug)]
struct Sweep {
    part1: f32,
    part2: f32,
    p1: f32,
    p2: f32,
}

impl Default for Sweep {
    fn default() -> Self {
        Self {
            part1: 0.0,
            part2: 0.0,
            p1: 0.0,
            p2: 1.0,
        }
    }
}

impl Sweep {
    fn advance(&mut self) {
        self.part1 += self.p1;
        self.part2 += self.p2;
        if self.part1 > 359.0 {
            *self = Self::default();
        }
        if self.part2 > 359.0 {
            self.p1 = 1.0;
            self.p2 = 0.0;
        }
    }

    /// Start and sweep angles in degrees.
    fn angles(&self) -> (f32, f32) {
        (self.part1, self.part2 - self.part1)
    }
}

/// Tessellate one quadric into scratch storage and upload it.
fn build_quadric(
    ctx: &NeHeContext,
    label: &str,
    counts: QuadricCounts,
    generate: impl FnOnce(&mut Quadric<'_>) -> Result<(), nehe::QuadricError>,
) -> Result<Mesh, NeHeError> {
    let mut vertices = vec![VertexNormalTexture::default(); counts.vertices];
    let mut indices = vec![0u32; counts.indices];
    let mut quadric = Quadric::new(&mut vertices, &mut indices);
    generate(&mut quadric)?;
    log::debug!(
        "{label}: {} vertices, {} indices",
        quadric.num_vertices(),
        quadric.num_indices()
    );
    Ok(ctx.create_vertex_index_buffer(label, quadric.vertices(), quadric.indices()))
}

struct Lesson18 {
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformRing<LitUniforms>,
    texture_bind_groups: Vec<wgpu::BindGroup>,
    cube: Mesh,
    cylinder: Mesh,
    disc: Mesh,
    sphere: Mesh,
    cone: Mesh,
    partial_disc: Mesh,
    scratch_vertices: Vec<VertexNormalTexture>,
    scratch_indices: Vec<u32>,
    sweep: Sweep,
    shape: Shape,
    projection: Mtx,
    lighting: bool,
    filter: Filter,
    rot: [f32; 2],
    speed: [f32; 2],
    z: f32,
}

impl Lesson18 {
    fn update_partial_disc(&mut self, ctx: &NeHeContext) {
        self.sweep.advance();
        let (start, sweep) = self.sweep.angles();
        let mut quadric = Quadric::new(&mut self.scratch_vertices, &mut self.scratch_indices);
        match quadric.disc_partial(0.5, 1.5, SLICES, SLICES, start, sweep) {
            Ok(()) => self
                .partial_disc
                .update(&ctx.gpu, quadric.vertices(), quadric.indices()),
            Err(err) => log::warn!("partial disc skipped: {err}"),
        }
    }
}

impl Lesson for Lesson18 {
    fn config() -> AppConfig {
        AppConfig::new("NeHe & TipTup's Quadratics Tutorial")
            .depth(wgpu::TextureFormat::Depth16Unorm)
    }

    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        let device = &ctx.gpu.device;
        let shader = ctx.create_shader("Lesson 18 Shader", shaders::LIT);
        let uniforms = UniformRing::new(&ctx.gpu, 4, "Lesson 18 Uniforms");
        let texture_layout = pipeline::texture_bind_group_layout(device, "Lesson 18 Texture");
        let pipeline = PipelineBuilder::new("Lesson 18 Pipeline", &shader, ctx.surface_format())
            .vertex(VertexNormalTexture::LAYOUT)
            .bind_group(uniforms.layout())
            .bind_group(&texture_layout)
            .depth(
                wgpu::TextureFormat::Depth16Unorm,
                wgpu::CompareFunction::LessEqual,
                true,
            )
            .build(device);

        let texture = ctx.load_texture("Data/Wall.bmp", true, true)?;
        let samplers = Filter::ALL.map(|filter| ctx.create_sampler(filter));
        let texture_bind_groups =
            pipeline::filtered_bind_groups(device, &texture_layout, &texture, &samplers);

        let cube = ctx.create_vertex_index_buffer("Cube", &LIT_CUBE_VERTICES, &CUBE_INDICES);
        let cylinder = build_quadric(
            ctx,
            "Cylinder",
            QuadricCounts::cylinder(SLICES, SLICES),
            |q| q.cylinder(1.0, 1.0, 3.0, SLICES, SLICES),
        )?;
        let disc = build_quadric(
            ctx,
            "Disc",
            QuadricCounts::disc(0.5, SLICES, SLICES),
            |q| q.disc(0.5, 1.5, SLICES, SLICES),
        )?;
        let sphere = build_quadric(
            ctx,
            "Sphere",
            QuadricCounts::sphere(SLICES, SLICES),
            |q| q.sphere(1.3, SLICES, SLICES),
        )?;
        let cone = build_quadric(
            ctx,
            "Cone",
            QuadricCounts::cylinder(SLICES, SLICES),
            |q| q.cylinder(1.0, 0.0, 3.0, SLICES, SLICES),
        )?;

        // any sweep short of a full turn needs the seam column
        let capacity = QuadricCounts::disc_partial(0.5, SLICES, SLICES, 180.0);
        let partial_disc = Mesh::with_capacity::<VertexNormalTexture, u32>(
            &ctx.gpu,
            capacity.vertices,
            capacity.indices,
            "Partial Disc",
        );

        Ok(Self {
            pipeline,
            uniforms,
            texture_bind_groups,
            cube,
            cylinder,
            disc,
            sphere,
            cone,
            partial_disc,
            scratch_vertices: vec![VertexNormalTexture::default(); capacity.vertices],
            scratch_indices: vec![0; capacity.indices],
            sweep: Sweep::default(),
            shape: Shape::Cube,
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
        if self.shape == Shape::PartialDisc {
            self.update_partial_disc(ctx);
        }

        self.uniforms.reset();
        {
            let mut pass = frame.begin_pass(ctx, CLEAR, "Lesson 18 Pass");
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(1, &self.texture_bind_groups[self.filter.index()], &[]);

            let mut model = Mtx::translation(0.0, 0.0, self.z);
            model.rotate(self.rot[0], 1.0, 0.0, 0.0);
            model.rotate(self.rot[1], 0.0, 1.0, 0.0);
            if matches!(self.shape, Shape::Cylinder | Shape::Cone) {
                // centre along the axis
                model.translate(0.0, 0.0, -1.5);
            }

            let light = self.lighting.then_some(&LIGHT);
            let uniforms = LitUniforms::new(model, self.projection, [1.0; 4], light);
            self.uniforms.bind(&ctx.gpu, &mut pass, 0, &uniforms);

            let mesh = match self.shape {
                Shape::Cube => &self.cube,
                Shape::Cylinder => &self.cylinder,
                Shape::Disc => &self.disc,
                Shape::Sphere => &self.sphere,
                Shape::Cone => &self.cone,
                Shape::PartialDisc => &self.partial_disc,
            };
            mesh.draw(&mut pass);
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
            self.speed[1] += 0.01;
        }
        if input.key_down(KeyCode::ArrowLeft) {
            self.speed[1] -= 0.01;
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
            KeyCode::Space => {
                self.shape = self.shape.next();
                log::info!("shape: {:?}", self.shape);
            }
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    nehe::logging::init();
    nehe::run::<Lesson18>().context("lesson 18 failed")
}
