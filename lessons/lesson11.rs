//! A flag rippling under a travelling sine wave. The back is filled, the
//! front is drawn as a wireframe.

use std::ops::Range;

use anyhow::Context;
use bytemuck::{Pod, Zeroable};
use nehe::pipeline::{self, PipelineBuilder};
use nehe::shaders::{self, FlagUniforms};
use nehe::{AppConfig, Filter, Frame, Lesson, Mesh, Mtx, NeHeContext, NeHeError, UniformRing, wgpu};

/// Grid cells along each side of the flag.
const GRID: u32 = 44;
const FLAG_SIZE: f32 = 9.0;
const TRIANGLE_INDICES: u32 = GRID * GRID * 6;
const LINE_INDICES: u32 = GRID * (GRID + 1) * 4;
const WAVE_PERIOD: u32 = GRID + 1;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth16Unorm;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
struct FlagVertex {
    position: [f32; 2],
    uv: [f32; 2],
}

impl FlagVertex {
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<FlagVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2],
    };
}

/// `(GRID + 1)^2` points, row by row from the bottom-left corner.
fn flag_vertices() -> Vec<FlagVertex> {
    // spacing divides by GRID + 1, so the flag is a little short of FLAG_SIZE
    let xy_step = FLAG_SIZE / (GRID + 1) as f32;
    let half = FLAG_SIZE / 2.0;

    (0..=GRID)
        .flat_map(|y| (0..=GRID).map(move |x| (x, y)))
        .map(|(x, y)| FlagVertex {
            position: [x as f32 * xy_step - half, y as f32 * xy_step - half],
            uv: [x as f32 / GRID as f32, y as f32 / GRID as f32],
        })
        .collect()
}

/// Two triangles per cell, then every horizontal and vertical grid line.
fn flag_indices() -> Vec<u16> {
    let row = GRID + 1;
    let mut indices = Vec::with_capacity((TRIANGLE_INDICES + LINE_INDICES) as usize);

    for y in 0..GRID {
        for x in 0..GRID {
            let i = y * row + x;
            indices.extend([i, i + row, i + row + 1, i + row + 1, i + 1, i]);
        }
    }
    for y in 0..=GRID {
        for x in 0..GRID {
            let i = y * row + x;
            indices.extend([i, i + 1]);
        }
    }
    for x in 0..=GRID {
        for y in 0..GRID {
            indices.extend([x + row * y, x + row * (y + 1)]);
        }
    }
    indices.into_iter().map(|i| i as u16).collect()
}

/// The wave advances one grid column every second frame.
fn wave_offset(frame: u32) -> f32 {
    ((frame / 2) % WAVE_PERIOD) as f32 / WAVE_PERIOD as f32
}

const FILL: Range<u32> = 0..TRIANGLE_INDICES;
const LINES: Range<u32> = TRIANGLE_INDICES..TRIANGLE_INDICES + LINE_INDICES;

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.5,
};

struct Lesson11 {
    fill_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniforms: UniformRing<FlagUniforms>,
    texture_bind_group: wgpu::BindGroup,
    mesh: Mesh,
    projection: Mtx,
    wiggle_count: u32,
    rot: [f32; 3],
}

impl Lesson for Lesson11 {
    fn config() -> AppConfig {
        AppConfig::new("bosco & NeHe's Waving Texture Tutorial").depth(DEPTH_FORMAT)
    }

    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        let device = &ctx.gpu.device;
        let shader = ctx.create_shader("Lesson 11 Shader", shaders::FLAG);
        let uniforms = UniformRing::new(&ctx.gpu, 2, "Lesson 11 Uniforms");
        let texture_layout = pipeline::texture_bind_group_layout(device, "Lesson 11 Texture");

        let builder = |label: &'static str| {
            PipelineBuilder::new(label, &shader, ctx.surface_format())
                .vertex(FlagVertex::LAYOUT)
                .bind_group(uniforms.layout())
                .bind_group(&texture_layout)
                .depth(DEPTH_FORMAT, wgpu::CompareFunction::LessEqual, true)
        };
        let fill_pipeline = builder("Lesson 11 Fill Pipeline").cull_front().build(device);
        let line_pipeline = builder("Lesson 11 Line Pipeline")
            .topology(wgpu::PrimitiveTopology::LineList)
            .build(device);

        let texture = ctx.load_texture("Data/Tim.bmp", true, false)?;
        let sampler = ctx.create_sampler(Filter::Linear);
        let texture_bind_group =
            pipeline::texture_bind_group(device, &texture_layout, &texture.view, &sampler);

        let mesh = ctx.create_vertex_index_buffer("Lesson 11 Flag", &flag_vertices(), &flag_indices());

        Ok(Self {
            fill_pipeline,
            line_pipeline,
            uniforms,
            texture_bind_group,
            mesh,
            projection: Mtx::IDENTITY,
            wiggle_count: 0,
            rot: [0.0; 3],
        })
    }

    fn resize(&mut self, _ctx: &mut NeHeContext, width: u32, height: u32) {
        self.projection = Mtx::perspective(45.0, width as f32 / height as f32, 0.1, 100.0);
    }

    fn draw(&mut self, ctx: &mut NeHeContext, frame: &mut Frame<'_>) {
        self.uniforms.reset();
        let mut pass = frame.begin_pass(ctx, CLEAR, "Lesson 11 Pass");
        pass.set_bind_group(1, &self.texture_bind_group, &[]);

        let [x_rot, y_rot, z_rot] = self.rot;
        let mut model = Mtx::translation(0.0, 0.0, -12.0);
        model.rotate(x_rot, 1.0, 0.0, 0.0);
        model.rotate(y_rot, 0.0, 1.0, 0.0);
        model.rotate(z_rot, 0.0, 0.0, 1.0);
        let uniforms = FlagUniforms::new(self.projection * model, wave_offset(self.wiggle_count), GRID);
        self.uniforms.bind(&ctx.gpu, &mut pass, 0, &uniforms);

        pass.set_pipeline(&self.fill_pipeline);
        self.mesh.draw_range(&mut pass, FILL);
        pass.set_pipeline(&self.line_pipeline);
        self.mesh.draw_range(&mut pass, LINES);

        self.wiggle_count = self.wiggle_count.wrapping_add(1);
        self.rot[0] += 0.3;
        self.rot[1] += 0.2;
        self.rot[2] += 0.4;
    }
}

fn main() -> anyhow::Result<()> {
    nehe::logging::init();
    nehe::run::<Lesson11>().context("lesson 11 failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_fits_sixteen_bit_indices() {
        let vertices = flag_vertices();
        assert_eq!(vertices.len(), 45 * 45);
        let indices = flag_indices();
        assert_eq!(indices.len() as u32, TRIANGLE_INDICES + LINE_INDICES);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn grid_spans_the_flag() {
        let vertices = flag_vertices();
        assert_eq!(vertices[0].position, [-4.5, -4.5]);
        assert_eq!(vertices[0].uv, [0.0, 0.0]);
        let last = vertices[vertices.len() - 1];
        assert_eq!(last.uv, [1.0, 1.0]);
        assert!((last.position[0] - (44.0 * 9.0 / 45.0 - 4.5)).abs() < 1e-5);
    }

    #[test]
    fn first_cell_and_first_line() {
        let indices = flag_indices();
        assert_eq!(&indices[..6], &[0, 45, 46, 46, 1, 0]);
        let lines = TRIANGLE_INDICES as usize;
        assert_eq!(&indices[lines..lines + 2], &[0, 1]);
        // vertical lines start after every horizontal one
        let vertical = lines + (GRID * (GRID + 1) * 2) as usize;
        assert_eq!(&indices[vertical..vertical + 2], &[0, 45]);
    }

    #[test]
    fn wave_steps_every_other_frame_and_wraps() {
        assert_eq!(wave_offset(0), 0.0);
        assert_eq!(wave_offset(1), 0.0);
        assert_eq!(wave_offset(2), 1.0 / 45.0);
        assert_eq!(wave_offset(90), 0.0);
    }
}
