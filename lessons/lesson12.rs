//! A pyramid of fifteen coloured boxes, drawn with one instanced call.
//!
//! Arrow keys tilt the boxes, Page Up/Down zoom and `R` resets the tilt.

use anyhow::Context;
use bytemuck::{Pod, Zeroable};
use nehe::pipeline::{self, PipelineBuilder};
use nehe::shaders::{self, ViewProjectionUniforms};
use nehe::{
    AppConfig, Filter, Frame, KeyCode, Lesson, Mesh, Mtx, NeHeContext, NeHeError, UniformRing,
    wgpu,
};

const ROWS: usize = 5;
const NUM_BOXES: usize = ROWS * (ROWS + 1) / 2;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct BoxVertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
    tint: f32,
}

impl BoxVertex {
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<BoxVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![
            0 => Float32x3, 1 => Float32x3, 2 => Float32x2, 3 => Float32
        ],
    };

    const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2], tint: f32) -> Self {
        Self {
            position,
            normal,
            uv,
            tint,
        }
    }
}

/// Per-box model matrix, one column per attribute, then its colour.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
struct BoxInstance {
    model: Mtx,
    color: [f32; 4],
}

impl BoxInstance {
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<BoxInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &wgpu::vertex_attr_array![
            4 => Float32x4, 5 => Float32x4, 6 => Float32x4, 7 => Float32x4, 8 => Float32x4
        ],
    };
}

// The lid is drawn darker than the sides.
#[rustfmt::skip]
const VERTICES: [BoxVertex; 24] = [
    // Bottom
    BoxVertex::new([-1.0, -1.0, -1.0], [ 0.0, -1.0,  0.0], [1.0, 1.0], 1.0),
    BoxVertex::new([ 1.0, -1.0, -1.0], [ 0.0, -1.0,  0.0], [0.0, 1.0], 1.0),
    BoxVertex::new([ 1.0, -1.0,  1.0], [ 0.0, -1.0,  0.0], [0.0, 0.0], 1.0),
    BoxVertex::new([-1.0, -1.0,  1.0], [ 0.0, -1.0,  0.0], [1.0, 0.0], 1.0),
    // Front
    BoxVertex::new([-1.0, -1.0,  1.0], [ 0.0,  0.0,  1.0], [0.0, 0.0], 1.0),
    BoxVertex::new([ 1.0, -1.0,  1.0], [ 0.0,  0.0,  1.0], [1.0, 0.0], 1.0),
    BoxVertex::new([ 1.0,  1.0,  1.0], [ 0.0,  0.0,  1.0], [1.0, 1.0], 1.0),
    BoxVertex::new([-1.0,  1.0,  1.0], [ 0.0,  0.0,  1.0], [0.0, 1.0], 1.0),
    // Back
    BoxVertex::new([-1.0, -1.0, -1.0], [ 0.0,  0.0, -1.0], [1.0, 0.0], 1.0),
    BoxVertex::new([-1.0,  1.0, -1.0], [ 0.0,  0.0, -1.0], [1.0, 1.0], 1.0),
    BoxVertex::new([ 1.0,  1.0, -1.0], [ 0.0,  0.0, -1.0], [0.0, 1.0], 1.0),
    BoxVertex::new([ 1.0, -1.0, -1.0], [ 0.0,  0.0, -1.0], [0.0, 0.0], 1.0),
    // Right
    BoxVertex::new([ 1.0, -1.0, -1.0], [ 1.0,  0.0,  0.0], [1.0, 0.0], 1.0),
    BoxVertex::new([ 1.0,  1.0, -1.0], [ 1.0,  0.0,  0.0], [1.0, 1.0], 1.0),
    BoxVertex::new([ 1.0,  1.0,  1.0], [ 1.0,  0.0,  0.0], [0.0, 1.0], 1.0),
    BoxVertex::new([ 1.0, -1.0,  1.0], [ 1.0,  0.0,  0.0], [0.0, 0.0], 1.0),
    // Left
    BoxVertex::new([-1.0, -1.0, -1.0], [-1.0,  0.0,  0.0], [0.0, 0.0], 1.0),
    BoxVertex::new([-1.0, -1.0,  1.0], [-1.0,  0.0,  0.0], [1.0, 0.0], 1.0),
    BoxVertex::new([-1.0,  1.0,  1.0], [-1.0,  0.0,  0.0], [1.0, 1.0], 1.0),
    BoxVertex::new([-1.0,  1.0, -1.0], [-1.0,  0.0,  0.0], [0.0, 1.0], 1.0),
    // Top
    BoxVertex::new([-1.0,  1.0, -1.0], [ 0.0,  1.0,  0.0], [0.0, 1.0], 0.5),
    BoxVertex::new([-1.0,  1.0,  1.0], [ 0.0,  1.0,  0.0], [0.0, 0.0], 0.5),
    BoxVertex::new([ 1.0,  1.0,  1.0], [ 0.0,  1.0,  0.0], [1.0, 0.0], 0.5),
    BoxVertex::new([ 1.0,  1.0, -1.0], [ 0.0,  1.0,  0.0], [1.0, 1.0], 0.5),
];

const ROW_COLORS: [[f32; 3]; ROWS] = [
    [1.0, 0.0, 0.0],
    [1.0, 0.5, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 1.0, 1.0],
];

/// Lay the boxes out row by row from the top, one more box per row.
fn pyramid(x_rot: f32, y_rot: f32) -> Vec<BoxInstance> {
    let mut boxes = Vec::with_capacity(NUM_BOXES);
    for (row, color) in ROW_COLORS.iter().enumerate() {
        let row_fact = (row + 1) as f32;
        for x in 0..=row {
            let mut model = Mtx::translation(
                1.4 + x as f32 * 2.8 - row_fact * 1.4,
                ((ROWS + 1) as f32 - row_fact) * 2.4 - (ROWS + 2) as f32,
                0.0,
            );
            model.rotate(45.0 - 2.0 * row_fact + x_rot, 1.0, 0.0, 0.0);
            model.rotate(45.0 + y_rot, 0.0, 1.0, 0.0);
            let [r, g, b] = *color;
            boxes.push(BoxInstance {
                model,
                color: [r, g, b, 1.0],
            });
        }
    }
    boxes
}

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.5,
};

struct Lesson12 {
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformRing<ViewProjectionUniforms>,
    texture_bind_group: wgpu::BindGroup,
    mesh: Mesh,
    instance_buffer: wgpu::Buffer,
    projection: Mtx,
    x_rot: f32,
    y_rot: f32,
    z: f32,
}

impl Lesson for Lesson12 {
    fn config() -> AppConfig {
        AppConfig::new("NeHe's Display List Tutorial").depth(DEPTH_FORMAT)
    }

    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        let device = &ctx.gpu.device;
        let shader = ctx.create_shader("Lesson 12 Shader", shaders::CUBES);
        let uniforms = UniformRing::new(&ctx.gpu, 1, "Lesson 12 Uniforms");
        let texture_layout = pipeline::texture_bind_group_layout(device, "Lesson 12 Texture");
        let pipeline = PipelineBuilder::new("Lesson 12 Pipeline", &shader, ctx.surface_format())
            .vertex(BoxVertex::LAYOUT)
            .vertex(BoxInstance::LAYOUT)
            .bind_group(uniforms.layout())
            .bind_group(&texture_layout)
            .depth(DEPTH_FORMAT, wgpu::CompareFunction::LessEqual, true)
            .build(device);

        let texture = ctx.load_texture("Data/Cube.bmp", true, false)?;
        let sampler = ctx.create_sampler(Filter::Linear);
        let texture_bind_group =
            pipeline::texture_bind_group(device, &texture_layout, &texture.view, &sampler);
        let mesh = ctx.create_vertex_index_buffer("Lesson 12 Box", &VERTICES, &nehe::CUBE_INDICES);
        let instance_buffer = ctx.create_buffer(
            "Lesson 12 Instances",
            &pyramid(0.0, 0.0),
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        );

        Ok(Self {
            pipeline,
            uniforms,
            texture_bind_group,
            mesh,
            instance_buffer,
            projection: Mtx::IDENTITY,
            x_rot: 0.0,
            y_rot: 0.0,
            z: -20.0,
        })
    }

    fn resize(&mut self, _ctx: &mut NeHeContext, width: u32, height: u32) {
        self.projection = Mtx::perspective(45.0, width as f32 / height as f32, 0.1, 100.0);
    }

    fn draw(&mut self, ctx: &mut NeHeContext, frame: &mut Frame<'_>) {
        let boxes = pyramid(self.x_rot, self.y_rot);
        ctx.gpu
            .queue
            .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&boxes));

        self.uniforms.reset();
        {
            let mut pass = frame.begin_pass(ctx, CLEAR, "Lesson 12 Pass");
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(1, &self.texture_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

            let uniforms = ViewProjectionUniforms {
                view: Mtx::translation(0.0, 0.0, self.z),
                projection: self.projection,
            };
            self.uniforms.bind(&ctx.gpu, &mut pass, 0, &uniforms);
            self.mesh.draw_instanced(&mut pass, 0..boxes.len() as u32);
        }

        let input = frame.input;
        if input.key_down(KeyCode::PageUp) {
            self.z -= 0.02;
        }
        if input.key_down(KeyCode::PageDown) {
            self.z += 0.02;
        }
        if input.key_down(KeyCode::KeyR) {
            self.x_rot = 0.0;
            self.y_rot = 0.0;
        }
        if input.key_down(KeyCode::ArrowUp) {
            self.x_rot -= 0.2;
        }
        if input.key_down(KeyCode::ArrowDown) {
            self.x_rot += 0.2;
        }
        if input.key_down(KeyCode::ArrowLeft) {
            self.y_rot -= 0.2;
        }
        if input.key_down(KeyCode::ArrowRight) {
            self.y_rot += 0.2;
        }
    }
}

fn main() -> anyhow::Result<()> {
    nehe::logging::init();
    nehe::run::<Lesson12>().context("lesson 12 failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nehe::Vec4;

    #[test]
    fn instance_matches_its_attributes() {
        // four matrix columns and a colour
        assert_eq!(std::mem::size_of::<BoxInstance>(), 5 * 16);
        assert_eq!(BoxInstance::LAYOUT.array_stride, 80);
        assert_eq!(BoxVertex::LAYOUT.array_stride, 36);
    }

    #[test]
    fn pyramid_rows_widen_downwards() {
        let boxes = pyramid(0.0, 0.0);
        assert_eq!(boxes.len(), NUM_BOXES);
        assert_eq!(boxes[0].color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(boxes[NUM_BOXES - 1].color, [0.0, 1.0, 1.0, 1.0]);

        let centre = |b: &BoxInstance| b.model.vector_product(Vec4::new(0.0, 0.0, 0.0, 1.0));
        // the apex sits on the axis, 5 above the bottom row
        let apex = centre(&boxes[0]);
        assert!(apex.x.abs() < 1e-5);
        assert!((apex.y - 5.0).abs() < 1e-5);
        let bottom_left = centre(&boxes[10]);
        assert!((bottom_left.x + 5.6).abs() < 1e-5);
        assert!((bottom_left.y + 4.6).abs() < 1e-5);
    }

    #[test]
    fn only_the_lid_is_tinted() {
        let tinted: Vec<_> = VERTICES.iter().filter(|v| v.tint < 1.0).collect();
        assert_eq!(tinted.len(), 4);
        assert!(tinted.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    }
}
