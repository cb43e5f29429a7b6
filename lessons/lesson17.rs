//! Two-dimensional text from a glyph sheet, drifting over a spinning
//! textured diamond.

use anyhow::Context;
use nehe::font::{SHEET_MAX_CHARS, sheet_layout};
use nehe::pipeline::{self, PipelineBuilder};
use nehe::shaders::{self, TexturedUniforms};
use nehe::{
    ADDITIVE_BLENDING, AppConfig, Filter, Frame, Lesson, Mesh, Mtx, NeHeContext, NeHeError,
    UniformRing, VertexTexture, wgpu,
};

const SQRT2: f32 = std::f32::consts::SQRT_2;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth16Unorm;
const TEXT_STRINGS: usize = 4;
const CREDIT: &str = "Giuseppe D'Agata";

#[rustfmt::skip]
const VERTICES: [VertexTexture; 6] = [
    VertexTexture::new([-SQRT2,    0.0,    0.0], [0.0, 0.0]),
    VertexTexture::new([   0.0,  SQRT2,    0.0], [1.0, 0.0]),
    VertexTexture::new([ SQRT2,    0.0,    0.0], [1.0, 1.0]),
    VertexTexture::new([   0.0, -SQRT2,    0.0], [0.0, 1.0]),
    VertexTexture::new([   0.0,    0.0,  SQRT2], [0.0, 0.0]),
    VertexTexture::new([   0.0,    0.0, -SQRT2], [1.0, 1.0]),
];

#[rustfmt::skip]
const INDICES: [u16; 12] = [
    0, 1, 2, 2, 3, 0,
    3, 4, 1, 1, 5, 3,
];

/// One string on screen, placed on whole pixels.
struct Caption {
    text: &'static str,
    x: f32,
    y: f32,
    set: u32,
    color: [f32; 4],
}

/// The captions for the counters' current values, in drawing order.
fn captions(a: f32, b: f32) -> [Caption; TEXT_STRINGS] {
    let credit_x = (240.0 + 200.0 * (a + b).cos() / 5.0).trunc();
    [
        Caption {
            text: "NeHe",
            x: (280.0 + 250.0 * a.cos()).trunc(),
            y: (235.0 + 200.0 * b.sin()).trunc(),
            set: 0,
            color: [a.cos().max(0.0), b.sin().max(0.0), 1.0 - 0.5 * (a + b).cos(), 1.0],
        },
        Caption {
            text: "OpenGL",
            x: (280.0 + 230.0 * b.cos()).trunc(),
            y: (235.0 + 200.0 * a.sin()).trunc(),
            set: 1,
            color: [b.sin().max(0.0), 1.0 - 0.5 * (a + b).cos(), a.cos().max(0.0), 1.0],
        },
        Caption {
            text: CREDIT,
            x: credit_x,
            y: 2.0,
            set: 0,
            color: [0.0, 0.0, 1.0, 1.0],
        },
        Caption {
            text: CREDIT,
            x: credit_x + 2.0,
            y: 2.0,
            set: 0,
            color: [1.0; 4],
        },
    ]
}

const CLEAR: wgpu::Color = wgpu::Color::TRANSPARENT;

struct Lesson17 {
    object_pipeline: wgpu::RenderPipeline,
    text_pipeline: wgpu::RenderPipeline,
    uniforms: UniformRing<TexturedUniforms>,
    bumps_bind_group: wgpu::BindGroup,
    font_bind_group: wgpu::BindGroup,
    object: Mesh,
    text: Mesh,
    projection: Mtx,
    ortho: Mtx,
    counter_a: f32,
    counter_b: f32,
}

impl Lesson for Lesson17 {
    fn config() -> AppConfig {
        AppConfig::new("NeHe & Giuseppe D'Agata's 2D Font Tutorial").depth(DEPTH_FORMAT)
    }

    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        let device = &ctx.gpu.device;
        let shader = ctx.create_shader("Lesson 17 Shader", shaders::TEXTURED);
        let uniforms = UniformRing::new(&ctx.gpu, 1 + TEXT_STRINGS as u32, "Lesson 17 Uniforms");
        let texture_layout = pipeline::texture_bind_group_layout(device, "Lesson 17 Texture");

        let object_pipeline =
            PipelineBuilder::new("Lesson 17 Object Pipeline", &shader, ctx.surface_format())
                .vertex(VertexTexture::LAYOUT)
                .bind_group(uniforms.layout())
                .bind_group(&texture_layout)
                .depth(DEPTH_FORMAT, wgpu::CompareFunction::LessEqual, true)
                .build(device);
        let text_pipeline =
            PipelineBuilder::new("Lesson 17 Text Pipeline", &shader, ctx.surface_format())
                .vertex(VertexTexture::LAYOUT)
                .bind_group(uniforms.layout())
                .bind_group(&texture_layout)
                .blend(ADDITIVE_BLENDING)
                .depth_disabled(DEPTH_FORMAT)
                .build(device);

        let sampler = ctx.create_sampler(Filter::Linear);
        let bumps = ctx.load_texture("Data/Bumps.bmp", true, false)?;
        let bumps_bind_group =
            pipeline::texture_bind_group(device, &texture_layout, &bumps.view, &sampler);
        let font = ctx.load_texture("Data/Font.bmp", true, false)?;
        let font_bind_group =
            pipeline::texture_bind_group(device, &texture_layout, &font.view, &sampler);

        let object = ctx.create_vertex_index_buffer("Lesson 17 Object", &VERTICES, &INDICES);
        let max_glyphs = TEXT_STRINGS * SHEET_MAX_CHARS;
        let text = Mesh::with_capacity::<VertexTexture, u16>(
            &ctx.gpu,
            max_glyphs * 4,
            max_glyphs * 6,
            "Lesson 17 Text",
        );

        Ok(Self {
            object_pipeline,
            text_pipeline,
            uniforms,
            bumps_bind_group,
            font_bind_group,
            object,
            text,
            projection: Mtx::IDENTITY,
            ortho: Mtx::orthographic_2d(0.0, 640.0, 0.0, 480.0),
            counter_a: 0.0,
            counter_b: 0.0,
        })
    }

    fn resize(&mut self, _ctx: &mut NeHeContext, width: u32, height: u32) {
        self.projection = Mtx::perspective(45.0, width as f32 / height as f32, 0.1, 100.0);
    }

    fn draw(&mut self, ctx: &mut NeHeContext, frame: &mut Frame<'_>) {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        let ranges = captions(self.counter_a, self.counter_b).map(|caption| {
            let range = sheet_layout(
                caption.text,
                caption.x,
                caption.y,
                caption.set,
                &mut vertices,
                &mut indices,
            );
            (range, caption.color)
        });
        self.text.update(&ctx.gpu, &vertices, &indices);

        self.uniforms.reset();
        let mut pass = frame.begin_pass(ctx, CLEAR, "Lesson 17 Pass");

        pass.set_pipeline(&self.object_pipeline);
        pass.set_bind_group(1, &self.bumps_bind_group, &[]);
        let mut model = Mtx::translation(0.0, 0.0, -5.0);
        model.rotate(30.0 * self.counter_a, 0.0, 1.0, 0.0);
        let object = TexturedUniforms {
            mvp: self.projection * model,
            color: [1.0; 4],
        };
        self.uniforms.bind(&ctx.gpu, &mut pass, 0, &object);
        self.object.draw(&mut pass);

        pass.set_pipeline(&self.text_pipeline);
        pass.set_bind_group(1, &self.font_bind_group, &[]);
        for (range, color) in ranges {
            let text = TexturedUniforms {
                mvp: self.ortho,
                color,
            };
            self.uniforms.bind(&ctx.gpu, &mut pass, 0, &text);
            self.text.draw_range(&mut pass, range);
        }

        self.counter_a += 0.01;
        self.counter_b += 0.0081;
    }
}

fn main() -> anyhow::Result<()> {
    nehe::logging::init();
    nehe::run::<Lesson17>().context("lesson 17 failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captions_start_where_the_counters_put_them() {
        let [name, opengl, shadow, credit] = captions(0.0, 0.0);
        assert_eq!((name.x, name.y), (530.0, 235.0));
        assert_eq!(name.color, [1.0, 0.0, 0.5, 1.0]);
        assert_eq!((opengl.x, opengl.y, opengl.set), (510.0, 235.0, 1));
        assert_eq!(shadow.x, 280.0);
        assert_eq!(credit.x, shadow.x + 2.0);
    }

    #[test]
    fn caption_positions_are_whole_pixels() {
        for caption in captions(1.234, 0.567) {
            assert_eq!(caption.x, caption.x.trunc());
            assert_eq!(caption.y, caption.y.trunc());
        }
    }

    #[test]
    fn captions_fit_the_text_buffers() {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        for caption in captions(0.0, 0.0) {
            sheet_layout(caption.text, caption.x, caption.y, caption.set, &mut vertices, &mut indices);
        }
        // every caption character is printable
        let chars: usize = captions(0.0, 0.0).iter().map(|c| c.text.len()).sum();
        assert_eq!(vertices.len(), chars * 4);
        assert!(indices.len() <= TEXT_STRINGS * SHEET_MAX_CHARS * 6);
    }
}
