//! A line of coloured text drifting around the screen.

use anyhow::Context;
use nehe::{
    AppConfig, FontAtlas, Frame, Lesson, Mtx, NeHeContext, NeHeError, TextRenderer, Vec4, wgpu,
};

const FONT: &str = "Data/NimbusMonoPS-Bold.ttf";
const FONT_SIZE: f32 = 24.0;

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.5,
};

struct Lesson13 {
    text: TextRenderer,
    projection: Mtx,
    counter1: f32,
    counter2: f32,
}

impl Lesson13 {
    /// Window pixel position of a point one unit in front of the camera.
    fn raster_pos(&self, x: f32, y: f32, width: u32, height: u32) -> (f32, f32) {
        let view = Mtx::translation(0.0, 0.0, -1.0);
        let ndc = (self.projection * view).vector_project(Vec4::new(x, y, 0.0, 1.0));
        (
            (ndc.x + 1.0) * 0.5 * width as f32,
            (1.0 - ndc.y) * 0.5 * height as f32,
        )
    }
}

impl Lesson for Lesson13 {
    fn config() -> AppConfig {
        AppConfig::new("NeHe's Bitmap Font Tutorial")
    }

    fn init(ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        let font = ctx.read_resource(FONT)?;
        let atlas = FontAtlas::new(&ctx.gpu, &font, FONT_SIZE)?;
        Ok(Self {
            text: TextRenderer::new(ctx, atlas),
            projection: Mtx::IDENTITY,
            counter1: 0.0,
            counter2: 0.0,
        })
    }

    fn resize(&mut self, _ctx: &mut NeHeContext, width: u32, height: u32) {
        self.projection = Mtx::perspective(45.0, width as f32 / height as f32, 0.1, 100.0);
    }

    fn draw(&mut self, ctx: &mut NeHeContext, frame: &mut Frame<'_>) {
        let (c1, c2) = (self.counter1, self.counter2);
        let color = [
            c1.cos().max(0.0),
            c2.sin().max(0.0),
            1.0 - 0.5 * (c1 + c2).cos(),
            1.0,
        ];
        let (x, y) = self.raster_pos(
            -0.45 + 0.05 * c1.cos(),
            0.35 * c2.sin(),
            frame.width,
            frame.height,
        );
        let line = format!("Active OpenGL Text With NeHe - {c1:7.2}");

        self.text.reset();
        {
            let mut pass = frame.begin_pass(ctx, CLEAR, "Lesson 13 Pass");
            self.text.draw(ctx, &mut pass, &line, x, y, color);
        }

        self.counter1 += 0.051;
        self.counter2 += 0.005;
    }
}

fn main() -> anyhow::Result<()> {
    nehe::logging::init();
    nehe::run::<Lesson13>().context("lesson 13 failed")
}
