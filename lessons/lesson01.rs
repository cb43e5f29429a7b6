//! An empty window cleared to black.

use anyhow::Context;
use nehe::{AppConfig, Frame, Lesson, NeHeContext, NeHeError, wgpu};

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.5,
};

struct Lesson1;

impl Lesson for Lesson1 {
    fn config() -> AppConfig {
        AppConfig::new("NeHe's OpenGL Framework")
    }

    fn init(_ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
        Ok(Lesson1)
    }

    fn draw(&mut self, ctx: &mut NeHeContext, frame: &mut Frame<'_>) {
        let _pass = frame.begin_pass(ctx, CLEAR, "Lesson 1 Pass");
    }
}

fn main() -> anyhow::Result<()> {
    nehe::logging::init();
    nehe::run::<Lesson1>().context("lesson 1 failed")
}
