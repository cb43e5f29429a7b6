//! # NeHe
//!
//! **NeHe's classic OpenGL lessons, rendered with wgpu.**
//!
//! Each lesson is a type implementing [`Lesson`]: it builds its pipelines in
//! [`Lesson::init`], rebuilds its projection in [`Lesson::resize`] and records
//! a frame in [`Lesson::draw`]. [`run`] owns the window, the event loop, the
//! depth buffer and the built-in keys (Escape quits, F1 toggles fullscreen,
//! F12 saves a screenshot).
//!
//! ```no_run
//! use nehe::{AppConfig, Frame, Lesson, NeHeContext, NeHeError};
//!
//! struct Blank;
//!
//! impl Lesson for Blank {
//!     fn config() -> AppConfig {
//!         AppConfig::new("Blank")
//!     }
//!
//!     fn init(_ctx: &mut NeHeContext) -> Result<Self, NeHeError> {
//!         Ok(Blank)
//!     }
//!
//!     fn draw(&mut self, ctx: &mut NeHeContext, frame: &mut Frame<'_>) {
//!         let _pass = frame.begin_pass(ctx, wgpu::Color::BLACK, "Clear");
//!     }
//! }
//!
//! fn main() -> Result<(), NeHeError> {
//!     nehe::run::<Blank>()
//! }
//! ```
//!
//! The math follows the fixed-function GL conventions the lessons were
//! written against: [`Mtx`] is column-major with a `[-1, 1]` depth range,
//! [`quadric`] tessellates like GLU, and [`Random`] reproduces the C runtime
//! generator so star fields and particle bursts look the same.

mod app;
mod context;
mod error;
pub mod font;
mod gpu;
mod input;
pub mod logging;
pub mod matrix;
mod mesh;
pub mod pipeline;
pub mod quadric;
mod random;
pub mod raw_image;
mod screenshot;
pub mod shaders;
mod texture;
pub mod uniform;
pub mod world;

pub use app::{AppConfig, Frame, Lesson, run};
pub use context::{DATA_DIR_ENV, NeHeContext};
pub use error::NeHeError;
pub use font::{FontAtlas, TextRenderer};
pub use gpu::GpuContext;
pub use input::Input;
pub use matrix::Mtx;
pub use mesh::{
    CUBE_INDICES, LIT_CUBE_VERTICES, Mesh, MeshIndex, VertexColor, VertexNormalTexture,
    VertexTexture,
};
pub use pipeline::{ADDITIVE_BLENDING, PipelineBuilder};
pub use quadric::{Quadric, QuadricCounts, QuadricError};
pub use random::Random;
pub use raw_image::{BlitMode, RawImage, RawImageError, Rect};
pub use screenshot::ScreenshotError;
pub use texture::{Filter, TEXTURE_FORMAT, Texture};
pub use uniform::UniformRing;
pub use world::{World, WorldError};

// Re-export commonly used types
pub use glam::{Mat4, Vec2, Vec3, Vec4};
pub use winit::keyboard::KeyCode;

// Lessons name wgpu types in their signatures.
pub use wgpu;
