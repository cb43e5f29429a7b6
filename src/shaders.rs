//! WGSL sources shared by the lessons.
//!
//! Every module exposes `vs` and `fs` entry points and expects its uniform
//! block at group 0, binding 0. Textured modules take the texture at group 1,
//! binding 0 and the sampler at group 1, binding 1. Vertex stages take matrices
//! in the GL depth convention and remap clip-space z themselves.

use bytemuck::{Pod, Zeroable};

use crate::matrix::Mtx;

/// Per-vertex colour. Uniforms: [`MvpUniforms`].
pub const COLOR: &str = include_str!("shaders/color.wgsl");
/// Texture times a constant colour. Uniforms: [`TexturedUniforms`].
pub const TEXTURED: &str = include_str!("shaders/textured.wgsl");
/// Texture with per-vertex diffuse lighting. Uniforms: [`LitUniforms`].
pub const LIT: &str = include_str!("shaders/lit.wgsl");
/// Instanced rotating star sprites. Uniforms: [`ViewProjectionUniforms`].
pub const STARS: &str = include_str!("shaders/stars.wgsl");
/// Instanced particle quads drawn as triangle strips. Uniforms: [`MvpUniforms`].
pub const PARTICLES: &str = include_str!("shaders/particles.wgsl");
/// Glyph quads from an R8 atlas. Uniforms: [`TextUniforms`].
pub const TEXT: &str = include_str!("shaders/text.wgsl");
/// Sine-wave displaced grid. Uniforms: [`FlagUniforms`].
pub const FLAG: &str = include_str!("shaders/flag.wgsl");
/// Instanced boxes with per-instance model matrix and colour.
/// Uniforms: [`ViewProjectionUniforms`].
pub const CUBES: &str = include_str!("shaders/cubes.wgsl");
/// Index-generated textured square with scrolling UVs. Uniforms: [`QuadUniforms`].
pub const QUAD: &str = include_str!("shaders/quad.wgsl");

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MvpUniforms {
    pub mvp: Mtx,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct TexturedUniforms {
    pub mvp: Mtx,
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ViewProjectionUniforms {
    pub view: Mtx,
    pub projection: Mtx,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct TextUniforms {
    pub projection: Mtx,
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FlagUniforms {
    pub mvp: Mtx,
    pub wave_offset: f32,
    /// Grid cells across the flag.
    pub columns: f32,
    _pad: [f32; 2],
}

impl FlagUniforms {
    pub fn new(mvp: Mtx, wave_offset: f32, columns: u32) -> Self {
        Self {
            mvp,
            wave_offset,
            columns: columns as f32,
            _pad: [0.0; 2],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct QuadUniforms {
    pub mvp: Mtx,
    pub uv_offset: [f32; 2],
    pub uv_scale: [f32; 2],
}

/// A point light in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub position: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LitUniforms {
    pub model: Mtx,
    pub projection: Mtx,
    pub color: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub light_position: [f32; 4],
    pub lighting: u32,
    _pad: [u32; 3],
}

impl LitUniforms {
    /// Lit when `light` is given, plain texture times `color` otherwise.
    pub fn new(model: Mtx, projection: Mtx, color: [f32; 4], light: Option<&Light>) -> Self {
        let (ambient, diffuse, light_position, lighting) = match light {
            Some(light) => (light.ambient, light.diffuse, light.position, 1),
            None => ([0.0; 4], [0.0; 4], [0.0; 4], 0),
        };
        Self {
            model,
            projection,
            color,
            ambient,
            diffuse,
            light_position,
            lighting,
            _pad: [0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<MvpUniforms>(), 64);
        assert_eq!(std::mem::size_of::<TexturedUniforms>(), 80);
        assert_eq!(std::mem::size_of::<ViewProjectionUniforms>(), 128);
        assert_eq!(std::mem::size_of::<TextUniforms>(), 80);
        assert_eq!(std::mem::size_of::<FlagUniforms>(), 80);
        assert_eq!(std::mem::size_of::<QuadUniforms>(), 80);
        // WGSL rounds struct size up to a multiple of 16
        assert_eq!(std::mem::size_of::<LitUniforms>(), 208);
    }

    #[test]
    fn every_module_has_both_entry_points() {
        for source in [COLOR, TEXTURED, LIT, STARS, PARTICLES, TEXT, FLAG, CUBES, QUAD] {
            assert!(source.contains("fn vs("));
            assert!(source.contains("fn fs("));
        }
    }

    #[test]
    fn unlit_uniforms_disable_lighting() {
        let u = LitUniforms::new(Mtx::IDENTITY, Mtx::IDENTITY, [1.0; 4], None);
        assert_eq!(u.lighting, 0);
        let light = Light {
            ambient: [0.5, 0.5, 0.5, 1.0],
            diffuse: [1.0; 4],
            position: [0.0, 0.0, 2.0, 1.0],
        };
        let u = LitUniforms::new(Mtx::IDENTITY, Mtx::IDENTITY, [1.0; 4], Some(&light));
        assert_eq!(u.lighting, 1);
        assert_eq!(u.light_position, [0.0, 0.0, 2.0, 1.0]);
    }
}
