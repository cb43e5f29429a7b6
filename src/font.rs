//! Bitmap font text.
//!
//! [`FontAtlas`] rasterises printable ASCII with `fontdue` and packs the
//! glyphs into one single-channel texture. [`TextRenderer`] turns strings
//! into screen-space quads over that atlas, with `(0, 0)` at the top-left of
//! the window and `y` growing downwards.
//!
//! [`sheet_layout`] covers the older style of font: a pre-drawn texture of
//! 16x16 character cells, laid out in a bottom-left-origin pixel space.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use fontdue::{Font, FontSettings};

use crate::context::NeHeContext;
use crate::error::NeHeError;
use crate::gpu::GpuContext;
use crate::matrix::Mtx;
use crate::mesh::VertexTexture;
use crate::pipeline::{self, PipelineBuilder};
use crate::shaders::{self, TextUniforms};
use crate::uniform::UniformRing;

/// First and last rasterised characters.
const FIRST_CHAR: u8 = 0x20;
const LAST_CHAR: u8 = 0x7E;
const PADDING: u32 = 1;
const MIN_ATLAS_SIZE: u32 = 512;

/// Where a glyph lives in the atlas and how it sits on the baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphInfo {
    /// Atlas rectangle (u, v, width, height) normalised to [0, 1].
    pub uv: [f32; 4],
    pub width: u32,
    pub height: u32,
    /// Offset from the pen position to the glyph's left edge.
    pub offset_x: f32,
    /// Offset from the baseline up to the glyph's bottom edge.
    pub offset_y: f32,
    pub advance: f32,
}

/// One corner of a glyph quad.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TextVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl TextVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<TextVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &Self::ATTRIBUTES,
    };
}

/// Pre-rasterised glyphs in a GPU texture.
pub struct FontAtlas {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    glyphs: HashMap<char, GlyphInfo>,
    size: f32,
    line_height: f32,
}

impl FontAtlas {
    /// Rasterise `font_data` (TTF/OTF) at `size` pixels.
    pub fn new(gpu: &GpuContext, font_data: &[u8], size: f32) -> Result<Self, NeHeError> {
        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| NeHeError::Font(e.to_owned()))?;

        let rasterized: Vec<(char, fontdue::Metrics, Vec<u8>)> = (FIRST_CHAR..=LAST_CHAR)
            .map(char::from)
            .map(|c| {
                let (metrics, bitmap) = font.rasterize(c, size);
                (c, metrics, bitmap)
            })
            .collect();

        let sizes: Vec<(u32, u32)> = rasterized
            .iter()
            .map(|(_, m, _)| (m.width as u32, m.height as u32))
            .collect();
        let packing = pack_glyphs(&sizes);
        let (atlas_width, atlas_height) = (packing.width, packing.height);

        let mut atlas_data = vec![0u8; (atlas_width * atlas_height) as usize];
        let mut glyphs = HashMap::with_capacity(rasterized.len());

        for ((c, metrics, bitmap), &(x, y)) in rasterized.iter().zip(&packing.positions) {
            let (glyph_w, glyph_h) = (metrics.width as u32, metrics.height as u32);

            for gy in 0..glyph_h {
                let src = (gy * glyph_w) as usize;
                let dst = ((y + gy) * atlas_width + x) as usize;
                atlas_data[dst..dst + glyph_w as usize]
                    .copy_from_slice(&bitmap[src..src + glyph_w as usize]);
            }

            glyphs.insert(
                *c,
                GlyphInfo {
                    uv: [
                        x as f32 / atlas_width as f32,
                        y as f32 / atlas_height as f32,
                        glyph_w as f32 / atlas_width as f32,
                        glyph_h as f32 / atlas_height as f32,
                    ],
                    width: glyph_w,
                    height: glyph_h,
                    offset_x: metrics.xmin as f32,
                    offset_y: metrics.ymin as f32,
                    advance: metrics.advance_width,
                },
            );
        }

        let extent = wgpu::Extent3d {
            width: atlas_width,
            height: atlas_height,
            depth_or_array_layers: 1,
        };
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Font Atlas"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &atlas_data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(atlas_width),
                rows_per_image: Some(atlas_height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Font Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let line_height = font
            .horizontal_line_metrics(size)
            .map(|m| m.new_line_size)
            .unwrap_or(size * 1.2);
        log::debug!("font atlas {atlas_width}x{atlas_height} at {size}px");

        Ok(Self {
            texture,
            view,
            sampler,
            glyphs,
            size,
            line_height,
        })
    }

    pub fn glyph(&self, c: char) -> Option<&GlyphInfo> {
        self.glyphs.get(&c)
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Width of a single line of text.
    pub fn measure(&self, text: &str) -> f32 {
        text.chars()
            .filter_map(|c| self.glyphs.get(&c))
            .map(|g| g.advance)
            .sum()
    }

    /// Quads for `text` with the baseline of the first line at `(x, y)`.
    pub fn layout(&self, text: &str, x: f32, y: f32) -> Vec<TextVertex> {
        layout_glyphs(&self.glyphs, self.line_height, text, x, y)
    }
}

struct Packing {
    width: u32,
    height: u32,
    positions: Vec<(u32, u32)>,
}

/// Shelf-pack glyph rectangles, doubling the smaller side until all fit.
fn pack_glyphs(sizes: &[(u32, u32)]) -> Packing {
    let (mut width, mut height) = (MIN_ATLAS_SIZE, MIN_ATLAS_SIZE);
    loop {
        if let Some(positions) = try_pack(sizes, width, height) {
            return Packing {
                width,
                height,
                positions,
            };
        }
        if width <= height {
            width *= 2;
        } else {
            height *= 2;
        }
    }
}

fn try_pack(sizes: &[(u32, u32)], width: u32, height: u32) -> Option<Vec<(u32, u32)>> {
    let mut positions = Vec::with_capacity(sizes.len());
    let (mut x, mut y, mut row_height) = (PADDING, PADDING, 0);

    for &(w, h) in sizes {
        if w + 2 * PADDING > width {
            return None;
        }
        if x + w + PADDING > width {
            x = PADDING;
            y += row_height + PADDING;
            row_height = 0;
        }
        if y + h + PADDING > height {
            return None;
        }
        positions.push((x, y));
        x += w + PADDING;
        row_height = row_height.max(h);
    }
    Some(positions)
}

/// Two triangles per visible glyph. `\n` starts a new line.
fn layout_glyphs(
    glyphs: &HashMap<char, GlyphInfo>,
    line_height: f32,
    text: &str,
    x: f32,
    y: f32,
) -> Vec<TextVertex> {
    let mut vertices = Vec::with_capacity(text.len() * 6);
    let (mut pen_x, mut baseline) = (x, y);

    for c in text.chars() {
        if c == '\n' {
            pen_x = x;
            baseline += line_height;
            continue;
        }
        let Some(glyph) = glyphs.get(&c) else {
            continue;
        };

        if glyph.width > 0 && glyph.height > 0 {
            let left = (pen_x + glyph.offset_x).round();
            let bottom = (baseline - glyph.offset_y).round();
            let right = left + glyph.width as f32;
            let top = bottom - glyph.height as f32;

            let [u, v, uw, vh] = glyph.uv;
            let corner = |px: f32, py: f32, tu: f32, tv: f32| TextVertex {
                position: [px, py],
                uv: [tu, tv],
            };
            let tl = corner(left, top, u, v);
            let tr = corner(right, top, u + uw, v);
            let bl = corner(left, bottom, u, v + vh);
            let br = corner(right, bottom, u + uw, v + vh);
            vertices.extend_from_slice(&[tl, bl, br, br, tr, tl]);
        }
        pen_x += glyph.advance;
    }
    vertices
}

/// Size in pixels of one glyph sheet cell.
pub const SHEET_GLYPH_SIZE: f32 = 16.0;
/// Pen advance per glyph sheet character.
pub const SHEET_ADVANCE: f32 = 10.0;
/// Longest string [`sheet_layout`] lays out.
pub const SHEET_MAX_CHARS: usize = 255;
const SHEET_CELLS: u32 = 16;
const SHEET_SET_LEN: u32 = 128;

/// Append quads for `text` from a 16x16 glyph sheet, pen at `(x, y)`.
///
/// The sheet holds two sets of 128 characters starting at `' '`; `set` 0 is
/// the top half. Characters outside `0x20..0x80` are skipped without
/// advancing the pen. Returns the range of `indices` that was appended.
pub fn sheet_layout(
    text: &str,
    x: f32,
    y: f32,
    set: u32,
    vertices: &mut Vec<VertexTexture>,
    indices: &mut Vec<u16>,
) -> std::ops::Range<u32> {
    let first_index = indices.len() as u32;
    let cell = 1.0 / SHEET_CELLS as f32;
    let mut pen_x = x;

    let printable = text
        .chars()
        .filter(|c| (FIRST_CHAR as char..'\u{80}').contains(c))
        .take(SHEET_MAX_CHARS);
    for c in printable {
        let index = c as u32 - FIRST_CHAR as u32 + (set & 1) * SHEET_SET_LEN;
        let (row, col) = (index / SHEET_CELLS, index % SHEET_CELLS);
        // rows count down from the top of the sheet
        let u = col as f32 * cell;
        let v = 1.0 - cell - row as f32 * cell;

        let base = vertices.len() as u16;
        let (right, top) = (pen_x + SHEET_GLYPH_SIZE, y + SHEET_GLYPH_SIZE);
        vertices.extend_from_slice(&[
            VertexTexture::new([pen_x, y, 0.0], [u, v]),
            VertexTexture::new([right, y, 0.0], [u + cell, v]),
            VertexTexture::new([right, top, 0.0], [u + cell, v + cell]),
            VertexTexture::new([pen_x, top, 0.0], [u, v + cell]),
        ]);
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        pen_x += SHEET_ADVANCE;
    }
    first_index..indices.len() as u32
}

/// Draws text from a [`FontAtlas`] in window pixel coordinates.
pub struct TextRenderer {
    atlas: FontAtlas,
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformRing<TextUniforms>,
    atlas_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    vertex_cursor: usize,
}

impl TextRenderer {
    /// Room for this many glyphs per frame.
    pub const MAX_GLYPHS: usize = 4096;

    pub fn new(ctx: &NeHeContext, atlas: FontAtlas) -> Self {
        let device = &ctx.gpu.device;
        let shader = ctx.create_shader("Text Shader", shaders::TEXT);
        let uniforms = UniformRing::new(&ctx.gpu, 16, "Text Uniforms");
        let texture_layout = pipeline::texture_bind_group_layout(device, "Font Atlas Layout");

        let mut builder = PipelineBuilder::new("Text Pipeline", &shader, ctx.surface_format())
            .vertex(TextVertex::LAYOUT)
            .bind_group(uniforms.layout())
            .bind_group(&texture_layout)
            .blend(wgpu::BlendState::ALPHA_BLENDING);
        if let Some(format) = ctx.depth_format() {
            builder = builder.depth_disabled(format);
        }
        let pipeline = builder.build(device);

        let atlas_bind_group =
            pipeline::texture_bind_group(device, &texture_layout, &atlas.view, &atlas.sampler);

        let vertex_capacity = Self::MAX_GLYPHS * 6;
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Text Vertices"),
            size: (vertex_capacity * std::mem::size_of::<TextVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            atlas,
            pipeline,
            uniforms,
            atlas_bind_group,
            vertex_buffer,
            vertex_capacity,
            vertex_cursor: 0,
        }
    }

    pub fn atlas(&self) -> &FontAtlas {
        &self.atlas
    }

    /// Start a new frame. Call before the first [`TextRenderer::draw`].
    pub fn reset(&mut self) {
        self.uniforms.reset();
        self.vertex_cursor = 0;
    }

    /// Draw `text` tinted by `color` with its baseline at `(x, y)` pixels.
    pub fn draw(
        &mut self,
        ctx: &NeHeContext,
        pass: &mut wgpu::RenderPass<'_>,
        text: &str,
        x: f32,
        y: f32,
        color: [f32; 4],
    ) {
        let mut vertices = self.atlas.layout(text, x, y);
        let free = self.vertex_capacity - self.vertex_cursor;
        if vertices.len() > free {
            log::warn!("text buffer full, dropping {} glyphs", (vertices.len() - free) / 6);
            vertices.truncate(free);
        }
        if vertices.is_empty() {
            return;
        }

        let stride = std::mem::size_of::<TextVertex>() as u64;
        let start = self.vertex_cursor as u64 * stride;
        ctx.gpu
            .queue
            .write_buffer(&self.vertex_buffer, start, bytemuck::cast_slice(&vertices));

        let (width, height) = ctx.size();
        let uniforms = TextUniforms {
            projection: Mtx::orthographic_2d(0.0, width as f32, height as f32, 0.0),
            color,
        };

        pass.set_pipeline(&self.pipeline);
        self.uniforms.bind(&ctx.gpu, pass, 0, &uniforms);
        pass.set_bind_group(1, &self.atlas_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(start..));
        pass.draw(0..vertices.len() as u32, 0..1);

        self.vertex_cursor += vertices.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(width: u32, height: u32, offset_y: f32, advance: f32) -> GlyphInfo {
        GlyphInfo {
            uv: [0.0, 0.0, 0.5, 0.5],
            width,
            height,
            offset_x: 1.0,
            offset_y,
            advance,
        }
    }

    fn glyphs() -> HashMap<char, GlyphInfo> {
        HashMap::from([
            ('A', glyph(10, 12, 0.0, 11.0)),
            ('g', glyph(8, 10, -3.0, 9.0)),
            (' ', glyph(0, 0, 0.0, 6.0)),
        ])
    }

    #[test]
    fn glyphs_sit_on_the_baseline() {
        let v = layout_glyphs(&glyphs(), 20.0, "A", 100.0, 50.0);
        assert_eq!(v.len(), 6);
        // top-left then bottom-left
        assert_eq!(v[0].position, [101.0, 38.0]);
        assert_eq!(v[1].position, [101.0, 50.0]);
        assert_eq!(v[2].position, [111.0, 50.0]);
        assert_eq!(v[1].uv, [0.0, 0.5]);
    }

    #[test]
    fn descenders_drop_below_the_baseline() {
        let v = layout_glyphs(&glyphs(), 20.0, "g", 0.0, 50.0);
        assert_eq!(v[1].position[1], 53.0);
    }

    #[test]
    fn spaces_advance_without_quads() {
        let v = layout_glyphs(&glyphs(), 20.0, "A A", 0.0, 50.0);
        assert_eq!(v.len(), 12);
        // second A starts after 11 + 6
        assert_eq!(v[6].position[0], 18.0);
    }

    #[test]
    fn newline_moves_down_one_line() {
        let v = layout_glyphs(&glyphs(), 20.0, "A\nA", 0.0, 50.0);
        assert_eq!(v[6].position, [1.0, 58.0]);
    }

    #[test]
    fn unknown_characters_are_skipped() {
        assert!(layout_glyphs(&glyphs(), 20.0, "\u{e9}", 0.0, 0.0).is_empty());
    }

    #[test]
    fn packing_wraps_rows_and_grows() {
        let packed = pack_glyphs(&[(300, 20), (300, 30), (100, 10)]);
        assert_eq!((packed.width, packed.height), (512, 512));
        assert_eq!(packed.positions[0], (1, 1));
        // second glyph does not fit beside the first
        assert_eq!(packed.positions[1], (1, 22));
        assert_eq!(packed.positions[2], (302, 22));

        let big = pack_glyphs(&[(600, 10)]);
        assert_eq!((big.width, big.height), (1024, 512));
    }

    #[test]
    fn sheet_cells_count_down_from_the_top() {
        let (mut vertices, mut indices) = (Vec::new(), Vec::new());
        let range = sheet_layout("A", 10.0, 20.0, 0, &mut vertices, &mut indices);
        assert_eq!(range, 0..6);
        // 'A' is cell 33: row 2, column 1
        assert_eq!(vertices[0].position, [10.0, 20.0, 0.0]);
        assert_eq!(vertices[0].uv, [0.0625, 0.8125]);
        assert_eq!(vertices[2].position, [26.0, 36.0, 0.0]);
        assert_eq!(vertices[2].uv, [0.125, 0.875]);
    }

    #[test]
    fn second_sheet_set_uses_the_lower_half() {
        let (mut vertices, mut indices) = (Vec::new(), Vec::new());
        sheet_layout(" ", 0.0, 0.0, 1, &mut vertices, &mut indices);
        // cell 128: row 8, column 0
        assert_eq!(vertices[0].uv, [0.0, 0.4375]);
    }

    #[test]
    fn sheet_strings_share_buffers() {
        let (mut vertices, mut indices) = (Vec::new(), Vec::new());
        sheet_layout("ab", 0.0, 0.0, 0, &mut vertices, &mut indices);
        let second = sheet_layout("a\tb", 0.0, 0.0, 0, &mut vertices, &mut indices);
        assert_eq!(second, 12..24);
        assert_eq!(indices[12], 8);
        // the tab is skipped without moving the pen
        assert_eq!(vertices[12].position[0], 10.0);
    }

    #[test]
    fn sheet_strings_are_capped() {
        let (mut vertices, mut indices) = (Vec::new(), Vec::new());
        let long = "x".repeat(SHEET_MAX_CHARS + 10);
        let range = sheet_layout(&long, 0.0, 0.0, 0, &mut vertices, &mut indices);
        assert_eq!(range.len(), SHEET_MAX_CHARS * 6);
    }
}
