//! Headerless RGB image blobs and a software rectangle blit.
//!
//! Raw files are `width * height` packed RGB triples with no header. They are
//! expanded to RGBA8 with an opaque alpha channel on load.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use thiserror::Error;

const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, Error)]
pub enum RawImageError {
    #[error("failed to read raw image: {0}")]
    Io(#[from] io::Error),
    #[error(
        "blit of {w}x{h} from ({src_x}, {src_y}) to ({dst_x}, {dst_y}) falls outside the source or destination image"
    )]
    OutOfBounds {
        src_x: u32,
        src_y: u32,
        w: u32,
        h: u32,
        dst_x: u32,
        dst_y: u32,
    },
}

/// How source pixels are combined with the destination during a blit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlitMode {
    /// Source replaces destination.
    Copy,
    /// `(s * a + d * (255 - a)) >> 8` on every channel, alpha included.
    ///
    /// The shift divides by 256 instead of 255, so a fully opaque blend tops
    /// out at 254. Kept so composited textures match the classic lesson
    /// pixel for pixel.
    Legacy(i32),
    /// `(s * a + d * (255 - a)) / 255`, rounded to nearest.
    Exact(i32),
}

/// A rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

/// An RGBA8 image held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RawImage {
    /// A fully transparent black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
        }
    }

    /// Opens and reads a raw RGB file of the given dimensions.
    pub fn open(path: impl AsRef<Path>, width: u32, height: u32) -> Result<Self, RawImageError> {
        let file = File::open(path)?;
        Self::read_rgb(BufReader::new(file), width, height)
    }

    /// Reads `width * height` RGB triples.
    ///
    /// The first row in the stream becomes the last row of the image, so that
    /// row zero is the bottom of the picture as texture coordinates expect.
    pub fn read_rgb(mut reader: impl Read, width: u32, height: u32) -> Result<Self, RawImageError> {
        let mut image = Self::new(width, height);
        let stride = image.stride();
        let mut rgb = vec![0u8; width as usize * 3];

        for row in (0..height as usize).rev() {
            reader.read_exact(&mut rgb)?;
            let dst = &mut image.pixels[row * stride..(row + 1) * stride];
            for (px, src) in dst.chunks_exact_mut(BYTES_PER_PIXEL).zip(rgb.chunks_exact(3)) {
                px[..3].copy_from_slice(src);
                px[3] = 0xFF;
            }
        }
        Ok(image)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tightly packed RGBA8 rows, row zero first.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The RGBA value at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.offset(x, y);
        self.pixels[i..i + BYTES_PER_PIXEL].copy_from_slice(&rgba);
    }

    /// Copies `src_rect` of `src` into `self` with its top-left at
    /// `(dst_x, dst_y)`.
    pub fn blit(
        &mut self,
        src: &RawImage,
        src_rect: Rect,
        dst_x: u32,
        dst_y: u32,
        mode: BlitMode,
    ) -> Result<(), RawImageError> {
        let fits = |x: u32, w: u32, limit: u32| x.checked_add(w).is_some_and(|end| end <= limit);
        if !fits(src_rect.x, src_rect.w, src.width)
            || !fits(src_rect.y, src_rect.h, src.height)
            || !fits(dst_x, src_rect.w, self.width)
            || !fits(dst_y, src_rect.h, self.height)
        {
            return Err(RawImageError::OutOfBounds {
                src_x: src_rect.x,
                src_y: src_rect.y,
                w: src_rect.w,
                h: src_rect.h,
                dst_x,
                dst_y,
            });
        }

        let span = src_rect.w as usize * BYTES_PER_PIXEL;
        for row in 0..src_rect.h {
            let s = src.offset(src_rect.x, src_rect.y + row);
            let d = self.offset(dst_x, dst_y + row);
            let src_row = &src.pixels[s..s + span];
            let dst_row = &mut self.pixels[d..d + span];

            match mode {
                BlitMode::Copy => dst_row.copy_from_slice(src_row),
                BlitMode::Legacy(alpha) => {
                    let a = alpha.clamp(0, 0xFF) as u32;
                    for (dst, &src) in dst_row.iter_mut().zip(src_row) {
                        *dst = ((src as u32 * a + *dst as u32 * (0xFF - a)) >> 8) as u8;
                    }
                }
                BlitMode::Exact(alpha) => {
                    let a = alpha.clamp(0, 0xFF) as u32;
                    for (dst, &src) in dst_row.iter_mut().zip(src_row) {
                        *dst = ((src as u32 * a + *dst as u32 * (0xFF - a) + 127) / 0xFF) as u8;
                    }
                }
            }
        }
        Ok(())
    }

    fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride() + x as usize * BYTES_PER_PIXEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RawImage {
        let mut img = RawImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                img.set_pixel(x, y, rgba);
            }
        }
        img
    }

    #[test]
    fn reads_rows_bottom_up_with_opaque_alpha() {
        // 2x2: first stored row red/green, second blue/white
        let data = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let img = RawImage::read_rgb(&data[..], 2, 2).unwrap();
        assert_eq!(img.pixel(0, 1), [255, 0, 0, 255]);
        assert_eq!(img.pixel(1, 1), [0, 255, 0, 255]);
        assert_eq!(img.pixel(0, 0), [0, 0, 255, 255]);
        assert_eq!(img.pixel(1, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn short_read_is_an_error() {
        let data = [1u8, 2, 3];
        let err = RawImage::read_rgb(&data[..], 2, 2).unwrap_err();
        assert!(matches!(err, RawImageError::Io(_)));
    }

    #[test]
    fn copy_blit_moves_rectangle() {
        let src = solid(4, 4, [10, 20, 30, 255]);
        let mut dst = RawImage::new(4, 4);
        dst.blit(&src, Rect::new(1, 1, 2, 2), 2, 0, BlitMode::Copy).unwrap();
        assert_eq!(dst.pixel(2, 0), [10, 20, 30, 255]);
        assert_eq!(dst.pixel(3, 1), [10, 20, 30, 255]);
        assert_eq!(dst.pixel(1, 0), [0, 0, 0, 0]);
        assert_eq!(dst.pixel(2, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn legacy_blend_never_reaches_full_intensity() {
        let src = solid(1, 1, [255, 255, 255, 255]);
        let mut dst = solid(1, 1, [255, 255, 255, 255]);
        dst.blit(&src, Rect::new(0, 0, 1, 1), 0, 0, BlitMode::Legacy(255)).unwrap();
        assert_eq!(dst.pixel(0, 0), [254, 254, 254, 254]);
    }

    #[test]
    fn legacy_blend_half_alpha() {
        let src = solid(1, 1, [200, 100, 0, 255]);
        let mut dst = solid(1, 1, [0, 100, 200, 255]);
        dst.blit(&src, Rect::new(0, 0, 1, 1), 0, 0, BlitMode::Legacy(127)).unwrap();
        // (200*127 + 0*128) >> 8 = 99, (100*127 + 100*128) >> 8 = 99,
        // (0*127 + 200*128) >> 8 = 100, (255*127 + 255*128) >> 8 = 254
        assert_eq!(dst.pixel(0, 0), [99, 99, 100, 254]);
    }

    #[test]
    fn exact_blend_preserves_opaque_white() {
        let src = solid(1, 1, [255, 255, 255, 255]);
        let mut dst = solid(1, 1, [255, 255, 255, 255]);
        dst.blit(&src, Rect::new(0, 0, 1, 1), 0, 0, BlitMode::Exact(255)).unwrap();
        assert_eq!(dst.pixel(0, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn blend_alpha_is_clamped() {
        let src = solid(1, 1, [100, 100, 100, 100]);
        let mut a = solid(1, 1, [0, 0, 0, 0]);
        let mut b = a.clone();
        a.blit(&src, Rect::new(0, 0, 1, 1), 0, 0, BlitMode::Exact(1000)).unwrap();
        b.blit(&src, Rect::new(0, 0, 1, 1), 0, 0, BlitMode::Exact(255)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn out_of_bounds_blit_is_rejected() {
        let src = RawImage::new(256, 256);
        let mut dst = RawImage::new(256, 256);
        assert!(dst
            .blit(&src, Rect::new(127, 127, 128, 128), 64, 64, BlitMode::Legacy(127))
            .is_ok());
        let err = dst
            .blit(&src, Rect::new(200, 0, 100, 10), 0, 0, BlitMode::Copy)
            .unwrap_err();
        assert!(matches!(err, RawImageError::OutOfBounds { .. }));
        assert!(dst
            .blit(&src, Rect::new(0, 0, 100, 100), 200, 0, BlitMode::Copy)
            .is_err());
    }
}
