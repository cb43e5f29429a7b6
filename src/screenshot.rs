//! Frame capture to BMP files.
//!
//! The copy out of the swapchain texture is recorded into the frame's own
//! command encoder, so the captured image is exactly what gets presented.
//! Once the frame is submitted the staging buffer is mapped, unpadded and
//! written next to the working directory as `<title>-<n>.bmp`.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;

use crate::gpu::GpuContext;

const BYTES_PER_PIXEL: u32 = 4;

#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("surface format {0:?} cannot be saved")]
    UnsupportedFormat(wgpu::TextureFormat),
    #[error("failed to wait for the GPU: {0}")]
    Poll(#[from] wgpu::PollError),
    #[error("failed to map screenshot buffer: {0}")]
    Map(#[from] wgpu::BufferAsyncError),
    #[error("screenshot buffer was dropped before mapping finished")]
    Disconnected,
    #[error("screenshot buffer is smaller than the frame")]
    ShortRead,
    #[error("failed to write screenshot: {0}")]
    Image(#[from] image::ImageError),
}

/// A swapchain copy waiting for its frame to be submitted.
pub(crate) struct PendingCapture {
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    padded_bytes_per_row: u32,
    swap_red_blue: bool,
}

/// Record a copy of `texture` into `encoder`.
pub(crate) fn record(
    gpu: &GpuContext,
    encoder: &mut wgpu::CommandEncoder,
    texture: &wgpu::Texture,
) -> Result<PendingCapture, ScreenshotError> {
    let format = texture.format();
    let swap_red_blue = match format {
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => true,
        wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => false,
        other => return Err(ScreenshotError::UnsupportedFormat(other)),
    };

    let (width, height) = (texture.width(), texture.height());
    let padded_bytes_per_row = padded_bytes_per_row(width);

    let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Screenshot Staging Buffer"),
        size: padded_bytes_per_row as u64 * height as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );

    Ok(PendingCapture {
        buffer,
        width,
        height,
        padded_bytes_per_row,
        swap_red_blue,
    })
}

impl PendingCapture {
    /// Block until the copy lands and return the frame as RGBA.
    pub(crate) fn read(self, device: &wgpu::Device) -> Result<RgbaImage, ScreenshotError> {
        let slice = self.buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device.poll(wgpu::PollType::wait_indefinitely())?;
        rx.recv().map_err(|_| ScreenshotError::Disconnected)??;

        let mut pixels = {
            let mapped = slice.get_mapped_range();
            unpad_rows(&mapped, self.padded_bytes_per_row, self.width, self.height)
        };
        self.buffer.unmap();

        if self.swap_red_blue {
            bgra_to_rgba(&mut pixels);
        }
        // the swapchain alpha is whatever the clear colour left behind
        for px in pixels.chunks_exact_mut(4) {
            px[3] = 255;
        }

        RgbaImage::from_raw(self.width, self.height, pixels).ok_or(ScreenshotError::ShortRead)
    }
}

/// Read back a recorded capture and save it for `title`.
pub(crate) fn save(
    capture: PendingCapture,
    device: &wgpu::Device,
    title: &str,
) -> Result<PathBuf, ScreenshotError> {
    let image = capture.read(device)?;
    let path = next_free_path(Path::new("."), &sanitize_title(title), |p| p.exists());
    image.save_with_format(&path, image::ImageFormat::Bmp)?;
    Ok(path)
}

fn padded_bytes_per_row(width: u32) -> u32 {
    (width * BYTES_PER_PIXEL).next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
}

fn unpad_rows(data: &[u8], padded_bytes_per_row: u32, width: u32, height: u32) -> Vec<u8> {
    let row_bytes = (width * BYTES_PER_PIXEL) as usize;
    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in data.chunks(padded_bytes_per_row as usize).take(height as usize) {
        pixels.extend_from_slice(&row[..row_bytes]);
    }
    pixels
}

fn bgra_to_rgba(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
}

/// Window title to a file stem: lowercase alphanumerics joined by single `_`.
fn sanitize_title(title: &str) -> String {
    let stem = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    if stem.is_empty() { "screenshot".to_owned() } else { stem }
}

fn next_free_path(dir: &Path, stem: &str, exists: impl Fn(&Path) -> bool) -> PathBuf {
    (1u32..)
        .map(|n| dir.join(format!("{stem}-{n}.bmp")))
        .find(|path| !exists(path))
        .unwrap_or_else(|| dir.join(format!("{stem}.bmp")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_padded_to_copy_alignment() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(640), 2560);
        assert_eq!(padded_bytes_per_row(65), 512);
    }

    #[test]
    fn unpad_drops_row_padding() {
        // two 1-pixel rows padded to 8 bytes
        let data = [1, 2, 3, 4, 0, 0, 0, 0, 5, 6, 7, 8, 0, 0, 0, 0];
        assert_eq!(unpad_rows(&data, 8, 1, 2), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn bgra_swaps_red_and_blue() {
        let mut px = [10, 20, 30, 40];
        bgra_to_rgba(&mut px);
        assert_eq!(px, [30, 20, 10, 40]);
    }

    #[test]
    fn titles_become_file_stems() {
        assert_eq!(
            sanitize_title("NeHe's Textures, Lighting & Keyboard Tutorial"),
            "nehe_s_textures_lighting_keyboard_tutorial"
        );
        assert_eq!(sanitize_title("!!!"), "screenshot");
    }

    #[test]
    fn first_unused_number_is_picked() {
        let taken = [PathBuf::from("out/a-1.bmp"), PathBuf::from("out/a-2.bmp")];
        let path = next_free_path(Path::new("out"), "a", |p| taken.iter().any(|t| t == p));
        assert_eq!(path, PathBuf::from("out/a-3.bmp"));
    }
}
