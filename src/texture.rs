use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::gpu::GpuContext;

/// Texture format used for every image a lesson uploads.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Sampling presets the lessons cycle through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Filter {
    /// Point sampling of the base level.
    #[default]
    Nearest,
    /// Bilinear sampling of the base level.
    Linear,
    /// Bilinear within the nearest mip level.
    Mipmapped,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::Nearest, Filter::Linear, Filter::Mipmapped];

    /// The next preset, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Filter::Nearest => Filter::Linear,
            Filter::Linear => Filter::Mipmapped,
            Filter::Mipmapped => Filter::Nearest,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Create a repeating sampler for this preset.
    pub fn sampler(self, gpu: &GpuContext) -> wgpu::Sampler {
        let (filter, mipmap_filter, lod_max_clamp) = match self {
            Filter::Nearest => (wgpu::FilterMode::Nearest, wgpu::FilterMode::Nearest, 0.0),
            Filter::Linear => (wgpu::FilterMode::Linear, wgpu::FilterMode::Nearest, 0.0),
            Filter::Mipmapped => (wgpu::FilterMode::Linear, wgpu::FilterMode::Nearest, 32.0),
        };

        gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{self:?} Sampler")),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter,
            lod_max_clamp,
            ..Default::default()
        })
    }
}

/// A GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a single-level texture from tightly packed RGBA8 rows.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        Self::upload(gpu, data, width, height, 1, label)
    }

    /// Create a texture from a decoded image, optionally with a full mip chain.
    pub fn from_image(gpu: &GpuContext, image: &RgbaImage, mipmaps: bool, label: &str) -> Self {
        let (width, height) = image.dimensions();
        if mipmaps {
            let levels = mip_level_count(width, height);
            let data = build_mip_chain(image);
            Self::upload(gpu, &data, width, height, levels, label)
        } else {
            Self::upload(gpu, image.as_raw(), width, height, 1, label)
        }
    }

    pub fn mip_level_count(&self) -> u32 {
        self.texture.mip_level_count()
    }

    fn upload(
        gpu: &GpuContext,
        data: &[u8],
        width: u32,
        height: u32,
        mip_level_count: u32,
        label: &str,
    ) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: TEXTURE_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        log::debug!("uploaded texture {label} {width}x{height} ({mip_level_count} levels)");

        Self {
            texture,
            view,
            width,
            height,
        }
    }
}

/// Number of levels from `width x height` down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Every mip level of `image` concatenated, largest first.
pub fn build_mip_chain(image: &RgbaImage) -> Vec<u8> {
    let (mut width, mut height) = image.dimensions();
    let levels = mip_level_count(width, height);

    let mut data = image.as_raw().clone();
    let mut level = image.clone();
    for _ in 1..levels {
        width = (width / 2).max(1);
        height = (height / 2).max(1);
        level = imageops::resize(&level, width, height, FilterType::Triangle);
        data.extend_from_slice(level.as_raw());
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_counts() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(256, 64), 9);
        assert_eq!(mip_level_count(3, 5), 3);
    }

    #[test]
    fn mip_chain_holds_every_level() {
        let image = RgbaImage::from_pixel(8, 4, image::Rgba([10, 20, 30, 255]));
        let chain = build_mip_chain(&image);
        // 8x4 + 4x2 + 2x1 + 1x1
        assert_eq!(chain.len(), (32 + 8 + 2 + 1) * 4);
        // a flat colour stays flat after filtering
        assert_eq!(&chain[chain.len() - 4..], &[10, 20, 30, 255]);
    }

    #[test]
    fn filter_cycles_through_all_presets() {
        let mut f = Filter::default();
        for expected in Filter::ALL.iter().skip(1).chain(Filter::ALL.iter().take(1)) {
            f = f.next();
            assert_eq!(f, *expected);
        }
        assert_eq!(Filter::Mipmapped.index(), 2);
    }
}
