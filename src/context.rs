//! Per-window state handed to every [`Lesson`](crate::Lesson) callback.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytemuck::Pod;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::NeHeError;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, MeshIndex};
use crate::texture::{Filter, Texture};

/// Environment variable that overrides where `Data/` is looked up.
pub const DATA_DIR_ENV: &str = "NEHE_DATA_DIR";

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
}

/// Window, GPU and resource access for a running lesson.
pub struct NeHeContext {
    window: Arc<Window>,
    /// Surface, device and queue. Public so lessons can use wgpu directly.
    pub gpu: GpuContext,
    depth_format: Option<wgpu::TextureFormat>,
    depth: Option<DepthBuffer>,
    base_dir: PathBuf,
    title: String,
}

impl NeHeContext {
    pub(crate) fn new(
        window: Arc<Window>,
        gpu: GpuContext,
        depth_format: Option<wgpu::TextureFormat>,
        title: &str,
    ) -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let base_dir = resolve_base_dir(
            std::env::var_os(DATA_DIR_ENV).map(PathBuf::from),
            exe_dir,
            cwd,
            |dir| dir.join("Data").is_dir(),
        );
        log::info!("resources are read from {}", base_dir.display());

        let mut ctx = Self {
            window,
            gpu,
            depth_format,
            depth: None,
            base_dir,
            title: title.to_owned(),
        };
        let (width, height) = ctx.size();
        ctx.setup_depth_texture(width, height);
        ctx
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Surface size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.gpu.width(), self.gpu.height())
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.gpu.config.format
    }

    // ------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------

    /// Directory that resource paths are relative to.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn resource_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.base_dir.join(relative)
    }

    /// Read a whole resource file.
    pub fn read_resource(&self, relative: impl AsRef<Path>) -> Result<Vec<u8>, NeHeError> {
        let path = self.resource_path(relative);
        std::fs::read(&path).map_err(|e| NeHeError::resource(path, e))
    }

    /// Decode an image resource into an RGBA8 texture.
    ///
    /// `flip_vertical` puts the last image row at `v = 0`, which is what
    /// texture coordinates written for GL expect.
    pub fn load_texture(
        &self,
        relative: impl AsRef<Path>,
        flip_vertical: bool,
        gen_mipmaps: bool,
    ) -> Result<Texture, NeHeError> {
        let relative = relative.as_ref();
        let bytes = self.read_resource(relative)?;
        let mut image = image::load_from_memory(&bytes)?;
        if flip_vertical {
            image = image.flipv();
        }
        let image = image.to_rgba8();
        log::info!(
            "loaded {} ({}x{})",
            relative.display(),
            image.width(),
            image.height()
        );
        let label = relative.to_string_lossy();
        Ok(Texture::from_image(&self.gpu, &image, gen_mipmaps, &label))
    }

    /// Upload tightly packed RGBA8 pixels.
    pub fn texture_from_pixels(&self, pixels: &[u8], width: u32, height: u32, label: &str) -> Texture {
        Texture::from_rgba(&self.gpu, pixels, width, height, label)
    }

    pub fn create_sampler(&self, filter: Filter) -> wgpu::Sampler {
        filter.sampler(&self.gpu)
    }

    // ------------------------------------------------------------------
    // Shaders and buffers
    // ------------------------------------------------------------------

    pub fn create_shader(&self, label: &str, wgsl: &str) -> wgpu::ShaderModule {
        self.gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(wgsl.into()),
            })
    }

    /// Create a buffer initialised with `contents`.
    pub fn create_buffer<T: Pod>(
        &self,
        label: &str,
        contents: &[T],
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        self.gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(contents),
                usage,
            })
    }

    /// Upload a vertex and index buffer pair as a [`Mesh`].
    pub fn create_vertex_index_buffer<V: Pod, I: MeshIndex>(
        &self,
        label: &str,
        vertices: &[V],
        indices: &[I],
    ) -> Mesh {
        Mesh::new(&self.gpu, vertices, indices, label)
    }

    // ------------------------------------------------------------------
    // Depth
    // ------------------------------------------------------------------

    /// Format of the depth attachment, if the lesson asked for one.
    pub fn depth_format(&self) -> Option<wgpu::TextureFormat> {
        self.depth_format
    }

    pub fn depth_view(&self) -> Option<&wgpu::TextureView> {
        self.depth.as_ref().map(|depth| &depth.view)
    }

    /// (Re)create the depth texture at the given size.
    pub fn setup_depth_texture(&mut self, width: u32, height: u32) {
        let Some(format) = self.depth_format else {
            return;
        };
        let (width, height) = (width.max(1), height.max(1));

        let texture = self.gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        log::debug!("depth texture {format:?} {width}x{height}");

        self.depth = Some(DepthBuffer {
            _texture: texture,
            view,
            size: (width, height),
        });
    }

    /// Recreate the depth texture when it no longer matches `width x height`.
    pub fn ensure_depth_size(&mut self, width: u32, height: u32) {
        let current = self.depth.as_ref().map(|depth| depth.size);
        if self.depth_format.is_some() && current != Some((width.max(1), height.max(1))) {
            self.setup_depth_texture(width, height);
        }
    }
}

/// Pick the resource root.
///
/// An explicit directory wins. Otherwise the executable's directory is used
/// when it holds resources, and the working directory when it does not.
pub(crate) fn resolve_base_dir(
    explicit: Option<PathBuf>,
    exe_dir: Option<PathBuf>,
    cwd: PathBuf,
    has_resources: impl Fn(&Path) -> bool,
) -> PathBuf {
    if let Some(dir) = explicit.filter(|dir| !dir.as_os_str().is_empty()) {
        return dir;
    }
    match exe_dir {
        Some(dir) if has_resources(&dir) => dir,
        _ => cwd,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins() {
        let dir = resolve_base_dir(
            Some(PathBuf::from("/opt/nehe")),
            Some(PathBuf::from("/usr/bin")),
            PathBuf::from("/home"),
            |_| true,
        );
        assert_eq!(dir, PathBuf::from("/opt/nehe"));
    }

    #[test]
    fn exe_dir_used_only_when_it_has_data() {
        let exe = Some(PathBuf::from("/games/nehe"));
        let cwd = PathBuf::from("/work");

        let found = resolve_base_dir(None, exe.clone(), cwd.clone(), |d| d == Path::new("/games/nehe"));
        assert_eq!(found, PathBuf::from("/games/nehe"));

        let missing = resolve_base_dir(None, exe, cwd.clone(), |_| false);
        assert_eq!(missing, cwd);
    }

    #[test]
    fn empty_explicit_dir_is_ignored() {
        let dir = resolve_base_dir(Some(PathBuf::new()), None, PathBuf::from("/work"), |_| true);
        assert_eq!(dir, PathBuf::from("/work"));
    }
}
