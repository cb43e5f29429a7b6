//! Vertex formats and GPU-resident indexed meshes.
//!
//! | Type | Attributes (shader location) | Stride |
//! |------|------------------------------|--------|
//! | [`VertexColor`] | position (0), color (1) | 28 |
//! | [`VertexTexture`] | position (0), uv (1) | 20 |
//! | [`VertexNormalTexture`] | position (0), normal (1), uv (2) | 32 |

use bytemuck::Pod;
use wgpu::util::DeviceExt;

use crate::gpu::GpuContext;

/// A vertex with a position and an RGBA colour.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VertexColor {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl VertexColor {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<VertexColor>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &Self::ATTRIBUTES,
    };

    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

/// A vertex with a position and texture coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VertexTexture {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl VertexTexture {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<VertexTexture>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &Self::ATTRIBUTES,
    };

    pub const fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }
}

/// A vertex with position, surface normal and texture coordinates.
///
/// This is the format quadrics are generated in.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VertexNormalTexture {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl VertexNormalTexture {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<VertexNormalTexture>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &Self::ATTRIBUTES,
    };

    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Index element types a [`Mesh`] can be built from.
pub trait MeshIndex: Pod {
    const FORMAT: wgpu::IndexFormat;
}

impl MeshIndex for u16 {
    const FORMAT: wgpu::IndexFormat = wgpu::IndexFormat::Uint16;
}

impl MeshIndex for u32 {
    const FORMAT: wgpu::IndexFormat = wgpu::IndexFormat::Uint32;
}

/// GPU-resident indexed triangle geometry.
#[derive(Debug)]
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_format: wgpu::IndexFormat,
    pub index_count: u32,
}

impl Mesh {
    /// Upload vertices and indices into immutable buffers.
    pub fn new<V: Pod, I: MeshIndex>(
        gpu: &GpuContext,
        vertices: &[V],
        indices: &[I],
        label: &str,
    ) -> Self {
        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertices")),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Indices")),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            vertex_buffer,
            index_buffer,
            index_format: I::FORMAT,
            index_count: indices.len() as u32,
        }
    }

    /// Allocate writable buffers for geometry that changes every frame.
    ///
    /// The mesh draws nothing until [`Mesh::update`] is called.
    pub fn with_capacity<V: Pod, I: MeshIndex>(
        gpu: &GpuContext,
        vertex_capacity: usize,
        index_capacity: usize,
        label: &str,
    ) -> Self {
        let vertex_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Vertices")),
            size: (vertex_capacity * std::mem::size_of::<V>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let index_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Indices")),
            size: (index_capacity * std::mem::size_of::<I>()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_format: I::FORMAT,
            index_count: 0,
        }
    }

    /// Overwrite the start of the buffers and draw only what was written.
    ///
    /// Data beyond the buffer capacity is a wgpu validation error.
    pub fn update<V: Pod, I: MeshIndex>(&mut self, gpu: &GpuContext, vertices: &[V], indices: &[I]) {
        debug_assert_eq!(I::FORMAT, self.index_format);
        gpu.queue
            .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
        // write_buffer needs a multiple of four bytes
        let mut index_bytes = bytemuck::cast_slice::<I, u8>(indices).to_vec();
        index_bytes.resize(index_bytes.len().next_multiple_of(4), 0);
        gpu.queue.write_buffer(&self.index_buffer, 0, &index_bytes);
        self.index_count = indices.len() as u32;
    }

    /// Bind the buffers and issue one indexed draw.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.draw_range(pass, 0..self.index_count);
    }

    /// Draw a sub-range of the index buffer, e.g. one of several shapes
    /// sharing a mesh.
    pub fn draw_range(&self, pass: &mut wgpu::RenderPass<'_>, indices: std::ops::Range<u32>) {
        self.draw_indexed(pass, indices, 0..1);
    }

    /// Draw the whole mesh once per instance. The caller binds the instance
    /// buffer at slot 1.
    pub fn draw_instanced(&self, pass: &mut wgpu::RenderPass<'_>, instances: std::ops::Range<u32>) {
        self.draw_indexed(pass, 0..self.index_count, instances);
    }

    fn draw_indexed(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        indices: std::ops::Range<u32>,
        instances: std::ops::Range<u32>,
    ) {
        if indices.is_empty() || instances.is_empty() {
            return;
        }
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), self.index_format);
        pass.draw_indexed(indices, 0, instances);
    }
}

/// A 2x2x2 cube with per-face normals and texture coordinates.
#[rustfmt::skip]
pub const LIT_CUBE_VERTICES: [VertexNormalTexture; 24] = [
    // Front
    VertexNormalTexture::new([-1.0, -1.0,  1.0], [ 0.0,  0.0,  1.0], [0.0, 0.0]),
    VertexNormalTexture::new([ 1.0, -1.0,  1.0], [ 0.0,  0.0,  1.0], [1.0, 0.0]),
    VertexNormalTexture::new([ 1.0,  1.0,  1.0], [ 0.0,  0.0,  1.0], [1.0, 1.0]),
    VertexNormalTexture::new([-1.0,  1.0,  1.0], [ 0.0,  0.0,  1.0], [0.0, 1.0]),
    // Back
    VertexNormalTexture::new([-1.0, -1.0, -1.0], [ 0.0,  0.0, -1.0], [1.0, 0.0]),
    VertexNormalTexture::new([-1.0,  1.0, -1.0], [ 0.0,  0.0, -1.0], [1.0, 1.0]),
    VertexNormalTexture::new([ 1.0,  1.0, -1.0], [ 0.0,  0.0, -1.0], [0.0, 1.0]),
    VertexNormalTexture::new([ 1.0, -1.0, -1.0], [ 0.0,  0.0, -1.0], [0.0, 0.0]),
    // Top
    VertexNormalTexture::new([-1.0,  1.0, -1.0], [ 0.0,  1.0,  0.0], [0.0, 1.0]),
    VertexNormalTexture::new([-1.0,  1.0,  1.0], [ 0.0,  1.0,  0.0], [0.0, 0.0]),
    VertexNormalTexture::new([ 1.0,  1.0,  1.0], [ 0.0,  1.0,  0.0], [1.0, 0.0]),
    VertexNormalTexture::new([ 1.0,  1.0, -1.0], [ 0.0,  1.0,  0.0], [1.0, 1.0]),
    // Bottom
    VertexNormalTexture::new([-1.0, -1.0, -1.0], [ 0.0, -1.0,  0.0], [1.0, 1.0]),
    VertexNormalTexture::new([ 1.0, -1.0, -1.0], [ 0.0, -1.0,  0.0], [0.0, 1.0]),
    VertexNormalTexture::new([ 1.0, -1.0,  1.0], [ 0.0, -1.0,  0.0], [0.0, 0.0]),
    VertexNormalTexture::new([-1.0, -1.0,  1.0], [ 0.0, -1.0,  0.0], [1.0, 0.0]),
    // Right
    VertexNormalTexture::new([ 1.0, -1.0, -1.0], [ 1.0,  0.0,  0.0], [1.0, 0.0]),
    VertexNormalTexture::new([ 1.0,  1.0, -1.0], [ 1.0,  0.0,  0.0], [1.0, 1.0]),
    VertexNormalTexture::new([ 1.0,  1.0,  1.0], [ 1.0,  0.0,  0.0], [0.0, 1.0]),
    VertexNormalTexture::new([ 1.0, -1.0,  1.0], [ 1.0,  0.0,  0.0], [0.0, 0.0]),
    // Left
    VertexNormalTexture::new([-1.0, -1.0, -1.0], [-1.0,  0.0,  0.0], [0.0, 0.0]),
    VertexNormalTexture::new([-1.0, -1.0,  1.0], [-1.0,  0.0,  0.0], [1.0, 0.0]),
    VertexNormalTexture::new([-1.0,  1.0,  1.0], [-1.0,  0.0,  0.0], [1.0, 1.0]),
    VertexNormalTexture::new([-1.0,  1.0, -1.0], [-1.0,  0.0,  0.0], [0.0, 1.0]),
];

/// Two counter-clockwise triangles per face of a 24-vertex cube.
#[rustfmt::skip]
pub const CUBE_INDICES: [u16; 36] = [
     0,  1,  2,   2,  3,  0,
     4,  5,  6,   6,  7,  4,
     8,  9, 10,  10, 11,  8,
    12, 13, 14,  14, 15, 12,
    16, 17, 18,  18, 19, 16,
    20, 21, 22,  22, 23, 20,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_strides_match_layouts() {
        assert_eq!(VertexColor::LAYOUT.array_stride, 28);
        assert_eq!(VertexTexture::LAYOUT.array_stride, 20);
        assert_eq!(VertexNormalTexture::LAYOUT.array_stride, 32);
        assert_eq!(VertexNormalTexture::LAYOUT.attributes[2].offset, 24);
    }

    #[test]
    fn cube_faces_lie_on_their_planes() {
        for v in &LIT_CUBE_VERTICES {
            let n = v.normal;
            let d = v.position[0] * n[0] + v.position[1] * n[1] + v.position[2] * n[2];
            assert_eq!(d, 1.0, "{v:?}");
        }
    }

    #[test]
    fn cube_triangles_face_outwards() {
        for tri in CUBE_INDICES.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|i| LIT_CUBE_VERTICES[tri[i] as usize]);
            let e1 = glam::Vec3::from(b.position) - glam::Vec3::from(a.position);
            let e2 = glam::Vec3::from(c.position) - glam::Vec3::from(a.position);
            let facing = e1.cross(e2).dot(glam::Vec3::from(a.normal));
            assert!(facing > 0.0, "triangle {tri:?} winds inwards");
        }
    }
}
