use std::marker::PhantomData;
use std::num::NonZeroU64;

use bytemuck::Pod;

use crate::gpu::GpuContext;

/// A uniform buffer holding one block per draw call.
///
/// `queue.write_buffer` calls recorded in one frame all land before that
/// frame's commands run, so a single uniform block rewritten between draws
/// would leave every draw seeing the last value. Each [`UniformRing::push`]
/// instead writes to a fresh slot and returns the dynamic offset to bind it
/// with. Call [`UniformRing::reset`] once at the start of every frame.
pub struct UniformRing<T> {
    buffer: wgpu::Buffer,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: u32,
    next: u32,
    label: String,
    _marker: PhantomData<T>,
}

impl<T: Pod> UniformRing<T> {
    /// Allocate room for `capacity` blocks of `T`, visible to both stages.
    pub fn new(gpu: &GpuContext, capacity: u32, label: &str) -> Self {
        let device = &gpu.device;
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = aligned_stride(Self::block_size(), alignment);
        let capacity = capacity.max(1);

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(Self::block_size()),
                },
                count: None,
            }],
        });
        let (buffer, bind_group) = Self::allocate(device, &layout, stride, capacity, label);

        Self {
            buffer,
            layout,
            bind_group,
            stride,
            capacity,
            next: 0,
            label: label.to_owned(),
            _marker: PhantomData,
        }
    }

    fn block_size() -> u64 {
        std::mem::size_of::<T>() as u64
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: u32,
        label: &str,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(Self::block_size()),
                }),
            }],
        });
        (buffer, bind_group)
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Forget the blocks written last frame.
    pub fn reset(&mut self) {
        self.next = 0;
    }

    /// Write `value` into the next free slot and return its dynamic offset.
    ///
    /// A full ring moves to a buffer twice the size. Draws already recorded
    /// keep the old buffer alive through their bind group.
    pub fn push(&mut self, gpu: &GpuContext, value: &T) -> u32 {
        if self.next >= self.capacity {
            self.grow(gpu);
        }
        let offset = self.next as u64 * self.stride;
        gpu.queue
            .write_buffer(&self.buffer, offset, bytemuck::bytes_of(value));
        self.next += 1;
        offset as u32
    }

    fn grow(&mut self, gpu: &GpuContext) {
        let capacity = grown_capacity(self.capacity);
        log::debug!(
            "uniform ring {:?} grows from {} to {capacity} blocks",
            self.label,
            self.capacity
        );
        let (buffer, bind_group) =
            Self::allocate(&gpu.device, &self.layout, self.stride, capacity, &self.label);
        self.buffer = buffer;
        self.bind_group = bind_group;
        self.capacity = capacity;
        // offsets restart in the new buffer
        self.next = 0;
    }

    /// Push `value` and bind it at `group`.
    pub fn bind(&mut self, gpu: &GpuContext, pass: &mut wgpu::RenderPass<'_>, group: u32, value: &T) {
        let offset = self.push(gpu, value);
        pass.set_bind_group(group, &self.bind_group, &[offset]);
    }
}

/// Capacity after a full ring grows.
pub(crate) fn grown_capacity(capacity: u32) -> u32 {
    capacity.saturating_mul(2).max(1)
}

/// `size` rounded up to a multiple of `alignment`.
pub(crate) fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_rounds_up_to_alignment() {
        assert_eq!(aligned_stride(64, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(257, 256), 512);
        assert_eq!(aligned_stride(208, 64), 256);
        assert_eq!(aligned_stride(12, 0), 12);
    }

    #[test]
    fn full_ring_doubles() {
        assert_eq!(grown_capacity(1), 2);
        assert_eq!(grown_capacity(16), 32);
        assert_eq!(grown_capacity(0), 1);
        assert_eq!(grown_capacity(u32::MAX), u32::MAX);
    }
}
