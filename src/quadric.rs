//! Tessellation of GLU-style quadric surfaces.
//!
//! A [`Quadric`] writes indexed triangle meshes for cylinders (and cones, which
//! are cylinders with a zero top radius), spheres and discs into storage owned
//! by the caller. Nothing is allocated for the mesh itself; the generator only
//! fills the slices it is given and records how much of them it used.
//!
//! ```
//! use nehe::quadric::{Quadric, QuadricCounts};
//! use nehe::VertexNormalTexture;
//!
//! let counts = QuadricCounts::sphere(16, 8);
//! let mut vertices = vec![VertexNormalTexture::default(); counts.vertices];
//! let mut indices = vec![0u32; counts.indices];
//!
//! let mut quadric = Quadric::new(&mut vertices, &mut indices);
//! quadric.sphere(1.0, 16, 8).unwrap();
//! assert_eq!(quadric.num_indices(), counts.indices);
//! ```
//!
//! # Segment limit
//!
//! Slice counts (and sphere stack counts) are clamped to one less than the
//! segment limit, which defaults to [`DEFAULT_SEGMENT_LIMIT`], the maximum GLU
//! accepts. Use [`Quadric::with_segment_limit`] for denser meshes.

use std::f32::consts::{PI, TAU};

use thiserror::Error;

use crate::mesh::VertexNormalTexture;

/// Index type written by the generators.
pub type QuadIndex = u32;

/// Default number of trig table entries; counts clamp to one less than this.
pub const DEFAULT_SEGMENT_LIMIT: u32 = 240;

const DEG_TO_RAD: f32 = PI / 180.0;

/// Invalid parameters or undersized storage passed to a [`Quadric`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuadricError {
    #[error("at least 2 slices are required, got {0}")]
    TooFewSlices(u32),
    #[error("at least 1 stack is required, got {0}")]
    TooFewStacks(u32),
    #[error("at least 1 loop is required, got {0}")]
    TooFewLoops(u32),
    #[error("radius must not be negative, got {0}")]
    NegativeRadius(f32),
    #[error("outer radius must be positive, got {0}")]
    NonPositiveOuterRadius(f32),
    #[error("height must not be negative, got {0}")]
    NegativeHeight(f32),
    #[error("cylinder has zero length along its surface")]
    DegenerateCylinder,
    #[error("vertex storage holds {capacity} vertices but {required} are needed")]
    VertexCapacity { required: usize, capacity: usize },
    #[error("index storage holds {capacity} indices but {required} are needed")]
    IndexCapacity { required: usize, capacity: usize },
}

/// Exact vertex and index counts a generator call will write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadricCounts {
    pub vertices: usize,
    pub indices: usize,
}

impl QuadricCounts {
    /// Counts for [`Quadric::cylinder`].
    pub fn cylinder(slices: u32, stacks: u32) -> Self {
        let (slices, stacks) = (slices as usize, stacks as usize);
        Self {
            vertices: (stacks + 1) * (slices + 1),
            indices: 6 * stacks * slices,
        }
    }

    /// Counts for [`Quadric::sphere`].
    pub fn sphere(slices: u32, stacks: u32) -> Self {
        Self::cylinder(slices, stacks)
    }

    /// Counts for [`Quadric::disc`].
    pub fn disc(inner_radius: f32, slices: u32, loops: u32) -> Self {
        Self::disc_partial(inner_radius, slices, loops, 360.0)
    }

    /// Counts for [`Quadric::disc_partial`].
    pub fn disc_partial(inner_radius: f32, slices: u32, loops: u32, sweep_angle: f32) -> Self {
        let (_, sweep) = clamp_sweep(0.0, sweep_angle);
        let (slices, loops) = (slices as usize, loops as usize);
        let vertex_slices = if sweep == 360.0 { slices } else { slices + 1 };

        if inner_radius > 0.0 {
            Self {
                vertices: (loops + 1) * vertex_slices,
                indices: 6 * loops * slices,
            }
        } else {
            Self {
                vertices: 1 + loops * vertex_slices,
                indices: 3 * slices + 6 * loops.saturating_sub(1) * slices,
            }
        }
    }
}

/// Quadric mesh writer over caller-owned vertex and index storage.
pub struct Quadric<'a> {
    vertices: &'a mut [VertexNormalTexture],
    indices: &'a mut [QuadIndex],
    segment_limit: u32,
    num_vertices: usize,
    num_indices: usize,
}

impl<'a> Quadric<'a> {
    pub fn new(vertices: &'a mut [VertexNormalTexture], indices: &'a mut [QuadIndex]) -> Self {
        Self {
            vertices,
            indices,
            segment_limit: DEFAULT_SEGMENT_LIMIT,
            num_vertices: 0,
            num_indices: 0,
        }
    }

    /// Overrides the trig table size. Values below 3 are raised to 3.
    pub fn with_segment_limit(mut self, limit: u32) -> Self {
        self.segment_limit = limit.max(3);
        self
    }

    /// Vertices written by the last generator call.
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// Indices written by the last generator call.
    pub fn num_indices(&self) -> usize {
        self.num_indices
    }

    /// The written part of the vertex storage.
    pub fn vertices(&self) -> &[VertexNormalTexture] {
        &self.vertices[..self.num_vertices]
    }

    /// The written part of the index storage.
    pub fn indices(&self) -> &[QuadIndex] {
        &self.indices[..self.num_indices]
    }

    fn clamp_segments(&self, count: u32) -> u32 {
        count.min(self.segment_limit - 1)
    }

    fn reserve(&mut self, counts: QuadricCounts) -> Result<(), QuadricError> {
        if counts.vertices > self.vertices.len() {
            return Err(QuadricError::VertexCapacity {
                required: counts.vertices,
                capacity: self.vertices.len(),
            });
        }
        if counts.indices > self.indices.len() {
            return Err(QuadricError::IndexCapacity {
                required: counts.indices,
                capacity: self.indices.len(),
            });
        }
        self.num_vertices = counts.vertices;
        self.num_indices = counts.indices;
        Ok(())
    }

    /// A cylinder along +Z from `z = 0` to `z = height`, like `gluCylinder`.
    ///
    /// The radius interpolates linearly from `base_radius` to `top_radius`, so a
    /// zero top radius gives a cone. Faces point outwards.
    pub fn cylinder(
        &mut self,
        base_radius: f32,
        top_radius: f32,
        height: f32,
        slices: u32,
        stacks: u32,
    ) -> Result<(), QuadricError> {
        check_slices(slices)?;
        check_stacks(stacks)?;
        check_radius(base_radius)?;
        check_radius(top_radius)?;
        if height < 0.0 {
            return Err(QuadricError::NegativeHeight(height));
        }

        let delta_radius = base_radius - top_radius;
        let len = (delta_radius * delta_radius + height * height).sqrt();
        if len == 0.0 {
            return Err(QuadricError::DegenerateCylinder);
        }

        let slices = self.clamp_segments(slices);
        self.reserve(QuadricCounts::cylinder(slices, stacks))?;

        let slice_step = 1.0 / slices as f32;
        let stack_step = 1.0 / stacks as f32;
        let (sin_slice, cos_slice) = revolution_table(slices);

        // Normals tilt by the cone's slant
        let inv_len = 1.0 / len;
        let normal_z = delta_radius * inv_len;
        let slice_normal_scale = height * inv_len;

        let mut cur = 0;
        for stack in 0..=stacks {
            let radius = base_radius - delta_radius * stack_step * stack as f32;
            let z = stack_step * height * stack as f32;

            for slice in 0..=slices as usize {
                let (s, c) = (sin_slice[slice], cos_slice[slice]);
                self.vertices[cur] = VertexNormalTexture::new(
                    [radius * s, radius * c, z],
                    [slice_normal_scale * s, slice_normal_scale * c, normal_z],
                    [1.0 - slice_step * slice as f32, stack_step * stack as f32],
                );
                cur += 1;
            }
        }
        debug_assert_eq!(cur, self.num_vertices);

        let written = stitch_quads(&mut self.indices[..], 0, slices, stacks, true, false);
        debug_assert_eq!(written, self.num_indices);
        Ok(())
    }

    /// A full disc in the XY plane facing +Z, like `gluDisk`.
    pub fn disc(
        &mut self,
        inner_radius: f32,
        outer_radius: f32,
        slices: u32,
        loops: u32,
    ) -> Result<(), QuadricError> {
        self.disc_partial(inner_radius, outer_radius, slices, loops, 0.0, 360.0)
    }

    /// A pie-slice of a disc, like `gluPartialDisk`.
    ///
    /// Angles are in degrees, measured clockwise from +Y. A sweep outside
    /// `[-360, 360]` becomes a full revolution, and a negative sweep is turned
    /// around to start at `start_angle + sweep_angle`. Without a hole the
    /// centre is a single vertex fanned to the innermost ring.
    pub fn disc_partial(
        &mut self,
        inner_radius: f32,
        outer_radius: f32,
        slices: u32,
        loops: u32,
        start_angle: f32,
        sweep_angle: f32,
    ) -> Result<(), QuadricError> {
        check_slices(slices)?;
        if loops < 1 {
            return Err(QuadricError::TooFewLoops(loops));
        }
        if outer_radius <= 0.0 {
            return Err(QuadricError::NonPositiveOuterRadius(outer_radius));
        }
        check_radius(inner_radius)?;

        let slices = self.clamp_segments(slices);
        let (start_angle, sweep_angle) = clamp_sweep(start_angle, sweep_angle);

        let has_hole = inner_radius > 0.0;
        let contiguous = sweep_angle == 360.0;
        let vertex_slices = (if contiguous { slices } else { slices + 1 }) as usize;

        self.reserve(QuadricCounts::disc_partial(
            inner_radius,
            slices,
            loops,
            sweep_angle,
        ))?;

        let slice_step = 1.0 / slices as f32;
        let loop_step = 1.0 / loops as f32;
        let delta_radius = outer_radius - inner_radius;
        let angle_offset = DEG_TO_RAD * start_angle;

        let mut sin_slice = Vec::with_capacity(vertex_slices);
        let mut cos_slice = Vec::with_capacity(vertex_slices);
        for slice in 0..vertex_slices {
            let theta = angle_offset + DEG_TO_RAD * sweep_angle * slice_step * slice as f32;
            sin_slice.push(theta.sin());
            cos_slice.push(theta.cos());
        }

        let mut cur = 0;
        let mut quad_loops = loops;
        if !has_hole {
            self.vertices[cur] = VertexNormalTexture::new([0.0; 3], [0.0, 0.0, 1.0], [0.5, 0.5]);
            cur += 1;
            quad_loops -= 1;
        }
        for ring in 0..=quad_loops {
            let radius = outer_radius - delta_radius * loop_step * ring as f32;
            let tex_scale = radius / outer_radius * 0.5;
            for slice in 0..vertex_slices {
                let (s, c) = (sin_slice[slice], cos_slice[slice]);
                self.vertices[cur] = VertexNormalTexture::new(
                    [radius * s, radius * c, 0.0],
                    [0.0, 0.0, 1.0],
                    [0.5 + tex_scale * s, 0.5 + tex_scale * c],
                );
                cur += 1;
            }
        }
        debug_assert_eq!(cur, self.num_vertices);

        let mut idx = 0;
        if !has_hole {
            let ring_start = (self.num_vertices - vertex_slices) as QuadIndex;
            let mut fan = IndexWriter::new(&mut self.indices[..]);
            for slice in (0..vertex_slices as QuadIndex - 1).rev() {
                fan.triangle([0, ring_start + slice + 1, ring_start + slice]);
            }
            if contiguous {
                fan.triangle([0, ring_start, ring_start + slices - 1]);
            }
            idx = fan.len;
        }

        let first_ring = if has_hole { 0 } else { 1 };
        idx += stitch_quads(
            &mut self.indices[idx..],
            first_ring,
            slices,
            quad_loops,
            true,
            contiguous,
        );
        debug_assert_eq!(idx, self.num_indices);
        Ok(())
    }

    /// A sphere centred on the origin with its poles on the Z axis, like
    /// `gluSphere`.
    pub fn sphere(&mut self, radius: f32, slices: u32, stacks: u32) -> Result<(), QuadricError> {
        check_slices(slices)?;
        check_stacks(stacks)?;
        check_radius(radius)?;

        let slices = self.clamp_segments(slices);
        let stacks = self.clamp_segments(stacks);
        self.reserve(QuadricCounts::sphere(slices, stacks))?;

        let stack_step = 1.0 / stacks as f32;
        let slice_step = 1.0 / slices as f32;

        let n = stacks as usize;
        let mut sin_stack = vec![0.0f32; n + 1];
        let mut cos_stack = vec![0.0f32; n + 1];
        cos_stack[0] = 1.0;
        cos_stack[n] = -1.0;
        for stack in 1..n {
            let theta = PI * stack_step * stack as f32;
            sin_stack[stack] = theta.sin();
            cos_stack[stack] = theta.cos();
        }
        let (sin_slice, cos_slice) = revolution_table(slices);

        let mut cur = 0;
        for stack in 0..=n {
            let (ss, cs) = (sin_stack[stack], cos_stack[stack]);
            for slice in 0..=slices as usize {
                let (sl, cl) = (sin_slice[slice], cos_slice[slice]);
                self.vertices[cur] = VertexNormalTexture::new(
                    [radius * ss * sl, radius * ss * cl, radius * cs],
                    [ss * sl, ss * cl, cs],
                    [
                        1.0 - slice_step * slice as f32,
                        1.0 - stack_step * stack as f32,
                    ],
                );
                cur += 1;
            }
        }
        debug_assert_eq!(cur, self.num_vertices);

        let written = stitch_quads(&mut self.indices[..], 0, slices, stacks, false, false);
        debug_assert_eq!(written, self.num_indices);
        Ok(())
    }
}

fn check_slices(slices: u32) -> Result<(), QuadricError> {
    if slices < 2 {
        return Err(QuadricError::TooFewSlices(slices));
    }
    Ok(())
}

fn check_stacks(stacks: u32) -> Result<(), QuadricError> {
    if stacks < 1 {
        return Err(QuadricError::TooFewStacks(stacks));
    }
    Ok(())
}

fn check_radius(radius: f32) -> Result<(), QuadricError> {
    if radius < 0.0 {
        return Err(QuadricError::NegativeRadius(radius));
    }
    Ok(())
}

fn clamp_sweep(start_angle: f32, sweep_angle: f32) -> (f32, f32) {
    if !(-360.0..=360.0).contains(&sweep_angle) {
        (start_angle, 360.0)
    } else if sweep_angle < 0.0 {
        (start_angle + sweep_angle, -sweep_angle)
    } else {
        (start_angle, sweep_angle)
    }
}

/// Sin/cos of a full turn split into `slices` steps, `slices + 1` entries.
///
/// Both ends are written as exact 0/1 so the seam vertices match bit for bit.
fn revolution_table(slices: u32) -> (Vec<f32>, Vec<f32>) {
    let n = slices as usize;
    let step = 1.0 / slices as f32;
    let mut sin = vec![0.0f32; n + 1];
    let mut cos = vec![1.0f32; n + 1];
    for slice in 1..n {
        let theta = TAU * step * slice as f32;
        sin[slice] = theta.sin();
        cos[slice] = theta.cos();
    }
    (sin, cos)
}

struct IndexWriter<'a> {
    indices: &'a mut [QuadIndex],
    len: usize,
}

impl<'a> IndexWriter<'a> {
    fn new(indices: &'a mut [QuadIndex]) -> Self {
        Self { indices, len: 0 }
    }

    fn triangle(&mut self, tri: [QuadIndex; 3]) {
        self.indices[self.len..self.len + 3].copy_from_slice(&tri);
        self.len += 3;
    }

    fn quad(&mut self, a: QuadIndex, b: QuadIndex, c: QuadIndex, d: QuadIndex) {
        self.triangle([a, b, c]);
        self.triangle([c, d, a]);
    }
}

/// Two triangles per cell between consecutive rows of `slices + 1` vertices
/// (or `slices` when `contiguous`, closing the last cell onto the row start).
fn stitch_quads(
    indices: &mut [QuadIndex],
    vtx_offset: QuadIndex,
    slices: u32,
    stacks: u32,
    flip: bool,
    contiguous: bool,
) -> usize {
    let slices = if contiguous { slices - 1 } else { slices };
    let stride = slices + 1;
    let (mut stack0, mut stack1) = if flip {
        (vtx_offset, vtx_offset + stride)
    } else {
        (vtx_offset + stride, vtx_offset)
    };

    let mut out = IndexWriter::new(indices);
    for _ in 0..stacks {
        for slice in 0..slices {
            out.quad(
                stack0 + slice,
                stack1 + slice,
                stack1 + slice + 1,
                stack0 + slice + 1,
            );
        }
        if contiguous {
            out.quad(stack0 + slices, stack1 + slices, stack1, stack0);
        }
        stack0 += stride;
        stack1 += stride;
    }
    out.len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(counts: QuadricCounts) -> (Vec<VertexNormalTexture>, Vec<QuadIndex>) {
        (
            vec![VertexNormalTexture::default(); counts.vertices],
            vec![0; counts.indices],
        )
    }

    fn assert_indices_in_range(q: &Quadric) {
        let n = q.num_vertices() as QuadIndex;
        assert!(q.indices().iter().all(|&i| i < n));
    }

    #[test]
    fn sphere_counts_match_written() {
        let counts = QuadricCounts::sphere(8, 4);
        assert_eq!(counts, QuadricCounts { vertices: 45, indices: 192 });

        let (mut v, mut i) = storage(counts);
        let mut q = Quadric::new(&mut v, &mut i);
        q.sphere(1.0, 8, 4).unwrap();
        assert_eq!(q.num_vertices(), 45);
        assert_eq!(q.num_indices(), 192);
        assert_indices_in_range(&q);
    }

    #[test]
    fn sphere_poles_and_seam() {
        let (mut v, mut i) = storage(QuadricCounts::sphere(8, 4));
        let mut q = Quadric::new(&mut v, &mut i);
        q.sphere(2.0, 8, 4).unwrap();
        let verts = q.vertices();

        assert_eq!(verts[0].position, [0.0, 0.0, 2.0]);
        assert_eq!(verts[44].position, [0.0, 0.0, -2.0]);

        for stack in 0..=4 {
            let first = verts[stack * 9];
            let last = verts[stack * 9 + 8];
            assert_eq!(first.position, last.position);
            assert_eq!(first.normal, last.normal);
        }
    }

    #[test]
    fn sphere_normals_are_unit() {
        let (mut v, mut i) = storage(QuadricCounts::sphere(12, 6));
        let mut q = Quadric::new(&mut v, &mut i);
        q.sphere(3.0, 12, 6).unwrap();
        for vert in q.vertices() {
            let [x, y, z] = vert.normal;
            assert!(((x * x + y * y + z * z).sqrt() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn cylinder_counts_and_extent() {
        let counts = QuadricCounts::cylinder(32, 32);
        assert_eq!(counts.vertices, 33 * 33);
        assert_eq!(counts.indices, 6 * 32 * 32);

        let (mut v, mut i) = storage(counts);
        let mut q = Quadric::new(&mut v, &mut i);
        q.cylinder(1.0, 1.0, 3.0, 32, 32).unwrap();
        assert_eq!(q.num_vertices(), counts.vertices);
        assert_eq!(q.num_indices(), counts.indices);
        assert_eq!(q.vertices()[0].position, [0.0, 1.0, 0.0]);
        assert!((q.vertices()[counts.vertices - 1].position[2] - 3.0).abs() < 1e-6);
        assert_indices_in_range(&q);
    }

    #[test]
    fn cone_apex_collapses_and_normal_tilts() {
        let (mut v, mut i) = storage(QuadricCounts::cylinder(4, 2));
        let mut q = Quadric::new(&mut v, &mut i);
        q.cylinder(1.0, 0.0, 1.0, 4, 2).unwrap();
        let verts = q.vertices();
        for apex in &verts[10..15] {
            assert!(apex.position[0].abs() < 1e-6 && apex.position[1].abs() < 1e-6);
        }
        let expected = 1.0 / 2.0f32.sqrt();
        assert!((verts[0].normal[2] - expected).abs() < 1e-6);
        assert!((verts[0].normal[1] - expected).abs() < 1e-6);
    }

    #[test]
    fn cylinder_first_cell_winding() {
        let (mut v, mut i) = storage(QuadricCounts::cylinder(4, 1));
        let mut q = Quadric::new(&mut v, &mut i);
        q.cylinder(1.0, 1.0, 1.0, 4, 1).unwrap();
        assert_eq!(&q.indices()[..6], &[0, 5, 6, 6, 1, 0]);
    }

    #[test]
    fn holeless_disc_has_centre_fan() {
        let counts = QuadricCounts::disc(0.0, 8, 1);
        assert_eq!(counts, QuadricCounts { vertices: 9, indices: 24 });

        let (mut v, mut i) = storage(counts);
        let mut q = Quadric::new(&mut v, &mut i);
        q.disc(0.0, 1.0, 8, 1).unwrap();
        assert_eq!(q.vertices()[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(q.vertices()[0].uv, [0.5, 0.5]);
        assert!(q.indices().chunks(3).all(|tri| tri[0] == 0));
    }

    #[test]
    fn holeless_disc_fans_innermost_ring() {
        let counts = QuadricCounts::disc(0.0, 8, 3);
        assert_eq!(counts, QuadricCounts { vertices: 25, indices: 24 + 96 });

        let (mut v, mut i) = storage(counts);
        let mut q = Quadric::new(&mut v, &mut i);
        q.disc(0.0, 3.0, 8, 3).unwrap();
        assert_indices_in_range(&q);

        let verts = q.vertices();
        for tri in q.indices()[..24].chunks(3) {
            for &idx in &tri[1..] {
                let [x, y, _] = verts[idx as usize].position;
                assert!(((x * x + y * y).sqrt() - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn disc_with_hole_has_no_centre_vertex() {
        let counts = QuadricCounts::disc(0.5, 8, 2);
        assert_eq!(counts, QuadricCounts { vertices: 24, indices: 96 });

        let (mut v, mut i) = storage(counts);
        let mut q = Quadric::new(&mut v, &mut i);
        q.disc(0.5, 1.5, 8, 2).unwrap();
        assert_indices_in_range(&q);

        let verts = q.vertices();
        assert!(verts.iter().all(|v| {
            let [x, y, _] = v.position;
            (x * x + y * y).sqrt() > 0.49
        }));
        assert_eq!(verts[0].position, [0.0, 1.5, 0.0]);

        // Last cell of the outer ring wraps back onto slice zero
        assert_eq!(&q.indices()[42..48], &[7, 15, 8, 8, 0, 7]);
    }

    #[test]
    fn partial_disc_duplicates_edge_vertices() {
        let counts = QuadricCounts::disc_partial(0.5, 4, 1, 90.0);
        assert_eq!(counts, QuadricCounts { vertices: 10, indices: 24 });

        let (mut v, mut i) = storage(counts);
        let mut q = Quadric::new(&mut v, &mut i);
        q.disc_partial(0.5, 1.0, 4, 1, 0.0, 90.0).unwrap();
        let last = q.vertices()[4].position;
        assert!((last[0] - 1.0).abs() < 1e-6 && last[1].abs() < 1e-6);
    }

    #[test]
    fn negative_sweep_is_reversed() {
        let (mut v, mut i) = storage(QuadricCounts::disc_partial(0.5, 4, 1, -90.0));
        let mut q = Quadric::new(&mut v, &mut i);
        q.disc_partial(0.5, 1.0, 4, 1, 0.0, -90.0).unwrap();
        let first = q.vertices()[0].position;
        assert!((first[0] + 1.0).abs() < 1e-6 && first[1].abs() < 1e-6);
    }

    #[test]
    fn oversized_sweep_becomes_full_disc() {
        let counts = QuadricCounts::disc_partial(0.5, 8, 1, 720.0);
        assert_eq!(counts, QuadricCounts::disc(0.5, 8, 1));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let (mut v, mut i) = storage(QuadricCounts::sphere(8, 8));
        let mut q = Quadric::new(&mut v, &mut i);
        assert_eq!(q.sphere(1.0, 1, 4), Err(QuadricError::TooFewSlices(1)));
        assert_eq!(q.sphere(1.0, 4, 0), Err(QuadricError::TooFewStacks(0)));
        assert_eq!(q.sphere(-1.0, 4, 4), Err(QuadricError::NegativeRadius(-1.0)));
        assert_eq!(
            q.cylinder(1.0, 1.0, -2.0, 4, 4),
            Err(QuadricError::NegativeHeight(-2.0))
        );
        assert_eq!(
            q.cylinder(0.0, 0.0, 0.0, 4, 4),
            Err(QuadricError::DegenerateCylinder)
        );
        assert_eq!(q.disc(0.0, 0.0, 4, 1), Err(QuadricError::NonPositiveOuterRadius(0.0)));
        assert_eq!(q.disc(0.0, 1.0, 4, 0), Err(QuadricError::TooFewLoops(0)));
    }

    #[test]
    fn undersized_storage_is_rejected() {
        let mut v = vec![VertexNormalTexture::default(); 44];
        let mut i = vec![0; 192];
        let mut q = Quadric::new(&mut v, &mut i);
        assert_eq!(
            q.sphere(1.0, 8, 4),
            Err(QuadricError::VertexCapacity { required: 45, capacity: 44 })
        );

        let mut v = vec![VertexNormalTexture::default(); 45];
        let mut i = vec![0; 10];
        let mut q = Quadric::new(&mut v, &mut i);
        assert_eq!(
            q.sphere(1.0, 8, 4),
            Err(QuadricError::IndexCapacity { required: 192, capacity: 10 })
        );
    }

    #[test]
    fn segment_limit_clamps_slices() {
        let counts = QuadricCounts::cylinder(9, 1);
        let (mut v, mut i) = storage(counts);
        let mut q = Quadric::new(&mut v, &mut i).with_segment_limit(10);
        q.cylinder(1.0, 1.0, 1.0, 50, 1).unwrap();
        assert_eq!(q.num_vertices(), counts.vertices);
    }
}
