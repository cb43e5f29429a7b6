//! Fixed-function style 4×4 matrix math.
//!
//! [`Mtx`] mirrors the matrix stack calls of classic OpenGL (`glTranslatef`,
//! `glRotatef`, `gluPerspective`, ...) so the lessons can compose transforms the
//! same way the tutorials describe them.
//!
//! # Layout
//!
//! Matrices are column-major: element `(row, col)` lives at `m[col * 4 + row]`,
//! and the translation occupies `m[12..15]`. This is also the layout WGSL expects
//! for a `mat4x4<f32>`, so an [`Mtx`] can be written straight into a uniform
//! buffer through [`bytemuck`].
//!
//! # Depth convention
//!
//! Projection matrices keep the GL clip-space depth range of `[-1, 1]`. The
//! lesson shaders remap clip z into wgpu's `[0, 1]` range themselves.
//!
//! # Example
//!
//! ```
//! use nehe::Mtx;
//!
//! let projection = Mtx::perspective(45.0, 640.0 / 480.0, 0.1, 100.0);
//! let mut model = Mtx::translation(-1.5, 0.0, -6.0);
//! model.rotate(30.0, 0.0, 1.0, 0.0);
//! let model_view_proj = projection * model;
//! # let _ = model_view_proj;
//! ```

use std::f32::consts::PI;
use std::ops::Mul;

use glam::{Mat4, Vec4};

const DEG_TO_RAD: f32 = PI / 180.0;

/// A column-major 4×4 matrix of `f32`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Mtx(pub [f32; 16]);

impl Default for Mtx {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mtx {
    /// The identity matrix.
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// A translation matrix, equivalent to `glTranslatef` on an identity matrix.
    pub const fn translation(x: f32, y: f32, z: f32) -> Self {
        Self([
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            x, y, z, 1.0,
        ])
    }

    /// A scaling matrix, equivalent to `glScalef` on an identity matrix.
    pub const fn scaled(x: f32, y: f32, z: f32) -> Self {
        Self([
            x, 0.0, 0.0, 0.0, //
            0.0, y, 0.0, 0.0, //
            0.0, 0.0, z, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// A rotation of `angle` degrees around the axis `(x, y, z)`.
    ///
    /// The axis does not need to be unit length; it is normalised when its
    /// magnitude differs from one by more than [`f32::EPSILON`], the same way
    /// `glRotatef` treats its arguments.
    pub fn rotation(angle: f32, x: f32, y: f32, z: f32) -> Self {
        let r = gl_rotation(angle, x, y, z);
        Self([
            r[0], r[1], r[2], 0.0, //
            r[3], r[4], r[5], 0.0, //
            r[6], r[7], r[8], 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// A symmetric perspective projection, equivalent to `gluPerspective`.
    ///
    /// `fovy` is the vertical field of view in degrees. The bottom row is
    /// `[0, 0, -1, 0]`, so `w` receives the negated view-space depth.
    pub fn perspective(fovy: f32, aspect: f32, near: f32, far: f32) -> Self {
        let h = 1.0 / (fovy * DEG_TO_RAD * 0.5).tan();
        let w = h / aspect;
        let inv_depth = 1.0 / (far - near);
        let zh = -(far + near) * inv_depth;
        let zl = -(2.0 * far * near) * inv_depth;

        Self([
            w, 0.0, 0.0, 0.0, //
            0.0, h, 0.0, 0.0, //
            0.0, 0.0, zh, -1.0, //
            0.0, 0.0, zl, 0.0,
        ])
    }

    /// An orthographic projection, equivalent to `glOrtho`.
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let x = 1.0 / (right - left);
        let y = 1.0 / (top - bottom);
        let z = 1.0 / (far - near);

        Self([
            2.0 * x, 0.0, 0.0, 0.0, //
            0.0, 2.0 * y, 0.0, 0.0, //
            0.0, 0.0, -2.0 * z, 0.0, //
            -(right + left) * x,
            -(top + bottom) * y,
            -(far + near) * z,
            1.0,
        ])
    }

    /// An orthographic projection with the depth range fixed to `[-1, 1]`,
    /// equivalent to `gluOrtho2D`.
    pub fn orthographic_2d(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        Self::orthographic(left, right, bottom, top, -1.0, 1.0)
    }

    /// Returns `l * r`.
    pub fn multiply(l: &Mtx, r: &Mtx) -> Mtx {
        let (l, r) = (&l.0, &r.0);
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = l[row] * r[col * 4]
                    + l[4 + row] * r[col * 4 + 1]
                    + l[8 + row] * r[col * 4 + 2]
                    + l[12 + row] * r[col * 4 + 3];
            }
        }
        Mtx(out)
    }

    /// Returns `self * v` without a perspective divide.
    pub fn vector_product(&self, v: Vec4) -> Vec4 {
        let m = &self.0;
        Vec4::new(
            m[0] * v.x + m[4] * v.y + m[8] * v.z + m[12] * v.w,
            m[1] * v.x + m[5] * v.y + m[9] * v.z + m[13] * v.w,
            m[2] * v.x + m[6] * v.y + m[10] * v.z + m[14] * v.w,
            m[3] * v.x + m[7] * v.y + m[11] * v.z + m[15] * v.w,
        )
    }

    /// Returns `self * v` divided through by the resulting `w`.
    ///
    /// A zero `w` is not guarded against and yields infinities or NaNs.
    pub fn vector_project(&self, v: Vec4) -> Vec4 {
        let p = self.vector_product(v);
        let inv_w = 1.0 / p.w;
        p * inv_w
    }

    /// `self = self * translation(x, y, z)`.
    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        let m = &mut self.0;
        for i in 0..4 {
            m[12 + i] += x * m[i] + y * m[4 + i] + z * m[8 + i];
        }
    }

    /// `self = self * scaled(x, y, z)`.
    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        let m = &mut self.0;
        for i in 0..4 {
            m[i] *= x;
            m[4 + i] *= y;
            m[8 + i] *= z;
        }
    }

    /// `self = self * rotation(angle, x, y, z)`.
    ///
    /// Only the upper three columns change; the translation column is
    /// untouched by a rotation applied on the right.
    pub fn rotate(&mut self, angle: f32, x: f32, y: f32, z: f32) {
        let r = gl_rotation(angle, x, y, z);
        let m = &mut self.0;
        let mut tmp = [0.0f32; 12];
        tmp.copy_from_slice(&m[..12]);

        for i in 0..4 {
            m[i] = r[0] * tmp[i] + r[1] * tmp[4 + i] + r[2] * tmp[8 + i];
            m[4 + i] = r[3] * tmp[i] + r[4] * tmp[4 + i] + r[5] * tmp[8 + i];
            m[8 + i] = r[6] * tmp[i] + r[7] * tmp[4 + i] + r[8] * tmp[8 + i];
        }
    }

    /// `self = translation(x, y, z) * self`.
    pub fn pre_translate(&mut self, x: f32, y: f32, z: f32) {
        let m = &mut self.0;
        for col in 0..4 {
            let w = m[col * 4 + 3];
            m[col * 4] += x * w;
            m[col * 4 + 1] += y * w;
            m[col * 4 + 2] += z * w;
        }
    }

    /// `self = scaled(x, y, z) * self`.
    pub fn pre_scale(&mut self, x: f32, y: f32, z: f32) {
        let m = &mut self.0;
        for col in 0..4 {
            m[col * 4] *= x;
            m[col * 4 + 1] *= y;
            m[col * 4 + 2] *= z;
        }
    }

    /// `self = rotation(angle, x, y, z) * self`.
    pub fn pre_rotate(&mut self, angle: f32, x: f32, y: f32, z: f32) {
        let r = gl_rotation(angle, x, y, z);
        let m = &mut self.0;
        for col in 0..4 {
            let (a, b, c) = (m[col * 4], m[col * 4 + 1], m[col * 4 + 2]);
            m[col * 4] = r[0] * a + r[3] * b + r[6] * c;
            m[col * 4 + 1] = r[1] * a + r[4] * b + r[7] * c;
            m[col * 4 + 2] = r[2] * a + r[5] * b + r[8] * c;
        }
    }

    /// Element at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0[col * 4 + row]
    }

    /// The raw column-major elements.
    pub fn as_array(&self) -> &[f32; 16] {
        &self.0
    }
}

/// Upper 3×3 of a rotation matrix, column-major.
fn make_rotation(c: f32, s: f32, x: f32, y: f32, z: f32) -> [f32; 9] {
    let rc = 1.0 - c;
    let (rcx, rcy, rcz) = (x * rc, y * rc, z * rc);
    let (sx, sy, sz) = (x * s, y * s, z * s);

    [
        rcx * x + c,
        rcy * x + sz,
        rcz * x - sy,
        rcx * y - sz,
        rcy * y + c,
        rcz * y + sx,
        rcx * z + sy,
        rcy * z - sx,
        rcz * z + c,
    ]
}

fn gl_rotation(angle: f32, x: f32, y: f32, z: f32) -> [f32; 9] {
    let theta = angle * DEG_TO_RAD;
    let mag = (x * x + y * y + z * z).sqrt();
    let (x, y, z) = if (mag - 1.0).abs() > f32::EPSILON {
        let inv = 1.0 / mag;
        (x * inv, y * inv, z * inv)
    } else {
        (x, y, z)
    };
    make_rotation(theta.cos(), theta.sin(), x, y, z)
}

impl Mul for Mtx {
    type Output = Mtx;

    fn mul(self, rhs: Mtx) -> Mtx {
        Mtx::multiply(&self, &rhs)
    }
}

impl Mul<Vec4> for Mtx {
    type Output = Vec4;

    fn mul(self, rhs: Vec4) -> Vec4 {
        self.vector_product(rhs)
    }
}

impl From<Mtx> for Mat4 {
    fn from(m: Mtx) -> Self {
        Mat4::from_cols_array(&m.0)
    }
}

impl From<Mat4> for Mtx {
    fn from(m: Mat4) -> Self {
        Mtx(m.to_cols_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_mtx_eq(a: &Mtx, b: &Mtx) {
        for i in 0..16 {
            assert!(
                (a.0[i] - b.0[i]).abs() < EPS,
                "element {i} differs: {} vs {}",
                a.0[i],
                b.0[i]
            );
        }
    }

    fn sample() -> Mtx {
        let mut m = Mtx::translation(1.0, -2.0, 3.5);
        m.rotate(37.0, 0.3, 1.0, -0.2);
        m.scale(2.0, 0.5, 1.5);
        m.0[3] = 0.25;
        m
    }

    #[test]
    fn identity_is_neutral() {
        let m = sample();
        assert_mtx_eq(&(Mtx::IDENTITY * m), &m);
        assert_mtx_eq(&(m * Mtx::IDENTITY), &m);
    }

    #[test]
    fn multiply_matches_glam() {
        let a = sample();
        let b = Mtx::perspective(60.0, 1.5, 0.5, 50.0);
        let expected = Mat4::from(a) * Mat4::from(b);
        assert_mtx_eq(&(a * b), &Mtx::from(expected));
    }

    #[test]
    fn translation_is_in_last_column() {
        let m = Mtx::translation(4.0, 5.0, 6.0);
        assert_eq!(m.get(0, 3), 4.0);
        assert_eq!(m.get(1, 3), 5.0);
        assert_eq!(m.get(2, 3), 6.0);
        assert_eq!(&m.0[12..15], &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn in_place_ops_match_full_multiply() {
        let base = sample();

        let mut t = base;
        t.translate(1.0, 2.0, 3.0);
        assert_mtx_eq(&t, &(base * Mtx::translation(1.0, 2.0, 3.0)));

        let mut s = base;
        s.scale(3.0, -1.0, 0.5);
        assert_mtx_eq(&s, &(base * Mtx::scaled(3.0, -1.0, 0.5)));

        let mut r = base;
        r.rotate(-75.0, 1.0, 1.0, 1.0);
        assert_mtx_eq(&r, &(base * Mtx::rotation(-75.0, 1.0, 1.0, 1.0)));
    }

    #[test]
    fn pre_ops_match_full_multiply() {
        let base = sample();

        let mut t = base;
        t.pre_translate(1.0, 2.0, 3.0);
        assert_mtx_eq(&t, &(Mtx::translation(1.0, 2.0, 3.0) * base));

        let mut s = base;
        s.pre_scale(3.0, -1.0, 0.5);
        assert_mtx_eq(&s, &(Mtx::scaled(3.0, -1.0, 0.5) * base));

        let mut r = base;
        r.pre_rotate(20.0, 0.0, 0.0, 2.0);
        assert_mtx_eq(&r, &(Mtx::rotation(20.0, 0.0, 0.0, 2.0) * base));
    }

    #[test]
    fn rotate_then_inverse_rotate_restores() {
        let base = sample();
        let mut m = base;
        m.rotate(123.0, 0.2, -0.7, 0.4);
        m.rotate(-123.0, 0.2, -0.7, 0.4);
        assert_mtx_eq(&m, &base);
    }

    #[test]
    fn rotation_matches_glam_axis_angle() {
        let axis = glam::Vec3::new(1.0, 2.0, -0.5);
        let expected = Mat4::from_axis_angle(axis.normalize(), 40.0f32.to_radians());
        assert_mtx_eq(&Mtx::rotation(40.0, axis.x, axis.y, axis.z), &Mtx::from(expected));
    }

    #[test]
    fn rotation_quarter_turn_about_z() {
        let m = Mtx::rotation(90.0, 0.0, 0.0, 1.0);
        let v = m.vector_product(Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert!((v.x).abs() < EPS);
        assert!((v.y - 1.0).abs() < EPS);
    }

    #[test]
    fn perspective_maps_near_and_far_planes() {
        let (near, far) = (0.1, 100.0);
        let p = Mtx::perspective(45.0, 4.0 / 3.0, near, far);

        let n = p.vector_project(Vec4::new(0.0, 0.0, -near, 1.0));
        assert!((n.z + 1.0).abs() < 1e-4, "near plane z = {}", n.z);
        assert!((n.w - 1.0).abs() < EPS);

        let f = p.vector_project(Vec4::new(0.0, 0.0, -far, 1.0));
        assert!((f.z - 1.0).abs() < 1e-4, "far plane z = {}", f.z);
    }

    #[test]
    fn perspective_matches_glam_gl_convention() {
        let p = Mtx::perspective(45.0, 16.0 / 9.0, 0.1, 100.0);
        let expected = Mat4::perspective_rh_gl(45.0f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
        assert_mtx_eq(&p, &Mtx::from(expected));
        assert_eq!(p.get(3, 2), -1.0);
        assert_eq!(p.get(3, 3), 0.0);
    }

    #[test]
    fn orthographic_maps_box_to_unit_cube() {
        let o = Mtx::orthographic(0.0, 640.0, 480.0, 0.0, -1.0, 1.0);
        let tl = o.vector_project(Vec4::new(0.0, 0.0, 0.0, 1.0));
        let br = o.vector_project(Vec4::new(640.0, 480.0, 0.0, 1.0));
        assert!((tl.x + 1.0).abs() < EPS && (tl.y - 1.0).abs() < EPS);
        assert!((br.x - 1.0).abs() < EPS && (br.y + 1.0).abs() < EPS);
        assert_mtx_eq(&o, &Mtx::orthographic_2d(0.0, 640.0, 480.0, 0.0));
        assert_eq!(&o.0[3..16].iter().step_by(4).copied().collect::<Vec<_>>(), &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn project_with_zero_w_is_not_finite() {
        let m = Mtx([0.0; 16]);
        let v = m.vector_project(Vec4::new(1.0, 1.0, 1.0, 1.0));
        assert!(!v.x.is_finite());
    }
}
