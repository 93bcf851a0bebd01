#![allow(clippy::too_many_arguments)]

//! Column-major 4x4 matrices, laid out exactly the way `glUniformMatrix4fv`
//! expects them with `transpose = GL_FALSE`.

// See also:
// <https://github.com/rustgd/cgmath/blob/8e0d5ece92ddccd1cbd9670b2bf3007ca9ada986/src/matrix.rs>
// <https://github.com/rustgd/cgmath/blob/8e0d5ece92ddccd1cbd9670b2bf3007ca9ada986/src/transform.rs>

use std::ops::*;

use crate::vectors::*;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Mat4<T> {
  pub x: Vec4<T>,
  pub y: Vec4<T>,
  pub z: Vec4<T>,
  pub w: Vec4<T>,
}

pub type Mat4f = Mat4<f32>;

impl<T> Mat4<T> {
  #[inline]
  #[rustfmt::skip]
  pub const fn new(
    c0r0: T, c0r1: T, c0r2: T, c0r3: T,
    c1r0: T, c1r1: T, c1r2: T, c1r3: T,
    c2r0: T, c2r1: T, c2r2: T, c2r3: T,
    c3r0: T, c3r1: T, c3r2: T, c3r3: T,
  ) -> Self  {
    Self {
      x: vec4(c0r0, c0r1, c0r2, c0r3),
      y: vec4(c1r0, c1r1, c1r2, c1r3),
      z: vec4(c2r0, c2r1, c2r2, c2r3),
      w: vec4(c3r0, c3r1, c3r2, c3r3),
    }
  }

  #[inline]
  pub const fn from_cols(x: Vec4<T>, y: Vec4<T>, z: Vec4<T>, w: Vec4<T>) -> Self {
    Self { x, y, z, w }
  }
}

impl<T> AsRef<[T; 4 * 4]> for Mat4<T> {
  #[inline(always)]
  fn as_ref(&self) -> &[T; 4 * 4] { unsafe { &*(self as *const _ as *const [T; 4 * 4]) } }
}

impl Mat4<f32> {
  #[rustfmt::skip]
  pub const IDENTITY: Self = Self::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
  );

  #[inline(always)]
  pub fn identity() -> Self { Self::IDENTITY }

  #[rustfmt::skip]
  pub fn from_translation(v: Vec3<f32>) -> Self {
    Self::new(
      1.0, 0.0, 0.0, 0.0,
      0.0, 1.0, 0.0, 0.0,
      0.0, 0.0, 1.0, 0.0,
      v.x, v.y, v.z, 1.0,
    )
  }

  #[rustfmt::skip]
  pub fn from_x_rotation(angle: f32) -> Self {
    let (s, c) = angle.sin_cos();
    Self::new(
      1.0, 0.0, 0.0, 0.0,
      0.0, c,   s,   0.0,
      0.0, -s,  c,   0.0,
      0.0, 0.0, 0.0, 1.0,
    )
  }

  #[rustfmt::skip]
  pub fn from_y_rotation(angle: f32) -> Self {
    let (s, c) = angle.sin_cos();
    Self::new(
      c,   0.0, -s,  0.0,
      0.0, 1.0, 0.0, 0.0,
      s,   0.0, c,   0.0,
      0.0, 0.0, 0.0, 1.0,
    )
  }

  #[rustfmt::skip]
  pub fn from_axis_angle(axis: Vec3<f32>, angle: f32) -> Self {
    let Vec3 { x: ax, y: ay, z: az } = axis;
    let (s, c) = angle.sin_cos();
    let tmp = 1.0 - c;

    Self::new(
      tmp * ax * ax + c,      tmp * ax * ay + s * az, tmp * ax * az - s * ay, 0.0,
      tmp * ax * ay - s * az, tmp * ay * ay + c,      tmp * ay * az + s * ax, 0.0,
      tmp * ax * az + s * ay, tmp * ay * az - s * ax, tmp * az * az + c,      0.0,
      0.0,                    0.0,                    0.0,                    1.0,
    )
  }

  #[rustfmt::skip]
  pub fn look_to_rh(eye: Vec3<f32>, dir: Vec3<f32>, up: Vec3<f32>) -> Self {
    let f = dir.normalized();
    let s = f.cross(up).normalized();
    let u = s.cross(f);

    Self::new(
        s.x,         u.x,         -f.x,       0.0,
        s.y,         u.y,         -f.y,       0.0,
        s.z,         u.z,         -f.z,       0.0,
        -eye.dot(s), -eye.dot(u), eye.dot(f), 1.0,
    )
  }

  /// Right-handed perspective projection with the OpenGL `[-1, 1]` depth range.
  #[rustfmt::skip]
  pub fn perspective_rh_no(fov_y: f32, aspect: f32, z_near: f32, z_far: f32) -> Self {
    let tan_half_fov_y = (fov_y / 2.0).tan();
    let c0r0 = 1.0 / (aspect * tan_half_fov_y);
    let c1r1 = 1.0 / tan_half_fov_y;
    let c2r2 = -(z_far + z_near) / (z_far - z_near);
    let c2r3 = -1.0;
    let c3r2 = -(2.0 * z_far * z_near) / (z_far - z_near);
    Self::new(
      c0r0, 0.0,  0.0,  0.0,
      0.0,  c1r1, 0.0,  0.0,
      0.0,  0.0,  c2r2, c2r3,
      0.0,  0.0,  c3r2, 0.0,
    )
  }

  #[inline]
  pub fn transform(&self, v: Vec4<f32>) -> Vec4<f32> {
    self.x * v.x + self.y * v.y + self.z * v.z + self.w * v.w
  }
}

impl Mul<Mat4<f32>> for Mat4<f32> {
  type Output = Self;
  fn mul(self, rhs: Self) -> Self {
    Self {
      x: self.transform(rhs.x),
      y: self.transform(rhs.y),
      z: self.transform(rhs.z),
      w: self.transform(rhs.w),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn identity_is_neutral() {
    let m = Mat4f::from_translation(vec3(1.0, 2.0, 3.0));
    assert_eq!(m * Mat4f::IDENTITY, m);
    assert_eq!(Mat4f::IDENTITY * m, m);
  }

  #[test]
  fn translation_moves_points_but_not_directions() {
    let m = Mat4f::from_translation(vec3(0.0, 0.0, -8.0));
    assert_eq!(m.transform(vec4(1.0, 1.0, 1.0, 1.0)), vec4(1.0, 1.0, -7.0, 1.0));
    assert_eq!(m.transform(vec4(1.0, 1.0, 1.0, 0.0)), vec4(1.0, 1.0, 1.0, 0.0));
  }

  #[test]
  fn products_compose_right_to_left() {
    let t = Mat4f::from_translation(vec3(1.0, 0.0, 0.0));
    let r = Mat4f::from_y_rotation(0.0);
    let p = vec4(0.0, 0.0, 0.0, 1.0);
    assert_eq!((t * r).transform(p), t.transform(r.transform(p)));
  }

  #[test]
  fn layout_is_column_major() {
    let m = Mat4f::from_translation(vec3(5.0, 6.0, 7.0));
    assert_eq!(&m.as_ref()[12..15], &[5.0, 6.0, 7.0]);
  }
}
