// See also:
// <https://github.com/rustgd/cgmath/blob/a691de871493f652836281e71e2c86c1eb5b50ca/src/vector.rs>
// <https://github.com/rustgd/cgmath/blob/a691de871493f652836281e71e2c86c1eb5b50ca/src/macros.rs>

use std::fmt;
use std::ops::*;

macro_rules! impl_vec_struct {
  ($name:ident, $ctor:ident, $ctor_n:ident, $len:literal, { $($field:ident),+ }) => {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
    #[repr(C)]
    pub struct $name<T> {
      $(pub $field: T),+
    }

    impl<T: fmt::Debug> fmt::Debug for $name<T> {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(stringify!($name))$(.field(&self.$field))+.finish()
      }
    }

    #[inline(always)]
    pub const fn $ctor<T>($($field: T),+) -> $name<T> { $name { $($field),+ } }

    #[inline]
    pub const fn $ctor_n<T: Copy>(n: T) -> $name<T> { $name { $($field: n),+ } }

    impl<T> $name<T> {
      pub const LEN: usize = $len;

      #[inline(always)]
      pub const fn new($($field: T),+) -> Self { Self { $($field),+ } }

      #[inline]
      pub fn map<U, F: FnMut(T) -> U>(self, mut op: F) -> $name<U> {
        $name { $($field: op(self.$field)),+ }
      }

      #[inline]
      pub fn zip<U, V, F: FnMut(T, U) -> V>(self, other: $name<U>, mut op: F) -> $name<V> {
        $name { $($field: op(self.$field, other.$field)),+ }
      }
    }

    impl<T: Copy> $name<T> {
      #[inline]
      pub fn to_array(self) -> [T; $len] { [$(self.$field),+] }
    }

    impl<T> From<[T; $len]> for $name<T> {
      #[inline(always)]
      fn from([$($field),+]: [T; $len]) -> Self { Self { $($field),+ } }
    }

    impl<T> AsRef<[T; $len]> for $name<T> {
      #[inline(always)]
      fn as_ref(&self) -> &[T; $len] { unsafe { &*(self as *const Self as *const [T; $len]) } }
    }

    impl<T: Add<Output = T>> Add for $name<T> {
      type Output = Self;
      #[inline]
      fn add(self, rhs: Self) -> Self { $name { $($field: self.$field + rhs.$field),+ } }
    }

    impl<T: Sub<Output = T>> Sub for $name<T> {
      type Output = Self;
      #[inline]
      fn sub(self, rhs: Self) -> Self { $name { $($field: self.$field - rhs.$field),+ } }
    }

    impl<T: Mul<Output = T>> Mul for $name<T> {
      type Output = Self;
      #[inline]
      fn mul(self, rhs: Self) -> Self { $name { $($field: self.$field * rhs.$field),+ } }
    }

    impl<T: Mul<Output = T> + Copy> Mul<T> for $name<T> {
      type Output = Self;
      #[inline]
      fn mul(self, rhs: T) -> Self { $name { $($field: self.$field * rhs),+ } }
    }

    impl<T: Div<Output = T> + Copy> Div<T> for $name<T> {
      type Output = Self;
      #[inline]
      fn div(self, rhs: T) -> Self { $name { $($field: self.$field / rhs),+ } }
    }

    impl<T: Neg<Output = T>> Neg for $name<T> {
      type Output = Self;
      #[inline]
      fn neg(self) -> Self { $name { $($field: -self.$field),+ } }
    }

    impl<T: Add<Output = T> + Mul<Output = T> + Copy + Default> $name<T> {
      #[inline]
      pub fn dot(self, rhs: Self) -> T {
        let mut sum = T::default();
        $(sum = sum + self.$field * rhs.$field;)+
        sum
      }

      #[inline]
      pub fn sqr_magnitude(self) -> T { self.dot(self) }
    }

    impl $name<f32> {
      pub const ZERO: Self = $ctor_n(0.0);
      pub const ONE: Self = $ctor_n(1.0);

      #[inline]
      pub fn magnitude(self) -> f32 { self.sqr_magnitude().sqrt() }
      #[inline]
      pub fn normalized(self) -> Self { self / self.magnitude() }
    }
  };
}

impl_vec_struct!(Vec2, vec2, vec2n, 2, { x, y });
impl_vec_struct!(Vec3, vec3, vec3n, 3, { x, y, z });
impl_vec_struct!(Vec4, vec4, vec4n, 4, { x, y, z, w });

pub type Vec2f = Vec2<f32>;
pub type Vec2i32 = Vec2<i32>;
pub type Vec2u32 = Vec2<u32>;
pub type Vec3f = Vec3<f32>;
pub type Vec4f = Vec4<f32>;

impl Vec3<f32> {
  pub const UP: Self = vec3(0.0, 1.0, 0.0);
  pub const RIGHT: Self = vec3(1.0, 0.0, 0.0);
  pub const FORWARD: Self = vec3(0.0, 0.0, -1.0);

  #[inline]
  pub fn cross(self, rhs: Self) -> Self {
    vec3(
      self.y * rhs.z - self.z * rhs.y,
      self.z * rhs.x - self.x * rhs.z,
      self.x * rhs.y - self.y * rhs.x,
    )
  }

  #[inline]
  pub fn extend(self, w: f32) -> Vec4<f32> { vec4(self.x, self.y, self.z, w) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn cross_product_of_basis_vectors() {
    assert_eq!(Vec3f::RIGHT.cross(Vec3f::UP), vec3(0.0, 0.0, 1.0));
    assert_eq!(Vec3f::UP.cross(Vec3f::RIGHT), vec3(0.0, 0.0, -1.0));
  }

  #[test]
  fn dot_and_magnitude() {
    let v = vec3(3.0f32, 4.0, 0.0);
    assert_eq!(v.dot(vec3(1.0, 1.0, 1.0)), 7.0);
    assert_eq!(v.magnitude(), 5.0);
    assert_eq!(v.normalized(), vec3(0.6, 0.8, 0.0));
  }

  #[test]
  fn memory_layout_matches_arrays() {
    let v = vec4(1u8, 2, 3, 4);
    assert_eq!(v.as_ref(), &[1, 2, 3, 4]);
    assert_eq!(std::mem::size_of::<Vec3f>(), 3 * 4);
    assert_eq!(Vec2::from([5, 6]), vec2(5, 6));
  }
}
