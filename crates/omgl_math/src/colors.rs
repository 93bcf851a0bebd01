use std::fmt;

#[derive(Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(C)]
pub struct Color<T> {
  pub r: T,
  pub g: T,
  pub b: T,
  pub a: T,
}

impl<T: fmt::Debug> fmt::Debug for Color<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Color").field(&self.r).field(&self.g).field(&self.b).field(&self.a).finish()
  }
}

pub type Colorf = Color<f32>;

#[inline(always)]
pub const fn color<T>(r: T, g: T, b: T, a: T) -> Color<T> { Color { r, g, b, a } }

impl<T: Copy> Color<T> {
  #[inline]
  pub fn to_array(self) -> [T; 4] { [self.r, self.g, self.b, self.a] }
}

impl<T> From<[T; 4]> for Color<T> {
  #[inline(always)]
  fn from([r, g, b, a]: [T; 4]) -> Self { Self { r, g, b, a } }
}
