use omgl_math::*;
use prelude_plus::*;

gl_enum!({
  pub enum DataType {
    Bool = BOOL,
    I8 = BYTE,
    U8 = UNSIGNED_BYTE,
    I16 = SHORT,
    U16 = UNSIGNED_SHORT,
    I32 = INT,
    U32 = UNSIGNED_INT,
    F32 = FLOAT,
    F64 = DOUBLE,
  }
});

impl DataType {
  /// Size of a single value in bytes.
  pub const fn size(self) -> usize {
    match self {
      Self::Bool | Self::I8 | Self::U8 => 1,
      Self::I16 | Self::U16 => 2,
      Self::I32 | Self::U32 | Self::F32 => 4,
      Self::F64 => 8,
    }
  }

  pub const fn is_integer(self) -> bool { !matches!(self, Self::F32 | Self::F64) }

  pub const fn is_signed(self) -> bool {
    matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::F32 | Self::F64)
  }

  /// The suffix of the `glUniform*` family of functions accepting this type.
  pub const fn code(self) -> Option<&'static str> {
    Some(match self {
      Self::I8 => "b",
      Self::U8 => "ub",
      Self::I32 => "i",
      Self::U32 => "ui",
      Self::F32 => "f",
      Self::F64 => "d",
      Self::Bool | Self::I16 | Self::U16 => return None,
    })
  }

  pub fn from_code(code: &str) -> Option<Self> {
    Self::VARIANTS.iter().copied().find(|t| t.code() == Some(code))
  }
}

/// A primitive which GL can read and write directly.
///
/// # Safety
///
/// Every bit pattern of the implementing type must be a valid value, and its
/// layout must match [`Scalar::DATA_TYPE`].
pub unsafe trait Scalar: Copy + Default + PartialEq + fmt::Debug + 'static {
  const DATA_TYPE: DataType;
}

macro_rules! impl_scalar {
  ($($ty:ty => $variant:ident),+ $(,)?) => {
    $(unsafe impl Scalar for $ty { const DATA_TYPE: DataType = DataType::$variant; })+
  };
}

impl_scalar!(i8 => I8, u8 => U8, i16 => I16, u16 => U16, i32 => I32, u32 => U32, f32 => F32, f64 => F64);

/// Plain data which can be uploaded into and read back from buffers.
///
/// # Safety
///
/// The type must have no invalid bit patterns and no pointers.
pub unsafe trait BufferData: Copy + 'static {}

unsafe impl<T: Scalar> BufferData for T {}

/// Storage for reads from GL, which leaves it untouched when the call fails.
#[inline]
pub(crate) fn zeroed_vec<T: BufferData>(len: usize) -> Vec<T> {
  // all-zero bytes are a valid `T` per the `BufferData` contract
  vec![unsafe { mem::zeroed::<T>() }; len]
}
unsafe impl<T: Scalar, const N: usize> BufferData for [T; N] {}
unsafe impl<T: Scalar> BufferData for Vec2<T> {}
unsafe impl<T: Scalar> BufferData for Vec3<T> {}
unsafe impl<T: Scalar> BufferData for Vec4<T> {}
unsafe impl<T: Scalar> BufferData for Color<T> {}
unsafe impl<T: Scalar> BufferData for Mat4<T> {}

/// A value which fills a single vertex attribute: up to four scalars of the
/// same type.
pub trait VertexComponent: BufferData {
  const DATA_TYPE: DataType;
  const COMPONENTS: u32;
}

impl<T: Scalar> VertexComponent for T {
  const DATA_TYPE: DataType = T::DATA_TYPE;
  const COMPONENTS: u32 = 1;
}

impl<T: Scalar, const N: usize> VertexComponent for [T; N] {
  const DATA_TYPE: DataType = T::DATA_TYPE;
  const COMPONENTS: u32 = N as u32;
}

macro_rules! impl_vertex_component {
  ($($ty:ident => $n:literal),+ $(,)?) => {
    $(impl<T: Scalar> VertexComponent for $ty<T> {
      const DATA_TYPE: DataType = T::DATA_TYPE;
      const COMPONENTS: u32 = $n;
    })+
  };
}

impl_vertex_component!(Vec2 => 2, Vec3 => 3, Vec4 => 4, Color => 4);

/// Number of scalar components stored in one row of a buffer with the given
/// shape, i.e. the last dimension multiplied by the width of `T`.
pub(crate) fn components_per_row<T: VertexComponent>(shape: &[usize]) -> usize {
  let row = if shape.len() > 1 { shape[shape.len() - 1] } else { 1 };
  T::COMPONENTS as usize * row
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::gl;
  use pretty_assertions::assert_eq;

  #[test]
  fn sizes_match_rust_types() {
    assert_eq!(DataType::U8.size(), mem::size_of::<u8>());
    assert_eq!(DataType::I16.size(), mem::size_of::<i16>());
    assert_eq!(DataType::U32.size(), mem::size_of::<u32>());
    assert_eq!(DataType::F64.size(), mem::size_of::<f64>());
    assert_eq!(<f32 as Scalar>::DATA_TYPE, DataType::F32);
  }

  #[test]
  fn lookups() {
    assert_eq!(DataType::from_raw(gl::UNSIGNED_INT), Some(DataType::U32));
    assert_eq!(DataType::from_raw(gl::FLOAT_VEC3), None);
    assert_eq!(DataType::from_code("ui"), Some(DataType::U32));
    assert_eq!(DataType::from_code("d"), Some(DataType::F64));
    assert_eq!(DataType::from_code("s"), None);
    assert_eq!(DataType::Bool.code(), None);
  }

  #[test]
  fn flags() {
    assert!(DataType::Bool.is_integer());
    assert!(!DataType::F32.is_integer());
    assert!(DataType::I8.is_signed());
    assert!(!DataType::U16.is_signed());
  }

  #[test]
  fn read_storage_starts_zeroed() {
    assert_eq!(zeroed_vec::<Vec3f>(2), vec![vec3(0.0, 0.0, 0.0); 2]);
    assert_eq!(zeroed_vec::<[u16; 4]>(1), vec![[0; 4]]);
    assert!(zeroed_vec::<u8>(0).is_empty());
  }

  #[test]
  fn vertex_components() {
    assert_eq!(<[f32; 3] as VertexComponent>::COMPONENTS, 3);
    assert_eq!(<Vec2<u8> as VertexComponent>::DATA_TYPE, DataType::U8);
    assert_eq!(components_per_row::<f32>(&[8, 3]), 3);
    assert_eq!(components_per_row::<f32>(&[8]), 1);
    assert_eq!(components_per_row::<Vec4f>(&[8]), 4);
  }
}
