use crate::buffer::{Buffer, BufferTarget};
use crate::data_type::*;
use crate::impl_prelude::*;
use prelude_plus::*;

/// Describes how a vertex attribute reads its values out of a buffer.
#[derive(Debug, Clone)]
pub struct BufferPointer {
  ctx: SharedContext,
  buffer_addr: u32,
  buffer_nbytes: usize,
  count: u32,
  stride: usize,
  offset: usize,
  data_type: DataType,
  normalize: bool,
}

impl BufferPointer {
  /// `offset` is relative to the first element of the buffer view, `stride`
  /// defaults to tightly packed values.
  pub fn new<T: BufferData>(
    buffer: &Buffer<T>,
    count: u32,
    stride: Option<usize>,
    offset: usize,
    data_type: DataType,
    normalize: bool,
  ) -> Result<Self> {
    if !(1..=4).contains(&count) {
      return Err(Error::invalid(format!("an attribute has 1 to 4 components, not {}", count)));
    }
    if data_type == DataType::Bool {
      return Err(Error::invalid("booleans cannot be fed into vertex attributes"));
    }
    let stride = stride.unwrap_or(count as usize * data_type.size());
    if stride == 0 || i32::try_from(stride).is_err() {
      return Err(Error::invalid(format!("invalid attribute stride {}", stride)));
    }

    Ok(Self {
      ctx: Rc::clone(buffer.ctx()),
      buffer_addr: buffer.addr(),
      buffer_nbytes: buffer.offset() + buffer.nbytes(),
      count,
      stride,
      offset: buffer.offset() + offset,
      data_type,
      normalize,
    })
  }

  #[inline(always)]
  pub fn buffer_addr(&self) -> u32 { self.buffer_addr }
  #[inline(always)]
  pub fn count(&self) -> u32 { self.count }
  #[inline(always)]
  pub fn stride(&self) -> usize { self.stride }
  #[inline(always)]
  pub fn offset(&self) -> usize { self.offset }
  #[inline(always)]
  pub fn data_type(&self) -> DataType { self.data_type }
  #[inline(always)]
  pub fn normalize(&self) -> bool { self.normalize }

  #[inline]
  pub fn with_normalize(mut self, normalize: bool) -> Self {
    self.normalize = normalize;
    self
  }

  /// Number of vertices addressable through this pointer.
  pub fn len(&self) -> usize {
    vertex_count(self.buffer_nbytes, self.offset, self.stride)
  }

  #[inline(always)]
  pub fn is_empty(&self) -> bool { self.len() == 0 }

  /// Enables the attribute at `location` of the currently bound vertex array
  /// and points it at the buffer.
  pub fn enable(&self, location: u32) {
    let gl = self.ctx.raw_gl();
    self.ctx.bound_buffer(BufferTarget::Array).bind_if_needed(gl, self.buffer_addr);

    let stride = self.stride as i32;
    let offset = self.offset as *const c_void;
    let count = self.count as i32;
    let type_ = self.data_type.as_raw();
    unsafe {
      gl.EnableVertexAttribArray(location);
      match self.data_type {
        DataType::F64 => gl.VertexAttribLPointer(location, count, type_, stride, offset),
        t if t.is_integer() && !self.normalize => {
          gl.VertexAttribIPointer(location, count, type_, stride, offset)
        }
        _ => gl.VertexAttribPointer(location, count, type_, self.normalize as u8, stride, offset),
      }
    }
  }

  pub fn disable(&self, location: u32) {
    unsafe { self.ctx.raw_gl().DisableVertexAttribArray(location) };
  }
}

#[inline]
pub(crate) fn vertex_count(nbytes: usize, offset: usize, stride: usize) -> usize {
  nbytes.saturating_sub(offset - offset % stride) / stride
}

/// A field of a vertex struct.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexField {
  pub name: &'static str,
  pub data_type: DataType,
  pub components: u32,
  pub offset: usize,
}

impl VertexField {
  /// Used by [`impl_vertex!`], the pointer is only inspected for its type.
  #[doc(hidden)]
  #[inline(always)]
  pub fn of_ptr<C: VertexComponent>(name: &'static str, _field_ptr: *const C, offset: usize) -> Self {
    Self { name, data_type: C::DATA_TYPE, components: C::COMPONENTS, offset }
  }
}

/// A `#[repr(C)]` struct stored in array buffers, see [`impl_vertex!`].
///
/// # Safety
///
/// `fields` must describe fields which lie within the struct.
pub unsafe trait Vertex: BufferData {
  fn fields() -> Vec<VertexField>;
}

/// Implements [`Vertex`] for a `#[repr(C)]` struct. All fields of the struct
/// must be listed and every one of them must be a [`VertexComponent`].
///
/// ```ignore
/// #[repr(C)]
/// #[derive(Copy, Clone)]
/// struct CubeVertex {
///   position: Vec3f,
///   uv: [f32; 2],
/// }
///
/// omgl::impl_vertex!(CubeVertex { position, uv });
/// ```
#[macro_export]
macro_rules! impl_vertex {
  ($struct_name:ident { $($field:ident),+ $(,)? }) => {
    unsafe impl $crate::BufferData for $struct_name {}

    unsafe impl $crate::Vertex for $struct_name {
      fn fields() -> ::std::vec::Vec<$crate::VertexField> {
        let dummy = ::std::mem::MaybeUninit::<$struct_name>::uninit();
        let dummy_ptr = dummy.as_ptr();
        ::std::vec![$({
          let field_ptr = unsafe { ::std::ptr::addr_of!((*dummy_ptr).$field) };
          let offset = field_ptr as usize - dummy_ptr as usize;
          $crate::VertexField::of_ptr(::std::stringify!($field), field_ptr, offset)
        }),+]
      }
    }
  };
}

#[cfg(test)]
mod tests {
  use super::*;
  use omgl_math::*;
  use pretty_assertions::assert_eq;

  #[repr(C)]
  #[derive(Debug, Copy, Clone)]
  struct TestVertex {
    position: Vec3f,
    color: [u8; 4],
    uv: Vec2<f32>,
    weight: f64,
  }

  crate::impl_vertex!(TestVertex { position, color, uv, weight });

  #[test]
  fn vertex_fields_are_derived_from_the_layout() {
    let fields = TestVertex::fields();
    assert_eq!(
      fields,
      vec![
        VertexField { name: "position", data_type: DataType::F32, components: 3, offset: 0 },
        VertexField { name: "color", data_type: DataType::U8, components: 4, offset: 12 },
        VertexField { name: "uv", data_type: DataType::F32, components: 2, offset: 16 },
        VertexField { name: "weight", data_type: DataType::F64, components: 1, offset: 24 },
      ],
    );
    assert_eq!(mem::size_of::<TestVertex>(), 32);
  }

  #[test]
  fn vertex_count_of_interleaved_data() {
    // 5 vertices of 20 bytes, attribute at byte 12 of each vertex
    assert_eq!(vertex_count(100, 12, 20), 5);
    // tightly packed vec3s
    assert_eq!(vertex_count(36, 0, 12), 3);
    // a pointer starting at the second vertex
    assert_eq!(vertex_count(100, 32, 20), 4);
    assert_eq!(vertex_count(10, 40, 20), 0);
  }
}
