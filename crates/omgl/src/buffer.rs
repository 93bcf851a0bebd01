use crate::buffer_pointer::{BufferPointer, Vertex};
use crate::data_type::*;
use crate::impl_prelude::*;
use prelude_plus::*;

gl_enum!({
  pub enum BufferTarget {
    Array = ARRAY_BUFFER,
    AtomicCounter = ATOMIC_COUNTER_BUFFER,
    CopyRead = COPY_READ_BUFFER,
    CopyWrite = COPY_WRITE_BUFFER,
    DrawIndirect = DRAW_INDIRECT_BUFFER,
    ElementArray = ELEMENT_ARRAY_BUFFER,
    PixelPack = PIXEL_PACK_BUFFER,
    PixelUnpack = PIXEL_UNPACK_BUFFER,
    Texture = TEXTURE_BUFFER,
    TransformFeedback = TRANSFORM_FEEDBACK_BUFFER,
    Uniform = UNIFORM_BUFFER,
  }
});

impl BufferTarget {
  pub const fn default_usage(self) -> BufferUsage {
    match self {
      Self::Uniform => BufferUsage::DynamicDraw,
      _ => BufferUsage::StaticDraw,
    }
  }
}

gl_enum!({
  pub enum BufferUsage {
    StreamDraw = STREAM_DRAW,
    StreamRead = STREAM_READ,
    StreamCopy = STREAM_COPY,
    StaticDraw = STATIC_DRAW,
    StaticRead = STATIC_READ,
    StaticCopy = STATIC_COPY,
    DynamicDraw = DYNAMIC_DRAW,
    DynamicRead = DYNAMIC_READ,
    DynamicCopy = DYNAMIC_COPY,
  }
});

impl Default for BufferUsage {
  fn default() -> Self { Self::StaticDraw }
}

gl_enum!({
  pub enum BufferAccess {
    ReadOnly = READ_ONLY,
    WriteOnly = WRITE_ONLY,
    ReadWrite = READ_WRITE,
  }
});

impl BufferAccess {
  #[inline(always)]
  pub const fn is_writable(self) -> bool { !matches!(self, Self::ReadOnly) }
  #[inline(always)]
  pub const fn is_readable(self) -> bool { !matches!(self, Self::WriteOnly) }
}

gl_enum!({
  pub enum DrawPrimitive {
    Points = POINTS,
    LineStrip = LINE_STRIP,
    LineLoop = LINE_LOOP,
    Lines = LINES,
    LineStripAdjacency = LINE_STRIP_ADJACENCY,
    LinesAdjacency = LINES_ADJACENCY,
    TriangleStrip = TRIANGLE_STRIP,
    TriangleFan = TRIANGLE_FAN,
    Triangles = TRIANGLES,
    TriangleStripAdjacency = TRIANGLE_STRIP_ADJACENCY,
    TrianglesAdjacency = TRIANGLES_ADJACENCY,
    Patches = PATCHES,
  }
});

/// Number of elements described by a shape. An empty shape holds a single
/// element.
#[inline]
pub(crate) fn shape_len(shape: &[usize]) -> usize { shape.iter().product() }

pub(crate) fn check_range(start: usize, count: usize, len: usize) -> Result<()> {
  match start.checked_add(count) {
    Some(end) if end <= len => Ok(()),
    _ => Err(Error::invalid(format!(
      "elements {}..{} are out of bounds of length {}",
      start,
      start.saturating_add(count),
      len,
    ))),
  }
}

/// A GL buffer object holding a tightly packed array of `T`.
///
/// Data transfers bind the buffer to `GL_COPY_WRITE_BUFFER`, which leaves the
/// vertex array and index bindings alone.
#[derive(Debug)]
pub struct Buffer<T: BufferData> {
  ctx: SharedContext,
  addr: u32,
  target: BufferTarget,
  usage: BufferUsage,
  shape: Vec<usize>,
  len: usize,
  offset: usize,
  mapped: Cell<bool>,
  phantom: PhantomData<*mut T>,
}

unsafe impl<T: BufferData> Object for Buffer<T> {
  const DEBUG_TYPE_IDENTIFIER: u32 = gl::BUFFER;

  #[inline(always)]
  fn ctx(&self) -> &SharedContext { &self.ctx }
  #[inline(always)]
  fn addr(&self) -> u32 { self.addr }
}

impl<T: BufferData> Buffer<T> {
  #[inline(always)]
  pub fn target(&self) -> BufferTarget { self.target }
  #[inline(always)]
  pub fn usage(&self) -> BufferUsage { self.usage }
  #[inline(always)]
  pub fn shape(&self) -> &[usize] { &self.shape }
  #[inline(always)]
  pub fn len(&self) -> usize { self.len }
  #[inline(always)]
  pub fn is_empty(&self) -> bool { self.len == 0 }
  #[inline(always)]
  pub fn itemsize(&self) -> usize { mem::size_of::<T>() }
  #[inline(always)]
  pub fn nbytes(&self) -> usize { self.len * mem::size_of::<T>() }
  /// Byte offset of the first element within the buffer store.
  #[inline(always)]
  pub fn offset(&self) -> usize { self.offset }
  #[inline(always)]
  pub fn is_mapped(&self) -> bool { self.mapped.get() }

  /// Creates a buffer filled with `data`. The shape defaults to
  /// `[data.len()]`, otherwise its product must equal `data.len()`.
  pub fn with_data(
    ctx: SharedContext,
    target: BufferTarget,
    data: &[T],
    shape: Option<&[usize]>,
    usage: Option<BufferUsage>,
  ) -> Result<Self> {
    let shape = match shape {
      Some(shape) if shape_len(shape) != data.len() => {
        return Err(Error::invalid(format!(
          "shape {:?} doesn't match the data length {}",
          shape,
          data.len(),
        )));
      }
      Some(shape) => shape.to_vec(),
      None => vec![data.len()],
    };
    Self::allocate(ctx, target, shape, usage, data.as_ptr())
  }

  /// Creates a buffer with uninitialized contents.
  pub fn with_shape(
    ctx: SharedContext,
    target: BufferTarget,
    shape: &[usize],
    usage: Option<BufferUsage>,
  ) -> Result<Self> {
    Self::allocate(ctx, target, shape.to_vec(), usage, ptr::null())
  }

  #[inline]
  pub fn array(ctx: SharedContext, data: &[T]) -> Result<Self> {
    Self::with_data(ctx, BufferTarget::Array, data, None, None)
  }

  #[inline]
  pub fn uniform(ctx: SharedContext, data: &[T]) -> Result<Self> {
    Self::with_data(ctx, BufferTarget::Uniform, data, None, None)
  }

  /// Adopts an existing buffer object, which is deleted when the wrapper is
  /// dropped. `offset` is the byte offset of the first element of the view.
  ///
  /// # Safety
  ///
  /// `addr` must name a buffer of the context whose store holds at least
  /// `offset + shape_len(shape) * size_of::<T>()` bytes, and nothing else
  /// may delete it.
  pub unsafe fn from_raw(
    ctx: SharedContext,
    addr: u32,
    target: BufferTarget,
    shape: &[usize],
    offset: usize,
    usage: Option<BufferUsage>,
  ) -> Result<Self> {
    if offset % mem::align_of::<T>() != 0 {
      return Err(Error::invalid(format!("offset {} is misaligned for the element type", offset)));
    }
    let len = shape_len(shape);
    Ok(Self {
      ctx,
      addr,
      target,
      usage: usage.unwrap_or(target.default_usage()),
      shape: shape.to_vec(),
      len,
      offset,
      mapped: Cell::new(false),
      phantom: PhantomData,
    })
  }

  fn allocate(
    ctx: SharedContext,
    target: BufferTarget,
    shape: Vec<usize>,
    usage: Option<BufferUsage>,
    data: *const T,
  ) -> Result<Self> {
    let len = shape_len(&shape);
    let nbytes = len.checked_mul(mem::size_of::<T>()).unwrap_or(0);
    if nbytes == 0 {
      return Err(Error::invalid(format!("buffer of shape {:?} would hold no data", shape)));
    }
    let gl_nbytes =
      isize::try_from(nbytes).map_err(|_| Error::invalid(format!("{} bytes is too large a buffer", nbytes)))?;
    let usage = usage.unwrap_or(target.default_usage());

    let mut addr = 0;
    unsafe { ctx.raw_gl().GenBuffers(1, &mut addr) };
    let buffer = Self {
      ctx,
      addr,
      target,
      usage,
      shape,
      len,
      offset: 0,
      mapped: Cell::new(false),
      phantom: PhantomData,
    };

    {
      let binding = buffer.bind_to(BufferTarget::CopyWrite);
      unsafe {
        binding.raw_gl().BufferData(gl::COPY_WRITE_BUFFER, gl_nbytes, data as *const c_void, usage.as_raw())
      };
    }
    trace!("created buffer #{} of shape {:?} for {:?}", buffer.addr, buffer.shape, target);
    Ok(buffer)
  }

  /// Binds the buffer to its own target.
  #[inline(always)]
  pub fn bind(&self) -> BufferBinding<'_, T> { self.bind_to(self.target) }

  pub fn bind_to(&self, target: BufferTarget) -> BufferBinding<'_, T> {
    let previous = self.ctx.bound_buffer(target).bind_scoped(self.raw_gl(), self.addr);
    BufferBinding { buffer: self, target, previous }
  }

  #[inline]
  fn byte_range(&self, offset: usize, count: usize) -> (isize, isize) {
    let size = mem::size_of::<T>();
    ((self.offset + offset * size) as isize, (count * size) as isize)
  }

  /// Reads `len` elements starting at element `offset`, everything up to the
  /// end when `len` is `None`.
  pub fn get_data(&self, offset: usize, len: Option<usize>) -> Result<Vec<T>> {
    if self.mapped.get() {
      return Err(Error::AlreadyMapped);
    }
    let len = len.unwrap_or_else(|| self.len.saturating_sub(offset));
    check_range(offset, len, self.len)?;

    let (byte_offset, byte_len) = self.byte_range(offset, len);
    let mut data: Vec<T> = zeroed_vec(len);
    let binding = self.bind_to(BufferTarget::CopyWrite);
    unsafe {
      binding.raw_gl().GetBufferSubData(
        gl::COPY_WRITE_BUFFER,
        byte_offset,
        byte_len,
        data.as_mut_ptr() as *mut c_void,
      )
    };
    Ok(data)
  }

  /// Overwrites elements starting at element `offset`.
  pub fn set_data(&self, offset: usize, data: &[T]) -> Result<()> {
    if self.mapped.get() {
      return Err(Error::AlreadyMapped);
    }
    check_range(offset, data.len(), self.len)?;

    let (byte_offset, byte_len) = self.byte_range(offset, data.len());
    let binding = self.bind_to(BufferTarget::CopyWrite);
    unsafe {
      binding.raw_gl().BufferSubData(
        gl::COPY_WRITE_BUFFER,
        byte_offset,
        byte_len,
        data.as_ptr() as *const c_void,
      )
    };
    Ok(())
  }

  pub fn map(&mut self, access: BufferAccess) -> Result<MappedBuffer<'_, T>> {
    if self.mapped.get() {
      return Err(Error::AlreadyMapped);
    }

    let raw_ptr = {
      let binding = self.bind_to(BufferTarget::CopyWrite);
      unsafe { binding.raw_gl().MapBuffer(gl::COPY_WRITE_BUFFER, access.as_raw()) }
    };
    if raw_ptr.is_null() {
      return Err(Error::invalid(format!("the driver refused to map buffer #{}", self.addr)));
    }
    self.mapped.set(true);

    let ptr = unsafe { (raw_ptr as *mut u8).add(self.offset) } as *mut T;
    Ok(MappedBuffer { buffer: self, ptr, access })
  }

  /// Returns `false` when the store got corrupted while it was mapped, e.g.
  /// because of a screen mode change.
  pub fn unmap(&mut self) -> Result<bool> {
    if !self.mapped.get() {
      return Err(Error::NotMapped);
    }
    let intact = {
      let binding = self.bind_to(BufferTarget::CopyWrite);
      unsafe { binding.raw_gl().UnmapBuffer(gl::COPY_WRITE_BUFFER) }
    };
    self.mapped.set(false);
    Ok(intact != gl::FALSE)
  }
}

impl<T: VertexComponent> Buffer<T> {
  /// A pointer which feeds one attribute per row, with as many components as
  /// the last dimension of the shape holds.
  pub fn pointer(&self) -> Result<BufferPointer> {
    let count = components_per_row::<T>(&self.shape);
    BufferPointer::new(self, count as u32, None, 0, T::DATA_TYPE, false)
  }
}

impl<T: Vertex> Buffer<T> {
  /// One pointer per field of the vertex struct.
  pub fn pointers(&self) -> Result<BTreeMap<&'static str, BufferPointer>> {
    T::fields()
      .into_iter()
      .map(|field| {
        let pointer = BufferPointer::new(
          self,
          field.components,
          Some(mem::size_of::<T>()),
          field.offset,
          field.data_type,
          false,
        )?;
        Ok((field.name, pointer))
      })
      .collect()
  }
}

impl<T: BufferData> Drop for Buffer<T> {
  fn drop(&mut self) {
    self.ctx.forget_buffer(self.addr);
    unsafe { self.raw_gl().DeleteBuffers(1, &self.addr) };
  }
}

#[derive(Debug)]
pub struct BufferBinding<'obj, T: BufferData> {
  buffer: &'obj Buffer<T>,
  target: BufferTarget,
  previous: u32,
}

impl<'obj, T: BufferData> ObjectBinding<Buffer<T>> for BufferBinding<'obj, T> {
  #[inline(always)]
  fn object(&self) -> &Buffer<T> { self.buffer }
}

impl<'obj, T: BufferData> BufferBinding<'obj, T> {
  #[inline(always)]
  pub fn target(&self) -> BufferTarget { self.target }
}

impl<'obj, T: BufferData> Drop for BufferBinding<'obj, T> {
  fn drop(&mut self) {
    let ctx = self.buffer.ctx();
    ctx.bound_buffer(self.target).bind_if_needed(ctx.raw_gl(), self.previous);
  }
}

/// Direct access to the store of a mapped buffer. The buffer is unmapped when
/// the guard is dropped.
#[derive(Debug)]
pub struct MappedBuffer<'obj, T: BufferData> {
  buffer: &'obj mut Buffer<T>,
  ptr: *mut T,
  access: BufferAccess,
}

impl<'obj, T: BufferData> MappedBuffer<'obj, T> {
  #[inline(always)]
  pub fn access(&self) -> BufferAccess { self.access }

  /// Write-only mappings may point at memory the driver never filled in.
  pub fn as_slice(&self) -> Result<&[T]> {
    if !self.access.is_readable() {
      return Err(Error::WriteOnlyMapping);
    }
    Ok(unsafe { slice::from_raw_parts(self.ptr, self.buffer.len) })
  }

  pub fn get(&self, index: usize) -> Result<T> {
    check_range(index, 1, self.buffer.len)?;
    Ok(self.as_slice()?[index])
  }

  pub fn as_mut_slice(&mut self) -> Result<&mut [T]> {
    if !self.access.is_writable() {
      return Err(Error::ReadOnlyMapping);
    }
    Ok(unsafe { slice::from_raw_parts_mut(self.ptr, self.buffer.len) })
  }

  pub fn set(&mut self, index: usize, value: T) -> Result<()> {
    check_range(index, 1, self.buffer.len)?;
    self.as_mut_slice()?[index] = value;
    Ok(())
  }

  pub fn copy_from_slice(&mut self, offset: usize, data: &[T]) -> Result<()> {
    check_range(offset, data.len(), self.buffer.len)?;
    self.as_mut_slice()?[offset..offset + data.len()].copy_from_slice(data);
    Ok(())
  }

  #[inline(always)]
  pub fn unmap(self) -> Result<bool> {
    let mut this = mem::ManuallyDrop::new(self);
    this.buffer.unmap()
  }
}

impl<'obj, T: BufferData> Drop for MappedBuffer<'obj, T> {
  fn drop(&mut self) {
    if self.buffer.is_mapped() {
      if let Err(e) = self.buffer.unmap() {
        warn!("failed to unmap buffer #{}: {}", self.buffer.addr, e);
      }
    }
  }
}

/// Integer types usable as vertex indices.
pub unsafe trait BufferIndex: Scalar {}

unsafe impl BufferIndex for u8 {}
unsafe impl BufferIndex for u16 {}
unsafe impl BufferIndex for u32 {}

impl<T: BufferIndex> Buffer<T> {
  #[inline]
  pub fn element(ctx: SharedContext, data: &[T]) -> Result<Self> {
    Self::with_data(ctx, BufferTarget::ElementArray, data, None, None)
  }

  /// Draws `count` indices starting at index `start`, the rest of the buffer
  /// when `count` is `None`. A vertex array must be bound.
  pub fn draw_elements(&self, primitive: DrawPrimitive, start: usize, count: Option<usize>) -> Result<()> {
    let count = count.unwrap_or_else(|| self.len.saturating_sub(start));
    check_range(start, count, self.len)?;
    let gl_count =
      i32::try_from(count).map_err(|_| Error::invalid(format!("cannot draw {} indices at once", count)))?;

    let binding = self.bind_to(BufferTarget::ElementArray);
    let byte_offset = self.offset + start * mem::size_of::<T>();
    unsafe {
      binding.raw_gl().DrawElements(
        primitive.as_raw(),
        gl_count,
        T::DATA_TYPE.as_raw(),
        byte_offset as *const c_void,
      )
    };
    Ok(())
  }
}

/// Type-erased access to index buffers, so that meshes can hold any index type.
pub trait IndexSource: fmt::Debug {
  fn index_count(&self) -> usize;
  fn draw_elements(&self, primitive: DrawPrimitive, start: usize, count: Option<usize>) -> Result<()>;
}

impl<T: BufferIndex> IndexSource for Buffer<T> {
  #[inline(always)]
  fn index_count(&self) -> usize { self.len }

  fn draw_elements(&self, primitive: DrawPrimitive, start: usize, count: Option<usize>) -> Result<()> {
    Buffer::<T>::draw_elements(self, primitive, start, count)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn shape_lengths() {
    assert_eq!(shape_len(&[4, 3]), 12);
    assert_eq!(shape_len(&[7]), 7);
    assert_eq!(shape_len(&[]), 1);
    assert_eq!(shape_len(&[5, 0]), 0);
  }

  #[test]
  fn ranges() {
    assert!(check_range(0, 4, 4).is_ok());
    assert!(check_range(4, 0, 4).is_ok());
    assert!(check_range(3, 2, 4).is_err());
    assert!(check_range(usize::MAX, 2, 4).is_err());
  }

  #[test]
  fn default_usages() {
    assert_eq!(BufferTarget::Array.default_usage(), BufferUsage::StaticDraw);
    assert_eq!(BufferTarget::Uniform.default_usage(), BufferUsage::DynamicDraw);
    assert_eq!(BufferUsage::default(), BufferUsage::StaticDraw);
  }

  #[test]
  fn access_writability() {
    assert!(!BufferAccess::ReadOnly.is_writable());
    assert!(BufferAccess::WriteOnly.is_writable());
    assert!(BufferAccess::ReadWrite.is_writable());
    assert!(BufferAccess::ReadOnly.is_readable());
    assert!(!BufferAccess::WriteOnly.is_readable());
    assert!(BufferAccess::ReadWrite.is_readable());
  }
}
