use crate::buffer::{check_range, DrawPrimitive, IndexSource};
use crate::buffer_pointer::BufferPointer;
use crate::impl_prelude::*;
use prelude_plus::*;

/// A vertex array object together with the pointers enabled in it, keyed by
/// attribute location.
#[derive(Debug)]
pub struct VertexArray {
  ctx: SharedContext,
  addr: u32,
  pointers: BTreeMap<u32, BufferPointer>,
}

unsafe impl Object for VertexArray {
  const DEBUG_TYPE_IDENTIFIER: u32 = gl::VERTEX_ARRAY;

  #[inline(always)]
  fn ctx(&self) -> &SharedContext { &self.ctx }
  #[inline(always)]
  fn addr(&self) -> u32 { self.addr }
}

impl VertexArray {
  pub fn new(ctx: SharedContext) -> Self {
    let mut addr = 0;
    unsafe { ctx.raw_gl().GenVertexArrays(1, &mut addr) };
    Self { ctx, addr, pointers: BTreeMap::new() }
  }

  pub fn bind(&self) -> VertexArrayBinding<'_> {
    let previous = self.ctx.bound_vertex_array.bind_scoped(self.raw_gl(), self.addr);
    if previous != self.addr {
      self.ctx.on_vertex_array_changed();
    }
    VertexArrayBinding { vertex_array: self, previous }
  }

  #[inline(always)]
  pub fn get(&self, location: u32) -> Option<&BufferPointer> { self.pointers.get(&location) }
  #[inline(always)]
  pub fn len(&self) -> usize { self.pointers.len() }
  #[inline(always)]
  pub fn is_empty(&self) -> bool { self.pointers.is_empty() }
  #[inline(always)]
  pub fn locations(&self) -> impl Iterator<Item = u32> + '_ { self.pointers.keys().copied() }
  #[inline(always)]
  pub fn pointers(&self) -> &BTreeMap<u32, BufferPointer> { &self.pointers }

  /// Enables `pointer` at `location`, replacing whatever was there.
  pub fn set(&mut self, location: u32, pointer: BufferPointer) -> Result<()> {
    let max_attribs = self.ctx.capabilities().max_vertex_attribs;
    if location >= max_attribs {
      return Err(Error::invalid(format!(
        "attribute location {} exceeds the limit of {}",
        location, max_attribs,
      )));
    }
    {
      let _binding = self.bind();
      pointer.enable(location);
    }
    self.pointers.insert(location, pointer);
    Ok(())
  }

  pub fn remove(&mut self, location: u32) -> Option<BufferPointer> {
    let pointer = self.pointers.remove(&location)?;
    let _binding = self.bind();
    pointer.disable(location);
    Some(pointer)
  }

  pub fn clear(&mut self) {
    let pointers = mem::take(&mut self.pointers);
    let _binding = self.bind();
    for (location, pointer) in pointers {
      pointer.disable(location);
    }
  }

  /// The number of vertices every enabled pointer can supply.
  pub fn count(&self) -> usize { self.pointers.values().map(BufferPointer::len).min().unwrap_or(0) }

  /// Draws `count` vertices starting at `start`, or all remaining ones.
  pub fn render(&self, primitive: DrawPrimitive, start: usize, count: Option<usize>) -> Result<()> {
    let available = self.count();
    let count = count.unwrap_or_else(|| available.saturating_sub(start));
    check_range(start, count, available)?;
    let to_i32 =
      |n: usize| i32::try_from(n).map_err(|_| Error::invalid(format!("{} vertices is too many", n)));
    let (gl_start, gl_count) = (to_i32(start)?, to_i32(count)?);

    let binding = self.bind();
    unsafe { binding.raw_gl().DrawArrays(primitive.as_raw(), gl_start, gl_count) };
    Ok(())
  }

  /// Draws through an index buffer with this vertex array bound.
  pub fn render_indices(
    &self,
    indices: &dyn IndexSource,
    primitive: DrawPrimitive,
    start: usize,
    count: Option<usize>,
  ) -> Result<()> {
    let _binding = self.bind();
    indices.draw_elements(primitive, start, count)
  }
}

impl Drop for VertexArray {
  fn drop(&mut self) {
    self.ctx.bound_vertex_array.forget(self.addr);
    unsafe { self.raw_gl().DeleteVertexArrays(1, &self.addr) };
  }
}

#[derive(Debug)]
pub struct VertexArrayBinding<'obj> {
  vertex_array: &'obj VertexArray,
  previous: u32,
}

impl<'obj> ObjectBinding<VertexArray> for VertexArrayBinding<'obj> {
  #[inline(always)]
  fn object(&self) -> &VertexArray { self.vertex_array }
}

impl<'obj> Drop for VertexArrayBinding<'obj> {
  fn drop(&mut self) {
    let ctx = self.vertex_array.ctx();
    if ctx.bound_vertex_array.bound_addr() != Some(self.previous) {
      ctx.bound_vertex_array.bind_if_needed(ctx.raw_gl(), self.previous);
      ctx.on_vertex_array_changed();
    }
  }
}
