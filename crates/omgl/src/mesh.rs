use crate::buffer::{Buffer, DrawPrimitive, IndexSource};
use crate::buffer_pointer::{BufferPointer, Vertex};
use crate::impl_prelude::*;
use crate::pipeline::{Pipeline, PipelineValue};
use crate::variables::{find_active, VariableKind};
use crate::vertex_array::VertexArray;
use prelude_plus::*;

/// One draw call: a pipeline, the vertex attributes it reads and optionally
/// an index buffer.
#[derive(Debug)]
pub struct SubMesh {
  pipeline: Rc<Pipeline>,
  vertex_array: VertexArray,
  indices: Option<Rc<dyn IndexSource>>,
  primitive: DrawPrimitive,
}

impl SubMesh {
  /// Connects every pointer to the program attribute of the same name.
  pub fn new<K, I>(pipeline: Rc<Pipeline>, pointers: I) -> Result<Self>
  where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, BufferPointer)>,
  {
    let program = Rc::clone(pipeline.program());
    let mut vertex_array = VertexArray::new(Rc::clone(program.ctx()));
    let located = attribute_locations(program.addr(), program.attributes(), |a| a.attrib_location(), pointers);
    for (location, pointer) in located {
      vertex_array.set(location, pointer)?;
    }
    Ok(Self { pipeline, vertex_array, indices: None, primitive: DrawPrimitive::Triangles })
  }

  /// Uses every field of the vertex type stored in `buffer`.
  pub fn from_buffer<T: Vertex>(pipeline: Rc<Pipeline>, buffer: &Buffer<T>) -> Result<Self> {
    Self::new(pipeline, buffer.pointers()?)
  }

  pub fn with_indices(mut self, indices: Rc<dyn IndexSource>) -> Self {
    self.indices = Some(indices);
    self
  }

  pub fn with_primitive(mut self, primitive: DrawPrimitive) -> Self {
    self.primitive = primitive;
    self
  }

  #[inline(always)]
  pub fn pipeline(&self) -> &Rc<Pipeline> { &self.pipeline }
  #[inline(always)]
  pub fn vertex_array(&self) -> &VertexArray { &self.vertex_array }
  #[inline(always)]
  pub fn vertex_array_mut(&mut self) -> &mut VertexArray { &mut self.vertex_array }
  #[inline(always)]
  pub fn indices(&self) -> Option<&Rc<dyn IndexSource>> { self.indices.as_ref() }
  #[inline(always)]
  pub fn primitive(&self) -> DrawPrimitive { self.primitive }

  /// Binds the pipeline, applies `uniforms` on top of its properties and
  /// draws.
  pub fn render(&self, uniforms: &[(&str, PipelineValue)]) -> Result<()> {
    let mut binding = self.pipeline.bind()?;
    binding.set_uniforms(uniforms)?;
    match &self.indices {
      Some(indices) => self.vertex_array.render_indices(indices.as_ref(), self.primitive, 0, None),
      None => self.vertex_array.render(self.primitive, 0, None),
    }
  }
}

/// Pairs every pointer with the location of the active attribute of the same
/// name. Pointers without one are skipped.
fn attribute_locations<V, K, P>(
  program: u32,
  attributes: &BTreeMap<String, V>,
  location: impl Fn(&V) -> Option<u32>,
  pointers: impl IntoIterator<Item = (K, P)>,
) -> Vec<(u32, P)>
where
  K: AsRef<str>,
{
  pointers
    .into_iter()
    .filter_map(|(name, pointer)| {
      let name = name.as_ref();
      let attribute = find_active(program, attributes, VariableKind::Attribute, name)?;
      match location(attribute) {
        Some(location) => Some((location, pointer)),
        None => {
          debug!("attribute {:?} of program #{} has no location", name, program);
          None
        }
      }
    })
    .collect()
}

#[derive(Debug, Default)]
pub struct Mesh {
  pub submeshes: Vec<SubMesh>,
}

impl Mesh {
  pub fn new(submeshes: Vec<SubMesh>) -> Self { Self { submeshes } }

  pub fn push(&mut self, submesh: SubMesh) { self.submeshes.push(submesh); }

  pub fn render(&self, uniforms: &[(&str, PipelineValue)]) -> Result<()> {
    for submesh in &self.submeshes {
      submesh.render(uniforms)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn attributes() -> BTreeMap<String, i32> {
    [("in_position", 0), ("in_uv", 1), ("gl_VertexID", -1)].iter().map(|&(n, l)| (n.to_owned(), l)).collect()
  }

  #[test]
  fn pointers_are_matched_to_attributes_by_name() {
    let located = attribute_locations(1, &attributes(), |&l| u32::try_from(l).ok(), vec![
      ("in_uv", 'u'),
      ("in_position", 'p'),
    ]);
    assert_eq!(located, vec![(1, 'u'), (0, 'p')]);
  }

  #[test]
  fn unknown_attributes_are_skipped() {
    let located = attribute_locations(1, &attributes(), |&l| u32::try_from(l).ok(), vec![
      ("in_normal", 'n'),
      ("in_position", 'p'),
      ("in_color", 'c'),
    ]);
    assert_eq!(located, vec![(0, 'p')]);
  }

  #[test]
  fn built_in_attributes_are_skipped() {
    let located = attribute_locations(1, &attributes(), |&l| u32::try_from(l).ok(), vec![("gl_VertexID", 'v')]);
    assert!(located.is_empty());
  }

  #[test]
  fn empty_mesh_draws_nothing() {
    let mesh = Mesh::default();
    assert!(mesh.render(&[("model", PipelineValue::from(1.0f32))]).is_ok());
  }
}
