//! Geometry of the cube every demo spins.

use omgl_math::*;

/// Field names match the attribute names in the demo shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CubeVertex {
  pub in_position: Vec3f,
  pub in_uv: Vec2f,
}

omgl::impl_vertex!(CubeVertex { in_position, in_uv });

pub const FLOATS_PER_VERTEX: usize = 3 + 2;

// corners of each face counter-clockwise when looking at it from outside
#[rustfmt::skip]
const FACES: [[Vec3f; 4]; 6] = [
  [vec3(-1.0, -1.0,  1.0), vec3( 1.0, -1.0,  1.0), vec3( 1.0,  1.0,  1.0), vec3(-1.0,  1.0,  1.0)],
  [vec3( 1.0, -1.0, -1.0), vec3(-1.0, -1.0, -1.0), vec3(-1.0,  1.0, -1.0), vec3( 1.0,  1.0, -1.0)],
  [vec3( 1.0, -1.0,  1.0), vec3( 1.0, -1.0, -1.0), vec3( 1.0,  1.0, -1.0), vec3( 1.0,  1.0,  1.0)],
  [vec3(-1.0, -1.0, -1.0), vec3(-1.0, -1.0,  1.0), vec3(-1.0,  1.0,  1.0), vec3(-1.0,  1.0, -1.0)],
  [vec3(-1.0,  1.0,  1.0), vec3( 1.0,  1.0,  1.0), vec3( 1.0,  1.0, -1.0), vec3(-1.0,  1.0, -1.0)],
  [vec3(-1.0, -1.0, -1.0), vec3( 1.0, -1.0, -1.0), vec3( 1.0, -1.0,  1.0), vec3(-1.0, -1.0,  1.0)],
];

const FACE_UVS: [Vec2f; 4] = [vec2(0.0, 0.0), vec2(1.0, 0.0), vec2(1.0, 1.0), vec2(0.0, 1.0)];

/// Four vertices per face, centered on the origin.
pub fn vertices(size: Vec3f) -> Vec<CubeVertex> {
  let half = size / 2.0;
  FACES
    .iter()
    .flat_map(|face| face.iter().zip(&FACE_UVS))
    .map(|(&corner, &uv)| CubeVertex { in_position: corner * half, in_uv: uv })
    .collect()
}

/// Two triangles per face.
pub fn indices() -> Vec<u16> {
  (0..FACES.len() as u16)
    .flat_map(|face| {
      let base = face * 4;
      [base, base + 1, base + 2, base, base + 2, base + 3]
    })
    .collect()
}

/// Resolves the indices into a plain triangle list.
pub fn triangles(size: Vec3f) -> Vec<CubeVertex> {
  let vertices = vertices(size);
  indices().into_iter().map(|i| vertices[i as usize]).collect()
}

/// The triangle list as interleaved floats, for code which uploads raw data.
pub fn triangle_floats(size: Vec3f) -> Vec<f32> {
  triangles(size)
    .into_iter()
    .flat_map(|v| [v.in_position.x, v.in_position.y, v.in_position.z, v.in_uv.x, v.in_uv.y])
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use omgl::{DataType, Vertex, VertexField};
  use pretty_assertions::assert_eq;

  #[test]
  fn counts() {
    assert_eq!(vertices(vec3n(2.0)).len(), 24);
    assert_eq!(indices().len(), 36);
    assert!(indices().iter().all(|&i| i < 24));
    assert_eq!(triangle_floats(vec3n(2.0)).len(), 36 * FLOATS_PER_VERTEX);
  }

  #[test]
  fn extents_follow_size() {
    for v in vertices(vec3(5.0, 4.0, 2.0)) {
      let p = v.in_position;
      assert_eq!((p.x.abs(), p.y.abs(), p.z.abs()), (2.5, 2.0, 1.0));
    }
  }

  #[test]
  fn triangles_face_outwards() {
    for triangle in triangles(vec3n(2.0)).chunks_exact(3) {
      let [a, b, c] = [triangle[0].in_position, triangle[1].in_position, triangle[2].in_position];
      let normal = (b - a).cross(c - a);
      let center = (a + b + c) / 3.0;
      assert!(normal.dot(center) > 0.0, "{:?} faces inwards", triangle);
    }
  }

  #[test]
  fn vertex_layout() {
    assert_eq!(
      CubeVertex::fields(),
      vec![
        VertexField { name: "in_position", data_type: DataType::F32, components: 3, offset: 0 },
        VertexField { name: "in_uv", data_type: DataType::F32, components: 2, offset: 12 },
      ],
    );
    assert_eq!(std::mem::size_of::<CubeVertex>(), FLOATS_PER_VERTEX * 4);
  }
}
