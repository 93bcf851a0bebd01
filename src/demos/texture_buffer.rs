use super::{model_view, projection, CUBE_SIZE, VS_SRC};
use crate::app::App;
use crate::config::Config;
use crate::cube;
use omgl::*;
use prelude_plus::{debug, AnyResult, Rc};

const GRID_SIZE: usize = 32;

// every face shows the same grid of texels fetched from the buffer
const FS_SRC: &str = r#"#version 330 core
uniform samplerBuffer in_buffer;
in vec2 ex_uv;
out vec4 out_color;
void main() {
  ivec2 cell = clamp(ivec2(ex_uv * 32.0), ivec2(0), ivec2(31));
  out_color = texelFetch(in_buffer, cell.y * 32 + cell.x);
}
"#;

/// A red-green gradient with a blue checkerboard on top.
fn grid_colors() -> Vec<[f32; 4]> {
  let max = (GRID_SIZE - 1) as f32;
  (0..GRID_SIZE * GRID_SIZE)
    .map(|i| {
      let (x, y) = (i % GRID_SIZE, i / GRID_SIZE);
      let checker = if (x / 4 + y / 4) % 2 == 0 { 1.0 } else { 0.0 };
      [x as f32 / max, y as f32 / max, checker, 1.0]
    })
    .collect()
}

pub fn run(app: &mut App, config: &Config) -> AnyResult<()> {
  let gl = Rc::clone(&app.gl);
  gl.set_enabled(Capability::DepthTest, true);
  gl.set_enabled(Capability::CullFace, false);

  let program = Program::from_sources(
    Rc::clone(&gl),
    &[(ShaderType::Vertex, VS_SRC), (ShaderType::Fragment, FS_SRC)],
  )?;

  let texture_buffer = TextureBuffer::new(Rc::clone(&gl), &grid_colors(), None, None, None)?;
  let texture = texture_buffer.texture();
  debug!(
    "buffer texture #{} reads buffer #{} as {:?}",
    texture.addr(),
    texture.bound_buffer(),
    texture.internal_format(),
  );

  // the sampler keeps its default unit 0
  let pipeline = Pipeline::new(Rc::new(program)).with("in_buffer", Rc::clone(texture));

  let vertices = Buffer::array(Rc::clone(&gl), &cube::triangles(CUBE_SIZE))?;
  let submesh = SubMesh::from_buffer(Rc::new(pipeline), &vertices)?;

  app.run(|_, frame| {
    submesh.render(&[
      ("in_projection", projection(config, frame.aspect).into()),
      ("in_model_view", model_view(frame.time * config.rotation_speed).into()),
    ])?;
    Ok(())
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn grid_corners() {
    let colors = grid_colors();
    assert_eq!(colors.len(), GRID_SIZE * GRID_SIZE);
    assert_eq!(colors[0], [0.0, 0.0, 1.0, 1.0]);
    assert_eq!(colors[GRID_SIZE * GRID_SIZE - 1], [1.0, 1.0, 1.0, 1.0]);
    assert_eq!(colors[4], [4.0 / 31.0, 0.0, 0.0, 1.0]);
  }
}
