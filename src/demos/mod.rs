//! The demos differ in how much of the wrapper they use, from none at all in
//! `raw_gl` to meshes and pipelines in `textured_cube`.

mod raw_gl;
mod texture_buffer;
mod textured_cube;

use crate::app::App;
use crate::config::Config;
use omgl_math::*;
use prelude_plus::*;

pub const CUBE_SIZE: Vec3f = vec3n(5.0);

pub const VS_SRC: &str = r#"#version 330 core
in vec3 in_position;
in vec2 in_uv;
uniform mat4 in_projection;
uniform mat4 in_model_view;
out vec2 ex_uv;
void main() {
  gl_Position = in_projection * in_model_view * vec4(in_position, 1.0);
  ex_uv = in_uv;
}
"#;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Demo {
  RawGl,
  TexturedCube,
  TextureBuffer,
}

impl Demo {
  pub const ALL: &'static [Self] = &[Self::RawGl, Self::TexturedCube, Self::TextureBuffer];

  pub fn name(self) -> &'static str {
    match self {
      Self::RawGl => "raw_gl",
      Self::TexturedCube => "textured_cube",
      Self::TextureBuffer => "texture_buffer",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> { Self::ALL.iter().copied().find(|demo| demo.name() == name) }

  pub fn run(self, app: &mut App, config: &Config) -> AnyResult<()> {
    info!("running the {} demo", self.name());
    match self {
      Self::RawGl => raw_gl::run(app, config),
      Self::TexturedCube => textured_cube::run(app, config),
      Self::TextureBuffer => texture_buffer::run(app, config),
    }
  }
}

pub fn projection(config: &Config, aspect: f32) -> Mat4f {
  Mat4f::perspective_rh_no(config.fov_radians(), aspect, 1.0, 100.0)
}

/// The cube sits 8 units in front of the camera, turned by `angle` around
/// its vertical axis.
pub fn model_view(angle: f32) -> Mat4f {
  Mat4f::from_translation(vec3(0.0, 0.0, -8.0)) * Mat4f::from_y_rotation(angle)
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn demo_names() {
    for &demo in Demo::ALL {
      assert_eq!(Demo::from_name(demo.name()), Some(demo));
    }
    assert_eq!(Demo::from_name("pong"), None);
  }

  #[test]
  fn cube_center_is_in_front_of_the_camera() {
    let center = model_view(1.0).transform(vec4(0.0, 0.0, 0.0, 1.0));
    assert_eq!(center, vec4(0.0, 0.0, -8.0, 1.0));
    let clip = projection(&Config::default(), 1.0).transform(center);
    let depth = clip.z / clip.w;
    assert!(depth > -1.0 && depth < 1.0, "depth {} is clipped", depth);
  }
}
