use super::{model_view, projection, CUBE_SIZE, VS_SRC};
use crate::app::App;
use crate::config::Config;
use crate::cube;
use omgl::*;
use omgl_math::*;
use prelude_plus::{info, AnyResult, ResultContextExt, Rc};

const FS_SRC: &str = r#"#version 330 core
uniform sampler2D in_diffuse_texture;
in vec2 ex_uv;
out vec4 out_color;
void main() {
  out_color = texture(in_diffuse_texture, ex_uv);
}
"#;

const NOISE_SIZE: usize = 32;

fn noise_texture(gl: &SharedContext) -> AnyResult<Texture> {
  let mut rng = init_rand32()?;
  let data = random_bytes(&mut rng, NOISE_SIZE * NOISE_SIZE * 4);
  let parameters = TextureParameters {
    min_filter: (TextureFilter::Nearest, None),
    mag_filter: TextureFilter::Nearest,
    ..Default::default()
  };
  let desc = TextureDesc::with_data(&[NOISE_SIZE, NOISE_SIZE, 4], data.as_slice()).mipmap(false).parameters(parameters);
  Ok(Texture::new(Rc::clone(gl), TextureTarget::Texture2D, desc)?)
}

pub fn run(app: &mut App, config: &Config) -> AnyResult<()> {
  let gl = Rc::clone(&app.gl);
  gl.set_enabled(Capability::DepthTest, true);
  gl.set_enabled(Capability::CullFace, true);

  let program = Program::from_sources(
    Rc::clone(&gl),
    &[(ShaderType::Vertex, VS_SRC), (ShaderType::Fragment, FS_SRC)],
  )?;

  let texture = match &config.texture_path {
    Some(path) => Texture::open(Rc::clone(&gl), path, true)
      .with_context(|| format!("failed to load the texture {:?}", path))?,
    None => noise_texture(&gl)?,
  };
  texture.set_debug_label(b"cube texture")?;
  info!("cube texture: {:?} as {:?}", texture.shape(), texture.internal_format());

  let pipeline = Pipeline::new(Rc::new(program))
    .with("in_diffuse_texture", PipelineValue::texture(Rc::new(texture), Some(0)));

  let vertices = Buffer::array(Rc::clone(&gl), &cube::vertices(CUBE_SIZE))?;
  let indices = Buffer::element(Rc::clone(&gl), &cube::indices())?;
  let submesh = SubMesh::from_buffer(Rc::new(pipeline), &vertices)?.with_indices(Rc::new(indices));

  app.run(|_, frame| {
    submesh.render(&[
      ("in_projection", projection(config, frame.aspect).into()),
      ("in_model_view", model_view(frame.time * config.rotation_speed).into()),
    ])?;
    Ok(())
  })
}
