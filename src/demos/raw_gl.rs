//! The same spinning cube, drawn with plain GL calls. Handy for telling
//! driver problems apart from wrapper bugs.

use super::{model_view, projection, CUBE_SIZE, VS_SRC};
use crate::app::App;
use crate::config::Config;
use crate::cube::{self, FLOATS_PER_VERTEX};
use omgl::gl::types::*;
use omgl::{gl, RawGL};
use prelude_plus::*;

const FS_SRC: &str = r#"#version 330 core
uniform samplerBuffer in_buffer_texture;
in vec2 ex_uv;
out vec4 out_color;
void main() {
  out_color = texelFetch(in_buffer_texture, 0) * vec4(ex_uv, 1.0, 1.0);
}
"#;

unsafe fn info_log(gl: &RawGL, addr: GLuint, is_program: bool) -> String {
  let mut len = 0;
  if is_program {
    gl.GetProgramiv(addr, gl::INFO_LOG_LENGTH, &mut len);
  } else {
    gl.GetShaderiv(addr, gl::INFO_LOG_LENGTH, &mut len);
  }
  let mut buf: Vec<u8> = Vec::with_capacity(len.max(0) as usize);
  let mut written = 0;
  let buf_ptr = buf.as_mut_ptr() as *mut GLchar;
  if is_program {
    gl.GetProgramInfoLog(addr, len, &mut written, buf_ptr);
  } else {
    gl.GetShaderInfoLog(addr, len, &mut written, buf_ptr);
  }
  buf.set_len(written.max(0) as usize);
  String::from_utf8_lossy(&buf).into_owned()
}

unsafe fn compile_shader(gl: &RawGL, type_: GLenum, src: &str) -> AnyResult<GLuint> {
  let shader = gl.CreateShader(type_);
  let src_ptr = src.as_ptr() as *const GLchar;
  let src_len = src.len() as GLint;
  gl.ShaderSource(shader, 1, &src_ptr, &src_len);
  gl.CompileShader(shader);

  let mut status = 0;
  gl.GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);
  let log = info_log(gl, shader, false);
  if status != gl::TRUE as GLint {
    gl.DeleteShader(shader);
    bail!("shader compilation failed:\n{}", log);
  } else if !log.is_empty() {
    warn!("shader compilation log:\n{}", log);
  }
  Ok(shader)
}

unsafe fn uniform_location(gl: &RawGL, program: GLuint, name: &str) -> AnyResult<GLint> {
  let name = CString::new(name)?;
  Ok(gl.GetUniformLocation(program, name.as_ptr()))
}

unsafe fn attrib_location(gl: &RawGL, program: GLuint, name: &str) -> AnyResult<GLuint> {
  let c_name = CString::new(name)?;
  let location = gl.GetAttribLocation(program, c_name.as_ptr());
  u32::try_from(location).map_err(|_| format_err!("attribute {:?} is not active", name))
}

pub fn run(app: &mut App, config: &Config) -> AnyResult<()> {
  let ctx = Rc::clone(&app.gl);
  let gl = ctx.raw_gl();

  unsafe {
    let vs = compile_shader(gl, gl::VERTEX_SHADER, VS_SRC)?;
    let fs = compile_shader(gl, gl::FRAGMENT_SHADER, FS_SRC)?;
    let program = gl.CreateProgram();
    gl.AttachShader(program, vs);
    gl.AttachShader(program, fs);
    let out_color = CString::new("out_color")?;
    gl.BindFragDataLocation(program, 0, out_color.as_ptr());
    gl.LinkProgram(program);
    gl.DetachShader(program, vs);
    gl.DetachShader(program, fs);
    gl.DeleteShader(vs);
    gl.DeleteShader(fs);

    let mut status = 0;
    gl.GetProgramiv(program, gl::LINK_STATUS, &mut status);
    if status != gl::TRUE as GLint {
      bail!("program linking failed:\n{}", info_log(gl, program, true));
    }
    gl.UseProgram(program);

    let mut vertex_array = 0;
    gl.GenVertexArrays(1, &mut vertex_array);
    gl.BindVertexArray(vertex_array);

    let data = cube::triangle_floats(CUBE_SIZE);
    let vertex_count = (data.len() / FLOATS_PER_VERTEX) as GLsizei;
    let mut vertex_buffer = 0;
    gl.GenBuffers(1, &mut vertex_buffer);
    gl.BindBuffer(gl::ARRAY_BUFFER, vertex_buffer);
    gl.BufferData(
      gl::ARRAY_BUFFER,
      (data.len() * mem::size_of::<f32>()) as GLsizeiptr,
      data.as_ptr() as *const c_void,
      gl::STATIC_DRAW,
    );

    let stride = (FLOATS_PER_VERTEX * mem::size_of::<f32>()) as GLsizei;
    let position = attrib_location(gl, program, "in_position")?;
    gl.EnableVertexAttribArray(position);
    gl.VertexAttribPointer(position, 3, gl::FLOAT, gl::FALSE, stride, ptr::null());
    let uv = attrib_location(gl, program, "in_uv")?;
    gl.EnableVertexAttribArray(uv);
    gl.VertexAttribPointer(uv, 2, gl::FLOAT, gl::FALSE, stride, (3 * mem::size_of::<f32>()) as *const c_void);

    let texels = vec![1.0f32; 32 * 32 * 4];
    let mut texel_buffer = 0;
    gl.GenBuffers(1, &mut texel_buffer);
    gl.BindBuffer(gl::TEXTURE_BUFFER, texel_buffer);
    gl.BufferData(
      gl::TEXTURE_BUFFER,
      (texels.len() * mem::size_of::<f32>()) as GLsizeiptr,
      texels.as_ptr() as *const c_void,
      gl::STATIC_DRAW,
    );

    let mut buffer_texture = 0;
    gl.GenTextures(1, &mut buffer_texture);
    gl.ActiveTexture(gl::TEXTURE0 + 1);
    gl.BindTexture(gl::TEXTURE_BUFFER, buffer_texture);
    gl.TexBuffer(gl::TEXTURE_BUFFER, gl::RGBA32F, texel_buffer);
    gl.Uniform1i(uniform_location(gl, program, "in_buffer_texture")?, 1);

    gl.Enable(gl::DEPTH_TEST);
    gl.Disable(gl::CULL_FACE);

    let projection_location = uniform_location(gl, program, "in_projection")?;
    let model_view_location = uniform_location(gl, program, "in_model_view")?;

    let result = app.run(|_, frame| {
      let projection = projection(config, frame.aspect);
      let model_view = model_view(frame.time * config.rotation_speed);
      gl.UniformMatrix4fv(projection_location, 1, gl::FALSE, projection.as_ref().as_ptr());
      gl.UniformMatrix4fv(model_view_location, 1, gl::FALSE, model_view.as_ref().as_ptr());
      gl.DrawArrays(gl::TRIANGLES, 0, vertex_count);
      Ok(())
    });

    gl.UseProgram(0);
    gl.BindVertexArray(0);
    gl.DeleteTextures(1, &buffer_texture);
    gl.DeleteBuffers(1, &texel_buffer);
    gl.DeleteBuffers(1, &vertex_buffer);
    gl.DeleteVertexArrays(1, &vertex_array);
    gl.DeleteProgram(program);
    gl.ActiveTexture(gl::TEXTURE0);
    result
  }
}
