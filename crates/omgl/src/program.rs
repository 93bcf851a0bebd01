use crate::impl_prelude::*;
use crate::shader::{Shader, ShaderType};
use crate::variables::{load_variables, Attribute, Uniform, VariableKind};
use prelude_plus::*;

#[derive(Debug)]
pub struct Program {
  ctx: SharedContext,
  addr: u32,
  // introspection is deferred until first use so that linking several
  // programs back to back doesn't stall on the driver
  attributes: OnceCell<BTreeMap<String, Attribute>>,
  uniforms: OnceCell<BTreeMap<String, Uniform>>,
}

unsafe impl Object for Program {
  const DEBUG_TYPE_IDENTIFIER: u32 = gl::PROGRAM;

  #[inline(always)]
  fn ctx(&self) -> &SharedContext { &self.ctx }
  #[inline(always)]
  fn addr(&self) -> u32 { self.addr }
}

fn to_c_names(names: &[(&str, u32)]) -> Result<Vec<(CString, u32)>> {
  names.iter().map(|&(name, location)| Ok((CString::new(name)?, location))).collect()
}

impl Program {
  /// Links `shaders` into a program. Fragment outputs and vertex attributes
  /// are assigned the given locations before linking, and the shaders are
  /// detached again afterwards.
  pub fn new(
    ctx: SharedContext,
    shaders: &[&Shader],
    frag_locations: &[(&str, u32)],
    attribute_locations: &[(&str, u32)],
  ) -> Result<Self> {
    let frag_locations = to_c_names(frag_locations)?;
    let attribute_locations = to_c_names(attribute_locations)?;

    let addr = unsafe { ctx.raw_gl().CreateProgram() };
    let program =
      Self { ctx, addr, attributes: OnceCell::new(), uniforms: OnceCell::new() };

    let gl = program.raw_gl();
    unsafe {
      for shader in shaders {
        gl.AttachShader(addr, shader.addr());
      }
      for (name, color_number) in &frag_locations {
        gl.BindFragDataLocation(addr, *color_number, name.as_ptr());
      }
      for (name, location) in &attribute_locations {
        gl.BindAttribLocation(addr, *location, name.as_ptr());
      }
      gl.LinkProgram(addr);
      for shader in shaders {
        gl.DetachShader(addr, shader.addr());
      }
    }

    if !program.link_status() {
      return Err(Error::Link(program.info_log()));
    }
    debug!("linked program #{} out of {} shaders", addr, shaders.len());
    Ok(program)
  }

  /// Compiles every source and links the results.
  pub fn from_sources(ctx: SharedContext, sources: &[(ShaderType, &str)]) -> Result<Self> {
    let shaders = sources
      .iter()
      .map(|&(type_, source)| Shader::new(Rc::clone(&ctx), type_, source))
      .collect::<Result<Vec<_>>>()?;
    let shader_refs: Vec<&Shader> = shaders.iter().collect();
    Self::new(ctx, &shader_refs, &[], &[])
  }

  pub fn bind(&self) -> ProgramBinding<'_> {
    let previous = self.ctx.bound_program.bind_scoped(self.raw_gl(), self.addr);
    ProgramBinding { program: self, previous }
  }

  fn get_param(&self, pname: u32) -> i32 {
    let mut value = 0;
    unsafe { self.raw_gl().GetProgramiv(self.addr, pname, &mut value) };
    value
  }

  pub fn link_status(&self) -> bool { self.get_param(gl::LINK_STATUS) == gl::TRUE as i32 }
  pub fn delete_status(&self) -> bool { self.get_param(gl::DELETE_STATUS) == gl::TRUE as i32 }
  pub fn active_attributes(&self) -> u32 { self.get_param(gl::ACTIVE_ATTRIBUTES).max(0) as u32 }
  pub fn active_attribute_max_length(&self) -> u32 {
    self.get_param(gl::ACTIVE_ATTRIBUTE_MAX_LENGTH).max(0) as u32
  }
  pub fn active_uniforms(&self) -> u32 { self.get_param(gl::ACTIVE_UNIFORMS).max(0) as u32 }
  pub fn active_uniform_max_length(&self) -> u32 {
    self.get_param(gl::ACTIVE_UNIFORM_MAX_LENGTH).max(0) as u32
  }

  /// Checks whether the program can run in the current GL state. The details
  /// end up in [`Program::info_log`].
  pub fn validate(&self) -> bool {
    unsafe { self.raw_gl().ValidateProgram(self.addr) };
    self.get_param(gl::VALIDATE_STATUS) == gl::TRUE as i32
  }

  pub fn info_log(&self) -> String {
    let buf_size = self.get_param(gl::INFO_LOG_LENGTH).max(0);
    let mut buf: Vec<u8> = Vec::with_capacity(buf_size as usize);
    if buf_size != 0 {
      let mut text_len: i32 = 0;
      unsafe {
        self.raw_gl().GetProgramInfoLog(self.addr, buf_size, &mut text_len, buf.as_mut_ptr() as *mut c_char);
        buf.set_len(text_len.max(0) as usize);
      }
    }
    String::from_utf8_lossy(&buf).into_owned()
  }

  /// Active attributes keyed by name, array subscripts removed.
  pub fn attributes(&self) -> &BTreeMap<String, Attribute> {
    self.attributes.get_or_init(|| {
      trace!("loading attributes of program #{}", self.addr);
      load_variables(self.raw_gl(), self.addr, VariableKind::Attribute)
        .into_iter()
        .map(|variable| (variable.name().to_owned(), Attribute::new(variable)))
        .collect()
    })
  }

  /// Active uniforms keyed by name, array subscripts removed.
  pub fn uniforms(&self) -> &BTreeMap<String, Uniform> {
    self.uniforms.get_or_init(|| {
      trace!("loading uniforms of program #{}", self.addr);
      load_variables(self.raw_gl(), self.addr, VariableKind::Uniform)
        .into_iter()
        .map(|variable| (variable.name().to_owned(), Uniform::new(Rc::clone(&self.ctx), variable)))
        .collect()
    })
  }

  #[inline]
  pub fn attribute(&self, name: &str) -> Option<&Attribute> { self.attributes().get(name) }

  #[inline]
  pub fn uniform(&self, name: &str) -> Option<&Uniform> { self.uniforms().get(name) }

  pub fn require_uniform(&self, name: &str) -> Result<&Uniform> {
    self.uniform(name).ok_or_else(|| Error::UnknownVariable(name.to_owned()))
  }
}

impl Drop for Program {
  fn drop(&mut self) {
    // a program in use is only flagged for deletion, and its name could be
    // reused while the binding cache still points at it
    if self.ctx.bound_program.bound_addr() == Some(self.addr) {
      self.ctx.bound_program.bind_unconditionally(self.ctx.raw_gl(), 0);
    }
    unsafe { self.raw_gl().DeleteProgram(self.addr) };
  }
}

#[derive(Debug)]
pub struct ProgramBinding<'obj> {
  program: &'obj Program,
  previous: u32,
}

impl<'obj> ObjectBinding<Program> for ProgramBinding<'obj> {
  #[inline(always)]
  fn object(&self) -> &Program { self.program }
}

impl<'obj> ProgramBinding<'obj> {
  /// Shorthand for looking up a uniform and setting it.
  pub fn set_uniform<T: crate::Scalar>(&self, name: &str, values: &[T]) -> Result<()> {
    self.program.require_uniform(name)?.set(self, values)
  }
}

impl<'obj> Drop for ProgramBinding<'obj> {
  fn drop(&mut self) {
    let ctx = self.program.ctx();
    ctx.bound_program.bind_if_needed(ctx.raw_gl(), self.previous);
  }
}
