use crate::buffer::BufferTarget;
use crate::impl_prelude::*;
use crate::state::{get_i32_1, get_string, get_u32_1};
use omgl_math::*;
use prelude_plus::*;

pub type RawGL = gl::Gl;

pub type SharedContext = Rc<Context>;

pub struct Context {
  raw_gl: RawGL,
  capabilities: ContextCapabilities,

  pub(crate) bound_program: BindingTarget<ProgramBindingTarget>,
  pub(crate) bound_vertex_array: BindingTarget<VertexArrayBindingTarget>,
  bound_buffers: Vec<BindingTarget<BufferBindingTarget>>,

  active_texture_unit: Cell<u32>,
  // (unit, target) -> texture
  bound_textures: RefCell<HashMap<(u32, u32), u32>>,

  // a context can only be current on a single thread
  phantom: PhantomData<*mut ()>,
}

impl Context {
  #[inline(always)]
  pub fn raw_gl(&self) -> &RawGL { &self.raw_gl }
  #[inline(always)]
  pub fn capabilities(&self) -> &ContextCapabilities { &self.capabilities }

  /// Loads the GL function pointers of the context which is current on this
  /// thread, e.g. with `|name| video.gl_get_proc_address(name) as *const _`.
  pub fn load_with<F>(loader: F) -> Self
  where
    F: FnMut(&'static str) -> *const c_void,
  {
    let gl = RawGL::load_with(loader);

    // This has to be done first so that messages from the capability queries
    // below are logged too.
    crate::debug::init(&gl);

    let capabilities = ContextCapabilities::load(&gl);

    // Rows of pixel data are tightly packed on the Rust side.
    unsafe {
      gl.PixelStorei(gl::PACK_ALIGNMENT, 1);
      gl.PixelStorei(gl::UNPACK_ALIGNMENT, 1);
    }

    Self {
      raw_gl: gl,
      capabilities,

      // programs are a special case, the binding target value doesn't matter
      // because there is no such thing as binding a program to a target
      bound_program: BindingTarget::new(gl::NONE),
      bound_vertex_array: BindingTarget::new(gl::NONE),
      bound_buffers: BufferTarget::VARIANTS.iter().map(|t| BindingTarget::new(t.as_raw())).collect(),

      active_texture_unit: Cell::new(0),
      bound_textures: RefCell::new(HashMap::new()),

      phantom: PhantomData,
    }
  }

  pub(crate) fn bound_buffer(&self, target: BufferTarget) -> &BindingTarget<BufferBindingTarget> {
    let raw = target.as_raw();
    // every variant gets a slot in `load_with`
    self.bound_buffers.iter().find(|b| b.target() == raw).unwrap()
  }

  /// Element array bindings are a part of the vertex array state, so whatever
  /// is cached stops being meaningful once a different vertex array is bound.
  pub(crate) fn on_vertex_array_changed(&self) {
    self.bound_buffer(BufferTarget::ElementArray).invalidate();
  }

  pub(crate) fn forget_buffer(&self, addr: u32) {
    for target in &self.bound_buffers {
      target.forget(addr);
    }
  }

  #[inline(always)]
  pub fn active_texture_unit(&self) -> u32 { self.active_texture_unit.get() }

  pub fn set_active_texture_unit(&self, unit: u32) {
    if self.active_texture_unit.get() != unit {
      unsafe { self.raw_gl.ActiveTexture(gl::TEXTURE0 + unit) };
      self.active_texture_unit.set(unit);
    }
  }

  pub(crate) fn bound_texture(&self, unit: u32, target: u32) -> u32 {
    self.bound_textures.borrow().get(&(unit, target)).copied().unwrap_or(0)
  }

  pub(crate) fn bind_texture(&self, unit: u32, target: u32, addr: u32) {
    if self.bound_texture(unit, target) == addr {
      return;
    }
    self.set_active_texture_unit(unit);
    unsafe { self.raw_gl.BindTexture(target, addr) };
    let mut bound_textures = self.bound_textures.borrow_mut();
    if addr == 0 {
      bound_textures.remove(&(unit, target));
    } else {
      bound_textures.insert((unit, target), addr);
    }
  }

  pub(crate) fn forget_texture(&self, addr: u32) {
    self.bound_textures.borrow_mut().retain(|_, bound| *bound != addr);
  }

  pub fn set_clear_color(&self, color: Colorf) {
    unsafe { self.raw_gl.ClearColor(color.r, color.g, color.b, color.a) };
  }

  pub fn clear(&self, flags: ClearFlags) { unsafe { self.raw_gl.Clear(flags.bits()) }; }

  pub fn set_viewport(&self, pos: Vec2i32, size: Vec2i32) {
    unsafe { self.raw_gl.Viewport(pos.x, pos.y, size.x, size.y) };
  }
}

impl fmt::Debug for Context {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Context#<{:p}>", self) }
}

#[derive(Debug)]
pub(crate) struct BindingTarget<T> {
  target: u32,
  // `None` when the driver state is unknown
  bound_addr: Cell<Option<u32>>,
  phantom: PhantomData<*mut T>,
}

impl<T> BindingTarget<T> {
  #[inline(always)]
  pub(crate) fn target(&self) -> u32 { self.target }
  #[inline(always)]
  pub(crate) fn bound_addr(&self) -> Option<u32> { self.bound_addr.get() }

  pub(crate) fn new(target: u32) -> Self {
    Self { target, bound_addr: Cell::new(Some(0)), phantom: PhantomData }
  }

  #[inline(always)]
  pub(crate) fn invalidate(&self) { self.bound_addr.set(None); }

  /// Deleting a bound object resets the binding to zero.
  pub(crate) fn forget(&self, addr: u32) {
    if self.bound_addr.get() == Some(addr) {
      self.bound_addr.set(Some(0));
    }
  }
}

macro_rules! impl_binding_target_state {
  ($target_enum:ident, $gl_bind_fn:ident ($($target:ident)?)) => {
    #[derive(Debug)]
    pub(crate) enum $target_enum {}

    impl BindingTarget<$target_enum> {
      #[inline]
      pub(crate) fn bind_unconditionally(&self, gl: &RawGL, addr: u32) {
        unsafe { gl.$gl_bind_fn($(self.$target, )? addr) };
        self.bound_addr.set(Some(addr));
      }

      #[inline]
      pub(crate) fn bind_if_needed(&self, gl: &RawGL, addr: u32) {
        if self.bound_addr.get() != Some(addr) {
          self.bind_unconditionally(gl, addr);
        }
      }

      /// Binds `addr` and returns whatever should be restored afterwards.
      #[inline]
      pub(crate) fn bind_scoped(&self, gl: &RawGL, addr: u32) -> u32 {
        let previous = self.bound_addr.get().unwrap_or(0);
        self.bind_if_needed(gl, addr);
        previous
      }
    }
  };
}

impl_binding_target_state!(ProgramBindingTarget, UseProgram());
impl_binding_target_state!(VertexArrayBindingTarget, BindVertexArray());
impl_binding_target_state!(BufferBindingTarget, BindBuffer(target));

#[derive(Debug, Eq, PartialEq, Clone, Hash, Default)]
pub struct ContextCapabilities {
  pub renderer: String,
  pub vendor: String,
  pub gl_version: String,
  pub glsl_version: String,
  pub extensions: ContextExtensions,

  pub max_texture_units: u32,
  pub max_texture_size: u32,
  pub max_3d_texture_size: u32,
  pub max_rectangle_texture_size: u32,
  pub max_array_texture_layers: u32,
  pub texture_buffer_offset_alignment: u32,
  pub max_vertex_attribs: u32,

  pub max_debug_object_label_len: i32,
}

impl ContextCapabilities {
  pub fn load(gl: &RawGL) -> Self {
    let renderer = get_string(gl, gl::RENDERER).unwrap_or_default();
    info!("GL renderer:    {}", renderer);
    let vendor = get_string(gl, gl::VENDOR).unwrap_or_default();
    info!("GL vendor:      {}", vendor);
    let gl_version = get_string(gl, gl::VERSION).unwrap_or_default();
    info!("GL version:     {}", gl_version);
    let glsl_version = get_string(gl, gl::SHADING_LANGUAGE_VERSION).unwrap_or_default();
    info!("GLSL version:   {}", glsl_version);

    // glGetString(GL_EXTENSIONS) is gone from the core profile
    let extension_names: Vec<String> = (0..get_u32_1(gl, gl::NUM_EXTENSIONS))
      .filter_map(|i| {
        let ptr: *const u8 = unsafe { gl.GetStringi(gl::EXTENSIONS, i) };
        if ptr.is_null() {
          return None;
        }
        let c_str = unsafe { CStr::from_ptr(ptr as *const c_char) };
        Some(c_str.to_string_lossy().into_owned())
      })
      .collect();
    let extensions = ContextExtensions::new(extension_names.iter().map(String::as_str));
    info!("GL extensions:  {:?}", extensions);

    Self {
      renderer,
      vendor,
      gl_version,
      glsl_version,
      extensions,

      max_texture_units: get_u32_1(gl, gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS),
      max_texture_size: get_u32_1(gl, gl::MAX_TEXTURE_SIZE),
      max_3d_texture_size: get_u32_1(gl, gl::MAX_3D_TEXTURE_SIZE),
      max_rectangle_texture_size: get_u32_1(gl, gl::MAX_RECTANGLE_TEXTURE_SIZE),
      max_array_texture_layers: get_u32_1(gl, gl::MAX_ARRAY_TEXTURE_LAYERS),
      texture_buffer_offset_alignment: get_u32_1(gl, gl::TEXTURE_BUFFER_OFFSET_ALIGNMENT),
      max_vertex_attribs: get_u32_1(gl, gl::MAX_VERTEX_ATTRIBS),

      max_debug_object_label_len: if gl.ObjectLabel.is_loaded() {
        get_i32_1(gl, gl::MAX_LABEL_LENGTH)
      } else {
        0
      },
    }
  }
}

macro_rules! generate_context_extensions_struct {
  ($(($name:literal, $field:ident)),* $(,)?) => {
    #[derive(Debug, Eq, PartialEq, Clone, Hash, Default)]
    pub struct ContextExtensions {
      $(pub $field: bool),*
    }

    impl ContextExtensions {
      fn new<'a, T: IntoIterator<Item = &'a str>>(loaded_extension_names_iter: T) -> Self {
        let mut extensions = ContextExtensions {
          $($field: false),*
        };

        for name in loaded_extension_names_iter {
          match name {
            $($name => extensions.$field = true,)*
            _ => {}
          }
        }

        extensions
      }
    }
  };
}

generate_context_extensions_struct![
  ("GL_KHR_debug", gl_khr_debug),
  ("GL_ARB_texture_buffer_object", gl_arb_texture_buffer_object),
  ("GL_ARB_gpu_shader_fp64", gl_arb_gpu_shader_fp64),
  ("GL_ARB_vertex_attrib_64bit", gl_arb_vertex_attrib_64bit),
];

bitflags! {
  pub struct ClearFlags: u32 {
    const COLOR = gl::COLOR_BUFFER_BIT;
    const DEPTH = gl::DEPTH_BUFFER_BIT;
    const STENCIL = gl::STENCIL_BUFFER_BIT;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn extension_names_are_matched_exactly() {
    let extensions = ContextExtensions::new(["GL_KHR_debug", "GL_ARB_gpu_shader_fp64x"]);
    assert_eq!(
      extensions,
      ContextExtensions { gl_khr_debug: true, ..ContextExtensions::default() },
    );
  }

  #[test]
  fn binding_targets_forget_deleted_objects() {
    let target = BindingTarget::<BufferBindingTarget>::new(gl::ARRAY_BUFFER);
    target.bound_addr.set(Some(7));
    target.forget(3);
    assert_eq!(target.bound_addr(), Some(7));
    target.forget(7);
    assert_eq!(target.bound_addr(), Some(0));
    target.invalidate();
    assert_eq!(target.bound_addr(), None);
  }
}
