//! Queries and switches of global context state.

use crate::impl_prelude::*;
use prelude_plus::*;

gl_enum!({
  pub enum Capability {
    Blend = BLEND,
    ColorLogicOp = COLOR_LOGIC_OP,
    CullFace = CULL_FACE,
    DebugOutput = DEBUG_OUTPUT,
    DebugOutputSynchronous = DEBUG_OUTPUT_SYNCHRONOUS,
    DepthClamp = DEPTH_CLAMP,
    DepthTest = DEPTH_TEST,
    Dither = DITHER,
    FramebufferSrgb = FRAMEBUFFER_SRGB,
    LineSmooth = LINE_SMOOTH,
    Multisample = MULTISAMPLE,
    PolygonOffsetFill = POLYGON_OFFSET_FILL,
    PolygonOffsetLine = POLYGON_OFFSET_LINE,
    PolygonOffsetPoint = POLYGON_OFFSET_POINT,
    PolygonSmooth = POLYGON_SMOOTH,
    PrimitiveRestart = PRIMITIVE_RESTART,
    PrimitiveRestartFixedIndex = PRIMITIVE_RESTART_FIXED_INDEX,
    ProgramPointSize = PROGRAM_POINT_SIZE,
    RasterizerDiscard = RASTERIZER_DISCARD,
    SampleAlphaToCoverage = SAMPLE_ALPHA_TO_COVERAGE,
    SampleAlphaToOne = SAMPLE_ALPHA_TO_ONE,
    SampleCoverage = SAMPLE_COVERAGE,
    SampleShading = SAMPLE_SHADING,
    SampleMask = SAMPLE_MASK,
    ScissorTest = SCISSOR_TEST,
    StencilTest = STENCIL_TEST,
    TextureCubeMapSeamless = TEXTURE_CUBE_MAP_SEAMLESS,
  }
});

pub(crate) fn get_i32_1(gl: &RawGL, name: u32) -> i32 {
  let mut value = 0;
  unsafe { gl.GetIntegerv(name, &mut value) }
  value
}

#[inline(always)]
pub(crate) fn get_u32_1(gl: &RawGL, name: u32) -> u32 { get_i32_1(gl, name).max(0) as u32 }

pub(crate) fn get_string(gl: &RawGL, name: u32) -> Option<String> {
  let ptr: *const u8 = unsafe { gl.GetString(name) };
  if ptr.is_null() {
    return None;
  }
  let c_str = unsafe { CStr::from_ptr(ptr as *const c_char) };
  Some(c_str.to_string_lossy().into_owned())
}

impl Context {
  pub fn get_bool(&self, pname: u32) -> bool {
    let mut value = gl::FALSE;
    unsafe { self.raw_gl().GetBooleanv(pname, &mut value) };
    value != gl::FALSE
  }

  #[inline(always)]
  pub fn get_i32(&self, pname: u32) -> i32 { get_i32_1(self.raw_gl(), pname) }

  /// The caller must know how many values `pname` yields.
  pub fn get_i32_array(&self, pname: u32, len: usize) -> Vec<i32> {
    let mut values = vec![0; len];
    unsafe { self.raw_gl().GetIntegerv(pname, values.as_mut_ptr()) };
    values
  }

  pub fn get_i64(&self, pname: u32) -> i64 {
    let mut value = 0;
    unsafe { self.raw_gl().GetInteger64v(pname, &mut value) };
    value
  }

  pub fn get_f32(&self, pname: u32) -> f32 {
    let mut value = 0.0;
    unsafe { self.raw_gl().GetFloatv(pname, &mut value) };
    value
  }

  pub fn get_f32_array(&self, pname: u32, len: usize) -> Vec<f32> {
    let mut values = vec![0.0; len];
    unsafe { self.raw_gl().GetFloatv(pname, values.as_mut_ptr()) };
    values
  }

  #[inline(always)]
  pub fn get_string(&self, pname: u32) -> Option<String> { get_string(self.raw_gl(), pname) }

  pub fn is_enabled(&self, cap: Capability) -> bool {
    unsafe { self.raw_gl().IsEnabled(cap.as_raw()) != gl::FALSE }
  }

  pub fn set_enabled(&self, cap: Capability, enabled: bool) {
    let gl = self.raw_gl();
    unsafe {
      if enabled {
        gl.Enable(cap.as_raw());
      } else {
        gl.Disable(cap.as_raw());
      }
    }
  }

  /// Asks the driver directly, unlike the binding caches.
  pub fn current_program(&self) -> u32 { get_u32_1(self.raw_gl(), gl::CURRENT_PROGRAM) }

  #[inline(always)]
  pub fn max_texture_units(&self) -> u32 { self.capabilities().max_texture_units }
  #[inline(always)]
  pub fn max_texture_size(&self) -> u32 { self.capabilities().max_texture_size }
  #[inline(always)]
  pub fn max_array_texture_layers(&self) -> u32 { self.capabilities().max_array_texture_layers }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn capabilities_round_trip_through_raw_enums() {
    assert_eq!(Capability::from_raw(gl::DEPTH_TEST), Some(Capability::DepthTest));
    assert_eq!(Capability::CullFace.as_raw(), gl::CULL_FACE);
    assert_eq!(Capability::from_raw(gl::TEXTURE_2D), None);
  }
}
