use crate::data_type::{DataType, Scalar};
use crate::impl_prelude::*;
use crate::program::ProgramBinding;
use prelude_plus::*;

gl_enum!({
  pub enum VariableType {
    Float = FLOAT,
    FloatVec2 = FLOAT_VEC2,
    FloatVec3 = FLOAT_VEC3,
    FloatVec4 = FLOAT_VEC4,
    Double = DOUBLE,
    DoubleVec2 = DOUBLE_VEC2,
    DoubleVec3 = DOUBLE_VEC3,
    DoubleVec4 = DOUBLE_VEC4,
    Int = INT,
    IntVec2 = INT_VEC2,
    IntVec3 = INT_VEC3,
    IntVec4 = INT_VEC4,
    UnsignedInt = UNSIGNED_INT,
    UnsignedIntVec2 = UNSIGNED_INT_VEC2,
    UnsignedIntVec3 = UNSIGNED_INT_VEC3,
    UnsignedIntVec4 = UNSIGNED_INT_VEC4,
    Bool = BOOL,
    BoolVec2 = BOOL_VEC2,
    BoolVec3 = BOOL_VEC3,
    BoolVec4 = BOOL_VEC4,

    FloatMat2 = FLOAT_MAT2,
    FloatMat3 = FLOAT_MAT3,
    FloatMat4 = FLOAT_MAT4,
    FloatMat2x3 = FLOAT_MAT2x3,
    FloatMat2x4 = FLOAT_MAT2x4,
    FloatMat3x2 = FLOAT_MAT3x2,
    FloatMat3x4 = FLOAT_MAT3x4,
    FloatMat4x2 = FLOAT_MAT4x2,
    FloatMat4x3 = FLOAT_MAT4x3,
    DoubleMat2 = DOUBLE_MAT2,
    DoubleMat3 = DOUBLE_MAT3,
    DoubleMat4 = DOUBLE_MAT4,
    DoubleMat2x3 = DOUBLE_MAT2x3,
    DoubleMat2x4 = DOUBLE_MAT2x4,
    DoubleMat3x2 = DOUBLE_MAT3x2,
    DoubleMat3x4 = DOUBLE_MAT3x4,
    DoubleMat4x2 = DOUBLE_MAT4x2,
    DoubleMat4x3 = DOUBLE_MAT4x3,

    Sampler1D = SAMPLER_1D,
    Sampler2D = SAMPLER_2D,
    Sampler3D = SAMPLER_3D,
    SamplerCube = SAMPLER_CUBE,
    Sampler1DShadow = SAMPLER_1D_SHADOW,
    Sampler2DShadow = SAMPLER_2D_SHADOW,
    Sampler1DArray = SAMPLER_1D_ARRAY,
    Sampler2DArray = SAMPLER_2D_ARRAY,
    Sampler1DArrayShadow = SAMPLER_1D_ARRAY_SHADOW,
    Sampler2DArrayShadow = SAMPLER_2D_ARRAY_SHADOW,
    Sampler2DMultisample = SAMPLER_2D_MULTISAMPLE,
    Sampler2DMultisampleArray = SAMPLER_2D_MULTISAMPLE_ARRAY,
    SamplerCubeShadow = SAMPLER_CUBE_SHADOW,
    SamplerBuffer = SAMPLER_BUFFER,
    Sampler2DRect = SAMPLER_2D_RECT,
    Sampler2DRectShadow = SAMPLER_2D_RECT_SHADOW,
    IntSampler1D = INT_SAMPLER_1D,
    IntSampler2D = INT_SAMPLER_2D,
    IntSampler3D = INT_SAMPLER_3D,
    IntSamplerCube = INT_SAMPLER_CUBE,
    IntSampler1DArray = INT_SAMPLER_1D_ARRAY,
    IntSampler2DArray = INT_SAMPLER_2D_ARRAY,
    IntSampler2DMultisample = INT_SAMPLER_2D_MULTISAMPLE,
    IntSampler2DMultisampleArray = INT_SAMPLER_2D_MULTISAMPLE_ARRAY,
    IntSamplerBuffer = INT_SAMPLER_BUFFER,
    IntSampler2DRect = INT_SAMPLER_2D_RECT,
    UnsignedIntSampler1D = UNSIGNED_INT_SAMPLER_1D,
    UnsignedIntSampler2D = UNSIGNED_INT_SAMPLER_2D,
    UnsignedIntSampler3D = UNSIGNED_INT_SAMPLER_3D,
    UnsignedIntSamplerCube = UNSIGNED_INT_SAMPLER_CUBE,
    UnsignedIntSampler1DArray = UNSIGNED_INT_SAMPLER_1D_ARRAY,
    UnsignedIntSampler2DArray = UNSIGNED_INT_SAMPLER_2D_ARRAY,
    UnsignedIntSampler2DMultisample = UNSIGNED_INT_SAMPLER_2D_MULTISAMPLE,
    UnsignedIntSampler2DMultisampleArray = UNSIGNED_INT_SAMPLER_2D_MULTISAMPLE_ARRAY,
    UnsignedIntSamplerBuffer = UNSIGNED_INT_SAMPLER_BUFFER,
    UnsignedIntSampler2DRect = UNSIGNED_INT_SAMPLER_2D_RECT,

    Image1D = IMAGE_1D,
    Image2D = IMAGE_2D,
    Image3D = IMAGE_3D,
    Image2DArray = IMAGE_2D_ARRAY,
    ImageBuffer = IMAGE_BUFFER,
    IntImage1D = INT_IMAGE_1D,
    IntImage2D = INT_IMAGE_2D,
    IntImage3D = INT_IMAGE_3D,
    IntImage2DArray = INT_IMAGE_2D_ARRAY,
    IntImageBuffer = INT_IMAGE_BUFFER,
    UnsignedIntImage1D = UNSIGNED_INT_IMAGE_1D,
    UnsignedIntImage2D = UNSIGNED_INT_IMAGE_2D,
    UnsignedIntImage3D = UNSIGNED_INT_IMAGE_3D,
    UnsignedIntImage2DArray = UNSIGNED_INT_IMAGE_2D_ARRAY,
    UnsignedIntImageBuffer = UNSIGNED_INT_IMAGE_BUFFER,
  }
});

/// The shape of a single element of a variable.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Dimensions {
  Vector(u32),
  Matrix { columns: u32, rows: u32 },
}

impl Dimensions {
  pub const fn components(self) -> u32 {
    match self {
      Self::Vector(n) => n,
      Self::Matrix { columns, rows } => columns * rows,
    }
  }

  /// Every column of a matrix occupies its own location.
  pub const fn locations(self) -> u32 {
    match self {
      Self::Vector(_) => 1,
      Self::Matrix { columns, .. } => columns,
    }
  }
}

impl VariableType {
  /// The scalar type which `glUniform*` accepts for this type. Booleans,
  /// samplers and images are set through the integer functions.
  pub const fn scalar_type(self) -> DataType {
    use VariableType::*;
    match self {
      Float | FloatVec2 | FloatVec3 | FloatVec4 | FloatMat2 | FloatMat3 | FloatMat4 | FloatMat2x3
      | FloatMat2x4 | FloatMat3x2 | FloatMat3x4 | FloatMat4x2 | FloatMat4x3 => DataType::F32,
      Double | DoubleVec2 | DoubleVec3 | DoubleVec4 | DoubleMat2 | DoubleMat3 | DoubleMat4
      | DoubleMat2x3 | DoubleMat2x4 | DoubleMat3x2 | DoubleMat3x4 | DoubleMat4x2 | DoubleMat4x3 => {
        DataType::F64
      }
      UnsignedInt | UnsignedIntVec2 | UnsignedIntVec3 | UnsignedIntVec4 => DataType::U32,
      _ => DataType::I32,
    }
  }

  pub const fn dimensions(self) -> Dimensions {
    use VariableType::*;
    const fn mat(columns: u32, rows: u32) -> Dimensions { Dimensions::Matrix { columns, rows } }
    match self {
      FloatVec2 | DoubleVec2 | IntVec2 | UnsignedIntVec2 | BoolVec2 => Dimensions::Vector(2),
      FloatVec3 | DoubleVec3 | IntVec3 | UnsignedIntVec3 | BoolVec3 => Dimensions::Vector(3),
      FloatVec4 | DoubleVec4 | IntVec4 | UnsignedIntVec4 | BoolVec4 => Dimensions::Vector(4),
      FloatMat2 | DoubleMat2 => mat(2, 2),
      FloatMat3 | DoubleMat3 => mat(3, 3),
      FloatMat4 | DoubleMat4 => mat(4, 4),
      FloatMat2x3 | DoubleMat2x3 => mat(2, 3),
      FloatMat2x4 | DoubleMat2x4 => mat(2, 4),
      FloatMat3x2 | DoubleMat3x2 => mat(3, 2),
      FloatMat3x4 | DoubleMat3x4 => mat(3, 4),
      FloatMat4x2 | DoubleMat4x2 => mat(4, 2),
      FloatMat4x3 | DoubleMat4x3 => mat(4, 3),
      _ => Dimensions::Vector(1),
    }
  }

  #[inline]
  pub const fn is_matrix(self) -> bool { matches!(self.dimensions(), Dimensions::Matrix { .. }) }

  pub const fn is_sampler(self) -> bool {
    use VariableType::*;
    matches!(
      self,
      Sampler1D | Sampler2D | Sampler3D | SamplerCube | Sampler1DShadow | Sampler2DShadow
        | Sampler1DArray | Sampler2DArray | Sampler1DArrayShadow | Sampler2DArrayShadow
        | Sampler2DMultisample | Sampler2DMultisampleArray | SamplerCubeShadow | SamplerBuffer
        | Sampler2DRect | Sampler2DRectShadow | IntSampler1D | IntSampler2D | IntSampler3D
        | IntSamplerCube | IntSampler1DArray | IntSampler2DArray | IntSampler2DMultisample
        | IntSampler2DMultisampleArray | IntSamplerBuffer | IntSampler2DRect | UnsignedIntSampler1D
        | UnsignedIntSampler2D | UnsignedIntSampler3D | UnsignedIntSamplerCube
        | UnsignedIntSampler1DArray | UnsignedIntSampler2DArray | UnsignedIntSampler2DMultisample
        | UnsignedIntSampler2DMultisampleArray | UnsignedIntSamplerBuffer | UnsignedIntSampler2DRect
    )
  }

  pub const fn is_image(self) -> bool {
    use VariableType::*;
    matches!(
      self,
      Image1D | Image2D | Image3D | Image2DArray | ImageBuffer | IntImage1D | IntImage2D | IntImage3D
        | IntImage2DArray | IntImageBuffer | UnsignedIntImage1D | UnsignedIntImage2D
        | UnsignedIntImage3D | UnsignedIntImage2DArray | UnsignedIntImageBuffer
    )
  }

  /// Size of one element in bytes.
  #[inline]
  pub const fn itemsize(self) -> usize {
    self.dimensions().components() as usize * self.scalar_type().size()
  }
}

/// An active attribute or uniform of a linked program.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProgramVariable {
  program_addr: u32,
  index: u32,
  raw_name: String,
  length: u32,
  type_: VariableType,
  location: i32,
}

impl ProgramVariable {
  #[inline(always)]
  pub fn program_addr(&self) -> u32 { self.program_addr }
  #[inline(always)]
  pub fn index(&self) -> u32 { self.index }
  /// The name as reported by the driver, e.g. `lights[0]`.
  #[inline(always)]
  pub fn raw_name(&self) -> &str { &self.raw_name }
  /// The name with any array subscript removed.
  pub fn name(&self) -> &str { strip_array_suffix(&self.raw_name) }
  /// Number of array elements, 1 for non-arrays.
  #[inline(always)]
  pub fn length(&self) -> u32 { self.length }
  #[inline(always)]
  pub fn type_(&self) -> VariableType { self.type_ }
  /// -1 for variables without a location, e.g. built-ins.
  #[inline(always)]
  pub fn location(&self) -> i32 { self.location }
  #[inline(always)]
  pub fn itemsize(&self) -> usize { self.type_.itemsize() }
  #[inline(always)]
  pub fn nbytes(&self) -> usize { self.length as usize * self.itemsize() }
}

pub(crate) fn strip_array_suffix(name: &str) -> &str {
  match name.find('[') {
    Some(i) => &name[..i],
    None => name,
  }
}

/// Looks up an active variable. The compiler drops unused variables, so a
/// missing one is logged and skipped rather than treated as an error.
pub(crate) fn find_active<'a, V>(
  program: u32,
  variables: &'a BTreeMap<String, V>,
  kind: VariableKind,
  name: &str,
) -> Option<&'a V> {
  let variable = variables.get(name);
  if variable.is_none() {
    debug!("program #{} has no active {:?} {:?}", program, kind, name);
  }
  variable
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum VariableKind {
  Attribute,
  Uniform,
}

/// Reads every active variable of the given kind, skipping the ones whose type
/// can't be represented.
pub(crate) fn load_variables(gl: &RawGL, program: u32, kind: VariableKind) -> Vec<ProgramVariable> {
  let (count_pname, max_len_pname) = match kind {
    VariableKind::Attribute => (gl::ACTIVE_ATTRIBUTES, gl::ACTIVE_ATTRIBUTE_MAX_LENGTH),
    VariableKind::Uniform => (gl::ACTIVE_UNIFORMS, gl::ACTIVE_UNIFORM_MAX_LENGTH),
  };
  let mut count = 0;
  let mut max_len = 0;
  unsafe {
    gl.GetProgramiv(program, count_pname, &mut count);
    gl.GetProgramiv(program, max_len_pname, &mut max_len);
  }

  let mut variables = Vec::with_capacity(count.max(0) as usize);
  for index in 0..count.max(0) as u32 {
    let mut buf: Vec<u8> = Vec::with_capacity(max_len.max(1) as usize);
    let mut name_len = 0;
    let mut length = 0;
    let mut raw_type = 0;
    unsafe {
      let name_ptr = buf.as_mut_ptr() as *mut c_char;
      match kind {
        VariableKind::Attribute => {
          gl.GetActiveAttrib(program, index, max_len, &mut name_len, &mut length, &mut raw_type, name_ptr)
        }
        VariableKind::Uniform => {
          gl.GetActiveUniform(program, index, max_len, &mut name_len, &mut length, &mut raw_type, name_ptr)
        }
      }
      buf.set_len(name_len.max(0) as usize);
    }
    let raw_name = String::from_utf8_lossy(&buf).into_owned();

    let type_ = match VariableType::from_raw(raw_type) {
      Some(type_) => type_,
      None => {
        warn!("skipping {:?} {:?} of unsupported type 0x{:04x}", kind, raw_name, raw_type);
        continue;
      }
    };

    let location = match CString::new(raw_name.as_str()) {
      Ok(c_name) => unsafe {
        match kind {
          VariableKind::Attribute => gl.GetAttribLocation(program, c_name.as_ptr()),
          VariableKind::Uniform => gl.GetUniformLocation(program, c_name.as_ptr()),
        }
      },
      Err(_) => -1,
    };

    trace!("program #{}: {:?} {} {:?}[{}] at {}", program, kind, raw_name, type_, length, location);
    variables.push(ProgramVariable {
      program_addr: program,
      index,
      raw_name,
      length: length.max(1) as u32,
      type_,
      location,
    });
  }
  variables
}

#[derive(Debug, Clone)]
pub struct Attribute {
  variable: ProgramVariable,
}

impl Attribute {
  pub(crate) fn new(variable: ProgramVariable) -> Self { Self { variable } }

  /// `None` for built-in inputs such as `gl_VertexID`.
  pub fn attrib_location(&self) -> Option<u32> { u32::try_from(self.variable.location).ok() }
}

impl Deref for Attribute {
  type Target = ProgramVariable;
  #[inline(always)]
  fn deref(&self) -> &ProgramVariable { &self.variable }
}

#[derive(Debug, Clone)]
pub struct Uniform {
  ctx: SharedContext,
  variable: ProgramVariable,
}

impl Deref for Uniform {
  type Target = ProgramVariable;
  #[inline(always)]
  fn deref(&self) -> &ProgramVariable { &self.variable }
}

impl Uniform {
  pub(crate) fn new(ctx: SharedContext, variable: ProgramVariable) -> Self { Self { ctx, variable } }

  #[inline(always)]
  pub fn data_type(&self) -> DataType { self.type_().scalar_type() }

  fn check_type<T: Scalar>(&self) -> Result<()> { check_uniform_type(&self.variable, T::DATA_TYPE) }

  #[inline]
  fn element_location(&self, index: u32) -> i32 {
    self.location() + (index * self.type_().dimensions().locations()) as i32
  }

  /// Uploads `values` starting at the first array element. Matrices are
  /// expected in column-major order.
  #[inline(always)]
  pub fn set<T: Scalar>(&self, binding: &ProgramBinding<'_>, values: &[T]) -> Result<()> {
    self.set_at(binding, 0, values)
  }

  /// Uploads `values` starting at array element `index`.
  pub fn set_at<T: Scalar>(&self, binding: &ProgramBinding<'_>, index: u32, values: &[T]) -> Result<()> {
    if binding.object().addr() != self.program_addr() {
      return Err(Error::invalid(format!(
        "uniform {:?} belongs to program #{}, not #{}",
        self.raw_name(),
        self.program_addr(),
        binding.object().addr(),
      )));
    }
    let count = check_uniform_write(&self.variable, T::DATA_TYPE, index, values.len())?;
    let dimensions = self.type_().dimensions();

    let location = self.element_location(index);
    unsafe {
      upload_uniform(
        self.ctx.raw_gl(),
        T::DATA_TYPE,
        dimensions,
        location,
        count as i32,
        values.as_ptr() as *const c_void,
      )
    };
    Ok(())
  }

  /// Reads every element of the uniform.
  #[inline]
  pub fn get<T: Scalar>(&self) -> Result<Vec<T>> { self.get_range(..) }

  pub fn get_at<T: Scalar>(&self, index: u32) -> Result<Vec<T>> {
    if index >= self.length() {
      return Err(Error::invalid(format!(
        "element {} is out of bounds of uniform {:?} of length {}",
        index,
        self.raw_name(),
        self.length(),
      )));
    }
    self.get_range(index..index + 1)
  }

  /// Reads a range of elements, clamped to the length of the uniform.
  pub fn get_range<T: Scalar>(&self, range: impl RangeBounds<u32>) -> Result<Vec<T>> {
    self.check_type::<T>()?;
    let range = clamp_range(range, self.length());
    let components = self.type_().dimensions().components() as usize;

    let gl = self.ctx.raw_gl();
    let program = self.program_addr();
    let mut values = vec![T::default(); range.len() * components];
    for (chunk, index) in values.chunks_exact_mut(components).zip(range) {
      let location = self.element_location(index);
      let ptr = chunk.as_mut_ptr();
      unsafe {
        match T::DATA_TYPE {
          DataType::F32 => gl.GetUniformfv(program, location, ptr as *mut f32),
          DataType::F64 => gl.GetUniformdv(program, location, ptr as *mut f64),
          DataType::U32 => gl.GetUniformuiv(program, location, ptr as *mut u32),
          _ => gl.GetUniformiv(program, location, ptr as *mut i32),
        }
      }
    }
    Ok(values)
  }
}

fn check_uniform_type(variable: &ProgramVariable, actual: DataType) -> Result<()> {
  let expected = variable.type_().scalar_type();
  if actual != expected {
    return Err(Error::TypeMismatch { variable: variable.raw_name().to_owned(), expected, actual });
  }
  Ok(())
}

/// Validates a write of `values_len` scalars of type `actual` starting at
/// array element `index`, returning the number of elements written.
pub(crate) fn check_uniform_write(
  variable: &ProgramVariable,
  actual: DataType,
  index: u32,
  values_len: usize,
) -> Result<usize> {
  check_uniform_type(variable, actual)?;

  let components = variable.type_().dimensions().components() as usize;
  if values_len == 0 || values_len % components != 0 {
    return Err(Error::invalid(format!(
      "uniform {:?} takes multiples of {} values, got {}",
      variable.raw_name(),
      components,
      values_len,
    )));
  }
  let count = values_len / components;
  let end = index as usize + count;
  if end > variable.length() as usize {
    return Err(Error::invalid(format!(
      "elements {}..{} are out of bounds of uniform {:?} of length {}",
      index,
      end,
      variable.raw_name(),
      variable.length(),
    )));
  }
  Ok(count)
}

pub(crate) fn clamp_range(range: impl RangeBounds<u32>, len: u32) -> Range<u32> {
  let start = match range.start_bound() {
    Bound::Included(&n) => n,
    Bound::Excluded(&n) => n.saturating_add(1),
    Bound::Unbounded => 0,
  };
  let end = match range.end_bound() {
    Bound::Included(&n) => n.saturating_add(1),
    Bound::Excluded(&n) => n,
    Bound::Unbounded => len,
  };
  let end = end.min(len);
  start.min(end)..end
}

unsafe fn upload_uniform(
  gl: &RawGL,
  scalar: DataType,
  dimensions: Dimensions,
  location: i32,
  count: i32,
  ptr: *const c_void,
) {
  macro_rules! vector {
    ($ty:ty, $f1:ident, $f2:ident, $f3:ident, $f4:ident) => {{
      let ptr = ptr as *const $ty;
      match dimensions.components() {
        1 => gl.$f1(location, count, ptr),
        2 => gl.$f2(location, count, ptr),
        3 => gl.$f3(location, count, ptr),
        _ => gl.$f4(location, count, ptr),
      }
    }};
  }

  macro_rules! matrix {
    (
      $ty:ty, $columns:expr, $rows:expr,
      $m2:ident, $m2x3:ident, $m2x4:ident, $m3x2:ident, $m3:ident,
      $m3x4:ident, $m4x2:ident, $m4x3:ident, $m4:ident $(,)?
    ) => {{
      let ptr = ptr as *const $ty;
      match ($columns, $rows) {
        (2, 2) => gl.$m2(location, count, gl::FALSE, ptr),
        (2, 3) => gl.$m2x3(location, count, gl::FALSE, ptr),
        (2, 4) => gl.$m2x4(location, count, gl::FALSE, ptr),
        (3, 2) => gl.$m3x2(location, count, gl::FALSE, ptr),
        (3, 3) => gl.$m3(location, count, gl::FALSE, ptr),
        (3, 4) => gl.$m3x4(location, count, gl::FALSE, ptr),
        (4, 2) => gl.$m4x2(location, count, gl::FALSE, ptr),
        (4, 3) => gl.$m4x3(location, count, gl::FALSE, ptr),
        _ => gl.$m4(location, count, gl::FALSE, ptr),
      }
    }};
  }

  match (scalar, dimensions) {
    (DataType::F32, Dimensions::Matrix { columns, rows }) => matrix!(
      f32, columns, rows,
      UniformMatrix2fv, UniformMatrix2x3fv, UniformMatrix2x4fv, UniformMatrix3x2fv, UniformMatrix3fv,
      UniformMatrix3x4fv, UniformMatrix4x2fv, UniformMatrix4x3fv, UniformMatrix4fv,
    ),
    (DataType::F64, Dimensions::Matrix { columns, rows }) => matrix!(
      f64, columns, rows,
      UniformMatrix2dv, UniformMatrix2x3dv, UniformMatrix2x4dv, UniformMatrix3x2dv, UniformMatrix3dv,
      UniformMatrix3x4dv, UniformMatrix4x2dv, UniformMatrix4x3dv, UniformMatrix4dv,
    ),
    (DataType::F32, _) => vector!(f32, Uniform1fv, Uniform2fv, Uniform3fv, Uniform4fv),
    (DataType::F64, _) => vector!(f64, Uniform1dv, Uniform2dv, Uniform3dv, Uniform4dv),
    (DataType::U32, _) => vector!(u32, Uniform1uiv, Uniform2uiv, Uniform3uiv, Uniform4uiv),
    _ => vector!(i32, Uniform1iv, Uniform2iv, Uniform3iv, Uniform4iv),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn scalar_types() {
    assert_eq!(VariableType::FloatMat4.scalar_type(), DataType::F32);
    assert_eq!(VariableType::DoubleVec3.scalar_type(), DataType::F64);
    assert_eq!(VariableType::UnsignedIntVec2.scalar_type(), DataType::U32);
    assert_eq!(VariableType::BoolVec4.scalar_type(), DataType::I32);
    // sampler units are always set with glUniform1i
    assert_eq!(VariableType::UnsignedIntSampler2D.scalar_type(), DataType::I32);
  }

  #[test]
  fn dimensions() {
    assert_eq!(VariableType::Int.dimensions(), Dimensions::Vector(1));
    assert_eq!(VariableType::FloatVec3.dimensions(), Dimensions::Vector(3));
    assert_eq!(VariableType::FloatMat2x3.dimensions(), Dimensions::Matrix { columns: 2, rows: 3 });
    assert_eq!(VariableType::DoubleMat4.dimensions().components(), 16);
    assert_eq!(VariableType::FloatMat3x4.dimensions().locations(), 3);
    assert_eq!(VariableType::FloatVec4.dimensions().locations(), 1);
    assert!(VariableType::FloatMat4x2.is_matrix());
    assert!(!VariableType::Sampler2D.is_matrix());
  }

  #[test]
  fn classification() {
    assert!(VariableType::IntSamplerBuffer.is_sampler());
    assert!(!VariableType::IntSamplerBuffer.is_image());
    assert!(VariableType::UnsignedIntImage2D.is_image());
    assert!(!VariableType::FloatVec2.is_sampler());
  }

  #[test]
  fn sizes() {
    assert_eq!(VariableType::FloatMat4.itemsize(), 64);
    assert_eq!(VariableType::DoubleVec2.itemsize(), 16);
    let variable = ProgramVariable {
      program_addr: 1,
      index: 0,
      raw_name: "lights[0]".to_owned(),
      length: 3,
      type_: VariableType::FloatVec3,
      location: 4,
    };
    assert_eq!(variable.name(), "lights");
    assert_eq!(variable.nbytes(), 36);
  }

  fn variable(raw_name: &str, type_: VariableType, length: u32) -> ProgramVariable {
    ProgramVariable { program_addr: 1, index: 0, raw_name: raw_name.to_owned(), length, type_, location: 0 }
  }

  #[test]
  fn uniform_writes_count_whole_elements() {
    let lights = variable("lights[0]", VariableType::FloatVec3, 4);
    assert_eq!(check_uniform_write(&lights, DataType::F32, 0, 3).unwrap(), 1);
    assert_eq!(check_uniform_write(&lights, DataType::F32, 1, 9).unwrap(), 3);
    let mvp = variable("mvp", VariableType::FloatMat4, 1);
    assert_eq!(check_uniform_write(&mvp, DataType::F32, 0, 16).unwrap(), 1);
    // samplers are written as ints
    let sampler = variable("tex", VariableType::Sampler2D, 1);
    assert_eq!(check_uniform_write(&sampler, DataType::I32, 0, 1).unwrap(), 1);
  }

  #[test]
  fn uniform_writes_reject_other_scalar_types() {
    let lights = variable("lights[0]", VariableType::FloatVec3, 4);
    match check_uniform_write(&lights, DataType::I32, 0, 3) {
      Err(Error::TypeMismatch { variable, expected, actual }) => {
        assert_eq!(variable, "lights[0]");
        assert_eq!(expected, DataType::F32);
        assert_eq!(actual, DataType::I32);
      }
      other => panic!("expected a type mismatch, got {:?}", other),
    }
    let count = variable("count", VariableType::UnsignedInt, 1);
    assert!(check_uniform_write(&count, DataType::I32, 0, 1).is_err());
  }

  #[test]
  fn uniform_writes_reject_partial_elements() {
    let lights = variable("lights[0]", VariableType::FloatVec3, 4);
    assert!(check_uniform_write(&lights, DataType::F32, 0, 0).is_err());
    assert!(check_uniform_write(&lights, DataType::F32, 0, 4).is_err());
    let mvp = variable("mvp", VariableType::FloatMat4, 1);
    assert!(check_uniform_write(&mvp, DataType::F32, 0, 12).is_err());
  }

  #[test]
  fn uniform_writes_stay_within_the_array() {
    let lights = variable("lights[0]", VariableType::FloatVec3, 4);
    assert!(check_uniform_write(&lights, DataType::F32, 3, 3).is_ok());
    assert!(check_uniform_write(&lights, DataType::F32, 4, 3).is_err());
    assert!(check_uniform_write(&lights, DataType::F32, 2, 9).is_err());
    let time = variable("time", VariableType::Float, 1);
    assert!(check_uniform_write(&time, DataType::F32, 0, 2).is_err());
  }

  #[test]
  fn missing_variables_are_skipped() {
    let mut uniforms = BTreeMap::new();
    uniforms.insert("mvp".to_owned(), 3);
    assert_eq!(find_active(1, &uniforms, VariableKind::Uniform, "mvp"), Some(&3));
    assert_eq!(find_active(1, &uniforms, VariableKind::Uniform, "unused_color"), None);
    assert_eq!(find_active(1, &uniforms, VariableKind::Uniform, "mvp[0]"), None);
  }

  #[test]
  fn array_suffixes() {
    assert_eq!(strip_array_suffix("mvp"), "mvp");
    assert_eq!(strip_array_suffix("bones[0]"), "bones");
  }

  #[test]
  fn ranges_are_clamped() {
    assert_eq!(clamp_range(.., 4), 0..4);
    assert_eq!(clamp_range(1..10, 4), 1..4);
    assert_eq!(clamp_range(2..=2, 4), 2..3);
    assert_eq!(clamp_range(6.., 4), 4..4);
  }
}
