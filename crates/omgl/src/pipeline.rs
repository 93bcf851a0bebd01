use crate::data_type::DataType;
use crate::impl_prelude::*;
use crate::program::{Program, ProgramBinding};
use crate::texture::{BufferTexture, Texture, TextureObject};
use crate::variables::{find_active, Uniform, VariableKind};
use omgl_math::*;
use prelude_plus::*;

/// A value assigned to a uniform when a pipeline is bound.
#[derive(Debug, Clone)]
pub enum PipelineValue {
  F32(Vec<f32>),
  F64(Vec<f64>),
  I32(Vec<i32>),
  U32(Vec<u32>),
  /// Bound to `unit` with the sampler uniform pointing there, or to the unit
  /// the sampler uniform already holds when `unit` is `None`.
  Texture { texture: Rc<dyn TextureObject>, unit: Option<u32> },
}

impl PipelineValue {
  pub fn texture(texture: Rc<dyn TextureObject>, unit: Option<u32>) -> Self { Self::Texture { texture, unit } }
}

macro_rules! impl_pipeline_value_from {
  ($($ty:ty => |$value:ident| $variant:ident($expr:expr)),+ $(,)?) => {
    $(impl From<$ty> for PipelineValue {
      #[inline]
      fn from($value: $ty) -> Self { Self::$variant($expr) }
    })+
  };
}

impl_pipeline_value_from![
  f32 => |value| F32(vec![value]),
  f64 => |value| F64(vec![value]),
  i32 => |value| I32(vec![value]),
  u32 => |value| U32(vec![value]),
  bool => |value| I32(vec![value as i32]),
  Vec<f32> => |value| F32(value),
  Vec<f64> => |value| F64(value),
  Vec<i32> => |value| I32(value),
  Vec<u32> => |value| U32(value),
  &[f32] => |value| F32(value.to_vec()),
  Vec2f => |value| F32(value.to_array().to_vec()),
  Vec3f => |value| F32(value.to_array().to_vec()),
  Vec4f => |value| F32(value.to_array().to_vec()),
  Colorf => |value| F32(value.to_array().to_vec()),
  Mat4f => |value| F32(value.as_ref().to_vec()),
];

impl From<Rc<Texture>> for PipelineValue {
  #[inline]
  fn from(texture: Rc<Texture>) -> Self { Self::Texture { texture, unit: None } }
}

impl From<Rc<BufferTexture>> for PipelineValue {
  #[inline]
  fn from(texture: Rc<BufferTexture>) -> Self { Self::Texture { texture, unit: None } }
}

/// Converts numeric values to the scalar type the uniform is declared with.
#[allow(clippy::unnecessary_cast)]
fn set_numeric_uniform(binding: &ProgramBinding<'_>, uniform: &Uniform, value: &PipelineValue) -> Result<()> {
  macro_rules! cast_and_set {
    ($values:expr) => {
      match uniform.data_type() {
        DataType::F32 => uniform.set(binding, &$values.iter().map(|&v| v as f32).collect::<Vec<f32>>()),
        DataType::F64 => uniform.set(binding, &$values.iter().map(|&v| v as f64).collect::<Vec<f64>>()),
        DataType::I32 => uniform.set(binding, &$values.iter().map(|&v| v as i32).collect::<Vec<i32>>()),
        DataType::U32 => uniform.set(binding, &$values.iter().map(|&v| v as u32).collect::<Vec<u32>>()),
        other => Err(Error::invalid(format!("uniform {:?} has no {:?} setter", uniform.raw_name(), other))),
      }
    };
  }

  match value {
    PipelineValue::F32(values) => cast_and_set!(values),
    PipelineValue::F64(values) => cast_and_set!(values),
    PipelineValue::I32(values) => cast_and_set!(values),
    PipelineValue::U32(values) => cast_and_set!(values),
    PipelineValue::Texture { .. } => {
      Err(Error::invalid(format!("uniform {:?} is given a texture", uniform.raw_name())))
    }
  }
}

/// The unit a sampler is bound to: `requested` when given, otherwise the one
/// the sampler uniform already holds.
fn texture_unit(name: &str, requested: Option<u32>, stored: impl FnOnce() -> Result<i32>) -> Result<u32> {
  match requested {
    Some(unit) => Ok(unit),
    None => {
      let stored = stored()?;
      u32::try_from(stored).map_err(|_| Error::invalid(format!("sampler {:?} holds unit {}", name, stored)))
    }
  }
}

/// A program together with the uniform values and textures it renders with.
#[derive(Debug, Clone)]
pub struct Pipeline {
  program: Rc<Program>,
  properties: BTreeMap<String, PipelineValue>,
}

impl Pipeline {
  pub fn new(program: Rc<Program>) -> Self { Self { program, properties: BTreeMap::new() } }

  pub fn with(mut self, name: impl Into<String>, value: impl Into<PipelineValue>) -> Self {
    self.set(name, value);
    self
  }

  #[inline(always)]
  pub fn program(&self) -> &Rc<Program> { &self.program }
  #[inline(always)]
  pub fn properties(&self) -> &BTreeMap<String, PipelineValue> { &self.properties }

  pub fn get(&self, name: &str) -> Option<&PipelineValue> { self.properties.get(name) }

  pub fn set(&mut self, name: impl Into<String>, value: impl Into<PipelineValue>) -> Option<PipelineValue> {
    self.properties.insert(name.into(), value.into())
  }

  pub fn remove(&mut self, name: &str) -> Option<PipelineValue> { self.properties.remove(name) }

  /// Uses the program and applies every property.
  pub fn bind(&self) -> Result<PipelineBinding<'_>> {
    let mut binding = PipelineBinding { program: self.program.bind(), textures: Vec::new() };
    for (name, value) in &self.properties {
      binding.set_uniform(name, value)?;
    }
    Ok(binding)
  }
}

/// Keeps the program in use and the textures of a pipeline bound.
#[derive(Debug)]
pub struct PipelineBinding<'a> {
  program: ProgramBinding<'a>,
  textures: Vec<(Rc<dyn TextureObject>, u32)>,
}

impl<'a> PipelineBinding<'a> {
  #[inline(always)]
  pub fn program(&self) -> &ProgramBinding<'a> { &self.program }

  /// Applies per-draw values on top of the pipeline properties.
  pub fn set_uniforms(&mut self, values: &[(&str, PipelineValue)]) -> Result<()> {
    for (name, value) in values {
      self.set_uniform(name, value)?;
    }
    Ok(())
  }

  /// Names which are not active uniforms of the program are skipped, the
  /// compiler drops unused ones.
  pub fn set_uniform(&mut self, name: &str, value: &PipelineValue) -> Result<()> {
    let program = self.program.object();
    let uniform = match find_active(program.addr(), program.uniforms(), VariableKind::Uniform, name) {
      Some(uniform) => uniform,
      None => return Ok(()),
    };

    if let PipelineValue::Texture { texture, unit: requested } = value {
      if !uniform.type_().is_sampler() {
        return Err(Error::invalid(format!("uniform {:?} is not a sampler", name)));
      }
      let unit = texture_unit(name, *requested, || Ok(uniform.get_at::<i32>(0)?[0]))?;
      if requested.is_some() {
        uniform.set(&self.program, &[unit as i32])?;
      }
      texture.bind_to_unit(unit)?;
      self.textures.push((Rc::clone(texture), unit));
      return Ok(());
    }

    set_numeric_uniform(&self.program, uniform, value)
  }
}

impl<'a> Drop for PipelineBinding<'a> {
  fn drop(&mut self) {
    for (texture, unit) in self.textures.drain(..).rev() {
      texture.unbind_from_unit(unit);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn floats(value: PipelineValue) -> Vec<f32> {
    match value {
      PipelineValue::F32(values) => values,
      other => panic!("not a float value: {:?}", other),
    }
  }

  #[test]
  fn values_from_math_types() {
    assert_eq!(floats(vec3(1.0, 2.0, 3.0).into()), vec![1.0, 2.0, 3.0]);
    assert_eq!(floats(color(0.1, 0.2, 0.3, 1.0).into()), vec![0.1, 0.2, 0.3, 1.0]);
    let matrix = floats(Mat4f::from_translation(vec3(5.0, 6.0, 7.0)).into());
    assert_eq!(matrix.len(), 16);
    assert_eq!(&matrix[12..], &[5.0, 6.0, 7.0, 1.0]);
  }

  #[test]
  fn requested_texture_units_win() {
    let unit = texture_unit("tex", Some(3), || panic!("the sampler must not be read")).unwrap();
    assert_eq!(unit, 3);
  }

  #[test]
  fn texture_units_fall_back_to_the_sampler() {
    assert_eq!(texture_unit("tex", None, || Ok(2)).unwrap(), 2);
    assert!(texture_unit("tex", None, || Ok(-1)).is_err());
    assert!(texture_unit("tex", None, || Err(Error::UnknownVariable("tex".to_owned()))).is_err());
  }

  #[test]
  fn booleans_are_integers() {
    assert!(matches!(PipelineValue::from(true), PipelineValue::I32(values) if values == vec![1]));
    assert!(matches!(PipelineValue::from(false), PipelineValue::I32(values) if values == vec![0]));
    assert!(matches!(PipelineValue::from(7u32), PipelineValue::U32(values) if values == vec![7]));
  }
}
