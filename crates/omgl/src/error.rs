use prelude_plus::*;

use crate::data_type::DataType;
use crate::shader::ShaderError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("invalid parameters: {0}")]
  InvalidParameters(String),
  #[error("shader compilation failed:\n{}", join_shader_errors(.0))]
  Compile(Vec<ShaderError>),
  #[error("program linking failed:\n{0}")]
  Link(String),
  #[error("buffer is already mapped")]
  AlreadyMapped,
  #[error("buffer is not mapped")]
  NotMapped,
  #[error("buffer is mapped read only")]
  ReadOnlyMapping,
  #[error("buffer is mapped write only")]
  WriteOnlyMapping,
  #[error("variable {variable:?} holds {expected:?} values, got {actual:?}")]
  TypeMismatch { variable: String, expected: DataType, actual: DataType },
  #[error("unknown program variable {0:?}")]
  UnknownVariable(String),
  #[error("unsupported image: {0}")]
  UnsupportedImage(String),
  #[error(transparent)]
  Io(#[from] io::Error),
  #[error(transparent)]
  Png(#[from] png::DecodingError),
  #[error(transparent)]
  Jpeg(#[from] jpeg_decoder::Error),
  #[error(transparent)]
  Nul(#[from] ffi::NulError),
}

impl Error {
  #[inline]
  pub(crate) fn invalid(message: impl Into<String>) -> Self {
    Self::InvalidParameters(message.into())
  }
}

fn join_shader_errors(errors: &[ShaderError]) -> String {
  errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn messages() {
    assert_eq!(Error::invalid("zero-sized buffer").to_string(), "invalid parameters: zero-sized buffer");
    assert_eq!(
      Error::TypeMismatch { variable: "mvp".to_owned(), expected: DataType::F32, actual: DataType::I32 }
        .to_string(),
      "variable \"mvp\" holds F32 values, got I32",
    );
  }
}
