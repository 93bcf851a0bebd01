use std::sync::OnceLock;

use regex::Regex;

use crate::impl_prelude::*;
use prelude_plus::*;

gl_enum!({
  pub enum ShaderType {
    Vertex = VERTEX_SHADER,
    Fragment = FRAGMENT_SHADER,
    Geometry = GEOMETRY_SHADER,
    TessControl = TESS_CONTROL_SHADER,
    TessEvaluation = TESS_EVALUATION_SHADER,
    Compute = COMPUTE_SHADER,
  }
});

#[derive(Debug)]
pub struct Shader {
  ctx: SharedContext,
  addr: u32,
  type_: ShaderType,
}

unsafe impl Object for Shader {
  const DEBUG_TYPE_IDENTIFIER: u32 = gl::SHADER;

  #[inline(always)]
  fn ctx(&self) -> &SharedContext { &self.ctx }
  #[inline(always)]
  fn addr(&self) -> u32 { self.addr }
}

impl Shader {
  #[inline(always)]
  pub fn type_(&self) -> ShaderType { self.type_ }

  /// Compiles `source`. Warnings emitted by a successful compilation are
  /// logged.
  pub fn new(ctx: SharedContext, type_: ShaderType, source: &str) -> Result<Self> {
    let c_src = CString::new(source)?;
    let addr = unsafe { ctx.raw_gl().CreateShader(type_.as_raw()) };
    let shader = Self { ctx, addr, type_ };

    let gl = shader.raw_gl();
    unsafe {
      gl.ShaderSource(addr, 1, &c_src.as_ptr(), ptr::null());
      gl.CompileShader(addr);
    }

    let log = shader.info_log();
    if !shader.compile_status() {
      return Err(Error::Compile(ShaderError::parse(Some(type_), &log, source)));
    }
    if !log.trim().is_empty() {
      warn!("{:?} shader #{} compiled with warnings:\n{}", type_, addr, log.trim_end());
    }
    Ok(shader)
  }

  pub fn open(ctx: SharedContext, type_: ShaderType, path: impl AsRef<Path>) -> Result<Self> {
    let source = fs::read_to_string(path)?;
    Self::new(ctx, type_, &source)
  }

  fn get_param(&self, pname: u32) -> i32 {
    let mut value = 0;
    unsafe { self.raw_gl().GetShaderiv(self.addr, pname, &mut value) };
    value
  }

  pub fn compile_status(&self) -> bool { self.get_param(gl::COMPILE_STATUS) == gl::TRUE as i32 }
  pub fn delete_status(&self) -> bool { self.get_param(gl::DELETE_STATUS) == gl::TRUE as i32 }
  /// Including the NUL terminator.
  pub fn source_length(&self) -> usize { self.get_param(gl::SHADER_SOURCE_LENGTH).max(0) as usize }

  pub fn source(&self) -> String {
    let buf_size = self.source_length();
    let mut buf: Vec<u8> = Vec::with_capacity(buf_size);
    if buf_size != 0 {
      let mut text_len: i32 = 0;
      unsafe {
        self.raw_gl().GetShaderSource(self.addr, buf_size as i32, &mut text_len, buf.as_mut_ptr() as *mut c_char);
        buf.set_len(text_len.max(0) as usize);
      }
    }
    String::from_utf8_lossy(&buf).into_owned()
  }

  pub fn info_log(&self) -> String {
    let buf_size = self.get_param(gl::INFO_LOG_LENGTH).max(0);
    let mut buf: Vec<u8> = Vec::with_capacity(buf_size as usize);
    if buf_size != 0 {
      let mut text_len: i32 = 0;
      unsafe {
        self.raw_gl().GetShaderInfoLog(self.addr, buf_size, &mut text_len, buf.as_mut_ptr() as *mut c_char);
        buf.set_len(text_len.max(0) as usize);
      }
    }
    String::from_utf8_lossy(&buf).into_owned()
  }
}

impl Drop for Shader {
  fn drop(&mut self) { unsafe { self.raw_gl().DeleteShader(self.addr) }; }
}

/// A single diagnostic extracted from a compilation log.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShaderError {
  pub shader_type: Option<ShaderType>,
  /// `error`, `warning` and so on, lowercased.
  pub kind: String,
  pub description: String,
  /// One-based.
  pub line: Option<usize>,
  pub source_line: Option<String>,
}

// Capture groups: kind, line, description.
fn log_line_parsers() -> &'static [Regex] {
  static PARSERS: OnceLock<Vec<Regex>> = OnceLock::new();
  PARSERS.get_or_init(|| {
    [
      // ATI, Intel: ERROR: 0:131: '{' : syntax error
      r"^(?P<kind>\w+):\s*\d+:(?P<line>\d+):\s*(?P<description>.*)$",
      // Nvidia: 0(7) : error C1008: undefined variable "MV"
      r"^\d+\((?P<line>\d+)\)\s*:\s*(?P<kind>\w+)\s+\w+:\s*(?P<description>.*)$",
      // Mesa, Nouveau: 0:28(16): error: syntax error, unexpected ')'
      r"^\d+:(?P<line>\d+)\(\d+\):\s*(?P<kind>\w+):\s*(?P<description>.*)$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
  })
}

impl ShaderError {
  pub fn parse(shader_type: Option<ShaderType>, log: &str, source: &str) -> Vec<Self> {
    log
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .map(|log_line| {
        let captures = log_line_parsers().iter().find_map(|parser| parser.captures(log_line));
        match captures {
          Some(captures) => {
            let line = captures["line"].parse::<usize>().ok();
            ShaderError {
              shader_type,
              kind: captures["kind"].to_lowercase(),
              description: captures["description"].trim().to_owned(),
              line,
              source_line: line
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| source.lines().nth(i))
                .map(|l| l.trim().to_owned()),
            }
          }
          None => {
            warn!("unrecognized shader log line: {:?}", log_line);
            ShaderError {
              shader_type,
              kind: "error".to_owned(),
              description: log_line.to_owned(),
              line: None,
              source_line: None,
            }
          }
        }
      })
      .collect()
  }
}

impl fmt::Display for ShaderError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.shader_type {
      Some(shader_type) => write!(f, "{:?} shader {}: {}", shader_type, self.kind, self.description)?,
      None => write!(f, "shader {}: {}", self.kind, self.description)?,
    }
    if let Some(line) = self.line {
      write!(f, "\n  line {}", line)?;
      if let Some(source_line) = &self.source_line {
        write!(f, ": {}", source_line)?;
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  const SOURCE: &str = "#version 330\nin vec3 position;\nvoid main() {\n  gl_Position = MV * position;\n}\n";

  #[test]
  fn parses_ati_logs() {
    let errors = ShaderError::parse(Some(ShaderType::Vertex), "ERROR: 0:3: '{' : syntax error", SOURCE);
    assert_eq!(
      errors,
      vec![ShaderError {
        shader_type: Some(ShaderType::Vertex),
        kind: "error".to_owned(),
        description: "'{' : syntax error".to_owned(),
        line: Some(3),
        source_line: Some("void main() {".to_owned()),
      }],
    );
  }

  #[test]
  fn parses_nvidia_logs() {
    let errors = ShaderError::parse(None, "0(4) : error C1008: undefined variable \"MV\"", SOURCE);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, "error");
    assert_eq!(errors[0].description, "undefined variable \"MV\"");
    assert_eq!(errors[0].line, Some(4));
    assert_eq!(errors[0].source_line.as_deref(), Some("gl_Position = MV * position;"));
  }

  #[test]
  fn parses_mesa_logs() {
    let log = "0:4(17): error: `MV' undeclared\n0:2(1): warning: unused input\n";
    let errors = ShaderError::parse(None, log, SOURCE);
    assert_eq!(errors.iter().map(|e| (e.kind.as_str(), e.line)).collect::<Vec<_>>(), vec![
      ("error", Some(4)),
      ("warning", Some(2)),
    ]);
    assert_eq!(errors[0].description, "`MV' undeclared");
  }

  #[test]
  fn keeps_unrecognized_lines() {
    let errors = ShaderError::parse(None, "something went wrong\n\n", SOURCE);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].description, "something went wrong");
    assert_eq!(errors[0].line, None);
  }

  #[test]
  fn out_of_range_lines_have_no_source() {
    let errors = ShaderError::parse(None, "ERROR: 0:99: oops", SOURCE);
    assert_eq!(errors[0].line, Some(99));
    assert_eq!(errors[0].source_line, None);
  }

  #[test]
  fn display() {
    let error = ShaderError {
      shader_type: Some(ShaderType::Fragment),
      kind: "error".to_owned(),
      description: "syntax error".to_owned(),
      line: Some(3),
      source_line: Some("void main() {".to_owned()),
    };
    assert_eq!(error.to_string(), "Fragment shader error: syntax error\n  line 3: void main() {");
  }
}
