use omgl_math::*;
use prelude_plus::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "omgl_demos.json";

/// Settings shared by all demos. Fields missing from the file keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
  pub window_size: Vec2u32,
  pub window_title: String,
  pub gl_version: (u8, u8),
  pub clear_color: Colorf,
  /// Vertical field of view in degrees.
  pub fov: f32,
  /// Radians per second around the Y axis.
  pub rotation_speed: f32,
  /// Image for the textured cube, random noise when unset.
  pub texture_path: Option<PathBuf>,
  pub vsync: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      window_size: vec2(640, 480),
      window_title: env!("CARGO_PKG_NAME").to_owned(),
      gl_version: (4, 5),
      clear_color: color(0.2, 0.2, 0.2, 1.0),
      fov: 90.0,
      rotation_speed: std::f32::consts::PI,
      texture_path: None,
      vsync: true,
    }
  }
}

impl Config {
  pub fn from_json(text: &str) -> AnyResult<Self> {
    let config: Self = serde_json::from_str(text)?;
    config.validate()?;
    Ok(config)
  }

  pub fn load(path: &Path) -> AnyResult<Self> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {:?}", path))?;
    let config = Self::from_json(&text).with_context(|| format!("invalid config file {:?}", path))?;
    debug!("loaded config from {:?}", path);
    Ok(config)
  }

  /// Like [`Config::load`], except that a missing file yields the defaults.
  pub fn load_or_default(path: &Path) -> AnyResult<Self> {
    if path.exists() {
      Self::load(path)
    } else {
      debug!("no config file at {:?}, using the defaults", path);
      Ok(Self::default())
    }
  }

  fn validate(&self) -> AnyResult<()> {
    ensure!(self.window_size.x > 0 && self.window_size.y > 0, "empty window size {:?}", self.window_size);
    ensure!(self.gl_version >= (3, 3), "GL {}.{} is too old", self.gl_version.0, self.gl_version.1);
    ensure!(self.fov > 0.0 && self.fov < 180.0, "field of view {} is out of range", self.fov);
    Ok(())
  }

  #[inline]
  pub fn fov_radians(&self) -> f32 { self.fov.to_radians() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn empty_object_gives_defaults() {
    assert_eq!(Config::from_json("{}").unwrap(), Config::default());
  }

  #[test]
  fn fields_override_defaults() {
    let config = Config::from_json(
      r#"{
        "window_size": { "x": 1280, "y": 720 },
        "clear_color": { "r": 1.0, "g": 0.5, "b": 0.0, "a": 1.0 },
        "texture_path": "assets/crate.png",
        "vsync": false
      }"#,
    )
    .unwrap();
    assert_eq!(config.window_size, vec2(1280, 720));
    assert_eq!(config.clear_color, color(1.0, 0.5, 0.0, 1.0));
    assert_eq!(config.texture_path, Some(PathBuf::from("assets/crate.png")));
    assert!(!config.vsync);
    assert_eq!(config.gl_version, (4, 5));
    assert_eq!(config.fov, 90.0);
  }

  #[test]
  fn invalid_configs_are_rejected() {
    assert!(Config::from_json("[]").is_err());
    assert!(Config::from_json(r#"{ "fov": 200.0 }"#).is_err());
    assert!(Config::from_json(r#"{ "gl_version": [2, 0] }"#).is_err());
    assert!(Config::from_json(r#"{ "window_size": { "x": 0, "y": 10 } }"#).is_err());
  }

  #[test]
  fn missing_file_gives_defaults() {
    let config = Config::load_or_default(Path::new("surely/not/here.json")).unwrap();
    assert_eq!(config, Config::default());
  }
}
