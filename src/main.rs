//! Demos of the omgl wrapper. The first argument picks the demo, the second
//! one points at a JSON config file.

mod app;
mod config;
mod cube;
mod demos;

use app::App;
use config::{Config, DEFAULT_CONFIG_PATH};
use demos::Demo;
use prelude_plus::*;

const DEFAULT_DEMO: Demo = Demo::TexturedCube;

fn main() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  if let Err(err) = try_main() {
    error!("{:?}", err);
    std::process::exit(1);
  }
}

fn try_main() -> AnyResult<()> {
  let mut args = env::args().skip(1);

  let demo = match args.next() {
    Some(name) => Demo::from_name(&name).ok_or_else(|| {
      let names: Vec<&str> = Demo::ALL.iter().map(|demo| demo.name()).collect();
      format_err!("unknown demo {:?}, available ones: {}", name, names.join(", "))
    })?,
    None => DEFAULT_DEMO,
  };

  let config = match args.next() {
    Some(path) => Config::load(Path::new(&path))?,
    None => Config::load_or_default(Path::new(DEFAULT_CONFIG_PATH))?,
  };

  let mut app = App::init(&config)?;
  demo.run(&mut app, &config)
}
