use gl_generator::{Api, DebugStructGenerator, Fallbacks, Profile, Registry, StructGenerator};
use std::env;
use std::fs::File;
use std::path::Path;

fn main() {
  println!("cargo:rerun-if-changed=build.rs");

  let dest = env::var("OUT_DIR").unwrap();
  let mut file = File::create(&Path::new(&dest).join("bindings.rs")).unwrap();

  // 4.5 core, KHR_debug entry points are checked with `is_loaded()` before use
  // since drivers without the extension leave them null.
  let registry = Registry::new(Api::Gl, (4, 5), Profile::Core, Fallbacks::All, ["GL_KHR_debug"]);

  if cfg!(feature = "debug_all_commands") {
    registry.write_bindings(DebugStructGenerator, &mut file)
  } else {
    registry.write_bindings(StructGenerator, &mut file)
  }
  .unwrap();
}
