pub use self::all::*;

pub mod all {
  #![allow(clippy::all, non_upper_case_globals, unused_parens)]
  include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
}

pub mod prelude {
  pub use super::all as gl;
  pub use super::all::types::*;
  pub use super::all::Gl;
}
