//! An object-oriented wrapper around the OpenGL 4.5 core API.
//!
//! Every GL object is owned by a wrapper struct which creates the handle on
//! construction and deletes it on drop. Binding an object returns a guard which
//! restores the previous binding once it goes out of scope.

macro_rules! gl_enum {
  // a wrapper for autoformatting purposes
  ({$($tt:tt)+}) => { gl_enum! { $($tt)+ } };

  (
    $(#[$enum_meta:meta])* $visibility:vis enum $enum_name:ident {
      $($(#[$variant_meta:meta])* $rust_variant:ident = $gl_variant:ident),+ $(,)?
    }
  ) => {
    #[repr(u32)]
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    $(#[$enum_meta])*
    $visibility enum $enum_name {
      $($(#[$variant_meta])* $rust_variant = $crate::gl::$gl_variant,)+
    }

    impl $enum_name {
      $visibility const VARIANTS: &'static [Self] = &[$(Self::$rust_variant),+];

      $visibility const fn from_raw(raw: $crate::gl::types::GLenum) -> Option<Self> {
        Some(match raw {
          $($crate::gl::$gl_variant => Self::$rust_variant,)+
            _ => return None,
        })
      }

      #[inline(always)]
      $visibility const fn as_raw(&self) -> $crate::gl::types::GLenum {
        *self as $crate::gl::types::GLenum
      }
    }
  };
}

pub mod buffer;
pub mod buffer_pointer;
pub mod context;
pub mod data_type;
pub mod debug;
pub mod error;
pub mod image;
mod impl_prelude;
pub mod mesh;
pub mod pipeline;
pub mod program;
pub mod shader;
pub mod state;
pub mod texture;
pub mod traits;
pub mod variables;
pub mod vertex_array;

pub use buffer::*;
pub use buffer_pointer::*;
pub use context::*;
pub use data_type::*;
pub use error::{Error, Result};
pub use image::*;
pub use mesh::*;
pub use pipeline::*;
pub use program::*;
pub use shader::*;
pub use state::*;
pub use texture::*;
pub use traits::*;
pub use variables::*;
pub use vertex_array::*;

pub use omgl_sys as gl;
pub use omgl_sys::types::*;
