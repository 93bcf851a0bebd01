pub use crate::context::{Context, RawGL, SharedContext};
pub use crate::error::{Error, Result};
pub use crate::traits::{Object, ObjectBinding};
pub use crate::gl;
pub use crate::gl::types::*;
