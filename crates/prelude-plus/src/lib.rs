//! Glob-imported by every crate in the workspace, so that each module doesn't
//! have to start with a wall of `use std::...` lines.

pub use std::borrow::Cow;
pub use std::cell::{Cell, OnceCell, Ref, RefCell, RefMut};
pub use std::cmp;
pub use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
pub use std::convert::{TryFrom, TryInto};
pub use std::env;
pub use std::ffi::{self, CStr, CString};
pub use std::fmt;
pub use std::fs::{self, File};
pub use std::io::{self, BufRead, BufReader, Read, Write};
pub use std::iter;
pub use std::marker::PhantomData;
pub use std::mem;
pub use std::ops::{Deref, DerefMut, Range, RangeBounds, Bound};
pub use std::os::raw::{c_char, c_void};
pub use std::path::{Path, PathBuf};
pub use std::ptr;
pub use std::rc::{Rc, Weak as RcWeak};
pub use std::slice;
pub use std::str;
pub use std::time::{self, Duration, Instant};

#[cfg(feature = "anyhow")]
pub use ::anyhow::{
  self, bail, ensure, format_err, Context as ResultContextExt, Error as AnyError,
  Result as AnyResult,
};
#[cfg(feature = "bitflags")]
pub use ::bitflags::bitflags;
#[cfg(feature = "log")]
pub use ::log::{self, debug, error, info, log_enabled, trace, warn, Level as LogLevel};
