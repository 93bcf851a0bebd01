use crate::debug;
use crate::impl_prelude::*;

/// A wrapper owning a single GL object handle.
///
/// # Safety
///
/// `addr` must return a live handle of the object kind named by
/// `DEBUG_TYPE_IDENTIFIER`, created in the context returned by `ctx`.
pub unsafe trait Object {
  const DEBUG_TYPE_IDENTIFIER: u32;

  fn ctx(&self) -> &SharedContext;
  fn addr(&self) -> u32;

  #[inline(always)]
  fn raw_gl(&self) -> &RawGL { self.ctx().raw_gl() }

  fn set_debug_label(&self, label: &[u8]) -> Result<()> {
    unsafe { debug::set_object_debug_label(self.ctx(), Self::DEBUG_TYPE_IDENTIFIER, self.addr(), label) }
  }

  fn get_debug_label(&self) -> Vec<u8> {
    unsafe { debug::get_object_debug_label(self.ctx(), Self::DEBUG_TYPE_IDENTIFIER, self.addr()) }
  }
}

/// A guard returned by `bind` methods. The previous binding is restored when it
/// is dropped.
pub trait ObjectBinding<Obj: Object> {
  fn object(&self) -> &Obj;

  #[inline(always)]
  fn ctx<'a>(&'a self) -> &'a SharedContext where Obj: 'a { self.object().ctx() }
  #[inline(always)]
  fn raw_gl<'a>(&'a self) -> &'a RawGL where Obj: 'a { self.object().raw_gl() }
}
