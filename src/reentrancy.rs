//! Debug-only reentrancy check.
//!
//! Probe walks call user `Eq`/`Hash` implementations while the table is
//! being mutated. Re-entering the map from inside those calls would observe
//! (or corrupt) a transiently inconsistent table. Debug builds detect the
//! nested entry and panic; release builds compile the check down to nothing.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-map reentrancy tracker. Public entry points open a scope with
/// `let _g = self.reentrancy.enter();`.
#[derive(Debug)]
pub(crate) struct ReentrancyCheck {
    #[cfg(debug_assertions)]
    active: Cell<bool>,
    // !Send + !Sync, matching the single-threaded design.
    _nosend: PhantomData<*mut ()>,
}

impl ReentrancyCheck {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(false),
            _nosend: PhantomData,
        }
    }

    /// Open a guarded scope. Panics in debug builds if one is already open.
    #[inline]
    pub(crate) fn enter(&self) -> EntryGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.active.get(),
                "reentrant call into OpenAddressingMap from a key's Eq/Hash impl"
            );
            self.active.set(true);
            return EntryGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return EntryGuard { _z: PhantomData };
        }
    }
}

/// RAII scope returned by [`ReentrancyCheck::enter`].
pub(crate) struct EntryGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a ReentrancyCheck,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl<'a> Drop for EntryGuard<'a> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.active.set(false);
    }
}
