//! Slot: one storage cell of the backing table.

/// A live binding together with the precomputed hash of its key.
///
/// The hash is computed once at insertion and reused for every subsequent
/// probe and rehash; `K: Hash` is never invoked again after the entry is
/// stored.
#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
}

/// State of a single table cell.
///
/// `Tombstone` marks a cell that held an entry which was removed. It must
/// not terminate a lookup walk (keys placed later in the same probe chain
/// would become unreachable), but it is a valid target for insertion.
/// Tombstones are only reclaimed wholesale, by rehash or `clear`.
#[derive(Debug)]
pub(crate) enum Slot<K, V> {
    Empty,
    Tombstone,
    Occupied(Entry<K, V>),
}

impl<K, V> Slot<K, V> {
    #[inline]
    pub(crate) fn is_tombstone(&self) -> bool {
        matches!(self, Slot::Tombstone)
    }

    #[inline]
    pub(crate) fn entry(&self) -> Option<&Entry<K, V>> {
        match self {
            Slot::Occupied(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self) -> Option<&mut Entry<K, V>> {
        match self {
            Slot::Occupied(e) => Some(e),
            _ => None,
        }
    }

    /// Take the slot's contents, leaving a tombstone behind.
    pub(crate) fn bury(&mut self) -> Option<Entry<K, V>> {
        match core::mem::replace(self, Slot::Tombstone) {
            Slot::Occupied(e) => Some(e),
            other => {
                // Nothing to bury; restore the original state.
                *self = other;
                None
            }
        }
    }
}

impl<K, V> Default for Slot<K, V> {
    fn default() -> Self {
        Slot::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bury_takes_only_occupied() {
        let mut s: Slot<&str, i32> = Slot::Occupied(Entry {
            key: "k",
            value: 1,
            hash: 0,
        });
        let e = s.bury().expect("occupied slot yields its entry");
        assert_eq!(e.key, "k");
        assert_eq!(e.value, 1);
        assert!(s.is_tombstone());

        // Burying again is a no-op and must not turn the tombstone empty.
        assert!(s.bury().is_none());
        assert!(s.is_tombstone());

        let mut empty: Slot<&str, i32> = Slot::Empty;
        assert!(empty.bury().is_none());
        assert!(matches!(empty, Slot::Empty));
    }
}
