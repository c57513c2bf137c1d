//! OpenAddressingMap: the table, its probe walks, and growth.

use crate::probe::{ProbeSeq, MAX_PROBES};
use crate::reentrancy::ReentrancyCheck;
use crate::slot::{Entry, Slot};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use std::collections::hash_map::RandomState;

/// Capacity used by [`OpenAddressingMap::new`].
pub const DEFAULT_CAPACITY: usize = 10;

// Emergency growth during `put` and capacity escalation during rehash are
// both capped. Each escalation more than doubles the capacity, so hitting
// either cap means the hasher is mapping many keys onto one probe chain.
const GROW_LIMIT: usize = 8;
const ESCALATION_LIMIT: usize = 8;

/// A lookup walked [`MAX_PROBES`] slots without hitting the key or an
/// empty slot.
///
/// Under the maintained load factor every placed key resolves within the
/// bound, so this can only be reported while probing for an absent key,
/// and only when its whole probe chain happens to be occupied or buried.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ProbeExhausted;

impl fmt::Display for ProbeExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "probe sequence exhausted after {MAX_PROBES} slots without resolving the key"
        )
    }
}

impl std::error::Error for ProbeExhausted {}

/// An open-addressing map with double hashing, bounded probe walks, and
/// tombstone deletion.
///
/// One contiguous slot array backs the whole map. Collisions are resolved
/// by walking a per-key probe sequence of at most [`MAX_PROBES`] slots.
/// Removal leaves a tombstone so chains stay intact; tombstones are
/// reclaimed wholesale by rehash. Growth replaces the array atomically:
/// a new layout is planned from stored hashes first, entries are moved
/// only once the plan is complete, and the table pointer is swapped in a
/// single step.
pub struct OpenAddressingMap<K, V, S = RandomState> {
    table: Vec<Slot<K, V>>,
    live: usize,
    dead: usize,
    hasher: S,
    reentrancy: ReentrancyCheck,
}

impl<K, V> OpenAddressingMap<K, V>
where
    K: Eq + Hash,
{
    /// Create an empty map with [`DEFAULT_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty map with `capacity` slots.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V> Default for OpenAddressingMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> OpenAddressingMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        assert!(capacity > 0, "capacity must be non-zero");
        let mut table = Vec::new();
        table.resize_with(capacity, Slot::default);
        Self {
            table,
            live: 0,
            dead: 0,
            hasher,
            reentrancy: ReentrancyCheck::new(),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots in the backing table.
    pub fn capacity(&self) -> usize {
        self.table.len()
    }

    /// Reset every slot to empty, keeping the current capacity.
    pub fn clear(&mut self) {
        let g = self.reentrancy.enter();
        let capacity = self.table.len();
        let old = mem::take(&mut self.table);
        self.table.resize_with(capacity, Slot::default);
        self.live = 0;
        self.dead = 0;
        drop(g);
        // Entry drops run only after the table is consistent again, so a
        // key or value Drop impl may reenter the map.
        drop(old);
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// `get`-style walk: empty terminates with absent, a matching live key
    /// resolves, tombstones and foreign keys are stepped over.
    fn locate<Q>(&self, q: &Q) -> Result<Option<usize>, ProbeExhausted>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        for ix in ProbeSeq::new(hash, self.table.len()) {
            match &self.table[ix] {
                Slot::Empty => return Ok(None),
                Slot::Tombstone => {}
                Slot::Occupied(e) => {
                    if e.key.borrow() == q {
                        return Ok(Some(ix));
                    }
                }
            }
        }
        Err(ProbeExhausted)
    }

    fn locate_or_panic<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.locate(q) {
            Ok(found) => found,
            Err(e) => panic!("open-addressing map invariant violated: {e}"),
        }
    }

    /// `put`-style walk over an arbitrary table: the first empty slot or
    /// matching key resolves. The first tombstone seen is remembered and
    /// used only once the walk proves the key absent within the bound;
    /// reusing it any earlier could shadow the key further down the chain
    /// and duplicate it.
    fn insert_slot(table: &[Slot<K, V>], hash: u64, key: &K) -> Option<usize> {
        let mut buried = None;
        for ix in ProbeSeq::new(hash, table.len()) {
            match &table[ix] {
                Slot::Empty => return Some(buried.unwrap_or(ix)),
                Slot::Tombstone => {
                    if buried.is_none() {
                        buried = Some(ix);
                    }
                }
                Slot::Occupied(e) => {
                    if e.key == *key {
                        return Some(ix);
                    }
                }
            }
        }
        buried
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.locate_or_panic(key).is_some()
    }

    /// Look up a key.
    ///
    /// # Panics
    /// Panics on probe exhaustion, which indicates the load-factor
    /// invariant was violated; use [`try_get`](Self::try_get) for the
    /// typed form.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.locate_or_panic(key)
            .and_then(|ix| self.table[ix].entry())
            .map(|e| &e.value)
    }

    /// Fallible lookup: probe exhaustion is reported as an error instead
    /// of a panic.
    pub fn try_get<Q>(&self, key: &Q) -> Result<Option<&V>, ProbeExhausted>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        Ok(self
            .locate(key)?
            .and_then(|ix| self.table[ix].entry())
            .map(|e| &e.value))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let ix = self.locate_or_panic(key)?;
        self.table[ix].entry_mut().map(|e| &mut e.value)
    }

    /// Look up a key, falling back to `default` when absent.
    pub fn get_or<Q>(&self, key: &Q, default: V) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        let _g = self.reentrancy.enter();
        match self.locate_or_panic(key).and_then(|ix| self.table[ix].entry()) {
            Some(e) => e.value.clone(),
            None => default,
        }
    }

    /// Insert or overwrite a binding, returning the previous value if the
    /// key was present.
    ///
    /// Maintenance runs first: when live entries plus tombstones exceed
    /// half the capacity the table is rehashed, growing to `2n + 1` if the
    /// live count alone crossed the threshold and purging tombstones at
    /// the same capacity otherwise. If the probe walk then still finds no
    /// slot, the table grows unconditionally and the insert is retried.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter();

        if self.live + self.dead > self.table.len() / 2 {
            let target = if self.live > self.table.len() / 2 {
                2 * self.table.len() + 1
            } else {
                self.table.len()
            };
            Self::rehash(&mut self.table, self.live, target);
            self.dead = 0;
        }

        let hash = self.make_hash(&key);
        for _ in 0..GROW_LIMIT {
            match Self::insert_slot(&self.table, hash, &key) {
                Some(ix) => {
                    let slot = &mut self.table[ix];
                    match slot {
                        Slot::Occupied(e) => return Some(mem::replace(&mut e.value, value)),
                        _ => {
                            if slot.is_tombstone() {
                                self.dead -= 1;
                            }
                            *slot = Slot::Occupied(Entry { key, value, hash });
                            self.live += 1;
                            return None;
                        }
                    }
                }
                None => {
                    // Emergency rehash: the bound failed despite a healthy
                    // load factor. Grow and retry.
                    let target = 2 * self.table.len() + 1;
                    Self::rehash(&mut self.table, self.live, target);
                    self.dead = 0;
                }
            }
        }
        panic!("open-addressing map failed to place an entry after {GROW_LIMIT} emergency rehashes");
    }

    /// Remove a binding, returning its value.
    ///
    /// The slot becomes a tombstone, never empty: reverting it to empty
    /// would terminate lookups for keys placed later in the same chain.
    ///
    /// # Panics
    /// Panics on probe exhaustion, as for [`get`](Self::get).
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let g = self.reentrancy.enter();
        let ix = self.locate_or_panic(key)?;
        let entry = self.table[ix].bury()?;
        self.live -= 1;
        self.dead += 1;
        drop(g);
        // The removed key drops here, after the guard: the table is
        // consistent and its Drop impl may reenter the map.
        Some(entry.value)
    }

    /// Replace the table with one of `target` capacity, escalating the
    /// capacity whenever some entry cannot be placed within the probe
    /// bound.
    ///
    /// Placement is planned from stored hashes before anything moves, so a
    /// failed attempt costs nothing and the swap is all-or-nothing. A
    /// failed capacity is never retried as-is: hashing is deterministic,
    /// so an identical attempt would fail identically.
    fn rehash(table: &mut Vec<Slot<K, V>>, live: usize, mut target: usize) {
        for _ in 0..ESCALATION_LIMIT {
            if let Some(plan) = Self::plan_layout(table, live, target) {
                let mut old = mem::take(table);
                table.resize_with(target, Slot::default);
                for (old_ix, new_ix) in plan {
                    if let Some(entry) = old[old_ix].bury() {
                        table[new_ix] = Slot::Occupied(entry);
                    }
                }
                return;
            }
            target = 2 * target + 1;
        }
        panic!("open-addressing map rehash failed after {ESCALATION_LIMIT} capacity escalations");
    }

    /// Compute a placement for every live entry in a table of `target`
    /// slots, or `None` if any entry's bounded walk finds no free slot.
    fn plan_layout(
        table: &[Slot<K, V>],
        live: usize,
        target: usize,
    ) -> Option<Vec<(usize, usize)>> {
        let mut taken = vec![false; target];
        let mut plan = Vec::with_capacity(live);
        for (old_ix, slot) in table.iter().enumerate() {
            if let Some(entry) = slot.entry() {
                let new_ix = ProbeSeq::new(entry.hash, target).find(|&ix| !taken[ix])?;
                taken[new_ix] = true;
                plan.push((old_ix, new_ix));
            }
        }
        Some(plan)
    }

    /// Iterate over `(key, value)` pairs in ascending slot order.
    ///
    /// The order is an artifact of the current layout and changes across
    /// rehashes.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.table.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            slots: self.table.iter_mut(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }
}

/// Iterator over immutable entries, skipping empty and buried slots.
pub struct Iter<'a, K, V> {
    slots: core::slice::Iter<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Slot::Occupied(e) = self.slots.next()? {
                return Some((&e.key, &e.value));
            }
        }
    }
}

/// Iterator over entries with mutable value access.
pub struct IterMut<'a, K, V> {
    slots: core::slice::IterMut<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Slot::Occupied(e) = self.slots.next()? {
                return Some((&e.key, &mut e.value));
            }
        }
    }
}

/// Iterator over keys, in the same order as [`Iter`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}
