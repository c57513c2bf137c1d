//! probemap: an open-addressing hash map with double hashing, bounded
//! probe walks, and tombstone deletion.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one contiguous slot array holds every binding; all behavior is
//!   a consequence of how that array is probed, grown, and iterated.
//! - Layers:
//!   - probe: derives the home index and stride for a key's 64-bit hash
//!     and drives the bounded candidate walk (at most `MAX_PROBES` slots
//!     per operation).
//!   - slot: the tagged cell state — `Empty`, `Tombstone`, or
//!     `Occupied(key, value, hash)`.
//!   - map: `OpenAddressingMap`, the public container tying the walks to
//!     load-factor maintenance, tombstone bookkeeping, and rehash.
//!
//! Constraints
//! - Single-threaded, synchronous; every operation runs to completion
//!   within the probe bound before returning.
//! - The map exclusively owns its table. Rehash plans a complete new
//!   layout before moving anything, then swaps the array wholesale;
//!   callers never observe a half-migrated table.
//! - Deletion leaves a tombstone, never an empty slot, so probe chains
//!   stay valid for keys placed behind the removed one. Tombstones are
//!   reclaimed only by rehash or `clear`.
//! - `len()` is the true live-entry count: overwrites do not inflate it
//!   and removals decrement it.
//!
//! Bounded probing policy
//! - A walk visits at most `MAX_PROBES` slots. For insertion, running out
//!   of candidates is not an error: the table grows (`2n + 1`) and the
//!   insert retries. For lookup, running out means the load-factor
//!   invariant was broken somewhere; the infallible accessors treat it as
//!   a hard failure and `try_get` returns it as a typed error. A key that
//!   was placed is always found within the bound, so only absent keys can
//!   ever hit it.
//!
//! Hasher and rehashing invariants
//! - Each entry stores its precomputed `u64` hash and every probe walk
//!   and rehash indexes by the stored hash; `K: Hash` is never invoked
//!   after insertion, so rehash calls no user code.
//!
//! Reentrancy policy
//! - Probe walks invoke user code only via `K: Eq`/`Hash`. A debug-only
//!   check panics if those impls call back into the same map while it is
//!   transiently inconsistent; release builds compile the check away.
//!   Values removed from the table are dropped only after the structure
//!   is consistent again, so `Drop` impls may reenter safely.
//!
//! Notes and non-goals
//! - Not thread-safe; no persistence.
//! - Iteration order is ascending slot index, an artifact of the current
//!   layout; it changes across rehashes and carries no guarantee.
//! - Hash-function injection is limited to `S: BuildHasher` for the base
//!   hash; the double-hashing derivation on top of it is fixed.

mod map;
mod map_proptest;
mod probe;
mod reentrancy;
mod slot;

// Public surface
pub use map::{Iter, IterMut, Keys, OpenAddressingMap, ProbeExhausted, DEFAULT_CAPACITY};
pub use probe::MAX_PROBES;
