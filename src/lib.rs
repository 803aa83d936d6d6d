//! cluster-dict: a string-keyed dictionary built from a fixed slot array
//! layered over one doubly linked ordering list.
//!
//! Internal Design:
//!
//! Summary
//! - Every entry sits on a single ordering list. Entries whose keys hash to
//!   the same slot are kept contiguous on that list (a cluster), and the slot
//!   array points at the first member of each cluster.
//! - A probe hashes the key once, jumps to the cluster through its slot and
//!   scans only that cluster. An empty slot rejects the key immediately.
//! - New keys go to the end of their cluster, or to the end of the list when
//!   the slot has no cluster yet. Overwrites mutate the entry in place and
//!   never move it.
//!
//! Layers
//! - `hash`: `SlotHasher`, the pluggable key-to-slot mapping. `Djb2` is the
//!   default; `BuildHasherSlots` adapts any `BuildHasher`.
//! - `key`: enforces the key byte bound (truncate or reject).
//! - `dictionary`: the list and slot machinery plus the public
//!   `Dictionary`/`Handle` surface.
//!
//! Constraints
//! - The slot count is fixed at construction; there is no rehashing.
//! - No locking. Mutation needs `&mut self`; callers that share a dictionary
//!   across threads wrap it in their own `Mutex` or `RwLock`.
//! - Nodes live in a generational arena (`slotmap`). List links, slot
//!   pointers and `Handle`s are arena keys, so freed nodes are unreachable
//!   and stale handles resolve to `None`.
//! - Each node caches its slot; cluster scans compare cached slots and never
//!   call the hasher again.
//!
//! Notes and non-goals
//! - No iteration API; access is by key or by `Handle`.
//! - Keys longer than `Config::key_length` bytes are truncated by default, so
//!   two long keys with the same prefix are the same key. Use
//!   `KeyPolicy::Reject` to get an error instead.
//! - `Error::ResourceExhausted` is returned when the arena is full
//!   (`Config::max_entries`); the dictionary is left untouched. Running out
//!   of heap aborts, as any Rust allocation failure does.
//!
//! ```
//! use cluster_dict::Dictionary;
//!
//! let mut d = Dictionary::new();
//! d.upsert("http://example.com/", 1).unwrap();
//! d.upsert("http://example.com/", 2).unwrap();
//! assert_eq!(d.len(), 1);
//! assert_eq!(d.lookup("http://example.com/").unwrap(), Some(&2));
//! assert_eq!(d.remove("http://example.com/").unwrap(), Some(2));
//! assert_eq!(d.lookup("http://example.com/").unwrap(), None);
//! ```

mod config;
mod dictionary;
mod dictionary_proptest;
mod error;
pub mod hash;
mod key;

// Public surface
pub use config::{Config, KEY_LENGTH, MAX_ENTRIES, MAX_HASH_SLOT};
pub use dictionary::{Dictionary, Handle};
pub use error::{Error, KeyError, Result};
pub use hash::{BuildHasherSlots, Djb2, SlotHasher};
pub use key::KeyPolicy;
