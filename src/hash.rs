//! Slot hashing: reduces a key to the bucket whose cluster it belongs to.

use core::hash::BuildHasher;

/// Maps a key to a bucket index.
///
/// Implementations must be pure: the same key and slot count always give the
/// same index, and the index is always `< slots`. Collisions are expected;
/// entries that share a slot form one cluster on the ordering list.
pub trait SlotHasher {
    fn slot(&self, key: &str, slots: usize) -> usize;
}

impl<T: SlotHasher + ?Sized> SlotHasher for &T {
    fn slot(&self, key: &str, slots: usize) -> usize {
        (**self).slot(key, slots)
    }
}

/// Bernstein's string hash (`h = h * 33 + byte`, seeded with 5381).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Djb2;

impl Djb2 {
    #[inline]
    pub fn hash(key: &str) -> u64 {
        key.bytes().fold(5381u64, |h, b| {
            (h << 5).wrapping_add(h).wrapping_add(u64::from(b))
        })
    }
}

impl SlotHasher for Djb2 {
    #[inline]
    fn slot(&self, key: &str, slots: usize) -> usize {
        reduce(Self::hash(key), slots)
    }
}

/// Adapts any [`BuildHasher`] into a [`SlotHasher`].
///
/// The builder must hash deterministically for as long as the dictionary
/// lives; a randomly seeded `RandomState` qualifies because its seed is fixed
/// once constructed.
#[derive(Clone, Debug, Default)]
pub struct BuildHasherSlots<S>(pub S);

impl<S: BuildHasher> SlotHasher for BuildHasherSlots<S> {
    #[inline]
    fn slot(&self, key: &str, slots: usize) -> usize {
        reduce(self.0.hash_one(key), slots)
    }
}

#[inline]
fn reduce(hash: u64, slots: usize) -> usize {
    debug_assert!(slots > 0);
    (hash % slots as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::RandomState;

    #[test]
    fn djb2_known_values() {
        assert_eq!(Djb2::hash(""), 5381);
        // 5381 * 33 + 'a'
        assert_eq!(Djb2::hash("a"), 177_670);
        assert_eq!(Djb2::hash("ab"), 177_670 * 33 + 98);
    }

    #[test]
    fn slot_is_in_range_and_stable() {
        for slots in [1usize, 2, 7, 10_000] {
            for key in ["a", "b", "http://example.com/", "zzzzzzzzzzzzzzzz"] {
                let s = Djb2.slot(key, slots);
                assert!(s < slots);
                assert_eq!(s, Djb2.slot(key, slots));
            }
        }
    }

    #[test]
    fn single_slot_puts_everything_together() {
        assert_eq!(Djb2.slot("x", 1), 0);
        assert_eq!(Djb2.slot("a much longer key", 1), 0);
    }

    #[test]
    fn build_hasher_adapter_is_stable_per_instance() {
        let h = BuildHasherSlots(RandomState::new());
        let first = h.slot("k1", 97);
        assert!(first < 97);
        for _ in 0..16 {
            assert_eq!(h.slot("k1", 97), first);
        }
    }

    #[test]
    fn reference_impl_forwards() {
        let h = Djb2;
        let r = &h;
        assert_eq!(r.slot("abc", 13), Djb2.slot("abc", 13));
    }
}
