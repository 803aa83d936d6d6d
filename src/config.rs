use crate::key::KeyPolicy;

/// Default number of hash slots.
pub const MAX_HASH_SLOT: usize = 10_000;

/// Default key bound, in bytes.
pub const KEY_LENGTH: usize = 1000;

/// Most live entries the arena can index.
pub const MAX_ENTRIES: usize = (u32::MAX - 2) as usize;

/// Construction-time settings for a [`Dictionary`](crate::Dictionary).
///
/// None of these change after construction; in particular the slot array is
/// never resized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Number of hash slots
    pub slots: usize,

    /// Key bound in bytes
    pub key_length: usize,

    /// Handling of keys longer than `key_length`
    pub key_policy: KeyPolicy,

    /// Live entries allowed before inserts fail with `ResourceExhausted`
    pub max_entries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            slots: MAX_HASH_SLOT,
            key_length: KEY_LENGTH,
            key_policy: KeyPolicy::default(),
            max_entries: MAX_ENTRIES,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the slot count (minimum 1).
    #[must_use]
    pub fn slots(mut self, n: usize) -> Self {
        self.slots = n.max(1);
        self
    }

    /// Sets the key bound in bytes (minimum 1).
    #[must_use]
    pub fn key_length(mut self, n: usize) -> Self {
        self.key_length = n.max(1);
        self
    }

    #[must_use]
    pub fn key_policy(mut self, policy: KeyPolicy) -> Self {
        self.key_policy = policy;
        self
    }

    /// Caps the live entry count (clamped to [`MAX_ENTRIES`]).
    #[must_use]
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n.min(MAX_ENTRIES);
        self
    }

    // Fields are public, so a literal can bypass the setters.
    pub(crate) fn sanitized(mut self) -> Self {
        self.slots = self.slots.max(1);
        self.key_length = self.key_length.max(1);
        self.max_entries = self.max_entries.min(MAX_ENTRIES);
        self
    }
}
