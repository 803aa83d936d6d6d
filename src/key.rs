//! Key bound enforcement.

use crate::error::KeyError;

/// What to do with a key longer than the configured bound.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Cut the key to the bound and carry on. Distinct long keys that share
    /// the kept prefix become the same key.
    #[default]
    Truncate,

    /// Refuse the key with [`KeyError::TooLong`].
    Reject,
}

/// Applies `policy` to `key`, returning the form that is hashed, compared and
/// stored.
///
/// Truncation keeps the longest prefix of at most `max` bytes that ends on a
/// char boundary.
pub(crate) fn normalize(key: &str, max: usize, policy: KeyPolicy) -> Result<&str, KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }
    if key.len() <= max {
        return Ok(key);
    }
    match policy {
        KeyPolicy::Reject => Err(KeyError::TooLong {
            len: key.len(),
            max,
        }),
        KeyPolicy::Truncate => {
            let mut end = max;
            while !key.is_char_boundary(end) {
                end -= 1;
            }
            // max >= 1, but a multibyte first char can still leave nothing
            if end == 0 {
                return Err(KeyError::Empty);
            }
            log::warn!("Truncating {}-byte key to {end} bytes", key.len());
            Ok(&key[..end])
        }
    }
}
