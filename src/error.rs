/// Why a key was refused before any structural change took place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyError {
    /// Keys must contain at least one byte
    Empty,

    /// Key is longer than the configured bound and the policy is `Reject`
    TooLong {
        /// Byte length of the offending key
        len: usize,

        /// Configured bound in bytes
        max: usize,
    },
}

impl std::fmt::Display for KeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "key is empty"),
            Self::TooLong { len, max } => write!(f, "key is {len} bytes, limit is {max}"),
        }
    }
}

/// Represents errors that can occur in a dictionary
#[derive(Debug)]
pub enum Error {
    /// Key rejected, nothing was modified
    InvalidKey(KeyError),

    /// No room for a new entry; the dictionary is unchanged
    ResourceExhausted,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(e) => write!(f, "DictionaryError: invalid key: {e}"),
            Self::ResourceExhausted => write!(f, "DictionaryError: entry allocation failed"),
        }
    }
}

impl std::error::Error for Error {}

impl From<KeyError> for Error {
    fn from(value: KeyError) -> Self {
        Self::InvalidKey(value)
    }
}

/// Dictionary result
pub type Result<T> = std::result::Result<T, Error>;
