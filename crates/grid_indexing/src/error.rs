//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! inconsistent chunk layouts, out-of-range chunk addressing, empty chunks, unsupported
//! geometries, invalid configuration, and failures attributed to a single chunk or chunk pair.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("chunk has no cells")]
    EmptyChunk,

    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("chunk {chunk}: {error}")]
    Chunk {
        chunk: usize,
        #[source]
        error: Box<Error>,
    },

    #[error("chunk pair (target {target_chunk}, source {source_chunk}): {error}")]
    Pair {
        target_chunk: usize,
        source_chunk: usize,
        #[source]
        error: Box<Error>,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Attributes this error to a single chunk.
    pub fn in_chunk(self, chunk: usize) -> Self {
        Error::Chunk {
            chunk,
            error: Box::new(self),
        }
    }

    /// Attributes this error to a `(target, source)` chunk pair.
    pub fn in_pair(self, target_chunk: usize, source_chunk: usize) -> Self {
        Error::Pair {
            target_chunk,
            source_chunk,
            error: Box::new(self),
        }
    }

    /// Returns the innermost error, stripping chunk and pair context.
    pub fn root(&self) -> &Error {
        match self {
            Error::Chunk { error, .. } | Error::Pair { error, .. } => error.root(),
            other => other,
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_uses_other_variant() {
        let err: Error = String::from("boom").into();
        matches!(err, Error::Other(_))
            .then_some(())
            .expect("expected Other variant");
    }

    #[test]
    fn from_str_allocates_owned_message() {
        let err: Error = "issue".into();
        assert!(matches!(err, Error::Other(ref msg) if msg == "issue"));
    }

    #[test]
    fn pair_context_wraps_and_unwraps() {
        let err = Error::EmptyChunk.in_chunk(3).in_pair(1, 2);
        assert_eq!(
            err.to_string(),
            "chunk pair (target 1, source 2): chunk 3: chunk has no cells"
        );
        assert!(matches!(err.root(), Error::EmptyChunk));
    }
}
