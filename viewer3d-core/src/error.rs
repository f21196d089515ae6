//! Error types for scene and loader operations.

use thiserror::Error;

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors reported by [`crate::Scene`] and its registry.
///
/// None of these leave partial state behind: the failing call is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// A name is already registered and replacement was not requested.
    #[error("duplicate element name: {name}")]
    DuplicateName {
        /// The contested name.
        name: String,
    },

    /// No element is registered under the name.
    #[error("no element named {name}")]
    MissingElement {
        /// The name that was looked up.
        name: String,
    },

    /// The element exists but is not a mesh.
    #[error("element {name} is not a mesh")]
    NotAMesh {
        /// The name that was looked up.
        name: String,
    },
}

/// Errors that can occur while reading STL data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StlError {
    /// Not even a binary header and triangle count.
    #[error("file too small to be a valid STL ({len} bytes)")]
    TooSmall {
        /// Byte length of the input.
        len: usize,
    },

    /// The binary triangle count promises more data than is present.
    #[error("binary STL declares {declared} triangles but only {available} are present")]
    Truncated {
        /// Triangle count from the header.
        declared: usize,
        /// Complete triangle records in the payload.
        available: usize,
    },

    /// ASCII grammar mismatch.
    #[error("failed to parse ASCII STL: {reason}")]
    Ascii {
        /// Parser diagnostic.
        reason: String,
    },
}
