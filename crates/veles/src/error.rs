//! Error types for the container registry.

use thiserror::Error;

use crate::ContainerKind;

/// Errors that can occur when loading or saving through a [`crate::Registry`].
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// DDS codec error.
    #[error("{0}")]
    Dds(#[from] veles_dds::Error),

    /// No registered loader recognized the input.
    #[error("no registered loader recognizes the input")]
    NoLoader,

    /// No saver is registered for the requested container.
    #[error("no saver registered for {0}")]
    NoSaver(ContainerKind),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, Error>;
