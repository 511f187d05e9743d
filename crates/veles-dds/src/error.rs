//! Error types for DDS handling.

use thiserror::Error;

use crate::{ConversionMode, DxgiFormat};

/// Errors that can occur when working with DDS files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] veles_common::Error),

    /// Input is too short or does not start with the DDS magic.
    ///
    /// This is the "not my format" signal: callers holding several loaders
    /// should try the next one.
    #[error("not a DDS container")]
    NotAContainer,

    /// Declared structure sizes do not match the fixed header layout.
    #[error("corrupt DDS header: {0}")]
    CorruptHeader(String),

    /// Dimension, flag or extent combination is not allowed.
    #[error("invalid texture geometry: {0}")]
    InvalidGeometry(String),

    /// Cube map that does not declare all six faces.
    #[error("incomplete cube map: face flags {faces:#06x}, all six faces are required")]
    IncompleteCubemap { faces: u32 },

    /// No canonical format for the stored pixel format.
    #[error("unsupported pixel format: {0}")]
    UnsupportedPixelFormat(String),

    /// Input ends before all pixel data was read.
    #[error("unexpected end of buffer: need {needed} bytes, got {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// Conversion mode cannot produce the requested format.
    #[error("cannot apply {mode:?} to {format}")]
    UnsupportedConversion { mode: ConversionMode, format: DxgiFormat },
}

impl Error {
    /// Whether the input simply is not a DDS file.
    pub fn is_not_container(&self) -> bool {
        matches!(self, Error::NotAContainer)
    }
}

/// Result type for DDS operations.
pub type Result<T> = std::result::Result<T, Error>;
