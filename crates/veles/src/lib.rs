//! Veles - texture container library.
//!
//! This crate provides a unified interface to the Veles crates and a
//! [`Registry`] that picks the right container codec for an input.
//!
//! # Crates
//!
//! - [`veles_common`] - Common utilities (binary reading)
//! - [`veles_dds`] - DDS decoding, layout computation and encoding
//!
//! # Example
//!
//! ```no_run
//! use veles::prelude::*;
//!
//! let registry = Registry::with_defaults();
//! let bytes = std::fs::read("texture.dds")?;
//!
//! let (kind, texture) = registry.load(&bytes, DecodeFlags::empty())?;
//! println!("{kind}: {} subresources", texture.subresources().len());
//!
//! let mut out = Vec::new();
//! registry.save(ContainerKind::DDS, &texture, &mut out)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod registry;

// Re-export all sub-crates
pub use veles_common as common;
pub use veles_dds as dds;

pub use error::{Error, Result};
pub use registry::{ContainerKind, DdsContainer, Loader, Registry, Saver};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{ContainerKind, DdsContainer, Loader, Registry, Saver};
    pub use veles_common::BinaryReader;
    pub use veles_dds::{
        decode, decode_owned, encode, read_metadata, reencode, DecodeFlags, DxgiFormat, EncodeFlags,
        TexDimension, TexMetadata, Texture,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
