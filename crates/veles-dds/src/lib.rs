//! DDS texture container codec.
//!
//! Decodes DirectDraw Surface files (legacy header plus the optional DX10
//! extended header) into textures described by a canonical DXGI format,
//! and encodes textures back.
//!
//! Historical pixel encodings are resolved through a fixed table and, when
//! they have no canonical equivalent, expanded scanline by scanline. Files
//! that need no conversion decode without copying: the texture borrows its
//! pixels from the input.
//!
//! # Example
//!
//! ```no_run
//! use veles_dds::{decode, DecodeFlags};
//!
//! let bytes = std::fs::read("texture.dds")?;
//! let texture = decode(&bytes, DecodeFlags::empty())?;
//!
//! let meta = texture.metadata();
//! println!("{}x{} {} ({} mips)", meta.width, meta.height, meta.format, meta.mip_levels);
//!
//! if let Some(top) = texture.image(0, 0, 0) {
//!     println!("top level: {} bytes, pitch {}", top.data.len(), top.info.row_pitch);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod codec;
mod convert;
mod decode;
mod encode;
mod error;
mod flags;
mod format;
pub mod header;
mod layout;
mod metadata;
mod resolve;
mod table;
mod texture;

#[cfg(test)]
mod test_util;

pub use codec::{decode, decode_owned, encode, encode_to, read_metadata, reencode};
pub use convert::ScanlineConverter;
pub use decode::{
    decode_header, DecodedHeader, Palette, MAX_ARRAY_SIZE, MAX_TEXTURE_DIMENSION, MAX_VOLUME_DIMENSION,
};
pub use encode::{encode_header, header_kind, HeaderKind};
pub use error::{Error, Result};
pub use flags::{ConversionFlags, ConversionMode, DecodeFlags, EncodeFlags, LegacyKind};
pub use format::{DxgiFormat, FormatClass};
pub use header::{DdsHeader, DdsHeaderDxt10, DdsPixelFormat, FourCC};
pub use layout::{compute_pitch, MipLevelLayout, Pitch, PitchMode, TextureLayout};
pub use metadata::{full_mip_chain, AlphaMode, TexDimension, TexMetadata};
pub use resolve::{resolve, ResolvedFormat, Unresolved};
pub use table::{find_legacy, legacy_pixel_format, LegacyFormat, LEGACY_FORMATS};
pub use texture::{Subresource, SubresourceView, Texture};

/// DDS file magic bytes ("DDS ").
pub const DDS_MAGIC: &[u8; 4] = b"DDS ";
