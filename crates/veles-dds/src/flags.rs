//! Decode options, encode options and conversion flags.

use bitflags::bitflags;

bitflags! {
    /// Options controlling how a DDS file is decoded.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DecodeFlags: u32 {
        /// Rows of linear formats in the file are padded to 4 bytes.
        const LEGACY_DWORD = 0x1;
        /// Fail instead of expanding legacy formats without a DXGI equivalent.
        const NO_LEGACY_EXPANSION = 0x2;
        /// Toggle the red/blue swap applied to legacy 10:10:10:2 masks.
        const NO_R10B10G10A2_FIXUP = 0x4;
        /// Present BGRA/BGRX data as RGBA.
        const FORCE_RGB = 0x8;
        /// Promote 16 bpp formats (565, 5551, 4444) to RGBA8.
        const NO_16BPP = 0x10;
        /// Expand legacy luminance formats to RGBA.
        const EXPAND_LUMINANCE = 0x20;
        /// Always copy pixel data into storage owned by the texture.
        const COPY_MEMORY = 0x40;
        /// Lift the dimension and array size limits.
        const ALLOW_LARGE_FILES = 0x80;
    }
}

bitflags! {
    /// Options controlling how a texture is encoded.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EncodeFlags: u32 {
        /// Always write the DX10 extended header.
        const FORCE_DX10_EXT = 0x1;
        /// Never write the DX10 extended header; fail if it would be needed.
        const FORCE_DX9_LEGACY = 0x2;
    }
}

bitflags! {
    /// Conversions required to turn file pixels into canonical pixels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ConversionFlags: u32 {
        /// Source pixels are narrower than the canonical format.
        const EXPAND = 0x1;
        /// Force alpha to fully opaque.
        const NO_ALPHA = 0x2;
        /// Swap red and blue.
        const SWIZZLE = 0x4;
        /// Source is palette indexed.
        const PAL8 = 0x8;
        /// Source is 24 bpp B8G8R8.
        const F888 = 0x10;
        /// Source is 16 bpp 5:6:5.
        const F565 = 0x20;
        /// Source is 16 bpp 5:5:5:1.
        const F5551 = 0x40;
        /// Source is 16 bpp 4:4:4:4.
        const F4444 = 0x80;
        /// Source is 8 bpp A4L4.
        const F44 = 0x100;
        /// Source is 8 bpp R3G3B2.
        const F332 = 0x200;
        /// Source is 16 bpp A8R3G3B2.
        const F8332 = 0x400;
        /// Palette indices carry an 8-bit alpha (A8P8).
        const A8P8 = 0x800;
        /// Source is 8 bpp luminance.
        const L8 = 0x1000;
        /// Source is 16 bpp luminance.
        const L16 = 0x2000;
        /// Source is 16 bpp A8L8.
        const A8L8 = 0x4000;
        /// File uses the DX10 extended header.
        const DX10 = 0x10000;
        /// Color channels are premultiplied by alpha (DXT2/DXT4).
        const PREMULTIPLIED = 0x20000;
        /// Pixel data cannot be borrowed from the input buffer.
        const COPY_REQUIRED = 0x40000;

        /// Flags that change the bytes of a pixel.
        const CONVERTING = Self::EXPAND.bits() | Self::NO_ALPHA.bits() | Self::SWIZZLE.bits();
    }
}

impl ConversionFlags {
    /// Bits per pixel of the source data when it differs from the canonical
    /// format.
    pub fn source_bpp_override(self) -> Option<u32> {
        if !self.contains(Self::EXPAND) {
            return None;
        }
        LegacyKind::from_flags(self).map(|kind| kind.bytes_per_pixel() as u32 * 8)
    }
}

/// Narrow source encodings handled by expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyKind {
    /// 24 bpp, bytes stored B, G, R.
    R8G8B8,
    /// 8 bpp, 3:3:2.
    R3G3B2,
    /// 16 bpp, 8-bit alpha over 3:3:2.
    A8R3G3B2,
    /// 8 bpp palette index.
    P8,
    /// 16 bpp palette index with 8-bit alpha.
    A8P8,
    /// 8 bpp, 4-bit alpha over 4-bit luminance.
    A4L4,
    /// 16 bpp, 4:4:4:4.
    B4G4R4A4,
    /// 16 bpp, 5:6:5.
    B5G6R5,
    /// 16 bpp, 5:5:5:1.
    B5G5R5A1,
    /// 8 bpp luminance.
    L8,
    /// 16 bpp, 8-bit alpha over 8-bit luminance.
    A8L8,
    /// 16 bpp luminance.
    L16,
}

impl LegacyKind {
    /// Pick the source encoding named by a flag set.
    pub fn from_flags(flags: ConversionFlags) -> Option<Self> {
        use ConversionFlags as F;

        let kind = if flags.contains(F::PAL8) {
            if flags.contains(F::A8P8) {
                Self::A8P8
            } else {
                Self::P8
            }
        } else if flags.contains(F::F888) {
            Self::R8G8B8
        } else if flags.contains(F::F332) {
            Self::R3G3B2
        } else if flags.contains(F::F8332) {
            Self::A8R3G3B2
        } else if flags.contains(F::F44) {
            Self::A4L4
        } else if flags.contains(F::F4444) {
            Self::B4G4R4A4
        } else if flags.contains(F::F565) {
            Self::B5G6R5
        } else if flags.contains(F::F5551) {
            Self::B5G5R5A1
        } else if flags.contains(F::L8) {
            Self::L8
        } else if flags.contains(F::L16) {
            Self::L16
        } else if flags.contains(F::A8L8) {
            Self::A8L8
        } else {
            return None;
        };
        Some(kind)
    }

    /// Bytes per source pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::R8G8B8 => 3,
            Self::R3G3B2 | Self::P8 | Self::A4L4 | Self::L8 => 1,
            Self::A8R3G3B2
            | Self::A8P8
            | Self::B4G4R4A4
            | Self::B5G6R5
            | Self::B5G5R5A1
            | Self::A8L8
            | Self::L16 => 2,
        }
    }

    /// Whether expansion reads a palette.
    pub fn uses_palette(self) -> bool {
        matches!(self, Self::P8 | Self::A8P8)
    }
}

/// The single conversion a decode applies to every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConversionMode {
    /// Bytes are used as stored.
    #[default]
    None,
    /// Widen a legacy encoding to the canonical format.
    Expand { source: LegacyKind, set_alpha: bool },
    /// Reorder channels within the same width.
    Swizzle { set_alpha: bool },
    /// Copy and force alpha to opaque.
    CopyWithAlphaFix,
}

impl ConversionMode {
    /// Derive the mode from resolved flags.
    ///
    /// Precedence is expand, then swizzle, then alpha fix.
    pub fn from_flags(flags: ConversionFlags) -> Option<Self> {
        let set_alpha = flags.contains(ConversionFlags::NO_ALPHA);
        if flags.contains(ConversionFlags::EXPAND) {
            let source = LegacyKind::from_flags(flags)?;
            Some(Self::Expand { source, set_alpha })
        } else if flags.contains(ConversionFlags::SWIZZLE) {
            Some(Self::Swizzle { set_alpha })
        } else if set_alpha {
            Some(Self::CopyWithAlphaFix)
        } else {
            Some(Self::None)
        }
    }
}
