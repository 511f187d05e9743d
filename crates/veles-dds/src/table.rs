//! Legacy pixel format table.
//!
//! Maps Direct3D 9 era pixel formats (FourCC codes and channel masks) to
//! canonical formats, together with the conversion each one needs. Order
//! matters: lookups take the first matching entry.

use crate::header::{DdsPixelFormat, FourCC, PixelFormatFlags as P};
use crate::{ConversionFlags as C, DxgiFormat as F};

/// One row of the legacy format table.
#[derive(Debug, Clone, Copy)]
pub struct LegacyFormat {
    /// Direct3D 9 name of the encoding.
    pub name: &'static str,
    /// Canonical format the encoding resolves to.
    pub format: F,
    /// Conversion needed to reach `format`.
    pub flags: C,
    /// Pixel format as written in the file header.
    pub pixel_format: DdsPixelFormat,
}

impl LegacyFormat {
    const fn new(name: &'static str, format: F, flags: C, pixel_format: DdsPixelFormat) -> Self {
        Self {
            name,
            format,
            flags,
            pixel_format,
        }
    }

    /// Check whether a pixel format read from a file selects this entry.
    ///
    /// FourCC entries compare the code, palette entries the bit count, and
    /// everything else the format kind, the bit count and all four masks.
    pub fn matches(&self, pf: &DdsPixelFormat) -> bool {
        let file = pf.pixel_flags();
        let ours = self.pixel_format.pixel_flags();

        if ours.contains(P::FOURCC) {
            return file.contains(P::FOURCC) && pf.four_cc == self.pixel_format.four_cc;
        }
        if ours.contains(P::PAL8) {
            return file.contains(P::PAL8) && pf.rgb_bit_count == self.pixel_format.rgb_bit_count;
        }
        if file.intersects(P::FOURCC | P::PAL8) {
            return false;
        }

        let entry = self.pixel_format;
        (file & P::KIND) == (ours & P::KIND)
            && pf.rgb_bit_count == entry.rgb_bit_count
            && pf.r_bit_mask == entry.r_bit_mask
            && pf.g_bit_mask == entry.g_bit_mask
            && pf.b_bit_mask == entry.b_bit_mask
            && pf.a_bit_mask == entry.a_bit_mask
    }
}

const fn fourcc(code: FourCC) -> DdsPixelFormat {
    DdsPixelFormat::four_cc(code)
}

const fn masks(kind: P, bits: u32, r: u32, g: u32, b: u32, a: u32) -> DdsPixelFormat {
    DdsPixelFormat::masked(kind, bits, r, g, b, a)
}

const NONE: C = C::empty();

/// Every legacy encoding the decoder understands, in lookup order.
pub static LEGACY_FORMATS: &[LegacyFormat] = &[
    LegacyFormat::new("DXT1", F::BC1_UNORM, NONE, fourcc(FourCC::DXT1)),
    LegacyFormat::new("DXT3", F::BC2_UNORM, NONE, fourcc(FourCC::DXT3)),
    LegacyFormat::new("DXT5", F::BC3_UNORM, NONE, fourcc(FourCC::DXT5)),
    LegacyFormat::new("DXT2", F::BC2_UNORM, C::PREMULTIPLIED, fourcc(FourCC::DXT2)),
    LegacyFormat::new("DXT4", F::BC3_UNORM, C::PREMULTIPLIED, fourcc(FourCC::DXT4)),
    LegacyFormat::new("BC4U", F::BC4_UNORM, NONE, fourcc(FourCC::BC4U)),
    LegacyFormat::new("BC4S", F::BC4_SNORM, NONE, fourcc(FourCC::BC4S)),
    LegacyFormat::new("BC5U", F::BC5_UNORM, NONE, fourcc(FourCC::BC5U)),
    LegacyFormat::new("BC5S", F::BC5_SNORM, NONE, fourcc(FourCC::BC5S)),
    LegacyFormat::new("ATI1", F::BC4_UNORM, NONE, fourcc(FourCC::ATI1)),
    LegacyFormat::new("ATI2", F::BC5_UNORM, NONE, fourcc(FourCC::ATI2)),
    LegacyFormat::new("R8G8_B8G8", F::R8G8_B8G8_UNORM, NONE, fourcc(FourCC::RGBG)),
    LegacyFormat::new("G8R8_G8B8", F::G8R8_G8B8_UNORM, NONE, fourcc(FourCC::GRGB)),
    LegacyFormat::new(
        "A8R8G8B8",
        F::B8G8R8A8_UNORM,
        NONE,
        masks(P::RGBA, 32, 0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0xff00_0000),
    ),
    LegacyFormat::new(
        "X8R8G8B8",
        F::B8G8R8X8_UNORM,
        NONE,
        masks(P::RGB, 32, 0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0),
    ),
    LegacyFormat::new(
        "A8B8G8R8",
        F::R8G8B8A8_UNORM,
        NONE,
        masks(P::RGBA, 32, 0x0000_00ff, 0x0000_ff00, 0x00ff_0000, 0xff00_0000),
    ),
    LegacyFormat::new(
        "X8B8G8R8",
        F::R8G8B8A8_UNORM,
        C::NO_ALPHA,
        masks(P::RGB, 32, 0x0000_00ff, 0x0000_ff00, 0x00ff_0000, 0),
    ),
    LegacyFormat::new(
        "G16R16",
        F::R16G16_UNORM,
        NONE,
        masks(P::RGB, 32, 0x0000_ffff, 0xffff_0000, 0, 0),
    ),
    // Written by D3DX with red and blue masks reversed.
    LegacyFormat::new(
        "A2R10G10B10",
        F::R10G10B10A2_UNORM,
        C::SWIZZLE,
        masks(P::RGBA, 32, 0x0000_03ff, 0x000f_fc00, 0x3ff0_0000, 0xc000_0000),
    ),
    LegacyFormat::new(
        "A2B10G10R10",
        F::R10G10B10A2_UNORM,
        NONE,
        masks(P::RGBA, 32, 0x3ff0_0000, 0x000f_fc00, 0x0000_03ff, 0xc000_0000),
    ),
    LegacyFormat::new(
        "R8G8B8",
        F::R8G8B8A8_UNORM,
        C::EXPAND.union(C::NO_ALPHA).union(C::F888),
        masks(P::RGB, 24, 0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0),
    ),
    LegacyFormat::new(
        "R5G6B5",
        F::B5G6R5_UNORM,
        C::F565,
        masks(P::RGB, 16, 0xf800, 0x07e0, 0x001f, 0),
    ),
    LegacyFormat::new(
        "A1R5G5B5",
        F::B5G5R5A1_UNORM,
        C::F5551,
        masks(P::RGBA, 16, 0x7c00, 0x03e0, 0x001f, 0x8000),
    ),
    LegacyFormat::new(
        "X1R5G5B5",
        F::B5G5R5A1_UNORM,
        C::F5551.union(C::NO_ALPHA),
        masks(P::RGB, 16, 0x7c00, 0x03e0, 0x001f, 0),
    ),
    LegacyFormat::new(
        "A8R3G3B2",
        F::R8G8B8A8_UNORM,
        C::EXPAND.union(C::F8332),
        masks(P::RGBA, 16, 0x00e0, 0x001c, 0x0003, 0xff00),
    ),
    LegacyFormat::new(
        "R3G3B2",
        F::B5G6R5_UNORM,
        C::EXPAND.union(C::F332),
        masks(P::RGB, 8, 0xe0, 0x1c, 0x03, 0),
    ),
    LegacyFormat::new("L8", F::R8_UNORM, NONE, masks(P::LUMINANCE, 8, 0xff, 0, 0, 0)),
    LegacyFormat::new("L16", F::R16_UNORM, NONE, masks(P::LUMINANCE, 16, 0xffff, 0, 0, 0)),
    LegacyFormat::new(
        "A8L8",
        F::R8G8_UNORM,
        NONE,
        masks(P::LUMINANCE_ALPHA, 16, 0x00ff, 0, 0, 0xff00),
    ),
    // Some writers store A8L8 with an 8-bit count.
    LegacyFormat::new(
        "A8L8",
        F::R8G8_UNORM,
        NONE,
        masks(P::LUMINANCE_ALPHA, 8, 0x00ff, 0, 0, 0xff00),
    ),
    // NVTT 1.x writes luminance formats with the RGB flag.
    LegacyFormat::new("L8", F::R8_UNORM, NONE, masks(P::RGB, 8, 0xff, 0, 0, 0)),
    LegacyFormat::new("L16", F::R16_UNORM, NONE, masks(P::RGB, 16, 0xffff, 0, 0, 0)),
    LegacyFormat::new(
        "A8L8",
        F::R8G8_UNORM,
        NONE,
        masks(P::RGBA, 16, 0x00ff, 0, 0, 0xff00),
    ),
    LegacyFormat::new("A8", F::A8_UNORM, NONE, masks(P::ALPHA, 8, 0, 0, 0, 0xff)),
    LegacyFormat::new(
        "A16B16G16R16",
        F::R16G16B16A16_UNORM,
        NONE,
        fourcc(FourCC::A16B16G16R16),
    ),
    LegacyFormat::new(
        "Q16W16V16U16",
        F::R16G16B16A16_SNORM,
        NONE,
        fourcc(FourCC::Q16W16V16U16),
    ),
    LegacyFormat::new("R16F", F::R16_FLOAT, NONE, fourcc(FourCC::R16F)),
    LegacyFormat::new("G16R16F", F::R16G16_FLOAT, NONE, fourcc(FourCC::G16R16F)),
    LegacyFormat::new(
        "A16B16G16R16F",
        F::R16G16B16A16_FLOAT,
        NONE,
        fourcc(FourCC::A16B16G16R16F),
    ),
    LegacyFormat::new("R32F", F::R32_FLOAT, NONE, fourcc(FourCC::R32F)),
    LegacyFormat::new("G32R32F", F::R32G32_FLOAT, NONE, fourcc(FourCC::G32R32F)),
    LegacyFormat::new(
        "A32B32G32R32F",
        F::R32G32B32A32_FLOAT,
        NONE,
        fourcc(FourCC::A32B32G32R32F),
    ),
    // D3DX writes R32F with FourCC 114, some tools use a mask instead.
    LegacyFormat::new("R32F", F::R32_FLOAT, NONE, masks(P::RGB, 32, 0xffff_ffff, 0, 0, 0)),
    LegacyFormat::new(
        "A8P8",
        F::R8G8B8A8_UNORM,
        C::EXPAND.union(C::PAL8).union(C::A8P8),
        masks(P::PAL8_ALPHA, 16, 0, 0, 0, 0),
    ),
    LegacyFormat::new(
        "P8",
        F::R8G8B8A8_UNORM,
        C::EXPAND.union(C::PAL8),
        masks(P::PAL8, 8, 0, 0, 0, 0),
    ),
    LegacyFormat::new(
        "A4R4G4B4",
        F::B4G4R4A4_UNORM,
        C::F4444,
        masks(P::RGBA, 16, 0x0f00, 0x00f0, 0x000f, 0xf000),
    ),
    LegacyFormat::new(
        "X4R4G4B4",
        F::B4G4R4A4_UNORM,
        C::F4444.union(C::NO_ALPHA),
        masks(P::RGB, 16, 0x0f00, 0x00f0, 0x000f, 0),
    ),
    LegacyFormat::new(
        "A4L4",
        F::B4G4R4A4_UNORM,
        C::EXPAND.union(C::F44),
        masks(P::LUMINANCE_ALPHA, 8, 0x0f, 0, 0, 0xf0),
    ),
];

/// Find the first entry matching a pixel format read from a file.
pub fn find_legacy(pf: &DdsPixelFormat) -> Option<&'static LegacyFormat> {
    LEGACY_FORMATS.iter().find(|entry| entry.matches(pf))
}

/// Find the pixel format to write for a canonical format.
///
/// Only entries that decode without conversion qualify, so a file written
/// with the result decodes back to the same bytes.
pub fn legacy_pixel_format(format: F, premultiplied: bool) -> Option<DdsPixelFormat> {
    LEGACY_FORMATS
        .iter()
        .find(|entry| {
            entry.format == format
                && !entry.flags.intersects(C::CONVERTING)
                && entry.flags.contains(C::PREMULTIPLIED) == premultiplied
        })
        .map(|entry| entry.pixel_format)
}
