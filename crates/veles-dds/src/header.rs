//! DDS header structures.
//!
//! The on-disk layout is a 4-byte magic, the 124-byte [`DdsHeader`] (which
//! embeds the 32-byte [`DdsPixelFormat`]), and, when the pixel format carries
//! the `DX10` FourCC, the 20-byte [`DdsHeaderDxt10`].

use bitflags::bitflags;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// DDS file header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsHeader {
    /// Header size (should be 124).
    pub size: u32,
    /// Header flags, see [`HeaderFlags`].
    pub flags: u32,
    /// Image height.
    pub height: u32,
    /// Image width.
    pub width: u32,
    /// Pitch or linear size.
    pub pitch_or_linear_size: u32,
    /// Depth (for volume textures).
    pub depth: u32,
    /// Number of mipmap levels.
    pub mipmap_count: u32,
    /// Reserved.
    pub reserved1: [u32; 11],
    /// Pixel format.
    pub pixel_format: DdsPixelFormat,
    /// Surface capabilities, see [`Caps`].
    pub caps: u32,
    /// Surface capabilities 2, see [`Caps2`].
    pub caps2: u32,
    /// Surface capabilities 3.
    pub caps3: u32,
    /// Surface capabilities 4.
    pub caps4: u32,
    /// Reserved.
    pub reserved2: u32,
}

impl DdsHeader {
    /// Expected header size.
    pub const SIZE: u32 = 124;

    /// Check if this is a DX10 extended header.
    pub fn is_dx10(&self) -> bool {
        self.pixel_format.has_flags(PixelFormatFlags::FOURCC)
            && self.pixel_format.four_cc == FourCC::DX10
    }

    /// Typed view of the header flags.
    pub fn header_flags(&self) -> HeaderFlags {
        HeaderFlags::from_bits_retain(self.flags)
    }

    /// Typed view of the caps field.
    pub fn caps(&self) -> Caps {
        Caps::from_bits_retain(self.caps)
    }

    /// Typed view of the caps2 field.
    pub fn caps2(&self) -> Caps2 {
        Caps2::from_bits_retain(self.caps2)
    }

    /// A zeroed header with only the structure sizes filled in.
    pub fn empty() -> Self {
        Self {
            size: Self::SIZE,
            flags: 0,
            height: 0,
            width: 0,
            pitch_or_linear_size: 0,
            depth: 0,
            mipmap_count: 0,
            reserved1: [0; 11],
            pixel_format: DdsPixelFormat::empty(),
            caps: 0,
            caps2: 0,
            caps3: 0,
            caps4: 0,
            reserved2: 0,
        }
    }
}

/// DDS pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsPixelFormat {
    /// Structure size (should be 32).
    pub size: u32,
    /// Pixel format flags, see [`PixelFormatFlags`].
    pub flags: u32,
    /// Four-character code for compression.
    pub four_cc: FourCC,
    /// Number of bits per pixel (for uncompressed).
    pub rgb_bit_count: u32,
    /// Red bit mask.
    pub r_bit_mask: u32,
    /// Green bit mask.
    pub g_bit_mask: u32,
    /// Blue bit mask.
    pub b_bit_mask: u32,
    /// Alpha bit mask.
    pub a_bit_mask: u32,
}

impl DdsPixelFormat {
    /// Expected structure size.
    pub const SIZE: u32 = 32;

    /// A pixel format with no flags set.
    pub const fn empty() -> Self {
        Self {
            size: Self::SIZE,
            flags: 0,
            four_cc: FourCC([0; 4]),
            rgb_bit_count: 0,
            r_bit_mask: 0,
            g_bit_mask: 0,
            b_bit_mask: 0,
            a_bit_mask: 0,
        }
    }

    /// A FourCC pixel format.
    pub const fn four_cc(code: FourCC) -> Self {
        Self {
            flags: PixelFormatFlags::FOURCC.bits(),
            four_cc: code,
            ..Self::empty()
        }
    }

    /// A bitmask pixel format.
    pub const fn masked(flags: PixelFormatFlags, bit_count: u32, r: u32, g: u32, b: u32, a: u32) -> Self {
        Self {
            flags: flags.bits(),
            rgb_bit_count: bit_count,
            r_bit_mask: r,
            g_bit_mask: g,
            b_bit_mask: b,
            a_bit_mask: a,
            ..Self::empty()
        }
    }

    /// Typed view of the pixel format flags.
    pub fn pixel_flags(&self) -> PixelFormatFlags {
        PixelFormatFlags::from_bits_retain(self.flags)
    }

    /// Check whether all of `flags` are set.
    pub fn has_flags(&self, flags: PixelFormatFlags) -> bool {
        self.pixel_flags().contains(flags)
    }
}

/// Four-character code for compression type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(transparent)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// DXT1 compression.
    pub const DXT1: Self = Self(*b"DXT1");
    /// DXT2 compression (premultiplied alpha DXT3).
    pub const DXT2: Self = Self(*b"DXT2");
    /// DXT3 compression.
    pub const DXT3: Self = Self(*b"DXT3");
    /// DXT4 compression (premultiplied alpha DXT5).
    pub const DXT4: Self = Self(*b"DXT4");
    /// DXT5 compression.
    pub const DXT5: Self = Self(*b"DXT5");
    /// DX10 extended header.
    pub const DX10: Self = Self(*b"DX10");
    /// BC4U compression.
    pub const BC4U: Self = Self(*b"BC4U");
    /// BC4S compression.
    pub const BC4S: Self = Self(*b"BC4S");
    /// BC5U compression.
    pub const BC5U: Self = Self(*b"BC5U");
    /// BC5S compression.
    pub const BC5S: Self = Self(*b"BC5S");
    /// ATI1 (BC4 unsigned).
    pub const ATI1: Self = Self(*b"ATI1");
    /// ATI2 (BC5 unsigned).
    pub const ATI2: Self = Self(*b"ATI2");
    /// R8G8_B8G8 packed.
    pub const RGBG: Self = Self(*b"RGBG");
    /// G8R8_G8B8 packed.
    pub const GRGB: Self = Self(*b"GRGB");

    /// D3DFMT_A16B16G16R16.
    pub const A16B16G16R16: Self = Self::from_u32(36);
    /// D3DFMT_Q16W16V16U16.
    pub const Q16W16V16U16: Self = Self::from_u32(110);
    /// D3DFMT_R16F.
    pub const R16F: Self = Self::from_u32(111);
    /// D3DFMT_G16R16F.
    pub const G16R16F: Self = Self::from_u32(112);
    /// D3DFMT_A16B16G16R16F.
    pub const A16B16G16R16F: Self = Self::from_u32(113);
    /// D3DFMT_R32F.
    pub const R32F: Self = Self::from_u32(114);
    /// D3DFMT_G32R32F.
    pub const G32R32F: Self = Self::from_u32(115);
    /// D3DFMT_A32B32G32R32F.
    pub const A32B32G32R32F: Self = Self::from_u32(116);

    /// Build a FourCC from its little-endian numeric value.
    pub const fn from_u32(value: u32) -> Self {
        Self(value.to_le_bytes())
    }

    /// Numeric value of the code.
    pub const fn as_u32(self) -> u32 {
        u32::from_le_bytes(self.0)
    }
}

impl std::fmt::Display for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            write!(f, "{}", String::from_utf8_lossy(&self.0))
        } else {
            write!(f, "{}", self.as_u32())
        }
    }
}

/// DX10 extended header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsHeaderDxt10 {
    /// DXGI format.
    pub dxgi_format: u32,
    /// Resource dimension, see [`ResourceDimension`].
    pub resource_dimension: u32,
    /// Misc flags.
    pub misc_flag: u32,
    /// Array size.
    pub array_size: u32,
    /// Misc flags 2 (alpha mode in the low bits).
    pub misc_flags2: u32,
}

impl DdsHeaderDxt10 {
    /// Structure size in bytes.
    pub const SIZE: usize = 20;
    /// `misc_flag` bit marking a cube map.
    pub const MISC_TEXTURECUBE: u32 = 0x4;
    /// Mask of the alpha mode bits in `misc_flags2`.
    pub const MISC2_ALPHA_MODE_MASK: u32 = 0x7;
}

/// `resource_dimension` values of the extended header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ResourceDimension {
    Texture1D = 2,
    Texture2D = 3,
    Texture3D = 4,
}

impl ResourceDimension {
    /// Map a raw dimension value.
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            2 => Some(Self::Texture1D),
            3 => Some(Self::Texture2D),
            4 => Some(Self::Texture3D),
            _ => None,
        }
    }
}

bitflags! {
    /// `DdsHeader::flags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HeaderFlags: u32 {
        const CAPS = 0x1;
        const HEIGHT = 0x2;
        const WIDTH = 0x4;
        const PITCH = 0x8;
        const PIXELFORMAT = 0x1000;
        const MIPMAP_COUNT = 0x20000;
        const LINEAR_SIZE = 0x80000;
        const DEPTH = 0x800000;

        /// Flags every texture header carries.
        const TEXTURE = Self::CAPS.bits() | Self::HEIGHT.bits() | Self::WIDTH.bits() | Self::PIXELFORMAT.bits();
        /// Volume texture marker.
        const VOLUME = Self::DEPTH.bits();
    }
}

bitflags! {
    /// `DdsPixelFormat::flags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PixelFormatFlags: u32 {
        const ALPHA_PIXELS = 0x1;
        const ALPHA = 0x2;
        const FOURCC = 0x4;
        const PAL8 = 0x20;
        const RGB = 0x40;
        const LUMINANCE = 0x20000;
        const BUMP_DUDV = 0x80000;

        const RGBA = Self::RGB.bits() | Self::ALPHA_PIXELS.bits();
        const LUMINANCE_ALPHA = Self::LUMINANCE.bits() | Self::ALPHA_PIXELS.bits();
        const PAL8_ALPHA = Self::PAL8.bits() | Self::ALPHA_PIXELS.bits();

        /// Bits that decide which kind of pixel format an entry describes.
        const KIND = Self::ALPHA_PIXELS.bits()
            | Self::ALPHA.bits()
            | Self::FOURCC.bits()
            | Self::PAL8.bits()
            | Self::RGB.bits()
            | Self::LUMINANCE.bits()
            | Self::BUMP_DUDV.bits();
    }
}

bitflags! {
    /// `DdsHeader::caps`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Caps: u32 {
        const COMPLEX = 0x8;
        const TEXTURE = 0x1000;
        const MIPMAP = 0x400000;
    }
}

bitflags! {
    /// `DdsHeader::caps2`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Caps2: u32 {
        const CUBEMAP = 0x200;
        const CUBEMAP_POSITIVE_X = 0x400;
        const CUBEMAP_NEGATIVE_X = 0x800;
        const CUBEMAP_POSITIVE_Y = 0x1000;
        const CUBEMAP_NEGATIVE_Y = 0x2000;
        const CUBEMAP_POSITIVE_Z = 0x4000;
        const CUBEMAP_NEGATIVE_Z = 0x8000;
        const VOLUME = 0x200000;

        const CUBEMAP_ALL_FACES = Self::CUBEMAP_POSITIVE_X.bits()
            | Self::CUBEMAP_NEGATIVE_X.bits()
            | Self::CUBEMAP_POSITIVE_Y.bits()
            | Self::CUBEMAP_NEGATIVE_Y.bits()
            | Self::CUBEMAP_POSITIVE_Z.bits()
            | Self::CUBEMAP_NEGATIVE_Z.bits();
    }
}
