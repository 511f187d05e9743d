//! Header decoding and validation.

use veles_common::BinaryReader;

use crate::header::{Caps2, DdsHeader, DdsHeaderDxt10, DdsPixelFormat, HeaderFlags, ResourceDimension};
use crate::resolve::{describe, resolve};
use crate::{
    AlphaMode, ConversionFlags, ConversionMode, DecodeFlags, DxgiFormat, Error, FormatClass, Result,
    TexDimension, TexMetadata, DDS_MAGIC,
};

/// Largest 1D/2D/cube extent accepted without `ALLOW_LARGE_FILES`.
pub const MAX_TEXTURE_DIMENSION: u32 = 16384;
/// Largest array size accepted without `ALLOW_LARGE_FILES`.
pub const MAX_ARRAY_SIZE: u32 = 2048;
/// Largest volume extent accepted without `ALLOW_LARGE_FILES`.
pub const MAX_VOLUME_DIMENSION: u32 = 2048;

/// Entries of a palette, stored as R8G8B8A8 words.
pub type Palette = [u32; 256];

const LEGACY_HEADER_END: usize = DDS_MAGIC.len() + DdsHeader::SIZE as usize;
const DX10_HEADER_END: usize = LEGACY_HEADER_END + DdsHeaderDxt10::SIZE;
const PALETTE_SIZE: usize = 256 * 4;

/// Everything learned from the headers of a DDS file.
#[derive(Debug, Clone)]
pub struct DecodedHeader {
    /// Description of the texture as it will be presented.
    pub metadata: TexMetadata,
    /// Conversion flags after all fixups.
    pub flags: ConversionFlags,
    /// Conversion applied to every row.
    pub mode: ConversionMode,
    /// Pixel format exactly as stored.
    pub pixel_format: DdsPixelFormat,
    /// Byte offset of the first subresource.
    pub payload_offset: usize,
    /// Palette for palette-indexed files.
    pub palette: Option<Box<Palette>>,
}

impl DecodedHeader {
    /// Whether the file used the extended header.
    #[inline]
    pub fn is_dx10(&self) -> bool {
        self.flags.contains(ConversionFlags::DX10)
    }

    /// Whether pixel data must be copied out of the input.
    #[inline]
    pub fn copy_required(&self) -> bool {
        self.flags.contains(ConversionFlags::COPY_REQUIRED)
    }
}

/// Parse and validate the headers at the start of `data`.
///
/// Returns [`Error::NotAContainer`] for inputs that are too short or lack
/// the `"DDS "` magic.
pub fn decode_header(data: &[u8], options: DecodeFlags) -> Result<DecodedHeader> {
    let mut reader = BinaryReader::new(data);
    if data.len() < LEGACY_HEADER_END || !reader.check_magic(DDS_MAGIC) {
        return Err(Error::NotAContainer);
    }
    reader.advance(DDS_MAGIC.len());

    let header: DdsHeader = reader.read_struct()?;
    let pixel_format = header.pixel_format;
    let (header_size, pf_size) = (header.size, pixel_format.size);
    if header_size != DdsHeader::SIZE || pf_size != DdsPixelFormat::SIZE {
        return Err(Error::CorruptHeader(format!(
            "structure sizes {header_size}/{pf_size}, expected {}/{}",
            DdsHeader::SIZE,
            DdsPixelFormat::SIZE
        )));
    }

    let mut decoded = if header.is_dx10() {
        if data.len() < DX10_HEADER_END {
            return Err(Error::CorruptHeader("truncated extended header".into()));
        }
        let ext: DdsHeaderDxt10 = reader.read_struct()?;
        decode_dx10(&header, &ext)?
    } else {
        decode_legacy(&header, options, &mut reader)?
    };

    decoded.metadata.mip_levels = header.mipmap_count.max(1);
    check_geometry(&decoded.metadata, options)?;
    apply_fixups(&mut decoded.metadata, &mut decoded.flags, options);

    decoded.mode = ConversionMode::from_flags(decoded.flags).ok_or_else(|| {
        Error::UnsupportedPixelFormat(format!("no expansion source for {}", decoded.metadata.format))
    })?;
    decoded.payload_offset = reader.position();

    log::debug!(
        "DDS {}x{}x{} {:?} {} ({} mips, {} items), flags {:?}",
        decoded.metadata.width,
        decoded.metadata.height,
        decoded.metadata.depth,
        decoded.metadata.dimension,
        decoded.metadata.format,
        decoded.metadata.mip_levels,
        decoded.metadata.array_size,
        decoded.flags
    );

    Ok(decoded)
}

fn decode_dx10(header: &DdsHeader, ext: &DdsHeaderDxt10) -> Result<DecodedHeader> {
    let (raw_format, raw_dimension, misc, array_size, misc2) = (
        ext.dxgi_format,
        ext.resource_dimension,
        ext.misc_flag,
        ext.array_size,
        ext.misc_flags2,
    );
    if array_size == 0 {
        return Err(Error::InvalidGeometry("array size is zero".into()));
    }

    let format = DxgiFormat(raw_format);
    if !format.is_valid() {
        return Err(Error::UnsupportedPixelFormat(format!("unknown {format}")));
    }
    if format.is_palettized() || format.class() == FormatClass::Planar {
        return Err(Error::UnsupportedPixelFormat(format!("{format} is not supported")));
    }

    let (width, height, depth) = (header.width, header.height, header.depth);
    let header_flags = header.header_flags();
    let mut meta = TexMetadata {
        width,
        height,
        depth: 1,
        array_size,
        mip_levels: 1,
        dimension: TexDimension::Texture2D,
        format,
        alpha_mode: AlphaMode::from_raw(misc2 & DdsHeaderDxt10::MISC2_ALPHA_MODE_MASK).unwrap_or_default(),
    };

    match ResourceDimension::from_raw(raw_dimension) {
        Some(ResourceDimension::Texture1D) => {
            if header_flags.contains(HeaderFlags::HEIGHT) && height != 1 {
                return Err(Error::InvalidGeometry(format!("1D texture with height {height}")));
            }
            meta.height = 1;
            meta.dimension = TexDimension::Texture1D;
        }
        Some(ResourceDimension::Texture2D) => {
            if misc & DdsHeaderDxt10::MISC_TEXTURECUBE != 0 {
                meta.array_size = array_size
                    .checked_mul(6)
                    .ok_or_else(|| Error::InvalidGeometry(format!("{array_size} cubes")))?;
                meta.dimension = TexDimension::TextureCube;
            }
        }
        Some(ResourceDimension::Texture3D) => {
            if !header_flags.contains(HeaderFlags::VOLUME) {
                return Err(Error::InvalidGeometry("3D texture without the depth flag".into()));
            }
            if array_size != 1 {
                return Err(Error::InvalidGeometry(format!("3D texture with array size {array_size}")));
            }
            meta.depth = depth;
            meta.dimension = TexDimension::Texture3D;
        }
        None => {
            return Err(Error::InvalidGeometry(format!("resource dimension {raw_dimension}")));
        }
    }

    Ok(DecodedHeader {
        metadata: meta,
        flags: ConversionFlags::DX10,
        mode: ConversionMode::None,
        pixel_format: header.pixel_format,
        payload_offset: DX10_HEADER_END,
        palette: None,
    })
}

fn decode_legacy(
    header: &DdsHeader,
    options: DecodeFlags,
    reader: &mut BinaryReader<'_>,
) -> Result<DecodedHeader> {
    let (width, height, depth) = (header.width, header.height, header.depth);
    let caps2 = header.caps2();

    let (dimension, depth, array_size) = if header.header_flags().contains(HeaderFlags::VOLUME) {
        (TexDimension::Texture3D, depth, 1)
    } else if caps2.contains(Caps2::CUBEMAP) {
        if !caps2.contains(Caps2::CUBEMAP_ALL_FACES) {
            return Err(Error::IncompleteCubemap {
                faces: (caps2 & Caps2::CUBEMAP_ALL_FACES).bits(),
            });
        }
        (TexDimension::TextureCube, 1, 6)
    } else {
        (TexDimension::Texture2D, 1, 1)
    };

    let pixel_format = header.pixel_format;
    let resolved = resolve(&pixel_format, options)
        .map_err(|reason| Error::UnsupportedPixelFormat(format!("{}: {reason}", describe(&pixel_format))))?;
    log::debug!(
        "legacy pixel format {} resolved to {} with {:?}",
        resolved.entry.name,
        resolved.format,
        resolved.flags
    );

    let alpha_mode = if resolved.flags.contains(ConversionFlags::PREMULTIPLIED) {
        AlphaMode::Premultiplied
    } else {
        AlphaMode::Unknown
    };

    let palette = if resolved.flags.contains(ConversionFlags::PAL8) {
        if reader.remaining() < PALETTE_SIZE {
            return Err(Error::BufferTooSmall {
                needed: reader.position() + PALETTE_SIZE,
                available: reader.len(),
            });
        }
        Some(Box::new(reader.read_u32_array::<256>()?))
    } else {
        None
    };

    Ok(DecodedHeader {
        metadata: TexMetadata {
            width,
            height,
            depth,
            array_size,
            mip_levels: 1,
            dimension,
            format: resolved.format,
            alpha_mode,
        },
        flags: resolved.flags,
        mode: ConversionMode::None,
        pixel_format,
        payload_offset: LEGACY_HEADER_END,
        palette,
    })
}

fn check_geometry(meta: &TexMetadata, options: DecodeFlags) -> Result<()> {
    let volume = meta.is_volume();
    if meta.width == 0 || meta.height == 0 || (volume && meta.depth == 0) {
        return Err(Error::InvalidGeometry(format!(
            "zero extent {}x{}x{}",
            meta.width, meta.height, meta.depth
        )));
    }

    if !options.contains(DecodeFlags::ALLOW_LARGE_FILES) {
        let too_large = if volume {
            meta.width > MAX_VOLUME_DIMENSION
                || meta.height > MAX_VOLUME_DIMENSION
                || meta.depth > MAX_VOLUME_DIMENSION
        } else {
            meta.width > MAX_TEXTURE_DIMENSION
                || meta.height > MAX_TEXTURE_DIMENSION
                || meta.array_size > MAX_ARRAY_SIZE
        };
        if too_large {
            return Err(Error::InvalidGeometry(format!(
                "{}x{}x{} with {} items exceeds the size limits",
                meta.width, meta.height, meta.depth, meta.array_size
            )));
        }
    }

    let chain = meta.full_mip_chain();
    if meta.mip_levels > chain {
        return Err(Error::InvalidGeometry(format!(
            "{} mip levels, at most {chain} fit {}x{}",
            meta.mip_levels, meta.width, meta.height
        )));
    }
    Ok(())
}

fn apply_fixups(meta: &mut TexMetadata, flags: &mut ConversionFlags, options: DecodeFlags) {
    type C = ConversionFlags;
    type F = DxgiFormat;

    if options.contains(DecodeFlags::FORCE_RGB) {
        let swapped = match meta.format {
            F::B8G8R8A8_UNORM => Some((F::R8G8B8A8_UNORM, C::SWIZZLE)),
            F::B8G8R8A8_UNORM_SRGB => Some((F::R8G8B8A8_UNORM_SRGB, C::SWIZZLE)),
            F::B8G8R8A8_TYPELESS => Some((F::R8G8B8A8_TYPELESS, C::SWIZZLE)),
            F::B8G8R8X8_UNORM => Some((F::R8G8B8A8_UNORM, C::SWIZZLE | C::NO_ALPHA)),
            F::B8G8R8X8_UNORM_SRGB => Some((F::R8G8B8A8_UNORM_SRGB, C::SWIZZLE | C::NO_ALPHA)),
            F::B8G8R8X8_TYPELESS => Some((F::R8G8B8A8_TYPELESS, C::SWIZZLE | C::NO_ALPHA)),
            _ => None,
        };
        if let Some((format, extra)) = swapped {
            meta.format = format;
            *flags |= extra;
        }
    }

    if options.contains(DecodeFlags::NO_16BPP) {
        let source = match meta.format {
            F::B5G6R5_UNORM => Some((C::F565, C::NO_ALPHA)),
            F::B5G5R5A1_UNORM => Some((C::F5551, C::empty())),
            F::B4G4R4A4_UNORM => Some((C::F4444, C::empty())),
            _ => None,
        };
        if let Some((source, extra)) = source {
            meta.format = F::R8G8B8A8_UNORM;
            // Expanding entries (R3G3B2, A4L4) already name their narrower source.
            if !flags.contains(C::EXPAND) {
                *flags |= source;
            }
            *flags |= C::EXPAND | extra;
        }
    }

    if options.contains(DecodeFlags::EXPAND_LUMINANCE) && !flags.contains(C::DX10) {
        let expanded = match meta.format {
            F::R8_UNORM => Some((F::R8G8B8A8_UNORM, C::L8)),
            F::R8G8_UNORM => Some((F::R8G8B8A8_UNORM, C::A8L8)),
            F::R16_UNORM => Some((F::R16G16B16A16_UNORM, C::L16)),
            _ => None,
        };
        if let Some((format, source)) = expanded {
            meta.format = format;
            *flags |= C::EXPAND | source;
        }
    }

    let dword_rows = options.contains(DecodeFlags::LEGACY_DWORD) && meta.format.class() == FormatClass::Linear;
    if flags.intersects(C::CONVERTING) || dword_rows || options.contains(DecodeFlags::COPY_MEMORY) {
        *flags |= C::COPY_REQUIRED;
    }
}
