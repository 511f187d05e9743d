//! Header encoding.

use zerocopy::IntoBytes;

use crate::header::{Caps, Caps2, DdsHeader, DdsHeaderDxt10, DdsPixelFormat, FourCC, HeaderFlags, ResourceDimension};
use crate::layout::{compute_pitch, PitchMode};
use crate::table::{find_legacy, legacy_pixel_format};
use crate::{ConversionFlags, EncodeFlags, Error, Result, TexDimension, TexMetadata, DDS_MAGIC};

/// Which header layout a file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeaderKind {
    /// Legacy header only.
    Legacy,
    /// Legacy header followed by the DX10 extended header.
    Dx10,
}

/// Pick the header layout for a texture.
///
/// `FORCE_DX10_EXT` takes precedence over `FORCE_DX9_LEGACY`.
pub fn header_kind(meta: &TexMetadata, options: EncodeFlags) -> Result<(HeaderKind, Option<DdsPixelFormat>)> {
    select_header(meta, options, None)
}

/// Like [`header_kind`], but a legacy header reuses `source` when it still
/// decodes to the same format without conversion.
pub(crate) fn select_header(
    meta: &TexMetadata,
    options: EncodeFlags,
    source: Option<DdsPixelFormat>,
) -> Result<(HeaderKind, Option<DdsPixelFormat>)> {
    let single_cube = meta.is_cubemap() && meta.array_size == 6;
    let needs_dx10 = (meta.array_size > 1 && !single_cube) || meta.dimension == TexDimension::Texture1D;

    if options.contains(EncodeFlags::FORCE_DX10_EXT) {
        return Ok((HeaderKind::Dx10, None));
    }

    let legacy = source
        .filter(|pf| decodes_unchanged(pf, meta))
        .or_else(|| legacy_pixel_format(meta.format, meta.is_premultiplied()))
        .or_else(|| legacy_pixel_format(meta.format, false));

    if options.contains(EncodeFlags::FORCE_DX9_LEGACY) {
        if meta.array_size > 1 && !single_cube {
            return Err(Error::UnsupportedPixelFormat(format!(
                "texture array of {} items needs the extended header",
                meta.array_size
            )));
        }
        let pf = legacy.ok_or_else(|| {
            Error::UnsupportedPixelFormat(format!("{} has no legacy pixel format", meta.format))
        })?;
        return Ok((HeaderKind::Legacy, Some(pf)));
    }

    match legacy {
        Some(pf) if !needs_dx10 => Ok((HeaderKind::Legacy, Some(pf))),
        _ => Ok((HeaderKind::Dx10, None)),
    }
}

fn decodes_unchanged(pf: &DdsPixelFormat, meta: &TexMetadata) -> bool {
    find_legacy(pf).is_some_and(|entry| {
        entry.format == meta.format
            && !entry.flags.intersects(ConversionFlags::CONVERTING)
            && entry.flags.contains(ConversionFlags::PREMULTIPLIED) == meta.is_premultiplied()
    })
}

/// Encode the magic and headers describing `meta`.
pub fn encode_header(meta: &TexMetadata, options: EncodeFlags) -> Result<Vec<u8>> {
    encode_header_as(meta, options, None)
}

/// Encode headers, preferring `source` as the legacy pixel format.
pub(crate) fn encode_header_as(
    meta: &TexMetadata,
    options: EncodeFlags,
    source: Option<DdsPixelFormat>,
) -> Result<Vec<u8>> {
    let (kind, legacy) = select_header(meta, options, source)?;

    let mut header = DdsHeader::empty();
    let mut flags = HeaderFlags::TEXTURE;
    let mut caps = Caps::TEXTURE;
    let mut caps2 = Caps2::empty();

    header.width = meta.width;
    header.height = meta.height;
    header.depth = 1;
    header.mipmap_count = meta.mip_levels.max(1);
    if meta.mip_levels > 1 {
        flags |= HeaderFlags::MIPMAP_COUNT;
        caps |= Caps::COMPLEX | Caps::MIPMAP;
    }

    match meta.dimension {
        TexDimension::Texture1D => header.height = 1,
        TexDimension::Texture2D => {}
        TexDimension::TextureCube => {
            if meta.array_size == 0 || meta.array_size % 6 != 0 {
                return Err(Error::InvalidGeometry(format!(
                    "cube map with {} faces",
                    meta.array_size
                )));
            }
            caps |= Caps::COMPLEX;
            caps2 |= Caps2::CUBEMAP | Caps2::CUBEMAP_ALL_FACES;
        }
        TexDimension::Texture3D => {
            flags |= HeaderFlags::VOLUME;
            caps |= Caps::COMPLEX;
            caps2 |= Caps2::VOLUME;
            header.depth = meta.depth;
        }
    }

    let pitch = compute_pitch(meta.format, meta.width, header.height, PitchMode::default())?;
    let (size_flag, size) = if meta.format.is_compressed() {
        (HeaderFlags::LINEAR_SIZE, pitch.slice_pitch)
    } else {
        (HeaderFlags::PITCH, pitch.row_pitch)
    };
    flags |= size_flag;
    header.pitch_or_linear_size = u32::try_from(size)
        .map_err(|_| Error::InvalidGeometry(format!("pitch {size} does not fit the header")))?;

    header.flags = flags.bits();
    header.caps = caps.bits();
    header.caps2 = caps2.bits();

    let mut out = Vec::with_capacity(4 + DdsHeader::SIZE as usize + DdsHeaderDxt10::SIZE);
    out.extend_from_slice(DDS_MAGIC);

    match (kind, legacy) {
        (HeaderKind::Legacy, Some(pf)) => {
            header.pixel_format = pf;
            out.extend_from_slice(header.as_bytes());
        }
        _ => {
            header.pixel_format = DdsPixelFormat::four_cc(FourCC::DX10);
            out.extend_from_slice(header.as_bytes());
            out.extend_from_slice(dx10_header(meta).as_bytes());
        }
    }

    Ok(out)
}

fn dx10_header(meta: &TexMetadata) -> DdsHeaderDxt10 {
    let (dimension, misc_flag, array_size) = match meta.dimension {
        TexDimension::Texture1D => (ResourceDimension::Texture1D, 0, meta.array_size),
        TexDimension::Texture2D => (ResourceDimension::Texture2D, 0, meta.array_size),
        TexDimension::TextureCube => (
            ResourceDimension::Texture2D,
            DdsHeaderDxt10::MISC_TEXTURECUBE,
            meta.array_size / 6,
        ),
        TexDimension::Texture3D => (ResourceDimension::Texture3D, 0, 1),
    };

    DdsHeaderDxt10 {
        dxgi_format: meta.format.0,
        resource_dimension: dimension as u32,
        misc_flag,
        array_size,
        misc_flags2: meta.alpha_mode as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AlphaMode, DxgiFormat};
    use veles_common::BinaryReader;

    fn parse(bytes: &[u8]) -> (DdsHeader, Option<DdsHeaderDxt10>) {
        let mut reader = BinaryReader::new(&bytes[4..]);
        let header: DdsHeader = reader.read_struct().unwrap();
        let ext = header.is_dx10().then(|| reader.read_struct().unwrap());
        assert!(reader.is_empty());
        (header, ext)
    }

    #[test]
    fn test_legacy_bc1() {
        let mut meta = TexMetadata::new_2d(16, 16, DxgiFormat::BC1_UNORM);
        meta.mip_levels = 5;
        let bytes = encode_header(&meta, EncodeFlags::empty()).unwrap();
        assert_eq!(&bytes[..4], DDS_MAGIC);
        let (header, ext) = parse(&bytes);

        assert!(ext.is_none());
        assert_eq!(header.pixel_format.four_cc, FourCC::DXT1);
        assert_eq!({ header.pitch_or_linear_size }, 128);
        assert_eq!({ header.mipmap_count }, 5);
        assert!(header.header_flags().contains(HeaderFlags::LINEAR_SIZE | HeaderFlags::MIPMAP_COUNT));
        assert!(header.caps().contains(Caps::MIPMAP | Caps::COMPLEX | Caps::TEXTURE));
    }

    #[test]
    fn test_linear_pitch() {
        let meta = TexMetadata::new_2d(5, 3, DxgiFormat::B8G8R8A8_UNORM);
        let (header, _) = parse(&encode_header(&meta, EncodeFlags::empty()).unwrap());
        assert_eq!({ header.pitch_or_linear_size }, 20);
        assert!(header.header_flags().contains(HeaderFlags::PITCH));
    }

    #[test]
    fn test_cube_stays_legacy() {
        let mut meta = TexMetadata::new_2d(8, 8, DxgiFormat::BC3_UNORM);
        meta.dimension = TexDimension::TextureCube;
        meta.array_size = 6;
        let (header, ext) = parse(&encode_header(&meta, EncodeFlags::empty()).unwrap());
        assert!(ext.is_none());
        assert!(header.caps2().contains(Caps2::CUBEMAP | Caps2::CUBEMAP_ALL_FACES));

        meta.array_size = 12;
        let (_, ext) = parse(&encode_header(&meta, EncodeFlags::empty()).unwrap());
        let ext = ext.unwrap();
        assert_eq!({ ext.array_size }, 2);
        assert_eq!({ ext.misc_flag }, DdsHeaderDxt10::MISC_TEXTURECUBE);
    }

    #[test]
    fn test_dx10_when_no_legacy_form() {
        let mut meta = TexMetadata::new_2d(4, 4, DxgiFormat::BC7_UNORM_SRGB);
        meta.alpha_mode = AlphaMode::Opaque;
        let (header, ext) = parse(&encode_header(&meta, EncodeFlags::empty()).unwrap());
        assert!(header.is_dx10());
        let ext = ext.unwrap();
        assert_eq!({ ext.dxgi_format }, DxgiFormat::BC7_UNORM_SRGB.0);
        assert_eq!({ ext.resource_dimension }, ResourceDimension::Texture2D as u32);
        assert_eq!({ ext.misc_flags2 }, AlphaMode::Opaque as u32);

        let err = encode_header(&meta, EncodeFlags::FORCE_DX9_LEGACY).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPixelFormat(_)));
    }

    #[test]
    fn test_force_flags() {
        let meta = TexMetadata::new_2d(4, 4, DxgiFormat::BC1_UNORM);
        let (header, _) = parse(&encode_header(&meta, EncodeFlags::FORCE_DX10_EXT).unwrap());
        assert!(header.is_dx10());

        let mut meta = TexMetadata::new_2d(4, 4, DxgiFormat::BC1_UNORM);
        meta.array_size = 3;
        let err = encode_header(&meta, EncodeFlags::FORCE_DX9_LEGACY).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPixelFormat(_)));
    }

    #[test]
    fn test_premultiplied_legacy() {
        let mut meta = TexMetadata::new_2d(4, 4, DxgiFormat::BC3_UNORM);
        meta.alpha_mode = AlphaMode::Premultiplied;
        let (header, _) = parse(&encode_header(&meta, EncodeFlags::empty()).unwrap());
        assert_eq!(header.pixel_format.four_cc, FourCC::DXT4);

        // No premultiplied legacy form: the plain one is used.
        let mut meta = TexMetadata::new_2d(4, 4, DxgiFormat::R8G8B8A8_UNORM);
        meta.alpha_mode = AlphaMode::Premultiplied;
        let (header, _) = parse(&encode_header(&meta, EncodeFlags::empty()).unwrap());
        assert!(!header.is_dx10());
    }

    #[test]
    fn test_volume() {
        let mut meta = TexMetadata::new_2d(4, 4, DxgiFormat::R8G8B8A8_UNORM);
        meta.dimension = TexDimension::Texture3D;
        meta.depth = 8;
        let (header, _) = parse(&encode_header(&meta, EncodeFlags::empty()).unwrap());
        assert_eq!({ header.depth }, 8);
        assert!(header.header_flags().contains(HeaderFlags::VOLUME));
        assert!(header.caps2().contains(Caps2::VOLUME));
    }

    #[test]
    fn test_one_dimensional_uses_dx10() {
        let mut meta = TexMetadata::new_2d(8, 1, DxgiFormat::R8G8B8A8_UNORM);
        meta.dimension = TexDimension::Texture1D;
        let (_, ext) = parse(&encode_header(&meta, EncodeFlags::empty()).unwrap());
        assert_eq!({ ext.unwrap().resource_dimension }, ResourceDimension::Texture1D as u32);
    }

    #[test]
    fn test_source_pixel_format_preferred() {
        let meta = TexMetadata::new_2d(4, 4, DxgiFormat::BC4_UNORM);
        let ati1 = DdsPixelFormat::four_cc(FourCC::ATI1);
        let (header, _) = parse(&encode_header_as(&meta, EncodeFlags::FORCE_DX9_LEGACY, Some(ati1)).unwrap());
        assert_eq!(header.pixel_format.four_cc, FourCC::ATI1);

        // Without a source the first table entry wins.
        let (header, _) = parse(&encode_header(&meta, EncodeFlags::empty()).unwrap());
        assert_eq!(header.pixel_format.four_cc, FourCC::BC4U);

        // The extended header ignores the source.
        let (header, ext) = parse(&encode_header_as(&meta, EncodeFlags::FORCE_DX10_EXT, Some(ati1)).unwrap());
        assert!(header.is_dx10());
        assert_eq!({ ext.unwrap().dxgi_format }, DxgiFormat::BC4_UNORM.0);
    }

    #[test]
    fn test_source_pixel_format_must_match() {
        // A source that resolves to another format is ignored.
        let meta = TexMetadata::new_2d(4, 4, DxgiFormat::BC3_UNORM);
        let dxt1 = DdsPixelFormat::four_cc(FourCC::DXT1);
        let (header, _) = parse(&encode_header_as(&meta, EncodeFlags::empty(), Some(dxt1)).unwrap());
        assert_eq!(header.pixel_format.four_cc, FourCC::DXT5);

        // So is one that disagrees on premultiplied alpha.
        let meta = TexMetadata::new_2d(4, 4, DxgiFormat::BC2_UNORM);
        let dxt2 = DdsPixelFormat::four_cc(FourCC::DXT2);
        let (header, _) = parse(&encode_header_as(&meta, EncodeFlags::empty(), Some(dxt2)).unwrap());
        assert_eq!(header.pixel_format.four_cc, FourCC::DXT3);

        // And one that only decodes through an expansion.
        let meta = TexMetadata::new_2d(4, 4, DxgiFormat::B5G6R5_UNORM);
        let r3g3b2 = DdsPixelFormat::masked(crate::header::PixelFormatFlags::RGB, 8, 0xe0, 0x1c, 0x03, 0);
        let (header, _) = parse(&encode_header_as(&meta, EncodeFlags::empty(), Some(r3g3b2)).unwrap());
        assert_eq!({ header.pixel_format.rgb_bit_count }, 16);
    }
}
