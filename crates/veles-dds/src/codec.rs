//! Decode and encode entry points.

use std::borrow::Cow;
use std::io::Write;

use crate::convert::ScanlineConverter;
use crate::decode::{decode_header, DecodedHeader};
use crate::encode::encode_header_as;
use crate::layout::{PitchMode, TextureLayout};
use crate::{ConversionMode, DecodeFlags, EncodeFlags, Error, HeaderKind, Result, TexMetadata, Texture};

/// Read only the texture description.
pub fn read_metadata(data: &[u8], options: DecodeFlags) -> Result<TexMetadata> {
    decode_header(data, options).map(|decoded| decoded.metadata)
}

/// Decode a DDS file.
///
/// When no conversion is needed the texture borrows its pixels from `data`.
/// Legacy files decoded without conversion keep their stored pixel format,
/// which [`encode`] writes back.
pub fn decode(data: &[u8], options: DecodeFlags) -> Result<Texture<'_>> {
    let header = decode_header(data, options)?;
    let kind = if header.is_dx10() {
        HeaderKind::Dx10
    } else {
        HeaderKind::Legacy
    };
    let source = (kind == HeaderKind::Legacy && header.mode == ConversionMode::None)
        .then_some(header.pixel_format);

    let layout = TextureLayout::new(&header.metadata, PitchMode::default())?;
    let payload = &data[header.payload_offset..];

    if !header.copy_required() {
        let total = layout.total_size();
        if payload.len() < total {
            return Err(Error::BufferTooSmall {
                needed: header.payload_offset + total,
                available: data.len(),
            });
        }
        return Texture::from_cow(header.metadata, Cow::Borrowed(&payload[..total]), Some(kind))
            .map(|texture| texture.with_source_pixel_format(source));
    }

    let pixels = convert_payload(&header, &layout, payload, options)?;
    Texture::from_cow(header.metadata, Cow::Owned(pixels), Some(kind))
        .map(|texture| texture.with_source_pixel_format(source))
}

/// Decode a DDS file into a texture that owns its pixels.
pub fn decode_owned(data: &[u8], options: DecodeFlags) -> Result<Texture<'static>> {
    decode(data, options).map(Texture::into_owned)
}

fn convert_payload(
    header: &DecodedHeader,
    dst_layout: &TextureLayout,
    payload: &[u8],
    options: DecodeFlags,
) -> Result<Vec<u8>> {
    let src_layout = TextureLayout::new(&header.metadata, PitchMode::source(header.flags, options))?;
    if payload.len() < src_layout.total_size() {
        return Err(Error::BufferTooSmall {
            needed: header.payload_offset + src_layout.total_size(),
            available: header.payload_offset + payload.len(),
        });
    }

    let converter = ScanlineConverter::new(header.mode, header.metadata.format, header.palette.as_deref())?;
    let mut pixels = vec![0u8; dst_layout.total_size()];

    for ((mip, _, _, src_offset), (_, _, _, dst_offset)) in
        src_layout.subresources().zip(dst_layout.subresources())
    {
        let src_level = &src_layout.levels()[mip];
        let dst_level = &dst_layout.levels()[mip];
        let src = &payload[src_offset..src_offset + src_level.slice_pitch];
        let dst = &mut pixels[dst_offset..dst_offset + dst_level.slice_pitch];

        if converter.is_copy() && src_level.row_pitch == dst_level.row_pitch {
            let n = src.len().min(dst.len());
            dst[..n].copy_from_slice(&src[..n]);
            continue;
        }

        for (dst_row, src_row) in dst
            .chunks_mut(dst_level.row_pitch)
            .zip(src.chunks(src_level.row_pitch))
        {
            converter.convert(dst_row, src_row);
        }
    }

    Ok(pixels)
}

/// Encode a texture as a DDS file.
pub fn encode(texture: &Texture<'_>, options: EncodeFlags) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(148 + texture.pixels().len());
    encode_to(texture, options, &mut out)?;
    Ok(out)
}

/// Encode a texture into a writer.
pub fn encode_to<W: Write>(texture: &Texture<'_>, options: EncodeFlags, mut writer: W) -> Result<()> {
    let header = encode_header_as(texture.metadata(), options, texture.source_pixel_format())?;
    writer.write_all(&header)?;
    writer.write_all(texture.pixels())?;
    Ok(())
}

/// Encode a texture with the header kind it was decoded from.
pub fn reencode(texture: &Texture<'_>) -> Result<Vec<u8>> {
    let options = match texture.header_kind() {
        Some(HeaderKind::Dx10) => EncodeFlags::FORCE_DX10_EXT,
        Some(HeaderKind::Legacy) => EncodeFlags::FORCE_DX9_LEGACY,
        None => EncodeFlags::empty(),
    };
    encode(texture, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{Caps2, DdsPixelFormat, FourCC, HeaderFlags, PixelFormatFlags};
    use crate::test_util::{build, dx10, dx10_header, header, make_cube, pattern};
    use crate::{DxgiFormat, TexDimension};

    /// Pixel format bytes inside a file image.
    const PIXEL_FORMAT: std::ops::Range<usize> = 76..108;

    fn assert_reencode_keeps_pixel_format(pf: DdsPixelFormat, payload_len: usize) {
        let bytes = build(&header(4, 4, pf), None, &pattern(payload_len));
        let texture = decode(&bytes, DecodeFlags::empty()).unwrap();
        assert_eq!(texture.source_pixel_format(), Some(pf));

        let encoded = reencode(&texture).unwrap();
        assert_eq!(&encoded[PIXEL_FORMAT], &bytes[PIXEL_FORMAT]);
        assert_eq!(&encoded[128..], &bytes[128..]);
    }

    #[test]
    fn test_zero_copy_decode() {
        let payload = pattern(64);
        let bytes = build(&header(8, 8, DdsPixelFormat::four_cc(FourCC::DXT5)), None, &payload);
        let texture = decode(&bytes, DecodeFlags::empty()).unwrap();

        assert!(texture.is_borrowed());
        assert_eq!(texture.pixels(), &payload[..]);
        assert_eq!(texture.header_kind(), Some(HeaderKind::Legacy));

        let owned = decode_owned(&bytes, DecodeFlags::empty()).unwrap();
        assert!(!owned.is_borrowed());
        assert_eq!(owned.source_pixel_format(), texture.source_pixel_format());
    }

    #[test]
    fn test_truncated_payload() {
        let bytes = build(&header(8, 8, DdsPixelFormat::four_cc(FourCC::DXT5)), None, &[0; 63]);
        let err = decode(&bytes, DecodeFlags::empty()).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { needed: 192, available: 191 }));
    }

    #[test]
    fn test_copy_memory_owns_pixels() {
        let payload = pattern(16);
        let bytes = build(&header(4, 4, DdsPixelFormat::four_cc(FourCC::DXT1)), None, &payload[..8]);
        let texture = decode(&bytes, DecodeFlags::COPY_MEMORY).unwrap();
        assert!(!texture.is_borrowed());
        assert_eq!(texture.pixels(), &payload[..8]);
    }

    #[test]
    fn test_expand_bgr24() {
        let pf = DdsPixelFormat::masked(PixelFormatFlags::RGB, 24, 0xff0000, 0xff00, 0xff, 0);
        let bytes = build(&header(2, 1, pf), None, &[1, 2, 3, 4, 5, 6]);
        let texture = decode(&bytes, DecodeFlags::empty()).unwrap();

        assert_eq!(texture.metadata().format, DxgiFormat::R8G8B8A8_UNORM);
        assert_eq!(texture.pixels(), &[3, 2, 1, 0xff, 6, 5, 4, 0xff]);
    }

    #[test]
    fn test_legacy_dword_rows() {
        let pf = DdsPixelFormat::masked(PixelFormatFlags::LUMINANCE, 8, 0xff, 0, 0, 0);
        // 3x2 image, rows padded to 4 bytes.
        let bytes = build(&header(3, 2, pf), None, &[1, 2, 3, 0, 4, 5, 6, 0]);

        let texture = decode(&bytes, DecodeFlags::LEGACY_DWORD).unwrap();
        assert_eq!(texture.pixels(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_palette_decode() {
        let pf = DdsPixelFormat::masked(PixelFormatFlags::PAL8, 8, 0, 0, 0, 0);
        let mut payload = vec![0u8; 1024];
        payload[4..8].copy_from_slice(&[10, 20, 30, 40]);
        payload.extend_from_slice(&[1, 0]);
        let bytes = build(&header(2, 1, pf), None, &payload);

        let texture = decode(&bytes, DecodeFlags::empty()).unwrap();
        assert_eq!(texture.pixels(), &[10, 20, 30, 40, 0, 0, 0, 0]);
    }

    #[test]
    fn test_force_rgb_swizzles() {
        let pf = DdsPixelFormat::masked(PixelFormatFlags::RGBA, 32, 0xff0000, 0xff00, 0xff, 0xff000000);
        let bytes = build(&header(1, 1, pf), None, &[1, 2, 3, 4]);
        let texture = decode(&bytes, DecodeFlags::FORCE_RGB).unwrap();
        assert_eq!(texture.metadata().format, DxgiFormat::R8G8B8A8_UNORM);
        assert_eq!(texture.pixels(), &[3, 2, 1, 4]);
    }

    #[test]
    fn test_round_trip_legacy_cube() {
        let mut h = header(8, 8, DdsPixelFormat::four_cc(FourCC::DXT1));
        h.mipmap_count = 4;
        make_cube(&mut h, Caps2::CUBEMAP_ALL_FACES);
        // Per face: 32 + 8 + 8 + 8 bytes.
        let bytes = build(&h, None, &pattern(6 * 56));

        let texture = decode(&bytes, DecodeFlags::empty()).unwrap();
        assert_eq!(texture.metadata().dimension, TexDimension::TextureCube);
        assert_eq!(texture.subresources().len(), 24);

        let encoded = encode(&texture, EncodeFlags::empty()).unwrap();
        assert_eq!(encoded.len(), bytes.len());
        assert_eq!(&encoded[PIXEL_FORMAT], &bytes[PIXEL_FORMAT]);
        assert_eq!(&encoded[128..], &bytes[128..]);
        let again = decode(&encoded, DecodeFlags::empty()).unwrap();
        assert_eq!(again.metadata(), texture.metadata());
        assert_eq!(again.pixels(), texture.pixels());
        // A second pass writes identical bytes.
        assert_eq!(reencode(&again).unwrap(), encoded);
    }

    #[test]
    fn test_round_trip_dx10_array() {
        let mut h = dx10_header(4, 4);
        h.mipmap_count = 3;
        let ext = dx10(DxgiFormat::R8G8B8A8_UNORM_SRGB, 3);
        let bytes = build(&h, Some(&ext), &pattern(3 * (64 + 16 + 4)));

        let texture = decode(&bytes, DecodeFlags::empty()).unwrap();
        let encoded = reencode(&texture).unwrap();
        assert_eq!(encoded.len(), bytes.len());
        assert_eq!(&encoded[PIXEL_FORMAT], &bytes[PIXEL_FORMAT]);
        assert_eq!(&encoded[128..], &bytes[128..]);
        let again = decode(&encoded, DecodeFlags::empty()).unwrap();
        assert_eq!(again.metadata(), texture.metadata());
        assert_eq!(again.pixels(), texture.pixels());
        assert_eq!(again.header_kind(), Some(HeaderKind::Dx10));
    }

    #[test]
    fn test_reencode_keeps_dx10_header() {
        let ext = dx10(DxgiFormat::BC1_UNORM, 1);
        let bytes = build(&dx10_header(4, 4), Some(&ext), &pattern(8));
        let texture = decode(&bytes, DecodeFlags::empty()).unwrap();

        let encoded = reencode(&texture).unwrap();
        assert_eq!(encoded.len(), 148 + 8);
        assert_eq!(&encoded[PIXEL_FORMAT], &bytes[PIXEL_FORMAT]);
        assert_eq!(&encoded[128..], &bytes[128..]);
        assert!(texture.source_pixel_format().is_none());

        // A plain encode prefers the legacy header.
        let legacy = encode(&texture, EncodeFlags::empty()).unwrap();
        assert_eq!(legacy.len(), 128 + 8);
        assert_eq!(&legacy[84..88], b"DXT1");
    }

    #[test]
    fn test_round_trip_volume() {
        let pf = DdsPixelFormat::masked(PixelFormatFlags::RGBA, 32, 0xff, 0xff00, 0xff0000, 0xff000000);
        let mut h = header(4, 4, pf);
        h.flags |= HeaderFlags::VOLUME.bits();
        h.depth = 2;
        h.mipmap_count = 2;
        let bytes = build(&h, None, &pattern(2 * 64 + 16));

        let texture = decode(&bytes, DecodeFlags::empty()).unwrap();
        assert_eq!(texture.subresources().len(), 3);
        let encoded = encode(&texture, EncodeFlags::empty()).unwrap();
        assert_eq!(&encoded[PIXEL_FORMAT], &bytes[PIXEL_FORMAT]);
        let again = decode(&encoded, DecodeFlags::empty()).unwrap();
        assert_eq!(again.metadata(), texture.metadata());
        assert_eq!(again.pixels(), texture.pixels());
        assert_eq!(reencode(&again).unwrap(), encoded);
    }

    #[test]
    fn test_encode_to_writer() {
        let texture = Texture::new(TexMetadata::new_2d(4, 4, DxgiFormat::BC1_UNORM)).unwrap();
        let mut out = Vec::new();
        encode_to(&texture, EncodeFlags::empty(), &mut out).unwrap();
        assert_eq!(read_metadata(&out, DecodeFlags::empty()).unwrap(), *texture.metadata());
    }

    #[test]
    fn test_reencode_keeps_alias_pixel_formats() {
        use PixelFormatFlags as P;

        assert_reencode_keeps_pixel_format(DdsPixelFormat::four_cc(FourCC::ATI1), 8);
        assert_reencode_keeps_pixel_format(DdsPixelFormat::four_cc(FourCC::ATI2), 16);
        // Luminance written with the RGB flag.
        assert_reencode_keeps_pixel_format(DdsPixelFormat::masked(P::RGB, 8, 0xff, 0, 0, 0), 16);
        assert_reencode_keeps_pixel_format(DdsPixelFormat::masked(P::RGB, 16, 0xffff, 0, 0, 0), 32);
        assert_reencode_keeps_pixel_format(DdsPixelFormat::masked(P::RGBA, 16, 0x00ff, 0, 0, 0xff00), 32);
        // A8L8 with an 8-bit count.
        assert_reencode_keeps_pixel_format(DdsPixelFormat::masked(P::LUMINANCE_ALPHA, 8, 0x00ff, 0, 0, 0xff00), 32);
        // R32F as a mask rather than FourCC 114.
        assert_reencode_keeps_pixel_format(DdsPixelFormat::masked(P::RGB, 32, 0xffff_ffff, 0, 0, 0), 64);
    }

    #[test]
    fn test_converted_decode_drops_source_pixel_format() {
        let pf = DdsPixelFormat::masked(PixelFormatFlags::RGB, 24, 0xff0000, 0xff00, 0xff, 0);
        let bytes = build(&header(2, 1, pf), None, &[1, 2, 3, 4, 5, 6]);
        let texture = decode(&bytes, DecodeFlags::empty()).unwrap();
        assert!(texture.source_pixel_format().is_none());

        let encoded = reencode(&texture).unwrap();
        let again = decode(&encoded, DecodeFlags::empty()).unwrap();
        assert_eq!(again.metadata().format, DxgiFormat::R8G8B8A8_UNORM);
        assert_eq!(again.pixels(), texture.pixels());
    }

    #[test]
    fn test_no_16bpp_expands_narrow_legacy() {
        let pf = DdsPixelFormat::masked(PixelFormatFlags::RGB, 8, 0xe0, 0x1c, 0x03, 0);
        let bytes = build(&header(2, 1, pf), None, &[0xff, 0xe0]);

        let texture = decode(&bytes, DecodeFlags::empty()).unwrap();
        assert_eq!(texture.metadata().format, DxgiFormat::B5G6R5_UNORM);
        assert_eq!(texture.pixels(), &[0xff, 0xff, 0x00, 0xf8]);

        let texture = decode(&bytes, DecodeFlags::NO_16BPP).unwrap();
        assert_eq!(texture.metadata().format, DxgiFormat::R8G8B8A8_UNORM);
        assert_eq!(texture.pixels(), &[0xff, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0xff]);

        let pf = DdsPixelFormat::masked(PixelFormatFlags::LUMINANCE_ALPHA, 8, 0x0f, 0, 0, 0xf0);
        let bytes = build(&header(2, 1, pf), None, &[0x7a, 0xf0]);
        let texture = decode(&bytes, DecodeFlags::NO_16BPP).unwrap();
        assert_eq!(texture.metadata().format, DxgiFormat::R8G8B8A8_UNORM);
        assert_eq!(texture.pixels(), &[0xaa, 0xaa, 0xaa, 0x77, 0x00, 0x00, 0x00, 0xff]);
    }

    #[test]
    fn test_dx10_volume_decode() {
        let mut h = dx10_header(4, 4);
        h.flags |= HeaderFlags::VOLUME.bits();
        h.depth = 2;
        let mut ext = dx10(DxgiFormat::R8_UNORM, 1);
        ext.resource_dimension = crate::header::ResourceDimension::Texture3D as u32;
        let payload = pattern(32);
        let bytes = build(&h, Some(&ext), &payload);

        let texture = decode(&bytes, DecodeFlags::empty()).unwrap();
        assert_eq!(texture.metadata().dimension, TexDimension::Texture3D);
        assert_eq!(texture.subresources().len(), 2);
        assert_eq!(texture.image(0, 0, 1).unwrap().data, &payload[16..]);

        let encoded = reencode(&texture).unwrap();
        assert_eq!(&encoded[128..], &bytes[128..]);
    }
}
