//! Per-scanline pixel conversion.
//!
//! A [`ScanlineConverter`] is built once per texture from the conversion mode
//! and the canonical format. Building it rejects combinations that cannot
//! work, so converting rows afterwards cannot fail.

use byteorder::{ByteOrder, LittleEndian};

use crate::decode::Palette;
use crate::{ConversionMode, DxgiFormat, Error, LegacyKind, Result};

/// Canonical layout produced by an expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    B5G6R5,
    B4G4R4A4,
    Rgba8,
    Rgba16,
}

impl Target {
    fn bytes(self) -> usize {
        match self {
            Target::B5G6R5 | Target::B4G4R4A4 => 2,
            Target::Rgba8 => 4,
            Target::Rgba16 => 8,
        }
    }

    fn write(self, out: &mut [u8], value: u64) {
        match self {
            Target::B5G6R5 | Target::B4G4R4A4 => LittleEndian::write_u16(out, value as u16),
            Target::Rgba8 => LittleEndian::write_u32(out, value as u32),
            Target::Rgba16 => LittleEndian::write_u64(out, value),
        }
    }
}

/// How an opaque alpha is forced into a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlphaBits {
    Set8(u8),
    Set16(u16),
    Set32(u32),
    Or16(u16),
    Or32(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Copy,
    Expand {
        source: LegacyKind,
        target: Target,
        set_alpha: bool,
    },
    Swizzle8888 {
        set_alpha: bool,
    },
    Swizzle1010102 {
        set_alpha: bool,
    },
    AlphaFix {
        stride: usize,
        offset: usize,
        bits: AlphaBits,
    },
}

/// Applies one conversion mode to rows of a single format.
#[derive(Debug, Clone, Copy)]
pub struct ScanlineConverter<'p> {
    op: Op,
    palette: Option<&'p Palette>,
}

impl<'p> ScanlineConverter<'p> {
    /// Prepare a converter producing rows of `format`.
    ///
    /// Fails with [`Error::UnsupportedConversion`] when `mode` cannot
    /// produce `format`, or when a palette expansion has no palette.
    pub fn new(mode: ConversionMode, format: DxgiFormat, palette: Option<&'p Palette>) -> Result<Self> {
        let unsupported = || Error::UnsupportedConversion { mode, format };

        let op = match mode {
            ConversionMode::None => Op::Copy,
            ConversionMode::Expand { source, set_alpha } => {
                let target = expansion_target(source, format).ok_or_else(unsupported)?;
                if source.uses_palette() && palette.is_none() {
                    return Err(unsupported());
                }
                Op::Expand {
                    source,
                    target,
                    set_alpha,
                }
            }
            ConversionMode::Swizzle { set_alpha } => {
                swizzle_op(format, set_alpha).ok_or_else(unsupported)?
            }
            ConversionMode::CopyWithAlphaFix => alpha_fix(format).ok_or_else(unsupported)?,
        };

        Ok(Self { op, palette })
    }

    /// Whether rows pass through unchanged.
    pub fn is_copy(&self) -> bool {
        self.op == Op::Copy
    }

    /// Convert `src` into `dst`.
    ///
    /// Converts as many whole pixels as both rows hold. A plain copy moves
    /// `min(src.len(), dst.len())` bytes.
    pub fn convert(&self, dst: &mut [u8], src: &[u8]) {
        match self.op {
            Op::Copy => {
                let n = src.len().min(dst.len());
                dst[..n].copy_from_slice(&src[..n]);
            }
            Op::Expand {
                source,
                target,
                set_alpha,
            } => {
                let (sb, db) = (source.bytes_per_pixel(), target.bytes());
                for (out, px) in dst.chunks_exact_mut(db).zip(src.chunks_exact(sb)) {
                    target.write(out, self.expand(source, target, set_alpha, px));
                }
            }
            _ => {
                let n = src.len().min(dst.len());
                dst[..n].copy_from_slice(&src[..n]);
                self.convert_in_place(&mut dst[..n], n);
            }
        }
    }

    /// Convert a row in place.
    ///
    /// `row` is sized for the destination; its first `src_len` bytes hold the
    /// source pixels. Expansions run back to front so no source pixel is
    /// overwritten before it is read.
    pub fn convert_in_place(&self, row: &mut [u8], src_len: usize) {
        match self.op {
            Op::Copy => {}
            Op::Expand {
                source,
                target,
                set_alpha,
            } => {
                let (sb, db) = (source.bytes_per_pixel(), target.bytes());
                let count = (src_len.min(row.len()) / sb).min(row.len() / db);
                let mut px = [0u8; 4];
                for i in (0..count).rev() {
                    px[..sb].copy_from_slice(&row[i * sb..(i + 1) * sb]);
                    let value = self.expand(source, target, set_alpha, &px[..sb]);
                    target.write(&mut row[i * db..(i + 1) * db], value);
                }
            }
            Op::Swizzle8888 { set_alpha } => {
                for px in row.chunks_exact_mut(4) {
                    px.swap(0, 2);
                    if set_alpha {
                        px[3] = 0xff;
                    }
                }
            }
            Op::Swizzle1010102 { set_alpha } => {
                for px in row.chunks_exact_mut(4) {
                    let t = LittleEndian::read_u32(px);
                    let red = (t & 0x3ff0_0000) >> 20;
                    let blue = (t & 0x0000_03ff) << 20;
                    let green = t & 0x000f_fc00;
                    let alpha = if set_alpha { 0xc000_0000 } else { t & 0xc000_0000 };
                    LittleEndian::write_u32(px, red | blue | green | alpha);
                }
            }
            Op::AlphaFix {
                stride,
                offset,
                bits,
            } => {
                for px in row.chunks_exact_mut(stride) {
                    let field = &mut px[offset..];
                    match bits {
                        AlphaBits::Set8(v) => field[0] = v,
                        AlphaBits::Set16(v) => LittleEndian::write_u16(field, v),
                        AlphaBits::Set32(v) => LittleEndian::write_u32(field, v),
                        AlphaBits::Or16(v) => {
                            let t = LittleEndian::read_u16(field);
                            LittleEndian::write_u16(field, t | v);
                        }
                        AlphaBits::Or32(v) => {
                            let t = LittleEndian::read_u32(field);
                            LittleEndian::write_u32(field, t | v);
                        }
                    }
                }
            }
        }
    }

    fn expand(&self, source: LegacyKind, target: Target, set_alpha: bool, px: &[u8]) -> u64 {
        match source {
            LegacyKind::R8G8B8 => {
                // Stored B, G, R.
                let (b, g, r) = (u32::from(px[0]), u32::from(px[1]), u32::from(px[2]));
                u64::from((b << 16) | (g << 8) | r | 0xff00_0000)
            }
            LegacyKind::R3G3B2 => {
                let t = u32::from(px[0]);
                if target == Target::B5G6R5 {
                    let r = ((t & 0xe0) << 8) | ((t & 0xc0) << 5);
                    let g = ((t & 0x1c) << 6) | ((t & 0x1c) << 3);
                    let b = ((t & 0x03) << 3) | ((t & 0x03) << 1) | ((t & 0x02) >> 1);
                    u64::from(r | g | b)
                } else {
                    u64::from(rgb332_to_rgba8(t) | 0xff00_0000)
                }
            }
            LegacyKind::A8R3G3B2 => {
                let t = u32::from(LittleEndian::read_u16(px));
                let a = if set_alpha { 0xff00_0000 } else { (t & 0xff00) << 16 };
                u64::from(rgb332_to_rgba8(t) | a)
            }
            LegacyKind::P8 => u64::from(self.palette_entry(px[0])),
            LegacyKind::A8P8 => {
                let t = u32::from(LittleEndian::read_u16(px));
                let rgb = self.palette_entry(px[0]) & 0x00ff_ffff;
                let a = if set_alpha { 0xff00_0000 } else { (t & 0xff00) << 16 };
                u64::from(rgb | a)
            }
            LegacyKind::A4L4 => {
                let t = u32::from(px[0]);
                if target == Target::B4G4R4A4 {
                    let l = t & 0x0f;
                    let a = if set_alpha { 0xf000 } else { (t & 0xf0) << 8 };
                    u64::from((l << 8) | (l << 4) | l | a)
                } else {
                    let l = ((t & 0x0f) << 4) | (t & 0x0f);
                    let a = if set_alpha {
                        0xff00_0000
                    } else {
                        ((t & 0xf0) << 24) | ((t & 0xf0) << 20)
                    };
                    u64::from(l | (l << 8) | (l << 16) | a)
                }
            }
            LegacyKind::B4G4R4A4 => {
                let t = u32::from(LittleEndian::read_u16(px));
                let r = ((t & 0x0f00) >> 4) | ((t & 0x0f00) >> 8);
                let g = ((t & 0x00f0) << 8) | ((t & 0x00f0) << 4);
                let b = ((t & 0x000f) << 20) | ((t & 0x000f) << 16);
                let a = if set_alpha {
                    0xff00_0000
                } else {
                    ((t & 0xf000) << 16) | ((t & 0xf000) << 12)
                };
                u64::from(r | g | b | a)
            }
            LegacyKind::B5G6R5 => {
                let t = u32::from(LittleEndian::read_u16(px));
                let r = ((t & 0xf800) >> 8) | ((t & 0xe000) >> 13);
                let g = ((t & 0x07e0) << 5) | ((t & 0x0600) >> 1);
                let b = ((t & 0x001f) << 19) | ((t & 0x001c) << 14);
                u64::from(r | g | b | 0xff00_0000)
            }
            LegacyKind::B5G5R5A1 => {
                let t = u32::from(LittleEndian::read_u16(px));
                let r = ((t & 0x7c00) >> 7) | ((t & 0x7000) >> 12);
                let g = ((t & 0x03e0) << 6) | ((t & 0x0380) << 1);
                let b = ((t & 0x001f) << 19) | ((t & 0x001c) << 14);
                let a = if set_alpha || t & 0x8000 != 0 { 0xff00_0000 } else { 0 };
                u64::from(r | g | b | a)
            }
            LegacyKind::L8 => {
                let l = u32::from(px[0]);
                u64::from(l | (l << 8) | (l << 16) | 0xff00_0000)
            }
            LegacyKind::A8L8 => {
                let t = u32::from(LittleEndian::read_u16(px));
                let l = t & 0xff;
                let a = if set_alpha { 0xff00_0000 } else { (t & 0xff00) << 16 };
                u64::from(l | (l << 8) | (l << 16) | a)
            }
            LegacyKind::L16 => {
                let l = u64::from(LittleEndian::read_u16(px));
                l | (l << 16) | (l << 32) | (0xffff << 48)
            }
        }
    }

    fn palette_entry(&self, index: u8) -> u32 {
        self.palette.map_or(0, |palette| palette[usize::from(index)])
    }
}

/// R3G3B2 in the low byte widened to R8G8B8 with a zero alpha.
fn rgb332_to_rgba8(t: u32) -> u32 {
    let r = (t & 0xe0) | ((t & 0xe0) >> 3) | ((t & 0xc0) >> 6);
    let g = ((t & 0x1c) << 11) | ((t & 0x1c) << 8) | ((t & 0x18) << 5);
    let b = ((t & 0x03) << 22) | ((t & 0x03) << 20) | ((t & 0x03) << 18) | ((t & 0x03) << 16);
    r | g | b
}

fn expansion_target(source: LegacyKind, format: DxgiFormat) -> Option<Target> {
    use LegacyKind as K;

    match (source, format) {
        (K::R3G3B2, DxgiFormat::B5G6R5_UNORM) => Some(Target::B5G6R5),
        (K::A4L4, DxgiFormat::B4G4R4A4_UNORM) => Some(Target::B4G4R4A4),
        (K::L16, DxgiFormat::R16G16B16A16_UNORM) => Some(Target::Rgba16),
        (K::L16, _) => None,
        (_, DxgiFormat::R8G8B8A8_UNORM) => Some(Target::Rgba8),
        _ => None,
    }
}

fn swizzle_op(format: DxgiFormat, set_alpha: bool) -> Option<Op> {
    use DxgiFormat as F;

    match format {
        F::R10G10B10A2_TYPELESS
        | F::R10G10B10A2_UNORM
        | F::R10G10B10A2_UINT
        | F::R10G10B10_XR_BIAS_A2_UNORM => Some(Op::Swizzle1010102 { set_alpha }),
        F::R8G8B8A8_TYPELESS
        | F::R8G8B8A8_UNORM
        | F::R8G8B8A8_UNORM_SRGB
        | F::B8G8R8A8_UNORM
        | F::B8G8R8X8_UNORM
        | F::B8G8R8A8_TYPELESS
        | F::B8G8R8A8_UNORM_SRGB
        | F::B8G8R8X8_TYPELESS
        | F::B8G8R8X8_UNORM_SRGB => Some(Op::Swizzle8888 { set_alpha }),
        _ => None,
    }
}

fn alpha_fix(format: DxgiFormat) -> Option<Op> {
    use DxgiFormat as F;

    let (stride, offset, bits) = match format {
        F::R32G32B32A32_FLOAT => (16, 12, AlphaBits::Set32(0x3f80_0000)),
        F::R32G32B32A32_SINT => (16, 12, AlphaBits::Set32(0x7fff_ffff)),
        F::R32G32B32A32_TYPELESS | F::R32G32B32A32_UINT => (16, 12, AlphaBits::Set32(0xffff_ffff)),
        F::R16G16B16A16_FLOAT => (8, 6, AlphaBits::Set16(0x3c00)),
        F::R16G16B16A16_SNORM | F::R16G16B16A16_SINT => (8, 6, AlphaBits::Set16(0x7fff)),
        F::R16G16B16A16_TYPELESS | F::R16G16B16A16_UNORM | F::R16G16B16A16_UINT => {
            (8, 6, AlphaBits::Set16(0xffff))
        }
        F::R10G10B10A2_TYPELESS
        | F::R10G10B10A2_UNORM
        | F::R10G10B10A2_UINT
        | F::R10G10B10_XR_BIAS_A2_UNORM => (4, 0, AlphaBits::Or32(0xc000_0000)),
        F::R8G8B8A8_SNORM | F::R8G8B8A8_SINT => (4, 3, AlphaBits::Set8(0x7f)),
        F::R8G8B8A8_TYPELESS
        | F::R8G8B8A8_UNORM
        | F::R8G8B8A8_UNORM_SRGB
        | F::R8G8B8A8_UINT
        | F::B8G8R8A8_UNORM
        | F::B8G8R8A8_TYPELESS
        | F::B8G8R8A8_UNORM_SRGB => (4, 3, AlphaBits::Set8(0xff)),
        F::B5G5R5A1_UNORM => (2, 0, AlphaBits::Or16(0x8000)),
        F::B4G4R4A4_UNORM => (2, 0, AlphaBits::Or16(0xf000)),
        F::A8_UNORM => (1, 0, AlphaBits::Set8(0xff)),
        _ => return None,
    };
    Some(Op::AlphaFix {
        stride,
        offset,
        bits,
    })
}
