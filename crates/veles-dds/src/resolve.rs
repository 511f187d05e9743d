//! Legacy pixel format resolution.

use std::fmt;

use crate::header::{DdsPixelFormat, PixelFormatFlags};
use crate::table::{find_legacy, LegacyFormat};
use crate::{ConversionFlags, DecodeFlags, DxgiFormat};

/// A legacy pixel format mapped to a canonical one.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedFormat {
    /// Canonical format of the decoded pixels.
    pub format: DxgiFormat,
    /// Conversion needed to get there.
    pub flags: ConversionFlags,
    /// Table entry that matched.
    pub entry: &'static LegacyFormat,
}

/// Why a legacy pixel format has no canonical format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    /// Nothing in the table matches.
    NoMatch,
    /// The match needs expansion and the caller forbade it.
    ExpansionForbidden(&'static str),
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolved::NoMatch => f.write_str("no matching legacy format"),
            Unresolved::ExpansionForbidden(name) => {
                write!(f, "{name} needs expansion, which is disabled")
            }
        }
    }
}

/// Resolve a legacy pixel format to a canonical format and conversion flags.
///
/// The first matching table entry wins.
pub fn resolve(pf: &DdsPixelFormat, options: DecodeFlags) -> Result<ResolvedFormat, Unresolved> {
    let entry = find_legacy(pf).ok_or(Unresolved::NoMatch)?;

    let mut flags = entry.flags;
    if flags.contains(ConversionFlags::EXPAND) && options.contains(DecodeFlags::NO_LEGACY_EXPANSION) {
        return Err(Unresolved::ExpansionForbidden(entry.name));
    }

    if entry.format == DxgiFormat::R10G10B10A2_UNORM
        && options.contains(DecodeFlags::NO_R10B10G10A2_FIXUP)
    {
        flags.toggle(ConversionFlags::SWIZZLE);
    }

    Ok(ResolvedFormat {
        format: entry.format,
        flags,
        entry,
    })
}

/// Short description of a pixel format for error messages.
pub(crate) fn describe(pf: &DdsPixelFormat) -> String {
    let (flags, four_cc, bits) = (pf.flags, pf.four_cc, pf.rgb_bit_count);
    let (r, g, b, a) = (pf.r_bit_mask, pf.g_bit_mask, pf.b_bit_mask, pf.a_bit_mask);
    if pf.has_flags(PixelFormatFlags::FOURCC) {
        format!("FourCC {four_cc}")
    } else {
        format!("flags {flags:#x}, {bits} bpp, masks {r:#x}/{g:#x}/{b:#x}/{a:#x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::FourCC;

    #[test]
    fn test_resolve_fourcc() {
        let resolved = resolve(&DdsPixelFormat::four_cc(FourCC::DXT5), DecodeFlags::empty()).unwrap();
        assert_eq!(resolved.format, DxgiFormat::BC3_UNORM);
        assert!(resolved.flags.is_empty());

        let err = resolve(&DdsPixelFormat::four_cc(FourCC(*b"ZZZZ")), DecodeFlags::empty()).unwrap_err();
        assert_eq!(err, Unresolved::NoMatch);
    }

    #[test]
    fn test_expansion_can_be_forbidden() {
        let pf = DdsPixelFormat::masked(PixelFormatFlags::RGB, 24, 0xff0000, 0xff00, 0xff, 0);
        assert!(resolve(&pf, DecodeFlags::empty()).is_ok());
        assert_eq!(
            resolve(&pf, DecodeFlags::NO_LEGACY_EXPANSION).unwrap_err(),
            Unresolved::ExpansionForbidden("R8G8B8")
        );

        // Formats without expansion are unaffected.
        let pf = DdsPixelFormat::masked(PixelFormatFlags::RGB, 16, 0xf800, 0x07e0, 0x001f, 0);
        assert!(resolve(&pf, DecodeFlags::NO_LEGACY_EXPANSION).is_ok());
    }

    #[test]
    fn test_ten_bit_swizzle_toggle() {
        let swapped = DdsPixelFormat::masked(
            PixelFormatFlags::RGBA,
            32,
            0x0000_03ff,
            0x000f_fc00,
            0x3ff0_0000,
            0xc000_0000,
        );
        let straight = DdsPixelFormat::masked(
            PixelFormatFlags::RGBA,
            32,
            0x3ff0_0000,
            0x000f_fc00,
            0x0000_03ff,
            0xc000_0000,
        );

        let r = resolve(&swapped, DecodeFlags::empty()).unwrap();
        assert!(r.flags.contains(ConversionFlags::SWIZZLE));
        let r = resolve(&swapped, DecodeFlags::NO_R10B10G10A2_FIXUP).unwrap();
        assert!(!r.flags.contains(ConversionFlags::SWIZZLE));

        let r = resolve(&straight, DecodeFlags::empty()).unwrap();
        assert!(!r.flags.contains(ConversionFlags::SWIZZLE));
        let r = resolve(&straight, DecodeFlags::NO_R10B10G10A2_FIXUP).unwrap();
        assert!(r.flags.contains(ConversionFlags::SWIZZLE));
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&DdsPixelFormat::four_cc(FourCC(*b"YUY2"))), "FourCC YUY2");
        let pf = DdsPixelFormat::masked(PixelFormatFlags::RGB, 8, 0xe0, 0, 0, 0);
        assert!(describe(&pf).contains("8 bpp"));
    }
}
