//! Texture description.

use crate::DxgiFormat;

/// Texture shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TexDimension {
    Texture1D,
    Texture2D,
    Texture3D,
    /// 2D texture whose array items are grouped in sets of six faces.
    TextureCube,
}

/// How the alpha channel is to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum AlphaMode {
    #[default]
    Unknown = 0,
    Straight = 1,
    Premultiplied = 2,
    Opaque = 3,
    /// Alpha channel holds something other than transparency.
    Custom = 4,
}

impl AlphaMode {
    /// Map the low bits of the extended header's `misc_flags2`.
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Unknown),
            1 => Some(Self::Straight),
            2 => Some(Self::Premultiplied),
            3 => Some(Self::Opaque),
            4 => Some(Self::Custom),
            _ => None,
        }
    }
}

/// Description of a decoded texture.
///
/// For cube maps `array_size` counts faces, so it is always a multiple of
/// six. For volume textures it is always one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TexMetadata {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub array_size: u32,
    pub mip_levels: u32,
    pub dimension: TexDimension,
    pub format: DxgiFormat,
    pub alpha_mode: AlphaMode,
}

impl TexMetadata {
    /// A single-mip 2D texture.
    pub fn new_2d(width: u32, height: u32, format: DxgiFormat) -> Self {
        Self {
            width,
            height,
            depth: 1,
            array_size: 1,
            mip_levels: 1,
            dimension: TexDimension::Texture2D,
            format,
            alpha_mode: AlphaMode::Unknown,
        }
    }

    #[inline]
    pub fn is_cubemap(&self) -> bool {
        self.dimension == TexDimension::TextureCube
    }

    #[inline]
    pub fn is_volume(&self) -> bool {
        self.dimension == TexDimension::Texture3D
    }

    /// Whether color channels are premultiplied by alpha.
    #[inline]
    pub fn is_premultiplied(&self) -> bool {
        self.alpha_mode == AlphaMode::Premultiplied
    }

    /// Length of the mip chain that ends at 1x1(x1) for these extents.
    pub fn full_mip_chain(&self) -> u32 {
        let depth = if self.is_volume() { self.depth } else { 1 };
        full_mip_chain(self.width, self.height, depth)
    }

    /// Number of cubes in a cube map array, or `None` for other shapes.
    pub fn cube_count(&self) -> Option<u32> {
        self.is_cubemap().then_some(self.array_size / 6)
    }
}

/// Number of mip levels down to 1x1(x1), halving with a floor of one.
pub fn full_mip_chain(width: u32, height: u32, depth: u32) -> u32 {
    let largest = width.max(height).max(depth).max(1);
    u32::BITS - largest.leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_mip_chain() {
        assert_eq!(full_mip_chain(1, 1, 1), 1);
        assert_eq!(full_mip_chain(2, 1, 1), 2);
        assert_eq!(full_mip_chain(16, 16, 1), 5);
        assert_eq!(full_mip_chain(17, 5, 1), 5);
        assert_eq!(full_mip_chain(4, 4, 64), 7);
        assert_eq!(full_mip_chain(16384, 1, 1), 15);
    }

    #[test]
    fn test_chain_ignores_depth_outside_volumes() {
        let mut meta = TexMetadata::new_2d(4, 4, DxgiFormat::R8G8B8A8_UNORM);
        meta.depth = 64;
        assert_eq!(meta.full_mip_chain(), 3);

        meta.dimension = TexDimension::Texture3D;
        assert_eq!(meta.full_mip_chain(), 7);
    }

    #[test]
    fn test_alpha_mode_raw() {
        assert_eq!(AlphaMode::from_raw(2), Some(AlphaMode::Premultiplied));
        assert_eq!(AlphaMode::from_raw(5), None);
    }

    #[test]
    fn test_cube_count() {
        let mut meta = TexMetadata::new_2d(8, 8, DxgiFormat::BC1_UNORM);
        assert_eq!(meta.cube_count(), None);
        meta.dimension = TexDimension::TextureCube;
        meta.array_size = 12;
        assert_eq!(meta.cube_count(), Some(2));
    }
}
