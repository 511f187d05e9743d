//! Pitch and memory layout computation.
//!
//! Subresources are ordered item-major: every mip of array item 0 first,
//! then every mip of item 1, and so on. Volume textures have a single item
//! and one subresource per depth slice of each mip.

use crate::{ConversionFlags, DecodeFlags, DxgiFormat, Error, FormatClass, Result, TexMetadata};

/// How rows of linear formats are sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PitchMode {
    /// Round rows up to a multiple of four bytes.
    pub legacy_dword: bool,
    /// Bits per pixel to use instead of the format's own.
    pub bpp_override: Option<u32>,
}

impl PitchMode {
    /// Pitch mode of the data stored in a file.
    pub fn source(flags: ConversionFlags, options: DecodeFlags) -> Self {
        Self {
            legacy_dword: options.contains(DecodeFlags::LEGACY_DWORD),
            bpp_override: flags.source_bpp_override(),
        }
    }
}

/// Row and slice size of one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pitch {
    pub row_pitch: usize,
    pub slice_pitch: usize,
    /// Columns of rows: blocks, pixel pairs or pixels depending on the class.
    pub blocks_wide: u32,
    /// Number of rows.
    pub blocks_high: u32,
}

fn overflow(width: u32, height: u32) -> Error {
    Error::InvalidGeometry(format!("{width}x{height} image size overflows"))
}

/// Compute the row and slice pitch of a `width` x `height` image.
pub fn compute_pitch(format: DxgiFormat, width: u32, height: u32, mode: PitchMode) -> Result<Pitch> {
    let (row, blocks_wide, blocks_high) = match format.class() {
        FormatClass::BlockCompressed => {
            let block = format.bytes_per_block().unwrap_or(16) as u64;
            let wide = width.div_ceil(4).max(1);
            let high = height.div_ceil(4).max(1);
            (u64::from(wide) * block, wide, high)
        }
        FormatClass::Packed => {
            let group = format.bytes_per_group().unwrap_or(4) as u64;
            let pairs = (u64::from(width) + 1) >> 1;
            (pairs * group, pairs as u32, height)
        }
        FormatClass::Planar => {
            return Err(Error::UnsupportedPixelFormat(format!(
                "planar format {format} is not supported"
            )));
        }
        FormatClass::Linear => {
            let bpp = mode.bpp_override.unwrap_or_else(|| format.bits_per_pixel());
            if bpp == 0 {
                return Err(Error::UnsupportedPixelFormat(format!(
                    "{format} has no known pixel size"
                )));
            }
            let bits = u64::from(width) * u64::from(bpp);
            let row = if mode.legacy_dword {
                bits.div_ceil(32) * 4
            } else {
                bits.div_ceil(8)
            };
            (row, width, height)
        }
    };

    let slice = row
        .checked_mul(u64::from(blocks_high))
        .ok_or_else(|| overflow(width, height))?;
    Ok(Pitch {
        row_pitch: usize::try_from(row).map_err(|_| overflow(width, height))?,
        slice_pitch: usize::try_from(slice).map_err(|_| overflow(width, height))?,
        blocks_wide,
        blocks_high,
    })
}

/// Geometry of one mip level, shared by all array items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipLevelLayout {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub row_pitch: usize,
    pub slice_pitch: usize,
    pub blocks_wide: u32,
    pub blocks_high: u32,
    /// Offset of the level's first slice from the start of its array item.
    pub offset: usize,
}

impl MipLevelLayout {
    /// Bytes of the whole level (all depth slices).
    #[inline]
    pub fn size(&self) -> usize {
        self.slice_pitch * self.depth as usize
    }
}

/// Complete memory layout of a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureLayout {
    levels: Vec<MipLevelLayout>,
    items: u32,
    /// First depth-slice subresource of each mip within an item.
    depth_starts: Vec<usize>,
    slices_per_item: usize,
    item_size: usize,
    total_size: usize,
}

impl TextureLayout {
    /// Lay out every subresource described by `meta`.
    pub fn new(meta: &TexMetadata, mode: PitchMode) -> Result<Self> {
        let volume = meta.is_volume();
        let items = if volume { 1 } else { meta.array_size };
        if items == 0 || meta.mip_levels == 0 {
            return Err(Error::InvalidGeometry("texture has no subresources".into()));
        }

        let mut levels = Vec::with_capacity(meta.mip_levels as usize);
        let mut depth_starts = Vec::with_capacity(meta.mip_levels as usize);
        let (mut width, mut height) = (meta.width.max(1), meta.height.max(1));
        let mut depth = if volume { meta.depth.max(1) } else { 1 };
        let mut slices = 0usize;
        let mut item_size = 0usize;

        for _ in 0..meta.mip_levels {
            let pitch = compute_pitch(meta.format, width, height, mode)?;
            let level = MipLevelLayout {
                width,
                height,
                depth,
                row_pitch: pitch.row_pitch,
                slice_pitch: pitch.slice_pitch,
                blocks_wide: pitch.blocks_wide,
                blocks_high: pitch.blocks_high,
                offset: item_size,
            };
            let level_size = pitch
                .slice_pitch
                .checked_mul(depth as usize)
                .ok_or_else(|| Error::InvalidGeometry("mip level size overflows".into()))?;
            item_size = item_size
                .checked_add(level_size)
                .ok_or_else(|| Error::InvalidGeometry("array item size overflows".into()))?;

            depth_starts.push(slices);
            slices += depth as usize;
            levels.push(level);

            width = (width >> 1).max(1);
            height = (height >> 1).max(1);
            if volume {
                depth = (depth >> 1).max(1);
            }
        }

        let total_size = item_size
            .checked_mul(items as usize)
            .ok_or_else(|| Error::InvalidGeometry("texture size overflows".into()))?;

        Ok(Self {
            levels,
            items,
            depth_starts,
            slices_per_item: slices,
            item_size,
            total_size,
        })
    }

    /// Per-mip geometry, largest first.
    #[inline]
    pub fn levels(&self) -> &[MipLevelLayout] {
        &self.levels
    }

    /// Geometry of one mip level.
    #[inline]
    pub fn level(&self, mip: usize) -> Option<&MipLevelLayout> {
        self.levels.get(mip)
    }

    /// Number of array items (1 for volume textures).
    #[inline]
    pub fn items(&self) -> u32 {
        self.items
    }

    /// Total number of subresources.
    #[inline]
    pub fn subresource_count(&self) -> usize {
        self.slices_per_item * self.items as usize
    }

    /// Total byte size of all subresources.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Bytes of one array item (all mips).
    #[inline]
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Index of a subresource, or `None` when out of range.
    pub fn index(&self, mip: usize, item: usize, slice: usize) -> Option<usize> {
        let level = self.levels.get(mip)?;
        if item >= self.items as usize || slice >= level.depth as usize {
            return None;
        }
        Some(item * self.slices_per_item + self.depth_starts[mip] + slice)
    }

    /// Byte offset of a subresource, or `None` when out of range.
    pub fn offset(&self, mip: usize, item: usize, slice: usize) -> Option<usize> {
        let level = self.levels.get(mip)?;
        if item >= self.items as usize || slice >= level.depth as usize {
            return None;
        }
        Some(item * self.item_size + level.offset + slice * level.slice_pitch)
    }

    /// Every subresource in storage order as `(mip, item, slice, offset)`.
    pub fn subresources(&self) -> impl Iterator<Item = (usize, usize, usize, usize)> + '_ {
        (0..self.items as usize).flat_map(move |item| {
            self.levels.iter().enumerate().flat_map(move |(mip, level)| {
                (0..level.depth as usize).map(move |slice| {
                    let offset = item * self.item_size + level.offset + slice * level.slice_pitch;
                    (mip, item, slice, offset)
                })
            })
        })
    }
}
