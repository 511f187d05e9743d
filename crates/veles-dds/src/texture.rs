//! Materialized textures.
//!
//! A [`Texture`] owns (or borrows) one contiguous backing buffer and hands
//! out views of its subresources by offset and length.

use std::borrow::Cow;

use crate::layout::{PitchMode, TextureLayout};
use crate::header::DdsPixelFormat;
use crate::{DxgiFormat, Error, HeaderKind, Result, TexMetadata};

/// Location and geometry of one image inside the backing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subresource {
    pub mip: u32,
    pub item: u32,
    pub slice: u32,
    pub width: u32,
    pub height: u32,
    pub row_pitch: usize,
    pub slice_pitch: usize,
    pub format: DxgiFormat,
    pub offset: usize,
    pub len: usize,
}

/// A subresource together with its bytes.
#[derive(Debug, Clone, Copy)]
pub struct SubresourceView<'t> {
    pub info: Subresource,
    pub data: &'t [u8],
}

impl<'t> SubresourceView<'t> {
    /// Rows of the image. For block-compressed formats a row is a row of
    /// blocks.
    pub fn rows(&self) -> impl Iterator<Item = &'t [u8]> {
        self.data.chunks(self.info.row_pitch.max(1))
    }
}

/// A decoded or freshly allocated texture.
#[derive(Debug, Clone)]
pub struct Texture<'a> {
    metadata: TexMetadata,
    layout: TextureLayout,
    subresources: Vec<Subresource>,
    data: Cow<'a, [u8]>,
    header_kind: Option<HeaderKind>,
    source_pixel_format: Option<DdsPixelFormat>,
}

impl Texture<'static> {
    /// Allocate a zero-filled texture.
    pub fn new(metadata: TexMetadata) -> Result<Self> {
        let layout = TextureLayout::new(&metadata, PitchMode::default())?;
        let data = vec![0u8; layout.total_size()];
        Ok(Self::assemble(metadata, layout, Cow::Owned(data), None))
    }

    /// Adopt an owned buffer holding every subresource in storage order.
    pub fn from_vec(metadata: TexMetadata, data: Vec<u8>) -> Result<Self> {
        Self::from_cow(metadata, Cow::Owned(data), None)
    }
}

impl<'a> Texture<'a> {
    /// Borrow a buffer holding every subresource in storage order.
    pub fn from_slice(metadata: TexMetadata, data: &'a [u8]) -> Result<Self> {
        Self::from_cow(metadata, Cow::Borrowed(data), None)
    }

    pub(crate) fn from_cow(
        metadata: TexMetadata,
        data: Cow<'a, [u8]>,
        header_kind: Option<HeaderKind>,
    ) -> Result<Self> {
        let layout = TextureLayout::new(&metadata, PitchMode::default())?;
        if data.len() < layout.total_size() {
            return Err(Error::BufferTooSmall {
                needed: layout.total_size(),
                available: data.len(),
            });
        }
        Ok(Self::assemble(metadata, layout, data, header_kind))
    }

    fn assemble(
        metadata: TexMetadata,
        layout: TextureLayout,
        data: Cow<'a, [u8]>,
        header_kind: Option<HeaderKind>,
    ) -> Self {
        let subresources = layout
            .subresources()
            .map(|(mip, item, slice, offset)| {
                let level = &layout.levels()[mip];
                log::trace!("subresource mip {mip} item {item} slice {slice} at {offset:#x}");
                Subresource {
                    mip: mip as u32,
                    item: item as u32,
                    slice: slice as u32,
                    width: level.width,
                    height: level.height,
                    row_pitch: level.row_pitch,
                    slice_pitch: level.slice_pitch,
                    format: metadata.format,
                    offset,
                    len: level.slice_pitch,
                }
            })
            .collect();

        Self {
            metadata,
            layout,
            subresources,
            data,
            header_kind,
            source_pixel_format: None,
        }
    }

    /// Remember the legacy pixel format the pixels were read with unchanged.
    pub(crate) fn with_source_pixel_format(mut self, pixel_format: Option<DdsPixelFormat>) -> Self {
        self.source_pixel_format = pixel_format;
        self
    }

    #[inline]
    pub fn metadata(&self) -> &TexMetadata {
        &self.metadata
    }

    #[inline]
    pub fn layout(&self) -> &TextureLayout {
        &self.layout
    }

    /// Header kind the texture was decoded from, if it came from a file.
    #[inline]
    pub fn header_kind(&self) -> Option<HeaderKind> {
        self.header_kind
    }

    /// Legacy pixel format of the file the texture was decoded from.
    ///
    /// Only set when the pixels are exactly the stored bytes, so writing it
    /// back reproduces the original header.
    #[inline]
    pub fn source_pixel_format(&self) -> Option<DdsPixelFormat> {
        self.source_pixel_format
    }

    /// Every subresource in storage order.
    #[inline]
    pub fn subresources(&self) -> &[Subresource] {
        &self.subresources
    }

    /// All pixel data in storage order.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.data[..self.layout.total_size()]
    }

    /// Whether the pixel data is borrowed from the decoded input.
    #[inline]
    pub fn is_borrowed(&self) -> bool {
        matches!(self.data, Cow::Borrowed(_))
    }

    /// Look up one image.
    ///
    /// `slice` is the depth slice for volume textures and must be zero
    /// otherwise.
    pub fn image(&self, mip: usize, item: usize, slice: usize) -> Option<SubresourceView<'_>> {
        let info = *self.subresources.get(self.layout.index(mip, item, slice)?)?;
        Some(SubresourceView {
            info,
            data: &self.data[info.offset..info.offset + info.len],
        })
    }

    /// Mutable bytes of one image.
    ///
    /// A borrowed texture copies its data into owned storage first.
    pub fn image_mut(&mut self, mip: usize, item: usize, slice: usize) -> Option<&mut [u8]> {
        let info = *self.subresources.get(self.layout.index(mip, item, slice)?)?;
        Some(&mut self.data.to_mut()[info.offset..info.offset + info.len])
    }

    /// Detach from the decoded input.
    pub fn into_owned(self) -> Texture<'static> {
        Texture {
            metadata: self.metadata,
            layout: self.layout,
            subresources: self.subresources,
            data: Cow::Owned(self.data.into_owned()),
            header_kind: self.header_kind,
            source_pixel_format: self.source_pixel_format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TexDimension;

    #[test]
    fn test_zero_filled_allocation() {
        let mut meta = TexMetadata::new_2d(16, 16, DxgiFormat::BC1_UNORM);
        meta.mip_levels = 4;
        meta.array_size = 2;
        let texture = Texture::new(meta).unwrap();

        assert_eq!(texture.pixels().len(), 352);
        assert!(texture.pixels().iter().all(|&b| b == 0));
        assert!(!texture.is_borrowed());
        assert_eq!(texture.subresources().len(), 8);

        let offsets: Vec<_> = texture.subresources().iter().map(|s| s.offset).collect();
        assert_eq!(offsets, [0, 128, 160, 168, 176, 304, 336, 344]);
    }

    #[test]
    fn test_buffer_too_small() {
        let meta = TexMetadata::new_2d(4, 4, DxgiFormat::R8G8B8A8_UNORM);
        let err = Texture::from_vec(meta, vec![0; 63]).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { needed: 64, available: 63 }));
    }

    #[test]
    fn test_borrowed_views() {
        let mut meta = TexMetadata::new_2d(2, 2, DxgiFormat::R8_UNORM);
        meta.mip_levels = 2;
        let data = [1, 2, 3, 4, 5];
        let texture = Texture::from_slice(meta, &data).unwrap();
        assert!(texture.is_borrowed());

        let top = texture.image(0, 0, 0).unwrap();
        assert_eq!(top.data, &[1, 2, 3, 4]);
        assert_eq!(top.rows().collect::<Vec<_>>(), [&[1u8, 2][..], &[3, 4][..]]);
        assert_eq!(texture.image(1, 0, 0).unwrap().data, &[5]);
        assert!(texture.image(2, 0, 0).is_none());
        assert!(texture.image(0, 1, 0).is_none());
    }

    #[test]
    fn test_image_mut_detaches() {
        let meta = TexMetadata::new_2d(2, 1, DxgiFormat::R8_UNORM);
        let data = [7, 8];
        let mut texture = Texture::from_slice(meta, &data).unwrap();
        texture.image_mut(0, 0, 0).unwrap()[0] = 9;
        assert!(!texture.is_borrowed());
        assert_eq!(texture.pixels(), &[9, 8]);
        assert_eq!(data, [7, 8]);
    }

    #[test]
    fn test_volume_slices() {
        let mut meta = TexMetadata::new_2d(2, 2, DxgiFormat::R8_UNORM);
        meta.dimension = TexDimension::Texture3D;
        meta.depth = 2;
        meta.mip_levels = 2;
        let data: Vec<u8> = (0..9).collect();
        let texture = Texture::from_vec(meta, data).unwrap().into_owned();

        assert_eq!(texture.subresources().len(), 3);
        assert_eq!(texture.image(0, 0, 1).unwrap().data, &[4, 5, 6, 7]);
        assert_eq!(texture.image(1, 0, 0).unwrap().data, &[8]);
        assert!(texture.image(1, 0, 1).is_none());
    }
}
