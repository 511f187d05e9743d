//! Hand-built DDS fixtures for tests.

use zerocopy::IntoBytes;

use crate::header::{
    Caps, Caps2, DdsHeader, DdsHeaderDxt10, DdsPixelFormat, FourCC, HeaderFlags, ResourceDimension,
};
use crate::{DxgiFormat, DDS_MAGIC};

/// A legacy header for a single 2D image.
pub fn header(width: u32, height: u32, pixel_format: DdsPixelFormat) -> DdsHeader {
    let mut header = DdsHeader::empty();
    header.flags = HeaderFlags::TEXTURE.bits();
    header.width = width;
    header.height = height;
    header.depth = 1;
    header.mipmap_count = 1;
    header.pixel_format = pixel_format;
    header.caps = Caps::TEXTURE.bits();
    header
}

/// A header announcing the extended header.
pub fn dx10_header(width: u32, height: u32) -> DdsHeader {
    header(width, height, DdsPixelFormat::four_cc(FourCC::DX10))
}

/// An extended header for a 2D texture.
pub fn dx10(format: DxgiFormat, array_size: u32) -> DdsHeaderDxt10 {
    DdsHeaderDxt10 {
        dxgi_format: format.0,
        resource_dimension: ResourceDimension::Texture2D as u32,
        misc_flag: 0,
        array_size,
        misc_flags2: 0,
    }
}

/// Turn a header into a cube map declaring the given faces.
pub fn make_cube(header: &mut DdsHeader, faces: Caps2) {
    header.caps |= Caps::COMPLEX.bits();
    header.caps2 = (Caps2::CUBEMAP | faces).bits();
}

/// Serialize headers and payload into a file image.
pub fn build(header: &DdsHeader, dx10: Option<&DdsHeaderDxt10>, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(DDS_MAGIC);
    out.extend_from_slice(header.as_bytes());
    if let Some(ext) = dx10 {
        out.extend_from_slice(ext.as_bytes());
    }
    out.extend_from_slice(payload);
    out
}

/// Deterministic non-trivial payload bytes.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 + 7) as u8).collect()
}
