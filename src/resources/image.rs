use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

// Global Image ID generator (uses u64 for cheap identity comparisons)
static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Decoded pixel data shared by every texture that samples it.
///
/// Cloning an `Image` clones the handle, not the pixels.
#[derive(Debug, Clone)]
pub struct Image {
    id: u64,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    data: Arc<Vec<u8>>,
}

impl Image {
    #[must_use]
    pub fn new(width: u32, height: u32, format: wgpu::TextureFormat, data: Vec<u8>) -> Self {
        Self {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            format,
            data: Arc::new(data),
        }
    }

    /// 1x1 image of a single RGBA8 color.
    #[must_use]
    pub fn solid(color: [u8; 4], format: wgpu::TextureFormat) -> Self {
        Self::new(1, 1, format, color.to_vec())
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Image {}
