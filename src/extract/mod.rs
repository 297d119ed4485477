pub mod compositor;
pub mod filters;
pub mod png;
pub mod segmenter;

use image::RgbaImage;
use serde::Serialize;

/// Axis-aligned box in working-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// One detected line of handwriting, cut out on a transparent background.
///
/// `masked_pixels` always has the same dimensions as `bbox`.
#[derive(Debug, Clone)]
pub struct LineRegion {
    pub source_index: usize,
    pub bbox: BoundingBox,
    pub masked_pixels: RgbaImage,
}

/// Where one region landed inside the composite strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StripPlacement {
    pub source_index: usize,
    pub bbox: BoundingBox,
    pub x_offset: u32,
}

/// The horizontal "ink" strip: every retained line, left to right.
#[derive(Debug, Clone)]
pub struct CompositeStrip {
    pub image: RgbaImage,
    pub placements: Vec<StripPlacement>,
}

impl CompositeStrip {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
