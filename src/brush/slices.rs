use std::sync::Arc;

use image::RgbaImage;

/// Default width of one ribbon slice in pixels.
pub const DEFAULT_SLICE_WIDTH: u32 = 20;

/// One vertical cut of the strip, shared with every fragment that paints it.
#[derive(Debug, Clone)]
pub struct Slice {
    pub index: usize,
    pub image: Arc<RgbaImage>,
}

/// Fixed-width vertical slices of an image plus a replay cursor.
///
/// The slices never change after [`build`](Self::build). The cursor only moves
/// forward and is read modulo the slice count, so the ink replays instead of
/// running out.
#[derive(Debug, Clone)]
pub struct SliceSet {
    slices: Vec<Arc<RgbaImage>>,
    slice_width: u32,
    cursor: usize,
}

impl SliceSet {
    /// Cut `image` into `ceil(width / slice_width)` slices; only the last one
    /// may be narrower. An image without pixels gives an empty set.
    pub fn build(image: &RgbaImage, slice_width: u32) -> Self {
        let slice_width = slice_width.max(1);
        let (width, height) = image.dimensions();

        let mut slices = Vec::new();
        if height > 0 {
            let mut x = 0;
            while x < width {
                let w = slice_width.min(width - x);
                let slice = image::imageops::crop_imm(image, x, 0, w, height).to_image();
                slices.push(Arc::new(slice));
                x += slice_width;
            }
        }

        SliceSet {
            slices,
            slice_width,
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn slice_width(&self) -> u32 {
        self.slice_width
    }

    /// Total number of slices handed out so far (not wrapped).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn get(&self, index: usize) -> Option<&Arc<RgbaImage>> {
        self.slices.get(index)
    }

    /// Hand out the slice under the cursor and advance.
    ///
    /// With zero slices this is a no-op returning `None`.
    pub fn next(&mut self) -> Option<Slice> {
        if self.slices.is_empty() {
            return None;
        }
        let index = self.cursor % self.slices.len();
        self.cursor += 1;
        Some(Slice {
            index,
            image: Arc::clone(&self.slices[index]),
        })
    }

    /// Position within the current lap, `round(100 * (cursor % len) / len)`.
    pub fn progress(&self) -> u8 {
        if self.slices.is_empty() {
            return 0;
        }
        let len = self.slices.len();
        let lap = (self.cursor % len) as f64;
        (100.0 * lap / len as f64).round() as u8
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}
