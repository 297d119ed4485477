// Line segmentation: page photograph -> bounding boxes -> masked line cut-outs

use image::{DynamicImage, GrayImage, Rgba, RgbaImage};
use imageproc::contours::{BorderType, Contour, find_contours};
use tracing::debug;

use super::filters::{Polarity, adaptive_threshold, dilate_rect, gaussian_smooth, median_blur};
use super::{BoundingBox, LineRegion};
use crate::config::settings::SegmenterSettings;

/// Checkpoints reached while segmenting one image, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SegmentStage {
    Grayscale,
    MedianBlur,
    DetectThreshold,
    Dilate,
    Contours,
    Masks,
}

impl SegmentStage {
    /// Share of one image's work done once this stage has finished (0-100).
    pub fn percent(self) -> u8 {
        match self {
            SegmentStage::Grayscale => 30,
            SegmentStage::MedianBlur => 40,
            SegmentStage::DetectThreshold => 50,
            SegmentStage::Dilate => 70,
            SegmentStage::Contours => 80,
            SegmentStage::Masks => 100,
        }
    }
}

/// Segment one working-resolution image into masked line regions.
///
/// Regions are returned in contour detection order. An image without any ink
/// yields an empty vector, which is not an error.
pub fn segment_lines(
    image: &DynamicImage,
    source_index: usize,
    settings: &SegmenterSettings,
    on_stage: &mut dyn FnMut(SegmentStage),
) -> Vec<LineRegion> {
    let gray = image.to_luma8();
    on_stage(SegmentStage::Grayscale);

    let boxes = detect_line_boxes(&gray, settings, on_stage);

    let regions: Vec<LineRegion> = boxes
        .into_iter()
        .map(|bbox| LineRegion {
            source_index,
            bbox,
            masked_pixels: extract_line_mask(&gray, bbox, settings),
        })
        .collect();
    on_stage(SegmentStage::Masks);

    debug!(
        source_index,
        regions = regions.len(),
        width = gray.width(),
        height = gray.height(),
        "segmented image"
    );
    regions
}

/// Find bounding boxes of probable text lines in a grayscale image.
///
/// Boxes smaller than `min_width x min_height` are discarded.
pub fn detect_line_boxes(
    gray: &GrayImage,
    settings: &SegmenterSettings,
    on_stage: &mut dyn FnMut(SegmentStage),
) -> Vec<BoundingBox> {
    let blurred = median_blur(gray, settings.median_kernel);
    on_stage(SegmentStage::MedianBlur);

    let binary = adaptive_threshold(
        &blurred,
        settings.detect_block_size,
        settings.detect_c,
        Polarity::Inverse,
    );
    on_stage(SegmentStage::DetectThreshold);

    let dilated = dilate_rect(
        &binary,
        settings.dilate_width,
        settings.dilate_height,
        settings.dilate_iterations,
    );
    on_stage(SegmentStage::Dilate);

    let contours: Vec<Contour<u32>> = find_contours(&dilated);
    let boxes: Vec<BoundingBox> = contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(bounding_rect)
        .filter(|b| b.width >= settings.min_width && b.height >= settings.min_height)
        .collect();
    on_stage(SegmentStage::Contours);

    boxes
}

fn bounding_rect(contour: &Contour<u32>) -> Option<BoundingBox> {
    let first = contour.points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &contour.points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(BoundingBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Cut the box out of the grayscale source and turn it into white strokes on
/// transparency.
///
/// The crop is smoothed lightly and re-thresholded with a finer neighbourhood
/// than line detection uses, so individual pen strokes survive.
pub fn extract_line_mask(
    gray: &GrayImage,
    bbox: BoundingBox,
    settings: &SegmenterSettings,
) -> RgbaImage {
    let roi = image::imageops::crop_imm(gray, bbox.x, bbox.y, bbox.width, bbox.height).to_image();
    let smoothed = gaussian_smooth(&roi, settings.mask_blur_kernel);
    let mask = adaptive_threshold(
        &smoothed,
        settings.mask_block_size,
        settings.mask_c,
        Polarity::Normal,
    );

    // Ink is dark (0) in the mask; invert it into colour and alpha alike.
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        let ink = 255 - mask.get_pixel(x, y)[0];
        Rgba([ink, ink, ink, ink])
    })
}
