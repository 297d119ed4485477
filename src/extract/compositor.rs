// Line compositing: per-image regions -> one horizontal ink strip

use image::RgbaImage;
use tracing::debug;

use super::{CompositeStrip, LineRegion, StripPlacement};

/// Order one image's regions top to bottom and drop its page outline.
///
/// The outline is taken to be the single region with the largest area. When
/// the image produced fewer than two regions nothing is dropped. Ties on `y`
/// keep detection order, and ties on area drop the topmost candidate.
pub fn retain_text_lines(mut regions: Vec<LineRegion>) -> Vec<LineRegion> {
    regions.sort_by_key(|r| r.bbox.y);

    if regions.len() < 2 {
        return regions;
    }

    let mut largest = 0;
    for (i, region) in regions.iter().enumerate().skip(1) {
        if region.bbox.area() > regions[largest].bbox.area() {
            largest = i;
        }
    }
    let outline = regions.remove(largest);
    debug!(
        source_index = outline.source_index,
        width = outline.bbox.width,
        height = outline.bbox.height,
        "dropped page outline region"
    );
    regions
}

/// Blit every retained region left to right at `y = 0`.
///
/// `per_image` is in upload order; each entry holds one image's regions as
/// returned by the segmenter. Returns `None` when no region survives, which
/// callers must surface as "no extractable handwriting".
pub fn compose_strip(per_image: Vec<Vec<LineRegion>>) -> Option<CompositeStrip> {
    let lines: Vec<LineRegion> = per_image
        .into_iter()
        .flat_map(retain_text_lines)
        .collect();

    if lines.is_empty() {
        return None;
    }

    let total_width: u32 = lines.iter().map(|l| l.bbox.width).sum();
    let max_height = lines.iter().map(|l| l.bbox.height).max().unwrap_or(0);
    if total_width == 0 || max_height == 0 {
        return None;
    }

    // New buffers are zeroed, i.e. fully transparent.
    let mut image = RgbaImage::new(total_width, max_height);
    let mut placements = Vec::with_capacity(lines.len());
    let mut offset = 0u32;
    for line in lines {
        image::imageops::replace(&mut image, &line.masked_pixels, offset as i64, 0);
        placements.push(StripPlacement {
            source_index: line.source_index,
            bbox: line.bbox,
            x_offset: offset,
        });
        offset += line.bbox.width;
    }

    debug!(
        width = total_width,
        height = max_height,
        lines = placements.len(),
        "composed ink strip"
    );
    Some(CompositeStrip { image, placements })
}
