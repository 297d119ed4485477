// Line extraction: segmenter, compositor and the whole multi-image run.
//
// Page photographs are drawn in memory: white paper, one large dark block
// standing in for the page outline, and thin dark bars standing in for
// lines of handwriting.

use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};

use inkstrip::config::settings::SegmenterSettings;
use inkstrip::extract::compositor::{compose_strip, retain_text_lines};
use inkstrip::extract::png::{decode_rgba, encode_png};
use inkstrip::extract::segmenter::{detect_line_boxes, segment_lines};
use inkstrip::extract::{BoundingBox, LineRegion};
use inkstrip::pipeline::orchestrator::{Extraction, ImageStatus, run_extraction};
use inkstrip::pipeline::page_processor::{ExtractionConfig, PageSource};

// ============================================================
// Helpers
// ============================================================

fn fill(img: &mut GrayImage, x: u32, y: u32, w: u32, h: u32) {
    for yy in y..y + h {
        for xx in x..x + w {
            img.put_pixel(xx, yy, Luma([0]));
        }
    }
}

/// 400x300 page: two bars of `line_width` at y=40 and y=90 and an outline
/// block below them that does not enclose them.
fn synthetic_page(line_width: u32) -> DynamicImage {
    let mut img = GrayImage::from_pixel(400, 300, Luma([255]));
    fill(&mut img, 40, 40, line_width, 4);
    fill(&mut img, 40, 90, line_width, 4);
    fill(&mut img, 30, 150, 340, 120);
    DynamicImage::ImageLuma8(img)
}

fn blank_page() -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(200, 150, Luma([255])))
}

fn region(source_index: usize, x: u32, y: u32, width: u32, height: u32) -> LineRegion {
    LineRegion {
        source_index,
        bbox: BoundingBox {
            x,
            y,
            width,
            height,
        },
        masked_pixels: RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])),
    }
}

// ============================================================
// 1. Segmenter
// ============================================================

#[test]
fn test_detect_finds_lines_and_outline() {
    let gray = synthetic_page(200).to_luma8();
    let boxes = detect_line_boxes(&gray, &SegmenterSettings::default(), &mut |_| {});

    assert_eq!(boxes.len(), 3, "two lines plus the outline: {boxes:?}");
    for b in &boxes {
        assert!(b.width >= 10 && b.height >= 5, "undersized box {b:?}");
    }
    let largest = boxes.iter().max_by_key(|b| b.area()).unwrap();
    assert!(largest.y >= 140, "outline should be the bottom block: {largest:?}");
}

#[test]
fn test_blank_page_has_no_regions() {
    let regions = segment_lines(&blank_page(), 0, &SegmenterSettings::default(), &mut |_| {});
    assert!(regions.is_empty());
}

#[test]
fn test_tiny_specks_are_filtered_out() {
    let mut img = GrayImage::from_pixel(120, 80, Luma([255]));
    fill(&mut img, 60, 40, 1, 1);
    let boxes = detect_line_boxes(&img, &SegmenterSettings::default(), &mut |_| {});
    assert!(boxes.is_empty(), "{boxes:?}");
}

#[test]
fn test_masks_match_boxes_and_are_white_on_transparent() {
    let regions = segment_lines(&synthetic_page(200), 3, &SegmenterSettings::default(), &mut |_| {});
    assert!(!regions.is_empty());

    for r in &regions {
        assert_eq!(r.source_index, 3);
        assert_eq!(r.masked_pixels.width(), r.bbox.width);
        assert_eq!(r.masked_pixels.height(), r.bbox.height);
        // Colour and alpha carry the same inverted mask value.
        assert!(r.masked_pixels.pixels().all(|p| p[0] == p[3] && p[1] == p[3] && p[2] == p[3]));
    }
    let line = regions.iter().min_by_key(|r| r.bbox.y).unwrap();
    assert!(line.masked_pixels.pixels().any(|p| p[3] == 255), "no ink in mask");
    assert!(line.masked_pixels.pixels().any(|p| p[3] == 0), "no background in mask");
}

#[test]
fn test_segment_reports_every_stage_in_order() {
    let mut seen = Vec::new();
    segment_lines(&synthetic_page(120), 0, &SegmenterSettings::default(), &mut |s| {
        seen.push(s.percent())
    });
    assert_eq!(seen, vec![30, 40, 50, 70, 80, 100]);
}

// ============================================================
// 2. Compositor
// ============================================================

#[test]
fn test_retain_sorts_by_y_and_drops_largest() {
    let regions = vec![
        region(0, 0, 50, 40, 10),
        region(0, 0, 5, 300, 200), // outline
        region(0, 0, 20, 60, 8),
    ];
    let kept = retain_text_lines(regions);
    let ys: Vec<u32> = kept.iter().map(|r| r.bbox.y).collect();
    assert_eq!(ys, vec![20, 50]);
}

#[test]
fn test_retain_single_region_is_noop() {
    let kept = retain_text_lines(vec![region(0, 0, 0, 500, 100)]);
    assert_eq!(kept.len(), 1);
    assert!(retain_text_lines(Vec::new()).is_empty());
}

#[test]
fn test_compose_strip_dimensions_and_order() {
    let per_image = vec![
        vec![
            region(0, 0, 30, 50, 12),
            region(0, 0, 0, 400, 300),
            region(0, 0, 10, 20, 7),
        ],
        vec![region(1, 0, 0, 35, 9)],
    ];
    let strip = compose_strip(per_image).expect("some lines survive");

    assert_eq!(strip.width(), 20 + 50 + 35);
    assert_eq!(strip.height(), 12);
    let order: Vec<(usize, u32, u32)> = strip
        .placements
        .iter()
        .map(|p| (p.source_index, p.bbox.y, p.x_offset))
        .collect();
    assert_eq!(order, vec![(0, 10, 0), (0, 30, 20), (1, 0, 70)]);

    // Below a short region the canvas stays transparent.
    assert_eq!(strip.image.get_pixel(5, 10)[3], 0);
    assert_eq!(strip.image.get_pixel(5, 3)[3], 255);
}

#[test]
fn test_compose_strip_empty_is_none() {
    assert!(compose_strip(Vec::new()).is_none());
    // One outline-only image keeps its single region.
    assert!(compose_strip(vec![vec![region(0, 0, 0, 40, 40)]]).is_some());
    assert!(compose_strip(vec![Vec::new(), Vec::new()]).is_none());
}

// ============================================================
// 3. Whole run
// ============================================================

#[test]
fn test_two_pages_give_four_lines_in_upload_order() {
    let pages = vec![
        PageSource::Decoded(synthetic_page(200)),
        PageSource::Decoded(synthetic_page(120)),
    ];
    let run = run_extraction(pages, &ExtractionConfig::default(), &mut |_| {});

    let strip = run.strip().expect("ink expected");
    let sources: Vec<usize> = strip.placements.iter().map(|p| p.source_index).collect();
    assert_eq!(sources, vec![0, 0, 1, 1]);

    for pair in strip.placements.chunks(2) {
        assert!(pair[0].bbox.y < pair[1].bbox.y);
    }
    let total: u32 = strip.placements.iter().map(|p| p.bbox.width).sum();
    let tallest = strip.placements.iter().map(|p| p.bbox.height).max().unwrap();
    assert_eq!(strip.width(), total);
    assert_eq!(strip.height(), tallest);

    // Each page's lines are wider on the first page.
    assert!(strip.placements[0].bbox.width > strip.placements[2].bbox.width);

    for report in &run.images {
        assert_eq!(
            report.status,
            ImageStatus::Processed {
                detected: 3,
                retained: 2
            }
        );
    }
}

#[test]
fn test_progress_is_monotonic_and_ends_at_100() {
    let pages = vec![
        PageSource::Decoded(synthetic_page(200)),
        PageSource::Decoded(blank_page()),
    ];
    let mut seen = Vec::new();
    run_extraction(pages, &ExtractionConfig::default(), &mut |p| seen.push(p));

    assert_eq!(seen.first(), Some(&0));
    assert_eq!(seen.last(), Some(&100));
    assert!(seen.windows(2).all(|w| w[0] < w[1]), "{seen:?}");
    assert_eq!(seen.iter().filter(|&&p| p == 100).count(), 1);
}

#[test]
fn test_undecodable_page_is_skipped() {
    let pages = vec![
        PageSource::Encoded(b"not an image".to_vec()),
        PageSource::Decoded(synthetic_page(200)),
    ];
    let run = run_extraction(pages, &ExtractionConfig::default(), &mut |_| {});

    assert_eq!(run.skipped().count(), 1);
    assert!(matches!(run.images[0].status, ImageStatus::Skipped { .. }));
    let strip = run.strip().expect("second page still contributes");
    assert!(strip.placements.iter().all(|p| p.source_index == 1));
}

#[test]
fn test_missing_file_is_skipped_not_fatal() {
    let pages = vec![PageSource::Path("/nonexistent/page.png".into())];
    let run = run_extraction(pages, &ExtractionConfig::default(), &mut |_| {});
    assert!(matches!(run.outcome, Extraction::NoHandwriting));
    assert_eq!(run.skipped().count(), 1);
}

#[test]
fn test_blank_pages_report_no_handwriting() {
    let pages = vec![PageSource::Decoded(blank_page())];
    let run = run_extraction(pages, &ExtractionConfig::default(), &mut |_| {});
    assert!(matches!(run.outcome, Extraction::NoHandwriting));
    assert!(run.strip().is_none());
    assert_eq!(
        run.images[0].status,
        ImageStatus::Processed {
            detected: 0,
            retained: 0
        }
    );
}

#[test]
fn test_large_page_is_processed_at_working_size() {
    // 1100x600 scales by exactly one half to 550x300.
    let mut img = GrayImage::from_pixel(1100, 600, Luma([255]));
    fill(&mut img, 80, 80, 400, 8);
    fill(&mut img, 80, 180, 400, 8);
    fill(&mut img, 60, 300, 700, 240);
    let run = run_extraction(
        vec![PageSource::Decoded(DynamicImage::ImageLuma8(img))],
        &ExtractionConfig::default(),
        &mut |_| {},
    );

    let strip = run.strip().expect("ink expected");
    for p in &strip.placements {
        assert!(p.bbox.x + p.bbox.width <= 550);
        assert!(p.bbox.y + p.bbox.height <= 300);
    }
}

#[test]
fn test_report_json_lists_images_and_strip() {
    let pages = vec![
        PageSource::Encoded(Vec::new()),
        PageSource::Decoded(synthetic_page(200)),
    ];
    let run = run_extraction(pages, &ExtractionConfig::default(), &mut |_| {});
    let json: serde_json::Value = serde_json::from_str(&run.to_json().unwrap()).unwrap();

    assert_eq!(json["images"][0]["status"], "skipped");
    assert_eq!(json["images"][1]["status"], "processed");
    assert_eq!(json["images"][1]["retained"], 2);
    assert_eq!(json["strip"]["placements"].as_array().unwrap().len(), 2);
}

#[test]
fn test_strip_png_keeps_alpha() {
    let run = run_extraction(
        vec![PageSource::Decoded(synthetic_page(200))],
        &ExtractionConfig::default(),
        &mut |_| {},
    );
    let strip = run.into_strip().expect("ink expected");
    let decoded = decode_rgba(&encode_png(&strip.image).unwrap()).unwrap();
    assert_eq!(decoded, strip.image);
}
