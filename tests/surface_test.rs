// Drawing surface: pointer dispatch, mode gating, sources and export

use std::f32::consts::FRAC_PI_2;

use image::{Rgba, RgbaImage};

use inkstrip::brush::BrushMode;
use inkstrip::brush::path::Point;
use inkstrip::config::settings::HexColor;
use inkstrip::error::InkError;
use inkstrip::extract::png::{decode_rgba, encode_png};
use inkstrip::render::fragment::Fragment;
use inkstrip::render::surface::{DrawingSurface, SurfaceConfig};

// ============================================================
// Helpers
// ============================================================

fn surface(width: u32, height: u32) -> DrawingSurface {
    DrawingSurface::new(SurfaceConfig {
        width,
        height,
        ..SurfaceConfig::default()
    })
}

fn white_strip(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
}

fn stroke(s: &mut DrawingSurface, points: &[(f32, f32)]) -> Vec<Option<u8>> {
    let (first, rest) = points.split_first().expect("at least one point");
    s.pointer_down(Point::new(first.0, first.1));
    let progress = rest
        .iter()
        .map(|&(x, y)| s.pointer_move(Point::new(x, y)))
        .collect();
    s.pointer_up();
    progress
}

fn slice_angles(s: &DrawingSurface) -> Vec<f32> {
    s.fragments()
        .iter()
        .filter_map(Fragment::as_slice)
        .map(|f| f.angle)
        .collect()
}

// ============================================================
// 1. Ribbon mode
// ============================================================

#[test]
fn test_ribbon_angles_follow_the_path() {
    let mut s = surface(100, 100);
    s.load_strip(&white_strip(60, 10));
    assert!(s.set_mode(BrushMode::Ribbon));

    stroke(&mut s, &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
    assert_eq!(slice_angles(&s), vec![0.0, 0.0]);

    s.clear();
    stroke(&mut s, &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
    let angles = slice_angles(&s);
    assert_eq!(angles.len(), 2);
    assert_eq!(angles[0], 0.0);
    assert!((angles[1] - FRAC_PI_2).abs() < 1e-6);
}

#[test]
fn test_ribbon_progress_cycles_per_lap() {
    let mut s = surface(100, 100);
    s.load_strip(&white_strip(60, 10)); // three slices
    s.set_mode(BrushMode::Ribbon);

    let progress = stroke(
        &mut s,
        &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)],
    );
    assert_eq!(progress, vec![Some(33), Some(67), Some(0), Some(33)]);
    assert_eq!(s.consumption_progress(), 33);
}

#[test]
fn test_fragments_persist_after_pointer_up() {
    let mut s = surface(100, 100);
    s.load_strip(&white_strip(40, 10));
    s.set_mode(BrushMode::Ribbon);
    stroke(&mut s, &[(0.0, 0.0), (5.0, 5.0), (9.0, 9.0)]);
    stroke(&mut s, &[(50.0, 50.0), (60.0, 50.0)]);
    assert_eq!(s.fragments().len(), 3);
}

#[test]
fn test_move_without_down_is_ignored() {
    let mut s = surface(100, 100);
    s.load_strip(&white_strip(40, 10));
    s.set_mode(BrushMode::Ribbon);
    assert_eq!(s.pointer_move(Point::new(3.0, 3.0)), None);
    assert!(s.fragments().is_empty());
    assert_eq!(s.slice_set().unwrap().cursor(), 0);
}

// ============================================================
// 2. Mode gating
// ============================================================

#[test]
fn test_ribbon_unavailable_without_strip() {
    let mut s = surface(100, 100);
    assert!(!s.is_mode_available(BrushMode::Ribbon));
    assert!(!s.set_mode(BrushMode::Ribbon));
    assert_eq!(s.mode(), BrushMode::Pencil);

    // An empty strip does not arm the ribbon either.
    s.load_strip(&RgbaImage::new(0, 0));
    assert!(!s.is_mode_available(BrushMode::Ribbon));

    assert!(s.set_mode(BrushMode::Text));
    assert_eq!(s.mode(), BrushMode::Text);
}

#[test]
fn test_undecodable_strip_png_keeps_ribbon_disabled() {
    let mut s = surface(100, 100);
    let result = s.load_strip_png(b"not a png");
    assert!(matches!(result, Err(InkError::DecodeError(_))));
    assert!(!s.is_mode_available(BrushMode::Ribbon));
}

#[test]
fn test_strip_png_arms_ribbon() {
    let mut s = surface(100, 100);
    let png = encode_png(&white_strip(45, 6)).unwrap();
    assert!(s.load_strip_png(&png).unwrap());
    assert!(s.set_mode(BrushMode::Ribbon));
    assert_eq!(s.slice_set().unwrap().len(), 3);
}

#[test]
fn test_default_mode_prefers_ribbon_then_text() {
    let mut s = surface(100, 100);
    assert_eq!(s.select_default_mode(), BrushMode::Pencil);

    s.set_text("Some words.");
    assert_eq!(s.select_default_mode(), BrushMode::Text);

    s.load_strip(&white_strip(20, 5));
    assert_eq!(s.select_default_mode(), BrushMode::Ribbon);
}

#[test]
fn test_unloading_strip_leaves_ribbon_mode() {
    let mut s = surface(100, 100);
    s.set_text("Fallback.");
    s.load_strip(&white_strip(20, 5));
    s.set_mode(BrushMode::Ribbon);

    s.unload_strip();
    assert_eq!(s.mode(), BrushMode::Text);
    assert!(!s.is_mode_available(BrushMode::Ribbon));
}

#[test]
fn test_mode_switch_is_not_retroactive() {
    let mut s = surface(100, 100);
    s.set_text("Later.");
    stroke(&mut s, &[(0.0, 0.0), (10.0, 10.0)]);
    s.set_mode(BrushMode::Text);
    stroke(&mut s, &[(0.0, 50.0), (60.0, 50.0)]);

    assert!(s.fragments()[0].as_stroke().is_some());
    assert!(s.fragments()[1].as_text().is_some());
}

#[test]
fn test_mode_is_latched_at_pointer_down() {
    let mut s = surface(100, 100);
    s.load_strip(&white_strip(40, 10));

    s.pointer_down(Point::new(0.0, 0.0));
    s.set_mode(BrushMode::Ribbon);
    assert_eq!(s.pointer_move(Point::new(10.0, 0.0)), None);
    s.pointer_up();

    assert_eq!(s.fragments().len(), 1);
    assert!(s.fragments()[0].as_stroke().is_some());

    // The next stroke uses the new mode.
    stroke(&mut s, &[(0.0, 0.0), (10.0, 0.0)]);
    assert!(s.fragments()[1].as_slice().is_some());
}

// ============================================================
// 3. Text mode
// ============================================================

#[test]
fn test_text_stroke_becomes_sized_sentence() {
    let mut s = surface(200, 200);
    s.set_text("Hello world. \n\nGoodbye.\n");
    s.set_mode(BrushMode::Text);

    stroke(&mut s, &[(0.0, 100.0), (50.0, 100.0), (110.0, 100.0)]);
    let text = s.fragments()[0].as_text().unwrap();
    assert_eq!(text.text, "Hello world");
    assert_eq!(text.font_size, 25.0);
    assert_eq!(text.baseline.len(), 3);
    // Only the warped text remains, not the raw stroke.
    assert_eq!(s.fragments().len(), 1);

    stroke(&mut s, &[(0.0, 0.0), (70.0, 0.0)]);
    assert_eq!(s.fragments()[1].as_text().unwrap().text, "Goodbye");
    stroke(&mut s, &[(0.0, 0.0), (70.0, 0.0)]);
    assert_eq!(s.fragments()[2].as_text().unwrap().text, "Hello world");
}

#[test]
fn test_text_click_without_movement_is_discarded() {
    let mut s = surface(100, 100);
    s.set_text("Kept for later.");
    s.set_mode(BrushMode::Text);
    stroke(&mut s, &[(10.0, 10.0)]);
    assert!(s.fragments().is_empty());
    assert_eq!(s.sentences().cursor(), 0);
}

#[test]
fn test_text_without_font_still_exports() {
    let mut s = surface(50, 40);
    s.set_text("No font here.");
    s.set_mode(BrushMode::Text);
    stroke(&mut s, &[(0.0, 20.0), (50.0, 20.0)]);

    let img = s.export_image(1.0).unwrap();
    assert_eq!(img.dimensions(), (50, 40));
    assert!(img.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
}

// ============================================================
// 4. Source fingerprints
// ============================================================

#[test]
fn test_identical_strip_keeps_cursor() {
    let mut s = surface(100, 100);
    assert!(s.load_strip(&white_strip(60, 10)));
    s.set_mode(BrushMode::Ribbon);
    stroke(&mut s, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);

    assert!(!s.load_strip(&white_strip(60, 10)));
    assert_eq!(s.slice_set().unwrap().cursor(), 2);

    assert!(s.load_strip(&white_strip(80, 10)));
    assert_eq!(s.slice_set().unwrap().cursor(), 0);
    assert_eq!(s.consumption_progress(), 0);
}

#[test]
fn test_reset_ribbon_restarts_at_first_slice() {
    let mut s = surface(100, 100);
    s.load_strip(&white_strip(60, 10));
    s.set_mode(BrushMode::Ribbon);
    stroke(&mut s, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
    assert_eq!(s.consumption_progress(), 67);

    s.reset_ribbon();
    assert_eq!(s.slice_set().unwrap().cursor(), 0);
    assert_eq!(s.consumption_progress(), 0);

    stroke(&mut s, &[(0.0, 0.0), (1.0, 0.0)]);
    assert_eq!(s.fragments().last().unwrap().as_slice().unwrap().slice_index, 0);
}

#[test]
fn test_reset_sentences_restarts_text() {
    let mut s = surface(100, 100);
    s.set_text("First. Second.");
    s.set_mode(BrushMode::Text);
    stroke(&mut s, &[(0.0, 0.0), (40.0, 0.0)]);

    s.reset_sentences();
    assert_eq!(s.sentences().cursor(), 0);
    stroke(&mut s, &[(0.0, 0.0), (40.0, 0.0)]);
    assert_eq!(s.fragments()[1].as_text().unwrap().text, "First");
}

#[test]
fn test_identical_text_keeps_cursor() {
    let mut s = surface(100, 100);
    assert!(s.set_text("A. B."));
    s.set_mode(BrushMode::Text);
    stroke(&mut s, &[(0.0, 0.0), (10.0, 0.0)]);

    assert!(!s.set_text("A. B."));
    assert_eq!(s.sentences().cursor(), 1);
    assert!(s.set_text("C."));
    assert_eq!(s.sentences().cursor(), 0);
    assert_eq!(s.sentences().len(), 1);
}

// ============================================================
// 5. Canvas operations and export
// ============================================================

#[test]
fn test_export_empty_surface_at_double_size() {
    let s = surface(30, 20);
    let img = s.export_image(2.0).unwrap();
    assert_eq!(img.dimensions(), (60, 40));
    assert!(img.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
}

#[test]
fn test_export_uses_custom_background() {
    let mut s = surface(10, 10);
    s.set_background(HexColor::opaque(0x33, 0x66, 0x99));
    let img = s.export_image(1.0).unwrap();
    for p in img.pixels() {
        assert_eq!(p[3], 255);
        assert!(p[0].abs_diff(0x33) <= 1 && p[1].abs_diff(0x66) <= 1 && p[2].abs_diff(0x99) <= 1);
    }
}

#[test]
fn test_export_rejects_bad_multiplier() {
    let s = surface(10, 10);
    assert!(matches!(s.export_image(0.0), Err(InkError::RenderError(_))));
    assert!(s.export_image(f32::NAN).is_err());
}

#[test]
fn test_export_draws_ribbon_slice() {
    let mut s = surface(100, 100);
    s.load_strip(&white_strip(20, 10));
    s.set_mode(BrushMode::Ribbon);
    stroke(&mut s, &[(40.0, 50.0), (60.0, 50.0)]);

    let img = s.export_image(1.0).unwrap();
    assert!(img.get_pixel(60, 50)[0] > 200, "slice centre should be white");
    assert_eq!(*img.get_pixel(5, 5), Rgba([0, 0, 0, 255]));

    let doubled = s.export_image(2.0).unwrap();
    assert!(doubled.get_pixel(120, 100)[0] > 200);
}

#[test]
fn test_export_draws_pencil_stroke() {
    let mut s = surface(100, 100);
    stroke(&mut s, &[(10.0, 50.0), (50.0, 50.0), (90.0, 50.0)]);

    let img = s.export_image(1.0).unwrap();
    assert!(img.get_pixel(50, 50)[0] > 200);
    assert_eq!(*img.get_pixel(50, 10), Rgba([0, 0, 0, 255]));
}

#[test]
fn test_export_png_decodes_to_scaled_size() {
    let s = surface(25, 15);
    let png = s.export_png(2.0).unwrap();
    let img = decode_rgba(&png).unwrap();
    assert_eq!(img.dimensions(), (50, 30));
}

#[test]
fn test_clear_empties_and_resets_background() {
    let mut s = surface(20, 20);
    stroke(&mut s, &[(0.0, 0.0), (10.0, 10.0)]);
    s.set_background(HexColor::WHITE);

    s.clear();
    assert!(s.fragments().is_empty());
    assert_eq!(s.background(), HexColor::BLACK);
}

#[test]
fn test_resize_keeps_fragment_coordinates() {
    let mut s = surface(100, 100);
    stroke(&mut s, &[(10.0, 10.0), (90.0, 90.0)]);

    s.resize(40, 30).unwrap();
    assert_eq!(s.size(), (40, 30));
    let points = &s.fragments()[0].as_stroke().unwrap().points;
    assert_eq!(points[1], Point::new(90.0, 90.0));
    assert_eq!(s.export_image(2.0).unwrap().dimensions(), (80, 60));

    assert!(s.resize(0, 10).is_err());
    assert_eq!(s.size(), (40, 30));
}
