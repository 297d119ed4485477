// Text-on-path layout: one placement per character along a baseline polyline

use crate::brush::path::{Point, point_at};

/// Where one character of a warped sentence sits.
///
/// `position` is the glyph's horizontal centre on the baseline; `angle` is
/// the baseline tangent there (radians).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPlacement {
    pub ch: char,
    pub position: Point,
    pub angle: f32,
    pub advance: f32,
}

/// Lay `text` out along `baseline`, character by character.
///
/// `advance` gives the horizontal advance of a character in pixels at the
/// target font size. Characters are placed by cumulative advance from the
/// start of the path; text longer than the path continues straight on past
/// its end.
pub fn layout_on_path(
    text: &str,
    baseline: &[Point],
    mut advance: impl FnMut(char) -> f32,
) -> Vec<GlyphPlacement> {
    if baseline.is_empty() {
        return Vec::new();
    }

    let mut placements = Vec::with_capacity(text.len());
    let mut pen = 0.0f32;
    for ch in text.chars() {
        let adv = advance(ch).max(0.0);
        if let Some((position, angle)) = point_at(baseline, pen + adv / 2.0) {
            placements.push(GlyphPlacement {
                ch,
                position,
                angle,
                advance: adv,
            });
        }
        pen += adv;
    }
    placements
}
