use std::sync::Arc;

use image::RgbaImage;

use crate::brush::path::Point;
use crate::config::settings::HexColor;

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeFragment {
    pub points: Vec<Point>,
    pub color: HexColor,
    pub width: f32,
}

/// One ribbon slice, centred on a pointer sample and rotated to the stroke's
/// tangent (radians).
#[derive(Debug, Clone)]
pub struct SliceFragment {
    pub slice_index: usize,
    pub image: Arc<RgbaImage>,
    pub center: Point,
    pub angle: f32,
}

/// A sentence warped along a finished path. The raw path is kept only as
/// the baseline geometry, never drawn itself.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub font_size: f32,
    pub baseline: Vec<Point>,
    pub color: HexColor,
}

/// Everything that can sit in the surface's render list. Fragments are
/// display-only; nothing hit-tests or selects them after placement.
#[derive(Debug, Clone)]
pub enum Fragment {
    Stroke(StrokeFragment),
    Slice(SliceFragment),
    Text(TextFragment),
}

impl Fragment {
    pub fn as_slice(&self) -> Option<&SliceFragment> {
        match self {
            Fragment::Slice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextFragment> {
        match self {
            Fragment::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_stroke(&self) -> Option<&StrokeFragment> {
        match self {
            Fragment::Stroke(s) => Some(s),
            _ => None,
        }
    }
}
