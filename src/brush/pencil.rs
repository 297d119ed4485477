use super::Brush;
use super::path::Point;
use crate::config::settings::HexColor;
use crate::render::fragment::{Fragment, StrokeFragment};

/// Plain freehand ink: one continuous stroke per pointer-down … pointer-up.
#[derive(Debug, Clone)]
pub struct PencilBrush {
    pub color: HexColor,
    pub width: f32,
}

impl Default for PencilBrush {
    fn default() -> Self {
        PencilBrush {
            color: HexColor::WHITE,
            width: 3.0,
        }
    }
}

impl Brush for PencilBrush {
    fn on_path_finished(&mut self, path: &[Point]) -> Option<Fragment> {
        // A click without movement leaves no mark.
        if path.len() < 2 {
            return None;
        }
        Some(Fragment::Stroke(StrokeFragment {
            points: path.to_vec(),
            color: self.color,
            width: self.width,
        }))
    }
}
