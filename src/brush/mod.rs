pub mod path;
pub mod pencil;
pub mod ribbon;
pub mod sentences;
pub mod slices;
pub mod text;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::render::fragment::Fragment;
use path::Point;

pub use pencil::PencilBrush;
pub use ribbon::RibbonBrush;
pub use text::TextBrush;

/// Which brush handles the next stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushMode {
    #[default]
    Pencil,
    Ribbon,
    Text,
}

impl fmt::Display for BrushMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BrushMode::Pencil => "pencil",
            BrushMode::Ribbon => "ribbon",
            BrushMode::Text => "text",
        })
    }
}

/// Per-stroke behaviour selected by the drawing surface.
///
/// Both hooks run synchronously inside one pointer event. `path` always
/// starts with the pointer-down sample.
pub trait Brush {
    /// Called after each accepted pointer-move with the samples so far.
    fn on_pointer_move(&mut self, _path: &[Point]) -> Option<Fragment> {
        None
    }

    /// Called once on pointer-up with the complete stroke.
    fn on_path_finished(&mut self, _path: &[Point]) -> Option<Fragment> {
        None
    }
}
