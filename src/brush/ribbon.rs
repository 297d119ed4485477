use super::Brush;
use super::path::{Point, tangent_angle};
use super::slices::SliceSet;
use crate::render::fragment::{Fragment, SliceFragment};

/// Paints the next strip slice at every pointer-move.
#[derive(Debug, Clone)]
pub struct RibbonBrush {
    slices: SliceSet,
}

impl RibbonBrush {
    /// `None` when the set has no slices: a ribbon with no ink is never armed.
    pub fn new(slices: SliceSet) -> Option<Self> {
        if slices.is_empty() {
            None
        } else {
            Some(RibbonBrush { slices })
        }
    }

    pub fn slices(&self) -> &SliceSet {
        &self.slices
    }

    /// Consumption of the current lap in percent.
    pub fn progress(&self) -> u8 {
        self.slices.progress()
    }

    pub fn reset(&mut self) {
        self.slices.reset();
    }
}

impl Brush for RibbonBrush {
    fn on_pointer_move(&mut self, path: &[Point]) -> Option<Fragment> {
        let center = *path.last()?;
        let slice = self.slices.next()?;
        Some(Fragment::Slice(SliceFragment {
            slice_index: slice.index,
            image: slice.image,
            center,
            angle: tangent_angle(path),
        }))
    }
}
