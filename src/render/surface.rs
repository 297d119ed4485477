// Drawing surface: pointer dispatch, render list and export

use image::RgbaImage;
use tracing::{debug, info};

use super::font::TextFont;
use super::fragment::Fragment;
use super::raster::{RasterParams, rasterize};
use crate::brush::path::{PathTracker, Point};
use crate::brush::sentences::SentenceQueue;
use crate::brush::slices::{DEFAULT_SLICE_WIDTH, SliceSet};
use crate::brush::{Brush, BrushMode, PencilBrush, RibbonBrush, TextBrush};
use crate::config::merged::MergedConfig;
use crate::config::settings::HexColor;
use crate::error::InkError;
use crate::extract::png::{decode_rgba, encode_png};
use crate::fingerprint::{image_fingerprint, text_fingerprint};

/// Construction parameters for a [`DrawingSurface`].
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
    pub background: HexColor,
    pub ink_color: HexColor,
    pub pencil_width: f32,
    pub slice_width: u32,
    pub export_multiplier: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        SurfaceConfig {
            width: 700,
            height: 700,
            background: HexColor::BLACK,
            ink_color: HexColor::WHITE,
            pencil_width: 3.0,
            slice_width: DEFAULT_SLICE_WIDTH,
            export_multiplier: 2.0,
        }
    }
}

impl From<&MergedConfig> for SurfaceConfig {
    fn from(config: &MergedConfig) -> Self {
        SurfaceConfig {
            width: config.canvas_width,
            height: config.canvas_height,
            background: config.background,
            ink_color: config.ink_color,
            pencil_width: config.pencil_width,
            slice_width: config.slice_width,
            export_multiplier: config.export_multiplier,
        }
    }
}

/// Owns the render list and every brush, and routes pointer events to the
/// brush of the active mode.
///
/// Events are handled one at a time and each handler finishes before it
/// returns, so the render list has exactly one writer.
#[derive(Debug)]
pub struct DrawingSurface {
    width: u32,
    height: u32,
    background: HexColor,
    default_background: HexColor,
    export_multiplier: f32,
    slice_width: u32,

    fragments: Vec<Fragment>,
    mode: BrushMode,
    /// Mode captured at pointer-down; a switch mid-stroke affects the next one.
    stroke_mode: BrushMode,
    tracker: PathTracker,

    pencil: PencilBrush,
    ribbon: Option<RibbonBrush>,
    text: TextBrush,
    strip_key: Option<String>,
    text_key: Option<String>,
    consumption_progress: u8,

    font: Option<TextFont>,
}

impl DrawingSurface {
    pub fn new(config: SurfaceConfig) -> Self {
        DrawingSurface {
            width: config.width,
            height: config.height,
            background: config.background,
            default_background: config.background,
            export_multiplier: config.export_multiplier,
            slice_width: config.slice_width,
            fragments: Vec::new(),
            mode: BrushMode::Pencil,
            stroke_mode: BrushMode::Pencil,
            tracker: PathTracker::new(),
            pencil: PencilBrush {
                color: config.ink_color,
                width: config.pencil_width,
            },
            ribbon: None,
            text: TextBrush::new(SentenceQueue::default(), config.ink_color),
            strip_key: None,
            text_key: None,
            consumption_progress: 0,
            font: None,
        }
    }

    /// Font used to rasterise text fragments on export.
    pub fn with_font(mut self, font: Option<TextFont>) -> Self {
        self.font = font;
        self
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn background(&self) -> HexColor {
        self.background
    }

    pub fn export_multiplier(&self) -> f32 {
        self.export_multiplier
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Last ribbon consumption percentage reported by [`pointer_move`](Self::pointer_move).
    pub fn consumption_progress(&self) -> u8 {
        self.consumption_progress
    }

    pub fn slice_set(&self) -> Option<&SliceSet> {
        self.ribbon.as_ref().map(RibbonBrush::slices)
    }

    pub fn sentences(&self) -> &SentenceQueue {
        self.text.sentences()
    }

    // ---- sources ----

    /// Make `strip` the ribbon ink.
    ///
    /// Loading the strip that is already loaded keeps the slice cursor.
    /// Returns `true` when the slice set was rebuilt. A strip without pixels
    /// unloads the ribbon.
    pub fn load_strip(&mut self, strip: &RgbaImage) -> bool {
        let key = image_fingerprint(strip);
        if self.ribbon.is_some() && self.strip_key.as_deref() == Some(key.as_str()) {
            debug!("strip unchanged, keeping slice cursor");
            return false;
        }

        let slices = SliceSet::build(strip, self.slice_width);
        info!(
            width = strip.width(),
            height = strip.height(),
            slices = slices.len(),
            "loaded ribbon strip"
        );
        self.ribbon = RibbonBrush::new(slices);
        self.strip_key = self.ribbon.as_ref().map(|_| key);
        self.consumption_progress = 0;
        if self.ribbon.is_none() {
            self.leave_ribbon();
        }
        true
    }

    /// Decode a PNG strip and load it. Ribbon mode stays unavailable until
    /// this returns `Ok`.
    pub fn load_strip_png(&mut self, bytes: &[u8]) -> crate::error::Result<bool> {
        let strip = decode_rgba(bytes)?;
        Ok(self.load_strip(&strip))
    }

    pub fn unload_strip(&mut self) {
        self.ribbon = None;
        self.strip_key = None;
        self.consumption_progress = 0;
        self.leave_ribbon();
    }

    /// Replace the journal text. Identical text keeps the sentence cursor.
    /// Returns `true` when the sentence queue was rebuilt.
    pub fn set_text(&mut self, text: &str) -> bool {
        let key = text_fingerprint(text);
        if self.text_key.as_deref() == Some(key.as_str()) {
            return false;
        }
        let sentences = SentenceQueue::from_text(text);
        info!(sentences = sentences.len(), "loaded journal text");
        self.text.set_sentences(sentences);
        self.text_key = Some(key);
        true
    }

    /// Send the ribbon back to the first slice of the strip.
    pub fn reset_ribbon(&mut self) {
        if let Some(ribbon) = self.ribbon.as_mut() {
            ribbon.reset();
            self.consumption_progress = 0;
            debug!("ribbon cursor reset");
        }
    }

    pub fn reset_sentences(&mut self) {
        self.text.rewind();
    }

    // ---- modes ----

    pub fn mode(&self) -> BrushMode {
        self.mode
    }

    /// Ribbon needs a loaded strip; Pencil and Text are always selectable.
    pub fn is_mode_available(&self, mode: BrushMode) -> bool {
        match mode {
            BrushMode::Ribbon => self.ribbon.is_some(),
            BrushMode::Pencil | BrushMode::Text => true,
        }
    }

    /// Switch the mode for future strokes. Returns `false` and leaves the
    /// mode unchanged when `mode` is not available.
    pub fn set_mode(&mut self, mode: BrushMode) -> bool {
        if !self.is_mode_available(mode) {
            debug!(%mode, "mode not available");
            return false;
        }
        if self.mode != mode {
            debug!(from = %self.mode, to = %mode, "brush mode switched");
            self.mode = mode;
        }
        true
    }

    /// Ribbon when ink is ready, else Text when there are sentences, else Pencil.
    pub fn select_default_mode(&mut self) -> BrushMode {
        self.mode = self.fallback_mode(true);
        self.mode
    }

    fn fallback_mode(&self, ribbon_allowed: bool) -> BrushMode {
        if ribbon_allowed && self.ribbon.is_some() {
            BrushMode::Ribbon
        } else if self.text.has_text() {
            BrushMode::Text
        } else {
            BrushMode::Pencil
        }
    }

    fn leave_ribbon(&mut self) {
        if self.mode == BrushMode::Ribbon {
            self.mode = self.fallback_mode(false);
            debug!(to = %self.mode, "ribbon ink gone, mode fell back");
        }
    }

    // ---- pointer events ----

    pub fn pointer_down(&mut self, at: Point) {
        self.stroke_mode = self.mode;
        self.tracker.begin(at);
    }

    /// Feed one pointer sample. Returns the ribbon consumption percentage
    /// when the move painted a slice. Moves without a pointer-down are ignored.
    pub fn pointer_move(&mut self, at: Point) -> Option<u8> {
        if !self.tracker.push(at) {
            return None;
        }
        if self.stroke_mode != BrushMode::Ribbon {
            return None;
        }
        let ribbon = self.ribbon.as_mut()?;
        let fragment = ribbon.on_pointer_move(self.tracker.samples())?;
        self.fragments.push(fragment);
        self.consumption_progress = ribbon.progress();
        Some(self.consumption_progress)
    }

    /// Finish the stroke. Pencil and Text strokes become a fragment here;
    /// ribbon fragments were already placed during the moves.
    pub fn pointer_up(&mut self) {
        if !self.tracker.is_tracking() {
            return;
        }
        let path = self.tracker.end();
        let fragment = match self.stroke_mode {
            BrushMode::Pencil => self.pencil.on_path_finished(&path),
            BrushMode::Text => self.text.on_path_finished(&path),
            BrushMode::Ribbon => None,
        };
        if let Some(fragment) = fragment {
            self.fragments.push(fragment);
        }
    }

    /// Samples of the stroke in progress, for a live preview.
    pub fn live_stroke(&self) -> Option<&[Point]> {
        self.tracker
            .is_tracking()
            .then(|| self.tracker.samples())
    }

    // ---- canvas ----

    /// Empty the render list and restore the configured background.
    pub fn clear(&mut self) {
        self.fragments.clear();
        self.tracker.cancel();
        self.background = self.default_background;
    }

    pub fn set_background(&mut self, color: HexColor) {
        self.background = color;
    }

    /// Change the logical drawing area. Placed fragments keep their
    /// coordinates.
    pub fn resize(&mut self, width: u32, height: u32) -> crate::error::Result<()> {
        if width == 0 || height == 0 {
            return Err(InkError::render(format!(
                "surface size must be non-empty, got {width}x{height}"
            )));
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Rasterise the render list at `multiplier` times the logical size.
    pub fn export_image(&self, multiplier: f32) -> crate::error::Result<RgbaImage> {
        let image = rasterize(
            &self.fragments,
            &RasterParams {
                width: self.width,
                height: self.height,
                background: self.background,
                multiplier,
                font: self.font.as_ref(),
            },
        )?;
        info!(
            fragments = self.fragments.len(),
            width = image.width(),
            height = image.height(),
            "exported drawing"
        );
        Ok(image)
    }

    pub fn export_png(&self, multiplier: f32) -> crate::error::Result<Vec<u8>> {
        encode_png(&self.export_image(multiplier)?)
    }
}

impl From<&MergedConfig> for DrawingSurface {
    fn from(config: &MergedConfig) -> Self {
        DrawingSurface::new(SurfaceConfig::from(config))
    }
}
