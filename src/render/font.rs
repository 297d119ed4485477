// Font loading for text-on-path: explicit file or system font database

use std::path::Path;
use std::sync::Arc;

use tiny_skia::{Path as SkPath, PathBuilder};
use tracing::{debug, warn};
use ttf_parser::Face;

use crate::error::InkError;

/// Advance used for characters the font has no glyph for, in em.
const MISSING_GLYPH_ADVANCE_EM: f32 = 0.5;

/// A parsed-on-demand TrueType/OpenType face.
#[derive(Clone)]
pub struct TextFont {
    font_data: Arc<Vec<u8>>,
    face_index: u32,
}

impl std::fmt::Debug for TextFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextFont")
            .field("bytes", &self.font_data.len())
            .field("face_index", &self.face_index)
            .finish()
    }
}

impl TextFont {
    /// Wrap raw font bytes after checking they parse.
    pub fn from_bytes(font_data: Vec<u8>, face_index: u32) -> crate::error::Result<Self> {
        Face::parse(&font_data, face_index)
            .map_err(|e| InkError::font(format!("Failed to parse font face: {e}")))?;
        Ok(TextFont {
            font_data: Arc::new(font_data),
            face_index,
        })
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data, 0)
            .map_err(|e| InkError::font(format!("{}: {e}", path.display())))
    }

    /// Look up `family` (or any sans-serif face) among the system fonts.
    pub fn from_system(family: Option<&str>) -> Option<Self> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();

        let mut families = Vec::new();
        if let Some(name) = family {
            families.push(fontdb::Family::Name(name));
        }
        families.push(fontdb::Family::SansSerif);

        let query = fontdb::Query {
            families: &families,
            ..fontdb::Query::default()
        };
        let id = db.query(&query)?;
        let (data, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;
        debug!(family = ?family, faces = db.len(), "resolved system font");
        Self::from_bytes(data, index).ok()
    }

    /// `font_path` wins; otherwise the system database is queried. A missing
    /// system font is not an error, but an unreadable `font_path` is.
    pub fn resolve(
        font_path: Option<&Path>,
        family: Option<&str>,
    ) -> crate::error::Result<Option<Self>> {
        if let Some(path) = font_path {
            return Self::from_file(path).map(Some);
        }
        let font = Self::from_system(family);
        if font.is_none() {
            warn!(family = ?family, "no system font found; text strokes will not be rasterised");
        }
        Ok(font)
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.font_data, self.face_index).ok()
    }

    pub fn units_per_em(&self) -> u16 {
        self.face().map_or(1000, |f| f.units_per_em())
    }

    /// Horizontal advance of `ch` at `font_size` pixels per em.
    pub fn advance(&self, ch: char, font_size: f32) -> f32 {
        let Some(face) = self.face() else {
            return MISSING_GLYPH_ADVANCE_EM * font_size;
        };
        let upem = f32::from(face.units_per_em().max(1));
        face.glyph_index(ch)
            .and_then(|gid| face.glyph_hor_advance(gid))
            .map_or(MISSING_GLYPH_ADVANCE_EM * font_size, |adv| {
                f32::from(adv) * font_size / upem
            })
    }

    /// Outline of `ch` in font units (y up). `None` for blank glyphs such as
    /// spaces and for characters the face does not cover.
    pub fn glyph_path(&self, ch: char) -> Option<SkPath> {
        let face = self.face()?;
        let gid = face.glyph_index(ch)?;
        let mut builder = OutlineBuilder::new();
        face.outline_glyph(gid, &mut builder)?;
        builder.builder.finish()
    }
}

/// ttf-parser outline callbacks feeding a tiny-skia path.
struct OutlineBuilder {
    builder: PathBuilder,
}

impl OutlineBuilder {
    fn new() -> Self {
        OutlineBuilder {
            builder: PathBuilder::new(),
        }
    }
}

impl ttf_parser::OutlineBuilder for OutlineBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
