// tiny-skia rasterisation of a render list

use image::{Rgba, RgbaImage};
use tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder,
    Pixmap, PixmapPaint, Stroke, Transform,
};
use tracing::warn;

use super::font::TextFont;
use super::fragment::{Fragment, SliceFragment, StrokeFragment, TextFragment};
use super::text_layout::layout_on_path;
use crate::config::settings::HexColor;
use crate::error::InkError;

/// Scene description handed to [`rasterize`].
pub struct RasterParams<'a> {
    pub width: u32,
    pub height: u32,
    pub background: HexColor,
    pub multiplier: f32,
    pub font: Option<&'a TextFont>,
}

/// Output size for a logical `width x height` surface at `multiplier`.
pub fn scaled_size(width: u32, height: u32, multiplier: f32) -> (u32, u32) {
    let scale = |v: u32| ((v as f32 * multiplier).round() as u32).max(1);
    (scale(width), scale(height))
}

/// Draw `fragments` in order over the background and return straight
/// (non-premultiplied) RGBA pixels.
pub fn rasterize(fragments: &[Fragment], params: &RasterParams) -> crate::error::Result<RgbaImage> {
    if !(params.multiplier.is_finite() && params.multiplier > 0.0) {
        return Err(InkError::render(format!(
            "Export multiplier must be finite and > 0, got {}",
            params.multiplier
        )));
    }

    let (out_w, out_h) = scaled_size(params.width, params.height, params.multiplier);
    let mut pixmap = Pixmap::new(out_w, out_h).ok_or_else(|| {
        InkError::render(format!("Failed to allocate {out_w}x{out_h} pixmap"))
    })?;
    pixmap.fill(to_color(params.background));

    let scale = Transform::from_scale(params.multiplier, params.multiplier);
    let mut skipped_text = 0usize;
    for fragment in fragments {
        match fragment {
            Fragment::Stroke(stroke) => draw_stroke(&mut pixmap, stroke, scale),
            Fragment::Slice(slice) => draw_slice(&mut pixmap, slice, scale),
            Fragment::Text(text) => match params.font {
                Some(font) => draw_text(&mut pixmap, text, font, scale),
                None => skipped_text += 1,
            },
        }
    }
    if skipped_text > 0 {
        warn!(skipped_text, "no font available, text fragments left out of export");
    }

    Ok(pixmap_to_rgba(&pixmap))
}

fn to_color(c: HexColor) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn solid_paint(c: HexColor) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_color(c));
    paint.anti_alias = true;
    paint
}

/// Smooth the samples with quadratic segments through the midpoints.
fn draw_stroke(pixmap: &mut Pixmap, stroke: &StrokeFragment, transform: Transform) {
    let points = &stroke.points;
    let Some(first) = points.first() else {
        return;
    };

    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    if points.len() == 2 {
        pb.line_to(points[1].x, points[1].y);
    } else {
        for w in points[1..].windows(2) {
            let (ctrl, next) = (w[0], w[1]);
            pb.quad_to(ctrl.x, ctrl.y, (ctrl.x + next.x) / 2.0, (ctrl.y + next.y) / 2.0);
        }
        if let Some(last) = points.last() {
            pb.line_to(last.x, last.y);
        }
    }
    let Some(path) = pb.finish() else {
        return;
    };

    let style = Stroke {
        width: stroke.width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &solid_paint(stroke.color), &style, transform, None);
}

fn draw_slice(pixmap: &mut Pixmap, slice: &SliceFragment, transform: Transform) {
    let Some(source) = rgba_to_pixmap(&slice.image) else {
        return;
    };
    let (w, h) = (source.width() as f32, source.height() as f32);

    let placement = transform
        .pre_translate(slice.center.x, slice.center.y)
        .pre_rotate(slice.angle.to_degrees())
        .pre_translate(-w / 2.0, -h / 2.0);

    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, placement, None);
}

fn draw_text(pixmap: &mut Pixmap, text: &TextFragment, font: &TextFont, transform: Transform) {
    let size = text.font_size;
    let units = f32::from(font.units_per_em().max(1));
    let glyph_scale = size / units;
    let paint = solid_paint(text.color);

    let placements = layout_on_path(&text.text, &text.baseline, |ch| font.advance(ch, size));
    for glyph in placements {
        let Some(outline) = font.glyph_path(glyph.ch) else {
            continue;
        };
        // Font units are y-up; flip onto the surface and centre on the baseline.
        let placement = transform
            .pre_translate(glyph.position.x, glyph.position.y)
            .pre_rotate(glyph.angle.to_degrees())
            .pre_translate(-glyph.advance / 2.0, 0.0)
            .pre_scale(glyph_scale, -glyph_scale);
        pixmap.fill_path(&outline, &paint, FillRule::Winding, placement, None);
    }
}

/// Premultiply straight RGBA into a tiny-skia pixmap.
pub fn rgba_to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Demultiply a pixmap back into straight RGBA.
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}
