// One job: images -> strip -> drawing surface -> scripted strokes -> exported drawing

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::brush::BrushMode;
use crate::config::job::StrokeScript;
use crate::config::merged::MergedConfig;
use crate::error::InkError;
use crate::extract::png::encode_png;
use crate::pipeline::orchestrator::run_extraction;
use crate::pipeline::page_processor::{ExtractionConfig, PageSource};
use crate::render::font::TextFont;
use crate::render::surface::DrawingSurface;

/// Configuration for a single job, with every path already resolved.
pub struct JobConfig {
    pub images: Vec<PathBuf>,
    pub text: Option<String>,
    pub strip_output: Option<PathBuf>,
    pub report_output: Option<PathBuf>,
    pub drawing_output: Option<PathBuf>,
    pub strokes: Vec<StrokeScript>,
    pub merged: MergedConfig,
}

/// Result of processing a single job.
#[derive(Debug)]
pub struct JobResult {
    pub images_processed: usize,
    pub images_skipped: usize,
    /// `None` when no handwriting was found.
    pub strip_size: Option<(u32, u32)>,
    pub lines: usize,
    pub mode: BrushMode,
    pub fragments: usize,
    pub drawing_output: Option<PathBuf>,
}

/// Run one job from page photographs to the exported drawing.
///
/// Images that fail to decode are skipped; write failures and an unreadable
/// `font_path` fail the job.
pub fn run_job(config: &JobConfig) -> crate::error::Result<JobResult> {
    config.merged.validate()?;

    // --- Extraction ---
    let pages = config.images.iter().cloned().map(PageSource::Path).collect();
    let run = run_extraction(
        pages,
        &ExtractionConfig::from(&config.merged),
        &mut |percent| debug!(percent, "extraction progress"),
    );
    let images_skipped = run.skipped().count();

    if let Some(path) = &config.report_output {
        std::fs::write(path, run.to_json()?)?;
        info!(path = %path.display(), "wrote extraction report");
    }

    // --- Drawing surface ---
    let font = match &config.text {
        Some(_) => TextFont::resolve(
            config.merged.font_path.as_deref(),
            config.merged.font_family.as_deref(),
        )?,
        None => None,
    };
    let mut surface = DrawingSurface::from(&config.merged).with_font(font);

    let strip = run.strip();
    if let Some(strip) = strip {
        if let Some(path) = &config.strip_output {
            std::fs::write(path, encode_png(&strip.image)?)?;
            info!(path = %path.display(), "wrote strip");
        }
        surface.load_strip(&strip.image);
    } else if config.strip_output.is_some() {
        warn!("no handwriting extracted, strip not written");
    }
    if let Some(text) = &config.text {
        surface.set_text(text);
    }
    let mode = surface.select_default_mode();
    info!(%mode, "drawing session ready");

    for (i, stroke) in config.strokes.iter().enumerate() {
        replay_stroke(&mut surface, i, stroke);
    }

    if let Some(path) = &config.drawing_output {
        let png = surface.export_png(surface.export_multiplier())?;
        std::fs::write(path, png)
            .map_err(|e| InkError::export(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), "wrote drawing");
    }

    Ok(JobResult {
        images_processed: run.images.len() - images_skipped,
        images_skipped,
        strip_size: strip.map(|s| (s.width(), s.height())),
        lines: strip.map_or(0, |s| s.placements.len()),
        mode,
        fragments: surface.fragments().len(),
        drawing_output: config.drawing_output.clone(),
    })
}

/// Run every job in order. One job's failure does not stop the others.
pub fn run_all_jobs(configs: &[JobConfig]) -> Vec<crate::error::Result<JobResult>> {
    configs.iter().map(run_job).collect()
}

fn replay_stroke(surface: &mut DrawingSurface, index: usize, stroke: &StrokeScript) {
    if let Some(mode) = stroke.mode
        && !surface.set_mode(mode)
    {
        warn!(stroke = index, %mode, active = %surface.mode(), "mode unavailable, keeping active mode");
    }
    let Some((first, rest)) = stroke.points.split_first() else {
        warn!(stroke = index, "stroke has no points, skipped");
        return;
    };
    surface.pointer_down(*first);
    for &point in rest {
        surface.pointer_move(point);
    }
    surface.pointer_up();
}
