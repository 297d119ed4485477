// Whole extraction run: every page in upload order -> composite strip

use serde::Serialize;
use tracing::{info, warn};

use crate::extract::compositor::compose_strip;
use crate::extract::{CompositeStrip, StripPlacement};
use crate::pipeline::page_processor::{ExtractionConfig, PageSource, process_page};

/// Percent of a single image's work done once it has been decoded.
const DECODED_PERCENT: u8 = 10;

/// Share of the overall bar reserved for per-image work; compositing takes the rest.
const PAGES_SHARE: u32 = 95;

#[derive(Debug, Clone)]
pub enum Extraction {
    Ink(CompositeStrip),
    /// No qualifying line region across all images.
    NoHandwriting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageStatus {
    Processed { detected: usize, retained: usize },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageReport {
    pub index: usize,
    pub source: String,
    #[serde(flatten)]
    pub status: ImageStatus,
}

/// Outcome of [`run_extraction`] together with what happened to each image.
///
/// `images` has one entry per input page, in upload order, whether the page
/// was processed or skipped. For processed pages `detected` counts every
/// region the segmenter returned and `retained` the ones that made it into
/// the strip (the page outline is not among them).
#[derive(Debug, Clone)]
pub struct ExtractionRun {
    pub outcome: Extraction,
    pub images: Vec<ImageReport>,
}

#[derive(Serialize)]
struct StripReport<'a> {
    width: u32,
    height: u32,
    placements: &'a [StripPlacement],
}

#[derive(Serialize)]
struct RunReport<'a> {
    images: &'a [ImageReport],
    strip: Option<StripReport<'a>>,
}

impl ExtractionRun {
    pub fn strip(&self) -> Option<&CompositeStrip> {
        match &self.outcome {
            Extraction::Ink(strip) => Some(strip),
            Extraction::NoHandwriting => None,
        }
    }

    pub fn into_strip(self) -> Option<CompositeStrip> {
        match self.outcome {
            Extraction::Ink(strip) => Some(strip),
            Extraction::NoHandwriting => None,
        }
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ImageReport> {
        self.images
            .iter()
            .filter(|r| matches!(r.status, ImageStatus::Skipped { .. }))
    }

    /// Pretty JSON summary of the run (per-image status and strip layout).
    pub fn to_json(&self) -> crate::error::Result<String> {
        let report = RunReport {
            images: &self.images,
            strip: self.strip().map(|s| StripReport {
                width: s.width(),
                height: s.height(),
                placements: &s.placements,
            }),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

/// Turns per-image stage percentages into one monotonically rising value.
struct ProgressReporter<'a> {
    sink: &'a mut dyn FnMut(u8),
    total: u32,
    last: Option<u8>,
}

impl<'a> ProgressReporter<'a> {
    fn new(sink: &'a mut dyn FnMut(u8), total: usize) -> Self {
        ProgressReporter {
            sink,
            total: total.max(1) as u32,
            last: None,
        }
    }

    fn emit(&mut self, percent: u8) {
        let percent = percent.min(100);
        if self.last.is_none_or(|last| percent > last) {
            self.last = Some(percent);
            (self.sink)(percent);
        }
    }

    fn image(&mut self, index: usize, image_percent: u8) {
        let done = index as u32 * 100 + u32::from(image_percent.min(100));
        let overall = PAGES_SHARE * done / (self.total * 100);
        self.emit(overall as u8);
    }
}

/// Run the extraction pipeline over every page, strictly one after another.
///
/// Each page is decoded, prescaled and segmented before the next one starts;
/// compositing needs every page's regions and runs last. Pages that fail to
/// decode are reported and skipped, they never abort the batch.
///
/// # Arguments
/// * `pages`       - Page photographs in upload order
/// * `config`      - Working resolution and segmenter tunables
/// * `on_progress` - Receives strictly increasing values in `[0, 100]`;
///                   100 arrives exactly once, after compositing
pub fn run_extraction(
    pages: Vec<PageSource>,
    config: &ExtractionConfig,
    on_progress: &mut dyn FnMut(u8),
) -> ExtractionRun {
    let mut progress = ProgressReporter::new(on_progress, pages.len());
    progress.emit(0);

    let mut per_image = Vec::with_capacity(pages.len());
    let mut images = Vec::with_capacity(pages.len());

    for (index, page) in pages.into_iter().enumerate() {
        let source = page.describe();
        match page.decode() {
            Ok(image) => {
                progress.image(index, DECODED_PERCENT);
                let regions = process_page(index, image, config, &mut |p| {
                    progress.image(index, p)
                });
                images.push(ImageReport {
                    index,
                    source,
                    status: ImageStatus::Processed {
                        detected: regions.len(),
                        retained: 0,
                    },
                });
                per_image.push(regions);
            }
            Err(e) => {
                warn!(index, source = %source, error = %e, "skipping image that failed to decode");
                images.push(ImageReport {
                    index,
                    source,
                    status: ImageStatus::Skipped {
                        reason: e.to_string(),
                    },
                });
            }
        }
        progress.image(index, 100);
    }

    let outcome = match compose_strip(per_image) {
        Some(strip) => {
            for report in &mut images {
                if let ImageStatus::Processed { retained, .. } = &mut report.status {
                    *retained = strip
                        .placements
                        .iter()
                        .filter(|p| p.source_index == report.index)
                        .count();
                }
            }
            info!(
                width = strip.width(),
                height = strip.height(),
                lines = strip.placements.len(),
                "extracted handwriting strip"
            );
            Extraction::Ink(strip)
        }
        None => {
            info!("no extractable handwriting in any image");
            Extraction::NoHandwriting
        }
    };
    progress.emit(100);

    ExtractionRun { outcome, images }
}
