// Per-image processing: decode -> prescale -> segment

use std::path::PathBuf;

use image::DynamicImage;
use tracing::debug;

use crate::config::merged::MergedConfig;
use crate::config::settings::SegmenterSettings;
use crate::error::InkError;
use crate::extract::LineRegion;
use crate::extract::filters::prescale;
use crate::extract::segmenter::{SegmentStage, segment_lines};

/// One uploaded page, in whatever form the caller has it.
pub enum PageSource {
    Decoded(DynamicImage),
    Encoded(Vec<u8>),
    Path(PathBuf),
}

impl PageSource {
    /// Human-readable origin used in skip reports.
    pub fn describe(&self) -> String {
        match self {
            PageSource::Decoded(img) => format!("decoded {}x{} image", img.width(), img.height()),
            PageSource::Encoded(bytes) => format!("{} encoded bytes", bytes.len()),
            PageSource::Path(path) => path.display().to_string(),
        }
    }

    pub fn decode(self) -> crate::error::Result<DynamicImage> {
        let image = match self {
            PageSource::Decoded(img) => img,
            PageSource::Encoded(bytes) => image::load_from_memory(&bytes)?,
            PageSource::Path(path) => image::open(&path)
                .map_err(|e| InkError::decode(format!("{}: {e}", path.display())))?,
        };
        if image.width() == 0 || image.height() == 0 {
            return Err(InkError::decode(format!(
                "image has no pixels ({}x{})",
                image.width(),
                image.height()
            )));
        }
        Ok(image)
    }
}

/// Settings the extraction pipeline needs.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub working_max_side: u32,
    pub segmenter: SegmenterSettings,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            working_max_side: 550,
            segmenter: SegmenterSettings::default(),
        }
    }
}

impl From<&MergedConfig> for ExtractionConfig {
    fn from(config: &MergedConfig) -> Self {
        ExtractionConfig {
            working_max_side: config.working_max_side,
            segmenter: config.segmenter.clone(),
        }
    }
}

/// Percent of one image's work done after prescaling.
pub(crate) const PRESCALED_PERCENT: u8 = 20;

/// Prescale a decoded page and segment it into line regions.
///
/// The working copy lives only for the duration of this call.
pub fn process_page(
    source_index: usize,
    image: DynamicImage,
    config: &ExtractionConfig,
    on_percent: &mut dyn FnMut(u8),
) -> Vec<LineRegion> {
    let (orig_w, orig_h) = (image.width(), image.height());
    let working = prescale(image, config.working_max_side);
    debug!(
        source_index,
        orig_w,
        orig_h,
        work_w = working.width(),
        work_h = working.height(),
        "prescaled page"
    );
    on_percent(PRESCALED_PERCENT);

    let mut on_stage = |stage: SegmentStage| on_percent(stage.percent());
    segment_lines(&working, source_index, &config.segmenter, &mut on_stage)
}
