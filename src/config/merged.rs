use std::path::PathBuf;

use super::job::Job;
use super::settings::{HexColor, SegmenterSettings, Settings, validate_multiplier};
use crate::error::InkError;

#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub working_max_side: u32,
    pub segmenter: SegmenterSettings,
    pub slice_width: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub background: HexColor,
    pub ink_color: HexColor,
    pub pencil_width: f32,
    pub export_multiplier: f32,
    pub font_family: Option<String>,
    pub font_path: Option<PathBuf>,
}

impl MergedConfig {
    /// Job overrides win; anything the job leaves unset falls back to Settings.
    pub fn new(settings: &Settings, job: &Job) -> Self {
        MergedConfig {
            working_max_side: settings.working_max_side,
            segmenter: settings.segmenter.clone(),
            slice_width: job.slice_width.unwrap_or(settings.slice_width),
            canvas_width: job.canvas_width.unwrap_or(settings.canvas_width),
            canvas_height: job.canvas_height.unwrap_or(settings.canvas_height),
            background: settings.background,
            ink_color: settings.ink_color,
            pencil_width: settings.pencil_width,
            export_multiplier: job.export_multiplier.unwrap_or(settings.export_multiplier),
            font_family: settings.font_family.clone(),
            font_path: settings.font_path.clone(),
        }
    }

    /// Re-check the values a job is allowed to override.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.slice_width == 0 {
            return Err(InkError::config("slice_width must be > 0"));
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(InkError::config(format!(
                "canvas size must be non-empty, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        validate_multiplier(self.export_multiplier)
    }
}

impl From<&Settings> for MergedConfig {
    fn from(settings: &Settings) -> Self {
        MergedConfig {
            working_max_side: settings.working_max_side,
            segmenter: settings.segmenter.clone(),
            slice_width: settings.slice_width,
            canvas_width: settings.canvas_width,
            canvas_height: settings.canvas_height,
            background: settings.background,
            ink_color: settings.ink_color,
            pencil_width: settings.pencil_width,
            export_multiplier: settings.export_multiplier,
            font_family: settings.font_family.clone(),
            font_path: settings.font_path.clone(),
        }
    }
}
