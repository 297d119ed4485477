use std::path::Path;

use serde::Deserialize;

use crate::brush::BrushMode;
use crate::brush::path::Point;

#[derive(Debug, Clone, Deserialize)]
pub struct JobFile {
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    /// Page photographs in upload order.
    #[serde(default)]
    pub images: Vec<String>,
    pub text: Option<String>,
    pub text_file: Option<String>,
    pub strip_output: Option<String>,
    pub report_output: Option<String>,
    pub drawing_output: Option<String>,
    #[serde(default)]
    pub strokes: Vec<StrokeScript>,
    pub slice_width: Option<u32>,
    pub export_multiplier: Option<f32>,
    pub canvas_width: Option<u32>,
    pub canvas_height: Option<u32>,
}

/// One scripted pointer-down … pointer-up interaction.
///
/// `mode` switches the brush before the stroke starts; omitted means "keep
/// whatever mode is active".
#[derive(Debug, Clone, Deserialize)]
pub struct StrokeScript {
    pub mode: Option<BrushMode>,
    #[serde(deserialize_with = "deserialize_points")]
    pub points: Vec<Point>,
}

impl JobFile {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        serde_yml::from_str(yaml).map_err(|e| {
            crate::error::InkError::config(format!("Failed to parse job YAML: {e}"))
        })
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

impl Job {
    /// Resolve the journal text: inline `text` wins over `text_file`.
    pub fn resolve_text(&self, job_dir: &Path) -> crate::error::Result<Option<String>> {
        if let Some(text) = &self.text {
            return Ok(Some(text.clone()));
        }
        match &self.text_file {
            Some(file) => {
                let path = crate::config::resolve_path(job_dir, file);
                Ok(Some(std::fs::read_to_string(path)?))
            }
            None => Ok(None),
        }
    }
}

/// Points are written as `[x, y]` pairs.
fn deserialize_points<'de, D>(deserializer: D) -> Result<Vec<Point>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let pairs = Vec::<[f32; 2]>::deserialize(deserializer)?;
    if let Some(bad) = pairs.iter().find(|[x, y]| !x.is_finite() || !y.is_finite()) {
        return Err(serde::de::Error::custom(format!(
            "stroke point must be finite, got [{}, {}]",
            bad[0], bad[1]
        )));
    }
    Ok(pairs.into_iter().map(|[x, y]| Point::new(x, y)).collect())
}
