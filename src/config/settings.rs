use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::InkError;

/// An 8-bit RGBA colour written as `#rrggbb` or `#rrggbbaa` in YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl HexColor {
    pub const BLACK: HexColor = HexColor::opaque(0, 0, 0);
    pub const WHITE: HexColor = HexColor::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        HexColor { r, g, b, a: 255 }
    }

    /// Parse `#rrggbb` / `#rrggbbaa` (the leading `#` is optional).
    pub fn parse(s: &str) -> crate::error::Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !(hex.len() == 6 || hex.len() == 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InkError::config(format!(
                "Invalid colour '{s}': expected #rrggbb or #rrggbbaa"
            )));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| InkError::config(format!("Invalid colour '{s}': {e}")))
        };

        Ok(HexColor {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if hex.len() == 8 { channel(6)? } else { 255 },
        })
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        HexColor::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Largest structuring element side imageproc's morphology masks accept.
const MAX_DILATE_SIDE: u32 = 511;

/// Tunables of the line segmenter.
///
/// Block sizes are odd neighbourhood edges in pixels; the `*_c` constants are
/// subtracted from the local weighted mean before comparison.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SegmenterSettings {
    pub median_kernel: u32,
    pub detect_block_size: u32,
    pub detect_c: f32,
    pub dilate_width: u32,
    pub dilate_height: u32,
    pub dilate_iterations: u32,
    pub min_width: u32,
    pub min_height: u32,
    pub mask_blur_kernel: u32,
    pub mask_block_size: u32,
    pub mask_c: f32,
}

impl Default for SegmenterSettings {
    fn default() -> Self {
        SegmenterSettings {
            median_kernel: 5,
            detect_block_size: 5,
            detect_c: 5.0,
            dilate_width: 16,
            dilate_height: 2,
            dilate_iterations: 2,
            min_width: 10,
            min_height: 5,
            mask_blur_kernel: 3,
            mask_block_size: 7,
            mask_c: 4.0,
        }
    }
}

impl SegmenterSettings {
    pub fn validate(&self) -> crate::error::Result<()> {
        for (name, size) in [
            ("detect_block_size", self.detect_block_size),
            ("mask_block_size", self.mask_block_size),
        ] {
            if size < 3 || size % 2 == 0 {
                return Err(InkError::config(format!(
                    "segmenter.{name} must be odd and >= 3, got {size}"
                )));
            }
        }
        for (name, size) in [
            ("median_kernel", self.median_kernel),
            ("mask_blur_kernel", self.mask_blur_kernel),
        ] {
            if size == 0 || size % 2 == 0 {
                return Err(InkError::config(format!(
                    "segmenter.{name} must be odd and > 0, got {size}"
                )));
            }
        }
        if !(1..=MAX_DILATE_SIDE).contains(&self.dilate_width)
            || !(1..=MAX_DILATE_SIDE).contains(&self.dilate_height)
        {
            return Err(InkError::config(format!(
                "segmenter dilation kernel must be 1..={MAX_DILATE_SIDE} on each side, got {}x{}",
                self.dilate_width, self.dilate_height
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
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

impl Default for Settings {
    fn default() -> Self {
        Settings {
            working_max_side: 550,
            segmenter: SegmenterSettings::default(),
            slice_width: 20,
            canvas_width: 700,
            canvas_height: 700,
            background: HexColor::BLACK,
            ink_color: HexColor::WHITE,
            pencil_width: 3.0,
            export_multiplier: 2.0,
            font_family: None,
            font_path: None,
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        let settings: Settings = serde_yml::from_str(yaml).map_err(|e| {
            InkError::config(format!("Failed to parse settings YAML: {e}"))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        self.segmenter.validate()?;
        if self.working_max_side == 0 {
            return Err(InkError::config("working_max_side must be > 0"));
        }
        if self.slice_width == 0 {
            return Err(InkError::config("slice_width must be > 0"));
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(InkError::config(format!(
                "canvas size must be non-empty, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if !(self.pencil_width.is_finite() && self.pencil_width > 0.0) {
            return Err(InkError::config(format!(
                "pencil_width must be > 0, got {}",
                self.pencil_width
            )));
        }
        validate_multiplier(self.export_multiplier)
    }
}

pub(crate) fn validate_multiplier(multiplier: f32) -> crate::error::Result<()> {
    if multiplier.is_finite() && multiplier > 0.0 {
        Ok(())
    } else {
        Err(InkError::config(format!(
            "export_multiplier must be finite and > 0, got {multiplier}"
        )))
    }
}
