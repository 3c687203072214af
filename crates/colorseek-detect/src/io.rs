//! JSON configuration and report helpers.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::color_mask::ColorBand;
use crate::contour::SelectionPolicy;
use crate::detector::{ConfigError, DetectionResult, Detector, DetectorParams};
use crate::region::ExclusionRegion;

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// On-disk detector configuration.
///
/// Every field is optional; missing ones fall back to
/// [`DetectorParams::default`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectConfig {
    #[serde(default)]
    pub color_band: Option<ColorBand>,
    #[serde(default)]
    pub pre_search: Option<Vec<ExclusionRegion>>,
    #[serde(default)]
    pub post_search: Option<Vec<ExclusionRegion>>,
    #[serde(default)]
    pub selection: Option<SelectionPolicy>,
    #[serde(default)]
    pub blur_sigma: Option<f32>,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl DetectConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("colorseek_report.json"))
    }

    /// Detector parameters with the overrides from this config applied.
    pub fn build_params(&self) -> DetectorParams {
        let mut params = DetectorParams::default();
        if let Some(band) = self.color_band {
            params.color_band = band;
        }
        if let Some(pre) = self.pre_search.clone() {
            params.pre_search = pre;
        }
        if let Some(post) = self.post_search.clone() {
            params.post_search = post;
        }
        if let Some(selection) = self.selection {
            params.selection = selection;
        }
        params.blur_sigma = self.blur_sigma;
        params
    }

    /// Build a validated detector from this config.
    pub fn build_detector(&self) -> Result<Detector, ConfigError> {
        Detector::new(self.build_params())
    }
}

/// Per-frame entry of a [`DetectReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Frame label, typically the source file name or a sequence number.
    pub frame: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub detection: Option<DetectionResult>,
    #[serde(default)]
    pub error: Option<String>,
}

impl FrameReport {
    pub fn new(frame: impl Into<String>) -> Self {
        Self {
            frame: frame.into(),
            width: None,
            height: None,
            detection: None,
            error: None,
        }
    }

    /// Populate from a successful detection.
    pub fn set_detection(&mut self, width: u32, height: u32, result: DetectionResult) {
        self.width = Some(width);
        self.height = Some(height);
        self.detection = Some(result);
        self.error = None;
    }

    /// Record why the frame was skipped.
    pub fn set_error(&mut self, err: &impl std::fmt::Display) {
        self.detection = None;
        self.error = Some(err.to_string());
    }
}

/// Report for a whole run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectReport {
    #[serde(default)]
    pub config_path: Option<String>,
    pub params: DetectorParams,
    pub frames: Vec<FrameReport>,
}

impl DetectReport {
    pub fn new(params: DetectorParams, config_path: Option<&Path>) -> Self {
        Self {
            config_path: config_path.map(|p| p.to_string_lossy().into_owned()),
            params,
            frames: Vec::new(),
        }
    }

    pub fn num_acquired(&self) -> usize {
        self.frames
            .iter()
            .filter(|f| f.detection.is_some_and(|d| d.acquired))
            .count()
    }

    pub fn num_skipped(&self) -> usize {
        self.frames.iter().filter(|f| f.error.is_some()).count()
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
