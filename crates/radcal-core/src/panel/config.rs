use serde::{Deserialize, Serialize};

use crate::band::PanelReflectance;
use crate::consts::{
    DEFAULT_DETECTED_ROI_INSET, DEFAULT_PANEL_BLUR_SIGMA, DEFAULT_PANEL_MAX_ASPECT_RATIO,
    DEFAULT_PANEL_MIN_AREA, DEFAULT_PANEL_MIN_FILL_RATIO, DEFAULT_PANEL_SIGMA_MULTIPLIER,
};
use crate::region::PixelRegion;

/// Method used to separate the panel from the surrounding scene.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ThresholdMethod {
    /// Threshold = mean + sigma_multiplier * stddev.
    MeanPlusSigma,
    /// Otsu's method on the normalized image.
    #[default]
    Otsu,
    /// Fixed threshold on the image normalized to [0.0, 1.0].
    Fixed(f32),
}

impl std::fmt::Display for ThresholdMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MeanPlusSigma => write!(f, "Mean + Sigma"),
            Self::Otsu => write!(f, "Otsu"),
            Self::Fixed(v) => write!(f, "Fixed ({v})"),
        }
    }
}

/// Parameters of the bright-panel locator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelDetectionConfig {
    #[serde(default)]
    pub threshold_method: ThresholdMethod,
    /// Sigma multiplier for the MeanPlusSigma method.
    #[serde(default = "default_sigma_multiplier")]
    pub sigma_multiplier: f32,
    /// Gaussian blur sigma applied before thresholding. 0 disables the blur.
    #[serde(default = "default_blur_sigma")]
    pub blur_sigma: f32,
    /// Minimum component area in pixels.
    #[serde(default = "default_min_area")]
    pub min_area: usize,
    /// Maximum bounding-box aspect ratio (long side / short side).
    #[serde(default = "default_max_aspect_ratio")]
    pub max_aspect_ratio: f32,
    /// Minimum share of the bounding box covered by the component.
    #[serde(default = "default_min_fill_ratio")]
    pub min_fill_ratio: f32,
}

fn default_sigma_multiplier() -> f32 {
    DEFAULT_PANEL_SIGMA_MULTIPLIER
}
fn default_blur_sigma() -> f32 {
    DEFAULT_PANEL_BLUR_SIGMA
}
fn default_min_area() -> usize {
    DEFAULT_PANEL_MIN_AREA
}
fn default_max_aspect_ratio() -> f32 {
    DEFAULT_PANEL_MAX_ASPECT_RATIO
}
fn default_min_fill_ratio() -> f32 {
    DEFAULT_PANEL_MIN_FILL_RATIO
}

impl Default for PanelDetectionConfig {
    fn default() -> Self {
        Self {
            threshold_method: ThresholdMethod::default(),
            sigma_multiplier: DEFAULT_PANEL_SIGMA_MULTIPLIER,
            blur_sigma: DEFAULT_PANEL_BLUR_SIGMA,
            min_area: DEFAULT_PANEL_MIN_AREA,
            max_aspect_ratio: DEFAULT_PANEL_MAX_ASPECT_RATIO,
            min_fill_ratio: DEFAULT_PANEL_MIN_FILL_RATIO,
        }
    }
}

/// Where the panel radiance is averaged.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum RoiSource {
    /// A fixed pixel rectangle, for rigs with constant panel placement.
    Fixed(PixelRegion),
    /// The detected panel box shrunk by `inset` (fraction of its size) per side.
    Detected { inset: f32 },
}

impl Default for RoiSource {
    fn default() -> Self {
        Self::Fixed(PixelRegion::default())
    }
}

impl RoiSource {
    pub fn detected() -> Self {
        Self::Detected {
            inset: DEFAULT_DETECTED_ROI_INSET,
        }
    }
}

impl std::fmt::Display for RoiSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(region) => write!(f, "Fixed {region}"),
            Self::Detected { inset } => write!(f, "Detected (inset {:.0}%)", inset * 100.0),
        }
    }
}

/// Everything needed to turn a reference capture into a panel measurement.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default)]
    pub roi: RoiSource,
    #[serde(default)]
    pub detection: PanelDetectionConfig,
    #[serde(default)]
    pub reflectance: PanelReflectance,
}
