use tracing::debug;

use crate::frame::Frame;
use crate::region::PixelRegion;

use super::blur::gaussian_blur_array;
use super::components::connected_components;
use super::config::PanelDetectionConfig;
use super::morphology::morphological_opening;
use super::threshold::panel_threshold;

/// A located calibration panel.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelDetection {
    /// Bounding box of the panel.
    pub region: PixelRegion,
    /// Panel area in pixels.
    pub area: usize,
}

/// Finds the calibration panel in a reference capture.
pub trait PanelLocator {
    /// Returns `None` when no panel is visible.
    fn locate(&self, frame: &Frame) -> Option<PanelDetection>;
}

impl<F> PanelLocator for F
where
    F: Fn(&Frame) -> Option<PanelDetection>,
{
    fn locate(&self, frame: &Frame) -> Option<PanelDetection> {
        self(frame)
    }
}

/// Locates the panel as a compact, roughly rectangular bright blob.
///
/// Pipeline: normalize -> Gaussian blur -> threshold -> morphological opening
/// -> connected components -> first (largest) candidate passing the shape checks.
#[derive(Clone, Debug, Default)]
pub struct BrightPanelLocator {
    pub config: PanelDetectionConfig,
}

impl BrightPanelLocator {
    pub fn new(config: PanelDetectionConfig) -> Self {
        Self { config }
    }
}

impl PanelLocator for BrightPanelLocator {
    fn locate(&self, frame: &Frame) -> Option<PanelDetection> {
        let (h, w) = frame.data.dim();
        if h == 0 || w == 0 {
            return None;
        }

        let peak = frame
            .data
            .iter()
            .filter(|v| v.is_finite())
            .fold(0.0f32, |acc, &v| acc.max(v));
        if peak <= 0.0 {
            return None;
        }
        let normalized = frame
            .data
            .mapv(|v| if v.is_finite() { (v / peak).max(0.0) } else { 0.0 });

        let blurred = gaussian_blur_array(&normalized, self.config.blur_sigma);
        let threshold = panel_threshold(&blurred, &self.config)?;
        let mask = morphological_opening(&blurred.mapv(|v| v > threshold));

        let candidate = connected_components(&mask).into_iter().find(|c| {
            c.area >= self.config.min_area
                && !c.touches_border(w, h)
                && c.aspect_ratio() <= self.config.max_aspect_ratio
                && c.fill_ratio() >= self.config.min_fill_ratio
        })?;

        debug!(
            region = %candidate.bbox,
            area = candidate.area,
            threshold,
            "Panel candidate accepted"
        );
        Some(PanelDetection {
            region: candidate.bbox,
            area: candidate.area,
        })
    }
}
