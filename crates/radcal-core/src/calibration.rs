use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::band::Band;
use crate::error::{RadcalError, Result};
use crate::frame::{Frame, PixelUnit};
use crate::io::image_io::load_raw;
use crate::metadata::{CameraSummary, ImageMetadata, MetadataSource};
use crate::panel::{PanelConfig, PanelDetection, PanelLocator, RoiSource};
use crate::radiometry::raw_to_radiance;
use crate::region::PixelRegion;

/// Mean panel radiance measured on a reference capture.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelMeasurement {
    pub band: Band,
    /// W/m^2/nm/sr.
    pub mean_radiance: f64,
    /// Region the mean was taken over.
    pub region: PixelRegion,
    pub detection: PanelDetection,
}

/// Radiance-to-reflectance scale for one band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationFactor {
    pub band: Band,
    pub panel_reflectance: f64,
    pub mean_radiance: f64,
    /// `panel_reflectance / mean_radiance`.
    pub factor: f64,
}

impl CalibrationFactor {
    /// Fails with `InvalidCalibration` unless the radiance is positive and
    /// finite and the resulting factor is positive and finite.
    pub fn compute(band: Band, panel_reflectance: f64, mean_radiance: f64) -> Result<Self> {
        let invalid = || RadcalError::InvalidCalibration {
            band,
            mean_radiance,
        };
        if !mean_radiance.is_finite() || mean_radiance <= 0.0 {
            return Err(invalid());
        }
        let factor = panel_reflectance / mean_radiance;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(invalid());
        }
        Ok(Self {
            band,
            panel_reflectance,
            mean_radiance,
            factor,
        })
    }

    /// Scale a radiance frame to reflectance.
    pub fn apply(&self, radiance: &Frame) -> Frame {
        let k = self.factor as f32;
        radiance.with_data(radiance.data.mapv(|v| v * k), PixelUnit::Reflectance)
    }
}

/// Everything derived from one band's reference capture.
#[derive(Clone, Debug)]
pub struct ReferenceCalibration {
    pub path: PathBuf,
    pub summary: CameraSummary,
    pub metadata: ImageMetadata,
    pub measurement: PanelMeasurement,
    pub factor: CalibrationFactor,
}

/// Resolve the averaging region for a detected panel.
pub fn panel_region(roi: &RoiSource, detection: &PanelDetection) -> PixelRegion {
    match roi {
        RoiSource::Fixed(region) => *region,
        RoiSource::Detected { inset } => detection.region.inset(*inset),
    }
}

/// Average `radiance` over the configured panel region.
pub fn measure_panel(
    band: Band,
    radiance: &Frame,
    detection: PanelDetection,
    roi: &RoiSource,
) -> Result<PanelMeasurement> {
    let region = panel_region(roi, &detection);
    let mean_radiance = region.mean(&radiance.data)?;
    Ok(PanelMeasurement {
        band,
        mean_radiance,
        region,
        detection,
    })
}

/// Compute the calibration factor of `band` from its reference capture.
///
/// Reads metadata, decodes raw counts, converts to radiance, locates the
/// panel and averages radiance over the panel region.
pub fn calibrate_reference(
    path: &Path,
    band: Band,
    metadata: &dyn MetadataSource,
    locator: &dyn PanelLocator,
    panel: &PanelConfig,
) -> Result<ReferenceCalibration> {
    if !path.is_file() {
        return Err(RadcalError::ReferenceNotFound {
            path: path.to_path_buf(),
        });
    }

    let meta = metadata.read(path)?;
    let summary = meta.camera_summary();
    check_band_name(&meta, band);

    let raw = load_raw(path)?;
    let radiance = raw_to_radiance(&meta, &raw)?;
    debug!(file = %path.display(), band = %band, "Reference converted to radiance");

    let detection = locator
        .locate(&radiance)
        .ok_or_else(|| RadcalError::PanelNotDetected {
            path: path.to_path_buf(),
        })?;

    let measurement = measure_panel(band, &radiance, detection, &panel.roi)?;
    let factor = CalibrationFactor::compute(
        band,
        panel.reflectance.get(band),
        measurement.mean_radiance,
    )?;

    info!(
        band = %band,
        region = %measurement.region,
        mean_radiance = measurement.mean_radiance,
        factor = factor.factor,
        "Computed calibration factor"
    );

    Ok(ReferenceCalibration {
        path: path.to_path_buf(),
        summary,
        metadata: meta,
        measurement,
        factor,
    })
}

/// Warn when `XMP:BandName` disagrees with the positional band.
fn check_band_name(meta: &ImageMetadata, band: Band) {
    match meta.band_name().map(|name| Band::from_name(&name)) {
        Ok(Ok(found)) if found == band => {}
        Ok(Ok(found)) => warn!(
            file = %meta.path().display(),
            expected = %band,
            found = %found,
            "Band name in metadata does not match capture index"
        ),
        Ok(Err(e)) => warn!(file = %meta.path().display(), error = %e, "Unrecognized band name"),
        Err(_) => debug!(file = %meta.path().display(), "No band name in metadata"),
    }
}
