use std::path::PathBuf;

use thiserror::Error;

use crate::band::Band;

#[derive(Error, Debug)]
pub enum RadcalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("TIFF encoding error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("Metadata JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Metadata field {key} missing in {}", path.display())]
    MetadataMissing { key: String, path: PathBuf },

    #[error("Metadata field {key} in {} is invalid: {reason}", path.display())]
    MetadataInvalid {
        key: String,
        path: PathBuf,
        reason: String,
    },

    #[error("exiftool failed: {0}")]
    ExifTool(String),

    #[error("Reference image not found: {}", path.display())]
    ReferenceNotFound { path: PathBuf },

    #[error("Panel not detected in {}", path.display())]
    PanelNotDetected { path: PathBuf },

    #[error("Invalid calibration for {band}: mean panel radiance {mean_radiance}")]
    InvalidCalibration { band: Band, mean_radiance: f64 },

    #[error("Invalid panel region [{uly}:{lry}, {ulx}:{lrx}] for {width}x{height} image")]
    InvalidRegion {
        ulx: usize,
        uly: usize,
        lrx: usize,
        lry: usize,
        width: usize,
        height: usize,
    },

    #[error("Image is {actual_width}x{actual_height} but metadata says {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    #[error("Unknown band: {0}")]
    UnknownBand(String),
}

impl RadcalError {
    /// True for errors raised by the panel locator.
    pub fn is_panel_not_detected(&self) -> bool {
        matches!(self, Self::PanelNotDetected { .. })
    }
}

pub type Result<T> = std::result::Result<T, RadcalError>;
