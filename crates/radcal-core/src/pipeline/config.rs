use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::band::Band;
use crate::consts::{CAPTURE_PREFIX, DEFAULT_IMAGE_DIR, RAW_EXTENSION, REFERENCE_MARKER};
use crate::io::OutputFormat;
use crate::metadata::{ExifTool, JsonSidecar, MetadataSource};
use crate::panel::PanelConfig;
use crate::undistort::CameraMatrixMode;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory holding reference and flight captures.
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,
    /// Directory converted images are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Bands to process, in order.
    #[serde(default = "default_bands")]
    pub bands: Vec<Band>,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub metadata: MetadataBackend,
    #[serde(default)]
    pub panel: PanelConfig,
    #[serde(default)]
    pub conversion: ConversionConfig,
    #[serde(default)]
    pub failure: FailurePolicy,
}

fn default_image_dir() -> PathBuf {
    DEFAULT_IMAGE_DIR.iter().fold(PathBuf::from("."), |p, part| p.join(part))
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_bands() -> Vec<Band> {
    Band::ALL.to_vec()
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            image_dir: default_image_dir(),
            output_dir: default_output_dir(),
            bands: default_bands(),
            reference: ReferenceConfig::default(),
            metadata: MetadataBackend::default(),
            panel: PanelConfig::default(),
            conversion: ConversionConfig::default(),
            failure: FailurePolicy::default(),
        }
    }
}

impl RunConfig {
    /// Configured bands in order, each once.
    pub fn unique_bands(&self) -> Vec<Band> {
        let mut bands = Vec::with_capacity(self.bands.len());
        for &band in &self.bands {
            if !bands.contains(&band) {
                bands.push(band);
            }
        }
        bands
    }

    /// Path of the reference capture for `band`.
    pub fn reference_path(&self, band: Band) -> PathBuf {
        self.image_dir.join(self.reference.file_name(band))
    }
}

/// Naming of reference (panel) captures: `<prefix>_<marker>_<band index>.tif`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    pub prefix: String,
    /// Also excludes matching files from flight batches.
    pub marker: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            prefix: CAPTURE_PREFIX.to_string(),
            marker: REFERENCE_MARKER.to_string(),
        }
    }
}

impl ReferenceConfig {
    pub fn file_name(&self, band: Band) -> String {
        format!(
            "{}_{}_{}.{}",
            self.prefix,
            self.marker,
            band.index(),
            RAW_EXTENSION
        )
    }
}

/// Where image metadata comes from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MetadataBackend {
    /// Run exiftool. Without an explicit executable the `exiftoolpath`
    /// environment variable (Windows) or `PATH` is used.
    ExifTool {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        executable: Option<PathBuf>,
    },
    /// Read `<image>.json` files saved from `exiftool -j -n -G`.
    Sidecar,
}

impl Default for MetadataBackend {
    fn default() -> Self {
        Self::ExifTool { executable: None }
    }
}

impl MetadataBackend {
    pub fn source(&self) -> Box<dyn MetadataSource> {
        match self {
            Self::ExifTool { executable } => Box::new(ExifTool::discover(executable.as_deref())),
            Self::Sidecar => Box::new(JsonSidecar),
        }
    }
}

impl std::fmt::Display for MetadataBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExifTool { executable: None } => write!(f, "exiftool"),
            Self::ExifTool {
                executable: Some(path),
            } => write!(f, "exiftool ({})", path.display()),
            Self::Sidecar => write!(f, "JSON sidecar"),
        }
    }
}

/// Which metadata converts a flight capture to radiance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetadataScope {
    /// The flight capture's own exposure, gain and calibration.
    #[default]
    Own,
    /// The band's reference capture metadata, for every flight capture.
    Reference,
}

impl std::fmt::Display for MetadataScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Own => write!(f, "Own"),
            Self::Reference => write!(f, "Reference"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversionConfig {
    #[serde(default)]
    pub flight_metadata: MetadataScope,
    #[serde(default = "default_true")]
    pub undistort: bool,
    #[serde(default)]
    pub camera_matrix: CameraMatrixMode,
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_true() -> bool {
    true
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            flight_metadata: MetadataScope::default(),
            undistort: true,
            camera_matrix: CameraMatrixMode::default(),
            output_format: OutputFormat::default(),
        }
    }
}

/// What to do when a unit of work fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorPolicy {
    /// Stop at the first failure.
    Abort,
    /// Record the failure and carry on with the next unit.
    #[default]
    Continue,
}

impl std::fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Abort => write!(f, "Abort"),
            Self::Continue => write!(f, "Continue"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FailurePolicy {
    /// A band fails when its reference cannot be calibrated or its batch aborts.
    #[serde(default)]
    pub on_band_error: ErrorPolicy,
    #[serde(default)]
    pub on_image_error: ErrorPolicy,
}
