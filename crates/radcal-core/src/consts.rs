/// Substring that marks a reference (panel) capture in a filename.
pub const REFERENCE_MARKER: &str = "0000";

/// Filename prefix of raw captures (`IMG_<capture>_<band>.tif`).
pub const CAPTURE_PREFIX: &str = "IMG";

/// Extension of raw captures.
pub const RAW_EXTENSION: &str = "tif";

/// Prefix of converted output files.
pub const OUTPUT_PREFIX: &str = "Result";

/// Default image root, relative to the working directory.
pub const DEFAULT_IMAGE_DIR: [&str; 3] = ["data", "DOLE", "000"];

/// Environment variable holding the exiftool path on Windows.
pub const EXIFTOOL_PATH_ENV: &str = "exiftoolpath";

/// Executable name used when exiftool is expected on `PATH`.
pub const EXIFTOOL_BINARY: &str = "exiftool";

/// Default panel region of interest: upper-left column.
pub const DEFAULT_PANEL_ULX: usize = 660;

/// Default panel region of interest: upper-left row.
pub const DEFAULT_PANEL_ULY: usize = 490;

/// Default panel region of interest: lower-right column (exclusive).
pub const DEFAULT_PANEL_LRX: usize = 840;

/// Default panel region of interest: lower-right row (exclusive).
pub const DEFAULT_PANEL_LRY: usize = 670;

/// Known panel reflectance, Blue band.
pub const PANEL_REFLECTANCE_BLUE: f64 = 0.5105;

/// Known panel reflectance, Green band.
pub const PANEL_REFLECTANCE_GREEN: f64 = 0.50993;

/// Known panel reflectance, Red band.
pub const PANEL_REFLECTANCE_RED: f64 = 0.50921;

/// Known panel reflectance, Red edge band.
pub const PANEL_REFLECTANCE_RED_EDGE: f64 = 0.50889;

/// Known panel reflectance, NIR band.
pub const PANEL_REFLECTANCE_NIR: f64 = 0.50807;

/// Fraction trimmed from each side of a detected panel box before averaging.
pub const DEFAULT_DETECTED_ROI_INSET: f32 = 0.2;

/// Gaussian blur sigma applied before panel thresholding.
pub const DEFAULT_PANEL_BLUR_SIGMA: f32 = 2.0;

/// Sigma multiplier for MeanPlusSigma panel thresholding.
pub const DEFAULT_PANEL_SIGMA_MULTIPLIER: f32 = 1.5;

/// Minimum connected component area (pixels) for a panel candidate.
pub const DEFAULT_PANEL_MIN_AREA: usize = 400;

/// Maximum bounding-box aspect ratio (long side / short side) of a panel.
pub const DEFAULT_PANEL_MAX_ASPECT_RATIO: f32 = 2.0;

/// Minimum fraction of the bounding box covered by the panel component.
pub const DEFAULT_PANEL_MIN_FILL_RATIO: f32 = 0.6;

/// Number of histogram bins for Otsu's thresholding.
pub const OTSU_HISTOGRAM_BINS: usize = 256;

/// Grid size of border samples used to fit the undistorted outer rectangle.
pub const UNDISTORT_BORDER_SAMPLES: usize = 9;

/// Fixed-point iterations when inverting the distortion model.
pub const UNDISTORT_ITERATIONS: usize = 8;
