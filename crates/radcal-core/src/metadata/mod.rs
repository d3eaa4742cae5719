pub mod exiftool;
pub mod sidecar;

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{RadcalError, Result};

pub use exiftool::ExifTool;
pub use sidecar::JsonSidecar;

/// Anything that can produce EXIF/XMP metadata for an image file.
pub trait MetadataSource {
    fn read(&self, path: &Path) -> Result<ImageMetadata>;
}

/// EXIF/XMP fields of one image, keyed by group-qualified exiftool names
/// such as `EXIF:ExposureTime` or `XMP:BandName`.
#[derive(Clone, Debug)]
pub struct ImageMetadata {
    path: PathBuf,
    fields: Map<String, Value>,
}

impl ImageMetadata {
    pub fn new(path: impl Into<PathBuf>, fields: Map<String, Value>) -> Self {
        Self {
            path: path.into(),
            fields,
        }
    }

    /// Parse `exiftool -j -n -G` output. Exiftool emits an array with one
    /// object per file; the first object is used.
    pub fn from_exiftool_json(path: impl Into<PathBuf>, json: &str) -> Result<Self> {
        let path = path.into();
        let value: Value = serde_json::from_str(json)?;
        let object = match value {
            Value::Array(items) => items.into_iter().next(),
            other => Some(other),
        };
        match object {
            Some(Value::Object(fields)) => Ok(Self { path, fields }),
            _ => Err(RadcalError::MetadataInvalid {
                key: "<root>".to_string(),
                path,
                reason: "expected a JSON object".to_string(),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_item(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    fn require(&self, key: &str) -> Result<&Value> {
        self.get_item(key).ok_or_else(|| RadcalError::MetadataMissing {
            key: key.to_string(),
            path: self.path.clone(),
        })
    }

    fn invalid(&self, key: &str, reason: impl Into<String>) -> RadcalError {
        RadcalError::MetadataInvalid {
            key: key.to_string(),
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<String> {
        match self.require(key)? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(self.invalid(key, format!("expected text, got {other}"))),
        }
    }

    pub fn get_f64(&self, key: &str) -> Result<f64> {
        let value = self.require(key)?;
        match numbers_from_value(value).as_deref() {
            Some([v]) => Ok(*v),
            _ => Err(self.invalid(key, format!("expected a number, got {value}"))),
        }
    }

    pub fn get_f64_list(&self, key: &str) -> Result<Vec<f64>> {
        let value = self.require(key)?;
        numbers_from_value(value)
            .ok_or_else(|| self.invalid(key, format!("expected a list of numbers, got {value}")))
    }

    fn get_fixed<const N: usize>(&self, key: &str) -> Result<[f64; N]> {
        let list = self.get_f64_list(key)?;
        <[f64; N]>::try_from(list.as_slice())
            .map_err(|_| self.invalid(key, format!("expected {N} values, got {}", list.len())))
    }

    fn optional_f64(&self, key: &str) -> Option<f64> {
        self.get_item(key)
            .and_then(numbers_from_value)
            .and_then(|v| v.first().copied())
    }

    fn optional_str(&self, key: &str) -> Option<String> {
        self.get_item(key).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Exposure time in seconds.
    pub fn exposure_time(&self) -> Result<f64> {
        let t = self.get_f64("EXIF:ExposureTime")?;
        if t <= 0.0 {
            return Err(self.invalid("EXIF:ExposureTime", "must be positive"));
        }
        Ok(t)
    }

    /// Imager gain (`ISOSpeed / 100`).
    pub fn gain(&self) -> Result<f64> {
        let iso = self.get_f64("EXIF:ISOSpeed")?;
        if iso <= 0.0 {
            return Err(self.invalid("EXIF:ISOSpeed", "must be positive"));
        }
        Ok(iso / 100.0)
    }

    /// Image dimensions as `(width, height)`.
    pub fn dimensions(&self) -> Result<(usize, usize)> {
        let w = self.get_f64("EXIF:ImageWidth")?;
        let h = self.get_f64("EXIF:ImageHeight")?;
        Ok((w as usize, h as usize))
    }

    pub fn bits_per_sample(&self) -> Result<u32> {
        Ok(self.get_f64("EXIF:BitsPerSample")? as u32)
    }

    pub fn band_name(&self) -> Result<String> {
        self.get_str("XMP:BandName")
    }

    /// Dark level in counts: mean of the dark row values when present,
    /// otherwise mean of the EXIF black level, otherwise zero.
    pub fn black_level(&self) -> Result<f64> {
        for key in ["XMP:DarkRowValue", "EXIF:BlackLevel"] {
            if self.get_item(key).is_some() {
                let values = self.get_f64_list(key)?;
                if values.is_empty() {
                    return Err(self.invalid(key, "empty list"));
                }
                return Ok(values.iter().sum::<f64>() / values.len() as f64);
            }
        }
        Ok(0.0)
    }

    /// Radiometric calibration coefficients `[a1, a2, a3]`.
    pub fn radiometric_calibration(&self) -> Result<[f64; 3]> {
        self.get_fixed::<3>("XMP:RadiometricCalibration")
    }

    /// Vignetting center `(x, y)` in pixels.
    pub fn vignetting_center(&self) -> Result<(f64, f64)> {
        let [x, y] = self.get_fixed::<2>("XMP:VignettingCenter")?;
        Ok((x, y))
    }

    /// Vignetting polynomial coefficients, lowest order first (k1 * r + k2 * r^2 ...).
    pub fn vignetting_polynomial(&self) -> Result<Vec<f64>> {
        self.get_f64_list("XMP:VignettingPolynomial")
    }

    /// Lens distortion `[k1, k2, k3, p1, p2]`.
    pub fn perspective_distortion(&self) -> Result<[f64; 5]> {
        self.get_fixed::<5>("XMP:PerspectiveDistortion")
    }

    /// Principal point `(x, y)` in millimetres.
    pub fn principal_point_mm(&self) -> Result<(f64, f64)> {
        let [x, y] = self.get_fixed::<2>("XMP:PrincipalPoint")?;
        Ok((x, y))
    }

    /// Focal plane resolution `(x, y)` in pixels per millimetre.
    pub fn focal_plane_resolution_px_per_mm(&self) -> Result<(f64, f64)> {
        let x = self.get_f64("EXIF:FocalPlaneXResolution")?;
        let y = self.get_f64("EXIF:FocalPlaneYResolution")?;
        if x <= 0.0 || y <= 0.0 {
            return Err(self.invalid("EXIF:FocalPlaneXResolution", "must be positive"));
        }
        Ok((x, y))
    }

    /// Focal length in millimetres. `XMP:PerspectiveFocalLength` is in pixels
    /// unless `XMP:PerspectiveFocalLengthUnits` says `mm`.
    pub fn focal_length_mm(&self) -> Result<f64> {
        let value = self.get_f64("XMP:PerspectiveFocalLength")?;
        let units = self.optional_str("XMP:PerspectiveFocalLengthUnits");
        if units.as_deref().map(str::trim) == Some("mm") {
            Ok(value)
        } else {
            let (res_x, _) = self.focal_plane_resolution_px_per_mm()?;
            Ok(value / res_x)
        }
    }

    /// Descriptive fields for console diagnostics. Missing fields are `None`.
    pub fn camera_summary(&self) -> CameraSummary {
        CameraSummary {
            make: self.optional_str("EXIF:Make"),
            model: self.optional_str("EXIF:Model"),
            firmware: self.optional_str("EXIF:Software"),
            exposure_time: self.optional_f64("EXIF:ExposureTime"),
            gain: self.optional_f64("EXIF:ISOSpeed").map(|iso| iso / 100.0),
            width: self.optional_f64("EXIF:ImageWidth").map(|v| v as usize),
            height: self.optional_f64("EXIF:ImageHeight").map(|v| v as usize),
            band_name: self.optional_str("XMP:BandName"),
            center_wavelength: self.optional_f64("XMP:CentralWavelength"),
            bandwidth: self.optional_f64("XMP:WavelengthFWHM"),
            capture_id: self.optional_str("XMP:CaptureId"),
            flight_id: self.optional_str("XMP:FlightId"),
            focal_length: self
                .optional_f64("XMP:FocalLength")
                .or_else(|| self.optional_f64("EXIF:FocalLength")),
        }
    }
}

/// Camera and exposure details of a capture, as printed for reference images.
#[derive(Clone, Debug, Default)]
pub struct CameraSummary {
    pub make: Option<String>,
    pub model: Option<String>,
    pub firmware: Option<String>,
    /// Seconds.
    pub exposure_time: Option<f64>,
    pub gain: Option<f64>,
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub band_name: Option<String>,
    /// Nanometres.
    pub center_wavelength: Option<f64>,
    /// Full width at half maximum, nanometres.
    pub bandwidth: Option<f64>,
    pub capture_id: Option<String>,
    pub flight_id: Option<String>,
    pub focal_length: Option<f64>,
}

/// Interpret a JSON value as a list of numbers.
///
/// Exiftool emits lists as arrays, but with `-n` some list-valued tags come
/// through as space or comma separated strings (`"4800 4800 4800 4800"`).
fn numbers_from_value(value: &Value) -> Option<Vec<f64>> {
    match value {
        Value::Number(n) => n.as_f64().map(|v| vec![v]),
        Value::String(s) => parse_number_list(s),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

fn parse_number_list(s: &str) -> Option<Vec<f64>> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse().ok())
        .collect()
}
