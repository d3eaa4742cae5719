use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::band::Band;
use crate::calibration::ReferenceCalibration;
use crate::consts::{OUTPUT_PREFIX, RAW_EXTENSION};
use crate::error::{RadcalError, Result};
use crate::io::image_io::{load_raw, save_output};
use crate::io::OutputFormat;
use crate::metadata::{ImageMetadata, MetadataSource};
use crate::pipeline::config::{ConversionConfig, ErrorPolicy, MetadataScope, RunConfig};
use crate::pipeline::{PipelineStage, ProgressReporter};
use crate::radiometry::raw_to_radiance;
use crate::undistort::correct_lens_distortion;

/// Filename pattern of a band's captures: anything ending in `<index>.tif`.
pub fn band_file_pattern(band: Band) -> Regex {
    Regex::new(&format!(r"^.*{}\.{}$", band.index(), RAW_EXTENSION))
        .expect("band pattern is a valid regex")
}

/// True if `file_name` is a flight capture of the band matched by `pattern`,
/// i.e. it matches and is not a reference capture.
pub fn is_flight_image(file_name: &str, pattern: &Regex, reference_marker: &str) -> bool {
    pattern.is_match(file_name) && !file_name.contains(reference_marker)
}

/// Flight captures of `band` in `dir`, sorted by filename.
pub fn select_flight_images(dir: &Path, band: Band, reference_marker: &str) -> Result<Vec<PathBuf>> {
    let pattern = band_file_pattern(band);
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if is_flight_image(name, &pattern, reference_marker) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// `Result <stem> <band>.<ext>` for a flight capture.
pub fn output_file_name(source: &Path, band: Band, format: OutputFormat) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{OUTPUT_PREFIX} {stem} {band}.{}", format.extension())
}

/// A flight capture written as reflectance.
#[derive(Clone, Debug)]
pub struct FlightConversion {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// A flight capture that could not be converted.
#[derive(Debug)]
pub struct ImageFailure {
    pub source: PathBuf,
    pub error: RadcalError,
}

/// Outcome of converting one band's flight captures.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<FlightConversion>,
    pub failures: Vec<ImageFailure>,
}

/// Convert one flight capture: raw -> radiance -> reflectance -> undistorted,
/// then write it to `output_dir`.
pub fn convert_flight_image(
    source: &Path,
    reference: &ReferenceCalibration,
    metadata: &dyn MetadataSource,
    conversion: &ConversionConfig,
    output_dir: &Path,
) -> Result<PathBuf> {
    let own;
    let meta: &ImageMetadata = match conversion.flight_metadata {
        MetadataScope::Own => {
            own = metadata.read(source)?;
            &own
        }
        MetadataScope::Reference => &reference.metadata,
    };

    let raw = load_raw(source)?;
    let radiance = raw_to_radiance(meta, &raw)?;
    let reflectance = reference.factor.apply(&radiance);
    let result = if conversion.undistort {
        correct_lens_distortion(meta, &reflectance, conversion.camera_matrix)?
    } else {
        reflectance
    };

    let band = reference.factor.band;
    let output = output_dir.join(output_file_name(source, band, conversion.output_format));
    save_output(&result, &output, conversion.output_format)?;
    debug!(
        source = %source.display(),
        output = %output.display(),
        width = result.width(),
        height = result.height(),
        "Converted flight image"
    );
    Ok(output)
}

/// Convert every flight capture of the reference's band.
///
/// Files are processed one at a time in filename order. With
/// `ErrorPolicy::Abort` the first failing image fails the whole batch;
/// with `ErrorPolicy::Continue` failures are recorded and the batch goes on.
pub fn run_batch(
    reference: &ReferenceCalibration,
    config: &RunConfig,
    metadata: &dyn MetadataSource,
    reporter: &Arc<dyn ProgressReporter>,
) -> Result<BatchReport> {
    let band = reference.factor.band;
    let files = select_flight_images(&config.image_dir, band, &config.reference.marker)?;
    info!(band = %band, files = files.len(), "Converting flight images");

    std::fs::create_dir_all(&config.output_dir)?;

    let mut report = BatchReport::default();
    reporter.begin_stage(PipelineStage::Converting, Some(files.len()));
    for (i, source) in files.into_iter().enumerate() {
        match convert_flight_image(
            &source,
            reference,
            metadata,
            &config.conversion,
            &config.output_dir,
        ) {
            Ok(output) => report.converted.push(FlightConversion { source, output }),
            Err(error) => match config.failure.on_image_error {
                ErrorPolicy::Abort => {
                    reporter.finish_stage();
                    return Err(error);
                }
                ErrorPolicy::Continue => {
                    warn!(
                        band = %band,
                        file = %source.display(),
                        error = %error,
                        "Skipping flight image"
                    );
                    report.failures.push(ImageFailure { source, error });
                }
            },
        }
        reporter.advance(i + 1);
    }
    reporter.finish_stage();

    info!(
        band = %band,
        converted = report.converted.len(),
        failed = report.failures.len(),
        "Batch complete"
    );
    Ok(report)
}
