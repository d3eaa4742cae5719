#[allow(dead_code)]
mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use approx::assert_relative_eq;
use tempfile::TempDir;

use radcal_core::band::Band;
use radcal_core::batch::{
    band_file_pattern, convert_flight_image, is_flight_image, output_file_name, run_batch,
    select_flight_images,
};
use radcal_core::calibration::{calibrate_reference, ReferenceCalibration};
use radcal_core::error::RadcalError;
use radcal_core::io::image_io::load_float_tiff;
use radcal_core::io::OutputFormat;
use radcal_core::metadata::JsonSidecar;
use radcal_core::panel::{BrightPanelLocator, PanelConfig, RoiSource};
use radcal_core::pipeline::config::{
    ConversionConfig, ErrorPolicy, MetadataBackend, MetadataScope, RunConfig,
};
use radcal_core::pipeline::{NoOpReporter, ProgressReporter};

fn touch(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"").unwrap();
}

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

fn calibrate(dir: &Path, band: Band) -> ReferenceCalibration {
    let reference = dir.join(format!("IMG_0000_{}.tif", band.index()));
    calibrate_reference(
        &reference,
        band,
        &JsonSidecar,
        &BrightPanelLocator::default(),
        &PanelConfig {
            roi: RoiSource::detected(),
            ..PanelConfig::default()
        },
    )
    .unwrap()
}

fn run_config(dir: &Path, out: &Path) -> RunConfig {
    let mut config = RunConfig {
        image_dir: dir.to_path_buf(),
        output_dir: out.to_path_buf(),
        metadata: MetadataBackend::Sidecar,
        ..RunConfig::default()
    };
    config.conversion.undistort = false;
    config.conversion.output_format = OutputFormat::Tiff;
    config
}

fn reporter() -> Arc<dyn ProgressReporter> {
    Arc::new(NoOpReporter)
}

#[test]
fn test_reference_captures_never_selected() {
    for band in Band::ALL {
        let pattern = band_file_pattern(band);
        let reference = format!("IMG_0000_{}.tif", band.index());
        let flight = format!("IMG_0001_{}.tif", band.index());
        assert!(pattern.is_match(&reference));
        assert!(!is_flight_image(&reference, &pattern, "0000"));
        assert!(is_flight_image(&flight, &pattern, "0000"));
    }
}

#[test]
fn test_select_flight_images_sorted_and_filtered() {
    let dir = TempDir::new().unwrap();
    for name in [
        "IMG_0010_1.tif",
        "IMG_0002_1.tif",
        "IMG_0000_1.tif",
        "IMG_0001_1.tif",
        "IMG_0001_2.tif",
        "IMG_0001_1.json",
        "notes.txt",
    ] {
        touch(dir.path(), name);
    }
    std::fs::create_dir(dir.path().join("IMG_0003_1.tif")).unwrap();

    let files = select_flight_images(dir.path(), Band::Blue, "0000").unwrap();
    assert_eq!(
        names(&files),
        vec!["IMG_0001_1.tif", "IMG_0002_1.tif", "IMG_0010_1.tif"]
    );

    let green = select_flight_images(dir.path(), Band::Green, "0000").unwrap();
    assert_eq!(names(&green), vec!["IMG_0001_2.tif"]);
}

#[test]
fn test_select_flight_images_empty_dir() {
    let dir = TempDir::new().unwrap();
    assert!(select_flight_images(dir.path(), Band::Red, "0000")
        .unwrap()
        .is_empty());
}

#[test]
fn test_select_flight_images_missing_dir() {
    let dir = TempDir::new().unwrap();
    let err = select_flight_images(&dir.path().join("absent"), Band::Red, "0000").unwrap_err();
    assert!(matches!(err, RadcalError::Io(_)));
}

#[test]
fn test_output_names_per_format() {
    let source = Path::new("IMG_0007_3.tif");
    assert_eq!(
        output_file_name(source, Band::Red, OutputFormat::Png),
        "Result IMG_0007_3 Red.png"
    );
    assert_eq!(
        output_file_name(source, Band::Red, OutputFormat::Tiff),
        "Result IMG_0007_3 Red.tif"
    );
}

#[test]
fn test_convert_flight_image_writes_reflectance() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    common::write_band_set(dir.path(), Band::Blue, 1);
    let reference = calibrate(dir.path(), Band::Blue);
    let conversion = ConversionConfig {
        undistort: false,
        output_format: OutputFormat::Tiff,
        ..ConversionConfig::default()
    };

    let output = convert_flight_image(
        &dir.path().join("IMG_0001_1.tif"),
        &reference,
        &JsonSidecar,
        &conversion,
        out.path(),
    )
    .unwrap();
    assert_eq!(output, out.path().join("Result IMG_0001_1 Blue.tif"));

    let frame = load_float_tiff(&output).unwrap();
    // Flight panel radiance 0.1 over a reference panel radiance of 0.25.
    let expected = 0.1 * 0.5105 / reference.measurement.mean_radiance;
    assert_relative_eq!(frame.data[[40, 48]] as f64, expected, epsilon = 1e-4);
}

#[test]
fn test_run_batch_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    common::write_band_set(dir.path(), Band::Green, 2);
    let reference = calibrate(dir.path(), Band::Green);
    let mut config = run_config(dir.path(), out.path());
    config.conversion.output_format = OutputFormat::Png;

    let first = run_batch(&reference, &config, &JsonSidecar, &reporter()).unwrap();
    assert_eq!(first.converted.len(), 2);
    let bytes: Vec<Vec<u8>> = first
        .converted
        .iter()
        .map(|c| std::fs::read(&c.output).unwrap())
        .collect();

    let second = run_batch(&reference, &config, &JsonSidecar, &reporter()).unwrap();
    for (conversion, before) in second.converted.iter().zip(&bytes) {
        assert_eq!(&std::fs::read(&conversion.output).unwrap(), before);
    }
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 2);
}

#[test]
fn test_run_batch_continue_records_failures() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    common::write_band_set(dir.path(), Band::Red, 2);
    std::fs::remove_file(dir.path().join("IMG_0001_3.json")).unwrap();
    let reference = calibrate(dir.path(), Band::Red);
    let config = run_config(dir.path(), out.path());

    let report = run_batch(&reference, &config, &JsonSidecar, &reporter()).unwrap();
    assert_eq!(report.converted.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].source, dir.path().join("IMG_0001_3.tif"));
    assert!(matches!(
        report.failures[0].error,
        RadcalError::MetadataMissing { .. }
    ));
}

#[test]
fn test_run_batch_abort_stops_at_first_failure() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    common::write_band_set(dir.path(), Band::Red, 2);
    std::fs::remove_file(dir.path().join("IMG_0001_3.json")).unwrap();
    let reference = calibrate(dir.path(), Band::Red);
    let mut config = run_config(dir.path(), out.path());
    config.failure.on_image_error = ErrorPolicy::Abort;

    let err = run_batch(&reference, &config, &JsonSidecar, &reporter()).unwrap_err();
    assert!(matches!(err, RadcalError::MetadataMissing { .. }));
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_reference_metadata_scope_needs_no_flight_sidecar() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    common::write_band_set(dir.path(), Band::Nir, 1);
    std::fs::remove_file(dir.path().join("IMG_0001_4.json")).unwrap();
    let reference = calibrate(dir.path(), Band::Nir);
    let mut config = run_config(dir.path(), out.path());
    config.conversion.flight_metadata = MetadataScope::Reference;

    let report = run_batch(&reference, &config, &JsonSidecar, &reporter()).unwrap();
    assert_eq!(report.converted.len(), 1);
    assert!(report.failures.is_empty());
}

#[test]
fn test_run_batch_creates_output_dir() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let nested = out.path().join("results").join("nir");
    common::write_band_set(dir.path(), Band::Nir, 1);
    let reference = calibrate(dir.path(), Band::Nir);
    let config = run_config(dir.path(), &nested);

    let report = run_batch(&reference, &config, &JsonSidecar, &reporter()).unwrap();
    assert_eq!(report.converted.len(), 1);
    assert!(nested.join("Result IMG_0001_4 NIR.tif").is_file());
}
