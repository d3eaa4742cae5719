use std::sync::Arc;

use tracing::{error, info, warn};

use crate::band::Band;
use crate::batch::{run_batch, BatchReport};
use crate::calibration::{calibrate_reference, ReferenceCalibration};
use crate::error::Result;
use crate::metadata::MetadataSource;
use crate::panel::{BrightPanelLocator, PanelLocator};

use super::config::{ErrorPolicy, RunConfig};
use super::types::{BandOutcome, BandStatus, NoOpReporter, PipelineStage, ProgressReporter, RunReport};

/// Calibrate one band from its reference capture.
pub fn calibrate_band(
    band: Band,
    config: &RunConfig,
    metadata: &dyn MetadataSource,
    locator: &dyn PanelLocator,
) -> Result<ReferenceCalibration> {
    calibrate_reference(
        &config.reference_path(band),
        band,
        metadata,
        locator,
        &config.panel,
    )
}

/// Calibrate every configured band without converting flight images.
pub fn calibrate_bands(
    config: &RunConfig,
    metadata: &dyn MetadataSource,
    locator: &dyn PanelLocator,
) -> Vec<(Band, Result<ReferenceCalibration>)> {
    config
        .unique_bands()
        .into_iter()
        .map(|band| (band, calibrate_band(band, config, metadata, locator)))
        .collect()
}

/// Full per-band pipeline: the factor is computed before any flight image of
/// the band is touched, so a calibration failure converts nothing.
pub fn process_band(
    band: Band,
    config: &RunConfig,
    metadata: &dyn MetadataSource,
    locator: &dyn PanelLocator,
    reporter: &Arc<dyn ProgressReporter>,
) -> Result<(ReferenceCalibration, BatchReport)> {
    reporter.begin_stage(PipelineStage::Calibrating, None);
    let calibration = calibrate_band(band, config, metadata, locator);
    reporter.finish_stage();
    let calibration = calibration?;

    let batch = run_batch(&calibration, config, metadata, reporter)?;
    Ok((calibration, batch))
}

/// Run calibration and conversion for every configured band with explicit
/// collaborators and a progress reporter.
pub fn run_calibration_reported(
    config: &RunConfig,
    metadata: &dyn MetadataSource,
    locator: &dyn PanelLocator,
    reporter: Arc<dyn ProgressReporter>,
) -> RunReport {
    let mut report = RunReport::default();
    let bands = config.unique_bands();
    if bands.len() < config.bands.len() {
        warn!(
            configured = config.bands.len(),
            unique = bands.len(),
            "Duplicate bands ignored"
        );
    }
    info!(
        image_dir = %config.image_dir.display(),
        bands = bands.len(),
        "Starting calibration run"
    );

    for &band in &bands {
        reporter.begin_band(band);
        let reference = config.reference_path(band);
        let status = match process_band(band, config, metadata, locator, &reporter) {
            Ok((calibration, batch)) => BandStatus::Completed { calibration, batch },
            Err(e) => {
                error!(band = %band, reference = %reference.display(), error = %e, "Band failed");
                BandStatus::Failed(e)
            }
        };
        let outcome = BandOutcome {
            band,
            reference,
            status,
        };
        reporter.finish_band(&outcome);
        let failed = outcome.error().is_some();
        report.outcomes.push(outcome);

        if failed && config.failure.on_band_error == ErrorPolicy::Abort {
            report.aborted = report.outcomes.len() < bands.len();
            break;
        }
    }

    info!(
        converted = report.converted_count(),
        failed_bands = report.failed_bands().len(),
        "Calibration run finished"
    );
    report
}

/// Run the whole pipeline with the configured metadata backend and the
/// bright-panel locator.
pub fn run_calibration(config: &RunConfig) -> RunReport {
    let metadata = config.metadata.source();
    let locator = BrightPanelLocator::new(config.panel.detection.clone());
    run_calibration_reported(config, metadata.as_ref(), &locator, Arc::new(NoOpReporter))
}
