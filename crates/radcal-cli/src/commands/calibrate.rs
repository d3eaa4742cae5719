use anyhow::{bail, Result};
use clap::Args;
use radcal_core::panel::BrightPanelLocator;
use radcal_core::pipeline::calibrate_bands;

use crate::commands::pipeline::PipelineArgs;
use crate::summary::{print_band_error, print_reference};

#[derive(Args)]
pub struct CalibrateArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Compute calibration factors for the reference captures only.
pub fn run(args: &CalibrateArgs) -> Result<()> {
    let config = args.pipeline.resolve()?;
    let metadata = config.metadata.source();
    let locator = BrightPanelLocator::new(config.panel.detection.clone());

    let mut failed = 0;
    for (band, result) in calibrate_bands(&config, metadata.as_ref(), &locator) {
        match result {
            Ok(calibration) => print_reference(&calibration),
            Err(e) => {
                print_band_error(band, &config.reference_path(band), &e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} band(s) could not be calibrated");
    }
    Ok(())
}
