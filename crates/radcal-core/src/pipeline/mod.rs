pub mod config;
mod orchestrator;
mod types;

pub use orchestrator::{
    calibrate_band, calibrate_bands, process_band, run_calibration, run_calibration_reported,
};
pub use types::{BandOutcome, BandStatus, NoOpReporter, PipelineStage, ProgressReporter, RunReport};
