use std::path::PathBuf;

use crate::band::Band;
use crate::batch::BatchReport;
use crate::calibration::ReferenceCalibration;
use crate::error::RadcalError;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Calibrating,
    Converting,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Calibrating => write!(f, "Calibrating panel"),
            Self::Converting => write!(f, "Converting images"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// Processing of `band` has started.
    fn begin_band(&self, _band: Band) {}

    /// A new stage has started. `total_items` is the number of work items
    /// in this stage (e.g. flight image count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// `items_done` work items of the current stage have completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}

    /// A band has finished, successfully or not.
    fn finish_band(&self, _outcome: &BandOutcome) {}
}

/// Progress reporter that ignores everything.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Result of one band's calibration and batch.
#[derive(Debug)]
pub enum BandStatus {
    Completed {
        calibration: ReferenceCalibration,
        batch: BatchReport,
    },
    Failed(RadcalError),
}

#[derive(Debug)]
pub struct BandOutcome {
    pub band: Band,
    pub reference: PathBuf,
    pub status: BandStatus,
}

impl BandOutcome {
    pub fn is_success(&self) -> bool {
        match &self.status {
            BandStatus::Completed { batch, .. } => batch.failures.is_empty(),
            BandStatus::Failed(_) => false,
        }
    }

    pub fn error(&self) -> Option<&RadcalError> {
        match &self.status {
            BandStatus::Failed(e) => Some(e),
            BandStatus::Completed { .. } => None,
        }
    }
}

/// Result of a whole run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<BandOutcome>,
    /// True if a band failure stopped the run before every band was attempted.
    pub aborted: bool,
}

impl RunReport {
    /// At least one band ran, none failed and the run was not cut short.
    pub fn is_success(&self) -> bool {
        !self.aborted
            && !self.outcomes.is_empty()
            && self.outcomes.iter().all(BandOutcome::is_success)
    }

    /// Number of flight images written across all bands.
    pub fn converted_count(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match &o.status {
                BandStatus::Completed { batch, .. } => batch.converted.len(),
                BandStatus::Failed(_) => 0,
            })
            .sum()
    }

    /// Number of flight images that failed across all bands.
    pub fn image_failure_count(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match &o.status {
                BandStatus::Completed { batch, .. } => batch.failures.len(),
                BandStatus::Failed(_) => 0,
            })
            .sum()
    }

    pub fn failed_bands(&self) -> Vec<Band> {
        self.outcomes
            .iter()
            .filter(|o| o.error().is_some())
            .map(|o| o.band)
            .collect()
    }
}
