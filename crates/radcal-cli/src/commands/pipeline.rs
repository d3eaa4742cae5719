use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use radcal_core::band::Band;
use radcal_core::io::OutputFormat;
use radcal_core::panel::{BrightPanelLocator, RoiSource};
use radcal_core::pipeline::config::{ErrorPolicy, MetadataBackend, MetadataScope, RunConfig};
use radcal_core::pipeline::{
    run_calibration_reported, BandOutcome, BandStatus, PipelineStage, ProgressReporter,
};
use radcal_core::region::PixelRegion;
use tracing::debug;

use crate::summary::{band_line, print_reference, print_run_report, print_run_summary};

#[derive(Clone, Copy, ValueEnum)]
pub enum BandArg {
    Blue,
    Green,
    Red,
    Nir,
    RedEdge,
}

impl From<BandArg> for Band {
    fn from(arg: BandArg) -> Self {
        match arg {
            BandArg::Blue => Band::Blue,
            BandArg::Green => Band::Green,
            BandArg::Red => Band::Red,
            BandArg::Nir => Band::Nir,
            BandArg::RedEdge => Band::RedEdge,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Png,
    Tiff,
}

/// Options shared by `calibrate` and `run`. Flags override the config file.
#[derive(Args)]
pub struct PipelineArgs {
    /// Run config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding reference and flight captures
    #[arg(short, long)]
    pub input_dir: Option<PathBuf>,

    /// Directory converted images are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Band to process; repeat for several (default: all)
    #[arg(long = "band", value_enum)]
    pub bands: Vec<BandArg>,

    /// Read metadata from `<image>.json` sidecars instead of running exiftool
    #[arg(long)]
    pub sidecar: bool,

    /// Path to the exiftool executable
    #[arg(long, conflicts_with = "sidecar")]
    pub exiftool: Option<PathBuf>,

    /// Fixed panel region as ulx,uly,lrx,lry
    #[arg(long, value_parser = parse_region, conflicts_with = "detect_roi")]
    pub roi: Option<PixelRegion>,

    /// Average radiance over the detected panel instead of a fixed region
    #[arg(long)]
    pub detect_roi: bool,

    /// Output image format
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Convert flight images with the reference capture's metadata
    #[arg(long)]
    pub reference_metadata: bool,

    /// Skip lens distortion correction
    #[arg(long)]
    pub no_undistort: bool,

    /// Stop at the first failed band
    #[arg(long)]
    pub fail_fast: bool,
}

fn parse_region(s: &str) -> std::result::Result<PixelRegion, String> {
    let parts: Vec<usize> = s
        .split(',')
        .map(|p| p.trim().parse::<usize>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| format!("invalid region {s:?}: {e}"))?;
    match parts.as_slice() {
        &[ulx, uly, lrx, lry] if lrx > ulx && lry > uly => Ok(PixelRegion::new(ulx, uly, lrx, lry)),
        &[_, _, _, _] => Err(format!("region {s:?} is empty")),
        _ => Err(format!("expected ulx,uly,lrx,lry, got {s:?}")),
    }
}

impl PipelineArgs {
    /// Load the config file (or defaults) and apply command-line overrides.
    pub fn resolve(&self) -> Result<RunConfig> {
        let mut config = if let Some(ref config_path) = self.config {
            let contents = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config {}", config_path.display()))?;
            toml::from_str(&contents).context("Invalid run config")?
        } else {
            RunConfig::default()
        };

        if let Some(ref dir) = self.input_dir {
            config.image_dir = dir.clone();
        }
        if let Some(ref dir) = self.output_dir {
            config.output_dir = dir.clone();
        }
        if !self.bands.is_empty() {
            config.bands = self.bands.iter().map(|&b| b.into()).collect();
        }
        config.bands = config.unique_bands();
        if config.bands.is_empty() {
            bail!("No bands selected");
        }
        if self.sidecar {
            config.metadata = MetadataBackend::Sidecar;
        } else if let Some(ref exe) = self.exiftool {
            config.metadata = MetadataBackend::ExifTool {
                executable: Some(exe.clone()),
            };
        }
        if let Some(region) = self.roi {
            config.panel.roi = RoiSource::Fixed(region);
        } else if self.detect_roi {
            config.panel.roi = RoiSource::detected();
        }
        if let Some(format) = self.format {
            config.conversion.output_format = match format {
                FormatArg::Png => OutputFormat::Png,
                FormatArg::Tiff => OutputFormat::Tiff,
            };
        }
        if self.reference_metadata {
            config.conversion.flight_metadata = MetadataScope::Reference;
        }
        if self.no_undistort {
            config.conversion.undistort = false;
        }
        if self.fail_fast {
            config.failure.on_band_error = ErrorPolicy::Abort;
        }
        debug!(?config, "Resolved run config");
        Ok(config)
    }
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Drives an indicatif bar from pipeline progress events.
struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    fn new() -> Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:9} {msg:20} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        Ok(Self { bar })
    }
}

impl ProgressReporter for BarReporter {
    fn begin_band(&self, band: Band) {
        self.bar.set_prefix(band.to_string());
    }

    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.bar.set_message(stage.to_string());
        self.bar.set_length(total_items.unwrap_or(1) as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, items_done: usize) {
        self.bar.set_position(items_done as u64);
    }

    fn finish_band(&self, outcome: &BandOutcome) {
        self.bar.println(band_line(outcome));
    }
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = args.pipeline.resolve()?;
    print_run_summary(&config);

    let metadata = config.metadata.source();
    let locator = BrightPanelLocator::new(config.panel.detection.clone());
    let reporter = Arc::new(BarReporter::new()?);

    let report = run_calibration_reported(&config, metadata.as_ref(), &locator, reporter.clone());
    reporter.bar.finish_and_clear();

    for outcome in &report.outcomes {
        if let BandStatus::Completed { calibration, .. } = &outcome.status {
            print_reference(calibration);
        }
    }
    print_run_report(&report);

    if !report.is_success() {
        bail!(
            "{} band(s) and {} image(s) failed",
            report.failed_bands().len(),
            report.image_failure_count()
        );
    }
    Ok(())
}
