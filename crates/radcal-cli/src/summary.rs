use std::path::Path;

use console::Style;
use radcal_core::band::Band;
use radcal_core::calibration::ReferenceCalibration;
use radcal_core::error::RadcalError;
use radcal_core::metadata::CameraSummary;
use radcal_core::panel::RoiSource;
use radcal_core::pipeline::config::RunConfig;
use radcal_core::pipeline::{BandOutcome, BandStatus, RunReport};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
    error: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
            error: Style::new().red().bold(),
        }
    }
}

fn opt<T: std::fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

pub fn print_camera_summary(summary: &CameraSummary) {
    let s = Styles::new();
    let camera = format!(
        "{} {} (firmware {})",
        opt(&summary.make),
        opt(&summary.model),
        opt(&summary.firmware)
    );
    println!("  {:<14}{}", s.label.apply_to("Camera"), s.value.apply_to(camera));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Band"),
        s.method.apply_to(format!(
            "{} ({} nm, FWHM {} nm)",
            opt(&summary.band_name),
            opt(&summary.center_wavelength),
            opt(&summary.bandwidth)
        ))
    );
    if let (Some(w), Some(h)) = (summary.width, summary.height) {
        println!("  {:<14}{}", s.label.apply_to("Size"), s.value.apply_to(format!("{w}x{h}")));
    }
    let exposure = match summary.exposure_time {
        Some(t) => format!("{:.3} ms", t * 1000.0),
        None => "-".to_string(),
    };
    println!("  {:<14}{}", s.label.apply_to("Exposure"), s.value.apply_to(exposure));
    println!("  {:<14}{}", s.label.apply_to("Gain"), s.value.apply_to(opt(&summary.gain)));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Focal length"),
        s.value.apply_to(opt(&summary.focal_length))
    );
    println!(
        "  {:<14}{} / {}",
        s.label.apply_to("Capture"),
        opt(&summary.capture_id),
        opt(&summary.flight_id)
    );
}

/// Diagnostics for one calibrated reference capture.
pub fn print_reference(calibration: &ReferenceCalibration) {
    let s = Styles::new();
    let m = &calibration.measurement;
    let f = &calibration.factor;

    println!();
    println!(
        "  {} {}",
        s.header.apply_to(format!("{} reference", f.band)),
        s.path.apply_to(calibration.path.display())
    );
    print_camera_summary(&calibration.summary);
    println!(
        "  {:<14}{} ({} px detected)",
        s.label.apply_to("Panel region"),
        s.value.apply_to(m.region),
        m.detection.area
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Mean radiance"),
        s.value.apply_to(format!("{:.6}", m.mean_radiance))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Reflectance"),
        s.value.apply_to(format!("{:.5}", f.panel_reflectance))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Factor"),
        s.method.apply_to(format!("{:.6}", f.factor))
    );
}

pub fn print_band_error(band: Band, reference: &Path, error: &RadcalError) {
    let s = Styles::new();
    println!();
    println!(
        "  {} {}",
        s.error.apply_to(format!("{band} failed")),
        s.path.apply_to(reference.display())
    );
    println!("    {}", error);
}

/// One-line status of a finished band, printed above the progress bar.
pub fn band_line(outcome: &BandOutcome) -> String {
    let s = Styles::new();
    match &outcome.status {
        BandStatus::Completed { calibration, batch } => format!(
            "  {:<9}{} factor {:.6}, {} converted, {} failed",
            s.header.apply_to(outcome.band.to_string()),
            s.method.apply_to("ok"),
            calibration.factor.factor,
            batch.converted.len(),
            batch.failures.len()
        ),
        BandStatus::Failed(e) => format!(
            "  {:<9}{} {}",
            s.header.apply_to(outcome.band.to_string()),
            s.error.apply_to("failed"),
            e
        ),
    }
}

pub fn print_run_summary(config: &RunConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Reflectance Calibration"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(23)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.image_dir.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output_dir.display())
    );
    let bands: Vec<String> = config.bands.iter().map(Band::to_string).collect();
    println!("  {:<14}{}", s.label.apply_to("Bands"), s.value.apply_to(bands.join(", ")));
    println!("  {:<14}{}", s.label.apply_to("Metadata"), s.method.apply_to(&config.metadata));
    println!();

    println!("  {}", s.header.apply_to("Panel"));
    match config.panel.roi {
        RoiSource::Fixed(region) => println!(
            "    {:<12}{}",
            s.label.apply_to("Region"),
            s.value.apply_to(region)
        ),
        RoiSource::Detected { inset } => println!(
            "    {:<12}{}",
            s.label.apply_to("Region"),
            s.method.apply_to(format!("detected, inset {inset}"))
        ),
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Threshold"),
        s.method.apply_to(&config.panel.detection.threshold_method)
    );
    println!();

    let c = &config.conversion;
    println!("  {}", s.header.apply_to("Conversion"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Metadata"),
        s.value.apply_to(c.flight_metadata)
    );
    if c.undistort {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Undistort"),
            s.method.apply_to(c.camera_matrix)
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Undistort"),
            s.disabled.apply_to("disabled")
        );
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Format"),
        s.value.apply_to(c.output_format)
    );
    println!(
        "    {:<12}band {}, image {}",
        s.label.apply_to("On error"),
        config.failure.on_band_error,
        config.failure.on_image_error
    );
    println!();
}

pub fn print_run_report(report: &RunReport) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Result"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Converted"),
        s.value.apply_to(report.converted_count())
    );

    for outcome in &report.outcomes {
        match &outcome.status {
            BandStatus::Completed { batch, .. } => {
                for failure in &batch.failures {
                    println!(
                        "    {} {}: {}",
                        s.error.apply_to("image failed"),
                        failure.source.display(),
                        failure.error
                    );
                }
            }
            BandStatus::Failed(e) => println!(
                "    {} {}: {}",
                s.error.apply_to(format!("{} failed", outcome.band)),
                outcome.reference.display(),
                e
            ),
        }
    }

    if report.aborted {
        println!(
            "    {}",
            s.disabled.apply_to("run stopped before all bands were processed")
        );
    }
    println!();
}
