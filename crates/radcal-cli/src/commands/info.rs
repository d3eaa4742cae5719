use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use radcal_core::pipeline::config::MetadataBackend;
use radcal_core::radiometry::RadiometricModel;
use radcal_core::undistort::LensModel;

use crate::summary::print_camera_summary;

#[derive(Args)]
pub struct InfoArgs {
    /// Raw capture (.tif)
    pub file: PathBuf,

    /// Read metadata from `<file>.json` instead of running exiftool
    #[arg(long)]
    pub sidecar: bool,

    /// Path to the exiftool executable
    #[arg(long, conflicts_with = "sidecar")]
    pub exiftool: Option<PathBuf>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let backend = if args.sidecar {
        MetadataBackend::Sidecar
    } else {
        MetadataBackend::ExifTool {
            executable: args.exiftool.clone(),
        }
    };
    let meta = backend
        .source()
        .read(&args.file)
        .with_context(|| format!("Failed to read metadata of {}", args.file.display()))?;

    println!("File:        {}", args.file.display());
    print_camera_summary(&meta.camera_summary());

    match RadiometricModel::from_metadata(&meta) {
        Ok(model) => {
            println!("Black level: {:.1}", model.black_level);
            println!("Bit depth:   {}", model.bits_per_sample);
            println!(
                "Calibration: a1={:e} a2={:e} a3={:e}",
                model.calibration[0], model.calibration[1], model.calibration[2]
            );
            println!(
                "Vignetting:  center=({:.1}, {:.1}) terms={}",
                model.vignetting_center.0,
                model.vignetting_center.1,
                model.vignetting_polynomial.len()
            );
        }
        Err(e) => println!("Radiometry:  unavailable ({e})"),
    }

    match LensModel::from_metadata(&meta) {
        Ok(lens) => {
            let k = lens.intrinsics;
            let d = lens.distortion;
            println!(
                "Intrinsics:  fx={:.1} fy={:.1} cx={:.1} cy={:.1}",
                k.fx, k.fy, k.cx, k.cy
            );
            println!(
                "Distortion:  k1={:e} k2={:e} k3={:e} p1={:e} p2={:e}",
                d.k1, d.k2, d.k3, d.p1, d.p2
            );
        }
        Err(e) => println!("Lens model:  unavailable ({e})"),
    }

    Ok(())
}
