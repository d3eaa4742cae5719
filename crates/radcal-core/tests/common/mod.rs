use std::path::{Path, PathBuf};

use image::{ImageBuffer, Luma};
use ndarray::Array2;
use serde_json::{json, Value};

use radcal_core::band::Band;
use radcal_core::frame::{Frame, PixelUnit};
use radcal_core::metadata::ImageMetadata;
use radcal_core::region::PixelRegion;

pub const WIDTH: usize = 96;
pub const HEIGHT: usize = 80;
pub const BLACK_LEVEL: f64 = 100.0;

/// Panel square of the synthetic reference captures.
pub const PANEL: PixelRegion = PixelRegion {
    ulx: 36,
    uly: 28,
    lrx: 60,
    lry: 52,
};

/// Raw count whose radiance is `radiance` under [`capture_metadata`]
/// (exposure 1 ms, gain 1, a1 = 1e-3, no vignetting or row gradient).
pub fn counts_for_radiance(radiance: f64) -> u16 {
    (BLACK_LEVEL + radiance * 65536.0).round() as u16
}

/// Exiftool-style (`-j -n -G`) metadata of a synthetic capture.
pub fn capture_metadata(band: Band, width: usize, height: usize) -> Value {
    json!({
        "SourceFile": format!("IMG_0000_{}.tif", band.index()),
        "EXIF:Make": "MicaSense",
        "EXIF:Model": "RedEdge-M",
        "EXIF:Software": "v5.1.7",
        "EXIF:ExposureTime": 0.001,
        "EXIF:ISOSpeed": 100,
        "EXIF:ImageWidth": width,
        "EXIF:ImageHeight": height,
        "EXIF:BitsPerSample": 16,
        "EXIF:BlackLevel": "100 100 100 100",
        "EXIF:FocalPlaneXResolution": 266.666,
        "EXIF:FocalPlaneYResolution": 266.666,
        "XMP:BandName": band.name(),
        "XMP:CentralWavelength": 475,
        "XMP:WavelengthFWHM": 20,
        "XMP:CaptureId": "synthetic",
        "XMP:FlightId": "test",
        "XMP:RadiometricCalibration": [0.001, 0.0, 0.0],
        "XMP:VignettingCenter": [width as f64 / 2.0, height as f64 / 2.0],
        "XMP:VignettingPolynomial": [0.0],
        "XMP:PerspectiveDistortion": [0.0, 0.0, 0.0, 0.0, 0.0],
        "XMP:PrincipalPoint": format!(
            "{},{}",
            width as f64 / 2.0 / 266.666,
            height as f64 / 2.0 / 266.666
        ),
        "XMP:PerspectiveFocalLength": 5.4,
        "XMP:PerspectiveFocalLengthUnits": "mm"
    })
}

pub fn metadata_from(value: Value) -> ImageMetadata {
    ImageMetadata::from_exiftool_json("capture.tif", &Value::Array(vec![value]).to_string())
        .expect("valid metadata")
}

/// Raw counts with `background` radiance everywhere and `panel` radiance
/// inside [`PANEL`].
pub fn panel_counts(background: f64, panel: f64) -> Array2<u16> {
    let bg = counts_for_radiance(background);
    let fg = counts_for_radiance(panel);
    Array2::from_shape_fn((HEIGHT, WIDTH), |(row, col)| {
        let inside = (PANEL.uly..PANEL.lry).contains(&row) && (PANEL.ulx..PANEL.lrx).contains(&col);
        if inside {
            fg
        } else {
            bg
        }
    })
}

pub fn raw_frame(counts: &Array2<u16>) -> Frame {
    Frame::new(counts.mapv(|v| v as f32), 16, PixelUnit::RawCounts)
}

/// Write `counts` as a 16-bit grayscale TIFF.
pub fn write_tiff(path: &Path, counts: &Array2<u16>) {
    let (h, w) = counts.dim();
    let img: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_fn(w as u32, h as u32, |x, y| Luma([counts[[y as usize, x as usize]]]));
    img.save(path).expect("write tiff");
}

/// Write a capture and its `.json` metadata sidecar into `dir`.
pub fn write_capture(dir: &Path, name: &str, band: Band, counts: &Array2<u16>) -> PathBuf {
    let path = dir.join(name);
    write_tiff(&path, counts);
    let (h, w) = counts.dim();
    let meta = Value::Array(vec![capture_metadata(band, w, h)]);
    std::fs::write(path.with_extension("json"), meta.to_string()).expect("write sidecar");
    path
}

/// Reference capture `IMG_0000_<n>.tif` plus `flights` flight captures
/// `IMG_000<i>_<n>.tif` for `band`.
pub fn write_band_set(dir: &Path, band: Band, flights: usize) -> PathBuf {
    let n = band.index();
    let reference = write_capture(
        dir,
        &format!("IMG_0000_{n}.tif"),
        band,
        &panel_counts(0.05, 0.25),
    );
    for i in 1..=flights {
        write_capture(
            dir,
            &format!("IMG_{i:04}_{n}.tif"),
            band,
            &panel_counts(0.02, 0.1),
        );
    }
    reference
}
