#[allow(dead_code)]
mod common;

use ndarray::Array2;

use radcal_core::frame::{Frame, PixelUnit};
use radcal_core::io::image_io::{load_float_tiff, load_raw, save_output, save_png};
use radcal_core::io::OutputFormat;

#[test]
fn test_load_raw_16bit_counts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("IMG_0001_1.tif");
    let counts = common::panel_counts(0.05, 0.25);
    common::write_tiff(&path, &counts);

    let frame = load_raw(&path).unwrap();
    assert_eq!(frame.original_bit_depth, 16);
    assert_eq!(frame.unit, PixelUnit::RawCounts);
    assert_eq!(frame.data.dim(), (common::HEIGHT, common::WIDTH));
    assert_eq!(frame.data[[40, 48]], common::counts_for_radiance(0.25) as f32);
    assert_eq!(frame.data[[0, 0]], common::counts_for_radiance(0.05) as f32);
}

#[test]
fn test_load_raw_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_raw(&dir.path().join("missing.tif")).is_err());
}

#[test]
fn test_float_tiff_keeps_reflectance_values() {
    let mut data = Array2::<f32>::zeros((4, 5));
    data[[0, 1]] = 0.5105;
    data[[3, 4]] = 1.25;
    data[[2, 2]] = -0.01;
    let frame = Frame::new(data.clone(), 16, PixelUnit::Reflectance);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.tif");
    save_output(&frame, &path, OutputFormat::Tiff).unwrap();

    let loaded = load_float_tiff(&path).unwrap();
    assert_eq!(loaded.data, data);
    assert_eq!(loaded.unit, PixelUnit::Reflectance);
}

#[test]
fn test_png_is_stretched_to_full_range() {
    let data = Array2::from_shape_fn((2, 2), |(r, c)| (r * 2 + c) as f32 * 0.1);
    let frame = Frame::new(data, 16, PixelUnit::Reflectance);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.png");
    save_png(&frame, &path).unwrap();

    let img = image::open(&path).unwrap().into_luma8();
    assert_eq!(img.get_pixel(0, 0).0[0], 0);
    assert_eq!(img.get_pixel(1, 0).0[0], 85);
    assert_eq!(img.get_pixel(1, 1).0[0], 255);
}

#[test]
fn test_png_of_constant_frame_is_black() {
    let frame = Frame::new(Array2::from_elem((3, 3), 0.4f32), 16, PixelUnit::Reflectance);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flat.png");
    save_png(&frame, &path).unwrap();

    let img = image::open(&path).unwrap().into_luma8();
    assert!(img.pixels().all(|p| p.0[0] == 0));
}

#[test]
fn test_output_format_extension() {
    assert_eq!(OutputFormat::Png.extension(), "png");
    assert_eq!(OutputFormat::Tiff.extension(), "tif");
    assert_eq!(OutputFormat::default(), OutputFormat::Png);
}
