#[allow(dead_code)]
mod common;

use approx::assert_relative_eq;
use ndarray::Array2;
use serde_json::json;

use radcal_core::band::Band;
use radcal_core::frame::{Frame, PixelUnit};
use radcal_core::undistort::{
    correct_lens_distortion, BrownConrady5, CameraIntrinsics, CameraMatrixMode, LensModel,
};

fn lens(k1: f64) -> LensModel {
    LensModel {
        intrinsics: CameraIntrinsics {
            fx: 100.0,
            fy: 100.0,
            cx: 50.0,
            cy: 40.0,
        },
        distortion: BrownConrady5 {
            k1,
            ..BrownConrady5::default()
        },
        width: 101,
        height: 81,
    }
}

fn column_ramp(width: usize, height: usize) -> Frame {
    let data = Array2::from_shape_fn((height, width), |(_, col)| col as f32);
    Frame::new(data, 16, PixelUnit::Reflectance)
}

#[test]
fn test_lens_model_from_metadata() {
    let mut value = common::capture_metadata(Band::Blue, 1280, 960);
    value["XMP:PrincipalPoint"] = json!("4.8, 3.6");
    value["EXIF:FocalPlaneXResolution"] = json!(266.0);
    value["EXIF:FocalPlaneYResolution"] = json!(270.0);
    value["XMP:PerspectiveDistortion"] = json!([-0.1, 0.2, -0.3, 0.001, -0.002]);
    let model = LensModel::from_metadata(&common::metadata_from(value)).unwrap();

    assert_relative_eq!(model.intrinsics.fx, 5.4 * 266.0, epsilon = 1e-9);
    assert_relative_eq!(model.intrinsics.fy, 5.4 * 270.0, epsilon = 1e-9);
    assert_relative_eq!(model.intrinsics.cx, 4.8 * 266.0, epsilon = 1e-9);
    assert_relative_eq!(model.intrinsics.cy, 3.6 * 270.0, epsilon = 1e-9);
    assert_eq!(
        model.distortion,
        BrownConrady5::from_array([-0.1, 0.2, -0.3, 0.001, -0.002])
    );
}

#[test]
fn test_focal_length_in_pixels_is_converted() {
    let mut value = common::capture_metadata(Band::Blue, 64, 48);
    value["XMP:PerspectiveFocalLength"] = json!(1440.0);
    value["XMP:PerspectiveFocalLengthUnits"] = json!("px");
    value["EXIF:FocalPlaneXResolution"] = json!(266.666);
    let meta = common::metadata_from(value);
    assert_relative_eq!(meta.focal_length_mm().unwrap(), 1440.0 / 266.666, epsilon = 1e-9);
}

#[test]
fn test_zero_distortion_original_is_identity() {
    let frame = column_ramp(101, 81);
    let out = lens(0.0).undistort(&frame, CameraMatrixMode::Original);
    assert_eq!(out.data, frame.data);
}

#[test]
fn test_zero_distortion_keep_all_pixels_preserves_values() {
    let frame = column_ramp(101, 81);
    let out = lens(0.0).undistort(&frame, CameraMatrixMode::KeepAllPixels);
    for (a, b) in out.data.iter().zip(frame.data.iter()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-3);
    }
}

#[test]
fn test_barrel_correction_samples_inward() {
    let frame = column_ramp(101, 81);
    let out = lens(-0.2).undistort(&frame, CameraMatrixMode::Original);
    // x = 0.4 -> xd = 0.4 * (1 - 0.2 * 0.16) -> u = 50 + 38.72
    assert_relative_eq!(out.data[[40, 90]], 88.72, epsilon = 1e-3);
    assert_relative_eq!(out.data[[40, 50]], 50.0, epsilon = 1e-6);
}

#[test]
fn test_pincushion_corners_fall_outside() {
    let frame = Frame::new(Array2::from_elem((81, 101), 1.0f32), 16, PixelUnit::Reflectance);
    let out = lens(0.5).undistort(&frame, CameraMatrixMode::Original);
    assert_eq!(out.data[[0, 0]], 0.0);
    assert_eq!(out.data[[40, 50]], 1.0);
    assert_eq!(out.data.dim(), frame.data.dim());
}

#[test]
fn test_keep_all_pixels_widens_view_for_barrel() {
    let model = lens(-0.2);
    let k = model.new_camera_matrix(CameraMatrixMode::KeepAllPixels);
    assert!(k.fx < model.intrinsics.fx);
    assert!(k.fy < model.intrinsics.fy);
    assert_eq!(model.new_camera_matrix(CameraMatrixMode::Original), model.intrinsics);
}

#[test]
fn test_correct_lens_distortion_keeps_shape_and_unit() {
    let meta = common::metadata_from(common::capture_metadata(Band::Red, 96, 80));
    let frame = column_ramp(96, 80);
    let out = correct_lens_distortion(&meta, &frame, CameraMatrixMode::KeepAllPixels).unwrap();
    assert_eq!(out.data.dim(), (80, 96));
    assert_eq!(out.unit, PixelUnit::Reflectance);
}
