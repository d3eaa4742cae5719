use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::{UNDISTORT_BORDER_SAMPLES, UNDISTORT_ITERATIONS};
use crate::error::Result;
use crate::frame::Frame;
use crate::metadata::ImageMetadata;

/// Tolerance (pixels) for samples that land a rounding error outside the image.
const EDGE_TOLERANCE: f64 = 1e-6;

/// Brown-Conrady 5-parameter lens distortion.
///
/// Radial distortion (k1, k2, k3) and tangential distortion (p1, p2), applied
/// to normalized image coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BrownConrady5 {
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
    pub p1: f64,
    pub p2: f64,
}

impl BrownConrady5 {
    /// Build from `[k1, k2, k3, p1, p2]`.
    pub fn from_array(v: [f64; 5]) -> Self {
        Self {
            k1: v[0],
            k2: v[1],
            k3: v[2],
            p1: v[3],
            p2: v[4],
        }
    }

    pub fn is_zero(&self) -> bool {
        self.k1 == 0.0 && self.k2 == 0.0 && self.k3 == 0.0 && self.p1 == 0.0 && self.p2 == 0.0
    }

    /// Map an ideal normalized point to where the lens images it.
    pub fn distort(&self, x: f64, y: f64) -> (f64, f64) {
        let r2 = x * x + y * y;
        let radial = 1.0 + r2 * (self.k1 + r2 * (self.k2 + r2 * self.k3));
        let dx = 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
        let dy = self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;
        (x * radial + dx, y * radial + dy)
    }

    /// Invert [`distort`](Self::distort) by fixed-point iteration.
    pub fn undistort(&self, xd: f64, yd: f64) -> (f64, f64) {
        let (mut x, mut y) = (xd, yd);
        for _ in 0..UNDISTORT_ITERATIONS {
            let r2 = x * x + y * y;
            let radial = 1.0 + r2 * (self.k1 + r2 * (self.k2 + r2 * self.k3));
            let dx = 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
            let dy = self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;
            x = (xd - dx) / radial;
            y = (yd - dy) / radial;
        }
        (x, y)
    }
}

/// Pinhole intrinsics in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraIntrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

impl CameraIntrinsics {
    fn to_normalized(&self, u: f64, v: f64) -> (f64, f64) {
        ((u - self.cx) / self.fx, (v - self.cy) / self.fy)
    }

    fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.fx + self.cx, y * self.fy + self.cy)
    }
}

/// Camera matrix used for the undistorted output image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum CameraMatrixMode {
    /// Reuse the source camera matrix; corners lost to distortion are cropped.
    Original,
    /// Rescale so every source pixel lands inside the output (alpha = 1).
    #[default]
    KeepAllPixels,
}

impl std::fmt::Display for CameraMatrixMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Original => write!(f, "Original"),
            Self::KeepAllPixels => write!(f, "Keep All Pixels"),
        }
    }
}

/// Optical model of one band's camera.
#[derive(Clone, Debug)]
pub struct LensModel {
    pub intrinsics: CameraIntrinsics,
    pub distortion: BrownConrady5,
    pub width: usize,
    pub height: usize,
}

impl LensModel {
    /// Build from `XMP:PerspectiveDistortion`, `XMP:PrincipalPoint`, the focal
    /// length and the focal plane resolution.
    pub fn from_metadata(meta: &ImageMetadata) -> Result<Self> {
        let (width, height) = meta.dimensions()?;
        let (res_x, res_y) = meta.focal_plane_resolution_px_per_mm()?;
        let focal_mm = meta.focal_length_mm()?;
        let (ppx, ppy) = meta.principal_point_mm()?;
        Ok(Self {
            intrinsics: CameraIntrinsics {
                fx: focal_mm * res_x,
                fy: focal_mm * res_y,
                cx: ppx * res_x,
                cy: ppy * res_y,
            },
            distortion: BrownConrady5::from_array(meta.perspective_distortion()?),
            width,
            height,
        })
    }

    /// Camera matrix of the undistorted image.
    pub fn new_camera_matrix(&self, mode: CameraMatrixMode) -> CameraIntrinsics {
        match mode {
            CameraMatrixMode::Original => self.intrinsics,
            CameraMatrixMode::KeepAllPixels => self.outer_camera_matrix(),
        }
    }

    /// Fit the bounding rectangle of undistorted sample points spread over the
    /// whole frame, then scale it onto the output viewport.
    fn outer_camera_matrix(&self) -> CameraIntrinsics {
        let n = UNDISTORT_BORDER_SAMPLES;
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let w = self.width.max(2) as f64 - 1.0;
        let h = self.height.max(2) as f64 - 1.0;

        for i in 0..n {
            for j in 0..n {
                let u = j as f64 * w / (n - 1) as f64;
                let v = i as f64 * h / (n - 1) as f64;
                let (xd, yd) = self.intrinsics.to_normalized(u, v);
                let (x, y) = self.distortion.undistort(xd, yd);
                x_min = x_min.min(x);
                x_max = x_max.max(x);
                y_min = y_min.min(y);
                y_max = y_max.max(y);
            }
        }

        let fx = w / (x_max - x_min);
        let fy = h / (y_max - y_min);
        CameraIntrinsics {
            fx,
            fy,
            cx: -fx * x_min,
            cy: -fy * y_min,
        }
    }

    /// Remove lens distortion: every output pixel is traced back through the
    /// distortion model into the source image and sampled bilinearly.
    /// Samples falling outside the source are zero.
    pub fn undistort(&self, frame: &Frame, mode: CameraMatrixMode) -> Frame {
        let target = self.new_camera_matrix(mode);
        if self.distortion.is_zero() && target == self.intrinsics {
            return frame.clone();
        }

        let data = Array2::from_shape_fn((frame.height(), frame.width()), |(row, col)| {
            let (x, y) = target.to_normalized(col as f64, row as f64);
            let (xd, yd) = self.distortion.distort(x, y);
            let (u, v) = self.intrinsics.to_pixel(xd, yd);
            sample_bilinear(&frame.data, u, v)
        });

        frame.with_data(data, frame.unit)
    }
}

/// Bilinear sample at fractional `(u, v)` = (column, row); zero outside.
fn sample_bilinear(data: &Array2<f32>, u: f64, v: f64) -> f32 {
    let (h, w) = data.dim();
    if h == 0 || w == 0 {
        return 0.0;
    }
    let max_u = (w - 1) as f64;
    let max_v = (h - 1) as f64;
    if !u.is_finite()
        || !v.is_finite()
        || u < -EDGE_TOLERANCE
        || v < -EDGE_TOLERANCE
        || u > max_u + EDGE_TOLERANCE
        || v > max_v + EDGE_TOLERANCE
    {
        return 0.0;
    }
    let u = u.clamp(0.0, max_u);
    let v = v.clamp(0.0, max_v);

    let x0 = u.floor() as usize;
    let y0 = v.floor() as usize;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = (u - x0 as f64) as f32;
    let fy = (v - y0 as f64) as f32;

    let top = data[[y0, x0]] * (1.0 - fx) + data[[y0, x1]] * fx;
    let bottom = data[[y1, x0]] * (1.0 - fx) + data[[y1, x1]] * fx;
    top * (1.0 - fy) + bottom * fy
}

/// Undistort `frame` using the optical parameters in `meta`.
pub fn correct_lens_distortion(
    meta: &ImageMetadata,
    frame: &Frame,
    mode: CameraMatrixMode,
) -> Result<Frame> {
    Ok(LensModel::from_metadata(meta)?.undistort(frame, mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_bilinear_midpoint() {
        let data = Array2::from_shape_vec((2, 2), vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        assert!((sample_bilinear(&data, 0.5, 0.5) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_sample_bilinear_outside_is_zero() {
        let data = Array2::from_elem((3, 3), 1.0f32);
        assert_eq!(sample_bilinear(&data, -0.5, 1.0), 0.0);
        assert_eq!(sample_bilinear(&data, 1.0, 2.5), 0.0);
    }

    #[test]
    fn test_undistort_inverts_distort() {
        let d = BrownConrady5 {
            k1: -0.1,
            k2: 0.05,
            k3: 0.0,
            p1: 0.001,
            p2: -0.002,
        };
        let (xd, yd) = d.distort(0.2, -0.15);
        let (x, y) = d.undistort(xd, yd);
        assert!((x - 0.2).abs() < 1e-6);
        assert!((y + 0.15).abs() < 1e-6);
    }
}
