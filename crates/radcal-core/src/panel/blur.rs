use ndarray::{Array2, Axis};

/// Gaussian smoothing applied before thresholding, so sensor noise and panel
/// texture do not split the panel into fragments. Edges are clamped.
pub fn gaussian_blur_array(data: &Array2<f32>, sigma: f32) -> Array2<f32> {
    if sigma <= 0.0 || data.is_empty() {
        return data.clone();
    }
    let taps = gaussian_taps(sigma);
    let rows = smooth_lanes(data, &taps, Axis(1));
    smooth_lanes(&rows, &taps, Axis(0))
}

/// Normalized 1-D taps covering three sigma on each side.
fn gaussian_taps(sigma: f32) -> Vec<f32> {
    let radius = (3.0 * sigma).ceil() as i32;
    let denom = 2.0 * sigma * sigma;
    let taps: Vec<f32> = (-radius..=radius)
        .map(|x| (-((x * x) as f32) / denom).exp())
        .collect();
    let norm: f32 = taps.iter().sum();
    taps.into_iter().map(|t| t / norm).collect()
}

/// Convolve every lane along `axis` with `taps`.
fn smooth_lanes(data: &Array2<f32>, taps: &[f32], axis: Axis) -> Array2<f32> {
    let radius = taps.len() / 2;
    let mut out = Array2::zeros(data.raw_dim());
    for (src, mut dst) in data.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        let last = src.len() - 1;
        for (i, d) in dst.iter_mut().enumerate() {
            *d = taps
                .iter()
                .enumerate()
                .map(|(k, &t)| src[(i + k).saturating_sub(radius).min(last)] * t)
                .sum();
        }
    }
    out
}
