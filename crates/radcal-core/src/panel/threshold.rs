use ndarray::Array2;

use crate::consts::OTSU_HISTOGRAM_BINS;

use super::config::{PanelDetectionConfig, ThresholdMethod};

/// Brightness histogram of a peak-normalized radiance image.
///
/// Samples are clamped to [0, 1] and binned to the nearest level;
/// non-finite samples are skipped.
#[derive(Clone, Debug)]
pub struct BrightnessHistogram {
    counts: Vec<u64>,
    total: u64,
}

impl BrightnessHistogram {
    pub fn from_normalized(data: &Array2<f32>) -> Self {
        let top = (OTSU_HISTOGRAM_BINS - 1) as f32;
        let mut counts = vec![0u64; OTSU_HISTOGRAM_BINS];
        for v in data.iter().filter(|v| v.is_finite()) {
            counts[(v.clamp(0.0, 1.0) * top).round() as usize] += 1;
        }
        let total = counts.iter().sum();
        Self { counts, total }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct occupied brightness levels.
    pub fn occupied_levels(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Level separating panel from background with maximal between-class
    /// variance. `None` when the image has a single brightness level.
    pub fn otsu_level(&self) -> Option<f32> {
        if self.occupied_levels() < 2 {
            return None;
        }
        let total = self.total as f64;
        let moment: f64 = self
            .counts
            .iter()
            .enumerate()
            .map(|(level, &c)| level as f64 * c as f64)
            .sum();

        let mut dark_weight = 0.0_f64;
        let mut dark_moment = 0.0_f64;
        let mut best: Option<(f64, usize)> = None;
        for (level, &c) in self.counts.iter().enumerate() {
            dark_weight += c as f64;
            dark_moment += level as f64 * c as f64;
            let bright_weight = total - dark_weight;
            if dark_weight == 0.0 || bright_weight == 0.0 {
                continue;
            }
            let gap = dark_moment / dark_weight - (moment - dark_moment) / bright_weight;
            let between = dark_weight * bright_weight * gap * gap;
            if best.map_or(true, |(b, _)| between > b) {
                best = Some((between, level));
            }
        }

        let top = (OTSU_HISTOGRAM_BINS - 1) as f32;
        best.map(|(_, level)| (level as f32 + 0.5) / top)
    }
}

/// Mean and population standard deviation of the finite samples, in one pass.
pub fn brightness_stats(data: &Array2<f32>) -> (f32, f32) {
    let (mut n, mut mean, mut m2) = (0u64, 0.0_f64, 0.0_f64);
    for &v in data.iter().filter(|v| v.is_finite()) {
        n += 1;
        let delta = v as f64 - mean;
        mean += delta / n as f64;
        m2 += delta * (v as f64 - mean);
    }
    if n == 0 {
        return (0.0, 0.0);
    }
    (mean as f32, (m2 / n as f64).sqrt() as f32)
}

/// Brightness level above which a pixel is a panel candidate.
///
/// `data` is normalized to the frame peak. Returns `None` when the frame has
/// no contrast to split, in which case no panel can be located.
pub fn panel_threshold(data: &Array2<f32>, config: &PanelDetectionConfig) -> Option<f32> {
    match config.threshold_method {
        ThresholdMethod::Otsu => BrightnessHistogram::from_normalized(data).otsu_level(),
        ThresholdMethod::MeanPlusSigma => {
            let (mean, std) = brightness_stats(data);
            (std > 0.0).then(|| mean + config.sigma_multiplier * std)
        }
        ThresholdMethod::Fixed(level) => Some(level),
    }
}
