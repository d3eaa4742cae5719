use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_PANEL_LRX, DEFAULT_PANEL_LRY, DEFAULT_PANEL_ULX, DEFAULT_PANEL_ULY};
use crate::error::{RadcalError, Result};

/// Half-open pixel rectangle `[uly..lry, ulx..lrx]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRegion {
    /// Upper-left column.
    pub ulx: usize,
    /// Upper-left row.
    pub uly: usize,
    /// Lower-right column (exclusive).
    pub lrx: usize,
    /// Lower-right row (exclusive).
    pub lry: usize,
}

impl Default for PixelRegion {
    fn default() -> Self {
        Self {
            ulx: DEFAULT_PANEL_ULX,
            uly: DEFAULT_PANEL_ULY,
            lrx: DEFAULT_PANEL_LRX,
            lry: DEFAULT_PANEL_LRY,
        }
    }
}

impl PixelRegion {
    pub fn new(ulx: usize, uly: usize, lrx: usize, lry: usize) -> Self {
        Self { ulx, uly, lrx, lry }
    }

    pub fn width(&self) -> usize {
        self.lrx.saturating_sub(self.ulx)
    }

    pub fn height(&self) -> usize {
        self.lry.saturating_sub(self.uly)
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Check the region is non-empty and inside a `width` x `height` image.
    pub fn validate(&self, width: usize, height: usize) -> Result<()> {
        if self.area() == 0 || self.lrx > width || self.lry > height {
            return Err(RadcalError::InvalidRegion {
                ulx: self.ulx,
                uly: self.uly,
                lrx: self.lrx,
                lry: self.lry,
                width,
                height,
            });
        }
        Ok(())
    }

    /// Mean of `data` over the region.
    pub fn mean(&self, data: &Array2<f32>) -> Result<f64> {
        let (h, w) = data.dim();
        self.validate(w, h)?;
        let view = data.slice(s![self.uly..self.lry, self.ulx..self.lrx]);
        let sum: f64 = view.iter().map(|&v| v as f64).sum();
        Ok(sum / self.area() as f64)
    }

    /// Shrink the region by `fraction` of its size on every side.
    ///
    /// The result always keeps at least one pixel.
    pub fn inset(&self, fraction: f32) -> PixelRegion {
        let fraction = fraction.clamp(0.0, 0.49);
        let dx = (self.width() as f32 * fraction).floor() as usize;
        let dy = (self.height() as f32 * fraction).floor() as usize;
        let ulx = self.ulx + dx;
        let uly = self.uly + dy;
        PixelRegion {
            ulx,
            uly,
            lrx: (self.lrx - dx).max(ulx + 1),
            lry: (self.lry - dy).max(uly + 1),
        }
    }
}

impl std::fmt::Display for PixelRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}:{}, {}:{}]",
            self.uly, self.lry, self.ulx, self.lrx
        )
    }
}
