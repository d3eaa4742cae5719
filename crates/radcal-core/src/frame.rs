use ndarray::Array2;

/// Physical meaning of the values stored in a [`Frame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelUnit {
    /// Sensor digital numbers, as decoded from the raw file.
    RawCounts,
    /// Absolute radiance in W/m^2/nm/sr.
    Radiance,
    /// Dimensionless reflectance.
    Reflectance,
}

/// A single-band image.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Bit depth of the source file (8 or 16)
    pub original_bit_depth: u8,
    pub unit: PixelUnit,
}

impl Frame {
    pub fn new(data: Array2<f32>, bit_depth: u8, unit: PixelUnit) -> Self {
        Self {
            data,
            original_bit_depth: bit_depth,
            unit,
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Replace the pixel data, keeping the source bit depth.
    pub fn with_data(&self, data: Array2<f32>, unit: PixelUnit) -> Self {
        Self::new(data, self.original_bit_depth, unit)
    }
}
