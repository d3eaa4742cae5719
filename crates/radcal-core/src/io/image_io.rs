use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};

use crate::error::{RadcalError, Result};
use crate::frame::{Frame, PixelUnit};

/// File format of converted reflectance images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// 8-bit grayscale PNG stretched to the image min/max. Visualization only:
    /// absolute reflectance values are lost.
    #[default]
    Png,
    /// 32-bit float grayscale TIFF holding reflectance values unchanged.
    Tiff,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Tiff => "tif",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "PNG (8-bit, stretched)"),
            Self::Tiff => write!(f, "TIFF (32-bit float)"),
        }
    }
}

/// Load a raw capture as sensor counts.
///
/// 8-bit files keep their 0..255 values; everything else is read as 16-bit.
pub fn load_raw(path: &Path) -> Result<Frame> {
    let img = image::open(path)?;
    let frame = match img {
        DynamicImage::ImageLuma8(gray) => {
            let (w, h) = gray.dimensions();
            let data = Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
                gray.get_pixel(col as u32, row as u32).0[0] as f32
            });
            Frame::new(data, 8, PixelUnit::RawCounts)
        }
        other => {
            let gray = other.into_luma16();
            let (w, h) = gray.dimensions();
            let data = Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
                gray.get_pixel(col as u32, row as u32).0[0] as f32
            });
            Frame::new(data, 16, PixelUnit::RawCounts)
        }
    };
    Ok(frame)
}

/// Save a frame as 8-bit grayscale PNG, linearly stretching the finite
/// min/max of the data to 0..255.
pub fn save_png(frame: &Frame, path: &Path) -> Result<()> {
    let h = frame.height();
    let w = frame.width();

    let (lo, hi) = frame
        .data
        .iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = hi - lo;

    let mut img = GrayImage::new(w as u32, h as u32);
    for row in 0..h {
        for col in 0..w {
            let v = frame.data[[row, col]];
            let val = if v.is_finite() && range > 0.0 {
                ((v - lo) / range * 255.0).round().clamp(0.0, 255.0) as u8
            } else {
                0
            };
            img.put_pixel(col as u32, row as u32, Luma([val]));
        }
    }

    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save a frame as single-channel 32-bit float TIFF.
pub fn save_float_tiff(frame: &Frame, path: &Path) -> Result<()> {
    let pixels: Vec<f32> = frame.data.iter().copied().collect();
    let mut encoder = TiffEncoder::new(BufWriter::new(File::create(path)?))?;
    encoder.write_image::<colortype::Gray32Float>(
        frame.width() as u32,
        frame.height() as u32,
        &pixels,
    )?;
    Ok(())
}

/// Load a single-channel 32-bit float TIFF written by [`save_float_tiff`].
pub fn load_float_tiff(path: &Path) -> Result<Frame> {
    let mut decoder = Decoder::new(BufReader::new(File::open(path)?))?;
    let (w, h) = decoder.dimensions()?;
    let (w, h) = (w as usize, h as usize);
    let pixels = match decoder.read_image()? {
        DecodingResult::F32(v) if v.len() == w * h => v,
        _ => {
            return Err(RadcalError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{} is not a single-channel float TIFF", path.display()),
            )))
        }
    };
    let data = Array2::from_shape_fn((h, w), |(row, col)| pixels[row * w + col]);
    Ok(Frame::new(data, 32, PixelUnit::Reflectance))
}

/// Save a frame in the requested output format.
pub fn save_output(frame: &Frame, path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Png => save_png(frame, path),
        OutputFormat::Tiff => save_float_tiff(frame, path),
    }
}
