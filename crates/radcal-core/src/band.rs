use serde::{Deserialize, Serialize};

use crate::consts::{
    PANEL_REFLECTANCE_BLUE, PANEL_REFLECTANCE_GREEN, PANEL_REFLECTANCE_NIR,
    PANEL_REFLECTANCE_RED, PANEL_REFLECTANCE_RED_EDGE,
};
use crate::error::{RadcalError, Result};

/// Spectral band of a five-band multispectral camera.
///
/// The numeric index is the band suffix in capture filenames
/// (`IMG_0001_3.tif` is Red).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    Blue,
    Green,
    Red,
    #[serde(rename = "NIR")]
    Nir,
    #[serde(rename = "Red edge")]
    RedEdge,
}

impl Band {
    /// All bands in filename-index order.
    pub const ALL: [Band; 5] = [Band::Blue, Band::Green, Band::Red, Band::Nir, Band::RedEdge];

    /// Filename index of the band (1..=5).
    pub fn index(self) -> u8 {
        match self {
            Self::Blue => 1,
            Self::Green => 2,
            Self::Red => 3,
            Self::Nir => 4,
            Self::RedEdge => 5,
        }
    }

    /// Band for a filename index, or `None` outside 1..=5.
    pub fn from_index(index: u8) -> Option<Band> {
        Self::ALL.iter().copied().find(|b| b.index() == index)
    }

    /// Band name as written in `XMP:BandName`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Blue => "Blue",
            Self::Green => "Green",
            Self::Red => "Red",
            Self::Nir => "NIR",
            Self::RedEdge => "Red edge",
        }
    }

    /// Parse a band name. Matching ignores case and surrounding whitespace.
    pub fn from_name(name: &str) -> Result<Band> {
        let trimmed = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| RadcalError::UnknownBand(name.to_string()))
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Known reflectance of the calibration panel, per band.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelReflectance {
    pub blue: f64,
    pub green: f64,
    pub red: f64,
    pub red_edge: f64,
    pub nir: f64,
}

impl Default for PanelReflectance {
    fn default() -> Self {
        Self {
            blue: PANEL_REFLECTANCE_BLUE,
            green: PANEL_REFLECTANCE_GREEN,
            red: PANEL_REFLECTANCE_RED,
            red_edge: PANEL_REFLECTANCE_RED_EDGE,
            nir: PANEL_REFLECTANCE_NIR,
        }
    }
}

impl PanelReflectance {
    pub fn get(&self, band: Band) -> f64 {
        match band {
            Band::Blue => self.blue,
            Band::Green => self.green,
            Band::Red => self.red,
            Band::Nir => self.nir,
            Band::RedEdge => self.red_edge,
        }
    }
}
