pub mod blur;
pub mod components;
pub mod config;
pub mod locator;
pub mod morphology;
pub mod threshold;

pub use config::{PanelConfig, PanelDetectionConfig, RoiSource, ThresholdMethod};
pub use locator::{BrightPanelLocator, PanelDetection, PanelLocator};
