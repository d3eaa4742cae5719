use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{RadcalError, Result};

use super::{ImageMetadata, MetadataSource};

/// Reads metadata from saved exiftool JSON next to each image
/// (`IMG_0001_1.tif` -> `IMG_0001_1.json`), as produced by
/// `exiftool -j -n -G -w json`.
#[derive(Clone, Debug, Default)]
pub struct JsonSidecar;

impl JsonSidecar {
    pub fn sidecar_path(image: &Path) -> PathBuf {
        image.with_extension("json")
    }
}

impl MetadataSource for JsonSidecar {
    fn read(&self, path: &Path) -> Result<ImageMetadata> {
        let sidecar = Self::sidecar_path(path);
        debug!(file = %sidecar.display(), "Reading metadata sidecar");
        let json = std::fs::read_to_string(&sidecar).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RadcalError::MetadataMissing {
                    key: "<sidecar>".to_string(),
                    path: sidecar.clone(),
                }
            } else {
                RadcalError::Io(e)
            }
        })?;
        ImageMetadata::from_exiftool_json(path, &json)
    }
}
