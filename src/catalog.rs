//! The model catalog: a fixed, index-addressed list of loaded models.
//!
//! Slots never own models; they hold a catalog index and look the asset up every
//! frame. An entry that failed to load stays in the catalog as an unready
//! position so indices keep matching the configuration, and slots assigned to it
//! simply draw nothing.

use std::path::PathBuf;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{Builtin, GeometryError, RawGeometry};
use crate::gpu::GpuContext;
use crate::mesh::{Color, Mesh};

/// One configured catalog position. Exactly one of `path` and `builtin` is set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builtin: Option<Builtin>,
    #[serde(default)]
    pub color: Color,
}

/// Where a catalog entry's geometry comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelSource {
    File(PathBuf),
    Builtin(Builtin),
}

impl CatalogEntry {
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>, color: Color) -> Self {
        Self {
            name: name.into(),
            path: Some(path.into()),
            builtin: None,
            color,
        }
    }

    pub fn builtin(name: impl Into<String>, kind: Builtin, color: Color) -> Self {
        Self {
            name: name.into(),
            path: None,
            builtin: Some(kind),
            color,
        }
    }

    pub fn source(&self) -> Result<ModelSource> {
        match (&self.path, self.builtin) {
            (Some(path), None) => Ok(ModelSource::File(path.clone())),
            (None, Some(kind)) => Ok(ModelSource::Builtin(kind)),
            (Some(_), Some(_)) => Err(Error::config(format!(
                "model '{}' sets both `path` and `builtin`",
                self.name
            ))),
            (None, None) => Err(Error::config(format!(
                "model '{}' needs a `path` or a `builtin`",
                self.name
            ))),
        }
    }

    /// Load and normalize this entry's geometry on the CPU.
    pub fn geometry(&self) -> Result<RawGeometry> {
        let raw = match self.source()? {
            ModelSource::File(path) => RawGeometry::from_file(&path)?,
            ModelSource::Builtin(kind) => RawGeometry::builtin(kind),
        };
        if raw.is_empty() {
            return Err(GeometryError::Parse(format!("model '{}' has no triangles", self.name)).into());
        }
        Ok(raw.prepared())
    }
}

/// An immutable loaded model.
#[derive(Debug)]
pub struct ModelAsset {
    pub name: String,
    pub mesh: Mesh,
    pub color: Color,
}

/// Index-addressed models, some of which may be unready.
#[derive(Debug, Default)]
pub struct ModelCatalog {
    models: Vec<Option<ModelAsset>>,
}

impl ModelCatalog {
    /// Number of catalog positions, ready or not.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// The model at `index`, or `None` when it is unready or out of range.
    pub fn get(&self, index: usize) -> Option<&ModelAsset> {
        self.models.get(index).and_then(Option::as_ref)
    }

    pub fn ready_count(&self) -> usize {
        self.models.iter().flatten().count()
    }
}

pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(Error::InvalidModelIndex { index, len })
    }
}

/// Load every catalog entry and upload it to the GPU.
///
/// Blocks until all entries are processed. Entries that fail are logged and left
/// unready; only an empty entry list is an error.
pub fn load_models(gpu: &GpuContext, entries: &[CatalogEntry]) -> Result<ModelCatalog> {
    if entries.is_empty() {
        return Err(Error::EmptyCatalog);
    }

    let models = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| match entry.geometry() {
            Ok(geometry) => {
                info!(
                    "loaded model {index} '{}' ({} triangles)",
                    entry.name,
                    geometry.indices.len() / 3
                );
                Some(ModelAsset {
                    name: entry.name.clone(),
                    mesh: geometry.upload(gpu),
                    color: entry.color,
                })
            }
            Err(err) => {
                warn!("model {index} '{}' is unavailable: {err}", entry.name);
                None
            }
        })
        .collect();

    Ok(ModelCatalog { models })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_entries_produce_geometry() {
        let entry = CatalogEntry::builtin("Bench", Builtin::Bench, Color::WHITE);
        let geometry = entry.geometry().unwrap();
        assert!(!geometry.is_empty());
    }

    #[test]
    fn missing_file_reports_io_error() {
        let entry = CatalogEntry::file("Ghost", "does/not/exist.stl", Color::WHITE);
        assert!(matches!(
            entry.geometry(),
            Err(Error::Geometry(GeometryError::Io(_)))
        ));
    }

    #[test]
    fn sourceless_entry_is_a_config_error() {
        let entry = CatalogEntry {
            name: "Nothing".into(),
            path: None,
            builtin: None,
            color: Color::WHITE,
        };
        assert!(matches!(entry.source(), Err(Error::Config(_))));
    }

    #[test]
    fn index_check_reports_bounds() {
        assert!(check_index(2, 3).is_ok());
        assert!(matches!(
            check_index(3, 3),
            Err(Error::InvalidModelIndex { index: 3, len: 3 })
        ));
    }

    #[test]
    fn empty_catalog_has_no_models() {
        let catalog = ModelCatalog::default();
        assert!(catalog.is_empty());
        assert!(catalog.get(0).is_none());
    }
}
