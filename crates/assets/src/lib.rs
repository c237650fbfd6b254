#![warn(missing_docs)]
//! Block model catalog: per-kind face UVs and the quads built from them.

mod catalog;
mod loader;
mod model;
mod vertex;

pub use catalog::{BlockModelCatalog, WATER_SURFACE_HEIGHT};
pub use loader::{catalog_from_file, catalog_from_str};
pub use model::{FaceUvs, UvRect};
pub use vertex::MeshVertex;

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// Top-level JSON document describing the atlas grid and every block model.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogDefinition {
    /// Number of tile columns in the atlas.
    pub columns: u32,
    /// Number of tile rows in the atlas.
    pub rows: u32,
    /// Per-kind face configuration keyed by block name (e.g. "grass").
    pub blocks: BTreeMap<String, BlockModelDefinition>,
}

/// Atlas cells for the faces of one block kind.
///
/// More specific keys win: `north` beats `side`, `side` beats `all`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockModelDefinition {
    /// Apply to all faces when specified.
    pub all: Option<[u32; 2]>,
    /// Apply to all side faces when specified.
    pub side: Option<[u32; 2]>,
    /// Specific cell for the top face.
    pub top: Option<[u32; 2]>,
    /// Specific cell for the bottom face.
    pub bottom: Option<[u32; 2]>,
    /// Specific cell for the north (-Z) face.
    pub north: Option<[u32; 2]>,
    /// Specific cell for the south (+Z) face.
    pub south: Option<[u32; 2]>,
    /// Specific cell for the east (+X) face.
    pub east: Option<[u32; 2]>,
    /// Specific cell for the west (-X) face.
    pub west: Option<[u32; 2]>,
}

/// Errors emitted while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Wrap IO errors when reading model files.
    #[error("failed to read block models: {0}")]
    Io(#[from] std::io::Error),
    /// Wrap serde parsing issues.
    #[error("failed to parse block models: {0}")]
    Parse(#[from] serde_json::Error),
    /// The document names a block that does not exist.
    #[error("unknown block kind '{0}'")]
    UnknownKind(String),
    /// A renderable kind has no model entry.
    #[error("no model for block kind '{0}'")]
    MissingModel(&'static str),
    /// A face of a renderable kind resolved to no atlas cell.
    #[error("block kind '{kind}' has no texture for its {face} face")]
    MissingFace {
        /// Block name.
        kind: &'static str,
        /// Face name.
        face: &'static str,
    },
    /// Atlas grid or cell coordinates are inconsistent.
    #[error("invalid atlas layout: {0}")]
    InvalidLayout(String),
}
