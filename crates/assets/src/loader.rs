use std::fs;
use std::path::Path;

use crate::{BlockModelCatalog, CatalogDefinition, CatalogError};

/// Load a block model catalog from the provided JSON file path.
pub fn catalog_from_file(path: &Path) -> Result<BlockModelCatalog, CatalogError> {
    let data = fs::read_to_string(path)?;
    catalog_from_str(&data)
}

/// Load a block model catalog from an in-memory JSON string.
pub fn catalog_from_str(input: &str) -> Result<BlockModelCatalog, CatalogError> {
    let definition: CatalogDefinition = serde_json::from_str(input)?;
    BlockModelCatalog::from_definition(&definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockworld_core::{BlockKind, Direction};

    const MODELS: &str = r#"{
        "columns": 8,
        "rows": 2,
        "blocks": {
            "stone": { "all": [0, 0] },
            "dirt": { "all": [1, 0] },
            "grass": { "top": [2, 0], "side": [3, 0], "bottom": [1, 0] },
            "log": { "side": [4, 0], "top": [5, 0], "bottom": [5, 0] },
            "sand": { "all": [6, 0] },
            "water": { "all": [7, 0] },
            "glass": { "all": [0, 1] },
            "leaves": { "all": [1, 1] },
            "rose": { "all": [2, 1] },
            "dandelion": { "all": [3, 1] }
        }
    }"#;

    #[test]
    fn parses_full_document() {
        let catalog = catalog_from_str(MODELS).expect("catalog");
        assert_eq!(catalog.grid(), (8, 2));
        let top = catalog.uvs(BlockKind::Log).get(Direction::PosY);
        assert_eq!(top.u0, 5.0 / 8.0);
        assert_eq!(top.v0, 0.0);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = catalog_from_str("{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = catalog_from_file(Path::new("/nonexistent/blockworld/models.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
