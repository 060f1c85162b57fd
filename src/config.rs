// In: src/config.rs

//! The single source of truth for catalog configuration.
//!
//! This module defines the `CatalogConfig` struct, which is designed to be
//! created once at the application boundary (e.g., from a host's JSON file)
//! and then handed to [`crate::catalog::VariantCatalog::from_config`]. The
//! core never mutates configuration; it only reads the per-variant block
//! lengths derived from it.

use serde::{Deserialize, Serialize};

use crate::error::DofPackError;

//==================================================================================
// I. Per-Variant Configuration
//==================================================================================

/// Describes one element variant of the catalog.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct VariantConfig {
    /// Human-readable variant name (e.g., "q1", "q2"). Diagnostic only; the
    /// storage core addresses variants by their position in the list.
    pub name: String,

    /// Number of DoF indices an uncompressed block of this variant holds on a
    /// cell of the configured dimension.
    pub dofs_per_cell: u32,
}

//==================================================================================
// II. The CatalogConfig
//==================================================================================

/// Configuration for an element-variant catalog at a fixed spatial dimension.
///
/// Variant ids are implicit: the variant at position `i` of `variants` has
/// id `i`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CatalogConfig {
    /// The spatial dimension the block lengths apply to.
    #[serde(default = "default_dim")]
    pub dim: u8,

    /// The element variants, in id order.
    pub variants: Vec<VariantConfig>,
}

impl CatalogConfig {
    /// Parses a configuration from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, DofPackError> {
        let config: CatalogConfig = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Reads and parses a configuration from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self, DofPackError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Helper for `serde` to default the spatial dimension.
fn default_dim() -> u8 {
    2
}

//==================================================================================
// III. Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "dim": 3,
            "variants": [
                { "name": "q1", "dofs_per_cell": 8 },
                { "name": "q2", "dofs_per_cell": 27 }
            ]
        }"#;
        let config = CatalogConfig::from_json(json).unwrap();
        assert_eq!(config.dim, 3);
        assert_eq!(config.variants.len(), 2);
        assert_eq!(config.variants[1].name, "q2");
        assert_eq!(config.variants[1].dofs_per_cell, 27);
    }

    #[test]
    fn test_dim_defaults_when_omitted() {
        let json = r#"{ "variants": [ { "name": "q1", "dofs_per_cell": 4 } ] }"#;
        let config = CatalogConfig::from_json(json).unwrap();
        assert_eq!(config.dim, 2);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let result = CatalogConfig::from_json("{ not json }");
        assert!(matches!(result, Err(DofPackError::SerdeJson(_))));
    }

    #[test]
    fn test_missing_config_file_is_an_io_error() {
        let result = CatalogConfig::from_json_file("/nonexistent/catalog.json");
        assert!(matches!(result, Err(DofPackError::Io(_))));
    }
}
