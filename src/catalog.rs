// In: src/catalog.rs

//! The block-length lookup consumed by the compression passes.
//!
//! The storage core must not depend on how element variants are represented
//! by the surrounding system, so the lookup is expressed as the narrow
//! [`BlockLengths`] capability trait. [`VariantCatalog`] is the concrete
//! implementation built from [`CatalogConfig`]; tests and embedders that
//! already know their lengths can build one directly with
//! [`VariantCatalog::from_lengths`].

use crate::config::CatalogConfig;
use crate::error::DofPackError;
use crate::types::VariantId;

//==================================================================================
// 1. The Capability Trait
//==================================================================================

/// Pure lookup from variant id to uncompressed block length, at a fixed
/// spatial dimension.
///
/// The only failure mode is an id the catalog does not know, which is a
/// programming error in the caller's tag assignment and is treated as fatal
/// by every consumer in this crate.
pub trait BlockLengths {
    fn block_length(&self, id: VariantId) -> Result<usize, DofPackError>;
}

//==================================================================================
// 2. The Concrete Catalog
//==================================================================================

/// Read-only table of per-variant block lengths.
///
/// Built once at startup and shared across levels; it holds no interior
/// mutability, so one instance may serve passes running on independent
/// levels in parallel.
#[derive(Debug, Clone)]
pub struct VariantCatalog {
    dim: u8,
    lengths: Vec<u32>,
    names: Vec<String>,
}

impl VariantCatalog {
    /// Builds the catalog from boundary configuration. Variant ids are the
    /// positions in `config.variants`.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, DofPackError> {
        // The id space is 15 bits; a larger catalog could not be addressed
        // by the packed tag table.
        if config.variants.len() >= VariantId::INVALID.as_usize() {
            return Err(DofPackError::Internal(format!(
                "catalog with {} variants exceeds the 15-bit id space",
                config.variants.len()
            )));
        }
        Ok(VariantCatalog {
            dim: config.dim,
            lengths: config.variants.iter().map(|v| v.dofs_per_cell).collect(),
            names: config.variants.iter().map(|v| v.name.clone()).collect(),
        })
    }

    /// Builds a catalog straight from a slice of block lengths, with
    /// synthesized names. Primarily for tests and hosts that manage variant
    /// metadata themselves.
    pub fn from_lengths(dim: u8, lengths: &[u32]) -> Self {
        VariantCatalog {
            dim,
            lengths: lengths.to_vec(),
            names: (0..lengths.len()).map(|i| format!("variant_{i}")).collect(),
        }
    }

    /// The spatial dimension this catalog's lengths apply to.
    pub fn dim(&self) -> u8 {
        self.dim
    }

    /// Number of variants in the catalog.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Diagnostic name of a variant, if the id is known.
    pub fn name(&self, id: VariantId) -> Option<&str> {
        self.names.get(id.as_usize()).map(String::as_str)
    }
}

impl BlockLengths for VariantCatalog {
    fn block_length(&self, id: VariantId) -> Result<usize, DofPackError> {
        self.lengths
            .get(id.as_usize())
            .map(|&len| len as usize)
            .ok_or(DofPackError::UnknownVariant(id.as_u16()))
    }
}
