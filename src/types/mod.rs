//! This module defines the core, strongly-typed data representations used
//! throughout the dofpack storage structure.
//!
//! It currently includes the canonical `VariantTag` encoding, which packs an
//! element-variant identifier and its compression flag into one storage word,
//! and the reserved offset sentinel marking inactive cells.

pub mod variant_tag;

// Re-export the main types for easier access.
pub use variant_tag::{VariantId, VariantTag, INVALID_OFFSET};
