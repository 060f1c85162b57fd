//! This file is the root of the `dofpack` Rust crate.
//!
//! dofpack is the per-level storage core of an hp-adaptive mesh system: for
//! every cell of a mesh level it holds a variable-length block of global DoF
//! indices and a tag naming the element variant that produced the block.
//! Blocks that happen to be arithmetic runs (consecutive integers) can be
//! collapsed in place to a single stored value and expanded back losslessly,
//! driven by the block-length lookup of an external variant catalog.
//!
//! The mesh itself, DoF assignment, and the variant catalog's contents are
//! external collaborators; this crate only stores, compresses, and
//! uncompresses one level's already-assigned index blocks.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod catalog;
pub mod config;
pub mod error;
pub mod kernels;
pub mod level;
pub mod types;
pub mod utils;

//==================================================================================
// 2. Public Re-exports
//==================================================================================
pub use catalog::{BlockLengths, VariantCatalog};
pub use config::{CatalogConfig, VariantConfig};
pub use error::DofPackError;
pub use level::{DofLevel, DofLevelBuilder, RawLevelParts};
pub use types::{VariantId, VariantTag, INVALID_OFFSET};
