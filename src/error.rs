// In: src/error.rs

//! This module defines the single, unified error type for the entire dofpack library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! There are only two families of failure in this crate: internal-consistency
//! failures (invariant violations that indicate a bug in the caller's DoF
//! assignment or a corrupted level; fatal, never retried) and boundary errors
//! from parsing catalog configuration. No transient/retryable errors exist.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DofPackError {
    // =========================================================================
    // === Internal-Consistency Failures (fatal; a bug, not a runtime condition)
    // =========================================================================
    #[error("Internal logic error (this is a bug): {0}")]
    Internal(String),

    /// An uncompressed block's stored length disagrees with the catalog's
    /// block length for the cell's variant.
    #[error("Block length mismatch at cell {cell}: catalog says {expected}, stored block has {found}")]
    BlockLengthMismatch {
        cell: usize,
        expected: usize,
        found: usize,
    },

    /// A block whose tag carries the compressed flag must store exactly one value.
    #[error("Compressed block at cell {cell} stores {found} values, expected exactly 1")]
    CompressedBlockMalformed { cell: usize, found: usize },

    /// The write phase of a pass produced a different number of index slots
    /// than the size phase computed.
    #[error("Pass size mismatch: size phase computed {expected} slots, write phase produced {written}")]
    SizeMismatch { expected: usize, written: usize },

    /// A variant id with no entry in the catalog. Always a programming error
    /// in the caller's tag assignment.
    #[error("Unknown element variant id: {0}")]
    UnknownVariant(u16),

    /// Raw arrays handed to `DofLevel::from_raw_parts` do not form a valid level.
    #[error("Invalid raw level layout: {0}")]
    RawLayout(String),

    /// A byte buffer at the serialization boundary does not divide into whole
    /// elements of the requested type.
    #[error("Buffer length mismatch: expected a multiple of {0}, got {1}")]
    BufferMismatch(usize, usize),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem while reading
    /// catalog configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library during catalog config parsing.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
