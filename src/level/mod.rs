//! The per-level DoF index storage structure.
//!
//! A [`DofLevel`] holds, for every cell of one mesh level, a variable-length
//! block of global DoF indices together with the tag of the element variant
//! that produced it. Storage is a flat two-level indirection: a single
//! contiguous index array plus a per-cell offset table, so no per-cell
//! allocation ever happens. Block boundaries are derived from the offset
//! table, never stored separately; the block of an active cell `c` is
//! `indices[offsets[c] .. next_active_offset]`, and the end of the last
//! active block is the index array's length.
//!
//! Cells not active on the level carry the reserved offset
//! [`INVALID_OFFSET`] and keep it across every pass.
//!
//! The compression passes live in the [`compress`] sibling module; this
//! module owns the structure itself, its accessors, population via
//! [`DofLevelBuilder`], the tag normalization pass, and footprint
//! accounting.

use serde::{Deserialize, Serialize};

use crate::catalog::BlockLengths;
use crate::error::DofPackError;
use crate::kernels::runlen;
use crate::types::variant_tag::is_compressed_entry;
use crate::types::variant_tag::toggle_compression_state;
use crate::types::{VariantId, VariantTag, INVALID_OFFSET};

mod compress;


//==================================================================================
// 1. The Level Structure
//==================================================================================

/// Per-level storage of DoF index blocks, one block per active cell.
///
/// Invariants (checked where cheap, rebuilt wholesale by the passes):
/// - `offsets.len() == tags.len()` at all times, one slot per cell;
/// - active offsets are non-decreasing in cell order and never exceed
///   `indices.len()`;
/// - an uncompressed block's length equals the catalog block length of its
///   tag's variant; a compressed block stores exactly one value, the start
///   of the arithmetic run it stands for.
///
/// One instance is single-threaded: the passes take `&mut self` and are not
/// reentrant. Independent levels may run passes concurrently against the
/// same read-only catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DofLevel {
    /// Per-cell offset into `indices`, or `INVALID_OFFSET` for cells not
    /// active on this level.
    offsets: Vec<u32>,

    /// Flat array of global DoF indices, one contiguous block per active
    /// cell, in increasing cell order.
    indices: Vec<u64>,

    /// Per-cell packed variant tag. The high bit records whether the cell's
    /// block is currently stored compressed.
    tags: Vec<u16>,
}

impl DofLevel {
    /// Number of cell slots on this level (active or not).
    pub fn num_cells(&self) -> usize {
        self.offsets.len()
    }

    /// Total number of index slots currently stored, across all blocks.
    pub fn num_stored_indices(&self) -> usize {
        self.indices.len()
    }

    /// Whether the cell is active on this level.
    pub fn is_active(&self, cell: usize) -> bool {
        self.offsets[cell] != INVALID_OFFSET
    }

    /// The cell's variant tag, or `None` for an inactive cell.
    pub fn variant_tag(&self, cell: usize) -> Option<VariantTag> {
        if self.is_active(cell) {
            Some(VariantTag::unpack(self.tags[cell]))
        } else {
            None
        }
    }

    /// The cell's block exactly as stored, or `None` for an inactive cell.
    ///
    /// For a cell whose tag is marked compressed this is the single-value
    /// run representation, not the decoded block; see
    /// [`DofLevel::decoded_block`] for the latter.
    pub fn stored_block(&self, cell: usize) -> Option<&[u64]> {
        if !self.is_active(cell) {
            return None;
        }
        let (start, end, _) = self.block_bounds(cell);
        Some(&self.indices[start..end])
    }

    /// The cell's DoF indices with any compression decoded, or `Ok(None)`
    /// for an inactive cell.
    pub fn decoded_block(
        &self,
        cell: usize,
        lengths: &impl BlockLengths,
    ) -> Result<Option<Vec<u64>>, DofPackError> {
        let tag = match self.variant_tag(cell) {
            Some(tag) => tag,
            None => return Ok(None),
        };
        let (start, end, _) = self.block_bounds(cell);
        let stored = &self.indices[start..end];

        if !tag.compressed {
            return Ok(Some(stored.to_vec()));
        }
        if stored.len() != 1 {
            return Err(DofPackError::CompressedBlockMalformed {
                cell,
                found: stored.len(),
            });
        }
        let len = lengths.block_length(tag.id)?;
        let mut block = Vec::new();
        runlen::expand_run(stored[0], len, &mut block);
        Ok(Some(block))
    }

    /// Iterates the indices of the cells active on this level, in order.
    pub fn active_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.offsets
            .iter()
            .enumerate()
            .filter(|(_, &offset)| offset != INVALID_OFFSET)
            .map(|(cell, _)| cell)
    }

    /// Bounds of an active cell's stored block and the index of the next
    /// active cell. The end of the last active block is `indices.len()`.
    pub(crate) fn block_bounds(&self, cell: usize) -> (usize, usize, usize) {
        debug_assert!(self.is_active(cell));
        let start = self.offsets[cell] as usize;

        let mut next_cell = cell + 1;
        while next_cell < self.offsets.len() && self.offsets[next_cell] == INVALID_OFFSET {
            next_cell += 1;
        }
        let end = if next_cell < self.offsets.len() {
            self.offsets[next_cell] as usize
        } else {
            self.indices.len()
        };
        (start, end, next_cell)
    }

    //==============================================================================
    // 2. Normalization
    //==============================================================================

    /// Clears every compressed flag in the tag table without touching
    /// `offsets` or `indices`.
    ///
    /// Afterwards the tag table reads as if uncompressed while the arrays may
    /// still be laid out compressed; useful when only the variant ids need to
    /// be canonical (comparison, catalog lookups). Callers must not read the
    /// blocks as uncompressed data after this. Idempotent.
    pub fn normalize(&mut self) {
        for tag in &mut self.tags {
            if is_compressed_entry(*tag) {
                *tag = toggle_compression_state(*tag);
            }
        }
    }

    //==============================================================================
    // 3. Footprint Accounting
    //==============================================================================

    /// Aggregate byte footprint of the structure: each array's element count
    /// times element size, plus the fixed struct overhead. Pure query.
    pub fn footprint(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.offsets.len() * std::mem::size_of::<u32>()
            + self.indices.len() * std::mem::size_of::<u64>()
            + self.tags.len() * std::mem::size_of::<u16>()
    }

    //==============================================================================
    // 4. Raw Boundary (external serialization support)
    //==============================================================================

    /// Decomposes the level into its raw arrays. The host serializer must
    /// capture these verbatim (compressed or not) to remain round-trippable.
    pub fn into_raw_parts(self) -> RawLevelParts {
        RawLevelParts {
            offsets: self.offsets,
            indices: self.indices,
            tags: self.tags,
        }
    }

    /// Reassembles a level from raw arrays, re-checking the structural
    /// invariants. Violations indicate corrupted data and are fatal.
    pub fn from_raw_parts(parts: RawLevelParts) -> Result<Self, DofPackError> {
        if parts.offsets.len() != parts.tags.len() {
            return Err(DofPackError::RawLayout(format!(
                "offset table has {} slots but tag table has {}",
                parts.offsets.len(),
                parts.tags.len()
            )));
        }
        if parts.offsets.is_empty() && !parts.indices.is_empty() {
            return Err(DofPackError::RawLayout(format!(
                "index array holds {} slots but the offset table is empty",
                parts.indices.len()
            )));
        }
        if parts.indices.len() >= INVALID_OFFSET as usize {
            return Err(DofPackError::RawLayout(format!(
                "index array with {} slots exceeds the 32-bit offset space",
                parts.indices.len()
            )));
        }
        let mut previous: Option<u32> = None;
        for (cell, &offset) in parts.offsets.iter().enumerate() {
            if offset == INVALID_OFFSET {
                continue;
            }
            if offset as usize > parts.indices.len() {
                return Err(DofPackError::RawLayout(format!(
                    "offset {} of cell {} points past the index array (len {})",
                    offset,
                    cell,
                    parts.indices.len()
                )));
            }
            if let Some(prev) = previous {
                if offset < prev {
                    return Err(DofPackError::RawLayout(format!(
                        "offset {} of cell {} is smaller than a preceding offset {}",
                        offset, cell, prev
                    )));
                }
            }
            previous = Some(offset);
        }
        Ok(DofLevel {
            offsets: parts.offsets,
            indices: parts.indices,
            tags: parts.tags,
        })
    }

    /// Audits every active cell's stored block length against the catalog:
    /// exactly 1 for compressed blocks, the catalog block length otherwise.
    ///
    /// Intended after deserialization, before the level is put back into
    /// service.
    pub fn validate_against(&self, lengths: &impl BlockLengths) -> Result<(), DofPackError> {
        let mut cell = 0;
        while cell < self.offsets.len() {
            if !self.is_active(cell) {
                cell += 1;
                continue;
            }
            let (start, end, next_cell) = self.block_bounds(cell);
            let stored_len = end - start;
            let tag = VariantTag::unpack(self.tags[cell]);

            if tag.compressed {
                if stored_len != 1 {
                    return Err(DofPackError::CompressedBlockMalformed {
                        cell,
                        found: stored_len,
                    });
                }
            } else {
                let expected = lengths.block_length(tag.id)?;
                if stored_len != expected {
                    return Err(DofPackError::BlockLengthMismatch {
                        cell,
                        expected,
                        found: stored_len,
                    });
                }
            }
            cell = next_cell;
        }
        Ok(())
    }
}

//==================================================================================
// 5. Raw Parts
//==================================================================================

/// The three arrays of a level, exposed verbatim for host serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLevelParts {
    pub offsets: Vec<u32>,
    pub indices: Vec<u64>,
    pub tags: Vec<u16>,
}

//==================================================================================
// 6. Population
//==================================================================================

/// Builds an uncompressed [`DofLevel`] cell by cell, in cell-index order.
///
/// DoF assignment itself is an external concern; the builder is the surface
/// through which an already-assigned distribution enters the storage core.
/// `build` validates every block length against the catalog before handing
/// the level out.
#[derive(Debug, Default)]
pub struct DofLevelBuilder {
    offsets: Vec<u32>,
    indices: Vec<u64>,
    tags: Vec<u16>,
    overflowed: bool,
}

impl DofLevelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an active cell with the given variant and DoF block.
    pub fn push_cell(&mut self, id: VariantId, dofs: &[u64]) -> &mut Self {
        if self.indices.len() + dofs.len() >= INVALID_OFFSET as usize {
            self.overflowed = true;
            return self;
        }
        self.offsets.push(self.indices.len() as u32);
        self.indices.extend_from_slice(dofs);
        self.tags.push(VariantTag::new(id).pack());
        self
    }

    /// Appends a cell slot that is not active on this level.
    pub fn push_inactive(&mut self) -> &mut Self {
        self.offsets.push(INVALID_OFFSET);
        self.tags.push(VariantTag::new(VariantId::INVALID).pack());
        self
    }

    /// Finalizes the level, auditing every pushed block against the catalog.
    pub fn build(self, lengths: &impl BlockLengths) -> Result<DofLevel, DofPackError> {
        if self.overflowed {
            return Err(DofPackError::Internal(
                "index array exceeds the 32-bit offset space".to_string(),
            ));
        }
        let level = DofLevel {
            offsets: self.offsets,
            indices: self.indices,
            tags: self.tags,
        };
        level.validate_against(lengths)?;
        Ok(level)
    }
}
