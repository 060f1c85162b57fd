//! The two mutually inverse transformation passes over a level's arrays.
//!
//! Both passes share the same shape: a size phase that walks the active
//! cells, validates every block against the catalog and computes the exact
//! slot count of the result, then a write phase that re-walks identically
//! and fills freshly allocated arrays. The new `offsets`/`indices` pair is
//! swapped in only after the final size check, so a failing pass leaves the
//! level exactly as it was. All block-level error checking happens in the
//! size phase, before anything is mutated.
//!
//! The passes never call each other and are invoked by the owning level
//! manager at well-defined points: before serialization, after
//! deserialization, or to reclaim memory between refinement cycles.

use crate::catalog::BlockLengths;
use crate::error::DofPackError;
use crate::kernels::runlen;
use crate::types::variant_tag::{is_compressed_entry, toggle_compression_state, VARIANT_MASK};
use crate::types::{VariantId, INVALID_OFFSET};

use super::DofLevel;

/// The variant id of a packed tag word, ignoring the compression flag.
fn untoggled_id(word: u16) -> VariantId {
    // The mask strips the reserved bit, so the expect can never fire.
    VariantId::new(word & VARIANT_MASK).expect("masked id cannot carry the reserved bit")
}

impl DofLevel {
    //==============================================================================
    // 1. Compress Pass
    //==============================================================================

    /// Collapses every compressible block to its single starting value and
    /// marks the cell's tag compressed.
    ///
    /// A block is compressible when it is non-empty and its values form an
    /// arithmetic run with step one. Blocks already marked compressed are
    /// skipped unchanged (after checking they store exactly one value), so
    /// the pass is idempotent by construction. Non-compressible blocks are
    /// copied verbatim; inactive cells keep their sentinel offset.
    ///
    /// An uncompressed block whose length disagrees with the catalog is an
    /// internal-consistency failure and leaves the level untouched.
    pub fn compress_data(&mut self, lengths: &impl BlockLengths) -> Result<(), DofPackError> {
        // Empty-level shortcut. An index array with no owning cell slots is
        // corrupt; the converse (cell slots, empty index array) is legal as
        // long as no active cell expects a non-empty block, which the size
        // phase checks.
        if self.offsets.is_empty() {
            if self.indices.is_empty() {
                return Ok(());
            }
            return Err(DofPackError::Internal(format!(
                "index array holds {} slots but the offset table is empty",
                self.indices.len()
            )));
        }

        // Size phase: validate every block and count the slots the
        // compressed layout needs.
        let mut new_size = 0usize;
        let mut cell = 0;
        while cell < self.offsets.len() {
            if self.offsets[cell] == INVALID_OFFSET {
                cell += 1;
                continue;
            }
            let (start, end, next_cell) = self.block_bounds(cell);
            let block = &self.indices[start..end];

            if is_compressed_entry(self.tags[cell]) {
                if block.len() != 1 {
                    return Err(DofPackError::CompressedBlockMalformed {
                        cell,
                        found: block.len(),
                    });
                }
                new_size += 1;
            } else {
                let expected = lengths.block_length(untoggled_id(self.tags[cell]))?;
                if block.len() != expected {
                    return Err(DofPackError::BlockLengthMismatch {
                        cell,
                        expected,
                        found: block.len(),
                    });
                }
                if !block.is_empty() {
                    new_size += if runlen::is_arithmetic_run(block) {
                        1
                    } else {
                        block.len()
                    };
                }
            }
            cell = next_cell;
        }

        // Write phase: re-walk identically, filling the new arrays and
        // toggling the tag of each newly compressed cell.
        let mut new_indices = Vec::with_capacity(new_size);
        let mut new_offsets = vec![INVALID_OFFSET; self.offsets.len()];
        let mut cell = 0;
        while cell < self.offsets.len() {
            if self.offsets[cell] == INVALID_OFFSET {
                cell += 1;
                continue;
            }
            let (start, end, next_cell) = self.block_bounds(cell);
            new_offsets[cell] = new_indices.len() as u32;
            let block = &self.indices[start..end];

            if is_compressed_entry(self.tags[cell]) {
                // Already minimal; carried over as-is.
                new_indices.push(block[0]);
            } else if !block.is_empty() {
                if runlen::is_arithmetic_run(block) {
                    new_indices.push(block[0]);
                    self.tags[cell] = toggle_compression_state(self.tags[cell]);
                } else {
                    new_indices.extend_from_slice(block);
                }
            }
            cell = next_cell;
        }

        if new_indices.len() != new_size {
            return Err(DofPackError::SizeMismatch {
                expected: new_size,
                written: new_indices.len(),
            });
        }

        log::debug!(
            "compress_data: {} -> {} index slots over {} cells",
            self.indices.len(),
            new_size,
            self.offsets.len()
        );
        log_metric!(
            "event" = "compress_data",
            "old_slots" = &self.indices.len(),
            "new_slots" = &new_size,
        );

        // Swap in the freshly built pair.
        self.indices = new_indices;
        self.offsets = new_offsets;
        Ok(())
    }

    //==============================================================================
    // 2. Uncompress Pass
    //==============================================================================

    /// Inverse of [`DofLevel::compress_data`]: expands every compressed
    /// block back into its full arithmetic run and clears the cell's flag;
    /// uncompressed blocks are copied verbatim.
    ///
    /// The size of every expanded block comes from the catalog, not from the
    /// stored data: a compressed block is not self-describing beyond its
    /// flag. A non-compressed block whose stored length disagrees with the
    /// catalog, or a compressed block not storing exactly one value, is an
    /// internal-consistency failure and leaves the level untouched.
    pub fn uncompress_data(&mut self, lengths: &impl BlockLengths) -> Result<(), DofPackError> {
        // Empty-level shortcut, mirroring the compress pass.
        if self.offsets.is_empty() {
            if self.indices.is_empty() {
                return Ok(());
            }
            return Err(DofPackError::Internal(format!(
                "index array holds {} slots but the offset table is empty",
                self.indices.len()
            )));
        }

        // Size phase: validate stored lengths and sum the catalog block
        // length of every active cell.
        let mut new_size = 0usize;
        let mut cell = 0;
        while cell < self.offsets.len() {
            if self.offsets[cell] == INVALID_OFFSET {
                cell += 1;
                continue;
            }
            let (start, end, next_cell) = self.block_bounds(cell);
            let stored_len = end - start;
            let expected = lengths.block_length(untoggled_id(self.tags[cell]))?;

            if is_compressed_entry(self.tags[cell]) {
                if stored_len != 1 {
                    return Err(DofPackError::CompressedBlockMalformed {
                        cell,
                        found: stored_len,
                    });
                }
            } else if stored_len != expected {
                return Err(DofPackError::BlockLengthMismatch {
                    cell,
                    expected,
                    found: stored_len,
                });
            }
            new_size += expected;
            cell = next_cell;
        }

        if new_size >= INVALID_OFFSET as usize {
            return Err(DofPackError::Internal(format!(
                "uncompressed index array with {} slots exceeds the 32-bit offset space",
                new_size
            )));
        }

        // Write phase: expand or copy each block and clear the flags of the
        // cells being uncompressed.
        let mut new_indices = Vec::with_capacity(new_size);
        let mut new_offsets = vec![INVALID_OFFSET; self.offsets.len()];
        let mut cell = 0;
        while cell < self.offsets.len() {
            if self.offsets[cell] == INVALID_OFFSET {
                cell += 1;
                continue;
            }
            let (start, end, next_cell) = self.block_bounds(cell);
            new_offsets[cell] = new_indices.len() as u32;

            if is_compressed_entry(self.tags[cell]) {
                let run_length = lengths.block_length(untoggled_id(self.tags[cell]))?;
                runlen::expand_run(self.indices[start], run_length, &mut new_indices);
                self.tags[cell] = toggle_compression_state(self.tags[cell]);
            } else {
                new_indices.extend_from_slice(&self.indices[start..end]);
            }
            cell = next_cell;
        }

        if new_indices.len() != new_size {
            return Err(DofPackError::SizeMismatch {
                expected: new_size,
                written: new_indices.len(),
            });
        }

        log::debug!(
            "uncompress_data: {} -> {} index slots over {} cells",
            self.indices.len(),
            new_size,
            self.offsets.len()
        );
        log_metric!(
            "event" = "uncompress_data",
            "old_slots" = &self.indices.len(),
            "new_slots" = &new_size,
        );

        // Swap in the freshly built pair.
        self.indices = new_indices;
        self.offsets = new_offsets;
        Ok(())
    }
}
