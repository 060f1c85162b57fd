//! The packed tag encoding for the per-cell variant table.
//!
//! Each cell slot stores a single `u16`: the low 15 bits identify the element
//! variant in the external catalog, and the high bit records whether the
//! cell's DoF block is currently stored in compressed form. Packing both into
//! one word is a space optimization only; at the interface level the tag is
//! the small tagged value `VariantTag { id, compressed }`, and `pack`/`unpack`
//! are pure, mutually inverse functions.

use serde::{Deserialize, Serialize};

use crate::error::DofPackError;

//==================================================================================
// 1. Constants
//==================================================================================

/// Reserved offset value marking a cell as inactive on a level.
pub const INVALID_OFFSET: u32 = u32::MAX;

/// The bit of the packed tag word that records compression state.
pub(crate) const COMPRESSED_BIT: u16 = 0x8000;

/// Mask selecting the variant-id payload of a packed tag word.
pub(crate) const VARIANT_MASK: u16 = !COMPRESSED_BIT;

//==================================================================================
// 2. VariantId
//==================================================================================

/// Identifier of an element variant in the external catalog.
///
/// Valid ids occupy the low 15 bits of the storage word; the remaining bit is
/// reserved for the compression flag and is never part of an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(u16);

impl VariantId {
    /// The id stored in the tag slot of an inactive cell. Never a valid
    /// catalog entry.
    pub const INVALID: VariantId = VariantId(VARIANT_MASK);

    /// Creates a variant id, rejecting values that would collide with the
    /// reserved compression bit.
    pub fn new(raw: u16) -> Result<Self, DofPackError> {
        if raw & COMPRESSED_BIT != 0 {
            return Err(DofPackError::Internal(format!(
                "variant id {:#06x} overlaps the reserved compression bit",
                raw
            )));
        }
        Ok(VariantId(raw))
    }

    /// The raw 15-bit payload.
    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// Convenience index into catalog tables.
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

//==================================================================================
// 3. VariantTag (interface-level representation)
//==================================================================================

/// A cell's tag: which element variant produced its DoF block, plus whether
/// that block is currently stored compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantTag {
    pub id: VariantId,
    pub compressed: bool,
}

impl VariantTag {
    /// An uncompressed tag for the given variant.
    pub fn new(id: VariantId) -> Self {
        VariantTag {
            id,
            compressed: false,
        }
    }

    /// Packs the tag into its single-word storage form.
    pub fn pack(self) -> u16 {
        if self.compressed {
            self.id.0 | COMPRESSED_BIT
        } else {
            self.id.0
        }
    }

    /// Unpacks a storage word back into the interface representation.
    /// Exact inverse of [`VariantTag::pack`].
    pub fn unpack(word: u16) -> Self {
        VariantTag {
            id: VariantId(word & VARIANT_MASK),
            compressed: word & COMPRESSED_BIT != 0,
        }
    }
}

//==================================================================================
// 4. Raw-word helpers (used by the passes on the packed table)
//==================================================================================

/// Whether a packed tag word carries the compression flag.
pub(crate) fn is_compressed_entry(word: u16) -> bool {
    word & COMPRESSED_BIT != 0
}

/// Flips the compression flag of a packed tag word, leaving the id bits
/// untouched. Its own inverse.
pub(crate) fn toggle_compression_state(word: u16) -> u16 {
    word ^ COMPRESSED_BIT
}

//==================================================================================
// 5. Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_roundtrip() {
        for raw in [0u16, 1, 42, 0x7FFE] {
            let id = VariantId::new(raw).unwrap();
            for compressed in [false, true] {
                let tag = VariantTag { id, compressed };
                assert_eq!(VariantTag::unpack(tag.pack()), tag);
            }
        }
    }

    #[test]
    fn test_compressed_bit_does_not_disturb_id() {
        let id = VariantId::new(0x1234).unwrap();
        let packed = VariantTag { id, compressed: true }.pack();
        assert_eq!(packed & VARIANT_MASK, 0x1234);
        assert!(is_compressed_entry(packed));
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let word = VariantTag::new(VariantId::new(7).unwrap()).pack();
        let toggled = toggle_compression_state(word);
        assert!(is_compressed_entry(toggled));
        assert_eq!(toggle_compression_state(toggled), word);
    }

    #[test]
    fn test_id_colliding_with_reserved_bit_is_rejected() {
        assert!(VariantId::new(0x8000).is_err());
        assert!(VariantId::new(0xFFFF).is_err());
    }

    #[test]
    fn test_invalid_id_is_representable() {
        // The inactive-slot marker must survive a pack/unpack cycle like any
        // other id.
        let tag = VariantTag::new(VariantId::INVALID);
        assert_eq!(VariantTag::unpack(tag.pack()).id, VariantId::INVALID);
    }
}
