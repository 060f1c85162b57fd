//! Pure, stateless kernels underpinning the compression passes.
//!
//! Kernels hold no reference to the level storage or the variant catalog;
//! they operate on plain slices and buffers so they can be tested in
//! isolation.

pub mod runlen;
