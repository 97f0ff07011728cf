//! Types for deduplicated label storage.
//!
//! Interning functionality is provided by the [`lasso`](lasso) crate. Every
//! [`DerivationTree`](crate::DerivationTree) owns one interner, so relabeling a node with a string
//! that is already in use (the common case for grammar symbol names) does not allocate.

/// The intern key type for node labels.
pub type LabelKey = lasso::Spur;

/// The interner backing a [`DerivationTree`](crate::DerivationTree)'s labels.
pub type LabelInterner = lasso::Rodeo<LabelKey, fxhash::FxBuildHasher>;

/// Constructs a new, empty label interner.
#[inline]
pub fn new_interner() -> LabelInterner {
    LabelInterner::with_hasher(Default::default())
}
