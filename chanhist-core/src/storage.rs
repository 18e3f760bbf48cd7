//! Abstract interface to the backing sparse multidimensional storage engine.
//!
//! The accumulation layer never touches storage internals; it only calls
//! through these traits. Production engines live outside this workspace, a
//! reference in-memory engine ships with the `chanhist-sparse` crate.

use crate::axis::AxisDescriptor;
use crate::error::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of one sparse storage bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinId(pub i64);

impl BinId {
    /// Marker for a coordinate that falls outside every bin.
    pub const INVALID: BinId = BinId(-1);

    /// Returns true if the id addresses an actual bin.
    #[inline]
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

/// Backing sparse multidimensional histogram engine.
pub trait SparseStorage {
    /// Resolves a coordinate vector to a bin identifier.
    ///
    /// Deterministic: identical coordinates against an identical axis
    /// configuration always resolve to the same id.
    fn compute_bin_id(&self, coordinates: &[f64]) -> BinId;

    /// Adds `weight` to the addressed bin's content and `weight * weight`
    /// to its squared-error accumulator.
    ///
    /// A coordinate outside the axis ranges is handled per the engine's own
    /// overflow policy, not reported as an error.
    fn fill_weighted(&mut self, coordinates: &[f64], weight: f64);

    /// Content of the addressed bin.
    fn bin_content(&self, bin: BinId) -> f64;

    /// Error of the addressed bin, the square root of its squared-weight
    /// sum.
    fn bin_error(&self, bin: BinId) -> f64;

    /// Number of logical entries recorded so far.
    fn entry_count(&self) -> u64;

    /// Overwrites the logical entry count.
    fn set_entry_count(&mut self, count: u64);

    /// Replaces the binning of dimension `dim` with explicit edges.
    fn set_axis_binning(&mut self, dim: usize, edges: &[f64]);

    /// Sets the display label of dimension `dim`.
    fn set_axis_label(&mut self, dim: usize, label: &str);

    /// Sets the display label of one bin on dimension `dim`.
    fn set_bin_label(&mut self, dim: usize, bin: usize, label: &str);
}

/// Allocates storage engines from a bulk dimension descriptor.
pub trait SparseStorageFactory {
    /// Concrete engine produced by this factory.
    type Storage: SparseStorage;

    /// Allocates a `descriptor.len()`-dimensional sparse histogram.
    ///
    /// # Errors
    /// Fails with an allocation error when the engine rejects the
    /// descriptor, e.g. a dimension with no bins or inverted edges.
    fn allocate(&self, name: &str, title: &str, descriptor: &[AxisDescriptor])
        -> Result<Self::Storage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_id_validity() {
        assert!(BinId(0).is_valid());
        assert!(BinId(41).is_valid());
        assert!(!BinId::INVALID.is_valid());
        assert!(!BinId(-7).is_valid());
    }
}
