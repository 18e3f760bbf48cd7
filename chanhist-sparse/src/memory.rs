//! In-memory reference implementation of the sparse storage interface.
#![allow(clippy::cast_precision_loss, clippy::cast_possible_wrap, clippy::cast_sign_loss)]

use std::collections::HashMap;

use chanhist_core::{
    AxisDescriptor, BinId, Error, KahanSum, Result, SparseStorage, SparseStorageFactory,
};

/// One storage dimension: explicit bin edges plus display labels.
#[derive(Debug, Clone)]
struct StorageAxis {
    edges: Vec<f64>,
    label: String,
    bin_labels: HashMap<usize, String>,
}

impl StorageAxis {
    fn from_descriptor(descriptor: &AxisDescriptor) -> Self {
        let width =
            (descriptor.upper_edge - descriptor.lower_edge) / descriptor.bin_count as f64;
        let mut edges: Vec<f64> = (0..descriptor.bin_count)
            .map(|bin| descriptor.lower_edge + width * bin as f64)
            .collect();
        edges.push(descriptor.upper_edge);
        Self {
            edges,
            label: String::new(),
            bin_labels: HashMap::new(),
        }
    }

    fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }

    /// Bin index of `value`, or `None` outside the axis range.
    ///
    /// Bins are right-open: a value on the upper edge of the axis is out of
    /// range, not in the last bin.
    fn find_bin(&self, value: f64) -> Option<usize> {
        if value.is_nan() || value < self.edges[0] || value >= self.edges[self.edges.len() - 1] {
            return None;
        }
        let index = self.edges.partition_point(|&edge| edge <= value) - 1;
        Some(index.min(self.bin_count() - 1))
    }
}

/// Content and squared-weight sums of one occupied bin.
#[derive(Debug, Clone, Default)]
struct BinAccumulator {
    content: KahanSum<f64>,
    weight_sq: KahanSum<f64>,
}

/// Map-backed sparse multidimensional histogram.
///
/// Reference implementation of [`SparseStorage`], used by the test suite
/// and as a default in-process engine. Bin ids are the row-major
/// linearization of the per-dimension bin indices; a coordinate outside
/// any axis range resolves to [`BinId::INVALID`] and weighted fills drop
/// it silently, the overflow policy this interface leaves to the engine.
#[derive(Debug, Clone)]
pub struct MemorySparse {
    name: String,
    title: String,
    axes: Vec<StorageAxis>,
    bins: HashMap<u64, BinAccumulator>,
    entries: u64,
}

impl MemorySparse {
    /// Histogram name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of dimensions.
    #[must_use]
    pub fn dimension_count(&self) -> usize {
        self.axes.len()
    }

    /// Number of sparse cells allocated so far.
    #[must_use]
    pub fn occupied_bins(&self) -> usize {
        self.bins.len()
    }

    /// Display label of dimension `dim`.
    #[must_use]
    pub fn axis_label(&self, dim: usize) -> Option<&str> {
        self.axes.get(dim).map(|axis| axis.label.as_str())
    }

    /// Label of `bin` on dimension `dim`, if one was assigned.
    #[must_use]
    pub fn bin_label(&self, dim: usize, bin: usize) -> Option<&str> {
        self.axes
            .get(dim)
            .and_then(|axis| axis.bin_labels.get(&bin))
            .map(String::as_str)
    }

    /// Bin edges of dimension `dim`.
    #[must_use]
    pub fn axis_edges(&self, dim: usize) -> Option<&[f64]> {
        self.axes.get(dim).map(|axis| axis.edges.as_slice())
    }

    fn locate(&self, coordinates: &[f64]) -> Option<u64> {
        if coordinates.len() != self.axes.len() {
            return None;
        }
        let mut id: u64 = 0;
        for (axis, &value) in self.axes.iter().zip(coordinates) {
            let bin = axis.find_bin(value)?;
            id = id * axis.bin_count() as u64 + bin as u64;
        }
        Some(id)
    }
}

impl SparseStorage for MemorySparse {
    fn compute_bin_id(&self, coordinates: &[f64]) -> BinId {
        self.locate(coordinates)
            .map_or(BinId::INVALID, |id| BinId(id as i64))
    }

    fn fill_weighted(&mut self, coordinates: &[f64], weight: f64) {
        if let Some(id) = self.locate(coordinates) {
            let bin = self.bins.entry(id).or_default();
            bin.content.add(weight);
            bin.weight_sq.add(weight * weight);
        }
    }

    fn bin_content(&self, bin: BinId) -> f64 {
        if !bin.is_valid() {
            return 0.0;
        }
        // The correction term holds the rounding error of the running sum;
        // subtracting it yields the compensated content.
        self.bins
            .get(&(bin.0 as u64))
            .map_or(0.0, |acc| acc.content.sum() - acc.content.correction())
    }

    fn bin_error(&self, bin: BinId) -> f64 {
        if !bin.is_valid() {
            return 0.0;
        }
        self.bins
            .get(&(bin.0 as u64))
            .map_or(0.0, |acc| (acc.weight_sq.sum() - acc.weight_sq.correction()).sqrt())
    }

    fn entry_count(&self) -> u64 {
        self.entries
    }

    fn set_entry_count(&mut self, count: u64) {
        self.entries = count;
    }

    fn set_axis_binning(&mut self, dim: usize, edges: &[f64]) {
        if let Some(axis) = self.axes.get_mut(dim) {
            debug_assert_eq!(edges.len() - 1, axis.bin_count());
            axis.edges = edges.to_vec();
        }
    }

    fn set_axis_label(&mut self, dim: usize, label: &str) {
        if let Some(axis) = self.axes.get_mut(dim) {
            axis.label = label.to_string();
        }
    }

    fn set_bin_label(&mut self, dim: usize, bin: usize, label: &str) {
        if let Some(axis) = self.axes.get_mut(dim) {
            axis.bin_labels.insert(bin, label.to_string());
        }
    }
}

/// Factory producing [`MemorySparse`] engines.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemorySparseFactory;

impl SparseStorageFactory for MemorySparseFactory {
    type Storage = MemorySparse;

    fn allocate(
        &self,
        name: &str,
        title: &str,
        descriptor: &[AxisDescriptor],
    ) -> Result<MemorySparse> {
        for (dim, axis) in descriptor.iter().enumerate() {
            if axis.bin_count == 0 {
                return Err(Error::Allocation(format!("dimension {dim} has no bins")));
            }
            if axis.upper_edge <= axis.lower_edge {
                return Err(Error::Allocation(format!(
                    "dimension {dim} has inverted edges [{}, {}]",
                    axis.lower_edge, axis.upper_edge
                )));
            }
        }
        Ok(MemorySparse {
            name: name.to_string(),
            title: title.to_string(),
            axes: descriptor.iter().map(StorageAxis::from_descriptor).collect(),
            bins: HashMap::new(),
            entries: 0,
        })
    }
}
