//! Channelized sparse histogram accumulation.

use std::sync::Arc;

use chanhist_core::{AxisDescriptor, AxisSet, BinId, Result, SparseStorage, SparseStorageFactory};

use crate::channel::ChannelMap;
use crate::indexer::BinIndexer;

/// Display label of the trailing channel dimension.
pub const CHANNEL_AXIS_LABEL: &str = "channel";

/// Configuration of a channelized histogram before storage allocation.
///
/// The builder is the unallocated state: it cannot be filled, and the
/// single [`ChannelizedHistogramBuilder::create`] call that allocates the
/// storage engine consumes it.
#[derive(Debug, Clone)]
pub struct ChannelizedHistogramBuilder {
    name: String,
    title: Option<String>,
    axes: Arc<AxisSet>,
    n_channels: usize,
    used_mask: Option<Vec<bool>>,
}

impl ChannelizedHistogramBuilder {
    /// Starts a histogram over the given event-class axes and `n_channels`
    /// external channels.
    pub fn new(name: impl Into<String>, axes: Arc<AxisSet>, n_channels: usize) -> Self {
        Self {
            name: name.into(),
            title: None,
            axes,
            n_channels,
            used_mask: None,
        }
    }

    /// Sets the display title. Defaults to the histogram name.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Restricts the histogram to the channels flagged in `mask`.
    ///
    /// Without a mask every declared channel is used.
    #[must_use]
    pub fn with_channel_mask(mut self, mask: Vec<bool>) -> Self {
        self.used_mask = Some(mask);
        self
    }

    /// Allocates the backing storage and returns the ready histogram.
    ///
    /// Builds the channel compaction map, allocates an
    /// `axes.len() + 1`-dimensional sparse histogram, registers the bin
    /// edges and label of every event-class axis, labels the trailing
    /// channel dimension, and — only when some channels are excluded —
    /// labels each retained channel bin with its external id.
    ///
    /// # Errors
    /// Configuration errors for a bad channel mask; allocation errors when
    /// the storage engine rejects the dimension descriptor.
    pub fn create<F: SparseStorageFactory>(
        self,
        factory: &F,
    ) -> Result<ChannelizedHistogram<F::Storage>> {
        let channels = ChannelMap::new(self.n_channels, self.used_mask.as_deref())?;
        let indexer = BinIndexer::new(Arc::clone(&self.axes), channels);

        let mut descriptor: Vec<AxisDescriptor> = self.axes.descriptor();
        descriptor.push(indexer.channel_axis_descriptor());

        let title = self.title.unwrap_or_else(|| self.name.clone());
        let mut storage = factory.allocate(&self.name, &title, &descriptor)?;

        for (dim, axis) in self.axes.iter().enumerate() {
            storage.set_axis_binning(dim, axis.edges());
            storage.set_axis_label(dim, axis.name());
        }
        let channel_dim = self.axes.len();
        storage.set_axis_label(channel_dim, CHANNEL_AXIS_LABEL);
        // Compaction hides the external numbering whenever channels were
        // excluded; the retained bins carry it as labels.
        if !indexer.channels().is_fully_used() {
            for (external, compact) in indexer.channels().iter_used() {
                storage.set_bin_label(channel_dim, compact, &external.to_string());
            }
        }

        let scratch = Vec::with_capacity(indexer.dimension_count());
        Ok(ChannelizedHistogram {
            name: self.name,
            title,
            indexer,
            storage,
            scratch,
        })
    }
}

/// A channel-resolved sparse multidimensional histogram.
///
/// Each event-class cell is subdivided by a trailing channel dimension
/// sized to the compacted channel count. Weighted fills grow the addressed
/// bin's content and squared-error accumulator while the entry count
/// advances by exactly one per logical event, whatever the weight.
#[derive(Debug)]
pub struct ChannelizedHistogram<S: SparseStorage> {
    name: String,
    title: String,
    indexer: BinIndexer,
    storage: S,
    scratch: Vec<f64>,
}

impl<S: SparseStorage> ChannelizedHistogram<S> {
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

    /// Event-class axes, without the channel dimension.
    #[must_use]
    pub fn axes(&self) -> &AxisSet {
        self.indexer.axes()
    }

    /// Channel compaction map.
    #[must_use]
    pub fn channels(&self) -> &ChannelMap {
        self.indexer.channels()
    }

    /// Backing storage engine.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Number of logical entries recorded so far.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.storage.entry_count()
    }

    /// Records one event with the given statistical weight.
    ///
    /// The addressed bin's content grows by `weight`; the entry count grows
    /// by exactly one. Statistical weight and event count stay decoupled.
    ///
    /// # Errors
    /// Dimension mismatch or channel errors from coordinate assembly; a
    /// correctly shaped fill on a used channel cannot fail.
    pub fn fill(&mut self, observables: &[f64], channel: usize, weight: f64) -> Result<()> {
        let entries = self.storage.entry_count();
        self.indexer
            .write_coordinates(observables, channel, &mut self.scratch)?;
        self.storage.fill_weighted(&self.scratch, weight);
        self.storage.set_entry_count(entries + 1);
        Ok(())
    }

    /// Bin identifier for the given observables and external channel.
    ///
    /// A pure function of its parameters: no state from earlier calls is
    /// involved.
    ///
    /// # Errors
    /// Same conditions as [`ChannelizedHistogram::fill`].
    pub fn bin(&self, observables: &[f64], channel: usize) -> Result<BinId> {
        let coordinates = self.indexer.coordinates(observables, channel)?;
        Ok(self.storage.compute_bin_id(&coordinates))
    }

    /// Content of the addressed bin.
    #[must_use]
    pub fn bin_content(&self, bin: BinId) -> f64 {
        self.storage.bin_content(bin)
    }

    /// Error of the addressed bin.
    #[must_use]
    pub fn bin_error(&self, bin: BinId) -> f64 {
        self.storage.bin_error(bin)
    }

    /// Whether the addressed bin's content is valid.
    ///
    /// Channelized sparse bins carry no separate validity flag; every bin
    /// reports valid.
    #[must_use]
    pub fn bin_content_validated(&self, _bin: BinId) -> bool {
        true
    }
}
