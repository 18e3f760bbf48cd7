//! Coordinate assembly for the channelized sparse histogram.
#![allow(clippy::cast_precision_loss)]

use std::sync::Arc;

use chanhist_core::{AxisDescriptor, AxisSet, Error, Result};

use crate::channel::ChannelMap;

/// Assembles storage coordinates from observables and an external channel.
///
/// The coordinate vector has one real-valued slot per event-class axis plus
/// a trailing slot carrying the compacted channel index. The channel axis
/// uses unit-width bins centered on the compact indices, so the integer
/// index is exactly recoverable from a bin-center query.
#[derive(Debug, Clone)]
pub struct BinIndexer {
    axes: Arc<AxisSet>,
    channels: ChannelMap,
}

impl BinIndexer {
    /// Creates an indexer over the given axes and channel map.
    #[must_use]
    pub fn new(axes: Arc<AxisSet>, channels: ChannelMap) -> Self {
        Self { axes, channels }
    }

    /// Event-class axes, without the channel dimension.
    #[must_use]
    pub fn axes(&self) -> &AxisSet {
        &self.axes
    }

    /// Channel compaction map.
    #[must_use]
    pub fn channels(&self) -> &ChannelMap {
        &self.channels
    }

    /// Total storage dimension count: one per axis plus the channel axis.
    #[must_use]
    pub fn dimension_count(&self) -> usize {
        self.axes.len() + 1
    }

    /// Descriptor of the trailing channel dimension.
    #[must_use]
    pub fn channel_axis_descriptor(&self) -> AxisDescriptor {
        let active = self.channels.active_count();
        AxisDescriptor {
            bin_count: active,
            lower_edge: -0.5,
            upper_edge: active as f64 - 0.5,
        }
    }

    /// Writes the storage coordinates for one event into `out`.
    ///
    /// `out` is cleared and fully rewritten on every call; nothing carries
    /// over from earlier events. Observable values pass through raw — the
    /// storage engine maps a value to its bin — and the compact channel
    /// index lands in the trailing slot.
    ///
    /// # Errors
    /// Dimension mismatch when `observables` does not carry one value per
    /// axis; channel errors from the compaction lookup.
    pub fn write_coordinates(
        &self,
        observables: &[f64],
        channel: usize,
        out: &mut Vec<f64>,
    ) -> Result<()> {
        if observables.len() != self.axes.len() {
            return Err(Error::DimensionMismatch {
                expected: self.axes.len(),
                actual: observables.len(),
            });
        }
        let compact = self.channels.compact(channel)?;
        out.clear();
        out.extend_from_slice(observables);
        out.push(compact as f64);
        Ok(())
    }

    /// Allocating variant of [`BinIndexer::write_coordinates`].
    ///
    /// # Errors
    /// Same conditions as [`BinIndexer::write_coordinates`].
    pub fn coordinates(&self, observables: &[f64], channel: usize) -> Result<Vec<f64>> {
        let mut out = Vec::with_capacity(self.dimension_count());
        self.write_coordinates(observables, channel, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chanhist_core::Axis;

    fn indexer(mask: Option<&[bool]>) -> BinIndexer {
        let axes = AxisSet::new(vec![
            Axis::new("pt", vec![0.0, 1.0, 2.0, 3.0]).unwrap(),
            Axis::uniform("eta", 4, -2.0, 2.0).unwrap(),
        ])
        .unwrap();
        BinIndexer::new(Arc::new(axes), ChannelMap::new(4, mask).unwrap())
    }

    #[test]
    fn test_coordinates_carry_compact_channel() {
        let indexer = indexer(Some(&[true, false, true, true]));
        let coordinates = indexer.coordinates(&[1.5, 0.3], 2).unwrap();
        assert_eq!(coordinates.len(), 3);
        assert!((coordinates[0] - 1.5).abs() < f64::EPSILON);
        assert!((coordinates[1] - 0.3).abs() < f64::EPSILON);
        assert!((coordinates[2] - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_buffer_is_fully_rewritten() {
        let indexer = indexer(None);
        let mut buffer = vec![9.0; 8];
        indexer.write_coordinates(&[0.5, -1.5], 3, &mut buffer).unwrap();
        assert_eq!(buffer.len(), 3);
        assert!((buffer[2] - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dimension_mismatch() {
        let indexer = indexer(None);
        assert!(matches!(
            indexer.coordinates(&[1.5], 0),
            Err(Error::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_unused_channel_is_rejected() {
        let indexer = indexer(Some(&[true, false, true, true]));
        assert!(matches!(
            indexer.coordinates(&[1.5, 0.3], 1),
            Err(Error::UnusedChannel { channel: 1 })
        ));
    }

    #[test]
    fn test_channel_axis_descriptor_centers_indices() {
        let indexer = indexer(Some(&[true, false, true, true]));
        let descriptor = indexer.channel_axis_descriptor();
        assert_eq!(descriptor.bin_count, 3);
        assert!((descriptor.lower_edge - -0.5).abs() < f64::EPSILON);
        assert!((descriptor.upper_edge - 2.5).abs() < f64::EPSILON);
    }
}
