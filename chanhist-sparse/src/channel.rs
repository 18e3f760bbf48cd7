//! Channel usage masks and compact index assignment.

use chanhist_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dense mapping from external channel ids to compact channel indices.
///
/// Detector channel numbering may contain inactive channels; the map strips
/// those gaps by assigning consecutive indices to the used channels in
/// ascending external-id order. Built once at histogram creation and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelMap {
    compact: Box<[Option<usize>]>,
    active_count: usize,
}

impl ChannelMap {
    /// Builds the map for `n_channels` external channels.
    ///
    /// Without a mask every channel is marked used; with one, exactly the
    /// flagged channels are.
    ///
    /// # Errors
    /// Fails when the mask length does not match the channel count.
    pub fn new(n_channels: usize, used_mask: Option<&[bool]>) -> Result<Self> {
        if let Some(mask) = used_mask {
            if mask.len() != n_channels {
                return Err(Error::Config(format!(
                    "channel mask length {} does not match channel count {n_channels}",
                    mask.len()
                )));
            }
        }
        let mut compact = vec![None; n_channels];
        let mut active_count = 0;
        for (channel, slot) in compact.iter_mut().enumerate() {
            if used_mask.is_none_or(|mask| mask[channel]) {
                *slot = Some(active_count);
                active_count += 1;
            }
        }
        Ok(Self {
            compact: compact.into_boxed_slice(),
            active_count,
        })
    }

    /// Declared number of external channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.compact.len()
    }

    /// Returns true if no channels are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compact.is_empty()
    }

    /// Number of channels marked used.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Returns true if `channel` is declared and marked used.
    #[must_use]
    pub fn is_used(&self, channel: usize) -> bool {
        self.compact.get(channel).is_some_and(Option::is_some)
    }

    /// Returns true if every declared channel is used.
    #[must_use]
    pub fn is_fully_used(&self) -> bool {
        self.active_count == self.compact.len()
    }

    /// Compact index of an external channel.
    ///
    /// # Errors
    /// `InvalidChannel` outside the declared range, `UnusedChannel` for a
    /// declared channel that is masked off.
    pub fn compact(&self, channel: usize) -> Result<usize> {
        match self.compact.get(channel) {
            None => Err(Error::InvalidChannel {
                channel,
                n_channels: self.compact.len(),
            }),
            Some(None) => Err(Error::UnusedChannel { channel }),
            Some(Some(index)) => Ok(*index),
        }
    }

    /// Iterates `(external, compact)` pairs of the used channels in
    /// ascending external order.
    pub fn iter_used(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.compact
            .iter()
            .enumerate()
            .filter_map(|(channel, index)| index.map(|compact| (channel, compact)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_mask_is_identity() {
        let map = ChannelMap::new(5, None).unwrap();
        assert_eq!(map.len(), 5);
        assert_eq!(map.active_count(), 5);
        assert!(map.is_fully_used());
        for channel in 0..5 {
            assert_eq!(map.compact(channel).unwrap(), channel);
        }
    }

    #[test]
    fn test_mask_compacts_gaps() {
        let map = ChannelMap::new(4, Some(&[true, false, true, true])).unwrap();
        assert_eq!(map.active_count(), 3);
        assert!(!map.is_fully_used());
        assert_eq!(map.compact(0).unwrap(), 0);
        assert_eq!(map.compact(2).unwrap(), 1);
        assert_eq!(map.compact(3).unwrap(), 2);
        assert!(!map.is_used(1));
        assert!(map.compact(1).is_err());
    }

    #[test]
    fn test_compact_indices_are_contiguous() {
        let map = ChannelMap::new(8, Some(&[false, true, true, false, true, false, false, true]))
            .unwrap();
        let indices: Vec<usize> = map.iter_used().map(|(_, compact)| compact).collect();
        assert_eq!(indices, (0..map.active_count()).collect::<Vec<_>>());
        let externals: Vec<usize> = map.iter_used().map(|(channel, _)| channel).collect();
        assert_eq!(externals, [1, 2, 4, 7]);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mask = [true, false, true, true];
        let first = ChannelMap::new(4, Some(&mask)).unwrap();
        let second = ChannelMap::new(4, Some(&mask)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_mask_length_mismatch() {
        let result = ChannelMap::new(4, Some(&[true, false]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_out_of_range_channel() {
        let map = ChannelMap::new(3, None).unwrap();
        assert!(matches!(
            map.compact(3),
            Err(Error::InvalidChannel {
                channel: 3,
                n_channels: 3
            })
        ));
    }
}
