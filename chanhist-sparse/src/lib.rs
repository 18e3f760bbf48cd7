//! chanhist-sparse: Channelized sparse histogram accumulation.
//!
//! Maps a possibly sparse external channel numbering plus N continuous
//! event-class observables onto bins of a multidimensional sparse storage
//! engine, and accumulates weighted per-bin statistics while keeping the
//! logical entry count decoupled from the statistical weights.
//!

pub mod channel;
pub mod channelized;
pub mod indexer;
pub mod memory;

pub use channel::ChannelMap;
pub use channelized::{ChannelizedHistogram, ChannelizedHistogramBuilder, CHANNEL_AXIS_LABEL};
pub use indexer::BinIndexer;
pub use memory::{MemorySparse, MemorySparseFactory};
