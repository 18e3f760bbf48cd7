//! chanhist-core: Core types and traits for channel-resolved statistics
//! accumulation.
//!
//! This crate provides the foundational abstractions shared by the
//! accumulation layer: compensated running summation, event-class axes,
//! and the interface to the backing sparse storage engine.
//!

pub mod axis;
pub mod error;
pub mod kahan;
pub mod storage;

pub use axis::{Axis, AxisDescriptor, AxisSet};
pub use error::{Error, Result};
pub use kahan::{KahanSum, KahanSumD, KahanSumF};
pub use storage::{BinId, SparseStorage, SparseStorageFactory};
