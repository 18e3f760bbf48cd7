//! Compensated (Kahan) running summation.

use core::ops::{Add, AddAssign, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A running sum that tracks the rounding error of every addition.
///
/// `sum` advances by the raw value on each call while `correction`
/// accumulates the low-order bits each addition discards, so
/// `sum() - correction()` recovers the exact total even when many small
/// values are folded into a much larger running total. Costs three extra
/// flops per addition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KahanSum<T = f64> {
    sum: T,
    raw_sum: T,
    correction: T,
}

/// Double-precision compensated sum.
pub type KahanSumD = KahanSum<f64>;
/// Single-precision compensated sum.
pub type KahanSumF = KahanSum<f32>;

impl<T> KahanSum<T>
where
    T: Copy + Default + Add<Output = T> + Sub<Output = T> + AddAssign,
{
    /// Creates a zero-initialized accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value to the running sum.
    pub fn add(&mut self, value: T) {
        let y = value - self.correction;
        let t = self.sum + value;
        self.correction = (t - self.sum) - y;
        self.sum = t;
        self.raw_sum += value;
    }

    /// Running total.
    #[inline]
    pub fn sum(&self) -> T {
        self.sum
    }

    /// Plain re-accumulation of the inputs, maintained for diagnostics only.
    #[inline]
    pub fn raw_sum(&self) -> T {
        self.raw_sum
    }

    /// Accumulated rounding error of the running total.
    ///
    /// Subtracting this from [`KahanSum::sum`] yields the compensated total.
    #[inline]
    pub fn correction(&self) -> T {
        self.correction
    }
}

impl<T> AddAssign<T> for KahanSum<T>
where
    T: Copy + Default + Add<Output = T> + Sub<Output = T> + AddAssign,
{
    fn add_assign(&mut self, value: T) {
        self.add(value);
    }
}

impl<T: Default> From<T> for KahanSum<T> {
    /// Seeds the accumulator with an initial sum.
    fn from(value: T) -> Self {
        Self {
            sum: value,
            raw_sum: T::default(),
            correction: T::default(),
        }
    }
}

impl From<KahanSum<f64>> for f64 {
    fn from(acc: KahanSum<f64>) -> f64 {
        acc.sum
    }
}

impl From<KahanSum<f32>> for f32 {
    fn from(acc: KahanSum<f32>) -> f32 {
        acc.sum
    }
}
