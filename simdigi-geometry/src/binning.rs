//! One-dimensional binnings and their combination into a bin utility.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

use crate::error::{Error, Result};
use glam::DVec2;

use serde::{Deserialize, Serialize};

/// Local coordinate a binning acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinningValue {
    /// Local x, the first measurement coordinate.
    LocalX,
    /// Local y, the second measurement coordinate.
    LocalY,
}

impl BinningValue {
    /// Picks the matching coordinate of a local position.
    #[inline]
    #[must_use]
    pub fn of(self, position: DVec2) -> f64 {
        match self {
            BinningValue::LocalX => position.x,
            BinningValue::LocalY => position.y,
        }
    }
}

/// Behaviour for values outside the binned range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BinningOption {
    /// Under- and overflow go to the first and last bin.
    #[default]
    Open,
    /// The range is periodic.
    Closed,
}

/// Binning of a single local coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct BinningData {
    value: BinningValue,
    option: BinningOption,
    boundaries: Vec<f64>,
    equidistant: bool,
}

impl BinningData {
    /// `bins` equal-width bins covering `[min, max)`.
    ///
    /// # Errors
    /// Fails for zero bins or an empty range.
    pub fn equidistant(value: BinningValue, bins: usize, min: f64, max: f64) -> Result<Self> {
        if bins == 0 {
            return Err(Error::InvalidBinning("at least one bin is required".into()));
        }
        if !(min < max) {
            return Err(Error::InvalidBinning(format!(
                "empty range [{min}, {max}) for {value:?}"
            )));
        }
        let step = (max - min) / bins as f64;
        let mut boundaries: Vec<f64> = (0..bins).map(|i| min + i as f64 * step).collect();
        boundaries.push(max);
        Ok(Self {
            value,
            option: BinningOption::Open,
            boundaries,
            equidistant: true,
        })
    }

    /// Bins with arbitrary, strictly increasing boundaries.
    ///
    /// # Errors
    /// Fails for fewer than two boundaries or unordered boundaries.
    pub fn variable(value: BinningValue, boundaries: Vec<f64>) -> Result<Self> {
        if boundaries.len() < 2 {
            return Err(Error::InvalidBinning(
                "at least two boundaries are required".into(),
            ));
        }
        if boundaries.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(Error::InvalidBinning(
                "boundaries must be strictly increasing".into(),
            ));
        }
        Ok(Self {
            value,
            option: BinningOption::Open,
            boundaries,
            equidistant: false,
        })
    }

    /// Sets the out-of-range behaviour.
    #[must_use]
    pub fn with_option(mut self, option: BinningOption) -> Self {
        self.option = option;
        self
    }

    /// Binned local coordinate.
    #[must_use]
    pub fn value(&self) -> BinningValue {
        self.value
    }

    /// Behaviour outside the range.
    #[must_use]
    pub fn option(&self) -> BinningOption {
        self.option
    }

    /// Number of bins.
    #[must_use]
    pub fn bins(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Lower edge of the range.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.boundaries[0]
    }

    /// Upper edge of the range.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.boundaries[self.boundaries.len() - 1]
    }

    /// All bin edges, `bins() + 1` values.
    #[must_use]
    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// Returns true if the value is inside `[min, max]`.
    #[must_use]
    pub fn inside(&self, value: f64) -> bool {
        value >= self.min() && value <= self.max()
    }

    /// Bin index of a value.
    ///
    /// Open binnings clamp to the first/last bin, closed binnings wrap around.
    /// The result is always a valid bin index.
    #[must_use]
    pub fn bin(&self, value: f64) -> usize {
        let value = match self.option {
            BinningOption::Open => value,
            BinningOption::Closed => {
                let range = self.max() - self.min();
                self.min() + (value - self.min()).rem_euclid(range)
            }
        };
        let last = self.bins() - 1;
        if self.equidistant {
            let step = (self.max() - self.min()) / self.bins() as f64;
            let raw = ((value - self.min()) / step).floor();
            if raw <= 0.0 || raw.is_nan() {
                0
            } else {
                (raw as usize).min(last)
            }
        } else {
            let upper = self.boundaries.partition_point(|edge| *edge <= value);
            upper.saturating_sub(1).min(last)
        }
    }

    /// Center of a bin.
    #[must_use]
    pub fn center(&self, bin: usize) -> f64 {
        let bin = bin.min(self.bins() - 1);
        0.5 * (self.boundaries[bin] + self.boundaries[bin + 1])
    }

    /// Width of a bin.
    #[must_use]
    pub fn width(&self, bin: usize) -> f64 {
        let bin = bin.min(self.bins() - 1);
        self.boundaries[bin + 1] - self.boundaries[bin]
    }
}

/// Up to three binnings combined into one channel space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BinUtility {
    data: Vec<BinningData>,
}

impl BinUtility {
    /// Creates a one-dimensional utility.
    #[must_use]
    pub fn new(data: BinningData) -> Self {
        Self { data: vec![data] }
    }

    /// Adds another dimension.
    ///
    /// # Errors
    /// Fails beyond three dimensions.
    pub fn with(mut self, data: BinningData) -> Result<Self> {
        if self.data.len() == 3 {
            return Err(Error::InvalidBinning(
                "a bin utility has at most three dimensions".into(),
            ));
        }
        self.data.push(data);
        Ok(self)
    }

    /// Number of binned dimensions.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.data.len()
    }

    /// Binning of one dimension.
    #[must_use]
    pub fn binning_data(&self, axis: usize) -> Option<&BinningData> {
        self.data.get(axis)
    }

    /// Number of bins along an axis; 1 for unused axes.
    #[must_use]
    pub fn bins(&self, axis: usize) -> usize {
        self.data.get(axis).map_or(1, BinningData::bins)
    }

    /// Bin index of a local position along an axis; 0 for unused axes.
    #[must_use]
    pub fn bin(&self, position: DVec2, axis: usize) -> usize {
        self.data
            .get(axis)
            .map_or(0, |data| data.bin(data.value().of(position)))
    }

    /// Returns true if the position is inside every binned range.
    #[must_use]
    pub fn inside(&self, position: DVec2) -> bool {
        self.data
            .iter()
            .all(|data| data.inside(data.value().of(position)))
    }

    /// Total number of serialized channels.
    #[must_use]
    pub fn serial_size(&self) -> usize {
        (0..3).map(|axis| self.bins(axis)).product()
    }

    /// Serializes a bin triplet row-major: `b0 + b1·n0 + b2·n0·n1`.
    #[must_use]
    pub fn serialize(&self, bins: [usize; 3]) -> usize {
        let n0 = self.bins(0);
        let n1 = self.bins(1);
        bins[0] + bins[1] * n0 + bins[2] * n0 * n1
    }

    /// Inverse of [`BinUtility::serialize`].
    #[must_use]
    pub fn deserialize(&self, serial: usize) -> [usize; 3] {
        let n0 = self.bins(0);
        let n1 = self.bins(1);
        [serial % n0, (serial / n0) % n1, serial / (n0 * n1)]
    }
}
