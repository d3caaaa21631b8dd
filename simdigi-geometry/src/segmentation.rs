//! Rectangular readout segmentation of a planar module.

use crate::binning::{BinUtility, BinningData, BinningValue};
use crate::error::{Error, Result};
use glam::DVec2;

/// A readout cell addressed by its two channel indices.
///
/// `data` carries a per-cell payload, the path length deposited in the cell
/// for clusters built by the digitization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DigitizationCell {
    /// Channel along local x.
    pub channel0: usize,
    /// Channel along local y.
    pub channel1: usize,
    /// Cell payload.
    pub data: f64,
}

impl DigitizationCell {
    /// Creates a cell with a payload.
    #[must_use]
    pub fn new(channel0: usize, channel1: usize, data: f64) -> Self {
        Self {
            channel0,
            channel1,
            data,
        }
    }

    /// Returns true if both cells address the same channel pair.
    #[must_use]
    pub fn same_channel(&self, other: &Self) -> bool {
        self.channel0 == other.channel0 && self.channel1 == other.channel1
    }
}

/// Rectangular grid of cells centred on the module origin.
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianSegmentation {
    bin_utility: BinUtility,
    x: BinningData,
    y: BinningData,
}

impl CartesianSegmentation {
    /// Equidistant `bins_x × bins_y` grid over `[-half_x, half_x] × [-half_y, half_y]`.
    ///
    /// # Errors
    /// Fails for zero bins or non-positive half lengths.
    pub fn new(bins_x: usize, bins_y: usize, half_x: f64, half_y: f64) -> Result<Self> {
        if !(half_x > 0.0 && half_y > 0.0) {
            return Err(Error::InvalidBinning(format!(
                "half lengths must be positive, got ({half_x}, {half_y})"
            )));
        }
        let x = BinningData::equidistant(BinningValue::LocalX, bins_x, -half_x, half_x)?;
        let y = BinningData::equidistant(BinningValue::LocalY, bins_y, -half_y, half_y)?;
        Self::from_bin_utility(BinUtility::new(x).with(y)?)
    }

    /// Builds a segmentation from an existing two-dimensional bin utility.
    ///
    /// # Errors
    /// Fails unless the utility bins local x then local y.
    pub fn from_bin_utility(bin_utility: BinUtility) -> Result<Self> {
        let (Some(x), Some(y)) = (
            bin_utility.binning_data(0).cloned(),
            bin_utility.binning_data(1).cloned(),
        ) else {
            return Err(Error::InvalidBinning(
                "segmentation needs two binned dimensions".into(),
            ));
        };
        if x.value() != BinningValue::LocalX || y.value() != BinningValue::LocalY {
            return Err(Error::InvalidBinning(
                "segmentation must bin local x then local y".into(),
            ));
        }
        Ok(Self { bin_utility, x, y })
    }

    /// Underlying two-dimensional binning.
    #[must_use]
    pub fn bin_utility(&self) -> &BinUtility {
        &self.bin_utility
    }

    /// Half lengths `(half_x, half_y)` of the active area.
    #[must_use]
    pub fn half_lengths(&self) -> DVec2 {
        0.5 * DVec2::new(self.x.max() - self.x.min(), self.y.max() - self.y.min())
    }

    /// Lower-left and upper-right corners of the active area.
    #[must_use]
    pub fn bounds(&self) -> (DVec2, DVec2) {
        (
            DVec2::new(self.x.min(), self.y.min()),
            DVec2::new(self.x.max(), self.y.max()),
        )
    }

    /// Returns true if the local position lies on the active area.
    #[must_use]
    pub fn contains(&self, position: DVec2) -> bool {
        self.bin_utility.inside(position)
    }

    /// Number of channels along x and y.
    #[must_use]
    pub fn channels(&self) -> (usize, usize) {
        (self.bin_utility.bins(0), self.bin_utility.bins(1))
    }

    /// Cell edges along local x.
    #[must_use]
    pub fn boundaries_x(&self) -> &[f64] {
        self.x.boundaries()
    }

    /// Cell edges along local y.
    #[must_use]
    pub fn boundaries_y(&self) -> &[f64] {
        self.y.boundaries()
    }

    /// Cell containing a local position, with zero payload.
    #[must_use]
    pub fn cell(&self, position: DVec2) -> DigitizationCell {
        DigitizationCell::new(
            self.bin_utility.bin(position, 0),
            self.bin_utility.bin(position, 1),
            0.0,
        )
    }

    /// Nominal center of a cell.
    #[must_use]
    pub fn cell_position(&self, cell: &DigitizationCell) -> DVec2 {
        DVec2::new(self.x.center(cell.channel0), self.y.center(cell.channel1))
    }
}
