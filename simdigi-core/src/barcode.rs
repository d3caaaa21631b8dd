//! Particle barcodes.
//!
//! A barcode packs the generation history of a simulated particle into a
//! single `u64`. The field layout is configurable through [`BarcodeConfig`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Packed particle identifier.
pub type Barcode = u64;

/// Bit masks of the barcode fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BarcodeConfig {
    /// Production vertex.
    pub vertex_mask: Barcode,
    /// Primary particle at that vertex.
    pub primary_mask: Barcode,
    /// Generation of secondaries.
    pub generation_mask: Barcode,
    /// Secondary index within the generation.
    pub secondary_mask: Barcode,
    /// Producing process.
    pub process_mask: Barcode,
}

impl Default for BarcodeConfig {
    fn default() -> Self {
        Self {
            vertex_mask: 0xfff0_0000_0000_0000,
            primary_mask: 0x000f_fff0_0000_0000,
            generation_mask: 0x0000_000f_ff00_0000,
            secondary_mask: 0x0000_0000_00ff_f000,
            process_mask: 0x0000_0000_0000_0fff,
        }
    }
}

/// Encodes and decodes particle barcodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarcodeSvc {
    config: BarcodeConfig,
}

impl BarcodeSvc {
    /// Creates a service with custom field masks.
    #[must_use]
    pub fn new(config: BarcodeConfig) -> Self {
        Self { config }
    }

    /// Returns the field masks.
    #[must_use]
    pub fn config(&self) -> &BarcodeConfig {
        &self.config
    }

    /// Encodes a new barcode from its components.
    #[must_use]
    pub fn generate(
        &self,
        vertex: Barcode,
        primary: Barcode,
        generation: Barcode,
        secondary: Barcode,
        process: Barcode,
    ) -> Barcode {
        encode(vertex, self.config.vertex_mask)
            | encode(primary, self.config.primary_mask)
            | encode(generation, self.config.generation_mask)
            | encode(secondary, self.config.secondary_mask)
            | encode(process, self.config.process_mask)
    }

    /// Vertex number of the barcode.
    #[must_use]
    pub fn vertex(&self, barcode: Barcode) -> Barcode {
        decode(barcode, self.config.vertex_mask)
    }

    /// Primary particle number of the barcode.
    #[must_use]
    pub fn primary(&self, barcode: Barcode) -> Barcode {
        decode(barcode, self.config.primary_mask)
    }

    /// Generation of the barcode, 0 for primaries.
    #[must_use]
    pub fn generation(&self, barcode: Barcode) -> Barcode {
        decode(barcode, self.config.generation_mask)
    }

    /// Secondary particle number of the barcode.
    #[must_use]
    pub fn secondary(&self, barcode: Barcode) -> Barcode {
        decode(barcode, self.config.secondary_mask)
    }

    /// Process code of the barcode.
    #[must_use]
    pub fn process(&self, barcode: Barcode) -> Barcode {
        decode(barcode, self.config.process_mask)
    }
}

#[inline]
fn encode(value: Barcode, mask: Barcode) -> Barcode {
    if mask == 0 {
        return 0;
    }
    (value << mask.trailing_zeros()) & mask
}

#[inline]
fn decode(barcode: Barcode, mask: Barcode) -> Barcode {
    if mask == 0 {
        return 0;
    }
    (barcode & mask) >> mask.trailing_zeros()
}
