//! Hierarchical geometry identifier.
//!
//! A [`GeometryId`] packs the position of a surface in the detector hierarchy
//! into a single `u64`. The fields occupy disjoint bit ranges ordered from the
//! most significant (volume) to the least significant (sensitive), so plain
//! integer ordering of the packed value is the hierarchical ordering
//! volume → boundary → layer → approach → sensitive.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Raw packed identifier value.
pub type GeoIdValue = u64;

/// Sub-fields of a [`GeometryId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GeometryField {
    /// Tracking volume.
    Volume,
    /// Volume boundary surface.
    Boundary,
    /// Layer within a volume.
    Layer,
    /// Approach surface of a layer.
    Approach,
    /// Sensitive surface (module) within a layer.
    Sensitive,
}

impl GeometryField {
    /// All fields from most to least significant.
    pub const ALL: [GeometryField; 5] = [
        GeometryField::Volume,
        GeometryField::Boundary,
        GeometryField::Layer,
        GeometryField::Approach,
        GeometryField::Sensitive,
    ];

    /// Bit mask of the field inside the packed value.
    #[inline]
    #[must_use]
    pub const fn mask(self) -> GeoIdValue {
        match self {
            GeometryField::Volume => GeometryId::VOLUME_MASK,
            GeometryField::Boundary => GeometryId::BOUNDARY_MASK,
            GeometryField::Layer => GeometryId::LAYER_MASK,
            GeometryField::Approach => GeometryId::APPROACH_MASK,
            GeometryField::Sensitive => GeometryId::SENSITIVE_MASK,
        }
    }

    /// Largest value the field can hold.
    #[inline]
    #[must_use]
    pub const fn max_value(self) -> GeoIdValue {
        self.mask() >> self.mask().trailing_zeros()
    }
}

/// Packed hierarchical detector location.
///
/// Field values wider than their bit range are truncated to the range. Upstream
/// geometry construction is responsible for staying inside the limits; this is
/// not checked at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct GeometryId(GeoIdValue);

impl GeometryId {
    /// 255 volumes.
    pub const VOLUME_MASK: GeoIdValue = 0xff00_0000_0000_0000;
    /// 255 boundaries per volume.
    pub const BOUNDARY_MASK: GeoIdValue = 0x00ff_0000_0000_0000;
    /// 4095 layers per volume.
    pub const LAYER_MASK: GeoIdValue = 0x0000_fff0_0000_0000;
    /// 255 approach surfaces per layer.
    pub const APPROACH_MASK: GeoIdValue = 0x0000_000f_f000_0000;
    /// 2^28 - 1 sensitive surfaces per layer.
    pub const SENSITIVE_MASK: GeoIdValue = 0x0000_0000_0fff_ffff;

    /// Wraps an already packed value.
    #[inline]
    #[must_use]
    pub const fn new(value: GeoIdValue) -> Self {
        Self(value)
    }

    /// Packs all fields into a new identifier.
    #[inline]
    #[must_use]
    pub const fn pack(
        volume: GeoIdValue,
        boundary: GeoIdValue,
        layer: GeoIdValue,
        approach: GeoIdValue,
        sensitive: GeoIdValue,
    ) -> Self {
        Self(
            encode(volume, Self::VOLUME_MASK)
                | encode(boundary, Self::BOUNDARY_MASK)
                | encode(layer, Self::LAYER_MASK)
                | encode(approach, Self::APPROACH_MASK)
                | encode(sensitive, Self::SENSITIVE_MASK),
        )
    }

    /// Shorthand for a sensitive module `volume/layer/sensitive`.
    #[inline]
    #[must_use]
    pub const fn sensitive_module(
        volume: GeoIdValue,
        layer: GeoIdValue,
        sensitive: GeoIdValue,
    ) -> Self {
        Self::pack(volume, 0, layer, 0, sensitive)
    }

    /// Returns the packed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> GeoIdValue {
        self.0
    }

    /// Extracts a single field.
    #[inline]
    #[must_use]
    pub const fn get(self, field: GeometryField) -> GeoIdValue {
        decode(self.0, field.mask())
    }

    /// Returns a copy with one field replaced.
    #[inline]
    #[must_use]
    pub const fn with(self, field: GeometryField, value: GeoIdValue) -> Self {
        let mask = field.mask();
        Self((self.0 & !mask) | encode(value, mask))
    }

    /// Volume field.
    #[inline]
    #[must_use]
    pub const fn volume(self) -> GeoIdValue {
        self.get(GeometryField::Volume)
    }

    /// Boundary field.
    #[inline]
    #[must_use]
    pub const fn boundary(self) -> GeoIdValue {
        self.get(GeometryField::Boundary)
    }

    /// Layer field.
    #[inline]
    #[must_use]
    pub const fn layer(self) -> GeoIdValue {
        self.get(GeometryField::Layer)
    }

    /// Approach field.
    #[inline]
    #[must_use]
    pub const fn approach(self) -> GeoIdValue {
        self.get(GeometryField::Approach)
    }

    /// Sensitive surface field.
    #[inline]
    #[must_use]
    pub const fn sensitive(self) -> GeoIdValue {
        self.get(GeometryField::Sensitive)
    }

    /// Returns a copy with the volume replaced.
    #[inline]
    #[must_use]
    pub const fn with_volume(self, volume: GeoIdValue) -> Self {
        self.with(GeometryField::Volume, volume)
    }

    /// Returns a copy with the boundary replaced.
    #[inline]
    #[must_use]
    pub const fn with_boundary(self, boundary: GeoIdValue) -> Self {
        self.with(GeometryField::Boundary, boundary)
    }

    /// Returns a copy with the layer replaced.
    #[inline]
    #[must_use]
    pub const fn with_layer(self, layer: GeoIdValue) -> Self {
        self.with(GeometryField::Layer, layer)
    }

    /// Returns a copy with the approach replaced.
    #[inline]
    #[must_use]
    pub const fn with_approach(self, approach: GeoIdValue) -> Self {
        self.with(GeometryField::Approach, approach)
    }

    /// Returns a copy with the sensitive surface replaced.
    #[inline]
    #[must_use]
    pub const fn with_sensitive(self, sensitive: GeoIdValue) -> Self {
        self.with(GeometryField::Sensitive, sensitive)
    }

    /// Last identifier that shares all bits at and above `mask`.
    ///
    /// E.g. `0x0010_1000` with mask `0x0011_1100` becomes `0x0010_10ff`. Together
    /// with `self` this bounds every id below the masked level.
    #[inline]
    #[must_use]
    pub const fn last_below(self, mask: GeoIdValue) -> Self {
        if mask == 0 {
            return self;
        }
        let first_non_zero = 1u64 << mask.trailing_zeros();
        Self(self.0 | (first_non_zero - 1))
    }
}

impl From<GeoIdValue> for GeometryId {
    fn from(value: GeoIdValue) -> Self {
        Self(value)
    }
}

impl From<GeometryId> for GeoIdValue {
    fn from(id: GeometryId) -> Self {
        id.0
    }
}

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vol={}", self.volume())?;
        if self.boundary() != 0 {
            write!(f, "|bnd={}", self.boundary())?;
        }
        if self.layer() != 0 {
            write!(f, "|lay={}", self.layer())?;
        }
        if self.approach() != 0 {
            write!(f, "|apr={}", self.approach())?;
        }
        if self.sensitive() != 0 {
            write!(f, "|sen={}", self.sensitive())?;
        }
        Ok(())
    }
}

#[inline]
const fn encode(value: GeoIdValue, mask: GeoIdValue) -> GeoIdValue {
    (value << mask.trailing_zeros()) & mask
}

#[inline]
const fn decode(value: GeoIdValue, mask: GeoIdValue) -> GeoIdValue {
    (value & mask) >> mask.trailing_zeros()
}
