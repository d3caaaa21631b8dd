//! Surfaces and the detector elements backing them.
//!
//! A [`Surface`] is the geometric object hits are recorded on. Sensitive
//! surfaces are backed by a [`DetectorElement`]; only elements exposing the
//! [`IdentifiedDetectorElement`] capability can carry a digitization module.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use simdigi_core::{GeoIdValue, GeometryContext, GeometryId};

use crate::module::DigitizationModule;
use crate::transform::Transform3;

/// Physical element placed in the detector.
pub trait DetectorElement: Debug + Send + Sync {
    /// Placement under the given conditions.
    fn transform(&self, gctx: &GeometryContext) -> Transform3;

    /// Material thickness along the surface normal.
    fn thickness(&self) -> f64;

    /// Identified-element capability, if this element has one.
    fn as_identified(&self) -> Option<&dyn IdentifiedDetectorElement> {
        None
    }
}

/// Detector element with a readout identifier and digitization description.
pub trait IdentifiedDetectorElement: DetectorElement {
    /// Readout identifier of the element.
    fn identifier(&self) -> GeoIdValue;

    /// Digitization description, absent for non-digitized elements.
    fn digitization_module(&self) -> Option<&Arc<DigitizationModule>>;
}

/// Planar silicon module with optional per-epoch alignment.
#[derive(Debug, Clone)]
pub struct PlanarDetectorElement {
    identifier: GeoIdValue,
    nominal: Transform3,
    aligned: BTreeMap<u64, Transform3>,
    thickness: f64,
    module: Option<Arc<DigitizationModule>>,
}

impl PlanarDetectorElement {
    /// Creates an element at its nominal placement.
    #[must_use]
    pub fn new(identifier: GeoIdValue, nominal: Transform3, thickness: f64) -> Self {
        Self {
            identifier,
            nominal,
            aligned: BTreeMap::new(),
            thickness,
            module: None,
        }
    }

    /// Attaches a digitization module.
    #[must_use]
    pub fn with_module(mut self, module: Arc<DigitizationModule>) -> Self {
        self.module = Some(module);
        self
    }

    /// Adds the placement valid for one alignment epoch.
    #[must_use]
    pub fn with_alignment(mut self, epoch: u64, transform: Transform3) -> Self {
        self.aligned.insert(epoch, transform);
        self
    }

    /// Nominal placement, used when an epoch has no alignment.
    #[must_use]
    pub fn nominal_transform(&self) -> &Transform3 {
        &self.nominal
    }
}

impl DetectorElement for PlanarDetectorElement {
    fn transform(&self, gctx: &GeometryContext) -> Transform3 {
        self.aligned
            .get(&gctx.alignment_epoch())
            .copied()
            .unwrap_or(self.nominal)
    }

    fn thickness(&self) -> f64 {
        self.thickness
    }

    fn as_identified(&self) -> Option<&dyn IdentifiedDetectorElement> {
        Some(self)
    }
}

impl IdentifiedDetectorElement for PlanarDetectorElement {
    fn identifier(&self) -> GeoIdValue {
        self.identifier
    }

    fn digitization_module(&self) -> Option<&Arc<DigitizationModule>> {
        self.module.as_ref()
    }
}

/// Passive material (support, cooling) without readout.
#[derive(Debug, Clone)]
pub struct PassiveDetectorElement {
    transform: Transform3,
    thickness: f64,
}

impl PassiveDetectorElement {
    /// Creates passive material at a fixed placement.
    #[must_use]
    pub fn new(transform: Transform3, thickness: f64) -> Self {
        Self {
            transform,
            thickness,
        }
    }
}

impl DetectorElement for PassiveDetectorElement {
    fn transform(&self, _gctx: &GeometryContext) -> Transform3 {
        self.transform
    }

    fn thickness(&self) -> f64 {
        self.thickness
    }
}

/// Geometric surface identified in the detector hierarchy.
#[derive(Debug, Clone)]
pub struct Surface {
    geometry_id: GeometryId,
    transform: Transform3,
    detector_element: Option<Arc<dyn DetectorElement>>,
}

impl Surface {
    /// Free-standing surface with a fixed placement.
    #[must_use]
    pub fn new(geometry_id: GeometryId, transform: Transform3) -> Self {
        Self {
            geometry_id,
            transform,
            detector_element: None,
        }
    }

    /// Surface following the placement of a detector element.
    #[must_use]
    pub fn from_element(geometry_id: GeometryId, element: Arc<dyn DetectorElement>) -> Self {
        Self {
            geometry_id,
            transform: element.transform(&GeometryContext::default()),
            detector_element: Some(element),
        }
    }

    /// Identifier of the surface in the detector hierarchy.
    #[must_use]
    pub fn geometry_id(&self) -> GeometryId {
        self.geometry_id
    }

    /// Placement under the given conditions.
    #[must_use]
    pub fn transform(&self, gctx: &GeometryContext) -> Transform3 {
        match &self.detector_element {
            Some(element) => element.transform(gctx),
            None => self.transform,
        }
    }

    /// Backing detector element, if any.
    #[must_use]
    pub fn associated_detector_element(&self) -> Option<&dyn DetectorElement> {
        self.detector_element.as_deref()
    }

    /// Digitization module reachable through the identified-element capability.
    #[must_use]
    pub fn digitization_module(&self) -> Option<&Arc<DigitizationModule>> {
        self.associated_detector_element()?
            .as_identified()?
            .digitization_module()
    }
}
