//! simdigi-geometry: Planar detector geometry for digitization.
//!
//! Provides surfaces and detector elements with alignment-aware placements,
//! the rectangular readout segmentation and bin utilities, the digitization
//! module description, simulated hits, and a JSON-loadable tracking geometry.
//!
//! # Key Components
//!
//! - [`Surface`] - Identified surface backed by an optional [`DetectorElement`]
//! - [`DigitizationModule`] - Thickness, Lorentz angle, readout direction, segmentation
//! - [`CartesianSegmentation`] - Cell lookup on the module plane
//! - [`TrackingGeometry`] - Surfaces by geometry id, loadable from JSON

pub mod binning;
pub mod detector;
pub mod error;
pub mod hit;
pub mod module;
pub mod segmentation;
pub mod surface;
pub mod transform;

pub use binning::{BinUtility, BinningData, BinningOption, BinningValue};
pub use detector::TrackingGeometry;
pub use error::{Error, Result};
pub use hit::{sim_hits_from_unsorted, SimHit, SimHits};
pub use module::DigitizationModule;
pub use segmentation::{CartesianSegmentation, DigitizationCell};
pub use surface::{
    DetectorElement, IdentifiedDetectorElement, PassiveDetectorElement, PlanarDetectorElement,
    Surface,
};
pub use transform::Transform3;
