//! Tracking geometry and its JSON description.
//!
//! The JSON schema lists planar sensitive modules:
//!
//! ```json
//! {
//!   "modules": [
//!     {
//!       "volume": 1, "layer": 2, "sensitive": 3,
//!       "translation": [0.0, 0.0, 30.0],
//!       "thickness": 0.3,
//!       "lorentz_angle": 0.0,
//!       "readout_direction": 1,
//!       "segmentation": { "bins_x": 100, "bins_y": 200, "half_x": 5.0, "half_y": 10.0 }
//!     }
//!   ]
//! }
//! ```
//!
//! `rotation` (three local axes as columns), `alignments` and `digitize` are
//! optional.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use glam::{DMat3, DVec3};
use serde::Deserialize;
use simdigi_core::GeometryId;

use crate::error::{Error, Result};
use crate::module::DigitizationModule;
use crate::segmentation::CartesianSegmentation;
use crate::surface::{PlanarDetectorElement, Surface};
use crate::transform::Transform3;

/// Surfaces of a detector keyed by geometry id.
#[derive(Debug, Clone, Default)]
pub struct TrackingGeometry {
    surfaces: BTreeMap<GeometryId, Arc<Surface>>,
}

impl TrackingGeometry {
    /// Creates an empty geometry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a surface.
    ///
    /// # Errors
    /// Fails if a surface with the same geometry id exists.
    pub fn add_surface(&mut self, surface: Arc<Surface>) -> Result<()> {
        let id = surface.geometry_id();
        if self.surfaces.contains_key(&id) {
            return Err(Error::DuplicateSurface(id));
        }
        self.surfaces.insert(id, surface);
        Ok(())
    }

    /// Looks up a surface by geometry id.
    #[must_use]
    pub fn find_surface(&self, id: GeometryId) -> Option<&Arc<Surface>> {
        self.surfaces.get(&id)
    }

    /// All surfaces in ascending geometry id order.
    pub fn surfaces(&self) -> impl Iterator<Item = &Arc<Surface>> {
        self.surfaces.values()
    }

    /// Number of surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Returns true if no surface was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Load a detector description from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or describes invalid modules.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let json: JsonDetector = serde_json::from_reader(reader)?;
        Self::from_json_detector(json)
    }

    /// Load a detector description from a JSON string.
    ///
    /// # Errors
    /// Returns an error for malformed JSON or invalid modules.
    pub fn from_json(json: &str) -> Result<Self> {
        let json: JsonDetector = serde_json::from_str(json)?;
        Self::from_json_detector(json)
    }

    fn from_json_detector(detector: JsonDetector) -> Result<Self> {
        let mut geometry = Self::new();
        for module in detector.modules {
            geometry.add_surface(Arc::new(module.build()?))?;
        }
        Ok(geometry)
    }
}

// Intermediate structs for the JSON schema
#[derive(Deserialize)]
struct JsonDetector {
    modules: Vec<JsonModule>,
}

#[derive(Deserialize)]
#[serde(default)]
struct JsonModule {
    volume: u64,
    layer: u64,
    sensitive: u64,
    translation: [f64; 3],
    rotation: Option<[[f64; 3]; 3]>,
    thickness: f64,
    lorentz_angle: f64,
    readout_direction: i32,
    segmentation: JsonSegmentation,
    alignments: Vec<JsonAlignment>,
    digitize: bool,
}

impl Default for JsonModule {
    fn default() -> Self {
        Self {
            volume: 0,
            layer: 0,
            sensitive: 0,
            translation: [0.0; 3],
            rotation: None,
            thickness: 0.3,
            lorentz_angle: 0.0,
            readout_direction: 1,
            segmentation: JsonSegmentation::default(),
            alignments: Vec::new(),
            digitize: true,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct JsonSegmentation {
    bins_x: usize,
    bins_y: usize,
    half_x: f64,
    half_y: f64,
}

impl Default for JsonSegmentation {
    fn default() -> Self {
        Self {
            bins_x: 1,
            bins_y: 1,
            half_x: 1.0,
            half_y: 1.0,
        }
    }
}

#[derive(Deserialize)]
struct JsonAlignment {
    epoch: u64,
    translation: [f64; 3],
    rotation: Option<[[f64; 3]; 3]>,
}

fn placement(translation: [f64; 3], rotation: Option<[[f64; 3]; 3]>) -> Transform3 {
    let translation = DVec3::from_array(translation);
    match rotation {
        Some(cols) => Transform3::from_rotation_translation(
            DMat3::from_cols(
                DVec3::from_array(cols[0]),
                DVec3::from_array(cols[1]),
                DVec3::from_array(cols[2]),
            ),
            translation,
        ),
        None => Transform3::from_translation(translation),
    }
}

impl JsonModule {
    fn build(self) -> Result<Surface> {
        let id = GeometryId::sensitive_module(self.volume, self.layer, self.sensitive);
        let nominal = placement(self.translation, self.rotation);
        let mut element = PlanarDetectorElement::new(id.value(), nominal, self.thickness);
        for alignment in self.alignments {
            element = element.with_alignment(
                alignment.epoch,
                placement(alignment.translation, alignment.rotation),
            );
        }
        if self.digitize {
            let seg = &self.segmentation;
            let segmentation =
                CartesianSegmentation::new(seg.bins_x, seg.bins_y, seg.half_x, seg.half_y)?;
            let module = DigitizationModule::new(
                segmentation,
                0.5 * self.thickness,
                self.readout_direction,
                self.lorentz_angle,
            )?;
            element = element.with_module(Arc::new(module));
        }
        Ok(Surface::from_element(id, Arc::new(element)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use simdigi_core::GeometryContext;

    #[test]
    fn test_from_json() {
        let json = r#"{
            "modules": [
                {
                    "volume": 1, "layer": 2, "sensitive": 3,
                    "translation": [0.0, 0.0, 30.0],
                    "thickness": 0.2,
                    "lorentz_angle": 0.1,
                    "readout_direction": -1,
                    "segmentation": { "bins_x": 4, "bins_y": 8, "half_x": 2.0, "half_y": 4.0 }
                },
                {
                    "volume": 1, "layer": 2, "sensitive": 4,
                    "translation": [10.0, 0.0, 30.0],
                    "digitize": false
                }
            ]
        }"#;
        let geometry = TrackingGeometry::from_json(json).expect("Failed to parse JSON");
        assert_eq!(geometry.len(), 2);

        let surface = geometry
            .find_surface(GeometryId::sensitive_module(1, 2, 3))
            .unwrap();
        let module = surface.digitization_module().unwrap();
        assert_relative_eq!(module.thickness(), 0.2);
        assert_relative_eq!(module.lorentz_angle(), 0.1);
        assert_eq!(module.readout_direction(), -1);
        assert_eq!(module.segmentation().channels(), (4, 8));
        assert_relative_eq!(
            surface.transform(&GeometryContext::default()).translation().z,
            30.0
        );

        let passive = geometry
            .find_surface(GeometryId::sensitive_module(1, 2, 4))
            .unwrap();
        assert!(passive.digitization_module().is_none());
    }

    #[test]
    fn test_rotation_and_alignment() {
        let json = r#"{
            "modules": [
                {
                    "volume": 2, "layer": 1, "sensitive": 1,
                    "translation": [30.0, 0.0, 0.0],
                    "rotation": [[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
                    "alignments": [ { "epoch": 1, "translation": [30.5, 0.0, 0.0] } ]
                }
            ]
        }"#;
        let geometry = TrackingGeometry::from_json(json).expect("Should parse");
        let surface = geometry
            .find_surface(GeometryId::sensitive_module(2, 1, 1))
            .unwrap();
        let nominal = surface.transform(&GeometryContext::default());
        assert_relative_eq!(nominal.normal().x, 1.0);
        let aligned = surface.transform(&GeometryContext::new(1));
        assert_relative_eq!(aligned.translation().x, 30.5);
    }

    #[test]
    fn test_duplicate_and_invalid_modules() {
        let duplicate = r#"{ "modules": [
            { "volume": 1, "layer": 1, "sensitive": 1 },
            { "volume": 1, "layer": 1, "sensitive": 1 }
        ] }"#;
        assert!(matches!(
            TrackingGeometry::from_json(duplicate),
            Err(Error::DuplicateSurface(_))
        ));

        let bad_readout = r#"{ "modules": [ { "readout_direction": 0 } ] }"#;
        assert!(matches!(
            TrackingGeometry::from_json(bad_readout),
            Err(Error::InvalidModule(_))
        ));

        let bad_bins = r#"{ "modules": [ { "segmentation": { "bins_x": 0 } } ] }"#;
        assert!(matches!(
            TrackingGeometry::from_json(bad_bins),
            Err(Error::InvalidBinning(_))
        ));

        assert!(matches!(
            TrackingGeometry::from_json("{ not json"),
            Err(Error::Json(_))
        ));
    }
}
