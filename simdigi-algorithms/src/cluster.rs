//! Cluster building from cell steps.

use std::sync::Arc;

use glam::{DMat3, DVec2, DVec3};
use simdigi_core::units::PS;
use simdigi_core::{Barcode, GeoIdValue};
use simdigi_geometry::{DigitizationCell, DigitizationModule, Surface};

use crate::stepper::DigitizationStep;

/// Variance assigned to each local coordinate of a cluster.
pub const LOCAL_VARIANCE: f64 = 0.05;

/// Variance assigned to the cluster time.
pub const TIME_VARIANCE: f64 = 900.0 * PS * PS;

/// Readout identifier of a cluster with its truth association.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identifier {
    /// Geometry id value of the module.
    pub value: GeoIdValue,
    /// Barcodes of the particles that contributed.
    pub truth_particles: Vec<Barcode>,
}

impl Identifier {
    /// Creates an identifier with its contributing particles.
    #[must_use]
    pub fn new(value: GeoIdValue, truth_particles: Vec<Barcode>) -> Self {
        Self {
            value,
            truth_particles,
        }
    }
}

/// Cluster of cells on a planar module.
#[derive(Clone, Debug)]
pub struct PlanarModuleCluster {
    /// Surface the cluster was measured on.
    pub surface: Arc<Surface>,
    /// Readout identifier.
    pub identifier: Identifier,
    /// Covariance of (loc0, loc1, time).
    pub covariance: DMat3,
    /// Local x after the Lorentz correction.
    pub local_x: f64,
    /// Local y.
    pub local_y: f64,
    /// Time of the originating hit.
    pub time: f64,
    /// Serialized channel of the cluster position.
    pub channel: usize,
    /// Cells with their path lengths.
    pub cells: Vec<DigitizationCell>,
}

// Surfaces compare by geometry id.
impl PartialEq for PlanarModuleCluster {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        self.surface.geometry_id() == other.surface.geometry_id()
            && self.identifier == other.identifier
            && self.covariance == other.covariance
            && self.local_x == other.local_x
            && self.local_y == other.local_y
            && self.time == other.time
            && self.channel == other.channel
            && self.cells == other.cells
    }
}

impl PlanarModuleCluster {
    /// Local position `(x, y)`.
    #[must_use]
    pub fn local_position(&self) -> DVec2 {
        DVec2::new(self.local_x, self.local_y)
    }
}

/// Constant diagonal covariance used for all clusters.
///
/// Cluster positions are not smeared; this only reflects the typical pixel
/// resolution.
#[must_use]
pub fn cluster_covariance() -> DMat3 {
    DMat3::from_diagonal(DVec3::new(LOCAL_VARIANCE, LOCAL_VARIANCE, TIME_VARIANCE))
}

/// Path-length weighted mean of the cell centers.
///
/// Returns `None` when the steps carry no path length.
#[must_use]
pub fn centroid(steps: &[DigitizationStep]) -> Option<DVec2> {
    let total: f64 = steps.iter().map(|step| step.step_length).sum();
    if !(total > 0.0) {
        return None;
    }
    let weighted = steps
        .iter()
        .fold(DVec2::ZERO, |acc, step| acc + step.cell_center * step.step_length);
    Some(weighted / total)
}

/// Shift of the local x coordinate caused by charge drift in the magnetic field.
#[must_use]
pub fn lorentz_shift(thickness: f64, lorentz_angle: f64, readout_direction: i32) -> f64 {
    thickness * lorentz_angle.tan() * -f64::from(readout_direction)
}

/// Builds the cluster of one hit from its steps.
///
/// `thickness` is the thickness of the detector element carrying `module`;
/// the Lorentz drift is taken over the full element.
///
/// Returns `None` for an empty step list.
#[must_use]
pub fn build_cluster(
    surface: Arc<Surface>,
    module: &DigitizationModule,
    thickness: f64,
    identifier: Identifier,
    time: f64,
    steps: &[DigitizationStep],
) -> Option<PlanarModuleCluster> {
    let mut position = centroid(steps)?;
    position.x += lorentz_shift(thickness, module.lorentz_angle(), module.readout_direction());

    let bins = module.segmentation().bin_utility();
    let channel = bins.serialize([bins.bin(position, 0), bins.bin(position, 1), 0]);
    let cells = steps
        .iter()
        .map(|step| {
            DigitizationCell::new(step.cell.channel0, step.cell.channel1, step.step_length)
        })
        .collect();

    Some(PlanarModuleCluster {
        surface,
        identifier,
        covariance: cluster_covariance(),
        local_x: position.x,
        local_y: position.y,
        time,
        channel,
        cells,
    })
}
