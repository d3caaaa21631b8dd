//! Simulated hits on surfaces.

use std::sync::Arc;

use glam::DVec3;
use simdigi_core::{Barcode, GeometryId, GeometryIdMultimap};

use crate::surface::Surface;

/// Simulated particle crossing of a surface.
#[derive(Debug, Clone)]
pub struct SimHit {
    surface: Arc<Surface>,
    position: DVec3,
    direction: DVec3,
    value: f64,
    time: f64,
    particle: Barcode,
}

impl SimHit {
    /// Creates a hit at a global position with a global direction.
    #[must_use]
    pub fn new(
        surface: Arc<Surface>,
        position: DVec3,
        direction: DVec3,
        value: f64,
        time: f64,
        particle: Barcode,
    ) -> Self {
        Self {
            surface,
            position,
            direction,
            value,
            time,
            particle,
        }
    }

    /// Geometry id of the surface the hit is on.
    #[must_use]
    pub fn geometry_id(&self) -> GeometryId {
        self.surface.geometry_id()
    }

    /// Surface the hit was recorded on.
    #[must_use]
    pub fn surface(&self) -> &Arc<Surface> {
        &self.surface
    }

    /// Global position.
    #[must_use]
    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// Global direction at the hit.
    #[must_use]
    pub fn direction(&self) -> DVec3 {
        self.direction
    }

    /// Deposited energy.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Time of the hit.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Barcode of the particle that created the hit.
    #[must_use]
    pub fn particle(&self) -> Barcode {
        self.particle
    }
}

/// Hits of one event, sorted by geometry id.
pub type SimHits = GeometryIdMultimap<SimHit>;

/// Sorts hits in any order into an event hit collection.
///
/// Hits on the same surface keep their relative order.
pub fn sim_hits_from_unsorted<I>(hits: I) -> SimHits
where
    I: IntoIterator<Item = SimHit>,
{
    SimHits::from_unsorted(
        hits.into_iter()
            .map(|hit| (hit.geometry_id(), hit))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform3;

    fn surface(sensitive: u64) -> Arc<Surface> {
        Arc::new(Surface::new(
            GeometryId::sensitive_module(1, 2, sensitive),
            Transform3::identity(),
        ))
    }

    #[test]
    fn test_sorting_keeps_surface_order() {
        let a = surface(5);
        let b = surface(1);
        let hits = sim_hits_from_unsorted([
            SimHit::new(a.clone(), DVec3::ZERO, DVec3::Z, 1.0, 0.0, 10),
            SimHit::new(b, DVec3::ZERO, DVec3::Z, 1.0, 0.0, 20),
            SimHit::new(a, DVec3::ZERO, DVec3::Z, 1.0, 0.0, 30),
        ]);
        let particles: Vec<Barcode> = hits.values().map(SimHit::particle).collect();
        assert_eq!(particles, vec![20, 10, 30]);
        assert!(hits.is_sorted());
    }
}
