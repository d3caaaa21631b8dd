//! Projection of global hit kinematics into a surface frame.

use glam::{DVec2, DVec3};
use simdigi_core::GeometryContext;
use simdigi_geometry::Surface;

/// Local position and direction of a hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalHit {
    /// In-plane position; the out-of-plane coordinate is dropped.
    pub position: DVec2,
    /// Unit direction in the local frame.
    pub direction: DVec3,
}

/// Projects a global position and direction into the local frame of `surface`.
///
/// The direction is normalized before rotation, so the result is a unit
/// vector for any non-zero input.
#[must_use]
pub fn to_local(
    surface: &Surface,
    gctx: &GeometryContext,
    position: DVec3,
    direction: DVec3,
) -> LocalHit {
    let transform = surface.transform(gctx);
    let local = transform.point_to_local(position);
    LocalHit {
        position: DVec2::new(local.x, local.y),
        direction: transform.vector_to_local(direction.normalize_or_zero()),
    }
}
