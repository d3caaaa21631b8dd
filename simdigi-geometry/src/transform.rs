//! Rigid placement transforms.

use glam::{DAffine3, DMat3, DVec3};

/// Local-to-global placement of a surface: rotation followed by translation.
///
/// The columns of the rotation are the local axes expressed in the global
/// frame; the local z axis is the surface normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3 {
    local_to_global: DAffine3,
    global_to_local: DAffine3,
}

impl Default for Transform3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform3 {
    /// The identity placement.
    #[must_use]
    pub fn identity() -> Self {
        Self::from_affine(DAffine3::IDENTITY)
    }

    /// Pure translation.
    #[must_use]
    pub fn from_translation(translation: DVec3) -> Self {
        Self::from_affine(DAffine3::from_translation(translation))
    }

    /// Rotation (local axes as columns) followed by a translation.
    #[must_use]
    pub fn from_rotation_translation(rotation: DMat3, translation: DVec3) -> Self {
        Self::from_affine(DAffine3::from_mat3_translation(rotation, translation))
    }

    fn from_affine(local_to_global: DAffine3) -> Self {
        Self {
            local_to_global,
            global_to_local: local_to_global.inverse(),
        }
    }

    /// Surface center in the global frame.
    #[must_use]
    pub fn translation(&self) -> DVec3 {
        self.local_to_global.translation
    }

    /// Rotation part, local axes as columns.
    #[must_use]
    pub fn rotation(&self) -> DMat3 {
        self.local_to_global.matrix3
    }

    /// Local surface normal in the global frame.
    #[must_use]
    pub fn normal(&self) -> DVec3 {
        self.local_to_global.matrix3.z_axis
    }

    /// Maps a global point into the local frame.
    #[must_use]
    pub fn point_to_local(&self, global: DVec3) -> DVec3 {
        self.global_to_local.transform_point3(global)
    }

    /// Maps a global direction into the local frame; translation is ignored.
    #[must_use]
    pub fn vector_to_local(&self, global: DVec3) -> DVec3 {
        self.global_to_local.transform_vector3(global)
    }

    /// Maps a local point into the global frame.
    #[must_use]
    pub fn point_to_global(&self, local: DVec3) -> DVec3 {
        self.local_to_global.transform_point3(local)
    }

    /// Maps a local direction into the global frame.
    #[must_use]
    pub fn vector_to_global(&self, local: DVec3) -> DVec3 {
        self.local_to_global.transform_vector3(local)
    }
}
