//! Simulated particles and the vertices they are attached to.

use crate::barcode::Barcode;
use glam::DVec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// PDG particle type id.
pub type PdgType = i32;

/// Particle state information for simulations.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimParticle {
    position: DVec3,
    time: f64,
    momentum: DVec3,
    mass: f64,
    charge: f64,
    pdg: PdgType,
    barcode: Barcode,
}

impl SimParticle {
    /// Creates a particle at the given position with the given momentum.
    #[must_use]
    pub fn new(position: DVec3, momentum: DVec3, mass: f64, charge: f64) -> Self {
        Self {
            position,
            time: 0.0,
            momentum,
            mass,
            charge,
            pdg: 0,
            barcode: 0,
        }
    }

    /// Sets the PDG type id.
    #[must_use]
    pub fn with_pdg(mut self, pdg: PdgType) -> Self {
        self.pdg = pdg;
        self
    }

    /// Sets the particle barcode.
    #[must_use]
    pub fn with_barcode(mut self, barcode: Barcode) -> Self {
        self.barcode = barcode;
        self
    }

    /// Sets the production time.
    #[must_use]
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    /// Production position.
    #[must_use]
    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// Production time.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Momentum vector.
    #[must_use]
    pub fn momentum(&self) -> DVec3 {
        self.momentum
    }

    /// Absolute momentum.
    #[must_use]
    pub fn p(&self) -> f64 {
        self.momentum.length()
    }

    /// Transverse momentum.
    #[must_use]
    pub fn pt(&self) -> f64 {
        self.momentum.x.hypot(self.momentum.y)
    }

    /// Azimuthal angle of the momentum.
    #[must_use]
    pub fn phi(&self) -> f64 {
        self.momentum.y.atan2(self.momentum.x)
    }

    /// Pseudorapidity of the momentum.
    ///
    /// NaN for a particle at rest, infinite along the beam axis.
    #[must_use]
    pub fn eta(&self) -> f64 {
        (self.momentum.z / self.p()).atanh()
    }

    /// Transverse distance of the production point from the beam axis.
    #[must_use]
    pub fn rho(&self) -> f64 {
        self.position.x.hypot(self.position.y)
    }

    /// Energy from `E² = p² + m²`.
    #[must_use]
    pub fn energy(&self) -> f64 {
        self.p().hypot(self.mass)
    }

    /// Rest mass.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Electric charge in units of e.
    #[must_use]
    pub fn charge(&self) -> f64 {
        self.charge
    }

    /// PDG type id.
    #[must_use]
    pub fn pdg(&self) -> PdgType {
        self.pdg
    }

    /// Particle barcode.
    #[must_use]
    pub fn barcode(&self) -> Barcode {
        self.barcode
    }
}

/// Interaction vertex with its incoming and outgoing particles.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimVertex {
    /// Vertex position.
    pub position: DVec3,
    /// Vertex time.
    pub time: f64,
    /// Particles entering the vertex.
    pub incoming: Vec<SimParticle>,
    /// Particles leaving the vertex.
    pub outgoing: Vec<SimParticle>,
    /// Process that created the vertex.
    pub process: u32,
}

impl SimVertex {
    /// Creates an empty vertex at a position.
    #[must_use]
    pub fn new(position: DVec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Sets the outgoing particles.
    #[must_use]
    pub fn with_outgoing(mut self, outgoing: Vec<SimParticle>) -> Self {
        self.outgoing = outgoing;
        self
    }

    /// Sets the incoming particles.
    #[must_use]
    pub fn with_incoming(mut self, incoming: Vec<SimParticle>) -> Self {
        self.incoming = incoming;
        self
    }

    /// Number of attached particles.
    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.incoming.len() + self.outgoing.len()
    }

    /// Returns true if no particle is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.incoming.is_empty() && self.outgoing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kinematics() {
        let particle = SimParticle::new(DVec3::ZERO, DVec3::new(3.0, 4.0, 12.0), 0.0, -1.0)
            .with_pdg(11)
            .with_barcode(42);
        assert_relative_eq!(particle.p(), 13.0);
        assert_relative_eq!(particle.pt(), 5.0);
        assert_relative_eq!(particle.energy(), 13.0);
        assert_eq!(particle.pdg(), 11);
        assert_eq!(particle.barcode(), 42);
    }

    #[test]
    fn test_direction_and_origin() {
        let particle = SimParticle::new(
            DVec3::new(3.0, 4.0, -7.0),
            DVec3::new(0.0, 2.0, 0.0),
            0.1,
            1.0,
        );
        assert_relative_eq!(particle.phi(), std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(particle.eta(), 0.0);
        assert_relative_eq!(particle.rho(), 5.0);

        // eta = atanh(cos theta) at 45 degrees
        let forward = SimParticle::new(DVec3::ZERO, DVec3::new(1.0, 0.0, 1.0), 0.0, 0.0);
        assert_relative_eq!(forward.eta(), (1.0 + 2.0_f64.sqrt()).ln(), epsilon = 1e-12);
        assert!(SimParticle::default().eta().is_nan());
    }

    #[test]
    fn test_vertex_particles() {
        let particle = SimParticle::new(DVec3::ZERO, DVec3::X, 0.0, 0.0);
        let vertex = SimVertex::new(DVec3::Z)
            .with_incoming(vec![particle])
            .with_outgoing(vec![particle, particle]);
        assert_eq!(vertex.particle_count(), 3);
        assert!(!vertex.is_empty());
        assert!(SimVertex::new(DVec3::Z).is_empty());
    }
}
