//! Kinematic selection of simulated particles.
//!
//! Particles are kept when their production point and momentum fall inside
//! all configured windows. Each window is half-open, `min <= x < max`.
//! Vertices left without particles are dropped.

use log::debug;
use simdigi_core::{
    Algorithm, AlgorithmContext, ConfigError, ProcessCode, Result, SimParticle, SimVertex,
};

/// Particle selector configuration.
///
/// Unset windows accept everything.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSelectorConfig {
    /// Input collection of vertices with particles.
    pub input_particles: String,
    /// Output collection of selected vertices.
    pub output_particles: String,
    /// Maximum transverse distance of the production point.
    pub rho_max: f64,
    /// Maximum absolute longitudinal position of the production point.
    pub abs_z_max: f64,
    /// Minimum azimuthal angle.
    pub phi_min: f64,
    /// Maximum azimuthal angle.
    pub phi_max: f64,
    /// Minimum pseudorapidity.
    pub eta_min: f64,
    /// Maximum pseudorapidity.
    pub eta_max: f64,
    /// Minimum absolute pseudorapidity.
    pub abs_eta_min: f64,
    /// Maximum absolute pseudorapidity.
    pub abs_eta_max: f64,
    /// Minimum transverse momentum.
    pub pt_min: f64,
    /// Maximum transverse momentum.
    pub pt_max: f64,
    /// Keep particles without charge.
    pub keep_neutral: bool,
}

impl Default for ParticleSelectorConfig {
    fn default() -> Self {
        Self {
            input_particles: String::new(),
            output_particles: String::new(),
            rho_max: f64::INFINITY,
            abs_z_max: f64::INFINITY,
            phi_min: f64::NEG_INFINITY,
            phi_max: f64::INFINITY,
            eta_min: f64::NEG_INFINITY,
            eta_max: f64::INFINITY,
            abs_eta_min: 0.0,
            abs_eta_max: f64::INFINITY,
            pt_min: 0.0,
            pt_max: f64::INFINITY,
            keep_neutral: true,
        }
    }
}

impl ParticleSelectorConfig {
    /// Create with input and output collection names.
    #[must_use]
    pub fn new(input_particles: impl Into<String>, output_particles: impl Into<String>) -> Self {
        Self {
            input_particles: input_particles.into(),
            output_particles: output_particles.into(),
            ..Self::default()
        }
    }

    /// Limit the production point to `rho < rho_max` and `|z| < abs_z_max`.
    #[must_use]
    pub fn with_origin(mut self, rho_max: f64, abs_z_max: f64) -> Self {
        self.rho_max = rho_max;
        self.abs_z_max = abs_z_max;
        self
    }

    /// Set the azimuthal window.
    #[must_use]
    pub fn with_phi(mut self, min: f64, max: f64) -> Self {
        self.phi_min = min;
        self.phi_max = max;
        self
    }

    /// Set the pseudorapidity window.
    #[must_use]
    pub fn with_eta(mut self, min: f64, max: f64) -> Self {
        self.eta_min = min;
        self.eta_max = max;
        self
    }

    /// Set the absolute pseudorapidity window.
    #[must_use]
    pub fn with_abs_eta(mut self, min: f64, max: f64) -> Self {
        self.abs_eta_min = min;
        self.abs_eta_max = max;
        self
    }

    /// Set the transverse momentum window.
    #[must_use]
    pub fn with_pt(mut self, min: f64, max: f64) -> Self {
        self.pt_min = min;
        self.pt_max = max;
        self
    }

    /// Keep or drop neutral particles.
    #[must_use]
    pub fn with_keep_neutral(mut self, keep_neutral: bool) -> Self {
        self.keep_neutral = keep_neutral;
        self
    }

    fn windows(&self) -> [(&'static str, f64, f64); 6] {
        [
            ("rho", 0.0, self.rho_max),
            ("abs_z", 0.0, self.abs_z_max),
            ("phi", self.phi_min, self.phi_max),
            ("eta", self.eta_min, self.eta_max),
            ("abs_eta", self.abs_eta_min, self.abs_eta_max),
            ("pt", self.pt_min, self.pt_max),
        ]
    }
}

fn within(x: f64, min: f64, max: f64) -> bool {
    min <= x && x < max
}

/// Selects particles inside the configured kinematic windows.
#[derive(Debug)]
pub struct ParticleSelector {
    config: ParticleSelectorConfig,
}

impl ParticleSelector {
    /// Validates the configuration and builds the algorithm.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] for an empty collection name or a window
    /// whose bounds are NaN or reversed.
    pub fn new(config: ParticleSelectorConfig) -> std::result::Result<Self, ConfigError> {
        if config.input_particles.is_empty() {
            return Err(ConfigError::MissingInput("particles"));
        }
        if config.output_particles.is_empty() {
            return Err(ConfigError::MissingOutput("selected particles"));
        }
        for (name, min, max) in config.windows() {
            if !(min <= max) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("window [{min}, {max}) is empty or undefined"),
                });
            }
        }
        Ok(Self { config })
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &ParticleSelectorConfig {
        &self.config
    }

    /// Returns true if the particle passes all windows.
    #[must_use]
    pub fn is_selected(&self, particle: &SimParticle) -> bool {
        let cfg = &self.config;
        let eta = particle.eta();
        within(particle.rho(), 0.0, cfg.rho_max)
            && within(particle.position().z.abs(), 0.0, cfg.abs_z_max)
            && within(particle.phi(), cfg.phi_min, cfg.phi_max)
            && within(eta, cfg.eta_min, cfg.eta_max)
            && within(eta.abs(), cfg.abs_eta_min, cfg.abs_eta_max)
            && within(particle.pt(), cfg.pt_min, cfg.pt_max)
            && (cfg.keep_neutral || particle.charge() != 0.0)
    }

    /// Copies the selected particles, dropping vertices left empty.
    #[must_use]
    pub fn select(&self, vertices: &[SimVertex]) -> Vec<SimVertex> {
        let keep = |particles: &[SimParticle]| -> Vec<SimParticle> {
            particles
                .iter()
                .filter(|p| self.is_selected(p))
                .copied()
                .collect()
        };
        vertices
            .iter()
            .filter_map(|vertex| {
                let selected = SimVertex {
                    position: vertex.position,
                    time: vertex.time,
                    incoming: keep(&vertex.incoming),
                    outgoing: keep(&vertex.outgoing),
                    process: vertex.process,
                };
                (!selected.is_empty()).then_some(selected)
            })
            .collect()
    }
}

impl Algorithm for ParticleSelector {
    fn name(&self) -> &str {
        "ParticleSelector"
    }

    fn execute(&self, ctx: &mut AlgorithmContext<'_>) -> Result<ProcessCode> {
        let (selected, n_vertices, n_particles) = {
            let input: &Vec<SimVertex> = ctx.event_store.get(&self.config.input_particles)?;
            let n_particles: usize = input.iter().map(SimVertex::particle_count).sum();
            (self.select(input), input.len(), n_particles)
        };
        debug!(
            "event {}: selected {} from {} vertices",
            ctx.event_number,
            selected.len(),
            n_vertices
        );
        debug!(
            "event {}: selected {} from {} particles",
            ctx.event_number,
            selected.iter().map(SimVertex::particle_count).sum::<usize>(),
            n_particles
        );
        ctx.event_store
            .add(self.config.output_particles.clone(), selected)?;
        Ok(ProcessCode::Success)
    }
}
