//! Discretized path of a particle through a segmented planar module.

use std::fmt::Debug;

use glam::{DVec2, DVec3};
use simdigi_core::GeometryContext;
use simdigi_geometry::{DigitizationCell, DigitizationModule};

/// Straight-line path segment inside a single readout cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DigitizationStep {
    /// Cell the segment lies in; `data` holds the path length.
    pub cell: DigitizationCell,
    /// 3D path length inside the cell.
    pub step_length: f64,
    /// Entry point in the module frame.
    pub entry: DVec3,
    /// Exit point in the module frame.
    pub exit: DVec3,
    /// Nominal center of the cell.
    pub cell_center: DVec2,
}

/// Computes the cells a particle traverses in a module.
pub trait ModuleStepper: Debug + Send + Sync {
    /// Steps of a straight track through `module`, ordered along the direction.
    ///
    /// `local_position` is the crossing point with the module mid-plane and
    /// `local_direction` a unit vector in the module frame. Tracks that never
    /// enter the active volume produce no steps.
    fn cell_steps(
        &self,
        gctx: &GeometryContext,
        module: &DigitizationModule,
        local_position: DVec2,
        local_direction: DVec3,
    ) -> Vec<DigitizationStep>;
}

/// Stepper for rectangular planar modules.
#[derive(Clone, Debug)]
pub struct PlanarModuleStepper {
    tolerance: f64,
}

impl Default for PlanarModuleStepper {
    fn default() -> Self {
        Self { tolerance: 1e-9 }
    }
}

impl PlanarModuleStepper {
    /// Create with default tolerance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Numerical tolerance for grazing detection and coinciding crossings.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Current tolerance.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Clips the parameter range `[0, 1]` of `start + u·delta` to the lateral
    /// extent `[lo, hi]` (Liang–Barsky).
    fn clip_lateral(
        &self,
        start: DVec3,
        delta: DVec3,
        lo: DVec2,
        hi: DVec2,
    ) -> Option<(f64, f64)> {
        let mut u0: f64 = 0.0;
        let mut u1: f64 = 1.0;
        let planes = [
            (-delta.x, start.x - lo.x),
            (delta.x, hi.x - start.x),
            (-delta.y, start.y - lo.y),
            (delta.y, hi.y - start.y),
        ];
        for (p, q) in planes {
            if p.abs() < self.tolerance {
                if q < 0.0 {
                    return None;
                }
            } else if p < 0.0 {
                u0 = u0.max(q / p);
            } else {
                u1 = u1.min(q / p);
            }
        }
        (u1 - u0 > self.tolerance).then_some((u0, u1))
    }

    /// Sorted parameters in `(0, 1]` where the segment crosses a cell edge,
    /// terminated by `1.0`.
    fn crossings(
        &self,
        start: DVec3,
        delta: DVec3,
        edges_x: &[f64],
        edges_y: &[f64],
    ) -> Vec<f64> {
        let mut cuts = Vec::with_capacity(edges_x.len() + edges_y.len() + 1);
        for (edges, origin, extent) in [(edges_x, start.x, delta.x), (edges_y, start.y, delta.y)] {
            if extent.abs() < self.tolerance {
                continue;
            }
            cuts.extend(
                edges
                    .iter()
                    .map(|edge| (edge - origin) / extent)
                    .filter(|u| *u > self.tolerance && *u < 1.0 - self.tolerance),
            );
        }
        cuts.sort_by(f64::total_cmp);
        cuts.push(1.0);
        cuts.dedup_by(|next, prev| *next - *prev <= self.tolerance);
        cuts
    }
}

impl ModuleStepper for PlanarModuleStepper {
    fn cell_steps(
        &self,
        _gctx: &GeometryContext,
        module: &DigitizationModule,
        local_position: DVec2,
        local_direction: DVec3,
    ) -> Vec<DigitizationStep> {
        let direction = local_direction.normalize_or_zero();
        if direction.z.abs() < self.tolerance {
            return Vec::new();
        }

        // Intersections with the two faces of the sensor.
        let half = module.half_thickness();
        let mid = local_position.extend(0.0);
        let t_low = -half / direction.z;
        let t_high = half / direction.z;
        let entry = mid + direction * t_low.min(t_high);
        let exit = mid + direction * t_low.max(t_high);

        let segmentation = module.segmentation();
        let (lo, hi) = segmentation.bounds();
        let Some((u0, u1)) = self.clip_lateral(entry, exit - entry, lo, hi) else {
            return Vec::new();
        };
        let start = entry + (exit - entry) * u0;
        let delta = (exit - entry) * (u1 - u0);
        let length = delta.length();

        let cuts = self.crossings(
            start,
            delta,
            segmentation.boundaries_x(),
            segmentation.boundaries_y(),
        );

        let mut steps: Vec<DigitizationStep> = Vec::with_capacity(cuts.len());
        let mut previous = 0.0;
        for u in cuts {
            let centre = start + delta * (0.5 * (previous + u));
            let mut cell = segmentation.cell(centre.truncate());
            let step_length = (u - previous) * length;
            let step_exit = start + delta * u;
            match steps.last_mut() {
                Some(last) if last.cell.same_channel(&cell) => {
                    last.step_length += step_length;
                    last.cell.data = last.step_length;
                    last.exit = step_exit;
                }
                _ => {
                    cell.data = step_length;
                    steps.push(DigitizationStep {
                        cell,
                        step_length,
                        entry: start + delta * previous,
                        exit: step_exit,
                        cell_center: segmentation.cell_position(&cell),
                    });
                }
            }
            previous = u;
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use simdigi_geometry::CartesianSegmentation;

    fn module(bins_x: usize, bins_y: usize, half_thickness: f64) -> DigitizationModule {
        let seg = CartesianSegmentation::new(bins_x, bins_y, 1.0, 1.0).unwrap();
        DigitizationModule::new(seg, half_thickness, 1, 0.0).unwrap()
    }

    fn steps(
        module: &DigitizationModule,
        position: DVec2,
        direction: DVec3,
    ) -> Vec<DigitizationStep> {
        PlanarModuleStepper::new().cell_steps(
            &GeometryContext::default(),
            module,
            position,
            direction.normalize(),
        )
    }

    #[test]
    fn test_normal_incidence_single_cell() {
        let module = module(2, 2, 0.25);
        let steps = steps(&module, DVec2::ZERO, DVec3::Z);
        assert_eq!(steps.len(), 1);
        let step = &steps[0];
        assert_relative_eq!(step.step_length, 0.5);
        assert_eq!((step.cell.channel0, step.cell.channel1), (1, 1));
        assert_relative_eq!(step.cell_center.x, 0.5);
        assert_relative_eq!(step.cell_center.y, 0.5);
        assert_relative_eq!(step.entry.z, -0.25);
        assert_relative_eq!(step.exit.z, 0.25);
    }

    #[test]
    fn test_inclined_track_crosses_cells() {
        let module = module(2, 1, 0.5);
        let steps = steps(&module, DVec2::ZERO, DVec3::new(1.0, 0.0, 1.0));
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].cell.channel0, 0);
        assert_eq!(steps[1].cell.channel0, 1);
        assert_relative_eq!(steps[0].step_length, 0.5_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(steps[1].step_length, 0.5_f64.sqrt(), epsilon = 1e-12);
        let total: f64 = steps.iter().map(|s| s.step_length).sum();
        assert_relative_eq!(total, 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_backward_track_is_ordered_along_direction() {
        let module = module(2, 1, 0.5);
        let steps = steps(&module, DVec2::ZERO, DVec3::new(1.0, 0.0, -1.0));
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].cell.channel0, 0);
        assert_relative_eq!(steps[0].entry.z, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_corner_crossing_is_merged() {
        let module = module(2, 2, 0.5);
        let steps = steps(&module, DVec2::ZERO, DVec3::new(1.0, 1.0, 1.0));
        assert_eq!(steps.len(), 2);
        assert_eq!((steps[0].cell.channel0, steps[0].cell.channel1), (0, 0));
        assert_eq!((steps[1].cell.channel0, steps[1].cell.channel1), (1, 1));
        assert_relative_eq!(steps[0].step_length, 0.75_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_lateral_clipping() {
        let module = module(2, 1, 0.5);
        let steps = steps(&module, DVec2::new(0.9, 0.0), DVec3::new(1.0, 0.0, 1.0));
        assert_eq!(steps.len(), 1);
        assert_relative_eq!(steps[0].step_length, 0.6 * 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(steps[0].exit.x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_grazing_and_outside_tracks() {
        let module = module(2, 2, 0.25);
        assert!(steps(&module, DVec2::ZERO, DVec3::X).is_empty());
        assert!(steps(&module, DVec2::new(3.0, 0.0), DVec3::Z).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let module = module(7, 5, 0.15);
        let direction = DVec3::new(0.3, -0.2, 0.9);
        let first = steps(&module, DVec2::new(0.12, -0.34), direction);
        let second = steps(&module, DVec2::new(0.12, -0.34), direction);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}
