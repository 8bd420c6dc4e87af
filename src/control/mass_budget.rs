use crate::constants::{
    STAGING_BRACKET_OFFSET, STAGING_MAX_ITERATIONS, STAGING_TOLERANCE,
};
use crate::control::launch_stages::StageSpec;
use crate::errors::SimulationError;
use crate::utils::bisection::bisection;

/// Optimal stage mass split for a given payload and target burnout velocity.
///
/// Every per-stage vector is in burn order (index 0 burns first).
#[derive(Debug, Clone, PartialEq)]
pub struct MassBudget {
    pub payload_mass: f64,               // kg
    pub burnout_velocity: f64,           // m/s
    pub structural_ratios: Vec<f64>,
    pub exhaust_velocities: Vec<f64>,    // m/s
    pub lagrange_multiplier: f64,
    pub mass_ratios: Vec<f64>,
    pub stage_masses: Vec<f64>,          // kg, propellant + structure of each stage
    pub empty_masses: Vec<f64>,          // kg
    pub propellant_masses: Vec<f64>,     // kg
    pub cumulative_masses: Vec<f64>,     // kg, stage i plus everything above it
    pub total_mass: f64,                 // kg
}

impl MassBudget {
    pub fn solve(
        stages: &[StageSpec],
        payload_mass: f64,
        burnout_velocity: f64,
    ) -> Result<Self, SimulationError> {
        validate_inputs(stages, payload_mass, burnout_velocity)?;

        let structural_ratios: Vec<f64> = stages.iter().map(|s| s.structural_ratio).collect();
        let exhaust_velocities: Vec<f64> = stages.iter().map(|s| s.exhaust_velocity()).collect();

        let exhaust_sum: f64 = exhaust_velocities.iter().sum();
        let structural_term: f64 = exhaust_velocities
            .iter()
            .zip(&structural_ratios)
            .map(|(ve, ratio)| ve * (ve * ratio).ln())
            .sum();

        let staging_condition = |multiplier: f64| {
            let log_term: f64 = exhaust_velocities
                .iter()
                .map(|ve| ve * (ve * multiplier - 1.0).ln())
                .sum();
            log_term - multiplier.ln() * exhaust_sum - structural_term - burnout_velocity
        };

        let min_exhaust = exhaust_velocities
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        let low = 1.0 / min_exhaust + STAGING_BRACKET_OFFSET;
        let high = exhaust_velocities
            .iter()
            .zip(&structural_ratios)
            .map(|(ve, ratio)| ve * (1.0 - ratio))
            .fold(f64::INFINITY, f64::min);

        let lagrange_multiplier = bisection(
            staging_condition,
            low,
            high,
            STAGING_TOLERANCE,
            STAGING_MAX_ITERATIONS,
        )
        .map_err(|e| match e {
            SimulationError::ConvergenceError(reason) => SimulationError::ConvergenceError(format!(
                "optimal staging for {burnout_velocity} m/s: {reason}"
            )),
            other => other,
        })?;

        let mass_ratios: Vec<f64> = exhaust_velocities
            .iter()
            .zip(&structural_ratios)
            .map(|(ve, ratio)| {
                (ve * lagrange_multiplier - 1.0) / (ve * ratio * lagrange_multiplier)
            })
            .collect();

        // Build from the payload outward: the last stage carries only the payload.
        let stage_count = stages.len();
        let mut stage_masses = vec![0.0; stage_count];
        let mut carried_mass = payload_mass;
        for i in (0..stage_count).rev() {
            let ratio = mass_ratios[i];
            let stage_mass =
                (ratio - 1.0) / (1.0 - ratio * structural_ratios[i]) * carried_mass;
            stage_masses[i] = stage_mass;
            carried_mass += stage_mass;
        }

        let empty_masses: Vec<f64> = stage_masses
            .iter()
            .zip(&structural_ratios)
            .map(|(mass, ratio)| mass * ratio)
            .collect();
        let propellant_masses: Vec<f64> = stage_masses
            .iter()
            .zip(&empty_masses)
            .map(|(mass, empty)| mass - empty)
            .collect();
        let cumulative_masses: Vec<f64> = (0..stage_count)
            .map(|i| stage_masses[i..].iter().sum::<f64>() + payload_mass)
            .collect();

        let budget = MassBudget {
            payload_mass,
            burnout_velocity,
            structural_ratios,
            exhaust_velocities,
            lagrange_multiplier,
            mass_ratios,
            stage_masses,
            empty_masses,
            propellant_masses,
            cumulative_masses,
            total_mass: carried_mass,
        };
        budget.check_physical()?;

        tracing::debug!(
            stages = stage_count,
            total_mass = budget.total_mass,
            lagrange_multiplier,
            "mass budget solved"
        );
        Ok(budget)
    }

    pub fn number_of_stages(&self) -> usize {
        self.stage_masses.len()
    }

    pub fn total_propellant(&self) -> f64 {
        self.propellant_masses.iter().sum()
    }

    /// Ideal velocity gain of the solved split, Σ vₑ·ln(mass ratio).
    pub fn ideal_delta_v(&self) -> f64 {
        self.exhaust_velocities
            .iter()
            .zip(&self.mass_ratios)
            .map(|(ve, ratio)| ve * ratio.ln())
            .sum()
    }

    // A solution can satisfy the staging condition yet need a mass ratio the
    // structural ratio cannot provide (1 - MR·ε <= 0).
    fn check_physical(&self) -> Result<(), SimulationError> {
        let unphysical = self
            .stage_masses
            .iter()
            .chain(std::iter::once(&self.total_mass))
            .any(|mass| !mass.is_finite() || *mass <= 0.0);
        if unphysical || self.mass_ratios.iter().any(|ratio| *ratio <= 1.0) {
            return Err(SimulationError::ConvergenceError(format!(
                "staging solution for {} m/s is not physical (mass ratios {:?})",
                self.burnout_velocity, self.mass_ratios
            )));
        }
        Ok(())
    }
}

fn validate_inputs(
    stages: &[StageSpec],
    payload_mass: f64,
    burnout_velocity: f64,
) -> Result<(), SimulationError> {
    if stages.is_empty() {
        return Err(SimulationError::ConfigurationError(
            "at least one stage is required".to_string(),
        ));
    }
    for (i, stage) in stages.iter().enumerate() {
        if !(stage.structural_ratio > 0.0 && stage.structural_ratio < 1.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "stage {} structural ratio {} must lie in (0, 1)",
                i + 1,
                stage.structural_ratio
            )));
        }
        if !(stage.specific_impulse > 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "stage {} specific impulse {} s must be positive",
                i + 1,
                stage.specific_impulse
            )));
        }
    }
    if !(payload_mass > 0.0) {
        return Err(SimulationError::ConfigurationError(format!(
            "payload mass {payload_mass} kg must be positive"
        )));
    }
    if !(burnout_velocity > 0.0) {
        return Err(SimulationError::ConfigurationError(format!(
            "burnout velocity {burnout_velocity} m/s must be positive"
        )));
    }
    Ok(())
}
