use crate::control::environment::{WindCondition, WindModel};
use crate::control::launch_stages::StageSpec;
use crate::control::rocket::{LaunchSite, MissionProfile, Rocket, RocketConfig};
use crate::errors::SimulationError;
use crate::telemetry_system::trajectory::{MissionOutcome, Trajectory};
use crate::trajectory_system::aerodynamics::Perturbation;
use crate::trajectory_system::kinematics::Kinematics;
use crate::trajectory_system::propagator::{PropagationSettings, Propagator};

pub struct MissionFactory;

impl MissionFactory {
    /// Three identical hydrolox stages lifting 10 t towards a 30° orbit.
    pub fn orbital_reference() -> RocketConfig {
        RocketConfig::default()
    }

    /// Single-stage sounding rocket with a 3 kg payload, recovered under
    /// parachutes.
    pub fn suborbital_reference() -> RocketConfig {
        RocketConfig {
            stages: vec![StageSpec::new(0.15, 455.0)],
            payload_mass: 3.0,
            burnout_velocity: 3000.0,
            thrust_to_weight: 1.3,
            diameter: 0.15,
            drag_coefficient: 0.5,
            final_coast: 1000.0,
            launch_site: LaunchSite::default(),
            profile: MissionProfile::Suborbital,
        }
    }

    /// Builds the rocket and propagates it with drag under `wind`.
    pub fn fly(
        config: RocketConfig,
        wind: WindModel,
        settings: PropagationSettings,
    ) -> Result<(Rocket, Trajectory), SimulationError> {
        Self::fly_with(config, vec![Perturbation::drag(wind)], settings)
    }

    /// Builds the rocket and propagates it under an arbitrary set of
    /// perturbations.
    pub fn fly_with(
        config: RocketConfig,
        perturbations: Vec<Perturbation>,
        settings: PropagationSettings,
    ) -> Result<(Rocket, Trajectory), SimulationError> {
        let rocket = Rocket::new(config)?;
        let trajectory = Propagator::new(&rocket, perturbations, settings).propagate()?;
        Ok((rocket, trajectory))
    }
}

/// Fitness of one orbital design candidate. Both terms are minimised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateFitness {
    pub total_mass: f64, // kg
    pub eccentricity: f64,
    pub outcome: MissionOutcome,
}

/// Scores `(burnout velocity, pitch-over angle)` pairs for an external
/// optimiser, keeping the rest of the vehicle fixed.
#[derive(Debug, Clone)]
pub struct OrbitalObjective {
    pub base: RocketConfig,
    /// Applied to every candidate. Drag in still air unless replaced.
    pub perturbations: Vec<Perturbation>,
    pub settings: PropagationSettings,
}

impl OrbitalObjective {
    pub fn new(base: RocketConfig) -> Self {
        OrbitalObjective {
            base,
            perturbations: vec![Perturbation::drag(WindModel::new(WindCondition::None))],
            settings: PropagationSettings {
                optimise: true,
                ..PropagationSettings::default()
            },
        }
    }

    pub fn with_perturbations(mut self, perturbations: Vec<Perturbation>) -> Self {
        self.perturbations = perturbations;
        self
    }

    pub fn evaluate(
        &self,
        burnout_velocity: f64,
        pitch_over_angle: f64,
    ) -> Result<CandidateFitness, SimulationError> {
        let profile = match self.base.profile {
            MissionProfile::Orbital {
                target_inclination,
                coast_duration,
                ..
            } => MissionProfile::Orbital {
                target_inclination,
                pitch_over_angle,
                coast_duration,
            },
            MissionProfile::Suborbital => {
                return Err(SimulationError::ConfigurationError(
                    "orbital objective needs an orbital mission profile".to_string(),
                ))
            }
        };

        let config = RocketConfig {
            burnout_velocity,
            profile,
            ..self.base.clone()
        };
        let settings = PropagationSettings {
            optimise: true,
            ..self.settings.clone()
        };
        let (rocket, trajectory) =
            MissionFactory::fly_with(config, self.perturbations.clone(), settings)?;

        let eccentricity = trajectory
            .final_state()
            .map_or(f64::INFINITY, |state| state.eccentricity());
        tracing::trace!(
            burnout_velocity,
            pitch_over_angle,
            total_mass = rocket.total_mass(),
            eccentricity,
            "candidate evaluated"
        );

        Ok(CandidateFitness {
            total_mass: rocket.total_mass(),
            eccentricity,
            outcome: trajectory.outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::mass_budget::MassBudget;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_configs_build() {
        let orbital = Rocket::new(MissionFactory::orbital_reference()).unwrap();
        assert!(orbital.is_orbital());
        assert_relative_eq!(orbital.total_mass(), 252_364.29, epsilon = 1.0);

        let suborbital = Rocket::new(MissionFactory::suborbital_reference()).unwrap();
        assert!(!suborbital.is_orbital());
        assert_relative_eq!(suborbital.total_mass(), 7.0709666, epsilon = 1e-5);
    }

    #[test]
    fn test_objective_rejects_suborbital_profile() {
        let objective = OrbitalObjective::new(MissionFactory::suborbital_reference());
        assert!(matches!(
            objective.evaluate(3000.0, 0.0),
            Err(SimulationError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_objective_surfaces_solver_errors() {
        let objective = OrbitalObjective::new(MissionFactory::orbital_reference());
        // Far beyond what three stages at 455 s can deliver.
        assert!(objective.evaluate(60_000.0, 0.035).is_err());
    }

    #[test]
    fn test_objective_reports_vehicle_mass() {
        let mut objective = OrbitalObjective::new(MissionFactory::orbital_reference());
        objective.settings.time_step = 5.0;

        let fitness = objective.evaluate(9000.0, 0.035).unwrap();

        let budget = MassBudget::solve(
            &objective.base.stages,
            objective.base.payload_mass,
            9000.0,
        )
        .unwrap();
        assert_relative_eq!(fitness.total_mass, budget.total_mass, epsilon = 1e-6);
        assert!(fitness.eccentricity.is_finite());
    }

    #[test]
    fn test_objective_scores_with_supplied_perturbations() {
        let mut still_air = OrbitalObjective::new(MissionFactory::orbital_reference());
        still_air.settings.time_step = 5.0;
        let lifting = still_air.clone().with_perturbations(vec![
            Perturbation::drag(WindModel::seeded(WindCondition::Moderate, 3)),
            Perturbation::lift(0.2),
        ]);
        assert_eq!(lifting.perturbations.len(), 2);

        let plain = still_air.evaluate(9000.0, 0.035).unwrap();
        let perturbed = lifting.evaluate(9000.0, 0.035).unwrap();

        // Same vehicle, different flight.
        assert_relative_eq!(plain.total_mass, perturbed.total_mass, epsilon = 1e-9);
        assert!(perturbed.eccentricity.is_finite());
        assert!((plain.eccentricity - perturbed.eccentricity).abs() > 1e-9);
    }
}
