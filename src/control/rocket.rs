use nalgebra::Vector3;

use crate::constants::{EARTH_RADIUS, LAUNCH_VELOCITY};
use crate::control::guidance::ParachuteState;
use crate::control::launch_stages::{StageSchedule, StageSpec};
use crate::control::mass_budget::MassBudget;
use crate::errors::SimulationError;
use crate::trajectory_system::aerodynamics::Aerodynamics;
use crate::trajectory_system::kinematics::{state_from, State};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchSite {
    pub latitude: f64,  // degrees
    pub longitude: f64, // degrees
}

impl LaunchSite {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        LaunchSite {
            latitude,
            longitude,
        }
    }
}

impl Default for LaunchSite {
    fn default() -> Self {
        LaunchSite::new(0.0, 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissionProfile {
    Orbital {
        target_inclination: f64, // degrees
        pitch_over_angle: f64,   // degrees
        coast_duration: f64,     // s between stages
    },
    Suborbital,
}

/// Inputs for building a [`Rocket`].
#[derive(Debug, Clone, PartialEq)]
pub struct RocketConfig {
    pub stages: Vec<StageSpec>,
    pub payload_mass: f64,     // kg
    pub burnout_velocity: f64, // m/s
    pub thrust_to_weight: f64,
    pub diameter: f64, // m
    pub drag_coefficient: f64,
    pub final_coast: f64, // s after the last burnout
    pub launch_site: LaunchSite,
    pub profile: MissionProfile,
}

impl Default for RocketConfig {
    fn default() -> Self {
        RocketConfig {
            stages: vec![StageSpec::new(0.15, 455.0); 3],
            payload_mass: 10_000.0,
            burnout_velocity: 11_000.0,
            thrust_to_weight: 1.3,
            diameter: 5.0,
            drag_coefficient: 0.5,
            final_coast: 100.0,
            launch_site: LaunchSite::new(28.5, -80.6),
            profile: MissionProfile::Orbital {
                target_inclination: 30.0,
                pitch_over_angle: 0.035,
                coast_duration: 3.0,
            },
        }
    }
}

/// Staged vehicle with its solved mass budget and burn schedule.
///
/// Immutable once built; flight progress lives in
/// [`FlightState`](crate::control::guidance::FlightState).
#[derive(Debug, Clone, PartialEq)]
pub struct Rocket {
    pub config: RocketConfig,
    pub budget: MassBudget,
    pub schedule: StageSchedule,
    pub aerodynamics: Aerodynamics,
}

impl Rocket {
    pub fn new(config: RocketConfig) -> Result<Self, SimulationError> {
        validate_config(&config)?;

        let budget = MassBudget::solve(&config.stages, config.payload_mass, config.burnout_velocity)?;
        let schedule = StageSchedule::new(&budget, config.thrust_to_weight, config.coast_duration())?;
        let aerodynamics = Aerodynamics::from_diameter(config.drag_coefficient, config.diameter);

        tracing::debug!(
            stages = budget.number_of_stages(),
            total_mass = budget.total_mass,
            final_burnout = schedule.final_burnout(),
            "rocket configured"
        );

        Ok(Rocket {
            config,
            budget,
            schedule,
            aerodynamics,
        })
    }

    pub fn number_of_stages(&self) -> usize {
        self.budget.number_of_stages()
    }

    pub fn total_mass(&self) -> f64 {
        self.budget.total_mass
    }

    pub fn is_orbital(&self) -> bool {
        matches!(self.config.profile, MissionProfile::Orbital { .. })
    }

    pub fn pitch_over_angle(&self) -> f64 {
        match self.config.profile {
            MissionProfile::Orbital {
                pitch_over_angle, ..
            } => pitch_over_angle,
            MissionProfile::Suborbital => 0.0,
        }
    }

    /// Burnout time of the final stage (the only stage for suborbital flights).
    pub fn burnout_time(&self) -> f64 {
        self.schedule.final_burnout()
    }

    /// Time at which the flight stops if nothing ends it earlier.
    pub fn mission_end_time(&self) -> f64 {
        self.burnout_time() + self.config.final_coast
    }

    /// Pad state: on the +z axis at the surface, with a tiny vertical
    /// velocity so the velocity direction is defined.
    pub fn initial_state(&self) -> State {
        state_from(
            &Vector3::new(0.0, 0.0, EARTH_RADIUS),
            &Vector3::new(0.0, 0.0, LAUNCH_VELOCITY),
            self.total_mass(),
        )
    }

    pub fn aerodynamics_for(&self, parachute: ParachuteState) -> Aerodynamics {
        match parachute {
            ParachuteState::Stowed => self.aerodynamics,
            ParachuteState::Drogue => Aerodynamics::drogue_parachute(),
            ParachuteState::Main => Aerodynamics::main_parachute(),
        }
    }
}

impl RocketConfig {
    pub fn coast_duration(&self) -> f64 {
        match self.profile {
            MissionProfile::Orbital { coast_duration, .. } => coast_duration,
            MissionProfile::Suborbital => 0.0,
        }
    }
}

fn validate_config(config: &RocketConfig) -> Result<(), SimulationError> {
    let positive = [
        ("diameter", config.diameter),
        ("thrust-to-weight ratio", config.thrust_to_weight),
        ("final coast duration", config.final_coast),
        ("drag coefficient", config.drag_coefficient),
    ];
    for (name, value) in positive {
        if !(value > 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "{name} must be positive, got {value}"
            )));
        }
    }

    match config.profile {
        MissionProfile::Orbital {
            target_inclination,
            coast_duration,
            ..
        } => {
            if target_inclination < config.launch_site.latitude {
                return Err(SimulationError::ConfigurationError(format!(
                    "target inclination {target_inclination}° is below the launch site latitude {}°",
                    config.launch_site.latitude
                )));
            }
            if !(coast_duration >= 0.0) {
                return Err(SimulationError::ConfigurationError(format!(
                    "coast duration must not be negative, got {coast_duration}"
                )));
            }
        }
        MissionProfile::Suborbital => {
            if config.stages.len() != 1 {
                return Err(SimulationError::ConfigurationError(format!(
                    "a suborbital rocket has exactly one stage, got {}",
                    config.stages.len()
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory_system::kinematics::Kinematics;
    use approx::assert_relative_eq;

    fn suborbital_config() -> RocketConfig {
        RocketConfig {
            stages: vec![StageSpec::new(0.15, 455.0)],
            payload_mass: 3.0,
            burnout_velocity: 3000.0,
            diameter: 0.15,
            final_coast: 1000.0,
            launch_site: LaunchSite::default(),
            profile: MissionProfile::Suborbital,
            ..RocketConfig::default()
        }
    }

    #[test]
    fn test_default_rocket() {
        let rocket = Rocket::new(RocketConfig::default()).unwrap();
        assert!(rocket.is_orbital());
        assert_eq!(rocket.number_of_stages(), 3);
        assert_relative_eq!(rocket.aerodynamics.surface_area, 19.634954, epsilon = 1e-6);
        assert_relative_eq!(rocket.pitch_over_angle(), 0.035, epsilon = 1e-12);
        assert_relative_eq!(rocket.burnout_time(), 591.23, epsilon = 0.05);
    }

    #[test]
    fn test_initial_state() {
        let rocket = Rocket::new(suborbital_config()).unwrap();
        let state = rocket.initial_state();
        assert_relative_eq!(state.altitude(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(state.velocity().z, LAUNCH_VELOCITY, epsilon = 1e-20);
        assert_relative_eq!(state.mass(), rocket.total_mass(), epsilon = 1e-12);
    }

    #[test]
    fn test_suborbital_rocket() {
        let rocket = Rocket::new(suborbital_config()).unwrap();
        assert!(!rocket.is_orbital());
        assert_relative_eq!(rocket.burnout_time(), 171.28, epsilon = 0.05);
        assert_relative_eq!(rocket.mission_end_time(), 1171.28, epsilon = 0.05);
    }

    #[test]
    fn test_parachute_aerodynamics() {
        let rocket = Rocket::new(suborbital_config()).unwrap();
        assert_eq!(rocket.aerodynamics_for(ParachuteState::Stowed), rocket.aerodynamics);
        assert_eq!(
            rocket.aerodynamics_for(ParachuteState::Main),
            Aerodynamics::main_parachute()
        );
        assert!(
            rocket.aerodynamics_for(ParachuteState::Drogue).surface_area
                > rocket.aerodynamics.surface_area
        );
    }

    #[test]
    fn test_unreachable_inclination() {
        let config = RocketConfig {
            launch_site: LaunchSite::new(45.0, 0.0),
            ..RocketConfig::default()
        };
        assert!(matches!(
            Rocket::new(config),
            Err(SimulationError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_suborbital_requires_single_stage() {
        let config = RocketConfig {
            stages: vec![StageSpec::new(0.15, 455.0); 2],
            ..suborbital_config()
        };
        assert!(matches!(
            Rocket::new(config),
            Err(SimulationError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_invalid_geometry() {
        let config = RocketConfig {
            diameter: 0.0,
            ..RocketConfig::default()
        };
        assert!(matches!(
            Rocket::new(config),
            Err(SimulationError::ConfigurationError(_))
        ));

        let config = RocketConfig {
            profile: MissionProfile::Orbital {
                target_inclination: 30.0,
                pitch_over_angle: 0.035,
                coast_duration: -1.0,
            },
            ..RocketConfig::default()
        };
        assert!(matches!(
            Rocket::new(config),
            Err(SimulationError::ConfigurationError(_))
        ));
    }
}
