use nalgebra::Vector3;

use crate::constants::EARTH_MU;
use crate::control::guidance::FlightState;
use crate::control::propulsion::ThrustModel;
use crate::control::rocket::Rocket;
use crate::trajectory_system::aerodynamics::Perturbation;
use crate::trajectory_system::kinematics::{state_from, Kinematics, State};

/// Gravity, thrust and optional perturbations acting on the vehicle.
#[derive(Debug, Clone)]
pub struct ForceModel {
    pub thrust: ThrustModel,
    pub perturbations: Vec<Perturbation>,
}

impl ForceModel {
    pub fn new(thrust: ThrustModel, perturbations: Vec<Perturbation>) -> Self {
        ForceModel {
            thrust,
            perturbations,
        }
    }

    /// Point-mass gravity (km/s²).
    pub fn gravity(position: &Vector3<f64>) -> Vector3<f64> {
        let radius = position.norm();
        if radius == 0.0 {
            return Vector3::zeros();
        }
        -EARTH_MU * position / radius.powi(3)
    }

    /// Returns [vx, vy, vz, ax, ay, az, dm/dt].
    pub fn state_derivative(
        &mut self,
        t: f64,
        state: &State,
        rocket: &Rocket,
        flight: &mut FlightState,
    ) -> State {
        let position = state.position();
        let velocity = state.velocity();
        let mass = state.mass();

        let mut acceleration = Self::gravity(&position);

        let aerodynamics = rocket.aerodynamics_for(flight.parachute);
        for perturbation in self.perturbations.iter() {
            acceleration += perturbation.acceleration(&position, &velocity, mass, &aerodynamics);
        }

        let thrust = self.thrust.calculate(t, state, rocket, flight);
        acceleration += thrust.acceleration;

        state_from(&velocity, &acceleration, thrust.mass_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::EARTH_RADIUS;
    use crate::control::environment::{WindCondition, WindModel};
    use crate::control::rocket::RocketConfig;
    use approx::assert_relative_eq;

    #[test]
    fn test_surface_gravity() {
        let gravity = ForceModel::gravity(&Vector3::new(0.0, 0.0, EARTH_RADIUS));
        assert_relative_eq!(gravity.z, -0.0098202, epsilon = 1e-7);
        assert_eq!(ForceModel::gravity(&Vector3::zeros()), Vector3::zeros());
    }

    #[test]
    fn test_unpowered_derivative_is_gravity_only() {
        let rocket = Rocket::new(RocketConfig::default()).unwrap();
        let mut forces = ForceModel::new(ThrustModel::Unpowered, Vec::new());
        let mut flight = FlightState::new();
        let state = state_from(
            &Vector3::new(EARTH_RADIUS + 2000.0, 0.0, 0.0),
            &Vector3::new(0.0, 6.9, 0.0),
            1000.0,
        );

        let derivative = forces.state_derivative(0.0, &state, &rocket, &mut flight);

        assert_eq!(derivative.position(), state.velocity());
        assert_relative_eq!(
            derivative.velocity(),
            ForceModel::gravity(&state.position()),
            epsilon = 1e-15
        );
        assert_eq!(derivative[6], 0.0);
    }

    #[test]
    fn test_launch_derivative_climbs() {
        let rocket = Rocket::new(RocketConfig::default()).unwrap();
        let mut forces = ForceModel::new(
            ThrustModel::Orbital,
            vec![Perturbation::drag(WindModel::new(WindCondition::None))],
        );
        let mut flight = FlightState::new();

        let derivative =
            forces.state_derivative(0.0, &rocket.initial_state(), &rocket, &mut flight);

        // T/W of 1.3 leaves 0.3 g of net upward acceleration on the pad.
        assert_relative_eq!(derivative[5], 0.3 * 9.81 / 1000.0, epsilon = 5e-5);
        assert!(derivative[6] < 0.0);
    }
}
