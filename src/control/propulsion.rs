use nalgebra::Vector3;

use crate::control::guidance::FlightState;
use crate::control::rocket::Rocket;
use crate::trajectory_system::kinematics::{unit_or_zero, Kinematics, State};

/// Thrust acceleration (km/s²) and mass derivative (kg/s) at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrustOutput {
    pub acceleration: Vector3<f64>,
    pub mass_rate: f64,
}

impl ThrustOutput {
    pub fn zero() -> Self {
        ThrustOutput {
            acceleration: Vector3::zeros(),
            mass_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrustModel {
    /// Scheduled multi-stage burns steered by ascent guidance.
    Orbital,
    /// A single radial burn that runs until the burnout flag is raised.
    Suborbital,
    /// No propulsion at all.
    Unpowered,
}

impl ThrustModel {
    pub fn for_rocket(rocket: &Rocket) -> Self {
        if rocket.is_orbital() {
            ThrustModel::Orbital
        } else {
            ThrustModel::Suborbital
        }
    }

    pub fn calculate(
        &self,
        t: f64,
        state: &State,
        rocket: &Rocket,
        flight: &mut FlightState,
    ) -> ThrustOutput {
        let mass = state.mass();
        if mass <= 0.0 {
            return ThrustOutput::zero();
        }

        let (thrust, mass_flow_rate, direction) = match self {
            ThrustModel::Orbital => {
                let (thrust, flow) = rocket.schedule.thrust_at(t);
                // Guidance advances even while coasting.
                let direction = flight.orbital_thrust_direction(
                    &state.position(),
                    &state.velocity(),
                    rocket.pitch_over_angle(),
                );
                (thrust, flow, direction)
            }
            ThrustModel::Suborbital => {
                if flight.burnout {
                    return ThrustOutput::zero();
                }
                (
                    rocket.schedule.thrusts[0],
                    rocket.schedule.mass_flow_rates[0],
                    unit_or_zero(&state.position()),
                )
            }
            ThrustModel::Unpowered => return ThrustOutput::zero(),
        };

        ThrustOutput {
            acceleration: direction * thrust / 1000.0 / mass,
            mass_rate: -mass_flow_rate,
        }
    }
}
