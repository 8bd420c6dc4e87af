use nalgebra::Vector3;

use crate::constants::{EARTH_RADIUS, PITCH_OVER_ALTITUDE, VERTICAL_ASCENT_ALTITUDE};
use crate::trajectory_system::kinematics::unit_or_zero;
use crate::utils::rotation::pitch_about_x;

/// Ascent guidance phases. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GuidancePhase {
    VerticalAscent,
    PitchOver,
    GravityTurn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParachuteState {
    Stowed,
    Drogue,
    Main,
}

/// Mutable flight context owned by the propagator for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightState {
    pub stage_index: usize,
    pub guidance: GuidancePhase,
    pub burnout: bool,
    pub parachute: ParachuteState,
}

impl Default for FlightState {
    fn default() -> Self {
        FlightState {
            stage_index: 0,
            guidance: GuidancePhase::VerticalAscent,
            burnout: false,
            parachute: ParachuteState::Stowed,
        }
    }
}

impl FlightState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit thrust direction for orbital ascent, advancing the guidance phase.
    ///
    /// Below 110 m (before pitch-over starts) thrust is radial. Below 500 m
    /// (before the gravity turn is established) the radial direction is
    /// tilted by `pitch_over_angle` degrees about x. Otherwise thrust
    /// follows the velocity vector.
    pub fn orbital_thrust_direction(
        &mut self,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
        pitch_over_angle: f64,
    ) -> Vector3<f64> {
        let radius = position.norm();
        let radial = unit_or_zero(position);

        if radius <= EARTH_RADIUS + VERTICAL_ASCENT_ALTITUDE
            && self.guidance < GuidancePhase::PitchOver
        {
            return radial;
        }

        if radius <= EARTH_RADIUS + PITCH_OVER_ALTITUDE
            && self.guidance < GuidancePhase::GravityTurn
        {
            if self.guidance == GuidancePhase::VerticalAscent {
                tracing::debug!(altitude = radius - EARTH_RADIUS, "pitch-over initiated");
            }
            self.guidance = GuidancePhase::PitchOver;
            return pitch_about_x(&radial, pitch_over_angle.to_radians());
        }

        if self.guidance != GuidancePhase::GravityTurn {
            tracing::debug!(altitude = radius - EARTH_RADIUS, "gravity turn established");
        }
        self.guidance = GuidancePhase::GravityTurn;
        unit_or_zero(velocity)
    }

    pub fn deploy_drogue(&mut self) {
        if self.parachute == ParachuteState::Stowed {
            self.parachute = ParachuteState::Drogue;
        }
    }

    pub fn deploy_main(&mut self) {
        self.parachute = ParachuteState::Main;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn at_altitude(altitude: f64) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, EARTH_RADIUS + altitude)
    }

    #[test]
    fn test_vertical_ascent_is_radial() {
        let mut flight = FlightState::new();
        let direction = flight.orbital_thrust_direction(
            &at_altitude(0.05),
            &Vector3::new(0.0, 0.0, 0.1),
            10.0,
        );
        assert_relative_eq!(direction, Vector3::z(), epsilon = 1e-12);
        assert_eq!(flight.guidance, GuidancePhase::VerticalAscent);
    }

    #[test]
    fn test_pitch_over_tilts_thrust() {
        let mut flight = FlightState::new();
        let direction = flight.orbital_thrust_direction(
            &at_altitude(0.3),
            &Vector3::new(0.0, 0.0, 0.1),
            10.0,
        );
        assert_eq!(flight.guidance, GuidancePhase::PitchOver);
        assert_relative_eq!(direction.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(direction.y, 10.0_f64.to_radians().sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_guidance_never_returns_to_vertical() {
        let mut flight = FlightState::new();
        let velocity = Vector3::new(0.0, 0.05, 0.1);

        flight.orbital_thrust_direction(&at_altitude(0.3), &velocity, 5.0);
        let direction = flight.orbital_thrust_direction(&at_altitude(0.05), &velocity, 5.0);
        assert_eq!(flight.guidance, GuidancePhase::PitchOver);
        assert!(direction.y > 0.0, "Thrust should stay pitched over");

        flight.orbital_thrust_direction(&at_altitude(1.0), &velocity, 5.0);
        assert_eq!(flight.guidance, GuidancePhase::GravityTurn);
        let direction = flight.orbital_thrust_direction(&at_altitude(0.3), &velocity, 5.0);
        assert_eq!(flight.guidance, GuidancePhase::GravityTurn);
        assert_relative_eq!(direction, velocity.normalize(), epsilon = 1e-12);
    }

    #[test]
    fn test_gravity_turn_with_zero_velocity() {
        let mut flight = FlightState::new();
        let direction =
            flight.orbital_thrust_direction(&at_altitude(2.0), &Vector3::zeros(), 5.0);
        assert_eq!(direction, Vector3::zeros());
    }

    #[test]
    fn test_parachute_sequence() {
        let mut flight = FlightState::new();
        assert_eq!(flight.parachute, ParachuteState::Stowed);
        flight.deploy_drogue();
        assert_eq!(flight.parachute, ParachuteState::Drogue);
        flight.deploy_main();
        flight.deploy_drogue();
        assert_eq!(flight.parachute, ParachuteState::Main);
    }
}
