use nalgebra::{SVector, Vector3};

use crate::constants::{EARTH_MU, EARTH_RADIUS};

/// [x, y, z, vx, vy, vz, mass] in km, km/s and kg.
pub type State = SVector<f64, 7>;

pub fn state_from(position: &Vector3<f64>, velocity: &Vector3<f64>, mass: f64) -> State {
    State::from_column_slice(&[
        position.x, position.y, position.z, velocity.x, velocity.y, velocity.z, mass,
    ])
}

/// Unit vector along `vector`, or zero for a zero-length input.
pub fn unit_or_zero(vector: &Vector3<f64>) -> Vector3<f64> {
    vector.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}

/// Read-only orbital quantities of a state vector.
pub trait Kinematics {
    fn position(&self) -> Vector3<f64>;
    fn velocity(&self) -> Vector3<f64>;
    fn mass(&self) -> f64;

    fn radius(&self) -> f64 {
        self.position().norm()
    }

    fn altitude(&self) -> f64 {
        self.radius() - EARTH_RADIUS
    }

    fn speed(&self) -> f64 {
        self.velocity().norm()
    }

    /// Rate of change of the radius (km/s); zero crossing from above marks apoapsis.
    fn radial_velocity(&self) -> f64 {
        let radius = self.radius();
        if radius == 0.0 {
            return 0.0;
        }
        self.position().dot(&self.velocity()) / radius
    }

    /// Angle (rad) between the velocity and the local horizontal.
    fn flight_path_angle(&self) -> f64 {
        let speed = self.speed();
        if speed == 0.0 {
            return 0.0;
        }
        (self.radial_velocity() / speed).clamp(-1.0, 1.0).asin()
    }

    fn specific_energy(&self) -> f64 {
        0.5 * self.speed().powi(2) - EARTH_MU / self.radius()
    }

    fn angular_momentum(&self) -> Vector3<f64> {
        self.position().cross(&self.velocity())
    }

    fn eccentricity_vector(&self) -> Vector3<f64> {
        let position = self.position();
        let velocity = self.velocity();
        ((velocity.norm_squared() - EARTH_MU / position.norm()) * position
            - position.dot(&velocity) * velocity)
            / EARTH_MU
    }

    fn eccentricity(&self) -> f64 {
        self.eccentricity_vector().norm()
    }
}

impl Kinematics for State {
    fn position(&self) -> Vector3<f64> {
        self.fixed_rows::<3>(0).into_owned()
    }

    fn velocity(&self) -> Vector3<f64> {
        self.fixed_rows::<3>(3).into_owned()
    }

    fn mass(&self) -> f64 {
        self[6]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn circular_state(altitude: f64) -> State {
        let radius = EARTH_RADIUS + altitude;
        let speed = (EARTH_MU / radius).sqrt();
        state_from(
            &Vector3::new(radius, 0.0, 0.0),
            &Vector3::new(0.0, speed, 0.0),
            500.0,
        )
    }

    #[test]
    fn test_state_layout() {
        let state = state_from(
            &Vector3::new(1.0, 2.0, 3.0),
            &Vector3::new(4.0, 5.0, 6.0),
            7.0,
        );
        assert_eq!(state.position(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(state.velocity(), Vector3::new(4.0, 5.0, 6.0));
        assert_eq!(state.mass(), 7.0);
    }

    #[test]
    fn test_circular_orbit_quantities() {
        let state = circular_state(400.0);
        let radius = EARTH_RADIUS + 400.0;

        assert_relative_eq!(state.altitude(), 400.0, epsilon = 1e-9);
        assert_relative_eq!(state.eccentricity(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(state.radial_velocity(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(state.flight_path_angle(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(state.specific_energy(), -EARTH_MU / (2.0 * radius), epsilon = 1e-9);
    }

    #[test]
    fn test_vertical_motion() {
        let state = state_from(
            &Vector3::new(0.0, 0.0, EARTH_RADIUS + 10.0),
            &Vector3::new(0.0, 0.0, -0.3),
            5.0,
        );
        assert_relative_eq!(state.radial_velocity(), -0.3, epsilon = 1e-12);
        assert_relative_eq!(
            state.flight_path_angle(),
            -std::f64::consts::FRAC_PI_2,
            epsilon = 1e-12
        );
        assert_eq!(state.angular_momentum(), Vector3::zeros());
    }

    #[test]
    fn test_unit_or_zero() {
        assert_eq!(unit_or_zero(&Vector3::zeros()), Vector3::zeros());
        assert_relative_eq!(
            unit_or_zero(&Vector3::new(3.0, 0.0, 4.0)),
            Vector3::new(0.6, 0.0, 0.8),
            epsilon = 1e-12
        );
    }
}
