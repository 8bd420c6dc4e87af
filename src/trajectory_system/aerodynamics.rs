use nalgebra::Vector3;

use crate::constants::{
    DROGUE_DIAMETER, EARTH_ANGULAR_VELOCITY, EARTH_RADIUS, MAIN_PARACHUTE_DIAMETER,
    PARACHUTE_DRAG_COEFFICIENT,
};
use crate::control::environment::{atmospheric_density, WindModel};
use crate::trajectory_system::kinematics::unit_or_zero;

/// Drag coefficient and reference area of the current aerodynamic configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aerodynamics {
    pub drag_coefficient: f64,
    pub surface_area: f64, // m²
}

impl Aerodynamics {
    pub fn new(drag_coefficient: f64, surface_area: f64) -> Self {
        Aerodynamics {
            drag_coefficient,
            surface_area,
        }
    }

    pub fn from_diameter(drag_coefficient: f64, diameter: f64) -> Self {
        Self::new(drag_coefficient, frontal_area(diameter))
    }

    pub fn drogue_parachute() -> Self {
        Self::from_diameter(PARACHUTE_DRAG_COEFFICIENT, DROGUE_DIAMETER)
    }

    pub fn main_parachute() -> Self {
        Self::from_diameter(PARACHUTE_DRAG_COEFFICIENT, MAIN_PARACHUTE_DIAMETER)
    }

    /// Drag acceleration (km/s²) opposing the velocity relative to the
    /// rotating, possibly windy atmosphere.
    pub fn calculate_drag(
        &self,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
        mass: f64,
        wind: &Vector3<f64>,
    ) -> Vector3<f64> {
        let relative = velocity - wind - atmosphere_velocity(position);
        let speed = relative.norm();
        if speed == 0.0 || mass <= 0.0 {
            return Vector3::zeros();
        }

        let density = atmospheric_density(position.norm() - EARTH_RADIUS);
        let magnitude = calculate_dynamic_pressure(density, speed) * self.drag_coefficient
            * self.surface_area
            / mass;
        -relative / speed * magnitude / 1000.0
    }

    /// Lift acceleration (km/s²) normal to the relative velocity, in the
    /// plane containing it and the position vector. Positive lift
    /// coefficients push away from the planet.
    pub fn calculate_lift(
        &self,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
        mass: f64,
        lift_coefficient: f64,
    ) -> Vector3<f64> {
        let relative = velocity - atmosphere_velocity(position);
        let normal = relative.cross(position);
        let direction = unit_or_zero(&-normal.cross(&relative));
        if direction == Vector3::zeros() || mass <= 0.0 {
            return Vector3::zeros();
        }

        let density = atmospheric_density(position.norm() - EARTH_RADIUS);
        let magnitude = calculate_dynamic_pressure(density, relative.norm()) * lift_coefficient
            * self.surface_area
            / mass;
        -direction * magnitude / 1000.0
    }
}

/// Optional aerodynamic perturbations layered on top of gravity and thrust.
#[derive(Debug, Clone)]
pub enum Perturbation {
    Drag { wind: WindModel },
    Lift { lift_coefficient: f64 },
}

impl Perturbation {
    pub fn drag(wind: WindModel) -> Self {
        Perturbation::Drag { wind }
    }

    pub fn lift(lift_coefficient: f64) -> Self {
        Perturbation::Lift { lift_coefficient }
    }

    pub fn acceleration(
        &self,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
        mass: f64,
        aerodynamics: &Aerodynamics,
    ) -> Vector3<f64> {
        match self {
            Perturbation::Drag { wind } => {
                let wind_velocity = wind.wind(position.norm() - EARTH_RADIUS);
                aerodynamics.calculate_drag(position, velocity, mass, &wind_velocity)
            }
            Perturbation::Lift { lift_coefficient } => {
                aerodynamics.calculate_lift(position, velocity, mass, *lift_coefficient)
            }
        }
    }
}

/// π·d²/4 in m² for a diameter in m.
pub fn frontal_area(diameter: f64) -> f64 {
    std::f64::consts::PI * diameter.powi(2) / 4.0
}

/// Dynamic pressure (Pa) for a density in kg/m³ and a speed in km/s.
pub fn calculate_dynamic_pressure(density: f64, speed: f64) -> f64 {
    0.5 * density * (speed * 1000.0).powi(2)
}

// Velocity (km/s) of the co-rotating atmosphere at `position`.
fn atmosphere_velocity(position: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(0.0, 0.0, EARTH_ANGULAR_VELOCITY).cross(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::environment::WindCondition;
    use approx::assert_relative_eq;

    const EPSILON: f64 = 1e-12;

    fn sea_level() -> Vector3<f64> {
        Vector3::new(0.0, 0.0, EARTH_RADIUS)
    }

    #[test]
    fn test_frontal_area() {
        assert_relative_eq!(frontal_area(2.0), std::f64::consts::PI, epsilon = EPSILON);
        let main = Aerodynamics::main_parachute();
        assert_relative_eq!(main.surface_area, std::f64::consts::PI / 4.0, epsilon = EPSILON);
        assert_relative_eq!(main.drag_coefficient, 1.75, epsilon = EPSILON);
        assert!(Aerodynamics::drogue_parachute().surface_area < main.surface_area);
    }

    #[test]
    fn test_drag_calculation_at_sea_level() {
        let aero = Aerodynamics::new(0.5, 10.0);
        // On the polar axis the atmosphere has no rotational velocity.
        let velocity = Vector3::new(0.1, 0.0, 0.0);

        let drag = aero.calculate_drag(&sea_level(), &velocity, 1000.0, &Vector3::zeros());

        // q = 0.5·1.225·100² = 6125 Pa, a = q·Cd·A/m = 30.625 m/s²
        assert_relative_eq!(drag.x, -0.030625, epsilon = EPSILON);
        assert_relative_eq!(drag.y, 0.0, epsilon = EPSILON);
        assert_relative_eq!(drag.z, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_drag_uses_relative_wind() {
        let aero = Aerodynamics::new(0.5, 10.0);
        let velocity = Vector3::new(0.1, 0.0, 0.0);

        let drag = aero.calculate_drag(&sea_level(), &velocity, 1000.0, &velocity);
        assert_eq!(drag, Vector3::zeros());

        let headwind = Vector3::new(-0.1, 0.0, 0.0);
        let drag = aero.calculate_drag(&sea_level(), &velocity, 1000.0, &headwind);
        assert_relative_eq!(drag.x, -4.0 * 0.030625, epsilon = EPSILON);
    }

    #[test]
    fn test_drag_opposes_rotating_atmosphere() {
        let aero = Aerodynamics::new(0.5, 1.0);
        let equator = Vector3::new(EARTH_RADIUS, 0.0, 0.0);

        // A vehicle at rest in the inertial frame sees the atmosphere sweep past in +y.
        let drag = aero.calculate_drag(&equator, &Vector3::zeros(), 100.0, &Vector3::zeros());
        assert!(drag.y > 0.0);
        assert_relative_eq!(drag.x, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_drag_in_vacuum() {
        let aero = Aerodynamics::new(0.5, 10.0);
        let position = Vector3::new(0.0, 0.0, EARTH_RADIUS + 1500.0);
        let drag =
            aero.calculate_drag(&position, &Vector3::new(7.0, 0.0, 0.0), 10.0, &Vector3::zeros());
        assert_eq!(drag, Vector3::zeros());
    }

    #[test]
    fn test_lift_points_away_from_planet() {
        let aero = Aerodynamics::new(0.5, 10.0);
        let velocity = Vector3::new(0.0, 0.1, 0.0);

        let lift = aero.calculate_lift(&sea_level(), &velocity, 1000.0, 0.3);

        // q·Cl·A/m = 6125·0.3·10/1000 m/s²
        assert_relative_eq!(lift.z, 0.018375, epsilon = EPSILON);
        assert_relative_eq!(lift.x, 0.0, epsilon = EPSILON);
        assert_relative_eq!(lift.y, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_lift_with_radial_velocity_is_zero() {
        let aero = Aerodynamics::new(0.5, 10.0);
        let lift = aero.calculate_lift(&sea_level(), &Vector3::new(0.0, 0.0, 0.2), 50.0, 0.3);
        assert_eq!(lift, Vector3::zeros());
    }

    #[test]
    fn test_zero_velocity_edge_case() {
        let aero = Aerodynamics::new(0.5, 10.0);
        let drag = aero.calculate_drag(&sea_level(), &Vector3::zeros(), 10.0, &Vector3::zeros());
        let lift = aero.calculate_lift(&sea_level(), &Vector3::zeros(), 10.0, 0.3);
        assert!(drag.iter().all(|c| c.is_finite()));
        assert_eq!(drag, Vector3::zeros());
        assert_eq!(lift, Vector3::zeros());
    }

    #[test]
    fn test_perturbation_dispatch() {
        let aero = Aerodynamics::new(0.5, 10.0);
        let velocity = Vector3::new(0.1, 0.0, 0.0);

        let drag = Perturbation::drag(WindModel::new(WindCondition::None));
        let lift = Perturbation::lift(0.3);

        let a = drag.acceleration(&sea_level(), &velocity, 1000.0, &aero);
        let b = lift.acceleration(&sea_level(), &velocity, 1000.0, &aero);
        assert_relative_eq!(a.x, -0.030625, epsilon = EPSILON);
        assert!(b.z > 0.0);
    }
}
