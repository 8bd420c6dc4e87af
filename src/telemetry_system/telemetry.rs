use crate::constants::STANDARD_GRAVITY;
use crate::control::environment::atmospheric_density;
use crate::telemetry_system::trajectory::{PhaseLabel, PhaseSegment, Trajectory};
use crate::trajectory_system::aerodynamics::calculate_dynamic_pressure;
use crate::trajectory_system::kinematics::{Kinematics, State};

/// Derived flight quantities for a completed trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct Telemetry {
    pub times: Vec<f64>,
    pub altitudes: Vec<f64>,          // km
    pub speeds: Vec<f64>,             // km/s
    pub flight_path_angles: Vec<f64>, // degrees
    pub dynamic_pressures: Vec<f64>,  // Pa
    pub masses: Vec<f64>,             // kg
    pub accelerations: Vec<f64>,      // km/s², magnitude
    pub max_altitude: f64,
    pub max_speed: f64,
    pub max_dynamic_pressure: f64,
    pub max_acceleration: f64,
    pub final_eccentricity: f64,
    pub final_specific_energy: f64, // km²/s²
}

impl Telemetry {
    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        let states = &trajectory.states;

        let altitudes: Vec<f64> = states.iter().map(|state| state.altitude()).collect();
        let speeds: Vec<f64> = states.iter().map(|state| state.speed()).collect();
        let flight_path_angles = states
            .iter()
            .map(|state| state.flight_path_angle().to_degrees())
            .collect();
        let dynamic_pressures: Vec<f64> = states
            .iter()
            .map(|state| {
                calculate_dynamic_pressure(atmospheric_density(state.altitude()), state.speed())
            })
            .collect();
        let masses = states.iter().map(|state| state.mass()).collect();
        let accelerations = acceleration_magnitudes(&trajectory.times, states);

        let (final_eccentricity, final_specific_energy) = trajectory
            .final_state()
            .map_or((0.0, 0.0), |state| {
                (state.eccentricity(), state.specific_energy())
            });

        Telemetry {
            times: trajectory.times.clone(),
            max_altitude: maximum(&altitudes),
            max_speed: maximum(&speeds),
            max_dynamic_pressure: maximum(&dynamic_pressures),
            max_acceleration: maximum(&accelerations),
            altitudes,
            speeds,
            flight_path_angles,
            dynamic_pressures,
            masses,
            accelerations,
            final_eccentricity,
            final_specific_energy,
        }
    }

    /// Time of the highest sample, if any.
    pub fn time_of_max_altitude(&self) -> Option<f64> {
        self.altitudes
            .iter()
            .zip(&self.times)
            .max_by(|a, b| a.0.total_cmp(b.0))
            .map(|(_, time)| *time)
    }

    pub fn format_time(elapsed_time: f64) -> String {
        if elapsed_time >= 3600.0 {
            let hours = (elapsed_time / 3600.0).floor();
            let minutes = ((elapsed_time % 3600.0) / 60.0).floor();
            let seconds = elapsed_time % 60.0;
            format!("{:.0}h {:.0}m {:.2}s", hours, minutes, seconds)
        } else if elapsed_time >= 60.0 {
            let minutes = (elapsed_time / 60.0).floor();
            let seconds = elapsed_time % 60.0;
            format!("{:.0}m {:.2}s", minutes, seconds)
        } else {
            format!("{:.2}s", elapsed_time)
        }
    }

    /// Altitude given in km.
    pub fn format_altitude(altitude: f64) -> String {
        if altitude >= 1.0 {
            format!("{:.2} km", altitude)
        } else {
            format!("{:.2} m", altitude * 1000.0)
        }
    }

    pub fn summary(&self, trajectory: &Trajectory) -> String {
        let mut lines = vec![
            format!("Outcome: {}", trajectory.outcome),
            format!(
                "Flight time: {}",
                Self::format_time(trajectory.final_time().unwrap_or(0.0))
            ),
            format!("Max altitude: {}", Self::format_altitude(self.max_altitude)),
            format!("Max speed: {:.3} km/s", self.max_speed),
            format!("Max dynamic pressure: {:.1} Pa", self.max_dynamic_pressure),
            format!(
                "Max acceleration: {:.2} g",
                self.max_acceleration * 1000.0 / STANDARD_GRAVITY
            ),
            format!("Final eccentricity: {:.4}", self.final_eccentricity),
            format!("Final specific energy: {:.3} km²/s²", self.final_specific_energy),
        ];

        lines.extend(trajectory.segments.iter().map(|segment| {
            format!(
                "{}: {} to {} ({} samples)",
                segment.label,
                Self::format_time(segment.start_time),
                Self::format_time(segment.end_time),
                segment.len()
            )
        }));
        lines.extend(trajectory.events.iter().map(|event| {
            format!(
                "{:?} at {}, altitude {}",
                event.kind,
                Self::format_time(event.time),
                Self::format_altitude(event.altitude)
            )
        }));

        lines.join("\n")
    }

    pub fn log_summary(&self, trajectory: &Trajectory) {
        tracing::info!(
            outcome = %trajectory.outcome,
            max_altitude = self.max_altitude,
            max_speed = self.max_speed,
            eccentricity = self.final_eccentricity,
            "flight summary"
        );
        for line in self.summary(trajectory).lines() {
            tracing::info!("{line}");
        }
    }

    pub fn segment_altitudes(&self, segment: &PhaseSegment) -> &[f64] {
        &self.altitudes[segment.start_index..segment.end_index]
    }

    /// Altitude series of the phase with `label`.
    pub fn phase_altitudes<'t>(
        &'t self,
        trajectory: &Trajectory,
        label: PhaseLabel,
    ) -> Option<&'t [f64]> {
        trajectory
            .segment(label)
            .map(|segment| self.segment_altitudes(segment))
    }
}

// Largest value of a series, 0 for an empty one.
fn maximum(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

// Velocity differences between neighbouring samples, central where both
// neighbours exist.
fn acceleration_magnitudes(times: &[f64], states: &[State]) -> Vec<f64> {
    let count = times.len().min(states.len());
    (0..count)
        .map(|i| {
            let before = i.saturating_sub(1);
            let after = (i + 1).min(count - 1);
            let elapsed = times[after] - times[before];
            if elapsed > 0.0 {
                ((states[after].velocity() - states[before].velocity()) / elapsed).norm()
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{EARTH_MU, EARTH_RADIUS};
    use crate::telemetry_system::trajectory::MissionOutcome;
    use crate::trajectory_system::kinematics::state_from;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn climbing_trajectory() -> Trajectory {
        let states: Vec<State> = (0..5)
            .map(|k| {
                state_from(
                    &Vector3::new(0.0, 0.0, EARTH_RADIUS + k as f64),
                    &Vector3::new(0.0, 0.0, 1.0 - 0.2 * k as f64),
                    10.0,
                )
            })
            .collect();
        let mut trajectory = Trajectory::new();
        trajectory.push_segment(
            PhaseLabel::Ascent,
            0.0,
            5.0,
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            states,
        );
        trajectory
    }

    #[test]
    fn test_format_time() {
        assert_eq!(Telemetry::format_time(42.5), "42.50s");
        assert_eq!(Telemetry::format_time(125.0), "2m 5.00s");
        assert_eq!(Telemetry::format_time(3725.0), "1h 2m 5.00s");
    }

    #[test]
    fn test_format_altitude() {
        assert_eq!(Telemetry::format_altitude(29.44), "29.44 km");
        assert_eq!(Telemetry::format_altitude(0.3), "300.00 m");
    }

    #[test]
    fn test_series_and_maxima() {
        let trajectory = climbing_trajectory();
        let telemetry = Telemetry::from_trajectory(&trajectory);

        assert_eq!(telemetry.altitudes.len(), 5);
        assert_relative_eq!(telemetry.max_altitude, 4.0, epsilon = 1e-9);
        assert_relative_eq!(telemetry.max_speed, 1.0, epsilon = 1e-12);
        assert_relative_eq!(telemetry.flight_path_angles[0], 90.0, epsilon = 1e-9);
        assert_eq!(telemetry.time_of_max_altitude(), Some(4.0));

        // Sea-level density 1.225 kg/m³ at 1 km/s.
        assert_relative_eq!(telemetry.dynamic_pressures[0], 612_500.0, epsilon = 1.0);
        assert_relative_eq!(telemetry.max_dynamic_pressure, 612_500.0, epsilon = 1.0);
    }

    #[test]
    fn test_final_orbit_elements() {
        let radius = EARTH_RADIUS + 400.0;
        let speed = (EARTH_MU / radius).sqrt();
        let mut trajectory = Trajectory::new();
        trajectory.push_segment(
            PhaseLabel::OrbitInsertion,
            0.0,
            1.0,
            vec![0.0],
            vec![state_from(
                &Vector3::new(radius, 0.0, 0.0),
                &Vector3::new(0.0, speed, 0.0),
                100.0,
            )],
        );

        let telemetry = Telemetry::from_trajectory(&trajectory);
        assert_relative_eq!(telemetry.final_eccentricity, 0.0, epsilon = 1e-12);
        assert_relative_eq!(
            telemetry.final_specific_energy,
            -EARTH_MU / (2.0 * radius),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_summary_lists_phases() {
        let trajectory = climbing_trajectory();
        let telemetry = Telemetry::from_trajectory(&trajectory);
        let summary = telemetry.summary(&trajectory);

        assert!(summary.starts_with(&format!("Outcome: {}", MissionOutcome::Completed)));
        assert!(summary.contains("Ascent: 0.00s to 5.00s (5 samples)"));
        assert_eq!(
            telemetry.phase_altitudes(&trajectory, PhaseLabel::Ascent).map(|a| a.len()),
            Some(5)
        );
        assert!(telemetry.phase_altitudes(&trajectory, PhaseLabel::Coast).is_none());
    }

    #[test]
    fn test_mass_and_acceleration_series() {
        let trajectory = climbing_trajectory();
        let telemetry = Telemetry::from_trajectory(&trajectory);

        assert_eq!(telemetry.masses, vec![10.0; 5]);
        assert_eq!(telemetry.accelerations.len(), 5);
        // Vertical speed drops 0.2 km/s every second.
        for acceleration in &telemetry.accelerations {
            assert_relative_eq!(*acceleration, 0.2, epsilon = 1e-12);
        }
        assert_relative_eq!(telemetry.max_acceleration, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_maxima_below_the_surface() {
        let states = (1..4)
            .map(|k| {
                state_from(
                    &Vector3::new(0.0, 0.0, EARTH_RADIUS - k as f64),
                    &Vector3::zeros(),
                    5.0,
                )
            })
            .collect();
        let mut trajectory = Trajectory::new();
        trajectory.push_segment(PhaseLabel::Coast, 0.0, 3.0, vec![0.0, 1.0, 2.0], states);

        let telemetry = Telemetry::from_trajectory(&trajectory);
        assert_relative_eq!(telemetry.max_altitude, -1.0, epsilon = 1e-9);
        assert_eq!(telemetry.max_acceleration, 0.0);
    }

    #[test]
    fn test_empty_trajectory() {
        let telemetry = Telemetry::from_trajectory(&Trajectory::new());
        assert!(telemetry.masses.is_empty());
        assert!(telemetry.accelerations.is_empty());
        assert_eq!(telemetry.max_altitude, 0.0);
        assert_eq!(telemetry.time_of_max_altitude(), None);
    }
}
