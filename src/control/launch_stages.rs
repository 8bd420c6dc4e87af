use crate::constants::STANDARD_GRAVITY;
use crate::control::mass_budget::MassBudget;
use crate::errors::SimulationError;

/// Per-stage propulsion and structure inputs, listed in burn order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageSpec {
    pub structural_ratio: f64,
    pub specific_impulse: f64, // s
}

impl StageSpec {
    pub fn new(structural_ratio: f64, specific_impulse: f64) -> Self {
        StageSpec {
            structural_ratio,
            specific_impulse,
        }
    }

    pub fn exhaust_velocity(&self) -> f64 {
        self.specific_impulse * STANDARD_GRAVITY
    }
}

/// Thrust levels, mass-flow rates and burnout times derived once from a
/// solved mass budget.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSchedule {
    pub thrusts: Vec<f64>,         // N
    pub mass_flow_rates: Vec<f64>, // kg/s
    pub burn_durations: Vec<f64>,  // s
    pub burnout_times: Vec<f64>,   // s since launch
    pub coast_duration: f64,       // s between consecutive stages
}

impl StageSchedule {
    pub fn new(
        budget: &MassBudget,
        thrust_to_weight: f64,
        coast_duration: f64,
    ) -> Result<Self, SimulationError> {
        let stage_count = budget.number_of_stages();

        let thrusts: Vec<f64> = budget
            .cumulative_masses
            .iter()
            .take(stage_count)
            .map(|mass| thrust_to_weight * STANDARD_GRAVITY * mass)
            .collect();
        let mass_flow_rates: Vec<f64> = thrusts
            .iter()
            .zip(&budget.exhaust_velocities)
            .map(|(thrust, ve)| thrust / ve)
            .collect();
        let burn_durations: Vec<f64> = budget
            .propellant_masses
            .iter()
            .zip(&mass_flow_rates)
            .map(|(propellant, flow)| propellant / flow)
            .collect();

        let mut burnout_times = Vec::with_capacity(stage_count);
        for (i, duration) in burn_durations.iter().enumerate() {
            let burnout = match i {
                0 => *duration,
                // No coast follows the final burn.
                _ if i == stage_count - 1 => burnout_times[i - 1] + duration,
                _ => burnout_times[i - 1] + coast_duration + duration,
            };
            burnout_times.push(burnout);
        }

        let schedule = StageSchedule {
            thrusts,
            mass_flow_rates,
            burn_durations,
            burnout_times,
            coast_duration,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    fn validate(&self) -> Result<(), SimulationError> {
        let first_valid = self
            .burnout_times
            .first()
            .map_or(false, |time| time.is_finite() && *time > 0.0);
        let increasing = self.burnout_times.windows(2).all(|pair| pair[1] > pair[0]);
        if !first_valid || !increasing {
            return Err(SimulationError::ConfigurationError(format!(
                "burnout schedule {:?} is not strictly increasing",
                self.burnout_times
            )));
        }
        Ok(())
    }

    pub fn number_of_stages(&self) -> usize {
        self.burnout_times.len()
    }

    pub fn final_burnout(&self) -> f64 {
        self.burnout_times.last().copied().unwrap_or(0.0)
    }

    /// Time at which each stage starts burning: the first at lift-off, the
    /// rest one coast after the previous burnout.
    pub fn ignition_times(&self) -> Vec<f64> {
        std::iter::once(0.0)
            .chain(
                self.burnout_times
                    .iter()
                    .take(self.number_of_stages().saturating_sub(1))
                    .map(|burnout| burnout + self.coast_duration),
            )
            .collect()
    }

    /// Thrust (N) and mass-flow rate (kg/s) commanded at time `t`.
    ///
    /// Scans the schedule for the first stage still burning at `t`; a time
    /// inside the coast window after a burnout yields zero, as does any time
    /// past the last burnout.
    pub fn thrust_at(&self, t: f64) -> (f64, f64) {
        for (i, burnout) in self.burnout_times.iter().enumerate() {
            if t < *burnout {
                return (self.thrusts[i], self.mass_flow_rates[i]);
            }
            if t < burnout + self.coast_duration {
                return (0.0, 0.0);
            }
        }
        (0.0, 0.0)
    }

    /// Index of the stage that is burning or has most recently burned out at `t`.
    pub fn stage_index_at(&self, t: f64) -> usize {
        self.burnout_times
            .iter()
            .position(|burnout| t < *burnout)
            .unwrap_or_else(|| self.number_of_stages().saturating_sub(1))
    }
}
