use crate::constants::MAX_INTEGRATION_STEPS;
use crate::errors::SimulationError;
use crate::trajectory_system::events::{EventDescriptor, EventKind};
use crate::trajectory_system::kinematics::State;

// Dormand–Prince 5(4) tableau.
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// Fifth-order weights, also the last row of A (first same as last).
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Fifth minus fourth order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;
const ERROR_EXPONENT: f64 = -1.0 / 5.0;

const EVENT_TIME_TOLERANCE: f64 = 1e-10; // s
const EVENT_MAX_ITERATIONS: usize = 200;

/// Step-size control settings for [`Integrator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratorConfig {
    pub initial_step: f64, // s
    pub min_step: f64,     // s
    pub max_step: f64,     // s
    pub atol: f64,
    pub rtol: f64,
    pub max_steps: usize,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        IntegratorConfig {
            initial_step: 1e-3,
            min_step: 1e-12,
            max_step: 5.0,
            atol: 1e-9,
            rtol: 1e-8,
            max_steps: MAX_INTEGRATION_STEPS,
        }
    }
}

impl IntegratorConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        let valid = self.initial_step > 0.0
            && self.min_step > 0.0
            && self.max_step >= self.min_step
            && self.atol > 0.0
            && self.rtol > 0.0
            && self.max_steps > 0;
        if !valid {
            return Err(SimulationError::ConfigurationError(format!(
                "invalid integrator settings {:?}",
                self
            )));
        }
        Ok(())
    }
}

/// An event crossing located inside an accepted step.
#[derive(Debug, Clone, PartialEq)]
pub struct EventOccurrence {
    pub kind: EventKind,
    pub t: f64,
    pub state: State,
    pub terminal: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Requested output times that were reached.
    pub t: Vec<f64>,
    /// States at `t`.
    pub y: Vec<State>,
    pub t_final: f64,
    pub y_final: State,
    pub events: Vec<EventOccurrence>,
    pub terminal_event: Option<EventOccurrence>,
    pub accepted_steps: usize,
    pub rejected_steps: usize,
}

/// Cubic Hermite interpolant over one accepted step.
struct StepInterpolant {
    t0: f64,
    t1: f64,
    y0: State,
    y1: State,
    f0: State,
    f1: State,
}

impl StepInterpolant {
    fn at(&self, t: f64) -> State {
        let h = self.t1 - self.t0;
        let s = (t - self.t0) / h;
        let s2 = s * s;
        let s3 = s2 * s;

        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        self.y0 * h00 + self.f0 * (h * h10) + self.y1 * h01 + self.f1 * (h * h11)
    }
}

struct TrialStep {
    y: State,
    derivative: State,
    error: f64,
}

/// Adaptive Dormand–Prince 5(4) integrator with event detection.
#[derive(Debug, Clone, Default)]
pub struct Integrator {
    pub config: IntegratorConfig,
}

impl Integrator {
    pub fn new(config: IntegratorConfig) -> Self {
        Integrator { config }
    }

    /// Integrates `derivative` from `(t0, y0)` to `t_end`.
    ///
    /// States are reported at the sorted times in `t_eval` that are reached.
    /// The first terminal event ends the integration at the event time; only
    /// output times strictly before it are reported.
    pub fn solve<F>(
        &self,
        mut derivative: F,
        t0: f64,
        y0: State,
        t_end: f64,
        events: &[EventDescriptor],
        t_eval: &[f64],
    ) -> Result<Solution, SimulationError>
    where
        F: FnMut(f64, &State) -> State,
    {
        self.config.validate()?;

        let mut solution = Solution {
            t: Vec::with_capacity(t_eval.len()),
            y: Vec::with_capacity(t_eval.len()),
            t_final: t0,
            y_final: y0,
            events: Vec::new(),
            terminal_event: None,
            accepted_steps: 0,
            rejected_steps: 0,
        };

        let mut next_sample = t_eval.iter().take_while(|t| **t < t0).count();
        while next_sample < t_eval.len() && t_eval[next_sample] == t0 {
            solution.t.push(t0);
            solution.y.push(y0);
            next_sample += 1;
        }

        let mut t = t0;
        let mut y = y0;
        let mut k1 = derivative(t, &y);
        if !k1.iter().all(|value| value.is_finite()) {
            return Err(SimulationError::IntegrationError(format!(
                "non-finite derivative at t = {t} s"
            )));
        }

        let mut h = self.config.initial_step.min(self.config.max_step);
        let mut g_previous: Vec<f64> = events.iter().map(|event| event.evaluate(t, &y)).collect();

        while t < t_end {
            if solution.accepted_steps + solution.rejected_steps >= self.config.max_steps {
                return Err(SimulationError::IntegrationError(format!(
                    "step limit of {} reached at t = {t} s",
                    self.config.max_steps
                )));
            }

            let remaining = t_end - t;
            let last_step = h >= remaining;
            let step = if last_step { remaining } else { h };

            let trial = self.dormand_prince_step(&mut derivative, t, &y, &k1, step);

            // NaN errors fail this test as well.
            if !(trial.error <= 1.0) {
                solution.rejected_steps += 1;
                let factor = if trial.error.is_finite() {
                    (SAFETY * trial.error.powf(ERROR_EXPONENT)).max(MIN_FACTOR)
                } else {
                    MIN_FACTOR
                };
                h = step * factor;
                if h < self.config.min_step {
                    return Err(SimulationError::IntegrationError(format!(
                        "step size {h:e} s fell below the minimum {:e} s at t = {t} s",
                        self.config.min_step
                    )));
                }
                continue;
            }

            solution.accepted_steps += 1;
            let t_new = if last_step { t_end } else { t + step };
            let interpolant = StepInterpolant {
                t0: t,
                t1: t_new,
                y0: y,
                y1: trial.y,
                f0: k1,
                f1: trial.derivative,
            };

            let g_new: Vec<f64> = events
                .iter()
                .map(|event| event.evaluate(t_new, &trial.y))
                .collect();

            let mut crossings: Vec<EventOccurrence> = events
                .iter()
                .enumerate()
                .filter(|(i, event)| event.direction.is_crossing(g_previous[*i], g_new[*i]))
                .map(|(i, event)| {
                    let t_event = locate_crossing(event, &interpolant, g_previous[i], g_new[i]);
                    EventOccurrence {
                        kind: event.kind,
                        t: t_event,
                        state: interpolant.at(t_event),
                        terminal: event.terminal,
                    }
                })
                .collect();
            crossings.sort_by(|a, b| a.t.total_cmp(&b.t));

            if let Some(index) = crossings.iter().position(|crossing| crossing.terminal) {
                crossings.truncate(index + 1);
                let stop = crossings[index].clone();

                while next_sample < t_eval.len() && t_eval[next_sample] < stop.t {
                    solution.t.push(t_eval[next_sample]);
                    solution.y.push(interpolant.at(t_eval[next_sample]));
                    next_sample += 1;
                }

                tracing::trace!(kind = ?stop.kind, t = stop.t, "terminal event");
                solution.t_final = stop.t;
                solution.y_final = stop.state;
                solution.events.extend(crossings);
                solution.terminal_event = Some(stop);
                return Ok(solution);
            }
            solution.events.extend(crossings);

            while next_sample < t_eval.len() && t_eval[next_sample] <= t_new {
                solution.t.push(t_eval[next_sample]);
                solution.y.push(interpolant.at(t_eval[next_sample]));
                next_sample += 1;
            }

            let factor = if trial.error == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * trial.error.powf(ERROR_EXPONENT)).clamp(MIN_FACTOR, MAX_FACTOR)
            };
            h = (step * factor).min(self.config.max_step);

            t = t_new;
            y = trial.y;
            k1 = trial.derivative;
            g_previous = g_new;
        }

        solution.t_final = t;
        solution.y_final = y;
        Ok(solution)
    }

    fn dormand_prince_step<F>(
        &self,
        derivative: &mut F,
        t: f64,
        y: &State,
        k1: &State,
        h: f64,
    ) -> TrialStep
    where
        F: FnMut(f64, &State) -> State,
    {
        let k2 = derivative(t + C2 * h, &(y + k1 * (h * A21)));
        let k3 = derivative(t + C3 * h, &(y + (k1 * A31 + k2 * A32) * h));
        let k4 = derivative(t + C4 * h, &(y + (k1 * A41 + k2 * A42 + k3 * A43) * h));
        let k5 = derivative(
            t + C5 * h,
            &(y + (k1 * A51 + k2 * A52 + k3 * A53 + k4 * A54) * h),
        );
        let k6 = derivative(
            t + h,
            &(y + (k1 * A61 + k2 * A62 + k3 * A63 + k4 * A64 + k5 * A65) * h),
        );

        let y_new = y + (k1 * B1 + k3 * B3 + k4 * B4 + k5 * B5 + k6 * B6) * h;
        let k7 = derivative(t + h, &y_new);

        let error_estimate = (k1 * E1 + k3 * E3 + k4 * E4 + k5 * E5 + k6 * E6 + k7 * E7) * h;
        let sum_of_squares: f64 = error_estimate
            .iter()
            .zip(y.iter().zip(y_new.iter()))
            .map(|(error, (before, after))| {
                let scale = self.config.atol + self.config.rtol * before.abs().max(after.abs());
                (error / scale).powi(2)
            })
            .sum();

        TrialStep {
            y: y_new,
            derivative: k7,
            error: (sum_of_squares / error_estimate.len() as f64).sqrt(),
        }
    }
}

// Bisects the interpolated event function inside the step. Returns the
// earliest time found on the far side of the crossing, so the event time is
// always strictly after the step start.
fn locate_crossing(
    event: &EventDescriptor,
    interpolant: &StepInterpolant,
    g_before: f64,
    g_after: f64,
) -> f64 {
    let falling = g_before >= 0.0 && g_after < 0.0;
    let crossed = |g: f64| if falling { g < 0.0 } else { g > 0.0 };

    let (mut lo, mut hi) = (interpolant.t0, interpolant.t1);
    for _ in 0..EVENT_MAX_ITERATIONS {
        if hi - lo <= EVENT_TIME_TOLERANCE {
            break;
        }
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        if crossed(event.evaluate(mid, &interpolant.at(mid))) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    hi
}
