use crate::constants::TIME_STEP;
use crate::control::guidance::FlightState;
use crate::control::propulsion::ThrustModel;
use crate::control::rocket::Rocket;
use crate::errors::SimulationError;
use crate::telemetry_system::trajectory::{
    FlightEventKind, MissionOutcome, PhaseLabel, Trajectory,
};
use crate::trajectory_system::aerodynamics::Perturbation;
use crate::trajectory_system::events::{EventDescriptor, EventKind};
use crate::trajectory_system::forces::ForceModel;
use crate::trajectory_system::integrator::{EventOccurrence, Integrator, IntegratorConfig};
use crate::trajectory_system::kinematics::{Kinematics, State};

#[derive(Debug, Clone, PartialEq)]
pub struct PropagationSettings {
    /// Output sampling interval (s).
    pub time_step: f64,
    /// Suppresses the early-impact warning while an optimiser sweeps candidates.
    pub optimise: bool,
    pub integrator: IntegratorConfig,
    /// Overrides the pad state of the rocket.
    pub initial_state: Option<State>,
}

impl Default for PropagationSettings {
    fn default() -> Self {
        PropagationSettings {
            time_step: TIME_STEP,
            optimise: false,
            integrator: IntegratorConfig::default(),
            initial_state: None,
        }
    }
}

impl PropagationSettings {
    fn validate(&self) -> Result<(), SimulationError> {
        if !(self.time_step > 0.0 && self.time_step.is_finite()) {
            return Err(SimulationError::ConfigurationError(format!(
                "output time step must be positive, got {}",
                self.time_step
            )));
        }
        self.integrator.validate()
    }
}

// Where one integration segment stopped.
struct PhaseEnd {
    time: f64,
    state: State,
    event: Option<EventOccurrence>,
}

/// Runs a [`Rocket`] through its mission phases.
pub struct Propagator<'a> {
    rocket: &'a Rocket,
    forces: ForceModel,
    settings: PropagationSettings,
    flight: FlightState,
}

impl<'a> Propagator<'a> {
    pub fn new(
        rocket: &'a Rocket,
        perturbations: Vec<Perturbation>,
        settings: PropagationSettings,
    ) -> Self {
        Propagator {
            rocket,
            forces: ForceModel::new(ThrustModel::for_rocket(rocket), perturbations),
            settings,
            flight: FlightState::new(),
        }
    }

    /// Replaces the propulsion model picked from the mission profile.
    pub fn with_thrust(mut self, thrust: ThrustModel) -> Self {
        self.forces.thrust = thrust;
        self
    }

    pub fn flight_state(&self) -> &FlightState {
        &self.flight
    }

    pub fn propagate(&mut self) -> Result<Trajectory, SimulationError> {
        self.settings.validate()?;
        self.flight = FlightState::new();

        let initial = self
            .settings
            .initial_state
            .unwrap_or_else(|| self.rocket.initial_state());

        if self.rocket.is_orbital() {
            self.propagate_orbital(initial)
        } else {
            self.propagate_suborbital(initial)
        }
    }

    // One phase per stage, then a coast to the mission end. Each boundary
    // jettisons the stage that just burned out.
    fn propagate_orbital(&mut self, initial: State) -> Result<Trajectory, SimulationError> {
        let rocket = self.rocket;
        let stages = rocket.number_of_stages();
        let mut trajectory = Trajectory::new();
        let mut time = 0.0;
        let mut state = initial;

        for index in 0..=stages {
            if index > 0 {
                state[6] -= rocket.budget.empty_masses[index - 1];
                self.flight.stage_index = index;
                tracing::info!(
                    stage = index,
                    t = time,
                    altitude = state.altitude(),
                    mass = state.mass(),
                    "stage separation"
                );
                trajectory.record_event(
                    FlightEventKind::StageSeparation(index),
                    time,
                    state.altitude(),
                );
            }

            let (label, end) = if index < stages {
                (PhaseLabel::Stage(index + 1), rocket.schedule.burnout_times[index])
            } else {
                (PhaseLabel::OrbitInsertion, rocket.mission_end_time())
            };

            let phase = self.run_phase(
                &mut trajectory,
                label,
                time,
                end,
                state,
                vec![EventDescriptor::ground_impact()],
            )?;

            if let Some(impact) = phase.event {
                self.finish_with_impact(&mut trajectory, &impact, MissionOutcome::GroundImpact);
                return Ok(trajectory);
            }
            time = phase.time;
            state = phase.state;
        }

        trajectory.outcome = MissionOutcome::Completed;
        Ok(trajectory)
    }

    // Ascent, coast to apoapsis, drogue descent, main-chute descent.
    fn propagate_suborbital(&mut self, initial: State) -> Result<Trajectory, SimulationError> {
        let burnout = self.rocket.burnout_time();
        let end = self.rocket.mission_end_time();
        let mut trajectory = Trajectory::new();

        let ascent = self.run_phase(
            &mut trajectory,
            PhaseLabel::Ascent,
            0.0,
            burnout,
            initial,
            vec![EventDescriptor::ground_impact()],
        )?;
        if let Some(impact) = ascent.event {
            self.finish_with_impact(&mut trajectory, &impact, MissionOutcome::GroundImpact);
            return Ok(trajectory);
        }
        self.flight.burnout = true;
        tracing::debug!(t = ascent.time, altitude = ascent.state.altitude(), "burnout");

        let coast = self.run_phase(
            &mut trajectory,
            PhaseLabel::Coast,
            ascent.time,
            end,
            ascent.state,
            vec![EventDescriptor::ground_impact(), EventDescriptor::apoapsis()],
        )?;
        match coast.event {
            Some(event) if event.kind == EventKind::Apoapsis => {
                let altitude = coast.state.altitude();
                trajectory.record_event(FlightEventKind::Apoapsis, coast.time, altitude);
                self.flight.deploy_drogue();
                trajectory.record_event(FlightEventKind::DrogueDeployment, coast.time, altitude);
                tracing::info!(t = coast.time, altitude, "apoapsis reached, drogue deployed");
            }
            Some(impact) => {
                self.finish_with_impact(&mut trajectory, &impact, MissionOutcome::GroundImpact);
                return Ok(trajectory);
            }
            None => return Ok(trajectory),
        }

        let apoapsis_radius = coast.state.radius();
        let drogue = self.run_phase(
            &mut trajectory,
            PhaseLabel::DrogueParachute,
            coast.time,
            end,
            coast.state,
            vec![
                EventDescriptor::ground_impact(),
                EventDescriptor::main_parachute(apoapsis_radius),
            ],
        )?;
        match drogue.event {
            Some(event) if event.kind == EventKind::MainParachute => {
                let altitude = drogue.state.altitude();
                self.flight.deploy_main();
                trajectory.record_event(FlightEventKind::MainDeployment, drogue.time, altitude);
                tracing::info!(t = drogue.time, altitude, "main parachute deployed");
            }
            Some(impact) => {
                self.finish_with_impact(&mut trajectory, &impact, MissionOutcome::GroundImpact);
                return Ok(trajectory);
            }
            None => return Ok(trajectory),
        }

        let main = self.run_phase(
            &mut trajectory,
            PhaseLabel::MainParachute,
            drogue.time,
            end,
            drogue.state,
            vec![EventDescriptor::ground_impact()],
        )?;
        if let Some(impact) = main.event {
            self.finish_with_impact(&mut trajectory, &impact, MissionOutcome::Landed);
        }
        Ok(trajectory)
    }

    // Integrates one segment and appends its samples to the trajectory.
    // Stage ignitions inside the window are step boundaries.
    fn run_phase(
        &mut self,
        trajectory: &mut Trajectory,
        label: PhaseLabel,
        start: f64,
        end: f64,
        state: State,
        events: Vec<EventDescriptor>,
    ) -> Result<PhaseEnd, SimulationError> {
        tracing::debug!(phase = %label, start, end, "phase started");

        let rocket = self.rocket;
        let integrator = Integrator::new(self.settings.integrator);
        let grid = sample_times(start, end, self.settings.time_step);
        let mut boundaries: Vec<f64> = rocket
            .schedule
            .ignition_times()
            .into_iter()
            .filter(|t| *t > start && *t < end)
            .collect();
        boundaries.push(end);

        let mut times = Vec::with_capacity(grid.len());
        let mut states = Vec::with_capacity(grid.len());
        let mut phase_end = PhaseEnd {
            time: start,
            state,
            event: None,
        };
        let (mut accepted, mut rejected) = (0, 0);

        for stop in boundaries {
            let from = phase_end.time;
            let outputs: Vec<f64> = grid
                .iter()
                .copied()
                .filter(|t| *t >= from && *t < stop)
                .collect();
            let forces = &mut self.forces;
            let flight = &mut self.flight;
            let solution = integrator.solve(
                |t, y| forces.state_derivative(t, y, rocket, flight),
                from,
                phase_end.state,
                stop,
                &events,
                &outputs,
            )?;

            accepted += solution.accepted_steps;
            rejected += solution.rejected_steps;
            times.extend(solution.t);
            states.extend(solution.y);
            phase_end = PhaseEnd {
                time: solution.t_final,
                state: solution.y_final,
                event: solution.terminal_event,
            };
            if phase_end.event.is_some() {
                break;
            }
        }

        tracing::debug!(
            phase = %label,
            stop = phase_end.time,
            accepted,
            rejected,
            "phase finished"
        );

        trajectory.push_segment(label, start, phase_end.time, times, states);
        Ok(phase_end)
    }

    fn finish_with_impact(
        &self,
        trajectory: &mut Trajectory,
        impact: &EventOccurrence,
        outcome: MissionOutcome,
    ) {
        trajectory.push_sample(impact.t, impact.state);
        trajectory.record_event(FlightEventKind::GroundImpact, impact.t, impact.state.altitude());
        trajectory.outcome = outcome;

        match outcome {
            MissionOutcome::Landed => {
                tracing::info!(t = impact.t, speed = impact.state.speed(), "landed")
            }
            _ if !self.settings.optimise => tracing::warn!(
                t = impact.t,
                stage = self.rocket.schedule.stage_index_at(impact.t) + 1,
                "ground impact, mission aborted"
            ),
            _ => {}
        }
    }
}

/// Output grid `start + k·step`, strictly below `end`.
pub fn sample_times(start: f64, end: f64, step: f64) -> Vec<f64> {
    (0..)
        .map(|k| start + k as f64 * step)
        .take_while(|t| *t < end)
        .collect()
}
