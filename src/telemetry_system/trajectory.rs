use std::fmt;

use crate::trajectory_system::kinematics::State;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseLabel {
    /// Burn (and following coast) of the 1-based stage.
    Stage(usize),
    OrbitInsertion,
    Ascent,
    Coast,
    DrogueParachute,
    MainParachute,
}

impl fmt::Display for PhaseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseLabel::Stage(number) => write!(f, "Stage {number}"),
            PhaseLabel::OrbitInsertion => write!(f, "Orbit Insertion"),
            PhaseLabel::Ascent => write!(f, "Ascent"),
            PhaseLabel::Coast => write!(f, "Coast"),
            PhaseLabel::DrogueParachute => write!(f, "Drogue Parachute"),
            PhaseLabel::MainParachute => write!(f, "Main Parachute"),
        }
    }
}

/// Samples `start_index..end_index` of the trajectory, produced by one phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSegment {
    pub label: PhaseLabel,
    pub start_index: usize,
    pub end_index: usize,
    pub start_time: f64,
    pub end_time: f64,
}

impl PhaseSegment {
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightEventKind {
    /// Jettison of the 1-based stage.
    StageSeparation(usize),
    Apoapsis,
    DrogueDeployment,
    MainDeployment,
    GroundImpact,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightEvent {
    pub kind: FlightEventKind,
    pub time: f64,     // s
    pub altitude: f64, // km
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionOutcome {
    /// Ran to the scheduled end time.
    Completed,
    /// Touched down under the main parachute.
    Landed,
    /// Hit the ground before the final phase.
    GroundImpact,
}

impl fmt::Display for MissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionOutcome::Completed => write!(f, "completed"),
            MissionOutcome::Landed => write!(f, "landed"),
            MissionOutcome::GroundImpact => write!(f, "ground impact"),
        }
    }
}

/// Phase-segmented output of one propagation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub times: Vec<f64>,
    pub states: Vec<State>,
    pub segments: Vec<PhaseSegment>,
    pub events: Vec<FlightEvent>,
    pub outcome: MissionOutcome,
}

impl Default for Trajectory {
    fn default() -> Self {
        Trajectory {
            times: Vec::new(),
            states: Vec::new(),
            segments: Vec::new(),
            events: Vec::new(),
            outcome: MissionOutcome::Completed,
        }
    }
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Appends one phase's samples as a new segment.
    pub fn push_segment(
        &mut self,
        label: PhaseLabel,
        start_time: f64,
        end_time: f64,
        times: Vec<f64>,
        states: Vec<State>,
    ) {
        let start_index = self.states.len();
        self.times.extend(times);
        self.states.extend(states);
        self.reconcile();
        self.segments.push(PhaseSegment {
            label,
            start_index,
            end_index: self.states.len(),
            start_time,
            end_time,
        });
    }

    /// Appends a sample to the last segment.
    pub fn push_sample(&mut self, time: f64, state: State) {
        self.times.push(time);
        self.states.push(state);
        if let Some(segment) = self.segments.last_mut() {
            segment.end_index = self.states.len();
            segment.end_time = segment.end_time.max(time);
        }
    }

    pub fn record_event(&mut self, kind: FlightEventKind, time: f64, altitude: f64) {
        self.events.push(FlightEvent {
            kind,
            time,
            altitude,
        });
    }

    // Time and state samples must pair up one to one.
    fn reconcile(&mut self) {
        let length = self.times.len().min(self.states.len());
        self.times.truncate(length);
        self.states.truncate(length);
    }

    pub fn final_state(&self) -> Option<&State> {
        self.states.last()
    }

    pub fn final_time(&self) -> Option<f64> {
        self.times.last().copied()
    }

    pub fn segment(&self, label: PhaseLabel) -> Option<&PhaseSegment> {
        self.segments.iter().find(|segment| segment.label == label)
    }

    pub fn segment_states(&self, segment: &PhaseSegment) -> &[State] {
        &self.states[segment.start_index..segment.end_index]
    }

    pub fn segment_times(&self, segment: &PhaseSegment) -> &[f64] {
        &self.times[segment.start_index..segment.end_index]
    }

    pub fn event(&self, kind: FlightEventKind) -> Option<&FlightEvent> {
        self.events.iter().find(|event| event.kind == kind)
    }

    pub fn count_events(&self, kind: FlightEventKind) -> usize {
        self.events.iter().filter(|event| event.kind == kind).count()
    }
}
