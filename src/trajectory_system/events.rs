use std::fmt;

use crate::constants::{EARTH_RADIUS, MAIN_DEPLOY_APOAPSIS_FRACTION, MAIN_DEPLOY_MIN_ALTITUDE};
use crate::trajectory_system::kinematics::{Kinematics, State};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    GroundImpact,
    Apoapsis,
    MainParachute,
}

/// Which sign changes of an event function count as a crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingDirection {
    Rising,
    Falling,
    Either,
}

impl CrossingDirection {
    /// Whether moving from `before` to `after` is a crossing in this direction.
    pub fn is_crossing(&self, before: f64, after: f64) -> bool {
        let falling = before >= 0.0 && after < 0.0;
        let rising = before <= 0.0 && after > 0.0;
        match self {
            CrossingDirection::Falling => falling,
            CrossingDirection::Rising => rising,
            CrossingDirection::Either => falling || rising,
        }
    }
}

type EventFunction = Box<dyn Fn(f64, &State) -> f64>;

/// A scalar event function g(t, y) watched by the integrator.
pub struct EventDescriptor {
    pub kind: EventKind,
    pub direction: CrossingDirection,
    pub terminal: bool,
    function: EventFunction,
}

impl EventDescriptor {
    pub fn new<F>(kind: EventKind, direction: CrossingDirection, terminal: bool, function: F) -> Self
    where
        F: Fn(f64, &State) -> f64 + 'static,
    {
        EventDescriptor {
            kind,
            direction,
            terminal,
            function: Box::new(function),
        }
    }

    pub fn evaluate(&self, t: f64, state: &State) -> f64 {
        (self.function)(t, state)
    }

    /// Radius drops below the planet surface.
    pub fn ground_impact() -> Self {
        Self::new(
            EventKind::GroundImpact,
            CrossingDirection::Falling,
            true,
            |_, state| state.radius() - EARTH_RADIUS,
        )
    }

    /// Radial velocity turns negative.
    pub fn apoapsis() -> Self {
        Self::new(
            EventKind::Apoapsis,
            CrossingDirection::Falling,
            true,
            |_, state| state.radial_velocity(),
        )
    }

    /// Descent through the main-chute deployment altitude derived from the
    /// apoapsis radius (km).
    pub fn main_parachute(apoapsis_radius: f64) -> Self {
        let threshold = main_deploy_altitude(apoapsis_radius);
        Self::new(
            EventKind::MainParachute,
            CrossingDirection::Falling,
            true,
            move |_, state| state.altitude() - threshold,
        )
    }
}

impl fmt::Debug for EventDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDescriptor")
            .field("kind", &self.kind)
            .field("direction", &self.direction)
            .field("terminal", &self.terminal)
            .finish()
    }
}

/// Main chute opens at 10% of the apoapsis altitude, but no lower than 300 m.
pub fn main_deploy_altitude(apoapsis_radius: f64) -> f64 {
    (MAIN_DEPLOY_APOAPSIS_FRACTION * (apoapsis_radius - EARTH_RADIUS)).max(MAIN_DEPLOY_MIN_ALTITUDE)
}
