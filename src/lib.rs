pub mod constants;
pub mod control;
pub mod errors;
pub mod telemetry_system;
pub mod trajectory_system;
pub mod utils;

pub use constants::*;
pub use control::environment::{atmospheric_density, WindCondition, WindModel};
pub use control::guidance::{FlightState, GuidancePhase, ParachuteState};
pub use control::launch_stages::{StageSchedule, StageSpec};
pub use control::mass_budget::MassBudget;
pub use control::mission::{CandidateFitness, MissionFactory, OrbitalObjective};
pub use control::propulsion::ThrustModel;
pub use control::rocket::{LaunchSite, MissionProfile, Rocket, RocketConfig};
pub use errors::SimulationError;

// Re-export commonly used items from trajectory_system
pub use trajectory_system::aerodynamics::{Aerodynamics, Perturbation};
pub use trajectory_system::events::{CrossingDirection, EventDescriptor, EventKind};
pub use trajectory_system::integrator::{Integrator, IntegratorConfig};
pub use trajectory_system::kinematics::{state_from, Kinematics, State};
pub use trajectory_system::propagator::{PropagationSettings, Propagator};

// Re-export commonly used items from telemetry_system
pub use telemetry_system::telemetry::Telemetry;
pub use telemetry_system::trajectory::{
    FlightEvent, FlightEventKind, MissionOutcome, PhaseLabel, PhaseSegment, Trajectory,
};
