pub mod aerodynamics;
pub mod events;
pub mod forces;
pub mod integrator;
pub mod kinematics;
pub mod propagator;
