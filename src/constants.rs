// Physical Constants
pub const STANDARD_GRAVITY: f64 = 9.81; // m/s²
pub const EARTH_RADIUS: f64 = 6_371.0; // km
pub const EARTH_MU: f64 = 398_600.4418; // km³/s²
pub const EARTH_ANGULAR_VELOCITY: f64 = 7.2921159e-5; // rad/s, about +z

// Launch Constants
pub const LAUNCH_VELOCITY: f64 = 1e-8; // km/s, keeps the velocity direction defined on the pad
pub const VERTICAL_ASCENT_ALTITUDE: f64 = 0.110; // km
pub const PITCH_OVER_ALTITUDE: f64 = 0.5; // km

// Parachute Constants
pub const DROGUE_DIAMETER: f64 = 0.25; // m
pub const MAIN_PARACHUTE_DIAMETER: f64 = 1.0; // m
pub const PARACHUTE_DRAG_COEFFICIENT: f64 = 1.75;
pub const MAIN_DEPLOY_APOAPSIS_FRACTION: f64 = 0.1;
pub const MAIN_DEPLOY_MIN_ALTITUDE: f64 = 0.3; // km

// Mass Budget Solver Parameters
pub const STAGING_BRACKET_OFFSET: f64 = 1e-11;
pub const STAGING_TOLERANCE: f64 = 1e-11;
pub const STAGING_MAX_ITERATIONS: usize = 1000;

// Simulation Parameters
pub const TIME_STEP: f64 = 0.01; // s, output sampling grid
pub const MAX_INTEGRATION_STEPS: usize = 5_000_000;

// Atmosphere Constants
pub const ATMOSPHERE_CEILING: f64 = 1_000.0; // km
pub const WIND_CEILING: f64 = 100.0; // km
pub const WIND_DIRECTION_STD_DEV: f64 = 30.0; // degrees
