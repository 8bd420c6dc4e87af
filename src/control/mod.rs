pub mod environment;
pub mod guidance;
pub mod launch_stages;
pub mod mass_budget;
pub mod mission;
pub mod propulsion;
pub mod rocket;
