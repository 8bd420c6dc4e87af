use launch_simulation::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("suborbital sounding rocket");
    let (rocket, trajectory) = MissionFactory::fly(
        MissionFactory::suborbital_reference(),
        WindModel::new(WindCondition::None),
        PropagationSettings::default(),
    )?;
    tracing::info!(
        total_mass = rocket.total_mass(),
        burnout = rocket.burnout_time(),
        "vehicle sized"
    );
    Telemetry::from_trajectory(&trajectory).log_summary(&trajectory);

    tracing::info!("three-stage orbital launcher");
    let (rocket, trajectory) = MissionFactory::fly(
        MissionFactory::orbital_reference(),
        WindModel::new(WindCondition::Moderate),
        PropagationSettings {
            time_step: 1.0,
            ..PropagationSettings::default()
        },
    )?;
    tracing::info!(
        total_mass = rocket.total_mass(),
        propellant = rocket.budget.total_propellant(),
        delta_v = rocket.budget.ideal_delta_v(),
        "vehicle sized"
    );
    Telemetry::from_trajectory(&trajectory).log_summary(&trajectory);

    Ok(())
}
