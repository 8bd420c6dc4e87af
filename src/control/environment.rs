use nalgebra::Vector3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::constants::{ATMOSPHERE_CEILING, WIND_CEILING, WIND_DIRECTION_STD_DEV};

// US Standard Atmosphere 1976 reference altitudes (km).
const REFERENCE_ALTITUDES: [f64; 28] = [
    0.0, 25.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0, 110.0, 120.0, 130.0, 140.0,
    150.0, 180.0, 200.0, 250.0, 300.0, 350.0, 400.0, 450.0, 500.0, 600.0, 700.0, 800.0, 900.0,
    1000.0,
];

// Density at each reference altitude (kg/m³).
const REFERENCE_DENSITIES: [f64; 28] = [
    1.225, 4.008e-2, 1.841e-2, 3.996e-3, 1.027e-3, 3.097e-4, 8.283e-5, 1.846e-5, 3.416e-6,
    5.606e-7, 9.708e-8, 2.222e-8, 8.152e-9, 3.831e-9, 2.076e-9, 5.194e-10, 2.541e-10,
    6.073e-11, 1.916e-11, 7.014e-12, 2.803e-12, 1.184e-12, 5.215e-13, 1.137e-13, 3.070e-14,
    1.136e-14, 5.759e-15, 3.561e-15,
];

// Scale height of each layer (km).
const SCALE_HEIGHTS: [f64; 27] = [
    7.310, 6.427, 6.546, 7.360, 8.342, 7.583, 6.661, 5.927, 5.533, 5.703, 6.782, 9.973, 13.243,
    16.322, 21.652, 27.974, 34.934, 43.342, 49.755, 54.513, 58.019, 60.980, 65.654, 76.377,
    100.587, 147.203, 208.020,
];

const WIND_ALTITUDES: [f64; 15] = [
    0.0, 1.0, 3.0, 5.0, 10.0, 15.0, 18.0, 20.0, 30.0, 50.0, 70.0, 80.0, 90.0, 100.0, 120.0,
]; // km
const WIND_SPEEDS: [f64; 15] = [
    5.0, 6.0, 10.0, 15.0, 20.0, 18.0, 10.0, 1.0, 15.0, 40.0, 67.0, 40.0, 25.0, 35.0, 10.0,
]; // m/s
const WIND_DIRECTIONS: [f64; 15] = [
    90.0, 45.0, 0.0, 270.0, 225.0, 180.0, 135.0, 90.0, 45.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
]; // degrees

/// Air density (kg/m³) at `altitude` km by exponential interpolation of the
/// USSA76 table. Zero outside [0, 1000] km.
pub fn atmospheric_density(altitude: f64) -> f64 {
    if !(0.0..=ATMOSPHERE_CEILING).contains(&altitude) {
        return 0.0;
    }

    let below = REFERENCE_ALTITUDES.iter().filter(|h| **h < altitude).count();
    let layer = below.saturating_sub(1).min(SCALE_HEIGHTS.len() - 1);

    REFERENCE_DENSITIES[layer]
        * (-(altitude - REFERENCE_ALTITUDES[layer]) / SCALE_HEIGHTS[layer]).exp()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindCondition {
    #[default]
    None,
    Light,
    Moderate,
    Strong,
    VeryStrong,
}

impl WindCondition {
    pub fn scale_factor(&self) -> f64 {
        match self {
            WindCondition::None => 0.0,
            WindCondition::Light => 0.5,
            WindCondition::Moderate => 1.0,
            WindCondition::Strong => 1.5,
            WindCondition::VeryStrong => 2.0,
        }
    }
}

/// Layered wind profile with normally distributed direction jitter.
///
/// Each layer gets one jitter draw per model, so the wind is a fixed
/// function of altitude for the whole run. Call [`WindModel::resample`]
/// before reusing a model for another run.
#[derive(Debug, Clone)]
pub struct WindModel {
    pub condition: WindCondition,
    rng: StdRng,
    jitters: [f64; WIND_ALTITUDES.len()], // degrees
}

impl WindModel {
    pub fn new(condition: WindCondition) -> Self {
        Self::with_rng(condition, StdRng::from_entropy())
    }

    /// Deterministic wind for reproducible runs.
    pub fn seeded(condition: WindCondition, seed: u64) -> Self {
        Self::with_rng(condition, StdRng::seed_from_u64(seed))
    }

    fn with_rng(condition: WindCondition, rng: StdRng) -> Self {
        let mut model = WindModel {
            condition,
            rng,
            jitters: [0.0; WIND_ALTITUDES.len()],
        };
        model.resample();
        model
    }

    /// Draws a fresh zero-mean direction offset for every layer.
    pub fn resample(&mut self) {
        for jitter in self.jitters.iter_mut() {
            let standard: f64 = self.rng.sample(StandardNormal);
            *jitter = standard * WIND_DIRECTION_STD_DEV;
        }
    }

    /// Wind velocity (km/s) at `altitude` km, horizontal in the x-y plane.
    pub fn wind(&self, altitude: f64) -> Vector3<f64> {
        let scale = self.condition.scale_factor();
        if scale == 0.0 || !(0.0..=WIND_CEILING).contains(&altitude) {
            return Vector3::zeros();
        }

        let above = WIND_ALTITUDES.iter().filter(|h| **h <= altitude).count();
        let layer = above.saturating_sub(1).min(WIND_ALTITUDES.len() - 2);

        let fraction = (altitude - WIND_ALTITUDES[layer])
            / (WIND_ALTITUDES[layer + 1] - WIND_ALTITUDES[layer]);
        let speed = lerp(WIND_SPEEDS[layer], WIND_SPEEDS[layer + 1], fraction);
        let direction = lerp(
            WIND_DIRECTIONS[layer] + self.jitters[layer],
            WIND_DIRECTIONS[layer + 1] + self.jitters[layer + 1],
            fraction,
        );

        let (sin, cos) = direction.to_radians().sin_cos();
        Vector3::new(speed * cos, speed * sin, 0.0) / 1000.0 * scale
    }
}

fn lerp(from: f64, to: f64, fraction: f64) -> f64 {
    from + (to - from) * fraction
}
