use crate::errors::SimulationError;

/// Finds a root of `function` inside `[low, high]` by interval halving.
///
/// Stops once `|function(mid)| <= tolerance`. If the bracket collapses onto
/// adjacent floats first, the midpoint is returned as the best representable
/// root.
pub fn bisection<F>(
    function: F,
    mut low: f64,
    mut high: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<f64, SimulationError>
where
    F: Fn(f64) -> f64,
{
    let f_low = function(low);
    let f_high = function(high);
    if !f_low.is_finite() || !f_high.is_finite() || f_low * f_high > 0.0 {
        return Err(SimulationError::ConvergenceError(format!(
            "root is not bracketed in [{low:e}, {high:e}] (f = {f_low:e}, {f_high:e})"
        )));
    }

    let mut mid = 0.5 * (low + high);
    let mut iterations = 0;

    while function(mid).abs() > tolerance {
        if iterations >= max_iterations {
            return Err(SimulationError::ConvergenceError(format!(
                "no root within {tolerance:e} after {max_iterations} iterations (last estimate {mid:e})"
            )));
        }
        iterations += 1;

        if function(low) * function(mid) < 0.0 {
            high = mid;
        } else {
            low = mid;
        }

        let next = 0.5 * (low + high);
        if next == low || next == high {
            tracing::trace!(iterations, root = next, "bisection bracket collapsed");
            return Ok(next);
        }
        mid = next;
    }

    tracing::trace!(iterations, root = mid, "bisection converged");
    Ok(mid)
}
