use crate::error::SolverError;
use crate::gradient::Gradient;
use anyhow::{bail, Result};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Parameters shared by the line search and the descent driver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DescentSettings {
    /// Iteration budget for the descent loop.
    pub max_iterations: usize,
    /// Convergence threshold on the successive objective-value error.
    pub tolerance: f64,
    /// Sufficient-decrease fraction for the Armijo condition, in (0, 1).
    pub alpha: f64,
    /// Backtracking shrink ratio for the trial step size, in (0, 1).
    pub beta: f64,
    /// Trial budget for one line search. The backtracking loop has no
    /// natural bound when the objective violates its convexity/Lipschitz
    /// precondition, so it is capped here.
    pub max_backtracks: usize,
}

impl Default for DescentSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-9,
            alpha: 0.5,
            beta: 0.5,
            max_backtracks: 200,
        }
    }
}

impl DescentSettings {
    fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            bail!("max_iterations must be greater than zero.");
        }
        if self.tolerance <= 0.0 {
            bail!("tolerance must be positive.");
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            bail!("alpha must be in (0, 1).");
        }
        if !(self.beta > 0.0 && self.beta < 1.0) {
            bail!("beta must be in (0, 1).");
        }
        if self.max_backtracks == 0 {
            bail!("max_backtracks must be greater than zero.");
        }
        Ok(())
    }
}

/// How the descent loop terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DescentStatus {
    /// Successive objective values got within tolerance of each other.
    Converged,
    /// The iteration budget ran out first. Not an error; the last iterate
    /// is still the best one found.
    MaxIterationsExceeded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescentResult {
    /// The final iterate.
    pub state: Vec<f64>,
    /// Objective value at the final iterate.
    pub objective: f64,
    /// Number of descent iterations taken.
    pub iterations: usize,
    pub status: DescentStatus,
}

/// Backtracking (inexact) line search along the negative gradient.
///
/// Starting from eta = 1, shrinks eta by beta until the Armijo condition
/// f(x - eta*g) <= f(x) - alpha*eta*||g||^2 holds. f(x) and ||g||^2 are
/// computed once and reused across trials. Errors with
/// `SolverError::LineSearchFailed` once the trial budget is spent.
pub fn backtracking_line_search<F>(
    f: &F,
    x: &DVector<f64>,
    grad_at_x: &DVector<f64>,
    settings: DescentSettings,
) -> Result<f64>
where
    F: Fn(&DVector<f64>) -> f64,
{
    settings.validate()?;

    let fx = f(x);
    let slope = grad_at_x.norm_squared();

    let mut eta = 1.0;
    for _ in 0..settings.max_backtracks {
        let candidate = x - grad_at_x * eta;
        if f(&candidate) <= fx - settings.alpha * eta * slope {
            return Ok(eta);
        }
        eta *= settings.beta;
    }

    Err(SolverError::LineSearchFailed {
        trials: settings.max_backtracks,
    }
    .into())
}

/// Solves an unconstrained minimization problem with gradient descent.
///
/// Each iteration picks a step size with `backtracking_line_search` and
/// updates x_i = x_{i-1} - eta_i * grad(x_{i-1}). The convergence error is
/// the relative change |f(x_i) - f(x_{i-1})| / |f(x_i)| while |f(x_i)| is
/// above tolerance/2, and the absolute change below that, so a near-zero
/// objective does not blow up the quotient. Only the previous/current pair
/// of iterates is kept.
///
/// Running out of iterations is reported through `DescentStatus`, not as an
/// error. A non-finite objective value is an error, since NaN would make
/// every tolerance comparison false and mask non-convergence.
pub fn gradient_descent<F>(
    f: F,
    initial_guess: &[f64],
    gradient: Gradient<'_>,
    settings: DescentSettings,
) -> Result<DescentResult>
where
    F: Fn(&DVector<f64>) -> f64,
{
    if initial_guess.is_empty() {
        bail!("Initial guess must have at least one dimension.");
    }
    settings.validate()?;

    let mut current = DVector::from_column_slice(initial_guess);
    let mut current_value = f(&current);
    if !current_value.is_finite() {
        return Err(SolverError::NonFiniteValue {
            value: current_value,
            iteration: 0,
        }
        .into());
    }

    let mut iterations = 0;
    let mut status = DescentStatus::MaxIterationsExceeded;

    for i in 1..=settings.max_iterations {
        let grad = gradient.evaluate(&f, &current);
        if grad.len() != current.len() {
            bail!(
                "Gradient dimension mismatch. Expected {}, got {}.",
                current.len(),
                grad.len()
            );
        }

        let eta = backtracking_line_search(&f, &current, &grad, settings)?;
        let next = &current - grad * eta;
        let next_value = f(&next);
        if !next_value.is_finite() {
            return Err(SolverError::NonFiniteValue {
                value: next_value,
                iteration: i,
            }
            .into());
        }

        let error = if next_value.abs() > settings.tolerance / 2.0 {
            ((next_value - current_value) / next_value).abs()
        } else {
            (next_value - current_value).abs()
        };

        current = next;
        current_value = next_value;
        iterations = i;

        if error <= settings.tolerance {
            status = DescentStatus::Converged;
            break;
        }
    }

    Ok(DescentResult {
        state: current.as_slice().to_vec(),
        objective: current_value,
        iterations,
        status,
    })
}
