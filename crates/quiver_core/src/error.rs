use thiserror::Error;

/// Typed failures from the iterative numerics. Raised through `anyhow::Error`
/// so callers can downcast when they need to distinguish them from plain
/// input-validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SolverError {
    /// Backtracking exhausted its trial budget without finding a step size
    /// satisfying the sufficient-decrease condition. Usually means the
    /// supplied direction is not a descent direction, or the objective
    /// violates the convexity/Lipschitz precondition.
    #[error("line search failed to satisfy the sufficient-decrease condition after {trials} backtracking trials")]
    LineSearchFailed { trials: usize },

    /// The objective evaluated to NaN or an infinity. Left unchecked this
    /// would make every tolerance comparison false and silently mask
    /// non-convergence.
    #[error("objective evaluated to a non-finite value ({value}) at iteration {iteration}")]
    NonFiniteValue { value: f64, iteration: usize },
}
