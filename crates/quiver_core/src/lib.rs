//! The `quiver_core` crate provides two small numerical engines:
//! fixed-step explicit integrators for first-order systems of ODEs, and an
//! unconstrained minimizer built on gradient descent with backtracking line
//! search.
//!
//! Key components:
//! - **Traits**: `Scalar` (numeric type abstraction), `VectorField` (ODE
//!   right-hand sides), `Steppable` (fixed-step integrators).
//! - **Solvers**: `Euler` and `Rk4` steppers plus the `integrate` driver,
//!   which records the full trajectory on a linear time grid.
//! - **Gradient**: central-difference gradient estimation and the `Gradient`
//!   choice between an analytic gradient and a numerical fallback.
//! - **Descent**: Armijo backtracking line search and the gradient descent
//!   driver with a structured convergence status.

pub mod descent;
pub mod error;
pub mod gradient;
pub mod solvers;
pub mod traits;
