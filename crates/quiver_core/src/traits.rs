use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as scalars by the integrators.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A time-dependent vector field f(t, x), the right-hand side of the ODE
/// x'(t) = f(t, x(t)).
pub trait VectorField<T: Scalar> {
    /// Returns the dimension of the state space.
    fn dimension(&self) -> usize;

    /// Evaluates the field.
    /// t: current time
    /// x: current state
    /// out: buffer to write f(t, x) into
    fn apply(&self, t: T, x: &[T], out: &mut [T]);
}

/// A trait for solvers that can step a system forward.
pub trait Steppable<T: Scalar> {
    /// Performs one step of size dt.
    /// t: current time (updated after step)
    /// state: current state (updated after step)
    /// dt: step size
    fn step(&mut self, system: &impl VectorField<T>, t: &mut T, state: &mut [T], dt: T);
}

/// Adapts a plain closure `f(t, x, out)` into a [`VectorField`] with a stated
/// dimension, so callers do not need to define a struct per system.
pub struct FnField<F> {
    dim: usize,
    f: F,
}

impl<F> FnField<F> {
    pub fn new(dim: usize, f: F) -> Self {
        Self { dim, f }
    }
}

impl<T: Scalar, F: Fn(T, &[T], &mut [T])> VectorField<T> for FnField<F> {
    fn dimension(&self) -> usize {
        self.dim
    }

    fn apply(&self, t: T, x: &[T], out: &mut [T]) {
        (self.f)(t, x, out)
    }
}
