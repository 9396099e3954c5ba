use crate::traits::{Scalar, Steppable, VectorField};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Forward Euler Solver
/// x_{i+1} = x_i + dt * f(t_i, x_i). First order: local truncation error
/// O(dt^2), global error O(dt).
pub struct Euler<T: Scalar> {
    slope: Vec<T>,
}

impl<T: Scalar> Euler<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            slope: vec![T::from_f64(0.0).unwrap(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for Euler<T> {
    fn step(&mut self, system: &impl VectorField<T>, t: &mut T, state: &mut [T], dt: T) {
        let t0 = *t;

        system.apply(t0, state, &mut self.slope);

        for i in 0..state.len() {
            state[i] = state[i] + dt * self.slope[i];
        }

        *t = t0 + dt;
    }
}

/// Classic Runge-Kutta 4th Order Solver
/// Global error O(dt^4).
pub struct Rk4<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    tmp: Vec<T>,
}

impl<T: Scalar> Rk4<T> {
    pub fn new(dim: usize) -> Self {
        let z = T::from_f64(0.0).unwrap();
        Self {
            k1: vec![z; dim],
            k2: vec![z; dim],
            k3: vec![z; dim],
            k4: vec![z; dim],
            tmp: vec![z; dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for Rk4<T> {
    fn step(&mut self, system: &impl VectorField<T>, t: &mut T, state: &mut [T], dt: T) {
        let half = T::from_f64(0.5).unwrap();
        let sixth = T::from_f64(1.0 / 6.0).unwrap();
        let two = T::from_f64(2.0).unwrap();

        let t0 = *t;

        // k1 = f(t, y)
        system.apply(t0, state, &mut self.k1);

        // k2 = f(t + dt/2, y + dt*k1/2)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k1[i] * half;
        }
        system.apply(t0 + dt * half, &self.tmp, &mut self.k2);

        // k3 = f(t + dt/2, y + dt*k2/2)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k2[i] * half;
        }
        system.apply(t0 + dt * half, &self.tmp, &mut self.k3);

        // k4 = f(t + dt, y + dt*k3)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k3[i];
        }
        system.apply(t0 + dt, &self.tmp, &mut self.k4);

        // y_next = y + dt/6 * (k1 + 2k2 + 2k3 + k4)
        for i in 0..state.len() {
            state[i] = state[i]
                + dt * sixth * (self.k1[i] + two * self.k2[i] + two * self.k3[i] + self.k4[i]);
        }

        *t = t0 + dt;
    }
}

/// Selects which fixed-step scheme `integrate` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    Euler,
    Rk4,
}

/// Time-grid configuration for `integrate`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridSettings {
    /// Number of sub-intervals; the trajectory has `steps + 1` rows.
    pub steps: usize,
    /// Start of the integration interval.
    pub t0: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            steps: 1000,
            t0: 0.0,
        }
    }
}

/// Discretized solution of an ODE: `steps + 1` states on the equally spaced
/// time grid from t0 to tn inclusive. Row 0 is the initial state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory<T> {
    pub times: Vec<T>,
    pub states: Vec<Vec<T>>,
}

impl<T: Scalar> Trajectory<T> {
    /// Number of grid points (sub-intervals + 1).
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn initial_state(&self) -> &[T] {
        &self.states[0]
    }

    pub fn final_state(&self) -> &[T] {
        &self.states[self.states.len() - 1]
    }

    pub fn final_time(&self) -> T {
        self.times[self.times.len() - 1]
    }
}

/// Numerically solves x'(t) = f(t, x(t)) over [t0, tn] with a fixed step
/// h = (tn - t0) / steps, recording the state at every grid point.
///
/// Each step is advanced from the grid time rather than an accumulated time,
/// so `times` stays an exactly linear grid. A second-order scalar ODE can be
/// integrated by lifting it to a position-velocity system of dimension 2.
pub fn integrate<T: Scalar>(
    system: &impl VectorField<T>,
    method: Method,
    initial_state: &[T],
    tn: f64,
    settings: GridSettings,
) -> Result<Trajectory<T>> {
    let dim = system.dimension();
    if dim == 0 {
        bail!("System has zero dimension.");
    }
    if initial_state.len() != dim {
        bail!(
            "Initial state dimension mismatch. Expected {}, got {}.",
            dim,
            initial_state.len()
        );
    }
    if settings.steps == 0 {
        bail!("steps must be greater than zero.");
    }

    let n = settings.steps;
    let t0 = T::from_f64(settings.t0).unwrap();
    let tn = T::from_f64(tn).unwrap();
    let h = (tn - t0) / T::from_usize(n).unwrap();

    let mut times = Vec::with_capacity(n + 1);
    for i in 0..=n {
        times.push(t0 + T::from_usize(i).unwrap() * h);
    }

    let states = match method {
        Method::Euler => run_steps(Euler::new(dim), system, &times, initial_state, h),
        Method::Rk4 => run_steps(Rk4::new(dim), system, &times, initial_state, h),
    };

    Ok(Trajectory { times, states })
}

fn run_steps<T: Scalar, S: Steppable<T>>(
    mut stepper: S,
    system: &impl VectorField<T>,
    times: &[T],
    initial_state: &[T],
    h: T,
) -> Vec<Vec<T>> {
    let mut states = Vec::with_capacity(times.len());
    let mut state = initial_state.to_vec();
    states.push(state.clone());

    for i in 0..times.len() - 1 {
        let mut t = times[i];
        stepper.step(system, &mut t, &mut state, h);
        states.push(state.clone());
    }

    states
}

#[cfg(test)]
mod tests {
    use super::{integrate, GridSettings, Method, Trajectory};
    use crate::traits::{FnField, VectorField};

    /// x' = rate * x, closed form x(t) = x0 * exp(rate * t).
    #[derive(Clone, Copy)]
    struct LinearGrowth {
        rate: f64,
    }

    impl VectorField<f64> for LinearGrowth {
        fn dimension(&self) -> usize {
            1
        }

        fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
            out[0] = self.rate * x[0];
        }
    }

    fn assert_err_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    fn exp_error(method: Method, steps: usize) -> f64 {
        let system = LinearGrowth { rate: 1.0 };
        let settings = GridSettings {
            steps,
            ..GridSettings::default()
        };
        let trajectory =
            integrate(&system, method, &[1.0], 1.0, settings).expect("integration should succeed");
        (trajectory.final_state()[0] - 1.0_f64.exp()).abs()
    }

    #[test]
    fn both_methods_approximate_the_exponential() {
        assert!(exp_error(Method::Euler, 1000) < 2e-3);
        assert!(exp_error(Method::Rk4, 1000) < 1e-10);
    }

    #[test]
    fn rk4_is_more_accurate_than_euler_at_equal_steps() {
        assert!(exp_error(Method::Rk4, 1000) < exp_error(Method::Euler, 1000));
    }

    #[test]
    fn euler_error_scales_linearly_in_step_size() {
        let coarse = exp_error(Method::Euler, 100);
        let fine = exp_error(Method::Euler, 200);
        let ratio = coarse / fine;
        assert!(
            (1.5..2.5).contains(&ratio),
            "expected ~2x error reduction, got {ratio}"
        );
    }

    #[test]
    fn rk4_error_scales_with_fourth_power_of_step_size() {
        let coarse = exp_error(Method::Rk4, 10);
        let fine = exp_error(Method::Rk4, 20);
        let ratio = coarse / fine;
        assert!(
            (10.0..30.0).contains(&ratio),
            "expected ~16x error reduction, got {ratio}"
        );
    }

    #[test]
    fn trajectory_has_steps_plus_one_rows_on_a_linear_grid() {
        let system = LinearGrowth { rate: 1.0 };
        let settings = GridSettings { steps: 17, t0: 0.5 };
        let trajectory = integrate(&system, Method::Euler, &[2.0], 2.0, settings)
            .expect("integration should succeed");

        assert_eq!(trajectory.len(), 18);
        assert_eq!(trajectory.initial_state(), &[2.0]);
        assert_eq!(trajectory.times[0], 0.5);
        assert!((trajectory.final_time() - 2.0).abs() < 1e-12);

        let h = (2.0 - 0.5) / 17.0;
        for (i, t) in trajectory.times.iter().enumerate() {
            assert!((t - (0.5 + i as f64 * h)).abs() < 1e-12);
        }
    }

    #[test]
    fn integration_backwards_in_time_is_allowed() {
        let system = LinearGrowth { rate: 1.0 };
        let settings = GridSettings {
            steps: 1000,
            t0: 1.0,
        };
        let trajectory = integrate(&system, Method::Rk4, &[1.0_f64.exp()], 0.0, settings)
            .expect("integration should succeed");
        assert!((trajectory.final_state()[0] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn repeated_integration_is_deterministic() {
        let system = LinearGrowth { rate: -0.7 };
        let settings = GridSettings::default();
        let a: Trajectory<f64> = integrate(&system, Method::Rk4, &[1.0], 1.0, settings)
            .expect("integration should succeed");
        let b = integrate(&system, Method::Rk4, &[1.0], 1.0, settings)
            .expect("integration should succeed");
        assert_eq!(a.times, b.times);
        assert_eq!(a.states, b.states);
    }

    #[test]
    fn integrate_rejects_invalid_inputs() {
        let system = LinearGrowth { rate: 1.0 };
        assert_err_contains(
            integrate(
                &system,
                Method::Euler,
                &[1.0, 2.0],
                1.0,
                GridSettings::default(),
            ),
            "dimension mismatch",
        );
        assert_err_contains(
            integrate(
                &system,
                Method::Euler,
                &[1.0],
                1.0,
                GridSettings { steps: 0, t0: 0.0 },
            ),
            "steps must be greater than zero",
        );

        let empty = FnField::new(0, |_t: f64, _x: &[f64], _out: &mut [f64]| {});
        assert_err_contains(
            integrate(&empty, Method::Rk4, &[], 1.0, GridSettings::default()),
            "zero dimension",
        );
    }

    #[test]
    fn second_order_ode_via_position_velocity_lifting() {
        // x'' = -x lifted to (r, v): r' = v, v' = -r. With r(0) = 1,
        // v(0) = 0 the solution is r(t) = cos(t), so r(pi) = -1, v(pi) = 0.
        let oscillator = FnField::new(2, |_t: f64, x: &[f64], out: &mut [f64]| {
            out[0] = x[1];
            out[1] = -x[0];
        });
        let trajectory = integrate(
            &oscillator,
            Method::Rk4,
            &[1.0, 0.0],
            std::f64::consts::PI,
            GridSettings::default(),
        )
        .expect("integration should succeed");

        let last = trajectory.final_state();
        assert!((last[0] + 1.0).abs() < 1e-8);
        assert!(last[1].abs() < 1e-8);
    }
}
