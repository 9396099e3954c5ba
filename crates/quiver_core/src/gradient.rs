use nalgebra::DVector;

/// Default probe step for `finite_diff_grad`.
pub const DEFAULT_FD_STEP: f64 = 1e-5;

/// Central-difference approximation to the gradient of f: R^n -> R.
///
/// Entry i is (f(x + h*e_i) - f(x - h*e_i)) / (2h), at a cost of 2n
/// evaluations of f. Truncation error is O(h^2) while floating-point
/// cancellation grows like eps/h, so h trades one against the other and is
/// left to the caller. No validation is performed; whatever f does near
/// x +/- h*e_i propagates.
pub fn finite_diff_grad<F>(f: &F, x: &DVector<f64>, h: f64) -> DVector<f64>
where
    F: Fn(&DVector<f64>) -> f64,
{
    let n = x.len();
    let mut grad = DVector::zeros(n);
    let mut probe = x.clone();
    for i in 0..n {
        probe[i] = x[i] + h;
        let ahead = f(&probe);
        probe[i] = x[i] - h;
        let behind = f(&probe);
        probe[i] = x[i];
        grad[i] = (ahead - behind) / (2.0 * h);
    }
    grad
}

/// How gradient descent obtains the gradient of the objective: either a
/// caller-supplied analytic gradient, or a central-difference estimate with
/// an explicit probe step. The choice is made at the call site instead of
/// through an optional parameter.
pub enum Gradient<'a> {
    /// Caller-supplied analytic gradient of the objective.
    Analytic(&'a dyn Fn(&DVector<f64>) -> DVector<f64>),
    /// Estimate via `finite_diff_grad` with the given probe step.
    FiniteDifference { step: f64 },
}

impl Gradient<'_> {
    /// Evaluates the gradient of f at x.
    pub fn evaluate<F>(&self, f: &F, x: &DVector<f64>) -> DVector<f64>
    where
        F: Fn(&DVector<f64>) -> f64,
    {
        match self {
            Gradient::Analytic(gradf) => gradf(x),
            Gradient::FiniteDifference { step } => finite_diff_grad(f, x, *step),
        }
    }
}
