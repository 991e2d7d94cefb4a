//! Damped Newton solver with backtracking line search.

use crate::error::SolverResult;
use nalgebra::{DMatrix, DVector};
use tracing::{debug, trace};

/// Newton solver configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance for residual norm
    pub abs_tol: f64,
    /// Relative tolerance for residual norm
    pub rel_tol: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
    /// Relative step for the finite-difference Jacobian
    pub fd_epsilon: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            abs_tol: 1e-6,
            rel_tol: 1e-10,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
            fd_epsilon: 1e-7,
        }
    }
}

/// Why the iteration stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    Converged,
    MaxIterations,
    /// Line search could no longer make progress.
    Stagnated,
    SingularJacobian,
}

impl Termination {
    pub fn describe(self) -> &'static str {
        match self {
            Termination::Converged => "converged",
            Termination::MaxIterations => "maximum iterations reached",
            Termination::Stagnated => "line search stagnated",
            Termination::SingularJacobian => "singular Jacobian",
        }
    }
}

/// Newton iteration result.
///
/// Returned whether or not the iteration converged; `x` is always the last
/// accepted iterate.
#[derive(Clone, Debug)]
pub struct NewtonResult {
    /// Solution vector
    pub x: DVector<f64>,
    /// Final residual norm
    pub residual_norm: f64,
    /// Number of iterations
    pub iterations: usize,
    pub termination: Termination,
}

impl NewtonResult {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

/// Newton solver with backtracking line search.
///
/// Errors from the residual or Jacobian closures propagate; failure to
/// converge does not, it is reported through `termination`.
pub fn newton_solve<F, J>(
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
    J: Fn(&DVector<f64>) -> SolverResult<DMatrix<f64>>,
{
    let mut x = x0;
    let mut r = residual_fn(&x)?;
    let mut r_norm = r.norm();
    let r0_norm = r_norm;

    let finish = |x, residual_norm, iterations, termination| NewtonResult {
        x,
        residual_norm,
        iterations,
        termination,
    };

    for iter in 0..config.max_iterations {
        if r_norm < config.abs_tol || r_norm < config.rel_tol * r0_norm {
            debug!(iterations = iter, residual = r_norm, "newton converged");
            return Ok(finish(x, r_norm, iter, Termination::Converged));
        }

        let jac = jacobian_fn(&x)?;

        // Solve J * dx = -r
        let Some(dx) = jac.lu().solve(&(-&r)) else {
            return Ok(finish(x, r_norm, iter, Termination::SingularJacobian));
        };

        let mut alpha = 1.0;
        let mut x_new = &x + &dx;
        let mut r_new = residual_fn(&x_new)?;
        let mut r_new_norm = r_new.norm();

        for _ in 0..config.max_line_search_iters {
            if r_new_norm.is_finite() && r_new_norm < r_norm {
                break;
            }
            alpha *= config.line_search_beta;
            x_new = &x + alpha * &dx;
            r_new = residual_fn(&x_new)?;
            r_new_norm = r_new.norm();
        }

        trace!(iteration = iter, alpha, residual = r_new_norm, "newton step");

        if !r_new_norm.is_finite() || r_new_norm >= r_norm {
            return Ok(finish(x, r_norm, iter + 1, Termination::Stagnated));
        }

        x = x_new;
        r = r_new;
        r_norm = r_new_norm;
    }

    if r_norm < config.abs_tol || r_norm < config.rel_tol * r0_norm {
        return Ok(finish(x, r_norm, config.max_iterations, Termination::Converged));
    }
    Ok(finish(
        x,
        r_norm,
        config.max_iterations,
        Termination::MaxIterations,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_quadratic() {
        // Solve x^2 - 4 = 0 from x = 3
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let x0 = DVector::from_element(1, 3.0);
        let result = newton_solve(x0, residual, jacobian, &NewtonConfig::default()).unwrap();

        assert!(result.converged());
        assert!((result.x[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn no_root_reports_last_iterate() {
        // x^2 + 1 has no real root
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] + 1.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let x0 = DVector::from_element(1, 0.5);
        let result = newton_solve(x0, residual, jacobian, &NewtonConfig::default()).unwrap();

        assert!(!result.converged());
        assert!(result.residual_norm >= 1.0);
    }

    #[test]
    fn singular_jacobian_is_reported() {
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let jacobian =
            |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> { Ok(DMatrix::zeros(1, 1)) };

        let x0 = DVector::from_element(1, 1.0);
        let result = newton_solve(x0, residual, jacobian, &NewtonConfig::default()).unwrap();

        assert_eq!(result.termination, Termination::SingularJacobian);
        assert_eq!(result.x[0], 1.0);
    }
}
