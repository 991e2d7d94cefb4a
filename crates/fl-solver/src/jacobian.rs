//! Finite-difference Jacobians of residual functions.

use crate::error::SolverResult;
use nalgebra::{DMatrix, DVector};

/// Difference scheme for [`jacobian`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difference {
    /// One extra evaluation per column; used inside Newton.
    Forward,
    /// Two evaluations per column, second-order accurate; used to linearize
    /// about an operating point.
    Central,
}

/// Perturbation for column `j`: `epsilon * max(|x_j|, 1)`.
fn step(xj: f64, epsilon: f64) -> f64 {
    epsilon * xj.abs().max(1.0)
}

/// Jacobian of `f` at `x`, one column per entry of `x`.
pub fn jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
    scheme: Difference,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let f_x = f(x)?;
    let mut jac = DMatrix::zeros(f_x.len(), x.len());

    for j in 0..x.len() {
        let dx = step(x[j], epsilon);
        let mut x_plus = x.clone();
        x_plus[j] += dx;

        let df = match scheme {
            Difference::Forward => (f(&x_plus)? - &f_x) / dx,
            Difference::Central => {
                let mut x_minus = x.clone();
                x_minus[j] -= dx;
                (f(&x_plus)? - f(&x_minus)?) / (2.0 * dx)
            }
        };
        jac.set_column(j, &df);
    }

    Ok(jac)
}

/// Forward-difference Jacobian.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    jacobian(x, f, epsilon, Difference::Forward)
}

/// Central-difference Jacobian.
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    jacobian(x, f, epsilon, Difference::Central)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jacobian_linear() {
        // f(x) = 2*x, J = 2
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, 2.0 * x[0]))
        };

        let x = DVector::from_element(1, 3.0);
        let jac = finite_difference_jacobian(&x, f, 1e-7).unwrap();

        assert!((jac[(0, 0)] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn central_beats_forward_on_signed_square() {
        // f(x) = x|x|, J = 2|x|
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0].abs()))
        };

        let x = DVector::from_element(1, -3.0);
        let fwd = jacobian(&x, f, 1e-7, Difference::Forward).unwrap();
        let cen = jacobian(&x, f, 1e-6, Difference::Central).unwrap();

        assert!((fwd[(0, 0)] - 6.0).abs() < 1e-4);
        assert!((cen[(0, 0)] - 6.0).abs() < 1e-7);
    }

    #[test]
    fn rectangular_shape() {
        // f(x, y) = [x + y, x*y, y]
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] + x[1], x[0] * x[1], x[1]]))
        };
        let x = DVector::from_vec(vec![2.0, 5.0]);
        let jac = central_difference_jacobian(&x, f, 1e-6).unwrap();
        assert_eq!(jac.shape(), (3, 2));
        assert!((jac[(1, 0)] - 5.0).abs() < 1e-6);
        assert!((jac[(1, 1)] - 2.0).abs() < 1e-6);
        assert!(jac[(2, 0)].abs() < 1e-9);
    }

    #[test]
    fn step_scales_with_magnitude() {
        assert_eq!(step(0.0, 1e-6), 1e-6);
        assert_eq!(step(-4e5, 1e-6), 4e5 * 1e-6);
    }
}
