//! Modal analysis of `M ẍ + C ẋ + K x = 0`.
//!
//! The mass matrix of a feed network is usually singular: continuity rows of
//! elements without compliance (orifices, lossless junctions) carry no
//! storage. Such systems are differential-algebraic. The pencil is
//! equilibrated, split by an SVD of the mass matrix into its range and null
//! space, and the algebraic part is condensed out before the real Schur
//! decomposition.

use std::f64::consts::PI;

use nalgebra::{Complex, DMatrix, Schur};
use tracing::debug;

use crate::error::{SolverError, SolverResult};

/// Configuration for the eigen-analysis.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EigenConfig {
    /// Singular values below `rank_tol * σ_max` count as zero.
    pub rank_tol: f64,
    /// Iteration cap for the Schur decomposition
    pub max_schur_iterations: usize,
    /// Eigenvalues with smaller magnitude are dropped as trivial.
    pub zero_mode_tol: f64,
    /// Relative step for the central-difference linearization
    pub fd_epsilon: f64,
}

impl Default for EigenConfig {
    fn default() -> Self {
        Self {
            rank_tol: 1e-10,
            max_schur_iterations: 10_000,
            zero_mode_tol: 1e-9,
            fd_epsilon: 1e-6,
        }
    }
}

/// One eigenmode of the linearized system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mode {
    /// Complex eigenvalue [rad/s]
    pub eigenvalue: Complex<f64>,
    /// `|λ| / 2π` [Hz]
    pub frequency_hz: f64,
    /// `-Re λ / |λ|`
    pub damping_ratio: f64,
    /// Positive real part: the perturbation grows.
    pub unstable: bool,
}

impl Mode {
    pub fn new(eigenvalue: Complex<f64>) -> Self {
        let magnitude = eigenvalue.norm();
        let damping_ratio = if magnitude > 0.0 {
            -eigenvalue.re / magnitude
        } else {
            0.0
        };
        Self {
            eigenvalue,
            frequency_hz: magnitude / (2.0 * PI),
            damping_ratio,
            unstable: eigenvalue.re > 0.0,
        }
    }

    pub fn is_stable(&self) -> bool {
        !self.unstable
    }
}

/// Eigenmodes of `M ẍ + C ẋ + K x = 0`, sorted by frequency.
///
/// With `K = 0` the `n` trivial roots of `λ (λ M + C)` are skipped and
/// `λ M z = -C z` is solved directly; otherwise the first-order companion
/// form is used.
pub fn quadratic_modes(
    mass: &DMatrix<f64>,
    damping: &DMatrix<f64>,
    stiffness: &DMatrix<f64>,
    config: &EigenConfig,
) -> SolverResult<Vec<Mode>> {
    let n = mass.nrows();
    if mass.shape() != (n, n) || damping.shape() != (n, n) || stiffness.shape() != (n, n) {
        return Err(SolverError::EigenFailed {
            what: "matrices must be square and of equal size",
        });
    }
    if n == 0 {
        return Ok(Vec::new());
    }

    let (a, b) = if stiffness.iter().all(|v| *v == 0.0) {
        (-damping, mass.clone())
    } else {
        let mut a = DMatrix::zeros(2 * n, 2 * n);
        a.view_mut((0, n), (n, n)).fill_with_identity();
        a.view_mut((n, 0), (n, n)).copy_from(&(-stiffness));
        a.view_mut((n, n), (n, n)).copy_from(&(-damping));
        let mut b = DMatrix::zeros(2 * n, 2 * n);
        b.view_mut((0, 0), (n, n)).fill_with_identity();
        b.view_mut((n, n), (n, n)).copy_from(mass);
        (a, b)
    };

    let eigenvalues = pencil_eigenvalues(a, b, config)?;
    let mut modes: Vec<Mode> = eigenvalues
        .into_iter()
        .filter(|l| l.norm() >= config.zero_mode_tol)
        .map(Mode::new)
        .collect();
    modes.sort_by(|x, y| {
        x.frequency_hz
            .total_cmp(&y.frequency_hz)
            .then(x.eigenvalue.im.total_cmp(&y.eigenvalue.im))
    });
    debug!(modes = modes.len(), "modal analysis complete");
    Ok(modes)
}

/// Finite eigenvalues of the pencil `λ B z = A z`.
pub fn pencil_eigenvalues(
    a: DMatrix<f64>,
    b: DMatrix<f64>,
    config: &EigenConfig,
) -> SolverResult<Vec<Complex<f64>>> {
    let (a, b) = equilibrate(a, b);

    let svd = b.svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Err(SolverError::EigenFailed {
            what: "SVD of the mass matrix",
        });
    };
    let sigma = svd.singular_values;
    let sigma_max = sigma.iter().copied().fold(0.0, f64::max);
    let (range, null): (Vec<usize>, Vec<usize>) =
        (0..sigma.len()).partition(|&i| sigma[i] > config.rank_tol * sigma_max);

    if range.is_empty() {
        return Err(SolverError::SingularMassMatrix {
            what: "mass matrix has rank zero",
        });
    }

    // Rotate so the mass matrix becomes diag(Σ1, 0).
    let a_rot = u.transpose() * a * v_t.transpose();
    let a11 = a_rot.select_rows(&range).select_columns(&range);

    let mut h = if null.is_empty() {
        a11
    } else {
        let a12 = a_rot.select_rows(&range).select_columns(&null);
        let a21 = a_rot.select_rows(&null).select_columns(&range);
        let a22 = a_rot.select_rows(&null).select_columns(&null);

        let s22 = a22.singular_values();
        let s_max = s22.iter().copied().fold(0.0, f64::max);
        let s_min = s22.iter().copied().fold(f64::INFINITY, f64::min);
        if s_max == 0.0 || s_min <= config.rank_tol * s_max {
            return Err(SolverError::SingularMassMatrix {
                what: "algebraic constraints are not index-1",
            });
        }
        let x = a22.lu().solve(&a21).ok_or(SolverError::SingularMassMatrix {
            what: "algebraic constraints are not index-1",
        })?;
        a11 - a12 * x
    };

    for (row, &i) in range.iter().enumerate() {
        let s = sigma[i];
        h.row_mut(row).scale_mut(1.0 / s);
    }

    debug!(
        size = a_rot.nrows(),
        rank = range.len(),
        "reduced pencil to standard eigenproblem"
    );

    let schur = Schur::try_new(h, f64::EPSILON, config.max_schur_iterations).ok_or(
        SolverError::EigenFailed {
            what: "Schur decomposition did not converge",
        },
    )?;
    Ok(schur.complex_eigenvalues().iter().copied().collect())
}

/// Row then column scaling so the mass entries are of order one.
///
/// Rows and columns with storage are scaled by their largest `B` entry,
/// purely algebraic ones by their largest `A` entry. The eigenvalues of the
/// pencil are unchanged.
fn equilibrate(mut a: DMatrix<f64>, mut b: DMatrix<f64>) -> (DMatrix<f64>, DMatrix<f64>) {
    let scale = |b_max: f64, a_max: f64| {
        if b_max > 0.0 {
            1.0 / b_max
        } else if a_max > 0.0 {
            1.0 / a_max
        } else {
            1.0
        }
    };

    for i in 0..a.nrows() {
        let s = scale(b.row(i).amax(), a.row(i).amax());
        a.row_mut(i).scale_mut(s);
        b.row_mut(i).scale_mut(s);
    }
    for j in 0..a.ncols() {
        let s = scale(b.column(j).amax(), a.column(j).amax());
        a.column_mut(j).scale_mut(s);
        b.column_mut(j).scale_mut(s);
    }
    (a, b)
}
