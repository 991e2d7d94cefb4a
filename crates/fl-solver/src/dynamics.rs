//! Linearization about the steady operating point.
//!
//! Rows follow the steady residual order. `C` is the residual Jacobian at
//! the steady state, `M` and `K` collect the elements' storage and stiffness
//! terms. Boundary rows only carry an identity entry on the prescribed
//! variable.

use fl_components::{ElementKind, FlowElement, RowTerms, Var};
use fl_core::error::FlError;
use fl_core::StateVector;
use fl_network::{MeshedElement, Ported};
use nalgebra::{Complex, DMatrix, DVector};
use tracing::{debug, warn};

use crate::error::{SolverError, SolverResult};
use crate::jacobian::central_difference_jacobian;
use crate::modal::{Mode, quadratic_modes};
use crate::model::{BoundaryKind, Model};

/// Global `M`, `C`, `K` over the full `2 × nodes` state.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicsMatrices {
    pub mass: DMatrix<f64>,
    pub damping: DMatrix<f64>,
    pub stiffness: DMatrix<f64>,
    /// Number of leading element rows; boundary rows follow.
    pub element_rows: usize,
    /// Flat indices of boundary-prescribed variables.
    pub prescribed: Vec<usize>,
}

impl DynamicsMatrices {
    pub fn size(&self) -> usize {
        self.mass.nrows()
    }

    /// Free indices, the complement of `prescribed`.
    pub fn free(&self) -> Vec<usize> {
        (0..self.size())
            .filter(|i| !self.prescribed.contains(i))
            .collect()
    }

    /// `(M, C, K)` with boundary rows and prescribed columns removed.
    pub fn reduced(&self) -> (DMatrix<f64>, DMatrix<f64>, DMatrix<f64>) {
        let rows: Vec<usize> = (0..self.element_rows).collect();
        let cols = self.free();
        let cut = |m: &DMatrix<f64>| m.select_rows(&rows).select_columns(&cols);
        (cut(&self.mass), cut(&self.damping), cut(&self.stiffness))
    }
}

fn accumulate(
    target: &mut DMatrix<f64>,
    row: usize,
    terms: &RowTerms,
    element: &MeshedElement<ElementKind>,
    node_count: usize,
) -> SolverResult<()> {
    let expected = element.payload.port_count();
    if terms.len() != expected {
        return Err(SolverError::ElementEquationCount {
            element: element.id,
            expected,
            actual: terms.len(),
        });
    }
    let size = target.ncols();
    for (i, row_terms) in terms.iter().enumerate() {
        for term in row_terms {
            let col = term.var.flat_index(node_count);
            if col >= size {
                return Err(FlError::IndexOob {
                    what: "dynamics term",
                    index: col,
                    len: size,
                }
                .into());
            }
            target[(row + i, col)] += term.coeff;
        }
    }
    Ok(())
}

impl Model<'_> {
    /// Local Jacobian of one element over its own port variables.
    fn element_damping(
        &self,
        element: &MeshedElement<ElementKind>,
        steady: &StateVector,
    ) -> SolverResult<(Vec<usize>, DMatrix<f64>)> {
        let node_count = steady.node_count();
        let cols: Vec<usize> = element
            .ports
            .iter()
            .flat_map(|&n| [Var::Pressure(n), Var::MassFlow(n)])
            .map(|v| v.flat_index(node_count))
            .collect();
        let base = steady.to_flat();
        let x0 = DVector::from_iterator(cols.len(), cols.iter().map(|&c| base[c]));

        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            let mut flat = base.clone();
            for (&c, &v) in cols.iter().zip(x.iter()) {
                flat[c] = v;
            }
            let state = StateVector::from_flat(&flat)?;
            Ok(DVector::from_vec(self.element_residuals(element, &state)?))
        };
        let jac = central_difference_jacobian(&x0, f, self.eigen.fd_epsilon)?;
        Ok((cols, jac))
    }

    /// Assemble `M`, `C`, `K` at the steady solution.
    pub fn build_dynamics_matrices(&mut self) -> SolverResult<&DynamicsMatrices> {
        let steady = self.require_steady()?;
        let network = self.network();
        let node_count = network.node_count();
        let size = self.state_size();

        let mut mass = DMatrix::zeros(size, size);
        let mut damping = DMatrix::zeros(size, size);
        let mut stiffness = DMatrix::zeros(size, size);

        let mut row = 0;
        for element in network.elements() {
            let fluid = self.fluid_for(element.id);
            let (cols, jac) = self.element_damping(element, steady)?;
            for i in 0..jac.nrows() {
                for (j, &c) in cols.iter().enumerate() {
                    damping[(row + i, c)] += jac[(i, j)];
                }
            }
            let storage = element.payload.storage_terms(&element.ports, fluid)?;
            accumulate(&mut mass, row, &storage, element, node_count)?;
            let springs = element.payload.stiffness_terms(&element.ports, fluid)?;
            accumulate(&mut stiffness, row, &springs, element, node_count)?;
            row += element.payload.port_count();
        }

        let element_rows = row;
        let mut prescribed = Vec::new();
        for (node, kind, _) in self.boundary_conditions() {
            let var = match kind {
                BoundaryKind::Pressure => Var::Pressure(node),
                BoundaryKind::FlowRate => Var::MassFlow(node),
            };
            let col = var.flat_index(node_count);
            damping[(row, col)] = 1.0;
            prescribed.push(col);
            row += 1;
        }

        debug!(
            size,
            element_rows,
            prescribed = prescribed.len(),
            "assembled dynamics matrices"
        );
        let matrices = DynamicsMatrices {
            mass,
            damping,
            stiffness,
            element_rows,
            prescribed,
        };
        self.modes.clear();
        Ok(&*self.dynamics.insert(matrices))
    }

    pub fn dynamics_matrices(&self) -> Option<&DynamicsMatrices> {
        self.dynamics.as_ref()
    }

    /// Eigenmodes of the linearized network, assembling the matrices first
    /// if needed.
    pub fn eigen_solve(&mut self) -> SolverResult<&[Mode]> {
        if self.dynamics.is_none() {
            self.build_dynamics_matrices()?;
        }
        let dynamics = self
            .dynamics
            .as_ref()
            .ok_or(SolverError::MissingSteadySolution)?;
        let (m, c, k) = dynamics.reduced();
        let modes = quadratic_modes(&m, &c, &k, &self.eigen)?;
        for mode in modes.iter().filter(|mode| mode.unstable) {
            warn!(
                frequency_hz = mode.frequency_hz,
                growth = mode.eigenvalue.re,
                "unstable mode"
            );
        }
        self.modes = modes;
        Ok(&self.modes)
    }

    /// Modes from the last `eigen_solve`.
    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    /// Complex eigenvalues [rad/s].
    pub fn eigenvalues(&self) -> Vec<Complex<f64>> {
        self.modes.iter().map(|m| m.eigenvalue).collect()
    }

    /// `|λ| / 2π` per mode [Hz].
    pub fn natural_frequencies(&self) -> Vec<f64> {
        self.modes.iter().map(|m| m.frequency_hz).collect()
    }
}
