//! Error types for solver operations.

use fl_components::ComponentError;
use fl_core::error::FlError;
use fl_core::{ElementId, NodeId, StateVector};
use fl_fluids::FluidError;
use fl_network::NetworkError;
use thiserror::Error;

use crate::model::{BoundaryKind, Stage};

/// Errors that can occur while assembling or solving a model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Node {node} is not a boundary node")]
    NotBoundaryNode { node: NodeId },

    #[error("Node {node} already carries a {existing:?} condition")]
    ConflictingBoundaryCondition { node: NodeId, existing: BoundaryKind },

    #[error("No {kind:?} condition at node {node} to revise")]
    MissingBoundaryCondition { node: NodeId, kind: BoundaryKind },

    #[error("Operation '{operation}' not allowed in stage {stage:?}")]
    WrongStage {
        operation: &'static str,
        stage: Stage,
    },

    #[error("State vector covers {actual} nodes, network has {expected}")]
    StateLength { expected: usize, actual: usize },

    #[error("Element {element} returned {actual} equations for {expected} ports")]
    ElementEquationCount {
        element: ElementId,
        expected: usize,
        actual: usize,
    },

    #[error("Too few equations: {equations} for {unknowns} unknowns")]
    TooFewEquations { equations: usize, unknowns: usize },

    #[error("Too many equations: {equations} for {unknowns} unknowns")]
    TooManyEquations { equations: usize, unknowns: usize },

    #[error("Steady solve did not converge ({reason}) after {iterations} iterations, residual = {residual_norm:e}")]
    ConvergenceFailed {
        reason: &'static str,
        iterations: usize,
        residual_norm: f64,
        /// Last iterate reached by the solver
        state: StateVector,
    },

    #[error("Mass matrix is singular: {what}")]
    SingularMassMatrix { what: &'static str },

    #[error("Eigen decomposition failed: {what}")]
    EigenFailed { what: &'static str },

    #[error("No steady solution available; run steady_solve first")]
    MissingSteadySolution,

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Component error: {0}")]
    Component(#[from] ComponentError),

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Core error: {0}")]
    Core(#[from] FlError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for FlError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::NotBoundaryNode { .. }
            | SolverError::ConflictingBoundaryCondition { .. }
            | SolverError::MissingBoundaryCondition { .. } => FlError::InvalidArg {
                what: "boundary condition",
            },
            SolverError::WrongStage { operation, .. } => FlError::InvalidArg { what: operation },
            SolverError::StateLength { expected, actual } => FlError::IndexOob {
                what: "state vector",
                index: actual,
                len: expected,
            },
            SolverError::ElementEquationCount { .. }
            | SolverError::TooFewEquations { .. }
            | SolverError::TooManyEquations { .. } => FlError::InvalidArg {
                what: "equation count",
            },
            SolverError::ConvergenceFailed { .. } => FlError::InvalidArg {
                what: "convergence",
            },
            SolverError::SingularMassMatrix { what } | SolverError::EigenFailed { what } => {
                FlError::InvalidArg { what }
            }
            SolverError::MissingSteadySolution => FlError::InvalidArg {
                what: "steady solution",
            },
            SolverError::Network(inner) => inner.into(),
            SolverError::Component(inner) => inner.into(),
            SolverError::Fluid(inner) => inner.into(),
            SolverError::Core(inner) => inner,
        }
    }
}
