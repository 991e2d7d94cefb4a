//! Steady-state model over a meshed network.
//!
//! Unknowns are one pressure and one mass flow per node, laid out as
//! `[pressures, mass_flows]`. Element residuals come first, in network
//! order, followed by one constraint row per boundary condition in node
//! order, so a network with exactly one condition per boundary node gives a
//! square system.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use fl_components::{ElementKind, FlowElement, RangeWarning};
use fl_core::numeric::ensure_finite;
use fl_core::units::{MassRate, Pressure};
use fl_core::{ElementId, NodeId, StateVector};
use fl_fluids::FluidState;
use fl_network::{MeshedElement, Network, NetworkError, Ported};
use nalgebra::DVector;
use tracing::{debug, warn};

use crate::dynamics::DynamicsMatrices;
use crate::error::{SolverError, SolverResult};
use crate::jacobian::finite_difference_jacobian;
use crate::modal::{EigenConfig, Mode};
use crate::newton::{NewtonConfig, newton_solve};
use crate::report::SteadyReport;

/// Lifecycle of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    Unbuilt,
    BoundaryConditionsAssigned,
    SystemAssembled,
    Solved,
}

/// Quantity prescribed at a boundary node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundaryKind {
    /// Pressure [Pa]
    Pressure,
    /// Mass flow [kg/s]
    FlowRate,
}

/// A range warning raised by one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementWarning {
    pub element: ElementId,
    pub name: String,
    pub warning: RangeWarning,
}

impl fmt::Display for ElementWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.warning)
    }
}

/// Steady and frequency-domain model of a feed network.
///
/// Holds the network by reference and never changes its topology.
#[derive(Debug)]
pub struct Model<'a> {
    network: &'a Network<ElementKind>,
    fluid: FluidState,
    element_fluids: HashMap<ElementId, FluidState>,
    p_bc: BTreeMap<NodeId, f64>,
    mdot_bc: BTreeMap<NodeId, f64>,
    stage: Stage,
    newton: NewtonConfig,
    pub(crate) eigen: EigenConfig,
    steady: Option<StateVector>,
    pub(crate) dynamics: Option<DynamicsMatrices>,
    pub(crate) modes: Vec<Mode>,
    warnings: Vec<ElementWarning>,
}

impl<'a> Model<'a> {
    /// `fluid` is used by every element without its own assignment.
    pub fn new(network: &'a Network<ElementKind>, fluid: FluidState) -> Self {
        Self {
            network,
            fluid,
            element_fluids: HashMap::new(),
            p_bc: BTreeMap::new(),
            mdot_bc: BTreeMap::new(),
            stage: Stage::Unbuilt,
            newton: NewtonConfig::default(),
            eigen: EigenConfig::default(),
            steady: None,
            dynamics: None,
            modes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_newton_config(mut self, config: NewtonConfig) -> Self {
        self.newton = config;
        self
    }

    pub fn with_eigen_config(mut self, config: EigenConfig) -> Self {
        self.eigen = config;
        self
    }

    pub fn network(&self) -> &'a Network<ElementKind> {
        self.network
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// `2 × node count`
    pub fn state_size(&self) -> usize {
        2 * self.network.node_count()
    }

    /// Give one element a fluid other than the model-wide one.
    pub fn set_element_fluid(&mut self, element: ElementId, fluid: FluidState) -> SolverResult<()> {
        if self.network.element(element).is_none() {
            return Err(NetworkError::UnknownElement { element }.into());
        }
        fluid.validate()?;
        self.element_fluids.insert(element, fluid);
        self.invalidate_solution();
        Ok(())
    }

    pub fn fluid_for(&self, element: ElementId) -> &FluidState {
        self.element_fluids.get(&element).unwrap_or(&self.fluid)
    }

    /// Prescribe `value` (Pa or kg/s) at a boundary node.
    ///
    /// Allowed before the system is assembled. Re-adding the same kind
    /// replaces the value; a node may not carry both kinds.
    pub fn add_boundary_condition(
        &mut self,
        kind: BoundaryKind,
        node: NodeId,
        value: f64,
    ) -> SolverResult<()> {
        if !matches!(
            self.stage,
            Stage::Unbuilt | Stage::BoundaryConditionsAssigned
        ) {
            return Err(SolverError::WrongStage {
                operation: "add_boundary_condition",
                stage: self.stage,
            });
        }
        if !self.network.is_boundary(node) {
            return Err(SolverError::NotBoundaryNode { node });
        }
        let value = ensure_finite(value, "boundary condition")?;
        let (target, other, other_kind) = match kind {
            BoundaryKind::Pressure => (&mut self.p_bc, &self.mdot_bc, BoundaryKind::FlowRate),
            BoundaryKind::FlowRate => (&mut self.mdot_bc, &self.p_bc, BoundaryKind::Pressure),
        };
        if other.contains_key(&node) {
            return Err(SolverError::ConflictingBoundaryCondition {
                node,
                existing: other_kind,
            });
        }
        target.insert(node, value);
        self.stage = Stage::BoundaryConditionsAssigned;
        Ok(())
    }

    pub fn add_pressure_bc(&mut self, node: NodeId, p: Pressure) -> SolverResult<()> {
        self.add_boundary_condition(BoundaryKind::Pressure, node, p.value)
    }

    pub fn add_flow_bc(&mut self, node: NodeId, mdot: MassRate) -> SolverResult<()> {
        self.add_boundary_condition(BoundaryKind::FlowRate, node, mdot.value)
    }

    /// Change an existing condition at any stage. A solved model drops its
    /// solution and returns to `SystemAssembled`.
    pub fn revise_boundary_condition(
        &mut self,
        kind: BoundaryKind,
        node: NodeId,
        value: f64,
    ) -> SolverResult<()> {
        let value = ensure_finite(value, "boundary condition")?;
        let target = match kind {
            BoundaryKind::Pressure => &mut self.p_bc,
            BoundaryKind::FlowRate => &mut self.mdot_bc,
        };
        let slot = target
            .get_mut(&node)
            .ok_or(SolverError::MissingBoundaryCondition { node, kind })?;
        *slot = value;
        self.invalidate_solution();
        Ok(())
    }

    /// The condition at `node`, if any.
    pub fn boundary_condition(&self, node: NodeId) -> Option<(BoundaryKind, f64)> {
        self.p_bc
            .get(&node)
            .map(|&v| (BoundaryKind::Pressure, v))
            .or_else(|| self.mdot_bc.get(&node).map(|&v| (BoundaryKind::FlowRate, v)))
    }

    /// All conditions in node order.
    pub fn boundary_conditions(&self) -> Vec<(NodeId, BoundaryKind, f64)> {
        self.network
            .nodes()
            .iter()
            .filter_map(|n| self.boundary_condition(n.id).map(|(k, v)| (n.id, k, v)))
            .collect()
    }

    fn boundary_condition_count(&self) -> usize {
        self.p_bc.len() + self.mdot_bc.len()
    }

    /// Fail unless the residual count equals the state size.
    pub fn check_equation_count(&self) -> SolverResult<()> {
        let equations = self.network.port_count() + self.boundary_condition_count();
        let unknowns = self.state_size();
        if equations < unknowns {
            Err(SolverError::TooFewEquations {
                equations,
                unknowns,
            })
        } else if equations > unknowns {
            Err(SolverError::TooManyEquations {
                equations,
                unknowns,
            })
        } else {
            Ok(())
        }
    }

    /// Residuals of one element, checked against its port count.
    pub(crate) fn element_residuals(
        &self,
        element: &MeshedElement<ElementKind>,
        state: &StateVector,
    ) -> SolverResult<Vec<f64>> {
        let r = element.payload.steady_flow_eqns(
            &element.ports,
            state,
            self.fluid_for(element.id),
        )?;
        let expected = element.payload.port_count();
        if r.len() != expected {
            return Err(SolverError::ElementEquationCount {
                element: element.id,
                expected,
                actual: r.len(),
            });
        }
        Ok(r)
    }

    /// Full residual vector at `state`.
    pub fn residuals(&self, state: &StateVector) -> SolverResult<Vec<f64>> {
        let nodes = self.network.node_count();
        if state.node_count() != nodes {
            return Err(SolverError::StateLength {
                expected: nodes,
                actual: state.node_count(),
            });
        }
        self.check_equation_count()?;

        let mut r = Vec::with_capacity(self.state_size());
        for element in self.network.elements() {
            r.extend(self.element_residuals(element, state)?);
        }
        for (node, kind, value) in self.boundary_conditions() {
            let x = match kind {
                BoundaryKind::Pressure => state.pressure(node)?,
                BoundaryKind::FlowRate => state.mass_flow(node)?,
            };
            r.push(x - value);
        }
        Ok(r)
    }

    /// Assemble the steady residuals at `state` and mark the system
    /// assembled. Count mismatches are reported before any element is
    /// evaluated.
    pub fn build_steady_system(&mut self, state: &StateVector) -> SolverResult<Vec<f64>> {
        let r = self.residuals(state)?;
        self.collect_warnings();
        if matches!(
            self.stage,
            Stage::Unbuilt | Stage::BoundaryConditionsAssigned
        ) {
            self.stage = Stage::SystemAssembled;
        }
        debug!(equations = r.len(), "assembled steady system");
        Ok(r)
    }

    fn collect_warnings(&mut self) {
        self.warnings = self
            .network
            .elements()
            .iter()
            .flat_map(|e| {
                e.payload.domain_warnings().into_iter().map(|w| ElementWarning {
                    element: e.id,
                    name: e.name.clone(),
                    warning: w,
                })
            })
            .collect();
        for w in &self.warnings {
            warn!(element = %w.name, warning = %w.warning, "correlation out of range");
        }
    }

    /// Range warnings gathered at the last assembly.
    pub fn warnings(&self) -> &[ElementWarning] {
        &self.warnings
    }

    /// Solve `f(x) = 0` by Newton iteration from an all-ones guess.
    ///
    /// Non-convergence is an error carrying the last iterate.
    pub fn steady_solve(&mut self) -> SolverResult<&StateVector> {
        let guess = StateVector::filled(self.network.node_count(), 1.0);
        self.build_steady_system(&guess)?;

        let result = {
            let this = &*self;
            let residual_fn = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
                let state = StateVector::from_flat(x.as_slice())?;
                Ok(DVector::from_vec(this.residuals(&state)?))
            };
            let eps = this.newton.fd_epsilon;
            let jacobian_fn = |x: &DVector<f64>| finite_difference_jacobian(x, &residual_fn, eps);
            newton_solve(
                DVector::from_vec(guess.to_flat()),
                &residual_fn,
                jacobian_fn,
                &this.newton,
            )?
        };

        let state = StateVector::from_flat(result.x.as_slice())?;
        if !result.converged() {
            warn!(
                reason = result.termination.describe(),
                iterations = result.iterations,
                residual = result.residual_norm,
                "steady solve failed"
            );
            return Err(SolverError::ConvergenceFailed {
                reason: result.termination.describe(),
                iterations: result.iterations,
                residual_norm: result.residual_norm,
                state,
            });
        }

        debug!(
            iterations = result.iterations,
            residual = result.residual_norm,
            "steady solve converged"
        );
        self.dynamics = None;
        self.modes.clear();
        self.stage = Stage::Solved;
        Ok(&*self.steady.insert(state))
    }

    pub fn steady_state(&self) -> Option<&StateVector> {
        self.steady.as_ref()
    }

    /// Solved pressures per node [Pa].
    pub fn steady_pressures(&self) -> Option<&[f64]> {
        self.steady.as_ref().map(|s| s.pressures.as_slice())
    }

    /// Solved mass flows per node [kg/s].
    pub fn steady_mass_flows(&self) -> Option<&[f64]> {
        self.steady.as_ref().map(|s| s.mass_flows.as_slice())
    }

    pub(crate) fn require_steady(&self) -> SolverResult<&StateVector> {
        self.steady.as_ref().ok_or(SolverError::MissingSteadySolution)
    }

    pub fn steady_report(&self) -> SolverResult<SteadyReport> {
        Ok(SteadyReport::new(self, self.require_steady()?))
    }

    fn invalidate_solution(&mut self) {
        if self.stage == Stage::Solved {
            self.stage = Stage::SystemAssembled;
        }
        self.steady = None;
        self.dynamics = None;
        self.modes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_components::{Orifice, Pipe};
    use fl_core::units::{kgpm3, m, pa, pas};
    use fl_network::Circuit;

    fn water() -> FluidState {
        FluidState::new(kgpm3(998.2), pas(1.002e-3)).unwrap()
    }

    fn pipe_network() -> Network<ElementKind> {
        let mut circuit = Circuit::new();
        let pipe = Pipe::new(m(1.0), m(0.02), m(1.5e-6)).unwrap();
        let id = circuit.add_element("line", ElementKind::from(pipe));
        Network::mesh(&circuit, id).unwrap()
    }

    fn two_element_network() -> Network<ElementKind> {
        let mut circuit = Circuit::new();
        let pipe = Pipe::new(m(1.0), m(0.02), m(1.5e-6)).unwrap();
        let orifice = Orifice::new(m(0.01), m(0.002), 1)
            .unwrap()
            .with_ko(2.0)
            .unwrap();
        let a = circuit.add_element("line", ElementKind::from(pipe));
        let b = circuit.add_element("plate", ElementKind::from(orifice));
        circuit.tie_in(a, 1, b, 0).unwrap();
        Network::mesh(&circuit, a).unwrap()
    }

    #[test]
    fn boundary_condition_must_target_boundary_node() {
        let net = two_element_network();
        let mut model = Model::new(&net, water());
        let connection = net.connection_nodes().next().unwrap();
        assert_eq!(
            model.add_pressure_bc(connection, pa(1e5)),
            Err(SolverError::NotBoundaryNode { node: connection })
        );
        assert_eq!(model.stage(), Stage::Unbuilt);
        assert!(model.boundary_conditions().is_empty());
    }

    #[test]
    fn both_kinds_on_one_node_conflict() {
        let net = pipe_network();
        let mut model = Model::new(&net, water());
        let n0 = NodeId::from_index(0);
        model
            .add_boundary_condition(BoundaryKind::Pressure, n0, 5e5)
            .unwrap();
        model
            .add_boundary_condition(BoundaryKind::Pressure, n0, 6e5)
            .unwrap();
        assert_eq!(
            model.boundary_condition(n0),
            Some((BoundaryKind::Pressure, 6e5))
        );
        let err = model
            .add_boundary_condition(BoundaryKind::FlowRate, n0, 1.0)
            .unwrap_err();
        assert_eq!(
            err,
            SolverError::ConflictingBoundaryCondition {
                node: n0,
                existing: BoundaryKind::Pressure
            }
        );
    }

    #[test]
    fn missing_condition_is_too_few_equations() {
        let net = pipe_network();
        let mut model = Model::new(&net, water());
        model
            .add_boundary_condition(BoundaryKind::Pressure, NodeId::from_index(0), 5e5)
            .unwrap();
        let err = model
            .build_steady_system(&StateVector::filled(2, 1.0))
            .unwrap_err();
        assert_eq!(
            err,
            SolverError::TooFewEquations {
                equations: 3,
                unknowns: 4
            }
        );
        assert_eq!(model.stage(), Stage::BoundaryConditionsAssigned);
    }

    #[test]
    fn assembly_orders_elements_then_conditions() {
        let net = pipe_network();
        let mut model = Model::new(&net, water());
        let (n0, n1) = (NodeId::from_index(0), NodeId::from_index(1));
        model.add_pressure_bc(n0, pa(5e5)).unwrap();
        model.add_pressure_bc(n1, pa(4e5)).unwrap();
        let state = StateVector {
            pressures: vec![5e5, 4e5],
            mass_flows: vec![0.0, 0.0],
        };
        let r = model.build_steady_system(&state).unwrap();
        assert_eq!(r.len(), 4);
        assert_eq!(r[0], 1e5);
        assert_eq!(r[1], 0.0);
        assert_eq!(&r[2..], &[0.0, 0.0]);
        assert_eq!(model.stage(), Stage::SystemAssembled);

        assert!(matches!(
            model.add_pressure_bc(n0, pa(1.0)),
            Err(SolverError::WrongStage { .. })
        ));
    }

    #[test]
    fn state_of_wrong_size_is_rejected() {
        let net = pipe_network();
        let model = Model::new(&net, water());
        assert_eq!(
            model.residuals(&StateVector::filled(3, 1.0)),
            Err(SolverError::StateLength {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn element_fluid_overrides_default() {
        let net = two_element_network();
        let mut model = Model::new(&net, water());
        let plate = net.elements()[1].id;
        let fuel = FluidState::new(kgpm3(810.0), pas(1.9e-3)).unwrap();
        model.set_element_fluid(plate, fuel).unwrap();
        assert_eq!(model.fluid_for(plate).density, 810.0);
        assert_eq!(model.fluid_for(net.elements()[0].id).density, 998.2);
        assert!(matches!(
            model.set_element_fluid(ElementId::from_index(9), fuel),
            Err(SolverError::Network(NetworkError::UnknownElement { .. }))
        ));
    }

    #[test]
    fn report_needs_solution() {
        let net = pipe_network();
        let model = Model::new(&net, water());
        assert_eq!(
            model.steady_report().unwrap_err(),
            SolverError::MissingSteadySolution
        );
    }
}
