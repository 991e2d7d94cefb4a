//! Tabular summary of a steady solution.

use std::fmt;

use fl_core::{NodeId, StateVector};
use fl_network::NodeKind;

use crate::model::{BoundaryKind, Model};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRow {
    pub node: NodeId,
    pub kind: NodeKind,
    /// [Pa]
    pub pressure: f64,
    /// [kg/s]
    pub mass_flow: f64,
    pub condition: Option<BoundaryKind>,
}

/// Per-node pressures and flows plus any range warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct SteadyReport {
    pub rows: Vec<NodeRow>,
    pub warnings: Vec<String>,
}

impl SteadyReport {
    pub(crate) fn new(model: &Model<'_>, state: &StateVector) -> Self {
        let rows = model
            .network()
            .nodes()
            .iter()
            .zip(state.pressures.iter().zip(&state.mass_flows))
            .map(|(node, (&pressure, &mass_flow))| NodeRow {
                node: node.id,
                kind: node.kind,
                pressure,
                mass_flow,
                condition: model.boundary_condition(node.id).map(|(k, _)| k),
            })
            .collect();
        let warnings = model.warnings().iter().map(ToString::to_string).collect();
        Self { rows, warnings }
    }
}

impl fmt::Display for SteadyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>5}  {:<10}  {:>16}  {:>16}",
            "Node", "Kind", "Pressure [Pa]", "Flow [kg/s]"
        )?;
        for row in &self.rows {
            let kind = match row.kind {
                NodeKind::Connection => "Connection",
                NodeKind::Boundary => "Boundary",
            };
            let fixed = match row.condition {
                Some(BoundaryKind::Pressure) => "  (P fixed)",
                Some(BoundaryKind::FlowRate) => "  (flow fixed)",
                None => "",
            };
            writeln!(
                f,
                "{:>5}  {:<10}  {:>16.2}  {:>16.5}{}",
                row.node.index(),
                kind,
                row.pressure,
                row.mass_flow,
                fixed
            )?;
        }
        if !self.warnings.is_empty() {
            writeln!(f, "Warnings:")?;
            for w in &self.warnings {
                writeln!(f, "  {w}")?;
            }
        }
        Ok(())
    }
}
