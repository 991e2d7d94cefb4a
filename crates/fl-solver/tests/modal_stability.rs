//! Frequency-domain analysis of a tank-fed injector and chamber.

use fl_components::{ElementKind, Orifice, Pipe, ThrustChamber};
use fl_core::NodeId;
use fl_core::units::{kgpm3, m, m3, mps, pa, pas};
use fl_fluids::FluidState;
use fl_network::{Circuit, Network};
use fl_solver::{EigenConfig, Model, SolverError};

fn water() -> FluidState {
    FluidState::new(kgpm3(998.2), pas(1.002e-3))
        .unwrap()
        .with_sound_speed(mps(1482.0))
        .unwrap()
}

/// tank → feed line → injector plate → chamber
fn feed_chain() -> Network<ElementKind> {
    let mut circuit = Circuit::new();
    let line = Pipe::new(m(2.0), m(0.03), m(1.5e-6)).unwrap();
    let injector = Orifice::new(m(0.004), m(0.005), 20)
        .unwrap()
        .with_ko(2.5)
        .unwrap();
    let chamber = ThrustChamber::new(m(0.03), mps(1500.0))
        .unwrap()
        .with_chamber(m3(0.002), 1.0e6)
        .unwrap();

    let a = circuit.add_element("feed line", ElementKind::from(line));
    let b = circuit.add_element("injector", ElementKind::from(injector));
    let c = circuit.add_element("chamber", ElementKind::from(chamber));
    circuit.tie_in(a, 1, b, 0).unwrap();
    circuit.tie_in(b, 1, c, 0).unwrap();
    Network::mesh(&circuit, a).unwrap()
}

#[test]
fn damped_feed_chain_is_stable() {
    let net = feed_chain();
    assert_eq!(net.node_count(), 3);
    assert_eq!(net.boundary_nodes().count(), 1);

    let mut model = Model::new(&net, water());
    model.add_pressure_bc(NodeId::from_index(0), pa(2.0e6)).unwrap();
    let state = model.steady_solve().unwrap().clone();
    let mdot = state.mass_flows[0];
    assert!(mdot > 0.5 && mdot < 1.0, "mdot = {mdot}");
    assert!(state.pressures[2] < state.pressures[1]);

    let dynamics = model.build_dynamics_matrices().unwrap();
    assert_eq!(dynamics.size(), 6);
    assert_eq!(dynamics.element_rows, 5);
    assert_eq!(dynamics.prescribed, vec![0]);

    let modes = model.eigen_solve().unwrap().to_vec();
    assert_eq!(modes.len(), 4);
    for mode in &modes {
        assert!(mode.is_stable(), "unstable mode {mode:?}");
        assert!(mode.damping_ratio > 0.0);
        assert!(mode.frequency_hz.is_finite() && mode.frequency_hz > 0.0);
    }
    assert!(modes.windows(2).all(|w| w[0].frequency_hz <= w[1].frequency_hz));
    assert_eq!(model.natural_frequencies().len(), 4);
    assert_eq!(model.eigenvalues().len(), 4);
}

#[test]
fn eigen_solve_needs_steady_solution() {
    let net = feed_chain();
    let mut model = Model::new(&net, water());
    model.add_pressure_bc(NodeId::from_index(0), pa(2.0e6)).unwrap();
    assert_eq!(
        model.eigen_solve().unwrap_err(),
        SolverError::MissingSteadySolution
    );
}

#[test]
fn line_without_storage_has_singular_mass_matrix() {
    // no inertance and no compliance anywhere
    let mut circuit = Circuit::new();
    let plate = Orifice::new(m(0.004), m(0.0), 1)
        .unwrap()
        .with_ko(2.5)
        .unwrap();
    let id = circuit.add_element("plate", ElementKind::from(plate));
    let net = Network::mesh(&circuit, id).unwrap();

    let mut model = Model::new(&net, water()).with_eigen_config(EigenConfig::default());
    model.add_pressure_bc(NodeId::from_index(0), pa(3e5)).unwrap();
    model.add_pressure_bc(NodeId::from_index(1), pa(2e5)).unwrap();
    model.steady_solve().unwrap();

    assert!(matches!(
        model.eigen_solve(),
        Err(SolverError::SingularMassMatrix { .. })
    ));
}
