//! Integration test: reconstructing a world from saved shaft state.
//!
//! Topology is never persisted -- only each element's view of its network
//! speeds. Loading therefore re-adds every element, restores its saved
//! speeds, and reconnects it, with merges running in [`MergeMode::Reload`]
//! so the repeated reconstruction merges neither bleed energy nor schedule
//! explosions. A saved machine must come back byte-for-byte identical in
//! speed and energy.

use rotary_core::config::ShaftConfig;
use rotary_core::geom::Direction::{XNeg, XPos};
use rotary_core::geom::GridPosition;
use rotary_shaft::{
    MergeMode, SavedElementShafts, ShaftElementSpec, ShaftEvent, ShaftModule,
};
use rotary_spatial::ShaftGrid;

#[test]
fn saved_network_survives_reconstruction_unchanged() {
    let config = ShaftConfig::default();

    // ---- Session one: build, spin, save. ----
    let mut module = ShaftModule::new(config.clone());
    let mut grid = ShaftGrid::new();
    let positions = [GridPosition::new(0, 0, 0), GridPosition::new(1, 0, 0)];
    let mut saved_blobs = Vec::new();
    {
        let mut elements = Vec::new();
        for &pos in &positions {
            let element =
                module.add_element(ShaftElementSpec::new(1.0, vec![XNeg, XPos], pos));
            grid.place(element, pos).unwrap();
            module
                .connect_element(&grid, element, MergeMode::Normal)
                .unwrap();
            elements.push(element);
        }
        let net = module.network_of(elements[0], XNeg).unwrap().unwrap();
        module.set_rads(net, 60.0).unwrap();
        assert_eq!(module.energy(net).unwrap(), 0.5 * 2.0 * 60.0 * 60.0);

        for &element in &elements {
            saved_blobs.push(module.save_element(element).unwrap().encode().unwrap());
        }
    }

    // ---- Session two: fresh module, rebuild from the saved bytes. ----
    let mut module = ShaftModule::new(config);
    let mut grid = ShaftGrid::new();
    let mut elements = Vec::new();
    for (&pos, blob) in positions.iter().zip(&saved_blobs) {
        let element = module.add_element(ShaftElementSpec::new(1.0, vec![XNeg, XPos], pos));
        grid.place(element, pos).unwrap();
        let saved = SavedElementShafts::decode(blob).unwrap();
        module.load_element(element, &saved).unwrap();
        elements.push(element);
    }
    let mut events = Vec::new();
    for &element in &elements {
        events.extend(
            module
                .connect_element(&grid, element, MergeMode::Reload)
                .unwrap(),
        );
    }

    // Reconstruction merged the singletons without energy accounting: no
    // friction loss, no scheduled failure, exact speed round-trip.
    assert!(!events
        .iter()
        .any(|e| matches!(e, ShaftEvent::ExplosionScheduled { .. })));
    let net = module.network_of(elements[0], XNeg).unwrap().unwrap();
    assert_eq!(module.network_count(), 1);
    assert_eq!(module.rads(net).unwrap(), 60.0);
    assert_eq!(module.energy(net).unwrap(), 0.5 * 2.0 * 60.0 * 60.0);
}

#[test]
fn hostile_saved_speeds_come_back_stopped() {
    let mut module = ShaftModule::new(ShaftConfig::default());
    let pos = GridPosition::new(0, 0, 0);
    let element = module.add_element(ShaftElementSpec::new(1.0, vec![XNeg, XPos], pos));

    // A save written by a buggy or hostile host: the clamp policy turns it
    // into a stopped shaft rather than a poisoned simulation.
    let saved = SavedElementShafts::new(vec![(XNeg, f64::NAN), (XPos, -40.0)]);
    module.load_element(element, &saved).unwrap();
    let net = module.network_of(element, XNeg).unwrap().unwrap();
    assert_eq!(module.rads(net).unwrap(), 0.0);
}
