//! Integration test: splitting and repairing a shaft chain.
//!
//! Builds a five-piece shaft chain on the grid, spins it up, tears the
//! middle piece out (split into two networks plus parked singletons), then
//! bridges the gap with a fresh piece and verifies the halves merge back
//! into one network with the friction cost of the reunion paid.

use rotary_core::config::ShaftConfig;
use rotary_core::geom::Direction::{XNeg, XPos};
use rotary_core::geom::GridPosition;
use rotary_core::id::ElementId;
use rotary_shaft::{MergeMode, ShaftElementSpec, ShaftModule};
use rotary_spatial::ShaftGrid;

fn add_shaft(module: &mut ShaftModule, grid: &mut ShaftGrid, x: i32) -> ElementId {
    let pos = GridPosition::new(x, 0, 0);
    let element = module.add_element(ShaftElementSpec::new(1.0, vec![XNeg, XPos], pos));
    grid.place(element, pos).unwrap();
    module
        .connect_element(grid, element, MergeMode::Normal)
        .unwrap();
    element
}

#[test]
fn split_then_bridge_a_chain() {
    let mut module = ShaftModule::new(ShaftConfig::default());
    let mut grid = ShaftGrid::new();

    let chain: Vec<ElementId> = (0..5).map(|x| add_shaft(&mut module, &mut grid, x)).collect();
    let net = module.network_of(chain[0], XNeg).unwrap().unwrap();
    assert_eq!(module.network_count(), 1);
    assert_eq!(module.mass(net).unwrap(), 5.0);
    module.set_rads(net, 10.0).unwrap();

    // Tear out the middle piece entirely.
    module.remove_element(&grid, chain[2]).unwrap();
    grid.remove(chain[2]).unwrap();

    let left = module.network_of(chain[1], XNeg).unwrap().unwrap();
    let right = module.network_of(chain[3], XNeg).unwrap().unwrap();
    assert_ne!(left, right);
    assert_eq!(module.network_count(), 2);
    assert_eq!(module.mass(left).unwrap(), 2.0);
    assert_eq!(module.mass(right).unwrap(), 2.0);
    // Both halves keep spinning at the old speed.
    assert_eq!(module.rads(left).unwrap(), 10.0);
    assert_eq!(module.rads(right).unwrap(), 10.0);

    // Bridge the gap with a fresh piece; the halves merge back into one
    // network through it.
    let bridge = add_shaft(&mut module, &mut grid, 2);
    let merged = module.network_of(bridge, XNeg).unwrap().unwrap();
    assert_eq!(module.network_count(), 1);
    assert_eq!(module.mass(merged).unwrap(), 5.0);
    for &element in &[chain[0], chain[1], bridge, chain[3], chain[4]] {
        assert_eq!(module.network_of(element, XNeg).unwrap(), Some(merged));
    }

    // The reunion went through a stopped bridge piece: friction cost was
    // paid, so the network spins slower than before the split but did not
    // stop.
    let rads = module.rads(merged).unwrap();
    assert!(rads > 0.0 && rads < 10.0, "expected 0 < rads < 10, got {rads}");
}
