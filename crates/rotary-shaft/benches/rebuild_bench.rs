//! Criterion benchmarks for the shaft network engine.
//!
//! Two benchmark groups:
//! - `connect_chain`: incremental placement of a linear chain -- measures
//!   the merge path.
//! - `disconnect_middle`: severing the middle of a chain -- measures the
//!   O(n) partition rebuild.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rotary_core::config::ShaftConfig;
use rotary_core::geom::Direction::{XNeg, XPos};
use rotary_core::geom::GridPosition;
use rotary_core::id::ElementId;
use rotary_shaft::{MergeMode, ShaftElementSpec, ShaftModule};
use rotary_spatial::ShaftGrid;

/// Build a connected chain of `len` shaft pieces along the X axis and
/// return the element in the middle.
fn build_chain(len: i32) -> (ShaftModule, ShaftGrid, ElementId) {
    let mut module = ShaftModule::new(ShaftConfig::default());
    let mut grid = ShaftGrid::new();
    let mut middle = None;
    for x in 0..len {
        let pos = GridPosition::new(x, 0, 0);
        let element = module.add_element(ShaftElementSpec::new(1.0, vec![XNeg, XPos], pos));
        grid.place(element, pos).unwrap();
        module
            .connect_element(&grid, element, MergeMode::Normal)
            .unwrap();
        if x == len / 2 {
            middle = Some(element);
        }
    }
    (module, grid, middle.expect("chain is non-empty"))
}

fn bench_connect_chain(c: &mut Criterion) {
    for len in [64, 256] {
        c.bench_function(&format!("connect_chain_{len}"), |b| {
            b.iter(|| build_chain(len));
        });
    }
}

fn bench_disconnect_middle(c: &mut Criterion) {
    for len in [64, 256] {
        c.bench_function(&format!("disconnect_middle_{len}"), |b| {
            b.iter_batched(
                || build_chain(len),
                |(mut module, grid, middle)| {
                    module.disconnect_element(&grid, middle).unwrap();
                    module
                },
                BatchSize::SmallInput,
            );
        });
    }
}

criterion_group!(benches, bench_connect_chain, bench_disconnect_middle);
criterion_main!(benches);
