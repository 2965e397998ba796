//! Internal coupling: which of an element's own sides share rotation.

use rotary_core::geom::Direction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Whether rotation is shared between two sides of the same element.
///
/// Most shaft elements are fully coupled: every side turns together, so all
/// sides belong to one network. Elements like clutches or gearboxes couple
/// only some side pairs; their sides may end up in different networks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InternalCoupling {
    #[default]
    Full,
    /// Explicit set of coupled side pairs, stored order-normalized.
    Pairs(BTreeSet<(Direction, Direction)>),
}

fn normalize(a: Direction, b: Direction) -> (Direction, Direction) {
    if a <= b { (a, b) } else { (b, a) }
}

impl InternalCoupling {
    /// Coupling over exactly the given side pairs. Order within a pair does
    /// not matter.
    pub fn pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Direction, Direction)>,
    {
        InternalCoupling::Pairs(pairs.into_iter().map(|(a, b)| normalize(a, b)).collect())
    }

    /// No side shares rotation with any other.
    pub fn none() -> Self {
        InternalCoupling::Pairs(BTreeSet::new())
    }

    /// Is rotation shared between sides `a` and `b`? A side always shares
    /// with itself.
    pub fn connects(&self, a: Direction, b: Direction) -> bool {
        if a == b {
            return true;
        }
        match self {
            InternalCoupling::Full => true,
            InternalCoupling::Pairs(set) => set.contains(&normalize(a, b)),
        }
    }
}

/// Partition an element's connectivity sides into groups of mutually
/// reachable sides under the coupling relation. Each group becomes one
/// network membership at registration time.
pub(crate) fn coupling_groups(
    sides: &[Direction],
    coupling: &InternalCoupling,
) -> Vec<Vec<Direction>> {
    let mut groups: Vec<Vec<Direction>> = Vec::new();
    for &side in sides {
        let mut target: Option<usize> = None;
        let mut i = 0;
        while i < groups.len() {
            let couples = groups[i].iter().any(|&g| coupling.connects(side, g));
            if couples {
                if let Some(t) = target {
                    // The new side links two previously separate groups.
                    let merged = groups.remove(i);
                    groups[t].extend(merged);
                } else {
                    groups[i].push(side);
                    target = Some(i);
                    i += 1;
                }
            } else {
                i += 1;
            }
        }
        if target.is_none() {
            groups.push(vec![side]);
        }
    }
    groups
}
