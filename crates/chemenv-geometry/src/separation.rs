//! Separations of a point set by a plane.
//!
//! Coordination-environment analysis enumerates candidate separating planes
//! through a set of neighbours and keeps only the distinct ways they split
//! the neighbours. Two planes that split the set identically, or that put the
//! same points in the plane, describe the same separation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Point indices below, in, and above a plane.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Separation {
    pub below: Vec<usize>,
    pub in_plane: Vec<usize>,
    pub above: Vec<usize>,
}

impl Separation {
    /// Total number of indices in the three groups.
    pub fn len(&self) -> usize {
        self.below.len() + self.in_plane.len() + self.above.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Canonical form: every group sorted, and the larger outer group last.
    /// Outer groups of equal size are ordered by their sorted contents.
    ///
    /// A plane and its flipped copy produce mirrored separations; both have
    /// the same canonical form.
    pub fn sorted(&self) -> Separation {
        let sort = |group: &[usize]| {
            let mut group = group.to_vec();
            group.sort_unstable();
            group
        };
        let below = sort(&self.below);
        let above = sort(&self.above);
        let swap = (below.len(), &below) > (above.len(), &above);
        let (below, above) = if swap { (above, below) } else { (below, above) };
        Separation {
            below,
            in_plane: sort(&self.in_plane),
            above,
        }
    }

    /// Whether an equivalent separation is already present in `list`.
    ///
    /// Entries match on an identical non-empty in-plane set, or on identical
    /// outer groups in either orientation.
    pub fn is_in_list(&self, list: &[Separation]) -> bool {
        let in_plane = as_set(&self.in_plane);
        let below = as_set(&self.below);
        let above = as_set(&self.above);
        list.iter().any(|other| {
            if !in_plane.is_empty() && as_set(&other.in_plane) == in_plane {
                return true;
            }
            let other_below = as_set(&other.below);
            let other_above = as_set(&other.above);
            (other_below == below && other_above == above)
                || (other_below == above && other_above == below)
        })
    }
}

fn as_set(indices: &[usize]) -> BTreeSet<usize> {
    indices.iter().copied().collect()
}
