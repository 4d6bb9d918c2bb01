//! Consistent orientation of a complex by propagation across shared faces.
//!
//! Two top-dimensional simplices sharing a codimension-1 face are
//! consistently oriented exactly when they induce opposite orientations on
//! that face. The pass partitions the top simplices into connected
//! components over face adjacency, picks an arbitrary representative per
//! component, and propagates by depth-first search. A conflict anywhere
//! means the complex is non-orientable; in that case nothing is written.

use fixedbitset as fb;

use crate::delta_set::{
    EmbeddedDeltaSet1D, EmbeddedDeltaSet2D, Orientation, OrientedDeltaSet1D, OrientedDeltaSet2D,
};
use crate::error::DecError;
use crate::store::Id;

/// Sign a vertex contributes to the boundary of an edge: +1 as target,
/// −1 as source. The edge's own orientation cancels out of the
/// propagation rule and does not appear.
const EDGE_SLOT_SIGNS: [i8; 2] = [1, -1];

/// Sign an edge slot contributes to the boundary of a triangle:
/// `+e₀ − e₁ + e₂`.
const TRI_SLOT_SIGNS: [i8; 3] = [1, -1, 1];

fn orient_edges_1d(s: &OrientedDeltaSet1D<impl Orientation>) -> Result<Vec<i8>, DecError> {
    let ne = s.ne();
    let mut signs = vec![0i8; ne];
    let mut visited = fb::FixedBitSet::with_capacity(ne);
    let mut stack: Vec<Id> = Vec::new();

    for root in s.edges() {
        if visited.contains(root) {
            continue;
        }
        signs[root] = 1;
        visited.insert(root);
        stack.push(root);

        while let Some(e) = stack.pop() {
            for (slot, vert) in [(0usize, s.tgt(e)), (1, s.src(e))] {
                let here = signs[e] * EDGE_SLOT_SIGNS[slot];
                for (other_slot, incident) in [
                    (0usize, s.edges_with_tgt(vert)),
                    (1, s.edges_with_src(vert)),
                ] {
                    for &f in incident {
                        if f == e && other_slot == slot {
                            continue;
                        }
                        let required = -here * EDGE_SLOT_SIGNS[other_slot];
                        if !visited.contains(f) {
                            signs[f] = required;
                            visited.insert(f);
                            stack.push(f);
                        } else if signs[f] != required {
                            return Err(DecError::NonOrientable);
                        }
                    }
                }
            }
        }
    }
    Ok(signs)
}

fn orient_triangles_2d(s: &OrientedDeltaSet2D<impl Orientation>) -> Result<Vec<i8>, DecError> {
    let nt = s.nt();
    let mut signs = vec![0i8; nt];
    let mut visited = fb::FixedBitSet::with_capacity(nt);
    let mut stack: Vec<Id> = Vec::new();

    for root in s.triangles() {
        if visited.contains(root) {
            continue;
        }
        signs[root] = 1;
        visited.insert(root);
        stack.push(root);

        while let Some(t) = stack.pop() {
            for (slot, edge) in s.triangle_edges(t).into_iter().enumerate() {
                let here = signs[t] * TRI_SLOT_SIGNS[slot];
                for other_slot in 0..3 {
                    for &n in s.triangles_with_face(other_slot, edge) {
                        if n == t && other_slot == slot {
                            continue;
                        }
                        let required = -here * TRI_SLOT_SIGNS[other_slot];
                        if !visited.contains(n) {
                            signs[n] = required;
                            visited.insert(n);
                            stack.push(n);
                        } else if signs[n] != required {
                            return Err(DecError::NonOrientable);
                        }
                    }
                }
            }
        }
    }
    Ok(signs)
}

impl<O: Orientation> OrientedDeltaSet1D<O> {
    /// Assign edge orientations so that every connected component is
    /// consistently oriented, with each component's representative
    /// oriented positively.
    ///
    /// Returns `false` and writes nothing if some component is
    /// non-orientable (e.g. a vertex with three or more incident edges).
    pub fn orient(&mut self) -> bool {
        let Ok(signs) = orient_edges_1d(self) else {
            return false;
        };
        for (e, sign) in signs.into_iter().enumerate() {
            self.set_edge_orientation(e, O::from_sign(sign as f64));
        }
        true
    }
}

impl<O: Orientation> OrientedDeltaSet2D<O> {
    /// Assign triangle orientations so that every connected component is
    /// consistently oriented, with each component's representative
    /// oriented positively. Edge orientations are left untouched.
    ///
    /// Returns `false` and writes nothing if some component is
    /// non-orientable.
    pub fn orient(&mut self) -> bool {
        let Ok(signs) = orient_triangles_2d(self) else {
            return false;
        };
        for (t, sign) in signs.into_iter().enumerate() {
            self.set_tri_orientation(t, O::from_sign(sign as f64));
        }
        true
    }
}

impl<O: Orientation, const N: usize> EmbeddedDeltaSet1D<O, N> {
    /// See [`OrientedDeltaSet1D::orient`].
    pub fn orient(&mut self) -> bool {
        let Ok(signs) = orient_edges_1d(&**self) else {
            return false;
        };
        for (e, sign) in signs.into_iter().enumerate() {
            self.set_edge_orientation(e, O::from_sign(sign as f64));
        }
        true
    }
}

impl<O: Orientation, const N: usize> EmbeddedDeltaSet2D<O, N> {
    /// See [`OrientedDeltaSet2D::orient`].
    pub fn orient(&mut self) -> bool {
        let Ok(signs) = orient_triangles_2d(&**self) else {
            return false;
        };
        for (t, sign) in signs.into_iter().enumerate() {
            self.set_tri_orientation(t, O::from_sign(sign as f64));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// After a successful pass, every edge shared by two triangles must
    /// receive opposite coefficients from their boundary chains.
    fn assert_consistent(s: &OrientedDeltaSet2D<bool>) {
        for e in s.edges() {
            let mut coefficients = Vec::new();
            for slot in 0..3 {
                for &t in s.triangles_with_face(slot, e) {
                    let coeff = s
                        .boundary_triangle_nz(t)
                        .iter()
                        .find(|(edge, _)| *edge == e)
                        .unwrap()
                        .1;
                    coefficients.push(coeff);
                }
            }
            if coefficients.len() == 2 {
                assert_eq!(
                    coefficients[0], -coefficients[1],
                    "edge {e} induced the same orientation twice"
                );
            }
        }
    }

    #[test]
    fn orients_a_triangle_strip() {
        let mut s = OrientedDeltaSet2D::<bool>::new();
        s.add_vertices(4);
        s.glue_triangle(0, 1, 2, true).unwrap();
        // deliberately inconsistent with the first triangle
        s.glue_triangle(1, 2, 3, true).unwrap();

        assert!(s.orient());
        assert_consistent(&s);
        // the component representative stays positive
        assert!(s.tri_orientation(0));
    }

    #[test]
    fn orients_a_tetrahedron_boundary() {
        let mut s = OrientedDeltaSet2D::<bool>::new();
        s.add_vertices(4);
        for (a, b, c) in [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)] {
            s.glue_triangle(a, b, c, true).unwrap();
        }
        assert!(s.orient());
        assert_consistent(&s);
    }

    #[test]
    fn moebius_band_is_not_orientable() {
        let mut s = OrientedDeltaSet2D::<bool>::new();
        s.add_vertices(5);
        for (a, b, c) in [(0, 1, 2), (1, 2, 3), (2, 3, 4), (0, 3, 4), (0, 1, 4)] {
            s.glue_triangle(a, b, c, true).unwrap();
        }

        let before: Vec<bool> = s.triangles().map(|t| s.tri_orientation(t)).collect();
        assert!(!s.orient());
        let after: Vec<bool> = s.triangles().map(|t| s.tri_orientation(t)).collect();
        assert_eq!(before, after, "failed orient must not write orientations");
    }

    #[test]
    fn orients_each_component_separately() {
        let mut s = OrientedDeltaSet2D::<bool>::new();
        s.add_vertices(6);
        s.glue_triangle(0, 1, 2, false).unwrap();
        s.glue_triangle(3, 4, 5, false).unwrap();

        assert!(s.orient());
        // both representatives positive
        assert!(s.tri_orientation(0));
        assert!(s.tri_orientation(1));
    }

    #[test]
    fn orients_a_path_head_to_tail() {
        let mut s = OrientedDeltaSet1D::<bool>::new();
        s.add_vertices(4);
        s.add_edge(0, 1, true);
        s.add_edge(1, 2, false);
        s.add_edge(2, 3, true);

        assert!(s.orient());
        // consistent path: every interior vertex is the target of one
        // edge and the source of the next, with equal signs
        for v in [1, 2] {
            let into = s.edges_with_tgt(v)[0];
            let out = s.edges_with_src(v)[0];
            assert_eq!(s.edge_orientation(into), s.edge_orientation(out));
        }
    }

    #[test]
    fn branch_vertex_is_not_orientable() {
        let mut s = OrientedDeltaSet1D::<bool>::new();
        s.add_vertices(4);
        s.add_edge(0, 3, true);
        s.add_edge(1, 3, true);
        s.add_edge(2, 3, true);

        assert!(!s.orient());
    }

    #[test]
    fn cycle_is_orientable() {
        let mut s = OrientedDeltaSet1D::<bool>::new();
        s.add_vertices(3);
        s.add_edge(0, 1, true);
        s.add_edge(1, 2, false);
        s.add_edge(2, 0, true);

        assert!(s.orient());
        for v in s.vertices() {
            let into = s.edges_with_tgt(v)[0];
            let out = s.edges_with_src(v)[0];
            assert_eq!(s.edge_orientation(into), s.edge_orientation(out));
        }
    }
}
