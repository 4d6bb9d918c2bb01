//! Dual complexes: the subdivided Poincaré duals of 1D and 2D delta sets.
//!
//! A dual complex borrows a frozen primal complex for its whole lifetime;
//! all back-references into the primal are plain integer ids. Construction
//! happens in two steps: the constructor builds the combinatorial
//! subdivision (dual vertices, edges, triangles and their orientations),
//! and [`subdivide_duals`][DualComplex2D::subdivide_duals] then places a
//! point into every dual vertex and computes primal and dual volumes.
//! Operator assembly is read-only after that.

use nalgebra as na;

use crate::{
    delta_set::{EmbeddedDeltaSet1D, EmbeddedDeltaSet2D, Orientation},
    error::DecError,
    geometry,
    store::{Column, Id, Morphism, PartTable},
};

/// Where [`subdivide_duals`][DualComplex2D::subdivide_duals] places the
/// dual point of each primal simplex.
///
/// All three rules place edge centers at the midpoint; they differ only
/// on triangles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubdivisionRule {
    /// Arithmetic mean of the vertices.
    Barycenter,
    /// Point equidistant from the vertices. May lie outside the simplex
    /// or on its boundary; fails on degenerate simplices.
    Circumcenter,
    /// Opposite-edge-length weighted mean of the vertices.
    Incenter,
}

impl SubdivisionRule {
    fn apply<const N: usize>(
        self,
        points: &[na::SVector<f64, N>],
    ) -> Result<na::SVector<f64, N>, DecError> {
        match self {
            Self::Barycenter => Ok(geometry::barycenter(points)),
            Self::Circumcenter => geometry::circumcenter(points),
            Self::Incenter => Ok(geometry::incenter(points)),
        }
    }
}

/// The primal simplex a dual vertex is the center of.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimalSimplex {
    /// A primal vertex.
    Vertex(Id),
    /// A primal edge.
    Edge(Id),
    /// A primal triangle.
    Triangle(Id),
}

/// Metric data filled in by `subdivide_duals`:
/// dual points and the primal/dual volumes derived from them.
#[derive(Clone, Debug)]
pub(crate) struct Metric<const N: usize, const DIM: usize> {
    /// One point per dual vertex, indexed by the dual vertex key.
    pub dual_point: Vec<na::SVector<f64, N>>,
    /// `primal_vol[k][x]` is the unsigned k-volume of primal simplex `x`.
    pub primal_vol: [Vec<f64>; DIM],
    /// `dual_vol[k][x]` is the unsigned volume of the dual (D−k)-cell
    /// of primal k-simplex `x`.
    pub dual_vol: [Vec<f64>; DIM],
    /// The rule the points were placed with.
    pub rule: SubdivisionRule,
}

//
// 1D
//

/// The dual subdivision of an embedded 1D delta set.
///
/// Every primal edge splits into two dual edges running from the edge
/// center to each endpoint, so `DualV = nv + ne` and `DualE = 2·ne`.
#[derive(Clone, Debug)]
pub struct DualComplex1D<'p, O: Orientation = bool, const N: usize = 2> {
    pub(crate) primal: &'p EmbeddedDeltaSet1D<O, N>,
    pub(crate) dual_vertices: PartTable,
    pub(crate) dual_edges: PartTable,
    /// Head of each dual edge, always a vertex center.
    pub(crate) d_bv0: Morphism,
    /// Tail of each dual edge, always an edge center.
    pub(crate) d_bv1: Morphism,
    pub(crate) d_edge_orientation: Column<O>,
    pub(crate) metric: Option<Metric<N, 2>>,
}

impl<'p, O: Orientation, const N: usize> DualComplex1D<'p, O, N> {
    /// Build the combinatorial dual of a primal complex.
    ///
    /// The primal is borrowed immutably until the dual is dropped,
    /// freezing it for the lifetime of any assembled operator.
    pub fn new(primal: &'p EmbeddedDeltaSet1D<O, N>) -> Self {
        let nv = primal.nv();
        let ne = primal.ne();

        let mut dual_vertices = PartTable::default();
        dual_vertices.add_parts(nv + ne);

        let mut dual_edges = PartTable::default();
        let mut d_bv0 = Morphism::default();
        let mut d_bv1 = Morphism::default();
        let mut d_edge_orientation = Column::default();

        // two dual edges per primal edge, laid out in blocks:
        // first all the halves toward tgt, then all toward src.
        // the half toward tgt carries the negated primal orientation,
        // the half toward src the primal orientation itself.
        for face in 0..2 {
            for e in primal.edges() {
                dual_edges.add_part();
                d_bv0.push(primal.edge_face(face, e));
                d_bv1.push(nv + e);
                let orient = primal.edge_orientation(e);
                d_edge_orientation.push(if face == 0 { orient.negate() } else { orient });
            }
        }

        Self {
            primal,
            dual_vertices,
            dual_edges,
            d_bv0,
            d_bv1,
            d_edge_orientation,
            metric: None,
        }
    }

    /// The primal complex this dual was built from.
    #[inline]
    pub fn primal(&self) -> &'p EmbeddedDeltaSet1D<O, N> {
        self.primal
    }

    /// Number of dual vertices.
    #[inline]
    pub fn n_dual_vertices(&self) -> usize {
        self.dual_vertices.len()
    }

    /// Number of dual edges.
    #[inline]
    pub fn n_dual_edges(&self) -> usize {
        self.dual_edges.len()
    }

    /// Dual vertex key of a primal vertex.
    #[inline]
    pub fn vertex_center(&self, v: Id) -> Id {
        v
    }

    /// Dual vertex key of a primal edge.
    #[inline]
    pub fn edge_center(&self, e: Id) -> Id {
        self.primal.nv() + e
    }

    /// The primal simplex whose center a dual vertex is.
    pub fn primal_of_center(&self, dv: Id) -> PrimalSimplex {
        let nv = self.primal.nv();
        if dv < nv {
            PrimalSimplex::Vertex(dv)
        } else {
            PrimalSimplex::Edge(dv - nv)
        }
    }

    /// Orientation carried by a dual edge.
    #[inline]
    pub fn dual_edge_orientation(&self, de: Id) -> O {
        self.d_edge_orientation.subpart(de)
    }

    /// The dual cells forming the Poincaré dual of primal k-simplex `x`:
    /// dual edge ids for `k = 0`, the dual vertex key for `k = 1`.
    pub fn elementary_duals(&self, k: usize, x: Id) -> Vec<Id> {
        match k {
            0 => self.d_bv0.incident(self.vertex_center(x)).to_vec(),
            1 => vec![self.edge_center(x)],
            _ => panic!("no {k}-simplices in a 1D complex"),
        }
    }

    /// Place dual points by the given rule and compute all volumes.
    pub fn subdivide_duals(&mut self, rule: SubdivisionRule) -> Result<(), DecError> {
        let primal = self.primal;
        let nv = primal.nv();
        let ne = primal.ne();

        let mut dual_point = Vec::with_capacity(nv + ne);
        dual_point.extend(primal.points().iter().copied());
        for e in primal.edges() {
            let pts = [primal.point(primal.src(e)), primal.point(primal.tgt(e))];
            dual_point.push(rule.apply(&pts)?);
        }

        let primal_vol = [
            vec![1.0; nv],
            primal
                .edges()
                .map(|e| (primal.point(primal.tgt(e)) - primal.point(primal.src(e))).norm())
                .collect(),
        ];

        // dual cell of a vertex is the union of its incident half-edges;
        // dual cell of an edge is a point
        let mut vertex_duals = vec![0.0; nv];
        for de in self.dual_edges.iter() {
            let head = self.d_bv0.subpart(de);
            let tail = self.d_bv1.subpart(de);
            vertex_duals[head] += (dual_point[tail] - dual_point[head]).norm();
        }
        let dual_vol = [vertex_duals, vec![1.0; ne]];

        self.metric = Some(Metric {
            dual_point,
            primal_vol,
            dual_vol,
            rule,
        });
        Ok(())
    }

    pub(crate) fn metric(&self) -> Result<&Metric<N, 2>, DecError> {
        self.metric.as_ref().ok_or(DecError::Unsubdivided)
    }

    /// The point placed into a dual vertex by `subdivide_duals`.
    pub fn dual_point(&self, dv: Id) -> Result<na::SVector<f64, N>, DecError> {
        Ok(self.metric()?.dual_point[dv])
    }

    /// Unsigned volume of primal k-simplex `x` (1 for vertices).
    pub fn primal_volume(&self, k: usize, x: Id) -> Result<f64, DecError> {
        Ok(self.metric()?.primal_vol[k][x])
    }

    /// Unsigned volume of the dual cell of primal k-simplex `x`.
    pub fn dual_volume(&self, k: usize, x: Id) -> Result<f64, DecError> {
        Ok(self.metric()?.dual_vol[k][x])
    }

    /// Vectorized [`primal_volume`][Self::primal_volume] over an id slice.
    pub fn primal_volumes(&self, k: usize, xs: &[Id]) -> Result<Vec<f64>, DecError> {
        let vols = &self.metric()?.primal_vol[k];
        Ok(xs.iter().map(|&x| vols[x]).collect())
    }

    /// Vectorized [`dual_volume`][Self::dual_volume] over an id slice.
    pub fn dual_volumes(&self, k: usize, xs: &[Id]) -> Result<Vec<f64>, DecError> {
        let vols = &self.metric()?.dual_vol[k];
        Ok(xs.iter().map(|&x| vols[x]).collect())
    }

    /// The rule the dual points were placed with,
    /// or `None` before `subdivide_duals`.
    pub fn subdivision_rule(&self) -> Option<SubdivisionRule> {
        self.metric.as_ref().map(|m| m.rule)
    }
}

//
// 2D
//

/// Index blocks of the 2D dual edge layout; see [`DualComplex2D::new`].
/// The two `edge_center → vertex` blocks (ne each) come first, at
/// offset zero.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DualEdgeBlocks {
    /// Start of the three `tri_center → edge_center` blocks (nt each).
    pub tri_edge: usize,
    /// Start of the three `tri_center → vertex` blocks (nt each).
    pub tri_vertex: usize,
}

/// One dual triangle per (corner vertex, adjacent edge) pair:
/// `(v, e, ev)` where `v` indexes the corner vertex, `e` the adjacent
/// primal edge face and `ev` which half of that edge reaches the corner.
const DUAL_TRI_SCHEMAS: [(usize, usize, usize); 6] = [
    (0, 1, 1),
    (0, 2, 1),
    (1, 2, 0),
    (1, 0, 1),
    (2, 0, 0),
    (2, 1, 0),
];

/// The dual subdivision of an embedded 2D delta set.
///
/// Every primal triangle is split into six corner triangles around its
/// center, giving `DualV = nv + ne + nt`, `DualE = 2·ne + 6·nt` and
/// `DualTri = 6·nt`.
#[derive(Clone, Debug)]
pub struct DualComplex2D<'p, O: Orientation = bool, const N: usize = 2> {
    pub(crate) primal: &'p EmbeddedDeltaSet2D<O, N>,
    pub(crate) dual_vertices: PartTable,
    pub(crate) dual_edges: PartTable,
    pub(crate) dual_triangles: PartTable,
    pub(crate) d_bv0: Morphism,
    pub(crate) d_bv1: Morphism,
    /// The `tri_center → edge_center` edge of each dual triangle.
    pub(crate) d_be0: Morphism,
    /// The `tri_center → vertex` edge of each dual triangle.
    pub(crate) d_be1: Morphism,
    /// The `edge_center → vertex` half-edge of each dual triangle.
    pub(crate) d_be2: Morphism,
    pub(crate) d_edge_orientation: Column<O>,
    pub(crate) d_tri_orientation: Column<O>,
    pub(crate) blocks: DualEdgeBlocks,
    pub(crate) metric: Option<Metric<N, 3>>,
}

impl<'p, O: Orientation, const N: usize> DualComplex2D<'p, O, N> {
    /// Build the combinatorial dual of a primal complex.
    ///
    /// The primal is borrowed immutably until the dual is dropped,
    /// freezing it for the lifetime of any assembled operator.
    pub fn new(primal: &'p EmbeddedDeltaSet2D<O, N>) -> Self {
        let nv = primal.nv();
        let ne = primal.ne();
        let nt = primal.nt();

        let mut dual_vertices = PartTable::default();
        dual_vertices.add_parts(nv + ne + nt);

        let mut dual_edges = PartTable::default();
        let mut d_bv0 = Morphism::default();
        let mut d_bv1 = Morphism::default();
        let mut d_edge_orientation = Column::default();

        let vertex_center = |v: Id| v;
        let edge_center = |e: Id| nv + e;
        let tri_center = |t: Id| nv + ne + t;

        // dual edges in three blocks.
        // edge_center → vertex halves, two per primal edge,
        // oriented like the 1D subdivision
        let blocks_edge_vertex = 0;
        for face in 0..2 {
            for e in primal.edges() {
                dual_edges.add_part();
                d_bv0.push(vertex_center(primal.edge_face(face, e)));
                d_bv1.push(edge_center(e));
                let orient = primal.edge_orientation(e);
                d_edge_orientation.push(if face == 0 { orient.negate() } else { orient });
            }
        }

        // tri_center → edge_center, three per triangle.
        // these are the elementary duals of the primal edges and receive
        // the induced orientation (−1)^{k(D−k)}·σ = −σ
        let blocks_tri_edge = dual_edges.len();
        for face in 0..3 {
            for t in primal.triangles() {
                let e = primal.triangle_face(face, t);
                dual_edges.add_part();
                d_bv0.push(edge_center(e));
                d_bv1.push(tri_center(t));
                d_edge_orientation.push(primal.edge_orientation(e).negate());
            }
        }

        // tri_center → vertex, three per triangle.
        // orientation of these is arbitrary; fix it positive
        let blocks_tri_vertex = dual_edges.len();
        for corner in 0..3 {
            for t in primal.triangles() {
                dual_edges.add_part();
                d_bv0.push(vertex_center(primal.triangle_vertices(t)[corner]));
                d_bv1.push(tri_center(t));
                d_edge_orientation.push(O::from_sign(1.0));
            }
        }

        // six corner triangles per primal triangle,
        // alternating orientation so that they tile the subdivision
        let mut dual_triangles = PartTable::default();
        let mut d_be0 = Morphism::default();
        let mut d_be1 = Morphism::default();
        let mut d_be2 = Morphism::default();
        let mut d_tri_orientation = Column::default();

        for (schema_idx, &(v, e, ev)) in DUAL_TRI_SCHEMAS.iter().enumerate() {
            for t in primal.triangles() {
                dual_triangles.add_part();
                d_be0.push(blocks_tri_edge + e * nt + t);
                d_be1.push(blocks_tri_vertex + v * nt + t);
                d_be2.push(blocks_edge_vertex + ev * ne + primal.triangle_face(e, t));
                let tau = primal.tri_orientation(t);
                d_tri_orientation.push(if schema_idx % 2 == 0 { tau.negate() } else { tau });
            }
        }

        Self {
            primal,
            dual_vertices,
            dual_edges,
            dual_triangles,
            d_bv0,
            d_bv1,
            d_be0,
            d_be1,
            d_be2,
            d_edge_orientation,
            d_tri_orientation,
            blocks: DualEdgeBlocks {
                tri_edge: blocks_tri_edge,
                tri_vertex: blocks_tri_vertex,
            },
            metric: None,
        }
    }

    /// The primal complex this dual was built from.
    #[inline]
    pub fn primal(&self) -> &'p EmbeddedDeltaSet2D<O, N> {
        self.primal
    }

    /// Number of dual vertices.
    #[inline]
    pub fn n_dual_vertices(&self) -> usize {
        self.dual_vertices.len()
    }

    /// Number of dual edges.
    #[inline]
    pub fn n_dual_edges(&self) -> usize {
        self.dual_edges.len()
    }

    /// Number of dual triangles.
    #[inline]
    pub fn n_dual_triangles(&self) -> usize {
        self.dual_triangles.len()
    }

    /// Dual vertex key of a primal vertex.
    #[inline]
    pub fn vertex_center(&self, v: Id) -> Id {
        v
    }

    /// Dual vertex key of a primal edge.
    #[inline]
    pub fn edge_center(&self, e: Id) -> Id {
        self.primal.nv() + e
    }

    /// Dual vertex key of a primal triangle.
    #[inline]
    pub fn triangle_center(&self, t: Id) -> Id {
        self.primal.nv() + self.primal.ne() + t
    }

    /// The primal simplex whose center a dual vertex is.
    pub fn primal_of_center(&self, dv: Id) -> PrimalSimplex {
        let nv = self.primal.nv();
        let ne = self.primal.ne();
        if dv < nv {
            PrimalSimplex::Vertex(dv)
        } else if dv < nv + ne {
            PrimalSimplex::Edge(dv - nv)
        } else {
            PrimalSimplex::Triangle(dv - nv - ne)
        }
    }

    /// Endpoints `(D_∂v0, D_∂v1)` of a dual edge.
    #[inline]
    pub fn dual_edge_endpoints(&self, de: Id) -> (Id, Id) {
        (self.d_bv0.subpart(de), self.d_bv1.subpart(de))
    }

    /// Orientation carried by a dual edge.
    #[inline]
    pub fn dual_edge_orientation(&self, de: Id) -> O {
        self.d_edge_orientation.subpart(de)
    }

    /// Orientation carried by a dual triangle.
    #[inline]
    pub fn dual_tri_orientation(&self, dt: Id) -> O {
        self.d_tri_orientation.subpart(dt)
    }

    /// The dual edge faces `(D_∂e₀, D_∂e₁, D_∂e₂)` of a dual triangle:
    /// its `tri_center → edge_center`, `tri_center → vertex` and
    /// `edge_center → vertex` sides.
    pub fn dual_triangle_edges(&self, dt: Id) -> [Id; 3] {
        [
            self.d_be0.subpart(dt),
            self.d_be1.subpart(dt),
            self.d_be2.subpart(dt),
        ]
    }

    /// The three dual vertex keys of a dual triangle:
    /// `(tri_center, edge_center, vertex_center)`.
    pub fn dual_triangle_vertices(&self, dt: Id) -> [Id; 3] {
        let de0 = self.d_be0.subpart(dt);
        let de1 = self.d_be1.subpart(dt);
        [
            self.d_bv1.subpart(de0),
            self.d_bv0.subpart(de0),
            self.d_bv0.subpart(de1),
        ]
    }

    /// The dual cells forming the Poincaré dual of primal k-simplex `x`:
    /// dual triangle ids for `k = 0`, dual edge ids for `k = 1`,
    /// the dual vertex key for `k = 2`.
    pub fn elementary_duals(&self, k: usize, x: Id) -> Vec<Id> {
        match k {
            0 => self
                .d_bv0
                .incident(self.vertex_center(x))
                .iter()
                .flat_map(|&de| self.d_be1.incident(de).iter().copied())
                .collect(),
            1 => self.d_bv0.incident(self.edge_center(x)).to_vec(),
            2 => vec![self.triangle_center(x)],
            _ => panic!("no {k}-simplices in a 2D complex"),
        }
    }

    /// Place dual points by the given rule and compute all volumes.
    pub fn subdivide_duals(&mut self, rule: SubdivisionRule) -> Result<(), DecError> {
        let primal = self.primal;
        let nv = primal.nv();
        let ne = primal.ne();
        let nt = primal.nt();

        let mut dual_point = Vec::with_capacity(nv + ne + nt);
        dual_point.extend(primal.points().iter().copied());
        for e in primal.edges() {
            let pts = [primal.point(primal.src(e)), primal.point(primal.tgt(e))];
            dual_point.push(rule.apply(&pts)?);
        }
        for t in primal.triangles() {
            let pts = primal.triangle_vertices(t).map(|v| primal.point(v));
            dual_point.push(rule.apply(&pts)?);
        }

        let primal_vol = [
            vec![1.0; nv],
            primal
                .edges()
                .map(|e| (primal.point(primal.tgt(e)) - primal.point(primal.src(e))).norm())
                .collect(),
            primal
                .triangles()
                .map(|t| geometry::volume(&primal.triangle_vertices(t).map(|v| primal.point(v))))
                .collect(),
        ];

        // dual 1-cells of primal edges: the tri_center → edge_center pieces
        let mut edge_duals = vec![0.0; ne];
        for de in self.blocks.tri_edge..self.blocks.tri_vertex {
            let ec = self.d_bv0.subpart(de);
            let tc = self.d_bv1.subpart(de);
            edge_duals[ec - nv] += (dual_point[tc] - dual_point[ec]).norm();
        }

        // dual 2-cells of primal vertices: unions of corner triangles
        let mut vertex_duals = vec![0.0; nv];
        for dt in self.dual_triangles.iter() {
            let [tc, ec, vc] = self.dual_triangle_vertices(dt);
            let pts = [dual_point[tc], dual_point[ec], dual_point[vc]];
            vertex_duals[vc] += geometry::volume(&pts);
        }

        let dual_vol = [vertex_duals, edge_duals, vec![1.0; nt]];

        self.metric = Some(Metric {
            dual_point,
            primal_vol,
            dual_vol,
            rule,
        });
        Ok(())
    }

    pub(crate) fn metric(&self) -> Result<&Metric<N, 3>, DecError> {
        self.metric.as_ref().ok_or(DecError::Unsubdivided)
    }

    /// The point placed into a dual vertex by `subdivide_duals`.
    pub fn dual_point(&self, dv: Id) -> Result<na::SVector<f64, N>, DecError> {
        Ok(self.metric()?.dual_point[dv])
    }

    /// Unsigned volume of primal k-simplex `x` (1 for vertices).
    pub fn primal_volume(&self, k: usize, x: Id) -> Result<f64, DecError> {
        Ok(self.metric()?.primal_vol[k][x])
    }

    /// Unsigned volume of the dual (2−k)-cell of primal k-simplex `x`.
    pub fn dual_volume(&self, k: usize, x: Id) -> Result<f64, DecError> {
        Ok(self.metric()?.dual_vol[k][x])
    }

    /// Vectorized [`primal_volume`][Self::primal_volume] over an id slice.
    pub fn primal_volumes(&self, k: usize, xs: &[Id]) -> Result<Vec<f64>, DecError> {
        let vols = &self.metric()?.primal_vol[k];
        Ok(xs.iter().map(|&x| vols[x]).collect())
    }

    /// Vectorized [`dual_volume`][Self::dual_volume] over an id slice.
    pub fn dual_volumes(&self, k: usize, xs: &[Id]) -> Result<Vec<f64>, DecError> {
        let vols = &self.metric()?.dual_vol[k];
        Ok(xs.iter().map(|&x| vols[x]).collect())
    }

    /// The rule the dual points were placed with,
    /// or `None` before `subdivide_duals`.
    pub fn subdivision_rule(&self) -> Option<SubdivisionRule> {
        self.metric.as_ref().map(|m| m.rule)
    }
}
