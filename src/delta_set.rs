//! Primal semi-simplicial sets in one and two dimensions.
//!
//! A delta set is an ordered simplicial complex: simplices know their faces
//! through explicit face maps but carry no degeneracies. The 2D face maps
//! satisfy the simplicial identities
//! `src(e₁) = src(e₂)`, `tgt(e₂) = src(e₀)`, `tgt(e₀) = tgt(e₁)`,
//! which [`glue_triangle`][DeltaSet2D::glue_triangle] preserves by
//! construction and the lower-level [`add_triangle`
//! ][DeltaSet2D::add_triangle] leaves to the caller.

use nalgebra as na;

use crate::{
    error::DecError,
    store::{Column, Id, Morphism, PartTable},
};

/// The alphabet orientations are drawn from.
///
/// Operators never branch on the concrete type; they sign everything
/// through [`to_sign`][Orientation::to_sign] and flip through
/// [`negate`][Orientation::negate].
pub trait Orientation: Copy + std::fmt::Debug + PartialEq {
    /// The reversed orientation.
    fn negate(self) -> Self;
    /// This orientation as a sign, `+1.0` or `-1.0`.
    fn to_sign(self) -> f64;
    /// The orientation corresponding to a sign.
    fn from_sign(sign: f64) -> Self;
}

impl Orientation for bool {
    #[inline]
    fn negate(self) -> Self {
        !self
    }
    #[inline]
    fn to_sign(self) -> f64 {
        if self {
            1.0
        } else {
            -1.0
        }
    }
    #[inline]
    fn from_sign(sign: f64) -> Self {
        sign > 0.0
    }
}

impl Orientation for f64 {
    #[inline]
    fn negate(self) -> Self {
        -self
    }
    #[inline]
    fn to_sign(self) -> f64 {
        if self >= 0.0 {
            1.0
        } else {
            -1.0
        }
    }
    #[inline]
    fn from_sign(sign: f64) -> Self {
        sign.signum()
    }
}

//
// 1D
//

/// A 1-dimensional delta set: vertices and directed edges.
///
/// The face maps are `∂(1,0) = tgt` and `∂(1,1) = src`.
#[derive(Clone, Debug, Default)]
pub struct DeltaSet1D {
    vertices: PartTable,
    edges: PartTable,
    /// ∂v0, the target vertex of each edge.
    bv0: Morphism,
    /// ∂v1, the source vertex of each edge.
    bv1: Morphism,
}

impl DeltaSet1D {
    /// Create an empty complex.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices.
    #[inline]
    pub fn nv(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    #[inline]
    pub fn ne(&self) -> usize {
        self.edges.len()
    }

    /// Iterate over vertex ids.
    #[inline]
    pub fn vertices(&self) -> std::ops::Range<Id> {
        self.vertices.iter()
    }

    /// Iterate over edge ids.
    #[inline]
    pub fn edges(&self) -> std::ops::Range<Id> {
        self.edges.iter()
    }

    /// Append a vertex.
    pub fn add_vertex(&mut self) -> Id {
        self.vertices.add_part()
    }

    /// Append `n` vertices, returning their id range.
    pub fn add_vertices(&mut self, n: usize) -> std::ops::Range<Id> {
        self.vertices.add_parts(n)
    }

    /// Append an edge from `src` to `tgt`.
    pub fn add_edge(&mut self, src: Id, tgt: Id) -> Id {
        let e = self.edges.add_part();
        self.bv0.push(tgt);
        self.bv1.push(src);
        e
    }

    /// Append edges from an iterator of `(src, tgt)` pairs.
    pub fn add_edges(&mut self, pairs: impl IntoIterator<Item = (Id, Id)>) -> std::ops::Range<Id> {
        let start = self.ne();
        for (s, t) in pairs {
            self.add_edge(s, t);
        }
        start..self.ne()
    }

    /// Append the edge `min(a,b) → max(a,b)`.
    pub fn add_sorted_edge(&mut self, a: Id, b: Id) -> Id {
        self.add_edge(a.min(b), a.max(b))
    }

    /// Source vertex of an edge.
    #[inline]
    pub fn src(&self, e: Id) -> Id {
        self.bv1.subpart(e)
    }

    /// Target vertex of an edge.
    #[inline]
    pub fn tgt(&self, e: Id) -> Id {
        self.bv0.subpart(e)
    }

    /// The face map `∂(1,i)`: `i = 0` is the target, `i = 1` the source.
    #[inline]
    pub fn edge_face(&self, i: usize, e: Id) -> Id {
        match i {
            0 => self.tgt(e),
            1 => self.src(e),
            _ => panic!("edge face index out of range: {i}"),
        }
    }

    /// Edges with source `v`, in id order.
    #[inline]
    pub fn edges_with_src(&self, v: Id) -> &[Id] {
        self.bv1.incident(v)
    }

    /// Edges with target `v`, in id order.
    #[inline]
    pub fn edges_with_tgt(&self, v: Id) -> &[Id] {
        self.bv0.incident(v)
    }

    /// All edges from `a` to `b`, in id order.
    pub fn edges_between(&self, a: Id, b: Id) -> Vec<Id> {
        self.edges_with_src(a)
            .iter()
            .copied()
            .filter(|&e| self.tgt(e) == b)
            .collect()
    }
}

/// A 1D delta set with a per-edge orientation.
#[derive(Clone, Debug, Default)]
pub struct OrientedDeltaSet1D<O: Orientation = bool> {
    set: DeltaSet1D,
    edge_orientation: Column<O>,
}

impl<O: Orientation> std::ops::Deref for OrientedDeltaSet1D<O> {
    type Target = DeltaSet1D;

    fn deref(&self) -> &Self::Target {
        &self.set
    }
}

impl<O: Orientation> OrientedDeltaSet1D<O> {
    /// Create an empty complex.
    pub fn new() -> Self {
        Self {
            set: DeltaSet1D::new(),
            edge_orientation: Column::default(),
        }
    }

    /// Append a vertex.
    pub fn add_vertex(&mut self) -> Id {
        self.set.add_vertex()
    }

    /// Append `n` vertices.
    pub fn add_vertices(&mut self, n: usize) -> std::ops::Range<Id> {
        self.set.add_vertices(n)
    }

    /// Append an edge from `src` to `tgt` with the given orientation.
    pub fn add_edge(&mut self, src: Id, tgt: Id, orientation: O) -> Id {
        let e = self.set.add_edge(src, tgt);
        self.edge_orientation.push(orientation);
        e
    }

    /// Append edges from an iterator of `(src, tgt, orientation)` triples.
    pub fn add_edges(
        &mut self,
        edges: impl IntoIterator<Item = (Id, Id, O)>,
    ) -> std::ops::Range<Id> {
        let start = self.ne();
        for (s, t, o) in edges {
            self.add_edge(s, t, o);
        }
        start..self.ne()
    }

    /// Append the positively oriented edge `min(a,b) → max(a,b)`.
    pub fn add_sorted_edge(&mut self, a: Id, b: Id) -> Id {
        self.add_edge(a.min(b), a.max(b), O::from_sign(1.0))
    }

    /// Orientation of an edge.
    #[inline]
    pub fn edge_orientation(&self, e: Id) -> O {
        self.edge_orientation.subpart(e)
    }

    /// Overwrite the orientation of an edge.
    pub fn set_edge_orientation(&mut self, e: Id, orientation: O) {
        self.edge_orientation.set_subpart(e, orientation);
    }

    /// The structural nonzeros of the boundary chain of an edge:
    /// `σ·(+1 on tgt, −1 on src)`.
    pub fn boundary_edge_nz(&self, e: Id) -> [(Id, f64); 2] {
        let sign = self.edge_orientation(e).to_sign();
        [(self.tgt(e), sign), (self.src(e), -sign)]
    }
}

/// A 1D oriented delta set with a point in ℝⁿ at every vertex.
#[derive(Clone, Debug, Default)]
pub struct EmbeddedDeltaSet1D<O: Orientation = bool, const N: usize = 2> {
    set: OrientedDeltaSet1D<O>,
    point: Column<na::SVector<f64, N>>,
}

impl<O: Orientation, const N: usize> std::ops::Deref for EmbeddedDeltaSet1D<O, N> {
    type Target = OrientedDeltaSet1D<O>;

    fn deref(&self) -> &Self::Target {
        &self.set
    }
}

impl<O: Orientation, const N: usize> EmbeddedDeltaSet1D<O, N> {
    /// Create an empty complex.
    pub fn new() -> Self {
        Self {
            set: OrientedDeltaSet1D::new(),
            point: Column::default(),
        }
    }

    /// Append a vertex at `point`.
    pub fn add_vertex(&mut self, point: na::SVector<f64, N>) -> Id {
        let v = self.set.add_vertex();
        self.point.push(point);
        v
    }

    /// Append a vertex for each point in the iterator.
    pub fn add_vertices(
        &mut self,
        points: impl IntoIterator<Item = na::SVector<f64, N>>,
    ) -> std::ops::Range<Id> {
        let start = self.nv();
        for p in points {
            self.add_vertex(p);
        }
        start..self.nv()
    }

    /// Append an edge from `src` to `tgt` with the given orientation.
    pub fn add_edge(&mut self, src: Id, tgt: Id, orientation: O) -> Id {
        self.set.add_edge(src, tgt, orientation)
    }

    /// Append edges from an iterator of `(src, tgt, orientation)` triples.
    pub fn add_edges(
        &mut self,
        edges: impl IntoIterator<Item = (Id, Id, O)>,
    ) -> std::ops::Range<Id> {
        self.set.add_edges(edges)
    }

    /// Append the positively oriented edge `min(a,b) → max(a,b)`.
    pub fn add_sorted_edge(&mut self, a: Id, b: Id) -> Id {
        self.set.add_sorted_edge(a, b)
    }

    /// Overwrite the orientation of an edge.
    pub fn set_edge_orientation(&mut self, e: Id, orientation: O) {
        self.set.set_edge_orientation(e, orientation);
    }

    /// The point attached to a vertex.
    #[inline]
    pub fn point(&self, v: Id) -> na::SVector<f64, N> {
        self.point.subpart(v)
    }

    /// All vertex points in id order.
    #[inline]
    pub fn points(&self) -> &[na::SVector<f64, N>] {
        self.point.as_slice()
    }
}

//
// 2D
//

/// A 2-dimensional delta set: vertices, directed edges and triangles.
///
/// A triangle `t` has edge faces `e₀ = ∂(2,0,t)`, `e₁ = ∂(2,1,t)`,
/// `e₂ = ∂(2,2,t)` running `v₁→v₂`, `v₀→v₂` and `v₀→v₁` respectively.
#[derive(Clone, Debug, Default)]
pub struct DeltaSet2D {
    skeleton: DeltaSet1D,
    triangles: PartTable,
    be0: Morphism,
    be1: Morphism,
    be2: Morphism,
}

impl std::ops::Deref for DeltaSet2D {
    type Target = DeltaSet1D;

    fn deref(&self) -> &Self::Target {
        &self.skeleton
    }
}

impl DeltaSet2D {
    /// Create an empty complex.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triangles.
    #[inline]
    pub fn nt(&self) -> usize {
        self.triangles.len()
    }

    /// Iterate over triangle ids.
    #[inline]
    pub fn triangles(&self) -> std::ops::Range<Id> {
        self.triangles.iter()
    }

    /// Append a vertex.
    pub fn add_vertex(&mut self) -> Id {
        self.skeleton.add_vertex()
    }

    /// Append `n` vertices.
    pub fn add_vertices(&mut self, n: usize) -> std::ops::Range<Id> {
        self.skeleton.add_vertices(n)
    }

    /// Append an edge from `src` to `tgt`.
    pub fn add_edge(&mut self, src: Id, tgt: Id) -> Id {
        self.skeleton.add_edge(src, tgt)
    }

    /// Append edges from an iterator of `(src, tgt)` pairs.
    pub fn add_edges(&mut self, pairs: impl IntoIterator<Item = (Id, Id)>) -> std::ops::Range<Id> {
        self.skeleton.add_edges(pairs)
    }

    /// Append the edge `min(a,b) → max(a,b)`.
    pub fn add_sorted_edge(&mut self, a: Id, b: Id) -> Id {
        self.skeleton.add_sorted_edge(a, b)
    }

    /// Append a triangle with the given edge faces:
    /// `∂e₂ = e_first` (v₀→v₁), `∂e₀ = e_last` (v₁→v₂),
    /// `∂e₁ = tgt_edge` (v₀→v₂).
    ///
    /// The simplicial identities are the caller's responsibility;
    /// they are checked in debug builds only.
    /// Use [`glue_triangle`][Self::glue_triangle] to have them guaranteed.
    pub fn add_triangle(&mut self, e_first: Id, e_last: Id, tgt_edge: Id) -> Id {
        debug_assert!(
            self.src(tgt_edge) == self.src(e_first)
                && self.tgt(e_first) == self.src(e_last)
                && self.tgt(e_last) == self.tgt(tgt_edge),
            "add_triangle would violate the simplicial identities",
        );
        let t = self.triangles.add_part();
        self.be0.push(e_last);
        self.be1.push(tgt_edge);
        self.be2.push(e_first);
        t
    }

    /// Append the triangle on `v₀, v₁, v₂`, reusing the first existing edge
    /// between each vertex pair and creating sorted edges for the rest.
    ///
    /// This is the only triangle constructor that guarantees the simplicial
    /// identities. Fails with [`DecError::InvalidTopology`] when a needed
    /// edge could only be created against the requested vertex order;
    /// [`glue_sorted_triangle`][Self::glue_sorted_triangle] never does.
    pub fn glue_triangle(&mut self, v0: Id, v1: Id, v2: Id) -> Result<Id, DecError> {
        let e_first = self.get_or_add_edge(v0, v1)?;
        let e_last = self.get_or_add_edge(v1, v2)?;
        let tgt_edge = self.get_or_add_edge(v0, v2)?;
        Ok(self.add_triangle(e_first, e_last, tgt_edge))
    }

    /// [`glue_triangle`][Self::glue_triangle] with the vertices sorted first.
    pub fn glue_sorted_triangle(&mut self, v0: Id, v1: Id, v2: Id) -> Result<Id, DecError> {
        let mut vs = [v0, v1, v2];
        vs.sort_unstable();
        self.glue_triangle(vs[0], vs[1], vs[2])
    }

    fn get_or_add_edge(&mut self, src: Id, tgt: Id) -> Result<Id, DecError> {
        if let Some(&e) = self.edges_between(src, tgt).first() {
            return Ok(e);
        }
        if src > tgt {
            return Err(DecError::InvalidTopology(
                "gluing would need an edge against its sorted order; \
                 use glue_sorted_triangle or add the edge explicitly",
            ));
        }
        Ok(self.add_sorted_edge(src, tgt))
    }

    /// The face map `∂(2,i)` of a triangle.
    #[inline]
    pub fn triangle_face(&self, i: usize, t: Id) -> Id {
        match i {
            0 => self.be0.subpart(t),
            1 => self.be1.subpart(t),
            2 => self.be2.subpart(t),
            _ => panic!("triangle face index out of range: {i}"),
        }
    }

    /// The edge faces `(∂e₀, ∂e₁, ∂e₂)` of a triangle.
    #[inline]
    pub fn triangle_edges(&self, t: Id) -> [Id; 3] {
        [
            self.be0.subpart(t),
            self.be1.subpart(t),
            self.be2.subpart(t),
        ]
    }

    /// The vertices `(v₀, v₁, v₂)` of a triangle,
    /// read off the face maps as `src(e₁), tgt(e₂), tgt(e₁)`.
    #[inline]
    pub fn triangle_vertices(&self, t: Id) -> [Id; 3] {
        let e1 = self.be1.subpart(t);
        let e2 = self.be2.subpart(t);
        [self.src(e1), self.tgt(e2), self.tgt(e1)]
    }

    /// Triangles with `e` as their `i`-th edge face (the coface map).
    #[inline]
    pub fn triangles_with_face(&self, i: usize, e: Id) -> &[Id] {
        match i {
            0 => self.be0.incident(e),
            1 => self.be1.incident(e),
            2 => self.be2.incident(e),
            _ => panic!("triangle face index out of range: {i}"),
        }
    }
}

/// A 2D delta set with orientations on edges and triangles.
#[derive(Clone, Debug, Default)]
pub struct OrientedDeltaSet2D<O: Orientation = bool> {
    set: DeltaSet2D,
    edge_orientation: Column<O>,
    tri_orientation: Column<O>,
}

impl<O: Orientation> std::ops::Deref for OrientedDeltaSet2D<O> {
    type Target = DeltaSet2D;

    fn deref(&self) -> &Self::Target {
        &self.set
    }
}

impl<O: Orientation> OrientedDeltaSet2D<O> {
    /// Create an empty complex.
    pub fn new() -> Self {
        Self {
            set: DeltaSet2D::new(),
            edge_orientation: Column::default(),
            tri_orientation: Column::default(),
        }
    }

    /// Append a vertex.
    pub fn add_vertex(&mut self) -> Id {
        self.set.add_vertex()
    }

    /// Append `n` vertices.
    pub fn add_vertices(&mut self, n: usize) -> std::ops::Range<Id> {
        self.set.add_vertices(n)
    }

    /// Append an edge from `src` to `tgt` with the given orientation.
    pub fn add_edge(&mut self, src: Id, tgt: Id, orientation: O) -> Id {
        let e = self.set.add_edge(src, tgt);
        self.edge_orientation.push(orientation);
        e
    }

    /// Append edges from an iterator of `(src, tgt, orientation)` triples.
    pub fn add_edges(
        &mut self,
        edges: impl IntoIterator<Item = (Id, Id, O)>,
    ) -> std::ops::Range<Id> {
        let start = self.ne();
        for (s, t, o) in edges {
            self.add_edge(s, t, o);
        }
        start..self.ne()
    }

    /// Append the positively oriented edge `min(a,b) → max(a,b)`.
    pub fn add_sorted_edge(&mut self, a: Id, b: Id) -> Id {
        self.add_edge(a.min(b), a.max(b), O::from_sign(1.0))
    }

    /// Append a triangle with the given edge faces and orientation;
    /// see [`DeltaSet2D::add_triangle`] for the face conventions.
    pub fn add_triangle(&mut self, e_first: Id, e_last: Id, tgt_edge: Id, orientation: O) -> Id {
        let t = self.set.add_triangle(e_first, e_last, tgt_edge);
        self.tri_orientation.push(orientation);
        t
    }

    /// Glue a triangle onto `v₀, v₁, v₂` with the given orientation,
    /// creating positively oriented sorted edges where needed.
    pub fn glue_triangle(&mut self, v0: Id, v1: Id, v2: Id, orientation: O) -> Result<Id, DecError> {
        let e_first = self.get_or_add_edge(v0, v1)?;
        let e_last = self.get_or_add_edge(v1, v2)?;
        let tgt_edge = self.get_or_add_edge(v0, v2)?;
        Ok(self.add_triangle(e_first, e_last, tgt_edge, orientation))
    }

    /// [`glue_triangle`][Self::glue_triangle] with the vertices sorted first.
    pub fn glue_sorted_triangle(
        &mut self,
        v0: Id,
        v1: Id,
        v2: Id,
        orientation: O,
    ) -> Result<Id, DecError> {
        let mut vs = [v0, v1, v2];
        vs.sort_unstable();
        self.glue_triangle(vs[0], vs[1], vs[2], orientation)
    }

    fn get_or_add_edge(&mut self, src: Id, tgt: Id) -> Result<Id, DecError> {
        if let Some(&e) = self.edges_between(src, tgt).first() {
            return Ok(e);
        }
        if src > tgt {
            return Err(DecError::InvalidTopology(
                "gluing would need an edge against its sorted order; \
                 use glue_sorted_triangle or add the edge explicitly",
            ));
        }
        Ok(self.add_sorted_edge(src, tgt))
    }

    /// Orientation of an edge.
    #[inline]
    pub fn edge_orientation(&self, e: Id) -> O {
        self.edge_orientation.subpart(e)
    }

    /// Orientation of a triangle.
    #[inline]
    pub fn tri_orientation(&self, t: Id) -> O {
        self.tri_orientation.subpart(t)
    }

    /// Overwrite the orientation of an edge.
    pub fn set_edge_orientation(&mut self, e: Id, orientation: O) {
        self.edge_orientation.set_subpart(e, orientation);
    }

    /// Overwrite the orientation of a triangle.
    pub fn set_tri_orientation(&mut self, t: Id, orientation: O) {
        self.tri_orientation.set_subpart(t, orientation);
    }

    /// The structural nonzeros of the boundary chain of an edge:
    /// `σ·(+1 on tgt, −1 on src)`.
    pub fn boundary_edge_nz(&self, e: Id) -> [(Id, f64); 2] {
        let sign = self.edge_orientation(e).to_sign();
        [(self.tgt(e), sign), (self.src(e), -sign)]
    }

    /// The structural nonzeros of the boundary chain of a triangle:
    /// `τ·(σ₀·e₀ − σ₁·e₁ + σ₂·e₂)`.
    pub fn boundary_triangle_nz(&self, t: Id) -> [(Id, f64); 3] {
        let tau = self.tri_orientation(t).to_sign();
        let [e0, e1, e2] = self.triangle_edges(t);
        [
            (e0, tau * self.edge_orientation(e0).to_sign()),
            (e1, -tau * self.edge_orientation(e1).to_sign()),
            (e2, tau * self.edge_orientation(e2).to_sign()),
        ]
    }
}

/// A 2D oriented delta set with a point in ℝⁿ at every vertex.
#[derive(Clone, Debug, Default)]
pub struct EmbeddedDeltaSet2D<O: Orientation = bool, const N: usize = 2> {
    set: OrientedDeltaSet2D<O>,
    point: Column<na::SVector<f64, N>>,
}

impl<O: Orientation, const N: usize> std::ops::Deref for EmbeddedDeltaSet2D<O, N> {
    type Target = OrientedDeltaSet2D<O>;

    fn deref(&self) -> &Self::Target {
        &self.set
    }
}

impl<O: Orientation, const N: usize> EmbeddedDeltaSet2D<O, N> {
    /// Create an empty complex.
    pub fn new() -> Self {
        Self {
            set: OrientedDeltaSet2D::new(),
            point: Column::default(),
        }
    }

    /// Append a vertex at `point`.
    pub fn add_vertex(&mut self, point: na::SVector<f64, N>) -> Id {
        let v = self.set.add_vertex();
        self.point.push(point);
        v
    }

    /// Append a vertex for each point in the iterator.
    pub fn add_vertices(
        &mut self,
        points: impl IntoIterator<Item = na::SVector<f64, N>>,
    ) -> std::ops::Range<Id> {
        let start = self.nv();
        for p in points {
            self.add_vertex(p);
        }
        start..self.nv()
    }

    /// Append an edge from `src` to `tgt` with the given orientation.
    pub fn add_edge(&mut self, src: Id, tgt: Id, orientation: O) -> Id {
        self.set.add_edge(src, tgt, orientation)
    }

    /// Append edges from an iterator of `(src, tgt, orientation)` triples.
    pub fn add_edges(
        &mut self,
        edges: impl IntoIterator<Item = (Id, Id, O)>,
    ) -> std::ops::Range<Id> {
        self.set.add_edges(edges)
    }

    /// Append the positively oriented edge `min(a,b) → max(a,b)`.
    pub fn add_sorted_edge(&mut self, a: Id, b: Id) -> Id {
        self.set.add_sorted_edge(a, b)
    }

    /// Append a triangle with the given edge faces and orientation.
    pub fn add_triangle(&mut self, e_first: Id, e_last: Id, tgt_edge: Id, orientation: O) -> Id {
        self.set.add_triangle(e_first, e_last, tgt_edge, orientation)
    }

    /// Glue a triangle onto `v₀, v₁, v₂` with the given orientation.
    pub fn glue_triangle(&mut self, v0: Id, v1: Id, v2: Id, orientation: O) -> Result<Id, DecError> {
        self.set.glue_triangle(v0, v1, v2, orientation)
    }

    /// [`glue_triangle`][Self::glue_triangle] with the vertices sorted first.
    pub fn glue_sorted_triangle(
        &mut self,
        v0: Id,
        v1: Id,
        v2: Id,
        orientation: O,
    ) -> Result<Id, DecError> {
        self.set.glue_sorted_triangle(v0, v1, v2, orientation)
    }

    /// Overwrite the orientation of an edge.
    pub fn set_edge_orientation(&mut self, e: Id, orientation: O) {
        self.set.set_edge_orientation(e, orientation);
    }

    /// Overwrite the orientation of a triangle.
    pub fn set_tri_orientation(&mut self, t: Id, orientation: O) {
        self.set.set_tri_orientation(t, orientation);
    }

    /// The point attached to a vertex.
    #[inline]
    pub fn point(&self, v: Id) -> na::SVector<f64, N> {
        self.point.subpart(v)
    }

    /// All vertex points in id order.
    #[inline]
    pub fn points(&self) -> &[na::SVector<f64, N>] {
        self.point.as_slice()
    }

    /// The edge vector `σ·(point(tgt) − point(src))`.
    #[inline]
    pub fn edge_vector(&self, e: Id) -> na::SVector<f64, N> {
        self.edge_orientation(e).to_sign() * (self.point(self.tgt(e)) - self.point(self.src(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Vec2 = na::SVector<f64, 2>;

    #[test]
    fn glue_triangle_reuses_and_sorts_edges() {
        let mut s = DeltaSet2D::new();
        s.add_vertices(4);
        let t0 = s.glue_triangle(0, 1, 2).unwrap();
        let t1 = s.glue_triangle(0, 2, 3).unwrap();

        // first triangle created edges (0,1), (1,2), (0,2);
        // the second reuses (0,2) and adds (2,3), (0,3)
        assert_eq!(s.ne(), 5);
        assert_eq!(s.triangle_edges(t0), [1, 2, 0]);
        assert_eq!(s.triangle_edges(t1), [3, 4, 2]);
        assert_eq!(s.triangle_vertices(t0), [0, 1, 2]);
        assert_eq!(s.triangle_vertices(t1), [0, 2, 3]);
        assert_eq!(s.edges_between(0, 2), vec![2]);
    }

    #[test]
    fn simplicial_identities_hold_after_gluing() {
        let mut s = DeltaSet2D::new();
        s.add_vertices(5);
        s.glue_triangle(0, 1, 2).unwrap();
        s.glue_triangle(1, 2, 3).unwrap();
        s.glue_sorted_triangle(4, 3, 2).unwrap();

        for t in s.triangles() {
            let [e0, e1, e2] = s.triangle_edges(t);
            assert_eq!(s.src(e1), s.src(e2));
            assert_eq!(s.tgt(e2), s.src(e0));
            assert_eq!(s.tgt(e0), s.tgt(e1));
        }
    }

    #[test]
    fn glue_against_sorted_order_is_rejected() {
        let mut s = DeltaSet2D::new();
        s.add_vertices(3);
        assert!(matches!(
            s.glue_triangle(2, 1, 0),
            Err(DecError::InvalidTopology(_))
        ));
        // nothing was created by the failed glue beyond checked edges
        assert_eq!(s.nt(), 0);

        // the sorted variant handles the same request fine
        s.glue_sorted_triangle(2, 1, 0).unwrap();
        assert_eq!(s.nt(), 1);
    }

    #[test]
    fn boundary_chains_carry_orientation_signs() {
        let mut s = OrientedDeltaSet2D::<bool>::new();
        s.add_vertices(3);
        let t = s.glue_triangle(0, 1, 2, true).unwrap();

        let [e0, e1, e2] = s.triangle_edges(t);
        assert_eq!(
            s.boundary_triangle_nz(t),
            [(e0, 1.0), (e1, -1.0), (e2, 1.0)]
        );

        // flipping the triangle flips the whole chain
        s.set_tri_orientation(t, false);
        assert_eq!(
            s.boundary_triangle_nz(t),
            [(e0, -1.0), (e1, 1.0), (e2, -1.0)]
        );

        // flipping an edge flips only its term
        s.set_edge_orientation(e1, false);
        assert_eq!(
            s.boundary_triangle_nz(t),
            [(e0, -1.0), (e1, -1.0), (e2, -1.0)]
        );

        let e = s.edges_between(0, 1)[0];
        assert_eq!(s.boundary_edge_nz(e), [(1, 1.0), (0, -1.0)]);
    }

    #[test]
    fn embedded_points_and_edge_vectors() {
        let mut s = EmbeddedDeltaSet2D::<bool, 2>::new();
        s.add_vertices([
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ]);
        s.glue_triangle(0, 1, 2, true).unwrap();

        let e = s.edges_between(0, 1)[0];
        assert_eq!(s.edge_vector(e), Vec2::new(1.0, 0.0));
        s.set_edge_orientation(e, false);
        assert_eq!(s.edge_vector(e), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn orientation_alphabets_agree() {
        assert_eq!(true.to_sign(), 1.0);
        assert_eq!(false.to_sign(), -1.0);
        assert_eq!(true.negate(), false);
        assert_eq!(bool::from_sign(-1.0), false);
        assert_eq!((1.0f64).negate(), -1.0);
        assert_eq!(f64::from_sign(-3.5), -1.0);
        assert_eq!((-1.0f64).to_sign(), -1.0);
    }
}

/// Small meshes shared between the test modules of this crate,
/// in the spirit of keeping expected values hand-checkable.
#[cfg(test)]
pub(crate) mod test_meshes {
    use super::*;

    type Vec2 = na::SVector<f64, 2>;

    /// The unit right triangle (0,0), (1,0), (0,1).
    /// Edges: 0 = (0→1), 1 = (1→2), 2 = (0→2).
    pub fn right_triangle() -> EmbeddedDeltaSet2D<bool, 2> {
        let mut s = EmbeddedDeltaSet2D::new();
        s.add_vertices([
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ]);
        s.glue_triangle(0, 1, 2, true).unwrap();
        s
    }

    /// Equilateral triangle with side 1.
    pub fn equilateral_triangle() -> EmbeddedDeltaSet2D<bool, 2> {
        let mut s = EmbeddedDeltaSet2D::new();
        s.add_vertices([
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.5, f64::sqrt(3.0) / 2.0),
        ]);
        s.glue_triangle(0, 1, 2, true).unwrap();
        s
    }

    /// The square with corners (±1, ±1) split along a diagonal.
    /// Edges: 0 = (0→1), 1 = (1→2), 2 = (0→2), 3 = (2→3), 4 = (0→3).
    pub fn split_square() -> EmbeddedDeltaSet2D<bool, 2> {
        let mut s = EmbeddedDeltaSet2D::new();
        s.add_vertices([
            Vec2::new(-1.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(-1.0, -1.0),
        ]);
        s.glue_triangle(0, 1, 2, true).unwrap();
        s.glue_triangle(0, 2, 3, true).unwrap();
        s
    }

    /// A hexagon of six triangles around a center vertex.
    pub fn hexagon() -> EmbeddedDeltaSet2D<bool, 2> {
        let mut s = EmbeddedDeltaSet2D::new();
        s.add_vertices([
            Vec2::new(-0.5, 1.0),
            Vec2::new(0.5, 1.0),
            Vec2::new(-1.0, 0.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(-0.5, -1.0),
            Vec2::new(0.5, -1.0),
        ]);
        for (a, b, c) in [
            (0, 2, 3),
            (0, 1, 3),
            (1, 3, 4),
            (2, 3, 5),
            (3, 5, 6),
            (3, 4, 6),
        ] {
            s.glue_triangle(a, b, c, true).unwrap();
        }
        s
    }

    /// Five unit-spaced vertices on the x axis, joined left to right.
    pub fn path5() -> EmbeddedDeltaSet1D<bool, 2> {
        let mut s = EmbeddedDeltaSet1D::new();
        s.add_vertices((0..5).map(|i| Vec2::new(i as f64 - 2.0, 0.0)));
        for i in 0..4 {
            s.add_edge(i, i + 1, true);
        }
        s
    }

    /// Three vertices on the x axis with edge lengths 1 and 2.
    pub fn path3() -> EmbeddedDeltaSet1D<bool, 2> {
        let mut s = EmbeddedDeltaSet1D::new();
        s.add_vertices([
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(3.0, 0.0),
        ]);
        s.add_edge(0, 1, true);
        s.add_edge(1, 2, true);
        s
    }
}
