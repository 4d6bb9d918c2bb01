//! Discrete exterior calculus on 1D and 2D semi-simplicial sets.
//!
//! `deltadec` builds the dual subdivision of a piecewise-linear mesh and
//! assembles the sparse operators used to discretize PDEs on it: the
//! exterior derivative and boundary, diagonal and geometric Hodge stars,
//! the codifferential and Laplace–de Rham operators, the wedge product,
//! the musical isomorphisms flat and sharp, the interior product and the
//! Lie derivative.
//!
//! # Building a mesh
//!
//! A mesh is an [`EmbeddedDeltaSet1D`] or [`EmbeddedDeltaSet2D`]: an
//! ordered simplicial complex with per-simplex orientations and a point
//! in ℝⁿ at every vertex. Triangles are best added with
//! [`glue_triangle`][delta_set::EmbeddedDeltaSet2D::glue_triangle],
//! which reuses existing edges and keeps the simplicial identities.
//!
//! ```
//! use deltadec::{Vec2, EmbeddedDeltaSet2D};
//!
//! let mut mesh: EmbeddedDeltaSet2D = EmbeddedDeltaSet2D::new();
//! mesh.add_vertices([
//!     Vec2::new(0.0, 0.0),
//!     Vec2::new(1.0, 0.0),
//!     Vec2::new(0.0, 1.0),
//! ]);
//! mesh.glue_triangle(0, 1, 2, true).unwrap();
//! ```
//!
//! # Operators
//!
//! Metric operators live on a dual complex, which borrows the primal
//! mesh (freezing it) and must be subdivided before use:
//!
//! ```
//! # use deltadec::{Vec2, EmbeddedDeltaSet2D};
//! use deltadec::{DualComplex2D, HodgeKind, PrimalForm, SubdivisionRule};
//!
//! # let mut mesh: EmbeddedDeltaSet2D = EmbeddedDeltaSet2D::new();
//! # mesh.add_vertices([Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)]);
//! # mesh.glue_triangle(0, 1, 2, true).unwrap();
//! let mut dual = DualComplex2D::new(&mesh);
//! dual.subdivide_duals(SubdivisionRule::Barycenter)?;
//!
//! let laplacian = dual.laplace_de_rham::<0>(HodgeKind::Geometric)?;
//! let f = PrimalForm::<0>::zeros(3);
//! let lf = laplacian.apply(&f)?;
//! assert_eq!(lf.len(), 3);
//! # Ok::<(), deltadec::DecError>(())
//! ```
//!
//! Forms and chains are tagged with their dimension and with the
//! [`Primal`]/[`Dual`] side at the type level, so an operator cannot be
//! applied to the wrong kind of vector; mismatched lengths are caught at
//! runtime as [`DecError::DimensionMismatch`].
//!
//! The geometric Hodge star's sign convention on meshes whose components
//! are deliberately left inconsistently oriented is only validated
//! empirically for consistently oriented components; run
//! [`orient`][delta_set::OrientedDeltaSet2D::orient] first when in doubt.

#![warn(missing_docs)]

pub mod store;

pub mod delta_set;
#[doc(inline)]
pub use delta_set::{
    DeltaSet1D, DeltaSet2D, EmbeddedDeltaSet1D, EmbeddedDeltaSet2D, Orientation,
    OrientedDeltaSet1D, OrientedDeltaSet2D,
};

pub mod geometry;

pub mod dual;
#[doc(inline)]
pub use dual::{DualComplex1D, DualComplex2D, PrimalSimplex, SubdivisionRule};

pub mod cochain;
#[doc(inline)]
pub use cochain::{Chain, Cochain, Dual, DualForm, Primal, PrimalForm};

pub mod operator;
#[doc(inline)]
pub use operator::{
    DualVectorField, HodgeKind, MatrixOperator, Op, Operand, PrimalVectorField,
};

pub mod orientation;

mod error;
pub use error::DecError;

// nalgebra re-exports of common types for convenience

pub use nalgebra as na;
/// Type alias for a 2D `nalgebra` vector.
pub type Vec2 = na::Vector2<f64>;
/// Type alias for a 3D `nalgebra` vector.
pub type Vec3 = na::Vector3<f64>;
