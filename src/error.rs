//! Error types shared across the crate.

/// Errors produced by mesh construction and operator assembly.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DecError {
    /// A mutation would break the simplicial identities,
    /// e.g. `glue_triangle` asked to connect vertices in an order
    /// that disagrees with an edge it would have to create or reuse.
    #[error("invalid topology: {0}")]
    InvalidTopology(&'static str),
    /// A simplex has zero or near-zero volume,
    /// making a metric operator (Hodge star, codifferential, Laplacian, sharp)
    /// non-invertible.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),
    /// A connected component cannot be consistently oriented.
    /// The public [`orient`][crate::delta_set::OrientedDeltaSet2D::orient]
    /// pass reports this as a `false` return and writes nothing.
    #[error("complex is not orientable")]
    NonOrientable,
    /// An operator was applied to a cochain or chain
    /// whose length doesn't match the simplex count of its dimension.
    #[error("dimension mismatch: operator expects length {expected}, got {found}")]
    DimensionMismatch {
        /// Number of cells the operator acts on.
        expected: usize,
        /// Length of the vector it was given.
        found: usize,
    },
    /// A metric operator was requested before [`subdivide_duals`
    /// ][crate::dual::DualComplex2D::subdivide_duals] placed the dual points.
    #[error("dual complex has no subdivision; call subdivide_duals first")]
    Unsubdivided,
}
