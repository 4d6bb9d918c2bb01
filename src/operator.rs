//! Sparse operator assembly: boundary and coboundary, Hodge stars,
//! codifferential, Laplacians, wedge product, musical isomorphisms,
//! interior product and Lie derivative.
//!
//! Every operator is assembled from structural nonzeros in natural id
//! order through a COO triplet builder and converted to CSR once.
//! Operators are pure functions of a subdivided dual complex and own
//! their matrices; applying one to a form of the wrong length fails
//! with [`DecError::DimensionMismatch`].

use nalgebra as na;
use nalgebra_sparse as nas;

use itertools::izip;

use crate::{
    cochain::{ChainImpl, CochainImpl, Dual, DualForm, Primal, PrimalForm},
    delta_set::Orientation,
    dual::{DualComplex1D, DualComplex2D, PrimalSimplex},
    error::DecError,
    geometry::DEGENERACY_EPS,
    store::Id,
};

/// Which discrete Hodge star to assemble.
///
/// [`Geometric`][HodgeKind::Geometric] differs from
/// [`Diagonal`][HodgeKind::Diagonal] only for 1-forms on a 2D complex;
/// everywhere else it falls back to the diagonal star.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HodgeKind {
    /// Diagonal star of dual/primal volume ratios.
    #[default]
    Diagonal,
    /// Symmetric star assembled per triangle from the subdivision
    /// geometry. Orientation-independent; reduces to the diagonal star
    /// when dual edges are perpendicular to their primal edges.
    Geometric,
}

/// Trait implemented by forms and chains so operators can construct and
/// deconstruct them generically.
pub trait Operand {
    /// The dimension tag, used to match operator domains at compile time.
    type Dimension;
    /// The primal/dual tag.
    type Primality;
    /// The underlying vector.
    fn values(&self) -> &na::DVector<f64>;
    /// Rebuild from a vector.
    fn from_values(values: na::DVector<f64>) -> Self;
}

impl<Dim, P> Operand for CochainImpl<Dim, P> {
    type Dimension = Dim;
    type Primality = P;

    fn values(&self) -> &na::DVector<f64> {
        &self.values
    }

    fn from_values(values: na::DVector<f64>) -> Self {
        Self::from_values(values)
    }
}

impl<Dim, P> Operand for ChainImpl<Dim, P> {
    type Dimension = Dim;
    type Primality = P;

    fn values(&self) -> &na::DVector<f64> {
        &self.coeffs
    }

    fn from_values(values: na::DVector<f64>) -> Self {
        Self::from_coeffs(values)
    }
}

/// A sparse linear operator between two kinds of form or chain.
///
/// Composition uses multiplication syntax, matching the order operators
/// are written in on paper: `(a * b).apply(x) == a.apply(&b.apply(x))`.
#[derive(Clone, Debug)]
pub struct MatrixOperator<Input, Output> {
    mat: nas::CsrMatrix<f64>,
    _marker: std::marker::PhantomData<(Input, Output)>,
}

/// Shorthand for [`MatrixOperator`].
pub type Op<Input, Output> = MatrixOperator<Input, Output>;

impl<Input, Output> MatrixOperator<Input, Output>
where
    Input: Operand,
    Output: Operand,
{
    pub(crate) fn new(mat: nas::CsrMatrix<f64>) -> Self {
        Self {
            mat,
            _marker: std::marker::PhantomData,
        }
    }

    /// Apply the operator to a form or chain.
    pub fn apply(&self, input: &Input) -> Result<Output, DecError> {
        let values = input.values();
        if values.len() != self.mat.ncols() {
            return Err(DecError::DimensionMismatch {
                expected: self.mat.ncols(),
                found: values.len(),
            });
        }
        Ok(Output::from_values(&self.mat * values))
    }

    /// The assembled matrix.
    #[inline]
    pub fn matrix(&self) -> &nas::CsrMatrix<f64> {
        &self.mat
    }

    /// Consume the operator, yielding its matrix.
    #[inline]
    pub fn into_matrix(self) -> nas::CsrMatrix<f64> {
        self.mat
    }
}

impl<I, O> PartialEq for MatrixOperator<I, O> {
    fn eq(&self, other: &Self) -> bool {
        self.mat == other.mat
    }
}

impl<I, M, O> std::ops::Mul<MatrixOperator<I, M>> for MatrixOperator<M, O>
where
    I: Operand,
    M: Operand,
    O: Operand,
{
    type Output = MatrixOperator<I, O>;

    fn mul(self, rhs: MatrixOperator<I, M>) -> Self::Output {
        MatrixOperator::new(&self.mat * &rhs.mat)
    }
}

impl<I, O> std::ops::Mul<MatrixOperator<I, O>> for f64
where
    I: Operand,
    O: Operand,
{
    type Output = MatrixOperator<I, O>;

    fn mul(self, mut rhs: MatrixOperator<I, O>) -> Self::Output {
        rhs.mat *= self;
        rhs
    }
}

/// A vector field sampled at the dual vertices of the top-dimensional
/// cells (triangle centers in 2D), the flat operator's input.
#[derive(Clone, Debug, PartialEq)]
pub struct DualVectorField<const N: usize>(pub Vec<na::SVector<f64, N>>);

/// A vector field sampled at the primal vertices, the sharp operator's
/// output.
#[derive(Clone, Debug, PartialEq)]
pub struct PrimalVectorField<const N: usize>(pub Vec<na::SVector<f64, N>>);

//
// assembly helpers
//

/// Build a CSR matrix from triplets pushed in natural id order.
/// Duplicate entries are summed.
fn csr_from_triplets(
    nrows: usize,
    ncols: usize,
    triplets: impl IntoIterator<Item = (usize, usize, f64)>,
) -> nas::CsrMatrix<f64> {
    let mut coo = nas::CooMatrix::new(nrows, ncols);
    for (r, c, v) in triplets {
        coo.push(r, c, v);
    }
    nas::CsrMatrix::from(&coo)
}

fn csr_from_diagonal(diag: &[f64]) -> nas::CsrMatrix<f64> {
    csr_from_triplets(
        diag.len(),
        diag.len(),
        diag.iter().enumerate().map(|(i, &v)| (i, i, v)),
    )
}

fn csr_from_dense(mat: &na::DMatrix<f64>) -> nas::CsrMatrix<f64> {
    csr_from_triplets(
        mat.nrows(),
        mat.ncols(),
        (0..mat.nrows()).flat_map(|r| {
            (0..mat.ncols()).filter_map(move |c| {
                let v = mat[(r, c)];
                (v != 0.0).then_some((r, c, v))
            })
        }),
    )
}

fn invert_diagonal(diag: &[f64]) -> Result<Vec<f64>, DecError> {
    diag.iter()
        .map(|&v| {
            if v.abs() <= DEGENERACY_EPS {
                Err(DecError::DegenerateGeometry(
                    "Hodge star has a zero diagonal entry and cannot be inverted",
                ))
            } else {
                Ok(1.0 / v)
            }
        })
        .collect()
}

fn lift3<const N: usize>(v: na::SVector<f64, N>) -> na::Vector3<f64> {
    let mut out = na::Vector3::zeros();
    for i in 0..N.min(3) {
        out[i] = v[i];
    }
    out
}

//
// 1D operators
//

impl<'p, O: Orientation, const N: usize> DualComplex1D<'p, O, N> {
    pub(crate) fn boundary_matrix(&self, k: usize) -> nas::CsrMatrix<f64> {
        let primal = self.primal();
        match k {
            1 => csr_from_triplets(
                primal.nv(),
                primal.ne(),
                primal.edges().flat_map(|e| {
                    primal.boundary_edge_nz(e).map(move |(v, sign)| (v, e, sign))
                }),
            ),
            _ => panic!("no boundary operator for {k}-simplices in 1D"),
        }
    }

    pub(crate) fn d_matrix(&self, k: usize) -> nas::CsrMatrix<f64> {
        self.boundary_matrix(k + 1).transpose()
    }

    fn star_diag(&self, k: usize) -> Result<Vec<f64>, DecError> {
        let metric = self.metric()?;
        izip!(&metric.primal_vol[k], &metric.dual_vol[k])
            .map(|(&pv, &dv)| {
                if pv.abs() <= DEGENERACY_EPS {
                    Err(DecError::DegenerateGeometry(
                        "zero-volume primal simplex has no Hodge star",
                    ))
                } else {
                    Ok(dv / pv)
                }
            })
            .collect()
    }

    pub(crate) fn star_matrix(&self, k: usize, _kind: HodgeKind) -> Result<nas::CsrMatrix<f64>, DecError> {
        // no non-diagonal star exists in 1D; Geometric falls back
        Ok(csr_from_diagonal(&self.star_diag(k)?))
    }

    pub(crate) fn inv_star_matrix_unsigned(
        &self,
        k: usize,
        _kind: HodgeKind,
    ) -> Result<nas::CsrMatrix<f64>, DecError> {
        Ok(csr_from_diagonal(&invert_diagonal(&self.star_diag(k)?)?))
    }

    pub(crate) fn codifferential_matrix(
        &self,
        k: usize,
        kind: HodgeKind,
    ) -> Result<nas::CsrMatrix<f64>, DecError> {
        // δ(k) = (−1)^{D(k−1)+1} ⋆⁻¹_{k−1} dᵀ_{k−1} ⋆_k
        let sign = if ((k - 1) + 1) % 2 == 0 { 1.0 } else { -1.0 };
        let mut mat = &(&self.inv_star_matrix_unsigned(k - 1, kind)?
            * &self.d_matrix(k - 1).transpose())
            * &self.star_matrix(k, kind)?;
        mat *= sign;
        Ok(mat)
    }

    pub(crate) fn laplacian_matrix(
        &self,
        k: usize,
        kind: HodgeKind,
    ) -> Result<nas::CsrMatrix<f64>, DecError> {
        match k {
            0 => Ok(&self.codifferential_matrix(1, kind)? * &self.d_matrix(0)),
            1 => Ok(&self.d_matrix(0) * &self.codifferential_matrix(1, kind)?),
            _ => panic!("no {k}-forms in 1D"),
        }
    }

    /// Exterior derivative on primal `K`-forms.
    pub fn d<const K: usize>(
        &self,
    ) -> MatrixOperator<PrimalForm<K>, CochainImpl<na::DimNameSum<na::Const<K>, na::U1>, Primal>>
    where
        na::Const<K>: na::DimNameAdd<na::U1>,
        na::U1: na::DimNameSub<na::DimNameSum<na::Const<K>, na::U1>>,
    {
        MatrixOperator::new(self.d_matrix(K))
    }

    /// Boundary operator on primal `K`-chains.
    pub fn boundary<const K: usize>(
        &self,
    ) -> MatrixOperator<ChainImpl<na::Const<K>, Primal>, ChainImpl<na::DimNameDiff<na::Const<K>, na::U1>, Primal>>
    where
        na::Const<K>: na::DimNameSub<na::U1>,
        na::U1: na::DimNameSub<na::Const<K>>,
    {
        MatrixOperator::new(self.boundary_matrix(K))
    }

    /// Exterior derivative on dual `K`-forms,
    /// `(−1)^{D−K}` times the transpose of the primal `d(D−K−1)`.
    pub fn dual_derivative<const K: usize>(
        &self,
    ) -> MatrixOperator<DualForm<K>, CochainImpl<na::DimNameSum<na::Const<K>, na::U1>, Dual>>
    where
        na::Const<K>: na::DimNameAdd<na::U1>,
        na::U1: na::DimNameSub<na::DimNameSum<na::Const<K>, na::U1>>,
    {
        let sign = if (1 - K) % 2 == 0 { 1.0 } else { -1.0 };
        let mut mat = self.d_matrix(1 - K - 1).transpose();
        mat *= sign;
        MatrixOperator::new(mat)
    }

    /// Boundary operator on dual `K`-chains,
    /// `(−1)^{D−K+1}` times the transpose of the primal `∂(D−K+1)`.
    pub fn dual_boundary<const K: usize>(
        &self,
    ) -> MatrixOperator<ChainImpl<na::Const<K>, Dual>, ChainImpl<na::DimNameDiff<na::Const<K>, na::U1>, Dual>>
    where
        na::Const<K>: na::DimNameSub<na::U1>,
        na::U1: na::DimNameSub<na::Const<K>>,
    {
        let sign = if (1 - K + 1) % 2 == 0 { 1.0 } else { -1.0 };
        let mut mat = self.boundary_matrix(1 - K + 1).transpose();
        mat *= sign;
        MatrixOperator::new(mat)
    }

    /// Hodge star taking primal `K`-forms to dual `(1−K)`-forms.
    pub fn star<const K: usize>(
        &self,
        kind: HodgeKind,
    ) -> Result<MatrixOperator<PrimalForm<K>, CochainImpl<na::DimNameDiff<na::U1, na::Const<K>>, Dual>>, DecError>
    where
        na::U1: na::DimNameSub<na::Const<K>>,
    {
        Ok(MatrixOperator::new(self.star_matrix(K, kind)?))
    }

    /// Inverse Hodge star taking dual `(1−K)`-forms back to primal
    /// `K`-forms, carrying the sign `(−1)^{K(D−K)}`.
    pub fn inv_star<const K: usize>(
        &self,
        kind: HodgeKind,
    ) -> Result<MatrixOperator<CochainImpl<na::DimNameDiff<na::U1, na::Const<K>>, Dual>, PrimalForm<K>>, DecError>
    where
        na::U1: na::DimNameSub<na::Const<K>>,
    {
        // K(1−K) is always even in 1D, so no sign here
        Ok(MatrixOperator::new(self.inv_star_matrix_unsigned(K, kind)?))
    }

    /// Codifferential on primal `K`-forms.
    pub fn codifferential<const K: usize>(
        &self,
        kind: HodgeKind,
    ) -> Result<MatrixOperator<PrimalForm<K>, CochainImpl<na::DimNameDiff<na::Const<K>, na::U1>, Primal>>, DecError>
    where
        na::Const<K>: na::DimNameSub<na::U1>,
        na::U1: na::DimNameSub<na::Const<K>>,
    {
        Ok(MatrixOperator::new(self.codifferential_matrix(K, kind)?))
    }

    /// The Laplace–de Rham operator `Δ(K) = δ d + d δ`
    /// with the out-of-range terms dropped at the ends.
    pub fn laplace_de_rham<const K: usize>(
        &self,
        kind: HodgeKind,
    ) -> Result<MatrixOperator<PrimalForm<K>, PrimalForm<K>>, DecError>
    where
        na::U1: na::DimNameSub<na::Const<K>>,
    {
        Ok(MatrixOperator::new(self.laplacian_matrix(K, kind)?))
    }

    /// The Laplace–Beltrami operator `∇² = −Δ(0)` on 0-forms.
    pub fn laplace_beltrami(
        &self,
        kind: HodgeKind,
    ) -> Result<MatrixOperator<PrimalForm<0>, PrimalForm<0>>, DecError> {
        Ok(-1.0 * self.laplace_de_rham::<0>(kind)?)
    }

    /// Wedge product of primal forms,
    /// pointwise at `P = Q = 0` and vertex-averaged at `P + Q = 1`.
    pub fn wedge<const P: usize, const Q: usize>(
        &self,
        a: &PrimalForm<P>,
        b: &PrimalForm<Q>,
    ) -> Result<CochainImpl<na::DimNameSum<na::Const<P>, na::Const<Q>>, Primal>, DecError>
    where
        na::Const<P>: na::DimNameAdd<na::Const<Q>>,
        na::U1: na::DimNameSub<na::DimNameSum<na::Const<P>, na::Const<Q>>>,
    {
        let primal = self.primal();
        self.check_form_len(P, a.len())?;
        self.check_form_len(Q, b.len())?;
        let values = match (P, Q) {
            (0, 0) => na::DVector::from_iterator(
                primal.nv(),
                izip!(a.values.iter(), b.values.iter()).map(|(x, y)| x * y),
            ),
            (0, 1) => na::DVector::from_iterator(
                primal.ne(),
                primal.edges().map(|e| {
                    let mean = 0.5 * (a.values[primal.src(e)] + a.values[primal.tgt(e)]);
                    mean * b.values[e]
                }),
            ),
            (1, 0) => na::DVector::from_iterator(
                primal.ne(),
                primal.edges().map(|e| {
                    let mean = 0.5 * (b.values[primal.src(e)] + b.values[primal.tgt(e)]);
                    mean * a.values[e]
                }),
            ),
            _ => unreachable!("wedge degrees bounded by the mesh dimension"),
        };
        Ok(CochainImpl::from_values(values))
    }

    fn check_form_len(&self, k: usize, len: usize) -> Result<(), DecError> {
        let expected = match k {
            0 => self.primal().nv(),
            1 => self.primal().ne(),
            _ => 0,
        };
        if len != expected {
            return Err(DecError::DimensionMismatch {
                expected,
                found: len,
            });
        }
        Ok(())
    }
}

//
// 2D operators
//

impl<'p, O: Orientation, const N: usize> DualComplex2D<'p, O, N> {
    pub(crate) fn boundary_matrix(&self, k: usize) -> nas::CsrMatrix<f64> {
        let primal = self.primal();
        match k {
            1 => csr_from_triplets(
                primal.nv(),
                primal.ne(),
                primal.edges().flat_map(|e| {
                    primal.boundary_edge_nz(e).map(move |(v, sign)| (v, e, sign))
                }),
            ),
            2 => csr_from_triplets(
                primal.ne(),
                primal.nt(),
                primal.triangles().flat_map(|t| {
                    primal
                        .boundary_triangle_nz(t)
                        .map(move |(e, sign)| (e, t, sign))
                }),
            ),
            _ => panic!("no boundary operator for {k}-simplices in 2D"),
        }
    }

    pub(crate) fn d_matrix(&self, k: usize) -> nas::CsrMatrix<f64> {
        self.boundary_matrix(k + 1).transpose()
    }

    fn star_diag(&self, k: usize) -> Result<Vec<f64>, DecError> {
        let metric = self.metric()?;
        izip!(&metric.primal_vol[k], &metric.dual_vol[k])
            .map(|(&pv, &dv)| {
                if pv.abs() <= DEGENERACY_EPS {
                    Err(DecError::DegenerateGeometry(
                        "zero-volume primal simplex has no Hodge star",
                    ))
                } else {
                    Ok(dv / pv)
                }
            })
            .collect()
    }

    /// The geometric star on 1-forms, assembled per triangle.
    ///
    /// Each triangle decomposes its piece of every dual edge into a
    /// component crossing the primal edge and a tangential defect;
    /// the crossing ratios form the diagonal and the defect couples the
    /// edge to the other two through the constant reconstruction of the
    /// form inside the triangle. On subdivisions where dual edges meet
    /// their primal edges at right angles the defect vanishes and the
    /// matrix reduces to the diagonal star.
    ///
    /// The assembly uses only raw edge vectors and dual points, never
    /// the stored orientations, so re-orienting top cells cannot change
    /// the result. The sign convention on meshes with inconsistently
    /// oriented components is untested territory; see the crate docs.
    fn geometric_star1(&self) -> Result<na::DMatrix<f64>, DecError> {
        let metric = self.metric()?;
        let primal = self.primal();
        let ne = primal.ne();
        let mut mat = na::DMatrix::zeros(ne, ne);

        for t in primal.triangles() {
            let edges = primal.triangle_edges(t);
            let ev = edges
                .map(|e| lift3(primal.point(primal.tgt(e)) - primal.point(primal.src(e))));
            let normal = ev[2].cross(&ev[0]);
            if normal.norm() <= DEGENERACY_EPS {
                return Err(DecError::DegenerateGeometry(
                    "degenerate triangle in geometric Hodge star",
                ));
            }
            let normal = normal.normalize();
            let crossdot = |a: &na::Vector3<f64>, b: &na::Vector3<f64>| a.cross(b).dot(&normal);

            let center = lift3(metric.dual_point[self.triangle_center(t)]);
            for i in 0..3 {
                let sq_len = ev[i].norm_squared();
                if sq_len <= DEGENERACY_EPS {
                    return Err(DecError::DegenerateGeometry(
                        "zero-length edge in geometric Hodge star",
                    ));
                }
                // dual edge piece, flipped to cross the primal edge positively
                let mid = lift3(metric.dual_point[self.edge_center(edges[i])]);
                let mut piece = center - mid;
                let crossing = crossdot(&ev[i], &piece);
                if crossing < 0.0 {
                    piece = -piece;
                }

                mat[(edges[i], edges[i])] += crossing.abs() / sq_len;

                // tangential defect, closed through the other two edges
                let tangent = ev[i].dot(&piece) / sq_len;
                let (j, k) = ((i + 1) % 3, (i + 2) % 3);
                let cross_jk = crossdot(&ev[j], &ev[k]);
                mat[(edges[i], edges[j])] += tangent * ev[i].dot(&ev[k]) / cross_jk;
                mat[(edges[i], edges[k])] -= tangent * ev[i].dot(&ev[j]) / cross_jk;
            }
        }

        Ok(0.5 * (&mat + mat.transpose()))
    }

    pub(crate) fn star_matrix(
        &self,
        k: usize,
        kind: HodgeKind,
    ) -> Result<nas::CsrMatrix<f64>, DecError> {
        match (kind, k) {
            (HodgeKind::Geometric, 1) => Ok(csr_from_dense(&self.geometric_star1()?)),
            _ => Ok(csr_from_diagonal(&self.star_diag(k)?)),
        }
    }

    pub(crate) fn inv_star_matrix_unsigned(
        &self,
        k: usize,
        kind: HodgeKind,
    ) -> Result<nas::CsrMatrix<f64>, DecError> {
        match (kind, k) {
            (HodgeKind::Geometric, 1) => {
                let dense = self.geometric_star1()?;
                let inverse = dense.try_inverse().ok_or(DecError::DegenerateGeometry(
                    "geometric Hodge star is singular",
                ))?;
                Ok(csr_from_dense(&inverse))
            }
            _ => Ok(csr_from_diagonal(&invert_diagonal(&self.star_diag(k)?)?)),
        }
    }

    pub(crate) fn dual_derivative_matrix(&self, k: usize) -> nas::CsrMatrix<f64> {
        let sign = if (2 - k) % 2 == 0 { 1.0 } else { -1.0 };
        let mut mat = self.d_matrix(2 - k - 1).transpose();
        mat *= sign;
        mat
    }

    pub(crate) fn codifferential_matrix(
        &self,
        k: usize,
        kind: HodgeKind,
    ) -> Result<nas::CsrMatrix<f64>, DecError> {
        // δ(k) = (−1)^{D(k−1)+1} ⋆⁻¹_{k−1} dᵀ_{k−1} ⋆_k; the sign is −1
        // for every k when D = 2
        let mut mat = &(&self.inv_star_matrix_unsigned(k - 1, kind)?
            * &self.d_matrix(k - 1).transpose())
            * &self.star_matrix(k, kind)?;
        mat *= -1.0;
        Ok(mat)
    }

    pub(crate) fn laplacian_matrix(
        &self,
        k: usize,
        kind: HodgeKind,
    ) -> Result<nas::CsrMatrix<f64>, DecError> {
        match k {
            0 => Ok(&self.codifferential_matrix(1, kind)? * &self.d_matrix(0)),
            1 => {
                let up = &self.codifferential_matrix(2, kind)? * &self.d_matrix(1);
                let down = &self.d_matrix(0) * &self.codifferential_matrix(1, kind)?;
                Ok(up + down)
            }
            2 => Ok(&self.d_matrix(1) * &self.codifferential_matrix(2, kind)?),
            _ => panic!("no {k}-forms in 2D"),
        }
    }

    fn check_form_len(&self, k: usize, len: usize) -> Result<(), DecError> {
        let expected = match k {
            0 => self.primal().nv(),
            1 => self.primal().ne(),
            2 => self.primal().nt(),
            _ => 0,
        };
        if len != expected {
            return Err(DecError::DimensionMismatch {
                expected,
                found: len,
            });
        }
        Ok(())
    }

    /// Exterior derivative on primal `K`-forms.
    pub fn d<const K: usize>(
        &self,
    ) -> MatrixOperator<PrimalForm<K>, CochainImpl<na::DimNameSum<na::Const<K>, na::U1>, Primal>>
    where
        na::Const<K>: na::DimNameAdd<na::U1>,
        na::U2: na::DimNameSub<na::DimNameSum<na::Const<K>, na::U1>>,
    {
        MatrixOperator::new(self.d_matrix(K))
    }

    /// Boundary operator on primal `K`-chains.
    pub fn boundary<const K: usize>(
        &self,
    ) -> MatrixOperator<ChainImpl<na::Const<K>, Primal>, ChainImpl<na::DimNameDiff<na::Const<K>, na::U1>, Primal>>
    where
        na::Const<K>: na::DimNameSub<na::U1>,
        na::U2: na::DimNameSub<na::Const<K>>,
    {
        MatrixOperator::new(self.boundary_matrix(K))
    }

    /// Exterior derivative on dual `K`-forms,
    /// `(−1)^{D−K}` times the transpose of the primal `d(D−K−1)`.
    pub fn dual_derivative<const K: usize>(
        &self,
    ) -> MatrixOperator<DualForm<K>, CochainImpl<na::DimNameSum<na::Const<K>, na::U1>, Dual>>
    where
        na::Const<K>: na::DimNameAdd<na::U1>,
        na::U2: na::DimNameSub<na::DimNameSum<na::Const<K>, na::U1>>,
    {
        MatrixOperator::new(self.dual_derivative_matrix(K))
    }

    /// Boundary operator on dual `K`-chains,
    /// `(−1)^{D−K+1}` times the transpose of the primal `∂(D−K+1)`.
    pub fn dual_boundary<const K: usize>(
        &self,
    ) -> MatrixOperator<ChainImpl<na::Const<K>, Dual>, ChainImpl<na::DimNameDiff<na::Const<K>, na::U1>, Dual>>
    where
        na::Const<K>: na::DimNameSub<na::U1>,
        na::U2: na::DimNameSub<na::Const<K>>,
    {
        let sign = if (2 - K + 1) % 2 == 0 { 1.0 } else { -1.0 };
        let mut mat = self.boundary_matrix(2 - K + 1).transpose();
        mat *= sign;
        MatrixOperator::new(mat)
    }

    /// Hodge star taking primal `K`-forms to dual `(2−K)`-forms.
    pub fn star<const K: usize>(
        &self,
        kind: HodgeKind,
    ) -> Result<MatrixOperator<PrimalForm<K>, CochainImpl<na::DimNameDiff<na::U2, na::Const<K>>, Dual>>, DecError>
    where
        na::U2: na::DimNameSub<na::Const<K>>,
    {
        Ok(MatrixOperator::new(self.star_matrix(K, kind)?))
    }

    /// Inverse Hodge star taking dual `(2−K)`-forms back to primal
    /// `K`-forms, carrying the sign `(−1)^{K(D−K)}`.
    pub fn inv_star<const K: usize>(
        &self,
        kind: HodgeKind,
    ) -> Result<MatrixOperator<CochainImpl<na::DimNameDiff<na::U2, na::Const<K>>, Dual>, PrimalForm<K>>, DecError>
    where
        na::U2: na::DimNameSub<na::Const<K>>,
    {
        let mut mat = self.inv_star_matrix_unsigned(K, kind)?;
        if K * (2 - K) % 2 != 0 {
            mat *= -1.0;
        }
        Ok(MatrixOperator::new(mat))
    }

    /// Codifferential on primal `K`-forms.
    pub fn codifferential<const K: usize>(
        &self,
        kind: HodgeKind,
    ) -> Result<MatrixOperator<PrimalForm<K>, CochainImpl<na::DimNameDiff<na::Const<K>, na::U1>, Primal>>, DecError>
    where
        na::Const<K>: na::DimNameSub<na::U1>,
        na::U2: na::DimNameSub<na::Const<K>>,
    {
        Ok(MatrixOperator::new(self.codifferential_matrix(K, kind)?))
    }

    /// The Laplace–de Rham operator `Δ(K) = δ d + d δ`
    /// with the out-of-range terms dropped at the ends.
    pub fn laplace_de_rham<const K: usize>(
        &self,
        kind: HodgeKind,
    ) -> Result<MatrixOperator<PrimalForm<K>, PrimalForm<K>>, DecError>
    where
        na::U2: na::DimNameSub<na::Const<K>>,
    {
        Ok(MatrixOperator::new(self.laplacian_matrix(K, kind)?))
    }

    /// The Laplace–Beltrami operator `∇² = −Δ(0)` on 0-forms.
    pub fn laplace_beltrami(
        &self,
        kind: HodgeKind,
    ) -> Result<MatrixOperator<PrimalForm<0>, PrimalForm<0>>, DecError> {
        Ok(-1.0 * self.laplace_de_rham::<0>(kind)?)
    }

    fn wedge01_raw(&self, a: &na::DVector<f64>, b: &na::DVector<f64>) -> na::DVector<f64> {
        let primal = self.primal();
        na::DVector::from_iterator(
            primal.ne(),
            primal.edges().map(|e| {
                0.5 * (a[primal.src(e)] + a[primal.tgt(e)]) * b[e]
            }),
        )
    }

    fn wedge02_raw(&self, a: &na::DVector<f64>, b: &na::DVector<f64>) -> na::DVector<f64> {
        let primal = self.primal();
        na::DVector::from_iterator(
            primal.nt(),
            primal.triangles().map(|t| {
                let vs = primal.triangle_vertices(t);
                let mean = (a[vs[0]] + a[vs[1]] + a[vs[2]]) / 3.0;
                mean * b[t]
            }),
        )
    }

    /// The antisymmetrized product over the six vertex orderings of each
    /// triangle, with cochain values signed through the edge
    /// orientations and the result through the triangle orientation.
    fn wedge11_raw(&self, a: &na::DVector<f64>, b: &na::DVector<f64>) -> na::DVector<f64> {
        let primal = self.primal();
        na::DVector::from_iterator(
            primal.nt(),
            primal.triangles().map(|t| {
                let [e0, e1, e2] = primal.triangle_edges(t);
                let s = |e: Id| primal.edge_orientation(e).to_sign();
                // values on the directed edges v0→v1, v1→v2, v0→v2
                let a01 = a[e2] * s(e2);
                let a12 = a[e0] * s(e0);
                let a02 = a[e1] * s(e1);
                let b01 = b[e2] * s(e2);
                let b12 = b[e0] * s(e0);
                let b02 = b[e1] * s(e1);
                let sum = a01 * (b12 + b02) + a02 * (b12 - b01) - a12 * (b02 + b01);
                primal.tri_orientation(t).to_sign() * sum / 6.0
            }),
        )
    }

    /// Wedge product of primal forms: pointwise multiplication at
    /// `P = Q = 0`, the vertex-averaged product when one factor is a
    /// 0-form, and the signed sum over vertex orderings at `P = Q = 1`,
    /// so that `α ∧ β = (−1)^{PQ} β ∧ α`.
    pub fn wedge<const P: usize, const Q: usize>(
        &self,
        a: &PrimalForm<P>,
        b: &PrimalForm<Q>,
    ) -> Result<CochainImpl<na::DimNameSum<na::Const<P>, na::Const<Q>>, Primal>, DecError>
    where
        na::Const<P>: na::DimNameAdd<na::Const<Q>>,
        na::U2: na::DimNameSub<na::DimNameSum<na::Const<P>, na::Const<Q>>>,
    {
        self.check_form_len(P, a.len())?;
        self.check_form_len(Q, b.len())?;
        let values = match (P, Q) {
            (0, 0) => na::DVector::from_iterator(
                self.primal().nv(),
                izip!(a.values.iter(), b.values.iter()).map(|(x, y)| x * y),
            ),
            (0, 1) => self.wedge01_raw(&a.values, &b.values),
            (1, 0) => self.wedge01_raw(&b.values, &a.values),
            (0, 2) => self.wedge02_raw(&a.values, &b.values),
            (2, 0) => self.wedge02_raw(&b.values, &a.values),
            (1, 1) => self.wedge11_raw(&a.values, &b.values),
            _ => unreachable!("wedge degrees bounded by the mesh dimension"),
        };
        Ok(CochainImpl::from_values(values))
    }

    /// Flat: average a vector field given at triangle centers into a
    /// primal 1-form, weighting each adjacent triangle by the length of
    /// the dual edge piece inside it.
    pub fn flat(&self, field: &DualVectorField<N>) -> Result<PrimalForm<1>, DecError> {
        let metric = self.metric()?;
        let primal = self.primal();
        if field.0.len() != primal.nt() {
            return Err(DecError::DimensionMismatch {
                expected: primal.nt(),
                found: field.0.len(),
            });
        }

        let mut values = na::DVector::zeros(primal.ne());
        for e in primal.edges() {
            let e_vec = primal.edge_vector(e);
            let mut weighted = 0.0;
            let mut total = 0.0;
            for de in self.elementary_duals(1, e) {
                let (head, tail) = self.dual_edge_endpoints(de);
                let len = (metric.dual_point[tail] - metric.dual_point[head]).norm();
                let PrimalSimplex::Triangle(t) = self.primal_of_center(tail) else {
                    unreachable!("dual edge pieces start at triangle centers");
                };
                weighted += len * field.0[t].dot(&e_vec);
                total += len;
            }
            if total <= DEGENERACY_EPS {
                return Err(DecError::DegenerateGeometry(
                    "edge has a zero-length dual cell",
                ));
            }
            values[e] = weighted / total;
        }
        Ok(PrimalForm::from_values(values))
    }

    /// Sharp: recover a vertex vector field from a primal 1-form.
    ///
    /// At each vertex the field is the weighted least-squares solution
    /// of the circulation constraints on its incident edges, with
    /// weights equal to the elementary dual volumes of those edges.
    pub fn sharp(&self, form: &PrimalForm<1>) -> Result<PrimalVectorField<N>, DecError> {
        let metric = self.metric()?;
        let primal = self.primal();
        self.check_form_len(1, form.len())?;

        // the normal equations are accumulated into dynamically sized
        // matrices so the least-squares solve works for any embedding
        // dimension, reusing the allocations across vertices
        let mut field = Vec::with_capacity(primal.nv());
        let mut normal = na::DMatrix::zeros(N, N);
        let mut rhs = na::DVector::zeros(N);
        for v in primal.vertices() {
            normal.fill(0.0);
            rhs.fill(0.0);
            let incident = primal
                .edges_with_src(v)
                .iter()
                .chain(primal.edges_with_tgt(v))
                .copied();
            for e in incident {
                let dir = primal.edge_vector(e);
                let weight = metric.dual_vol[1][e];
                for row in 0..N {
                    rhs[row] += weight * form.values[e] * dir[row];
                    for col in 0..N {
                        normal[(row, col)] += weight * dir[row] * dir[col];
                    }
                }
            }
            let solved = normal
                .clone()
                .svd(true, true)
                .solve(&rhs, DEGENERACY_EPS)
                .map_err(|_| DecError::DegenerateGeometry("sharp system is unsolvable"))?;
            field.push(na::SVector::from_iterator(solved.iter().copied()));
        }
        Ok(PrimalVectorField(field))
    }

    fn interior_raw(
        &self,
        k: usize,
        x_flat: &na::DVector<f64>,
        form: &na::DVector<f64>,
        kind: HodgeKind,
    ) -> Result<na::DVector<f64>, DecError> {
        match k {
            // ⋆₁ (X♭ ∧ ⋆₀⁻¹ α)
            2 => {
                let primal_0 = &self.inv_star_matrix_unsigned(0, kind)? * form;
                let wedged = self.wedge01_raw(&primal_0, x_flat);
                Ok(&self.star_matrix(1, kind)? * &wedged)
            }
            // ⋆₂ (⋆₁⁻¹ α ∧ X♭); the two odd-degree star signs cancel
            1 => {
                let primal_1 = &self.inv_star_matrix_unsigned(1, kind)? * form;
                let wedged = self.wedge11_raw(&primal_1, x_flat);
                Ok(&self.star_matrix(2, kind)? * &wedged)
            }
            _ => panic!("interior product is defined on dual 1- and 2-forms"),
        }
    }

    /// Interior product `ι_{X♭}` contracting a dual `K`-form with a flat
    /// vector field, via `(−1)^{K(D−K)} ⋆⁻¹ ∘ (X♭ ∧ ·) ∘ ⋆`.
    pub fn interior_product<const K: usize>(
        &self,
        x_flat: &PrimalForm<1>,
        form: &DualForm<K>,
        kind: HodgeKind,
    ) -> Result<CochainImpl<na::DimNameDiff<na::Const<K>, na::U1>, Dual>, DecError>
    where
        na::Const<K>: na::DimNameSub<na::U1>,
        na::U2: na::DimNameSub<na::Const<K>>,
    {
        self.check_form_len(1, x_flat.len())?;
        self.check_form_len(2 - K, form.len())?;
        let values = self.interior_raw(K, &x_flat.values, &form.values, kind)?;
        Ok(CochainImpl::from_values(values))
    }

    /// Lie derivative of a dual `K`-form along a flat vector field,
    /// by Cartan's magic formula `ℒ = d ∘ ι + ι ∘ d`.
    pub fn lie_derivative<const K: usize>(
        &self,
        x_flat: &PrimalForm<1>,
        form: &DualForm<K>,
        kind: HodgeKind,
    ) -> Result<DualForm<K>, DecError>
    where
        na::U2: na::DimNameSub<na::Const<K>>,
    {
        self.check_form_len(1, x_flat.len())?;
        self.check_form_len(2 - K, form.len())?;
        let x = &x_flat.values;
        let a = &form.values;
        let values = match K {
            0 => {
                let da = &self.dual_derivative_matrix(0) * a;
                self.interior_raw(1, x, &da, kind)?
            }
            1 => {
                let da = &self.dual_derivative_matrix(1) * a;
                let term_di = self.interior_raw(2, x, &da, kind)?;
                let ia = self.interior_raw(1, x, a, kind)?;
                term_di + &self.dual_derivative_matrix(0) * &ia
            }
            2 => {
                let ia = self.interior_raw(2, x, a, kind)?;
                &self.dual_derivative_matrix(1) * &ia
            }
            _ => unreachable!("form degrees bounded by the mesh dimension"),
        };
        Ok(DualForm::from_values(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta_set::test_meshes::*;
    use crate::dual::SubdivisionRule;
    use approx::{assert_relative_eq, assert_abs_diff_eq};

    fn dense(m: &nas::CsrMatrix<f64>) -> na::DMatrix<f64> {
        let mut out = na::DMatrix::zeros(m.nrows(), m.ncols());
        for (r, c, v) in m.triplet_iter() {
            out[(r, c)] = *v;
        }
        out
    }

    fn barycentric<'p>(
        primal: &'p crate::EmbeddedDeltaSet2D<bool, 2>,
    ) -> DualComplex2D<'p, bool, 2> {
        let mut dual = DualComplex2D::new(primal);
        dual.subdivide_duals(SubdivisionRule::Barycenter).unwrap();
        dual
    }

    #[test]
    fn path_graph_laplace_beltrami() {
        let primal = path5();
        let mut dual = DualComplex1D::new(&primal);
        dual.subdivide_duals(SubdivisionRule::Barycenter).unwrap();

        let nabla2 = dual.laplace_beltrami(HodgeKind::Diagonal).unwrap();
        let bump = PrimalForm::<0>::from_values(na::DVector::from_vec(vec![
            0.0, 0.0, 1.0, 0.0, 0.0,
        ]));
        let expected = na::DVector::from_vec(vec![0.0, -1.0, 2.0, -1.0, 0.0]);
        assert_relative_eq!(nabla2.apply(&bump).unwrap().values, expected, epsilon = 1e-9);
    }

    #[test]
    fn path_graph_star_weights() {
        let primal = path3();
        let mut dual = DualComplex1D::new(&primal);
        dual.subdivide_duals(SubdivisionRule::Barycenter).unwrap();

        let star0 = dual.star::<0>(HodgeKind::Diagonal).unwrap();
        let expected = na::DMatrix::from_diagonal(&na::DVector::from_vec(vec![0.5, 1.5, 1.0]));
        assert_relative_eq!(dense(star0.matrix()), expected, epsilon = 1e-12);

        // star on 1-forms is the inverse length
        let star1 = dual.star::<1>(HodgeKind::Diagonal).unwrap();
        let expected = na::DMatrix::from_diagonal(&na::DVector::from_vec(vec![1.0, 0.5]));
        assert_relative_eq!(dense(star1.matrix()), expected, epsilon = 1e-12);
    }

    #[test]
    fn dual_operators_transpose_primal_ones_1d() {
        let primal = path5();
        let mut dual = DualComplex1D::new(&primal);
        dual.subdivide_duals(SubdivisionRule::Barycenter).unwrap();

        assert_eq!(
            dense(dual.dual_derivative::<0>().matrix()),
            -dense(&dual.d_matrix(0).transpose()),
        );
        assert_eq!(
            dense(dual.dual_boundary::<1>().matrix()),
            -dense(&dual.boundary_matrix(1).transpose()),
        );
    }

    #[test]
    fn right_triangle_barycentric_stars() {
        let primal = right_triangle();
        let dual = barycentric(&primal);

        let star0 = dual.star::<0>(HodgeKind::Diagonal).unwrap();
        let expected0 =
            na::DMatrix::from_diagonal(&na::DVector::from_element(3, 1.0 / 6.0));
        assert_relative_eq!(dense(star0.matrix()), expected0, epsilon = 1e-12);

        let star2 = dual.star::<2>(HodgeKind::Geometric).unwrap();
        assert_relative_eq!(dense(star2.matrix())[(0, 0)], 2.0, epsilon = 1e-12);

        // the geometric star couples the two legs through the tangential
        // defect of the barycentric dual edges; the hypotenuse's dual is
        // perpendicular and stays decoupled
        let star1 = dual.star::<1>(HodgeKind::Geometric).unwrap();
        #[rustfmt::skip]
        let expected1 = na::DMatrix::from_row_slice(3, 3, &[
            1.0 / 3.0, 0.0,       1.0 / 6.0,
            0.0,       1.0 / 6.0, 0.0,
            1.0 / 6.0, 0.0,       1.0 / 3.0,
        ]);
        assert_relative_eq!(dense(star1.matrix()), expected1, epsilon = 1e-9);
    }

    #[test]
    fn right_triangle_barycentric_laplacians() {
        let primal = right_triangle();
        let dual = barycentric(&primal);

        let lap0 = dual.laplace_de_rham::<0>(HodgeKind::Geometric).unwrap();
        #[rustfmt::skip]
        let expected0 = na::DMatrix::from_row_slice(3, 3, &[
            -6.0,  3.0,  3.0,
             3.0, -3.0,  0.0,
             3.0,  0.0, -3.0,
        ]);
        assert_relative_eq!(dense(lap0.matrix()), expected0, epsilon = 1e-9);

        let lap2 = dual.laplace_de_rham::<2>(HodgeKind::Geometric).unwrap();
        assert_relative_eq!(dense(lap2.matrix())[(0, 0)], -36.0, epsilon = 1e-9);
    }

    #[test]
    fn right_triangle_circumcentric_stars() {
        let primal = right_triangle();
        let mut dual = DualComplex2D::new(&primal);
        dual.subdivide_duals(SubdivisionRule::Circumcenter).unwrap();

        let star0 = dual.star::<0>(HodgeKind::Diagonal).unwrap();
        let expected0 =
            na::DMatrix::from_diagonal(&na::DVector::from_vec(vec![0.25, 0.125, 0.125]));
        assert_relative_eq!(dense(star0.matrix()), expected0, epsilon = 1e-12);

        // the circumcenter lies on the hypotenuse midpoint,
        // so the hypotenuse's dual edge has zero length
        let star1 = dual.star::<1>(HodgeKind::Diagonal).unwrap();
        let expected1 =
            na::DMatrix::from_diagonal(&na::DVector::from_vec(vec![0.5, 0.0, 0.5]));
        assert_relative_eq!(dense(star1.matrix()), expected1, epsilon = 1e-12);

        // which makes the star singular
        assert!(matches!(
            dual.inv_star::<1>(HodgeKind::Diagonal),
            Err(DecError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn right_triangle_incentric_star() {
        let primal = right_triangle();
        let mut dual = DualComplex2D::new(&primal);
        dual.subdivide_duals(SubdivisionRule::Incenter).unwrap();

        let star0 = dual.star::<0>(HodgeKind::Diagonal).unwrap();
        let diag = dense(star0.matrix());
        assert_abs_diff_eq!(diag[(0, 0)], 0.146, epsilon = 1e-3);
        assert_abs_diff_eq!(diag[(1, 1)], 0.177, epsilon = 1e-3);
        assert_abs_diff_eq!(diag[(2, 2)], 0.177, epsilon = 1e-3);
    }

    #[test]
    fn equilateral_laplacian_agrees_across_hodge_kinds() {
        let primal = equilateral_triangle();
        let dual = barycentric(&primal);

        #[rustfmt::skip]
        let expected = na::DMatrix::from_row_slice(3, 3, &[
            -12.0,  -6.0,   6.0,
             -6.0, -12.0,   6.0,
              6.0,   6.0, -12.0,
        ]);

        let diag = dual.laplace_de_rham::<1>(HodgeKind::Diagonal).unwrap();
        let geo = dual.laplace_de_rham::<1>(HodgeKind::Geometric).unwrap();
        assert_relative_eq!(dense(diag.matrix()), expected, epsilon = 1e-9);
        assert_relative_eq!(dense(geo.matrix()), expected, epsilon = 1e-9);
    }

    #[test]
    fn chain_complex_identities() {
        let primal = hexagon();
        let dual = barycentric(&primal);

        let dd = dense(&(&dual.d_matrix(1) * &dual.d_matrix(0)));
        assert_relative_eq!(dd, na::DMatrix::zeros(dd.nrows(), dd.ncols()), epsilon = 1e-12);

        let bb = dense(&(&dual.boundary_matrix(1) * &dual.boundary_matrix(2)));
        assert_relative_eq!(bb, na::DMatrix::zeros(bb.nrows(), bb.ncols()), epsilon = 1e-12);

        // the same, applied to a chain: the boundary of a boundary of any
        // single triangle vanishes
        let tri = crate::cochain::PrimalChain::<2>::unit(primal.nt(), 3);
        let edges = dual.boundary::<2>().apply(&tri).unwrap();
        let verts = dual.boundary::<1>().apply(&edges).unwrap();
        assert_relative_eq!(verts.coeffs.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn dual_operators_transpose_primal_ones_2d() {
        let primal = hexagon();
        let dual = barycentric(&primal);

        assert_eq!(
            dense(dual.dual_derivative::<0>().matrix()),
            dense(&dual.d_matrix(1).transpose()),
        );
        assert_eq!(
            dense(dual.dual_derivative::<1>().matrix()),
            -dense(&dual.d_matrix(0).transpose()),
        );
        assert_eq!(
            dense(dual.dual_boundary::<1>().matrix()),
            dense(&dual.boundary_matrix(2).transpose()),
        );
        assert_eq!(
            dense(dual.dual_boundary::<2>().matrix()),
            -dense(&dual.boundary_matrix(1).transpose()),
        );

        // the dual complex is a chain complex too
        let dd = dense(&(dual.dual_derivative::<1>() * dual.dual_derivative::<0>()).into_matrix());
        assert_relative_eq!(dd, na::DMatrix::zeros(dd.nrows(), dd.ncols()), epsilon = 1e-12);
    }

    #[test]
    fn hodge_stars_are_positive_and_symmetric() {
        let primal = hexagon();
        let dual = barycentric(&primal);

        for k in 0..=2 {
            let star = dual.star_matrix(k, HodgeKind::Diagonal).unwrap();
            for (r, c, v) in star.triplet_iter() {
                assert_eq!(r, c);
                assert!(*v > 0.0, "diagonal star must be positive");
            }
        }

        let geo = dense(&dual.star_matrix(1, HodgeKind::Geometric).unwrap());
        assert_relative_eq!(geo.clone(), geo.transpose(), epsilon = 1e-12);
    }

    #[test]
    fn operators_under_component_reorientation() {
        let primal = hexagon();
        let mut flipped = primal.clone();
        for t in primal.triangles() {
            flipped.set_tri_orientation(t, false);
        }

        let dual = barycentric(&primal);
        let dual_flipped = barycentric(&flipped);

        // the Hodge stars are orientation-invariant
        assert_relative_eq!(
            dense(&dual.star_matrix(1, HodgeKind::Geometric).unwrap()),
            dense(&dual_flipped.star_matrix(1, HodgeKind::Geometric).unwrap()),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            dense(&dual.star_matrix(0, HodgeKind::Diagonal).unwrap()),
            dense(&dual_flipped.star_matrix(0, HodgeKind::Diagonal).unwrap()),
            epsilon = 1e-12
        );

        // d on the flipped dimension is odd
        assert_relative_eq!(
            dense(dual.d::<1>().matrix()),
            -dense(dual_flipped.d::<1>().matrix()),
            epsilon = 1e-12
        );

        // and the 1-form Laplacian is invariant, the flips cancelling
        // between d and δ
        assert_relative_eq!(
            dense(
                dual.laplace_de_rham::<1>(HodgeKind::Geometric)
                    .unwrap()
                    .matrix()
            ),
            dense(
                dual_flipped
                    .laplace_de_rham::<1>(HodgeKind::Geometric)
                    .unwrap()
                    .matrix()
            ),
            epsilon = 1e-9
        );
    }

    #[test]
    fn wedge_commutation_signs() {
        let primal = hexagon();
        let dual = barycentric(&primal);

        let f = PrimalForm::<0>::from_values(na::DVector::from_iterator(
            primal.nv(),
            (0..primal.nv()).map(|i| i as f64),
        ));
        let g = PrimalForm::<0>::from_values(na::DVector::from_iterator(
            primal.nv(),
            (0..primal.nv()).map(|i| (i * i) as f64 - 3.0),
        ));
        let a = PrimalForm::<1>::from_values(na::DVector::from_iterator(
            primal.ne(),
            (0..primal.ne()).map(|i| i as f64 + 1.0),
        ));
        let b = PrimalForm::<1>::from_values(na::DVector::from_iterator(
            primal.ne(),
            (0..primal.ne()).map(|i| ((i * 7) % 5) as f64 - 2.0),
        ));
        let w = PrimalForm::<2>::from_values(na::DVector::from_iterator(
            primal.nt(),
            (0..primal.nt()).map(|i| i as f64 - 2.5),
        ));

        // 0-forms multiply pointwise
        let fg = dual.wedge::<0, 0>(&f, &g).unwrap();
        assert_relative_eq!(fg.values[4], f.values[4] * g.values[4]);

        // a 0-form commutes with everything
        assert_eq!(
            dual.wedge::<0, 1>(&f, &a).unwrap().values,
            dual.wedge::<1, 0>(&a, &f).unwrap().values
        );
        assert_eq!(
            dual.wedge::<0, 2>(&f, &w).unwrap().values,
            dual.wedge::<2, 0>(&w, &f).unwrap().values
        );

        // 1-forms anticommute, so the self-wedge vanishes
        let ab = dual.wedge::<1, 1>(&a, &b).unwrap();
        let ba = dual.wedge::<1, 1>(&b, &a).unwrap();
        assert_relative_eq!(ab.values, -ba.values, epsilon = 1e-12);
        let aa = dual.wedge::<1, 1>(&a, &a).unwrap();
        assert_relative_eq!(aa.values.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn flat_projects_triangle_fields_onto_edges() {
        let primal = split_square();
        let dual = barycentric(&primal);

        let field = DualVectorField(vec![
            na::Vector2::new(1.0, 0.0),
            na::Vector2::new(-1.0, 0.0),
        ]);
        let form = dual.flat(&field).unwrap();
        let expected = na::DVector::from_vec(vec![2.0, 0.0, 0.0, 2.0, 0.0]);
        assert_relative_eq!(form.values, expected, epsilon = 1e-9);
    }

    #[test]
    fn sharp_recovers_corner_vectors() {
        let primal = split_square();
        let dual = barycentric(&primal);

        let form = PrimalForm::<1>::from_values(na::DVector::from_vec(vec![
            2.0, 0.0, 0.0, 2.0, 0.0,
        ]));
        let field = dual.sharp(&form).unwrap();

        // the corners away from the diagonal see only their two boundary
        // edges and recover the field exactly
        assert!(field.0[1].x > 0.0, "vertex 1 should point along +x");
        assert!(field.0[3].x < 0.0, "vertex 3 should point along -x");
        assert_relative_eq!(field.0[1], na::Vector2::new(1.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(field.0[3], na::Vector2::new(-1.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn interior_product_contracts_against_the_star() {
        let primal = split_square();
        let dual = barycentric(&primal);

        let x = PrimalForm::<1>::from_values(na::DVector::from_vec(vec![
            1.0, -2.0, 0.5, 3.0, -1.0,
        ]));
        let ones = PrimalForm::<0>::from_values(na::DVector::from_element(primal.nv(), 1.0));

        // ι_X (⋆ 1) = ⋆ X♭: contracting the volume form with X yields
        // the rotated field
        let vol = dual.star::<0>(HodgeKind::Diagonal).unwrap().apply(&ones).unwrap();
        let contracted = dual
            .interior_product::<2>(&x, &vol, HodgeKind::Diagonal)
            .unwrap();
        let star_x = dual.star::<1>(HodgeKind::Diagonal).unwrap().apply(&x).unwrap();
        assert_relative_eq!(contracted.values, star_x.values, epsilon = 1e-12);

        // ι_X (⋆ X♭) = 0: a field contracted with its own rotation
        let ix_star_x = dual
            .interior_product::<1>(&x, &star_x, HodgeKind::Diagonal)
            .unwrap();
        assert_relative_eq!(ix_star_x.values.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn lie_derivative_follows_cartan() {
        let primal = split_square();
        let dual = barycentric(&primal);

        let x = PrimalForm::<1>::from_values(na::DVector::from_vec(vec![
            0.5, 1.0, -1.0, 2.0, 0.0,
        ]));
        let a0 = DualForm::<0>::from_values(na::DVector::from_vec(vec![1.0, -1.0]));
        let a2 = DualForm::<2>::from_values(na::DVector::from_vec(vec![
            1.0, 2.0, 3.0, 4.0,
        ]));

        // on dual 0-forms only the ι∘d term survives
        let lie0 = dual.lie_derivative::<0>(&x, &a0, HodgeKind::Diagonal).unwrap();
        let da0 = dual.dual_derivative::<0>().apply(&a0).unwrap();
        let expected0 = dual
            .interior_product::<1>(&x, &da0, HodgeKind::Diagonal)
            .unwrap();
        assert_relative_eq!(lie0.values, expected0.values, epsilon = 1e-12);

        // on dual 2-forms only the d∘ι term survives
        let lie2 = dual.lie_derivative::<2>(&x, &a2, HodgeKind::Diagonal).unwrap();
        let ia2 = dual
            .interior_product::<2>(&x, &a2, HodgeKind::Diagonal)
            .unwrap();
        let expected2 = dual.dual_derivative::<1>().apply(&ia2).unwrap();
        assert_relative_eq!(lie2.values, expected2.values, epsilon = 1e-12);

        // on dual 1-forms both terms contribute; check the shape and
        // that the result is the sum of the two Cartan terms
        let a1 = DualForm::<1>::from_values(na::DVector::from_vec(vec![
            1.0, 0.0, -1.0, 2.0, 1.0,
        ]));
        let lie1 = dual.lie_derivative::<1>(&x, &a1, HodgeKind::Diagonal).unwrap();
        let da1 = dual.dual_derivative::<1>().apply(&a1).unwrap();
        let term_di = dual
            .interior_product::<2>(&x, &da1, HodgeKind::Diagonal)
            .unwrap();
        let ia1 = dual
            .interior_product::<1>(&x, &a1, HodgeKind::Diagonal)
            .unwrap();
        let term_id = dual.dual_derivative::<0>().apply(&ia1).unwrap();
        assert_relative_eq!(
            lie1.values,
            term_di.values + term_id.values,
            epsilon = 1e-12
        );
    }

    #[test]
    fn length_mismatches_are_rejected() {
        let primal = right_triangle();
        let dual = barycentric(&primal);

        let short = PrimalForm::<0>::zeros(2);
        assert!(matches!(
            dual.star::<0>(HodgeKind::Diagonal).unwrap().apply(&short),
            Err(DecError::DimensionMismatch { expected: 3, found: 2 })
        ));

        let short1 = PrimalForm::<1>::zeros(2);
        let ok0 = PrimalForm::<0>::zeros(3);
        assert!(matches!(
            dual.wedge::<0, 1>(&ok0, &short1),
            Err(DecError::DimensionMismatch { .. })
        ));

        let wrong_field = DualVectorField(vec![na::Vector2::zeros(); 3]);
        assert!(matches!(
            dual.flat(&wrong_field),
            Err(DecError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn composition_matches_sequential_application() {
        let primal = hexagon();
        let dual = barycentric(&primal);

        let f = PrimalForm::<0>::from_values(na::DVector::from_iterator(
            primal.nv(),
            (0..primal.nv()).map(|i| (i as f64).sin()),
        ));

        let d0 = dual.d::<0>();
        let star1 = dual.star::<1>(HodgeKind::Diagonal).unwrap();
        let composed = star1.clone() * d0.clone();

        let step = star1.apply(&d0.apply(&f).unwrap()).unwrap();
        let direct = composed.apply(&f).unwrap();
        assert_relative_eq!(step.values, direct.values, epsilon = 1e-12);
    }
}
