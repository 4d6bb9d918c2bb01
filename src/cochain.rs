//! Forms (cochains) and chains: values attached to the cells of a complex.
//!
//! Both are dense real vectors indexed by simplex id. The difference is
//! variance — chains push through the boundary, forms through the
//! coboundary — and which of the primal or dual complex they live on.
//! Both distinctions are tracked in the type system so operators cannot
//! be applied to the wrong kind of vector.

use nalgebra as na;

/// Marker type for values living on the primal complex.
#[derive(Clone, Copy, Debug)]
pub struct Primal;

/// Marker type for values living on the dual complex.
#[derive(Clone, Copy, Debug)]
pub struct Dual;

/// Trait tying the [`Primal`] and [`Dual`] markers together.
///
/// Not intended to be implemented outside this crate.
pub trait Primality {
    /// Constant for runtime branching.
    #[doc(hidden)]
    const IS_PRIMAL: bool;
    /// Maps `Primal` to `Dual` and back.
    type Opposite: Primality;
}

impl Primality for Primal {
    const IS_PRIMAL: bool = true;
    type Opposite = Dual;
}

impl Primality for Dual {
    const IS_PRIMAL: bool = false;
    type Opposite = Primal;
}

/// A `K`-form: one real value per (primal or dual) `K`-cell.
///
/// The more convenient aliases [`PrimalForm`] and [`DualForm`]
/// are preferred in public APIs.
pub type Cochain<const K: usize, P> = CochainImpl<na::Const<K>, P>;

/// A form on the primal complex.
pub type PrimalForm<const K: usize> = Cochain<K, Primal>;

/// A form on the dual complex.
pub type DualForm<const K: usize> = Cochain<K, Dual>;

/// The cochain type used internally.
///
/// Operators need compile-time arithmetic on the dimension
/// (`K + 1`, `D − K`), which const generics cannot express on stable;
/// the dimension is therefore a [`na::DimName`] type parameter
/// and [`Cochain`] papers over it.
#[derive(Clone)]
pub struct CochainImpl<Dim, P> {
    /// The underlying vector of values, one per cell.
    pub values: na::DVector<f64>,
    _marker: std::marker::PhantomData<(Dim, P)>,
}

impl<Dim, P> CochainImpl<Dim, P> {
    /// Construct a form from a vector of per-cell values.
    #[inline]
    pub fn from_values(values: na::DVector<f64>) -> Self {
        Self {
            values,
            _marker: std::marker::PhantomData,
        }
    }

    /// Construct a form of `len` zeros.
    #[inline]
    pub fn zeros(len: usize) -> Self {
        Self::from_values(na::DVector::zeros(len))
    }

    /// Number of cells this form assigns values to.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the form has no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<Dim, P> std::fmt::Debug for CochainImpl<Dim, P>
where
    Dim: na::DimName,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-form, values {:?}", Dim::USIZE, self.values)
    }
}

impl<Dim, P> PartialEq for CochainImpl<Dim, P> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

/// A `K`-chain: a formal sum of oriented `K`-cells.
pub type Chain<const K: usize, P> = ChainImpl<na::Const<K>, P>;

/// A chain on the primal complex.
pub type PrimalChain<const K: usize> = Chain<K, Primal>;

/// A chain on the dual complex.
pub type DualChain<const K: usize> = Chain<K, Dual>;

/// The chain type used internally; see [`CochainImpl`] for why the
/// dimension is a type parameter.
#[derive(Clone)]
pub struct ChainImpl<Dim, P> {
    /// Coefficients of the formal sum, one per cell.
    pub coeffs: na::DVector<f64>,
    _marker: std::marker::PhantomData<(Dim, P)>,
}

impl<Dim, P> ChainImpl<Dim, P> {
    /// Construct a chain from a vector of per-cell coefficients.
    #[inline]
    pub fn from_coeffs(coeffs: na::DVector<f64>) -> Self {
        Self {
            coeffs,
            _marker: std::marker::PhantomData,
        }
    }

    /// The chain consisting of a single positively oriented cell.
    pub fn unit(len: usize, cell: usize) -> Self {
        let mut coeffs = na::DVector::zeros(len);
        coeffs[cell] = 1.0;
        Self::from_coeffs(coeffs)
    }

    /// Number of cells in the underlying id range.
    #[inline]
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// Whether the chain has no coefficients.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }
}

impl<Dim, P> std::fmt::Debug for ChainImpl<Dim, P>
where
    Dim: na::DimName,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-chain, coefficients {:?}", Dim::USIZE, self.coeffs)
    }
}

impl<Dim, P> PartialEq for ChainImpl<Dim, P> {
    fn eq(&self, other: &Self) -> bool {
        self.coeffs == other.coeffs
    }
}

// arithmetic on forms, value and reference variants as needed by callers

impl<Dim, P> std::ops::Add for CochainImpl<Dim, P> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_values(self.values + rhs.values)
    }
}

impl<Dim, P> std::ops::Add<&CochainImpl<Dim, P>> for CochainImpl<Dim, P> {
    type Output = Self;

    fn add(self, rhs: &CochainImpl<Dim, P>) -> Self::Output {
        Self::from_values(self.values + &rhs.values)
    }
}

impl<Dim, P> std::ops::Sub for CochainImpl<Dim, P> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_values(self.values - rhs.values)
    }
}

impl<Dim, P> std::ops::Sub for &CochainImpl<Dim, P> {
    type Output = CochainImpl<Dim, P>;

    fn sub(self, rhs: Self) -> Self::Output {
        CochainImpl::from_values(&self.values - &rhs.values)
    }
}

impl<Dim, P> std::ops::Neg for CochainImpl<Dim, P> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::from_values(-self.values)
    }
}

impl<Dim, P> std::ops::Mul<CochainImpl<Dim, P>> for f64 {
    type Output = CochainImpl<Dim, P>;

    fn mul(self, rhs: CochainImpl<Dim, P>) -> Self::Output {
        CochainImpl::from_values(self * rhs.values)
    }
}
