//! Euclidean kernel: simplex volumes and the three center constructions.
//!
//! Volumes are computed from the Cayley–Menger determinant of squared edge
//! lengths, which only needs pairwise distances and therefore works the same
//! for primal simplices and for the simplices of the dual subdivision.

use nalgebra as na;

use crate::error::DecError;

/// Threshold below which a (scale-normalized) Cayley–Menger determinant
/// counts as degenerate.
pub(crate) const DEGENERACY_EPS: f64 = 1e-12;

/// Squared Euclidean distance between two points.
#[inline]
pub fn sqdistance<const N: usize>(p: &na::SVector<f64, N>, q: &na::SVector<f64, N>) -> f64 {
    (p - q).norm_squared()
}

/// The (k+2)×(k+2) Cayley–Menger matrix of a k-simplex given by its
/// `k + 1` points: zero diagonal, a border of ones in the first row and
/// column (except the corner), and squared distances in the interior.
pub fn cayley_menger<const N: usize>(points: &[na::SVector<f64, N>]) -> na::DMatrix<f64> {
    let n = points.len() + 1;
    let mut m = na::DMatrix::zeros(n, n);
    for i in 1..n {
        m[(0, i)] = 1.0;
        m[(i, 0)] = 1.0;
    }
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let d = sqdistance(&points[i], &points[j]);
            m[(i + 1, j + 1)] = d;
            m[(j + 1, i + 1)] = d;
        }
    }
    m
}

/// Unsigned volume of the k-simplex spanned by `points`,
/// `sqrt(|det CM| / 2^k) / k!`.
///
/// A single point has volume 1 by convention.
pub fn volume<const N: usize>(points: &[na::SVector<f64, N>]) -> f64 {
    let k = points.len() - 1;
    if k == 0 {
        return 1.0;
    }
    let det = cayley_menger(points).determinant();
    let k_factorial: usize = (1..=k).product();
    (det.abs() / 2f64.powi(k as i32)).sqrt() / k_factorial as f64
}

/// Arithmetic mean of the given points.
pub fn barycenter<const N: usize>(points: &[na::SVector<f64, N>]) -> na::SVector<f64, N> {
    points
        .iter()
        .fold(na::SVector::zeros(), |acc, p| acc + p)
        / points.len() as f64
}

/// The point equidistant from all vertices of the simplex,
/// lying in the simplex's affine hull.
///
/// Solved in barycentric coordinates via the bordered linear system
/// `[2 P Pᵀ, 1; 1ᵀ, 0] [λ; μ] = [diag(P Pᵀ); 1]`.
/// Fails with [`DecError::DegenerateGeometry`] when the simplex is flat.
pub fn circumcenter<const N: usize>(
    points: &[na::SVector<f64, N>],
) -> Result<na::SVector<f64, N>, DecError> {
    let k = points.len();
    if k == 1 {
        return Ok(points[0]);
    }
    if k == 2 {
        return Ok(0.5 * (points[0] + points[1]));
    }
    let dim = k + 1;
    let mut coef = na::DMatrix::zeros(dim, dim);
    let mut rhs = na::DVector::zeros(dim);
    for i in 0..k {
        coef[(i, k)] = 1.0;
        coef[(k, i)] = 1.0;
        rhs[i] = points[i].dot(&points[i]);
        for j in 0..k {
            coef[(i, j)] = 2.0 * points[i].dot(&points[j]);
        }
    }
    rhs[k] = 1.0;

    let bary = coef
        .lu()
        .solve(&rhs)
        .ok_or(DecError::DegenerateGeometry("flat simplex has no circumcenter"))?;
    let mut center = na::SVector::zeros();
    for (i, p) in points.iter().enumerate() {
        center += bary[i] * p;
    }
    Ok(center)
}

/// Incenter of a triangle: the opposite-edge-length weighted mean
/// `(a·p₀ + b·p₁ + c·p₂) / (a + b + c)`.
///
/// For lower-dimensional simplices this degenerates to the midpoint
/// or the point itself.
pub fn incenter<const N: usize>(points: &[na::SVector<f64, N>]) -> na::SVector<f64, N> {
    match points {
        [p] => *p,
        [p, q] => 0.5 * (p + q),
        [p0, p1, p2] => {
            let a = (p1 - p2).norm();
            let b = (p0 - p2).norm();
            let c = (p0 - p1).norm();
            (a * p0 + b * p1 + c * p2) / (a + b + c)
        }
        _ => barycenter(points),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    type Vec2 = na::SVector<f64, 2>;
    type Vec3 = na::SVector<f64, 3>;

    #[test]
    fn cayley_menger_volumes() {
        // segment length
        let seg = [Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0)];
        assert_relative_eq!(volume(&seg), 5.0);

        // unit right triangle area
        let tri = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ];
        assert_relative_eq!(volume(&tri), 0.5);

        // the same triangle embedded in 3d
        let tri3 = [
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        ];
        assert_relative_eq!(volume(&tri3), 0.5);

        // degenerate triangle has zero area
        let flat = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
        ];
        assert_relative_eq!(volume(&flat), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn centers_of_a_right_triangle() {
        let tri = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ];

        assert_relative_eq!(barycenter(&tri), Vec2::new(1.0 / 3.0, 1.0 / 3.0));
        assert_relative_eq!(circumcenter(&tri).unwrap(), Vec2::new(0.5, 0.5));

        let inc = 1.0 / (2.0 + f64::sqrt(2.0));
        assert_relative_eq!(incenter(&tri), Vec2::new(inc, inc), epsilon = 1e-12);
    }

    #[test]
    fn circumcenter_of_edge_is_midpoint() {
        let seg = [Vec2::new(-2.0, 0.0), Vec2::new(4.0, 2.0)];
        assert_relative_eq!(circumcenter(&seg).unwrap(), Vec2::new(1.0, 1.0));
        assert_relative_eq!(incenter(&seg), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn flat_triangle_has_no_circumcenter() {
        let flat = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
        ];
        assert!(matches!(
            circumcenter(&flat),
            Err(DecError::DegenerateGeometry(_))
        ));
    }
}
