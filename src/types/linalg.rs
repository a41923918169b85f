//! Linear algebra type system for the filter core.
//!
//! Provides compile-time dimension checking and clean type aliases for all
//! filter implementations, plus the linear solves the Kalman gain
//! computation is built on. Filter code is written against these names, not
//! against the backend crate directly.

use nalgebra::{Const, DimMin, SMatrix, SVector};

/// Column vector of fixed dimension `N`.
pub type Vector<const N: usize> = SVector<f64, N>;

/// Matrix with `R` rows and `C` columns.
pub type Matrix<const R: usize, const C: usize> = SMatrix<f64, R, C>;

/// Solve `A * X = B` for `X` ("divide left") through LU factorization,
/// without forming an explicit inverse. Returns `None` when `A` is
/// singular.
///
/// The `DimMin` bound is how the backend spells "square system" for const
/// dimensions; every concrete dimension satisfies it.
pub fn solve_left<const N: usize, const C: usize>(
    a: &Matrix<N, N>,
    b: &Matrix<N, C>,
) -> Option<Matrix<N, C>>
where
    Const<N>: DimMin<Const<N>, Output = Const<N>>,
{
    a.lu().solve(b)
}

/// Solve `X * A = B` for `X` ("divide right") through LU factorization,
/// without forming an explicit inverse. Returns `None` when `A` is
/// singular.
pub fn solve_right<const R: usize, const C: usize>(
    b: &Matrix<R, C>,
    a: &Matrix<C, C>,
) -> Option<Matrix<R, C>>
where
    Const<C>: DimMin<Const<C>, Output = Const<C>>,
{
    solve_left(&a.transpose(), &b.transpose()).map(|x| x.transpose())
}
