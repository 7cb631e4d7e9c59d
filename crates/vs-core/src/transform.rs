//! 2×3 affine matrices for instance placement.
//!
//! Matrices travel as `[a, b, c, d, tx, ty]`, mapping
//! `x' = a·x + c·y + tx`, `y' = b·x + d·y + ty`. That is exactly
//! `kurbo::Affine`'s coefficient layout, so composition and point mapping
//! are delegated to it.

use kurbo::Affine;

pub const IDENTITY: Affine = Affine::IDENTITY;

/// Scale magnitudes below this are treated as mistakenly zeroed.
pub const SANITIZE_EPSILON: f64 = 1e-3;

/// `parent ∘ local`: points go through `local` first, then `parent`.
pub fn compose(parent: Affine, local: Affine) -> Affine {
    parent * local
}

/// Force a near-zero `a` or `d` to 1 so the instance stays visible.
///
/// Only the two diagonal entries are inspected; skew and translation pass
/// through untouched.
pub fn sanitize(m: Affine) -> Affine {
    let mut c = m.as_coeffs();
    if c[0].abs() < SANITIZE_EPSILON {
        c[0] = 1.0;
    }
    if c[3].abs() < SANITIZE_EPSILON {
        c[3] = 1.0;
    }
    Affine::new(c)
}

/// Decode an optional wire matrix; absent means identity.
pub fn from_coeffs(coeffs: Option<&[f64; 6]>) -> Affine {
    coeffs.map_or(IDENTITY, |c| Affine::new(*c))
}
