use crate::foundation::{core::Point, math::nearly_equal};

const NEWTON_ITERATIONS: usize = 8;
const BISECTION_ITERATIONS: usize = 24;
const TOLERANCE: f32 = 1e-6;

/// Cubic easing curve through `(0,0)`, `c1`, `c2`, `(1,1)`, evaluated as `Y(X)`.
///
/// `X` is time-domain progress within a keyframe interval, `Y` the value-domain progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct CubicMapper {
    c1: (f32, f32),
    c2: (f32, f32),
}

impl CubicMapper {
    pub(crate) fn new(c1: Point, c2: Point) -> Self {
        Self {
            // Time components are constrained to [0, 1] so X(u) stays monotonic.
            c1: ((c1.x as f32).clamp(0.0, 1.0), c1.y as f32),
            c2: ((c2.x as f32).clamp(0.0, 1.0), c2.y as f32),
        }
    }

    /// `true` when both control points sit on the diagonal, i.e. the curve is the identity.
    pub(crate) fn is_linear(c1: Point, c2: Point) -> bool {
        nearly_equal(c1.x as f32, c1.y as f32) && nearly_equal(c2.x as f32, c2.y as f32)
    }

    pub(crate) fn same_controls(&self, other: &Self) -> bool {
        self == other
    }

    pub(crate) fn map(&self, x: f32) -> f32 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        let u = self.solve_u(x);
        sample(self.c1.1, self.c2.1, u)
    }

    fn solve_u(&self, x: f32) -> f32 {
        let (a1, a2) = (self.c1.0, self.c2.0);

        let mut u = x;
        for _ in 0..NEWTON_ITERATIONS {
            let err = sample(a1, a2, u) - x;
            if err.abs() < TOLERANCE {
                return u;
            }
            let d = sample_derivative(a1, a2, u);
            if d.abs() < 1e-6 {
                break;
            }
            u = (u - err / d).clamp(0.0, 1.0);
        }

        // Flat or non-converging regions: bisect X(u) = x.
        let (mut lo, mut hi) = (0.0f32, 1.0f32);
        u = x;
        for _ in 0..BISECTION_ITERATIONS {
            let xu = sample(a1, a2, u);
            if (xu - x).abs() < TOLERANCE {
                break;
            }
            if xu < x {
                lo = u;
            } else {
                hi = u;
            }
            u = 0.5 * (lo + hi);
        }
        u
    }
}

fn sample(a1: f32, a2: f32, u: f32) -> f32 {
    let omu = 1.0 - u;
    3.0 * omu * omu * u * a1 + 3.0 * omu * u * u * a2 + u * u * u
}

fn sample_derivative(a1: f32, a2: f32, u: f32) -> f32 {
    let omu = 1.0 - u;
    3.0 * omu * omu * a1 + 6.0 * omu * u * (a2 - a1) + 3.0 * u * u * (1.0 - a2)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/cubic.rs"]
mod tests;
