//! Numerical integration.
//!
//! # Algorithm
//! Adaptive Simpson quadrature: each interval is estimated with Simpson's
//! rule, then split in half. When the two halves agree with the whole to
//! within `15 × tolerance` the Richardson-corrected sum is accepted;
//! otherwise both halves recurse with the tolerance halved.
//!
//! Reference: Lyness (1969), "Notes on the Adaptive Simpson Quadrature
//! Routine", *Journal of the ACM* 16(3), pp. 483–495.

/// Default absolute tolerance used by [`integrate`].
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default recursion depth used by [`integrate`].
pub const DEFAULT_MAX_DEPTH: u32 = 50;

/// Integrates `f` over `[a, b]` with the default tolerance and depth.
///
/// # Examples
/// ```
/// use u_statcore::integrate::integrate;
/// let area = integrate(|x| x * x, 0.0, 3.0);
/// assert!((area - 9.0).abs() < 1e-10);
/// ```
pub fn integrate<F: Fn(f64) -> f64>(f: F, a: f64, b: f64) -> f64 {
    adaptive_simpson(f, a, b, DEFAULT_TOLERANCE, DEFAULT_MAX_DEPTH)
}

/// Adaptive Simpson integration of `f` over `[a, b]`.
///
/// `tolerance` is the absolute error target for the whole interval; it is
/// halved on every level of recursion. `max_depth` bounds the recursion so
/// that integrable singularities at an endpoint still terminate.
///
/// Returns `0.0` when `a == b` and a negated integral when `b < a`.
///
/// # Complexity
/// O(2^depth) evaluations worst case; smooth integrands converge in a
/// handful of levels.
pub fn adaptive_simpson<F: Fn(f64) -> f64>(
    f: F,
    a: f64,
    b: f64,
    tolerance: f64,
    max_depth: u32,
) -> f64 {
    if a == b {
        return 0.0;
    }
    let c = 0.5 * (a + b);
    let (fa, fb, fc) = (f(a), f(b), f(c));
    let whole = simpson(a, b, fa, fc, fb);
    refine(&f, Panel { a, b, fa, fb, fc, whole }, tolerance, max_depth)
}

#[derive(Clone, Copy)]
struct Panel {
    a: f64,
    b: f64,
    fa: f64,
    fb: f64,
    fc: f64,
    whole: f64,
}

fn simpson(a: f64, b: f64, fa: f64, fc: f64, fb: f64) -> f64 {
    (b - a) / 6.0 * (fa + 4.0 * fc + fb)
}

fn refine<F: Fn(f64) -> f64>(f: &F, p: Panel, tolerance: f64, depth: u32) -> f64 {
    let c = 0.5 * (p.a + p.b);
    let d = 0.5 * (p.a + c);
    let e = 0.5 * (c + p.b);
    let (fd, fe) = (f(d), f(e));
    let left = simpson(p.a, c, p.fa, fd, p.fc);
    let right = simpson(c, p.b, p.fc, fe, p.fb);
    let delta = left + right - p.whole;

    if depth == 0 || delta.abs() <= 15.0 * tolerance || !delta.is_finite() {
        return left + right + delta / 15.0;
    }

    let half = tolerance / 2.0;
    refine(
        f,
        Panel {
            a: p.a,
            b: c,
            fa: p.fa,
            fb: p.fc,
            fc: fd,
            whole: left,
        },
        half,
        depth - 1,
    ) + refine(
        f,
        Panel {
            a: c,
            b: p.b,
            fa: p.fc,
            fb: p.fb,
            fc: fe,
            whole: right,
        },
        half,
        depth - 1,
    )
}
