//! Easing functions for animations
//!
//! Two families live here: cubic-bezier timing curves, solved numerically for
//! the curve parameter at a given x, and a closed-form elastic curve shaped by
//! the instance elasticity. Every curve is addressable by its catalog name.

use std::f64::consts::PI;
use std::str::FromStr;

use crate::error::{AnimeError, Result};

const SPLINE_TABLE_SIZE: usize = 11;
const SAMPLE_STEP_SIZE: f64 = 1.0 / (SPLINE_TABLE_SIZE as f64 - 1.0);

const NEWTON_ITERATIONS: usize = 4;
const NEWTON_MIN_SLOPE: f64 = 0.001;
const SUBDIVISION_PRECISION: f64 = 1e-7;
const SUBDIVISION_MAX_ITERATIONS: usize = 10;

/// Approximated Penner equations, in catalog order.
const BEZIER_CATALOG: [(&str, [f64; 4]); 25] = [
    ("linear", [0.250, 0.250, 0.750, 0.750]),
    ("easeInQuad", [0.550, 0.085, 0.680, 0.530]),
    ("easeInCubic", [0.550, 0.055, 0.675, 0.190]),
    ("easeInQuart", [0.895, 0.030, 0.685, 0.220]),
    ("easeInQuint", [0.755, 0.050, 0.855, 0.060]),
    ("easeInSine", [0.470, 0.000, 0.745, 0.715]),
    ("easeInExpo", [0.950, 0.050, 0.795, 0.035]),
    ("easeInCirc", [0.600, 0.040, 0.980, 0.335]),
    ("easeInBack", [0.600, -0.280, 0.735, 0.045]),
    ("easeOutQuad", [0.250, 0.460, 0.450, 0.940]),
    ("easeOutCubic", [0.215, 0.610, 0.355, 1.000]),
    ("easeOutQuart", [0.165, 0.840, 0.440, 1.000]),
    ("easeOutQuint", [0.230, 1.000, 0.320, 1.000]),
    ("easeOutSine", [0.390, 0.575, 0.565, 1.000]),
    ("easeOutExpo", [0.190, 1.000, 0.220, 1.000]),
    ("easeOutCirc", [0.075, 0.820, 0.165, 1.000]),
    ("easeOutBack", [0.175, 0.885, 0.320, 1.275]),
    ("easeInOutQuad", [0.455, 0.030, 0.515, 0.955]),
    ("easeInOutCubic", [0.645, 0.045, 0.355, 1.000]),
    ("easeInOutQuart", [0.770, 0.000, 0.175, 1.000]),
    ("easeInOutQuint", [0.860, 0.000, 0.070, 1.000]),
    ("easeInOutSine", [0.445, 0.050, 0.550, 0.950]),
    ("easeInOutExpo", [1.000, 0.000, 0.000, 1.000]),
    ("easeInOutCirc", [0.785, 0.135, 0.150, 0.860]),
    ("easeInOutBack", [0.680, -0.550, 0.265, 1.550]),
];

const ELASTIC_CATALOG: [(&str, Easing); 3] = [
    ("easeInElastic", Easing::InElastic),
    ("easeOutElastic", Easing::OutElastic),
    ("easeInOutElastic", Easing::InOutElastic),
];

/// Easing function type
///
/// `apply` maps linear progress in `[0, 1]` to eased progress. Only the
/// elastic variants read the elasticity argument.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    Bezier(CubicBezier),
    InElastic,
    #[default]
    OutElastic,
    InOutElastic,
}

impl Easing {
    /// Build a custom cubic-bezier easing
    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self> {
        CubicBezier::new(x1, y1, x2, y2).map(Easing::Bezier)
    }

    /// The catalog `linear` curve
    pub fn linear() -> Self {
        let [x1, y1, x2, y2] = BEZIER_CATALOG[0].1;
        Easing::Bezier(CubicBezier::from_parts(x1, y1, x2, y2))
    }

    /// Look up a curve by catalog name (`linear`, `easeOutBack`, ...)
    pub fn from_name(name: &str) -> Result<Self> {
        if let Some((_, [x1, y1, x2, y2])) = BEZIER_CATALOG.iter().find(|(n, _)| *n == name) {
            return Self::cubic_bezier(*x1, *y1, *x2, *y2);
        }
        ELASTIC_CATALOG
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, easing)| *easing)
            .ok_or_else(|| AnimeError::UnknownEasing(name.to_string()))
    }

    /// All catalog names
    pub fn names() -> impl Iterator<Item = &'static str> {
        BEZIER_CATALOG
            .iter()
            .map(|(name, _)| *name)
            .chain(ELASTIC_CATALOG.iter().map(|(name, _)| *name))
    }

    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f64, elasticity: f64) -> f64 {
        match self {
            Easing::Bezier(curve) => curve.apply(t),
            Easing::InElastic => elastic(t, elasticity),
            Easing::OutElastic => 1.0 - elastic(1.0 - t, elasticity),
            Easing::InOutElastic => {
                if t < 0.5 {
                    elastic(t * 2.0, elasticity) / 2.0
                } else {
                    1.0 - elastic(t * -2.0 + 2.0, elasticity) / 2.0
                }
            }
        }
    }
}

impl FromStr for Easing {
    type Err = AnimeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// Elastic curve with exponential decay
///
/// `p` is the normalized elasticity. A non-positive or non-finite `p` would
/// divide by zero inside the sine term, so the curve degrades to linear.
pub fn elastic(t: f64, p: f64) -> f64 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    if p <= 0.0 || !p.is_finite() {
        return t;
    }
    let phase = ((t - 1.0) - (p / (PI * 2.0) * 1.0_f64.asin())) * (PI * 2.0) / p;
    -(2.0_f64.powf(10.0 * (t - 1.0))) * phase.sin()
}

/// Cubic bezier timing curve anchored at (0,0) and (1,1)
///
/// Holds an 11-point sample table of x over the curve parameter, used to
/// seed root finding when solving for the parameter at a given x.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    samples: [f64; SPLINE_TABLE_SIZE],
}

impl CubicBezier {
    /// Create a curve from its two inner control points.
    ///
    /// Fails with [`AnimeError::InvalidBezier`] when `x1` or `x2` leaves
    /// `[0, 1]`; the y coordinates are unconstrained.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self> {
        if !((0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2)) {
            return Err(AnimeError::InvalidBezier { x1, x2 });
        }
        Ok(Self::from_parts(x1, y1, x2, y2))
    }

    fn from_parts(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let mut samples = [0.0; SPLINE_TABLE_SIZE];
        if x1 != y1 || x2 != y2 {
            for (i, sample) in samples.iter_mut().enumerate() {
                *sample = bezier_sample(i as f64 * SAMPLE_STEP_SIZE, x1, x2);
            }
        }
        Self {
            x1,
            y1,
            x2,
            y2,
            samples,
        }
    }

    /// Control points as `[x1, y1, x2, y2]`
    pub fn control_points(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Whether the curve is the straight diagonal, evaluated as `x` itself
    pub fn is_identity(&self) -> bool {
        self.x1 == self.y1 && self.x2 == self.y2
    }

    pub fn apply(&self, x: f64) -> f64 {
        if self.is_identity() {
            return x;
        }
        if x == 0.0 {
            return 0.0;
        }
        if x == 1.0 {
            return 1.0;
        }
        bezier_sample(self.t_for_x(x), self.y1, self.y2)
    }

    /// Solve for the curve parameter whose x coordinate equals `x`
    fn t_for_x(&self, x: f64) -> f64 {
        let last_sample = SPLINE_TABLE_SIZE - 1;
        let mut interval_start = 0.0;
        let mut current = 1;

        while current != last_sample && self.samples[current] <= x {
            interval_start += SAMPLE_STEP_SIZE;
            current += 1;
        }
        current -= 1;

        let dist = (x - self.samples[current]) / (self.samples[current + 1] - self.samples[current]);
        let guess = interval_start + dist * SAMPLE_STEP_SIZE;
        let initial_slope = bezier_slope(guess, self.x1, self.x2);

        if initial_slope >= NEWTON_MIN_SLOPE {
            newton_raphson(x, guess, self.x1, self.x2)
        } else if initial_slope == 0.0 {
            guess
        } else {
            binary_subdivide(x, interval_start, interval_start + SAMPLE_STEP_SIZE, self.x1, self.x2)
        }
    }
}

fn newton_raphson(x: f64, mut guess: f64, x1: f64, x2: f64) -> f64 {
    for _ in 0..NEWTON_ITERATIONS {
        let slope = bezier_slope(guess, x1, x2);
        if slope == 0.0 {
            return guess;
        }
        let err = bezier_sample(guess, x1, x2) - x;
        guess -= err / slope;
    }
    guess
}

fn binary_subdivide(x: f64, mut lo: f64, mut hi: f64, x1: f64, x2: f64) -> f64 {
    let mut t = lo;
    for _ in 0..SUBDIVISION_MAX_ITERATIONS {
        t = lo + (hi - lo) / 2.0;
        let err = bezier_sample(t, x1, x2) - x;
        if err > 0.0 {
            hi = t;
        } else {
            lo = t;
        }
        if err.abs() <= SUBDIVISION_PRECISION {
            break;
        }
    }
    t
}

/// Evaluate cubic bezier at parameter t: B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    // Horner form: ((1-3p2+3p1)t + 3p2-6p1)t + 3p1) * t
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

/// Derivative of cubic bezier: B'(t) = 3(1-t)²·p1 + 6(1-t)t·(p2-p1) + 3t²·(1-p2)
#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}
