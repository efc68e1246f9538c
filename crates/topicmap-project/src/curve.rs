//! Fit of the low-dimensional similarity curve `1 / (1 + a * x^(2b))`.

const SAMPLES: usize = 300;
const MAX_ITERATIONS: usize = 200;

/// Find `(a, b)` so that `1 / (1 + a x^(2b))` approximates 1 below `min_dist`
/// and `exp(-(x - min_dist) / spread)` above it, by Levenberg-Marquardt least
/// squares on `[0, 3 * spread]`.
pub fn find_ab_params(spread: f32, min_dist: f32) -> (f32, f32) {
    let spread = f64::from(spread);
    let min_dist = f64::from(min_dist);
    let xs: Vec<f64> = (0..SAMPLES).map(|i| 3.0 * spread * i as f64 / (SAMPLES - 1) as f64).collect();
    let ys: Vec<f64> = xs.iter().map(|&x| if x < min_dist { 1.0 } else { (-(x - min_dist) / spread).exp() }).collect();

    let cost = |a: f64, b: f64| -> f64 { xs.iter().zip(&ys).map(|(&x, &y)| (curve(x, a, b) - y).powi(2)).sum() };

    let (mut a, mut b) = (1.0f64, 1.0f64);
    let mut current = cost(a, b);
    let mut lambda = 1e-3;
    for _ in 0..MAX_ITERATIONS {
        let (mut jaa, mut jab, mut jbb, mut ga, mut gb) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for (&x, &y) in xs.iter().zip(&ys) {
            if x <= 0.0 {
                continue;
            }
            let p = x.powf(2.0 * b);
            let denom = 1.0 + a * p;
            let r = 1.0 / denom - y;
            let da = -p / (denom * denom);
            let db = -a * p * 2.0 * x.ln() / (denom * denom);
            jaa += da * da;
            jab += da * db;
            jbb += db * db;
            ga += da * r;
            gb += db * r;
        }
        let mut accepted = false;
        while lambda < 1e12 {
            let (m00, m11) = (jaa * (1.0 + lambda), jbb * (1.0 + lambda));
            let det = m00 * m11 - jab * jab;
            if det.abs() < f64::EPSILON {
                lambda *= 10.0;
                continue;
            }
            let step_a = -(m11 * ga - jab * gb) / det;
            let step_b = -(m00 * gb - jab * ga) / det;
            let (na, nb) = (a + step_a, b + step_b);
            if na > 0.0 && nb > 0.0 {
                let next = cost(na, nb);
                if next < current {
                    let converged = (current - next) < 1e-14 * current.max(1e-30);
                    a = na;
                    b = nb;
                    current = next;
                    lambda = (lambda / 10.0).max(1e-12);
                    accepted = !converged;
                    break;
                }
            }
            lambda *= 10.0;
        }
        if !accepted {
            break;
        }
    }
    tracing::debug!(a, b, spread, min_dist, "fitted projection curve");
    (a as f32, b as f32)
}

fn curve(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        1.0
    } else {
        1.0 / (1.0 + a * x.powf(2.0 * b))
    }
}
