//! Feature codec helpers shared by the noise routines

use rand_distr::Normal;

use crate::rng::NoiseRng;

/// Rounds half to even, then clamps to `[min, max]`.
pub fn clamp_ordinal(value: f64, min: f64, max: f64) -> f64 {
    let v = value.round_ties_even();
    if v > max {
        max
    } else if v < min {
        min
    } else {
        v
    }
}

/// `round(value + N(mu, sigma))`, consuming one draw from `rng`.
pub fn rounded_gaussian_delta(value: f64, noise: &Normal<f64>, rng: &mut NoiseRng) -> f64 {
    (value + rng.normal(noise)).round_ties_even()
}

/// Clamps a rounded value to `{0, 1}`.
pub fn clamp_binary(value: f64) -> f64 {
    clamp_ordinal(value, 0.0, 1.0)
}

/// Index of the largest value; ties go to the first occurrence.
///
/// Returns 0 for an empty slice.
pub fn argmax_first(values: &[f64]) -> usize {
    let mut best = 0;
    for (idx, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = idx;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_ordinal_rounds_then_bounds() {
        assert_eq!(clamp_ordinal(2.4, 0.0, 4.0), 2.0);
        assert_eq!(clamp_ordinal(7.0, 0.0, 4.0), 4.0);
        assert_eq!(clamp_ordinal(-0.6, 0.0, 4.0), 0.0);
        assert_eq!(clamp_ordinal(2.5, 0.0, 4.0), 2.0);
        assert_eq!(clamp_ordinal(3.5, 0.0, 4.0), 4.0);
    }

    #[test]
    fn zero_sigma_delta_is_identity_on_integers() {
        let noise = Normal::new(0.0, 0.0).unwrap();
        let mut rng = NoiseRng::new(42);
        for v in [0.0, 3.0, -2.0, 17.0] {
            assert_eq!(rounded_gaussian_delta(v, &noise, &mut rng), v);
        }
    }

    #[test]
    fn delta_is_reproducible() {
        let noise = Normal::new(0.0, 2.0).unwrap();
        let mut a = NoiseRng::new(11);
        let mut b = NoiseRng::new(11);
        let xs: Vec<f64> = (0..32)
            .map(|i| rounded_gaussian_delta(i as f64, &noise, &mut a))
            .collect();
        let ys: Vec<f64> = (0..32)
            .map(|i| rounded_gaussian_delta(i as f64, &noise, &mut b))
            .collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|v| v.fract() == 0.0));
    }

    #[test]
    fn argmax_prefers_first_tie() {
        assert_eq!(argmax_first(&[0.0, 1.0, 1.0, 0.0]), 1);
        assert_eq!(argmax_first(&[0.0, 0.0, 0.0]), 0);
        assert_eq!(argmax_first(&[]), 0);
    }

    #[test]
    fn binary_clamp() {
        assert_eq!(clamp_binary(3.0), 1.0);
        assert_eq!(clamp_binary(-2.0), 0.0);
        assert_eq!(clamp_binary(1.0), 1.0);
    }
}
