use num_complex::Complex64;

/// Relative tolerance of [`all_close`], the `numpy.allclose` default.
pub const RTOL: f64 = 1e-5;

/// `|a - b| <= atol + RTOL |b|` for every pair of points.
pub fn all_close(a: &[Complex64], b: &[Complex64], atol: f64) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| (x - y).norm() <= atol + RTOL * y.norm())
}

/// Real-valued counterpart of [`all_close`].
pub fn all_close_real(a: &[f64], b: &[f64], atol: f64) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| (x - y).abs() <= atol + RTOL * y.abs())
}

/// Largest point-wise distance between two sampled functions.
pub fn max_distance(a: &[Complex64], b: &[Complex64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

/// Even part `(f(w) + f(-w)) / 2` on a mirror symmetric grid.
pub fn symmetrize_even(f: &[f64]) -> Vec<f64> {
    let n = f.len();
    (0..n).map(|i| 0.5 * (f[i] + f[n - 1 - i])).collect()
}

/// Odd part `(f(w) - f(-w)) / 2` on a mirror symmetric grid.
pub fn antisymmetrize_odd(f: &[f64]) -> Vec<f64> {
    let n = f.len();
    (0..n).map(|i| 0.5 * (f[i] - f[n - 1 - i])).collect()
}

/// `f(-w)` on a mirror symmetric grid.
pub fn reversed(f: &[f64]) -> Vec<f64> {
    f.iter().rev().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_close_uses_absolute_and_relative_tolerance() {
        let a = [Complex64::new(1.0, 0.0), Complex64::new(0.0, 1e3)];
        let b = [Complex64::new(1.0 + 1e-9, 0.0), Complex64::new(0.0, 1e3 + 5e-3)];
        assert!(all_close(&a, &b, 1e-8));
        assert!(!all_close(&a, &b[..1], 1e-8));

        let c = [Complex64::new(1.0 + 1e-4, 0.0), Complex64::new(0.0, 1e3)];
        assert!(!all_close(&a, &c, 1e-8));
        assert!(all_close(&a, &c, 1e-3));
    }

    #[test]
    fn test_parity_projections() {
        let f = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(symmetrize_even(&f), vec![3.0, 3.0, 3.0, 3.0, 3.0]);
        assert_eq!(antisymmetrize_odd(&f), vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
        assert_eq!(reversed(&f), vec![5.0, 4.0, 3.0, 2.0, 1.0]);
        assert_eq!(max_distance(&[Complex64::new(3.0, 4.0)], &[Complex64::new(0.0, 0.0)]), 5.0);
        assert!(all_close_real(&f, &f, 0.0));
    }
}
