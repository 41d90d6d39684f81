#[cfg(test)]
mod tests {
    use crate::error::GreensError;
    use crate::fourier::{gt_fouriertrans, gw_invfouriertrans, interpol, Tail};
    use crate::grid::tau_wn_setup;
    use crate::hilbert::semi_circle_hiltrans;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    fn atomic_level(energy: f64, beta: f64, tau: f64) -> f64 {
        -(-energy * tau).exp() / (1.0 + (-beta * energy).exp())
    }

    #[test]
    fn test_semicircle_jumps_to_one_half() {
        let (tau, w_n) = tau_wn_setup(16.0, 2048, 64).unwrap();
        let giw: Vec<Complex64> = w_n
            .iter()
            .map(|&w| semi_circle_hiltrans(Complex64::new(0.0, w), 1.0))
            .collect();
        let gt = gw_invfouriertrans(&giw, &tau, &w_n, Tail::fermion()).unwrap();

        assert_eq!(gt.len(), tau.len());
        assert_relative_eq!(gt[0], -0.5, epsilon = 1e-12);
        assert_relative_eq!(gt[2048], -0.5, epsilon = 1e-12);
        // particle-hole symmetry: G(tau) = G(beta - tau)
        for k in 0..=2048 {
            assert_relative_eq!(gt[k], gt[2048 - k], epsilon = 1e-10);
        }
        assert!(gt[1024] < 0.0 && gt[1024] > -0.5);
    }

    #[test]
    fn test_forward_inverts_inverse() {
        let (tau, w_n) = tau_wn_setup(16.0, 2048, 64).unwrap();
        let giw: Vec<Complex64> = w_n
            .iter()
            .map(|&w| semi_circle_hiltrans(Complex64::new(0.3, w), 1.0))
            .collect();
        let gt = gw_invfouriertrans(&giw, &tau, &w_n, Tail::fermion()).unwrap();
        let back = gt_fouriertrans(&gt, &tau, &w_n, Tail::fermion()).unwrap();

        for (a, b) in back.iter().zip(&giw) {
            assert!((a - b).norm() < 1e-10, "{} != {}", a, b);
        }
    }

    #[test]
    fn test_atomic_level_with_full_tail() {
        let (beta, energy) = (10.0, 0.3);
        let (tau, w_n) = tau_wn_setup(beta, 4096, 1024).unwrap();
        let giw: Vec<Complex64> = w_n
            .iter()
            .map(|&w| (Complex64::new(-energy, w)).inv())
            .collect();
        let tail = Tail::new(1.0, energy, energy * energy);
        let gt = gw_invfouriertrans(&giw, &tau, &w_n, tail).unwrap();

        for k in (0..=4096).step_by(256) {
            assert_relative_eq!(gt[k], atomic_level(energy, beta, tau[k]), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_tail_terms_match_between_axes() {
        let tail = Tail::new(0.0, 0.25, 0.0);
        let (tau, w_n) = tau_wn_setup(8.0, 512, 128).unwrap();
        let g_tau: Vec<f64> = tau.iter().map(|&t| tail.time(t, 8.0)).collect();
        let giw = gt_fouriertrans(&g_tau, &tau, &w_n, tail).unwrap();
        for (g, &w) in giw.iter().zip(&w_n) {
            assert!((g - tail.frequency(w)).norm() < 1e-12);
            assert_relative_eq!(g.re, -0.25 / (w * w), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_interpol_keeps_grid_points() {
        let g: Vec<f64> = (0..=8).map(|k| (k * k) as f64).collect();
        let coarse = interpol(&g, 4).unwrap();
        assert_eq!(coarse, vec![0.0, 4.0, 16.0, 36.0, 64.0]);

        let fine = interpol(&g, 16).unwrap();
        assert_eq!(fine.len(), 17);
        assert_relative_eq!(fine[1], 0.5, epsilon = 1e-14);
        assert_relative_eq!(fine[16], 64.0, epsilon = 1e-14);
    }

    #[test]
    fn test_malformed_inputs_are_errors() {
        let (tau, w_n) = tau_wn_setup(8.0, 64, 16).unwrap();
        let giw = vec![Complex64::new(0.0, -1.0); 15];
        assert_eq!(
            gw_invfouriertrans(&giw, &tau, &w_n, Tail::fermion()),
            Err(GreensError::LengthMismatch { expected: 16, got: 15 })
        );
        assert!(gw_invfouriertrans(&giw[..2], &tau[..2], &w_n[..2], Tail::fermion()).is_err());

        let g_tau = vec![0.0; 64];
        assert_eq!(
            gt_fouriertrans(&g_tau, &tau, &w_n, Tail::fermion()),
            Err(GreensError::LengthMismatch { expected: 65, got: 64 })
        );
        let many: Vec<f64> = (0..65).map(|k| k as f64).collect();
        assert!(matches!(
            gt_fouriertrans(&vec![0.0; 65], &tau, &many, Tail::fermion()),
            Err(GreensError::UnderResolvedTau { .. })
        ));

        assert!(interpol(&[1.0], 4).is_err());
        assert!(interpol(&[1.0, 2.0], 0).is_err());
    }
}
