use super::*;
use approx::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const GEND_HALF: [f64; 33] = [
    -0.5, -0.335, -0.246, -0.196, -0.164, -0.144, -0.129, -0.118, -0.11, -0.104, -0.099, -0.095,
    -0.092, -0.09, -0.089, -0.087, -0.087, -0.087, -0.089, -0.09, -0.092, -0.095, -0.099, -0.104,
    -0.11, -0.118, -0.129, -0.144, -0.164, -0.196, -0.246, -0.335, -0.5,
];

const GEND_DOPED: [f64; 33] = [
    -0.451, -0.316, -0.237, -0.187, -0.154, -0.132, -0.117, -0.106, -0.098, -0.092, -0.088,
    -0.085, -0.082, -0.08, -0.08, -0.079, -0.079, -0.079, -0.08, -0.081, -0.083, -0.085, -0.088,
    -0.092, -0.098, -0.105, -0.114, -0.127, -0.144, -0.172, -0.222, -0.322, -0.549,
];

fn params(mu: f64, u_int: f64) -> HfParams {
    HfParams {
        mu,
        u_int,
        sweeps: 5000,
        therm: 1000,
        ..HfParams::default()
    }
}

fn assert_close_to(g: &[f64], reference: &[f64], atol: f64) {
    assert_eq!(g.len(), reference.len());
    for (l, (a, b)) in g.iter().zip(reference).enumerate() {
        assert!((a - b).abs() <= atol, "tau slice {}: {} != {}", l, a, b);
    }
}

#[test]
fn test_ising_fields() {
    let mut rng = StdRng::seed_from_u64(1);
    let v = ising_v(0.5, 2.0, 32, 1, &mut rng);
    let lambda = ising_lambda(0.5, 2.0);
    assert_eq!(v.shape(), (1, 32));
    assert!(v.iter().all(|&x| x == lambda || x == -lambda));
    assert_relative_eq!(lambda.cosh(), (0.5_f64).exp(), epsilon = 1e-12);
}

#[test]
fn test_interaction_matrix() {
    let single = interaction_matrix(1);
    assert_eq!(single.shape(), (2, 1));
    assert_eq!(single[(0, 0)], 1.0);
    assert_eq!(single[(1, 0)], -1.0);

    let two = interaction_matrix(2);
    assert_eq!(two.shape(), (4, 6));
    for column in two.column_iter() {
        assert_eq!(column.iter().filter(|&&x| x != 0.0).count(), 2);
        assert_eq!(column.sum(), 0.0);
    }
}

#[test]
fn test_retarded_weiss_is_antiperiodic() {
    let g = [-0.5, -0.3, -0.2, -0.3];
    let m = retarded_weiss(&g);
    assert_eq!(m[(0, 0)], 0.5);
    assert_eq!(m[(2, 1)], 0.3);
    assert_eq!(m[(1, 2)], -0.3);
    assert_eq!(m[(0, 3)], -0.3);

    let averaged = time_average(&m);
    assert_eq!(averaged.len(), 5);
    for (a, b) in averaged.iter().zip(&g) {
        assert_relative_eq!(*a, -b, epsilon = 1e-14);
    }
    assert_relative_eq!(averaged[4], 0.5, epsilon = 1e-14);
}

#[test]
fn test_hf_fast_updatecond() {
    for (mu, u_int) in [(0.0, 2.0), (0.5, 2.3)] {
        let p = params(mu, u_int);
        let mut rng = StdRng::seed_from_u64(p.seed);
        let setup = setup_pm_sim(&p, &mut rng).unwrap();
        let g0m = retarded_weiss(&setup.g0t);
        let mut v: Vec<f64> = setup.v.iter().copied().collect();

        let groot = gnewclean(&g0m, &v).unwrap();
        let flip = 5;
        v[flip] *= -1.0;
        let g_flip = gnewclean(&g0m, &v).unwrap();
        let mut g_fast_flip = groot.clone();
        gnew(&mut g_fast_flip, 2.0 * v[flip], flip);

        assert_relative_eq!(g_fast_flip, g_flip, epsilon = 1e-8, max_relative = 1e-5);
    }
}

#[test]
fn test_gnewclean_rejects_mismatched_fields() {
    let g0m = retarded_weiss(&[-0.5; 8]);
    assert!(matches!(
        gnewclean(&g0m, &[0.1; 6]),
        Err(crate::QmcError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_setup_grids() {
    let p = params(0.0, 2.0);
    let mut rng = StdRng::seed_from_u64(p.seed);
    let setup = setup_pm_sim(&p, &mut rng).unwrap();
    assert_eq!(setup.tau.len(), p.n_tau + 1);
    assert_eq!(setup.w_n.len(), p.n_matsubara);
    assert_eq!(setup.g0t.len(), p.n_tau_mc);
    assert_eq!(setup.v.shape(), (1, p.n_tau_mc));
    assert_relative_eq!(setup.g0t[0], -0.5, epsilon = 1e-3);
}

#[test]
fn test_free_impurity_returns_weiss_field() {
    let p = HfParams {
        u_int: 0.0,
        sweeps: 30,
        therm: 10,
        ..HfParams::default()
    };
    let mut rng = StdRng::seed_from_u64(p.seed);
    let setup = setup_pm_sim(&p, &mut rng).unwrap();
    let mut v = setup.v.clone();
    let blocks = vec![setup.g0t.clone(); 2];
    let solution = imp_solver(&blocks, &mut v, &setup.intm, &p, &mut rng).unwrap();
    let g = solution.physical_g();
    for (a, b) in g.iter().zip(&setup.g0t) {
        assert_relative_eq!(*a, *b, epsilon = 1e-10);
    }
    assert_relative_eq!(g[0] + g[p.n_tau_mc], -1.0, epsilon = 1e-12);
}

#[test]
fn test_solver_rejects_wrong_blocks() {
    let p = params(0.0, 2.0);
    let mut rng = StdRng::seed_from_u64(p.seed);
    let setup = setup_pm_sim(&p, &mut rng).unwrap();
    let mut v = setup.v.clone();
    let blocks = vec![setup.g0t.clone()];
    assert!(imp_solver(&blocks, &mut v, &setup.intm, &p, &mut rng).is_err());
}

#[test]
fn test_solver() {
    for (mu, u_int, gend) in [(0.0, 2.0, GEND_HALF), (0.5, 2.3, GEND_DOPED)] {
        let p = params(mu, u_int);
        let mut rng = StdRng::seed_from_u64(p.seed);
        let setup = setup_pm_sim(&p, &mut rng).unwrap();
        let mut v = setup.v.clone();
        let blocks = vec![setup.g0t.clone(); 2];
        let solution = imp_solver(&blocks, &mut v, &setup.intm, &p, &mut rng).unwrap();
        assert!(solution.acceptance > 0.0 && solution.acceptance < 1.0);
        assert_close_to(&solution.physical_g(), &gend, 6e-3);
    }
}

#[test]
fn test_solver_global_flip() {
    let p = HfParams {
        global_flip: true,
        ..params(0.0, 2.0)
    };
    let mut rng = StdRng::seed_from_u64(p.seed);
    let setup = setup_pm_sim(&p, &mut rng).unwrap();
    let mut v = setup.v.clone();
    let blocks = vec![setup.g0t.clone(); 2];
    let solution = imp_solver(&blocks, &mut v, &setup.intm, &p, &mut rng).unwrap();
    let g = solution.physical_g();
    assert_close_to(&g, &GEND_HALF, 6e-3);
    // spin symmetry restored by the global moves
    let (up, down) = (&solution.g_tau[0], &solution.g_tau[1]);
    for (a, b) in up.iter().zip(down) {
        assert!((a - b).abs() < 3e-2);
    }
}

#[test]
fn test_dmft_loop_smoke() {
    let p = HfParams {
        beta: 8.0,
        n_tau: 256,
        n_matsubara: 32,
        n_tau_mc: 16,
        sweeps: 300,
        therm: 50,
        n_iter: 2,
        ..HfParams::default()
    };
    let mut rng = StdRng::seed_from_u64(p.seed);
    let solution = dmft_loop(&p, &mut rng).unwrap();
    assert_eq!(solution.history.len(), 2);
    assert_eq!(solution.g_tau.len(), p.n_tau_mc + 1);
    assert_eq!(solution.tau_mc.len(), p.n_tau_mc + 1);
    assert_relative_eq!(solution.tau_mc[p.n_tau_mc], p.beta, epsilon = 1e-12);
    assert_relative_eq!(solution.g_tau[0] + solution.g_tau[p.n_tau_mc], -1.0, epsilon = 1e-12);
    assert!(solution.giw[0].im < 0.0);
    assert!(solution.history.iter().all(|r| r.acceptance > 0.0 && r.acceptance < 1.0));
}
