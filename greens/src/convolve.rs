use num_complex::Complex64;
use rustfft::FftPlanner;

/// Linear convolution of `a` and `b` through the FFT, cropped to the
/// `a.len()` samples centred on the full result.
///
/// For two functions sampled on the same mirror symmetric grid the output
/// is aligned with that grid, which is what the second-order diagrams need.
pub fn fft_convolve_same(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return vec![0.0; a.len()];
    }
    let full = a.len() + b.len() - 1;
    let to_complex = |x: &[f64]| {
        let mut out = vec![Complex64::new(0.0, 0.0); full];
        for (slot, &v) in out.iter_mut().zip(x) {
            slot.re = v;
        }
        out
    };
    let mut fa = to_complex(a);
    let mut fb = to_complex(b);

    let mut planner = FftPlanner::new();
    let forward = planner.plan_fft_forward(full);
    forward.process(&mut fa);
    forward.process(&mut fb);
    for (x, y) in fa.iter_mut().zip(&fb) {
        *x *= *y;
    }
    planner.plan_fft_inverse(full).process(&mut fa);

    let start = (b.len() - 1) / 2;
    fa[start..start + a.len()]
        .iter()
        .map(|c| c.re / full as f64)
        .collect()
}
