//! Sweeps the map noise level and reports how the reconstruction
//! correlation against the input convergence degrades.

use lensmap::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    let n = 256;
    let pixel_arcmin = 3.0;
    let beam_fwhm = 1.0;
    let (ellmin, ellmax) = (100.0, 2200.0);
    let noise_levels = [1.0, 5.0, 20.0];

    let grid = FourierGrid::new(n, pixel_arcmin);
    let cmb = fiducial_temperature_spectrum();
    let ckk = fiducial_convergence_spectrum();

    // one fixed sky, re-observed at each noise level
    let mut rng = StdRng::seed_from_u64(2);
    let kappa_input = make_map(&grid, &ckk, &mut rng);
    let t_unlensed = make_map(&grid, &cmb, &mut rng);
    let t_lensed = lens_map(&grid, &t_unlensed, &kappa_input).expect("grids match");
    let beam = gaussian_beam(&grid, beam_fwhm);

    println!("Reconstruction correlation vs noise ({n} x {n} at {pixel_arcmin} arcmin)");
    println!();
    println!("{:>12}  {:>10}  {:>10}", "noise", "band rho", "band ratio");

    for &noise in &noise_levels {
        let observed =
            observe(&grid, &t_lensed, beam_fwhm, noise, &mut rng).expect("grids match");
        let t_deconvolved = deconvolve_beam(&grid, &observed, &beam).expect("grids match");
        let total = total_observed_power(&cmb, noise, beam_fwhm).expect("valid spectrum");
        let estimator = QuadraticEstimator::new(&grid, &cmb, &total, ellmin, ellmax)
            .expect("valid band");
        let kappa_recon = estimator
            .reconstruct(&grid, &t_deconvolved)
            .expect("grids match");

        let cross = cross_spectrum(&grid, &kappa_input, &kappa_recon, 45.0, 225.0)
            .expect("valid binning");
        let auto_i = cross_spectrum(&grid, &kappa_input, &kappa_input, 45.0, 225.0)
            .expect("valid binning");
        let auto_r = cross_spectrum(&grid, &kappa_recon, &kappa_recon, 45.0, 225.0)
            .expect("valid binning");

        // mode-weighted band averages
        let mut sums = (0.0, 0.0, 0.0);
        let mut modes = 0usize;
        for i in 0..cross.ell.len() {
            if cross.n_modes[i] == 0 {
                continue;
            }
            let w = cross.n_modes[i] as f64;
            sums.0 += cross.cl[i] * w;
            sums.1 += auto_i.cl[i] * w;
            sums.2 += auto_r.cl[i] * w;
            modes += cross.n_modes[i];
        }
        let rho = sums.0 / (sums.1 * sums.2).sqrt();
        let ratio = sums.0 / sums.1;
        println!(
            "{:>9.1} uK'  {:>10.3}  {:>10.3}   ({modes} modes)",
            noise, rho, ratio
        );
    }
}
