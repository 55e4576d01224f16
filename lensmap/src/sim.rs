//! Simulation support: Gaussian random fields, instrument response, and a
//! first-order lensing operation used to exercise the estimator.
//!
//! Everything takes an explicit RNG so realizations are reproducible from
//! a seed and independent across seeds; no ambient random state.

use crate::error::LensError;
use crate::filter::{filter_map, masked_reciprocal};
use crate::gradient::gradient;
use crate::grid::{FourierGrid, ARCMIN};
use crate::theory::TheorySpectrum;
use crate::Map;
use ndarray::{Array2, Zip};
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::PI;

/// Smallest beam transfer value kept when dividing a beam out; modes where
/// the beam has fallen below this are discarded rather than divided.
const BEAM_FLOOR: f64 = 1e-6;

/// Draw a Gaussian random field whose isotropic power matches `spectrum`.
///
/// A unit-variance white map is transformed, shaped per Fourier pixel by
/// `sqrt(C_ell) / pixel_rad`, and transformed back; the scaling is chosen
/// so that [`cross_spectrum`](crate::spectrum::cross_spectrum) of the
/// realization with itself averages to `C_ell`. Distinct seeds give
/// statistically independent realizations.
pub fn make_map(grid: &FourierGrid, spectrum: &TheorySpectrum, rng: &mut impl Rng) -> Map {
    let n = grid.size();
    let white = Array2::from_shape_fn((n, n), |_| rng.sample::<f64, _>(StandardNormal));

    let mut fmap = grid.fft.forward_real(&white);
    let amplitude = spectrum
        .onto_grid(&grid.modl)
        .mapv(|c| c.max(0.0).sqrt() / grid.pixel_rad());
    Zip::from(&mut fmap).and(&amplitude).for_each(|f, &a| *f *= a);

    grid.fft.inverse_real(fmap)
}

/// Gaussian beam transfer at a single multipole, `exp(-l(l+1) sigma^2 / 2)`
/// with `sigma = FWHM / sqrt(8 ln 2)`.
pub fn gaussian_beam_ell(ell: f64, fwhm_arcmin: f64) -> f64 {
    let sigma = fwhm_arcmin * ARCMIN / (8.0 * 2.0f64.ln()).sqrt();
    (-ell * (ell + 1.0) * sigma * sigma / 2.0).exp()
}

/// Gaussian beam transfer function evaluated on the Fourier grid.
pub fn gaussian_beam(grid: &FourierGrid, fwhm_arcmin: f64) -> Array2<f64> {
    grid.modl.mapv(|l| gaussian_beam_ell(l, fwhm_arcmin))
}

/// Flat (white) noise power for a map-noise level in uK-arcmin.
pub fn white_noise_power(noise_uk_arcmin: f64) -> f64 {
    (noise_uk_arcmin * ARCMIN).powi(2)
}

/// White noise realization at the given uK-arcmin level.
pub fn noise_map(grid: &FourierGrid, noise_uk_arcmin: f64, rng: &mut impl Rng) -> Map {
    let sigma_pixel = noise_uk_arcmin * ARCMIN / grid.pixel_rad();
    let n = grid.size();
    Array2::from_shape_fn((n, n), |_| sigma_pixel * rng.sample::<f64, _>(StandardNormal))
}

/// Instrument side of the simulation: beam smoothing plus white noise.
pub fn observe(
    grid: &FourierGrid,
    map: &Map,
    fwhm_arcmin: f64,
    noise_uk_arcmin: f64,
    rng: &mut impl Rng,
) -> Result<Map, LensError> {
    let beam = gaussian_beam(grid, fwhm_arcmin);
    let smoothed = filter_map(grid, map, &beam)?;
    Ok(smoothed + noise_map(grid, noise_uk_arcmin, rng))
}

/// Divide a beam back out of an observed map.
///
/// Modes where the beam transfer has dropped below an explicit floor are
/// zeroed instead of divided, so the far damping tail is discarded rather
/// than amplified into garbage.
pub fn deconvolve_beam(grid: &FourierGrid, map: &Map, beam: &Array2<f64>) -> Result<Map, LensError> {
    let inverse = beam.mapv(|b| if b > BEAM_FLOOR { 1.0 / b } else { 0.0 });
    filter_map(grid, map, &inverse)
}

/// Total observed temperature power on the beam-deconvolved map: lensed
/// CMB plus white noise divided by the squared beam transfer, with the
/// beam clamped at the same floor [`deconvolve_beam`] applies.
pub fn total_observed_power(
    lensed: &TheorySpectrum,
    noise_uk_arcmin: f64,
    fwhm_arcmin: f64,
) -> Result<TheorySpectrum, LensError> {
    let (ells, cls) = lensed.samples();
    let noise = white_noise_power(noise_uk_arcmin);
    let total = ells
        .iter()
        .zip(cls)
        .map(|(&l, &c)| {
            let b2 = gaussian_beam_ell(l, fwhm_arcmin)
                .powi(2)
                .max(BEAM_FLOOR * BEAM_FLOOR);
            c + noise / b2
        })
        .collect();
    TheorySpectrum::from_samples(ells.to_vec(), total)
}

/// Deflect a map to first order: `T + grad(phi) . grad(T)`, with the
/// lensing potential recovered from the convergence through
/// `phi(l) = 2 kappa(l) / l^2`.
///
/// Small-deflection stand-in for sub-pixel remapping; it is built entirely
/// from the spectral operators the estimator itself uses.
pub fn lens_map(grid: &FourierGrid, map: &Map, kappa: &Map) -> Result<Map, LensError> {
    let l2 = grid.modl.mapv(|l| l * l);
    let mut phi_weight = masked_reciprocal(&l2, &grid.modl, 2.0, f64::INFINITY);
    phi_weight.mapv_inplace(|v| 2.0 * v);

    let phi = filter_map(grid, kappa, &phi_weight)?;
    let (phi_y, phi_x) = gradient(grid, &phi)?;
    let (map_y, map_x) = gradient(grid, map)?;

    let mut lensed = map.clone();
    Zip::from(&mut lensed)
        .and(&phi_y)
        .and(&map_y)
        .and(&phi_x)
        .and(&map_x)
        .for_each(|t, &py, &ty, &px, &tx| *t += py * ty + px * tx);
    Ok(lensed)
}

/// Damped acoustic-style temperature spectrum used by the demos and the
/// end-to-end tests: `D_l = A exp(-(l / l_damp)^2)` in uK^2, tabulated on
/// `2 <= ell <= 4000`.
pub fn fiducial_temperature_spectrum() -> TheorySpectrum {
    const AMP_UK2: f64 = 5000.0;
    const L_DAMP: f64 = 1300.0;
    let ells: Vec<f64> = (2..=4000).map(|l| l as f64).collect();
    let cls = ells
        .iter()
        .map(|&l| {
            let dl = AMP_UK2 * (-(l / L_DAMP).powi(2)).exp();
            2.0 * PI * dl / (l * (l + 1.0))
        })
        .collect();
    TheorySpectrum::from_samples(ells, cls).expect("static samples are valid")
}

/// Fiducial convergence spectrum: flat low-L power with a Gaussian cutoff,
/// tuned to an rms convergence of about 0.02.
pub fn fiducial_convergence_spectrum() -> TheorySpectrum {
    const AMP: f64 = 6.0e-8;
    const L_CUT: f64 = 300.0;
    let ells: Vec<f64> = (2..=2000).map(|l| l as f64).collect();
    let cls = ells
        .iter()
        .map(|&l| AMP * (-(l / L_CUT).powi(2)).exp())
        .collect();
    TheorySpectrum::from_samples(ells, cls).expect("static samples are valid")
}
