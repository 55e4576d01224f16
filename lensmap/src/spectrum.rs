use crate::error::LensError;
use crate::grid::FourierGrid;
use crate::Map;
use ndarray::Zip;

/// Azimuthally binned band powers over `[0, ell_max)`.
#[derive(Debug, Clone)]
pub struct BinnedSpectrum {
    /// Bin centers `(i + 0.5) * delta_ell`.
    pub ell: Vec<f64>,
    /// Band power per bin; NaN when the bin contained no Fourier pixels.
    pub cl: Vec<f64>,
    /// Number of Fourier pixels averaged into each bin.
    pub n_modes: Vec<usize>,
}

impl BinnedSpectrum {
    /// Bins that actually contained Fourier pixels.
    ///
    /// Narrow bins below the mode spacing of the patch come back empty
    /// (NaN power); this is the guard callers mixing bin widths and patch
    /// sizes should use instead of consuming `cl` blindly.
    pub fn populated(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.ell
            .iter()
            .zip(&self.cl)
            .zip(&self.n_modes)
            .filter(|&(_, &n)| n > 0)
            .map(|((&e, &c), _)| (e, c))
    }
}

/// Binned isotropic cross power of two maps on the same grid.
///
/// Forward transforms both maps, forms `Re(conj(F1) * F2)` pixel-wise, and
/// averages it in annular bins of `modl` with width `delta_ell`. The
/// pixel-area scaling puts the output in continuum spectrum units: a
/// Gaussian field synthesized from `C_ell` averages back to `C_ell`.
///
/// Symmetric in the two maps; with `map1 == map2` every populated bin is a
/// non-negative auto power.
pub fn cross_spectrum(
    grid: &FourierGrid,
    map1: &Map,
    map2: &Map,
    delta_ell: f64,
    ell_max: f64,
) -> Result<BinnedSpectrum, LensError> {
    grid.check_shape(map1)?;
    grid.check_shape(map2)?;
    if !(delta_ell > 0.0) || !(ell_max > 0.0) {
        return Err(LensError::InvalidBinning { delta_ell, ell_max });
    }

    let f1 = grid.fft.forward_real(map1);
    let f2 = grid.fft.forward_real(map2);
    let n = grid.size() as f64;
    let norm = grid.pixel_rad().powi(2) / (n * n);

    let n_bins = (ell_max / delta_ell).floor() as usize;
    let mut sum = vec![0.0f64; n_bins];
    let mut n_modes = vec![0usize; n_bins];

    Zip::from(&f1).and(&f2).and(&grid.modl).for_each(|a, b, &l| {
        if l < ell_max {
            let bin = (l / delta_ell) as usize;
            if bin < n_bins {
                sum[bin] += (a.conj() * b).re;
                n_modes[bin] += 1;
            }
        }
    });

    let ell = (0..n_bins).map(|i| (i as f64 + 0.5) * delta_ell).collect();
    let cl = sum
        .iter()
        .zip(&n_modes)
        .map(|(&s, &c)| if c == 0 { f64::NAN } else { norm * s / c as f64 })
        .collect();

    Ok(BinnedSpectrum { ell, cl, n_modes })
}
