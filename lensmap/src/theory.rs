use crate::error::LensError;
use ndarray::Array2;

/// An isotropic 1D power spectrum sampled on an increasing ell sequence.
///
/// Gaps between samples are filled by linear interpolation; multipoles
/// outside the sampled range evaluate to zero, so a spectrum tabulated on
/// `[ell_min, ell_max]` is implicitly band-limited to that range.
#[derive(Debug, Clone)]
pub struct TheorySpectrum {
    ells: Vec<f64>,
    cls: Vec<f64>,
}

impl TheorySpectrum {
    /// Wrap tabulated `(ell, C_ell)` samples.
    ///
    /// The ell sequence must be strictly increasing and at least two
    /// samples long; this is the boundary through which externally loaded
    /// theory curves (e.g. CAMB output parsed elsewhere) enter the crate.
    pub fn from_samples(ells: Vec<f64>, cls: Vec<f64>) -> Result<Self, LensError> {
        if ells.len() != cls.len() {
            return Err(LensError::SampleLengthMismatch {
                ells: ells.len(),
                cls: cls.len(),
            });
        }
        if ells.len() < 2 {
            return Err(LensError::TooFewSamples(ells.len()));
        }
        if !ells.windows(2).all(|w| w[0] < w[1]) {
            return Err(LensError::UnsortedSamples);
        }
        Ok(Self { ells, cls })
    }

    /// The tabulated `(ell, C_ell)` samples.
    pub fn samples(&self) -> (&[f64], &[f64]) {
        (&self.ells, &self.cls)
    }

    /// Evaluate the spectrum at a single multipole.
    pub fn at(&self, ell: f64) -> f64 {
        let last = self.ells.len() - 1;
        if ell < self.ells[0] || ell > self.ells[last] {
            return 0.0;
        }
        let hi = self.ells.partition_point(|&e| e < ell);
        if hi == 0 {
            return self.cls[0];
        }
        let lo = hi - 1;
        let t = (ell - self.ells[lo]) / (self.ells[hi] - self.ells[lo]);
        self.cls[lo] + t * (self.cls[hi] - self.cls[lo])
    }

    /// Interpolate the spectrum onto a 2D wavenumber grid.
    pub fn onto_grid(&self, modl: &Array2<f64>) -> Array2<f64> {
        modl.mapv(|l| self.at(l))
    }
}
