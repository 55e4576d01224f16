use crate::error::LensError;
use fftmap::Fft2;
use ndarray::Array2;
use std::f64::consts::PI;

/// Radians per arcminute.
pub(crate) const ARCMIN: f64 = PI / 180.0 / 60.0;

/// Flat-sky Fourier coordinates for an `n x n` periodic patch.
///
/// Holds the per-pixel angular wavenumber components `(ly, lx)` and the
/// magnitude `modl = sqrt(ly^2 + lx^2)`, together with the FFT plans for
/// the grid. Built once per `(n, pixel size)` pair and shared read-only by
/// every filtering, differentiation, and spectrum call on that patch.
pub struct FourierGrid {
    n: usize,
    pixel_arcmin: f64,
    /// Wavenumber component along the row (y) axis.
    pub ly: Array2<f64>,
    /// Wavenumber component along the column (x) axis.
    pub lx: Array2<f64>,
    /// Wavenumber magnitude per Fourier pixel.
    pub modl: Array2<f64>,
    pub(crate) fft: Fft2,
}

impl FourierGrid {
    /// Build the wavenumber grids for an `n x n` patch with square pixels
    /// of `pixel_arcmin` arcminutes.
    ///
    /// The index sequence follows the fftfreq convention
    /// (`0, 1, .., n/2 - 1, -n/2, .., -1` for even `n`), scaled by
    /// `2 pi / (n * pixel_size_in_radians)`.
    pub fn new(n: usize, pixel_arcmin: f64) -> Self {
        let dl = 2.0 * PI / (n as f64 * pixel_arcmin * ARCMIN);
        let split = n.div_ceil(2);
        let freq: Vec<f64> = (0..n)
            .map(|i| {
                if i < split {
                    i as f64 * dl
                } else {
                    (i as f64 - n as f64) * dl
                }
            })
            .collect();

        let ly = Array2::from_shape_fn((n, n), |(j, _)| freq[j]);
        let lx = Array2::from_shape_fn((n, n), |(_, i)| freq[i]);
        let modl = Array2::from_shape_fn((n, n), |(j, i)| freq[j].hypot(freq[i]));

        Self {
            n,
            pixel_arcmin,
            ly,
            lx,
            modl,
            fft: Fft2::new(n),
        }
    }

    /// Grid side length.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Pixel size in arcminutes.
    pub fn pixel_arcmin(&self) -> f64 {
        self.pixel_arcmin
    }

    /// Pixel size in radians.
    pub fn pixel_rad(&self) -> f64 {
        self.pixel_arcmin * ARCMIN
    }

    /// Patch area in steradians.
    pub fn patch_area(&self) -> f64 {
        (self.n as f64 * self.pixel_rad()).powi(2)
    }

    /// Spacing between adjacent Fourier modes.
    pub fn fundamental_ell(&self) -> f64 {
        2.0 * PI / (self.n as f64 * self.pixel_rad())
    }

    /// Highest wavenumber along a single axis.
    pub fn nyquist_ell(&self) -> f64 {
        PI / self.pixel_rad()
    }

    pub(crate) fn check_shape(&self, grid: &Array2<f64>) -> Result<(), LensError> {
        if grid.dim() != (self.n, self.n) {
            return Err(LensError::ShapeMismatch {
                expected: (self.n, self.n),
                found: grid.dim(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modl_is_magnitude_of_components() {
        let grid = FourierGrid::new(16, 2.0);
        for ((j, i), &m) in grid.modl.indexed_iter() {
            let expected = grid.ly[(j, i)].hypot(grid.lx[(j, i)]);
            assert!((m - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn fundamental_mode_sits_at_index_one() {
        let grid = FourierGrid::new(32, 1.5);
        let dl = grid.fundamental_ell();

        assert_eq!(grid.modl[(0, 0)], 0.0);
        assert!((grid.ly[(1, 0)] - dl).abs() < 1e-9);
        assert!((grid.lx[(0, 1)] - dl).abs() < 1e-9);
        // wrap-around half carries negative frequencies
        assert!((grid.ly[(31, 0)] + dl).abs() < 1e-9);
        assert!((grid.lx[(0, 31)] + dl).abs() < 1e-9);
    }

    #[test]
    fn nyquist_matches_pixel_size() {
        let grid = FourierGrid::new(64, 1.0);
        let expected = PI / (1.0 * ARCMIN);
        assert!((grid.nyquist_ell() - expected).abs() < 1e-6);
        // largest on-axis mode is the Nyquist frequency
        assert!((grid.ly[(32, 0)].abs() - expected).abs() < 1e-6);
    }

    #[test]
    fn shape_check_rejects_wrong_grid() {
        let grid = FourierGrid::new(8, 1.0);
        let wrong = Array2::<f64>::zeros((8, 9));
        assert_eq!(
            grid.check_shape(&wrong),
            Err(LensError::ShapeMismatch {
                expected: (8, 8),
                found: (8, 9),
            })
        );
    }
}
