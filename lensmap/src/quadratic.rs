use crate::error::LensError;
use crate::filter::{filter_map, masked_reciprocal};
use crate::gradient::{divergence, gradient};
use crate::grid::FourierGrid;
use crate::theory::TheorySpectrum;
use crate::Map;
use ndarray::{Array2, Zip};

/// Lowest wavenumber admitted to the `1/L^2` flattening weight; keeps the
/// monopole out of the division.
const FLATTEN_ELLMIN: f64 = 2.0;

/// Real-space quadratic estimator for the lensing convergence.
///
/// Combines a Wiener-filtered gradient of the observed temperature map
/// with an inverse-variance filtered copy of the same map, and takes the
/// divergence of their product. The output is proportional to the input
/// convergence over the scales where the residual response is flat; the
/// per-mode normalization `A(L)` is not applied, only a constant
/// squeezed-limit response factor that puts the output on the same scale
/// as the true convergence.
#[derive(Debug)]
pub struct QuadraticEstimator {
    wiener: Array2<f64>,
    inv_var: Array2<f64>,
    flatten: Array2<f64>,
    ellmin: f64,
    ellmax: f64,
}

impl QuadraticEstimator {
    /// Build the estimator filters for a grid and a pair of theory spectra.
    ///
    /// `unlensed` is the unlensed temperature power; `total` is the full
    /// observed power on the beam-deconvolved map, i.e. lensed CMB plus
    /// noise divided by the squared beam transfer. Temperature modes
    /// outside `[ellmin, ellmax)` are discarded before the quadratic
    /// combination; `ellmin` must be at least 1 so the band never reaches
    /// the monopole.
    pub fn new(
        grid: &FourierGrid,
        unlensed: &TheorySpectrum,
        total: &TheorySpectrum,
        ellmin: f64,
        ellmax: f64,
    ) -> Result<Self, LensError> {
        if !(ellmin >= 1.0) || ellmax <= ellmin {
            return Err(LensError::InvalidBand { ellmin, ellmax });
        }

        let unlensed2d = unlensed.onto_grid(&grid.modl);
        let total2d = total.onto_grid(&grid.modl);

        let inv_var = masked_reciprocal(&total2d, &grid.modl, ellmin, ellmax);
        let wiener = Zip::from(&unlensed2d)
            .and(&inv_var)
            .map_collect(|&u, &iv| u * iv);

        // Squeezed-limit gradient response over the admitted band; the sum
        // over Fourier pixels divided by the patch area is the band
        // integral of C_unl^2 / C_tot^2.
        let mut band_integral = 0.0;
        Zip::from(&unlensed2d)
            .and(&wiener)
            .and(&inv_var)
            .for_each(|&u, &w, &iv| band_integral += u * w * iv);
        let response = 2.0 * band_integral / grid.patch_area();
        if !(response > 0.0) {
            return Err(LensError::EmptyBand { ellmin, ellmax });
        }
        log::debug!("estimator band [{ellmin}, {ellmax}), response constant {response:.4e}");

        let l2 = grid.modl.mapv(|l| l * l);
        let mut flatten = masked_reciprocal(&l2, &grid.modl, FLATTEN_ELLMIN, f64::INFINITY);
        flatten.mapv_inplace(|v| v / response);

        Ok(Self {
            wiener,
            inv_var,
            flatten,
            ellmin,
            ellmax,
        })
    }

    /// Temperature band the estimator trusts.
    pub fn band(&self) -> (f64, f64) {
        (self.ellmin, self.ellmax)
    }

    /// Reconstruct a convergence map from a beam-deconvolved temperature
    /// map.
    ///
    /// Steps: spatial gradient of the map, Wiener filter on each gradient
    /// component, inverse-variance filter on the map itself, divergence of
    /// the pointwise product, negation, and the flattening `1/L^2` weight.
    pub fn reconstruct(&self, grid: &FourierGrid, tmap: &Map) -> Result<Map, LensError> {
        grid.check_shape(tmap)?;

        let (grad_y, grad_x) = gradient(grid, tmap)?;
        let wiener_y = filter_map(grid, &grad_y, &self.wiener)?;
        let wiener_x = filter_map(grid, &grad_x, &self.wiener)?;
        let t_iv = filter_map(grid, tmap, &self.inv_var)?;

        let product_y = &wiener_y * &t_iv;
        let product_x = &wiener_x * &t_iv;
        let raw = divergence(grid, &product_y, &product_x)?;

        filter_map(grid, &raw.mapv(|v| -v), &self.flatten)
    }
}
