//! LensMap - flat-sky CMB lensing reconstruction
//!
//! Estimates a gravitational-lensing convergence map from a noisy,
//! beam-smoothed CMB temperature map with a real-space quadratic
//! estimator built out of Fourier-domain filters, and validates
//! reconstructions with a binned cross power spectrum.
//!
//! Everything operates on square periodic patches: a [`FourierGrid`] is
//! built once per `(size, pixel)` pair and shared read-only by the
//! filtering, differentiation, estimation, and spectrum routines. Maps
//! are plain `ndarray` grids and every operation is a pure function
//! returning a new map.

pub mod error;
pub mod filter;
pub mod gradient;
pub mod grid;
pub mod quadratic;
pub mod sim;
pub mod spectrum;
pub mod test_utils;
pub mod theory;

/// A real-valued scalar field sampled on the periodic patch.
pub type Map = ndarray::Array2<f64>;

pub use error::LensError;
pub use filter::{filter_map, kmask, masked_reciprocal};
pub use gradient::{divergence, gradient};
pub use grid::FourierGrid;
pub use quadratic::QuadraticEstimator;
pub use sim::{
    deconvolve_beam, fiducial_convergence_spectrum, fiducial_temperature_spectrum, gaussian_beam,
    gaussian_beam_ell, lens_map, make_map, noise_map, observe, total_observed_power,
    white_noise_power,
};
pub use spectrum::{cross_spectrum, BinnedSpectrum};
pub use theory::TheorySpectrum;
