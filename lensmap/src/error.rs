use thiserror::Error;

/// Errors produced by the flat-sky estimator pipeline.
#[derive(Error, Debug, PartialEq)]
pub enum LensError {
    /// A map or transfer function does not match the grid it is used with.
    #[error("grid shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// Shape demanded by the grid.
        expected: (usize, usize),
        /// Shape of the offending array.
        found: (usize, usize),
    },

    /// A multipole band is inverted, or starts below ell = 1.
    #[error("invalid multipole band [{ellmin}, {ellmax})")]
    InvalidBand { ellmin: f64, ellmax: f64 },

    /// An estimator band that admits no usable temperature modes.
    #[error("no usable temperature modes in [{ellmin}, {ellmax})")]
    EmptyBand { ellmin: f64, ellmax: f64 },

    /// Non-positive binning parameters for the power spectrum estimator.
    #[error("invalid binning: delta_ell = {delta_ell}, ell_max = {ell_max}")]
    InvalidBinning { delta_ell: f64, ell_max: f64 },

    /// A theory spectrum with too few samples to interpolate.
    #[error("theory spectrum needs at least two samples, got {0}")]
    TooFewSamples(usize),

    /// Theory sample vectors of different lengths.
    #[error("theory spectrum has {ells} ell samples but {cls} power samples")]
    SampleLengthMismatch { ells: usize, cls: usize },

    /// Theory ell samples that are not strictly increasing.
    #[error("theory spectrum ell samples must be strictly increasing")]
    UnsortedSamples,
}
