//! Map comparison helpers shared by the unit and integration tests.

use crate::Map;
use ndarray::Zip;

/// Largest absolute pixel difference between two maps.
pub fn max_abs_diff(a: &Map, b: &Map) -> f64 {
    Zip::from(a).and(b).fold(0.0f64, |m, &x, &y| m.max((x - y).abs()))
}

/// Assert two maps agree pixel-wise within `epsilon`.
pub fn assert_maps_close(a: &Map, b: &Map, epsilon: f64, msg: &str) {
    let max_diff = max_abs_diff(a, b);
    assert!(
        max_diff < epsilon,
        "{}: max difference {:.3e} >= epsilon {:.3e}",
        msg,
        max_diff,
        epsilon
    );
}

/// Root-mean-square pixel value of a map.
pub fn rms(map: &Map) -> f64 {
    map.mapv(|v| v * v).mean().unwrap_or(0.0).sqrt()
}
