use crate::error::LensError;
use crate::grid::FourierGrid;
use crate::Map;
use ndarray::{Array2, Zip};

/// Apply a real-valued Fourier-space transfer function to a map.
///
/// The map is forward transformed, multiplied pixel-wise by `transfer`,
/// inverse transformed, and the real part is returned. An all-ones
/// transfer returns the map unchanged up to transform precision, and the
/// operation is linear in `map` for a fixed transfer.
pub fn filter_map(grid: &FourierGrid, map: &Map, transfer: &Array2<f64>) -> Result<Map, LensError> {
    grid.check_shape(map)?;
    grid.check_shape(transfer)?;

    let mut fmap = grid.fft.forward_real(map);
    Zip::from(&mut fmap).and(transfer).for_each(|f, &t| *f *= t);
    Ok(grid.fft.inverse_real(fmap))
}

/// Zero every pixel of `values` whose wavenumber lies outside the
/// half-open band `[ellmin, ellmax)`.
///
/// Pass `f64::INFINITY` as `ellmax` for a one-sided band. With
/// `ellmin = 0` no pixel is removed, since `modl >= 0` everywhere.
pub fn kmask(values: &Array2<f64>, modl: &Array2<f64>, ellmin: f64, ellmax: f64) -> Array2<f64> {
    Zip::from(values)
        .and(modl)
        .map_collect(|&v, &l| if l >= ellmin && l < ellmax { v } else { 0.0 })
}

/// Band-limited reciprocal: `1 / denom` inside `[ellmin, ellmax)` where
/// `denom` is nonzero, zero everywhere else.
///
/// The division only happens on in-band pixels, so zeros of `denom` at
/// excluded wavenumbers (the monopole in particular) never reach a divide.
pub fn masked_reciprocal(
    denom: &Array2<f64>,
    modl: &Array2<f64>,
    ellmin: f64,
    ellmax: f64,
) -> Array2<f64> {
    Zip::from(denom).and(modl).map_collect(|&d, &l| {
        if l >= ellmin && l < ellmax && d != 0.0 {
            1.0 / d
        } else {
            0.0
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_maps_close;

    fn wavy_map(n: usize) -> Map {
        Array2::from_shape_fn((n, n), |(j, i)| {
            (j as f64 * 0.37).sin() + (i as f64 * 0.91).cos() + 0.1 * (j * i) as f64 / (n * n) as f64
        })
    }

    #[test]
    fn identity_filter_round_trips() {
        let grid = FourierGrid::new(64, 1.5);
        let map = wavy_map(64);
        let ones = Array2::from_elem((64, 64), 1.0);

        let filtered = filter_map(&grid, &map, &ones).expect("shapes match");

        assert_maps_close(&map, &filtered, 1e-10, "identity filter");
    }

    #[test]
    fn filtering_is_linear() {
        let grid = FourierGrid::new(32, 2.0);
        let m1 = wavy_map(32);
        let m2 = m1.mapv(|v| v * v - 0.3);
        let transfer = grid.modl.mapv(|l| (-l / 5000.0).exp());

        let combined = filter_map(&grid, &(&m1 * 2.0 + &m2 * -0.5), &transfer).unwrap();
        let separate =
            filter_map(&grid, &m1, &transfer).unwrap() * 2.0 + filter_map(&grid, &m2, &transfer).unwrap() * -0.5;

        assert_maps_close(&combined, &separate, 1e-10, "linearity");
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let grid = FourierGrid::new(16, 1.0);
        let map = Array2::zeros((16, 16));
        let bad_transfer = Array2::zeros((8, 8));

        assert_eq!(
            filter_map(&grid, &map, &bad_transfer).unwrap_err(),
            LensError::ShapeMismatch {
                expected: (16, 16),
                found: (8, 8),
            }
        );
    }

    #[test]
    fn kmask_zeroes_exactly_the_excluded_band() {
        let grid = FourierGrid::new(32, 1.5);
        let values = Array2::from_elem((32, 32), 2.5);
        let (ellmin, ellmax) = (500.0, 4000.0);

        let masked = kmask(&values, &grid.modl, ellmin, ellmax);

        for ((j, i), &v) in masked.indexed_iter() {
            let l = grid.modl[(j, i)];
            if l >= ellmin && l < ellmax {
                assert_eq!(v, 2.5);
            } else {
                assert_eq!(v, 0.0);
            }
        }
    }

    #[test]
    fn kmask_with_zero_lower_edge_keeps_every_pixel() {
        // modl >= 0 always, so [0, inf) excludes nothing, monopole included
        let grid = FourierGrid::new(16, 1.0);
        let values = Array2::from_elem((16, 16), 1.0);

        let masked = kmask(&values, &grid.modl, 0.0, f64::INFINITY);

        assert!(masked.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn masked_reciprocal_never_divides_excluded_zeros() {
        let grid = FourierGrid::new(16, 1.0);
        let l2 = grid.modl.mapv(|l| l * l);

        let weight = masked_reciprocal(&l2, &grid.modl, 2.0, f64::INFINITY);

        assert_eq!(weight[(0, 0)], 0.0);
        assert!(weight.iter().all(|v| v.is_finite()));
        let dl = grid.fundamental_ell();
        assert!((weight[(1, 0)] - 1.0 / (dl * dl)).abs() < 1e-15);
    }
}
