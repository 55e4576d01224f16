use crate::error::LensError;
use crate::grid::FourierGrid;
use crate::Map;
use ndarray::Zip;
use num_complex::Complex64;

/// Spatial gradient of a map by spectral differentiation.
///
/// Multiplies the transform by `i*ly` and `i*lx` and returns the real
/// parts `(grad_y, grad_x)`. Exact for the band-limited periodic field,
/// unlike a finite-difference stencil, which matters at high wavenumber.
pub fn gradient(grid: &FourierGrid, map: &Map) -> Result<(Map, Map), LensError> {
    grid.check_shape(map)?;

    let fmap = grid.fft.forward_real(map);
    let mut fy = fmap.clone();
    Zip::from(&mut fy)
        .and(&grid.ly)
        .for_each(|f, &l| *f *= Complex64::new(0.0, l));
    let mut fx = fmap;
    Zip::from(&mut fx)
        .and(&grid.lx)
        .for_each(|f, &l| *f *= Complex64::new(0.0, l));

    Ok((grid.fft.inverse_real(fy), grid.fft.inverse_real(fx)))
}

/// Divergence of a two-component vector field.
///
/// Each component is differentiated spectrally along its own axis and the
/// two derivatives are summed in Fourier space, so this is the adjoint of
/// [`gradient`] under the same convention.
pub fn divergence(grid: &FourierGrid, field_y: &Map, field_x: &Map) -> Result<Map, LensError> {
    grid.check_shape(field_y)?;
    grid.check_shape(field_x)?;

    let mut fy = grid.fft.forward_real(field_y);
    let fx = grid.fft.forward_real(field_x);
    Zip::from(&mut fy)
        .and(&fx)
        .and(&grid.ly)
        .and(&grid.lx)
        .for_each(|a, &b, &ly, &lx| {
            *a = *a * Complex64::new(0.0, ly) + b * Complex64::new(0.0, lx);
        });

    Ok(grid.fft.inverse_real(fy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::filter_map;
    use crate::test_utils::assert_maps_close;
    use ndarray::Array2;
    use std::f64::consts::PI;

    #[test]
    fn gradient_of_plane_wave_is_analytic() {
        let n = 64;
        let grid = FourierGrid::new(n, 1.0);
        let pixel = grid.pixel_rad();
        // single harmonic along y: three full periods across the patch
        let k = 3.0 * grid.fundamental_ell();
        let map = Array2::from_shape_fn((n, n), |(j, _)| (k * j as f64 * pixel).sin());

        let (gy, gx) = gradient(&grid, &map).expect("shapes match");

        let expected = Array2::from_shape_fn((n, n), |(j, _)| k * (k * j as f64 * pixel).cos());
        assert_maps_close(&gy, &expected, 1e-6 * k, "d/dy of sin");
        let max_gx = gx.iter().fold(0.0f64, |m, &v| m.max(v.abs()));
        assert!(max_gx < 1e-6 * k, "gradient leaked across axes: {:.3e}", max_gx);
    }

    #[test]
    fn gradient_is_linear() {
        let n = 32;
        let grid = FourierGrid::new(n, 2.0);
        let m1 = Array2::from_shape_fn((n, n), |(j, i)| (j as f64 * 0.41).sin() * (i as f64 * 0.23).cos());
        let m2 = Array2::from_shape_fn((n, n), |(j, i)| ((j + 2 * i) as f64 * 0.17).cos());

        let (cy, cx) = gradient(&grid, &(&m1 * 1.5 + &m2 * -2.0)).unwrap();
        let (y1, x1) = gradient(&grid, &m1).unwrap();
        let (y2, x2) = gradient(&grid, &m2).unwrap();

        assert_maps_close(&cy, &(&y1 * 1.5 + &y2 * -2.0), 1e-8, "grad_y linearity");
        assert_maps_close(&cx, &(&x1 * 1.5 + &x2 * -2.0), 1e-8, "grad_x linearity");
    }

    #[test]
    fn divergence_of_gradient_is_the_laplacian() {
        let n = 64;
        let grid = FourierGrid::new(n, 1.5);
        // zero-mean multi-harmonic field
        let pixel = grid.pixel_rad();
        let map = Array2::from_shape_fn((n, n), |(j, i)| {
            let (y, x) = (j as f64 * pixel, i as f64 * pixel);
            (2.0 * PI * 3.0 * y / (n as f64 * pixel)).sin()
                + (2.0 * PI * 5.0 * x / (n as f64 * pixel)).cos()
        });

        let (gy, gx) = gradient(&grid, &map).unwrap();
        let div = divergence(&grid, &gy, &gx).unwrap();

        let neg_l2 = grid.modl.mapv(|l| -l * l);
        let laplacian = filter_map(&grid, &map, &neg_l2).unwrap();
        let scale = laplacian.iter().fold(0.0f64, |m, &v| m.max(v.abs()));
        assert_maps_close(&div, &laplacian, 1e-9 * scale, "div(grad) vs -l^2");
    }

    #[test]
    fn divergence_checks_both_components() {
        let grid = FourierGrid::new(16, 1.0);
        let ok = Array2::zeros((16, 16));
        let bad = Array2::zeros((16, 15));
        assert!(matches!(
            divergence(&grid, &ok, &bad).unwrap_err(),
            LensError::ShapeMismatch { .. }
        ));
    }
}
