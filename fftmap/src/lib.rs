//! Batched 2D FFT engine for square `ndarray` grids.
//!
//! Builds the full 2D transform out of `rustfft` row transforms: every row
//! is transformed in parallel with rayon, the grid is transposed, and the
//! row pass runs again. Plans are created once per grid size and reused for
//! every call, with per-thread scratch buffers so repeated transforms do
//! not allocate.

use ndarray::Array2;
use num_complex::Complex64;
use rayon::prelude::*;
use rustfft::num_traits::Zero;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Forward and inverse 2D FFT plans for an `n x n` grid.
pub struct Fft2 {
    n: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl Fft2 {
    /// Plan forward and inverse transforms for an `n x n` grid.
    pub fn new(n: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(n);
        let inverse = planner.plan_fft_inverse(n);
        Self {
            n,
            forward,
            inverse,
        }
    }

    /// Grid side length the plans were built for.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Forward 2D transform of a real-valued grid.
    pub fn forward_real(&self, map: &Array2<f64>) -> Array2<Complex64> {
        self.forward(map.mapv(|v| Complex64::new(v, 0.0)))
    }

    /// Forward 2D transform. Unnormalized, matching the 1D convention.
    pub fn forward(&self, grid: Array2<Complex64>) -> Array2<Complex64> {
        let plan = Arc::clone(&self.forward);
        self.transform_2d(grid, &plan)
    }

    /// Inverse 2D transform, scaled by `1 / n^2` so that
    /// `inverse(forward(x)) == x` up to floating-point precision.
    pub fn inverse(&self, grid: Array2<Complex64>) -> Array2<Complex64> {
        let plan = Arc::clone(&self.inverse);
        let mut out = self.transform_2d(grid, &plan);
        let scale = 1.0 / (self.n * self.n) as f64;
        out.mapv_inplace(|v| v * scale);
        out
    }

    /// Inverse 2D transform returning the real part only.
    pub fn inverse_real(&self, grid: Array2<Complex64>) -> Array2<f64> {
        self.inverse(grid).mapv(|v| v.re)
    }

    fn transform_2d(
        &self,
        grid: Array2<Complex64>,
        plan: &Arc<dyn Fft<f64>>,
    ) -> Array2<Complex64> {
        let pass = self.transform_rows(grid, plan);
        let pass = pass.reversed_axes().as_standard_layout().into_owned();
        let pass = self.transform_rows(pass, plan);
        pass.reversed_axes().as_standard_layout().into_owned()
    }

    fn transform_rows(
        &self,
        mut grid: Array2<Complex64>,
        plan: &Arc<dyn Fft<f64>>,
    ) -> Array2<Complex64> {
        assert_eq!(
            grid.dim(),
            (self.n, self.n),
            "grid does not match the planned transform size"
        );

        // Ensure contiguous memory layout
        if !grid.is_standard_layout() {
            grid = grid.as_standard_layout().into_owned();
        }

        let scratch_len = plan.get_inplace_scratch_len();
        let slice = grid.as_slice_mut().expect("FFT input must be contiguous");

        slice.par_chunks_mut(self.n).for_each_init(
            || vec![Complex64::zero(); scratch_len],
            |scratch, row| plan.process_with_scratch(row, scratch),
        );

        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid(n: usize) -> Array2<Complex64> {
        Array2::from_shape_fn((n, n), |(j, i)| {
            Complex64::new((j as f64 * 0.7).sin() + i as f64 * 0.01, (i as f64 * 1.3).cos())
        })
    }

    #[test]
    fn round_trip_recovers_input() {
        let n = 64;
        let fft = Fft2::new(n);
        let grid = sample_grid(n);

        let recovered = fft.inverse(fft.forward(grid.clone()));

        let max_diff = grid
            .iter()
            .zip(recovered.iter())
            .map(|(a, b)| (a - b).norm())
            .fold(0.0f64, f64::max);
        assert!(max_diff < 1e-10, "round trip drifted by {:.3e}", max_diff);
    }

    #[test]
    fn impulse_transforms_to_flat_spectrum() {
        let n = 32;
        let fft = Fft2::new(n);
        let mut grid = Array2::from_elem((n, n), Complex64::zero());
        grid[(0, 0)] = Complex64::new(1.0, 0.0);

        let spectrum = fft.forward(grid);

        for v in spectrum.iter() {
            assert!((v - Complex64::new(1.0, 0.0)).norm() < 1e-12);
        }
    }

    #[test]
    fn parseval_holds() {
        let n = 48;
        let fft = Fft2::new(n);
        let grid = sample_grid(n);

        let real_power: f64 = grid.iter().map(|v| v.norm_sqr()).sum();
        let spectrum = fft.forward(grid);
        let fourier_power: f64 =
            spectrum.iter().map(|v| v.norm_sqr()).sum::<f64>() / (n * n) as f64;

        assert!(
            (real_power - fourier_power).abs() < 1e-8 * real_power,
            "Parseval mismatch: {} vs {}",
            real_power,
            fourier_power
        );
    }
}
