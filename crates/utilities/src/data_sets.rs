use lattice_views_core::prelude::*;
use lattice_views_storage::{Array2, Array3};

use rand::{rngs::StdRng, Rng, SeedableRng};

/// An image whose sample at `(x, y)` is `x + y * width`, so every sample is distinct and easy to predict.
pub fn ramp_array2(shape: Point2i) -> Array2<f32> {
    let width = shape.x();

    Array2::fill_with(shape, |p: Point2i| (p.x() + p.y() * width) as f32)
}

/// A cube of uniform noise in `[0, 1)`, reproducible from `seed`. Roughly `nan_fraction` of the samples are NaN.
pub fn noisy_array3(shape: Point3i, seed: u64, nan_fraction: f64) -> Array3<f64> {
    let mut rng = StdRng::seed_from_u64(seed);

    Array3::fill_with(shape, |_p: Point3i| {
        if rng.gen_bool(nan_fraction) {
            f64::NAN
        } else {
            rng.gen()
        }
    })
}

/// An image of integers uniformly drawn from `[0, max)`, reproducible from `seed`.
pub fn random_array2(shape: Point2i, seed: u64, max: i32) -> Array2<i32> {
    let mut rng = StdRng::seed_from_u64(seed);

    Array2::fill_with(shape, |_p: Point2i| rng.gen_range(0..max))
}
