//! Synthetic training sets. Every generator draws from the random number generator it's given,
//! so seeding that generator is enough to reproduce a dataset.

use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

use crate::{
    MlErr, Result,
    dataset::{Label, Sample},
};

/// Generates `n` samples drawn uniformly from the `[-1, 1]^d` hypercube and labeled according to
/// the side of the hyperplane through the origin they fall on.
///
/// Points closer than `margin` to the hyperplane are rejected and drawn again, which leaves a gap
/// between both classes.
///
/// # Arguments
/// * `rng` - The source of randomness.
/// * `n` - The amount of samples to generate.
/// * `normal` - A normal vector of the hyperplane, pointing towards the positive class.
/// * `margin` - The minimum distance from each sample to the hyperplane, in `[0, 1)`.
///
/// # Errors
/// `MlErr::InvalidHyperparameter` if `normal` is null or `margin` is out of range.
pub fn linearly_separable<R: Rng>(
    rng: &mut R,
    n: usize,
    normal: &[f32],
    margin: f32,
) -> Result<Vec<Sample>> {
    let norm = normal.iter().map(|v| v * v).sum::<f32>().sqrt();
    if !(norm.is_finite() && norm > 0.) {
        return Err(MlErr::InvalidHyperparameter {
            name: "normal",
            value: norm,
        });
    }

    // A unit normal has an l1 norm of at least 1, so there's always room beyond the margin.
    if !(0. ..1.).contains(&margin) {
        return Err(MlErr::InvalidHyperparameter {
            name: "margin",
            value: margin,
        });
    }

    let unit: Vec<f32> = normal.iter().map(|v| v / norm).collect();
    let uniform = Uniform::new_inclusive(-1., 1.)?;
    let mut samples = Vec::with_capacity(n);

    while samples.len() < n {
        let x: Vec<f32> = (0..unit.len()).map(|_| uniform.sample(rng)).collect();
        let distance: f32 = x.iter().zip(&unit).map(|(a, b)| a * b).sum();

        if distance.abs() <= margin {
            continue;
        }

        samples.push(Sample::new(x, Label::from(distance > 0.)));
    }

    Ok(samples)
}

/// Generates two gaussian blobs, the positive one centered at `center` and the negative one at
/// `-center`, alternating between classes.
///
/// # Arguments
/// * `rng` - The source of randomness.
/// * `n_per_class` - The amount of samples of each class.
/// * `center` - The center of the positive blob.
/// * `std_dev` - The standard deviation of the noise added to every coordinate.
///
/// # Errors
/// `MlErr::Distribution` if `std_dev` is negative or not finite.
pub fn gaussian_blobs<R: Rng>(
    rng: &mut R,
    n_per_class: usize,
    center: &[f32],
    std_dev: f32,
) -> Result<Vec<Sample>> {
    let noise = Normal::new(0., std_dev)?;
    let mut samples = Vec::with_capacity(2 * n_per_class);

    for _ in 0..n_per_class {
        for label in [Label::Positive, Label::Negative] {
            let sign: f32 = if label == Label::Positive { 1. } else { -1. };
            let x = center
                .iter()
                .map(|c| sign * c + noise.sample(rng))
                .collect();

            samples.push(Sample::new(x, label));
        }
    }

    Ok(samples)
}
