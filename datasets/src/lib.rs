//! `svr-product-datasets` provides the small literal datasets used to teach a support vector
//! regressor the product `x1 * x2`.
//!
//! ## The Big Picture
//!
//! All records have two features, `x1` and `x2`, and the target is their product. The training
//! sets only contain integer features in the range `[0, 10]`, which makes it easy to show how a
//! kernel model behaves inside and outside of the region it has seen.
//!
//! ## Current State
//!
//! Currently the following data is provided:
//!
//! * [`products`]: the canonical training set with ten examples
//! * [`products_with_duplicate`]: the same set with the `(5, 9)` example repeated once
//! * [`in_sample`], [`near_range`], [`out_of_range`]: prediction batches
//!
//! ## Using a dataset
//!
//! ```
//! use linfa::prelude::*;
//!
//! let dataset = svr_product_datasets::products();
//! assert_eq!(dataset.nsamples(), 10);
//! assert_eq!(dataset.nfeatures(), 2);
//! ```

use linfa::Dataset;
use ndarray::prelude::*;

/// Names of the two input features
pub const FEATURE_NAMES: [&str; 2] = ["x1", "x2"];

/// Build a dataset whose targets are the products of the two features of every record
pub fn product_dataset(pairs: &[[f64; 2]]) -> Dataset<f64, f64, Ix1> {
    let records = arr2(pairs);
    let targets = records.map_axis(Axis(1), |row| row[0] * row[1]);

    Dataset::new(records, targets).with_feature_names(FEATURE_NAMES.to_vec())
}

/// The canonical training set, ten integer pairs in `[0, 10]`
pub fn products() -> Dataset<f64, f64, Ix1> {
    product_dataset(&[
        [0., 0.],
        [1., 1.],
        [2., 3.],
        [4., 4.],
        [5., 9.],
        [6., 2.],
        [7., 7.],
        [8., 10.],
        [9., 5.],
        [10., 10.],
    ])
}

/// The canonical training set with the `(5, 9)` example appearing twice
pub fn products_with_duplicate() -> Dataset<f64, f64, Ix1> {
    product_dataset(&[
        [0., 0.],
        [1., 1.],
        [2., 3.],
        [4., 4.],
        [5., 9.],
        [5., 9.],
        [6., 2.],
        [7., 7.],
        [8., 10.],
        [9., 5.],
        [10., 10.],
    ])
}

/// Records taken from the training set
pub fn in_sample() -> Array2<f64> {
    array![[2., 3.], [5., 9.], [6., 2.], [10., 10.], [8., 10.]]
}

/// Records not part of the training set, but inside of `[0, 10]`
pub fn near_range() -> Array2<f64> {
    array![[3., 3.], [5., 5.], [7., 4.], [2., 8.]]
}

/// Records outside of the range the training set covers
pub fn out_of_range() -> Array2<f64> {
    array![[100., 100.], [-3., 7.], [15., 12.]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use linfa::prelude::*;

    #[test]
    fn test_products() {
        let ds = products();

        assert_eq!(ds.records().dim(), (10, 2));
        assert_eq!(ds.targets().len(), 10);
        assert_eq!(ds.feature_names(), vec!["x1", "x2"]);

        for (row, target) in ds.records().outer_iter().zip(ds.targets().iter()) {
            assert_abs_diff_eq!(row[0] * row[1], *target);
        }
    }

    #[test]
    fn test_training_range() {
        for ds in &[products(), products_with_duplicate()] {
            assert!(ds.records().iter().all(|x| (0.0..=10.0).contains(x)));
            assert!(ds.records().iter().all(|x| x.fract() == 0.0));
        }
    }

    #[test]
    fn test_duplicate_variant() {
        let ds = products_with_duplicate();
        assert_eq!(ds.nsamples(), 11);

        let count = ds
            .records()
            .outer_iter()
            .filter(|row| row[0] == 5. && row[1] == 9.)
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_batches() {
        let training = products();
        let seen = |a: ArrayView1<f64>| {
            training
                .records()
                .outer_iter()
                .any(|row| row[0] == a[0] && row[1] == a[1])
        };

        assert!(in_sample().outer_iter().all(|row| seen(row)));
        assert!(near_range().outer_iter().all(|row| !seen(row)));
        assert!(near_range().iter().all(|x| (0.0..=10.0).contains(x)));
        assert!(out_of_range()
            .outer_iter()
            .all(|row| row.iter().any(|x| !(0.0..=10.0).contains(x))));
        assert!(out_of_range().iter().any(|x| *x < 0.));
    }
}
