//! Cross-validated grid search
//!
//! Every candidate parameter set is fitted `k` times, each time leaving out a different fold of
//! the dataset, and scored with the mean squared error on the left out fold. The candidate with
//! the lowest mean error is refitted on the whole dataset. The search is generic over the
//! estimator, anything implementing `Fit` with an object implementing `PredictInplace` can be
//! searched.
use std::fmt;

use linfa::{
    dataset::{DatasetBase, Records},
    metrics::SingleTargetRegression,
    traits::{Fit, Predict, PredictInplace},
    Dataset, Float,
};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::hyperparams::GridSearchValidParams;

/// Split sample indices into `k` folds
///
/// Samples keep their order unless a shuffle seed is given. The first `n % k` folds contain one
/// sample more than the others. Each fold is used exactly once as the validation set, while the
/// remaining samples form the training set.
#[derive(Debug, Clone, PartialEq)]
pub struct KFold {
    n_samples: usize,
    n_folds: usize,
    shuffle: Option<u64>,
}

impl KFold {
    pub fn new(n_samples: usize, n_folds: usize) -> Self {
        KFold {
            n_samples,
            n_folds,
            shuffle: None,
        }
    }

    /// Permute the samples with a seeded generator before splitting
    pub fn shuffle(mut self, seed: Option<u64>) -> Self {
        self.shuffle = seed;
        self
    }

    /// Returns the `(training, validation)` indices of every fold
    pub fn split(&self) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        if self.n_folds < 2 {
            return Err(Error::InvalidParams(format!(
                "number of folds should be at least two, but was {}",
                self.n_folds
            )));
        }
        if self.n_samples < self.n_folds {
            return Err(Error::InsufficientData {
                samples: self.n_samples,
                folds: self.n_folds,
            });
        }

        let mut order = (0..self.n_samples).collect::<Vec<_>>();
        if let Some(seed) = self.shuffle {
            order.shuffle(&mut SmallRng::seed_from_u64(seed));
        }

        let (base, rest) = (self.n_samples / self.n_folds, self.n_samples % self.n_folds);
        let mut start = 0;
        let folds = (0..self.n_folds)
            .map(|k| {
                let end = start + base + usize::from(k < rest);
                let valid = order[start..end].to_vec();
                let train = order[..start]
                    .iter()
                    .chain(order[end..].iter())
                    .copied()
                    .collect();
                start = end;

                (train, valid)
            })
            .collect();

        Ok(folds)
    }
}

/// Fitted grid search
///
/// Holds the winning parameter set, the estimator refitted with it on the whole dataset and the
/// cross-validation score of every candidate.
#[derive(Debug, Clone)]
pub struct GridSearch<P, M, F> {
    params: P,
    model: M,
    best_index: usize,
    scores: Array1<F>,
}

impl<P, M, F: Float> GridSearch<P, M, F> {
    /// Parameter set with the lowest mean held-out error
    pub fn best_params(&self) -> &P {
        &self.params
    }

    /// Position of the winner in the candidate list
    pub fn best_index(&self) -> usize {
        self.best_index
    }

    /// Mean held-out squared error of the winner
    pub fn best_score(&self) -> F {
        self.scores[self.best_index]
    }

    /// Mean held-out squared error of every candidate, in candidate order
    pub fn scores(&self) -> &Array1<F> {
        &self.scores
    }

    /// The estimator refitted on the whole dataset
    pub fn model(&self) -> &M {
        &self.model
    }
}

/// Subset of a dataset, rows in the order of `indices`
fn select_samples<F: Float, D: Data<Elem = F>, S: Data<Elem = F>>(
    dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<S, Ix1>>,
    indices: &[usize],
) -> Dataset<F, F, Ix1> {
    Dataset::new(
        dataset.records().select(Axis(0), indices),
        dataset.targets().select(Axis(0), indices),
    )
}

/// Index of the lowest finite score, the earliest one wins ties
fn lowest_score<F: Float>(scores: &[F]) -> Option<usize> {
    scores
        .iter()
        .enumerate()
        .filter(|(_, score)| score.is_finite())
        .fold(None, |best: Option<(usize, F)>, (idx, score)| match best {
            Some((_, best_score)) if best_score <= *score => best,
            _ => Some((idx, *score)),
        })
        .map(|(idx, _)| idx)
}

impl<F, P> Fit<Array2<F>, Array1<F>, Error> for GridSearchValidParams<P>
where
    F: Float,
    P: Fit<Array2<F>, Array1<F>, Error> + Clone,
    P::Object: PredictInplace<Array2<F>, Array1<F>>,
{
    type Object = GridSearch<P, P::Object, F>;

    fn fit(&self, dataset: &DatasetBase<Array2<F>, Array1<F>>) -> Result<Self::Object> {
        let folds = KFold::new(dataset.nsamples(), self.n_folds())
            .shuffle(self.shuffle())
            .split()?;

        info!(
            candidates = self.candidates().len(),
            folds = folds.len(),
            samples = dataset.nsamples(),
            "starting grid search"
        );

        let mut scores = Vec::with_capacity(self.candidates().len());
        for (idx, candidate) in self.candidates().iter().enumerate() {
            let mut total = F::zero();
            for (fold, (train, valid)) in folds.iter().enumerate() {
                let train = select_samples(dataset, train);
                let valid = select_samples(dataset, valid);

                let model = candidate.fit(&train)?;
                let predicted: Array1<F> = model.predict(valid.records());
                let error = predicted.mean_squared_error(&valid)?;
                trace!(candidate = idx, fold, error = %error, "scored fold");

                total += error;
            }

            let score = total / F::cast(folds.len());
            debug!(candidate = idx, score = %score, "cross-validated candidate");
            scores.push(score);
        }

        let best_index = lowest_score(&scores).ok_or_else(|| {
            Error::ExternalFit("no candidate reached a finite validation error".to_string())
        })?;
        let params = self.candidates()[best_index].clone();
        let model = params.fit(dataset)?;

        info!(
            candidate = best_index,
            score = %scores[best_index],
            "refitted best candidate on the whole dataset"
        );

        Ok(GridSearch {
            params,
            model,
            best_index,
            scores: Array1::from(scores),
        })
    }
}

impl<P, M, F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<F>>
    for GridSearch<P, M, F>
where
    M: PredictInplace<ArrayBase<D, Ix2>, Array1<F>>,
{
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<F>) {
        self.model.predict_inplace(x, y);
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<F> {
        self.model.default_target(x)
    }
}

impl<P: fmt::Display, M: fmt::Display, F: Float> fmt::Display for GridSearch<P, M, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Best of {} candidates is #{} ({}) with mean validation error {:.4}",
            self.scores.len(),
            self.best_index,
            self.params,
            self.best_score()
        )?;
        write!(f, "{}", self.model)
    }
}
