use std::fmt;

use linfa::{Float, ParamGuard};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::svr::Svr;

/// Support Vector Regression hyperparameters
///
/// The regression is an epsilon-SVR with a Gaussian kernel `exp(-gamma * |x - x'|^2)`. The kernel
/// spread `gamma` controls how far the influence of a single training example reaches, the
/// regularization `C` penalizes examples outside of the epsilon tube and `tolerance` is the
/// stopping condition of the solver.
///
/// # Parameters
/// | Name | Default | Purpose | Range |
/// | :--- | :--- | :---| :--- |
/// | [kernel_spread](SvrParams::kernel_spread) | `0.1` | Gamma of the Gaussian kernel | `(0, inf)` |
/// | [regularization](SvrParams::regularization) | `1.0` | Penalty C of the soft margin | `(0, inf)` |
/// | [epsilon](SvrParams::epsilon) | `0.1` | Width of the insensitive tube | `[0, inf)` |
/// | [tolerance](SvrParams::tolerance) | `1e-3` | Stopping condition of the solver | `(0, inf)` |
/// | [shrinking](SvrParams::shrinking) | `false` | Shrink the active variable set | `false`, `true` |
///
/// # Example
///
/// ```rust
/// use linfa::prelude::*;
/// use svr_product::{Svr, Error};
///
/// let dataset = svr_product_datasets::products();
/// let model = Svr::params()
///     .kernel_spread(1e-2)
///     .regularization(1e4)
///     .epsilon(0.01)
///     .fit(&dataset)?;
///
/// let prediction = model.predict(dataset.records());
/// assert_eq!(prediction.len(), 10);
/// # Ok::<(), Error>(())
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvrValidParams<F> {
    kernel_spread: F,
    regularization: F,
    epsilon: F,
    tolerance: F,
    shrinking: bool,
}

impl<F: Float> SvrValidParams<F> {
    pub fn kernel_spread(&self) -> F {
        self.kernel_spread
    }

    pub fn regularization(&self) -> F {
        self.regularization
    }

    pub fn epsilon(&self) -> F {
        self.epsilon
    }

    pub fn tolerance(&self) -> F {
        self.tolerance
    }

    pub fn shrinking(&self) -> bool {
        self.shrinking
    }
}

impl<F: Float> fmt::Display for SvrValidParams<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gamma = {:e}, C = {:e}, epsilon = {}",
            self.kernel_spread, self.regularization, self.epsilon
        )
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvrParams<F>(SvrValidParams<F>);

impl<F: Float> SvrParams<F> {
    /// Create default hyperparameters
    pub fn new() -> Self {
        Self(SvrValidParams {
            kernel_spread: F::cast(0.1),
            regularization: F::one(),
            epsilon: F::cast(0.1),
            tolerance: F::cast(1e-3),
            shrinking: false,
        })
    }

    /// Set the spread (gamma) of the Gaussian kernel
    ///
    /// Large values restrict the influence of a training example to its close neighbourhood,
    /// small values make the model smoother.
    pub fn kernel_spread(mut self, gamma: F) -> Self {
        self.0.kernel_spread = gamma;
        self
    }

    /// Set the regularization strength C
    pub fn regularization(mut self, c: F) -> Self {
        self.0.regularization = c;
        self
    }

    /// Set the width of the epsilon tube in which no penalty is given to errors
    pub fn epsilon(mut self, epsilon: F) -> Self {
        self.0.epsilon = epsilon;
        self
    }

    /// Set the stopping condition of the solver
    pub fn tolerance(mut self, tolerance: F) -> Self {
        self.0.tolerance = tolerance;
        self
    }

    /// Shrink the active variable set during optimization
    pub fn shrinking(mut self, shrinking: bool) -> Self {
        self.0.shrinking = shrinking;
        self
    }
}

impl<F: Float> fmt::Display for SvrParams<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<F: Float> Default for SvrParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> Svr<F> {
    pub fn params() -> SvrParams<F> {
        SvrParams::new()
    }
}

impl<F: Float> ParamGuard for SvrParams<F> {
    type Checked = SvrValidParams<F>;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked> {
        let p = &self.0;
        if !p.kernel_spread.is_finite() || p.kernel_spread <= F::zero() {
            Err(Error::InvalidParams(format!(
                "kernel spread should be positive and finite, but was {}",
                p.kernel_spread
            )))
        } else if !p.regularization.is_finite() || p.regularization <= F::zero() {
            Err(Error::InvalidParams(format!(
                "regularization should be positive and finite, but was {}",
                p.regularization
            )))
        } else if !p.epsilon.is_finite() || p.epsilon < F::zero() {
            Err(Error::InvalidParams(format!(
                "epsilon should be non-negative and finite, but was {}",
                p.epsilon
            )))
        } else if !p.tolerance.is_finite() || p.tolerance <= F::zero() {
            Err(Error::InvalidParams(format!(
                "tolerance should be positive and finite, but was {}",
                p.tolerance
            )))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Literal grid of SVR hyperparameters
///
/// Every kernel spread is combined with every regularization strength, the epsilon tube and the
/// solver tolerance are shared by all candidates.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct SvrGrid<F> {
    pub kernel_spreads: Vec<F>,
    pub regularizations: Vec<F>,
    pub epsilon: F,
    pub tolerance: F,
}

impl<F: Float> SvrGrid<F> {
    /// Spreads `1e-1 .. 1e-5`, regularizations `1 .. 1e6`, epsilon `0.01` and tolerance `1e-3`
    pub fn new() -> Self {
        SvrGrid {
            kernel_spreads: [1e-1, 1e-2, 1e-3, 1e-4, 1e-5]
                .iter()
                .map(|x| F::cast(*x))
                .collect(),
            regularizations: [1., 1e1, 1e2, 1e3, 1e4, 1e5, 1e6]
                .iter()
                .map(|x| F::cast(*x))
                .collect(),
            epsilon: F::cast(0.01),
            tolerance: F::cast(1e-3),
        }
    }

    /// Expand the grid into one parameter set per combination, iterating the spreads in the outer
    /// loop
    pub fn candidates(&self) -> Vec<SvrParams<F>> {
        self.kernel_spreads
            .iter()
            .flat_map(|gamma| {
                self.regularizations.iter().map(move |c| {
                    Svr::params()
                        .kernel_spread(*gamma)
                        .regularization(*c)
                        .epsilon(self.epsilon)
                        .tolerance(self.tolerance)
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.kernel_spreads.len() * self.regularizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<F: Float> Default for SvrGrid<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// A verified grid search
///
/// See [`GridSearchParams`] for more information.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSearchValidParams<P> {
    candidates: Vec<P>,
    n_folds: usize,
    shuffle: Option<u64>,
}

impl<P> GridSearchValidParams<P> {
    pub fn candidates(&self) -> &[P] {
        &self.candidates
    }

    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    pub fn shuffle(&self) -> Option<u64> {
        self.shuffle
    }
}

/// Exhaustive search over a list of candidate parameter sets
///
/// Every candidate is fitted on `k - 1` folds and scored with the mean squared error on the
/// remaining fold, for all `k` folds. The candidate with the lowest mean error is refitted on the
/// whole dataset.
///
/// # Parameters
/// | Name | Default | Purpose | Range |
/// | :--- | :--- | :---| :--- |
/// | [n_folds](GridSearchParams::n_folds) | `5` | Number of folds | `[2, inf)` |
/// | [shuffle](GridSearchParams::shuffle) | `None` | Seed to shuffle samples before folding | any |
///
/// # Errors
///
/// Returns [`InvalidParams`](Error::InvalidParams) if there are no candidates or less than two
/// folds.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSearchParams<P>(GridSearchValidParams<P>);

impl<P> GridSearchParams<P> {
    pub fn new(candidates: Vec<P>) -> Self {
        Self(GridSearchValidParams {
            candidates,
            n_folds: 5,
            shuffle: None,
        })
    }

    /// Set the number of folds
    pub fn n_folds(mut self, n_folds: usize) -> Self {
        self.0.n_folds = n_folds;
        self
    }

    /// Shuffle the samples with the given seed before splitting them into folds
    ///
    /// By default samples keep their order, so each fold is a contiguous block.
    pub fn shuffle(mut self, seed: Option<u64>) -> Self {
        self.0.shuffle = seed;
        self
    }
}

impl<P> ParamGuard for GridSearchParams<P> {
    type Checked = GridSearchValidParams<P>;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.candidates.is_empty() {
            Err(Error::InvalidParams(
                "grid search needs at least one candidate".to_string(),
            ))
        } else if self.0.n_folds < 2 {
            Err(Error::InvalidParams(format!(
                "number of folds should be at least two, but was {}",
                self.0.n_folds
            )))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_svr_defaults() {
        let params = Svr::<f64>::params().check().unwrap();
        assert_abs_diff_eq!(params.kernel_spread(), 0.1);
        assert_abs_diff_eq!(params.regularization(), 1.0);
        assert_abs_diff_eq!(params.epsilon(), 0.1);
        assert_abs_diff_eq!(params.tolerance(), 1e-3);
        assert!(!params.shrinking());
    }

    #[test]
    fn test_svr_invalid_params() {
        let invalid = [
            Svr::<f64>::params().kernel_spread(0.),
            Svr::params().kernel_spread(-1.),
            Svr::params().kernel_spread(f64::NAN),
            Svr::params().regularization(0.),
            Svr::params().regularization(f64::INFINITY),
            Svr::params().epsilon(-0.1),
            Svr::params().tolerance(0.),
        ];

        for params in &invalid {
            assert!(matches!(params.check_ref(), Err(Error::InvalidParams(_))));
        }

        assert!(Svr::<f64>::params().epsilon(0.).check().is_ok());
    }

    #[test]
    fn test_grid_candidates() {
        let grid = SvrGrid::<f64>::new();
        let candidates = grid.candidates();

        assert_eq!(grid.len(), 35);
        assert_eq!(candidates.len(), 35);

        let first = candidates[0].check_ref().unwrap();
        assert_abs_diff_eq!(first.kernel_spread(), 1e-1);
        assert_abs_diff_eq!(first.regularization(), 1.);
        assert_abs_diff_eq!(first.epsilon(), 0.01);
        assert_abs_diff_eq!(first.tolerance(), 1e-3);

        // spreads iterate in the outer loop
        let eighth = candidates[7].check_ref().unwrap();
        assert_abs_diff_eq!(eighth.kernel_spread(), 1e-2);
        assert_abs_diff_eq!(eighth.regularization(), 1.);

        let last = candidates[34].check_ref().unwrap();
        assert_abs_diff_eq!(last.kernel_spread(), 1e-5);
        assert_abs_diff_eq!(last.regularization(), 1e6);
    }

    #[test]
    fn test_empty_grid() {
        let grid = SvrGrid::<f64> {
            kernel_spreads: vec![],
            ..SvrGrid::new()
        };
        assert!(grid.is_empty());
        assert!(grid.candidates().is_empty());
    }

    #[test]
    fn test_grid_search_params() {
        let params = GridSearchParams::new(SvrGrid::<f64>::new().candidates());
        let checked = params.clone().check().unwrap();
        assert_eq!(checked.n_folds(), 5);
        assert_eq!(checked.shuffle(), None);
        assert_eq!(checked.candidates().len(), 35);

        assert!(matches!(
            params.n_folds(1).check(),
            Err(Error::InvalidParams(_))
        ));
        assert!(matches!(
            GridSearchParams::<SvrParams<f64>>::new(vec![]).check(),
            Err(Error::InvalidParams(_))
        ));
    }
}
