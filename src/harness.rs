//! Training and prediction pipeline of the `x1 * x2` regression
//!
//! The pipeline is strictly linear: build the training set, search the hyperparameters and
//! refit, then predict three batches. Any error aborts the run.
use std::fmt;

use linfa::{
    dataset::Records,
    traits::{Fit, Predict, PredictInplace},
    Dataset, ParamGuard,
};
use ndarray::{Array1, Array2, Ix1};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::grid_search::GridSearch;
use crate::hyperparams::{GridSearchParams, SvrGrid, SvrParams, SvrValidParams};
use crate::svr::Svr;

/// Grid-searched support vector regression of the product
pub type ProductModel = GridSearch<SvrParams<f64>, Svr<f64>, f64>;

/// A named prediction batch
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub name: String,
    pub records: Array2<f64>,
}

impl Batch {
    pub fn new(name: impl Into<String>, records: Array2<f64>) -> Self {
        Batch {
            name: name.into(),
            records,
        }
    }
}

/// Configuration of a demonstration run
#[derive(Debug, Clone, PartialEq)]
pub struct DemoParams {
    pub grid: SvrGrid<f64>,
    pub n_folds: usize,
    pub shuffle: Option<u64>,
    pub batches: Vec<Batch>,
}

impl DemoParams {
    pub fn new() -> Self {
        DemoParams {
            grid: SvrGrid::new(),
            n_folds: 5,
            shuffle: None,
            batches: vec![
                Batch::new("in-sample", svr_product_datasets::in_sample()),
                Batch::new("near-range", svr_product_datasets::near_range()),
                Batch::new("out-of-range", svr_product_datasets::out_of_range()),
            ],
        }
    }

    pub fn search_params(&self) -> GridSearchParams<SvrParams<f64>> {
        GridSearchParams::new(self.grid.candidates())
            .n_folds(self.n_folds)
            .shuffle(self.shuffle)
    }
}

impl Default for DemoParams {
    fn default() -> Self {
        Self::new()
    }
}

/// A single prediction, `x1 x x2 is value`
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub x1: f64,
    pub x2: f64,
    pub value: f64,
}

impl Prediction {
    /// Distance of the prediction to the true product
    pub fn abs_error(&self) -> f64 {
        (self.x1 * self.x2 - self.value).abs()
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} is {:.2}", self.x1, self.x2, self.value)
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub name: String,
    pub predictions: Vec<Prediction>,
}

impl BatchReport {
    /// Mean distance of the predictions to the true products, zero for an empty batch
    pub fn mean_abs_error(&self) -> f64 {
        if self.predictions.is_empty() {
            return 0.;
        }
        let total = self.predictions.iter().map(Prediction::abs_error).sum::<f64>();
        total / self.predictions.len() as f64
    }
}

/// Outcome of a demonstration run
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub best_params: SvrValidParams<f64>,
    pub validation_error: f64,
    pub batches: Vec<BatchReport>,
}

impl Report {
    pub fn batch(&self, name: &str) -> Option<&BatchReport> {
        self.batches.iter().find(|b| b.name == name)
    }
}

/// One line per prediction, batches separated by an empty line
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, batch) in self.batches.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            for prediction in &batch.predictions {
                writeln!(f, "{}", prediction)?;
            }
        }

        Ok(())
    }
}

fn check_two_features(records: &Array2<f64>) -> Result<()> {
    if records.ncols() != 2 {
        return Err(Error::MalformedInput(format!(
            "expected two features per record, but got {}",
            records.ncols()
        )));
    }
    if let Some(x) = records.iter().find(|x| !x.is_finite()) {
        return Err(Error::MalformedInput(format!(
            "features should be finite numbers, but got {}",
            x
        )));
    }

    Ok(())
}

/// Build a batch from loose rows, every row has to contain exactly two features
pub fn records_from_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    if let Some((idx, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != 2) {
        return Err(Error::MalformedInput(format!(
            "row {} has {} features instead of two",
            idx,
            row.len()
        )));
    }

    let records = Array2::from_shape_vec((rows.len(), 2), rows.concat())
        .map_err(|err| Error::MalformedInput(err.to_string()))?;
    check_two_features(&records)?;

    Ok(records)
}

/// Check that a training set has two features and one target per record
pub fn check_training_set(dataset: &Dataset<f64, f64, Ix1>) -> Result<()> {
    if dataset.records().nrows() != dataset.targets().len() {
        return Err(Error::MalformedInput(format!(
            "{} records but {} targets",
            dataset.records().nrows(),
            dataset.targets().len()
        )));
    }
    check_two_features(dataset.records())
}

/// The canonical training set
pub fn build_training_set() -> Result<Dataset<f64, f64, Ix1>> {
    let dataset = svr_product_datasets::products();
    check_training_set(&dataset)?;

    Ok(dataset)
}

/// Search the hyperparameters on the dataset and refit the best candidate
pub fn fit_model<P>(
    dataset: &Dataset<f64, f64, Ix1>,
    params: &GridSearchParams<P>,
) -> Result<GridSearch<P, P::Object, f64>>
where
    P: Fit<Array2<f64>, Array1<f64>, Error> + Clone,
    P::Object: PredictInplace<Array2<f64>, Array1<f64>>,
{
    check_training_set(dataset)?;
    params.check_ref()?.fit(dataset)
}

/// Predict the product for every record of the batch, in order
pub fn predict<M>(model: &M, batch: &Array2<f64>) -> Result<Array1<f64>>
where
    M: PredictInplace<Array2<f64>, Array1<f64>>,
{
    check_two_features(batch)?;

    let predicted: Array1<f64> = model.predict(batch);
    if let Some(idx) = predicted.iter().position(|x| !x.is_finite()) {
        return Err(Error::ExternalPredict(format!(
            "model returned {} for record {}",
            predicted[idx], idx
        )));
    }

    Ok(predicted)
}

/// Run the demonstration with the default configuration
pub fn run_demo() -> Result<Report> {
    run_demo_with(&DemoParams::default())
}

/// Run the demonstration: build the training set, fit the model and predict every batch
pub fn run_demo_with(params: &DemoParams) -> Result<Report> {
    let dataset = build_training_set()?;
    info!(
        samples = dataset.nsamples(),
        candidates = params.grid.len(),
        "fitting model"
    );

    let model: ProductModel = fit_model(&dataset, &params.search_params())?;
    let best_params = *model.best_params().check_ref()?;
    info!(
        params = %best_params,
        validation_error = model.best_score(),
        support_vectors = model.model().nsupport(),
        "selected hyperparameters"
    );

    let batches = params
        .batches
        .iter()
        .map(|batch| {
            let predicted = predict(&model, &batch.records)?;
            let predictions = batch
                .records
                .outer_iter()
                .zip(predicted.iter())
                .map(|(row, value)| Prediction {
                    x1: row[0],
                    x2: row[1],
                    value: *value,
                })
                .collect();
            info!(batch = %batch.name, records = batch.records.nrows(), "predicted batch");

            Ok(BatchReport {
                name: batch.name.clone(),
                predictions,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Report {
        best_params,
        validation_error: model.best_score(),
        batches,
    })
}
