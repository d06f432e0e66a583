//! `svr-product` teaches a support vector regressor the product `x1 * x2` and shows where such
//! a model stops being useful.
//!
//! ## The Big Picture
//!
//! The model is fitted on ten integer pairs in `[0, 10]`. Its kernel spread and regularization
//! strength are chosen with a 5-fold cross-validated grid search, the winning combination is
//! refitted on all examples. The fitted model reproduces the training examples almost exactly and
//! interpolates well between them, but far away from the training range a Gaussian kernel
//! regression falls back to its offset. Predicting `100 x 100` gives a value around fifty.
//!
//! ## Current state
//!
//! The optimization itself is delegated to the SMO solver of
//! [`linfa-svm`](https://crates.io/crates/linfa-svm). This crate provides
//!
//! * [`Svr`]: epsilon Support Vector Regression with a Gaussian kernel
//! * [`GridSearch`]: an exhaustive, cross-validated search over candidate parameter sets, generic
//!   over the estimator
//! * [`harness`]: the pipeline building the training set, fitting the model and predicting the
//!   in-sample, near-range and out-of-range batches
//!
//! ## Example
//!
//! ```no_run
//! let report = svr_product::run_demo()?;
//! print!("{}", report);
//! # Ok::<(), svr_product::Error>(())
//! ```
//!
//! which prints lines like
//! ```ignore
//! 2 x 3 is 6.01
//! 5 x 9 is 45.01
//! ...
//! 100 x 100 is 60.85
//! ```

pub mod error;
pub mod grid_search;
pub mod harness;
pub mod hyperparams;
pub mod prelude;
mod svr;

pub use error::{Error, Result};
pub use grid_search::{GridSearch, KFold};
pub use harness::{
    build_training_set, fit_model, predict, records_from_rows, run_demo, run_demo_with,
    DemoParams, ProductModel, Report,
};
pub use hyperparams::{
    GridSearchParams, GridSearchValidParams, SvrGrid, SvrParams, SvrValidParams,
};
pub use svr::Svr;
