//! svr-product prelude.
//!
//! This module contains the most used types, type aliases, traits and
//! functions that you can import easily as a group.
//!

#[doc(no_inline)]
pub use crate::error::{Error, Result};

#[doc(no_inline)]
pub use crate::grid_search::GridSearch;

#[doc(no_inline)]
pub use crate::hyperparams::{GridSearchParams, SvrGrid, SvrParams};

#[doc(no_inline)]
pub use crate::svr::Svr;

#[doc(no_inline)]
pub use crate::harness::{fit_model, predict, run_demo, DemoParams, Report};

#[doc(no_inline)]
pub use linfa::traits::{Fit, Predict, PredictInplace};

#[doc(no_inline)]
pub use linfa::ParamGuard;
