//! Support Vector Regression with a Gaussian kernel
//!
//! The optimization itself is done by the SMO solver of `linfa-svm`. This module translates the
//! usual `(gamma, C, epsilon)` parameterization into the one of `linfa-svm` and wraps the fitted
//! machine, so that it can take part in a grid search.
use std::fmt;

use linfa::{
    dataset::DatasetBase,
    traits::{Fit, PredictInplace},
    Float, ParamGuard,
};
use linfa_svm::{Svm, SvmError, SvmValidParams};
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2};

use crate::error::{Error, Result};
use crate::hyperparams::SvrValidParams;

/// Fitted epsilon Support Vector Regression
pub struct Svr<F: Float> {
    model: Svm<F, F>,
    params: SvrValidParams<F>,
}

impl<F: Float> Svr<F> {
    /// Parameters this model was fitted with
    pub fn hyperparams(&self) -> &SvrValidParams<F> {
        &self.params
    }

    /// Number of support vectors with non-vanishing weight
    pub fn nsupport(&self) -> usize {
        self.model.nsupport()
    }

    /// Offset of the regression function
    pub fn rho(&self) -> F {
        self.model.rho
    }
}

/// A diverged solver leaves a non-finite offset behind
fn check_offset<F: Float>(rho: F, params: &SvrValidParams<F>) -> Result<()> {
    if !rho.is_finite() {
        return Err(Error::ExternalFit(format!(
            "solver diverged with {}, offset is {}",
            params, rho
        )));
    }

    Ok(())
}

impl<F: Float> Fit<Array2<F>, Array1<F>, Error> for SvrValidParams<F>
where
    SvmValidParams<F, F>: Fit<Array2<F>, Array1<F>, SvmError, Object = Svm<F, F>>,
{
    type Object = Svr<F>;

    fn fit(&self, dataset: &DatasetBase<Array2<F>, Array1<F>>) -> Result<Self::Object> {
        // linfa's Gaussian kernel divides the squared distance by its width
        let params = Svm::<F, F>::params()
            .c_svr(self.regularization(), Some(self.epsilon()))
            .gaussian_kernel(F::one() / self.kernel_spread())
            .eps(self.tolerance())
            .shrinking(self.shrinking())
            .check()?;

        let model = params.fit(dataset)?;
        check_offset(model.rho, self)?;

        Ok(Svr {
            model,
            params: *self,
        })
    }
}

impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<F>> for Svr<F>
where
    Svm<F, F>: PredictInplace<ArrayBase<D, Ix2>, Array1<F>>,
{
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<F>) {
        self.model.predict_inplace(x, y);
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<F> {
        Array1::zeros(x.nrows())
    }
}

impl<F: Float> fmt::Display for Svr<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SVR ({}): {}", self.params, self.model)
    }
}
