use approx::assert_abs_diff_eq;
use ndarray::{array, Axis};
use svr_product::prelude::*;
use svr_product::{build_training_set, records_from_rows, ProductModel, SvrGrid};

/// Grid around the winner of the full search, keeps the tests fast
fn compact_params() -> GridSearchParams<SvrParams<f64>> {
    let grid = SvrGrid {
        kernel_spreads: vec![1e-2, 1e-3],
        regularizations: vec![1e3, 1e4, 1e5],
        ..SvrGrid::new()
    };

    GridSearchParams::new(grid.candidates())
}

fn compact_model() -> ProductModel {
    let dataset = build_training_set().unwrap();
    fit_model(&dataset, &compact_params()).unwrap()
}

#[test]
fn full_demo() -> Result<()> {
    let report = run_demo()?;

    let in_sample = report.batch("in-sample").unwrap();
    let values = in_sample
        .predictions
        .iter()
        .map(|p| p.value)
        .collect::<Vec<_>>();
    for (value, expected) in values.iter().zip(&[6., 45., 12., 100., 80.]) {
        assert_abs_diff_eq!(*value, *expected, epsilon = 0.5);
    }

    let near_range = report.batch("near-range").unwrap();
    assert!(near_range.predictions.iter().all(|p| p.abs_error() < 10.));

    let out_of_range = report.batch("out-of-range").unwrap();
    let far = out_of_range.predictions[0];
    assert_eq!((far.x1, far.x2), (100., 100.));
    assert!(far.abs_error() > 50.);
    assert!(out_of_range.mean_abs_error() > 10. * near_range.mean_abs_error());

    assert!(report.validation_error.is_finite());
    assert!(report.to_string().contains("100 x 100 is "));

    Ok(())
}

#[test]
fn in_sample_predictions_match_products() -> Result<()> {
    let model = compact_model();
    let dataset = build_training_set()?;

    let predicted = predict(&model, dataset.records())?;
    for (value, target) in predicted.iter().zip(dataset.targets().iter()) {
        assert_abs_diff_eq!(*value, *target, epsilon = 0.5);
    }

    Ok(())
}

#[test]
fn error_grows_outside_of_training_range() -> Result<()> {
    let model = compact_model();

    let near = svr_product_datasets::near_range();
    let near_error = (&predict(&model, &near)? - &near.map_axis(Axis(1), |r| r[0] * r[1]))
        .mapv(f64::abs);
    assert!(near_error.iter().all(|e| *e < 10.));

    let far = predict(&model, &array![[100., 100.]])?;
    assert!((far[0] - 10_000.).abs() > 50.);
    assert!(far[0].abs() < 1_000.);

    Ok(())
}

#[test]
fn predict_is_pure() -> Result<()> {
    let model = compact_model();
    let batch = svr_product_datasets::out_of_range();

    let first = predict(&model, &batch)?;
    let second = predict(&model, &batch)?;
    assert_eq!(first, second);

    Ok(())
}

#[test]
fn predict_keeps_order() -> Result<()> {
    let model = compact_model();
    let a = records_from_rows(&[vec![3., 3.]])?;
    let b = records_from_rows(&[vec![7., 4.]])?;
    let both = records_from_rows(&[vec![3., 3.], vec![7., 4.]])?;

    let joint = predict(&model, &both)?;
    assert_eq!(joint[0], predict(&model, &a)?[0]);
    assert_eq!(joint[1], predict(&model, &b)?[0]);

    Ok(())
}

#[test]
fn too_few_examples_for_folds() {
    let dataset = svr_product_datasets::product_dataset(&[[1., 1.], [2., 3.], [4., 4.]]);
    let res = fit_model(&dataset, &compact_params().n_folds(5));

    assert!(matches!(
        res,
        Err(Error::InsufficientData {
            samples: 3,
            folds: 5
        })
    ));
}

#[test]
fn malformed_batches_are_rejected() {
    let model = compact_model();

    assert!(matches!(
        records_from_rows(&[vec![1.]]),
        Err(Error::MalformedInput(_))
    ));
    assert!(matches!(
        predict(&model, &array![[1., 2., 3.]]),
        Err(Error::MalformedInput(_))
    ));
    assert!(matches!(
        predict(&model, &array![[f64::INFINITY, 2.]]),
        Err(Error::MalformedInput(_))
    ));
}

#[test]
fn duplicated_example_variant() -> Result<()> {
    let dataset = svr_product_datasets::products_with_duplicate();
    let model = fit_model(&dataset, &compact_params())?;

    let predicted = predict(&model, &svr_product_datasets::in_sample())?;
    for (value, expected) in predicted.iter().zip(&[6., 45., 12., 100., 80.]) {
        assert_abs_diff_eq!(*value, *expected, epsilon = 0.5);
    }

    Ok(())
}

#[test]
fn shuffled_folds_still_fit() -> Result<()> {
    let dataset = build_training_set()?;
    let model = fit_model(&dataset, &compact_params().shuffle(Some(7)))?;

    assert_eq!(model.scores().len(), 6);
    assert!(model.best_score().is_finite());

    Ok(())
}
