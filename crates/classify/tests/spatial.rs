//! End-to-end tests from rasters to change probabilities.

use landtrend_classify::{
    ClassifyConfig, ClassifyError, Driver, FeatureMatrix, TrainingSet, binarize_labels,
    forest_change, logistic_change, sample_rows,
};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn noisy_scene(rows: usize, cols: usize, seed: u64) -> (Vec<Driver>, Array2<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let distance = Array2::from_shape_fn((rows, cols), |(r, c)| (r + c) as f64 / (rows + cols) as f64);
    let noise = Array2::from_shape_fn((rows, cols), |_| rng.random_range(0.0..1.0));
    let labels = Array2::from_shape_fn((rows, cols), |(r, c)| {
        let p = 1.0 - distance[[r, c]];
        if rng.random_range(0.0..1.0) < p * p { 1.0 } else { 0.0 }
    });
    let drivers = vec![
        Driver::new("distance.tif", distance),
        Driver::new("noise.tif", noise),
    ];
    (drivers, labels)
}

#[test]
fn mismatched_driver_is_named() {
    let labels = Array2::<f64>::zeros((50, 50));
    let drivers = vec![Driver::new("elevation.tif", Array2::zeros((100, 100)))];
    let err = logistic_change(&drivers, &labels, &ClassifyConfig::default()).unwrap_err();
    assert!(matches!(err, ClassifyError::DriverShapeMismatch { .. }));
    assert!(err.to_string().contains("elevation.tif"));

    let err = forest_change(&drivers, &labels, &ClassifyConfig::default()).unwrap_err();
    assert!(err.to_string().contains("elevation.tif"));
}

#[test]
fn large_scene_is_sampled_to_cap_with_paired_rows() {
    let (rows, cols) = (250, 200);
    let index = Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f64);
    let labels = Array2::from_shape_fn((rows, cols), |(r, c)| ((r * cols + c) % 2) as f64);
    let features = FeatureMatrix::stack(&[Driver::new("index", index)], &labels).unwrap();
    assert_eq!(features.n_pixels(), 50_000);

    let mut rng = StdRng::seed_from_u64(99);
    let sampled = sample_rows(features.n_pixels(), 10_000, &mut rng);
    let set = TrainingSet::select(&features, &binarize_labels(&labels), sampled).unwrap();
    assert_eq!(set.x.nrows(), 10_000);
    assert_eq!(set.y.len(), 10_000);
    for (r, &pixel) in set.rows.iter().enumerate() {
        assert_eq!(set.x[[r, 0]], pixel as f64);
        assert_eq!(set.y[r], (pixel % 2) as u8);
    }
}

#[test]
fn logistic_on_large_scene_returns_sampled_probabilities() {
    let (drivers, labels) = noisy_scene(250, 200, 1);
    let config = ClassifyConfig::default().with_seed(Some(42));
    let out = logistic_change(&drivers, &labels, &config).unwrap();
    assert_eq!(out.coefficients.len(), 1);
    assert_eq!(out.coefficients[0].len(), 2);
    assert_eq!(out.intercept.len(), 1);
    assert_eq!(out.probabilities.len(), 10_000);
    assert!(out.probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
    // change falls off with distance
    assert!(out.coefficients[0][0] < 0.0, "{:?}", out.coefficients);
}

#[test]
fn forest_importances_cover_every_driver() {
    let (drivers, labels) = noisy_scene(60, 60, 2);
    let config = ClassifyConfig::default().with_n_trees(40).with_seed(Some(3));
    let out = forest_change(&drivers, &labels, &config).unwrap();
    assert_eq!(out.probabilities.len(), 3600);
    assert_eq!(out.feature_importances.len(), 2);
    let total: f64 = out.feature_importances.iter().sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn uniform_labels_are_rejected() {
    let labels = Array2::<f64>::ones((10, 10));
    let drivers = vec![Driver::new("a", Array2::zeros((10, 10)))];
    let err = forest_change(&drivers, &labels, &ClassifyConfig::default()).unwrap_err();
    assert_eq!(err, ClassifyError::SingleClass { class: 1 });
}

#[test]
fn seeded_runs_repeat() {
    let (drivers, labels) = noisy_scene(40, 40, 4);
    let config = ClassifyConfig::default().with_n_trees(5).with_seed(Some(8));
    let a = forest_change(&drivers, &labels, &config).unwrap();
    let b = forest_change(&drivers, &labels, &config).unwrap();
    assert_eq!(a, b);
}
