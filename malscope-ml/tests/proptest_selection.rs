//! Property-based tests for selection, folding and scaling using proptest.

use ndarray::Array2;
use proptest::prelude::*;

use malscope_ml::algorithms::StratifiedKFold;
use malscope_ml::data::StandardScaler;
use malscope_ml::training::sweep::best_index;

// --- Arg-max selection properties ---

proptest! {
    #[test]
    fn best_index_points_at_first_maximum(scores in prop::collection::vec(0.0f64..1.0, 1..20)) {
        let i = best_index(scores.iter().copied()).unwrap();
        let max = scores.iter().copied().fold(f64::MIN, f64::max);
        prop_assert_eq!(scores[i], max);
        prop_assert!(scores[..i].iter().all(|&s| s < max));
    }

    #[test]
    fn best_index_never_picks_nan(
        scores in prop::collection::vec(prop_oneof![Just(f64::NAN), 0.0f64..1.0], 1..20)
    ) {
        match best_index(scores.iter().copied()) {
            Some(i) => prop_assert!(!scores[i].is_nan()),
            None => prop_assert!(scores.iter().all(|s| s.is_nan())),
        }
    }
}

// --- Stratified fold properties ---

proptest! {
    #[test]
    fn folds_partition_and_stratify(
        positives in 5usize..30,
        negatives in 5usize..30,
        folds in 2usize..=5,
    ) {
        let y: Vec<usize> = (0..positives + negatives)
            .map(|i| usize::from(i < positives))
            .collect();
        let splits = StratifiedKFold::new(folds).split(&y).unwrap();
        prop_assert_eq!(splits.len(), folds);

        let mut seen = vec![0usize; y.len()];
        for (train, test) in &splits {
            prop_assert_eq!(train.len() + test.len(), y.len());
            for &i in test {
                seen[i] += 1;
            }
            let test_pos = test.iter().filter(|&&i| y[i] == 1).count();
            prop_assert!(test_pos >= positives / folds);
            prop_assert!(test_pos <= positives.div_ceil(folds));
        }
        prop_assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn folds_are_deterministic(n in 10usize..40) {
        let y: Vec<usize> = (0..n).map(|i| i % 2).collect();
        let cv = StratifiedKFold::new(2);
        prop_assert_eq!(cv.split(&y).unwrap(), cv.split(&y).unwrap());
    }
}

// --- Scaler properties ---

proptest! {
    #[test]
    fn scaler_inverse_restores_input(values in prop::collection::vec(-1e3f64..1e3, 6..30)) {
        let rows = values.len() / 2;
        let x = Array2::from_shape_vec((rows, 2), values[..rows * 2].to_vec()).unwrap();
        let mut scaler = StandardScaler::new();
        let z = scaler.fit_transform(&x).unwrap();
        let back = scaler.inverse_transform(&z).unwrap();
        for (a, b) in x.iter().zip(back.iter()) {
            prop_assert!((a - b).abs() < 1e-6);
        }
    }
}
