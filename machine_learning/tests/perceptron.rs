use std::num::NonZeroUsize;

use machine_learning::{Label, MlErr, Perceptron, Sample, classify, train};
use ndarray::array;

fn epochs(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

#[test]
fn orthogonal_scenario_is_learned() {
    let samples = [
        Sample::new(vec![1., 0.], Label::Negative),
        Sample::new(vec![0., 1.], Label::Positive),
    ];

    let weights = train(&samples, epochs(1000), 0.1, array![1., 0.]).unwrap();

    assert_eq!(classify(weights.view(), &[1., 0.]).unwrap(), Label::Negative);
    assert_eq!(classify(weights.view(), &[0., 1.]).unwrap(), Label::Positive);

    let perceptron = Perceptron::new(weights);
    assert!(perceptron.predict_proba(&[1., 0.]).unwrap() < 0.5);
    assert!(perceptron.predict_proba(&[0., 1.]).unwrap() > 0.5);
}

#[test]
fn any_mismatched_sample_fails() {
    let initial = array![0.5, 0.5];

    let short_first = [
        Sample::new(vec![1.], Label::Negative),
        Sample::new(vec![0., 1.], Label::Positive),
    ];
    let long_last = [
        Sample::new(vec![1., 0.], Label::Negative),
        Sample::new(vec![0., 1., 1.], Label::Positive),
    ];
    let all_wrong = [
        Sample::new(vec![1., 0., 0.], Label::Negative),
        Sample::new(vec![0., 1., 0.], Label::Positive),
    ];

    for samples in [&short_first[..], &long_last[..], &all_wrong[..]] {
        let err = train(samples, epochs(3), 0.1, initial.clone()).unwrap_err();
        assert!(matches!(err, MlErr::SizeMismatch { .. }), "got {err}");
    }
}

#[test]
fn empty_training_set_fails() {
    let err = train(&[], epochs(1), 0.1, array![1., 2.]).unwrap_err();
    assert!(matches!(err, MlErr::EmptyDataset));
}

#[test]
fn classify_rejects_wrong_dimension() {
    let weights = array![1., 2.];
    assert!(classify(weights.view(), &[1.]).is_err());
}
