//! Train → persist → load → predict lifecycle tests

use super::artifact::load_artifact;
use super::inference::Predictor;
use super::threshold::LabelPolicy;
use super::trainer::{Trainer, TrainingConfig, TrainingError};
use super::tree::Classifier;
use crate::logic::dataset::{CsvStore, SensorRecord};
use crate::logic::features::FeatureVector;
use std::fs;
use tempfile::tempdir;

fn seed_store(store: &CsvStore, normal: usize, theft: usize) {
    for i in 0..normal {
        let t = i as f64 / normal as f64;
        store
            .append(&SensorRecord::reading(1.5 + t, 230.0, 3.0 + 2.8 * t).with_pole("P-1", "Feeder A"))
            .unwrap();
    }
    for i in 0..theft {
        let t = i as f64 / theft as f64;
        store
            .append(&SensorRecord::reading(4.0 + 2.0 * t, 230.0, 8.0 + 6.0 * t).with_pole("P-2", "Feeder B"))
            .unwrap();
    }
}

fn probe_vectors() -> Vec<FeatureVector> {
    (0..40)
        .map(|i| FeatureVector::new(1.0 + i as f64 * 0.13, 225.0 + i as f64 * 0.25, i as f64 * 0.37))
        .collect()
}

#[test]
fn test_train_reports_metrics() {
    let dir = tempdir().unwrap();
    let store = CsvStore::open(dir.path().join("data.csv")).unwrap();
    seed_store(&store, 80, 20);

    let outcome = Trainer::default().train(&store).unwrap();

    assert_eq!(outcome.train_rows + outcome.test_rows, 100);
    assert_eq!(outcome.test_rows, 20);
    assert_eq!(outcome.report.classes[0].support, 16);
    assert_eq!(outcome.report.classes[1].support, 4);
    assert_eq!(outcome.report.confusion.total(), 20);
    assert_eq!(outcome.report.accuracy, 1.0);
    assert_eq!(outcome.artifact.forest.n_trees(), 100);
}

#[test]
fn test_persisted_model_predicts_identically() {
    let dir = tempdir().unwrap();
    let store = CsvStore::open(dir.path().join("data.csv")).unwrap();
    seed_store(&store, 60, 25);
    let model_path = dir.path().join("model.json");

    let outcome = Trainer::default().train_and_persist(&store, &model_path).unwrap();
    let in_memory = &outcome.artifact.forest;

    let reloaded = Predictor::load(&model_path).unwrap();
    assert_eq!(load_artifact(&model_path).unwrap(), outcome.artifact);

    for v in probe_vectors() {
        let expected = in_memory.predict(&v);
        let expected_proba = in_memory.predict_proba(&v)[1];
        let got = reloaded.predict(&v).unwrap();
        assert_eq!(got.label, expected);
        assert_eq!(got.theft_probability, expected_proba);
    }
}

#[test]
fn test_retraining_replaces_artifact() {
    let dir = tempdir().unwrap();
    let store = CsvStore::open(dir.path().join("data.csv")).unwrap();
    seed_store(&store, 30, 10);
    let model_path = dir.path().join("model.json");

    let first = Trainer::default().train_and_persist(&store, &model_path).unwrap();
    seed_store(&store, 30, 10);
    let second = Trainer::default().train_and_persist(&store, &model_path).unwrap();

    let on_disk = load_artifact(&model_path).unwrap();
    assert_eq!(on_disk.training_rows, second.artifact.training_rows);
    assert!(second.artifact.training_rows > first.artifact.training_rows);
}

#[test]
fn test_empty_store_is_fatal() {
    let dir = tempdir().unwrap();
    let store = CsvStore::open(dir.path().join("data.csv")).unwrap();

    match Trainer::default().train(&store) {
        Err(TrainingError::EmptyDataset(_)) => {}
        other => panic!("Expected EmptyDataset, got {:?}", other.map(|o| o.train_rows)),
    }
}

#[test]
fn test_malformed_store_is_fatal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.csv");
    let store = CsvStore::open(&path).unwrap();
    seed_store(&store, 10, 10);

    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str(",,,2.0,two-thirty,5.5,,\n");
    fs::write(&path, content).unwrap();

    assert!(matches!(Trainer::default().train(&store), Err(TrainingError::Store(_))));
}

#[test]
fn test_supplied_policy_uses_detection_column() {
    let dir = tempdir().unwrap();
    let store = CsvStore::open(dir.path().join("data.csv")).unwrap();

    // Labels contradict the power threshold: high current marks theft
    for i in 0..20 {
        let low = SensorRecord::reading(1.0 + i as f64 * 0.01, 230.0, 9.0).with_detection(0);
        let high = SensorRecord::reading(8.0 + i as f64 * 0.01, 230.0, 9.0).with_detection(1);
        store.append(&low).unwrap();
        store.append(&high).unwrap();
    }

    let config = TrainingConfig {
        label_policy: LabelPolicy::Supplied,
        n_estimators: 20,
        ..Default::default()
    };
    let outcome = Trainer::new(config).train(&store).unwrap();
    let forest = &outcome.artifact.forest;

    assert_eq!(forest.predict(&FeatureVector::new(1.05, 230.0, 9.0)), 0);
    assert_eq!(forest.predict(&FeatureVector::new(8.05, 230.0, 9.0)), 1);
    assert_eq!(outcome.artifact.label_policy, LabelPolicy::Supplied);
}

#[test]
fn test_supplied_policy_rejects_unlabeled_rows() {
    let dir = tempdir().unwrap();
    let store = CsvStore::open(dir.path().join("data.csv")).unwrap();
    seed_store(&store, 5, 5);

    let config = TrainingConfig { label_policy: LabelPolicy::Supplied, ..Default::default() };
    assert!(matches!(Trainer::new(config).train(&store), Err(TrainingError::Label(_))));
}

#[test]
fn test_threshold_labels_drive_normal_prediction() {
    let dir = tempdir().unwrap();
    let store = CsvStore::open(dir.path().join("data.csv")).unwrap();
    seed_store(&store, 50, 50);

    let outcome = Trainer::default().train(&store).unwrap();
    let predictor = Predictor::from_artifact(outcome.artifact).unwrap();

    let p = predictor.predict(&FeatureVector::new(2.0, 230.0, 5.5)).unwrap();
    assert_eq!(p.label, 0);
}
